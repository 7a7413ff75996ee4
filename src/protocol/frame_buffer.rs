//! Frame buffer for accumulating partial reads.
//!
//! Uses `bytes::BytesMut` for buffer management. Incoming bytes are scanned
//! for the `55 55 55 AA` magic, so the buffer resynchronises on its own after
//! garbage or a corrupt frame:
//! - `Searching`: looking for magic, need at least 12 bytes
//! - `WaitingForFrame`: header read, need the rest of the frame
//!
//! # Example
//!
//! ```
//! use airtouch5::protocol::FrameBuffer;
//!
//! let mut buffer = FrameBuffer::new();
//! let frame = [
//!     0x55, 0x55, 0x55, 0xAA, 0x90, 0xB0, 0x01, 0x1F, 0x00, 0x02, 0xFF, 0x30, 0x9B, 0x8C,
//! ];
//!
//! assert!(buffer.push(&frame[..6]).is_empty());
//! let packets = buffer.push(&frame[6..]);
//! assert_eq!(packets.len(), 1);
//! ```

use bytes::{Buf, BytesMut};
use tracing::{debug, trace};

use super::crc::checksum;
use super::wire_format::{read_payload_length, CRC_SIZE, MAGIC, MIN_FRAME_SIZE};
use super::Packet;
use crate::codec;
use crate::error::DecodeError;

/// Default initial buffer capacity.
pub const DEFAULT_CAPACITY: usize = 1024;

/// State machine for frame parsing.
#[derive(Debug, Clone, Copy)]
enum State {
    /// Looking for magic and a complete header.
    Searching,
    /// Magic found at the front, waiting for `frame_len` bytes in total.
    WaitingForFrame { frame_len: usize },
}

/// Splits a byte stream into decoded packets.
///
/// Malformed frames (bad CRC, unknown type, inconsistent lengths) are
/// logged and skipped; they never surface as errors.
pub struct FrameBuffer {
    /// Accumulated bytes from socket reads.
    buffer: BytesMut,
    /// Current parsing state.
    state: State,
    /// Frames dropped because they failed validation.
    dropped: u64,
}

impl FrameBuffer {
    /// Create a new frame buffer with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a new frame buffer with the given initial capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
            state: State::Searching,
            dropped: 0,
        }
    }

    /// Push data into the buffer and extract all complete packets.
    ///
    /// Returns packets in stream order (possibly none). Partial frames stay
    /// buffered for the next push.
    pub fn push(&mut self, data: &[u8]) -> Vec<Packet> {
        self.buffer.extend_from_slice(data);

        let mut packets = Vec::new();
        while let Some(frame_len) = self.next_frame_len() {
            self.state = State::Searching;
            let frame = &self.buffer[..frame_len];
            match validate(frame).and_then(|()| codec::decode(frame)) {
                Ok(packet) => {
                    packets.push(packet);
                    self.buffer.advance(frame_len);
                }
                Err(e) => {
                    self.dropped += 1;
                    debug!(error = %e, len = frame_len, "dropping malformed frame");
                    // The length field itself may be corrupt, so only the
                    // leading byte is known bad.
                    self.buffer.advance(1);
                }
            }
        }
        packets
    }

    /// Length of the complete candidate frame at the front of the buffer,
    /// once enough bytes have arrived.
    fn next_frame_len(&mut self) -> Option<usize> {
        loop {
            match self.state {
                State::Searching => {
                    self.skip_to_magic();
                    if self.buffer.len() < MIN_FRAME_SIZE {
                        return None;
                    }
                    let frame_len = MIN_FRAME_SIZE + read_payload_length(&self.buffer) as usize;
                    self.state = State::WaitingForFrame { frame_len };
                }
                State::WaitingForFrame { frame_len } => {
                    return (self.buffer.len() >= frame_len).then_some(frame_len);
                }
            }
        }
    }

    /// Discard bytes until the buffer starts with magic. A trailing partial
    /// magic is kept so a header split across reads is not lost.
    fn skip_to_magic(&mut self) {
        if self.buffer.starts_with(&MAGIC) {
            return;
        }

        let skip = match self
            .buffer
            .windows(MAGIC.len())
            .position(|window| window == MAGIC)
        {
            Some(pos) => pos,
            None => {
                let keep = (1..MAGIC.len())
                    .rev()
                    .find(|&n| self.buffer.len() >= n && self.buffer.ends_with(&MAGIC[..n]))
                    .unwrap_or(0);
                self.buffer.len() - keep
            }
        };

        if skip > 0 {
            trace!(skipped = skip, "resynchronising on frame magic");
            self.buffer.advance(skip);
        }
    }

    /// Get the number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Number of frames dropped as malformed since creation.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Clear the buffer and reset state.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.state = State::Searching;
    }

    #[cfg(test)]
    fn state_name(&self) -> &'static str {
        match self.state {
            State::Searching => "Searching",
            State::WaitingForFrame { .. } => "WaitingForFrame",
        }
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Check the CRC trailer of a complete frame.
fn validate(frame: &[u8]) -> Result<(), DecodeError> {
    let body_end = frame.len() - CRC_SIZE;
    let expected = checksum(&frame[4..body_end]);
    let found = u16::from_be_bytes([frame[body_end], frame[body_end + 1]]);
    if expected != found {
        return Err(DecodeError::Checksum { expected, found });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Payload, ZoneSettingPower};

    const ZONE_CONTROL: [u8; 24] = [
        0x55, 0x55, 0x55, 0xAA, 0x80, 0xB0, 0x0F, 0xC0, 0x00, 0x0C, 0x20, 0x00, 0x00, 0x00, 0x00,
        0x04, 0x00, 0x01, 0x01, 0x02, 0xFF, 0x00, 0xF0, 0xA1,
    ];

    #[test]
    fn test_single_complete_frame() {
        let mut buffer = FrameBuffer::new();
        let packets = buffer.push(&ZONE_CONTROL);

        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0].message_id, 0x0F);
        let Payload::ZoneControl { zones } = &packets[0].payload else {
            panic!("expected zone control");
        };
        assert_eq!(zones[0].power, ZoneSettingPower::Off);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_one_byte_at_a_time() {
        let mut buffer = FrameBuffer::new();
        for byte in &ZONE_CONTROL[..ZONE_CONTROL.len() - 1] {
            assert!(buffer.push(std::slice::from_ref(byte)).is_empty());
        }
        assert_eq!(buffer.state_name(), "WaitingForFrame");
        assert_eq!(buffer.push(&ZONE_CONTROL[ZONE_CONTROL.len() - 1..]).len(), 1);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_two_frames_in_one_push() {
        let mut buffer = FrameBuffer::new();
        let mut data = ZONE_CONTROL.to_vec();
        data.extend_from_slice(&ZONE_CONTROL);

        assert_eq!(buffer.push(&data).len(), 2);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_corrupt_frame_then_valid() {
        let mut buffer = FrameBuffer::new();
        let mut corrupt = ZONE_CONTROL;
        corrupt[19] = 0x03;
        let mut data = corrupt.to_vec();
        data.extend_from_slice(&ZONE_CONTROL);

        let packets = buffer.push(&data);
        assert_eq!(packets.len(), 1);
        assert_eq!(buffer.dropped(), 1);
    }

    #[test]
    fn test_corrupt_length_does_not_swallow_following_frames() {
        let mut buffer = FrameBuffer::new();
        let mut corrupt = ZONE_CONTROL;
        // Declares 48 payload bytes, reaching into the next two frames.
        corrupt[9] = 0x30;
        let mut data = corrupt.to_vec();
        data.extend_from_slice(&ZONE_CONTROL);
        data.extend_from_slice(&ZONE_CONTROL);

        assert_eq!(buffer.push(&data).len(), 2);
        assert_eq!(buffer.dropped(), 1);
        assert!(buffer.is_empty());

        assert_eq!(buffer.push(&ZONE_CONTROL).len(), 1);
    }

    #[test]
    fn test_leading_garbage_skipped() {
        let mut buffer = FrameBuffer::new();
        let mut data = vec![0x00, 0x55, 0x13, 0x55, 0x55];
        data.extend_from_slice(&ZONE_CONTROL);

        assert_eq!(buffer.push(&data).len(), 1);
    }

    #[test]
    fn test_partial_magic_kept_across_pushes() {
        let mut buffer = FrameBuffer::new();
        let mut first = vec![0xAB; 12];
        first.extend_from_slice(&ZONE_CONTROL[..3]);

        assert!(buffer.push(&first).is_empty());
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.push(&ZONE_CONTROL[3..]).len(), 1);
    }

    #[test]
    fn test_partial_frame_stays_buffered() {
        let mut buffer = FrameBuffer::new();
        let mut data = ZONE_CONTROL.to_vec();
        data.extend_from_slice(&ZONE_CONTROL[..15]);

        assert_eq!(buffer.push(&data).len(), 1);
        assert_eq!(buffer.len(), 15);
        assert_eq!(buffer.push(&ZONE_CONTROL[15..]).len(), 1);
    }

    #[test]
    fn test_clear_resets_state() {
        let mut buffer = FrameBuffer::new();
        buffer.push(&ZONE_CONTROL[..14]);
        assert_eq!(buffer.state_name(), "WaitingForFrame");

        buffer.clear();
        assert_eq!(buffer.state_name(), "Searching");
        assert!(buffer.is_empty());
    }
}
