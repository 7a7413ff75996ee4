//! Wire format constants and frame header encoding/decoding.
//!
//! Every frame has the layout:
//! ```text
//! ┌─────────────┬─────────┬────────┬────────┬──────────┬─────────┬─────────┐
//! │ Magic       │ Address │ Msg ID │ Type   │ Length   │ Payload │ CRC     │
//! │ 55 55 55 AA │ u16 BE  │ u8     │ u8     │ u16 BE   │ N bytes │ u16 BE  │
//! └─────────────┴─────────┴────────┴────────┴──────────┴─────────┴─────────┘
//! ```
//!
//! The CRC covers address through the last payload byte.

use crate::error::DecodeError;

/// Magic bytes that open every frame.
pub const MAGIC: [u8; 4] = [0x55, 0x55, 0x55, 0xAA];

/// Bytes before the payload (magic + address + id + type + length).
pub const HEADER_SIZE: usize = 10;

/// Trailing checksum size.
pub const CRC_SIZE: usize = 2;

/// Smallest possible frame: header and checksum with an empty payload.
pub const MIN_FRAME_SIZE: usize = HEADER_SIZE + CRC_SIZE;

/// Offset of the big-endian payload length inside the header.
pub const LENGTH_OFFSET: usize = 8;

/// TCP port the console listens on.
pub const DEFAULT_PORT: u16 = 9005;

/// Addresses used on the wire.
pub mod address {
    /// Client to console, control/status messages.
    pub const CONTROL: u16 = 0x80B0;
    /// Client to console, extended messages.
    pub const EXTENDED: u16 = 0x90B0;
    /// Console to client, control/status messages.
    pub const CONTROL_REPLY: u16 = 0xB080;
    /// Console to client, extended messages.
    pub const EXTENDED_REPLY: u16 = 0xB090;
}

/// Top-level message family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    /// Fixed-layout control commands and status reports.
    ControlStatus = 0xC0,
    /// Variable-length extended records.
    Extended = 0x1F,
}

impl MessageType {
    /// Map a wire byte to a message type.
    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            0xC0 => Some(Self::ControlStatus),
            0x1F => Some(Self::Extended),
            _ => None,
        }
    }

    /// Wire byte for this message type.
    #[inline]
    pub fn to_wire(self) -> u8 {
        self as u8
    }
}

/// Control/status sub-types (1-byte field).
pub mod control_sub_type {
    pub const ZONE_CONTROL: u8 = 0x20;
    pub const ZONE_STATUS: u8 = 0x21;
    pub const AC_CONTROL: u8 = 0x22;
    pub const AC_STATUS: u8 = 0x23;
}

/// Extended sub-types (2-byte field).
pub mod extended_sub_type {
    pub const AC_ERROR_INFO: u16 = 0xFF10;
    pub const AC_ABILITY: u16 = 0xFF11;
    pub const ZONE_NAME: u16 = 0xFF13;
    pub const CONSOLE_VERSION: u16 = 0xFF30;
}

/// Size of the control/status payload prefix
/// (sub-type, reserved, normal length, repeat length, repeat count).
pub const CONTROL_PREFIX_SIZE: usize = 8;

/// Size of the extended payload prefix (sub-type).
pub const EXTENDED_PREFIX_SIZE: usize = 2;

/// Decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Logical peer address.
    pub address: u16,
    /// Caller-assigned correlation tag.
    pub message_id: u8,
    /// Raw message type byte.
    pub message_type: u8,
    /// Payload length in bytes.
    pub payload_length: u16,
}

impl Header {
    /// Create a new header.
    pub fn new(address: u16, message_id: u8, message_type: u8, payload_length: u16) -> Self {
        Self {
            address,
            message_id,
            message_type,
            payload_length,
        }
    }

    /// Encode header (magic included) to bytes.
    ///
    /// # Example
    ///
    /// ```
    /// use airtouch5::protocol::{Header, HEADER_SIZE};
    ///
    /// let bytes = Header::new(0x80B0, 0x0F, 0xC0, 12).encode();
    /// assert_eq!(bytes.len(), HEADER_SIZE);
    /// assert_eq!(&bytes[..4], &[0x55, 0x55, 0x55, 0xAA]);
    /// ```
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(&MAGIC);
        buf[4..6].copy_from_slice(&self.address.to_be_bytes());
        buf[6] = self.message_id;
        buf[7] = self.message_type;
        buf[8..10].copy_from_slice(&self.payload_length.to_be_bytes());
        buf
    }

    /// Decode a header from the start of `buf`.
    ///
    /// # Example
    ///
    /// ```
    /// use airtouch5::protocol::Header;
    ///
    /// let bytes = [0x55, 0x55, 0x55, 0xAA, 0x90, 0xB0, 0x01, 0x1F, 0x00, 0x02];
    /// let header = Header::decode(&bytes).unwrap();
    /// assert_eq!(header.address, 0x90B0);
    /// assert_eq!(header.payload_length, 2);
    /// ```
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        if buf.len() < HEADER_SIZE {
            return Err(DecodeError::TooShort(buf.len()));
        }
        if buf[0..4] != MAGIC {
            return Err(DecodeError::BadMagic);
        }
        Ok(Self {
            address: u16::from_be_bytes([buf[4], buf[5]]),
            message_id: buf[6],
            message_type: buf[7],
            payload_length: read_payload_length(buf),
        })
    }

    /// Total frame size this header describes, checksum included.
    #[inline]
    pub fn frame_size(&self) -> usize {
        MIN_FRAME_SIZE + self.payload_length as usize
    }
}

/// Read the declared payload length at its fixed offset.
///
/// `buf` must hold at least [`HEADER_SIZE`] bytes.
#[inline]
pub fn read_payload_length(buf: &[u8]) -> u16 {
    u16::from_be_bytes([buf[LENGTH_OFFSET], buf[LENGTH_OFFSET + 1]])
}
