//! Codec module - conversion between frames and typed packets.
//!
//! - [`decode`] turns one complete frame into a [`Packet`]
//! - [`encode`] turns a [`Packet`] into a complete frame, CRC included
//!
//! [`PacketCodec`] bundles both as a marker struct with static methods, so
//! callers can name the codec without holding any state.
//!
//! # Example
//!
//! ```
//! use airtouch5::codec::PacketCodec;
//! use airtouch5::protocol::{address, Packet, Payload};
//!
//! let request = Packet::new(address::EXTENDED, 1, Payload::ConsoleVersionRequest);
//! let frame = PacketCodec::encode(&request).unwrap();
//! assert_eq!(
//!     &frame[..],
//!     &[0x55, 0x55, 0x55, 0xAA, 0x90, 0xB0, 0x01, 0x1F, 0x00, 0x02, 0xFF, 0x30, 0x9B, 0x8C]
//! );
//!
//! let decoded = PacketCodec::decode(&frame).unwrap();
//! assert_eq!(decoded, request);
//! ```

mod bits;
mod decode;
mod encode;
mod scale;

use bytes::Bytes;

use crate::error::{DecodeError, EncodeError};
use crate::protocol::Packet;

pub use decode::decode;
pub use encode::encode;

/// Stateless packet codec.
pub struct PacketCodec;

impl PacketCodec {
    /// Decode one complete frame. See [`decode`].
    #[inline]
    pub fn decode(frame: &[u8]) -> Result<Packet, DecodeError> {
        decode::decode(frame)
    }

    /// Encode a packet into a frame. See [`encode`].
    #[inline]
    pub fn encode(packet: &Packet) -> Result<Bytes, EncodeError> {
        encode::encode(packet)
    }
}
