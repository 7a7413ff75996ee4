//! Error types for the AirTouch 5 client.

use thiserror::Error;

/// A single frame could not be turned into a [`Packet`](crate::protocol::Packet).
///
/// The framer recovers from these locally; they never tear down a connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Frame is shorter than the fixed header plus checksum.
    #[error("frame too short: {0} bytes")]
    TooShort(usize),

    /// Frame does not start with `55 55 55 AA`.
    #[error("missing frame header magic")]
    BadMagic,

    /// Declared data length disagrees with the bytes present.
    #[error("declared data length {declared} does not match {actual} available bytes")]
    LengthMismatch { declared: usize, actual: usize },

    /// Checksum trailer does not match the frame contents.
    #[error("CRC mismatch: expected {expected:#06x}, found {found:#06x}")]
    Checksum { expected: u16, found: u16 },

    /// Message type byte is neither control/status nor extended.
    #[error("unknown message type {0:#04x}")]
    UnknownMessageType(u8),

    /// Control/status sub-type byte is not recognised.
    #[error("unknown control/status sub-type {0:#04x}")]
    UnknownControlSubType(u8),

    /// Extended sub-type is not recognised.
    #[error("unknown extended sub-type {0:#06x}")]
    UnknownExtendedSubType(u16),

    /// Normal/repeat section sizes disagree with the payload length.
    #[error("section lengths inconsistent: {0}")]
    Section(String),

    /// A record or string runs past the end of the payload.
    #[error("truncated {0}")]
    Truncated(&'static str),
}

/// A [`Packet`](crate::protocol::Packet) could not be turned into bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The setting kind requires a value but none was supplied.
    #[error("{0} requires a value but none was supplied")]
    MissingValue(&'static str),

    /// A numeric field does not fit its wire width.
    #[error("{field} value {value} out of range")]
    OutOfRange { field: &'static str, value: i64 },

    /// A string field is longer than its length byte can describe.
    #[error("{0} longer than 255 bytes")]
    StringTooLong(&'static str),

    /// Payload is longer than the 16-bit length field allows.
    #[error("payload of {0} bytes exceeds frame limit")]
    PayloadTooLarge(usize),
}

/// Main error type for all client operations.
#[derive(Debug, Error)]
pub enum Airtouch5Error {
    /// Malformed or unrecognised frame.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Packet could not be encoded.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// I/O error on the controller socket.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Dial did not complete within the connect timeout.
    #[error("connection attempt timed out")]
    ConnectTimeout,

    /// Peer did not answer the console version request.
    #[error("verification failed: {0}")]
    VerificationFailed(String),

    /// No socket is currently open.
    #[error("not connected")]
    NotConnected,

    /// Connection closed while an operation was in flight.
    #[error("connection closed")]
    ConnectionClosed,

    /// Client has been shut down.
    #[error("client is shut down")]
    Shutdown,
}

/// Result type alias using Airtouch5Error.
pub type Result<T> = std::result::Result<T, Airtouch5Error>;
