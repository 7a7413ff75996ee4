//! Sub-byte field helpers and a checked byte cursor.
//!
//! Bit offsets count from the most significant bit, matching the vendor
//! documentation's "bit 8 .. bit 1" layout.

use crate::error::DecodeError;

/// Extract `width` bits starting `offset` bits below the MSB.
#[inline]
pub fn field(byte: u8, offset: u32, width: u32) -> u8 {
    debug_assert!(offset + width <= 8);
    let mask = ((1u16 << width) - 1) as u8;
    (byte >> (8 - offset - width)) & mask
}

/// Test the bit `offset` positions below the MSB.
#[inline]
pub fn flag(byte: u8, offset: u32) -> bool {
    field(byte, offset, 1) == 1
}

/// Place a `width`-bit value `offset` bits below the MSB.
#[inline]
pub fn place(value: u8, offset: u32, width: u32) -> u8 {
    debug_assert!(offset + width <= 8);
    let mask = ((1u16 << width) - 1) as u8;
    (value & mask) << (8 - offset - width)
}

/// Read-only cursor over a payload that reports truncation instead of panicking.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn u8(&mut self, what: &'static str) -> Result<u8, DecodeError> {
        Ok(self.take(1, what)?[0])
    }

    pub fn u16(&mut self, what: &'static str) -> Result<u16, DecodeError> {
        let bytes = self.take(2, what)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn take(&mut self, len: usize, what: &'static str) -> Result<&'a [u8], DecodeError> {
        if self.buf.len() < len {
            return Err(DecodeError::Truncated(what));
        }
        let (head, tail) = self.buf.split_at(len);
        self.buf = tail;
        Ok(head)
    }

    /// Read a length byte followed by that many bytes of text.
    pub fn short_string(&mut self, what: &'static str) -> Result<String, DecodeError> {
        let len = self.u8(what)? as usize;
        let bytes = self.take(len, what)?;
        Ok(text(bytes))
    }
}

/// Decode wire text. Invalid UTF-8 sequences are replaced rather than rejected.
pub fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
