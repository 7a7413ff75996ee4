//! CRC-16/MODBUS checksum used as the frame trailer.
//!
//! Polynomial 0x8005 (reflected 0xA001), seed 0xFFFF, no final XOR. The
//! checksum covers every byte from the address field through the end of the
//! payload and is written big-endian.

use crc::{Crc, CRC_16_MODBUS};

const MODBUS: Crc<u16> = Crc::<u16>::new(&CRC_16_MODBUS);

/// Compute the frame checksum over `data`.
#[inline]
pub fn checksum(data: &[u8]) -> u16 {
    MODBUS.checksum(data)
}
