//! Fixed-point scalings shared by the decoder and encoder.

use crate::error::EncodeError;

/// Value byte meaning "unused" / "no value".
pub const UNUSED_BYTE: u8 = 0xFF;

/// 16-bit temperature written when there is no reading.
pub const TEMPERATURE_UNAVAILABLE: u16 = 0x07FF;

/// Zone readings above this many degrees are not real.
pub const ZONE_TEMPERATURE_MAX: f64 = 150.0;

/// AC readings with a raw value above this are not real.
pub const AC_TEMPERATURE_RAW_MAX: u16 = 2000;

/// Largest percentage a full value byte may carry.
pub const PERCENTAGE_MAX: u8 = 100;

/// Largest raw value of the 7-bit open percentage in zone status.
pub const STATUS_PERCENTAGE_MAX: u8 = 0x7F;

#[inline]
pub fn percentage_from_wire(raw: u8) -> f64 {
    f64::from(raw) / 100.0
}

pub fn percentage_to_wire(
    fraction: f64,
    max: u8,
    field: &'static str,
) -> Result<u8, EncodeError> {
    let raw = (fraction * 100.0).round();
    checked(raw, 0, i64::from(max), field).map(|v| v as u8)
}

#[inline]
pub fn setpoint_from_wire(raw: u8) -> f64 {
    (f64::from(raw) + 100.0) / 10.0
}

pub fn setpoint_to_wire(degrees: f64, field: &'static str) -> Result<u8, EncodeError> {
    let raw = (degrees * 10.0 - 100.0).round();
    checked(raw, 0, 255, field).map(|v| v as u8)
}

#[inline]
pub fn temperature_from_wire(raw: u16) -> f64 {
    (f64::from(raw) - 500.0) / 10.0
}

pub fn temperature_to_wire(degrees: Option<f64>, field: &'static str) -> Result<u16, EncodeError> {
    match degrees {
        None => Ok(TEMPERATURE_UNAVAILABLE),
        Some(t) => {
            let raw = (t * 10.0 + 500.0).round();
            checked(raw, 0, i64::from(AC_TEMPERATURE_RAW_MAX), field).map(|v| v as u16)
        }
    }
}

/// Whole-number value byte used by the non-scaled zone settings. 0xFF is
/// reserved for "no value".
pub fn raw_byte(value: f64, field: &'static str) -> Result<u8, EncodeError> {
    checked(value.round(), 0, i64::from(UNUSED_BYTE) - 1, field).map(|v| v as u8)
}

fn checked(raw: f64, min: i64, max: i64, field: &'static str) -> Result<i64, EncodeError> {
    if !raw.is_finite() {
        return Err(EncodeError::OutOfRange { field, value: i64::MAX });
    }
    let value = raw as i64;
    if value < min || value > max {
        return Err(EncodeError::OutOfRange { field, value });
    }
    Ok(value)
}
