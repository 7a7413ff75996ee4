//! Frame to [`Packet`] decoding.
//!
//! The checksum trailer is not examined here; the framer validates it
//! before handing a frame over.

use super::bits::{field, flag, text, Reader};
use super::scale;
use crate::error::DecodeError;
use crate::protocol::{
    control_sub_type, extended_sub_type, AcAbilityInfo, AcControlEntry, AcFanSpeed,
    AcFanSpeedSetting, AcMode, AcModeSetting, AcPowerSetting, AcPowerState, AcStatusEntry,
    ControlMethod, FanSpeedSupport, Header, MessageType, ModeSupport, Packet, Payload,
    SetpointControl, ZoneControlEntry, ZoneNameEntry, ZonePowerState, ZoneSettingPower,
    ZoneSettingValue, ZoneStatusEntry, CONTROL_PREFIX_SIZE, HEADER_SIZE,
};

const ZONE_CONTROL_ENTRY: usize = 4;
const ZONE_STATUS_ENTRY: usize = 8;
const AC_CONTROL_ENTRY: usize = 4;
const AC_STATUS_ENTRY: usize = 10;
const AC_NAME_LEN: usize = 16;
const AC_ABILITY_RECORD: usize = AC_NAME_LEN + 8;

/// Decode one frame. Trailing bytes past the declared payload (the CRC)
/// are ignored.
pub fn decode(buf: &[u8]) -> Result<Packet, DecodeError> {
    let header = Header::decode(buf)?;
    let end = HEADER_SIZE + header.payload_length as usize;
    if buf.len() < end {
        return Err(DecodeError::LengthMismatch {
            declared: header.payload_length as usize,
            actual: buf.len() - HEADER_SIZE,
        });
    }
    let data = &buf[HEADER_SIZE..end];

    let payload = match MessageType::from_wire(header.message_type) {
        Some(MessageType::ControlStatus) => decode_control_status(data)?,
        Some(MessageType::Extended) => decode_extended(data)?,
        None => return Err(DecodeError::UnknownMessageType(header.message_type)),
    };

    Ok(Packet::new(header.address, header.message_id, payload))
}

/// Decode a control/status payload (prefix + normal data + repeat entries).
fn decode_control_status(data: &[u8]) -> Result<Payload, DecodeError> {
    let mut reader = Reader::new(data);
    let sub_type = reader.u8("control/status prefix")?;
    let _reserved = reader.u8("control/status prefix")?;
    let normal_len = reader.u16("control/status prefix")? as usize;
    let repeat_len = reader.u16("control/status prefix")? as usize;
    let repeat_count = reader.u16("control/status prefix")? as usize;

    let min_entry = match sub_type {
        control_sub_type::ZONE_CONTROL => ZONE_CONTROL_ENTRY,
        control_sub_type::ZONE_STATUS => ZONE_STATUS_ENTRY,
        control_sub_type::AC_CONTROL => AC_CONTROL_ENTRY,
        control_sub_type::AC_STATUS => AC_STATUS_ENTRY,
        other => return Err(DecodeError::UnknownControlSubType(other)),
    };

    let body = &data[CONTROL_PREFIX_SIZE..];
    let expected = normal_len + repeat_len * repeat_count;
    if body.len() != expected {
        return Err(DecodeError::Section(format!(
            "expected {} bytes ({} normal + {} x {}), found {}",
            expected,
            normal_len,
            repeat_count,
            repeat_len,
            body.len()
        )));
    }
    if repeat_count > 0 && repeat_len < min_entry {
        return Err(DecodeError::Section(format!(
            "sub-type {:#04x} entries need {} bytes, header says {}",
            sub_type, min_entry, repeat_len
        )));
    }

    // Entry width comes from the header so longer firmware records still parse.
    let entries: Vec<&[u8]> = if repeat_count == 0 {
        Vec::new()
    } else {
        body[normal_len..].chunks_exact(repeat_len).collect()
    };

    Ok(match sub_type {
        control_sub_type::ZONE_CONTROL => Payload::ZoneControl {
            zones: entries.into_iter().map(zone_control_entry).collect(),
        },
        control_sub_type::ZONE_STATUS => Payload::ZoneStatus {
            zones: entries.into_iter().map(zone_status_entry).collect(),
        },
        control_sub_type::AC_CONTROL => Payload::AcControl {
            units: entries.into_iter().map(ac_control_entry).collect(),
        },
        _ => Payload::AcStatus {
            units: entries.into_iter().map(ac_status_entry).collect(),
        },
    })
}

fn zone_control_entry(b: &[u8]) -> ZoneControlEntry {
    let setting = ZoneSettingValue::from_wire(field(b[1], 0, 3));
    let raw = b[2];
    let value = match setting {
        ZoneSettingValue::OpenPercentage => Some(scale::percentage_from_wire(raw)),
        ZoneSettingValue::TargetSetpoint => Some(scale::setpoint_from_wire(raw)),
        _ if raw == scale::UNUSED_BYTE => None,
        _ => Some(f64::from(raw)),
    };

    ZoneControlEntry {
        zone_number: field(b[0], 2, 6),
        setting,
        power: ZoneSettingPower::from_wire(field(b[1], 5, 3)),
        value,
    }
}

fn zone_status_entry(b: &[u8]) -> ZoneStatusEntry {
    let setpoint = match b[2] {
        scale::UNUSED_BYTE => None,
        raw => Some(scale::setpoint_from_wire(raw)),
    };
    let temperature = scale::temperature_from_wire(u16::from_be_bytes([b[4], b[5]]));
    let temperature = (temperature <= scale::ZONE_TEMPERATURE_MAX).then_some(temperature);

    ZoneStatusEntry {
        power_state: ZonePowerState::from_wire(field(b[0], 0, 2)),
        zone_number: field(b[0], 2, 6),
        control_method: ControlMethod::from_wire(field(b[1], 0, 1)),
        open_percentage: scale::percentage_from_wire(field(b[1], 1, 7)),
        setpoint,
        has_sensor: flag(b[3], 0),
        temperature,
        spill_active: flag(b[6], 6),
        low_battery: flag(b[6], 7),
    }
}

fn ac_control_entry(b: &[u8]) -> AcControlEntry {
    AcControlEntry {
        power: AcPowerSetting::from_wire(field(b[0], 0, 4)),
        ac_number: field(b[0], 4, 4),
        mode: AcModeSetting::from_wire(field(b[1], 0, 4)),
        fan_speed: AcFanSpeedSetting::from_wire(field(b[1], 4, 4)),
        setpoint_control: SetpointControl::from_wire(b[2]),
        setpoint: Some(scale::setpoint_from_wire(b[3])),
    }
}

fn ac_status_entry(b: &[u8]) -> AcStatusEntry {
    let raw_temperature = u16::from_be_bytes([b[4], b[5]]);
    let temperature = (raw_temperature <= scale::AC_TEMPERATURE_RAW_MAX)
        .then(|| scale::temperature_from_wire(raw_temperature));

    AcStatusEntry {
        power_state: AcPowerState::from_wire(field(b[0], 0, 4)),
        ac_number: field(b[0], 4, 4),
        mode: AcMode::from_wire(field(b[1], 0, 4)),
        fan_speed: AcFanSpeed::from_wire(field(b[1], 4, 4)),
        setpoint: scale::setpoint_from_wire(b[2]),
        turbo_active: flag(b[3], 4),
        bypass_active: flag(b[3], 5),
        spill_active: flag(b[3], 6),
        timer_set: flag(b[3], 7),
        temperature,
        error_code: u16::from_be_bytes([b[6], b[7]]),
    }
}

/// Decode an extended payload (2-byte sub-type + self-delimited records).
fn decode_extended(data: &[u8]) -> Result<Payload, DecodeError> {
    let mut reader = Reader::new(data);
    let sub_type = reader.u16("extended sub-type")?;

    match sub_type {
        extended_sub_type::AC_ABILITY => match reader.remaining() {
            0 => Ok(Payload::AcAbilityRequest { unit: None }),
            1 => Ok(Payload::AcAbilityRequest {
                unit: Some(reader.u8("ac ability request")?),
            }),
            _ => ac_ability(reader),
        },
        extended_sub_type::AC_ERROR_INFO => {
            let unit = reader.u8("ac error info")?;
            if reader.is_empty() {
                return Ok(Payload::AcErrorInfoRequest { unit });
            }
            let message = reader.short_string("ac error message")?;
            Ok(Payload::AcErrorInfo { unit, message })
        }
        extended_sub_type::ZONE_NAME => match reader.remaining() {
            0 => Ok(Payload::ZoneNameRequest { zone: None }),
            1 => Ok(Payload::ZoneNameRequest {
                zone: Some(reader.u8("zone name request")?),
            }),
            _ => zone_names(reader),
        },
        extended_sub_type::CONSOLE_VERSION => {
            if reader.is_empty() {
                return Ok(Payload::ConsoleVersionRequest);
            }
            let has_update = reader.u8("console version")? != 0;
            let version = reader.short_string("console version string")?;
            Ok(Payload::ConsoleVersion {
                has_update,
                version,
            })
        }
        other => Err(DecodeError::UnknownExtendedSubType(other)),
    }
}

fn ac_ability(mut reader: Reader<'_>) -> Result<Payload, DecodeError> {
    let mut units = Vec::new();

    // Up to two trailing bytes after the last record are padding.
    while reader.remaining() > 2 {
        let ac_number = reader.u8("ac ability record")?;
        let following = reader.u8("ac ability record")? as usize;
        if following < AC_ABILITY_RECORD {
            return Err(DecodeError::Truncated("ac ability record"));
        }
        let record = reader.take(following, "ac ability record")?;

        let name_bytes = &record[..AC_NAME_LEN];
        let name_end = name_bytes
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(AC_NAME_LEN);
        let modes = record[18];
        let fans = record[19];

        units.push(AcAbilityInfo {
            ac_number,
            name: text(&name_bytes[..name_end]),
            start_zone: record[16],
            zone_count: record[17],
            modes: ModeSupport {
                cool: flag(modes, 3),
                fan: flag(modes, 4),
                dry: flag(modes, 5),
                heat: flag(modes, 6),
                auto: flag(modes, 7),
            },
            fan_speeds: FanSpeedSupport {
                intelligent_auto: flag(fans, 0),
                turbo: flag(fans, 1),
                powerful: flag(fans, 2),
                high: flag(fans, 3),
                medium: flag(fans, 4),
                low: flag(fans, 5),
                quiet: flag(fans, 6),
                auto: flag(fans, 7),
            },
            min_cool_setpoint: record[20],
            max_cool_setpoint: record[21],
            min_heat_setpoint: record[22],
            max_heat_setpoint: record[23],
        });
    }

    Ok(Payload::AcAbility { units })
}

fn zone_names(mut reader: Reader<'_>) -> Result<Payload, DecodeError> {
    let mut entries = Vec::new();
    while !reader.is_empty() {
        let zone_number = reader.u8("zone name record")?;
        let name = reader.short_string("zone name")?;
        entries.push(ZoneNameEntry { zone_number, name });
    }
    Ok(Payload::ZoneName { entries })
}
