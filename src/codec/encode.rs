//! [`Packet`] to frame encoding.

use bytes::{BufMut, Bytes, BytesMut};

use super::bits::place;
use super::scale;
use crate::error::EncodeError;
use crate::protocol::{
    checksum, control_sub_type, extended_sub_type, AcAbilityInfo, AcControlEntry, AcStatusEntry,
    Header, Packet, Payload, SetpointControl, ZoneControlEntry, ZoneNameEntry, ZoneSettingValue,
    ZoneStatusEntry, HEADER_SIZE, MIN_FRAME_SIZE,
};

const AC_NAME_LEN: usize = 16;
const AC_ABILITY_RECORD: u8 = 24;

/// Encode a packet into a complete frame, magic and CRC included.
pub fn encode(packet: &Packet) -> Result<Bytes, EncodeError> {
    let mut payload = BytesMut::new();
    encode_payload(&packet.payload, &mut payload)?;

    let payload_length =
        u16::try_from(payload.len()).map_err(|_| EncodeError::PayloadTooLarge(payload.len()))?;
    let header = Header::new(
        packet.address,
        packet.message_id,
        packet.payload.message_type().to_wire(),
        payload_length,
    );

    let mut frame = BytesMut::with_capacity(MIN_FRAME_SIZE + payload.len());
    frame.put_slice(&header.encode());
    frame.put_slice(&payload);
    let crc = checksum(&frame[4..HEADER_SIZE + payload.len()]);
    frame.put_u16(crc);

    Ok(frame.freeze())
}

fn encode_payload(payload: &Payload, buf: &mut BytesMut) -> Result<(), EncodeError> {
    match payload {
        Payload::ZoneControl { zones } => {
            control_prefix(buf, control_sub_type::ZONE_CONTROL, 4, zones.len())?;
            for zone in zones {
                zone_control_entry(zone, buf)?;
            }
        }
        Payload::ZoneStatus { zones } => {
            let width = if zones.is_empty() { 0 } else { 8 };
            control_prefix(buf, control_sub_type::ZONE_STATUS, width, zones.len())?;
            for zone in zones {
                zone_status_entry(zone, buf)?;
            }
        }
        Payload::AcControl { units } => {
            control_prefix(buf, control_sub_type::AC_CONTROL, 4, units.len())?;
            for unit in units {
                ac_control_entry(unit, buf)?;
            }
        }
        Payload::AcStatus { units } => {
            let width = if units.is_empty() { 0 } else { 10 };
            control_prefix(buf, control_sub_type::AC_STATUS, width, units.len())?;
            for unit in units {
                ac_status_entry(unit, buf)?;
            }
        }
        Payload::AcAbilityRequest { unit } => {
            buf.put_u16(extended_sub_type::AC_ABILITY);
            if let Some(unit) = unit {
                buf.put_u8(*unit);
            }
        }
        Payload::AcAbility { units } => {
            buf.put_u16(extended_sub_type::AC_ABILITY);
            for unit in units {
                ac_ability_record(unit, buf)?;
            }
        }
        Payload::AcErrorInfoRequest { unit } => {
            buf.put_u16(extended_sub_type::AC_ERROR_INFO);
            buf.put_u8(*unit);
        }
        Payload::AcErrorInfo { unit, message } => {
            buf.put_u16(extended_sub_type::AC_ERROR_INFO);
            buf.put_u8(*unit);
            short_string(message, "ac error message", buf)?;
        }
        Payload::ZoneNameRequest { zone } => {
            buf.put_u16(extended_sub_type::ZONE_NAME);
            if let Some(zone) = zone {
                buf.put_u8(*zone);
            }
        }
        Payload::ZoneName { entries } => {
            buf.put_u16(extended_sub_type::ZONE_NAME);
            for ZoneNameEntry { zone_number, name } in entries {
                buf.put_u8(*zone_number);
                short_string(name, "zone name", buf)?;
            }
        }
        Payload::ConsoleVersionRequest => {
            buf.put_u16(extended_sub_type::CONSOLE_VERSION);
        }
        Payload::ConsoleVersion {
            has_update,
            version,
        } => {
            buf.put_u16(extended_sub_type::CONSOLE_VERSION);
            buf.put_u8(u8::from(*has_update));
            short_string(version, "console version string", buf)?;
        }
    }
    Ok(())
}

fn control_prefix(
    buf: &mut BytesMut,
    sub_type: u8,
    repeat_len: u16,
    count: usize,
) -> Result<(), EncodeError> {
    let count = u16::try_from(count).map_err(|_| EncodeError::PayloadTooLarge(count))?;
    buf.put_u8(sub_type);
    buf.put_u8(0);
    buf.put_u16(0);
    buf.put_u16(repeat_len);
    buf.put_u16(count);
    Ok(())
}

fn zone_number(value: u8, field: &'static str) -> Result<u8, EncodeError> {
    if value > 0x3F {
        return Err(EncodeError::OutOfRange {
            field,
            value: i64::from(value),
        });
    }
    Ok(value)
}

fn ac_number(value: u8) -> Result<u8, EncodeError> {
    if value > 0x0F {
        return Err(EncodeError::OutOfRange {
            field: "ac number",
            value: i64::from(value),
        });
    }
    Ok(value)
}

fn zone_control_entry(entry: &ZoneControlEntry, buf: &mut BytesMut) -> Result<(), EncodeError> {
    let value = match (entry.setting, entry.value) {
        (ZoneSettingValue::OpenPercentage, Some(v)) => {
            scale::percentage_to_wire(v, scale::PERCENTAGE_MAX, "zone open percentage")?
        }
        (ZoneSettingValue::TargetSetpoint, Some(v)) => {
            scale::setpoint_to_wire(v, "zone target setpoint")?
        }
        (setting, None) if setting.is_scaled() => {
            return Err(EncodeError::MissingValue("zone control value"));
        }
        (_, Some(v)) => scale::raw_byte(v, "zone control value")?,
        (_, None) => scale::UNUSED_BYTE,
    };

    buf.put_u8(zone_number(entry.zone_number, "zone number")?);
    buf.put_u8(place(entry.setting.to_wire(), 0, 3) | place(entry.power.to_wire(), 5, 3));
    buf.put_u8(value);
    buf.put_u8(0);
    Ok(())
}

fn zone_status_entry(entry: &ZoneStatusEntry, buf: &mut BytesMut) -> Result<(), EncodeError> {
    let open = scale::percentage_to_wire(
        entry.open_percentage,
        scale::STATUS_PERCENTAGE_MAX,
        "zone open percentage",
    )?;
    let setpoint = match entry.setpoint {
        Some(v) => scale::setpoint_to_wire(v, "zone setpoint")?,
        None => scale::UNUSED_BYTE,
    };
    let temperature = scale::temperature_to_wire(entry.temperature, "zone temperature")?;

    buf.put_u8(
        place(entry.power_state.to_wire(), 0, 2)
            | place(zone_number(entry.zone_number, "zone number")?, 2, 6),
    );
    buf.put_u8(place(entry.control_method.to_wire(), 0, 1) | place(open, 1, 7));
    buf.put_u8(setpoint);
    buf.put_u8(place(u8::from(entry.has_sensor), 0, 1));
    buf.put_u16(temperature);
    buf.put_u8(
        place(u8::from(entry.spill_active), 6, 1) | place(u8::from(entry.low_battery), 7, 1),
    );
    buf.put_u8(0);
    Ok(())
}

fn ac_control_entry(entry: &AcControlEntry, buf: &mut BytesMut) -> Result<(), EncodeError> {
    let setpoint = match entry.setpoint_control {
        SetpointControl::Change => match entry.setpoint {
            Some(v) => scale::setpoint_to_wire(v, "ac setpoint")?,
            None => return Err(EncodeError::MissingValue("ac setpoint")),
        },
        SetpointControl::Keep | SetpointControl::Invalidate => scale::UNUSED_BYTE,
    };

    buf.put_u8(place(entry.power.to_wire(), 0, 4) | place(ac_number(entry.ac_number)?, 4, 4));
    buf.put_u8(place(entry.mode.to_wire(), 0, 4) | place(entry.fan_speed.to_wire(), 4, 4));
    buf.put_u8(entry.setpoint_control.to_wire());
    buf.put_u8(setpoint);
    Ok(())
}

fn ac_status_entry(entry: &AcStatusEntry, buf: &mut BytesMut) -> Result<(), EncodeError> {
    let setpoint = scale::setpoint_to_wire(entry.setpoint, "ac setpoint")?;
    let temperature = scale::temperature_to_wire(entry.temperature, "ac temperature")?;
    let flags = 0xC0
        | place(u8::from(entry.turbo_active), 4, 1)
        | place(u8::from(entry.bypass_active), 5, 1)
        | place(u8::from(entry.spill_active), 6, 1)
        | place(u8::from(entry.timer_set), 7, 1);

    buf.put_u8(
        place(entry.power_state.to_wire(), 0, 4) | place(ac_number(entry.ac_number)?, 4, 4),
    );
    buf.put_u8(place(entry.mode.to_wire(), 0, 4) | place(entry.fan_speed.to_wire(), 4, 4));
    buf.put_u8(setpoint);
    buf.put_u8(flags);
    buf.put_u16(temperature);
    buf.put_u16(entry.error_code);
    buf.put_slice(&[0x80, 0x00]);
    Ok(())
}

fn ac_ability_record(info: &AcAbilityInfo, buf: &mut BytesMut) -> Result<(), EncodeError> {
    let name = info.name.as_bytes();
    if name.len() > AC_NAME_LEN {
        return Err(EncodeError::StringTooLong("ac name"));
    }
    let modes = &info.modes;
    let fans = &info.fan_speeds;

    buf.put_u8(info.ac_number);
    buf.put_u8(AC_ABILITY_RECORD);
    buf.put_slice(name);
    buf.put_bytes(0, AC_NAME_LEN - name.len());
    buf.put_u8(info.start_zone);
    buf.put_u8(info.zone_count);
    buf.put_u8(
        place(u8::from(modes.cool), 3, 1)
            | place(u8::from(modes.fan), 4, 1)
            | place(u8::from(modes.dry), 5, 1)
            | place(u8::from(modes.heat), 6, 1)
            | place(u8::from(modes.auto), 7, 1),
    );
    buf.put_u8(
        place(u8::from(fans.intelligent_auto), 0, 1)
            | place(u8::from(fans.turbo), 1, 1)
            | place(u8::from(fans.powerful), 2, 1)
            | place(u8::from(fans.high), 3, 1)
            | place(u8::from(fans.medium), 4, 1)
            | place(u8::from(fans.low), 5, 1)
            | place(u8::from(fans.quiet), 6, 1)
            | place(u8::from(fans.auto), 7, 1),
    );
    buf.put_u8(info.min_cool_setpoint);
    buf.put_u8(info.max_cool_setpoint);
    buf.put_u8(info.min_heat_setpoint);
    buf.put_u8(info.max_heat_setpoint);
    Ok(())
}

fn short_string(value: &str, field: &'static str, buf: &mut BytesMut) -> Result<(), EncodeError> {
    let bytes = value.as_bytes();
    let len = u8::try_from(bytes.len()).map_err(|_| EncodeError::StringTooLong(field))?;
    buf.put_u8(len);
    buf.put_slice(bytes);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{
        address, AcFanSpeedSetting, AcModeSetting, AcPowerSetting, ZoneSettingPower,
    };

    #[test]
    fn test_encode_zone_control_turn_off() {
        let packet = Packet::new(
            address::CONTROL,
            0x0F,
            Payload::ZoneControl {
                zones: vec![ZoneControlEntry::power(1, ZoneSettingPower::Off)],
            },
        );
        let bytes = encode(&packet).unwrap();
        assert_eq!(
            &bytes[..],
            &[
                0x55, 0x55, 0x55, 0xAA, 0x80, 0xB0, 0x0F, 0xC0, 0x00, 0x0C, 0x20, 0x00, 0x00,
                0x00, 0x00, 0x04, 0x00, 0x01, 0x01, 0x02, 0xFF, 0x00, 0xF0, 0xA1
            ]
        );
    }

    #[test]
    fn test_encode_status_request_uses_zero_repeat_length() {
        let packet = Packet::new(address::CONTROL, 1, Payload::AcStatus { units: vec![] });
        let bytes = encode(&packet).unwrap();
        assert_eq!(&bytes[10..18], &[0x23, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(&bytes[18..], &[0x7D, 0xB0]);
    }

    #[test]
    fn test_encode_console_version_request() {
        let packet = Packet::new(address::EXTENDED, 1, Payload::ConsoleVersionRequest);
        let bytes = encode(&packet).unwrap();
        assert_eq!(
            &bytes[..],
            &[0x55, 0x55, 0x55, 0xAA, 0x90, 0xB0, 0x01, 0x1F, 0x00, 0x02, 0xFF, 0x30, 0x9B, 0x8C]
        );
    }

    #[test]
    fn test_change_without_setpoint_fails() {
        let mut entry = AcControlEntry::keep(0).with_power(AcPowerSetting::On);
        entry.setpoint_control = SetpointControl::Change;
        let packet = Packet::new(address::CONTROL, 1, Payload::AcControl { units: vec![entry] });
        assert_eq!(encode(&packet), Err(EncodeError::MissingValue("ac setpoint")));
    }

    #[test]
    fn test_keep_setpoint_written_as_unused() {
        let entry = AcControlEntry {
            setpoint: Some(24.0),
            ..AcControlEntry::keep(1)
                .with_mode(AcModeSetting::Cool)
                .with_fan_speed(AcFanSpeedSetting::Low)
        };
        let packet = Packet::new(address::CONTROL, 1, Payload::AcControl { units: vec![entry] });
        let bytes = encode(&packet).unwrap();
        assert_eq!(&bytes[18..22], &[0x01, 0x42, 0x00, 0xFF]);
    }

    #[test]
    fn test_scaled_zone_value_requires_value() {
        let entry = ZoneControlEntry {
            value: None,
            ..ZoneControlEntry::target_setpoint(2, 21.0)
        };
        let packet = Packet::new(address::CONTROL, 1, Payload::ZoneControl { zones: vec![entry] });
        assert_eq!(
            encode(&packet),
            Err(EncodeError::MissingValue("zone control value"))
        );
    }

    #[test]
    fn test_out_of_range_zone_number() {
        let entry = ZoneControlEntry::power(64, ZoneSettingPower::On);
        let packet = Packet::new(address::CONTROL, 1, Payload::ZoneControl { zones: vec![entry] });
        assert_eq!(
            encode(&packet),
            Err(EncodeError::OutOfRange {
                field: "zone number",
                value: 64
            })
        );
    }

    #[test]
    fn test_unscaled_zone_value_cannot_collide_with_unused() {
        let entry = ZoneControlEntry {
            value: Some(255.0),
            ..ZoneControlEntry::power(2, ZoneSettingPower::On)
        };
        let packet = Packet::new(address::CONTROL, 1, Payload::ZoneControl { zones: vec![entry] });
        assert_eq!(
            encode(&packet),
            Err(EncodeError::OutOfRange {
                field: "zone control value",
                value: 255
            })
        );
    }

    #[test]
    fn test_zone_status_open_percentage_above_full() {
        // Seven bits on the wire, so consoles may report up to 127.
        let frame = [
            0x55, 0x55, 0x55, 0xAA, 0xB0, 0x80, 0x01, 0xC0, 0x00, 0x10, 0x21, 0x00, 0x00, 0x00,
            0x00, 0x08, 0x00, 0x01, 0x03, 0x7F, 0xFF, 0x00, 0x07, 0xFF, 0x00, 0x00,
        ];
        let packet = crate::codec::decode(&frame).unwrap();
        let Payload::ZoneStatus { zones } = &packet.payload else {
            panic!("expected zone status");
        };
        assert_eq!(zones[0].open_percentage, 1.27);

        let bytes = encode(&packet).unwrap();
        assert_eq!(&bytes[..frame.len()], &frame[..]);
    }

    #[test]
    fn test_ac_name_too_long() {
        let info = AcAbilityInfo {
            ac_number: 0,
            name: "A VERY LONG UNIT NAME".into(),
            start_zone: 0,
            zone_count: 4,
            modes: Default::default(),
            fan_speeds: Default::default(),
            min_cool_setpoint: 16,
            max_cool_setpoint: 31,
            min_heat_setpoint: 16,
            max_heat_setpoint: 31,
        };
        let packet = Packet::new(address::EXTENDED, 1, Payload::AcAbility { units: vec![info] });
        assert_eq!(encode(&packet), Err(EncodeError::StringTooLong("ac name")));
    }
}
