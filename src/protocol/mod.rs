//! Protocol module - wire format, typed packets and stream framing.
//!
//! - Frame header layout, addresses and message type constants
//! - Enumerated sub-byte fields with their wire mappings
//! - [`Packet`] and the [`Payload`] variants
//! - [`FrameBuffer`] for splitting a byte stream into packets

mod crc;
mod fields;
mod frame_buffer;
mod packet;
mod wire_format;

pub use crc::checksum;
pub use fields::{
    AcFanSpeed, AcFanSpeedSetting, AcMode, AcModeSetting, AcPowerSetting, AcPowerState,
    ControlMethod, SetpointControl, ZonePowerState, ZoneSettingPower, ZoneSettingValue,
};
pub use frame_buffer::FrameBuffer;
pub use packet::{
    AcAbilityInfo, AcControlEntry, AcStatusEntry, FanSpeedSupport, ModeSupport, Packet, Payload,
    ZoneControlEntry, ZoneNameEntry, ZoneStatusEntry,
};
pub use wire_format::{
    address, control_sub_type, extended_sub_type, read_payload_length, Header, MessageType,
    CONTROL_PREFIX_SIZE, CRC_SIZE, DEFAULT_PORT, EXTENDED_PREFIX_SIZE, HEADER_SIZE, LENGTH_OFFSET,
    MAGIC, MIN_FRAME_SIZE,
};
