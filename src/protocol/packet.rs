//! Typed protocol messages.
//!
//! A [`Packet`] is an immutable value: address, message id and one
//! [`Payload`] variant. All numeric fields hold domain values (degrees,
//! fractions); wire sentinels are already mapped to `None` or to a
//! "keep"/"not available" enum member.

use serde::{Deserialize, Serialize};

use super::fields::{
    AcFanSpeed, AcFanSpeedSetting, AcMode, AcModeSetting, AcPowerSetting, AcPowerState,
    ControlMethod, SetpointControl, ZonePowerState, ZoneSettingPower, ZoneSettingValue,
};
use super::wire_format::MessageType;

/// One complete protocol message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    /// Logical peer address (see [`address`](super::address)).
    pub address: u16,
    /// Correlation tag, not interpreted by the protocol.
    pub message_id: u8,
    /// Message body.
    pub payload: Payload,
}

impl Packet {
    /// Create a new packet.
    pub fn new(address: u16, message_id: u8, payload: Payload) -> Self {
        Self {
            address,
            message_id,
            payload,
        }
    }
}

/// Message body. Exactly one variant per message.
///
/// Empty `ZoneStatus`/`AcStatus` lists double as status requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    ZoneControl { zones: Vec<ZoneControlEntry> },
    ZoneStatus { zones: Vec<ZoneStatusEntry> },
    AcControl { units: Vec<AcControlEntry> },
    AcStatus { units: Vec<AcStatusEntry> },
    /// `None` asks for every unit.
    AcAbilityRequest { unit: Option<u8> },
    AcAbility { units: Vec<AcAbilityInfo> },
    AcErrorInfoRequest { unit: u8 },
    AcErrorInfo { unit: u8, message: String },
    /// `None` asks for every zone.
    ZoneNameRequest { zone: Option<u8> },
    ZoneName { entries: Vec<ZoneNameEntry> },
    ConsoleVersionRequest,
    ConsoleVersion { has_update: bool, version: String },
}

impl Payload {
    /// Message family this payload travels in.
    pub fn message_type(&self) -> MessageType {
        match self {
            Payload::ZoneControl { .. }
            | Payload::ZoneStatus { .. }
            | Payload::AcControl { .. }
            | Payload::AcStatus { .. } => MessageType::ControlStatus,
            Payload::AcAbilityRequest { .. }
            | Payload::AcAbility { .. }
            | Payload::AcErrorInfoRequest { .. }
            | Payload::AcErrorInfo { .. }
            | Payload::ZoneNameRequest { .. }
            | Payload::ZoneName { .. }
            | Payload::ConsoleVersionRequest
            | Payload::ConsoleVersion { .. } => MessageType::Extended,
        }
    }

    /// Whether this payload asks the console for data.
    pub fn is_request(&self) -> bool {
        match self {
            Payload::ZoneStatus { zones } => zones.is_empty(),
            Payload::AcStatus { units } => units.is_empty(),
            Payload::AcAbilityRequest { .. }
            | Payload::AcErrorInfoRequest { .. }
            | Payload::ZoneNameRequest { .. }
            | Payload::ConsoleVersionRequest => true,
            _ => false,
        }
    }

    /// Short human-readable name, used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Payload::ZoneControl { .. } => "zone-control",
            Payload::ZoneStatus { .. } => "zone-status",
            Payload::AcControl { .. } => "ac-control",
            Payload::AcStatus { .. } => "ac-status",
            Payload::AcAbilityRequest { .. } => "ac-ability-request",
            Payload::AcAbility { .. } => "ac-ability",
            Payload::AcErrorInfoRequest { .. } => "ac-error-info-request",
            Payload::AcErrorInfo { .. } => "ac-error-info",
            Payload::ZoneNameRequest { .. } => "zone-name-request",
            Payload::ZoneName { .. } => "zone-name",
            Payload::ConsoleVersionRequest => "console-version-request",
            Payload::ConsoleVersion { .. } => "console-version",
        }
    }
}

/// One zone in a zone control message (4 bytes on the wire).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneControlEntry {
    /// Zone number (6 bits).
    pub zone_number: u8,
    pub setting: ZoneSettingValue,
    pub power: ZoneSettingPower,
    /// Fraction (0.0-1.0) for [`ZoneSettingValue::OpenPercentage`], degrees for
    /// [`ZoneSettingValue::TargetSetpoint`], the raw byte otherwise.
    /// `None` for an unused (0xFF) value byte.
    pub value: Option<f64>,
}

impl ZoneControlEntry {
    /// Change only the zone's power.
    pub fn power(zone_number: u8, power: ZoneSettingPower) -> Self {
        Self {
            zone_number,
            setting: ZoneSettingValue::Keep,
            power,
            value: None,
        }
    }

    /// Set the damper opening, `fraction` in 0.0-1.0.
    pub fn open_percentage(zone_number: u8, fraction: f64) -> Self {
        Self {
            zone_number,
            setting: ZoneSettingValue::OpenPercentage,
            power: ZoneSettingPower::Keep,
            value: Some(fraction),
        }
    }

    /// Set the zone's target temperature in degrees.
    pub fn target_setpoint(zone_number: u8, degrees: f64) -> Self {
        Self {
            zone_number,
            setting: ZoneSettingValue::TargetSetpoint,
            power: ZoneSettingPower::Keep,
            value: Some(degrees),
        }
    }
}

/// One zone in a zone status message (8 bytes on the wire).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneStatusEntry {
    pub power_state: ZonePowerState,
    pub zone_number: u8,
    pub control_method: ControlMethod,
    /// 0.0-1.0.
    pub open_percentage: f64,
    /// `None` when the console reports no setpoint.
    pub setpoint: Option<f64>,
    pub has_sensor: bool,
    /// `None` when there is no valid reading.
    pub temperature: Option<f64>,
    pub spill_active: bool,
    pub low_battery: bool,
}

/// One AC unit in an AC control message (4 bytes on the wire).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcControlEntry {
    pub power: AcPowerSetting,
    /// AC number (4 bits).
    pub ac_number: u8,
    pub mode: AcModeSetting,
    pub fan_speed: AcFanSpeedSetting,
    pub setpoint_control: SetpointControl,
    /// Setpoint byte decoded as degrees. Only meaningful when
    /// `setpoint_control` is [`SetpointControl::Change`].
    pub setpoint: Option<f64>,
}

impl AcControlEntry {
    /// An entry that leaves every setting of `ac_number` unchanged.
    pub fn keep(ac_number: u8) -> Self {
        Self {
            power: AcPowerSetting::Keep,
            ac_number,
            mode: AcModeSetting::Keep,
            fan_speed: AcFanSpeedSetting::Keep,
            setpoint_control: SetpointControl::Keep,
            setpoint: None,
        }
    }

    pub fn with_power(mut self, power: AcPowerSetting) -> Self {
        self.power = power;
        self
    }

    pub fn with_mode(mut self, mode: AcModeSetting) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_fan_speed(mut self, fan_speed: AcFanSpeedSetting) -> Self {
        self.fan_speed = fan_speed;
        self
    }

    /// Request a new setpoint in degrees.
    pub fn with_setpoint(mut self, degrees: f64) -> Self {
        self.setpoint_control = SetpointControl::Change;
        self.setpoint = Some(degrees);
        self
    }

    /// The setpoint this entry actually requests, if any.
    pub fn effective_setpoint(&self) -> Option<f64> {
        if self.setpoint_control.uses_setpoint() {
            self.setpoint
        } else {
            None
        }
    }
}

/// One AC unit in an AC status message (10 bytes, newer firmware sends 14).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcStatusEntry {
    pub power_state: AcPowerState,
    pub ac_number: u8,
    pub mode: AcMode,
    pub fan_speed: AcFanSpeed,
    /// Degrees.
    pub setpoint: f64,
    pub turbo_active: bool,
    pub bypass_active: bool,
    pub spill_active: bool,
    pub timer_set: bool,
    /// `None` when there is no valid reading.
    pub temperature: Option<f64>,
    /// Vendor error code, 0 when healthy.
    pub error_code: u16,
}

/// HVAC modes an AC unit supports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeSupport {
    pub cool: bool,
    pub fan: bool,
    pub dry: bool,
    pub heat: bool,
    pub auto: bool,
}

/// Fan speeds an AC unit supports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanSpeedSupport {
    pub intelligent_auto: bool,
    pub turbo: bool,
    pub powerful: bool,
    pub high: bool,
    pub medium: bool,
    pub low: bool,
    pub quiet: bool,
    pub auto: bool,
}

/// Capabilities of one AC unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcAbilityInfo {
    pub ac_number: u8,
    /// Up to 16 bytes on the wire, NUL padded.
    pub name: String,
    pub start_zone: u8,
    pub zone_count: u8,
    pub modes: ModeSupport,
    pub fan_speeds: FanSpeedSupport,
    /// Whole degrees.
    pub min_cool_setpoint: u8,
    pub max_cool_setpoint: u8,
    pub min_heat_setpoint: u8,
    pub max_heat_setpoint: u8,
}

/// Name of one zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneNameEntry {
    pub zone_number: u8,
    pub name: String,
}

impl ZoneNameEntry {
    pub fn new(zone_number: u8, name: impl Into<String>) -> Self {
        Self {
            zone_number,
            name: name.into(),
        }
    }
}
