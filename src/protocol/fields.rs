//! Enumerated sub-byte fields and their wire mappings.
//!
//! Each enum maps a wire integer to a domain meaning. Unrecognised wire
//! values never fail: they fall back to the enum's designated "keep" or
//! "not available" member.

use serde::{Deserialize, Serialize};

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident (fallback $fallback:ident) {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Map a wire value, falling back for anything unrecognised.
            pub fn from_wire(value: u8) -> Self {
                match value {
                    $( $value => Self::$variant, )+
                    _ => Self::$fallback,
                }
            }

            /// Wire value for this member.
            pub fn to_wire(self) -> u8 {
                match self {
                    $( Self::$variant => $value, )+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$fallback
            }
        }
    };
}

wire_enum! {
    /// What a zone control entry does to the zone's value (3 bits).
    pub enum ZoneSettingValue (fallback Keep) {
        Keep = 0b000,
        Decrease = 0b010,
        Increase = 0b011,
        /// Value byte is open percentage, `raw / 100`.
        OpenPercentage = 0b100,
        /// Value byte is a setpoint, `(raw + 100) / 10`.
        TargetSetpoint = 0b101,
    }
}

wire_enum! {
    /// Power directive for a zone (3 bits).
    pub enum ZoneSettingPower (fallback Keep) {
        Keep = 0b000,
        Toggle = 0b001,
        Off = 0b010,
        On = 0b011,
        Turbo = 0b101,
    }
}

wire_enum! {
    /// Reported zone power state (2 bits).
    pub enum ZonePowerState (fallback NotAvailable) {
        Off = 0b00,
        On = 0b01,
        NotAvailable = 0b10,
        Turbo = 0b11,
    }
}

wire_enum! {
    /// How a zone is being controlled (1 bit).
    pub enum ControlMethod (fallback Percentage) {
        Percentage = 0,
        Temperature = 1,
    }
}

wire_enum! {
    /// Power directive for an AC unit (4 bits).
    pub enum AcPowerSetting (fallback Keep) {
        Keep = 0b0000,
        Toggle = 0b0001,
        Off = 0b0010,
        On = 0b0011,
        Away = 0b0100,
        Sleep = 0b0101,
    }
}

wire_enum! {
    /// Mode directive for an AC unit (4 bits).
    pub enum AcModeSetting (fallback Keep) {
        Auto = 0b0000,
        Heat = 0b0001,
        Dry = 0b0010,
        Fan = 0b0011,
        Cool = 0b0100,
        Keep = 0b1111,
    }
}

wire_enum! {
    /// Fan speed directive for an AC unit (4 bits).
    pub enum AcFanSpeedSetting (fallback Keep) {
        Auto = 0b0000,
        Quiet = 0b0001,
        Low = 0b0010,
        Medium = 0b0011,
        High = 0b0100,
        Powerful = 0b0101,
        Turbo = 0b0110,
        IntelligentAuto = 0b1000,
        Keep = 0b1111,
    }
}

wire_enum! {
    /// Whether an AC control entry changes the setpoint (full byte).
    pub enum SetpointControl (fallback Invalidate) {
        Keep = 0x00,
        Change = 0x40,
        Invalidate = 0xFF,
    }
}

wire_enum! {
    /// Reported AC power state (4 bits).
    pub enum AcPowerState (fallback NotAvailable) {
        Off = 0b0000,
        On = 0b0001,
        AwayOff = 0b0010,
        AwayOn = 0b0011,
        Sleep = 0b0101,
        NotAvailable = 0b1111,
    }
}

wire_enum! {
    /// Reported AC mode (4 bits).
    pub enum AcMode (fallback NotAvailable) {
        Auto = 0b0000,
        Heat = 0b0001,
        Dry = 0b0010,
        Fan = 0b0011,
        Cool = 0b0100,
        AutoHeat = 0b1000,
        AutoCool = 0b1001,
        NotAvailable = 0b1111,
    }
}

wire_enum! {
    /// Reported AC fan speed (4 bits).
    pub enum AcFanSpeed (fallback NotAvailable) {
        Auto = 0b0000,
        Quiet = 0b0001,
        Low = 0b0010,
        Medium = 0b0011,
        High = 0b0100,
        Powerful = 0b0101,
        Turbo = 0b0110,
        IntelligentAuto1 = 0b1001,
        IntelligentAuto2 = 0b1010,
        IntelligentAuto3 = 0b1011,
        IntelligentAuto4 = 0b1100,
        IntelligentAuto5 = 0b1101,
        IntelligentAuto6 = 0b1110,
        NotAvailable = 0b1111,
    }
}

impl SetpointControl {
    /// Whether the accompanying setpoint byte carries a real value.
    #[inline]
    pub fn uses_setpoint(self) -> bool {
        self == Self::Change
    }
}

impl ZoneSettingValue {
    /// Whether the accompanying value byte is scaled.
    #[inline]
    pub fn is_scaled(self) -> bool {
        matches!(self, Self::OpenPercentage | Self::TargetSetpoint)
    }
}
