//! Request packet construction.
//!
//! [`PacketFactory`] picks the client-side address for each payload and
//! stamps a message id from a per-instance counter.
//!
//! # Example
//!
//! ```
//! use airtouch5::factory::PacketFactory;
//! use airtouch5::protocol::address;
//!
//! let factory = PacketFactory::new();
//! let first = factory.console_version_request();
//! let second = factory.zone_status_request();
//!
//! assert_eq!(first.address, address::EXTENDED);
//! assert_eq!(first.message_id, 1);
//! assert_eq!(second.address, address::CONTROL);
//! assert_eq!(second.message_id, 2);
//! ```

use std::sync::atomic::{AtomicU8, Ordering};

use crate::protocol::{
    address, AcControlEntry, MessageType, Packet, Payload, ZoneControlEntry,
};

/// First message id handed out.
pub const FIRST_MESSAGE_ID: u8 = 1;

/// Builds outbound packets with addresses and message ids filled in.
///
/// The id counter wraps modulo 256 and is safe to share between tasks.
#[derive(Debug)]
pub struct PacketFactory {
    next_id: AtomicU8,
}

impl PacketFactory {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU8::new(FIRST_MESSAGE_ID),
        }
    }

    /// Wrap any payload, choosing the address from its message type.
    pub fn packet(&self, payload: Payload) -> Packet {
        let address = match payload.message_type() {
            MessageType::ControlStatus => address::CONTROL,
            MessageType::Extended => address::EXTENDED,
        };
        // fetch_add wraps on overflow for atomics.
        let message_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        Packet::new(address, message_id, payload)
    }

    pub fn zone_control(&self, zones: Vec<ZoneControlEntry>) -> Packet {
        self.packet(Payload::ZoneControl { zones })
    }

    pub fn zone_status_request(&self) -> Packet {
        self.packet(Payload::ZoneStatus { zones: Vec::new() })
    }

    pub fn ac_control(&self, units: Vec<AcControlEntry>) -> Packet {
        self.packet(Payload::AcControl { units })
    }

    pub fn ac_status_request(&self) -> Packet {
        self.packet(Payload::AcStatus { units: Vec::new() })
    }

    /// `None` asks for every AC unit.
    pub fn ac_ability_request(&self, unit: Option<u8>) -> Packet {
        self.packet(Payload::AcAbilityRequest { unit })
    }

    pub fn ac_error_info_request(&self, unit: u8) -> Packet {
        self.packet(Payload::AcErrorInfoRequest { unit })
    }

    /// `None` asks for every zone.
    pub fn zone_name_request(&self, zone: Option<u8>) -> Packet {
        self.packet(Payload::ZoneNameRequest { zone })
    }

    pub fn console_version_request(&self) -> Packet {
        self.packet(Payload::ConsoleVersionRequest)
    }
}

impl Default for PacketFactory {
    fn default() -> Self {
        Self::new()
    }
}
