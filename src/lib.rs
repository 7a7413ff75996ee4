//! # airtouch5
//!
//! Async client for the AirTouch 5 HVAC controller's binary TCP protocol.
//!
//! ## Layers
//!
//! - **Protocol**: frame layout, field enums and the typed [`Packet`] model
//! - **Codec**: bit-exact [`decode`](codec::decode) / [`encode`](codec::encode)
//! - **Framer**: [`FrameBuffer`] turns a byte stream into packets, skipping
//!   corrupt frames
//! - **Supervisor**: [`Client`] keeps a verified session alive and reports
//!   [`Event`]s
//!
//! ## Example
//!
//! ```no_run
//! use airtouch5::protocol::{AcControlEntry, AcPowerSetting, Payload};
//! use airtouch5::{Client, Event};
//!
//! #[tokio::main]
//! async fn main() -> airtouch5::Result<()> {
//!     let client = Client::builder("192.168.1.20").connect().await?;
//!
//!     let off = AcControlEntry::keep(0).with_power(AcPowerSetting::Off);
//!     client.send(Payload::AcControl { units: vec![off] }).await?;
//!
//!     let events = client.events();
//!     while let Some(event) = events.next().await {
//!         match event {
//!             Event::Packet(packet) => println!("{}", packet.payload.name()),
//!             other => println!("{:?}", other),
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod factory;
pub mod protocol;

mod client;
mod writer;

pub use client::{
    Client, ClientBuilder, Connector, Event, Events, SessionState, TcpConnector,
};
pub use config::ClientConfig;
pub use error::{Airtouch5Error, DecodeError, EncodeError, Result};
pub use factory::PacketFactory;
pub use protocol::{FrameBuffer, Packet, Payload};
