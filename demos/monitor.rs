//! Monitor - print everything an AirTouch 5 console reports.
//!
//! This example demonstrates:
//! - Building a client that keeps retrying until the console answers
//! - Polling zone and AC status whenever a session comes up
//! - Consuming the event stream
//!
//! # Running
//!
//! ```text
//! RUST_LOG=airtouch5=debug cargo run --example monitor -- 192.168.1.20
//! ```

use airtouch5::{Client, Event};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let host = std::env::args()
        .nth(1)
        .ok_or("usage: monitor <console-host>")?;

    let client = Client::builder(host).fail_fast(false).connect().await?;
    let events = client.events();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.next() => match event {
                Some(Event::Connected) => {
                    println!("connected");
                    let factory = client.factory();
                    client.send_packet(&factory.zone_name_request(None)).await?;
                    client.send_packet(&factory.zone_status_request()).await?;
                    client.send_packet(&factory.ac_status_request()).await?;
                }
                Some(Event::Disconnected) => println!("disconnected"),
                Some(Event::Packet(packet)) => {
                    println!("{}", serde_json::to_string(&packet)?);
                }
                None => break,
            },
        }
    }

    client.disconnect().await;
    Ok(())
}
