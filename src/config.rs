//! Client configuration.

use std::time::Duration;

use crate::writer::DEFAULT_CHANNEL_CAPACITY;

/// Default time allowed for the TCP dial.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default time allowed for the console version reply.
pub const DEFAULT_VERIFY_TIMEOUT: Duration = Duration::from_secs(5);

/// Default pause between a lost session and the next attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Default socket read size.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024;

/// Settings for a [`Client`](crate::Client).
///
/// Where to dial is the [`Connector`](crate::Connector)'s concern; see
/// [`ClientBuilder::port`](crate::ClientBuilder::port) for TCP.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Dial timeout.
    pub connect_timeout: Duration,
    /// How long to wait for the console version reply after dialing.
    pub verify_timeout: Duration,
    /// Fixed delay between reconnection attempts.
    pub reconnect_delay: Duration,
    /// Bytes requested per socket read.
    pub read_buffer_size: usize,
    /// Frames that may queue for the writer task.
    pub writer_channel_capacity: usize,
    /// When set, a failed first attempt is returned from `connect()` instead
    /// of entering the retry loop.
    pub fail_fast: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            verify_timeout: DEFAULT_VERIFY_TIMEOUT,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            writer_channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            fail_fast: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.read_buffer_size, 1024);
        assert_eq!(config.writer_channel_capacity, 64);
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.verify_timeout, Duration::from_secs(5));
        assert_eq!(config.reconnect_delay, Duration::from_secs(5));
        assert!(config.fail_fast);
    }
}
