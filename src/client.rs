//! Client builder and connection supervisor.
//!
//! The [`ClientBuilder`] provides a fluent API for configuring the client.
//! [`ClientBuilder::connect`] spawns a supervisor task that owns the socket
//! and cycles through the session lifecycle:
//! 1. Dial the console (`Connecting`)
//! 2. Send a console version request and wait for the reply (`Verifying`)
//! 3. Read frames and post them as events (`Connected`)
//! 4. On any failure, post `Disconnected`, wait the reconnect delay, retry
//!
//! # Example
//!
//! ```no_run
//! use airtouch5::{Client, Event};
//!
//! #[tokio::main]
//! async fn main() -> airtouch5::Result<()> {
//!     let client = Client::builder("192.168.1.20").connect().await?;
//!     client.send(client.factory().zone_status_request().payload).await?;
//!
//!     let events = client.events();
//!     while let Some(event) = events.next().await {
//!         if let Event::Packet(packet) = event {
//!             println!("{:?}", packet.payload);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::codec;
use crate::config::ClientConfig;
use crate::error::{Airtouch5Error, Result};
use crate::factory::PacketFactory;
use crate::protocol::{FrameBuffer, Packet, Payload, DEFAULT_PORT};
use crate::writer::{spawn_writer_task, WriterHandle};

/// Opens the byte stream to the console.
///
/// [`TcpConnector`] is the production implementation; anything that yields
/// an `AsyncRead + AsyncWrite` stream can stand in for it.
pub trait Connector: Send + Sync + 'static {
    type Stream: AsyncRead + AsyncWrite + Send + Unpin + 'static;

    /// Open one new stream.
    fn connect(&self) -> impl Future<Output = io::Result<Self::Stream>> + Send;
}

/// Dials the console over TCP.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    host: String,
    port: u16,
}

impl TcpConnector {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl Connector for TcpConnector {
    type Stream = TcpStream;

    fn connect(&self) -> impl Future<Output = io::Result<TcpStream>> + Send {
        let addr = (self.host.clone(), self.port);
        async move {
            let stream = TcpStream::connect(addr).await?;
            stream.set_nodelay(true)?;
            Ok(stream)
        }
    }
}

/// Something that happened on the connection.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Session verified and ready for `send`.
    Connected,
    /// A verified session was lost. A reconnect is already scheduled.
    Disconnected,
    /// A packet arrived from the console.
    Packet(Packet),
}

/// Where the supervisor is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Idle,
    Connecting,
    Verifying,
    Connected,
    /// Waiting out the reconnect delay.
    Disconnected,
    /// Terminal.
    Shutdown,
}

/// Builder for configuring and connecting a [`Client`].
pub struct ClientBuilder<C = TcpConnector> {
    connector: C,
    config: ClientConfig,
}

impl ClientBuilder<TcpConnector> {
    /// Connect to `host` on the default port.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            connector: TcpConnector::new(host, DEFAULT_PORT),
            config: ClientConfig::default(),
        }
    }

    /// Set the console TCP port.
    pub fn port(mut self, port: u16) -> Self {
        self.connector.port = port;
        self
    }
}

impl<C: Connector> ClientBuilder<C> {
    /// Dial through a custom connector.
    pub fn with_connector(connector: C) -> Self {
        Self {
            connector,
            config: ClientConfig::default(),
        }
    }

    /// Set the dial timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set how long to wait for the console version reply.
    pub fn verify_timeout(mut self, timeout: Duration) -> Self {
        self.config.verify_timeout = timeout;
        self
    }

    /// Set the delay between reconnection attempts.
    pub fn reconnect_delay(mut self, delay: Duration) -> Self {
        self.config.reconnect_delay = delay;
        self
    }

    /// Set the socket read size.
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.config.read_buffer_size = size;
        self
    }

    /// Set how many frames may queue for the writer task.
    pub fn writer_channel_capacity(mut self, capacity: usize) -> Self {
        self.config.writer_channel_capacity = capacity;
        self
    }

    /// Return the first attempt's failure from `connect()` (default), or
    /// start retrying straight away when `false`.
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.config.fail_fast = fail_fast;
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Start the supervisor.
    ///
    /// With `fail_fast` this resolves once the first session is verified, or
    /// fails with that attempt's error. Otherwise it resolves immediately and
    /// progress is reported only through [`Client::events`].
    pub async fn connect(self) -> Result<Client> {
        let fail_fast = self.config.fail_fast;
        let (state, _) = watch::channel(SessionState::Idle);
        let (writer, _) = watch::channel(None);
        let (shutdown, shutdown_rx) = watch::channel(false);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (first_tx, first_rx) = oneshot::channel();

        let shared = Arc::new(Shared {
            state,
            writer,
            shutdown,
            factory: PacketFactory::new(),
        });

        let supervisor = Supervisor {
            connector: self.connector,
            config: self.config,
            shared: shared.clone(),
            events: events_tx,
            shutdown: shutdown_rx,
            first_attempt: fail_fast.then_some(first_tx),
        };
        let task = tokio::spawn(supervisor.run());

        if fail_fast {
            match first_rx.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    let _ = task.await;
                    return Err(e);
                }
                Err(_) => return Err(Airtouch5Error::ConnectionClosed),
            }
        }

        Ok(Client {
            shared,
            events: Events {
                rx: Arc::new(Mutex::new(events_rx)),
            },
            supervisor: Mutex::new(Some(task)),
        })
    }
}

/// State shared between the [`Client`] and its supervisor task.
struct Shared {
    state: watch::Sender<SessionState>,
    /// Writer for the live session, if any.
    writer: watch::Sender<Option<WriterHandle>>,
    shutdown: watch::Sender<bool>,
    factory: PacketFactory,
}

/// Ordered stream of connection events.
///
/// Clones share one queue: each event is delivered to exactly one `next()`
/// call. Ends (`None`) after the client shuts down and the queue drains.
#[derive(Clone)]
pub struct Events {
    rx: Arc<Mutex<mpsc::UnboundedReceiver<Event>>>,
}

impl Events {
    /// Wait for the next event.
    pub async fn next(&self) -> Option<Event> {
        self.rx.lock().await.recv().await
    }

    /// Take an already queued event without waiting.
    ///
    /// Returns `None` while another clone is parked in [`Events::next`],
    /// since that clone holds the queue until its event arrives.
    pub fn try_next(&self) -> Option<Event> {
        self.rx.try_lock().ok()?.try_recv().ok()
    }
}

/// A running AirTouch 5 client.
///
/// Dropping the client shuts the supervisor down.
pub struct Client {
    shared: Arc<Shared>,
    events: Events,
    supervisor: Mutex<Option<JoinHandle<()>>>,
}

impl Client {
    /// Create a new client builder for `host`.
    pub fn builder(host: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(host)
    }

    /// The event queue.
    pub fn events(&self) -> Events {
        self.events.clone()
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        *self.shared.state.borrow()
    }

    /// Watch session state transitions.
    pub fn state_changes(&self) -> watch::Receiver<SessionState> {
        self.shared.state.subscribe()
    }

    /// Whether a verified session is live.
    pub fn is_connected(&self) -> bool {
        self.shared.writer.borrow().is_some()
    }

    /// Request builder sharing this client's message id counter.
    pub fn factory(&self) -> &PacketFactory {
        &self.shared.factory
    }

    /// Encode and write `payload` on the live session.
    ///
    /// Fails with [`Airtouch5Error::NotConnected`] when no session is live.
    /// A write failure is returned here and also ends the session, which
    /// then reconnects as usual.
    pub async fn send(&self, payload: Payload) -> Result<()> {
        let packet = self.shared.factory.packet(payload);
        self.send_packet(&packet).await
    }

    /// Write a packet built elsewhere, e.g. by [`Client::factory`].
    pub async fn send_packet(&self, packet: &Packet) -> Result<()> {
        if *self.shared.shutdown.borrow() {
            return Err(Airtouch5Error::Shutdown);
        }
        let frame = codec::encode(packet)?;
        let writer = self
            .shared
            .writer
            .borrow()
            .clone()
            .ok_or(Airtouch5Error::NotConnected)?;

        debug!(
            packet = packet.payload.name(),
            id = packet.message_id,
            "sending packet"
        );
        writer.send(frame).await.map_err(|e| {
            error!(error = %e, "write failed");
            e
        })
    }

    /// Shut down: close the socket and stop reconnecting. Idempotent.
    ///
    /// Interrupts a pending dial, verification wait, read or backoff.
    pub async fn disconnect(&self) {
        self.shared.shutdown.send_replace(true);
        if let Some(task) = self.supervisor.lock().await.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "supervisor task ended abnormally");
            }
        }
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.shared.shutdown.send_replace(true);
    }
}

/// How a session ended.
enum SessionEnd {
    Shutdown,
    Lost {
        /// Whether `Connected` was posted for this session.
        connected: bool,
        error: Airtouch5Error,
    },
}

impl SessionEnd {
    fn lost(connected: bool, error: impl Into<Airtouch5Error>) -> Self {
        SessionEnd::Lost {
            connected,
            error: error.into(),
        }
    }
}

/// Owns the connection and drives the reconnect loop.
struct Supervisor<C> {
    connector: C,
    config: ClientConfig,
    shared: Arc<Shared>,
    events: mpsc::UnboundedSender<Event>,
    shutdown: watch::Receiver<bool>,
    /// Reports the first attempt's outcome to `connect()` under `fail_fast`.
    first_attempt: Option<oneshot::Sender<Result<()>>>,
}

impl<C: Connector> Supervisor<C> {
    async fn run(mut self) {
        loop {
            match self.session().await {
                SessionEnd::Shutdown => break,
                SessionEnd::Lost { connected, error } => {
                    if let Some(first) = self.first_attempt.take() {
                        warn!(error = %error, "initial connection failed");
                        let _ = first.send(Err(error));
                        break;
                    }
                    if connected {
                        self.emit(Event::Disconnected);
                    }
                    self.set_state(SessionState::Disconnected);
                    warn!(
                        error = %error,
                        delay = ?self.config.reconnect_delay,
                        "connection lost, retrying"
                    );

                    let delay = self.config.reconnect_delay;
                    tokio::select! {
                        _ = cancelled(&mut self.shutdown) => break,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }

        self.shared.writer.send_replace(None);
        self.set_state(SessionState::Shutdown);
        debug!("supervisor stopped");
    }

    /// One dial, verify, read cycle. The socket is closed on return.
    async fn session(&mut self) -> SessionEnd {
        self.set_state(SessionState::Connecting);
        let connect_timeout = self.config.connect_timeout;
        let dial = tokio::select! {
            _ = cancelled(&mut self.shutdown) => return SessionEnd::Shutdown,
            dial = timeout(connect_timeout, self.connector.connect()) => dial,
        };
        let stream = match dial {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return SessionEnd::lost(false, e),
            Err(_) => return SessionEnd::lost(false, Airtouch5Error::ConnectTimeout),
        };

        let (mut reader, write_half) = tokio::io::split(stream);
        let (writer, writer_task) =
            spawn_writer_task(write_half, self.config.writer_channel_capacity);
        let mut writer_task = Some(writer_task);
        let mut framer = FrameBuffer::with_capacity(self.config.read_buffer_size);
        let mut buf = vec![0u8; self.config.read_buffer_size.max(1)];

        let end = self
            .drive(&mut reader, writer, &mut writer_task, &mut framer, &mut buf)
            .await;

        self.shared.writer.send_replace(None);
        if let Some(task) = writer_task.take() {
            task.abort();
            let _ = task.await;
        }
        end
    }

    async fn drive<R>(
        &mut self,
        reader: &mut R,
        writer: WriterHandle,
        writer_task: &mut Option<JoinHandle<io::Result<()>>>,
        framer: &mut FrameBuffer,
        buf: &mut [u8],
    ) -> SessionEnd
    where
        R: AsyncRead + Unpin,
    {
        self.set_state(SessionState::Verifying);
        let request = match codec::encode(&self.shared.factory.console_version_request()) {
            Ok(frame) => frame,
            Err(e) => return SessionEnd::lost(false, e),
        };

        let verify_timeout = self.config.verify_timeout;
        let verification = verify(reader, framer, buf, &writer, request);
        let verified = tokio::select! {
            _ = cancelled(&mut self.shutdown) => return SessionEnd::Shutdown,
            result = timeout(verify_timeout, verification) => result,
        };
        let (version, leftover) = match verified {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => return SessionEnd::lost(false, e),
            Err(_) => {
                return SessionEnd::lost(
                    false,
                    Airtouch5Error::VerificationFailed(format!(
                        "no console version reply within {:?}",
                        verify_timeout
                    )),
                )
            }
        };

        info!(version = %version, "console verified, connected");
        let writer_closed = writer.clone();
        self.shared.writer.send_replace(Some(writer));
        self.set_state(SessionState::Connected);
        self.emit(Event::Connected);
        if let Some(first) = self.first_attempt.take() {
            let _ = first.send(Ok(()));
        }
        for packet in leftover {
            self.emit(Event::Packet(packet));
        }

        let error = tokio::select! {
            _ = cancelled(&mut self.shutdown) => return SessionEnd::Shutdown,
            e = read_loop(reader, framer, buf, &self.events) => e,
            _ = writer_closed.closed() => match writer_task.take() {
                Some(task) => match task.await {
                    Ok(Err(e)) => Airtouch5Error::Io(e),
                    _ => Airtouch5Error::ConnectionClosed,
                },
                None => Airtouch5Error::ConnectionClosed,
            },
        };
        SessionEnd::lost(true, error)
    }

    fn emit(&self, event: Event) {
        // Receiver lives as long as the Client; after that nobody is listening.
        let _ = self.events.send(event);
    }

    fn set_state(&self, state: SessionState) {
        self.shared.state.send_replace(state);
    }
}

/// Resolve once shutdown has been requested.
async fn cancelled(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

/// Send the console version request and read until the reply arrives.
///
/// Packets ahead of the reply are discarded. Packets decoded from the same
/// read after the reply are returned for delivery.
async fn verify<R>(
    reader: &mut R,
    framer: &mut FrameBuffer,
    buf: &mut [u8],
    writer: &WriterHandle,
    request: Bytes,
) -> Result<(String, Vec<Packet>)>
where
    R: AsyncRead + Unpin,
{
    writer.send(request).await?;
    loop {
        let n = reader.read(buf).await?;
        if n == 0 {
            return Err(Airtouch5Error::ConnectionClosed);
        }

        let mut packets = framer.push(&buf[..n]).into_iter();
        while let Some(packet) = packets.next() {
            if let Payload::ConsoleVersion { version, .. } = &packet.payload {
                return Ok((version.clone(), packets.collect()));
            }
            debug!(
                packet = packet.payload.name(),
                "discarding packet before verification"
            );
        }
    }
}

/// Read frames and post packets until the socket fails or closes.
async fn read_loop<R>(
    reader: &mut R,
    framer: &mut FrameBuffer,
    buf: &mut [u8],
    events: &mpsc::UnboundedSender<Event>,
) -> Airtouch5Error
where
    R: AsyncRead + Unpin,
{
    loop {
        let n = match reader.read(buf).await {
            Ok(0) => return Airtouch5Error::ConnectionClosed,
            Ok(n) => n,
            Err(e) => return Airtouch5Error::Io(e),
        };

        for packet in framer.push(&buf[..n]) {
            debug!(
                packet = packet.payload.name(),
                id = packet.message_id,
                "received packet"
            );
            let _ = events.send(Event::Packet(packet));
        }
    }
}
