//! Dedicated writer task for the controller socket.
//!
//! Frames reach the socket through an mpsc channel drained by a single task,
//! so concurrent `send` calls never interleave partial writes.
//!
//! ```text
//! send() ─┐
//! send() ─┼─► mpsc::Sender<OutboundFrame> ─► Writer Task ─► Socket
//! send() ─┘
//! ```
//!
//! Each frame carries a oneshot that reports the outcome of its write, so
//! callers learn about a broken socket from their own `send`.

use std::io;

use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::error::{Airtouch5Error, Result};

/// Default channel capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// An encoded frame waiting to be written.
#[derive(Debug)]
pub struct OutboundFrame {
    /// Complete frame, magic through CRC.
    pub bytes: Bytes,
    /// Receives the result of writing this frame.
    done: oneshot::Sender<io::Result<()>>,
}

/// Handle for sending frames to the writer task.
///
/// Cheaply cloneable. Sending fails once the writer task has exited.
#[derive(Debug, Clone)]
pub struct WriterHandle {
    tx: mpsc::Sender<OutboundFrame>,
}

impl WriterHandle {
    /// Queue a frame and wait until it has been written and flushed.
    pub async fn send(&self, bytes: Bytes) -> Result<()> {
        let (done, result) = oneshot::channel();
        self.tx
            .send(OutboundFrame { bytes, done })
            .await
            .map_err(|_| Airtouch5Error::ConnectionClosed)?;

        match result.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(Airtouch5Error::Io(e)),
            // Writer dropped the frame while shutting down.
            Err(_) => Err(Airtouch5Error::ConnectionClosed),
        }
    }

    /// Resolve once the writer task has exited.
    pub async fn closed(&self) {
        self.tx.closed().await
    }
}

/// Spawn the writer task and return a handle for sending frames.
///
/// The task ends with `Ok` when every handle has been dropped, or with the
/// first write error.
pub fn spawn_writer_task<W>(
    writer: W,
    channel_capacity: usize,
) -> (WriterHandle, JoinHandle<io::Result<()>>)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(channel_capacity.max(1));
    let task = tokio::spawn(writer_loop(rx, writer));
    (WriterHandle { tx }, task)
}

/// Main writer loop - receives frames and writes them one at a time.
async fn writer_loop<W>(mut rx: mpsc::Receiver<OutboundFrame>, mut writer: W) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(frame) = rx.recv().await {
        trace!(len = frame.bytes.len(), "writing frame");
        match write_frame(&mut writer, &frame.bytes).await {
            Ok(()) => {
                let _ = frame.done.send(Ok(()));
            }
            Err(e) => {
                debug!(error = %e, "write failed, stopping writer");
                let kind = e.kind();
                let message = e.to_string();
                let _ = frame.done.send(Err(e));
                return Err(io::Error::new(kind, message));
            }
        }
    }

    let _ = writer.shutdown().await;
    Ok(())
}

async fn write_frame<W>(writer: &mut W, bytes: &[u8]) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(bytes).await?;
    writer.flush().await
}
