//! Dispatch worker
//!
//! A single spawned task owning the open serial device. It drains the
//! pending-command queue, asks the codec to format each command, writes the
//! frame, reads and decodes the response when one is expected, and
//! publishes results on the response feed. At most one command is ever in
//! flight against the device.
//!
//! Shutdown is cooperative: the signal is observed once per cycle, after
//! the queue drain, so commands queued before `terminate()` are executed
//! rather than silently discarded. A terminate request can therefore be
//! delayed by up to one device read-timeout.
//!
//! The worker is generic over its I/O so tests can drive it with
//! `tokio::io::duplex` in place of a real serial port.

use std::io::ErrorKind;
use std::sync::Arc;
use std::time::Duration;

use satcat_protocol::{CatCommand, CatResponse, CommandKind, ResponseFraming, RigCodec};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::time::{timeout, Instant};
use tracing::{debug, warn};

use crate::queue::CommandQueue;

/// Idle poll interval between queue drains
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long to wait for straggler bytes after a command with no response
///
/// The rig occasionally emits bytes even for commands that do not expect a
/// response; draining them keeps the channel clean for the next command.
const DRAIN_TIMEOUT: Duration = Duration::from_millis(50);

/// Upper bound on a terminator-framed response
const MAX_RESPONSE_LEN: usize = 64;

/// Control messages for the worker task
#[derive(Debug)]
pub(crate) enum WorkerSignal {
    /// Finish the current cycle and exit
    Shutdown,
}

/// The background execution context for one open device
pub(crate) struct DispatchWorker<T> {
    io: T,
    codec: Box<dyn RigCodec>,
    queue: Arc<CommandQueue>,
    response_tx: mpsc::UnboundedSender<CatResponse>,
    status_tx: mpsc::UnboundedSender<String>,
    read_timeout: Duration,
}

impl<T> DispatchWorker<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub(crate) fn new(
        io: T,
        codec: Box<dyn RigCodec>,
        queue: Arc<CommandQueue>,
        response_tx: mpsc::UnboundedSender<CatResponse>,
        status_tx: mpsc::UnboundedSender<String>,
    ) -> Self {
        let read_timeout = codec.table().serial.timeout;
        Self {
            io,
            codec,
            queue,
            response_tx,
            status_tx,
            read_timeout,
        }
    }

    /// Worker main loop; runs until shutdown is signalled
    ///
    /// The device handle is dropped (and the port released) when this
    /// returns.
    pub(crate) async fn run(mut self, mut signal_rx: mpsc::Receiver<WorkerSignal>) {
        debug!("CAT worker running for {}", self.codec.variant());
        let _ = self.status_tx.send("CAT worker running".to_string());

        let mut shutdown = false;
        loop {
            // Drain everything queued before looking at the shutdown flag,
            // so a command submitted just before terminate() still runs.
            while let Some(cmd) = self.queue.pop() {
                if let Err(e) = self.execute(cmd).await {
                    warn!("dispatch cycle failed: {e}");
                    let _ = self.status_tx.send(format!("ERROR [{e}]"));
                }
            }

            if shutdown {
                break;
            }

            match timeout(POLL_INTERVAL, signal_rx.recv()).await {
                // Shutdown requested, or the session dropped the sender;
                // one more drain pass, then exit
                Ok(Some(WorkerSignal::Shutdown)) | Ok(None) => shutdown = true,
                // Idle poll elapsed
                Err(_) => {}
            }
        }

        debug!("CAT worker exiting");
        let _ = self.status_tx.send("CAT worker exiting".to_string());
    }

    /// Execute one queued command against the device
    async fn execute(&mut self, cmd: CatCommand) -> std::io::Result<()> {
        let kind = cmd.kind();
        let frame = match self.codec.format(&cmd) {
            Ok(frame) => frame,
            // Caller/configuration error, not a transport fault: skip
            Err(e) => {
                debug!("skipping unformattable command {kind}: {e}");
                return Ok(());
            }
        };

        debug!("-> {kind}: {frame:02X?}");
        self.io.write_all(&frame).await?;
        self.io.flush().await?;

        if self.codec.expects_response(kind) {
            let raw = self.read_response().await?;
            debug!("<- {kind}: {raw:02X?}");
            let response = if raw.is_empty() {
                CatResponse::Failed {
                    command: kind,
                    reason: "no response before timeout".to_string(),
                }
            } else {
                self.decode(kind, &raw)
            };
            let _ = self.response_tx.send(response);
        } else {
            self.drain_stragglers().await?;
        }
        Ok(())
    }

    fn decode(&self, kind: CommandKind, raw: &[u8]) -> CatResponse {
        match self.codec.decode(kind, raw) {
            Ok(response) => response,
            Err(e) => CatResponse::Failed {
                command: kind,
                reason: e.to_string(),
            },
        }
    }

    async fn read_response(&mut self) -> std::io::Result<Vec<u8>> {
        match self.codec.response_framing() {
            ResponseFraming::Fixed(len) => self.read_fixed(len).await,
            ResponseFraming::Terminated(term) => self.read_until(term).await,
        }
    }

    /// Read up to `len` bytes, bounded by the device read timeout
    ///
    /// Returns whatever arrived; the decoder reports short responses.
    async fn read_fixed(&mut self, len: usize) -> std::io::Result<Vec<u8>> {
        let deadline = Instant::now() + self.read_timeout;
        let mut out = Vec::with_capacity(len);
        let mut buf = [0u8; 16];

        while out.len() < len {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match timeout(remaining, self.io.read(&mut buf)).await {
                Ok(Ok(0)) => break,
                Ok(Ok(n)) => out.extend_from_slice(&buf[..n]),
                Ok(Err(e)) if e.kind() == ErrorKind::WouldBlock => {}
                Ok(Err(e)) => return Err(e),
                Err(_) => break,
            }
        }
        out.truncate(len);
        Ok(out)
    }

    /// Read byte-by-byte until the terminator, bounded by the read timeout
    async fn read_until(&mut self, term: u8) -> std::io::Result<Vec<u8>> {
        let deadline = Instant::now() + self.read_timeout;
        let mut out = Vec::with_capacity(16);
        let mut buf = [0u8; 1];

        while out.len() < MAX_RESPONSE_LEN {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match timeout(remaining, self.io.read(&mut buf)).await {
                Ok(Ok(0)) => break,
                Ok(Ok(_)) => {
                    out.push(buf[0]);
                    if buf[0] == term {
                        break;
                    }
                }
                Ok(Err(e)) if e.kind() == ErrorKind::WouldBlock => {}
                Ok(Err(e)) => return Err(e),
                Err(_) => break,
            }
        }
        Ok(out)
    }

    /// Discard any bytes the device emits after a no-response command
    async fn drain_stragglers(&mut self) -> std::io::Result<()> {
        let mut buf = [0u8; 32];
        loop {
            match timeout(DRAIN_TIMEOUT, self.io.read(&mut buf)).await {
                Ok(Ok(0)) | Err(_) => break,
                Ok(Ok(n)) => debug!("drained {n} straggler byte(s)"),
                Ok(Err(e)) if e.kind() == ErrorKind::WouldBlock => {}
                Ok(Err(e)) => return Err(e),
            }
        }
        Ok(())
    }
}
