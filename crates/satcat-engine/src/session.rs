//! Transport session
//!
//! [`CatSession`] owns the lifecycle of one serial device and its dispatch
//! worker: closed on creation, opened (device acquired, worker spawned) by
//! [`CatSession::open`], and closed again by [`CatSession::terminate`].
//! Commands go in through the bounded pending queue; results and status
//! messages come back on poll-drained feeds. The session never touches the
//! device itself; the worker has exclusive ownership.

use std::sync::Arc;

use satcat_protocol::{
    codec_for,
    table::{self, CommandTable},
    CatCommand, CatResponse, Mode, RigVariant,
};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::ports;
use crate::queue::CommandQueue;
use crate::worker::{DispatchWorker, WorkerSignal};

struct WorkerHandle {
    signal_tx: mpsc::Sender<WorkerSignal>,
    join: JoinHandle<()>,
}

/// A CAT control session for one rig
///
/// Created closed; `open` acquires the device and starts the worker.
/// All entry points are non-blocking except `open` and `terminate`, which
/// are the only calls with synchronous success/failure results. Faults
/// during dispatch surface asynchronously on the response and status feeds.
pub struct CatSession {
    variant: RigVariant,
    table: &'static CommandTable,
    queue: Arc<CommandQueue>,
    response_tx: mpsc::UnboundedSender<CatResponse>,
    response_rx: mpsc::UnboundedReceiver<CatResponse>,
    status_tx: mpsc::UnboundedSender<String>,
    status_rx: mpsc::UnboundedReceiver<String>,
    worker: Option<WorkerHandle>,
}

impl CatSession {
    /// Create a closed session for a rig variant
    pub fn new(variant: RigVariant) -> Self {
        let (response_tx, response_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = mpsc::unbounded_channel();
        Self {
            variant,
            table: CommandTable::for_variant(variant),
            queue: Arc::new(CommandQueue::new()),
            response_tx,
            response_rx,
            status_tx,
            status_rx,
            worker: None,
        }
    }

    /// The rig variant this session controls
    pub fn variant(&self) -> RigVariant {
        self.variant
    }

    /// True while the device is open and the worker is running
    pub fn is_open(&self) -> bool {
        self.worker.is_some()
    }

    /// Open the named serial port and start the dispatch worker
    ///
    /// Parity, stop bits, and the read timeout come from the variant's
    /// command table; only the port name and baud rate are caller-chosen.
    /// On failure the session stays closed, a diagnostic status message
    /// (attempted port plus the ports that were enumerated) is pushed, and
    /// the caller must retry explicitly (there is no automatic reconnect).
    ///
    /// Must be called from within a tokio runtime.
    pub fn open(&mut self, port: &str, baud: u32) -> Result<(), EngineError> {
        if self.is_open() {
            return Err(EngineError::AlreadyOpen);
        }

        let builder = tokio_serial::new(port, baud)
            .parity(to_serial_parity(self.table.serial.parity))
            .stop_bits(to_serial_stop_bits(self.table.serial.stop_bits))
            .timeout(self.table.serial.timeout);

        match builder.open_native_async() {
            Ok(stream) => {
                info!("opened {port} at {baud} baud for {}", self.variant);
                let _ = self.status_tx.send(format!("Opened port {port}"));
                self.spawn_worker(stream);
                Ok(())
            }
            Err(source) => {
                let available = ports::list_ports();
                warn!("failed to open {port}: {source}");
                let _ = self.status_tx.send(format!(
                    "Failed to open port {port} for CAT control. Available ports: {available:?}"
                ));
                Err(EngineError::TransportOpen {
                    port: port.to_string(),
                    available,
                    source,
                })
            }
        }
    }

    /// Start the worker over an arbitrary I/O handle
    ///
    /// Used with `tokio::io::duplex` to run the engine against a mock
    /// device in tests; behaves exactly like a successful [`CatSession::open`].
    pub fn open_with_io<T>(&mut self, io: T) -> Result<(), EngineError>
    where
        T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        if self.is_open() {
            return Err(EngineError::AlreadyOpen);
        }
        self.spawn_worker(io);
        Ok(())
    }

    fn spawn_worker<T>(&mut self, io: T)
    where
        T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (signal_tx, signal_rx) = mpsc::channel(1);
        let worker = DispatchWorker::new(
            io,
            codec_for(self.variant),
            Arc::clone(&self.queue),
            self.response_tx.clone(),
            self.status_tx.clone(),
        );
        let join = tokio::spawn(worker.run(signal_rx));
        self.worker = Some(WorkerHandle { signal_tx, join });
    }

    /// Enqueue a command for execution
    ///
    /// Never blocks and never fails: when the pending queue is full the
    /// oldest entry is dropped, and submitting on a closed session is a
    /// no-op.
    pub fn submit(&self, cmd: CatCommand) {
        if self.is_open() {
            self.queue.push(cmd);
        } else {
            debug!("session closed, dropping {:?}", cmd.kind());
        }
    }

    /// Stop the worker and release the device
    ///
    /// Signals the worker, waits for it to finish its current cycle
    /// (including commands already queued), and joins it. Idempotent and
    /// safe to call on a session that never opened.
    pub async fn terminate(&mut self) {
        let Some(handle) = self.worker.take() else {
            return;
        };
        let _ = handle.signal_tx.send(WorkerSignal::Shutdown).await;
        if let Err(e) = handle.join.await {
            warn!("worker task failed to join: {e}");
        }
    }

    /// Drain every decoded response currently pending
    pub fn drain_responses(&mut self) -> Vec<CatResponse> {
        let mut out = Vec::new();
        while let Ok(response) = self.response_rx.try_recv() {
            out.push(response);
        }
        out
    }

    /// Drain every status/log message currently pending
    pub fn drain_status(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(message) = self.status_rx.try_recv() {
            out.push(message);
        }
        out
    }

    /// Names of the serial ports currently present on this machine
    pub fn list_ports(&self) -> Vec<String> {
        ports::list_ports()
    }

    // Metadata accessors: static table lookups, never touch the device.

    /// Mode for one of this rig's wire mode ids
    pub fn mode_for_id(&self, id: u8) -> Option<Mode> {
        self.table.mode_for_id(id)
    }

    /// Wire mode id for a mode on this rig
    pub fn id_for_mode(&self, mode: Mode) -> Option<u8> {
        self.table.id_for_mode(mode)
    }

    /// Nominal receive bandwidth for a mode on this rig, in Hz
    pub fn bandwidth_for_mode(&self, mode: Mode) -> Option<u32> {
        self.table.bandwidth_for_mode(mode)
    }
}

fn to_serial_parity(parity: table::Parity) -> tokio_serial::Parity {
    match parity {
        table::Parity::None => tokio_serial::Parity::None,
        table::Parity::Even => tokio_serial::Parity::Even,
        table::Parity::Odd => tokio_serial::Parity::Odd,
    }
}

fn to_serial_stop_bits(stop_bits: table::StopBits) -> tokio_serial::StopBits {
    match stop_bits {
        table::StopBits::One => tokio_serial::StopBits::One,
        table::StopBits::Two => tokio_serial::StopBits::Two,
    }
}
