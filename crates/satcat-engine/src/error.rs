//! Error types for the dispatch engine

use thiserror::Error;

/// Errors returned by the session's synchronous entry points
///
/// Faults inside a dispatch cycle never surface here; they go to the
/// status and response feeds.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The serial port could not be opened
    ///
    /// Carries the ports that were enumerated at the time of the attempt,
    /// for diagnostics (the radio is often simply switched off).
    #[error("failed to open serial port {port} (available: {available:?})")]
    TransportOpen {
        /// Port name the caller asked for
        port: String,
        /// Ports enumerated while the open was failing
        available: Vec<String>,
        #[source]
        source: tokio_serial::Error,
    },

    /// The session already has an open device and a running worker
    #[error("session is already open")]
    AlreadyOpen,
}
