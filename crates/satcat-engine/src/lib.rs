//! CAT Dispatch Engine
//!
//! This crate drives a transceiver over a serial link using the codecs from
//! `satcat-protocol`. Callers (a UI, an automation script, a
//! satellite-tracking client) submit logical commands without blocking on
//! serial latency; a single background worker serializes execution against
//! the open device and publishes typed responses and status messages on
//! poll-drained feeds.
//!
//! # Architecture
//!
//! ```text
//! caller -> CatSession::submit -> bounded queue (4, drop-oldest)
//!                                      |
//!                               DispatchWorker (one tokio task,
//!                               exclusive device ownership)
//!                                      |
//!                    format -> write -> read -> decode
//!                                      |
//!                  response feed / status feed (unbounded, polled)
//! ```
//!
//! Mode and bandwidth lookups bypass the worker entirely and read the
//! static command tables synchronously.
//!
//! # Example
//!
//! ```rust,no_run
//! use satcat_engine::{CatCommand, CatSession, RigVariant};
//!
//! # async fn demo() -> Result<(), satcat_engine::EngineError> {
//! let mut session = CatSession::new(RigVariant::Ft817Nd);
//! session.open("/dev/ttyUSB0", 9600)?;
//!
//! session.submit(CatCommand::SetFrequency { hz: 145_500_000 });
//! session.submit(CatCommand::GetFrequency);
//!
//! // ... later, from the UI poll loop:
//! for response in session.drain_responses() {
//!     println!("{response:?}");
//! }
//!
//! session.terminate().await;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod ports;
pub mod queue;
pub mod session;

mod worker;

pub use error::EngineError;
pub use ports::list_ports;
pub use queue::{CommandQueue, PENDING_CAPACITY};
pub use session::CatSession;

// Re-export the protocol types callers need to drive a session
pub use satcat_protocol::{CatCommand, CatResponse, CommandKind, Mode, RigVariant};
