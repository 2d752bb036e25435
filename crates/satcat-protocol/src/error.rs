//! Error types for CAT frame encoding and decoding

use thiserror::Error;

use crate::command::{CommandKind, Mode};
use crate::RigVariant;

/// Errors produced by the codecs and the variant/table lookups
///
/// The first three variants are configuration errors: they are surfaced
/// synchronously to the caller and never retried. The rest describe
/// malformed or negative device responses and end up on the response feed
/// as failed responses, not as transport faults.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Rig variant name not recognized
    #[error("unknown rig variant: {0}")]
    UnknownVariant(String),

    /// Command absent from this variant's dispatch set
    #[error("{variant} does not implement {command}")]
    UnsupportedCommand {
        variant: RigVariant,
        command: CommandKind,
    },

    /// Mode absent from this variant's mode table
    #[error("{variant} does not support mode {mode}")]
    UnsupportedMode { variant: RigVariant, mode: Mode },

    /// Frequency cannot be represented in the variant's BCD field
    #[error("frequency {hz} Hz out of range for the wire encoding")]
    FrequencyOutOfRange { hz: u64 },

    /// Response shorter than the decoder needs
    #[error("short response: need {expected} bytes, got {got}")]
    ShortResponse { expected: usize, got: usize },

    /// Response structurally invalid (bad preamble, missing terminator, ...)
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    /// Mode id in a response has no entry in the mode table
    #[error("unknown mode id 0x{id:02X}")]
    UnknownModeId { id: u8 },

    /// Device rejected the command
    #[error("device returned NAK")]
    Nak,
}
