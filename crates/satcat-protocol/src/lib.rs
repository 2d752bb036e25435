//! CAT Wire-Protocol Library
//!
//! This crate provides encoding and decoding for the CAT (Computer Aided
//! Transceiver) control protocols of the supported rigs:
//!
//! - **FT-817ND**: fixed 5-byte binary commands with BCD frequency encoding
//! - **IC-7100**: variable-length CI-V frames with address-based routing
//!   and a `0xFD` terminator
//!
//! # Architecture
//!
//! Logical commands ([`CatCommand`]) are normalized across rigs. Each rig
//! variant selects a static [`CommandTable`] (serial parameters, opcode
//! bytes, mode mappings) and a codec implementing [`RigCodec`], which turns
//! logical commands into wire frames and device responses back into typed
//! [`CatResponse`] values. The codecs perform no I/O; the dispatch engine
//! in `satcat-engine` owns the serial device.
//!
//! # Example
//!
//! ```rust
//! use satcat_protocol::{codec_for, CatCommand, RigVariant};
//!
//! let codec = codec_for(RigVariant::Ft817Nd);
//! let frame = codec
//!     .format(&CatCommand::SetFrequency { hz: 7_123_000 })
//!     .unwrap();
//! assert_eq!(frame, [0x00, 0x71, 0x23, 0x00, 0x01]);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod command;
pub mod error;
pub mod icom;
pub mod table;
pub mod yaesu;

pub use command::{CatCommand, CatResponse, CommandKind, Mode};
pub use error::CodecError;
pub use table::{CodecClass, CommandTable};

/// Identifies a supported radio model
///
/// The enum makes table and codec selection total: adding a variant without
/// a command table or codec arm is a compile error, not a runtime lookup
/// failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RigVariant {
    /// Yaesu FT-817ND (fixed-frame protocol)
    Ft817Nd,
    /// Icom IC-7100 (addressed-frame CI-V protocol)
    Ic7100,
}

impl RigVariant {
    /// Human-readable rig name
    pub fn name(&self) -> &'static str {
        match self {
            RigVariant::Ft817Nd => "FT817ND",
            RigVariant::Ic7100 => "IC7100",
        }
    }

    /// The command table for this variant
    pub fn table(&self) -> &'static CommandTable {
        CommandTable::for_variant(*self)
    }
}

impl fmt::Display for RigVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RigVariant {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FT817ND" | "FT-817ND" => Ok(RigVariant::Ft817Nd),
            "IC7100" | "IC-7100" => Ok(RigVariant::Ic7100),
            _ => Err(CodecError::UnknownVariant(s.to_string())),
        }
    }
}

/// How a variant frames its responses on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFraming {
    /// Read a fixed number of bytes (bounded by the device read timeout)
    Fixed(usize),
    /// Read byte-by-byte until the given terminator is observed
    Terminated(u8),
}

/// Object-safe codec interface implemented once per protocol shape
///
/// `format` and `decode` are total over [`CatCommand`]/[`CommandKind`];
/// a command or mode outside the variant's table is reported as a
/// [`CodecError`], which is a caller/configuration error and never a
/// transport fault.
pub trait RigCodec: Send {
    /// The rig variant this codec instance serves
    fn variant(&self) -> RigVariant;

    /// The static command table backing this codec
    fn table(&self) -> &'static CommandTable;

    /// Encode a logical command into the exact bytes to write
    fn format(&self, cmd: &CatCommand) -> Result<Vec<u8>, CodecError>;

    /// Whether the device answers this command with a response frame
    fn expects_response(&self, kind: CommandKind) -> bool;

    /// How responses from this variant are framed
    fn response_framing(&self) -> ResponseFraming;

    /// Decode raw response bytes for the given command
    fn decode(&self, kind: CommandKind, raw: &[u8]) -> Result<CatResponse, CodecError>;
}

/// Create the codec for a rig variant
pub fn codec_for(variant: RigVariant) -> Box<dyn RigCodec> {
    match variant {
        RigVariant::Ft817Nd => Box::new(yaesu::FixedFrameCodec::new(
            CommandTable::for_variant(variant),
            &table::FT817ND_OPS,
        )),
        RigVariant::Ic7100 => Box::new(icom::CivFrameCodec::new(
            CommandTable::for_variant(variant),
            &table::IC7100_OPS,
        )),
    }
}
