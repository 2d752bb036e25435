//! Normalized command and response representation
//!
//! This module provides the logical command layer shared by both codecs:
//! the commands a caller can submit, the parameter-free tag used to
//! correlate responses, and the typed responses the dispatch engine
//! publishes back to the caller.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Operating modes across the supported rig variants
///
/// Each rig's command table maps a subset of these to its wire mode codes;
/// a mode absent from a variant's table cannot be set on that variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Lower Sideband
    Lsb,
    /// Upper Sideband
    Usb,
    /// Continuous Wave
    Cw,
    /// CW Reverse
    CwR,
    /// Amplitude Modulation
    Am,
    /// Frequency Modulation
    Fm,
    /// Wide FM (broadcast)
    Wfm,
    /// Digital modes (PSK etc.)
    Dig,
    /// Packet
    Pkt,
    /// RTTY
    Rtty,
    /// RTTY Reverse
    RttyR,
    /// Icom D-STAR digital voice
    Dv,
}

impl Mode {
    /// Canonical display name, as used by the string-keyed lookup API
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Lsb => "LSB",
            Mode::Usb => "USB",
            Mode::Cw => "CW",
            Mode::CwR => "CWR",
            Mode::Am => "AM",
            Mode::Fm => "FM",
            Mode::Wfm => "WFM",
            Mode::Dig => "DIG",
            Mode::Pkt => "PKT",
            Mode::Rtty => "RTTY",
            Mode::RttyR => "RTTYR",
            Mode::Dv => "DV",
        }
    }

    /// Parse a mode name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        let mode = match name.to_ascii_uppercase().as_str() {
            "LSB" => Mode::Lsb,
            "USB" => Mode::Usb,
            "CW" => Mode::Cw,
            "CWR" => Mode::CwR,
            "AM" => Mode::Am,
            "FM" => Mode::Fm,
            "WFM" => Mode::Wfm,
            "DIG" => Mode::Dig,
            "PKT" => Mode::Pkt,
            "RTTY" => Mode::Rtty,
            "RTTYR" => Mode::RttyR,
            "DV" => Mode::Dv,
            _ => return None,
        };
        Some(mode)
    }

    /// Returns whether this is a voice mode
    pub fn is_voice(&self) -> bool {
        matches!(
            self,
            Mode::Lsb | Mode::Usb | Mode::Am | Mode::Fm | Mode::Wfm | Mode::Dv
        )
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A logical CAT command with its parameters
///
/// This is the unit submitted to the dispatch engine. The codec for the
/// session's rig variant turns it into wire bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatCommand {
    /// Lock or unlock the front panel
    SetLock { on: bool },
    /// Key or unkey the transmitter
    SetPtt { active: bool },
    /// Query the PTT/TX status
    GetPtt,
    /// Tune to a frequency in Hz
    SetFrequency { hz: u64 },
    /// Query the current frequency
    GetFrequency,
    /// Set the operating mode
    SetMode { mode: Mode },
    /// Query the current operating mode
    GetMode,
}

impl CatCommand {
    /// The parameter-free tag for this command
    pub fn kind(&self) -> CommandKind {
        match self {
            CatCommand::SetLock { .. } => CommandKind::SetLock,
            CatCommand::SetPtt { .. } => CommandKind::SetPtt,
            CatCommand::GetPtt => CommandKind::GetPtt,
            CatCommand::SetFrequency { .. } => CommandKind::SetFrequency,
            CatCommand::GetFrequency => CommandKind::GetFrequency,
            CatCommand::SetMode { .. } => CommandKind::SetMode,
            CatCommand::GetMode => CommandKind::GetMode,
        }
    }
}

/// Parameter-free command tag, used to select decode behavior and to
/// label failed responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    /// Front panel lock
    SetLock,
    /// PTT on/off
    SetPtt,
    /// PTT/TX status query
    GetPtt,
    /// Frequency set
    SetFrequency,
    /// Frequency query
    GetFrequency,
    /// Mode set
    SetMode,
    /// Mode query
    GetMode,
}

impl CommandKind {
    /// Returns true if this is a query command
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            CommandKind::GetPtt | CommandKind::GetFrequency | CommandKind::GetMode
        )
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommandKind::SetLock => "set-lock",
            CommandKind::SetPtt => "set-ptt",
            CommandKind::GetPtt => "get-ptt",
            CommandKind::SetFrequency => "set-frequency",
            CommandKind::GetFrequency => "get-frequency",
            CommandKind::SetMode => "set-mode",
            CommandKind::GetMode => "get-mode",
        };
        f.write_str(name)
    }
}

/// A decoded device response, published on the response feed
///
/// Constructed by the codec, pushed to the response queue by the dispatch
/// worker, and owned by the consumer from then on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatResponse {
    /// Current frequency in Hz
    Frequency { hz: u64 },
    /// Current operating mode
    Mode { mode: Mode },
    /// Current PTT state
    Ptt { active: bool },
    /// The device answered but the response could not be decoded, or the
    /// device rejected the command (NAK)
    Failed { command: CommandKind, reason: String },
}

impl CatResponse {
    /// Returns true for successfully decoded payloads
    pub fn is_ok(&self) -> bool {
        !matches!(self, CatResponse::Failed { .. })
    }
}
