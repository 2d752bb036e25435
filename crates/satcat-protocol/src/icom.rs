//! Addressed-frame CAT codec (Icom IC-7100, CI-V)
//!
//! Commands are variable length; the data area changes by command type.
//!
//! # Frame format
//!
//! ```text
//! FE FE [to] [from] [cmd] [subcmd...] [data...] FD
//! ```
//!
//! - `FE FE`: preamble
//! - `to`: transceiver address (0x88) outbound; addresses are transposed
//!   on frames coming back from the rig
//! - `from`: controller address (0xE0)
//! - `cmd`/`subcmd`: command and optional multi-byte sub-command
//! - `FD`: terminator
//!
//! Responses are not fixed-length: the transport reads byte-by-byte until
//! the terminator. The byte at the command offset of an incoming frame is
//! `0xFB` (ACK) or `0xFA` (NAK) for acknowledgement frames; a NAK decodes
//! to a failure no matter what follows it.
//!
//! # Frequency encoding
//!
//! Frequencies are 5 BCD bytes, least-significant byte first, covering
//! 1 Hz through 1000 MHz (the top nibble of the most-significant byte is
//! always zero in practice). Example: 145.5 MHz = `00 00 50 45 01`.

use tracing::warn;

use crate::command::{CatCommand, CatResponse, CommandKind};
use crate::error::CodecError;
use crate::table::{CivOpcodes, CommandTable};
use crate::{ResponseFraming, RigCodec, RigVariant};

/// CI-V frame preamble byte
pub const PREAMBLE: u8 = 0xFE;
/// CI-V frame terminator byte
pub const TERMINATOR: u8 = 0xFD;

/// Offset of the command / ACK / NAK byte in a frame
const CODE_OFFSET: usize = 4;
/// Minimum frame: FE FE to from code FD
const MIN_FRAME_LEN: usize = 6;

/// Codec for the addressed variable-length frame protocol
pub struct CivFrameCodec {
    table: &'static CommandTable,
    ops: &'static CivOpcodes,
}

impl CivFrameCodec {
    /// Create a codec over a variant's table and opcode set
    pub fn new(table: &'static CommandTable, ops: &'static CivOpcodes) -> Self {
        Self { table, ops }
    }

    /// Assemble a complete outbound frame
    fn build_frame(&self, cmd: u8, sub: &[u8], data: &[u8]) -> Vec<u8> {
        let mut frame = Vec::with_capacity(MIN_FRAME_LEN + sub.len() + data.len());
        frame.push(PREAMBLE);
        frame.push(PREAMBLE);
        frame.push(self.ops.rig_addr);
        frame.push(self.ops.controller_addr);
        frame.push(cmd);
        frame.extend_from_slice(sub);
        frame.extend_from_slice(data);
        frame.push(TERMINATOR);
        frame
    }
}

impl RigCodec for CivFrameCodec {
    fn variant(&self) -> RigVariant {
        self.table.variant
    }

    fn table(&self) -> &'static CommandTable {
        self.table
    }

    fn format(&self, cmd: &CatCommand) -> Result<Vec<u8>, CodecError> {
        match *cmd {
            CatCommand::SetLock { on } => {
                let data = if on { self.ops.lock_on } else { self.ops.lock_off };
                Ok(self.build_frame(self.ops.lock_cmd, self.ops.lock_sub, data))
            }
            CatCommand::SetPtt { active } => {
                let data = if active { self.ops.ptt_on } else { self.ops.ptt_off };
                Ok(self.build_frame(self.ops.ptt_cmd, self.ops.ptt_sub, data))
            }
            // Not in this rig's dispatch set
            CatCommand::GetPtt => Err(CodecError::UnsupportedCommand {
                variant: self.variant(),
                command: CommandKind::GetPtt,
            }),
            CatCommand::SetFrequency { hz } => {
                let data = frequency_to_bcd_le(hz)?;
                Ok(self.build_frame(self.ops.set_frequency, &[], &data))
            }
            CatCommand::SetMode { mode } => {
                let code = self
                    .table
                    .id_for_mode(mode)
                    .ok_or(CodecError::UnsupportedMode {
                        variant: self.variant(),
                        mode,
                    })?;
                Ok(self.build_frame(self.ops.set_mode, &[], &[code]))
            }
            CatCommand::GetFrequency => Ok(self.build_frame(self.ops.read_frequency, &[], &[])),
            CatCommand::GetMode => Ok(self.build_frame(self.ops.read_mode, &[], &[])),
        }
    }

    fn expects_response(&self, kind: CommandKind) -> bool {
        matches!(kind, CommandKind::GetFrequency | CommandKind::GetMode)
    }

    fn response_framing(&self) -> ResponseFraming {
        ResponseFraming::Terminated(TERMINATOR)
    }

    fn decode(&self, kind: CommandKind, raw: &[u8]) -> Result<CatResponse, CodecError> {
        if raw.len() <= CODE_OFFSET {
            return Err(CodecError::ShortResponse {
                expected: MIN_FRAME_LEN,
                got: raw.len(),
            });
        }
        if raw[0] != PREAMBLE || raw[1] != PREAMBLE {
            warn!("CI-V response missing preamble: {:02X?}", raw);
            return Err(CodecError::InvalidFrame("missing preamble".into()));
        }
        // A NAK at the code offset is final, whatever trails it
        if raw[CODE_OFFSET] == self.ops.nak {
            return Err(CodecError::Nak);
        }
        if raw.len() < MIN_FRAME_LEN || raw[raw.len() - 1] != TERMINATOR {
            warn!("CI-V response missing terminator: {:02X?}", raw);
            return Err(CodecError::InvalidFrame("missing terminator".into()));
        }

        match kind {
            CommandKind::GetFrequency => {
                // FE FE to from cmd + 5 data bytes + FD
                if raw.len() < MIN_FRAME_LEN + 5 {
                    return Err(CodecError::ShortResponse {
                        expected: MIN_FRAME_LEN + 5,
                        got: raw.len(),
                    });
                }
                let data = &raw[raw.len() - 6..raw.len() - 1];
                let hz = bcd_le_to_frequency(data);
                Ok(CatResponse::Frequency { hz })
            }
            CommandKind::GetMode => {
                // Mode id directly after the command byte; filter byte ignored
                if raw.len() < MIN_FRAME_LEN + 1 {
                    return Err(CodecError::ShortResponse {
                        expected: MIN_FRAME_LEN + 1,
                        got: raw.len(),
                    });
                }
                let id = raw[CODE_OFFSET + 1];
                let mode = self
                    .table
                    .mode_for_id(id)
                    .ok_or(CodecError::UnknownModeId { id })?;
                Ok(CatResponse::Mode { mode })
            }
            _ => Err(CodecError::UnsupportedCommand {
                variant: self.variant(),
                command: kind,
            }),
        }
    }
}

/// Encode a frequency in Hz into 5 BCD bytes, least-significant byte first
fn frequency_to_bcd_le(hz: u64) -> Result<[u8; 5], CodecError> {
    // 10 decimal digits of 1 Hz units
    if hz > 9_999_999_999 {
        return Err(CodecError::FrequencyOutOfRange { hz });
    }

    let mut rem = hz;
    let mut out = [0u8; 5];
    for byte in out.iter_mut() {
        let low = (rem % 10) as u8;
        rem /= 10;
        let high = (rem % 10) as u8;
        rem /= 10;
        *byte = (high << 4) | low;
    }
    Ok(out)
}

/// Decode 5 BCD bytes (least-significant byte first) into Hz
fn bcd_le_to_frequency(data: &[u8]) -> u64 {
    let mut hz: u64 = 0;
    let mut weight: u64 = 1;
    for &byte in data {
        hz += (byte & 0x0F) as u64 * weight;
        hz += ((byte >> 4) & 0x0F) as u64 * weight * 10;
        weight *= 100;
    }
    hz
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::command::Mode;
    use crate::{codec_for, RigVariant};

    fn codec() -> Box<dyn RigCodec> {
        codec_for(RigVariant::Ic7100)
    }

    #[test]
    fn set_frequency_145_5_mhz_exact_bytes() {
        let frame = codec()
            .format(&CatCommand::SetFrequency { hz: 145_500_000 })
            .unwrap();
        assert_eq!(
            frame,
            [0xFE, 0xFE, 0x88, 0xE0, 0x00, 0x00, 0x00, 0x50, 0x45, 0x01, 0xFD]
        );
    }

    #[test]
    fn frequency_response_decodes_little_endian_bcd() {
        let raw = [0xFE, 0xFE, 0xE0, 0x88, 0x03, 0x00, 0x00, 0x50, 0x45, 0x01, 0xFD];
        let resp = codec().decode(CommandKind::GetFrequency, &raw).unwrap();
        assert_eq!(resp, CatResponse::Frequency { hz: 145_500_000 });
    }

    #[test]
    fn nak_is_final_regardless_of_trailing_bytes() {
        let c = codec();
        let plain = [0xFE, 0xFE, 0xE0, 0x88, 0xFA, 0xFD];
        assert_eq!(
            c.decode(CommandKind::GetFrequency, &plain),
            Err(CodecError::Nak)
        );

        let with_trailer = [0xFE, 0xFE, 0xE0, 0x88, 0xFA, 0x12, 0x34, 0x56];
        assert_eq!(
            c.decode(CommandKind::GetMode, &with_trailer),
            Err(CodecError::Nak)
        );
    }

    #[test]
    fn mode_response_reads_id_after_command_byte() {
        let raw = [0xFE, 0xFE, 0xE0, 0x88, 0x04, 0x05, 0x01, 0xFD];
        let resp = codec().decode(CommandKind::GetMode, &raw).unwrap();
        assert_eq!(resp, CatResponse::Mode { mode: Mode::Fm });
    }

    #[test]
    fn unknown_mode_id_is_a_decode_error() {
        let raw = [0xFE, 0xFE, 0xE0, 0x88, 0x04, 0x33, 0x01, 0xFD];
        assert_eq!(
            codec().decode(CommandKind::GetMode, &raw),
            Err(CodecError::UnknownModeId { id: 0x33 })
        );
    }

    #[test]
    fn lock_frame_carries_sub_command_bytes() {
        let frame = codec().format(&CatCommand::SetLock { on: true }).unwrap();
        assert_eq!(
            frame,
            [0xFE, 0xFE, 0x88, 0xE0, 0x1A, 0x05, 0x00, 0x14, 0x01, 0xFD]
        );
    }

    #[test]
    fn ptt_frames() {
        let c = codec();
        assert_eq!(
            c.format(&CatCommand::SetPtt { active: true }).unwrap(),
            [0xFE, 0xFE, 0x88, 0xE0, 0x1C, 0x00, 0x01, 0xFD]
        );
        assert_eq!(
            c.format(&CatCommand::SetPtt { active: false }).unwrap(),
            [0xFE, 0xFE, 0x88, 0xE0, 0x1C, 0x00, 0x00, 0xFD]
        );
    }

    #[test]
    fn ptt_query_is_not_in_the_dispatch_set() {
        assert!(matches!(
            codec().format(&CatCommand::GetPtt),
            Err(CodecError::UnsupportedCommand { .. })
        ));
    }

    #[test]
    fn query_frames_have_no_data_area() {
        let c = codec();
        assert_eq!(
            c.format(&CatCommand::GetFrequency).unwrap(),
            [0xFE, 0xFE, 0x88, 0xE0, 0x03, 0xFD]
        );
        assert_eq!(
            c.format(&CatCommand::GetMode).unwrap(),
            [0xFE, 0xFE, 0x88, 0xE0, 0x04, 0xFD]
        );
    }

    #[test]
    fn bad_preamble_is_rejected() {
        let raw = [0x00, 0xFE, 0xE0, 0x88, 0x04, 0x05, 0x01, 0xFD];
        assert!(matches!(
            codec().decode(CommandKind::GetMode, &raw),
            Err(CodecError::InvalidFrame(_))
        ));
    }

    #[test]
    fn ack_without_payload_is_short_for_a_query() {
        // FE FE E0 88 FB FD: acknowledgement, but no frequency data
        let raw = [0xFE, 0xFE, 0xE0, 0x88, 0xFB, 0xFD];
        assert!(matches!(
            codec().decode(CommandKind::GetFrequency, &raw),
            Err(CodecError::ShortResponse { .. })
        ));
    }

    proptest! {
        #[test]
        fn encode_decode_is_identity(hz in 0u64..10_000_000_000) {
            let bcd = frequency_to_bcd_le(hz).unwrap();
            prop_assert_eq!(bcd_le_to_frequency(&bcd), hz);
        }
    }
}
