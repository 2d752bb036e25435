//! Fixed-frame CAT codec (Yaesu FT-817ND)
//!
//! Every outgoing command is exactly 5 bytes:
//!
//! ```text
//! [P1] [P2] [P3] [P4] [CMD]
//! ```
//!
//! - Bytes 0-3: parameters (meaning depends on the command)
//! - Byte 4: command opcode
//!
//! # Frequency encoding
//!
//! Frequencies are BCD encoded in bytes 0-3, most-significant byte first,
//! in 10 Hz units (4 bytes = 8 decimal digits). Example:
//! 7.123 MHz = `0x00 0x71 0x23 0x00`.
//!
//! Responses are fixed-length reads (5 bytes for this rig). A single read
//! opcode returns frequency and mode together; the decoder picks the field
//! the caller asked for. The TX-status response carries PTT in bit 7 of
//! byte 0 with inverted polarity (bit set means PTT off); this matches
//! observed rig behavior and is preserved as-is.

use crate::command::{CatCommand, CatResponse, CommandKind};
use crate::error::CodecError;
use crate::table::{CommandTable, FixedOpcodes};
use crate::{ResponseFraming, RigCodec, RigVariant};

/// Fixed command/response frame length
pub const COMMAND_LEN: usize = 5;

/// Codec for the fixed 5-byte frame protocol
pub struct FixedFrameCodec {
    table: &'static CommandTable,
    ops: &'static FixedOpcodes,
}

impl FixedFrameCodec {
    /// Create a codec over a variant's table and opcode set
    pub fn new(table: &'static CommandTable, ops: &'static FixedOpcodes) -> Self {
        Self { table, ops }
    }

    fn opcode_only(&self, opcode: u8) -> Vec<u8> {
        vec![0x00, 0x00, 0x00, 0x00, opcode]
    }
}

impl RigCodec for FixedFrameCodec {
    fn variant(&self) -> RigVariant {
        self.table.variant
    }

    fn table(&self) -> &'static CommandTable {
        self.table
    }

    fn format(&self, cmd: &CatCommand) -> Result<Vec<u8>, CodecError> {
        match *cmd {
            CatCommand::SetLock { on } => {
                let opcode = if on { self.ops.lock_on } else { self.ops.lock_off };
                Ok(self.opcode_only(opcode))
            }
            CatCommand::SetPtt { active } => {
                let opcode = if active { self.ops.ptt_on } else { self.ops.ptt_off };
                Ok(self.opcode_only(opcode))
            }
            CatCommand::GetPtt => Ok(self.opcode_only(self.ops.read_tx_status)),
            CatCommand::SetFrequency { hz } => {
                let mut frame = frequency_to_bcd(hz)?.to_vec();
                frame.push(self.ops.set_frequency);
                Ok(frame)
            }
            CatCommand::SetMode { mode } => {
                let code = self
                    .table
                    .id_for_mode(mode)
                    .ok_or(CodecError::UnsupportedMode {
                        variant: self.variant(),
                        mode,
                    })?;
                Ok(vec![code, 0x00, 0x00, 0x00, self.ops.set_mode])
            }
            CatCommand::GetFrequency | CatCommand::GetMode => {
                Ok(self.opcode_only(self.ops.read_freq_mode))
            }
        }
    }

    fn expects_response(&self, kind: CommandKind) -> bool {
        matches!(
            kind,
            CommandKind::GetPtt | CommandKind::GetFrequency | CommandKind::GetMode
        )
    }

    fn response_framing(&self) -> ResponseFraming {
        ResponseFraming::Fixed(self.table.serial.read_len)
    }

    fn decode(&self, kind: CommandKind, raw: &[u8]) -> Result<CatResponse, CodecError> {
        match kind {
            CommandKind::GetFrequency => {
                if raw.len() < 4 {
                    return Err(CodecError::ShortResponse {
                        expected: 4,
                        got: raw.len(),
                    });
                }
                let hz = bcd_to_frequency([raw[0], raw[1], raw[2], raw[3]]);
                Ok(CatResponse::Frequency { hz })
            }
            CommandKind::GetMode => {
                // Same response frame as the frequency query; mode in byte 4
                if raw.len() < COMMAND_LEN {
                    return Err(CodecError::ShortResponse {
                        expected: COMMAND_LEN,
                        got: raw.len(),
                    });
                }
                let id = raw[4];
                let mode = self
                    .table
                    .mode_for_id(id)
                    .ok_or(CodecError::UnknownModeId { id })?;
                Ok(CatResponse::Mode { mode })
            }
            CommandKind::GetPtt => {
                if raw.is_empty() {
                    return Err(CodecError::ShortResponse {
                        expected: 1,
                        got: 0,
                    });
                }
                // Bit 7 set means PTT is off (inverted polarity, rig quirk)
                let active = raw[0] & 0x80 == 0;
                Ok(CatResponse::Ptt { active })
            }
            _ => Err(CodecError::UnsupportedCommand {
                variant: self.variant(),
                command: kind,
            }),
        }
    }
}

/// Encode a frequency in Hz into 4 BCD bytes, 10 Hz resolution, MSB first
fn frequency_to_bcd(hz: u64) -> Result<[u8; 4], CodecError> {
    // 8 decimal digits of 10 Hz units
    let mut units = hz / 10;
    if units > 99_999_999 {
        return Err(CodecError::FrequencyOutOfRange { hz });
    }

    let mut out = [0u8; 4];
    for byte in out.iter_mut().rev() {
        let low = (units % 10) as u8;
        units /= 10;
        let high = (units % 10) as u8;
        units /= 10;
        *byte = (high << 4) | low;
    }
    Ok(out)
}

/// Decode 4 BCD bytes (MSB first, 10 Hz units) into Hz
fn bcd_to_frequency(bytes: [u8; 4]) -> u64 {
    let mut units: u64 = 0;
    for byte in bytes {
        let high = ((byte >> 4) & 0x0F) as u64;
        let low = (byte & 0x0F) as u64;
        units = units * 100 + high * 10 + low;
    }
    units * 10
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::command::Mode;
    use crate::{codec_for, RigVariant};

    fn codec() -> Box<dyn RigCodec> {
        codec_for(RigVariant::Ft817Nd)
    }

    #[test]
    fn set_frequency_7_123_mhz_exact_bytes() {
        // 7_123_000 Hz -> 712300 ten-Hz units -> "00712300" packed BCD
        let frame = codec()
            .format(&CatCommand::SetFrequency { hz: 7_123_000 })
            .unwrap();
        assert_eq!(frame, [0x00, 0x71, 0x23, 0x00, 0x01]);
    }

    #[test]
    fn frequency_roundtrips_on_10_hz_grid() {
        for hz in [14_250_000u64, 7_074_000, 28_500_000, 144_200_000, 432_100_010] {
            let bcd = frequency_to_bcd(hz).unwrap();
            assert_eq!(bcd_to_frequency(bcd), hz, "roundtrip failed for {hz}");
        }
    }

    #[test]
    fn frequency_above_eight_digits_is_rejected() {
        assert!(matches!(
            codec().format(&CatCommand::SetFrequency { hz: 1_000_000_000 }),
            Err(CodecError::FrequencyOutOfRange { .. })
        ));
    }

    #[test]
    fn lock_and_ptt_frames() {
        let c = codec();
        assert_eq!(
            c.format(&CatCommand::SetLock { on: true }).unwrap(),
            [0x00, 0x00, 0x00, 0x00, 0x00]
        );
        assert_eq!(
            c.format(&CatCommand::SetLock { on: false }).unwrap(),
            [0x00, 0x00, 0x00, 0x00, 0x80]
        );
        assert_eq!(
            c.format(&CatCommand::SetPtt { active: true }).unwrap(),
            [0x00, 0x00, 0x00, 0x00, 0x08]
        );
        assert_eq!(
            c.format(&CatCommand::GetPtt).unwrap(),
            [0x00, 0x00, 0x00, 0x00, 0xF7]
        );
    }

    #[test]
    fn set_mode_places_code_in_first_byte() {
        let frame = codec()
            .format(&CatCommand::SetMode { mode: Mode::Dig })
            .unwrap();
        assert_eq!(frame, [0x0A, 0x00, 0x00, 0x00, 0x07]);
    }

    #[test]
    fn set_mode_outside_table_is_a_configuration_error() {
        assert!(matches!(
            codec().format(&CatCommand::SetMode { mode: Mode::Dv }),
            Err(CodecError::UnsupportedMode { .. })
        ));
    }

    #[test]
    fn queries_share_the_read_opcode() {
        let c = codec();
        let freq = c.format(&CatCommand::GetFrequency).unwrap();
        let mode = c.format(&CatCommand::GetMode).unwrap();
        assert_eq!(freq, [0x00, 0x00, 0x00, 0x00, 0x03]);
        assert_eq!(freq, mode);
    }

    #[test]
    fn combined_response_decodes_either_field() {
        let c = codec();
        let raw = [0x01, 0x42, 0x34, 0x50, 0x01];

        let freq = c.decode(CommandKind::GetFrequency, &raw).unwrap();
        assert_eq!(freq, CatResponse::Frequency { hz: 14_234_500 });

        let mode = c.decode(CommandKind::GetMode, &raw).unwrap();
        assert_eq!(mode, CatResponse::Mode { mode: Mode::Usb });
    }

    #[test]
    fn ptt_status_bit_is_inverted() {
        let c = codec();
        assert_eq!(
            c.decode(CommandKind::GetPtt, &[0x00]).unwrap(),
            CatResponse::Ptt { active: true }
        );
        assert_eq!(
            c.decode(CommandKind::GetPtt, &[0x80]).unwrap(),
            CatResponse::Ptt { active: false }
        );
    }

    #[test]
    fn short_response_is_a_decode_error() {
        assert!(matches!(
            codec().decode(CommandKind::GetFrequency, &[0x01, 0x42]),
            Err(CodecError::ShortResponse { .. })
        ));
        assert!(matches!(
            codec().decode(CommandKind::GetMode, &[0x01, 0x42, 0x34, 0x50]),
            Err(CodecError::ShortResponse { .. })
        ));
    }

    #[test]
    fn decoding_a_set_command_is_a_configuration_error() {
        assert!(matches!(
            codec().decode(CommandKind::SetLock, &[0x00; 5]),
            Err(CodecError::UnsupportedCommand { .. })
        ));
    }

    proptest! {
        #[test]
        fn encode_decode_is_identity_on_the_grid(units in 0u64..100_000_000) {
            let hz = units * 10;
            let bcd = frequency_to_bcd(hz).unwrap();
            prop_assert_eq!(bcd_to_frequency(bcd), hz);
        }
    }
}
