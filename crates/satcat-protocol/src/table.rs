//! Per-variant command tables
//!
//! Pure data: serial line parameters, raw opcode bytes, and the mode and
//! bandwidth mappings for each supported rig. The codecs consume these
//! tables; nothing here touches a device.
//!
//! Mode ids are the rig's wire mode codes. Each variant's mode table is
//! bijective, so `mode_for_id` and `id_for_mode` invert each other over
//! the table.

use std::time::Duration;

use crate::command::Mode;
use crate::RigVariant;

/// Serial parity setting for a rig variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Serial stop-bit setting for a rig variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}

/// Serial line configuration, fixed per rig variant
///
/// Port name and baud rate are chosen by the caller; everything here is
/// dictated by the rig's CAT implementation.
#[derive(Debug, Clone, Copy)]
pub struct SerialParams {
    pub parity: Parity,
    pub stop_bits: StopBits,
    /// Device read timeout for one response
    pub timeout: Duration,
    /// Expected response length for fixed-frame reads
    pub read_len: usize,
}

/// Which codec implementation a variant uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecClass {
    /// Fixed 5-byte command frames (Yaesu style)
    FixedFrame,
    /// Variable-length addressed frames with a terminator (Icom CI-V style)
    AddressedFrame,
}

/// Opcode bytes for the fixed-frame protocol
#[derive(Debug, Clone, Copy)]
pub struct FixedOpcodes {
    pub lock_on: u8,
    pub lock_off: u8,
    pub ptt_on: u8,
    pub ptt_off: u8,
    pub set_frequency: u8,
    pub set_mode: u8,
    /// Single opcode serving both the frequency and the mode query
    pub read_freq_mode: u8,
    pub read_tx_status: u8,
}

/// Command and sub-command byte sequences for the addressed-frame protocol
#[derive(Debug, Clone, Copy)]
pub struct CivOpcodes {
    /// Transceiver bus address
    pub rig_addr: u8,
    /// Controller bus address
    pub controller_addr: u8,
    pub ack: u8,
    pub nak: u8,
    pub lock_cmd: u8,
    pub lock_sub: &'static [u8],
    pub lock_on: &'static [u8],
    pub lock_off: &'static [u8],
    pub ptt_cmd: u8,
    pub ptt_sub: &'static [u8],
    pub ptt_on: &'static [u8],
    pub ptt_off: &'static [u8],
    pub set_frequency: u8,
    pub set_mode: u8,
    pub read_frequency: u8,
    pub read_mode: u8,
}

/// Static per-variant configuration
#[derive(Debug, Clone, Copy)]
pub struct CommandTable {
    pub variant: RigVariant,
    pub codec: CodecClass,
    pub serial: SerialParams,
    /// Mode name <-> wire code mapping (bijective)
    pub modes: &'static [(Mode, u8)],
    /// Nominal receive bandwidth per mode, in Hz
    pub bandwidths: &'static [(Mode, u32)],
}

impl CommandTable {
    /// Table lookup for a variant; total over the enum, O(1)
    pub fn for_variant(variant: RigVariant) -> &'static CommandTable {
        match variant {
            RigVariant::Ft817Nd => &FT817ND,
            RigVariant::Ic7100 => &IC7100,
        }
    }

    /// Mode name for a wire mode id
    pub fn mode_for_id(&self, id: u8) -> Option<Mode> {
        self.modes
            .iter()
            .find(|(_, code)| *code == id)
            .map(|(mode, _)| *mode)
    }

    /// Wire mode id for a mode
    pub fn id_for_mode(&self, mode: Mode) -> Option<u8> {
        self.modes
            .iter()
            .find(|(m, _)| *m == mode)
            .map(|(_, code)| *code)
    }

    /// Nominal bandwidth for a mode, in Hz
    pub fn bandwidth_for_mode(&self, mode: Mode) -> Option<u32> {
        self.bandwidths
            .iter()
            .find(|(m, _)| *m == mode)
            .map(|(_, bw)| *bw)
    }
}

/// Yaesu FT-817ND
pub static FT817ND: CommandTable = CommandTable {
    variant: RigVariant::Ft817Nd,
    codec: CodecClass::FixedFrame,
    serial: SerialParams {
        parity: Parity::None,
        stop_bits: StopBits::One,
        timeout: Duration::from_secs(2),
        read_len: 5,
    },
    modes: &[
        (Mode::Lsb, 0x00),
        (Mode::Usb, 0x01),
        (Mode::Cw, 0x02),
        (Mode::CwR, 0x03),
        (Mode::Am, 0x04),
        (Mode::Fm, 0x08),
        (Mode::Dig, 0x0A),
        (Mode::Pkt, 0x0C),
    ],
    bandwidths: &[
        (Mode::Lsb, 2200),
        (Mode::Usb, 2200),
        (Mode::Cw, 2200),
        (Mode::CwR, 2200),
        (Mode::Am, 6000),
        (Mode::Fm, 9000),
        (Mode::Dig, 2200),
        (Mode::Pkt, 2200),
    ],
};

pub static FT817ND_OPS: FixedOpcodes = FixedOpcodes {
    lock_on: 0x00,
    lock_off: 0x80,
    ptt_on: 0x08,
    ptt_off: 0x88,
    set_frequency: 0x01,
    set_mode: 0x07,
    read_freq_mode: 0x03,
    read_tx_status: 0xF7,
};

/// Icom IC-7100
pub static IC7100: CommandTable = CommandTable {
    variant: RigVariant::Ic7100,
    codec: CodecClass::AddressedFrame,
    serial: SerialParams {
        parity: Parity::None,
        stop_bits: StopBits::One,
        timeout: Duration::from_secs(5),
        // Unused by the terminator-framed codec; kept for reference
        read_len: 17,
    },
    modes: &[
        (Mode::Lsb, 0x00),
        (Mode::Usb, 0x01),
        (Mode::Am, 0x02),
        (Mode::Cw, 0x03),
        (Mode::Rtty, 0x04),
        (Mode::Fm, 0x05),
        (Mode::Wfm, 0x06),
        (Mode::CwR, 0x07),
        (Mode::RttyR, 0x08),
        (Mode::Dv, 0x17),
    ],
    bandwidths: &[
        (Mode::Lsb, 2200),
        (Mode::Usb, 2200),
        (Mode::Am, 6000),
        (Mode::Cw, 2200),
        (Mode::Rtty, 2200),
        (Mode::Fm, 9000),
        (Mode::Wfm, 15000),
        (Mode::CwR, 2200),
        (Mode::RttyR, 2200),
        (Mode::Dv, 6000),
    ],
};

pub static IC7100_OPS: CivOpcodes = CivOpcodes {
    rig_addr: 0x88,
    controller_addr: 0xE0,
    ack: 0xFB,
    nak: 0xFA,
    lock_cmd: 0x1A,
    lock_sub: &[0x05, 0x00, 0x14],
    lock_on: &[0x01],
    lock_off: &[0x00],
    ptt_cmd: 0x1C,
    ptt_sub: &[0x00],
    ptt_on: &[0x01],
    ptt_off: &[0x00],
    set_frequency: 0x00,
    set_mode: 0x01,
    read_frequency: 0x03,
    read_mode: 0x04,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_tables_are_bijective() {
        for variant in [RigVariant::Ft817Nd, RigVariant::Ic7100] {
            let table = CommandTable::for_variant(variant);
            for &(mode, id) in table.modes {
                assert_eq!(table.id_for_mode(mode), Some(id), "{variant} {mode}");
                assert_eq!(table.mode_for_id(id), Some(mode), "{variant} 0x{id:02X}");
            }
        }
    }

    #[test]
    fn every_mode_has_a_bandwidth() {
        for variant in [RigVariant::Ft817Nd, RigVariant::Ic7100] {
            let table = CommandTable::for_variant(variant);
            for &(mode, _) in table.modes {
                assert!(
                    table.bandwidth_for_mode(mode).is_some(),
                    "{variant} missing bandwidth for {mode}"
                );
            }
        }
    }

    #[test]
    fn unsupported_lookups_return_none() {
        let ft817 = CommandTable::for_variant(RigVariant::Ft817Nd);
        assert_eq!(ft817.id_for_mode(Mode::Dv), None);
        assert_eq!(ft817.mode_for_id(0x42), None);
        assert_eq!(ft817.bandwidth_for_mode(Mode::Wfm), None);
    }
}
