//! Error types surfaced by the core.

use std::fmt;

/// Failures the core can report. Cartridge-format failures come back
/// synchronously from [`crate::Machine::load`]; everything else is either
/// logged-and-swallowed or surfaced through non-`Result` state (see
/// [`crate::cpu::Cpu::fault`]).
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error("cartridge header checksum mismatch: expected {expected:#04x}, computed {computed:#04x}")]
    BadChecksum { expected: u8, computed: u8 },

    #[error("unsupported cartridge mapper code {code:#04x}")]
    UnsupportedMapper { code: u8 },

    #[error("rom too small: expected at least {expected} bytes, got {actual}")]
    TruncatedRom { expected: usize, actual: usize },
}

/// Details recorded when the CPU hits an opcode it cannot decode. Never
/// causes a panic; the host is expected to surface it in a debug view
/// instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeFault {
    pub pc: u16,
    pub opcode: u8,
    pub prefixed: bool,
}

impl fmt::Display for OpcodeFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefixed {
            write!(f, "unimplemented opcode CB {:#04x} at {:#06x}", self.opcode, self.pc)
        } else {
            write!(f, "unimplemented opcode {:#04x} at {:#06x}", self.opcode, self.pc)
        }
    }
}
