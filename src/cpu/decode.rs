//! Instruction decoder for the SIC.
//!
//! Every SIC instruction is one 24-bit word:
//!
//! ```text
//!  23        16   15   14                  0
//! +------------+----+---------------------+
//! |   opcode   |  x |       address       |
//! +------------+----+---------------------+
//! ```
//!
//! Decoding never looks at whether the opcode is one the CPU can execute;
//! that is checked at dispatch time.

use crate::cpu::WORD_MASK;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Opcode values of the standard SIC instruction set.
pub mod opcode {
    pub const LDA: u8 = 0x00;
    pub const LDX: u8 = 0x04;
    pub const LDL: u8 = 0x08;
    pub const STA: u8 = 0x0C;
    pub const STX: u8 = 0x10;
    pub const STL: u8 = 0x14;
    pub const ADD: u8 = 0x18;
    pub const SUB: u8 = 0x1C;
    pub const MUL: u8 = 0x20;
    pub const DIV: u8 = 0x24;
    pub const COMP: u8 = 0x28;
    pub const TIX: u8 = 0x2C;
    pub const JEQ: u8 = 0x30;
    pub const JGT: u8 = 0x34;
    pub const JLT: u8 = 0x38;
    pub const J: u8 = 0x3C;
    pub const AND: u8 = 0x40;
    pub const OR: u8 = 0x44;
    pub const JSUB: u8 = 0x48;
    pub const RSUB: u8 = 0x4C;
    pub const LDCH: u8 = 0x50;
    pub const STCH: u8 = 0x54;
    pub const RD: u8 = 0xD8;
    pub const WD: u8 = 0xDC;
    pub const TD: u8 = 0xE0;
    pub const STSW: u8 = 0xE8;
}

const X_BIT: u32 = 1 << 15;
const ADDRESS_MASK: u32 = 0x7FFF;

/// A decoded SIC instruction word.
///
/// Serializes as the bare word; deserializing goes through [`Instruction::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Instruction {
    word: u32,
}

impl Instruction {
    /// Decode a 24-bit word.
    pub fn new(word: u32) -> Result<Self, DecodeError> {
        if word > WORD_MASK {
            return Err(DecodeError::InvalidWord(word));
        }
        Ok(Self { word })
    }

    /// Build an instruction from its fields.
    ///
    /// `address` is truncated to 15 bits.
    pub fn encode(opcode: u8, indexed: bool, address: u32) -> Self {
        let x = if indexed { X_BIT } else { 0 };
        Self {
            word: (opcode as u32) << 16 | x | (address & ADDRESS_MASK),
        }
    }

    /// The raw 24-bit word.
    pub fn word(&self) -> u32 {
        self.word
    }

    /// Bits 23-16.
    pub fn opcode(&self) -> u8 {
        (self.word >> 16) as u8
    }

    /// Bit 15: 1 when the index register is added to the address.
    pub fn x(&self) -> u8 {
        ((self.word >> 15) & 1) as u8
    }

    pub fn is_indexed(&self) -> bool {
        self.word & X_BIT != 0
    }

    /// Bits 14-0.
    pub fn address(&self) -> u32 {
        self.word & ADDRESS_MASK
    }
}

impl TryFrom<u32> for Instruction {
    type Error = DecodeError;

    fn try_from(word: u32) -> Result<Self, Self::Error> {
        Instruction::new(word)
    }
}

impl From<Instruction> for u32 {
    fn from(instr: Instruction) -> u32 {
        instr.word
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:06X} (op={:02X} x={} addr={:04X})", self.word, self.opcode(), self.x(), self.address())
    }
}

/// Errors that can occur during instruction decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid instruction word {0:#X}: does not fit in 24 bits")]
    InvalidWord(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_indexed() {
        // STA 0x2000,X
        let instr = Instruction::new(0x0CA000).unwrap();
        assert_eq!(instr.opcode(), 0x0C);
        assert_eq!(instr.x(), 1);
        assert!(instr.is_indexed());
        assert_eq!(instr.address(), 0x2000);
    }

    #[test]
    fn test_decode_direct() {
        // LDA 0x1000
        let instr = Instruction::new(0x001000).unwrap();
        assert_eq!(instr.opcode(), 0x00);
        assert_eq!(instr.x(), 0);
        assert!(!instr.is_indexed());
        assert_eq!(instr.address(), 0x1000);
    }

    #[test]
    fn test_decode_extremes() {
        let instr = Instruction::new(0xFFFFFF).unwrap();
        assert_eq!(instr.opcode(), 0xFF);
        assert_eq!(instr.x(), 1);
        assert_eq!(instr.address(), 0x7FFF);

        let instr = Instruction::new(0).unwrap();
        assert_eq!((instr.opcode(), instr.x(), instr.address()), (0, 0, 0));
    }

    #[test]
    fn test_invalid_word() {
        assert_eq!(Instruction::new(0x1000000), Err(DecodeError::InvalidWord(0x1000000)));
        assert!(Instruction::try_from(u32::MAX).is_err());
    }

    #[test]
    fn test_serde_checks_width() {
        let instr: Instruction = serde_json::from_str("827392").unwrap();
        assert_eq!(instr.word(), 0x0CA000);
        assert_eq!(serde_json::to_string(&instr).unwrap(), "827392");

        let err = serde_json::from_str::<Instruction>("16777216").unwrap_err();
        assert!(err.to_string().contains("does not fit in 24 bits"), "{}", err);
    }

    #[test]
    fn test_encode() {
        assert_eq!(Instruction::encode(opcode::STA, true, 0x2000).word(), 0x0CA000);
        assert_eq!(Instruction::encode(opcode::LDA, false, 0x1050).word(), 0x001050);
        // address wider than 15 bits is cut, never spilling into x
        assert_eq!(Instruction::encode(opcode::J, false, 0x8001).word(), 0x3C0001);
    }
}
