//! The opcode table (OPTAB).
//!
//! Maps SIC mnemonics to opcodes for the assembler, and opcodes back to
//! mnemonics for the disassembler. Lookups ignore case.

use crate::cpu::decode::opcode;
use std::collections::HashMap;
use thiserror::Error;

/// The standard SIC instruction set.
const INSTRUCTIONS: [(&str, u8); 26] = [
    ("ADD", opcode::ADD),
    ("AND", opcode::AND),
    ("COMP", opcode::COMP),
    ("DIV", opcode::DIV),
    ("J", opcode::J),
    ("JEQ", opcode::JEQ),
    ("JGT", opcode::JGT),
    ("JLT", opcode::JLT),
    ("JSUB", opcode::JSUB),
    ("LDA", opcode::LDA),
    ("LDCH", opcode::LDCH),
    ("LDL", opcode::LDL),
    ("LDX", opcode::LDX),
    ("MUL", opcode::MUL),
    ("OR", opcode::OR),
    ("RD", opcode::RD),
    ("RSUB", opcode::RSUB),
    ("STA", opcode::STA),
    ("STCH", opcode::STCH),
    ("STL", opcode::STL),
    ("STSW", opcode::STSW),
    ("STX", opcode::STX),
    ("SUB", opcode::SUB),
    ("TD", opcode::TD),
    ("TIX", opcode::TIX),
    ("WD", opcode::WD),
];

/// Mnemonic to opcode mapping.
#[derive(Debug, Clone)]
pub struct OpcodeTable {
    by_mnemonic: HashMap<&'static str, u8>,
    by_opcode: HashMap<u8, &'static str>,
}

impl OpcodeTable {
    /// Create the table for the standard SIC instructions.
    pub fn new() -> Self {
        Self {
            by_mnemonic: INSTRUCTIONS.iter().copied().collect(),
            by_opcode: INSTRUCTIONS.iter().map(|&(m, op)| (op, m)).collect(),
        }
    }

    /// Look up the opcode of a mnemonic.
    pub fn get_opcode(&self, mnemonic: &str) -> Result<u8, OpcodeError> {
        self.by_mnemonic
            .get(mnemonic.to_uppercase().as_str())
            .copied()
            .ok_or_else(|| OpcodeError::UnknownMnemonic(mnemonic.to_string()))
    }

    /// Whether `mnemonic` names an instruction.
    pub fn is_mnemonic(&self, mnemonic: &str) -> bool {
        self.by_mnemonic.contains_key(mnemonic.to_uppercase().as_str())
    }

    /// The mnemonic of an opcode, if it is part of the instruction set.
    pub fn mnemonic(&self, opcode: u8) -> Option<&'static str> {
        self.by_opcode.get(&opcode).copied()
    }

    pub fn len(&self) -> usize {
        self.by_mnemonic.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_mnemonic.is_empty()
    }
}

impl Default for OpcodeTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors from opcode lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpcodeError {
    #[error("unknown mnemonic: {0}")]
    UnknownMnemonic(String),
}
