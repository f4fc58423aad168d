//! SIC CPU registers.
//!
//! The SIC has 5 registers, all 24 bits wide:
//! - A: accumulator
//! - X: index register
//! - L: linkage register (return address for JSUB)
//! - PC: program counter
//! - SW: status word (condition code from COMP/TIX)

use crate::cpu::WORD_MASK;
use serde::{Serialize, Deserialize};
use std::str::FromStr;
use thiserror::Error;

/// One of the five SIC registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Register {
    A,
    X,
    L,
    Pc,
    Sw,
}

impl Register {
    /// Every register, in register-file order.
    pub const ALL: [Register; 5] = [Register::A, Register::X, Register::L, Register::Pc, Register::Sw];

    /// The assembler name of the register.
    pub fn name(self) -> &'static str {
        match self {
            Register::A => "A",
            Register::X => "X",
            Register::L => "L",
            Register::Pc => "PC",
            Register::Sw => "SW",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for Register {
    type Err = RegisterError;

    /// Parse a register name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Register::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| RegisterError::UnknownRegister(s.to_string()))
    }
}

impl std::fmt::Display for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.name())
    }
}

/// Result of the most recent comparison, as held in SW.
///
/// Encoded as the character codes of `<`, `=` and `>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionCode {
    Less,
    Equal,
    Greater,
}

impl ConditionCode {
    /// Compare two words.
    pub fn compare(lhs: u32, rhs: u32) -> Self {
        match lhs.cmp(&rhs) {
            std::cmp::Ordering::Less => ConditionCode::Less,
            std::cmp::Ordering::Equal => ConditionCode::Equal,
            std::cmp::Ordering::Greater => ConditionCode::Greater,
        }
    }

    /// The SW encoding of this condition.
    pub fn to_word(self) -> u32 {
        match self {
            ConditionCode::Less => b'<' as u32,
            ConditionCode::Equal => b'=' as u32,
            ConditionCode::Greater => b'>' as u32,
        }
    }

    /// Interpret an SW value. Anything other than the three sentinels is `None`.
    pub fn from_word(word: u32) -> Option<Self> {
        match word {
            w if w == b'<' as u32 => Some(ConditionCode::Less),
            w if w == b'=' as u32 => Some(ConditionCode::Equal),
            w if w == b'>' as u32 => Some(ConditionCode::Greater),
            _ => None,
        }
    }
}

/// The SIC register file.
///
/// Every write is masked to 24 bits, including values read back from a snapshot.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RegisterSnapshot")]
pub struct Registers {
    values: [u32; 5],
}

#[derive(Deserialize)]
struct RegisterSnapshot {
    values: [u32; 5],
}

impl From<RegisterSnapshot> for Registers {
    fn from(snapshot: RegisterSnapshot) -> Self {
        Self {
            values: snapshot.values.map(|v| v & WORD_MASK),
        }
    }
}

impl Registers {
    /// Create a new register file with all values zeroed.
    pub fn new() -> Self {
        Self { values: [0; 5] }
    }

    /// Reset all registers to zero.
    pub fn reset(&mut self) {
        self.values = [0; 5];
    }

    /// Read a register.
    #[inline]
    pub fn get(&self, reg: Register) -> u32 {
        self.values[reg.index()]
    }

    /// Write a register, discarding bits above the low 24.
    #[inline]
    pub fn set(&mut self, reg: Register, value: u32) {
        self.values[reg.index()] = value & WORD_MASK;
    }

    /// Read a register by name.
    pub fn get_named(&self, name: &str) -> Result<u32, RegisterError> {
        Ok(self.get(name.parse()?))
    }

    /// Write a register by name.
    pub fn set_named(&mut self, name: &str, value: u32) -> Result<(), RegisterError> {
        self.set(name.parse()?, value);
        Ok(())
    }

    /// Read the accumulator.
    pub fn a(&self) -> u32 {
        self.get(Register::A)
    }

    /// Write the accumulator, masked to 24 bits.
    pub fn set_a(&mut self, value: u32) {
        self.set(Register::A, value);
    }

    /// Read the index register.
    pub fn x(&self) -> u32 {
        self.get(Register::X)
    }

    /// Write the index register, masked to 24 bits.
    pub fn set_x(&mut self, value: u32) {
        self.set(Register::X, value);
    }

    /// Read the linkage register.
    pub fn l(&self) -> u32 {
        self.get(Register::L)
    }

    /// Write the linkage register, masked to 24 bits.
    pub fn set_l(&mut self, value: u32) {
        self.set(Register::L, value);
    }

    /// Read the program counter.
    pub fn pc(&self) -> u32 {
        self.get(Register::Pc)
    }

    /// Write the program counter, masked to 24 bits.
    pub fn set_pc(&mut self, value: u32) {
        self.set(Register::Pc, value);
    }

    /// Read the status word.
    pub fn sw(&self) -> u32 {
        self.get(Register::Sw)
    }

    /// Write the status word, masked to 24 bits.
    pub fn set_sw(&mut self, value: u32) {
        self.set(Register::Sw, value);
    }

    /// The condition code held in SW, if SW holds one.
    pub fn condition_code(&self) -> Option<ConditionCode> {
        ConditionCode::from_word(self.sw())
    }

    /// Store a condition code in SW.
    pub fn set_condition_code(&mut self, cc: ConditionCode) {
        self.set_sw(cc.to_word());
    }

    /// Compute an effective address: `addr`, plus X when `indexed`.
    ///
    /// The sum is not masked; an address past the end of memory is caught
    /// by the memory access that uses it. It saturates at `u32::MAX`.
    pub fn effective_address(&self, addr: u32, indexed: bool) -> u32 {
        if indexed {
            addr.saturating_add(self.x())
        } else {
            addr
        }
    }
}

impl std::fmt::Debug for Registers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("Registers");
        for reg in Register::ALL {
            s.field(reg.name(), &format_args!("{:06X}", self.get(reg)));
        }
        s.finish()
    }
}

impl std::fmt::Display for Registers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, reg) in Register::ALL.into_iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={:06X}", reg, self.get(reg))?;
        }
        Ok(())
    }
}

/// Errors from named register access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    #[error("unknown register: {0}")]
    UnknownRegister(String),
}
