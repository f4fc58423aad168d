//! CPU emulation for the SIC computer.
//!
//! This module implements the SIC architecture:
//! - 32,768 bytes of byte-addressable memory, 24-bit big-endian words
//! - 5 registers: A (accumulator), X (index), L (linkage), PC, SW (status)
//! - single 24-bit instruction format: opcode, index bit, 15-bit address

pub mod memory;
pub mod registers;
pub mod decode;
pub mod execute;
pub mod machine;

/// Width of a SIC word in bytes.
pub const WORD_BYTES: u32 = 3;

/// Mask selecting the 24 bits of a SIC word.
pub const WORD_MASK: u32 = 0xFF_FFFF;

pub use memory::{Memory, MemoryError, MEMORY_SIZE};
pub use registers::{Registers, Register, RegisterError, ConditionCode};
pub use decode::{Instruction, DecodeError};
pub use execute::{Cpu, CpuError};
pub use machine::Machine;
