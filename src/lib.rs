//! # SIC Emulator
//!
//! An emulator of the SIC, the simplified instructional computer used to
//! teach systems programming.
//!
//! The machine has 32K bytes of memory, five 24-bit registers and a single
//! 24-bit instruction format. Alongside the CPU lives the front end of a
//! two-pass assembler: the opcode and symbol tables and Pass One.

pub mod cpu;
pub mod asm;
pub mod image;

// Re-export commonly used types
pub use cpu::{Cpu, CpuError, Instruction, Machine, Memory, MemoryError, Register, Registers};
pub use asm::{disassemble, AssemblerError, OpcodeTable, PassOne, SymbolTable};
pub use image::{load_image, ImageError, ProgramImage};
