//! Assembler front end and disassembler for SIC programs.
//!
//! This module provides:
//! - the opcode and symbol tables
//! - directive sizing and a source line parser
//! - Pass One of the two-pass assembler (symbols and program length)
//! - a disassembler (memory words → readable text)

pub mod optab;
pub mod symtab;
pub mod directive;
pub mod parser;
pub mod pass_one;
pub mod disasm;

pub use optab::{OpcodeTable, OpcodeError};
pub use symtab::{SymbolTable, SymbolError};
pub use directive::{Directive, DirectiveError};
pub use parser::{LineParser, SourceLine};
pub use pass_one::{PassOne, PassOneResult, AssemblerError};
pub use disasm::{disassemble, disassemble_word};
