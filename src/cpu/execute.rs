//! CPU execution engine for the SIC.
//!
//! Implements the fetch-decode-execute cycle and all instruction behaviors.

use crate::cpu::decode::{opcode, DecodeError, Instruction};
use crate::cpu::memory::MemoryError;
use crate::cpu::registers::ConditionCode;
use crate::cpu::{Memory, Registers, WORD_BYTES};
use thiserror::Error;
use tracing::{event, Level};

/// The SIC CPU.
///
/// Works on a register file and memory it borrows for its lifetime; the
/// program counter in `Registers` is the only execution state.
pub struct Cpu<'m> {
    registers: &'m mut Registers,
    memory: &'m mut Memory,
}

impl<'m> Cpu<'m> {
    pub fn new(registers: &'m mut Registers, memory: &'m mut Memory) -> Self {
        Self { registers, memory }
    }

    pub fn registers(&self) -> &Registers {
        self.registers
    }

    pub fn memory(&self) -> &Memory {
        self.memory
    }

    /// Read and decode the word at PC.
    pub fn fetch(&self) -> Result<Instruction, CpuError> {
        let raw = self.memory.read_word(self.registers.pc())?;
        Ok(Instruction::new(raw)?)
    }

    /// Execute a single instruction.
    ///
    /// PC is advanced past the instruction before it executes, so branches
    /// simply overwrite it. A failing step keeps that advance.
    ///
    /// Returns the instruction that was executed, or an error.
    pub fn step(&mut self) -> Result<Instruction, CpuError> {
        let pc = self.registers.pc();
        let instr = self.fetch()?;

        self.registers.set_pc(pc + WORD_BYTES);

        event!(Level::TRACE, pc = pc, "executing {}", instr);

        if let Err(e) = self.execute(instr, pc) {
            event!(Level::WARN, "instruction {} at {:06X} failed: {}", instr, pc, e);
            return Err(e);
        }

        Ok(instr)
    }

    /// Run exactly `steps` instructions, stopping at the first error.
    pub fn run(&mut self, steps: u64) -> Result<(), CpuError> {
        for _ in 0..steps {
            self.step()?;
        }
        Ok(())
    }

    /// Execute a decoded instruction fetched from `pc`.
    fn execute(&mut self, instr: Instruction, pc: u32) -> Result<(), CpuError> {
        let ea = self.registers.effective_address(instr.address(), instr.is_indexed());

        match instr.opcode() {
            // ==================== Load / Store ====================

            opcode::LDA => {
                let value = self.memory.read_word(ea)?;
                self.registers.set_a(value);
            }

            opcode::LDX => {
                let value = self.memory.read_word(ea)?;
                self.registers.set_x(value);
            }

            opcode::LDL => {
                let value = self.memory.read_word(ea)?;
                self.registers.set_l(value);
            }

            opcode::STA => self.memory.write_word(ea, self.registers.a())?,
            opcode::STX => self.memory.write_word(ea, self.registers.x())?,
            opcode::STL => self.memory.write_word(ea, self.registers.l())?,
            opcode::STSW => self.memory.write_word(ea, self.registers.sw())?,

            opcode::LDCH => {
                let byte = self.memory.read_byte(ea)? as u32;
                let a = self.registers.a();
                self.registers.set_a((a & 0xFF_FF00) | byte);
            }

            opcode::STCH => self.memory.write_byte(ea, self.registers.a())?,

            // ==================== Arithmetic ====================

            opcode::ADD => {
                let operand = self.memory.read_word(ea)?;
                let a = self.registers.a();
                self.registers.set_a(a.wrapping_add(operand));
            }

            opcode::SUB => {
                let operand = self.memory.read_word(ea)?;
                let a = self.registers.a();
                self.registers.set_a(a.wrapping_sub(operand));
            }

            opcode::MUL => {
                let operand = self.memory.read_word(ea)?;
                let a = self.registers.a();
                self.registers.set_a(a.wrapping_mul(operand));
            }

            opcode::DIV => {
                let divisor = self.memory.read_word(ea)?;
                if divisor == 0 {
                    return Err(CpuError::DivisionByZero { addr: pc });
                }
                let a = self.registers.a();
                self.registers.set_a(a / divisor);
            }

            opcode::AND => {
                let operand = self.memory.read_word(ea)?;
                let a = self.registers.a();
                self.registers.set_a(a & operand);
            }

            opcode::OR => {
                let operand = self.memory.read_word(ea)?;
                let a = self.registers.a();
                self.registers.set_a(a | operand);
            }

            // ==================== Compare ====================

            opcode::COMP => {
                let operand = self.memory.read_word(ea)?;
                let cc = ConditionCode::compare(self.registers.a(), operand);
                self.registers.set_condition_code(cc);
            }

            opcode::TIX => {
                let operand = self.memory.read_word(ea)?;
                let x = self.registers.x();
                self.registers.set_x(x + 1);
                let cc = ConditionCode::compare(self.registers.x(), operand);
                self.registers.set_condition_code(cc);
            }

            // ==================== Control Flow ====================

            opcode::J => self.registers.set_pc(ea),

            opcode::JEQ => self.jump_if(ConditionCode::Equal, ea),
            opcode::JGT => self.jump_if(ConditionCode::Greater, ea),
            opcode::JLT => self.jump_if(ConditionCode::Less, ea),

            opcode::JSUB => {
                let ret = self.registers.pc();
                self.registers.set_l(ret);
                self.registers.set_pc(ea);
            }

            opcode::RSUB => {
                let ret = self.registers.l();
                self.registers.set_pc(ret);
            }

            // RD, WD, TD and anything outside the instruction set
            other => {
                return Err(CpuError::UnimplementedOpcode { opcode: other, addr: pc });
            }
        }

        Ok(())
    }

    fn jump_if(&mut self, cc: ConditionCode, target: u32) {
        if self.registers.condition_code() == Some(cc) {
            self.registers.set_pc(target);
        }
    }
}

impl std::fmt::Debug for Cpu<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cpu")
            .field("regs", &self.registers)
            .field("mem", &self.memory)
            .finish()
    }
}

/// Errors that can occur during CPU execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("memory error: {0}")]
    MemoryError(#[from] MemoryError),

    #[error("decode error: {0}")]
    DecodeError(#[from] DecodeError),

    #[error("unimplemented opcode {opcode:#04X} at {addr:#06X}")]
    UnimplementedOpcode { opcode: u8, addr: u32 },

    #[error("division by zero at {addr:#06X}")]
    DivisionByZero { addr: u32 },
}
