//! The complete SIC machine: memory, registers and the CPU that runs them.

use crate::cpu::{Cpu, CpuError, Instruction, Memory, MemoryError, Registers};
use crate::image::ProgramImage;
use serde::{Serialize, Deserialize};
use tracing::{event, Level};

/// A SIC machine.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    /// CPU registers.
    pub registers: Registers,
    /// Main memory.
    pub memory: Memory,
}

impl Machine {
    /// Create a machine with zeroed memory and registers.
    pub fn new() -> Self {
        Self {
            registers: Registers::new(),
            memory: Memory::new(),
        }
    }

    /// A CPU bound to this machine's registers and memory.
    pub fn cpu(&mut self) -> Cpu<'_> {
        Cpu::new(&mut self.registers, &mut self.memory)
    }

    /// Reset memory and registers to zero.
    pub fn reset(&mut self) {
        self.registers.reset();
        self.memory.clear();
        event!(Level::DEBUG, "machine reset");
    }

    /// Write `program` as consecutive words starting at `start_addr`.
    ///
    /// PC is left alone.
    pub fn load_program(&mut self, program: &[u32], start_addr: u32) -> Result<(), MemoryError> {
        self.memory.load_words(start_addr, program)?;
        event!(
            Level::DEBUG,
            "loaded {} words at {:06X}",
            program.len(),
            start_addr
        );
        Ok(())
    }

    /// Load an image and point PC at its entry address.
    pub fn load_image(&mut self, image: &ProgramImage) -> Result<(), MemoryError> {
        self.load_program(&image.words, image.start_address)?;
        self.registers.set_pc(image.entry_address());
        Ok(())
    }

    /// Execute a single instruction.
    pub fn step(&mut self) -> Result<Instruction, CpuError> {
        self.cpu().step()
    }

    /// Execute `steps` instructions, stopping at the first error.
    pub fn run(&mut self, steps: u64) -> Result<(), CpuError> {
        self.cpu().run(steps)
    }
}
