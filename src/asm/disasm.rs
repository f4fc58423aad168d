//! Disassembler for SIC programs.
//!
//! Converts memory words back to readable assembly.

use crate::asm::OpcodeTable;
use crate::cpu::{Instruction, WORD_BYTES};

/// Disassemble a single word to text.
///
/// Words whose opcode is not in the instruction set come out as `WORD`.
pub fn disassemble_word(optab: &OpcodeTable, word: u32) -> String {
    let Ok(instr) = Instruction::new(word) else {
        return format!("??? ; {:#X}", word);
    };

    match optab.mnemonic(instr.opcode()) {
        Some("RSUB") => "RSUB".to_string(),
        Some(mnemonic) if instr.is_indexed() => format!("{} {:#06X},X", mnemonic, instr.address()),
        Some(mnemonic) => format!("{} {:#06X}", mnemonic, instr.address()),
        None => format!("WORD {:#08X}", word),
    }
}

/// Disassemble consecutive words loaded at `start_addr`.
///
/// The listing stops at the first address that does not fit in a `u32`.
pub fn disassemble(words: &[u32], start_addr: u32) -> String {
    let optab = OpcodeTable::new();
    let mut output = String::new();
    output.push_str("; SIC Disassembly\n");
    output.push_str("; ---------------\n\n");

    for (i, &word) in words.iter().enumerate() {
        let Some(addr) = u32::try_from(i)
            .ok()
            .and_then(|i| i.checked_mul(WORD_BYTES))
            .and_then(|offset| start_addr.checked_add(offset))
        else {
            output.push_str("; address overflow, listing truncated\n");
            break;
        };
        let line = disassemble_word(&optab, word);
        output.push_str(&format!("{:06X}: {:<20} ; {:06X}\n", addr, line, word));
    }

    output
}
