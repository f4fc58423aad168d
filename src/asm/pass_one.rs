//! Pass One of the SIC assembler.
//!
//! Walks the source once, assigning an address to every label and working
//! out how long the program is. No code is generated.

use crate::asm::directive::{Directive, DirectiveError};
use crate::asm::parser::{LineParser, SourceLine};
use crate::asm::symtab::{SymbolError, SymbolTable};
use crate::asm::OpcodeTable;
use crate::cpu::{MEMORY_SIZE, WORD_BYTES};
use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::{event, Level};

/// What Pass One learns about the program besides its symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassOneResult {
    /// Label on the START statement, if any.
    pub program_name: Option<String>,
    pub start_address: u32,
    /// Bytes from the start address to the final location counter.
    pub program_length: u32,
    /// Address named by END, or the start address.
    pub execution_start_address: u32,
}

/// Pass One driver.
#[derive(Debug, Clone, Default)]
pub struct PassOne {
    parser: LineParser,
    optab: OpcodeTable,
}

impl PassOne {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run Pass One over `source_lines`.
    pub fn run<S: AsRef<str>>(&self, source_lines: &[S]) -> Result<(SymbolTable, PassOneResult), AssemblerError> {
        let mut symtab = SymbolTable::new();
        let mut program_name = None;
        let mut start_address = 0;
        let mut locctr: u32 = 0;
        let mut end_operand: Option<(usize, String)> = None;
        let mut first_statement = true;

        for (idx, raw) in source_lines.iter().enumerate() {
            let line = idx + 1;
            let Some(stmt) = self.parser.parse(raw.as_ref()) else {
                continue;
            };
            let SourceLine { label, mnemonic, operand } = stmt;
            let is_first = std::mem::replace(&mut first_statement, false);

            let Some(mnemonic) = mnemonic else {
                return Err(AssemblerError::SyntaxError {
                    line,
                    message: "missing mnemonic".into(),
                });
            };
            let directive = mnemonic.parse::<Directive>().ok();

            if directive == Some(Directive::Start) {
                if !is_first {
                    return Err(AssemblerError::SyntaxError {
                        line,
                        message: "START must be the first statement".into(),
                    });
                }
                start_address = parse_start_address(operand.as_deref(), line)?;
                locctr = start_address;
                event!(Level::DEBUG, "program starts at {:06X}", start_address);
            }

            if let Some(label) = label {
                symtab
                    .add_symbol(&label, locctr)
                    .map_err(|source| AssemblerError::Symbol { line, source })?;
                event!(Level::DEBUG, "defined {} = {:06X}", label.to_uppercase(), locctr);
                if directive == Some(Directive::Start) {
                    program_name = Some(label.to_uppercase());
                }
            }

            let size = match directive {
                Some(Directive::End) => {
                    end_operand = operand.map(|op| (line, op));
                    break;
                }
                Some(d) => d
                    .size_in_bytes(operand.as_deref())
                    .map_err(|source| AssemblerError::Directive { line, source })?,
                None if self.optab.is_mnemonic(&mnemonic) => WORD_BYTES,
                None => {
                    return Err(AssemblerError::UnknownMnemonic { line, mnemonic });
                }
            };

            locctr = locctr
                .checked_add(size)
                .filter(|&end| end <= MEMORY_SIZE)
                .ok_or(AssemblerError::ProgramTooLarge { line })?;
        }

        let execution_start_address = match end_operand {
            Some((line, label)) => symtab
                .get_address(&label)
                .map_err(|source| AssemblerError::Symbol { line, source })?,
            None => start_address,
        };

        let result = PassOneResult {
            program_name,
            start_address,
            program_length: locctr - start_address,
            execution_start_address,
        };

        event!(
            Level::DEBUG,
            "pass one complete: {} symbols, length {:X}",
            symtab.len(),
            result.program_length
        );

        Ok((symtab, result))
    }
}

/// START's operand: a hex address.
fn parse_start_address(operand: Option<&str>, line: usize) -> Result<u32, AssemblerError> {
    let operand = operand.ok_or_else(|| AssemblerError::SyntaxError {
        line,
        message: "START requires an address".into(),
    })?;

    u32::from_str_radix(operand, 16)
        .ok()
        .filter(|&addr| addr < MEMORY_SIZE)
        .ok_or_else(|| AssemblerError::SyntaxError {
            line,
            message: format!("invalid START address: {}", operand),
        })
}

/// Errors that can occur during assembly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblerError {
    #[error("syntax error on line {line}: {message}")]
    SyntaxError { line: usize, message: String },

    #[error("unknown mnemonic on line {line}: {mnemonic}")]
    UnknownMnemonic { line: usize, mnemonic: String },

    #[error("line {line}: {source}")]
    Symbol { line: usize, source: SymbolError },

    #[error("line {line}: {source}")]
    Directive { line: usize, source: DirectiveError },

    #[error("program exceeds memory on line {line}")]
    ProgramTooLarge { line: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &[&str]) -> Result<(SymbolTable, PassOneResult), AssemblerError> {
        PassOne::new().run(source)
    }

    #[test]
    fn test_simple_program() {
        let (symtab, result) = run(&[
            "COPY    START   1000",
            "FIRST   LDA     FIVE",
            "        STA     ALPHA",
            "FIVE    WORD    5",
            "ALPHA   RESW    1",
            "        END     FIRST",
        ])
        .unwrap();

        assert_eq!(result.program_length, 12);
        assert_eq!(result.program_name.as_deref(), Some("COPY"));
        assert_eq!(result.start_address, 0x1000);
        assert_eq!(result.execution_start_address, 0x1000);
        assert_eq!(symtab.get_address("COPY"), Ok(0x1000));
        assert_eq!(symtab.get_address("FIRST"), Ok(0x1000));
        assert_eq!(symtab.get_address("FIVE"), Ok(0x1006));
        assert_eq!(symtab.get_address("ALPHA"), Ok(0x1009));
    }

    #[test]
    fn test_missing_start_defaults_to_zero() {
        let (symtab, result) = run(&[
            "FIRST   STL     RETADR",
            "RETADR  RESW    1",
            "        END     FIRST",
        ])
        .unwrap();

        assert_eq!(result.program_length, 6);
        assert_eq!(result.program_name, None);
        assert_eq!(symtab.get_address("FIRST"), Ok(0));
        assert_eq!(symtab.get_address("RETADR"), Ok(3));
    }

    #[test]
    fn test_end_operand_is_execution_start() {
        let (_, result) = run(&[
            "COPY    START   2000",
            "ZERO    WORD    0",
            "FIRST   LDA     ZERO",
            "        END     FIRST",
        ])
        .unwrap();

        assert_eq!(result.execution_start_address, 0x2003);
    }

    #[test]
    fn test_end_without_operand() {
        let (_, result) = run(&["COPY START 2000", "     RSUB", "     END"]).unwrap();
        assert_eq!(result.execution_start_address, 0x2000);
        assert_eq!(result.program_length, 3);
    }

    #[test]
    fn test_end_stops_processing() {
        let (symtab, result) = run(&[
            "FIRST   LDA     ZERO",
            "        END     FIRST",
            "ZERO    WORD    0",
        ])
        .unwrap();

        assert!(!symtab.has_symbol("ZERO"));
        assert_eq!(result.program_length, 3);
    }

    #[test]
    fn test_duplicate_symbol() {
        let err = run(&[
            "COPY    START   1000",
            "FIRST   STL     RETADR",
            "FIRST   LDA     ALPHA",
            "        END     FIRST",
        ])
        .unwrap_err();

        assert_eq!(
            err,
            AssemblerError::Symbol {
                line: 3,
                source: SymbolError::DuplicateSymbol("FIRST".to_string()),
            }
        );
        assert!(err.to_string().contains("duplicate symbol found: FIRST"));
    }

    #[test]
    fn test_comment_lines() {
        let (symtab, result) = run(&[
            "COPY    START   2000",
            ". THIS IS A COMMENT, SHOULD BE IGNORED",
            "",
            "FIRST   LDA     BETA",
            "BETA    RESW    1",
            "        END     COPY",
        ])
        .unwrap();

        assert_eq!(result.program_length, 6);
        assert_eq!(symtab.get_address("FIRST"), Ok(0x2000));
        assert_eq!(symtab.get_address("BETA"), Ok(0x2003));
        assert_eq!(result.execution_start_address, 0x2000);
    }

    #[test]
    fn test_byte_and_resb() {
        let (symtab, result) = run(&[
            "COPY    START   0",
            "EOF     BYTE    C'EOF'",
            "OUTDEV  BYTE    X'05'",
            "BUFFER  RESB    4096",
            "LAST    RSUB",
            "        END",
        ])
        .unwrap();

        assert_eq!(symtab.get_address("OUTDEV"), Ok(3));
        assert_eq!(symtab.get_address("BUFFER"), Ok(4));
        assert_eq!(symtab.get_address("LAST"), Ok(4100));
        assert_eq!(result.program_length, 4103);
    }

    #[test]
    fn test_unknown_mnemonic() {
        assert_eq!(
            run(&["FIRST   JUMP    THERE"]).unwrap_err(),
            AssemblerError::UnknownMnemonic { line: 1, mnemonic: "JUMP".to_string() }
        );
    }

    #[test]
    fn test_undefined_end_label() {
        assert!(matches!(
            run(&["FIRST RSUB", "      END NOWHERE"]).unwrap_err(),
            AssemblerError::Symbol { line: 2, source: SymbolError::UndefinedSymbol(_) }
        ));
    }

    #[test]
    fn test_directive_errors() {
        assert!(matches!(
            run(&["BUF RESW"]).unwrap_err(),
            AssemblerError::Directive { line: 1, source: DirectiveError::MissingOperand(Directive::Resw) }
        ));
        assert!(matches!(
            run(&["COPY START"]).unwrap_err(),
            AssemblerError::SyntaxError { line: 1, .. }
        ));
        assert!(matches!(
            run(&["COPY START ZZZZ"]).unwrap_err(),
            AssemblerError::SyntaxError { line: 1, .. }
        ));
    }

    #[test]
    fn test_start_must_come_first() {
        assert!(matches!(
            run(&["FIRST RSUB", "COPY START 1000"]).unwrap_err(),
            AssemblerError::SyntaxError { line: 2, .. }
        ));
    }

    #[test]
    fn test_program_too_large() {
        assert_eq!(
            run(&["COPY START 7FF0", "BUF RESB 32"]).unwrap_err(),
            AssemblerError::ProgramTooLarge { line: 2 }
        );
    }

    #[test]
    fn test_label_without_mnemonic() {
        assert!(matches!(
            run(&["LONELY"]).unwrap_err(),
            AssemblerError::SyntaxError { line: 1, .. }
        ));
    }
}
