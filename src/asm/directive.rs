//! Assembler directives and how much storage each reserves.

use crate::cpu::WORD_BYTES;
use std::str::FromStr;
use thiserror::Error;

/// A SIC assembler directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Program name and load address (hex).
    Start,
    /// End of source; operand names the first instruction.
    End,
    /// Character (`C'EOF'`) or hex (`X'F1'`) constant.
    Byte,
    /// One-word integer constant.
    Word,
    /// Reserve n bytes.
    Resb,
    /// Reserve n words.
    Resw,
}

impl Directive {
    pub fn name(self) -> &'static str {
        match self {
            Directive::Start => "START",
            Directive::End => "END",
            Directive::Byte => "BYTE",
            Directive::Word => "WORD",
            Directive::Resb => "RESB",
            Directive::Resw => "RESW",
        }
    }

    /// Number of bytes the directive adds to the location counter.
    pub fn size_in_bytes(self, operand: Option<&str>) -> Result<u32, DirectiveError> {
        match self {
            Directive::Start | Directive::End => Ok(0),
            Directive::Word => Ok(WORD_BYTES),
            Directive::Resw => {
                let count = self.count(operand)?;
                count
                    .checked_mul(WORD_BYTES)
                    .ok_or_else(|| DirectiveError::InvalidOperand {
                        directive: self,
                        operand: count.to_string(),
                    })
            }
            Directive::Resb => self.count(operand),
            Directive::Byte => byte_constant_len(self.required(operand)?),
        }
    }

    fn required(self, operand: Option<&str>) -> Result<&str, DirectiveError> {
        operand.ok_or(DirectiveError::MissingOperand(self))
    }

    /// Decimal count operand of RESB/RESW.
    fn count(self, operand: Option<&str>) -> Result<u32, DirectiveError> {
        let operand = self.required(operand)?;
        operand.parse().map_err(|_| DirectiveError::InvalidOperand {
            directive: self,
            operand: operand.to_string(),
        })
    }
}

/// Length in bytes of a `C'...'` or `X'...'` constant.
fn byte_constant_len(operand: &str) -> Result<u32, DirectiveError> {
    let invalid = || DirectiveError::InvalidOperand {
        directive: Directive::Byte,
        operand: operand.to_string(),
    };

    let mut chars = operand.chars();
    let kind = chars.next().ok_or_else(invalid)?.to_ascii_uppercase();
    let body = chars
        .as_str()
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
        .ok_or_else(invalid)?;

    match kind {
        'C' => Ok(body.chars().count() as u32),
        // an odd trailing digit is dropped
        'X' if body.chars().all(|c| c.is_ascii_hexdigit()) => Ok(body.len() as u32 / 2),
        _ => Err(invalid()),
    }
}

impl FromStr for Directive {
    type Err = DirectiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "START" => Ok(Directive::Start),
            "END" => Ok(Directive::End),
            "BYTE" => Ok(Directive::Byte),
            "WORD" => Ok(Directive::Word),
            "RESB" => Ok(Directive::Resb),
            "RESW" => Ok(Directive::Resw),
            _ => Err(DirectiveError::UnknownDirective(s.to_string())),
        }
    }
}

impl std::fmt::Display for Directive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors from directive handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectiveError {
    #[error("unknown directive: {0}")]
    UnknownDirective(String),

    #[error("{0} requires an operand")]
    MissingOperand(Directive),

    #[error("invalid {directive} operand: {operand}")]
    InvalidOperand { directive: Directive, operand: String },
}
