//! Source line parser.
//!
//! SIC source is fixed-field: label, mnemonic, operand, then an optional
//! comment. Fields are separated by whitespace.
//!
//! ```text
//! COPY    START   1000
//! . comment line
//! FIRST   STL     RETADR
//!         LDA     BUFFER,X    rest of the line is a comment
//! EOF     BYTE    C'EOF'
//!         RSUB
//! ```

use crate::asm::{Directive, OpcodeTable};

/// The fields of one source statement.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceLine {
    pub label: Option<String>,
    pub mnemonic: Option<String>,
    pub operand: Option<String>,
}

/// Splits source lines into label, mnemonic and operand.
#[derive(Debug, Clone, Default)]
pub struct LineParser {
    optab: OpcodeTable,
}

impl LineParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one line. Blank and comment lines yield `None`.
    ///
    /// A line with leading whitespace has no label. At column 0 the first
    /// field is the label, unless it is itself a mnemonic or directive.
    pub fn parse(&self, line: &str) -> Option<SourceLine> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('.') {
            return None;
        }

        let (first, rest) = split_field(trimmed);
        let label_column = !line.starts_with(char::is_whitespace);

        let (label, rest) = if label_column && !self.is_keyword(first) {
            (Some(first), rest)
        } else {
            (None, trimmed)
        };

        let (mnemonic, rest) = split_field(rest);
        let operand = operand_field(rest);

        Some(SourceLine {
            label: label.map(str::to_string),
            mnemonic: (!mnemonic.is_empty()).then(|| mnemonic.to_string()),
            operand: operand.map(str::to_string),
        })
    }

    fn is_keyword(&self, field: &str) -> bool {
        self.optab.is_mnemonic(field) || field.parse::<Directive>().is_ok()
    }
}

/// Split off the first whitespace-delimited field.
fn split_field(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(idx) => (&text[..idx], text[idx..].trim_start()),
        None => (text, ""),
    }
}

/// The operand field. A quoted constant such as `C'A B'` may hold spaces.
fn operand_field(text: &str) -> Option<&str> {
    let text = text.trim_start();
    if text.is_empty() {
        return None;
    }

    let bytes = text.as_bytes();
    if bytes.len() > 1 && bytes[1] == b'\'' {
        if let Some(close) = text[2..].find('\'') {
            return Some(&text[..close + 3]);
        }
    }

    Some(split_field(text).0)
}
