//! The symbol table (SYMTAB) built by Pass One.

use std::collections::HashMap;
use thiserror::Error;

/// Label to address mapping. Labels are stored uppercase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    symbols: HashMap<String, u32>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a label. Redefining one is an error.
    pub fn add_symbol(&mut self, label: &str, addr: u32) -> Result<(), SymbolError> {
        let label = label.to_uppercase();
        if self.symbols.contains_key(&label) {
            return Err(SymbolError::DuplicateSymbol(label));
        }
        self.symbols.insert(label, addr);
        Ok(())
    }

    pub fn has_symbol(&self, label: &str) -> bool {
        self.symbols.contains_key(&label.to_uppercase())
    }

    /// Address of a defined label.
    pub fn get_address(&self, label: &str) -> Result<u32, SymbolError> {
        self.symbols
            .get(&label.to_uppercase())
            .copied()
            .ok_or_else(|| SymbolError::UndefinedSymbol(label.to_string()))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// All symbols ordered by address, then by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        let mut entries: Vec<_> = self.symbols.iter().map(|(l, &a)| (l.as_str(), a)).collect();
        entries.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(b.0)));
        entries.into_iter()
    }
}

/// Errors from symbol table operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("duplicate symbol found: {0}")]
    DuplicateSymbol(String),

    #[error("undefined symbol: {0}")]
    UndefinedSymbol(String),
}
