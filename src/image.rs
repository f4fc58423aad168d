//! Program images.
//!
//! An image is what a loader hands the machine: a run of words, the address
//! the first word goes to, an optional entry point, and optionally the
//! symbols the assembler resolved. Stored on disk as JSON:
//!
//! ```text
//! {
//!   "start_address": 4096,
//!   "entry": 4096,
//!   "words": [4108, 1577999, 790546],
//!   "symbols": { "FIRST": 4096 }
//! }
//! ```

use crate::asm::SymbolTable;
use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// A loadable SIC program.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgramImage {
    /// Address of the first word.
    pub start_address: u32,
    /// Where execution begins; the start address when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<u32>,
    /// The program, one 24-bit word per element.
    pub words: Vec<u32>,
    /// Resolved label addresses, for listings and debugging.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub symbols: BTreeMap<String, u32>,
}

impl ProgramImage {
    pub fn new(start_address: u32, words: Vec<u32>) -> Self {
        Self {
            start_address,
            entry: None,
            words,
            symbols: BTreeMap::new(),
        }
    }

    /// Attach the symbols of an assembled program.
    pub fn with_symbols(mut self, symtab: &SymbolTable) -> Self {
        self.symbols = symtab
            .iter()
            .map(|(label, addr)| (label.to_string(), addr))
            .collect();
        self
    }

    pub fn entry_address(&self) -> u32 {
        self.entry.unwrap_or(self.start_address)
    }

    /// Address of a symbol recorded in the image.
    pub fn symbol(&self, label: &str) -> Option<u32> {
        self.symbols.get(&label.to_uppercase()).copied()
    }

    pub fn from_json(text: &str) -> Result<Self, ImageError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, ImageError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Load an image from disk.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<ProgramImage, ImageError> {
    let text = std::fs::read_to_string(path.as_ref())
        .map_err(|e| ImageError::IoError(e.to_string()))?;
    ProgramImage::from_json(&text)
}

/// Errors that can occur reading or writing images.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("malformed image: {0}")]
    Json(#[from] serde_json::Error),
}
