//! SIC memory subsystem.
//!
//! The SIC has 32,768 bytes of byte-addressable memory. A word is three
//! consecutive bytes stored most significant byte first.

use crate::cpu::{WORD_BYTES, WORD_MASK};
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// The number of bytes of memory in the SIC.
pub const MEMORY_SIZE: u32 = 32_768;

/// SIC memory: 32K bytes, zero on power-up.
///
/// A deserialized snapshot must hold exactly `MEMORY_SIZE` bytes.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MemorySnapshot")]
pub struct Memory {
    bytes: Vec<u8>,
}

#[derive(Deserialize)]
struct MemorySnapshot {
    bytes: Vec<u8>,
}

impl TryFrom<MemorySnapshot> for Memory {
    type Error = MemoryError;

    fn try_from(snapshot: MemorySnapshot) -> Result<Self, Self::Error> {
        if snapshot.bytes.len() != MEMORY_SIZE as usize {
            return Err(MemoryError::BadSnapshot { len: snapshot.bytes.len() });
        }
        Ok(Self { bytes: snapshot.bytes })
    }
}

impl Memory {
    /// Size of memory in bytes.
    pub const SIZE: u32 = MEMORY_SIZE;

    /// Create a new memory with all bytes zeroed.
    pub fn new() -> Self {
        Self {
            bytes: vec![0; MEMORY_SIZE as usize],
        }
    }

    /// Read a single byte.
    pub fn read_byte(&self, addr: u32) -> Result<u8, MemoryError> {
        let index = Self::check(addr, 1)?;
        Ok(self.bytes[index])
    }

    /// Write a single byte. Bits above the low eight are discarded.
    pub fn write_byte(&mut self, addr: u32, value: u32) -> Result<(), MemoryError> {
        let index = Self::check(addr, 1)?;
        self.bytes[index] = (value & 0xFF) as u8;
        Ok(())
    }

    /// Read the big-endian word starting at `addr`.
    pub fn read_word(&self, addr: u32) -> Result<u32, MemoryError> {
        let index = Self::check(addr, WORD_BYTES)?;
        let word = (self.bytes[index] as u32) << 16
            | (self.bytes[index + 1] as u32) << 8
            | self.bytes[index + 2] as u32;
        Ok(word)
    }

    /// Write a word starting at `addr`, truncated to 24 bits.
    ///
    /// Only the three bytes `addr..addr + 3` are touched.
    pub fn write_word(&mut self, addr: u32, value: u32) -> Result<(), MemoryError> {
        let index = Self::check(addr, WORD_BYTES)?;
        let value = value & WORD_MASK;
        self.bytes[index] = (value >> 16) as u8;
        self.bytes[index + 1] = (value >> 8) as u8;
        self.bytes[index + 2] = value as u8;
        Ok(())
    }

    /// Bounds check for an access of `width` bytes starting at `addr`.
    fn check(addr: u32, width: u32) -> Result<usize, MemoryError> {
        // u64 so that addr + width cannot wrap
        if addr as u64 + width as u64 > MEMORY_SIZE as u64 {
            return Err(MemoryError::OutOfBounds { addr, width });
        }
        Ok(addr as usize)
    }

    /// Clear all memory to zeros.
    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    /// Store consecutive words starting at `start_addr`.
    ///
    /// The whole span is checked up front, so a program that does not fit
    /// leaves memory untouched.
    pub fn load_words(&mut self, start_addr: u32, words: &[u32]) -> Result<(), MemoryError> {
        let size = words.len() as u64 * WORD_BYTES as u64;
        let available = (MEMORY_SIZE as u64).saturating_sub(start_addr as u64);
        if size > available {
            return Err(MemoryError::ProgramTooLarge {
                size,
                available,
            });
        }

        for (i, &word) in words.iter().enumerate() {
            self.write_word(start_addr + i as u32 * WORD_BYTES, word)?;
        }

        Ok(())
    }

    /// Dump `count` words starting at `start` (for debugging).
    ///
    /// Stops early at the end of memory.
    pub fn dump_words(&self, start: u32, count: usize) -> Vec<(u32, u32)> {
        (0..count as u32)
            .map_while(|i| start.checked_add(i * WORD_BYTES))
            .map_while(|addr| self.read_word(addr).ok().map(|word| (addr, word)))
            .collect()
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let non_zero = self.bytes.iter().filter(|&&b| b != 0).count();

        f.debug_struct("Memory")
            .field("non_zero_bytes", &non_zero)
            .field("total_bytes", &MEMORY_SIZE)
            .finish()
    }
}

/// Errors that can occur during memory operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// Some byte of the access lies outside memory.
    #[error("{width}-byte access at address {addr:#06X} is out of bounds")]
    OutOfBounds { addr: u32, width: u32 },

    /// Program is too large to fit in memory.
    #[error("program size {size} bytes exceeds available space {available} bytes")]
    ProgramTooLarge { size: u64, available: u64 },

    /// A snapshot whose byte count is not the size of memory.
    #[error("memory snapshot holds {len} bytes, expected 32768")]
    BadSnapshot { len: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_memory_starts_zeroed() {
        let mem = Memory::new();
        for addr in 0..MEMORY_SIZE {
            assert_eq!(mem.read_byte(addr).unwrap(), 0, "address {:#X}", addr);
        }
    }

    #[test]
    fn test_byte_read_write() {
        let mut mem = Memory::new();
        mem.write_byte(0x1000, 0x5A).unwrap();
        assert_eq!(mem.read_byte(0x1000).unwrap(), 0x5A);
    }

    #[test]
    fn test_word_is_big_endian() {
        let mut mem = Memory::new();
        mem.write_word(0x2000, 0x123456).unwrap();

        assert_eq!(mem.read_word(0x2000).unwrap(), 0x123456);
        assert_eq!(mem.read_byte(0x2000).unwrap(), 0x12);
        assert_eq!(mem.read_byte(0x2001).unwrap(), 0x34);
        assert_eq!(mem.read_byte(0x2002).unwrap(), 0x56);
    }

    #[test]
    fn test_small_word_is_zero_padded() {
        let mut mem = Memory::new();
        mem.write_word(0x5000, 0x123).unwrap();

        assert_eq!(mem.read_word(0x5000).unwrap(), 0x123);
        assert_eq!(mem.read_byte(0x5000).unwrap(), 0x00);
        assert_eq!(mem.read_byte(0x5001).unwrap(), 0x01);
        assert_eq!(mem.read_byte(0x5002).unwrap(), 0x23);
    }

    #[test]
    fn test_adjacent_words() {
        let mut mem = Memory::new();
        mem.write_word(0x6000, 0xAAAAAA).unwrap();
        mem.write_word(0x6003, 0xBBBBBB).unwrap();

        assert_eq!(mem.read_word(0x6000).unwrap(), 0xAAAAAA);
        assert_eq!(mem.read_word(0x6003).unwrap(), 0xBBBBBB);
    }

    #[test]
    fn test_truncation() {
        let mut mem = Memory::new();

        mem.write_word(0x4000, 0x99ABCDEF).unwrap();
        assert_eq!(mem.read_word(0x4000).unwrap(), 0xABCDEF);

        mem.write_byte(0x7000, 0x1F4).unwrap();
        assert_eq!(mem.read_byte(0x7000).unwrap(), 0xF4);
    }

    #[test]
    fn test_byte_bounds() {
        let mut mem = Memory::new();

        assert!(mem.read_byte(MEMORY_SIZE - 1).is_ok());
        assert_eq!(
            mem.read_byte(MEMORY_SIZE),
            Err(MemoryError::OutOfBounds { addr: MEMORY_SIZE, width: 1 })
        );
        assert!(mem.write_byte(MEMORY_SIZE, 0).is_err());
        assert!(mem.read_byte(u32::MAX).is_err());
    }

    #[test]
    fn test_word_bounds() {
        let mut mem = Memory::new();

        assert!(matches!(
            mem.write_word(MEMORY_SIZE - 1, 0x123456),
            Err(MemoryError::OutOfBounds { .. })
        ));
        assert!(matches!(
            mem.write_word(MEMORY_SIZE - 2, 0x123456),
            Err(MemoryError::OutOfBounds { .. })
        ));
        assert!(mem.write_word(MEMORY_SIZE - 3, 0x123456).is_ok());
        assert_eq!(mem.read_word(MEMORY_SIZE - 3).unwrap(), 0x123456);
        assert!(mem.read_word(MEMORY_SIZE - 2).is_err());
        assert!(mem.read_word(u32::MAX).is_err());
    }

    #[test]
    fn test_load_words() {
        let mut mem = Memory::new();
        mem.load_words(0x1000, &[0x00100C, 0x18100F, 0x0C1012]).unwrap();

        assert_eq!(mem.read_word(0x1000).unwrap(), 0x00100C);
        assert_eq!(mem.read_word(0x1003).unwrap(), 0x18100F);
        assert_eq!(mem.read_word(0x1006).unwrap(), 0x0C1012);
    }

    #[test]
    fn test_load_words_too_large_leaves_memory_untouched() {
        let mut mem = Memory::new();
        let result = mem.load_words(MEMORY_SIZE - 6, &[1, 2, 3]);

        assert_eq!(result, Err(MemoryError::ProgramTooLarge { size: 9, available: 6 }));
        assert_eq!(mem.read_word(MEMORY_SIZE - 6).unwrap(), 0);
    }

    #[test]
    fn test_clear_and_dump() {
        let mut mem = Memory::new();
        mem.write_word(0, 7).unwrap();
        mem.write_word(3, 8).unwrap();
        assert_eq!(mem.dump_words(0, 2), vec![(0, 7), (3, 8)]);
        assert_eq!(mem.dump_words(MEMORY_SIZE - 3, 4).len(), 1);

        mem.clear();
        assert_eq!(mem.read_word(0).unwrap(), 0);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut mem = Memory::new();
        mem.write_word(0x1000, 0xABCDEF).unwrap();

        let json = serde_json::to_string(&mem).unwrap();
        let restored: Memory = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, mem);
        assert_eq!(restored.read_word(0x1000).unwrap(), 0xABCDEF);
    }

    #[test]
    fn test_short_snapshot_rejected() {
        let err = serde_json::from_str::<Memory>(r#"{"bytes":[]}"#).unwrap_err();
        assert!(err.to_string().contains("holds 0 bytes"), "{}", err);

        assert!(serde_json::from_str::<Memory>(r#"{"bytes":[1,2,3]}"#).is_err());
    }

    proptest! {
        #[test]
        fn prop_word_round_trip(addr in 0..=MEMORY_SIZE - 3, value in 0u32..=WORD_MASK) {
            let mut mem = Memory::new();
            mem.write_word(addr, value).unwrap();
            prop_assert_eq!(mem.read_word(addr).unwrap(), value);
        }

        #[test]
        fn prop_word_write_leaves_neighbours(addr in 1..=MEMORY_SIZE - 4, value in any::<u32>()) {
            let mut mem = Memory::new();
            mem.write_byte(addr - 1, 0xA5).unwrap();
            mem.write_byte(addr + 3, 0x5A).unwrap();

            mem.write_word(addr, value).unwrap();

            prop_assert_eq!(mem.read_word(addr).unwrap(), value & WORD_MASK);
            prop_assert_eq!(mem.read_byte(addr - 1).unwrap(), 0xA5);
            prop_assert_eq!(mem.read_byte(addr + 3).unwrap(), 0x5A);
        }
    }
}
