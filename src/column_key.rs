//! Column index to column key conversion (1 -> "A", 28 -> "AB", 16384 -> "XFD")
//!
//! Column keys are bijective base-26: there is no zero digit, so each step
//! subtracts one before taking the remainder.

use std::collections::HashMap;
use std::fmt;

/// Letters of a single column key, at most three for the format's 16,384 columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnKey {
    letters: [u8; 3],
    len: u8,
}

impl ColumnKey {
    /// Encode a 1-based column index. Index 0 yields an empty key; indices
    /// past `ZZZ` (18,278) keep only their last three letters.
    pub fn new(index: u32) -> Self {
        let mut letters = [0u8; 3];
        let mut len = 0usize;
        let mut remaining = index;

        // Fill from the right, least significant letter first
        while remaining > 0 && len < letters.len() {
            let rem = ((remaining - 1) % 26) as u8;
            letters[letters.len() - 1 - len] = b'A' + rem;
            remaining = (remaining - 1) / 26;
            len += 1;
        }

        let width = letters.len();
        letters.rotate_left(width - len);
        ColumnKey {
            letters,
            len: len as u8,
        }
    }

    /// The key as ASCII bytes
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.letters[..self.len as usize]
    }

    /// The key as text
    #[inline]
    pub fn as_str(&self) -> &str {
        // Only ASCII uppercase letters are ever stored
        std::str::from_utf8(self.as_bytes()).unwrap_or_default()
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Memoizing column key encoder.
///
/// Owned by the writer that uses it rather than shared process-wide, so
/// independent workbooks never contend on it.
#[derive(Debug, Default)]
pub struct ColumnKeyCache {
    cache: HashMap<u32, ColumnKey>,
}

impl ColumnKeyCache {
    pub fn new() -> Self {
        ColumnKeyCache {
            cache: HashMap::with_capacity(64),
        }
    }

    /// Get the column key for a 1-based column index
    pub fn get_key(&mut self, index: u32) -> ColumnKey {
        *self
            .cache
            .entry(index)
            .or_insert_with(|| ColumnKey::new(index))
    }

    /// Number of memoized keys
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

/// Column key for a 1-based column index, without memoization
pub fn column_key(index: u32) -> String {
    ColumnKey::new(index).to_string()
}

/// Decode a column key back to its 1-based index.
///
/// Returns `None` for empty input, non-letters, or keys past `u32`.
pub fn column_index(key: &str) -> Option<u32> {
    if key.is_empty() {
        return None;
    }

    key.bytes().try_fold(0u32, |acc, byte| {
        let digit = match byte {
            b'A'..=b'Z' => byte - b'A' + 1,
            b'a'..=b'z' => byte - b'a' + 1,
            _ => return None,
        };
        acc.checked_mul(26)?.checked_add(digit as u32)
    })
}
