//! Fixed-capacity XML builder with minimal allocations
//!
//! Everything appended lands in one owned byte buffer and only reaches the
//! target stream when the buffer would overflow or on [`XmlBuilder::commit`].
//! The target is passed to each call, so one builder can serve every part of
//! a package in turn.

use crate::column_key::ColumnKeyCache;
use crate::constants::{MAX_DECIMAL_LENGTH, MAX_DOUBLE_LENGTH, MAX_INTEGER_LENGTH};
use crate::error::Result;
use rust_decimal::Decimal;
use std::io::Write;

/// Default buffer size (8KB)
pub const DEFAULT_CAPACITY: usize = 8 * 1024;

/// Smallest buffer that still holds every atomic append after a commit.
pub const MIN_CAPACITY: usize = 64;

/// Doubles that are whole numbers below this magnitude are written as integers.
const INTEGRAL_DOUBLE_LIMIT: f64 = 1e15;

/// Buffered UTF-8 encoder for XLSX parts
pub struct XmlBuilder {
    buffer: Box<[u8]>,
    len: usize,
    column_keys: ColumnKeyCache,
    bytes_committed: u64,
}

impl XmlBuilder {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a builder with the given buffer size, raised to [`MIN_CAPACITY`] if smaller
    pub fn with_capacity(capacity: usize) -> Self {
        XmlBuilder {
            buffer: vec![0u8; capacity.max(MIN_CAPACITY)].into_boxed_slice(),
            len: 0,
            column_keys: ColumnKeyCache::new(),
            bytes_committed: 0,
        }
    }

    /// Size of the internal buffer
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes buffered but not yet committed
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total bytes handed to target streams so far
    pub fn bytes_committed(&self) -> u64 {
        self.bytes_committed
    }

    /// Commit first if `additional` bytes would not fit
    #[inline]
    fn reserve<W: Write>(&mut self, writer: &mut W, additional: usize) -> Result<()> {
        if self.len + additional > self.buffer.len() {
            self.commit(writer)?;
        }
        Ok(())
    }

    /// Append a boolean as `1` or `0`
    #[inline]
    pub fn append_bool<W: Write>(&mut self, writer: &mut W, value: bool) -> Result<()> {
        self.reserve(writer, 1)?;
        self.buffer[self.len] = if value { b'1' } else { b'0' };
        self.len += 1;
        Ok(())
    }

    /// Append pre-escaped bytes verbatim.
    ///
    /// Slices that fit the buffer are never split across commits; longer ones
    /// are streamed through in buffer-sized chunks.
    pub fn append_bytes<W: Write>(&mut self, writer: &mut W, bytes: &[u8]) -> Result<()> {
        if bytes.len() <= self.buffer.len() {
            self.reserve(writer, bytes.len())?;
            self.buffer[self.len..self.len + bytes.len()].copy_from_slice(bytes);
            self.len += bytes.len();
            return Ok(());
        }

        let mut rest = bytes;
        while !rest.is_empty() {
            if self.len == self.buffer.len() {
                self.commit(writer)?;
            }
            let n = rest.len().min(self.buffer.len() - self.len);
            self.buffer[self.len..self.len + n].copy_from_slice(&rest[..n]);
            self.len += n;
            rest = &rest[n..];
        }
        Ok(())
    }

    /// Append pre-escaped text verbatim
    #[inline]
    pub fn append_str<W: Write>(&mut self, writer: &mut W, text: &str) -> Result<()> {
        self.append_bytes(writer, text.as_bytes())
    }

    /// Append text, escaping the five XML metacharacters in a single pass
    pub fn append_escaped<W: Write>(&mut self, writer: &mut W, text: &str) -> Result<()> {
        let mut rest = text.as_bytes();

        while !rest.is_empty() {
            let run = rest
                .iter()
                .position(|b| matches!(b, b'&' | b'<' | b'>' | b'"' | b'\''))
                .unwrap_or(rest.len());

            self.append_bytes(writer, &rest[..run])?;
            if run == rest.len() {
                break;
            }

            let escape: &[u8] = match rest[run] {
                b'&' => b"&amp;",
                b'<' => b"&lt;",
                b'>' => b"&gt;",
                b'"' => b"&quot;",
                _ => b"&apos;",
            };
            self.append_bytes(writer, escape)?;
            rest = &rest[run + 1..];
        }
        Ok(())
    }

    /// Append an integer in invariant form
    #[inline]
    pub fn append_integer<W: Write, I: itoa::Integer>(
        &mut self,
        writer: &mut W,
        value: I,
    ) -> Result<()> {
        self.reserve(writer, MAX_INTEGER_LENGTH)?;
        let mut digits = itoa::Buffer::new();
        let text = digits.format(value).as_bytes();
        self.buffer[self.len..self.len + text.len()].copy_from_slice(text);
        self.len += text.len();
        Ok(())
    }

    /// Append a decimal in invariant form, formatted straight into the buffer
    pub fn append_decimal<W: Write>(&mut self, writer: &mut W, value: Decimal) -> Result<()> {
        self.reserve(writer, MAX_DECIMAL_LENGTH)?;
        let mut slot = &mut self.buffer[self.len..];
        let available = slot.len();
        write!(slot, "{}", value)?;
        let written = available - slot.len();
        self.len += written;
        Ok(())
    }

    /// Append a double in invariant, shortest round-trip form.
    ///
    /// Whole numbers are written without a fractional part so serial dates read
    /// `45292` rather than `45292.0`. Callers reject non-finite values first.
    pub fn append_double<W: Write>(&mut self, writer: &mut W, value: f64) -> Result<()> {
        if value.fract() == 0.0 && value.abs() < INTEGRAL_DOUBLE_LIMIT {
            return self.append_integer(writer, value as i64);
        }

        self.reserve(writer, MAX_DOUBLE_LENGTH)?;
        let mut digits = ryu::Buffer::new();
        let text = digits.format(value).as_bytes();
        self.buffer[self.len..self.len + text.len()].copy_from_slice(text);
        self.len += text.len();
        Ok(())
    }

    /// Append the column key (`A`, `AB`, `XFD`) for a 1-based column index
    #[inline]
    pub fn append_column_key<W: Write>(&mut self, writer: &mut W, index: u32) -> Result<()> {
        if (1..=26).contains(&index) {
            self.reserve(writer, 1)?;
            self.buffer[self.len] = b'@' + index as u8;
            self.len += 1;
            return Ok(());
        }

        let key = self.column_keys.get_key(index);
        self.append_bytes(writer, key.as_bytes())
    }

    /// Append a cell reference such as `B12`
    #[inline]
    pub fn append_cell_reference<W: Write>(
        &mut self,
        writer: &mut W,
        column: u32,
        row: u32,
    ) -> Result<()> {
        self.append_column_key(writer, column)?;
        self.append_integer(writer, row)
    }

    /// Write the buffered bytes to `writer` and reset the cursor.
    ///
    /// Must be called before the target stream is closed or switched.
    pub fn commit<W: Write>(&mut self, writer: &mut W) -> Result<()> {
        if self.len > 0 {
            writer.write_all(&self.buffer[..self.len])?;
            self.bytes_committed += self.len as u64;
            log::trace!("committed {} buffered bytes", self.len);
            self.len = 0;
        }
        Ok(())
    }
}

impl Default for XmlBuilder {
    fn default() -> Self {
        Self::new()
    }
}
