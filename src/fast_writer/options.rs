//! Workbook configuration: compression and buffer sizing

use super::xml_writer::DEFAULT_CAPACITY;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

/// Compression applied to every part of the package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    /// Store parts uncompressed
    NoCompression,
    /// Deflate level 1
    Fastest,
    /// Deflate level 6, balancing speed and size (default)
    #[default]
    Optimal,
    /// Deflate level 9
    SmallestSize,
}

impl CompressionLevel {
    /// ZIP entry options for this level
    pub fn file_options(&self) -> SimpleFileOptions {
        let options = SimpleFileOptions::default();
        match self {
            CompressionLevel::NoCompression => {
                options.compression_method(CompressionMethod::Stored)
            }
            CompressionLevel::Fastest => options
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(1)),
            CompressionLevel::Optimal => options
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(6)),
            CompressionLevel::SmallestSize => options
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(9)),
        }
    }
}

/// Options for creating a [`Workbook`](super::Workbook)
///
/// # Examples
///
/// ```
/// use streamxlsx::fast_writer::{CompressionLevel, WorkbookOptions};
///
/// let options = WorkbookOptions::new()
///     .compression(CompressionLevel::Fastest)
///     .buffer_capacity(64 * 1024)
///     .creator("Reporting");
/// assert_eq!(options.buffer_capacity, 64 * 1024);
/// ```
#[derive(Debug, Clone)]
pub struct WorkbookOptions {
    /// Compression for every part
    pub compression: CompressionLevel,
    /// Size of the XML builder's buffer in bytes
    pub buffer_capacity: usize,
    /// Written to `dc:creator` in the core properties
    pub creator: Option<String>,
}

impl WorkbookOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compression(mut self, level: CompressionLevel) -> Self {
        self.compression = level;
        self
    }

    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    pub fn creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = Some(creator.into());
        self
    }
}

impl Default for WorkbookOptions {
    fn default() -> Self {
        WorkbookOptions {
            compression: CompressionLevel::Optimal,
            buffer_capacity: DEFAULT_CAPACITY,
            creator: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = WorkbookOptions::default();
        assert_eq!(options.compression, CompressionLevel::Optimal);
        assert_eq!(options.buffer_capacity, DEFAULT_CAPACITY);
        assert!(options.creator.is_none());
    }
}
