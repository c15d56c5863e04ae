//! Forward-only XLSX writer
//!
//! Cells go straight from the caller into a fixed-size XML buffer and from
//! there into the compressed worksheet entry:
//! - Inline strings only, no shared string table to hold in memory
//! - Number formats deduplicated into one style table per workbook
//! - One worksheet open at a time; beginning the next ends the previous one

pub mod options;
pub mod sink;
pub mod styles;
pub mod workbook;
pub mod worksheet;
pub mod xml_writer;

use crate::error::Result;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

pub use options::{CompressionLevel, WorkbookOptions};
pub use sink::Sink;
pub use styles::Stylesheet;
pub use workbook::Workbook;
pub use worksheet::{serial_date, Worksheet};
pub use xml_writer::XmlBuilder;

/// Create a file-backed workbook with default options
///
/// # Examples
///
/// ```no_run
/// use streamxlsx::fast_writer::create_workbook;
///
/// let mut workbook = create_workbook("output.xlsx")?;
/// let mut sheet = workbook.begin_sheet()?;
/// sheet.write_row(["Name", "Age", "Email"])?;
/// sheet.write_row(["Alice", "30", "alice@example.com"])?;
/// workbook.close()?;
/// # Ok::<(), streamxlsx::ExcelError>(())
/// ```
pub fn create_workbook<P: AsRef<Path>>(path: P) -> Result<Workbook<BufWriter<File>>> {
    Workbook::create(path)
}
