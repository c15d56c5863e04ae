//! # streamxlsx
//!
//! A forward-only streaming writer for XLSX (Office Open XML) workbooks.
//!
//! ## Features
//!
//! - **Constant memory**: cells are serialized into a fixed-size buffer and
//!   flushed into the compressed entry; nothing is kept per row
//! - **Typed cells**: booleans, integers, decimals, doubles, dates, inline text and formulas
//! - **Number formats**: deduplicated into a single style table per workbook
//! - **Any sink**: write to a file or to memory, or implement [`fast_writer::Sink`]
//! - **Checked limits**: ordering, range and capacity violations are reported
//!   before anything is written
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use streamxlsx::{CellValue, Workbook};
//!
//! # fn main() -> streamxlsx::Result<()> {
//! let mut workbook = Workbook::in_memory(64 * 1024);
//!
//! let mut sheet = workbook.begin_sheet_named("Orders")?;
//! sheet.write_row(["Order", "Date", "Amount", "Paid"])?;
//! sheet
//!     .begin_row()?
//!     .write_cell_value(1001)?
//!     .write_cell_value(NaiveDate::from_ymd_opt(2024, 1, 1))?
//!     .write_cell_value_with_format(99.5, "#,##0.00")?
//!     .write_cell_value(true)?;
//! sheet
//!     .begin_row_at(4)?
//!     .write_cell_value("Total")?
//!     .write_cell_value(CellValue::Empty)?
//!     .write_cell_formula("=SUM(C2:C3)")?;
//!
//! let package = workbook.close()?;
//! assert!(!package.get_ref().is_empty());
//! # Ok(())
//! # }
//! ```

pub mod column_key;
pub mod constants;
pub mod error;
pub mod fast_writer;
pub mod types;

pub use column_key::{column_index, column_key, ColumnKeyCache};
pub use error::{ErrorKind, ExcelError, Result};
pub use fast_writer::{CompressionLevel, Sink, Workbook, WorkbookOptions, Worksheet};
pub use types::{CellValue, NumberFormat};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_imports() {
        // Test that all public types are accessible
        let _ = std::marker::PhantomData::<ExcelError>;
        let _ = std::marker::PhantomData::<Workbook<std::io::Cursor<Vec<u8>>>>;
        let _ = std::marker::PhantomData::<CellValue<'static>>;
        assert_eq!(column_key(28), "AB");
    }
}
