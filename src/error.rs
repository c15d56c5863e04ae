//! Error types for streamxlsx

use chrono::NaiveDateTime;
use thiserror::Error;

/// Result type alias for streamxlsx operations
pub type Result<T> = std::result::Result<T, ExcelError>;

/// Broad classification of an [`ExcelError`]
///
/// Everything except `Io` is a caller-contract violation detected before any
/// byte of the offending call is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A row or cell was written out of order, or without an open row
    Ordering,
    /// An index, date or number lies outside what the format can represent
    Range,
    /// A per-cell or per-workbook limit was exceeded
    Capacity,
    /// A worksheet id or name is already taken or unusable
    Identity,
    /// The sink or the ZIP container failed
    Io,
}

/// Main error type for all writing operations
#[derive(Error, Debug)]
pub enum ExcelError {
    /// A cell was written before any row was begun
    #[error("A cell value can only be written after a row was begun")]
    NoOpenRow,

    /// A row index not strictly greater than the last written row
    #[error("Row {row} cannot be written after row {last}")]
    RowOutOfOrder { row: u32, last: u32 },

    /// A column index not strictly greater than the last written column
    #[error("Column {column} cannot be written after column {last}")]
    ColumnOutOfOrder { column: u32, last: u32 },

    /// Row index outside 1..=1,048,576
    #[error("Row index {0} is outside the supported range 1..=1048576")]
    RowOutOfRange(u32),

    /// Column index outside 1..=16,384
    #[error("Column index {0} is outside the supported range 1..=16384")]
    ColumnOutOfRange(u32),

    /// Date earlier than 1900-01-01
    #[error("Date {0} is before 1900-01-01; write it as a number or text instead")]
    DateOutOfRange(NaiveDateTime),

    /// NaN or infinity
    #[error("Non-finite number {0} cannot be stored in a cell")]
    NonFiniteNumber(f64),

    /// Text longer than 32,767 characters
    #[error("Text of {length} characters exceeds the 32767 characters allowed per cell")]
    TextTooLong { length: usize },

    /// More distinct number formats than the style table supports
    #[error("A workbook cannot hold more than 65000 number formats")]
    TooManyStyles,

    /// Worksheet id 0
    #[error("Worksheet id {0} is invalid; ids start at 1")]
    InvalidSheetId(u32),

    /// Worksheet id already used in this workbook
    #[error("A worksheet with id {0} was already added to the workbook")]
    DuplicateSheetId(u32),

    /// Worksheet name already used in this workbook
    #[error("A worksheet named '{0}' was already added to the workbook")]
    DuplicateSheetName(String),

    /// Worksheet name that spreadsheet applications refuse
    #[error("Invalid worksheet name '{name}': {reason}")]
    InvalidSheetName { name: String, reason: &'static str },

    /// IO error wrapper
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP container error wrapper
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl ExcelError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExcelError::NoOpenRow
            | ExcelError::RowOutOfOrder { .. }
            | ExcelError::ColumnOutOfOrder { .. } => ErrorKind::Ordering,
            ExcelError::RowOutOfRange(_)
            | ExcelError::ColumnOutOfRange(_)
            | ExcelError::DateOutOfRange(_)
            | ExcelError::NonFiniteNumber(_) => ErrorKind::Range,
            ExcelError::TextTooLong { .. } | ExcelError::TooManyStyles => ErrorKind::Capacity,
            ExcelError::InvalidSheetId(_)
            | ExcelError::DuplicateSheetId(_)
            | ExcelError::DuplicateSheetName(_)
            | ExcelError::InvalidSheetName { .. } => ErrorKind::Identity,
            ExcelError::Io(_) | ExcelError::Zip(_) => ErrorKind::Io,
        }
    }
}
