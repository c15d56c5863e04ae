//! Fixed limits and reference values of the XLSX format

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Maximum number of characters (UTF-16 code units) in a single cell.
pub const MAX_CHARACTERS_PER_CELL: usize = 32_767;

/// Maximum number of columns in a worksheet (`XFD`).
pub const MAX_COLUMNS: u32 = 16_384;

/// Maximum number of rows in a worksheet.
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of custom number formats per workbook.
///
/// The format allows 65,490 styles including the built-in ones; 65,000
/// leaves room for those.
pub const MAX_STYLES: usize = 65_000;

/// First numbering-format id available for custom formats; lower ids are
/// reserved for the built-in formats.
pub const FIRST_CUSTOM_FORMAT_ID: u32 = 164;

/// Maximum length of a worksheet name accepted by spreadsheet applications.
pub const MAX_SHEET_NAME_LENGTH: usize = 31;

/// Format code applied to date/time cells written without one.
pub const DEFAULT_DATE_FORMAT: &str = "yyyy-MM-dd";

/// Longest text `itoa` produces for an `i64` (`-9223372036854775808`).
pub const MAX_INTEGER_LENGTH: usize = 20;

/// Longest text `ryu` produces for an `f64`.
pub const MAX_DOUBLE_LENGTH: usize = 24;

/// Longest text a `rust_decimal::Decimal` displays as: 29 digits, sign and point.
pub const MAX_DECIMAL_LENGTH: usize = 32;

/// Length of `text` in UTF-16 code units, the unit cell text and sheet names
/// are limited in.
pub fn text_length(text: &str) -> usize {
    if text.is_ascii() {
        return text.len();
    }
    text.encode_utf16().count()
}

/// Day zero of the serial date system.
pub fn xlsx_epoch() -> NaiveDateTime {
    date_at_midnight(1899, 12, 30)
}

/// Earliest date a viewer displays correctly.
pub fn minimum_date() -> NaiveDateTime {
    date_at_midnight(1900, 1, 1)
}

/// Dates before this one are shifted back a day to match the phantom
/// 1900-02-29 that the serial date system counts.
pub fn leap_year_bug_correction_date() -> NaiveDateTime {
    date_at_midnight(1900, 3, 1)
}

fn date_at_midnight(year: i32, month: u32, day: u32) -> NaiveDateTime {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => NaiveDateTime::new(date, NaiveTime::MIN),
        None => NaiveDateTime::MIN,
    }
}
