//! Type definitions for cell values and number formats

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::fmt;

/// A single cell value, serialized as soon as it is written.
///
/// Values borrow their text, so writing a cell never copies a string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue<'a> {
    /// Leave the cell blank; the column cursor still advances
    Empty,
    /// Boolean, stored as `0`/`1`
    Bool(bool),
    /// Integer
    Integer(i64),
    /// Exact decimal
    Decimal(Decimal),
    /// Floating point
    Double(f64),
    /// Text, stored as an inline string
    Text(&'a str),
    /// Date and time, stored as a serial day number
    DateTime(NaiveDateTime),
    /// Formula text, stored verbatim and never evaluated (e.g. "=SUM(A1:A10)")
    Formula(&'a str),
}

impl CellValue<'_> {
    /// Check if the cell will be left blank
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) | CellValue::Formula(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Whether a number format applies to this kind of value
    pub fn accepts_format(&self) -> bool {
        matches!(
            self,
            CellValue::Integer(_)
                | CellValue::Decimal(_)
                | CellValue::Double(_)
                | CellValue::DateTime(_)
        )
    }
}

impl fmt::Display for CellValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Decimal(d) => write!(f, "{}", d),
            CellValue::Double(d) => write!(f, "{}", d),
            CellValue::Text(s) | CellValue::Formula(s) => f.write_str(s),
            CellValue::DateTime(dt) => write!(f, "{}", dt),
        }
    }
}

impl<'a> From<&'a str> for CellValue<'a> {
    fn from(s: &'a str) -> Self {
        CellValue::Text(s)
    }
}

impl<'a> From<&'a String> for CellValue<'a> {
    fn from(s: &'a String) -> Self {
        CellValue::Text(s.as_str())
    }
}

impl From<bool> for CellValue<'_> {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<i32> for CellValue<'_> {
    fn from(i: i32) -> Self {
        CellValue::Integer(i as i64)
    }
}

impl From<u32> for CellValue<'_> {
    fn from(i: u32) -> Self {
        CellValue::Integer(i as i64)
    }
}

impl From<i64> for CellValue<'_> {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<f64> for CellValue<'_> {
    fn from(f: f64) -> Self {
        CellValue::Double(f)
    }
}

impl From<Decimal> for CellValue<'_> {
    fn from(d: Decimal) -> Self {
        CellValue::Decimal(d)
    }
}

impl From<NaiveDateTime> for CellValue<'_> {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::DateTime(dt)
    }
}

impl From<NaiveDate> for CellValue<'_> {
    fn from(d: NaiveDate) -> Self {
        CellValue::DateTime(d.and_time(NaiveTime::MIN))
    }
}

impl<'a, T> From<Option<T>> for CellValue<'a>
where
    T: Into<CellValue<'a>>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(CellValue::Empty, Into::into)
    }
}

/// The pair of indices a registered number format resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NumberFormat {
    /// Position in `cellXfs`, used as `s="n"` on cells (1-based; 0 is the default style)
    pub style_index: u32,
    /// `numFmtId` in the styles part, above the built-in id range
    pub format_id: u32,
}
