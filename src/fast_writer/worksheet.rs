//! Worksheet writer: the row/cell state machine
//!
//! Rows must be written in strictly increasing order, and cells in strictly
//! increasing column order within a row. Every cell is serialized the moment
//! it is written; nothing is kept once it is in the builder.

use super::styles::Stylesheet;
use super::xml_writer::XmlBuilder;
use crate::constants::{
    leap_year_bug_correction_date, minimum_date, text_length, xlsx_epoch, DEFAULT_DATE_FORMAT,
    MAX_CHARACTERS_PER_CELL, MAX_COLUMNS, MAX_ROWS,
};
use crate::error::{ExcelError, Result};
use crate::types::CellValue;
use chrono::{Duration, NaiveDateTime};
use std::fmt;
use std::io::Write;

const NANOS_PER_DAY: f64 = 86_400_000_000_000.0;

const SHEET_PROLOGUE_START: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
<worksheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\" \
xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\">\
<sheetViews><sheetView ";

// No <dimension>: the used range is only known once the stream can no longer be rewound.
const SHEET_PROLOGUE_END: &str = "workbookViewId=\"0\"/></sheetViews>\
<sheetFormatPr defaultRowHeight=\"15\"/><sheetData>";

const SHEET_EPILOGUE: &str = "</sheetData>\
<pageMargins left=\"0.7\" right=\"0.7\" top=\"0.75\" bottom=\"0.75\" header=\"0.3\" footer=\"0.3\"/>\
</worksheet>";

/// Convert a date/time to its serial day number.
///
/// Dates before 1900-03-01 move back one day first, matching the phantom
/// 1900-02-29 the serial date system counts. Dates before 1900-01-01 fail.
pub fn serial_date(value: NaiveDateTime) -> Result<f64> {
    if value < minimum_date() {
        return Err(ExcelError::DateOutOfRange(value));
    }

    let adjusted = if value < leap_year_bug_correction_date() {
        value - Duration::days(1)
    } else {
        value
    };

    let elapsed = adjusted - xlsx_epoch();
    let days = elapsed.num_days();
    let time_of_day = elapsed - Duration::days(days);
    let fraction = time_of_day.num_nanoseconds().unwrap_or(0) as f64 / NANOS_PER_DAY;

    Ok(days as f64 + fraction)
}


/// Bookkeeping for one worksheet, kept by the workbook between handles
#[derive(Debug)]
pub(crate) struct SheetState {
    pub(crate) id: u32,
    pub(crate) name: String,
    pub(crate) relationship_id: String,
    selected: bool,
    last_row: u32,
    last_column: u32,
    row_open: bool,
    rows_written: u32,
    started: bool,
    ended: bool,
}

impl SheetState {
    pub(crate) fn new(id: u32, name: String, relationship_id: String, selected: bool) -> Self {
        SheetState {
            id,
            name,
            relationship_id,
            selected,
            last_row: 0,
            last_column: 0,
            row_open: false,
            rows_written: 0,
            started: false,
            ended: false,
        }
    }

    pub(crate) fn is_ended(&self) -> bool {
        self.ended
    }
}

/// Handle for writing rows and cells to the open worksheet
///
/// Obtained from [`Workbook::begin_sheet`](super::Workbook::begin_sheet) or
/// [`Workbook::worksheet`](super::Workbook::worksheet). Operations return
/// `&mut Self` so they chain:
///
/// ```
/// # fn main() -> streamxlsx::Result<()> {
/// let mut workbook = streamxlsx::Workbook::in_memory(64 * 1024);
/// let mut sheet = workbook.begin_sheet()?;
/// sheet
///     .begin_row()?
///     .write_cell_value("Total")?
///     .write_cell_value_with_format(1234.5, "#,##0.00")?;
/// # Ok(())
/// # }
/// ```
pub struct Worksheet<'a, S: Write> {
    state: &'a mut SheetState,
    stream: &'a mut S,
    builder: &'a mut XmlBuilder,
    styles: &'a mut Stylesheet,
}

impl<S: Write> fmt::Debug for Worksheet<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worksheet")
            .field("id", &self.state.id)
            .field("name", &self.state.name)
            .field("last_row", &self.state.last_row)
            .field("last_column", &self.state.last_column)
            .finish()
    }
}

impl<'a, S: Write> Worksheet<'a, S> {
    pub(crate) fn new(
        state: &'a mut SheetState,
        stream: &'a mut S,
        builder: &'a mut XmlBuilder,
        styles: &'a mut Stylesheet,
    ) -> Self {
        Worksheet {
            state,
            stream,
            builder,
            styles,
        }
    }

    /// 1-based worksheet id
    pub fn id(&self) -> u32 {
        self.state.id
    }

    pub fn name(&self) -> &str {
        &self.state.name
    }

    /// Last row begun, 0 if none
    pub fn last_row(&self) -> u32 {
        self.state.last_row
    }

    /// Last column written in the open row, 0 if none
    pub fn last_column(&self) -> u32 {
        self.state.last_column
    }

    /// Write the worksheet prologue. Does nothing if it was already written.
    pub(crate) fn begin_sheet(&mut self) -> Result<()> {
        if self.state.started {
            return Ok(());
        }

        self.builder.append_str(self.stream, SHEET_PROLOGUE_START)?;
        if self.state.selected {
            self.builder.append_str(self.stream, "tabSelected=\"1\" ")?;
        }
        self.builder.append_str(self.stream, SHEET_PROLOGUE_END)?;
        self.state.started = true;
        log::debug!("began worksheet {} '{}'", self.state.id, self.state.name);
        Ok(())
    }

    /// Close any open row, write the epilogue and flush the entry stream.
    /// Does nothing if the sheet already ended.
    pub(crate) fn end_sheet(&mut self) -> Result<()> {
        if self.state.ended {
            return Ok(());
        }

        self.begin_sheet()?;
        self.end_row()?;
        self.builder.append_str(self.stream, SHEET_EPILOGUE)?;
        self.builder.commit(self.stream)?;
        self.stream.flush()?;
        self.state.ended = true;
        log::debug!(
            "ended worksheet {} '{}' after {} rows",
            self.state.id,
            self.state.name,
            self.state.rows_written
        );
        Ok(())
    }

    /// Begin the row after the last one written, ending any open row
    pub fn begin_row(&mut self) -> Result<&mut Self> {
        self.begin_row_at(self.state.last_row.saturating_add(1))
    }

    /// Begin a row at a 1-based index, ending any open row.
    ///
    /// The index must be greater than every row already begun in this sheet.
    pub fn begin_row_at(&mut self, row: u32) -> Result<&mut Self> {
        if row == 0 || row > MAX_ROWS {
            return Err(ExcelError::RowOutOfRange(row));
        }
        if row <= self.state.last_row {
            return Err(ExcelError::RowOutOfOrder {
                row,
                last: self.state.last_row,
            });
        }

        self.end_row()?;

        self.builder.append_str(self.stream, "<row r=\"")?;
        self.builder.append_integer(self.stream, row)?;
        self.builder.append_str(self.stream, "\">")?;

        self.state.last_row = row;
        self.state.row_open = true;
        self.state.rows_written += 1;
        Ok(self)
    }

    /// Close the open row, if any
    fn end_row(&mut self) -> Result<()> {
        if !self.state.row_open {
            return Ok(());
        }

        self.builder.append_str(self.stream, "</row>")?;
        self.state.row_open = false;
        self.state.last_column = 0;
        Ok(())
    }

    /// Begin the next row and write `values` into consecutive columns
    pub fn write_row<'v, I, V>(&mut self, values: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue<'v>>,
    {
        self.begin_row()?;
        for value in values {
            self.write_cell(self.next_column(), value.into(), None)?;
        }
        Ok(self)
    }

    /// Write a value to the column after the last one written
    pub fn write_cell_value<'v>(&mut self, value: impl Into<CellValue<'v>>) -> Result<&mut Self> {
        self.write_cell(self.next_column(), value.into(), None)
    }

    /// Write a value to a 1-based column of the open row
    pub fn write_cell_value_at<'v>(
        &mut self,
        column: u32,
        value: impl Into<CellValue<'v>>,
    ) -> Result<&mut Self> {
        self.write_cell(column, value.into(), None)
    }

    /// Write a value with a number format to the next column.
    ///
    /// The format applies to integer, decimal, double and date/time values and
    /// is ignored for the other kinds. Invalid format codes are not detected and
    /// may make viewers offer to repair the file.
    pub fn write_cell_value_with_format<'v>(
        &mut self,
        value: impl Into<CellValue<'v>>,
        format: &str,
    ) -> Result<&mut Self> {
        self.write_cell(self.next_column(), value.into(), Some(format))
    }

    /// Write a value with a number format to a 1-based column of the open row
    pub fn write_cell_value_at_with_format<'v>(
        &mut self,
        column: u32,
        value: impl Into<CellValue<'v>>,
        format: &str,
    ) -> Result<&mut Self> {
        self.write_cell(column, value.into(), Some(format))
    }

    /// Write a formula (e.g. `=SUM(A1:A10)`) to the next column
    pub fn write_cell_formula(&mut self, formula: &str) -> Result<&mut Self> {
        self.write_cell(self.next_column(), CellValue::Formula(formula), None)
    }

    /// Write a formula to a 1-based column of the open row
    pub fn write_cell_formula_at(&mut self, column: u32, formula: &str) -> Result<&mut Self> {
        self.write_cell(column, CellValue::Formula(formula), None)
    }

    #[inline]
    fn next_column(&self) -> u32 {
        self.state.last_column.saturating_add(1)
    }

    fn verify_can_write_cell(&self, column: u32) -> Result<()> {
        if !self.state.row_open {
            return Err(ExcelError::NoOpenRow);
        }
        if column == 0 || column > MAX_COLUMNS {
            return Err(ExcelError::ColumnOutOfRange(column));
        }
        if column <= self.state.last_column {
            return Err(ExcelError::ColumnOutOfOrder {
                column,
                last: self.state.last_column,
            });
        }
        Ok(())
    }

    fn write_cell(
        &mut self,
        column: u32,
        value: CellValue<'_>,
        format: Option<&str>,
    ) -> Result<&mut Self> {
        self.verify_can_write_cell(column)?;
        let format = format.filter(|_| value.accepts_format());

        if value.is_empty() {
            self.state.last_column = column;
            return Ok(self);
        }

        match value {
            CellValue::Bool(b) => {
                self.state.last_column = column;
                self.open_cell(column, None, "b")?;
                self.builder.append_str(self.stream, "<v>")?;
                self.builder.append_bool(self.stream, b)?;
                self.builder.append_str(self.stream, "</v></c>")?;
            }
            CellValue::Integer(i) => {
                let style = self.resolve_style(format)?;
                self.state.last_column = column;
                self.open_cell(column, style, "n")?;
                self.builder.append_str(self.stream, "<v>")?;
                self.builder.append_integer(self.stream, i)?;
                self.builder.append_str(self.stream, "</v></c>")?;
            }
            CellValue::Decimal(d) => {
                let style = self.resolve_style(format)?;
                self.state.last_column = column;
                self.open_cell(column, style, "n")?;
                self.builder.append_str(self.stream, "<v>")?;
                self.builder.append_decimal(self.stream, d)?;
                self.builder.append_str(self.stream, "</v></c>")?;
            }
            CellValue::Double(f) => {
                if !f.is_finite() {
                    return Err(ExcelError::NonFiniteNumber(f));
                }
                let style = self.resolve_style(format)?;
                self.state.last_column = column;
                self.write_number(column, style, f)?;
            }
            CellValue::DateTime(dt) => {
                let serial = serial_date(dt)?;
                let style = self.resolve_style(Some(format.unwrap_or(DEFAULT_DATE_FORMAT)))?;
                self.state.last_column = column;
                self.write_number(column, style, serial)?;
            }
            CellValue::Text(text) => {
                let length = text_length(text);
                if length > MAX_CHARACTERS_PER_CELL {
                    return Err(ExcelError::TextTooLong { length });
                }
                self.state.last_column = column;
                self.open_cell(column, None, "inlineStr")?;
                if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
                    self.builder
                        .append_str(self.stream, "<is><t xml:space=\"preserve\">")?;
                } else {
                    self.builder.append_str(self.stream, "<is><t>")?;
                }
                self.builder.append_escaped(self.stream, text)?;
                self.builder.append_str(self.stream, "</t></is></c>")?;
            }
            CellValue::Formula(formula) => {
                self.state.last_column = column;
                self.open_cell(column, None, "e")?;
                self.builder.append_str(self.stream, "<f>")?;
                self.builder.append_escaped(self.stream, formula)?;
                self.builder.append_str(self.stream, "</f></c>")?;
            }
            CellValue::Empty => {}
        }

        Ok(self)
    }

    fn resolve_style(&mut self, format: Option<&str>) -> Result<Option<u32>> {
        match format {
            Some(code) => Ok(Some(
                self.styles.get_or_create_number_format(code)?.style_index,
            )),
            None => Ok(None),
        }
    }

    /// `<c r="B3" s="1" t="n">`
    fn open_cell(&mut self, column: u32, style: Option<u32>, kind: &str) -> Result<()> {
        self.builder.append_str(self.stream, "<c r=\"")?;
        self.builder
            .append_cell_reference(self.stream, column, self.state.last_row)?;
        if let Some(style_index) = style {
            self.builder.append_str(self.stream, "\" s=\"")?;
            self.builder.append_integer(self.stream, style_index)?;
        }
        self.builder.append_str(self.stream, "\" t=\"")?;
        self.builder.append_str(self.stream, kind)?;
        self.builder.append_str(self.stream, "\">")
    }

    fn write_number(&mut self, column: u32, style: Option<u32>, value: f64) -> Result<()> {
        self.open_cell(column, style, "n")?;
        self.builder.append_str(self.stream, "<v>")?;
        self.builder.append_double(self.stream, value)?;
        self.builder.append_str(self.stream, "</v></c>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    struct Fixture {
        state: SheetState,
        output: Vec<u8>,
        builder: XmlBuilder,
        styles: Stylesheet,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                state: SheetState::new(1, "Sheet1".to_string(), "rId3".to_string(), true),
                output: Vec::new(),
                builder: XmlBuilder::new(),
                styles: Stylesheet::new(),
            }
        }

        fn sheet(&mut self) -> Worksheet<'_, Vec<u8>> {
            Worksheet::new(
                &mut self.state,
                &mut self.output,
                &mut self.builder,
                &mut self.styles,
            )
        }

        fn xml(&mut self) -> String {
            self.builder.commit(&mut self.output).unwrap();
            String::from_utf8(self.output.clone()).unwrap()
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_serial_dates() {
        assert_eq!(serial_date(date(1900, 1, 1)).unwrap(), 1.0);
        assert_eq!(serial_date(date(1900, 2, 28)).unwrap(), 59.0);
        assert_eq!(serial_date(date(1900, 3, 1)).unwrap(), 61.0);
        assert_eq!(serial_date(date(2024, 1, 1)).unwrap(), 45292.0);

        let noon = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(serial_date(noon).unwrap(), 45292.5);
    }

    #[test]
    fn test_absent_value_skips_column() {
        let cases: Vec<(CellValue<'static>, &str)> = vec![
            (CellValue::Bool(true), "<row r=\"1\"><c r=\"B1\" t=\"b\"><v>1</v></c>"),
            (
                CellValue::DateTime(date(2024, 1, 1)),
                "<row r=\"1\"><c r=\"B1\" s=\"1\" t=\"n\"><v>45292</v></c>",
            ),
            (
                CellValue::Decimal(Decimal::new(123456, 3)),
                "<row r=\"1\"><c r=\"B1\" t=\"n\"><v>123.456</v></c>",
            ),
            (
                CellValue::Double(123.456),
                "<row r=\"1\"><c r=\"B1\" t=\"n\"><v>123.456</v></c>",
            ),
            (
                CellValue::Integer(123456),
                "<row r=\"1\"><c r=\"B1\" t=\"n\"><v>123456</v></c>",
            ),
            (
                CellValue::Text("text"),
                "<row r=\"1\"><c r=\"B1\" t=\"inlineStr\"><is><t>text</t></is></c>",
            ),
        ];

        for (value, expected) in cases {
            let mut fixture = Fixture::new();
            fixture
                .sheet()
                .begin_row()
                .unwrap()
                .write_cell_value(CellValue::Empty)
                .unwrap()
                .write_cell_value(value)
                .unwrap();
            assert_eq!(fixture.xml(), expected);
        }
    }

    #[test]
    fn test_null_and_empty_text_advance_cursor() {
        let mut fixture = Fixture::new();
        {
            let mut sheet = fixture.sheet();
            sheet.begin_row().unwrap();
            sheet.write_cell_value(None::<&str>).unwrap();
            sheet.write_cell_value("").unwrap();
            assert_eq!(sheet.last_column(), 2);
            sheet.write_cell_value("x").unwrap();
        }
        assert_eq!(
            fixture.xml(),
            "<row r=\"1\"><c r=\"C1\" t=\"inlineStr\"><is><t>x</t></is></c>"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        let mut fixture = Fixture::new();
        fixture
            .sheet()
            .begin_row()
            .unwrap()
            .write_cell_value("'\"&<>text")
            .unwrap();
        assert!(fixture
            .xml()
            .contains("<is><t>&apos;&quot;&amp;&lt;&gt;text</t></is>"));
    }

    #[test]
    fn test_surrounding_whitespace_is_preserved() {
        let mut fixture = Fixture::new();
        fixture
            .sheet()
            .begin_row()
            .unwrap()
            .write_cell_value(" padded ")
            .unwrap();
        assert!(fixture
            .xml()
            .contains("<is><t xml:space=\"preserve\"> padded </t></is>"));
    }

    #[test]
    fn test_formula_and_bool_cells() {
        let mut fixture = Fixture::new();
        fixture
            .sheet()
            .begin_row_at(3)
            .unwrap()
            .write_cell_value(false)
            .unwrap()
            .write_cell_formula_at(13, "=SUM(H3:L3)")
            .unwrap();
        assert_eq!(
            fixture.xml(),
            "<row r=\"3\"><c r=\"A3\" t=\"b\"><v>0</v></c><c r=\"M3\" t=\"e\"><f>=SUM(H3:L3)</f></c>"
        );
    }

    #[test]
    fn test_formatted_numbers_share_styles() {
        let mut fixture = Fixture::new();
        {
            let mut sheet = fixture.sheet();
            sheet.begin_row().unwrap();
            sheet.write_cell_value_with_format(123.456, "0.00").unwrap();
            sheet.write_cell_value_with_format(7, "0.00%").unwrap();
            sheet.write_cell_value_at_with_format(5, 1.5, "0.00").unwrap();
            // Formats on text are ignored
            sheet.write_cell_value_with_format("label", "0.00E+00").unwrap();
        }
        assert_eq!(fixture.styles.count(), 2);
        assert_eq!(
            fixture.xml(),
            "<row r=\"1\"><c r=\"A1\" s=\"1\" t=\"n\"><v>123.456</v></c>\
             <c r=\"B1\" s=\"2\" t=\"n\"><v>7</v></c>\
             <c r=\"E1\" s=\"1\" t=\"n\"><v>1.5</v></c>\
             <c r=\"F1\" t=\"inlineStr\"><is><t>label</t></is></c>"
        );
    }

    #[test]
    fn test_formats_only_apply_to_numbers_and_dates() {
        let mut fixture = Fixture::new();
        {
            let mut sheet = fixture.sheet();
            sheet.begin_row().unwrap();
            sheet.write_cell_value_with_format(true, "0.00").unwrap();
            sheet.write_cell_value_with_format("x", "0.00").unwrap();
            sheet.write_cell_value_with_format(CellValue::Formula("=1+1"), "0.00").unwrap();
            sheet.write_cell_value_with_format(None::<f64>, "0.00").unwrap();
        }
        assert_eq!(fixture.styles.count(), 0);
        assert_eq!(
            fixture.xml(),
            "<row r=\"1\"><c r=\"A1\" t=\"b\"><v>1</v></c>\
             <c r=\"B1\" t=\"inlineStr\"><is><t>x</t></is></c>\
             <c r=\"C1\" t=\"e\"><f>=1+1</f></c>"
        );
    }

    #[test]
    fn test_debug_shows_cursor() {
        let mut fixture = Fixture::new();
        let mut sheet = fixture.sheet();
        sheet.begin_row_at(4).unwrap().write_cell_value(1).unwrap();
        let debug = format!("{:?}", sheet);
        assert!(debug.contains("name: \"Sheet1\""));
        assert!(debug.contains("last_row: 4"));
        assert!(debug.contains("last_column: 1"));
    }

    #[test]
    fn test_begin_row_ordering() {
        let mut fixture = Fixture::new();
        let mut sheet = fixture.sheet();
        sheet.begin_row_at(2).unwrap();

        let err = sheet.begin_row_at(2).unwrap_err();
        assert!(matches!(err, ExcelError::RowOutOfOrder { row: 2, last: 2 }));
        assert_eq!(sheet.begin_row_at(1).unwrap_err().kind(), ErrorKind::Ordering);

        sheet.begin_row().unwrap();
        assert_eq!(sheet.last_row(), 3);
    }

    #[test]
    fn test_begin_row_range() {
        let mut fixture = Fixture::new();
        let mut sheet = fixture.sheet();

        assert!(matches!(
            sheet.begin_row_at(0).unwrap_err(),
            ExcelError::RowOutOfRange(0)
        ));
        assert_eq!(
            sheet.begin_row_at(MAX_ROWS + 1).unwrap_err().kind(),
            ErrorKind::Range
        );

        sheet.begin_row_at(MAX_ROWS).unwrap();
        assert_eq!(sheet.begin_row().unwrap_err().kind(), ErrorKind::Range);
    }

    #[test]
    fn test_cell_before_row_fails() {
        let mut fixture = Fixture::new();
        let err = fixture.sheet().write_cell_value(123.456).unwrap_err();
        assert!(matches!(err, ExcelError::NoOpenRow));
        assert_eq!(err.kind(), ErrorKind::Ordering);
    }

    #[test]
    fn test_cell_column_ordering_and_range() {
        let mut fixture = Fixture::new();
        let mut sheet = fixture.sheet();
        sheet.begin_row().unwrap();
        sheet.write_cell_value_at(2, 123.456).unwrap();

        assert_eq!(
            sheet.write_cell_value_at(2, 123.456).unwrap_err().kind(),
            ErrorKind::Ordering
        );
        assert_eq!(
            sheet.write_cell_value_at(1, 123.456).unwrap_err().kind(),
            ErrorKind::Ordering
        );
        assert_eq!(
            sheet
                .write_cell_value_at(MAX_COLUMNS + 1, "test")
                .unwrap_err()
                .kind(),
            ErrorKind::Range
        );
        assert_eq!(
            sheet.write_cell_value_at(0, "test").unwrap_err().kind(),
            ErrorKind::Range
        );

        sheet.write_cell_value_at(MAX_COLUMNS, "last").unwrap();
        assert_eq!(sheet.write_cell_value("x").unwrap_err().kind(), ErrorKind::Range);
    }

    #[test]
    fn test_new_row_resets_columns() {
        let mut fixture = Fixture::new();
        {
            let mut sheet = fixture.sheet();
            sheet.write_row([1, 2]).unwrap();
            sheet.write_row([3]).unwrap();
        }
        assert_eq!(
            fixture.xml(),
            "<row r=\"1\"><c r=\"A1\" t=\"n\"><v>1</v></c><c r=\"B1\" t=\"n\"><v>2</v></c></row>\
             <row r=\"2\"><c r=\"A2\" t=\"n\"><v>3</v></c>"
        );
    }

    #[test]
    fn test_date_limits() {
        let mut fixture = Fixture::new();
        let mut sheet = fixture.sheet();
        sheet.begin_row().unwrap();

        sheet.write_cell_value(minimum_date()).unwrap();
        sheet.write_cell_value(NaiveDateTime::MAX).unwrap();

        let err = sheet
            .write_cell_value(minimum_date() - Duration::days(1))
            .unwrap_err();
        assert!(matches!(err, ExcelError::DateOutOfRange(_)));
        assert_eq!(err.kind(), ErrorKind::Range);
        assert_eq!(sheet.last_column(), 2);
    }

    #[test]
    fn test_text_length_limit() {
        let mut fixture = Fixture::new();
        let mut sheet = fixture.sheet();
        sheet.begin_row().unwrap();

        let longest = "a".repeat(MAX_CHARACTERS_PER_CELL);
        sheet.write_cell_value(longest.as_str()).unwrap();

        let too_long = "a".repeat(MAX_CHARACTERS_PER_CELL + 1);
        let err = sheet.write_cell_value(too_long.as_str()).unwrap_err();
        assert!(matches!(err, ExcelError::TextTooLong { length } if length == MAX_CHARACTERS_PER_CELL + 1));
        assert_eq!(err.kind(), ErrorKind::Capacity);
    }

    #[test]
    fn test_wide_text_at_the_limit() {
        let mut fixture = Fixture::new();
        let mut sheet = fixture.sheet();
        sheet.begin_row().unwrap();

        // Three bytes per character in UTF-8, one UTF-16 unit
        let wide = "東".repeat(MAX_CHARACTERS_PER_CELL);
        sheet.write_cell_value(wide.as_str()).unwrap();

        // Two UTF-16 units each
        let emoji = "😀".repeat(MAX_CHARACTERS_PER_CELL / 2 + 1);
        assert_eq!(
            sheet.write_cell_value(emoji.as_str()).err().unwrap().kind(),
            ErrorKind::Capacity
        );
    }

    #[test]
    fn test_non_finite_numbers_fail() {
        let mut fixture = Fixture::new();
        let mut sheet = fixture.sheet();
        sheet.begin_row().unwrap();
        assert_eq!(
            sheet.write_cell_value(f64::NAN).unwrap_err().kind(),
            ErrorKind::Range
        );
        assert!(sheet.write_cell_value(f64::INFINITY).is_err());
        assert_eq!(sheet.last_column(), 0);
    }

    #[test]
    fn test_failed_calls_write_nothing() {
        let mut fixture = Fixture::new();
        {
            let mut sheet = fixture.sheet();
            sheet.begin_row_at(5).unwrap();
            assert!(sheet.begin_row_at(4).is_err());
            assert!(sheet.write_cell_value_at(0, 1).is_err());
        }
        assert_eq!(fixture.xml(), "<row r=\"5\">");
    }

    #[test]
    fn test_sheet_prologue_and_epilogue_are_idempotent() {
        let mut fixture = Fixture::new();
        {
            let mut sheet = fixture.sheet();
            sheet.begin_sheet().unwrap();
            sheet.begin_sheet().unwrap();
            sheet.begin_row().unwrap().write_cell_value(1).unwrap();
            sheet.end_sheet().unwrap();
            sheet.end_sheet().unwrap();
        }
        assert!(fixture.builder.is_empty());
        assert!(fixture.state.is_ended());

        let xml = fixture.xml();
        assert_eq!(xml.matches("<sheetData>").count(), 1);
        assert_eq!(xml.matches("</worksheet>").count(), 1);
        assert!(xml.contains("tabSelected=\"1\""));
        assert!(xml.ends_with("</row></sheetData><pageMargins left=\"0.7\" right=\"0.7\" top=\"0.75\" bottom=\"0.75\" header=\"0.3\" footer=\"0.3\"/></worksheet>"));
    }
}
