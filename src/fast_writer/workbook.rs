//! Workbook writer: owns the ZIP container and the package parts

use std::fs::File;
use std::io::{BufWriter, Cursor};
use std::path::Path;

use chrono::Utc;
use zip::write::{SimpleFileOptions, ZipWriter};

use super::options::WorkbookOptions;
use super::sink::Sink;
use super::styles::Stylesheet;
use super::worksheet::{SheetState, Worksheet};
use super::xml_writer::XmlBuilder;
use crate::constants::{text_length, MAX_SHEET_NAME_LENGTH};
use crate::error::{ExcelError, Result};
use crate::types::NumberFormat;

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n";
const APPLICATION_NAME: &str = "streamxlsx";

// Relationship ids below this one are taken by sharedStrings and styles
const FIRST_SHEET_RELATIONSHIP: usize = 3;

const INVALID_SHEET_NAME_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Check a worksheet name against the rules spreadsheet applications enforce
fn validate_sheet_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if text_length(name) > MAX_SHEET_NAME_LENGTH {
        "name is longer than 31 characters"
    } else if name.contains(INVALID_SHEET_NAME_CHARS) {
        "name contains one of [ ] : * ? / \\"
    } else if name.starts_with('\'') || name.ends_with('\'') {
        "name begins or ends with an apostrophe"
    } else {
        return Ok(());
    };

    Err(ExcelError::InvalidSheetName {
        name: name.to_string(),
        reason,
    })
}

/// Streaming workbook writer
///
/// Worksheets are written one after another; beginning a sheet ends the
/// previous one, and [`close`](Workbook::close) ends the last one and writes
/// the remaining package parts.
///
/// # Examples
///
/// ```no_run
/// use streamxlsx::Workbook;
///
/// let mut workbook = Workbook::create("report.xlsx")?;
/// let mut sheet = workbook.begin_sheet_named("Sales")?;
/// sheet.write_row(["Region", "Total"])?;
/// sheet.begin_row()?.write_cell_value("North")?.write_cell_value(1250.5)?;
/// workbook.close()?;
/// # Ok::<(), streamxlsx::ExcelError>(())
/// ```
pub struct Workbook<W: Sink> {
    archive: ZipWriter<W>,
    builder: XmlBuilder,
    styles: Stylesheet,
    sheets: Vec<SheetState>,
    options: WorkbookOptions,
}

impl Workbook<BufWriter<File>> {
    /// Create a workbook file at `path`
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::create_with_options(path, WorkbookOptions::default())
    }

    pub fn create_with_options<P: AsRef<Path>>(path: P, options: WorkbookOptions) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        log::debug!("creating workbook at {}", path.as_ref().display());
        Ok(Self::from_writer(
            BufWriter::with_capacity(64 * 1024, file),
            options,
        ))
    }
}

impl Workbook<Cursor<Vec<u8>>> {
    /// Create a workbook in memory, reserving `capacity` bytes up front.
    ///
    /// [`close`](Workbook::close) hands back the cursor rewound to the start.
    pub fn in_memory(capacity: usize) -> Self {
        Self::in_memory_with_options(capacity, WorkbookOptions::default())
    }

    pub fn in_memory_with_options(capacity: usize, options: WorkbookOptions) -> Self {
        Self::from_writer(Cursor::new(Vec::with_capacity(capacity)), options)
    }
}

impl<W: Sink> Workbook<W> {
    /// Create a workbook over any sink
    pub fn from_writer(sink: W, options: WorkbookOptions) -> Self {
        log::debug!(
            "new workbook: compression {:?}, buffer {} bytes",
            options.compression,
            options.buffer_capacity
        );
        Workbook {
            archive: ZipWriter::new(sink),
            builder: XmlBuilder::with_capacity(options.buffer_capacity),
            styles: Stylesheet::new(),
            sheets: Vec::new(),
            options,
        }
    }

    /// Begin a worksheet named `Sheet<id>`
    pub fn begin_sheet(&mut self) -> Result<Worksheet<'_, ZipWriter<W>>> {
        let id = self.next_sheet_id();
        self.begin_sheet_with_id(id, &format!("Sheet{}", id))
    }

    /// Begin a worksheet with the given name
    pub fn begin_sheet_named(&mut self, name: &str) -> Result<Worksheet<'_, ZipWriter<W>>> {
        let id = self.next_sheet_id();
        self.begin_sheet_with_id(id, name)
    }

    /// Begin a worksheet with an explicit 1-based id, ending the open one.
    ///
    /// The id and the name must not be used by another sheet of this
    /// workbook; names are compared ignoring case. Nothing is written when
    /// validation fails, and the open sheet stays open.
    pub fn begin_sheet_with_id(
        &mut self,
        id: u32,
        name: &str,
    ) -> Result<Worksheet<'_, ZipWriter<W>>> {
        if id == 0 {
            return Err(ExcelError::InvalidSheetId(id));
        }
        if self.sheets.iter().any(|sheet| sheet.id == id) {
            return Err(ExcelError::DuplicateSheetId(id));
        }
        validate_sheet_name(name)?;
        let lowercase = name.to_lowercase();
        if self
            .sheets
            .iter()
            .any(|sheet| sheet.name.to_lowercase() == lowercase)
        {
            return Err(ExcelError::DuplicateSheetName(name.to_string()));
        }

        self.end_sheet()?;

        let path = format!("xl/worksheets/sheet{}.xml", id);
        let options = self.part_options();
        self.archive.start_file(path, options)?;

        let relationship_id = format!("rId{}", self.sheets.len() + FIRST_SHEET_RELATIONSHIP);
        let selected = self.sheets.is_empty();
        self.sheets.push(SheetState::new(
            id,
            name.to_string(),
            relationship_id,
            selected,
        ));

        let mut sheet = self
            .worksheet()
            .ok_or(ExcelError::InvalidSheetId(id))?;
        sheet.begin_sheet()?;
        Ok(sheet)
    }

    /// Handle onto the open worksheet, if any
    pub fn worksheet(&mut self) -> Option<Worksheet<'_, ZipWriter<W>>> {
        let state = self.sheets.last_mut().filter(|sheet| !sheet.is_ended())?;
        Some(Worksheet::new(
            state,
            &mut self.archive,
            &mut self.builder,
            &mut self.styles,
        ))
    }

    /// End the open worksheet. Does nothing if no sheet is open.
    pub fn end_sheet(&mut self) -> Result<()> {
        match self.worksheet() {
            Some(mut sheet) => sheet.end_sheet(),
            None => Ok(()),
        }
    }

    /// Resolve a number format code to its style pair, registering it on first use
    pub fn get_or_create_number_format(&mut self, format: &str) -> Result<NumberFormat> {
        self.styles.get_or_create_number_format(format)
    }

    /// Number of worksheets begun so far
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// End the open worksheet, write the remaining package parts and finish the sink.
    ///
    /// A workbook without worksheets gets an empty `Sheet1`, as the package
    /// must contain at least one.
    pub fn close(mut self) -> Result<W::Output> {
        if self.sheets.is_empty() {
            self.begin_sheet()?;
        }
        self.end_sheet()?;

        self.write_root_relationships()?;
        self.write_content_types()?;
        self.write_app_properties()?;
        self.write_core_properties()?;
        self.write_workbook()?;
        self.write_styles()?;
        self.write_shared_strings()?;
        self.write_workbook_relationships()?;

        log::debug!(
            "closing workbook: {} sheets, {} number formats, {} bytes of XML",
            self.sheets.len(),
            self.styles.count(),
            self.builder.bytes_committed()
        );

        let sink = self.archive.finish()?;
        Ok(sink.finish()?)
    }

    fn next_sheet_id(&self) -> u32 {
        self.sheets
            .iter()
            .map(|sheet| sheet.id)
            .max()
            .unwrap_or(0)
            .saturating_add(1)
    }

    fn part_options(&self) -> SimpleFileOptions {
        self.options.compression.file_options()
    }

    fn start_part(&mut self, name: &str) -> Result<()> {
        log::trace!("writing part {}", name);
        let options = self.part_options();
        self.archive.start_file(name, options)?;
        self.builder.append_str(&mut self.archive, XML_DECLARATION)
    }

    fn write_root_relationships(&mut self) -> Result<()> {
        self.start_part("_rels/.rels")?;
        self.builder.append_str(
            &mut self.archive,
            "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
             <Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" Target=\"xl/workbook.xml\"/>\
             <Relationship Id=\"rId2\" Type=\"http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties\" Target=\"docProps/core.xml\"/>\
             <Relationship Id=\"rId3\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties\" Target=\"docProps/app.xml\"/>\
             </Relationships>",
        )?;
        self.builder.commit(&mut self.archive)
    }

    fn write_content_types(&mut self) -> Result<()> {
        self.start_part("[Content_Types].xml")?;
        self.builder.append_str(
            &mut self.archive,
            "<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
             <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
             <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
             <Override PartName=\"/xl/workbook.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml\"/>\
             <Override PartName=\"/xl/styles.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml\"/>\
             <Override PartName=\"/xl/sharedStrings.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml\"/>\
             <Override PartName=\"/docProps/core.xml\" ContentType=\"application/vnd.openxmlformats-package.core-properties+xml\"/>\
             <Override PartName=\"/docProps/app.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.extended-properties+xml\"/>",
        )?;
        for sheet in &self.sheets {
            self.builder
                .append_str(&mut self.archive, "<Override PartName=\"/xl/worksheets/sheet")?;
            self.builder.append_integer(&mut self.archive, sheet.id)?;
            self.builder.append_str(
                &mut self.archive,
                ".xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>",
            )?;
        }
        self.builder.append_str(&mut self.archive, "</Types>")?;
        self.builder.commit(&mut self.archive)
    }

    fn write_app_properties(&mut self) -> Result<()> {
        self.start_part("docProps/app.xml")?;
        self.builder.append_str(
            &mut self.archive,
            "<Properties xmlns=\"http://schemas.openxmlformats.org/officeDocument/2006/extended-properties\" \
             xmlns:vt=\"http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes\">\
             <Application>",
        )?;
        self.builder.append_str(&mut self.archive, APPLICATION_NAME)?;
        self.builder.append_str(
            &mut self.archive,
            "</Application><DocSecurity>0</DocSecurity><ScaleCrop>false</ScaleCrop>\
             <LinksUpToDate>false</LinksUpToDate><SharedDoc>false</SharedDoc>\
             <HyperlinksChanged>false</HyperlinksChanged></Properties>",
        )?;
        self.builder.commit(&mut self.archive)
    }

    fn write_core_properties(&mut self) -> Result<()> {
        let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let creator = self
            .options
            .creator
            .clone()
            .unwrap_or_else(|| APPLICATION_NAME.to_string());

        self.start_part("docProps/core.xml")?;
        self.builder.append_str(
            &mut self.archive,
            "<cp:coreProperties xmlns:cp=\"http://schemas.openxmlformats.org/package/2006/metadata/core-properties\" \
             xmlns:dc=\"http://purl.org/dc/elements/1.1/\" xmlns:dcterms=\"http://purl.org/dc/terms/\" \
             xmlns:dcmitype=\"http://purl.org/dc/dcmitype/\" xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">\
             <dc:creator>",
        )?;
        self.builder.append_escaped(&mut self.archive, &creator)?;
        self.builder
            .append_str(&mut self.archive, "</dc:creator><dcterms:created xsi:type=\"dcterms:W3CDTF\">")?;
        self.builder.append_str(&mut self.archive, &timestamp)?;
        self.builder.append_str(
            &mut self.archive,
            "</dcterms:created><dcterms:modified xsi:type=\"dcterms:W3CDTF\">",
        )?;
        self.builder.append_str(&mut self.archive, &timestamp)?;
        self.builder
            .append_str(&mut self.archive, "</dcterms:modified></cp:coreProperties>")?;
        self.builder.commit(&mut self.archive)
    }

    fn write_workbook(&mut self) -> Result<()> {
        self.start_part("xl/workbook.xml")?;
        self.builder.append_str(
            &mut self.archive,
            "<workbook xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\" \
             xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\">\
             <bookViews><workbookView/></bookViews><sheets>",
        )?;
        for sheet in &self.sheets {
            self.builder.append_str(&mut self.archive, "<sheet name=\"")?;
            self.builder.append_escaped(&mut self.archive, &sheet.name)?;
            self.builder.append_str(&mut self.archive, "\" sheetId=\"")?;
            self.builder.append_integer(&mut self.archive, sheet.id)?;
            self.builder.append_str(&mut self.archive, "\" r:id=\"")?;
            self.builder
                .append_str(&mut self.archive, &sheet.relationship_id)?;
            self.builder.append_str(&mut self.archive, "\"/>")?;
        }
        self.builder.append_str(
            &mut self.archive,
            "</sheets><calcPr fullCalcOnLoad=\"1\"/></workbook>",
        )?;
        self.builder.commit(&mut self.archive)
    }

    fn write_styles(&mut self) -> Result<()> {
        log::trace!("writing part xl/styles.xml");
        let options = self.part_options();
        self.archive.start_file("xl/styles.xml", options)?;
        self.styles.write_xml(&mut self.builder, &mut self.archive)
    }

    fn write_shared_strings(&mut self) -> Result<()> {
        // Every string is inline; the part only has to exist
        self.start_part("xl/sharedStrings.xml")?;
        self.builder.append_str(
            &mut self.archive,
            "<sst xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\" count=\"1\" uniqueCount=\"1\">\
             <si><t xml:space=\"preserve\"></t></si></sst>",
        )?;
        self.builder.commit(&mut self.archive)
    }

    fn write_workbook_relationships(&mut self) -> Result<()> {
        self.start_part("xl/_rels/workbook.xml.rels")?;
        self.builder.append_str(
            &mut self.archive,
            "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
             <Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings\" Target=\"sharedStrings.xml\"/>\
             <Relationship Id=\"rId2\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles\" Target=\"styles.xml\"/>",
        )?;
        for sheet in &self.sheets {
            self.builder
                .append_str(&mut self.archive, "<Relationship Id=\"")?;
            self.builder
                .append_str(&mut self.archive, &sheet.relationship_id)?;
            self.builder.append_str(
                &mut self.archive,
                "\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet\" Target=\"worksheets/sheet",
            )?;
            self.builder.append_integer(&mut self.archive, sheet.id)?;
            self.builder.append_str(&mut self.archive, ".xml\"/>")?;
        }
        self.builder
            .append_str(&mut self.archive, "</Relationships>")?;
        self.builder.commit(&mut self.archive)
    }
}
