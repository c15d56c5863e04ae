//! Number format table for cell style deduplication

use super::xml_writer::XmlBuilder;
use crate::constants::{FIRST_CUSTOM_FORMAT_ID, MAX_STYLES};
use crate::error::{ExcelError, Result};
use crate::types::NumberFormat;
use indexmap::IndexMap;
use std::io::Write;

/// Number formats registered across the workbook, in registration order
#[derive(Debug, Default)]
pub struct Stylesheet {
    formats: IndexMap<String, NumberFormat>,
}

impl Stylesheet {
    pub fn new() -> Self {
        Stylesheet {
            formats: IndexMap::new(),
        }
    }

    /// Get the style pair for `format`, registering it on first use.
    ///
    /// Formats are matched by exact string. Fails once [`MAX_STYLES`] distinct
    /// formats exist and a new one is requested; known formats still resolve.
    pub fn get_or_create_number_format(&mut self, format: &str) -> Result<NumberFormat> {
        if let Some(&indexes) = self.formats.get(format) {
            return Ok(indexes);
        }

        let count = self.formats.len();
        if count >= MAX_STYLES {
            return Err(ExcelError::TooManyStyles);
        }

        let indexes = NumberFormat {
            style_index: count as u32 + 1,
            format_id: count as u32 + FIRST_CUSTOM_FORMAT_ID,
        };
        self.formats.insert(format.to_string(), indexes);
        Ok(indexes)
    }

    /// Get number of registered formats
    pub fn count(&self) -> usize {
        self.formats.len()
    }

    /// Registered formats with their style pairs, in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, NumberFormat)> + '_ {
        self.formats.iter().map(|(code, &indexes)| (code.as_str(), indexes))
    }

    /// Write the styles part: every registered format plus the default style
    pub fn write_xml<W: Write>(&self, builder: &mut XmlBuilder, writer: &mut W) -> Result<()> {
        builder.append_str(
            writer,
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
             <styleSheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\">",
        )?;

        if !self.formats.is_empty() {
            builder.append_str(writer, "<numFmts count=\"")?;
            builder.append_integer(writer, self.formats.len())?;
            builder.append_str(writer, "\">")?;
            for (code, indexes) in self.iter() {
                builder.append_str(writer, "<numFmt numFmtId=\"")?;
                builder.append_integer(writer, indexes.format_id)?;
                builder.append_str(writer, "\" formatCode=\"")?;
                builder.append_escaped(writer, code)?;
                builder.append_str(writer, "\"/>")?;
            }
            builder.append_str(writer, "</numFmts>")?;
        }

        builder.append_str(
            writer,
            "<fonts count=\"1\"><font><sz val=\"11\"/><color theme=\"1\"/><name val=\"Calibri\"/><family val=\"2\"/><scheme val=\"minor\"/></font></fonts>\
             <fills count=\"2\"><fill><patternFill patternType=\"none\"/></fill><fill><patternFill patternType=\"gray125\"/></fill></fills>\
             <borders count=\"1\"><border><left/><right/><top/><bottom/><diagonal/></border></borders>\
             <cellStyleXfs count=\"1\"><xf numFmtId=\"0\" fontId=\"0\" fillId=\"0\" borderId=\"0\"/></cellStyleXfs>\
             <cellXfs count=\"",
        )?;
        builder.append_integer(writer, self.formats.len() + 1)?;
        builder.append_str(
            writer,
            "\"><xf numFmtId=\"0\" fontId=\"0\" fillId=\"0\" borderId=\"0\" xfId=\"0\"/>",
        )?;
        for (_, indexes) in self.iter() {
            builder.append_str(writer, "<xf numFmtId=\"")?;
            builder.append_integer(writer, indexes.format_id)?;
            builder.append_str(
                writer,
                "\" fontId=\"0\" fillId=\"0\" borderId=\"0\" xfId=\"0\" applyNumberFormat=\"1\"/>",
            )?;
        }
        builder.append_str(
            writer,
            "</cellXfs>\
             <cellStyles count=\"1\"><cellStyle name=\"Normal\" xfId=\"0\" builtinId=\"0\"/></cellStyles>\
             </styleSheet>",
        )?;

        builder.commit(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_number_formats_are_deduplicated() {
        let mut styles = Stylesheet::new();

        let first = styles.get_or_create_number_format("0.00").unwrap();
        let second = styles.get_or_create_number_format("0.00%").unwrap();
        let again = styles.get_or_create_number_format("0.00").unwrap();

        assert_eq!(
            first,
            NumberFormat {
                style_index: 1,
                format_id: 164
            }
        );
        assert_eq!(
            second,
            NumberFormat {
                style_index: 2,
                format_id: 165
            }
        );
        assert_eq!(again, first);
        assert_eq!(styles.count(), 2);
    }

    #[test]
    fn test_exact_string_matching() {
        let mut styles = Stylesheet::new();
        let lower = styles.get_or_create_number_format("yyyy-mm-dd").unwrap();
        let upper = styles.get_or_create_number_format("YYYY-MM-DD").unwrap();
        assert_ne!(lower, upper);
    }

    #[test]
    fn test_limit_fails_on_the_crossing_registration() {
        let mut styles = Stylesheet::new();
        for i in 0..MAX_STYLES {
            styles.get_or_create_number_format(&i.to_string()).unwrap();
        }
        assert_eq!(styles.count(), MAX_STYLES);

        // Known formats keep resolving at the limit
        let known = styles.get_or_create_number_format("0").unwrap();
        assert_eq!(known.style_index, 1);

        let err = styles.get_or_create_number_format("0.00").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Capacity);
        assert_eq!(styles.count(), MAX_STYLES);
    }

    #[test]
    fn test_styles_xml() {
        let mut styles = Stylesheet::new();
        styles.get_or_create_number_format("0.00").unwrap();
        styles.get_or_create_number_format("\"$\"#,##0").unwrap();

        let mut output = Vec::new();
        let mut builder = XmlBuilder::new();
        styles.write_xml(&mut builder, &mut output).unwrap();
        assert!(builder.is_empty());

        let xml = String::from_utf8(output).unwrap();
        assert!(xml.contains("<numFmts count=\"2\">"));
        assert!(xml.contains("<numFmt numFmtId=\"164\" formatCode=\"0.00\"/>"));
        assert!(xml.contains("<numFmt numFmtId=\"165\" formatCode=\"&quot;$&quot;#,##0\"/>"));
        assert!(xml.contains("<cellXfs count=\"3\">"));
        assert_eq!(xml.matches("applyNumberFormat=\"1\"").count(), 2);
    }

    #[test]
    fn test_styles_xml_without_formats() {
        let styles = Stylesheet::new();
        let mut output = Vec::new();
        styles
            .write_xml(&mut XmlBuilder::new(), &mut output)
            .unwrap();

        let xml = String::from_utf8(output).unwrap();
        assert!(!xml.contains("numFmts"));
        assert!(xml.contains("<cellXfs count=\"1\">"));
    }
}
