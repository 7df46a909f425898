//! XLSX writer
//!
//! Each exported sheet is laid out as a rectangle anchored at A1. Rows are
//! streamed from the sparse cell map in row-major order, so gaps cost nothing.
//! A formula on a cell with no value gets a placeholder value of `0`.

use std::fs::File;
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::Path;

use crate::error::{XlsxError, XlsxResult};
use crate::options::{effective_password, XlsxWriteOptions};
use crate::protection;
use gridpilot_core::{
    Cell, CellCoordinate, CellRange, CellValue, Sheet, SheetData, SpreadsheetData,
};

/// Longest sheet name the container accepts
pub const MAX_SHEET_NAME_LEN: usize = 31;

const FORBIDDEN_SHEET_NAME_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Cached value written for a formula cell that has no value
static FORMULA_PLACEHOLDER: CellValue = CellValue::Number(0.0);

/// Check that a sheet name can be stored in a workbook
pub fn validate_sheet_name(name: &str) -> XlsxResult<()> {
    let reason = if name.is_empty() {
        Some("name is empty")
    } else if name.chars().count() > MAX_SHEET_NAME_LEN {
        Some("name is longer than 31 characters")
    } else if name.contains(FORBIDDEN_SHEET_NAME_CHARS) {
        Some("name contains one of [ ] : * ? / \\")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(XlsxError::InvalidSheetName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// A cell as it goes into the container
#[derive(Debug, Clone, PartialEq)]
struct ContainerCell<'a> {
    value: &'a CellValue,
    formula: Option<&'a str>,
}

impl<'a> ContainerCell<'a> {
    /// `None` for cells with nothing to write (style-only cells)
    fn from_cell(cell: &'a Cell) -> Option<Self> {
        let formula = cell.formula.as_deref();
        let value = match (&cell.value, formula) {
            (CellValue::Empty, None) => return None,
            (CellValue::Empty, Some(_)) => &FORMULA_PLACEHOLDER,
            (value, _) => value,
        };
        Some(Self { value, formula })
    }
}

/// XLSX file writer
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write a workbook to a file path
    pub fn write_file<P: AsRef<Path>>(
        data: &SpreadsheetData,
        path: P,
        options: &XlsxWriteOptions,
    ) -> XlsxResult<()> {
        // Validate before creating the file so a failed export leaves nothing behind
        let sheets = Self::select_sheets(data, options)?;
        let file = File::create(path)?;
        Self::write_sheets(&sheets, BufWriter::new(file), options)
    }

    /// Write a workbook into a byte buffer
    pub fn write_to_bytes(data: &SpreadsheetData, options: &XlsxWriteOptions) -> XlsxResult<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        Self::write(data, &mut cursor, options)?;
        Ok(cursor.into_inner())
    }

    /// Write a workbook to a writer
    ///
    /// Sheets with no cells are omitted. Fails with [`XlsxError::EmptyWorkbook`]
    /// when nothing is left to write.
    pub fn write<W: Write + Seek>(
        data: &SpreadsheetData,
        writer: W,
        options: &XlsxWriteOptions,
    ) -> XlsxResult<()> {
        let sheets = Self::select_sheets(data, options)?;
        Self::write_sheets(&sheets, writer, options)
    }

    /// Sheets that end up in the container, in workbook order
    fn select_sheets<'a>(
        data: &'a SpreadsheetData,
        options: &XlsxWriteOptions,
    ) -> XlsxResult<Vec<&'a Sheet>> {
        let mut selected = Vec::new();
        for sheet in data.sheets() {
            if let Some(wanted) = options.sheet_name.as_deref() {
                if sheet.name() != wanted {
                    continue;
                }
            }
            if sheet.cells().is_empty() {
                log::debug!("skipping empty sheet '{}'", sheet.name());
                continue;
            }
            validate_sheet_name(sheet.name())?;
            sheet
                .cells()
                .check_bounds()
                .map_err(|_| XlsxError::OutOfBounds {
                    sheet: sheet.name().to_string(),
                    extent: sheet
                        .cells()
                        .used_range()
                        .map(|range| range.end.to_a1_string())
                        .unwrap_or_default(),
                })?;
            selected.push(sheet);
        }

        if selected.is_empty() {
            return Err(XlsxError::EmptyWorkbook);
        }
        Ok(selected)
    }

    fn write_sheets<W: Write + Seek>(
        sheets: &[&Sheet],
        writer: W,
        options: &XlsxWriteOptions,
    ) -> XlsxResult<()> {
        let mut zip = zip::ZipWriter::new(writer);
        let password_hash =
            effective_password(options.password.as_deref()).map(protection::hash_password);

        Self::write_content_types(&mut zip, sheets.len())?;
        Self::write_root_rels(&mut zip)?;
        Self::write_workbook_xml(&mut zip, sheets, password_hash)?;
        Self::write_workbook_rels(&mut zip, sheets.len())?;
        Self::write_styles_xml(&mut zip)?;

        for (i, sheet) in sheets.iter().enumerate() {
            Self::write_worksheet(&mut zip, i, sheet.cells())?;
            log::debug!("wrote sheet '{}' ({} cells)", sheet.name(), sheet.cells().len());
        }

        zip.finish()?;
        Ok(())
    }

    fn write_content_types<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        sheet_count: usize,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("[Content_Types].xml", options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
        );

        for i in 0..sheet_count {
            content.push_str(&format!(
                r#"
    <Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                i + 1
            ));
        }

        content.push_str("\n</Types>");

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_root_rels<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("_rels/.rels", options)?;

        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_workbook_xml<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        sheets: &[&Sheet],
        password_hash: Option<u16>,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/workbook.xml", options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        );

        // Must precede <sheets>
        if let Some(hash) = password_hash {
            content.push_str(&format!(
                r#"
    <workbookProtection lockStructure="1" workbookPassword="{}"/>"#,
                protection::format_hash(hash)
            ));
        }

        content.push_str("\n    <sheets>");
        for (i, sheet) in sheets.iter().enumerate() {
            content.push_str(&format!(
                r#"
        <sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape_xml(sheet.name()),
                i + 1,
                i + 1
            ));
        }

        content.push_str(
            r#"
    </sheets>
</workbook>"#,
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_workbook_rels<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        sheet_count: usize,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/_rels/workbook.xml.rels", options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );

        for i in 0..sheet_count {
            content.push_str(&format!(
                r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                i + 1,
                i + 1
            ));
        }

        content.push_str(&format!(
            r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#,
            sheet_count + 1
        ));

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Single default format; cell styles are not exported
    fn write_styles_xml<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/styles.xml", options)?;

        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>
    <fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>
    <borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>
    <cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
    <cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs>
    <cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>
</styleSheet>"#;

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_worksheet<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        index: usize,
        cells: &SheetData,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file(format!("xl/worksheets/sheet{}.xml", index + 1), options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        if let Some(range) = cells.used_range() {
            content.push_str(&format!("\n    <dimension ref=\"{}\"/>", dimension_ref(&range)));
        }

        content.push_str("\n    <sheetData>");
        let mut open_row = None;
        for (coord, cell) in cells.iter() {
            let Some(entry) = ContainerCell::from_cell(cell) else {
                continue;
            };

            if open_row != Some(coord.row) {
                if open_row.is_some() {
                    content.push_str("\n        </row>");
                }
                content.push_str(&format!("\n        <row r=\"{}\">", coord.row as u64 + 1));
                open_row = Some(coord.row);
            }
            write_cell(&mut content, coord, &entry);
        }
        if open_row.is_some() {
            content.push_str("\n        </row>");
        }
        content.push_str("\n    </sheetData>\n</worksheet>");

        zip.write_all(content.as_bytes())?;
        Ok(())
    }
}

/// `A1` for a single cell, `A1:D7` otherwise
fn dimension_ref(range: &CellRange) -> String {
    if range.start == range.end {
        range.start.to_a1_string()
    } else {
        range.to_a1_string()
    }
}

fn write_cell(content: &mut String, coord: CellCoordinate, cell: &ContainerCell<'_>) {
    let cell_ref = coord.to_a1_string();
    let formula = cell
        .formula
        .map(|f| format!("<f>{}</f>", escape_xml(f)))
        .unwrap_or_default();

    let xml = match cell.value {
        CellValue::Number(n) if n.is_finite() => {
            format!("<c r=\"{}\">{}<v>{}</v></c>", cell_ref, formula, n)
        }
        CellValue::Number(_) => {
            format!("<c r=\"{}\" t=\"e\">{}<v>#NUM!</v></c>", cell_ref, formula)
        }
        CellValue::Boolean(b) => format!(
            "<c r=\"{}\" t=\"b\">{}<v>{}</v></c>",
            cell_ref,
            formula,
            if *b { 1 } else { 0 }
        ),
        // Cached result of a string formula
        CellValue::String(s) if cell.formula.is_some() => format!(
            "<c r=\"{}\" t=\"str\">{}<v>{}</v></c>",
            cell_ref,
            formula,
            escape_xml(&encode_excel_escapes(s))
        ),
        CellValue::String(s) => format!(
            "<c r=\"{}\" t=\"inlineStr\"><is><t xml:space=\"preserve\">{}</t></is></c>",
            cell_ref,
            escape_xml(&encode_excel_escapes(s))
        ),
        CellValue::Empty if cell.formula.is_some() => {
            format!("<c r=\"{}\">{}</c>", cell_ref, formula)
        }
        CellValue::Empty => return,
    };

    content.push_str("\n            ");
    content.push_str(&xml);
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Encode characters XML text cannot carry as Excel's `_xHHHH_` sequences
///
/// A literal underscore that would otherwise read back as an escape is itself
/// escaped as `_x005F_`.
fn encode_excel_escapes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for (i, ch) in s.char_indices() {
        match ch {
            '\t' | '\n' => result.push(ch),
            '_' if looks_like_escape(&s[i..]) => result.push_str("_x005F_"),
            c if (c as u32) < 0x20 => result.push_str(&format!("_x{:04X}_", c as u32)),
            c => result.push(c),
        }
    }
    result
}

fn looks_like_escape(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 7
        && bytes[1] == b'x'
        && bytes[2..6].iter().all(u8::is_ascii_hexdigit)
        && bytes[6] == b'_'
}
