//! XLSX reader

mod shared_formula;

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::options::{effective_password, XlsxReadOptions};
use crate::protection;
use shared_formula::SharedFormula;
use gridpilot_core::{Cell, CellCoordinate, CellValue, SheetData, SpreadsheetData};

/// Signature of an OLE compound file, the container Excel uses for
/// password-encrypted workbooks
const CFB_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// `_x000D_` is a carriage return, `_x005F_` an escaped underscore. Anything
/// that is not exactly `_x` + four hex digits + `_` is kept as written.
pub(crate) fn decode_excel_escapes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find("_x") {
        result.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        let decoded = candidate
            .get(2..6)
            .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .filter(|_| candidate.as_bytes().get(6) == Some(&b'_'))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);

        match decoded {
            Some(ch) => {
                result.push(ch);
                rest = &candidate[7..];
            }
            None => {
                result.push_str("_x");
                rest = &candidate[2..];
            }
        }
    }
    result.push_str(rest);
    result
}

/// A `<sheet>` entry of `xl/workbook.xml`
#[derive(Debug)]
struct SheetEntry {
    name: String,
    r_id: String,
}

/// What `xl/workbook.xml` tells us
#[derive(Debug, Default)]
struct WorkbookInfo {
    sheets: Vec<SheetEntry>,
    password_hash: Option<u16>,
}

/// Where the next cell without an `r` attribute goes
#[derive(Debug, Default)]
struct CellCursor {
    row: Option<u32>,
    next_col: u32,
}

impl CellCursor {
    fn start_row(&mut self, r: Option<u32>) {
        let row = match r {
            Some(r) => r.saturating_sub(1),
            None => self.row.map_or(0, |row| row + 1),
        };
        self.row = Some(row);
        self.next_col = 0;
    }

    fn place(&mut self, reference: Option<&str>) -> XlsxResult<CellCoordinate> {
        let coord = match reference {
            Some(r) => CellCoordinate::parse(r).map_err(|e| {
                XlsxError::Parse(format!("Invalid cell reference '{}': {}", r, e))
            })?,
            None => CellCoordinate::new(self.row.unwrap_or(0), self.next_col),
        };
        self.row = Some(coord.row);
        self.next_col = coord.col.saturating_add(1);
        Ok(coord)
    }
}

/// Text-bearing child of a `<c>` element
#[derive(Debug, Clone, Copy)]
enum CellText {
    Value,
    Formula,
    Inline,
}

/// A `<c>` element being read
#[derive(Debug)]
struct PendingCell {
    coord: CellCoordinate,
    cell_type: Option<String>,
    value: Option<String>,
    formula: Option<String>,
    /// `si` of a `<f t="shared">` element
    shared_index: Option<u32>,
    inline: Option<String>,
}

impl PendingCell {
    fn start(e: &BytesStart, cursor: &mut CellCursor) -> XlsxResult<Self> {
        let mut reference = None;
        let mut cell_type = None;
        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"r" => reference = attr.unescape_value().ok().map(|s| s.to_string()),
                b"t" => cell_type = attr.unescape_value().ok().map(|s| s.to_string()),
                _ => {}
            }
        }

        Ok(Self {
            coord: cursor.place(reference.as_deref())?,
            cell_type,
            value: None,
            formula: None,
            shared_index: None,
            inline: None,
        })
    }

    /// Pick up the shared-formula group from an `<f>` element
    fn formula_attributes(&mut self, e: &BytesStart) {
        let mut shared = false;
        let mut index = None;
        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"t" => shared = attr.value.as_ref() == b"shared",
                b"si" => index = attr.unescape_value().ok().and_then(|v| v.parse().ok()),
                _ => {}
            }
        }
        if shared {
            self.shared_index = index;
        }
    }

    fn push_text(&mut self, target: CellText, text: &str) {
        let slot = match target {
            CellText::Value => &mut self.value,
            CellText::Formula => &mut self.formula,
            CellText::Inline => &mut self.inline,
        };
        slot.get_or_insert_with(String::new).push_str(text);
    }

    /// Build the stored cell; `None` for cells with neither value nor formula
    ///
    /// A shared-formula anchor registers its group in `shared_formulas`; the
    /// other members of the group get the anchor's formula moved to their
    /// position.
    fn finish(
        self,
        shared_strings: &[String],
        shared_formulas: &mut HashMap<u32, SharedFormula>,
    ) -> XlsxResult<Option<(CellCoordinate, Cell)>> {
        let value = match (self.inline, self.value) {
            (Some(text), _) => CellValue::String(decode_excel_escapes(&text)),
            (None, Some(raw)) => typed_value(self.cell_type.as_deref(), &raw, shared_strings)?,
            (None, None) => CellValue::Empty,
        };

        let formula = match (self.formula.filter(|f| !f.is_empty()), self.shared_index) {
            (Some(text), Some(si)) => {
                shared_formulas.insert(si, SharedFormula::new(self.coord, text.clone()));
                Some(text)
            }
            (Some(text), None) => Some(text),
            (None, Some(si)) => match shared_formulas.get(&si) {
                Some(group) => Some(group.formula_at(self.coord)),
                None => {
                    log::warn!("cell {} refers to unknown shared formula {}", self.coord, si);
                    None
                }
            },
            (None, None) => None,
        };

        let mut cell = Cell::new(value);
        if let Some(f) = formula {
            cell = cell.with_formula(f);
        }

        if cell.value.is_empty() && cell.formula.is_none() {
            return Ok(None);
        }
        Ok(Some((self.coord, cell)))
    }
}

/// Interpret a `<v>` payload according to the cell's `t` attribute
fn typed_value(
    cell_type: Option<&str>,
    raw: &str,
    shared_strings: &[String],
) -> XlsxResult<CellValue> {
    let value = match cell_type {
        // Shared string
        Some("s") => {
            let idx: usize = raw
                .trim()
                .parse()
                .map_err(|_| XlsxError::Parse(format!("Invalid shared string index: {}", raw)))?;
            let s = shared_strings.get(idx).ok_or_else(|| {
                XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
            })?;
            CellValue::String(s.clone())
        }

        Some("b") => CellValue::Boolean(raw == "1" || raw.eq_ignore_ascii_case("true")),

        // Error codes (#DIV/0!, #N/A) are kept as their display text
        Some("e") => CellValue::String(raw.to_string()),

        Some("str") | Some("inlineStr") => CellValue::String(decode_excel_escapes(raw)),

        None | Some("n") => match raw.trim().parse::<f64>() {
            Ok(n) => CellValue::Number(n),
            Err(_) => CellValue::String(raw.to_string()),
        },

        // ISO dates ("d") and anything unknown stay textual
        Some(_) => CellValue::String(raw.to_string()),
    };
    Ok(value)
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(
        path: P,
        options: &XlsxReadOptions,
    ) -> XlsxResult<SpreadsheetData> {
        let file = File::open(path)?;
        Self::read(BufReader::new(file), options)
    }

    /// Read a workbook from an in-memory buffer
    pub fn read_bytes(bytes: &[u8], options: &XlsxReadOptions) -> XlsxResult<SpreadsheetData> {
        Self::read(Cursor::new(bytes), options)
    }

    /// Read a workbook from a reader
    ///
    /// Sheets come back in workbook order. With `options.sheet_name` set only
    /// that sheet is read; a name the workbook lacks yields no sheets at all.
    pub fn read<R: Read + Seek>(
        mut reader: R,
        options: &XlsxReadOptions,
    ) -> XlsxResult<SpreadsheetData> {
        Self::reject_encrypted(&mut reader)?;

        let mut archive = zip::ZipArchive::new(reader)?;

        // Verify this is an XLSX file
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let info = Self::read_workbook_xml(&mut archive)?;
        Self::check_password(&info, options)?;

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let mut data = SpreadsheetData::empty();
        for entry in &info.sheets {
            if let Some(wanted) = options.sheet_name.as_deref() {
                if entry.name != wanted {
                    continue;
                }
            }

            let Some(path) = sheet_paths.get(&entry.r_id) else {
                log::warn!(
                    "sheet '{}' has no worksheet relationship {}, skipping",
                    entry.name,
                    entry.r_id
                );
                continue;
            };

            let cells = Self::read_worksheet(&mut archive, path, &shared_strings)?;
            log::debug!("read sheet '{}' ({} cells)", entry.name, cells.len());
            data.insert_sheet(entry.name.as_str(), cells)?;
        }

        if let Some(wanted) = options.sheet_name.as_deref() {
            if data.is_empty() {
                log::debug!("sheet '{}' not found in workbook", wanted);
            }
        }

        Ok(data)
    }

    fn reject_encrypted<R: Read + Seek>(reader: &mut R) -> XlsxResult<()> {
        let start = reader.stream_position()?;
        let mut magic = Vec::with_capacity(CFB_MAGIC.len());
        reader
            .by_ref()
            .take(CFB_MAGIC.len() as u64)
            .read_to_end(&mut magic)?;
        reader.seek(SeekFrom::Start(start))?;

        if magic == CFB_MAGIC {
            return Err(XlsxError::EncryptedContainer);
        }
        Ok(())
    }

    fn check_password(info: &WorkbookInfo, options: &XlsxReadOptions) -> XlsxResult<()> {
        let password = effective_password(options.password.as_deref());
        match (info.password_hash, password) {
            (Some(hash), Some(password)) => {
                if !protection::verify_password(password, hash) {
                    return Err(XlsxError::IncorrectPassword);
                }
            }
            (Some(_), None) => log::debug!("workbook is protected, reading without password"),
            (None, Some(_)) => log::debug!("workbook is not protected, ignoring password"),
            (None, None) => {}
        }
        Ok(())
    }

    /// Read the shared strings table
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings), // No shared strings is valid
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        // Leading and trailing spaces inside <t> are content
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut current = String::new();
        let mut in_si = false;
        let mut in_t = false;
        // Phonetic runs repeat the text in another script
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current.clear();
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" if in_si && !in_phonetic => in_t = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.local_name().as_ref() == b"si" => {
                    strings.push(String::new());
                }
                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current));
                        current.clear();
                        in_si = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => current.push_str(&e.unescape()?),
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    /// Read sheet names, rIds and workbook protection from workbook.xml
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<WorkbookInfo> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut info = WorkbookInfo::default();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"sheet" => {
                        let mut name = None;
                        let mut r_id = None;

                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"name" => {
                                    name = attr.unescape_value().ok().map(|s| s.to_string());
                                }
                                b"r:id" => {
                                    r_id = attr.unescape_value().ok().map(|s| s.to_string());
                                }
                                _ => {}
                            }
                        }

                        if let (Some(name), Some(r_id)) = (name, r_id) {
                            info.sheets.push(SheetEntry { name, r_id });
                        }
                    }
                    b"workbookProtection" => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"workbookPassword" {
                                info.password_hash = attr
                                    .unescape_value()
                                    .ok()
                                    .and_then(|v| protection::parse_hash(&v));
                            }
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(info)
    }

    /// Read workbook.xml.rels to get sheet file paths
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.local_name().as_ref() == b"Relationship" =>
                {
                    let mut id = None;
                    let mut target = None;
                    let mut rel_type = None;

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => id = attr.unescape_value().ok().map(|s| s.to_string()),
                            b"Target" => {
                                target = attr.unescape_value().ok().map(|s| s.to_string())
                            }
                            b"Type" => {
                                rel_type = attr.unescape_value().ok().map(|s| s.to_string())
                            }
                            _ => {}
                        }
                    }

                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            rels.insert(id, resolve_part_path(&target));
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Read the cells of one worksheet part
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        shared_strings: &[String],
    ) -> XlsxResult<SheetData> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut sheet = SheetData::new();
        let mut cursor = CellCursor::default();
        let mut pending: Option<PendingCell> = None;
        let mut shared_formulas = HashMap::new();
        let mut text_target: Option<CellText> = None;
        let mut in_inline_str = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"row" => cursor.start_row(row_number(&e)),
                    b"c" => pending = Some(PendingCell::start(&e, &mut cursor)?),
                    b"v" if pending.is_some() => text_target = Some(CellText::Value),
                    b"f" => {
                        if let Some(cell) = pending.as_mut() {
                            cell.formula_attributes(&e);
                            text_target = Some(CellText::Formula);
                        }
                    }
                    b"is" if pending.is_some() => in_inline_str = true,
                    b"t" if in_inline_str => text_target = Some(CellText::Inline),
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                    b"row" => cursor.start_row(row_number(&e)),
                    // Style-only cell: it still occupies a column position
                    b"c" => {
                        PendingCell::start(&e, &mut cursor)?;
                    }
                    // Member of a shared-formula group
                    b"f" => {
                        if let Some(cell) = pending.as_mut() {
                            cell.formula_attributes(&e);
                        }
                    }
                    _ => {}
                },
                Ok(Event::Text(e)) => {
                    if let (Some(target), Some(cell)) = (text_target, pending.as_mut()) {
                        cell.push_text(target, &e.unescape()?);
                    }
                }
                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"v" | b"f" | b"t" => text_target = None,
                    b"is" => in_inline_str = false,
                    b"c" => {
                        text_target = None;
                        if let Some(cell) = pending.take() {
                            if let Some((coord, cell)) = cell.finish(shared_strings, &mut shared_formulas)? {
                                sheet.insert(coord, cell);
                            }
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheet)
    }
}

fn row_number(e: &BytesStart) -> Option<u32> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"r")
        .and_then(|attr| attr.unescape_value().ok().and_then(|s| s.parse().ok()))
}

/// Relationship targets are relative to `xl/` unless absolute
fn resolve_part_path(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target.trim_start_matches("./")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const CONTENT_TYPES: &[u8] = br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/></Types>"#;
    const WORKBOOK_RELS: &[u8] = br#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId9" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/></Relationships>"#;

    /// Minimal single-sheet container around the given parts
    fn build_xlsx(workbook: &str, sheet: &str, shared_strings: Option<&str>) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options = zip::write::SimpleFileOptions::default();

            zip.start_file("[Content_Types].xml", options).unwrap();
            zip.write_all(CONTENT_TYPES).unwrap();

            zip.start_file("xl/workbook.xml", options).unwrap();
            zip.write_all(workbook.as_bytes()).unwrap();

            zip.start_file("xl/_rels/workbook.xml.rels", options)
                .unwrap();
            zip.write_all(WORKBOOK_RELS).unwrap();

            zip.start_file("xl/worksheets/sheet1.xml", options).unwrap();
            zip.write_all(sheet.as_bytes()).unwrap();

            if let Some(sst) = shared_strings {
                zip.start_file("xl/sharedStrings.xml", options).unwrap();
                zip.write_all(sst.as_bytes()).unwrap();
            }

            zip.finish().unwrap();
        }
        buf
    }

    fn workbook_xml(extra: &str) -> String {
        format!(
            r#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">{}<sheets><sheet name="Data" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
            extra
        )
    }

    fn sheet_xml(rows: &str) -> String {
        format!(
            r#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
            rows
        )
    }

    #[test]
    fn test_decode_excel_escapes() {
        assert_eq!(decode_excel_escapes("Line1_x000D_Line2"), "Line1\rLine2");
        assert_eq!(decode_excel_escapes("a_x0009_b_x000a_c"), "a\tb\nc");
        assert_eq!(decode_excel_escapes("snake_x005F_case"), "snake_case");
        assert_eq!(decode_excel_escapes("no escapes"), "no escapes");
    }

    #[test]
    fn test_decode_excel_escapes_partial_sequence() {
        assert_eq!(decode_excel_escapes("_x00"), "_x00");
        assert_eq!(decode_excel_escapes("_xZZZZ_"), "_xZZZZ_");
        assert_eq!(decode_excel_escapes("a_x0041"), "a_x0041");
        assert_eq!(decode_excel_escapes("__x0041_"), "_A");
    }

    #[test]
    fn test_read_empty_sheet() {
        let bytes = build_xlsx(&workbook_xml(""), &sheet_xml(""), None);
        let data = XlsxReader::read_bytes(&bytes, &XlsxReadOptions::default()).unwrap();

        assert_eq!(data.sheet_names(), vec!["Data"]);
        assert!(data.cells("Data").unwrap().is_empty());
    }

    #[test]
    fn test_read_cell_types() {
        let sst = r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><si><t>Product</t></si><si><r><t>rich </t></r><r><t>text</t></r></si></sst>"#;
        let rows = r#"<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1"><v>5</v></c><c r="C1" t="b"><v>1</v></c><c r="D1" t="e"><v>#DIV/0!</v></c></row><row r="2"><c r="A2" t="s"><v>1</v></c><c r="B2" t="inlineStr"><is><t xml:space="preserve"> padded </t></is></c><c r="C2" s="3"/></row>"#;
        let bytes = build_xlsx(&workbook_xml(""), &sheet_xml(rows), Some(sst));
        let data = XlsxReader::read_bytes(&bytes, &XlsxReadOptions::default()).unwrap();
        let cells = data.cells("Data").unwrap();

        let value = |addr: &str| cells.cell(addr).unwrap().map(|c| c.value.clone());
        assert_eq!(value("A1"), Some(CellValue::string("Product")));
        assert_eq!(value("B1"), Some(CellValue::Number(5.0)));
        assert_eq!(value("C1"), Some(CellValue::Boolean(true)));
        assert_eq!(value("D1"), Some(CellValue::string("#DIV/0!")));
        assert_eq!(value("A2"), Some(CellValue::string("rich text")));
        assert_eq!(value("B2"), Some(CellValue::string(" padded ")));
        // Style-only cells are not stored
        assert_eq!(value("C2"), None);
    }

    #[test]
    fn test_read_formula_with_and_without_cached_value() {
        let rows = r#"<row r="1"><c r="A1"><f>SUM(B1:B3)</f><v>6</v></c><c r="B1"><f>A1*2</f></c><c r="C1" t="str"><f>"a"&amp;"b"</f><v>ab</v></c></row>"#;
        let bytes = build_xlsx(&workbook_xml(""), &sheet_xml(rows), None);
        let data = XlsxReader::read_bytes(&bytes, &XlsxReadOptions::default()).unwrap();
        let cells = data.cells("Data").unwrap();

        let a1 = cells.cell("A1").unwrap().unwrap();
        assert_eq!(a1.value, CellValue::Number(6.0));
        assert_eq!(a1.formula(), Some("SUM(B1:B3)"));

        let b1 = cells.cell("B1").unwrap().unwrap();
        assert_eq!(b1.value, CellValue::Empty);
        assert_eq!(b1.formula(), Some("A1*2"));

        let c1 = cells.cell("C1").unwrap().unwrap();
        assert_eq!(c1.value, CellValue::string("ab"));
        assert_eq!(c1.formula(), Some(r#""a"&"b""#));
    }

    #[test]
    fn test_shared_formulas_expand_to_group_members() {
        let rows = r#"<row r="1"><c r="A1"><v>1</v></c><c r="B1"><f t="shared" ref="B1:B3" si="0">A1*2</f><v>2</v></c><c r="C1"><f t="shared" ref="C1:E1" si="1">$A$1+B1</f><v>3</v></c><c r="D1"><f t="shared" si="1"/><v>5</v></c><c r="E1"><f t="shared" si="1"></f><v>8</v></c></row><row r="2"><c r="A2"><v>2</v></c><c r="B2"><f t="shared" si="0"/><v>4</v></c></row><row r="3"><c r="B3"><f t="shared" si="0"/></c><c r="C3"><f t="shared" si="7"/><v>9</v></c></row>"#;
        let bytes = build_xlsx(&workbook_xml(""), &sheet_xml(rows), None);
        let data = XlsxReader::read_bytes(&bytes, &XlsxReadOptions::default()).unwrap();
        let cells = data.cells("Data").unwrap();

        let formula = |addr: &str| cells.cell(addr).unwrap().unwrap().formula().map(str::to_string);
        assert_eq!(formula("B1").as_deref(), Some("A1*2"));
        assert_eq!(formula("B2").as_deref(), Some("A2*2"));
        assert_eq!(formula("B3").as_deref(), Some("A3*2"));
        assert_eq!(formula("C1").as_deref(), Some("$A$1+B1"));
        assert_eq!(formula("D1").as_deref(), Some("$A$1+C1"));
        assert_eq!(formula("E1").as_deref(), Some("$A$1+D1"));

        // Cached values are kept; a member without one is still stored
        assert_eq!(cells.cell("B2").unwrap().unwrap().value, CellValue::Number(4.0));
        assert_eq!(cells.cell("B3").unwrap().unwrap().value, CellValue::Empty);

        // An unknown group leaves only the value
        let c3 = cells.cell("C3").unwrap().unwrap();
        assert_eq!(c3.value, CellValue::Number(9.0));
        assert_eq!(c3.formula(), None);
    }

    #[test]
    fn test_cells_without_reference_follow_row() {
        let rows = r#"<row r="3"><c><v>1</v></c><c><v>2</v></c></row><row><c><v>3</v></c></row>"#;
        let bytes = build_xlsx(&workbook_xml(""), &sheet_xml(rows), None);
        let data = XlsxReader::read_bytes(&bytes, &XlsxReadOptions::default()).unwrap();
        let cells = data.cells("Data").unwrap();

        assert_eq!(cells.value_at(CellCoordinate::new(2, 0)), &CellValue::Number(1.0));
        assert_eq!(cells.value_at(CellCoordinate::new(2, 1)), &CellValue::Number(2.0));
        assert_eq!(cells.value_at(CellCoordinate::new(3, 0)), &CellValue::Number(3.0));
    }

    #[test]
    fn test_missing_sheet_selects_nothing() {
        let bytes = build_xlsx(&workbook_xml(""), &sheet_xml(""), None);
        let options = XlsxReadOptions::default().with_sheet("Nope");
        let data = XlsxReader::read_bytes(&bytes, &options).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn test_password_checked_against_protection_hash() {
        let protected = workbook_xml(r#"<workbookProtection lockStructure="1" workbookPassword="83AF"/>"#);
        let bytes = build_xlsx(&protected, &sheet_xml(""), None);

        let right = XlsxReadOptions::default().with_password("password");
        assert!(XlsxReader::read_bytes(&bytes, &right).is_ok());

        let wrong = XlsxReadOptions::default().with_password("guess");
        assert!(matches!(
            XlsxReader::read_bytes(&bytes, &wrong),
            Err(XlsxError::IncorrectPassword)
        ));

        assert!(XlsxReader::read_bytes(&bytes, &XlsxReadOptions::default()).is_ok());
    }

    #[test]
    fn test_rejects_compound_file() {
        let mut bytes = CFB_MAGIC.to_vec();
        bytes.extend_from_slice(&[0u8; 504]);
        assert!(matches!(
            XlsxReader::read_bytes(&bytes, &XlsxReadOptions::default()),
            Err(XlsxError::EncryptedContainer)
        ));
    }

    #[test]
    fn test_rejects_garbage() {
        let result = XlsxReader::read_bytes(b"not a zip file", &XlsxReadOptions::default());
        assert!(matches!(result, Err(XlsxError::Zip(_))));
    }

    #[test]
    fn test_resolve_part_path() {
        assert_eq!(resolve_part_path("worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
        assert_eq!(resolve_part_path("/xl/worksheets/sheet2.xml"), "xl/worksheets/sheet2.xml");
    }
}
