//! XLSX reader

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::styles::read_styles_xml;
use tabstore_core::{
    CellAddress, CellError, CellRange, CellValue, Hyperlink, Style, Workbook, Worksheet, MAX_COLS,
};

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// Excel uses this format to encode special characters in XML:
/// - `_x000d_` = CR (carriage return)
/// - `_x000a_` = LF (line feed)
/// - `_x0009_` = Tab
/// - `_x005f_` = Underscore (escaped underscore)
fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

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
            Some(c) => {
                result.push(c);
                rest = &candidate[7..];
            }
            None => {
                result.push('_');
                rest = &candidate[1..];
            }
        }
    }
    result.push_str(rest);
    result
}

/// A relationship from a `.rels` part
#[derive(Debug, Clone)]
struct Relationship {
    rel_type: String,
    target: String,
    external: bool,
}

/// What workbook.xml says about the sheets and the date system
#[derive(Debug, Default)]
struct WorkbookInfo {
    /// (name, relationship id) in workbook order
    sheets: Vec<(String, String)>,
    date_1904: bool,
}

/// A `<hyperlink>` before its relationship id is resolved
#[derive(Debug)]
struct RawHyperlink {
    range: CellRange,
    r_id: Option<String>,
    location: Option<String>,
    tooltip: Option<String>,
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let path = path.as_ref();
        log::debug!("reading xlsx workbook from {}", path.display());
        let file = File::open(path)?;
        Self::read(file)
    }

    /// Read a workbook from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut archive = zip::ZipArchive::new(reader)?;

        // Verify this is an XLSX file
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let cell_styles = match archive.by_name("xl/styles.xml") {
            Ok(file) => read_styles_xml(file)?,
            Err(_) => vec![Style::default()],
        };
        let info = Self::read_workbook_xml(&mut archive)?;
        let workbook_rels = Self::read_rels(&mut archive, "xl/_rels/workbook.xml.rels")?
            .ok_or_else(|| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let mut workbook = Workbook::empty();
        workbook.settings_mut().date_1904 = info.date_1904;

        for (name, r_id) in &info.sheets {
            let Some(rel) = workbook_rels
                .get(r_id)
                .filter(|rel| rel.rel_type.ends_with("/worksheet"))
            else {
                log::warn!("sheet '{}' has no worksheet part, skipping", name);
                continue;
            };
            let path = resolve_target("xl", &rel.target);

            let mut worksheet = Worksheet::new(name.as_str());
            let links = Self::read_worksheet(
                &mut archive,
                &path,
                &mut worksheet,
                &shared_strings,
                &cell_styles,
            )?;
            if !links.is_empty() {
                let rels = Self::read_rels(&mut archive, &sheet_rels_path(&path))?
                    .unwrap_or_default();
                Self::apply_hyperlinks(&mut worksheet, links, &rels)?;
            }
            workbook.add_existing_worksheet(worksheet)?;
        }

        // Ensure at least one sheet exists
        if workbook.is_empty() {
            workbook.add_worksheet_with_name("Sheet1")?;
        }

        Ok(workbook)
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

        let mut buf = Vec::new();
        let mut current_string = String::new();
        let mut in_si = false;
        let mut in_t = false;
        // Phonetic runs repeat the text as reading hints; skip them
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_string.clear();
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" if in_si && !in_phonetic => in_t = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.name().as_ref() == b"si" => strings.push(String::new()),
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current_string));
                        in_si = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    current_string.push_str(&e.unescape()?);
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    /// Read workbook.xml to get sheet names, rIds and the date system
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
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"sheet" => {
                        if let (Some(name), Some(r_id)) =
                            (attr_value(&e, b"name"), attr_value(&e, b"r:id"))
                        {
                            info.sheets.push((name, r_id));
                        }
                    }
                    b"workbookPr" => {
                        info.date_1904 = attr_value(&e, b"date1904").is_some_and(|v| is_true(&v));
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

    /// Read a relationships part, `None` if the archive has no such part
    fn read_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
    ) -> XlsxResult<Option<HashMap<String, Relationship>>> {
        let file = match archive.by_name(path) {
            Ok(f) => f,
            Err(_) => return Ok(None),
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let id = attr_value(&e, b"Id");
                    let target = attr_value(&e, b"Target");
                    if let (Some(id), Some(target)) = (id, target) {
                        rels.insert(
                            id,
                            Relationship {
                                rel_type: attr_value(&e, b"Type").unwrap_or_default(),
                                target,
                                external: attr_value(&e, b"TargetMode").as_deref()
                                    == Some("External"),
                            },
                        );
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(Some(rels))
    }

    /// Read one worksheet part into `worksheet`, returning its hyperlinks
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        worksheet: &mut Worksheet,
        shared_strings: &[String],
        cell_styles: &[Style],
    ) -> XlsxResult<Vec<RawHyperlink>> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));

        let mut buf = Vec::new();
        let mut links = Vec::new();

        // Position for rows and cells that omit their `r` attribute
        let mut current_row: u32 = 0;
        let mut next_row: u32 = 0;
        let mut next_col: u16 = 0;

        let mut cell: Option<PendingCell> = None;
        let mut in_value = false;
        let mut in_formula = false;
        let mut in_inline_text = false;
        let mut in_phonetic = false;

        loop {
            let event = xml_reader.read_event_into(&mut buf);
            let is_empty = matches!(event, Ok(Event::Empty(_)));
            match event {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"row" => {
                        current_row = attr_value(&e, b"r")
                            .and_then(|s| s.parse::<u32>().ok())
                            .map_or(next_row, |r| r.saturating_sub(1));
                        next_row = current_row + 1;
                        next_col = 0;
                        worksheet.ensure_row(current_row)?;
                    }
                    b"c" => {
                        let addr = match attr_value(&e, b"r") {
                            Some(r) => CellAddress::parse(&r).map_err(|err| {
                                XlsxError::Parse(format!(
                                    "Invalid cell reference '{}': {}",
                                    r, err
                                ))
                            })?,
                            None => CellAddress::new(current_row, next_col),
                        };
                        next_col = addr.col.saturating_add(1);
                        let pending = PendingCell {
                            addr,
                            cell_type: attr_value(&e, b"t"),
                            style: attr_value(&e, b"s").and_then(|s| s.parse().ok()),
                            value: None,
                            formula: None,
                        };
                        if is_empty {
                            pending.apply(worksheet, shared_strings, cell_styles)?;
                        } else {
                            cell = Some(pending);
                        }
                    }
                    b"v" if cell.is_some() && !is_empty => in_value = true,
                    b"f" if cell.is_some() => {
                        if let Some(c) = cell.as_mut() {
                            c.formula.get_or_insert_with(String::new);
                        }
                        in_formula = !is_empty;
                    }
                    b"rPh" if !is_empty => in_phonetic = true,
                    b"t" if cell.is_some() && !is_empty && !in_phonetic => in_inline_text = true,
                    b"col" => Self::apply_col(&e, worksheet),
                    b"mergeCell" => {
                        if let Some(range) = attr_value(&e, b"ref") {
                            let range = CellRange::parse(&range)?;
                            if let Err(err) = worksheet.merge_cells(&range) {
                                log::warn!("ignoring merged region {}: {}", range, err);
                            }
                        }
                    }
                    b"hyperlink" => {
                        if let Some(range) = attr_value(&e, b"ref") {
                            links.push(RawHyperlink {
                                range: CellRange::parse(&range)?,
                                r_id: attr_value(&e, b"r:id"),
                                location: attr_value(&e, b"location"),
                                tooltip: attr_value(&e, b"tooltip"),
                            });
                        }
                    }
                    _ => {}
                },
                Ok(Event::Text(e)) => {
                    if let Some(c) = cell.as_mut() {
                        if in_value || in_inline_text {
                            c.value
                                .get_or_insert_with(String::new)
                                .push_str(&e.unescape()?);
                        } else if in_formula {
                            c.formula
                                .get_or_insert_with(String::new)
                                .push_str(&e.unescape()?);
                        }
                    }
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"c" => {
                        if let Some(pending) = cell.take() {
                            pending.apply(worksheet, shared_strings, cell_styles)?;
                        }
                    }
                    b"v" => in_value = false,
                    b"f" => in_formula = false,
                    b"t" => in_inline_text = false,
                    b"rPh" => in_phonetic = false,
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(links)
    }

    /// Apply a `<col>` width to the columns it spans
    fn apply_col(e: &BytesStart<'_>, worksheet: &mut Worksheet) {
        let num = |key: &[u8]| attr_value(e, key).and_then(|s| s.parse::<u32>().ok());
        let width = attr_value(e, b"width").and_then(|s| s.parse::<f64>().ok());
        let custom = attr_value(e, b"customWidth").is_some_and(|v| is_true(&v));
        let (Some(min), Some(max), Some(width)) = (num(b"min"), num(b"max"), width) else {
            return;
        };
        if !custom || min == 0 {
            return;
        }
        for col in min..=max.min(MAX_COLS as u32) {
            worksheet.set_column_width((col - 1) as u16, width);
        }
    }

    /// Attach hyperlinks to every cell of their ranges
    fn apply_hyperlinks(
        worksheet: &mut Worksheet,
        links: Vec<RawHyperlink>,
        rels: &HashMap<String, Relationship>,
    ) -> XlsxResult<()> {
        for raw in links {
            let external = raw
                .r_id
                .as_ref()
                .and_then(|id| rels.get(id))
                .filter(|rel| rel.external || rel.rel_type.ends_with("/hyperlink"));
            let mut link = match (external, raw.location) {
                (Some(rel), Some(loc)) => Hyperlink::url(format!("{}#{}", rel.target, loc)),
                (Some(rel), None) => Hyperlink::url(rel.target.clone()),
                (None, Some(loc)) => Hyperlink::location(loc),
                (None, None) => {
                    log::warn!("hyperlink on {} has no target, skipping", raw.range);
                    continue;
                }
            };
            link.tooltip = raw.tooltip;

            for row in raw.range.start.row..=raw.range.end.row {
                for col in raw.range.start.col..=raw.range.end.col {
                    worksheet.set_hyperlink_at(row, col, link.clone())?;
                }
            }
        }
        Ok(())
    }
}

/// A `<c>` element collected until its end tag
#[derive(Debug)]
struct PendingCell {
    addr: CellAddress,
    cell_type: Option<String>,
    style: Option<u32>,
    value: Option<String>,
    formula: Option<String>,
}

impl PendingCell {
    fn apply(
        self,
        worksheet: &mut Worksheet,
        shared_strings: &[String],
        styles: &[Style],
    ) -> XlsxResult<()> {
        let PendingCell {
            addr,
            cell_type,
            style,
            value,
            formula,
        } = self;
        let cell_type = cell_type.as_deref();

        if let Some(f) = formula {
            // Cached result from the <v> element, typed by `t`
            let cached = value.as_deref().and_then(|v| match cell_type {
                Some("b") => Some(CellValue::Boolean(is_true(v))),
                Some("e") => CellError::from_literal(v).map(CellValue::Error),
                Some("s") => {
                    let idx: usize = v.parse().ok()?;
                    shared_strings.get(idx).map(|s| CellValue::string(s.as_str()))
                }
                Some("str") | Some("inlineStr") => Some(CellValue::string(decode_excel_escapes(v))),
                None | Some("n") => v.parse::<f64>().ok().map(CellValue::Number),
                Some(_) => Some(CellValue::string(v)),
            });

            let text = f.strip_prefix('=').unwrap_or(&f).to_string();
            let value = match cached {
                Some(cached) => CellValue::formula_with_cache(text, cached),
                None => CellValue::formula(text),
            };
            worksheet.set_cell_value_at(addr.row, addr.col, value)?;
        } else if let Some(value) = value {
            let cell_value = match cell_type {
                Some("s") => {
                    let idx: usize = value.parse().map_err(|_| {
                        XlsxError::Parse(format!("Invalid shared string index: {}", value))
                    })?;
                    let s = shared_strings.get(idx).ok_or_else(|| {
                        XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
                    })?;
                    CellValue::string(s.as_str())
                }
                Some("b") => CellValue::Boolean(is_true(&value)),
                Some("e") => CellError::from_literal(&value)
                    .map(CellValue::Error)
                    .unwrap_or_else(|| CellValue::string(value.as_str())),
                Some("inlineStr") | Some("str") => CellValue::string(decode_excel_escapes(&value)),
                // ISO 8601 date cells; keep the text
                Some("d") => CellValue::string(value.as_str()),
                None | Some("n") => match value.trim().parse::<f64>() {
                    Ok(n) => CellValue::Number(n),
                    Err(_) => CellValue::string(value.as_str()),
                },
                Some(_) => CellValue::string(value.as_str()),
            };
            worksheet.set_cell_value_at(addr.row, addr.col, cell_value)?;
        }

        if let Some(s) = style.filter(|&s| s != 0) {
            match styles.get(s as usize) {
                Some(style) => worksheet.set_cell_style_at(addr.row, addr.col, style)?,
                None => log::warn!("cell {} uses unknown style {}", addr, s),
            }
        }

        Ok(())
    }
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn is_true(v: &str) -> bool {
    v == "1" || v.eq_ignore_ascii_case("true")
}

/// Resolve a relationship target against the folder of its source part
fn resolve_target(base: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut parts: Vec<&str> = base.split('/').filter(|p| !p.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    parts.join("/")
}

/// `xl/worksheets/sheet1.xml` -> `xl/worksheets/_rels/sheet1.xml.rels`
fn sheet_rels_path(sheet_path: &str) -> String {
    match sheet_path.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", sheet_path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::{Cursor, Write};
    use tabstore_core::HyperlinkTarget;

    const CONTENT_TYPES: &[u8] = br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/></Types>"#;

    const WORKBOOK_RELS: &[u8] = br#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

    /// Build a one-sheet package from raw parts
    fn package(workbook_xml: &[u8], sheet_xml: &[u8], extra: &[(&str, &[u8])]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options = zip::write::SimpleFileOptions::default();
            let parts: Vec<(&str, &[u8])> = vec![
                ("[Content_Types].xml", CONTENT_TYPES),
                ("xl/workbook.xml", workbook_xml),
                ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
                ("xl/worksheets/sheet1.xml", sheet_xml),
            ];
            for (name, data) in parts.into_iter().chain(extra.iter().copied()) {
                zip.start_file(name, options).unwrap();
                zip.write_all(data).unwrap();
            }
            zip.finish().unwrap();
        }
        buf
    }

    const ONE_SHEET: &[u8] = br#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#;

    #[test]
    fn test_decode_excel_escapes() {
        assert_eq!(decode_excel_escapes("Line1_x000d_Line2"), "Line1\rLine2");
        assert_eq!(decode_excel_escapes("a_x000a_b_x0009_c"), "a\nb\tc");
        assert_eq!(decode_excel_escapes("snake_x005f_case"), "snake_case");
        assert_eq!(decode_excel_escapes("plain_text"), "plain_text");
        assert_eq!(decode_excel_escapes("_x00_ and _x00ZZ_"), "_x00_ and _x00ZZ_");
        assert_eq!(decode_excel_escapes("end_x000D_"), "end\r");
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("xl", "worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
        assert_eq!(resolve_target("xl", "/xl/worksheets/sheet2.xml"), "xl/worksheets/sheet2.xml");
        assert_eq!(resolve_target("xl/worksheets", "../sharedStrings.xml"), "xl/sharedStrings.xml");
        assert_eq!(
            sheet_rels_path("xl/worksheets/sheet1.xml"),
            "xl/worksheets/_rels/sheet1.xml.rels"
        );
    }

    #[test]
    fn test_read_empty_xlsx() {
        let bytes = package(
            ONE_SHEET,
            br#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData></sheetData></worksheet>"#,
            &[],
        );
        let workbook = XlsxReader::read(Cursor::new(bytes)).unwrap();

        assert_eq!(workbook.sheet_count(), 1);
        assert_eq!(workbook.worksheet(0).unwrap().name(), "Sheet1");
        assert!(workbook.worksheet(0).unwrap().is_empty());
    }

    #[test]
    fn test_read_cells_and_rows() {
        let sheet: &[u8] = br#"<?xml version="1.0"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetData>
    <row r="1"><c r="A1" t="inlineStr"><is><t xml:space="preserve"> Name </t></is></c><c r="B1" t="s"><v>0</v></c></row>
    <row r="2"><c t="b"><v>1</v></c><c><v>2.5</v></c><c t="e"><v>#N/A</v></c></row>
    <row r="3"><c r="A3"><f>SUM(B2,1)</f><v>3.5</v></c><c r="B3" t="str"><f>"x"&amp;"y"</f><v>xy</v></c></row>
    <row r="5"/>
  </sheetData>
</worksheet>"#;
        let strings: &[u8] = br#"<?xml version="1.0"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="1" uniqueCount="1"><si><r><t>Rich</t></r><r><t xml:space="preserve"> text</t></r><rPh sb="0" eb="1"><t>x</t></rPh></si></sst>"#;
        let bytes = package(ONE_SHEET, sheet, &[("xl/sharedStrings.xml", strings)]);
        let workbook = XlsxReader::read(Cursor::new(bytes)).unwrap();
        let ws = workbook.worksheet(0).unwrap();

        assert_eq!(ws.get_value_at(0, 0), CellValue::string(" Name "));
        assert_eq!(ws.get_value_at(0, 1), CellValue::string("Rich text"));
        assert_eq!(ws.get_value_at(1, 0), CellValue::Boolean(true));
        assert_eq!(ws.get_value_at(1, 1), CellValue::Number(2.5));
        assert_eq!(ws.get_value_at(1, 2), CellValue::Error(CellError::Na));
        assert_eq!(
            ws.get_value_at(2, 0),
            CellValue::formula_with_cache("SUM(B2,1)", CellValue::Number(3.5))
        );
        assert_eq!(
            ws.get_value_at(2, 1),
            CellValue::formula_with_cache("\"x\"&\"y\"", CellValue::string("xy"))
        );
        assert!(ws.has_row(4));
        assert!(!ws.has_row(3));
        assert_eq!(ws.last_row(), Some(4));
    }

    #[test]
    fn test_read_hyperlinks_and_date_system() {
        let book: &[u8] = br#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><workbookPr date1904="true"/><sheets><sheet name="Data" sheetId="1" r:id="rId1"/></sheets></workbook>"#;
        let sheet: &[u8] = br#"<?xml version="1.0"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <cols><col min="2" max="3" width="20.5" customWidth="1"/></cols>
  <sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>site</t></is></c></row></sheetData>
  <mergeCells count="1"><mergeCell ref="D1:E2"/></mergeCells>
  <hyperlinks>
    <hyperlink ref="A1" r:id="rId1" tooltip="Go"/>
    <hyperlink ref="A2:A3" location="Data!B2"/>
  </hyperlinks>
</worksheet>"#;
        let rels: &[u8] = br#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/" TargetMode="External"/></Relationships>"#;
        let bytes = package(book, sheet, &[("xl/worksheets/_rels/sheet1.xml.rels", rels)]);
        let workbook = XlsxReader::read(Cursor::new(bytes)).unwrap();
        let ws = workbook.worksheet(0).unwrap();

        assert!(workbook.settings().date_1904);
        assert_eq!(ws.name(), "Data");
        assert_eq!(
            ws.hyperlink_at(0, 0),
            Some(&Hyperlink::url("https://example.com/").with_tooltip("Go"))
        );
        assert_eq!(
            ws.hyperlink_at(2, 0).map(|l| &l.target),
            Some(&HyperlinkTarget::Location("Data!B2".into()))
        );
        assert!((ws.column_width(1) - 20.5).abs() < 1e-9);
        assert!((ws.column_width(2) - 20.5).abs() < 1e-9);
        assert_eq!(ws.custom_column_widths().len(), 2);
        assert_eq!(ws.merged_regions().len(), 1);
    }

    #[test]
    fn test_missing_content_types() {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            zip.start_file("hello.txt", zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(b"hi").unwrap();
            zip.finish().unwrap();
        }
        assert!(matches!(
            XlsxReader::read(Cursor::new(buf)),
            Err(XlsxError::InvalidFormat(_))
        ));
    }
}
