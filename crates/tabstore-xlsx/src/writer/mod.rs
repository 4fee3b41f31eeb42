//! XLSX writer

use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

use crate::error::{XlsxError, XlsxResult};
use crate::styles::{escape_xml_attr, XlsxStyleTable};
use tabstore_core::{CellAddress, CellValue, HyperlinkTarget, Workbook, Worksheet};

const REL_HYPERLINK: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";

/// XLSX file writer
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write a workbook to a file path
    pub fn write_file<P: AsRef<Path>>(workbook: &Workbook, path: P) -> XlsxResult<()> {
        let path = path.as_ref();
        log::debug!("writing xlsx workbook to {}", path.display());
        let file = File::create(path)?;
        Self::write(workbook, file)
    }

    /// Write a workbook to a writer
    pub fn write<W: Write + Seek>(workbook: &Workbook, writer: W) -> XlsxResult<()> {
        if workbook.is_empty() {
            return Err(XlsxError::InvalidFormat(
                "a workbook needs at least one sheet".into(),
            ));
        }

        let mut zip = zip::ZipWriter::new(writer);

        // Build a workbook-wide style table.
        let style_table = XlsxStyleTable::build(workbook);

        Self::write_content_types(&mut zip, workbook)?;
        Self::write_root_rels(&mut zip)?;
        Self::write_workbook_xml(&mut zip, workbook)?;
        Self::write_workbook_rels(&mut zip, workbook)?;
        Self::write_part(&mut zip, "xl/styles.xml", &style_table.to_styles_xml())?;

        for (i, sheet) in workbook.worksheets().enumerate() {
            let urls = external_links(sheet);
            let xml = Self::worksheet_xml(sheet, i, &style_table, &urls);
            Self::write_part(&mut zip, &format!("xl/worksheets/sheet{}.xml", i + 1), &xml)?;

            if !urls.is_empty() {
                Self::write_worksheet_rels(&mut zip, i, &urls)?;
            }
        }

        zip.finish()?;
        Ok(())
    }

    fn write_part<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        name: &str,
        content: &str,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file(name, options)?;
        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_content_types<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        workbook: &Workbook,
    ) -> XlsxResult<()> {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
        );

        for i in 0..workbook.sheet_count() {
            content.push_str(&format!(
                r#"
    <Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                i + 1
            ));
        }

        content.push_str("\n</Types>");
        Self::write_part(zip, "[Content_Types].xml", &content)
    }

    fn write_root_rels<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;
        Self::write_part(zip, "_rels/.rels", content)
    }

    fn write_workbook_xml<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        workbook: &Workbook,
    ) -> XlsxResult<()> {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        );

        if workbook.settings().date_1904 {
            content.push_str("\n    <workbookPr date1904=\"1\"/>");
        }

        content.push_str("\n    <sheets>");
        for (i, sheet) in workbook.worksheets().enumerate() {
            content.push_str(&format!(
                r#"
        <sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape_xml_attr(sheet.name()),
                i + 1,
                i + 1
            ));
        }
        content.push_str(
            r#"
    </sheets>
</workbook>"#,
        );

        Self::write_part(zip, "xl/workbook.xml", &content)
    }

    fn write_workbook_rels<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        workbook: &Workbook,
    ) -> XlsxResult<()> {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );

        for i in 0..workbook.sheet_count() {
            content.push_str(&format!(
                r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                i + 1,
                i + 1
            ));
        }

        // Styles relationship
        content.push_str(&format!(
            r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
            workbook.sheet_count() + 1
        ));

        content.push_str("\n</Relationships>");
        Self::write_part(zip, "xl/_rels/workbook.xml.rels", &content)
    }

    fn worksheet_xml(
        sheet: &Worksheet,
        index: usize,
        style_table: &XlsxStyleTable,
        urls: &[((u32, u16), &str)],
    ) -> String {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        );

        if let Some(range) = sheet.used_range() {
            content.push_str(&format!("\n    <dimension ref=\"{}\"/>", range));
        }

        let widths = sheet.custom_column_widths();
        if !widths.is_empty() {
            content.push_str("\n    <cols>");
            for (&col, &width) in widths {
                content.push_str(&format!(
                    "\n        <col min=\"{0}\" max=\"{0}\" width=\"{1}\" customWidth=\"1\"/>",
                    col + 1,
                    width
                ));
            }
            content.push_str("\n    </cols>");
        }

        content.push_str("\n    <sheetData>");
        for row in sheet.row_indices() {
            let mut cells = sheet.iter_row(row).peekable();
            if cells.peek().is_none() {
                // Rows without cells still count as present
                content.push_str(&format!("\n        <row r=\"{}\"/>", row + 1));
                continue;
            }

            content.push_str(&format!("\n        <row r=\"{}\">", row + 1));
            for (col, cell) in cells {
                let cell_ref = CellAddress::new(row, col).to_string();
                let xf_id = style_table.xf_id_for(index, cell.style_index);
                let style_attr = if xf_id != 0 {
                    format!(" s=\"{}\"", xf_id)
                } else {
                    String::new()
                };
                content.push_str("\n            ");
                content.push_str(&cell_xml(&cell_ref, &style_attr, &cell.value));
            }
            content.push_str("\n        </row>");
        }
        content.push_str("\n    </sheetData>");

        let merged_regions = sheet.merged_regions();
        if !merged_regions.is_empty() {
            content.push_str(&format!(
                "\n    <mergeCells count=\"{}\">",
                merged_regions.len()
            ));
            for range in merged_regions {
                content.push_str(&format!("\n        <mergeCell ref=\"{}\"/>", range));
            }
            content.push_str("\n    </mergeCells>");
        }

        Self::write_hyperlinks(&mut content, sheet, urls);

        content.push_str("\n</worksheet>");
        content
    }

    fn write_hyperlinks(content: &mut String, sheet: &Worksheet, urls: &[((u32, u16), &str)]) {
        let mut links = sheet.hyperlinks().peekable();
        if links.peek().is_none() {
            return;
        }

        content.push_str("\n    <hyperlinks>");
        for (pos, link) in links {
            let cell_ref = CellAddress::new(pos.0, pos.1);
            let target = match &link.target {
                HyperlinkTarget::Url(_) => {
                    // External targets live in the sheet rels, numbered in hyperlink order
                    let rid = urls.iter().position(|(p, _)| *p == pos).unwrap_or(0) + 1;
                    format!(" r:id=\"rId{}\"", rid)
                }
                HyperlinkTarget::Location(loc) => {
                    format!(" location=\"{}\"", escape_xml_attr(loc))
                }
            };
            let tooltip = link
                .tooltip
                .as_deref()
                .map(|t| format!(" tooltip=\"{}\"", escape_xml_attr(t)))
                .unwrap_or_default();
            content.push_str(&format!(
                "\n        <hyperlink ref=\"{}\"{}{}/>",
                cell_ref, target, tooltip
            ));
        }
        content.push_str("\n    </hyperlinks>");
    }

    /// Write worksheet relationships file for external hyperlinks
    fn write_worksheet_rels<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        sheet_index: usize,
        urls: &[((u32, u16), &str)],
    ) -> XlsxResult<()> {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for (i, (_, url)) in urls.iter().enumerate() {
            content.push_str(&format!(
                "\n    <Relationship Id=\"rId{}\" Type=\"{}\" Target=\"{}\" TargetMode=\"External\"/>",
                i + 1,
                REL_HYPERLINK,
                escape_xml_attr(url)
            ));
        }
        content.push_str("\n</Relationships>");

        Self::write_part(
            zip,
            &format!("xl/worksheets/_rels/sheet{}.xml.rels", sheet_index + 1),
            &content,
        )
    }
}

/// URL hyperlinks of a sheet in the order they are written
fn external_links(sheet: &Worksheet) -> Vec<((u32, u16), &str)> {
    sheet
        .hyperlinks()
        .filter_map(|(pos, link)| link.as_url().map(|url| (pos, url)))
        .collect()
}

/// Encode cell text so the reader's `_xHHHH_` decoding gives it back unchanged
///
/// A literal `_xHHHH_` gets its leading underscore written as `_x005F_`.
/// Control characters other than tab and line feed are written as `_xHHHH_`,
/// since XML either forbids them or normalizes them away.
fn encode_excel_escapes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for (pos, c) in s.char_indices() {
        match c {
            '_' if looks_escaped(&s[pos..]) => out.push_str("_x005F_"),
            '\t' | '\n' => out.push(c),
            c if c < ' ' || c == '\u{FFFE}' || c == '\u{FFFF}' => {
                out.push_str(&format!("_x{:04X}_", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}

fn looks_escaped(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() >= 7 && b[1] == b'x' && b[2..6].iter().all(u8::is_ascii_hexdigit) && b[6] == b'_'
}

fn cell_text(s: &str) -> String {
    escape_xml_attr(&encode_excel_escapes(s))
}

fn cell_xml(cell_ref: &str, style_attr: &str, value: &CellValue) -> String {
    match value {
        CellValue::Number(n) if n.is_finite() => {
            format!("<c r=\"{}\"{}><v>{}</v></c>", cell_ref, style_attr, n)
        }
        CellValue::Number(_) => {
            format!("<c r=\"{}\"{} t=\"e\"><v>#NUM!</v></c>", cell_ref, style_attr)
        }
        CellValue::String(s) => format!(
            "<c r=\"{}\"{} t=\"inlineStr\"><is><t xml:space=\"preserve\">{}</t></is></c>",
            cell_ref,
            style_attr,
            cell_text(s.as_str())
        ),
        CellValue::Boolean(b) => format!(
            "<c r=\"{}\"{} t=\"b\"><v>{}</v></c>",
            cell_ref,
            style_attr,
            u8::from(*b)
        ),
        CellValue::Error(e) => format!(
            "<c r=\"{}\"{} t=\"e\"><v>{}</v></c>",
            cell_ref,
            style_attr,
            escape_xml_attr(e.as_str())
        ),
        CellValue::Formula { text, cached_value } => {
            let formula = text.strip_prefix('=').unwrap_or(text);
            let (type_attr, cached) = match cached_value.as_deref() {
                Some(CellValue::Number(n)) if n.is_finite() => ("", Some(n.to_string())),
                Some(CellValue::String(s)) => (" t=\"str\"", Some(cell_text(s.as_str()))),
                Some(CellValue::Boolean(b)) => (" t=\"b\"", Some(u8::from(*b).to_string())),
                Some(CellValue::Error(e)) => (" t=\"e\"", Some(e.as_str().to_string())),
                _ => ("", None),
            };
            let cached = cached
                .map(|v| format!("<v>{}</v>", v))
                .unwrap_or_default();
            format!(
                "<c r=\"{}\"{}{}><f>{}</f>{}</c>",
                cell_ref,
                style_attr,
                type_attr,
                escape_xml_attr(formula),
                cached
            )
        }
        // Style-only cells
        CellValue::Empty => format!("<c r=\"{}\"{}/>", cell_ref, style_attr),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};
    use tabstore_core::{CellError, Hyperlink};

    fn part(bytes: &[u8], name: &str) -> Option<String> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).ok()?;
        let mut file = archive.by_name(name).ok()?;
        let mut s = String::new();
        file.read_to_string(&mut s).ok()?;
        Some(s)
    }

    fn write_to_vec(wb: &Workbook) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        XlsxWriter::write(wb, &mut buf).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_cell_xml() {
        assert_eq!(
            cell_xml("A1", "", &CellValue::Number(42.0)),
            "<c r=\"A1\"><v>42</v></c>"
        );
        assert_eq!(
            cell_xml("B2", " s=\"1\"", &CellValue::Error(CellError::Div0)),
            "<c r=\"B2\" s=\"1\" t=\"e\"><v>#DIV/0!</v></c>"
        );
        assert_eq!(
            cell_xml(
                "C3",
                "",
                &CellValue::formula_with_cache("SUM(A1:A2)", CellValue::Number(3.0))
            ),
            "<c r=\"C3\"><f>SUM(A1:A2)</f><v>3</v></c>"
        );
        assert_eq!(
            cell_xml("D4", "", &CellValue::formula("A1&\"x\"")),
            "<c r=\"D4\"><f>A1&amp;&quot;x&quot;</f></c>"
        );
    }

    #[test]
    fn test_encode_excel_escapes() {
        assert_eq!(encode_excel_escapes("plain_text"), "plain_text");
        assert_eq!(encode_excel_escapes("code_x0041_end"), "code_x005F_x0041_end");
        assert_eq!(encode_excel_escapes("_x00e9_"), "_x005F_x00e9_");
        assert_eq!(encode_excel_escapes("_x00_ _xZZZZ_"), "_x00_ _xZZZZ_");
        assert_eq!(encode_excel_escapes("a\tb\nc\r"), "a\tb\nc_x000D_");
        assert_eq!(encode_excel_escapes("bell\u{7}"), "bell_x0007_");
        assert_eq!(encode_excel_escapes("\u{1F600}_"), "\u{1F600}_");
        assert_eq!(
            cell_xml("A1", "", &CellValue::string("x_x0041_<")),
            "<c r=\"A1\" t=\"inlineStr\"><is><t xml:space=\"preserve\">x_x005F_x0041_&lt;</t></is></c>"
        );
    }

    #[test]
    fn test_writes_empty_rows_and_date_system() {
        let mut wb = Workbook::new();
        wb.settings_mut().date_1904 = true;
        let ws = wb.worksheet_mut(0).unwrap();
        ws.set_cell_value_at(0, 0, "Name").unwrap();
        ws.ensure_row(2).unwrap();

        let bytes = write_to_vec(&wb);
        let sheet = part(&bytes, "xl/worksheets/sheet1.xml").unwrap();
        assert!(sheet.contains("<row r=\"3\"/>"));
        let book = part(&bytes, "xl/workbook.xml").unwrap();
        assert!(book.contains("date1904=\"1\""));
    }

    #[test]
    fn test_writes_hyperlink_rels() {
        let mut wb = Workbook::new();
        let ws = wb.worksheet_mut(0).unwrap();
        ws.set_cell_value_at(1, 0, "site").unwrap();
        ws.set_hyperlink_at(1, 0, Hyperlink::url("https://example.com/?a=1&b=2"))
            .unwrap();
        ws.set_hyperlink_at(2, 0, Hyperlink::location("'Sheet1'!A1"))
            .unwrap();

        let bytes = write_to_vec(&wb);
        let sheet = part(&bytes, "xl/worksheets/sheet1.xml").unwrap();
        assert!(sheet.contains("<hyperlink ref=\"A2\" r:id=\"rId1\"/>"));
        assert!(sheet.contains("location=\"&apos;Sheet1&apos;!A1\""));

        let rels = part(&bytes, "xl/worksheets/_rels/sheet1.xml.rels").unwrap();
        assert!(rels.contains("Target=\"https://example.com/?a=1&amp;b=2\""));
        assert!(rels.contains("TargetMode=\"External\""));
    }

    #[test]
    fn test_empty_workbook_is_rejected() {
        let mut buf = Cursor::new(Vec::new());
        assert!(matches!(
            XlsxWriter::write(&Workbook::empty(), &mut buf),
            Err(XlsxError::InvalidFormat(_))
        ));
    }
}
