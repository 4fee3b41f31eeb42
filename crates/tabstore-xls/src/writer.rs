//! XLS (BIFF8) writer.
//!
//! Serializes a `tabstore_core::Workbook` into a BIFF8 record stream and
//! stores it as `/Workbook` inside a Compound File Binary container.
//!
//! Stream layout:
//!
//! ```text
//! BOF(globals) CODEPAGE WINDOW1 DATEMODE FONT* FORMAT* XF* STYLE
//! BOUNDSHEET* SST EOF
//! [BOF(sheet) DIMENSION WINDOW2 COLINFO* ROW* cells* HLINK* MERGECELLS EOF]*
//! ```
//!
//! BOUNDSHEET records hold the absolute offset of their sheet's BOF; they
//! are written with a placeholder and patched once the sheets are laid out.

use std::collections::HashMap;
use std::io::{Cursor, Seek, Write};
use std::path::Path;

use tabstore_core::{CellValue, HyperlinkTarget, Workbook, Worksheet};

use crate::biff::records;
use crate::biff::strings::{push_short_string, write_sst, MAX_CELL_TEXT};
use crate::biff::BiffWriter;
use crate::error::{XlsError, XlsResult};
use crate::reader::{
    CLSID_STD_LINK, CLSID_URL_MONIKER, HLINK_HAS_LOCATION, HLINK_HAS_MONIKER, HLINK_IS_ABSOLUTE,
};
use crate::styles::XlsStyleTable;

/// Windows code page 1200 (UTF-16)
const CODEPAGE_UTF16: u16 = 0x04B0;

/// Merged ranges per MERGECELLS record
const MERGES_PER_RECORD: usize = 1026;

/// XLS file writer.
pub struct XlsWriter;

/// Workbook-wide shared string table, in first-use order
#[derive(Debug, Default)]
struct SharedStrings {
    strings: Vec<String>,
    index: HashMap<String, u32>,
    total_refs: u32,
}

impl SharedStrings {
    fn intern(&mut self, s: &str) -> u32 {
        self.total_refs += 1;
        if let Some(&i) = self.index.get(s) {
            return i;
        }
        let i = self.strings.len() as u32;
        self.strings.push(s.to_string());
        self.index.insert(s.to_string(), i);
        i
    }
}

impl XlsWriter {
    /// Write a workbook to a file path
    pub fn write_file<P: AsRef<Path>>(workbook: &Workbook, path: P) -> XlsResult<()> {
        let path = path.as_ref();
        log::debug!("writing xls workbook to {}", path.display());
        let bytes = Self::to_bytes(workbook)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Write a workbook to any `Write + Seek` sink
    pub fn write<W: Write + Seek>(workbook: &Workbook, mut writer: W) -> XlsResult<()> {
        let bytes = Self::to_bytes(workbook)?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }

    /// Serialize a workbook into a complete compound file
    pub fn to_bytes(workbook: &Workbook) -> XlsResult<Vec<u8>> {
        let stream = Self::workbook_stream(workbook)?;

        let mut cfb = cfb::CompoundFile::create(Cursor::new(Vec::new()))?;
        {
            let mut out = cfb.create_stream("/Workbook")?;
            out.write_all(&stream)?;
        }
        cfb.flush()?;
        Ok(cfb.into_inner().into_inner())
    }

    /// Build the BIFF8 `Workbook` stream
    pub fn workbook_stream(workbook: &Workbook) -> XlsResult<Vec<u8>> {
        if workbook.is_empty() {
            return Err(XlsError::InvalidFormat(
                "workbook must contain at least one worksheet".into(),
            ));
        }
        for sheet in workbook.worksheets() {
            check_limits(sheet)?;
        }

        let styles = XlsStyleTable::build(workbook)?;
        let mut sst = SharedStrings::default();

        // Sheets first, so the SST is complete before the globals are written
        let mut sheet_streams = Vec::with_capacity(workbook.sheet_count());
        for (index, sheet) in workbook.worksheets().enumerate() {
            sheet_streams.push(Self::sheet_stream(index, sheet, &styles, &mut sst)?);
        }

        let mut globals = BiffWriter::new();
        globals.record(records::BOF, &bof(records::BOF_WORKBOOK_GLOBALS));
        globals.record(records::CODEPAGE, &CODEPAGE_UTF16.to_le_bytes());
        globals.record(records::WINDOW1, &window1());
        let date_mode: u16 = if workbook.settings().date_1904 { 1 } else { 0 };
        globals.record(records::DATEMODE, &date_mode.to_le_bytes());
        styles.write_records(&mut globals)?;

        let mut boundsheet_slots = Vec::with_capacity(workbook.sheet_count());
        for sheet in workbook.worksheets() {
            // Absolute BOF offset (patched below), visible, worksheet
            let mut data = vec![0u8; 6];
            push_short_string(&mut data, sheet.name())?;
            boundsheet_slots.push(globals.position() + 4);
            globals.record(records::BOUNDSHEET, &data);
        }

        write_sst(&mut globals, &sst.strings, sst.total_refs)?;
        globals.record(records::EOF, &[]);

        let mut offset = globals.position();
        for (slot, stream) in boundsheet_slots.iter().zip(&sheet_streams) {
            let at = u32::try_from(offset)
                .map_err(|_| XlsError::Limit("workbook stream larger than 4 GiB".into()))?;
            globals.patch_u32(*slot, at);
            offset += stream.position();
        }

        for stream in sheet_streams {
            globals.append(stream);
        }
        Ok(globals.into_bytes())
    }

    fn sheet_stream(
        sheet_index: usize,
        sheet: &Worksheet,
        styles: &XlsStyleTable,
        sst: &mut SharedStrings,
    ) -> XlsResult<BiffWriter> {
        let mut w = BiffWriter::new();
        w.record(records::BOF, &bof(records::BOF_WORKSHEET));
        w.record(records::DIMENSION, &dimension(sheet));
        w.record(records::WINDOW2, &window2(sheet_index == 0));

        for (&col, &width) in sheet.custom_column_widths() {
            let raw = (width * 256.0).round().clamp(0.0, u16::MAX as f64) as u16;
            let mut data = Vec::with_capacity(12);
            for v in [col, col, raw, crate::styles::DEFAULT_CELL_XF, 0x0002, 0] {
                data.extend_from_slice(&v.to_le_bytes());
            }
            w.record(records::COLINFO, &data);
        }

        let rows: Vec<u32> = sheet.row_indices().collect();
        for &row in &rows {
            let (first, last_plus1) = match (
                sheet.iter_row(row).next().map(|(c, _)| c),
                sheet.last_col_in_row(row),
            ) {
                (Some(first), Some(last)) => (first, last + 1),
                _ => (0, 0),
            };
            let mut data = Vec::with_capacity(16);
            // Height 0x00FF = default, options 0x0100 = always set
            for v in [row as u16, first, last_plus1, 0x00FF, 0, 0] {
                data.extend_from_slice(&v.to_le_bytes());
            }
            data.extend_from_slice(&0x0000_0100u32.to_le_bytes());
            w.record(records::ROW, &data);
        }

        for &row in &rows {
            for (col, cell) in sheet.iter_row(row) {
                let xf = styles.xf_for(sheet_index, cell.style_index);
                Self::write_cell(&mut w, row as u16, col, xf, &cell.value, sst)?;
            }
        }

        for ((row, col), link) in sheet.hyperlinks() {
            w.record(records::HLINK, &hlink(row as u16, col, &link.target));
            if let Some(tooltip) = &link.tooltip {
                w.record(records::HLINKTOOLTIP, &hlink_tooltip(row as u16, col, tooltip));
            }
        }

        for chunk in sheet.merged_regions().chunks(MERGES_PER_RECORD) {
            let mut data = Vec::with_capacity(2 + chunk.len() * 8);
            data.extend_from_slice(&(chunk.len() as u16).to_le_bytes());
            for range in chunk {
                for v in [
                    range.start.row as u16,
                    range.end.row as u16,
                    range.start.col,
                    range.end.col,
                ] {
                    data.extend_from_slice(&v.to_le_bytes());
                }
            }
            w.raw(records::MERGECELLS, &data);
        }

        w.record(records::EOF, &[]);
        Ok(w)
    }

    fn write_cell(
        w: &mut BiffWriter,
        row: u16,
        col: u16,
        xf: u16,
        value: &CellValue,
        sst: &mut SharedStrings,
    ) -> XlsResult<()> {
        let mut data = Vec::with_capacity(14);
        for v in [row, col, xf] {
            data.extend_from_slice(&v.to_le_bytes());
        }

        // Formulas are stored by their cached result
        match value.effective_value() {
            CellValue::Empty | CellValue::Formula { .. } => {
                w.record(records::BLANK, &data);
            }
            CellValue::Number(n) if n.is_finite() => {
                data.extend_from_slice(&n.to_le_bytes());
                w.record(records::NUMBER, &data);
            }
            CellValue::Number(_) => {
                data.extend_from_slice(&[tabstore_core::CellError::Num.biff_code(), 1]);
                w.record(records::BOOLERR, &data);
            }
            CellValue::String(s) => {
                if s.as_str().encode_utf16().count() > MAX_CELL_TEXT {
                    return Err(XlsError::Limit(format!(
                        "text in row {} column {} is longer than {} characters",
                        row + 1,
                        col + 1,
                        MAX_CELL_TEXT
                    )));
                }
                let index = sst.intern(s.as_str());
                data.extend_from_slice(&index.to_le_bytes());
                w.record(records::LABELSST, &data);
            }
            CellValue::Boolean(b) => {
                data.extend_from_slice(&[*b as u8, 0]);
                w.record(records::BOOLERR, &data);
            }
            CellValue::Error(e) => {
                data.extend_from_slice(&[e.biff_code(), 1]);
                w.record(records::BOOLERR, &data);
            }
        }
        Ok(())
    }
}

fn check_limits(sheet: &Worksheet) -> XlsResult<()> {
    if let Some(last) = sheet.last_row() {
        if last >= records::MAX_ROWS {
            return Err(XlsError::Limit(format!(
                "sheet '{}' uses row {}, more than the {} rows of an xls sheet",
                sheet.name(),
                last + 1,
                records::MAX_ROWS
            )));
        }
    }
    let widest = sheet
        .row_indices()
        .filter_map(|row| sheet.last_col_in_row(row))
        .chain(sheet.custom_column_widths().keys().copied())
        .chain(sheet.hyperlinks().map(|((_, col), _)| col))
        .chain(sheet.merged_regions().iter().map(|r| r.end.col))
        .max();
    if let Some(col) = widest {
        if col >= records::MAX_COLS {
            return Err(XlsError::Limit(format!(
                "sheet '{}' uses column {}, more than the {} columns of an xls sheet",
                sheet.name(),
                col + 1,
                records::MAX_COLS
            )));
        }
    }
    let deepest_link = sheet.hyperlinks().map(|((row, _), _)| row).max();
    let deepest_merge = sheet.merged_regions().iter().map(|r| r.end.row).max();
    if deepest_link.max(deepest_merge).unwrap_or(0) >= records::MAX_ROWS {
        return Err(XlsError::Limit(format!(
            "sheet '{}' has links or merges past row {}",
            sheet.name(),
            records::MAX_ROWS
        )));
    }
    Ok(())
}

/// BOF body: version, substream type, build id, build year, history flags, lowest version
fn bof(substream: u16) -> Vec<u8> {
    let mut data = Vec::with_capacity(16);
    for v in [records::BIFF8_VERSION, substream, 0x0DBB, 0x07CC] {
        data.extend_from_slice(&v.to_le_bytes());
    }
    data.extend_from_slice(&0u32.to_le_bytes());
    data.extend_from_slice(&6u32.to_le_bytes());
    data
}

fn window1() -> Vec<u8> {
    let mut data = Vec::with_capacity(18);
    // x, y, width, height, flags, active tab, first tab, selected tabs, tab ratio
    for v in [0u16, 0, 0x3000, 0x1E00, 0x0038, 0, 0, 1, 0x0258] {
        data.extend_from_slice(&v.to_le_bytes());
    }
    data
}

fn window2(selected: bool) -> Vec<u8> {
    // Gridlines, headers, zeros, default grid color, outline symbols
    let mut flags: u16 = 0x06B6;
    if !selected {
        flags &= !0x0600;
    }
    let mut data = Vec::with_capacity(18);
    for v in [flags, 0, 0, 0x0040, 0, 0, 0] {
        data.extend_from_slice(&v.to_le_bytes());
    }
    data.extend_from_slice(&[0u8; 4]);
    data
}

/// DIMENSION: first row(4), last row + 1(4), first col(2), last col + 1(2), reserved(2)
fn dimension(sheet: &Worksheet) -> Vec<u8> {
    let (first_row, last_row, first_col, last_col) = match sheet.used_range() {
        Some(r) => (r.start.row, r.end.row + 1, r.start.col, r.end.col + 1),
        None => (0, 0, 0, 0),
    };
    let mut data = Vec::with_capacity(14);
    data.extend_from_slice(&first_row.to_le_bytes());
    data.extend_from_slice(&last_row.to_le_bytes());
    data.extend_from_slice(&first_col.to_le_bytes());
    data.extend_from_slice(&last_col.to_le_bytes());
    data.extend_from_slice(&0u16.to_le_bytes());
    data
}

fn push_utf16z(data: &mut Vec<u8>, s: &str) {
    for unit in s.encode_utf16().chain(std::iter::once(0)) {
        data.extend_from_slice(&unit.to_le_bytes());
    }
}

fn hlink(row: u16, col: u16, target: &HyperlinkTarget) -> Vec<u8> {
    let mut data = Vec::with_capacity(64);
    for v in [row, row, col, col] {
        data.extend_from_slice(&v.to_le_bytes());
    }
    data.extend_from_slice(&CLSID_STD_LINK);
    data.extend_from_slice(&2u32.to_le_bytes());

    match target {
        HyperlinkTarget::Url(url) => {
            data.extend_from_slice(&(HLINK_HAS_MONIKER | HLINK_IS_ABSOLUTE).to_le_bytes());
            data.extend_from_slice(&CLSID_URL_MONIKER);
            let byte_len = (url.encode_utf16().count() + 1) * 2;
            data.extend_from_slice(&(byte_len as u32).to_le_bytes());
            push_utf16z(&mut data, url);
        }
        HyperlinkTarget::Location(location) => {
            data.extend_from_slice(&HLINK_HAS_LOCATION.to_le_bytes());
            let char_count = location.encode_utf16().count() + 1;
            data.extend_from_slice(&(char_count as u32).to_le_bytes());
            push_utf16z(&mut data, location);
        }
    }
    data
}

fn hlink_tooltip(row: u16, col: u16, tooltip: &str) -> Vec<u8> {
    let mut data = Vec::with_capacity(14 + tooltip.len() * 2);
    data.extend_from_slice(&records::HLINKTOOLTIP.to_le_bytes());
    for v in [0u16, row, row, col, col] {
        data.extend_from_slice(&v.to_le_bytes());
    }
    push_utf16z(&mut data, tooltip);
    data
}
