//! `.xls` decoding
//!
//! The `Workbook` stream of the compound file holds one globals substream
//! (shared strings, styles, sheet directory) followed by one substream per
//! sheet, in directory order. Formulas keep only their cached results.

use std::io::{Read, Seek};
use std::path::Path;

use tabstore_core::{
    CellAddress, CellError, CellRange, CellValue, Hyperlink, Style, Workbook, Worksheet,
};

use crate::biff::parser::{read_f64, read_rk, read_u16, read_u32, read_utf16};
use crate::biff::records;
use crate::biff::strings::{parse_sst, read_short_string, read_unicode_string};
use crate::biff::{self, BiffRecord};
use crate::error::{XlsError, XlsResult};
use crate::styles::{self, StyleContext};

/// CLSID of the standard hyperlink object
pub(crate) const CLSID_STD_LINK: [u8; 16] = [
    0xD0, 0xC9, 0xEA, 0x79, 0xF9, 0xBA, 0xCE, 0x11, 0x8C, 0x82, 0x00, 0xAA, 0x00, 0x4B, 0xA9, 0x0B,
];
/// CLSID of the URL moniker
pub(crate) const CLSID_URL_MONIKER: [u8; 16] = [
    0xE0, 0xC9, 0xEA, 0x79, 0xF9, 0xBA, 0xCE, 0x11, 0x8C, 0x82, 0x00, 0xAA, 0x00, 0x4B, 0xA9, 0x0B,
];

pub(crate) const HLINK_HAS_MONIKER: u32 = 0x0001;
pub(crate) const HLINK_IS_ABSOLUTE: u32 = 0x0002;
pub(crate) const HLINK_HAS_LOCATION: u32 = 0x0008;
const HLINK_HAS_DISPLAY: u32 = 0x0010;
const HLINK_HAS_FRAME: u32 = 0x0080;

/// BOUNDSHEET kind of an ordinary worksheet; charts and macro sheets differ
const SHEET_KIND_WORKSHEET: u8 = 0;

pub struct XlsReader;

impl XlsReader {
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsResult<Workbook> {
        let path = path.as_ref();
        log::debug!("reading xls workbook from {}", path.display());
        Self::read(std::fs::File::open(path)?)
    }

    /// Decode a compound file from any seekable source
    pub fn read<R: Read + Seek>(reader: R) -> XlsResult<Workbook> {
        let mut cfb = cfb::CompoundFile::open(reader)?;
        // BIFF5 names its stream "Book"; the globals check rejects it later
        let name = ["/Workbook", "/Book"]
            .into_iter()
            .find(|name| cfb.exists(name))
            .ok_or_else(|| XlsError::InvalidFormat("compound file has no Workbook stream".into()))?;
        let mut stream = Vec::new();
        cfb.open_stream(name)?.read_to_end(&mut stream)?;

        let all = biff::split_records(&stream)?;
        let (globals, rest) = Globals::read(&all)?;
        let styles = globals.styles.build_style_table();

        let mut workbook = Workbook::empty();
        workbook.settings_mut().date_1904 = globals.date_1904;

        let mut substreams = sheet_substreams(rest);
        for (kind, name) in &globals.sheets {
            let body = substreams.next().unwrap_or_default();
            if *kind != SHEET_KIND_WORKSHEET {
                log::debug!("skipping sheet '{name}' of kind {kind}");
                continue;
            }
            let mut decoder = SheetDecoder::new(name, &globals.sst, &styles);
            for rec in body {
                decoder.feed(rec)?;
            }
            workbook.add_existing_worksheet(decoder.finish())?;
        }

        if workbook.is_empty() {
            workbook.add_worksheet_with_name("Sheet1")?;
        }
        Ok(workbook)
    }
}

/// What the globals substream says about the whole file
struct Globals {
    sst: Vec<String>,
    /// `(kind, name)` per BOUNDSHEET, in directory order
    sheets: Vec<(u8, String)>,
    date_1904: bool,
    styles: StyleContext,
}

impl Globals {
    /// Decode the globals substream, returning the records after its EOF
    fn read(all: &[BiffRecord]) -> XlsResult<(Globals, &[BiffRecord])> {
        let mut globals = Globals {
            sst: Vec::new(),
            sheets: Vec::new(),
            date_1904: false,
            styles: StyleContext::new(),
        };
        let mut started = false;

        for (i, rec) in all.iter().enumerate() {
            if !started {
                if rec.record_type == records::BOF {
                    let (version, kind) = biff::parse_bof(&rec.data)?;
                    if kind == records::BOF_WORKBOOK_GLOBALS {
                        if version != records::BIFF8_VERSION {
                            return Err(XlsError::UnsupportedVersion(format!(
                                "BIFF version 0x{version:04X}, only 0x0600 is read"
                            )));
                        }
                        started = true;
                    }
                }
                continue;
            }
            if rec.record_type == records::EOF {
                return Ok((globals, &all[i + 1..]));
            }
            globals.absorb(rec)?;
        }

        Err(XlsError::InvalidFormat(
            "workbook globals substream is missing or unterminated".into(),
        ))
    }

    fn absorb(&mut self, rec: &BiffRecord) -> XlsResult<()> {
        let data = rec.data.as_slice();
        match rec.record_type {
            records::SST => self.sst = parse_sst(data, &rec.continue_offsets)?,
            records::BOUNDSHEET => self.sheets.push(parse_boundsheet(data)?),
            records::DATEMODE => self.date_1904 = read_u16(data, &mut 0).map_or(false, |m| m == 1),
            records::FONT => match styles::parse_font(data) {
                Ok(font) => self.styles.fonts.push(font),
                Err(e) => log::warn!("skipping FONT record: {e}"),
            },
            records::FORMAT => match styles::parse_format(data) {
                Ok((id, code)) => {
                    self.styles.formats.insert(id, code);
                }
                Err(e) => log::warn!("skipping FORMAT record: {e}"),
            },
            records::XF => match styles::parse_xf(data) {
                Ok(xf) => self.styles.xfs.push(xf),
                Err(e) => log::warn!("skipping XF record: {e}"),
            },
            records::PALETTE => {
                if let Err(e) = styles::apply_palette(data, &mut self.styles) {
                    log::warn!("ignoring PALETTE record: {e}");
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// BOUNDSHEET: stream offset(4), visibility(1), kind(1), short string name
fn parse_boundsheet(data: &[u8]) -> XlsResult<(u8, String)> {
    let kind = *data
        .get(5)
        .ok_or_else(|| XlsError::Parse("BOUNDSHEET record too short".into()))?;
    let name = read_short_string(data, &mut 6)?;
    Ok((kind, name))
}

/// Bodies of the top-level BOF..EOF substreams, nested ones included
fn sheet_substreams(records: &[BiffRecord]) -> impl Iterator<Item = Vec<&BiffRecord>> {
    let mut depth = 0usize;
    let mut body = Vec::new();
    let mut done = Vec::new();
    for rec in records {
        match rec.record_type {
            records::BOF => {
                if depth == 0 {
                    body = Vec::new();
                }
                depth += 1;
            }
            records::EOF if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    done.push(std::mem::take(&mut body));
                }
            }
            _ if depth > 0 => body.push(rec),
            _ => {}
        }
    }
    done.into_iter()
}

/// Row, column and XF index that open every cell record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellHeader {
    row: u32,
    col: u16,
    xf: u16,
}

impl CellHeader {
    fn read(data: &[u8], off: &mut usize) -> XlsResult<Self> {
        Ok(CellHeader {
            row: u32::from(read_u16(data, off)?),
            col: read_u16(data, off)?,
            xf: read_u16(data, off)?,
        })
    }
}

/// Cached result of a FORMULA record
enum FormulaResult {
    Cached(CellValue),
    /// The text follows in a STRING record
    TextFollows,
    Unknown,
}

/// Builds one worksheet from the records of its substream
struct SheetDecoder<'a> {
    ws: Worksheet,
    sst: &'a [String],
    styles: &'a [Style],
    /// Formula cell waiting for its STRING record
    awaiting_string: Option<(u32, u16)>,
    /// Anchor of the previous HLINK, for a HLINKTOOLTIP right after it
    last_link: Option<CellRange>,
}

impl<'a> SheetDecoder<'a> {
    fn new(name: &str, sst: &'a [String], styles: &'a [Style]) -> Self {
        SheetDecoder {
            ws: Worksheet::new(name),
            sst,
            styles,
            awaiting_string: None,
            last_link: None,
        }
    }

    fn finish(self) -> Worksheet {
        self.ws
    }

    fn feed(&mut self, rec: &BiffRecord) -> XlsResult<()> {
        let data = rec.data.as_slice();
        let awaiting = self.awaiting_string.take();
        let last_link = self.last_link.take();

        match rec.record_type {
            records::LABELSST => {
                let mut off = 0;
                let head = CellHeader::read(data, &mut off)?;
                let index = read_u32(data, &mut off)? as usize;
                let text = self.sst.get(index);
                if text.is_none() {
                    log::warn!(
                        "cell ({}, {}) refers to missing shared string {index}",
                        head.row,
                        head.col
                    );
                }
                self.put(head, text.map(|t| CellValue::string(t.as_str())))?;
            }
            records::LABEL => {
                let mut off = 0;
                let head = CellHeader::read(data, &mut off)?;
                let text = read_unicode_string(data, &mut off)?;
                self.put(head, Some(CellValue::string(text)))?;
            }
            records::NUMBER => {
                let mut off = 0;
                let head = CellHeader::read(data, &mut off)?;
                let n = read_f64(data, &mut off)?;
                self.put(head, Some(CellValue::Number(n)))?;
            }
            records::RK => {
                let mut off = 0;
                let head = CellHeader::read(data, &mut off)?;
                let n = read_rk(data, &mut off)?;
                self.put(head, Some(CellValue::Number(n)))?;
            }
            records::MULRK => self.run(data, 6, |data, off| {
                let xf = read_u16(data, off)?;
                Ok((xf, Some(CellValue::Number(read_rk(data, off)?))))
            })?,
            records::BLANK => {
                if let Ok(head) = CellHeader::read(data, &mut 0) {
                    self.put(head, None)?;
                }
            }
            records::MULBLANK => {
                if let Err(e) = self.run(data, 2, |data, off| Ok((read_u16(data, off)?, None))) {
                    log::warn!("skipping MULBLANK record: {e}");
                }
            }
            records::BOOLERR => {
                let mut off = 0;
                let head = CellHeader::read(data, &mut off)?;
                let raw = data.get(off).copied().unwrap_or(0);
                let value = match data.get(off + 1) {
                    Some(&flag) if flag != 0 => CellValue::Error(CellError::from_biff_code(raw)),
                    _ => CellValue::Boolean(raw != 0),
                };
                self.put(head, Some(value))?;
            }
            records::FORMULA => {
                let (head, result) = decode_formula(data)?;
                let value = match result {
                    FormulaResult::Cached(cached) => CellValue::formula_with_cache("", cached),
                    FormulaResult::TextFollows => {
                        self.awaiting_string = Some((head.row, head.col));
                        CellValue::formula("")
                    }
                    FormulaResult::Unknown => CellValue::formula(""),
                };
                self.put(head, Some(value))?;
            }
            records::STRING => {
                if let Some((row, col)) = awaiting {
                    let text = read_unicode_string(data, &mut 0)?;
                    let value = CellValue::formula_with_cache("", CellValue::string(text));
                    self.ws.set_cell_value_at(row, col, value)?;
                }
            }
            records::MERGECELLS => self.merges(data)?,
            records::ROW => {
                let row = read_u16(data, &mut 0)?;
                self.ws.ensure_row(u32::from(row))?;
            }
            records::COLINFO => self.column_widths(data),
            records::HLINK => match parse_hlink(data) {
                Ok(Some((range, link))) => {
                    for (row, col) in cells_of(&range) {
                        self.ws.set_hyperlink_at(row, col, link.clone())?;
                    }
                    self.last_link = Some(range);
                }
                Ok(None) => {}
                Err(e) => log::warn!("skipping HLINK record at offset {}: {e}", rec.stream_offset),
            },
            records::HLINKTOOLTIP => {
                if let (Some(range), Some(tip)) = (last_link, parse_tooltip(data)) {
                    for (row, col) in cells_of(&range) {
                        if let Some(link) = self.ws.hyperlink_at(row, col).cloned() {
                            self.ws
                                .set_hyperlink_at(row, col, link.with_tooltip(tip.clone()))?;
                        }
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Store a decoded cell. `None` is a formatted blank, which still makes
    /// its row present.
    fn put(&mut self, head: CellHeader, value: Option<CellValue>) -> XlsResult<()> {
        let CellHeader { row, col, xf } = head;
        match value {
            Some(value) => self.ws.set_cell_value_at(row, col, value)?,
            None => self.ws.ensure_row(row)?,
        }
        match self.styles.get(usize::from(xf)) {
            Some(style) if *style != Style::default() => {
                self.ws.set_cell_style_at(row, col, style)?
            }
            Some(_) => {}
            None => log::warn!("cell ({row}, {col}) uses unknown XF {xf}"),
        }
        Ok(())
    }

    /// MULRK and MULBLANK: row(2), first col(2), `step`-byte entries, last col(2)
    fn run<F>(&mut self, data: &[u8], step: usize, mut entry: F) -> XlsResult<()>
    where
        F: FnMut(&[u8], &mut usize) -> XlsResult<(u16, Option<CellValue>)>,
    {
        let Some(entries_end) = data.len().checked_sub(2).filter(|&end| end >= 4) else {
            return Err(XlsError::Parse(format!("{}-byte cell run record", data.len())));
        };
        let mut off = 0;
        let row = u32::from(read_u16(data, &mut off)?);
        let first = read_u16(data, &mut off)?;
        let mut tail = entries_end;
        let last = read_u16(data, &mut tail)?;

        self.ws.ensure_row(row)?;
        for col in first..=last {
            if off + step > entries_end {
                break;
            }
            let (xf, value) = entry(data, &mut off)?;
            self.put(CellHeader { row, col, xf }, value)?;
        }
        Ok(())
    }

    /// MERGECELLS: count(2), then one REF8 per range
    fn merges(&mut self, data: &[u8]) -> XlsResult<()> {
        let mut off = 0;
        let count = read_u16(data, &mut off)?;
        for _ in 0..count {
            let Ok(range) = read_ref8(data, &mut off) else {
                break;
            };
            if let Err(e) = self.ws.merge_cells(&range) {
                log::warn!("ignoring merged range {range}: {e}");
            }
        }
        Ok(())
    }

    /// COLINFO: first col(2), last col(2), width in 1/256 characters(2), ...
    fn column_widths(&mut self, data: &[u8]) {
        let mut off = 0;
        let (Ok(first), Ok(last), Ok(raw)) = (
            read_u16(data, &mut off),
            read_u16(data, &mut off),
            read_u16(data, &mut off),
        ) else {
            return;
        };
        if raw > 0 {
            for col in first..=last.min(records::MAX_COLS - 1) {
                self.ws.set_column_width(col, f64::from(raw) / 256.0);
            }
        }
    }
}

/// FORMULA: header(6), result(8), options(2), reserved(4), parsed tokens
///
/// A result whose bytes 6..8 are 0xFFFF is not a number; byte 0 holds its
/// kind and byte 2 its payload.
fn decode_formula(data: &[u8]) -> XlsResult<(CellHeader, FormulaResult)> {
    if data.len() < 20 {
        return Err(XlsError::Parse("FORMULA record too short".into()));
    }
    let mut off = 0;
    let head = CellHeader::read(data, &mut off)?;
    let result = &data[off..off + 8];

    let decoded = if result[6..8] != [0xFF, 0xFF] {
        FormulaResult::Cached(CellValue::Number(read_f64(data, &mut off)?))
    } else {
        match result[0] {
            0x00 => FormulaResult::TextFollows,
            0x01 => FormulaResult::Cached(CellValue::Boolean(result[2] != 0)),
            0x02 => FormulaResult::Cached(CellValue::Error(CellError::from_biff_code(result[2]))),
            0x03 => FormulaResult::Cached(CellValue::string("")),
            _ => FormulaResult::Unknown,
        }
    };
    Ok((head, decoded))
}

/// REF8: first row, last row, first col, last col; 2 bytes each
fn read_ref8(data: &[u8], off: &mut usize) -> XlsResult<CellRange> {
    let first_row = u32::from(read_u16(data, off)?);
    let last_row = u32::from(read_u16(data, off)?);
    let first_col = read_u16(data, off)?;
    let last_col = read_u16(data, off)?;
    Ok(CellRange::new(
        CellAddress::new(first_row, first_col),
        CellAddress::new(last_row, last_col),
    ))
}

fn cells_of(range: &CellRange) -> impl Iterator<Item = (u32, u16)> + '_ {
    (range.start.row..=range.end.row)
        .flat_map(move |row| (range.start.col..=range.end.col).map(move |col| (row, col)))
}

/// UTF-16 text behind a `u32` character count
fn read_counted_utf16(data: &[u8], off: &mut usize) -> XlsResult<String> {
    let units = read_u32(data, off)? as usize;
    read_utf16(data, off, units)
}

/// Decode an HLINK record into its anchor range and target
///
/// After the REF8 anchor come the standard link CLSID and a stream version;
/// the flags sit at byte 28. Display name, frame, moniker and location
/// follow when their flag is set. Monikers other than URLs (file links)
/// give `None`.
pub(crate) fn parse_hlink(data: &[u8]) -> XlsResult<Option<(CellRange, Hyperlink)>> {
    if data.len() < 32 {
        return Err(XlsError::Parse("HLINK record too short".into()));
    }
    let range = read_ref8(data, &mut 0)?;
    let mut off = 28;
    let flags = read_u32(data, &mut off)?;

    for skipped in [HLINK_HAS_DISPLAY, HLINK_HAS_FRAME] {
        if flags & skipped != 0 {
            read_counted_utf16(data, &mut off)?;
        }
    }

    let mut url = None;
    if flags & HLINK_HAS_MONIKER != 0 {
        let moniker = data
            .get(off..off + 16)
            .ok_or_else(|| XlsError::Parse("HLINK moniker cut short".into()))?;
        if moniker != CLSID_URL_MONIKER {
            log::warn!("hyperlink with a non-URL moniker dropped");
            return Ok(None);
        }
        off += 16;
        let bytes = read_u32(data, &mut off)? as usize;
        url = Some(read_utf16(data, &mut { off }, bytes / 2)?);
        off += bytes;
    }

    let location = if flags & HLINK_HAS_LOCATION != 0 {
        Some(read_counted_utf16(data, &mut off)?)
    } else {
        None
    };

    let link = match (url, location) {
        (Some(url), Some(loc)) if !loc.is_empty() => Hyperlink::url(format!("{url}#{loc}")),
        (Some(url), _) => Hyperlink::url(url),
        (None, Some(loc)) => Hyperlink::location(loc),
        (None, None) => return Ok(None),
    };
    Ok(Some((range, link)))
}

/// HLINKTOOLTIP: record id(2), flags(2), REF8, NUL-terminated UTF-16
fn parse_tooltip(data: &[u8]) -> Option<String> {
    let text = data.get(12..)?;
    read_utf16(text, &mut 0, text.len() / 2)
        .ok()
        .filter(|t| !t.is_empty())
}
