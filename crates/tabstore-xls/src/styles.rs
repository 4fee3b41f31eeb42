//! Style record parsing and generation for XLS (BIFF8) files.
//!
//! BIFF8 stores cell formatting across several record types in the workbook
//! globals substream:
//! - **FONT** (0x0031): font definitions
//! - **FORMAT** (0x041E): custom number format strings
//! - **XF** (0x00E0): extended format records combining font, format,
//!   alignment, borders, and fill
//! - **PALETTE** (0x0092): optional custom color palette overriding the
//!   default 56 colors
//!
//! Cell records carry an XF index that selects one of the XF records.

use std::collections::HashMap;

use tabstore_core::style::palette_rgb;
use tabstore_core::{
    Alignment, BorderEdge, BorderLineStyle, BorderStyle, Color, FillStyle, FontStyle,
    HorizontalAlignment, NumberFormat, PatternType, Style, Underline, VerticalAlignment, Workbook,
};

use crate::biff::parser::{read_u16, read_u32};
use crate::biff::records;
use crate::biff::strings::{push_short_string, push_unicode_string, read_short_string, read_unicode_string};
use crate::biff::BiffWriter;
use crate::error::{XlsError, XlsResult};

/// Number of style XFs written ahead of the first cell XF
pub(crate) const STYLE_XF_COUNT: u16 = 15;
/// XF index of the default cell format
pub(crate) const DEFAULT_CELL_XF: u16 = STYLE_XF_COUNT;

/// First id available for custom number formats
const FIRST_CUSTOM_FORMAT_ID: u16 = 164;

/// Color index meaning "system default foreground"
const ICV_DEFAULT_FG: u16 = 0x40;
/// Color index meaning "system default background"
const ICV_DEFAULT_BG: u16 = 0x41;
/// Color index meaning "automatic" (fonts)
const ICV_AUTO: u16 = 0x7FFF;

// ============================================================================
// Intermediate BIFF types
// ============================================================================

/// Parsed FONT record data.
#[derive(Debug, Clone)]
pub(crate) struct BiffFont {
    /// Font height in twips (1/20 of a point).
    pub height_twips: u16,
    pub bold: bool,
    pub italic: bool,
    pub underline: u8,
    pub strikethrough: bool,
    /// Palette color index for the font.
    pub color_index: u16,
    pub name: String,
}

/// Parsed XF record data (20 bytes in BIFF8).
#[derive(Debug, Clone, Default)]
pub(crate) struct BiffXf {
    pub font_index: u16,
    pub format_index: u16,
    pub hor_align: u8,
    pub vert_align: u8,
    pub wrap_text: bool,
    pub indent: u8,
    pub rotation: u8,
    // Borders - line style codes (0-13)
    pub border_left: u8,
    pub border_right: u8,
    pub border_top: u8,
    pub border_bottom: u8,
    pub icv_left: u16,
    pub icv_right: u16,
    pub icv_top: u16,
    pub icv_bottom: u16,
    pub fill_pattern: u8,
    pub icv_fore: u16,
    pub icv_back: u16,
}

/// All style data collected from the workbook globals stream.
pub(crate) struct StyleContext {
    pub fonts: Vec<BiffFont>,
    pub formats: HashMap<u16, String>,
    pub xfs: Vec<BiffXf>,
    /// Set once a PALETTE record replaces the built-in colors
    pub palette: Option<[(u8, u8, u8); 56]>,
}

impl StyleContext {
    pub fn new() -> Self {
        Self {
            fonts: Vec::new(),
            formats: HashMap::new(),
            xfs: Vec::new(),
            palette: None,
        }
    }

    /// Build the resolved style table (one `Style` per XF record).
    pub fn build_style_table(&self) -> Vec<Style> {
        self.xfs.iter().map(|xf| self.resolve_xf(xf)).collect()
    }

    fn resolve_xf(&self, xf: &BiffXf) -> Style {
        Style {
            font: self.resolve_font(xf.font_index),
            fill: self.resolve_fill(xf),
            border: self.resolve_border(xf),
            alignment: resolve_alignment(xf),
            number_format: self.resolve_number_format(xf.format_index),
        }
    }

    fn resolve_font(&self, font_index: u16) -> FontStyle {
        // Font index 4 is never stored: 0-3 map directly, 5 → fonts[4], ...
        let actual = if font_index >= 5 {
            (font_index - 1) as usize
        } else {
            font_index as usize
        };

        let Some(bf) = self.fonts.get(actual) else {
            return FontStyle::default();
        };

        FontStyle {
            name: bf.name.clone(),
            size: bf.height_twips as f64 / 20.0,
            bold: bf.bold,
            italic: bf.italic,
            underline: underline_from_biff(bf.underline),
            strikethrough: bf.strikethrough,
            color: self.resolve_color(bf.color_index),
        }
    }

    fn resolve_fill(&self, xf: &BiffXf) -> FillStyle {
        FillStyle::from_parts(
            PatternType::from_code(xf.fill_pattern),
            self.resolve_color(xf.icv_fore),
            self.resolve_color(xf.icv_back),
        )
    }

    fn resolve_border(&self, xf: &BiffXf) -> BorderStyle {
        let edge = |line_code: u8, icv: u16| -> Option<BorderEdge> {
            match BorderLineStyle::from_code(line_code) {
                BorderLineStyle::None => None,
                style => Some(BorderEdge {
                    style,
                    color: self.resolve_color(icv),
                }),
            }
        };

        BorderStyle {
            left: edge(xf.border_left, xf.icv_left),
            right: edge(xf.border_right, xf.icv_right),
            top: edge(xf.border_top, xf.icv_top),
            bottom: edge(xf.border_bottom, xf.icv_bottom),
        }
    }

    fn resolve_number_format(&self, fmt_id: u16) -> NumberFormat {
        if fmt_id == 0 {
            return NumberFormat::General;
        }
        if let Some(code) = self.formats.get(&fmt_id) {
            return NumberFormat::Custom(code.clone());
        }
        NumberFormat::BuiltIn(fmt_id as u32)
    }

    /// Map a BIFF color index to a [`Color`].
    ///
    /// With the built-in palette the index is kept as [`Color::Indexed`];
    /// a custom PALETTE turns palette entries into RGB values.
    pub(crate) fn resolve_color(&self, icv: u16) -> Color {
        match (icv, &self.palette) {
            (8..=63, Some(palette)) => {
                let (r, g, b) = palette[(icv - 8) as usize];
                Color::Rgb { r, g, b }
            }
            (0..=63, _) => Color::Indexed(icv as u8),
            _ => Color::Auto,
        }
    }
}

/// BIFF rotation: 0 = none, 1-90 = CCW degrees, 91-180 = CW as -(val-90),
/// 255 = vertical text.
fn resolve_alignment(xf: &BiffXf) -> Alignment {
    let rotation = match xf.rotation {
        r @ 1..=90 => r as i16,
        r @ 91..=180 => -((r as i16) - 90),
        255 => 255,
        _ => 0,
    };

    Alignment {
        horizontal: HorizontalAlignment::from_code(xf.hor_align),
        vertical: VerticalAlignment::from_code(xf.vert_align),
        wrap_text: xf.wrap_text,
        indent: xf.indent,
        rotation,
    }
}

fn rotation_to_biff(rotation: i16) -> u8 {
    match rotation {
        r @ 1..=90 => r as u8,
        r @ -90..=-1 => (90 - r) as u8,
        255 => 255,
        _ => 0,
    }
}

fn underline_from_biff(code: u8) -> Underline {
    match code {
        0x01 => Underline::Single,
        0x02 => Underline::Double,
        0x21 => Underline::SingleAccounting,
        0x22 => Underline::DoubleAccounting,
        _ => Underline::None,
    }
}

fn underline_to_biff(underline: Underline) -> u8 {
    match underline {
        Underline::None => 0x00,
        Underline::Single => 0x01,
        Underline::Double => 0x02,
        Underline::SingleAccounting => 0x21,
        Underline::DoubleAccounting => 0x22,
    }
}

// ============================================================================
// Record parsers
// ============================================================================

/// Parse a FONT record (0x0031).
///
/// Layout:
///   0  u16  dyHeight   - font height in twips (1/20 pt)
///   2  u16  grbit      - flags (bit 1 = italic, bit 3 = strikethrough)
///   4  u16  icv        - color index
///   6  u16  bls        - bold weight (400 = normal, 700 = bold)
///   8  u16  sss        - super/subscript (0/1/2)
///  10  u8   uls        - underline type
///  11  u8   bFamily    - font family (ignored)
///  12  u8   bCharSet   - character set (ignored)
///  13  u8   reserved
///  14  ...  font name  - short string (1-byte length prefix)
pub(crate) fn parse_font(data: &[u8]) -> XlsResult<BiffFont> {
    if data.len() < 15 {
        return Err(XlsError::Parse("FONT record too short".into()));
    }

    let mut off = 0;
    let height = read_u16(data, &mut off)?;
    let grbit = read_u16(data, &mut off)?;
    let icv = read_u16(data, &mut off)?;
    let bls = read_u16(data, &mut off)?;
    let _sss = read_u16(data, &mut off)?;
    let uls = data[off];
    off += 4;

    let name = read_short_string(data, &mut off).unwrap_or_default();

    Ok(BiffFont {
        height_twips: height,
        italic: (grbit & 0x0002) != 0,
        strikethrough: (grbit & 0x0008) != 0,
        bold: bls >= 700,
        underline: uls,
        color_index: icv,
        name,
    })
}

/// Parse a FORMAT record (0x041E).
///
/// Layout:
///   0  u16  ifmt   - format index
///   2  ...  format string (unicode string, 2-byte length prefix)
pub(crate) fn parse_format(data: &[u8]) -> XlsResult<(u16, String)> {
    let mut off = 0;
    let ifmt = read_u16(data, &mut off)?;
    let s = read_unicode_string(data, &mut off)?;
    Ok((ifmt, s))
}

/// Parse an XF record (0x00E0, always 20 bytes in BIFF8).
///
/// Layout (see [MS-XLS] §2.4.353):
///   0   u16  ifnt          - font index
///   2   u16  ifmt          - format index
///   4   u16  type/protect  - bits 0-1 lock/hidden, bit 2 style-xf
///   6   u8   alignment1    - bits 0-2 halign, bit 3 wrap, bits 4-6 valign
///   7   u8   trot          - text rotation
///   8   u8   alignment2    - bits 0-3 indent, bit 4 shrink, bits 6-7 reading order
///   9   u8   used_attribs  - (ignored)
///  10   u32  border lines/colors 1
///  14   u32  border lines/colors 2 + fill pattern
///  18   u16  fill colors
pub(crate) fn parse_xf(data: &[u8]) -> XlsResult<BiffXf> {
    if data.len() < 20 {
        return Err(XlsError::Parse(format!(
            "XF record too short: {} bytes (expected 20)",
            data.len()
        )));
    }

    let mut off = 0;
    let ifnt = read_u16(data, &mut off)?;
    let ifmt = read_u16(data, &mut off)?;
    let _type_prot = read_u16(data, &mut off)?;

    let align1 = data[6];
    let rotation = data[7];
    let align2 = data[8];
    off = 10;

    let border1 = read_u32(data, &mut off)?;
    let border2 = read_u32(data, &mut off)?;
    let fill_colors = read_u16(data, &mut off)?;

    Ok(BiffXf {
        font_index: ifnt,
        format_index: ifmt,
        hor_align: align1 & 0x07,
        wrap_text: (align1 & 0x08) != 0,
        vert_align: (align1 >> 4) & 0x07,
        rotation,
        indent: align2 & 0x0F,
        border_left: (border1 & 0x0F) as u8,
        border_right: ((border1 >> 4) & 0x0F) as u8,
        border_top: ((border1 >> 8) & 0x0F) as u8,
        border_bottom: ((border1 >> 12) & 0x0F) as u8,
        icv_left: ((border1 >> 16) & 0x7F) as u16,
        icv_right: ((border1 >> 23) & 0x7F) as u16,
        icv_top: (border2 & 0x7F) as u16,
        icv_bottom: ((border2 >> 7) & 0x7F) as u16,
        fill_pattern: ((border2 >> 26) & 0x3F) as u8,
        icv_fore: fill_colors & 0x7F,
        icv_back: (fill_colors >> 7) & 0x7F,
    })
}

/// Apply a PALETTE record to the style context.
///
/// Layout:
///   0  u16  ccv    - number of colors (typically 56)
///   2  ...  colors - array of ccv × 4-byte entries (R, G, B, 0x00)
pub(crate) fn apply_palette(data: &[u8], ctx: &mut StyleContext) -> XlsResult<()> {
    let mut off = 0;
    let count = read_u16(data, &mut off)? as usize;

    let palette = ctx.palette.get_or_insert_with(|| {
        let mut base = [(0u8, 0u8, 0u8); 56];
        for (i, entry) in base.iter_mut().enumerate() {
            *entry = palette_rgb(i as u8 + 8).unwrap_or((0, 0, 0));
        }
        base
    });

    for entry in palette.iter_mut().take(count) {
        if off + 4 > data.len() {
            break;
        }
        *entry = (data[off], data[off + 1], data[off + 2]);
        off += 4;
    }

    Ok(())
}

// ============================================================================
// Writing
// ============================================================================

/// Workbook-wide XF table for the writer.
///
/// Every distinct [`Style`] used by any sheet gets one cell XF. Index 0 of
/// `styles` is the default style and lands on [`DEFAULT_CELL_XF`].
#[derive(Debug)]
pub(crate) struct XlsStyleTable {
    styles: Vec<Style>,
    /// Per-worksheet mapping: local pool index -> XF index
    sheet_maps: Vec<HashMap<u32, u16>>,
}

impl XlsStyleTable {
    pub(crate) fn build(workbook: &Workbook) -> XlsResult<Self> {
        let mut styles = vec![Style::default()];
        let mut style_to_xf: HashMap<Style, u16> = HashMap::new();
        style_to_xf.insert(Style::default(), DEFAULT_CELL_XF);

        let mut sheet_maps = Vec::with_capacity(workbook.sheet_count());
        for sheet in workbook.worksheets() {
            let mut map = HashMap::new();
            for (local_idx, style) in sheet.style_pool().iter() {
                let xf = match style_to_xf.get(style) {
                    Some(xf) => *xf,
                    None => {
                        // XF indices are 12 bits wide in the type/parent field
                        let xf = DEFAULT_CELL_XF as usize + styles.len();
                        if xf > 0x0FFF {
                            return Err(XlsError::Limit(format!(
                                "more than {} distinct cell formats",
                                0x0FFF - DEFAULT_CELL_XF
                            )));
                        }
                        styles.push(style.clone());
                        style_to_xf.insert(style.clone(), xf as u16);
                        xf as u16
                    }
                };
                map.insert(local_idx, xf);
            }
            sheet_maps.push(map);
        }

        Ok(Self { styles, sheet_maps })
    }

    pub(crate) fn xf_for(&self, sheet_index: usize, local_style_index: u32) -> u16 {
        self.sheet_maps
            .get(sheet_index)
            .and_then(|m| m.get(&local_style_index).copied())
            .unwrap_or(DEFAULT_CELL_XF)
    }

    /// Write FONT, FORMAT, XF and STYLE records in that order.
    pub(crate) fn write_records(&self, w: &mut BiffWriter) -> XlsResult<()> {
        let default_font = FontStyle::default();
        let mut fonts: Vec<&FontStyle> = Vec::new();
        let mut font_ids: HashMap<&FontStyle, u16> = HashMap::new();

        let mut formats: Vec<(u16, &str)> = Vec::new();
        let mut format_ids: HashMap<&str, u16> = HashMap::new();

        let mut resolved = Vec::with_capacity(self.styles.len());
        for style in &self.styles {
            let font_index = if style.font == default_font {
                0
            } else {
                *font_ids.entry(&style.font).or_insert_with(|| {
                    fonts.push(&style.font);
                    // Records 0-3 hold the default font; index 4 does not exist
                    4 + fonts.len() as u16
                })
            };

            let format_index = match &style.number_format {
                NumberFormat::General => 0,
                NumberFormat::BuiltIn(id) => *id as u16,
                NumberFormat::Custom(code) => match NumberFormat::builtin_id_for(code) {
                    Some(id) => id as u16,
                    None => *format_ids.entry(code.as_str()).or_insert_with(|| {
                        let id = FIRST_CUSTOM_FORMAT_ID + formats.len() as u16;
                        formats.push((id, code.as_str()));
                        id
                    }),
                },
            };

            resolved.push((font_index, format_index));
        }

        for _ in 0..4 {
            w.record(records::FONT, &font_record(&default_font)?);
        }
        for font in &fonts {
            w.record(records::FONT, &font_record(font)?);
        }

        for (id, code) in &formats {
            let mut data = id.to_le_bytes().to_vec();
            push_unicode_string(&mut data, code)?;
            w.record(records::FORMAT, &data);
        }

        // Style XFs: 0 is Normal, 1-14 are the outline level styles
        for i in 0..STYLE_XF_COUNT {
            let used = if i == 0 { 0x00 } else { 0xF4 };
            w.record(records::XF, &style_xf_record(used));
        }
        for (style, (font_index, format_index)) in self.styles.iter().zip(&resolved) {
            w.record(
                records::XF,
                &cell_xf_record(style, *font_index, *format_index),
            );
        }

        // STYLE record for Normal (built-in id 0)
        let mut normal = (0x8000u16).to_le_bytes().to_vec();
        normal.extend_from_slice(&[0x00, 0xFF]);
        w.record(records::STYLE, &normal);

        Ok(())
    }
}

fn font_record(font: &FontStyle) -> XlsResult<Vec<u8>> {
    let mut data = Vec::with_capacity(16 + font.name.len());
    let mut grbit = 0u16;
    if font.italic {
        grbit |= 0x0002;
    }
    if font.strikethrough {
        grbit |= 0x0008;
    }
    let icv = if font.color.is_auto() {
        ICV_AUTO
    } else {
        font.color.nearest_indexed() as u16
    };
    let bls: u16 = if font.bold { 700 } else { 400 };

    data.extend_from_slice(&font.size_twips().to_le_bytes());
    data.extend_from_slice(&grbit.to_le_bytes());
    data.extend_from_slice(&icv.to_le_bytes());
    data.extend_from_slice(&bls.to_le_bytes());
    data.extend_from_slice(&0u16.to_le_bytes()); // sss
    data.push(underline_to_biff(font.underline));
    data.extend_from_slice(&[0, 0, 0]); // family, charset, reserved
    push_short_string(&mut data, &font.name)?;
    Ok(data)
}

fn style_xf_record(used_attribs: u8) -> [u8; 20] {
    let mut data = [0u8; 20];
    data[4..6].copy_from_slice(&0xFFF5u16.to_le_bytes());
    data[6] = 0x20; // bottom aligned
    data[9] = used_attribs;
    data[18..20].copy_from_slice(&(ICV_DEFAULT_FG | (ICV_DEFAULT_BG << 7)).to_le_bytes());
    data
}

fn color_index(color: Color, fallback: u16) -> u16 {
    if color.is_auto() {
        fallback
    } else {
        color.nearest_indexed() as u16
    }
}

fn cell_xf_record(style: &Style, font_index: u16, format_index: u16) -> [u8; 20] {
    let mut data = [0u8; 20];
    data[0..2].copy_from_slice(&font_index.to_le_bytes());
    data[2..4].copy_from_slice(&format_index.to_le_bytes());
    // Locked, parent style XF 0
    data[4..6].copy_from_slice(&0x0001u16.to_le_bytes());

    let align = &style.alignment;
    data[6] = (align.horizontal.code() & 0x07)
        | if align.wrap_text { 0x08 } else { 0 }
        | ((align.vertical.code() & 0x07) << 4);
    data[7] = rotation_to_biff(align.rotation);
    data[8] = align.indent.min(15);
    data[9] = 0xFC;

    let edge = |e: Option<BorderEdge>| -> (u32, u32) {
        match e {
            Some(edge) => (
                edge.style.code() as u32,
                color_index(edge.color, ICV_DEFAULT_FG) as u32,
            ),
            None => (0, 0),
        }
    };
    let (left, icv_left) = edge(style.border.left);
    let (right, icv_right) = edge(style.border.right);
    let (top, icv_top) = edge(style.border.top);
    let (bottom, icv_bottom) = edge(style.border.bottom);

    let (pattern, fore, back) = style.fill.parts();
    let border1 =
        left | (right << 4) | (top << 8) | (bottom << 12) | (icv_left << 16) | (icv_right << 23);
    let border2 = icv_top | (icv_bottom << 7) | ((pattern.code() as u32) << 26);
    let fill_colors =
        color_index(fore, ICV_DEFAULT_FG) | (color_index(back, ICV_DEFAULT_BG) << 7);

    data[10..14].copy_from_slice(&border1.to_le_bytes());
    data[14..18].copy_from_slice(&border2.to_le_bytes());
    data[18..20].copy_from_slice(&fill_colors.to_le_bytes());
    data
}

// ============================================================================
// Unit tests
// ============================================================================
