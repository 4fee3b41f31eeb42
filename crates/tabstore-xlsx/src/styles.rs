//! XLSX styles (styles.xml) read/write helpers

use std::collections::HashMap;
use std::io::{BufReader, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use tabstore_core::{
    Alignment, BorderEdge, BorderLineStyle, BorderStyle, Color, FillStyle, FontStyle,
    HorizontalAlignment, NumberFormat, PatternType, Style, Underline, VerticalAlignment, Workbook,
};

/// First id available for custom number formats
const FIRST_CUSTOM_NUMFMT_ID: u32 = 164;

// === Writing ===

#[derive(Debug)]
pub(crate) struct XlsxStyleTable {
    /// Global, deduplicated styles. Index is the cellXfs index.
    styles: Vec<Style>,
    /// Per-worksheet mapping: local pool index -> global xf index
    sheet_maps: Vec<HashMap<u32, u32>>,
}

#[derive(Debug, Clone, Copy)]
struct ResolvedXfIds {
    font_id: u32,
    fill_id: u32,
    border_id: u32,
    num_fmt_id: u32,
}

impl XlsxStyleTable {
    pub(crate) fn build(workbook: &Workbook) -> Self {
        let mut styles = vec![Style::default()];
        let mut style_to_xf: HashMap<Style, u32> = HashMap::new();
        style_to_xf.insert(Style::default(), 0);

        let mut sheet_maps = Vec::with_capacity(workbook.sheet_count());
        for sheet in workbook.worksheets() {
            let mut map = HashMap::new();
            for (local_idx, style) in sheet.style_pool().iter() {
                let xf_id = *style_to_xf.entry(style.clone()).or_insert_with(|| {
                    styles.push(style.clone());
                    (styles.len() - 1) as u32
                });
                map.insert(local_idx, xf_id);
            }
            sheet_maps.push(map);
        }

        Self { styles, sheet_maps }
    }

    pub(crate) fn xf_id_for(&self, sheet_index: usize, local_style_index: u32) -> u32 {
        self.sheet_maps
            .get(sheet_index)
            .and_then(|m| m.get(&local_style_index).copied())
            .unwrap_or(0)
    }

    pub(crate) fn to_styles_xml(&self) -> String {
        let mut fonts: Vec<FontStyle> = vec![FontStyle::default()];
        let mut font_ids: HashMap<FontStyle, u32> = HashMap::new();
        font_ids.insert(FontStyle::default(), 0);

        // Excel requires the first two fills to be none and gray125
        let mut fills: Vec<FillStyle> = vec![
            FillStyle::None,
            FillStyle::Pattern {
                pattern: PatternType::Gray125,
                foreground: Color::Auto,
                background: Color::Auto,
            },
        ];
        let mut fill_ids: HashMap<FillStyle, u32> = HashMap::new();

        let mut borders: Vec<BorderStyle> = vec![BorderStyle::default()];
        let mut border_ids: HashMap<BorderStyle, u32> = HashMap::new();
        border_ids.insert(BorderStyle::default(), 0);

        let mut numfmt_ids: HashMap<String, u32> = HashMap::new();
        let mut numfmts: Vec<(u32, String)> = Vec::new();

        let mut resolved = Vec::with_capacity(self.styles.len());
        for style in &self.styles {
            let font_id = *font_ids.entry(style.font.clone()).or_insert_with(|| {
                fonts.push(style.font.clone());
                (fonts.len() - 1) as u32
            });

            let fill_id = match style.fill {
                FillStyle::None => 0,
                fill => *fill_ids.entry(fill).or_insert_with(|| {
                    fills.push(fill);
                    (fills.len() - 1) as u32
                }),
            };

            let border_id = *border_ids.entry(style.border).or_insert_with(|| {
                borders.push(style.border);
                (borders.len() - 1) as u32
            });

            let num_fmt_id = match &style.number_format {
                NumberFormat::General => 0,
                NumberFormat::BuiltIn(id) => *id,
                NumberFormat::Custom(code) => *numfmt_ids.entry(code.clone()).or_insert_with(|| {
                    let id = FIRST_CUSTOM_NUMFMT_ID + numfmts.len() as u32;
                    numfmts.push((id, code.clone()));
                    id
                }),
            };

            resolved.push(ResolvedXfIds {
                font_id,
                fill_id,
                border_id,
                num_fmt_id,
            });
        }

        let mut xml = String::new();
        xml.push_str(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        if !numfmts.is_empty() {
            xml.push_str(&format!("\n  <numFmts count=\"{}\">", numfmts.len()));
            for (id, code) in &numfmts {
                xml.push_str(&format!(
                    "\n    <numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
                    id,
                    escape_xml_attr(code)
                ));
            }
            xml.push_str("\n  </numFmts>");
        }

        xml.push_str(&format!("\n  <fonts count=\"{}\">", fonts.len()));
        for font in &fonts {
            xml.push_str("\n    ");
            xml.push_str(&write_font(font));
        }
        xml.push_str("\n  </fonts>");

        xml.push_str(&format!("\n  <fills count=\"{}\">", fills.len()));
        for fill in &fills {
            xml.push_str("\n    ");
            xml.push_str(&write_fill(fill));
        }
        xml.push_str("\n  </fills>");

        xml.push_str(&format!("\n  <borders count=\"{}\">", borders.len()));
        for border in &borders {
            xml.push_str("\n    ");
            xml.push_str(&write_border(border));
        }
        xml.push_str("\n  </borders>");

        xml.push_str(
            r#"
  <cellStyleXfs count="1">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
  </cellStyleXfs>"#,
        );

        xml.push_str(&format!("\n  <cellXfs count=\"{}\">", self.styles.len()));
        for (style, ids) in self.styles.iter().zip(&resolved) {
            xml.push_str("\n    ");
            xml.push_str(&write_xf(style, *ids));
        }
        xml.push_str("\n  </cellXfs>");

        xml.push_str(
            r#"
  <cellStyles count="1">
    <cellStyle name="Normal" xfId="0" builtinId="0"/>
  </cellStyles>
  <dxfs count="0"/>
  <tableStyles count="0" defaultTableStyle="TableStyleMedium9" defaultPivotStyle="PivotStyleLight16"/>
</styleSheet>"#,
        );
        xml
    }
}

pub(crate) fn escape_xml_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn color_attrs(color: &Color) -> String {
    match color {
        Color::Auto => " indexed=\"64\"".to_string(),
        Color::Rgb { r, g, b } => format!(" rgb=\"FF{:02X}{:02X}{:02X}\"", r, g, b),
        Color::Argb { a, r, g, b } => format!(" rgb=\"{:02X}{:02X}{:02X}{:02X}\"", a, r, g, b),
        Color::Indexed(i) => format!(" indexed=\"{}\"", i),
        Color::Theme { index, tint: 0 } => format!(" theme=\"{}\"", index),
        Color::Theme { index, tint } => {
            format!(" theme=\"{}\" tint=\"{}\"", index, (*tint as f64) / 100.0)
        }
    }
}

fn write_font(font: &FontStyle) -> String {
    let mut s = String::from("<font>");
    if font.bold {
        s.push_str("<b/>");
    }
    if font.italic {
        s.push_str("<i/>");
    }
    if font.strikethrough {
        s.push_str("<strike/>");
    }
    match font.underline {
        Underline::None => {}
        Underline::Single => s.push_str("<u/>"),
        Underline::Double => s.push_str("<u val=\"double\"/>"),
        Underline::SingleAccounting => s.push_str("<u val=\"singleAccounting\"/>"),
        Underline::DoubleAccounting => s.push_str("<u val=\"doubleAccounting\"/>"),
    }
    s.push_str(&format!("<sz val=\"{}\"/>", font.size));
    if !font.color.is_auto() {
        s.push_str(&format!("<color{}/>", color_attrs(&font.color)));
    }
    s.push_str(&format!("<name val=\"{}\"/>", escape_xml_attr(&font.name)));
    s.push_str("</font>");
    s
}

const PATTERN_NAMES: [(PatternType, &str); 19] = [
    (PatternType::None, "none"),
    (PatternType::Solid, "solid"),
    (PatternType::MediumGray, "mediumGray"),
    (PatternType::DarkGray, "darkGray"),
    (PatternType::LightGray, "lightGray"),
    (PatternType::DarkHorizontal, "darkHorizontal"),
    (PatternType::DarkVertical, "darkVertical"),
    (PatternType::DarkDown, "darkDown"),
    (PatternType::DarkUp, "darkUp"),
    (PatternType::DarkGrid, "darkGrid"),
    (PatternType::DarkTrellis, "darkTrellis"),
    (PatternType::LightHorizontal, "lightHorizontal"),
    (PatternType::LightVertical, "lightVertical"),
    (PatternType::LightDown, "lightDown"),
    (PatternType::LightUp, "lightUp"),
    (PatternType::LightGrid, "lightGrid"),
    (PatternType::LightTrellis, "lightTrellis"),
    (PatternType::Gray125, "gray125"),
    (PatternType::Gray0625, "gray0625"),
];

fn pattern_type_to_str(p: PatternType) -> &'static str {
    PATTERN_NAMES
        .iter()
        .find(|(pt, _)| *pt == p)
        .map_or("none", |(_, name)| name)
}

fn str_to_pattern_type(s: &str) -> Option<PatternType> {
    PATTERN_NAMES
        .iter()
        .find(|(_, name)| *name == s)
        .map(|(pt, _)| *pt)
}

fn write_fill(fill: &FillStyle) -> String {
    let (pattern, fg, bg) = fill.parts();
    if pattern == PatternType::None {
        return "<fill><patternFill patternType=\"none\"/></fill>".to_string();
    }
    format!(
        "<fill><patternFill patternType=\"{}\"><fgColor{}/><bgColor{}/></patternFill></fill>",
        pattern_type_to_str(pattern),
        color_attrs(&fg),
        color_attrs(&bg)
    )
}

const BORDER_NAMES: [(BorderLineStyle, &str); 13] = [
    (BorderLineStyle::Thin, "thin"),
    (BorderLineStyle::Medium, "medium"),
    (BorderLineStyle::Dashed, "dashed"),
    (BorderLineStyle::Dotted, "dotted"),
    (BorderLineStyle::Thick, "thick"),
    (BorderLineStyle::Double, "double"),
    (BorderLineStyle::Hair, "hair"),
    (BorderLineStyle::MediumDashed, "mediumDashed"),
    (BorderLineStyle::DashDot, "dashDot"),
    (BorderLineStyle::MediumDashDot, "mediumDashDot"),
    (BorderLineStyle::DashDotDot, "dashDotDot"),
    (BorderLineStyle::MediumDashDotDot, "mediumDashDotDot"),
    (BorderLineStyle::SlantDashDot, "slantDashDot"),
];

fn write_border_edge(tag: &str, edge: &Option<BorderEdge>) -> String {
    let named = edge.and_then(|e| {
        BORDER_NAMES
            .iter()
            .find(|(st, _)| *st == e.style)
            .map(|(_, name)| (*name, e.color))
    });
    match named {
        None => format!("<{tag}/>"),
        Some((name, color)) => format!(
            "<{tag} style=\"{}\"><color{}/></{tag}>",
            name,
            color_attrs(&color)
        ),
    }
}

fn write_border(border: &BorderStyle) -> String {
    let mut s = String::from("<border>");
    s.push_str(&write_border_edge("left", &border.left));
    s.push_str(&write_border_edge("right", &border.right));
    s.push_str(&write_border_edge("top", &border.top));
    s.push_str(&write_border_edge("bottom", &border.bottom));
    s.push_str("<diagonal/></border>");
    s
}

const HORIZONTAL_NAMES: [&str; 8] = [
    "general",
    "left",
    "center",
    "right",
    "fill",
    "justify",
    "centerContinuous",
    "distributed",
];

const VERTICAL_NAMES: [&str; 5] = ["top", "center", "bottom", "justify", "distributed"];

fn write_alignment(al: &Alignment) -> String {
    let default = Alignment::default();
    let mut s = String::from("<alignment");
    if al.horizontal != default.horizontal {
        s.push_str(&format!(
            " horizontal=\"{}\"",
            HORIZONTAL_NAMES[al.horizontal.code() as usize]
        ));
    }
    if al.vertical != default.vertical {
        s.push_str(&format!(
            " vertical=\"{}\"",
            VERTICAL_NAMES[al.vertical.code() as usize]
        ));
    }
    if al.wrap_text {
        s.push_str(" wrapText=\"1\"");
    }
    if al.indent != 0 {
        s.push_str(&format!(" indent=\"{}\"", al.indent));
    }
    if al.rotation != 0 {
        s.push_str(&format!(" textRotation=\"{}\"", al.rotation));
    }
    s.push_str("/>");
    s
}

fn write_xf(style: &Style, ids: ResolvedXfIds) -> String {
    let mut attrs = String::new();
    if ids.num_fmt_id != 0 {
        attrs.push_str(" applyNumberFormat=\"1\"");
    }
    if style.font != FontStyle::default() {
        attrs.push_str(" applyFont=\"1\"");
    }
    if !style.fill.is_none() {
        attrs.push_str(" applyFill=\"1\"");
    }
    if !style.border.is_empty() {
        attrs.push_str(" applyBorder=\"1\"");
    }
    if !style.alignment.is_default() {
        attrs.push_str(" applyAlignment=\"1\"");
    }

    let head = format!(
        "<xf numFmtId=\"{}\" fontId=\"{}\" fillId=\"{}\" borderId=\"{}\" xfId=\"0\"{}",
        ids.num_fmt_id, ids.font_id, ids.fill_id, ids.border_id, attrs
    );
    if style.alignment.is_default() {
        format!("{head}/>")
    } else {
        format!("{head}>{}</xf>", write_alignment(&style.alignment))
    }
}

// === Reading ===

#[derive(Debug, Clone, Copy)]
enum Edge {
    Left,
    Right,
    Top,
    Bottom,
    Other,
}

#[derive(Debug, Clone, Copy, Default)]
struct XfIds {
    num_fmt_id: u32,
    font_id: u32,
    fill_id: u32,
    border_id: u32,
}

/// Tables collected while walking styles.xml
#[derive(Default)]
struct StyleSheetState {
    numfmts: HashMap<u32, String>,
    fonts: Vec<FontStyle>,
    fills: Vec<FillStyle>,
    borders: Vec<BorderStyle>,
    cell_xfs: Vec<Style>,

    font: Option<FontStyle>,
    fill: Option<(PatternType, Color, Color)>,
    border: Option<BorderStyle>,
    edge: Option<Edge>,
    in_cell_xfs: bool,
    xf: Option<(XfIds, Alignment)>,
}

impl StyleSheetState {
    /// Handle a start or empty tag. `empty` means no matching end tag follows.
    fn open(&mut self, e: &BytesStart<'_>, empty: bool) {
        match e.name().as_ref() {
            b"cellXfs" => self.in_cell_xfs = !empty,
            b"numFmt" => {
                let id = attr_value(e, b"numFmtId").and_then(|s| s.parse().ok());
                if let (Some(id), Some(code)) = (id, attr_value(e, b"formatCode")) {
                    self.numfmts.insert(id, code);
                }
            }
            b"font" => {
                self.font = Some(FontStyle::default());
                if empty {
                    self.close(b"font");
                }
            }
            b"b" | b"i" | b"strike" | b"u" | b"sz" | b"name" => {
                if let Some(font) = self.font.as_mut() {
                    apply_font_tag(font, e);
                }
            }
            b"fill" => {
                self.fill = Some((PatternType::None, Color::Auto, Color::Auto));
                if empty {
                    self.close(b"fill");
                }
            }
            b"patternFill" => {
                if let (Some(fill), Some(p)) = (
                    self.fill.as_mut(),
                    attr_value(e, b"patternType").and_then(|v| str_to_pattern_type(&v)),
                ) {
                    fill.0 = p;
                }
            }
            b"fgColor" => {
                if let Some(fill) = self.fill.as_mut() {
                    fill.1 = parse_color_attrs(e);
                }
            }
            b"bgColor" => {
                if let Some(fill) = self.fill.as_mut() {
                    fill.2 = parse_color_attrs(e);
                }
            }
            b"border" => {
                self.border = Some(BorderStyle::default());
                if empty {
                    self.close(b"border");
                }
            }
            tag @ (b"left" | b"right" | b"top" | b"bottom" | b"diagonal") => {
                let Some(border) = self.border.as_mut() else {
                    return;
                };
                let edge = match tag {
                    b"left" => Edge::Left,
                    b"right" => Edge::Right,
                    b"top" => Edge::Top,
                    b"bottom" => Edge::Bottom,
                    _ => Edge::Other,
                };
                let style = attr_value(e, b"style").and_then(|v| {
                    BORDER_NAMES
                        .iter()
                        .find(|(_, name)| *name == v)
                        .map(|(st, _)| *st)
                });
                if let Some(style) = style {
                    set_border_edge(
                        border,
                        edge,
                        Some(BorderEdge {
                            style,
                            color: Color::Auto,
                        }),
                    );
                }
                self.edge = if empty { None } else { Some(edge) };
            }
            b"color" => {
                let color = parse_color_attrs(e);
                if let Some(font) = self.font.as_mut() {
                    font.color = color;
                } else if let (Some(border), Some(edge)) = (self.border.as_mut(), self.edge) {
                    if let Some(slot) = border_edge_mut(border, edge) {
                        if let Some(existing) = slot.as_mut() {
                            existing.color = color;
                        }
                    }
                }
            }
            b"xf" if self.in_cell_xfs => {
                let id = |key: &[u8]| {
                    attr_value(e, key)
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(0)
                };
                let ids = XfIds {
                    num_fmt_id: id(b"numFmtId"),
                    font_id: id(b"fontId"),
                    fill_id: id(b"fillId"),
                    border_id: id(b"borderId"),
                };
                self.xf = Some((ids, Alignment::default()));
                if empty {
                    self.close(b"xf");
                }
            }
            b"alignment" => {
                if let Some((_, align)) = self.xf.as_mut() {
                    apply_alignment_attrs(align, e);
                }
            }
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"font" => {
                if let Some(f) = self.font.take() {
                    self.fonts.push(f);
                }
            }
            b"fill" => {
                if let Some((pattern, fg, bg)) = self.fill.take() {
                    // gray125 is the reserved second fill; it shades nothing
                    let fill = if pattern == PatternType::Gray125 {
                        FillStyle::None
                    } else {
                        FillStyle::from_parts(pattern, fg, bg)
                    };
                    self.fills.push(fill);
                }
            }
            b"border" => {
                if let Some(b) = self.border.take() {
                    self.borders.push(b);
                }
                self.edge = None;
            }
            b"left" | b"right" | b"top" | b"bottom" | b"diagonal" => self.edge = None,
            b"xf" => {
                if let Some((ids, align)) = self.xf.take() {
                    let style = self.resolve(ids, align);
                    self.cell_xfs.push(style);
                }
            }
            b"cellXfs" => self.in_cell_xfs = false,
            _ => {}
        }
    }

    fn resolve(&self, ids: XfIds, alignment: Alignment) -> Style {
        let number_format = if ids.num_fmt_id == 0 {
            NumberFormat::General
        } else if let Some(code) = self.numfmts.get(&ids.num_fmt_id) {
            NumberFormat::Custom(code.clone())
        } else {
            NumberFormat::BuiltIn(ids.num_fmt_id)
        };
        Style {
            font: self
                .fonts
                .get(ids.font_id as usize)
                .cloned()
                .unwrap_or_default(),
            fill: self
                .fills
                .get(ids.fill_id as usize)
                .copied()
                .unwrap_or_default(),
            border: self
                .borders
                .get(ids.border_id as usize)
                .copied()
                .unwrap_or_default(),
            alignment,
            number_format,
        }
    }
}

/// Read the cellXfs table of styles.xml; index = the `s` attribute of cells
pub(crate) fn read_styles_xml<R: Read>(reader: R) -> XlsxResult<Vec<Style>> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut state = StyleSheetState::default();
    let mut buf = Vec::new();
    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => state.open(&e, false),
            Ok(Event::Empty(e)) => state.open(&e, true),
            Ok(Event::End(e)) => state.close(e.name().as_ref()),
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    if state.cell_xfs.is_empty() {
        state.cell_xfs.push(Style::default());
    }
    Ok(state.cell_xfs)
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn apply_font_tag(font: &mut FontStyle, e: &BytesStart<'_>) {
    let val = attr_value(e, b"val");
    match e.name().as_ref() {
        b"b" => font.bold = val.as_deref() != Some("0"),
        b"i" => font.italic = val.as_deref() != Some("0"),
        b"strike" => font.strikethrough = val.as_deref() != Some("0"),
        b"u" => {
            font.underline = match val.as_deref() {
                Some("double") => Underline::Double,
                Some("singleAccounting") => Underline::SingleAccounting,
                Some("doubleAccounting") => Underline::DoubleAccounting,
                Some("none") => Underline::None,
                _ => Underline::Single,
            }
        }
        b"sz" => {
            if let Some(size) = val.and_then(|v| v.parse::<f64>().ok()) {
                font.size = size;
            }
        }
        b"name" => {
            if let Some(name) = val {
                font.name = name;
            }
        }
        _ => {}
    }
}

fn apply_alignment_attrs(align: &mut Alignment, e: &BytesStart<'_>) {
    for attr in e.attributes().flatten() {
        let Ok(val) = attr.unescape_value() else {
            continue;
        };
        match attr.key.as_ref() {
            b"horizontal" => {
                if let Some(i) = HORIZONTAL_NAMES.iter().position(|n| *n == val) {
                    align.horizontal = HorizontalAlignment::from_code(i as u8);
                }
            }
            b"vertical" => {
                if let Some(i) = VERTICAL_NAMES.iter().position(|n| *n == val) {
                    align.vertical = VerticalAlignment::from_code(i as u8);
                }
            }
            b"wrapText" => align.wrap_text = val == "1" || val == "true",
            b"indent" => align.indent = val.parse().unwrap_or(0),
            b"textRotation" => align.rotation = val.parse().unwrap_or(0),
            _ => {}
        }
    }
}

fn parse_color_attrs(e: &BytesStart<'_>) -> Color {
    // Priority: rgb > theme > indexed > auto
    if let Some(color) = attr_value(e, b"rgb").and_then(|rgb| Color::from_hex(&rgb)) {
        return color;
    }
    if let Some(index) = attr_value(e, b"theme").and_then(|s| s.parse::<u8>().ok()) {
        let tint = attr_value(e, b"tint")
            .and_then(|s| s.parse::<f64>().ok())
            .map_or(0, |t| (t * 100.0).round() as i8);
        return Color::Theme { index, tint };
    }
    match attr_value(e, b"indexed").and_then(|s| s.parse::<u8>().ok()) {
        // 64 is the system foreground, i.e. automatic
        Some(i) if i < 64 => Color::Indexed(i),
        _ => Color::Auto,
    }
}

fn border_edge_mut(border: &mut BorderStyle, edge: Edge) -> Option<&mut Option<BorderEdge>> {
    match edge {
        Edge::Left => Some(&mut border.left),
        Edge::Right => Some(&mut border.right),
        Edge::Top => Some(&mut border.top),
        Edge::Bottom => Some(&mut border.bottom),
        Edge::Other => None,
    }
}

fn set_border_edge(border: &mut BorderStyle, edge: Edge, val: Option<BorderEdge>) {
    if let Some(slot) = border_edge_mut(border, edge) {
        *slot = val;
    }
}
