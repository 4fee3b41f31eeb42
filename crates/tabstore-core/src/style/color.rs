//! Color representation

use std::fmt;

/// A color as it appears in either file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// Application default (usually black text, no fill)
    #[default]
    Auto,

    /// Explicit RGB color
    Rgb { r: u8, g: u8, b: u8 },

    /// RGB with alpha, as written in `AARRGGBB` attributes
    Argb { a: u8, r: u8, g: u8, b: u8 },

    /// Theme color slot with a tint in percent (-100..=100)
    Theme { index: u8, tint: i8 },

    /// Entry in the legacy 64-color palette
    Indexed(u8),
}

/// Legacy palette. Entries 0..8 repeat the first eight colors of 8..64.
const PALETTE: [(u8, u8, u8); 64] = [
    (0x00, 0x00, 0x00),
    (0xFF, 0xFF, 0xFF),
    (0xFF, 0x00, 0x00),
    (0x00, 0xFF, 0x00),
    (0x00, 0x00, 0xFF),
    (0xFF, 0xFF, 0x00),
    (0xFF, 0x00, 0xFF),
    (0x00, 0xFF, 0xFF),
    (0x00, 0x00, 0x00),
    (0xFF, 0xFF, 0xFF),
    (0xFF, 0x00, 0x00),
    (0x00, 0xFF, 0x00),
    (0x00, 0x00, 0xFF),
    (0xFF, 0xFF, 0x00),
    (0xFF, 0x00, 0xFF),
    (0x00, 0xFF, 0xFF),
    (0x80, 0x00, 0x00),
    (0x00, 0x80, 0x00),
    (0x00, 0x00, 0x80),
    (0x80, 0x80, 0x00),
    (0x80, 0x00, 0x80),
    (0x00, 0x80, 0x80),
    (0xC0, 0xC0, 0xC0),
    (0x80, 0x80, 0x80),
    (0x99, 0x99, 0xFF),
    (0x99, 0x33, 0x66),
    (0xFF, 0xFF, 0xCC),
    (0xCC, 0xFF, 0xFF),
    (0x66, 0x00, 0x66),
    (0xFF, 0x80, 0x80),
    (0x00, 0x66, 0xCC),
    (0xCC, 0xCC, 0xFF),
    (0x00, 0x00, 0x80),
    (0xFF, 0x00, 0xFF),
    (0xFF, 0xFF, 0x00),
    (0x00, 0xFF, 0xFF),
    (0x80, 0x00, 0x80),
    (0x80, 0x00, 0x00),
    (0x00, 0x80, 0x80),
    (0x00, 0x00, 0xFF),
    (0x00, 0xCC, 0xFF),
    (0xCC, 0xFF, 0xFF),
    (0xCC, 0xFF, 0xCC),
    (0xFF, 0xFF, 0x99),
    (0x99, 0xCC, 0xFF),
    (0xFF, 0x99, 0xCC),
    (0xCC, 0x99, 0xFF),
    (0xFF, 0xCC, 0x99),
    (0x33, 0x66, 0xFF),
    (0x33, 0xCC, 0xCC),
    (0x99, 0xCC, 0x00),
    (0xFF, 0xCC, 0x00),
    (0xFF, 0x99, 0x00),
    (0xFF, 0x66, 0x00),
    (0x66, 0x66, 0x99),
    (0x96, 0x96, 0x96),
    (0x00, 0x33, 0x66),
    (0x33, 0x99, 0x66),
    (0x00, 0x33, 0x00),
    (0x33, 0x33, 0x00),
    (0x99, 0x33, 0x00),
    (0x99, 0x33, 0x66),
    (0x33, 0x33, 0x99),
    (0x33, 0x33, 0x33),
];

impl Color {
    /// Palette blue, used for hyperlink text
    pub const INDEXED_BLUE: Color = Color::Indexed(12);
    /// Palette "grey 40%", used for header fills
    pub const INDEXED_GREY_40: Color = Color::Indexed(55);

    pub const BLACK: Color = Color::Rgb { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color::Rgb {
        r: 255,
        g: 255,
        b: 255,
    };
    pub const RED: Color = Color::Rgb { r: 255, g: 0, b: 0 };

    /// Create an RGB color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb { r, g, b }
    }

    /// Parse `RRGGBB` or `AARRGGBB`, with or without a leading `#`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();

        match hex.len() {
            6 => Some(Color::Rgb {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
            }),
            8 => Some(Color::Argb {
                a: byte(0)?,
                r: byte(2)?,
                g: byte(4)?,
                b: byte(6)?,
            }),
            _ => None,
        }
    }

    /// Format as `AARRGGBB`
    pub fn to_argb_hex(&self) -> String {
        match self {
            Color::Argb { a, r, g, b } => format!("{:02X}{:02X}{:02X}{:02X}", a, r, g, b),
            other => {
                let (r, g, b) = other.to_rgb();
                format!("FF{:02X}{:02X}{:02X}", r, g, b)
            }
        }
    }

    /// Resolve to RGB using the default palette and theme
    pub fn to_rgb(&self) -> (u8, u8, u8) {
        match self {
            Color::Auto => (0, 0, 0),
            Color::Rgb { r, g, b } | Color::Argb { r, g, b, .. } => (*r, *g, *b),
            Color::Theme { index, tint } => apply_tint(theme_rgb(*index), *tint),
            Color::Indexed(i) => palette_rgb(*i).unwrap_or((0, 0, 0)),
        }
    }

    /// Check if this is the automatic color
    pub fn is_auto(&self) -> bool {
        matches!(self, Color::Auto)
    }

    /// Closest palette index in 8..64, for formats that only store indices
    pub fn nearest_indexed(&self) -> u8 {
        if let Color::Indexed(i) = self {
            if (8..64).contains(i) {
                return *i;
            }
            if *i < 8 {
                return i + 8;
            }
        }

        let (r, g, b) = self.to_rgb();
        let mut best = 8u8;
        let mut best_dist = u32::MAX;
        for (i, &(pr, pg, pb)) in PALETTE.iter().enumerate().skip(8) {
            let dr = (r as i32 - pr as i32).unsigned_abs();
            let dg = (g as i32 - pg as i32).unsigned_abs();
            let db = (b as i32 - pb as i32).unsigned_abs();
            let dist = dr * dr + dg * dg + db * db;
            if dist < best_dist {
                best_dist = dist;
                best = i as u8;
            }
        }
        best
    }
}

/// RGB of a palette entry, `None` outside 0..64
pub fn palette_rgb(index: u8) -> Option<(u8, u8, u8)> {
    PALETTE.get(index as usize).copied()
}

fn theme_rgb(index: u8) -> (u8, u8, u8) {
    match index {
        0 => (255, 255, 255),
        1 => (0, 0, 0),
        2 => (238, 236, 225),
        3 => (31, 73, 125),
        4 => (79, 129, 189),
        5 => (192, 80, 77),
        6 => (155, 187, 89),
        7 => (128, 100, 162),
        8 => (75, 172, 198),
        9 => (247, 150, 70),
        _ => (0, 0, 0),
    }
}

fn apply_tint(color: (u8, u8, u8), tint: i8) -> (u8, u8, u8) {
    let t = tint as f64 / 100.0;
    let apply = |c: u8| -> u8 {
        let c = c as f64;
        let out = if t < 0.0 { c * (1.0 + t) } else { c + (255.0 - c) * t };
        out.clamp(0.0, 255.0) as u8
    };
    (apply(color.0), apply(color.1), apply(color.2))
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Auto => write!(f, "auto"),
            Color::Rgb { r, g, b } => write!(f, "#{:02X}{:02X}{:02X}", r, g, b),
            Color::Argb { a, r, g, b } => write!(f, "#{:02X}{:02X}{:02X}{:02X}", a, r, g, b),
            Color::Theme { index, tint } => write!(f, "theme({}, {}%)", index, tint),
            Color::Indexed(i) => write!(f, "indexed({})", i),
        }
    }
}
