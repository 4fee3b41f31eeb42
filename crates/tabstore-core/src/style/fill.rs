//! Fill/background style types

use super::Color;

/// Cell background
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FillStyle {
    #[default]
    None,

    /// Solid fill in one color
    Solid { color: Color },

    /// Two-color pattern
    Pattern {
        pattern: PatternType,
        foreground: Color,
        background: Color,
    },
}

impl FillStyle {
    /// Create a solid fill
    pub fn solid(color: Color) -> Self {
        FillStyle::Solid { color }
    }

    /// Check if there is no fill
    pub fn is_none(&self) -> bool {
        matches!(self, FillStyle::None)
    }

    /// Pattern plus foreground and background, solid fills included
    pub fn parts(&self) -> (PatternType, Color, Color) {
        match *self {
            FillStyle::None => (PatternType::None, Color::Auto, Color::Auto),
            FillStyle::Solid { color } => (PatternType::Solid, color, Color::Auto),
            FillStyle::Pattern {
                pattern,
                foreground,
                background,
            } => (pattern, foreground, background),
        }
    }

    /// Inverse of [`FillStyle::parts`]
    pub fn from_parts(pattern: PatternType, foreground: Color, background: Color) -> Self {
        match pattern {
            PatternType::None => FillStyle::None,
            PatternType::Solid => FillStyle::Solid { color: foreground },
            _ => FillStyle::Pattern {
                pattern,
                foreground,
                background,
            },
        }
    }
}

/// Fill patterns, in the order both formats number them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PatternType {
    #[default]
    None,
    Solid,
    MediumGray,
    DarkGray,
    LightGray,
    DarkHorizontal,
    DarkVertical,
    DarkDown,
    DarkUp,
    DarkGrid,
    DarkTrellis,
    LightHorizontal,
    LightVertical,
    LightDown,
    LightUp,
    LightGrid,
    LightTrellis,
    Gray125,
    Gray0625,
}

impl PatternType {
    const ALL: [PatternType; 19] = [
        PatternType::None,
        PatternType::Solid,
        PatternType::MediumGray,
        PatternType::DarkGray,
        PatternType::LightGray,
        PatternType::DarkHorizontal,
        PatternType::DarkVertical,
        PatternType::DarkDown,
        PatternType::DarkUp,
        PatternType::DarkGrid,
        PatternType::DarkTrellis,
        PatternType::LightHorizontal,
        PatternType::LightVertical,
        PatternType::LightDown,
        PatternType::LightUp,
        PatternType::LightGrid,
        PatternType::LightTrellis,
        PatternType::Gray125,
        PatternType::Gray0625,
    ];

    /// Numeric pattern code (0 = none, 1 = solid, ...)
    pub fn code(self) -> u8 {
        Self::ALL.iter().position(|p| *p == self).unwrap_or(0) as u8
    }

    /// Inverse of [`PatternType::code`]; unknown codes read as solid
    pub fn from_code(code: u8) -> Self {
        Self::ALL
            .get(code as usize)
            .copied()
            .unwrap_or(PatternType::Solid)
    }
}
