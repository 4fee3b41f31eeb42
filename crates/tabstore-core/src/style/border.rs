//! Border style types

use super::Color;

/// The four cell edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BorderStyle {
    pub left: Option<BorderEdge>,
    pub right: Option<BorderEdge>,
    pub top: Option<BorderEdge>,
    pub bottom: Option<BorderEdge>,
}

impl BorderStyle {
    /// Same edge on all four sides
    pub fn all(style: BorderLineStyle, color: Color) -> Self {
        let edge = Some(BorderEdge { style, color });
        Self {
            left: edge,
            right: edge,
            top: edge,
            bottom: edge,
        }
    }

    /// Check if no edge is drawn
    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none() && self.top.is_none() && self.bottom.is_none()
    }
}

/// One edge of a cell border
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BorderEdge {
    pub style: BorderLineStyle,
    pub color: Color,
}

/// Line styles, numbered as in both formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BorderLineStyle {
    #[default]
    None,
    Thin,
    Medium,
    Dashed,
    Dotted,
    Thick,
    Double,
    Hair,
    MediumDashed,
    DashDot,
    MediumDashDot,
    DashDotDot,
    MediumDashDotDot,
    SlantDashDot,
}

impl BorderLineStyle {
    /// Numeric line code (0 = none ... 13 = slant dash-dot)
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Inverse of [`BorderLineStyle::code`]
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Self::Thin,
            2 => Self::Medium,
            3 => Self::Dashed,
            4 => Self::Dotted,
            5 => Self::Thick,
            6 => Self::Double,
            7 => Self::Hair,
            8 => Self::MediumDashed,
            9 => Self::DashDot,
            10 => Self::MediumDashDot,
            11 => Self::DashDotDot,
            12 => Self::MediumDashDotDot,
            13 => Self::SlantDashDot,
            _ => Self::None,
        }
    }
}
