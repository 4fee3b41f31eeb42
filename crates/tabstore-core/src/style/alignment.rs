//! Text alignment types

/// Text placement inside a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Alignment {
    pub horizontal: HorizontalAlignment,
    pub vertical: VerticalAlignment,
    pub wrap_text: bool,
    /// Indent level
    pub indent: u8,
    /// Rotation in degrees (-90..=90), or 255 for stacked text
    pub rotation: i16,
}

impl Alignment {
    /// Check if this is the default alignment
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HorizontalAlignment {
    #[default]
    General,
    Left,
    Center,
    Right,
    Fill,
    Justify,
    CenterContinuous,
    Distributed,
}

impl HorizontalAlignment {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Self::Left,
            2 => Self::Center,
            3 => Self::Right,
            4 => Self::Fill,
            5 => Self::Justify,
            6 => Self::CenterContinuous,
            7 => Self::Distributed,
            _ => Self::General,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VerticalAlignment {
    Top,
    Center,
    #[default]
    Bottom,
    Justify,
    Distributed,
}

impl VerticalAlignment {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Top,
            1 => Self::Center,
            3 => Self::Justify,
            4 => Self::Distributed,
            _ => Self::Bottom,
        }
    }
}
