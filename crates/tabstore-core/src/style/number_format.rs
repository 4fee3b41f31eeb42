//! Number format types

/// How a numeric cell is displayed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum NumberFormat {
    #[default]
    General,

    /// Built-in format id (0..=49)
    BuiltIn(u32),

    /// Custom format code
    Custom(String),
}

impl NumberFormat {
    pub const ID_GENERAL: u32 = 0;
    pub const ID_DATE_SHORT: u32 = 14;
    pub const ID_TEXT: u32 = 49;

    /// Built-in short date (`m/d/yy` in the US locale)
    pub fn date_short() -> Self {
        NumberFormat::BuiltIn(Self::ID_DATE_SHORT)
    }

    /// Built-in id for a format code, if it matches one
    pub fn builtin_id_for(code: &str) -> Option<u32> {
        (0..=49).find(|&id| builtin_code(id) == Some(code))
    }

    /// Check if the format displays a date or time
    ///
    /// Custom codes count as dates when a date/time token appears outside
    /// quoted literals, escaped characters and `[...]` sections (colors,
    /// conditions, locales). Elapsed-time brackets like `[h]` count.
    pub fn is_date_format(&self) -> bool {
        match self {
            NumberFormat::General => false,
            NumberFormat::BuiltIn(id) => matches!(id, 14..=22 | 45..=47),
            NumberFormat::Custom(code) => is_date_code(code),
        }
    }
}

fn builtin_code(id: u32) -> Option<&'static str> {
    Some(match id {
        0 => "General",
        1 => "0",
        2 => "0.00",
        3 => "#,##0",
        4 => "#,##0.00",
        9 => "0%",
        10 => "0.00%",
        11 => "0.00E+00",
        12 => "# ?/?",
        13 => "# ??/??",
        14 => "m/d/yy",
        15 => "d-mmm-yy",
        16 => "d-mmm",
        17 => "mmm-yy",
        18 => "h:mm AM/PM",
        19 => "h:mm:ss AM/PM",
        20 => "h:mm",
        21 => "h:mm:ss",
        22 => "m/d/yy h:mm",
        37 => "#,##0 ;(#,##0)",
        38 => "#,##0 ;[Red](#,##0)",
        39 => "#,##0.00;(#,##0.00)",
        40 => "#,##0.00;[Red](#,##0.00)",
        45 => "mm:ss",
        46 => "[h]:mm:ss",
        47 => "mmss.0",
        48 => "##0.0E+0",
        49 => "@",
        _ => return None,
    })
}

fn is_date_code(code: &str) -> bool {
    // Only the first section decides how positive numbers look
    let mut chars = code.chars().peekable();
    let mut in_quotes = false;

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                in_quotes = false;
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            '\\' | '_' | '*' => {
                chars.next();
            }
            ';' => return false,
            '[' => {
                let mut section = String::new();
                for inner in chars.by_ref() {
                    if inner == ']' {
                        break;
                    }
                    section.push(inner.to_ascii_lowercase());
                }
                if !section.is_empty() && section.chars().all(|ch| matches!(ch, 'h' | 'm' | 's')) {
                    return true;
                }
            }
            'y' | 'Y' | 'd' | 'D' | 'm' | 'M' | 'h' | 'H' | 's' | 'S' => return true,
            _ => {}
        }
    }
    false
}
