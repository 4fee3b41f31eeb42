//! What a cell holds

use std::fmt;
use std::sync::Arc;

/// Content of one cell
///
/// Dates have no variant of their own: they are numbers whose cell style
/// carries a date format.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Boolean(bool),
    Number(f64),
    String(SharedString),
    /// Error literal such as `#DIV/0!`
    Error(CellError),
    /// Formula text (no leading `=`) and the result the producing
    /// application last computed, if the file kept it
    Formula {
        text: String,
        cached_value: Option<Box<CellValue>>,
    },
}

impl CellValue {
    pub fn string<S: Into<String>>(s: S) -> Self {
        CellValue::String(SharedString::from(s.into()))
    }

    pub fn formula<S: Into<String>>(text: S) -> Self {
        CellValue::Formula {
            text: text.into(),
            cached_value: None,
        }
    }

    pub fn formula_with_cache<S: Into<String>>(text: S, cached: CellValue) -> Self {
        CellValue::Formula {
            text: text.into(),
            cached_value: Some(Box::new(cached)),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// What a reader of the file sees: the cached result for formulas
    /// that have one, the value itself otherwise
    pub fn effective_value(&self) -> &CellValue {
        match self {
            CellValue::Formula {
                cached_value: Some(cached),
                ..
            } => cached.effective_value(),
            other => other,
        }
    }

    /// Text of a string cell, or of a formula's cached string result
    pub fn as_string(&self) -> Option<&str> {
        match self.effective_value() {
            CellValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::string(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::string(s)
    }
}

impl From<CellError> for CellValue {
    fn from(e: CellError) -> Self {
        CellValue::Error(e)
    }
}

/// Error literals both file formats can store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellError {
    Null,
    Div0,
    Value,
    Ref,
    Name,
    Num,
    Na,
}

/// Literal and BIFF code of every [`CellError`]
const ERROR_TABLE: [(CellError, &str, u8); 7] = [
    (CellError::Null, "#NULL!", 0x00),
    (CellError::Div0, "#DIV/0!", 0x07),
    (CellError::Value, "#VALUE!", 0x0F),
    (CellError::Ref, "#REF!", 0x17),
    (CellError::Name, "#NAME?", 0x1D),
    (CellError::Num, "#NUM!", 0x24),
    (CellError::Na, "#N/A", 0x2A),
];

impl CellError {
    fn entry(self) -> (CellError, &'static str, u8) {
        ERROR_TABLE
            .into_iter()
            .find(|(e, _, _)| *e == self)
            .unwrap_or(ERROR_TABLE[2])
    }

    /// The literal as a spreadsheet shows it
    pub fn as_str(self) -> &'static str {
        self.entry().1
    }

    /// Parse a literal, ignoring case and surrounding blanks
    pub fn from_literal(text: &str) -> Option<Self> {
        let text = text.trim();
        ERROR_TABLE
            .into_iter()
            .find(|(_, literal, _)| literal.eq_ignore_ascii_case(text))
            .map(|(e, _, _)| e)
    }

    pub fn biff_code(self) -> u8 {
        self.entry().2
    }

    /// Unknown codes read as `#VALUE!`
    pub fn from_biff_code(code: u8) -> Self {
        ERROR_TABLE
            .into_iter()
            .find(|(_, _, c)| *c == code)
            .map_or(CellError::Value, |(e, _, _)| e)
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cell text, cheap to clone between cells that repeat it
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SharedString(Arc<str>);

impl SharedString {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SharedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl AsRef<str> for SharedString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SharedString {
    fn from(s: &str) -> Self {
        SharedString(Arc::from(s))
    }
}

impl From<String> for SharedString {
    fn from(s: String) -> Self {
        SharedString(Arc::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formula_reads_through_cache() {
        let cached = CellValue::formula_with_cache("A1&\"x\"", CellValue::string("ax"));
        assert_eq!(cached.effective_value(), &CellValue::string("ax"));
        assert_eq!(cached.as_string(), Some("ax"));

        let bare = CellValue::formula("NOW()");
        assert_eq!(bare.effective_value(), &bare);
        assert_eq!(bare.as_string(), None);
        assert_eq!(CellValue::from(2.5).as_string(), None);
    }

    #[test]
    fn test_error_literals() {
        assert_eq!(CellError::from_literal("#DIV/0!"), Some(CellError::Div0));
        assert_eq!(CellError::from_literal(" #n/a "), Some(CellError::Na));
        assert_eq!(CellError::from_literal("#name?"), Some(CellError::Name));
        assert_eq!(CellError::from_literal("oops"), None);
        assert_eq!(CellError::Ref.to_string(), "#REF!");
    }

    #[test]
    fn test_error_biff_codes() {
        for (err, literal, code) in ERROR_TABLE {
            assert_eq!(err.as_str(), literal);
            assert_eq!(err.biff_code(), code);
            assert_eq!(CellError::from_biff_code(code), err);
        }
        assert_eq!(CellError::from_biff_code(0x99), CellError::Value);
    }

    #[test]
    fn test_shared_string_debug_matches_str() {
        let s = SharedString::from("a\"b");
        assert_eq!(format!("{s:?}"), format!("{:?}", "a\"b"));
    }
}
