//! Cell rendering
//!
//! Every cell read through the store comes back as text. Numbers whose
//! style carries a date format render as `M/D/YY`, except negative ones,
//! which have no calendar date and render as plain numbers. Formulas render
//! their cached result and are never evaluated.

use tabstore_core::date::serial_to_date;
use tabstore_core::{CellValue, Result, Style};

/// Render a cell value as the store reports it
pub fn render_value(value: &CellValue, style: &Style, date_1904: bool) -> Result<String> {
    match value {
        CellValue::Empty => Ok(String::new()),
        CellValue::String(s) => Ok(s.as_str().trim().to_string()),
        CellValue::Number(n) if style.is_date() && (n.is_nan() || *n >= 0.0) => {
            Ok(serial_to_date(*n, date_1904)?.to_short_string())
        }
        CellValue::Number(n) => Ok(render_number(*n)),
        CellValue::Boolean(b) => Ok(b.to_string()),
        CellValue::Error(e) => Ok(e.as_str().to_string()),
        CellValue::Formula { cached_value, .. } => match cached_value.as_deref() {
            None => Ok(String::new()),
            Some(CellValue::Error(e)) => Ok(format!("FormulaError: {}", e.as_str())),
            Some(cached) => render_value(cached, style, date_1904),
        },
    }
}

/// Integral numbers without a fractional part, others in shortest round-trip form
pub fn render_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
