//! # tabstore-xlsx
//!
//! XLSX (Office Open XML) reader and writer for tabstore workbooks.
//!
//! Only the parts a table store needs survive a round trip: cell values
//! (formulas keep their text and cached result), cell styles, column widths,
//! merged regions, hyperlinks, empty rows and the workbook date system.

pub mod error;
pub mod reader;
pub mod writer;

mod styles;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
pub use writer::XlsxWriter;
