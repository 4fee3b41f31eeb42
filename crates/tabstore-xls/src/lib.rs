//! # tabstore-xls
//!
//! XLS (BIFF8) reader and writer for tabstore.
//!
//! This crate handles the legacy Excel binary format (.xls): a BIFF8 record
//! stream stored as `/Workbook` inside a Compound File Binary container.
//!
//! Formulas are read and written by their cached result only; the token
//! stream is not decoded or compiled.

pub mod biff;
pub mod error;
pub mod reader;
pub mod writer;

mod styles;

pub use error::{XlsError, XlsResult};
pub use reader::XlsReader;
pub use writer::XlsWriter;
