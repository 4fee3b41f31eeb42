//! End-to-end tests for tabstore-xls.
//!
//! Each test builds a workbook in memory, writes it to a temp file with
//! `XlsWriter`, reads it back with `XlsReader` and asserts on the result.

mod common;
mod round_trip;

pub use common::*;
