//! End-to-end tests for tabstore-xlsx.
//!
//! Each test builds a workbook in memory, writes it to a temp file with
//! `XlsxWriter`, reads it back with `XlsxReader` and asserts on the result.

mod common;
mod round_trip;

pub use common::*;
