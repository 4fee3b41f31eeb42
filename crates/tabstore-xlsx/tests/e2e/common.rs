//! Common utilities for E2E tests.

use std::path::PathBuf;

use tabstore_core::Workbook;
use tabstore_xlsx::{XlsxReader, XlsxWriter};
use tempfile::TempDir;

/// A temp directory that lives as long as the returned guard
pub fn temp_xlsx_path() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("book.xlsx");
    (dir, path)
}

/// Write `workbook` to disk and read it back
pub fn round_trip(workbook: &Workbook) -> Workbook {
    let (_dir, path) = temp_xlsx_path();
    XlsxWriter::write_file(workbook, &path).expect("write xlsx");
    XlsxReader::read_file(&path).expect("read xlsx")
}
