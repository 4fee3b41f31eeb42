//! Common utilities for E2E tests.

use std::path::PathBuf;

use tabstore_core::Workbook;
use tabstore_xls::{XlsReader, XlsWriter};
use tempfile::TempDir;

/// A temp directory that lives as long as the returned guard
pub fn temp_xls_path() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("book.xls");
    (dir, path)
}

/// Write `workbook` to disk and read it back
pub fn round_trip(workbook: &Workbook) -> Workbook {
    let (_dir, path) = temp_xls_path();
    XlsWriter::write_file(workbook, &path).expect("write xls");
    XlsReader::read_file(&path).expect("read xls")
}
