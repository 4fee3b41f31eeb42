//! Common utilities for E2E tests.

use std::path::PathBuf;

use tabstore::TabularDataStore;
use tempfile::TempDir;

/// Both supported extensions
pub const EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

/// A fresh file path with the given extension; the guard owns the directory
pub fn temp_book(extension: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join(format!("book.{extension}"));
    (dir, path)
}

/// A store holding sheet `Users` with header `[Name, Email]` and one row `[Ann, ann@x.com]`
pub fn users_book(extension: &str) -> (TempDir, PathBuf) {
    let (dir, path) = temp_book(extension);
    let mut store = TabularDataStore::create(&path).expect("create store");
    assert!(store.add_sheet("Users"));
    assert!(store.set_cell("Users", "Name", 1, "Ann"));
    assert!(store.set_cell("Users", "Email", 1, "ann@x.com"));
    (dir, path)
}
