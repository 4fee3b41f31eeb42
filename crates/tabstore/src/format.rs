//! File format dispatch by extension

use std::path::Path;

use tabstore_core::{Workbook, MAX_COLS, MAX_ROWS};
use tabstore_xls::biff::{records, strings};
use tabstore_xls::{XlsReader, XlsWriter};
use tabstore_xlsx::{XlsxReader, XlsxWriter};

use crate::error::{StoreError, StoreResult};

/// On-disk spreadsheet format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Zipped SpreadsheetML (`.xlsx`)
    Xlsx,
    /// BIFF8 in a compound file (`.xls`)
    Xls,
}

impl FileFormat {
    /// Pick the format from a path's extension (case-insensitive)
    pub fn from_path(path: &Path) -> StoreResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension.as_deref() {
            Some("xlsx") => Ok(FileFormat::Xlsx),
            Some("xls") => Ok(FileFormat::Xls),
            _ => Err(StoreError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Rows a sheet of this format can hold
    pub fn max_rows(self) -> u32 {
        match self {
            FileFormat::Xlsx => MAX_ROWS,
            FileFormat::Xls => records::MAX_ROWS,
        }
    }

    /// Columns a sheet of this format can hold
    pub fn max_cols(self) -> u16 {
        match self {
            FileFormat::Xlsx => MAX_COLS,
            FileFormat::Xls => records::MAX_COLS,
        }
    }

    /// Longest cell text, in UTF-16 code units
    pub fn max_text_len(self) -> usize {
        strings::MAX_CELL_TEXT
    }

    /// Reject a cell the writer for this format would refuse later
    pub fn check_cell(self, row: u32, col: u16, text: Option<&str>) -> StoreResult<()> {
        if row >= self.max_rows() {
            return Err(StoreError::Limit(format!(
                "row {} is past the last row ({}) of {self:?}",
                row + 1,
                self.max_rows()
            )));
        }
        if col >= self.max_cols() {
            return Err(StoreError::Limit(format!(
                "column {} is past the last column ({}) of {self:?}",
                col as u32 + 1,
                self.max_cols()
            )));
        }
        if let Some(text) = text {
            let len = text.encode_utf16().count();
            if len > self.max_text_len() {
                return Err(StoreError::Limit(format!(
                    "text of {len} characters exceeds {}",
                    self.max_text_len()
                )));
            }
        }
        Ok(())
    }

    /// Read a workbook
    pub fn read(self, path: &Path) -> StoreResult<Workbook> {
        match self {
            FileFormat::Xlsx => Ok(XlsxReader::read_file(path)?),
            FileFormat::Xls => Ok(XlsReader::read_file(path)?),
        }
    }

    /// Write a workbook, replacing the file
    pub fn write(self, workbook: &Workbook, path: &Path) -> StoreResult<()> {
        match self {
            FileFormat::Xlsx => XlsxWriter::write_file(workbook, path)?,
            FileFormat::Xls => XlsWriter::write_file(workbook, path)?,
        }
        Ok(())
    }
}
