//! Errors raised by the workbook model

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Why a workbook edit or conversion was refused
#[derive(Debug, Error)]
pub enum Error {
    /// Text that is not an `A1` style reference
    #[error("bad cell reference: {0}")]
    InvalidAddress(String),

    /// Row index past the last row a sheet can hold
    #[error("row {0} is past the last row {1}")]
    RowOutOfBounds(u32, u32),

    /// Column index past the last column a sheet can hold
    #[error("column {0} is past the last column {1}")]
    ColumnOutOfBounds(u16, u16),

    /// Sheet position past the end of the workbook
    #[error("no sheet at position {0}, workbook has {1}")]
    SheetOutOfBounds(usize, usize),

    #[error("sheet name rejected: {0}")]
    InvalidSheetName(String),

    /// Another sheet already has this name, ignoring case
    #[error("sheet '{0}' already exists")]
    DuplicateSheetName(String),

    /// Serial outside the range of calendar dates
    #[error("{0} is not a date serial")]
    InvalidDateSerial(f64),

    /// Calendar date chrono cannot represent
    #[error("no such date {0}-{1:02}-{2:02}")]
    InvalidDate(i32, u32, u32),

    /// Merge overlapping an existing merged range
    #[error("{0} overlaps a merged range")]
    MergedCellConflict(String),
}
