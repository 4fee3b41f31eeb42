//! Errors from the xlsx codec

use thiserror::Error;

pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Why a package could not be read or written
#[derive(Debug, Error)]
pub enum XlsxError {
    #[error("xlsx io: {0}")]
    Io(#[from] std::io::Error),

    /// Broken zip container
    #[error("xlsx container: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Malformed XML in one of the parts
    #[error("xlsx xml: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Not a SpreadsheetML package, or a workbook no package can hold
    #[error("not a valid xlsx package: {0}")]
    InvalidFormat(String),

    /// A part the workbook refers to is absent from the zip
    #[error("xlsx part {0} is missing")]
    MissingPart(String),

    /// Well-formed XML with content that makes no sense, such as a
    /// shared string index past the table
    #[error("bad xlsx content: {0}")]
    Parse(String),

    /// The decoded content breaks a workbook rule
    #[error(transparent)]
    Core(#[from] tabstore_core::Error),
}
