//! Error types for the store

use thiserror::Error;

use tabstore_xls::XlsError;
use tabstore_xlsx::XlsxError;

/// Result type alias using [`StoreError`]
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors raised while opening, decoding or persisting a store
///
/// These never cross the `TabularDataStore` boundary; the store logs them
/// and answers with its not-found value instead.
#[derive(Debug, Error)]
pub enum StoreError {
    /// File extension is neither `.xlsx` nor `.xls`
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// XLSX codec error
    #[error("XLSX error: {0}")]
    Xlsx(#[from] XlsxError),

    /// XLS codec error
    #[error("XLS error: {0}")]
    Xls(#[from] XlsError),

    /// Workbook model error
    #[error(transparent)]
    Core(#[from] tabstore_core::Error),

    /// A write the file format cannot hold
    #[error("Out of format limits: {0}")]
    Limit(String),

    /// Malformed store options
    #[error("Invalid store options: {0}")]
    Config(#[from] serde_json::Error),

    /// The store failed to open
    #[error("Store is unusable: {0}")]
    Unusable(String),
}
