//! # tabstore
//!
//! Spreadsheet files as named tables of strings.
//!
//! A [`TabularDataStore`] opens an `.xlsx` or `.xls` file, treats row 0 of
//! each sheet as the header row, and reads or writes cells by sheet name,
//! column name (or 1-based index) and 1-based row number. Every value comes
//! back as text; dates render as `M/D/YY`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tabstore::prelude::*;
//!
//! let mut store = TabularDataStore::open("testdata/users.xlsx");
//! if store.is_usable() {
//!     let email = store.cell("Users", "Email", 1);
//!     let row = store.find_row_by_value("Users", "Name", "Ann");
//!     store.set_cell("Users", "Status", row, "checked");
//!     println!("{email}");
//! }
//! ```

pub mod error;
pub mod format;
pub mod options;
pub mod prelude;
pub mod render;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use format::FileFormat;
pub use options::{PersistMode, StoreOptions};
pub use render::render_value;
pub use store::{header_style, link_style, ColumnRef, TabularDataStore};

// Re-export the workbook model and codecs
pub use tabstore_core::{
    CellError, CellRange, CellValue, Color, FillStyle, Hyperlink, HyperlinkTarget, NumberFormat,
    Style, Underline, Workbook, Worksheet,
};
pub use tabstore_xls::{XlsError, XlsReader, XlsWriter};
pub use tabstore_xlsx::{XlsxError, XlsxReader, XlsxWriter};
