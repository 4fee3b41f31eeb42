//! # tabstore-core
//!
//! In-memory workbook model shared by the tabstore codecs:
//! - [`CellValue`] - cell values (numbers, strings, booleans, errors, formulas)
//! - [`CellAddress`] and [`CellRange`] - cell addressing
//! - [`Style`] - cell formatting, deduplicated per sheet in a [`StylePool`]
//! - [`Hyperlink`] - links attached to cells
//! - [`Workbook`], [`Worksheet`] - the document structures
//! - [`date`] - conversion between date serials and calendar dates
//!
//! ## Example
//!
//! ```rust
//! use tabstore_core::{CellValue, Hyperlink, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//!
//! sheet.set_cell_value_at(0, 0, "Name").unwrap();
//! sheet.set_cell_value_at(1, 0, CellValue::string("Ann")).unwrap();
//! sheet
//!     .set_hyperlink_at(1, 0, Hyperlink::url("https://example.com"))
//!     .unwrap();
//!
//! assert_eq!(sheet.last_row(), Some(1));
//! ```

pub mod cell;
pub mod date;
pub mod error;
pub mod hyperlink;
pub mod style;
pub mod workbook;
pub mod worksheet;

pub use cell::{CellAddress, CellData, CellError, CellRange, CellValue, SharedString};
pub use error::{Error, Result};
pub use hyperlink::{Hyperlink, HyperlinkTarget};
pub use workbook::{Workbook, WorkbookSettings};
pub use worksheet::Worksheet;

pub use style::{
    Alignment, BorderEdge, BorderLineStyle, BorderStyle, Color, FillStyle, FontStyle,
    HorizontalAlignment, NumberFormat, PatternType, Style, StylePool, Underline,
    VerticalAlignment,
};

/// Maximum number of rows in a worksheet
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name, in characters
pub const MAX_SHEET_NAME_LEN: usize = 31;
