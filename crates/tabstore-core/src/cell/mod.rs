//! Cell-related types
//!
//! - [`CellValue`] - The value stored in a cell
//! - [`CellAddress`] / [`CellRange`] - Locations such as "A1" and "A1:B10"
//! - [`CellData`] - Value plus style index
//! - [`CellStorage`] - Sparse row-major storage behind a worksheet

mod address;
mod storage;
mod value;

pub use address::{CellAddress, CellRange};
pub use storage::{CellData, CellStorage};
pub use value::{CellError, CellValue, SharedString};
