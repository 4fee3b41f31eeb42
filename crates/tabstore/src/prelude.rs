//! Prelude module - common imports for tabstore users
//!
//! ```rust
//! use tabstore::prelude::*;
//! ```

pub use crate::{
    // Store
    ColumnRef,
    FileFormat,
    PersistMode,
    StoreError,
    StoreOptions,
    StoreResult,
    TabularDataStore,

    // Model
    CellValue,
    Workbook,
    Worksheet,
};
