//! End-to-end tests for the tabular data store.
//!
//! Every test runs against both file formats: the store creates a file in a
//! temp directory, mutates it, and a freshly opened store checks what was
//! persisted.

mod common;
mod store;

pub use common::*;
