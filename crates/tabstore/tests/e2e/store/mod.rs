//! Store operations against real files.

mod persistence;
mod properties;
mod scenario;
