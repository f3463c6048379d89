//! # Salescope Core Types
//!
//! Layer 0 of the workspace: the plain data structures every other crate speaks.
//! Nothing in here performs I/O or depends on another workspace crate.

pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{Statistic, TrendKind};
pub use error::CoreError;
pub use structs::{RecordSet, SaleRecord};
