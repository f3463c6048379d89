//! # Salescope Dataset Crate
//!
//! The ingestion boundary of the workspace. Record files are read and shaped
//! into `RecordSet`s here, and rows that break the record invariants are
//! dropped here, so the analytics layer can trust every row it sees.
//!
//! ## Public API
//!
//! - `load_record_set`: reads one JSON file into a validated `RecordSet`.
//! - `load_record_sets`: the same for several files, one set per file.
//! - `DatasetError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod error;
pub mod loader;

// Re-export the key components to create a clean, public-facing API.
pub use error::DatasetError;
pub use loader::{load_record_set, load_record_sets, prepare};
