//! Output formatters for duplicate scan results.
//!
//! This module provides different output formats for scan results:
//! - Colored text for terminals
//! - JSON for automation and scripting
//! - CSV for spreadsheet import
//!
//! # Example
//!
//! ```no_run
//! use chunkdupe::duplicates::DuplicateFinder;
//! use chunkdupe::error::ExitCode;
//! use chunkdupe::output::json::JsonOutput;
//! use std::path::PathBuf;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (groups, summary) = finder.find_duplicates(&[PathBuf::from(".")]).unwrap();
//!
//! let output = JsonOutput::new(&groups, &summary, ExitCode::Success);
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

pub mod csv;
pub mod json;
pub mod text;

pub use csv::CsvOutput;
pub use json::JsonOutput;
pub use text::TextOutput;

/// Normalize a path to an absolute path string.
///
/// Falls back to the display form if the file can no longer be resolved.
pub(crate) fn normalize_path(path: &std::path::Path) -> String {
    match path.canonicalize() {
        Ok(canonical) => canonical.to_string_lossy().into_owned(),
        Err(_) => path.to_string_lossy().into_owned(),
    }
}
