//! Utility functions for error handling
//!
//! Existence checks and file opening with errors that name the offending path.

use std::fs;
use std::path::Path;

use crate::error::{Result, UkbError};

/// Check that a directory exists
///
/// # Arguments
/// * `path` - The directory to check
/// * `what` - Human readable description used in the error, e.g.
///   "UK Biobank project directory"
///
/// # Errors
/// Returns [`UkbError::PathNotFound`] naming `path` if it does not exist or is
/// not a directory
pub fn validate_directory(path: &Path, what: &str) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(UkbError::path_not_found(what, path))
    }
}

/// Open a file for reading, attributing any failure to its path
pub fn open_file(path: &Path) -> Result<fs::File> {
    fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => UkbError::path_not_found("File", path),
        _ => UkbError::io(path, e),
    })
}
