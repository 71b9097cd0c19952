//! Path utilities for file and directory operations
//!
//! This module provides utilities for locating the files of a UK Biobank
//! project directory.

pub mod general;

// Re-export commonly used functions for convenience
pub use general::{basket_id_from_path, find_matching_files, most_recently_modified};
