//! IO utilities for file operations
//!
//! This module provides utilities for discovering files by name pattern and
//! reading delimited text files into Arrow record batches.

pub mod csv;
pub mod paths;

// Re-export commonly used functions for convenience
pub use csv::{infer_file_schema, read_delimited, read_header, CsvOptions};
pub use paths::{find_matching_files, most_recently_modified};
