//! Shared utilities for file discovery, delimited file reading and logging

pub mod io;
pub mod logging;

pub use io::{find_matching_files, most_recently_modified, read_delimited, CsvOptions};
pub use logging::{log_operation_complete, log_operation_start, log_warning};
