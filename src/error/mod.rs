//! Error handling for the UK Biobank readers.

pub mod util;

use std::io;
use std::path::PathBuf;

use arrow::error::ArrowError;

/// Specialized error type for the UK Biobank readers
#[derive(Debug, thiserror::Error)]
pub enum UkbError {
    /// A required directory or file does not exist
    #[error("{what} ({}) does not exist", path.display())]
    PathNotFound {
        /// What the path was expected to be, e.g. "UK Biobank project directory"
        what: String,
        path: PathBuf,
    },

    /// Identity file and sample-QC file disagree on the number of participants
    #[error(
        "identity file has {identity} rows but sample quality control file has {sample_qc} rows"
    )]
    RowCountMismatch { identity: usize, sample_qc: usize },

    /// No file in a directory matched the expected pattern
    #[error("no files matching '{pattern}' found in {}", dir.display())]
    NoMatchingFiles { pattern: String, dir: PathBuf },

    /// A file does not contain a column the caller needs
    #[error("column '{column}' not found in {}", path.display())]
    MissingColumn { column: String, path: PathBuf },

    /// A file name pattern could not be compiled
    #[error("invalid file pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Error opening or reading a file
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Error parsing or transforming Arrow data
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Tables cannot be combined as requested
    #[error("Schema error: {0}")]
    Schema(String),
}

impl UkbError {
    /// Build a [`UkbError::PathNotFound`] for `path`
    pub fn path_not_found(what: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::PathNotFound {
            what: what.into(),
            path: path.into(),
        }
    }

    /// Build a [`UkbError::Io`] attributing `source` to `path`
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for UK Biobank reader operations
pub type Result<T> = std::result::Result<T, UkbError>;
