//! Delimited text file operations
//!
//! Thin wrappers around `arrow::csv` that read a whole file into a single
//! record batch. Empty cells and `NA` are read as nulls.

use std::path::Path;
use std::sync::Arc;

use arrow::compute::concat_batches;
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use regex::Regex;

use crate::error::util::open_file;
use crate::error::{Result, UkbError};

/// Cell values read as missing
const NULL_PATTERN: &str = "^(NA)?$";

/// Delimiter and header settings of a delimited text file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub has_header: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self::comma()
    }
}

impl CsvOptions {
    /// Comma delimited with a header row
    #[must_use]
    pub const fn comma() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
        }
    }

    /// Tab delimited with a header row
    #[must_use]
    pub const fn tab() -> Self {
        Self {
            delimiter: b'\t',
            has_header: true,
        }
    }

    /// Single-space delimited with a header row
    #[must_use]
    pub const fn space() -> Self {
        Self {
            delimiter: b' ',
            has_header: true,
        }
    }

    #[must_use]
    pub const fn without_header(mut self) -> Self {
        self.has_header = false;
        self
    }

    /// Guess the delimiter from the first line of a file: tab, then comma, then space
    #[must_use]
    pub fn sniff(first_line: &str) -> Self {
        if first_line.contains('\t') {
            Self::tab()
        } else if first_line.contains(',') {
            Self::comma()
        } else {
            Self::space()
        }
    }

    fn format(self) -> Result<Format> {
        Ok(Format::default()
            .with_header(self.has_header)
            .with_delimiter(self.delimiter)
            .with_null_regex(null_regex()?))
    }
}

fn null_regex() -> Result<Regex> {
    Regex::new(NULL_PATTERN).map_err(|e| UkbError::InvalidPattern {
        pattern: NULL_PATTERN.to_string(),
        message: e.to_string(),
    })
}

/// Infer a schema from the first `max_records` records of a file
///
/// # Errors
/// Returns an error if the file cannot be opened or parsed
pub fn infer_file_schema(
    path: &Path,
    options: CsvOptions,
    max_records: Option<usize>,
) -> Result<Schema> {
    let file = open_file(path)?;
    let (schema, _) = options.format()?.infer_schema(file, max_records)?;
    Ok(schema)
}

/// Read the column names of a file
///
/// Files without a header get Arrow's generated `column_N` names.
pub fn read_header(path: &Path, options: CsvOptions) -> Result<Vec<String>> {
    let schema = infer_file_schema(path, options, Some(0))?;
    Ok(schema.fields().iter().map(|f| f.name().clone()).collect())
}

/// Build a schema of nullable text columns with the given names
#[must_use]
pub fn utf8_schema<S: AsRef<str>>(names: &[S]) -> Schema {
    Schema::new(
        names
            .iter()
            .map(|name| Field::new(name.as_ref(), DataType::Utf8, true))
            .collect::<Vec<_>>(),
    )
}

/// Read a delimited file into a single record batch
///
/// # Arguments
/// * `path` - File to read
/// * `schema` - Schema describing every column of the file, in file order
/// * `projection` - Optional indices into `schema` of the columns to keep, in output order
/// * `options` - Delimiter and header settings
///
/// # Errors
/// Returns an error if the file cannot be opened or a value does not parse as
/// its column type
pub fn read_delimited(
    path: &Path,
    schema: SchemaRef,
    projection: Option<Vec<usize>>,
    options: CsvOptions,
) -> Result<RecordBatch> {
    let output_schema = match &projection {
        Some(indices) => Arc::new(schema.project(indices)?),
        None => schema.clone(),
    };

    let file = open_file(path)?;
    let mut builder = ReaderBuilder::new(schema)
        .with_header(options.has_header)
        .with_delimiter(options.delimiter)
        .with_null_regex(null_regex()?);
    if let Some(indices) = projection {
        builder = builder.with_projection(indices);
    }

    let batches = builder
        .build(file)?
        .collect::<std::result::Result<Vec<_>, ArrowError>>()
        .map_err(|e| {
            log::error!("Failed to parse {}: {e}", path.display());
            UkbError::Arrow(e)
        })?;

    Ok(concat_batches(&output_schema, &batches)?)
}
