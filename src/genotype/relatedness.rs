//! Relatedness file reader

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use arrow::compute::concat_batches;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

use crate::config::ProjectLayout;
use crate::error::util::validate_directory;
use crate::error::{Result, UkbError};
use crate::schema::relatedness_options;
use crate::utils::io::{find_matching_files, infer_file_schema, read_delimited};
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// Read and concatenate every relatedness file in the imputed sub-directory
///
/// Column names come from each file's header; all files must share them.
/// Column types are inferred and widened across files.
///
/// # Errors
/// Returns [`UkbError::NoMatchingFiles`] if no file matches the relatedness
/// pattern, or [`UkbError::Schema`] if the files' headers differ
pub fn read_relatedness(layout: &ProjectLayout) -> Result<RecordBatch> {
    let start = Instant::now();
    validate_directory(layout.project_dir(), "UK Biobank project directory")?;
    let imputed_dir = layout.imputed_dir();
    validate_directory(&imputed_dir, "UK Biobank project imputed sub-directory")?;
    log_operation_start("Reading relatedness files from", &imputed_dir);

    let files = find_matching_files(&imputed_dir, &layout.relatedness_pattern)?;
    if files.is_empty() {
        return Err(UkbError::NoMatchingFiles {
            pattern: layout.relatedness_pattern.clone(),
            dir: imputed_dir,
        });
    }

    let options = relatedness_options();
    let schemas = files
        .iter()
        .map(|path| infer_file_schema(path, options, Some(layout.infer_max_records)))
        .collect::<Result<Vec<_>>>()?;
    let schema = Arc::new(merge_schemas(&files, &schemas)?);

    let batches = files
        .iter()
        .map(|path| read_delimited(path, schema.clone(), None, options))
        .collect::<Result<Vec<_>>>()?;
    let relatedness = concat_batches(&schema, &batches)?;

    log_operation_complete(
        "read",
        &imputed_dir,
        relatedness.num_rows(),
        start,
    );
    Ok(relatedness)
}

/// Read the relatedness files of the project at `project_dir`
pub fn read_relatedness_files(project_dir: impl AsRef<Path>) -> Result<RecordBatch> {
    read_relatedness(&ProjectLayout::new(project_dir.as_ref()))
}

/// Combine per-file inferred schemas that must agree on column names
fn merge_schemas(files: &[PathBuf], schemas: &[Schema]) -> Result<Schema> {
    let Some((first, rest)) = schemas.split_first() else {
        return Ok(Schema::empty());
    };
    let mut types: Vec<DataType> = first.fields().iter().map(|f| f.data_type().clone()).collect();

    for (path, schema) in files.iter().skip(1).zip(rest) {
        let same_header = schema.fields().len() == first.fields().len()
            && schema
                .fields()
                .iter()
                .zip(first.fields())
                .all(|(a, b)| a.name() == b.name());
        if !same_header {
            return Err(UkbError::Schema(format!(
                "relatedness file {} has a different header from {}",
                path.display(),
                files[0].display()
            )));
        }
        for (merged, field) in types.iter_mut().zip(schema.fields()) {
            *merged = widen(merged, field.data_type());
        }
    }

    Ok(Schema::new(
        first
            .fields()
            .iter()
            .zip(types)
            .map(|(field, data_type)| {
                let data_type = if data_type == DataType::Null {
                    DataType::Utf8
                } else {
                    data_type
                };
                Field::new(field.name(), data_type, true)
            })
            .collect::<Vec<_>>(),
    ))
}

/// Smallest type holding values of both `a` and `b`
fn widen(a: &DataType, b: &DataType) -> DataType {
    match (a, b) {
        (a, b) if a == b => a.clone(),
        (DataType::Null, other) | (other, DataType::Null) => other.clone(),
        (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64) => {
            DataType::Float64
        }
        _ => DataType::Utf8,
    }
}
