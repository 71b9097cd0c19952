//! Sample quality control file reader

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;

use crate::config::ProjectLayout;
use crate::error::util::validate_directory;
use crate::error::{Result, UkbError};
use crate::genotype::fam::read_fam;
use crate::schema::sample_qc_schema;
use crate::utils::io::{read_delimited, CsvOptions};
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// Read the sample QC file with participant identifiers attached
///
/// `ukb_sqc_v2.txt` is headerless and space delimited, one row per genotyped
/// sample in the same order as the identity file. Each row gets the `IID` of
/// the matching identity row as the identifier column, placed first.
///
/// # Errors
/// Returns [`UkbError::RowCountMismatch`] if the identity and sample QC files
/// differ in length, [`UkbError::PathNotFound`] if a directory or the sample
/// QC file is missing
pub fn read_sample_quality_control(layout: &ProjectLayout) -> Result<RecordBatch> {
    let start = Instant::now();
    let fam = read_fam(layout)?;

    let imputed_dir = layout.imputed_dir();
    validate_directory(&imputed_dir, "UK Biobank project imputed sub-directory")?;
    let path = layout.sample_qc_file();
    if !path.is_file() {
        return Err(UkbError::path_not_found("Sample quality control file", path));
    }
    log_operation_start("Reading sample quality control file", &path);

    let sample_qc = read_delimited(
        &path,
        sample_qc_schema(),
        None,
        CsvOptions::space().without_header(),
    )?;
    let sample_qc = attach_identifiers(&fam, &sample_qc, &layout.identifier_column)?;

    log_operation_complete("read", &path, sample_qc.num_rows(), start);
    Ok(sample_qc)
}

/// Read the sample QC file of the project at `project_dir`
pub fn read_sample_quality_control_file(project_dir: impl AsRef<Path>) -> Result<RecordBatch> {
    read_sample_quality_control(&ProjectLayout::new(project_dir.as_ref()))
}

/// Prepend the identity file's `IID` column to `sample_qc` as `identifier`
///
/// Rows are matched by position, so both batches must have the same length.
pub fn attach_identifiers(
    fam: &RecordBatch,
    sample_qc: &RecordBatch,
    identifier: &str,
) -> Result<RecordBatch> {
    if fam.num_rows() != sample_qc.num_rows() {
        return Err(UkbError::RowCountMismatch {
            identity: fam.num_rows(),
            sample_qc: sample_qc.num_rows(),
        });
    }
    let iid = fam
        .column_by_name("IID")
        .ok_or_else(|| UkbError::Schema("identity table has no 'IID' column".to_string()))?;

    let schema = sample_qc.schema();
    let fields = std::iter::once(Field::new(identifier, iid.data_type().clone(), true))
        .chain(schema.fields().iter().map(|f| f.as_ref().clone()))
        .collect::<Vec<_>>();
    let columns = std::iter::once(iid.clone())
        .chain(sample_qc.columns().iter().cloned())
        .collect();

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}
