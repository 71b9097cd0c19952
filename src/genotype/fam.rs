//! Identity (`.fam`) file reader

use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use arrow::record_batch::RecordBatch;

use crate::config::ProjectLayout;
use crate::error::util::{open_file, validate_directory};
use crate::error::{Result, UkbError};
use crate::schema::fam_schema;
use crate::utils::io::{find_matching_files, most_recently_modified, read_delimited, CsvOptions};
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// Read the most recently modified `.fam` file in the genotyped sub-directory
///
/// The file has no header and six columns: `FID`, `IID`, `PID`, `MID`, `SEX`
/// and `BATCH`. The delimiter (tab, comma or space) is detected from the first
/// line. When several files share the latest modification time, the one with
/// the lexically greatest name is read.
///
/// # Errors
/// Returns [`UkbError::PathNotFound`] if the project or genotyped directory is
/// missing and [`UkbError::NoMatchingFiles`] if it holds no `.fam` file
pub fn read_fam(layout: &ProjectLayout) -> Result<RecordBatch> {
    let start = Instant::now();
    validate_directory(layout.project_dir(), "UK Biobank project directory")?;
    let genotyped_dir = layout.genotyped_dir();
    validate_directory(&genotyped_dir, "UK Biobank project genotyped sub-directory")?;

    let candidates = find_matching_files(&genotyped_dir, &layout.fam_pattern)?;
    let path = most_recently_modified(&candidates)?.ok_or_else(|| UkbError::NoMatchingFiles {
        pattern: layout.fam_pattern.clone(),
        dir: genotyped_dir.clone(),
    })?;
    log_operation_start("Reading identity file", &path);

    let options = CsvOptions::sniff(&first_line(&path)?).without_header();
    let fam = read_delimited(&path, fam_schema(), None, options)?;

    log_operation_complete("read", &path, fam.num_rows(), start);
    Ok(fam)
}

/// Read the identity file of the project at `project_dir`
pub fn read_fam_file(project_dir: impl AsRef<Path>) -> Result<RecordBatch> {
    read_fam(&ProjectLayout::new(project_dir.as_ref()))
}

fn first_line(path: &Path) -> Result<String> {
    let mut line = String::new();
    BufReader::new(open_file(path)?)
        .read_line(&mut line)
        .map_err(|e| UkbError::io(path, e))?;
    Ok(line)
}
