//! General path utilities for locating project files
//!
//! Patterns are matched against file names inside a single directory, never
//! recursively, and results are sorted so discovery order is reproducible.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use globset::Glob;

use crate::error::{Result, UkbError};

/// Find all files in `dir` whose name matches the glob `pattern`
///
/// # Arguments
/// * `dir` - Directory to search (not recursed into)
/// * `pattern` - Glob pattern matched against the file name, e.g. `ukb*field_finder.txt`
///
/// # Returns
/// Matching paths in lexical order
///
/// # Errors
/// Returns an error if the pattern is invalid or the directory cannot be read
pub fn find_matching_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let matcher = Glob::new(pattern)
        .map(|g| g.compile_matcher())
        .map_err(|e| UkbError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;

    let entries = fs::read_dir(dir).map_err(|e| UkbError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| UkbError::io(dir, e))?.path();
        if path.is_file() && path.file_name().is_some_and(|name| matcher.is_match(name)) {
            files.push(path);
        }
    }
    files.sort();

    log::debug!(
        "Found {} files matching '{}' in {}",
        files.len(),
        pattern,
        dir.display()
    );
    Ok(files)
}

/// Pick the most recently modified file
///
/// Files with identical modification times are ordered by file name and the
/// lexically greatest one wins.
///
/// # Returns
/// `None` if `files` is empty
///
/// # Errors
/// Returns an error if a file's metadata cannot be read
pub fn most_recently_modified(files: &[PathBuf]) -> Result<Option<PathBuf>> {
    let stamped: Vec<(SystemTime, &PathBuf)> = files
        .iter()
        .map(|path| {
            fs::metadata(path)
                .and_then(|m| m.modified())
                .map(|modified| (modified, path))
                .map_err(|e| UkbError::io(path, e))
        })
        .collect::<Result<_>>()?;

    let latest = stamped.into_iter().max_by(|(a_time, a_path), (b_time, b_path)| {
        a_time
            .cmp(b_time)
            .then_with(|| a_path.file_name().cmp(&b_path.file_name()))
    });

    Ok(latest.map(|(modified, path)| {
        log::debug!(
            "Most recently modified: {} ({})",
            path.display(),
            DateTime::<Utc>::from(modified).format("%Y-%m-%d %H:%M:%S UTC")
        );
        path.clone()
    }))
}

/// Basket identifier of a field finder manifest: the file stem up to the first underscore
///
/// `ukb12345_field_finder.txt` yields `ukb12345`.
#[must_use]
pub fn basket_id_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    stem.split('_').next().map(str::to_string)
}
