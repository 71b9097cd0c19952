//! Logging utilities
//!
//! Reader progress goes to `info!`, recoverable surprises in the input to
//! `warn!`.

use std::fmt::Display;
use std::path::Path;
use std::time::Instant;

/// Log the start of reading `path`
pub fn log_operation_start(operation: &str, path: &Path) {
    log::info!("{} {}", operation, path.display());
}

/// Log a finished read with the number of rows produced and time since `started`
pub fn log_operation_complete(operation: &str, path: &Path, rows: usize, started: Instant) {
    log::info!(
        "Successfully {} {} rows from {} in {:?}",
        operation,
        rows,
        path.display(),
        started.elapsed()
    );
}

/// Log a warning, optionally naming the file or directory it concerns
pub fn log_warning(message: impl Display, path: Option<&Path>) {
    match path {
        Some(path) => log::warn!("{message}: {}", path.display()),
        None => log::warn!("{message}"),
    }
}

/// Log field codes that no manifest lists; they are left out of the result
pub fn log_unmatched_fields<S: AsRef<str>>(fields: &[S]) {
    if fields.is_empty() {
        return;
    }
    let codes = fields.iter().map(AsRef::as_ref).collect::<Vec<_>>();
    log::warn!(
        "{} requested field(s) not listed in any field finder manifest: {}",
        codes.len(),
        codes.join(", ")
    );
}

/// Log that `field` falls back to `fallback` because its type tag is unknown or absent
pub fn log_type_fallback(field: &str, tag: Option<&str>, fallback: impl Display) {
    match tag {
        Some(tag) => {
            log::warn!("Unrecognised UK Biobank type '{tag}' for field {field}, using {fallback} type");
        }
        None => log::warn!("No UK Biobank type for field {field}, using {fallback} type"),
    }
}
