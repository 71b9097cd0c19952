//! Phenotype basket readers
//!
//! A UK Biobank project receives phenotype data as a series of baskets. Each
//! basket `ukbNNNNN` ships a field finder manifest
//! (`ukbNNNNN_field_finder.txt`) listing the fields it contains and a data
//! file (`ukbNNNNN.csv`) with one row per participant. This module builds a
//! registry of all manifests and loads requested fields across baskets into
//! a single table keyed by participant identifier.

pub mod field_finder;
pub mod loader;

use std::path::PathBuf;

use crate::config::ProjectLayout;
use crate::error::Result;
use crate::error::util::validate_directory;

pub use field_finder::{read_ukb_field_finder, FieldDefinition, FieldFinder};
pub use loader::{read_ukb_phenotype_fields, PhenotypeLoader};

/// Check the project directory and its phenotype sub-directory exist
///
/// # Returns
/// The phenotype directory
///
/// # Errors
/// Returns [`crate::UkbError::PathNotFound`] naming whichever directory is missing
pub(crate) fn validate_phenotype_layout(layout: &ProjectLayout) -> Result<PathBuf> {
    validate_directory(layout.project_dir(), "UK Biobank project directory")?;
    let phenotype_dir = layout.phenotype_dir();
    validate_directory(&phenotype_dir, "UK Biobank project phenotype sub-directory")?;
    Ok(phenotype_dir)
}
