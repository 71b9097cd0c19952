//! A Rust library for locating, reading and joining UK Biobank project files.
//!
//! A project directory holds genotype metadata (`genotyped/`, `imputed/`) and
//! phenotype basket exports (`phenotypes/`). The readers here turn those flat
//! files into Arrow record batches keyed by participant identifier (`eid`).

pub mod config;
pub mod error;
pub mod genotype;
pub mod join;
pub mod phenotype;
pub mod schema;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use config::ProjectLayout;
pub use error::{Result, UkbError};
pub use schema::{ColumnType, TypeMapping};

// Arrow types
pub use arrow::datatypes::Schema as ArrowSchema;
pub use arrow::record_batch::RecordBatch;

// Phenotype readers
pub use phenotype::{
    FieldDefinition, FieldFinder, PhenotypeLoader, read_ukb_field_finder,
    read_ukb_phenotype_fields,
};

// Genotype readers
pub use genotype::{
    read_fam, read_fam_file, read_relatedness, read_relatedness_files,
    read_sample_quality_control, read_sample_quality_control_file,
};

pub use join::outer_join;
