//! Column types and fixed schemas for UK Biobank files.

pub mod field_type;
pub mod genotype;

// Re-export the main types for easier access
pub use field_type::{ColumnType, TypeMapping, UKB_TYPE_TABLE};
pub use genotype::{fam_schema, relatedness_options, sample_qc_schema, FAM_COLUMNS};
