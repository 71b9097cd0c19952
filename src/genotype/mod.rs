//! Genotype metadata readers
//!
//! Fixed-schema readers for the identity (`.fam`), sample quality control and
//! relatedness files delivered with the UK Biobank genotype release.

pub mod fam;
pub mod relatedness;
pub mod sample_qc;

pub use fam::{read_fam, read_fam_file};
pub use relatedness::{read_relatedness, read_relatedness_files};
pub use sample_qc::{attach_identifiers, read_sample_quality_control, read_sample_quality_control_file};
