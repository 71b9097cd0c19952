//! Genotype file schema definitions

use std::sync::Arc;

use arrow_schema::{DataType, Field, Schema, SchemaRef};

use crate::utils::io::CsvOptions;

/// Column names of a PLINK `.fam` identity file
pub const FAM_COLUMNS: [&str; 6] = ["FID", "IID", "PID", "MID", "SEX", "BATCH"];

/// Get the Arrow schema for `.fam` identity files
///
/// Family, individual, parent and sex codes are integers; the batch is a label.
#[must_use]
pub fn fam_schema() -> SchemaRef {
    Arc::new(Schema::new(
        FAM_COLUMNS
            .iter()
            .map(|name| {
                let data_type = if *name == "BATCH" {
                    DataType::Utf8
                } else {
                    DataType::Int64
                };
                Field::new(*name, data_type, true)
            })
            .collect::<Vec<_>>(),
    ))
}

/// Sample QC columns preceding the principal components
const SAMPLE_QC_LEADING: [(&str, DataType); 25] = [
    ("x1", DataType::Utf8),
    ("x2", DataType::Utf8),
    ("genotyping.array", DataType::Utf8),
    ("Batch", DataType::Utf8),
    ("Plate.Name", DataType::Utf8),
    ("Well", DataType::Utf8),
    ("Cluster.CR", DataType::Float64),
    ("dQC", DataType::Float64),
    ("Internal.Pico..ng.uL.", DataType::Float64),
    ("Submitted.Gender", DataType::Utf8),
    ("Inferred.Gender", DataType::Utf8),
    ("X.intensity", DataType::Float64),
    ("Y.intensity", DataType::Float64),
    ("Submitted.Plate.Name", DataType::Utf8),
    ("Submitted.Well", DataType::Utf8),
    ("sample.qc.missing.rate", DataType::Float64),
    ("heterozygosity", DataType::Float64),
    ("heterozygosity.pc.corrected", DataType::Float64),
    ("het.missing.outliers", DataType::Int64),
    ("putative.sex.chromosome.aneuploidy", DataType::Int64),
    ("in.kinship.table", DataType::Int64),
    ("excluded.from.kinship.inference", DataType::Int64),
    ("excess.relatives", DataType::Int64),
    ("in.white.British.ancestry.subset", DataType::Int64),
    ("used.in.pca.calculation", DataType::Int64),
];

/// Number of principal component columns in the sample QC file
pub const SAMPLE_QC_PC_COUNT: usize = 40;

/// Phasing flags following the principal components
const SAMPLE_QC_TRAILING: [&str; 3] = [
    "in.Phasing.Input.chr1_22",
    "in.Phasing.Input.chrX",
    "in.Phasing.Input.chrXY",
];

/// Get the Arrow schema for the headerless `ukb_sqc_v2.txt` sample QC file
///
/// 68 columns: array identifiers, QC metrics and flags, `PC1`..`PC40` and
/// the phasing input flags.
#[must_use]
pub fn sample_qc_schema() -> SchemaRef {
    let leading = SAMPLE_QC_LEADING
        .iter()
        .map(|(name, data_type)| Field::new(*name, data_type.clone(), true));
    let pcs = (1..=SAMPLE_QC_PC_COUNT).map(|i| Field::new(format!("PC{i}"), DataType::Float64, true));
    let trailing = SAMPLE_QC_TRAILING
        .iter()
        .map(|name| Field::new(*name, DataType::Int64, true));

    Arc::new(Schema::new(
        leading.chain(pcs).chain(trailing).collect::<Vec<_>>(),
    ))
}

/// Relatedness `.dat` files are space delimited with a header row
#[must_use]
pub fn relatedness_options() -> CsvOptions {
    CsvOptions::space()
}
