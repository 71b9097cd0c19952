//! Configuration for the UK Biobank project directory layout.

use std::path::{Path, PathBuf};

/// Default phenotype sub-directory name
pub const DEFAULT_PHENOTYPE_SUBDIR: &str = "phenotypes";

/// Default participant identifier column
pub const DEFAULT_IDENTIFIER_COLUMN: &str = "eid";

/// Number of records sampled when a column type has to be inferred
pub const DEFAULT_INFER_MAX_RECORDS: usize = 1000;

/// Where the readers look for files inside a UK Biobank project directory
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    /// Project root directory
    pub project_dir: PathBuf,
    /// Sub-directory holding the genotyped `.fam` files
    pub genotyped_subdir: PathBuf,
    /// Sub-directory holding sample QC and relatedness files
    pub imputed_subdir: PathBuf,
    /// Sub-directory holding field finder manifests and basket CSV files
    pub phenotype_subdir: PathBuf,
    /// Participant identifier column shared by every basket
    pub identifier_column: String,
    /// File name pattern of the per-basket field finder manifests
    pub field_finder_pattern: String,
    /// File name pattern of the identity (pedigree) files
    pub fam_pattern: String,
    /// File name of the sample quality control file
    pub sample_qc_filename: String,
    /// File name pattern of the relatedness files
    pub relatedness_pattern: String,
    /// Records sampled when inferring a column type
    pub infer_max_records: usize,
}

impl Default for ProjectLayout {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("."),
            genotyped_subdir: PathBuf::from("genotyped"),
            imputed_subdir: PathBuf::from("imputed"),
            phenotype_subdir: PathBuf::from(DEFAULT_PHENOTYPE_SUBDIR),
            identifier_column: DEFAULT_IDENTIFIER_COLUMN.to_string(),
            field_finder_pattern: "ukb*field_finder.txt".to_string(),
            fam_pattern: "*.fam".to_string(),
            sample_qc_filename: "ukb_sqc_v2.txt".to_string(),
            relatedness_pattern: "*rel*.dat".to_string(),
            infer_max_records: DEFAULT_INFER_MAX_RECORDS,
        }
    }
}

impl ProjectLayout {
    /// Create a layout with default sub-directories rooted at `project_dir`
    #[must_use]
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            ..Default::default()
        }
    }

    /// Override the phenotype sub-directory name
    #[must_use]
    pub fn with_phenotype_subdir(mut self, subdir: impl Into<PathBuf>) -> Self {
        self.phenotype_subdir = subdir.into();
        self
    }

    /// Override the participant identifier column
    #[must_use]
    pub fn with_identifier_column(mut self, column: impl Into<String>) -> Self {
        self.identifier_column = column.into();
        self
    }

    /// Override the sample quality control file name
    #[must_use]
    pub fn with_sample_qc_filename(mut self, filename: impl Into<String>) -> Self {
        self.sample_qc_filename = filename.into();
        self
    }

    /// Override the number of records sampled for type inference
    #[must_use]
    pub fn with_infer_max_records(mut self, records: usize) -> Self {
        self.infer_max_records = records;
        self
    }

    #[must_use]
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    #[must_use]
    pub fn genotyped_dir(&self) -> PathBuf {
        self.project_dir.join(&self.genotyped_subdir)
    }

    #[must_use]
    pub fn imputed_dir(&self) -> PathBuf {
        self.project_dir.join(&self.imputed_subdir)
    }

    #[must_use]
    pub fn phenotype_dir(&self) -> PathBuf {
        self.project_dir.join(&self.phenotype_subdir)
    }

    /// Path of the data file exported with `basket`, e.g. `phenotypes/ukb12345.csv`
    #[must_use]
    pub fn basket_data_file(&self, basket: &str) -> PathBuf {
        self.phenotype_dir().join(format!("{basket}.csv"))
    }

    #[must_use]
    pub fn sample_qc_file(&self) -> PathBuf {
        self.imputed_dir().join(&self.sample_qc_filename)
    }
}
