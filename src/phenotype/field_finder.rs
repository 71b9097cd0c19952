//! Field finder registry
//!
//! Reads every `ukb*field_finder.txt` manifest in the phenotype directory and
//! unions them into one registry batch. Each row is tagged with the basket it
//! came from (`basket`) and the manifest's absolute path (`path`). A field code
//! listed by several baskets keeps one row per basket: later baskets re-export
//! fields over time and the loader disambiguates them.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use arrow::array::{Array, ArrayRef, AsArray, BooleanArray, StringArray, UInt64Array, new_null_array};
use arrow::compute::kernels::cmp::neq;
use arrow::compute::{concat_batches, filter_record_batch, take_record_batch};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::row::{RowConverter, SortField};
use itertools::Itertools;
use rustc_hash::FxHashSet;

use crate::config::ProjectLayout;
use crate::error::{Result, UkbError};
use crate::phenotype::validate_phenotype_layout;
use crate::utils::io::csv::utf8_schema;
use crate::utils::io::paths::basket_id_from_path;
use crate::utils::io::{find_matching_files, read_delimited, read_header, CsvOptions};
use crate::utils::logging::{log_operation_complete, log_operation_start, log_warning};

/// Field code column of a manifest
pub const FIELD_COLUMN: &str = "field";
/// Value type tag column of a manifest
pub const UKB_TYPE_COLUMN: &str = "ukb_type";
/// Basket identifier column added to every registry row
pub const BASKET_COLUMN: &str = "basket";
/// Manifest path column added to every registry row
pub const PATH_COLUMN: &str = "path";

/// Manifest columns holding a field's free-text description, by preference
const DESCRIPTION_COLUMNS: [&str; 3] = ["name", "description", "title"];

/// One row of the field finder registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    /// Field code, e.g. `31-0.0`
    pub field: String,
    /// Basket the field was exported in, e.g. `ukb12345`
    pub basket: String,
    /// UK Biobank value type tag, e.g. `Integer`
    pub ukb_type: Option<String>,
    /// Free-text description of the field
    pub description: Option<String>,
    /// Manifest the row was read from
    pub path: PathBuf,
}

/// Unified registry of the fields available in every basket of a project
#[derive(Debug, Clone)]
pub struct FieldFinder {
    batch: RecordBatch,
}

impl FieldFinder {
    /// Read and union every field finder manifest of a project
    ///
    /// Exact duplicate rows are removed, as are rows describing the identifier
    /// column itself. No manifests yields an empty registry.
    ///
    /// # Errors
    /// Returns [`UkbError::PathNotFound`] if the project directory or its
    /// phenotype sub-directory is missing, or an error if a manifest cannot be
    /// parsed
    pub fn read(layout: &ProjectLayout) -> Result<Self> {
        let start = Instant::now();
        let phenotype_dir = validate_phenotype_layout(layout)?;
        log_operation_start("Reading field finder manifests from", &phenotype_dir);

        let manifests = find_matching_files(&phenotype_dir, &layout.field_finder_pattern)?;
        if manifests.is_empty() {
            log_warning("No field finder manifests found", Some(&phenotype_dir));
            return Ok(Self::empty());
        }

        let batches = manifests
            .iter()
            .map(|path| read_manifest(path))
            .collect::<Result<Vec<_>>>()?;

        let registry = union_by_name(&batches)?;
        let registry = distinct_rows(&registry)?;
        let registry = drop_field(&registry, &layout.identifier_column)?;

        log_operation_complete(
            "read",
            &phenotype_dir,
            registry.num_rows(),
            start,
        );
        Ok(Self { batch: registry })
    }

    /// Registry with no rows and only the required columns
    #[must_use]
    pub fn empty() -> Self {
        let schema = utf8_schema(&[FIELD_COLUMN, UKB_TYPE_COLUMN, BASKET_COLUMN, PATH_COLUMN]);
        Self {
            batch: RecordBatch::new_empty(Arc::new(schema)),
        }
    }

    /// The registry as a record batch, all columns text
    #[must_use]
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    #[must_use]
    pub fn into_batch(self) -> RecordBatch {
        self.batch
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.batch.num_rows()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    /// Keep only rows whose field code is one of `codes`
    ///
    /// Matching is exact; partial or pattern matching of field codes is not
    /// supported.
    pub fn filter_fields<S: AsRef<str>>(&self, codes: &[S]) -> Result<Self> {
        let requested: FxHashSet<&str> = codes.iter().map(AsRef::as_ref).collect();
        let fields = self.text_column(FIELD_COLUMN)?;
        let mask: BooleanArray = fields
            .iter()
            .map(|field| Some(field.is_some_and(|f| requested.contains(f))))
            .collect();

        Ok(Self {
            batch: filter_record_batch(&self.batch, &mask)?,
        })
    }

    /// Distinct field codes in the registry, sorted
    pub fn field_codes(&self) -> Result<BTreeSet<String>> {
        Ok(self
            .text_column(FIELD_COLUMN)?
            .iter()
            .flatten()
            .map(str::to_string)
            .collect())
    }

    /// Distinct basket identifiers in the registry, sorted
    pub fn baskets(&self) -> Result<Vec<String>> {
        Ok(self
            .text_column(BASKET_COLUMN)?
            .iter()
            .flatten()
            .map(str::to_string)
            .sorted()
            .dedup()
            .collect())
    }

    /// Field codes listed by more than one basket
    pub fn duplicate_fields(&self) -> Result<BTreeSet<String>> {
        let fields = self.text_column(FIELD_COLUMN)?;
        let baskets = self.text_column(BASKET_COLUMN)?;

        let mut baskets_by_field: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for (field, basket) in fields.iter().zip(baskets.iter()) {
            if let (Some(field), Some(basket)) = (field, basket) {
                baskets_by_field.entry(field).or_default().insert(basket);
            }
        }

        Ok(baskets_by_field
            .into_iter()
            .filter(|(_, baskets)| baskets.len() > 1)
            .map(|(field, _)| field.to_string())
            .collect())
    }

    /// Typed view of the registry rows, in registry order
    pub fn definitions(&self) -> Result<Vec<FieldDefinition>> {
        let fields = self.text_column(FIELD_COLUMN)?;
        let baskets = self.text_column(BASKET_COLUMN)?;
        let paths = self.text_column(PATH_COLUMN)?;
        let ukb_types = self.text_column(UKB_TYPE_COLUMN)?;
        let descriptions = DESCRIPTION_COLUMNS
            .iter()
            .find_map(|name| self.batch.column_by_name(name))
            .and_then(|column| column.as_string_opt::<i32>());

        let mut definitions = Vec::with_capacity(self.len());
        for i in 0..self.len() {
            if fields.is_null(i) || baskets.is_null(i) {
                continue;
            }
            definitions.push(FieldDefinition {
                field: fields.value(i).to_string(),
                basket: baskets.value(i).to_string(),
                ukb_type: ukb_types.is_valid(i).then(|| ukb_types.value(i).to_string()),
                description: descriptions
                    .filter(|d| d.is_valid(i))
                    .map(|d| d.value(i).to_string()),
                path: PathBuf::from(paths.value(i)),
            });
        }
        Ok(definitions)
    }

    fn text_column(&self, name: &str) -> Result<&StringArray> {
        self.batch
            .column_by_name(name)
            .ok_or_else(|| UkbError::Schema(format!("field finder has no '{name}' column")))?
            .as_string_opt::<i32>()
            .ok_or_else(|| UkbError::Schema(format!("field finder column '{name}' is not text")))
    }
}

/// Read the field finder registry of the project at `project_dir`
///
/// # Arguments
/// * `project_dir` - UK Biobank project directory
/// * `phenotype_subdir` - Phenotype sub-directory name, usually `phenotypes`
pub fn read_ukb_field_finder(
    project_dir: impl AsRef<Path>,
    phenotype_subdir: impl AsRef<Path>,
) -> Result<FieldFinder> {
    let layout = ProjectLayout::new(project_dir.as_ref())
        .with_phenotype_subdir(phenotype_subdir.as_ref());
    FieldFinder::read(&layout)
}

/// Read one tab-delimited manifest as text columns plus `basket` and `path`
fn read_manifest(path: &Path) -> Result<RecordBatch> {
    let basket = basket_id_from_path(path).ok_or_else(|| {
        UkbError::Schema(format!(
            "cannot derive a basket id from {}",
            path.display()
        ))
    })?;

    let header = read_header(path, CsvOptions::tab())?;
    for required in [FIELD_COLUMN, UKB_TYPE_COLUMN] {
        if !header.iter().any(|name| name == required) {
            return Err(UkbError::MissingColumn {
                column: required.to_string(),
                path: path.to_path_buf(),
            });
        }
    }

    let batch = read_delimited(path, Arc::new(utf8_schema(&header)), None, CsvOptions::tab())?;
    let rows = batch.num_rows();
    let absolute = std::path::absolute(path).map_err(|e| UkbError::io(path, e))?;
    log::debug!("Basket {basket}: {rows} fields listed in {}", path.display());

    let schema = batch.schema();
    let (mut fields, mut columns): (Vec<Field>, Vec<ArrayRef>) = schema
        .fields()
        .iter()
        .zip(batch.columns())
        .filter(|(field, _)| field.name() != BASKET_COLUMN && field.name() != PATH_COLUMN)
        .map(|(field, column)| (field.as_ref().clone(), column.clone()))
        .unzip();

    fields.push(Field::new(BASKET_COLUMN, DataType::Utf8, true));
    columns.push(Arc::new(StringArray::from(vec![basket.as_str(); rows])));
    fields.push(Field::new(PATH_COLUMN, DataType::Utf8, true));
    let absolute = absolute.to_string_lossy().into_owned();
    columns.push(Arc::new(StringArray::from(vec![absolute.as_str(); rows])));

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

/// Concatenate text batches whose columns may differ, aligning columns by name
///
/// Columns absent from a batch are filled with nulls.
fn union_by_name(batches: &[RecordBatch]) -> Result<RecordBatch> {
    let names: Vec<String> = batches
        .iter()
        .flat_map(|batch| {
            batch
                .schema()
                .fields()
                .iter()
                .map(|f| f.name().clone())
                .collect::<Vec<_>>()
        })
        .unique()
        .collect();
    let schema = Arc::new(utf8_schema(&names));

    let aligned = batches
        .iter()
        .map(|batch| {
            let columns = names
                .iter()
                .map(|name| {
                    batch
                        .column_by_name(name)
                        .cloned()
                        .unwrap_or_else(|| new_null_array(&DataType::Utf8, batch.num_rows()))
                })
                .collect();
            RecordBatch::try_new(schema.clone(), columns)
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(concat_batches(&schema, &aligned)?)
}

/// Remove rows identical across every column, keeping first occurrences
pub(crate) fn distinct_rows(batch: &RecordBatch) -> Result<RecordBatch> {
    let converter = RowConverter::new(
        batch
            .schema()
            .fields()
            .iter()
            .map(|f| SortField::new(f.data_type().clone()))
            .collect(),
    )?;
    let rows = converter.convert_columns(batch.columns())?;

    let mut seen = FxHashSet::default();
    let keep: Vec<u64> = (0..rows.num_rows())
        .filter(|&i| seen.insert(rows.row(i)))
        .map(|i| i as u64)
        .collect();

    if keep.len() == batch.num_rows() {
        return Ok(batch.clone());
    }
    Ok(take_record_batch(batch, &UInt64Array::from(keep))?)
}

/// Remove rows whose field code is `code`
fn drop_field(batch: &RecordBatch, code: &str) -> Result<RecordBatch> {
    let fields = batch
        .column_by_name(FIELD_COLUMN)
        .ok_or_else(|| UkbError::Schema(format!("field finder has no '{FIELD_COLUMN}' column")))?;
    let mask = neq(fields, &StringArray::new_scalar(code))?;
    Ok(filter_record_batch(batch, &mask)?)
}
