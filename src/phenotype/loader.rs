//! Phenotype field loader
//!
//! Resolves requested field codes to the baskets that export them, reads each
//! basket's CSV restricted to those fields with types taken from the field
//! finder, and outer-joins the per-basket tables on the identifier column.
//!
//! A field exported by several baskets is kept once per basket, with the
//! basket id appended to the column name (`31-0.0_ukb12345`). Newer baskets
//! supersede older ones for the same field; choosing between the columns is
//! left to the caller.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use itertools::Itertools;
use rustc_hash::FxHashMap;

use crate::config::ProjectLayout;
use crate::error::{Result, UkbError};
use crate::join::outer_join;
use crate::phenotype::field_finder::{FieldDefinition, FieldFinder};
use crate::phenotype::validate_phenotype_layout;
use crate::schema::{ColumnType, TypeMapping};
use crate::utils::io::{infer_file_schema, read_delimited, CsvOptions};
use crate::utils::logging::{
    log_operation_complete, log_operation_start, log_unmatched_fields, log_warning,
};

/// Loads phenotype fields from every basket of a project into one table
#[derive(Debug, Clone)]
pub struct PhenotypeLoader {
    layout: ProjectLayout,
    type_mapping: TypeMapping,
}

impl PhenotypeLoader {
    #[must_use]
    pub fn new(layout: ProjectLayout) -> Self {
        Self {
            layout,
            type_mapping: TypeMapping::default(),
        }
    }

    /// Use a custom value type mapping, e.g. to type a tag the default table lacks
    #[must_use]
    pub fn with_type_mapping(mut self, type_mapping: TypeMapping) -> Self {
        self.type_mapping = type_mapping;
        self
    }

    #[must_use]
    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Load `fields` into one table with a row per participant
    ///
    /// The identifier column comes first, followed by each basket's fields in
    /// basket id order. Field codes are matched exactly. Codes no manifest
    /// lists are logged and left out; if none match, the result has only the
    /// identifier column and no rows.
    ///
    /// # Errors
    /// Returns [`UkbError::PathNotFound`] if the project or phenotype directory
    /// is missing, [`UkbError::MissingColumn`] if a basket file lacks a field
    /// its manifest lists, or an error if a basket file cannot be parsed
    pub fn load<S: AsRef<str>>(&self, fields: &[S]) -> Result<RecordBatch> {
        let start = Instant::now();
        let phenotype_dir = validate_phenotype_layout(&self.layout)?;
        log_operation_start("Loading phenotype fields from", &phenotype_dir);

        let registry = FieldFinder::read(&self.layout)?.filter_fields(fields)?;
        self.warn_unmatched(fields, &registry)?;

        let duplicates = registry.duplicate_fields()?;
        if !duplicates.is_empty() {
            log::info!(
                "Fields exported in more than one basket, suffixing with basket id: {}",
                duplicates.iter().join(", ")
            );
        }

        let by_basket: BTreeMap<String, Vec<FieldDefinition>> = registry
            .definitions()?
            .into_iter()
            .into_group_map_by(|definition| definition.basket.clone())
            .into_iter()
            .collect();

        let mut tables = Vec::with_capacity(by_basket.len());
        for (basket, definitions) in &by_basket {
            let table = self.read_basket(basket, definitions)?;
            tables.push(suffix_duplicates(&table, basket, &duplicates)?);
        }

        let identifier = &self.layout.identifier_column;
        let mut tables = tables.into_iter();
        let phenotypes = match tables.next() {
            Some(first) => tables.try_fold(first, |joined, table| {
                outer_join(&joined, &table, identifier)
            })?,
            None => self.empty_table(),
        };

        log_operation_complete(
            "loaded",
            &phenotype_dir,
            phenotypes.num_rows(),
            start,
        );
        Ok(phenotypes)
    }

    /// Read the identifier and `definitions`' fields from one basket data file
    fn read_basket(&self, basket: &str, definitions: &[FieldDefinition]) -> Result<RecordBatch> {
        let path = self.layout.basket_data_file(basket);
        let identifier = self.layout.identifier_column.as_str();

        let columns: Vec<(&str, ColumnType)> =
            std::iter::once((identifier, ColumnType::Integer))
                .chain(definitions.iter().map(|definition| {
                    let column_type = self
                        .type_mapping
                        .resolve(&definition.field, definition.ukb_type.as_deref());
                    (definition.field.as_str(), column_type)
                }))
                .unique_by(|(name, _)| *name)
                .collect();
        log::debug!(
            "Reading {} fields from basket {basket}: {}",
            columns.len() - 1,
            path.display()
        );

        let needs_inference = columns
            .iter()
            .any(|(_, column_type)| *column_type == ColumnType::Inferred);
        let sample = if needs_inference {
            Some(self.layout.infer_max_records)
        } else {
            Some(0)
        };
        let file_schema = infer_file_schema(&path, CsvOptions::comma(), sample)?;

        let projection = columns
            .iter()
            .map(|(name, _)| {
                file_schema
                    .index_of(name)
                    .map_err(|_| UkbError::MissingColumn {
                        column: (*name).to_string(),
                        path: path.clone(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let strict = read_schema(&file_schema, &columns, false);
        let raw = match read_delimited(
            &path,
            Arc::new(strict),
            Some(projection.clone()),
            CsvOptions::comma(),
        ) {
            // A sampled guess can miss later values; keep untagged columns as text
            Err(UkbError::Arrow(error)) if needs_inference => {
                log_warning(
                    format_args!(
                        "Inferred column types did not fit ({error}), re-reading untagged fields as text"
                    ),
                    Some(&path),
                );
                let lenient = read_schema(&file_schema, &columns, true);
                read_delimited(&path, Arc::new(lenient), Some(projection), CsvOptions::comma())?
            }
            other => other?,
        };

        let (fields, arrays): (Vec<Field>, Vec<_>) = columns
            .iter()
            .zip(raw.columns())
            .map(|((name, column_type), array)| {
                let array = column_type.finish(array)?;
                Ok((Field::new(*name, array.data_type().clone(), true), array))
            })
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .unzip();

        Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
    }

    fn empty_table(&self) -> RecordBatch {
        let schema = Schema::new(vec![Field::new(
            &self.layout.identifier_column,
            DataType::Int64,
            true,
        )]);
        RecordBatch::new_empty(Arc::new(schema))
    }

    fn warn_unmatched<S: AsRef<str>>(&self, requested: &[S], registry: &FieldFinder) -> Result<()> {
        let found = registry.field_codes()?;
        let unmatched = requested
            .iter()
            .map(AsRef::as_ref)
            .filter(|code| *code != self.layout.identifier_column && !found.contains(*code))
            .unique()
            .collect::<Vec<_>>();

        log_unmatched_fields(&unmatched);
        Ok(())
    }
}

/// Schema for reading a basket file: every file column, typed for the wanted ones
///
/// Columns outside the projection are never parsed and stay text. Columns
/// with an inferred type take the type the sample produced, or text when the
/// sample held no values, or always text with `text_fallback`.
fn read_schema(
    file_schema: &Schema,
    columns: &[(&str, ColumnType)],
    text_fallback: bool,
) -> Schema {
    let wanted: FxHashMap<&str, ColumnType> = columns.iter().copied().collect();
    Schema::new(
        file_schema
            .fields()
            .iter()
            .map(|field| {
                let data_type = match wanted.get(field.name().as_str()) {
                    Some(column_type) => column_type
                        .to_read_type()
                        .unwrap_or_else(|| match field.data_type() {
                            _ if text_fallback => DataType::Utf8,
                            DataType::Null => DataType::Utf8,
                            inferred => inferred.clone(),
                        }),
                    None => DataType::Utf8,
                };
                Field::new(field.name(), data_type, true)
            })
            .collect::<Vec<_>>(),
    )
}

/// Rename columns in `duplicates` to `<field>_<basket>`
fn suffix_duplicates(
    table: &RecordBatch,
    basket: &str,
    duplicates: &BTreeSet<String>,
) -> Result<RecordBatch> {
    if duplicates.is_empty() {
        return Ok(table.clone());
    }
    let fields = table
        .schema()
        .fields()
        .iter()
        .map(|field| {
            if duplicates.contains(field.name()) {
                field
                    .as_ref()
                    .clone()
                    .with_name(format!("{}_{basket}", field.name()))
            } else {
                field.as_ref().clone()
            }
        })
        .collect::<Vec<_>>();

    Ok(RecordBatch::try_new(
        Arc::new(Schema::new(fields)),
        table.columns().to_vec(),
    )?)
}

/// Load phenotype `fields` from the project at `project_dir`
///
/// # Arguments
/// * `project_dir` - UK Biobank project directory
/// * `fields` - Field codes to load, e.g. `["31-0.0", "21022-0.0"]`
/// * `phenotype_subdir` - Phenotype sub-directory name, usually `phenotypes`
pub fn read_ukb_phenotype_fields<S: AsRef<str>>(
    project_dir: impl AsRef<Path>,
    fields: &[S],
    phenotype_subdir: impl AsRef<Path>,
) -> Result<RecordBatch> {
    let layout = ProjectLayout::new(project_dir.as_ref())
        .with_phenotype_subdir(phenotype_subdir.as_ref());
    PhenotypeLoader::new(layout).load(fields)
}
