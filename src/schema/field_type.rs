//! Mapping from UK Biobank value types to Arrow column types
//!
//! Every field in a field finder manifest carries a `ukb_type` tag such as
//! `Integer` or `Categorical (single)`. [`TypeMapping`] turns those tags into
//! the column type used when a basket file is read. Tags missing from the
//! table resolve to [`ColumnType::Inferred`] so an unexpected tag never aborts
//! a load.

use std::fmt;

use arrow::array::ArrayRef;
use arrow::compute::kernels::cast;
use arrow::datatypes::{DataType, TimeUnit};
use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::utils::logging::log_type_fallback;

/// Semantic type of a phenotype column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Integer value
    Integer,
    /// Text value, including categorical codes
    Text,
    /// Floating point value
    Float,
    /// Calendar date
    Date,
    /// Time of day
    Time,
    /// Raw bytes
    Binary,
    /// Unknown; inferred from the data on a best-effort basis
    Inferred,
}

impl ColumnType {
    /// Arrow type of the finished column, `None` for [`ColumnType::Inferred`]
    #[must_use]
    pub fn to_arrow_type(self) -> Option<DataType> {
        match self {
            Self::Integer => Some(DataType::Int64),
            Self::Text => Some(DataType::Utf8),
            Self::Float => Some(DataType::Float64),
            Self::Date => Some(DataType::Date32),
            Self::Time => Some(DataType::Time64(TimeUnit::Microsecond)),
            Self::Binary => Some(DataType::Binary),
            Self::Inferred => None,
        }
    }

    /// Arrow type the CSV reader parses the column as
    ///
    /// Times and binary objects are read as text and converted afterwards by
    /// [`ColumnType::finish`].
    #[must_use]
    pub fn to_read_type(self) -> Option<DataType> {
        match self {
            Self::Time | Self::Binary => Some(DataType::Utf8),
            other => other.to_arrow_type(),
        }
    }

    /// Convert a column read with [`ColumnType::to_read_type`] to its final type
    ///
    /// # Errors
    /// Returns an error if a value cannot be cast, e.g. a malformed time
    pub fn finish(self, array: &ArrayRef) -> Result<ArrayRef> {
        match self.to_arrow_type() {
            Some(target) if array.data_type() != &target => {
                Ok(cast::cast(array, &target)?)
            }
            _ => Ok(array.clone()),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "Integer"),
            Self::Text => write!(f, "Text"),
            Self::Float => write!(f, "Float"),
            Self::Date => write!(f, "Date"),
            Self::Time => write!(f, "Time"),
            Self::Binary => write!(f, "Binary"),
            Self::Inferred => write!(f, "Inferred"),
        }
    }
}

/// Value type tags used in UK Biobank field finder manifests
pub const UKB_TYPE_TABLE: &[(&str, ColumnType)] = &[
    ("Sequence", ColumnType::Integer),
    ("Integer", ColumnType::Integer),
    ("Categorical (single)", ColumnType::Text),
    ("Categorical (multiple)", ColumnType::Text),
    ("Continuous", ColumnType::Float),
    ("Text", ColumnType::Text),
    ("Date", ColumnType::Date),
    ("Time", ColumnType::Time),
    ("Compound", ColumnType::Text),
    ("Binary object", ColumnType::Binary),
    ("Records", ColumnType::Text),
    ("Curve", ColumnType::Text),
];

/// Lookup table from value type tag to column type with a fallback for unknown tags
#[derive(Debug, Clone)]
pub struct TypeMapping {
    table: FxHashMap<String, ColumnType>,
    fallback: ColumnType,
}

impl Default for TypeMapping {
    fn default() -> Self {
        Self {
            table: UKB_TYPE_TABLE
                .iter()
                .map(|(tag, column_type)| ((*tag).to_string(), *column_type))
                .collect(),
            fallback: ColumnType::Inferred,
        }
    }
}

impl TypeMapping {
    /// Add or replace the column type of a tag
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>, column_type: ColumnType) -> Self {
        self.table.insert(tag.into(), column_type);
        self
    }

    /// Column type of a known tag
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<ColumnType> {
        self.table.get(tag).copied()
    }

    #[must_use]
    pub fn fallback(&self) -> ColumnType {
        self.fallback
    }

    /// Resolve the column type of `field`, falling back for missing or unknown tags
    ///
    /// Unknown tags are logged as warnings, never raised.
    #[must_use]
    pub fn resolve(&self, field: &str, tag: Option<&str>) -> ColumnType {
        match tag {
            Some(tag) => self.get(tag).unwrap_or_else(|| {
                log_type_fallback(field, Some(tag), self.fallback);
                self.fallback
            }),
            None => {
                log_type_fallback(field, None, self.fallback);
                self.fallback
            }
        }
    }
}
