//! Identifier-preserving outer join of record batches
//!
//! Arrow has no join kernel, so rows are matched through a hash index over the
//! row-format encoding of the key column. This works for any key type the row
//! format supports.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, UInt64Array};
use arrow::compute::kernels::zip::zip;
use arrow::compute::{is_not_null, take};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::row::{Row, RowConverter, SortField};
use rustc_hash::FxHashMap;

use crate::error::{Result, UkbError};

/// Full outer join of `left` and `right` on the column `key`
///
/// Every row of both inputs appears in the output: matched rows are combined,
/// unmatched rows get nulls in the other side's columns. Output rows are the
/// left rows in order (each repeated once per match) followed by the right
/// rows that matched nothing. The key column comes first and is coalesced from
/// both sides, then the left and the right non-key columns. Null keys never
/// match. All output columns are nullable.
///
/// # Errors
/// Returns [`UkbError::Schema`] if either side lacks `key`, the key types
/// differ, or a non-key column name appears on both sides
pub fn outer_join(left: &RecordBatch, right: &RecordBatch, key: &str) -> Result<RecordBatch> {
    let left_schema = left.schema();
    let right_schema = right.schema();
    let left_key_idx = key_index(&left_schema, key, "left")?;
    let right_key_idx = key_index(&right_schema, key, "right")?;
    let left_key = left.column(left_key_idx);
    let right_key = right.column(right_key_idx);

    if left_key.data_type() != right_key.data_type() {
        return Err(UkbError::Schema(format!(
            "cannot join on '{key}': {:?} and {:?} differ",
            left_key.data_type(),
            right_key.data_type()
        )));
    }
    for field in right_schema.fields() {
        if field.name() != key && left_schema.index_of(field.name()).is_ok() {
            return Err(UkbError::Schema(format!(
                "column '{}' present on both sides of join on '{key}'",
                field.name()
            )));
        }
    }

    let (left_indices, right_indices) = match_rows(left_key, right_key)?;

    let key_from_left = take(left_key.as_ref(), &left_indices, None)?;
    let key_from_right = take(right_key.as_ref(), &right_indices, None)?;
    let has_left = is_not_null(&left_indices)?;
    let key_column = zip(&has_left, &key_from_left, &key_from_right)?;

    let mut fields = vec![nullable(left_schema.field(left_key_idx))];
    let mut columns = vec![key_column];
    for (side, schema, indices, key_idx) in [
        (left, &left_schema, &left_indices, left_key_idx),
        (right, &right_schema, &right_indices, right_key_idx),
    ] {
        for (i, column) in side.columns().iter().enumerate() {
            if i == key_idx {
                continue;
            }
            fields.push(nullable(schema.field(i)));
            columns.push(take(column.as_ref(), indices, None)?);
        }
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

fn key_index(schema: &Schema, key: &str, side: &str) -> Result<usize> {
    schema
        .index_of(key)
        .map_err(|_| UkbError::Schema(format!("{side} side of join has no '{key}' column")))
}

fn nullable(field: &Field) -> Field {
    field.clone().with_nullable(true)
}

/// Pair up row positions of two key columns, `None` marking a missing side
fn match_rows(left_key: &ArrayRef, right_key: &ArrayRef) -> Result<(UInt64Array, UInt64Array)> {
    let converter = RowConverter::new(vec![SortField::new(left_key.data_type().clone())])?;
    let left_rows = converter.convert_columns(&[left_key.clone()])?;
    let right_rows = converter.convert_columns(&[right_key.clone()])?;

    let mut right_index: FxHashMap<Row<'_>, Vec<usize>> = FxHashMap::default();
    for i in (0..right_key.len()).filter(|&i| right_key.is_valid(i)) {
        right_index.entry(right_rows.row(i)).or_default().push(i);
    }

    let capacity = left_key.len() + right_key.len();
    let mut left_take: Vec<Option<u64>> = Vec::with_capacity(capacity);
    let mut right_take: Vec<Option<u64>> = Vec::with_capacity(capacity);
    let mut right_matched = vec![false; right_key.len()];

    for i in 0..left_key.len() {
        let matches = if left_key.is_valid(i) {
            right_index.get(&left_rows.row(i))
        } else {
            None
        };
        match matches {
            Some(positions) => {
                for &r in positions {
                    left_take.push(Some(i as u64));
                    right_take.push(Some(r as u64));
                    right_matched[r] = true;
                }
            }
            None => {
                left_take.push(Some(i as u64));
                right_take.push(None);
            }
        }
    }

    for (r, _) in right_matched.iter().enumerate().filter(|(_, matched)| !**matched) {
        left_take.push(None);
        right_take.push(Some(r as u64));
    }

    Ok((UInt64Array::from(left_take), UInt64Array::from(right_take)))
}
