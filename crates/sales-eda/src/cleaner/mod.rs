//! Data cleaning module.
//!
//! This module provides the table-level cleaning stages:
//! - Column name normalization and required-column resolution
//! - Missing-marker sanitization
//! - Column classification into a typed schema
//! - Date parsing
//! - Dropping incomplete rows and exact duplicates

mod columns;
mod converters;
mod dates;
mod sanitizers;
mod schema;

pub use columns::{
    ColumnNormalizer, DATE_COLUMN, HEADER_ARTIFACT_CHARS, PERSON_COLUMN, PRIORITY_COLUMN,
    PRIORITY_NUMERIC_COLUMN, REQUIRED_COLUMNS, VALUE_COLUMN, has_column, normalize_column_name,
};
pub use dates::{DateNormalizer, DateOutcome};
pub use schema::{Classification, SchemaClassifier};

pub(crate) use converters::date_values;
pub(crate) use sanitizers::nullify_missing_markers;

use crate::error::Result;
use crate::utils::{float_values, is_numeric_dtype};
use polars::prelude::*;
use tracing::debug;

/// Row-level cleaning operations.
pub struct DataCleaner;

impl DataCleaner {
    /// Drop rows missing any of the given columns.
    ///
    /// NaN counts as missing in numeric columns. Returns the filtered table and
    /// the number of rows dropped.
    pub fn drop_incomplete_rows(
        &self,
        df: &DataFrame,
        columns: &[&str],
    ) -> Result<(DataFrame, usize)> {
        let mut keep = vec![true; df.height()];

        for name in columns {
            let series = df.column(name)?.as_materialized_series();
            if is_numeric_dtype(series.dtype()) {
                for (flag, value) in keep.iter_mut().zip(float_values(series)?) {
                    *flag &= value.is_some();
                }
            } else {
                let nulls = series.is_null();
                for (flag, is_null) in keep.iter_mut().zip(nulls.into_iter()) {
                    *flag &= !is_null.unwrap_or(false);
                }
            }
        }

        let dropped = keep.iter().filter(|k| !**k).count();
        if dropped == 0 {
            debug!("No rows missing {:?}", columns);
            return Ok((df.clone(), 0));
        }

        let mask = BooleanChunked::from_slice("mask".into(), &keep);
        let filtered = df.filter(&mask)?;
        debug!("Dropped {} rows missing {:?}", dropped, columns);
        Ok((filtered, dropped))
    }

    /// Remove rows that are exact duplicates across all columns, keeping the
    /// first occurrence and the original row order.
    pub fn remove_duplicates(&self, df: &DataFrame) -> Result<(DataFrame, usize)> {
        let before = df.height();
        let unique = df
            .clone()
            .lazy()
            .unique_stable(None, UniqueKeepStrategy::First)
            .collect()?;
        let removed = before - unique.height();

        if removed > 0 {
            let pct = (removed as f64 / before as f64) * 100.0;
            debug!("Removed {} duplicate rows ({:.1}%)", removed, pct);
        } else {
            debug!("No duplicate rows found");
        }

        Ok((unique, removed))
    }
}
