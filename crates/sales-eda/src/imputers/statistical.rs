//! Statistical imputation methods.
//!
//! Provides median imputation for numeric columns and mode imputation for
//! categorical columns.

use crate::error::Result;
use crate::types::{ImputationRecord, ImputationStrategy};
use crate::utils::{
    count_missing_numeric, fill_numeric_nulls, fill_string_nulls, float_chunked, format_number,
    string_mode,
};
use polars::prelude::*;
use tracing::{debug, warn};

/// Result of imputing a set of columns.
#[derive(Debug, Clone)]
pub struct ImputationOutcome {
    pub df: DataFrame,
    pub records: Vec<ImputationRecord>,
    /// Columns that had missing values but nothing to compute a fill from.
    pub warnings: Vec<String>,
}

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Fill missing values in each numeric column with that column's median.
    ///
    /// Columns without missing values are left untouched, dtype included.
    pub fn impute_median(df: &DataFrame, columns: &[String]) -> Result<ImputationOutcome> {
        let mut out = df.clone();
        let mut records = Vec::new();
        let mut warnings = Vec::new();

        for col_name in columns {
            let series = df.column(col_name)?.as_materialized_series();
            if count_missing_numeric(series)? == 0 {
                continue;
            }

            let Some(median_val) = float_chunked(series)?.median() else {
                warn!("Column '{}' has no values to compute a median from", col_name);
                warnings.push(format!(
                    "Column '{}' is entirely missing; median imputation skipped",
                    col_name
                ));
                continue;
            };

            let (filled, count) = fill_numeric_nulls(series, median_val)?;
            out.replace(col_name, filled)?;
            debug!("Filled '{}' with median: {:.2}", col_name, median_val);

            records.push(ImputationRecord {
                column: col_name.clone(),
                strategy: ImputationStrategy::Median,
                fill_value: format_number(median_val),
                count,
            });
        }

        Ok(ImputationOutcome {
            df: out,
            records,
            warnings,
        })
    }

    /// Fill missing values in each categorical column with that column's mode.
    ///
    /// Ties resolve to the smallest value in sorted order.
    pub fn impute_mode(df: &DataFrame, columns: &[String]) -> Result<ImputationOutcome> {
        let mut out = df.clone();
        let mut records = Vec::new();
        let mut warnings = Vec::new();

        for col_name in columns {
            let series = df.column(col_name)?.as_materialized_series();
            if series.null_count() == 0 {
                continue;
            }

            let strings = series.cast(&DataType::String)?;
            let Some(mode_val) = string_mode(strings.str()?.into_iter().flatten()) else {
                warn!("Column '{}' has no values to compute a mode from", col_name);
                warnings.push(format!(
                    "Column '{}' is entirely missing; mode imputation skipped",
                    col_name
                ));
                continue;
            };

            let (filled, count) = fill_string_nulls(series, &mode_val)?;
            out.replace(col_name, filled)?;
            debug!("Filled '{}' with mode: '{}'", col_name, mode_val);

            records.push(ImputationRecord {
                column: col_name.clone(),
                strategy: ImputationStrategy::Mode,
                fill_value: mode_val,
                count,
            });
        }

        Ok(ImputationOutcome {
            df: out,
            records,
            warnings,
        })
    }
}
