//! Raw dataset overview.
//!
//! Summarizes a table before cleaning: shape, per-column dtypes, missing
//! counts and cardinality, and the number of exact duplicate rows.

use anyhow::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-column profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnOverview {
    pub name: String,
    pub dtype: String,
    pub null_count: usize,
    pub null_percentage: f64,
    pub unique_count: usize,
}

/// Overview of a whole table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetOverview {
    /// `(rows, columns)`
    pub shape: (usize, usize),
    pub columns: Vec<ColumnOverview>,
    pub duplicate_count: usize,
}

impl DatasetOverview {
    /// Total missing cells across all columns.
    pub fn total_missing(&self) -> usize {
        self.columns.iter().map(|c| c.null_count).sum()
    }
}

/// Data profiler for the raw input.
pub struct DataProfiler;

impl DataProfiler {
    /// Profile every column of `df` in order.
    pub fn overview(df: &DataFrame) -> Result<DatasetOverview> {
        let mut columns = Vec::with_capacity(df.width());
        for col in df.get_columns() {
            columns.push(Self::profile_column(df, col)?);
        }

        let duplicate_count = df.height()
            - df.unique::<&str, &str>(None, UniqueKeepStrategy::First, None)?
                .height();

        Ok(DatasetOverview {
            shape: (df.height(), df.width()),
            columns,
            duplicate_count,
        })
    }

    fn profile_column(df: &DataFrame, col: &Column) -> Result<ColumnOverview> {
        let series = col.as_materialized_series();
        let null_count = series.null_count();
        let null_percentage = if df.height() > 0 {
            (null_count as f64 / df.height() as f64) * 100.0
        } else {
            0.0
        };

        Ok(ColumnOverview {
            name: col.name().to_string(),
            dtype: series.dtype().to_string(),
            null_count,
            null_percentage,
            unique_count: series.n_unique()?,
        })
    }
}
