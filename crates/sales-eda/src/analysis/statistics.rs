//! Descriptive statistics and correlation over the clean table.

use crate::cleaner::{PRIORITY_NUMERIC_COLUMN, VALUE_COLUMN, has_column};
use crate::error::{CleaningError, Result};
use crate::utils::{float_chunked, float_values, is_numeric_dtype, string_values};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Summary statistics for one numeric column or group.
///
/// Quantiles use linear interpolation. `std` is the sample standard
/// deviation and is `None` for fewer than two values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: Option<f64>,
    pub min: f64,
    #[serde(rename = "25%")]
    pub q25: f64,
    #[serde(rename = "50%")]
    pub median: f64,
    #[serde(rename = "75%")]
    pub q75: f64,
    pub max: f64,
}

impl DescriptiveStats {
    /// Describe the non-missing values of a numeric series; `None` when
    /// there are none.
    pub fn from_series(series: &Series) -> Result<Option<Self>> {
        let name = series.name().to_string();
        let df = float_chunked(series)?.into_series().into_frame();

        let described = df.lazy().select(describe_exprs(&name)).collect()?;
        Ok(read_stats(&described, &name)?.into_iter().flatten().next())
    }
}

/// count, mean, std, min, quartiles and max of `column` as one aggregation.
fn describe_exprs(column: &str) -> Vec<Expr> {
    let value = || col(column).cast(DataType::Float64);
    vec![
        value().count().cast(DataType::UInt64).alias("count"),
        value().mean().alias("mean"),
        value().std(1).alias("std"),
        value().min().alias("min"),
        value().quantile(lit(0.25), QuantileMethod::Linear).alias("25%"),
        value().median().alias("50%"),
        value().quantile(lit(0.75), QuantileMethod::Linear).alias("75%"),
        value().max().alias("max"),
    ]
}

/// Read the rows produced by [`describe_exprs`]. Rows without values are `None`.
fn read_stats(described: &DataFrame, column: &str) -> Result<Vec<Option<DescriptiveStats>>> {
    let stat = |name: &str| -> Result<Vec<Option<f64>>> {
        Ok(float_values(described.column(name)?.as_materialized_series())?)
    };
    let counts = stat("count")?;
    let means = stat("mean")?;
    let stds = stat("std")?;
    let mins = stat("min")?;
    let q25s = stat("25%")?;
    let medians = stat("50%")?;
    let q75s = stat("75%")?;
    let maxs = stat("max")?;

    Ok((0..described.height())
        .map(|i| {
            let count = counts[i].unwrap_or(0.0) as usize;
            if count == 0 {
                return None;
            }
            Some(DescriptiveStats {
                column: column.to_string(),
                count,
                mean: means[i]?,
                std: if count < 2 { None } else { stds[i] },
                min: mins[i]?,
                q25: q25s[i]?,
                median: medians[i]?,
                q75: q75s[i]?,
                max: maxs[i]?,
            })
        })
        .collect())
}

/// `describe()` for every numeric column, in column order.
///
/// Columns without any values are skipped.
pub fn describe_numeric(df: &DataFrame) -> Result<Vec<DescriptiveStats>> {
    let mut stats = Vec::new();
    for col in df.get_columns() {
        if !is_numeric_dtype(col.dtype()) {
            continue;
        }
        if let Some(described) = DescriptiveStats::from_series(col.as_materialized_series())? {
            stats.push(described);
        }
    }
    Ok(stats)
}

/// Stats of `total_sales_value` for one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub group: String,
    pub stats: DescriptiveStats,
}

/// Describe `total_sales_value` per distinct value of `key`, in sorted key order.
pub fn grouped_describe(df: &DataFrame, key: &str) -> Result<Vec<GroupStats>> {
    if !has_column(df, key) {
        return Err(CleaningError::ColumnNotFound(key.to_string()));
    }

    let grouped = df
        .clone()
        .lazy()
        .filter(col(key).is_not_null())
        .group_by([col(key).cast(DataType::String)])
        .agg(describe_exprs(VALUE_COLUMN))
        .sort([key], SortMultipleOptions::default())
        .collect()?;

    let groups = string_values(grouped.column(key)?.as_materialized_series())?;
    let stats = read_stats(&grouped, VALUE_COLUMN)?;

    Ok(groups
        .into_iter()
        .zip(stats)
        .filter_map(|(group, stats)| Some(GroupStats { group: group?, stats: stats? }))
        .collect())
}

/// Pearson correlation over paired values.
///
/// Undefined (`None`) for fewer than two pairs or zero variance on either side.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len().min(y.len());
    if n < 2 {
        return None;
    }
    let (x, y) = (&x[..n], &y[..n]);
    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

/// Rows where both columns are present.
fn paired_values(df: &DataFrame, a: &str, b: &str) -> Result<(Vec<f64>, Vec<f64>)> {
    let xs = float_values(df.column(a)?.as_materialized_series())?;
    let ys = float_values(df.column(b)?.as_materialized_series())?;
    Ok(xs
        .into_iter()
        .zip(ys)
        .filter_map(|(x, y)| Some((x?, y?)))
        .unzip())
}

/// Pearson correlation between `priority_numeric` and `total_sales_value`.
pub fn priority_value_correlation(df: &DataFrame) -> Result<Option<f64>> {
    let (x, y) = paired_values(df, PRIORITY_NUMERIC_COLUMN, VALUE_COLUMN)?;
    Ok(pearson(&x, &y))
}

/// Square correlation matrix; `values[i][j]` pairs `columns[i]` with `columns[j]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == row)?;
        let j = self.columns.iter().position(|c| c == col)?;
        self.values[i][j]
    }
}

/// Pairwise Pearson correlation between the given columns.
pub fn correlation_matrix(df: &DataFrame, columns: &[&str]) -> Result<CorrelationMatrix> {
    if let Some(missing) = columns.iter().find(|c| !has_column(df, c)) {
        return Err(CleaningError::ColumnNotFound(missing.to_string()));
    }

    let mut values = Vec::with_capacity(columns.len());
    for a in columns {
        let mut row = Vec::with_capacity(columns.len());
        for b in columns {
            let (x, y) = paired_values(df, a, b)?;
            row.push(pearson(&x, &y));
        }
        values.push(row);
    }

    Ok(CorrelationMatrix {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        values,
    })
}
