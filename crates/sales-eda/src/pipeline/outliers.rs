//! Outlier handling module.
//!
//! Rows are rejected with the IQR method: anything outside
//! `[Q1 - k·IQR, Q3 + k·IQR]` on the value column is dropped. Dropping rows
//! moves the quartiles, so the filter repeats until the table sits inside the
//! fences computed from itself.

use crate::error::Result;
use crate::types::OutlierBounds;
use crate::utils::{float_values, linear_quantile};
use polars::prelude::*;
use tracing::debug;

/// Result of the outlier filter.
#[derive(Debug, Clone)]
pub struct OutlierOutcome {
    pub df: DataFrame,
    /// Fences of the final pass, reproducible from `df` alone.
    pub bounds: OutlierBounds,
    /// Rows removed across all passes.
    pub removed: usize,
    pub passes: usize,
}

/// Handles outlier detection and removal.
pub struct OutlierHandler;

impl OutlierHandler {
    /// Compute IQR fences over the non-missing values of `series`.
    ///
    /// Quartiles use linear interpolation between order statistics.
    /// Returns `None` when there are no values.
    pub fn iqr_bounds(series: &Series, multiplier: f64) -> Result<Option<OutlierBounds>> {
        let q1 = linear_quantile(series, 0.25)?;
        let q3 = linear_quantile(series, 0.75)?;
        Ok(q1
            .zip(q3)
            .map(|(q1, q3)| OutlierBounds::from_quartiles(q1, q3, multiplier)))
    }

    /// Drop rows whose value in `column` lies outside the IQR fences,
    /// recomputing the fences until a pass removes nothing.
    ///
    /// Returns `Ok(None)` when the column has no values to compute bounds from.
    pub fn remove_iqr_outliers(
        df: &DataFrame,
        column: &str,
        multiplier: f64,
    ) -> Result<Option<OutlierOutcome>> {
        let mut current = df.clone();
        let mut removed = 0;
        let mut passes = 0;
        let mut last_bounds = None;

        loop {
            let series = current.column(column)?.as_materialized_series();
            let Some(bounds) = Self::iqr_bounds(series, multiplier)? else {
                break;
            };
            passes += 1;
            last_bounds = Some(bounds);

            debug!(
                "IQR pass {} on '{}': Q1={:.2}, Q3={:.2}, IQR={:.2}, range=[{:.2}, {:.2}]",
                passes, column, bounds.q1, bounds.q3, bounds.iqr, bounds.lower, bounds.upper
            );

            let mask_values: Vec<bool> = float_values(series)?
                .iter()
                .map(|v| v.is_some_and(|x| bounds.contains(x)))
                .collect();
            let dropped = mask_values.iter().filter(|keep| !**keep).count();
            if dropped == 0 {
                break;
            }

            let mask = BooleanChunked::from_slice("mask".into(), &mask_values);
            current = current.filter(&mask)?;
            removed += dropped;
        }

        let Some(bounds) = last_bounds else {
            return Ok(None);
        };

        debug!(
            "Removed {} outlier rows from '{}' in {} passes",
            removed, column, passes
        );
        Ok(Some(OutlierOutcome {
            df: current,
            bounds,
            removed,
            passes,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iqr_bounds_linear_quartiles() {
        let series = Series::new("v".into(), &[4.0, 2.0, 1.0, 3.0]);
        let bounds = OutlierHandler::iqr_bounds(&series, 1.5).unwrap().unwrap();
        assert_eq!(bounds.q1, 1.75);
        assert_eq!(bounds.q3, 3.25);
        assert_eq!(bounds.iqr, 1.5);
        assert_eq!(bounds.lower, -0.5);
        assert_eq!(bounds.upper, 5.5);
    }

    #[test]
    fn test_iqr_bounds_empty() {
        let series = Series::new("v".into(), &[None::<f64>]);
        assert!(OutlierHandler::iqr_bounds(&series, 1.5).unwrap().is_none());
    }

    #[test]
    fn test_removes_extreme_value_in_tight_range() {
        let df = df![
            "total_sales_value" => [90.0, 95.0, 100.0, 105.0, 110.0, 10_000_000.0],
        ]
        .unwrap();

        let outcome = OutlierHandler::remove_iqr_outliers(&df, "total_sales_value", 1.5)
            .unwrap()
            .unwrap();
        assert_eq!(outcome.removed, 1);
        assert_eq!(outcome.df.height(), 5);
        assert!(outcome.bounds.upper < 10_000_000.0);
    }

    #[test]
    fn test_keeps_extreme_value_in_wide_distribution() {
        let df = df![
            "total_sales_value" => [
                1_000_000.0, 3_000_000.0, 5_000_000.0, 7_000_000.0, 9_000_000.0, 10_000_000.0,
            ],
        ]
        .unwrap();

        let outcome = OutlierHandler::remove_iqr_outliers(&df, "total_sales_value", 1.5)
            .unwrap()
            .unwrap();
        assert_eq!(outcome.removed, 0);
        assert_eq!(outcome.df.height(), 6);
        assert!(outcome.bounds.contains(10_000_000.0));
    }

    #[test]
    fn test_zero_iqr_keeps_only_the_constant() {
        let df = df!["v" => [5.0, 5.0, 5.0, 5.0, 6.0]].unwrap();
        let outcome = OutlierHandler::remove_iqr_outliers(&df, "v", 1.5)
            .unwrap()
            .unwrap();
        assert_eq!(outcome.bounds.iqr, 0.0);
        assert_eq!(outcome.removed, 1);
    }

    #[test]
    fn test_no_values_returns_none() {
        let df = df!["v" => [None::<f64>, None]].unwrap();
        assert!(
            OutlierHandler::remove_iqr_outliers(&df, "v", 1.5)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_repeats_until_stable() {
        let df = df![
            "total_sales_value" => [10.0, 10.0, 10.0, 10.0, 11.0, 12.0, 1000.0],
        ]
        .unwrap();

        let outcome = OutlierHandler::remove_iqr_outliers(&df, "total_sales_value", 1.5)
            .unwrap()
            .unwrap();
        // 1000, then 12, then 11 fall outside the narrowing fences.
        assert_eq!(outcome.removed, 3);
        assert_eq!(outcome.passes, 4);
        assert_eq!(outcome.df.height(), 4);

        let recomputed = OutlierHandler::iqr_bounds(
            outcome.df.column("total_sales_value").unwrap().as_materialized_series(),
            1.5,
        )
        .unwrap()
        .unwrap();
        assert_eq!(recomputed, outcome.bounds);

        let again = OutlierHandler::remove_iqr_outliers(&outcome.df, "total_sales_value", 1.5)
            .unwrap()
            .unwrap();
        assert_eq!(again.removed, 0);
        assert_eq!(again.passes, 1);
    }
}
