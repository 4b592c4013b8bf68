//! Salesperson, daily and priority aggregates.

use crate::cleaner::{
    DATE_COLUMN, PERSON_COLUMN, PRIORITY_COLUMN, VALUE_COLUMN, date_values, has_column,
};
use crate::error::Result;
use crate::types::Priority;
use crate::utils::{float_values, string_values};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-salesperson totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalespersonSummary {
    pub sales_person: String,
    pub total_sales: f64,
    pub avg_sales: f64,
    pub deal_count: usize,
}

/// Aggregate sales per person, sorted by total descending then name ascending.
pub fn salesperson_summary(df: &DataFrame) -> Result<Vec<SalespersonSummary>> {
    let grouped = df
        .clone()
        .lazy()
        .select([
            col(PERSON_COLUMN).cast(DataType::String),
            col(VALUE_COLUMN).cast(DataType::Float64),
        ])
        .drop_nulls(None)
        .group_by([col(PERSON_COLUMN)])
        .agg([
            col(VALUE_COLUMN).sum().alias("total_sales"),
            col(VALUE_COLUMN).mean().alias("avg_sales"),
            col(VALUE_COLUMN).count().cast(DataType::UInt64).alias("deal_count"),
        ])
        .sort_by_exprs(
            [col("total_sales"), col(PERSON_COLUMN)],
            SortMultipleOptions::default().with_order_descending_multi([true, false]),
        )
        .collect()?;

    let people = string_values(grouped.column(PERSON_COLUMN)?.as_materialized_series())?;
    let totals = float_values(grouped.column("total_sales")?.as_materialized_series())?;
    let averages = float_values(grouped.column("avg_sales")?.as_materialized_series())?;
    let counts = grouped.column("deal_count")?.u64()?;

    Ok(people
        .into_iter()
        .zip(totals)
        .zip(averages)
        .zip(counts)
        .filter_map(|(((person, total), avg), count)| {
            Some(SalespersonSummary {
                sales_person: person?,
                total_sales: total?,
                avg_sales: avg?,
                deal_count: count? as usize,
            })
        })
        .collect())
}

/// Render a salesperson summary as a table for display or export.
pub fn summary_frame(summary: &[SalespersonSummary]) -> PolarsResult<DataFrame> {
    df![
        PERSON_COLUMN => summary.iter().map(|s| s.sales_person.as_str()).collect::<Vec<_>>(),
        "total_sales" => summary.iter().map(|s| s.total_sales).collect::<Vec<_>>(),
        "avg_sales" => summary.iter().map(|s| s.avg_sales).collect::<Vec<_>>(),
        "deal_count" => summary.iter().map(|s| s.deal_count as u64).collect::<Vec<_>>(),
    ]
}

/// Highest and lowest total sales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Performers {
    pub top: SalespersonSummary,
    pub bottom: SalespersonSummary,
}

/// Pick the top and bottom performer. Ties go to the name that sorts first.
pub fn top_and_bottom_performer(summary: &[SalespersonSummary]) -> Option<Performers> {
    let top = summary.iter().min_by(|a, b| {
        b.total_sales
            .total_cmp(&a.total_sales)
            .then_with(|| a.sales_person.cmp(&b.sales_person))
    })?;
    let bottom = summary.iter().min_by(|a, b| {
        a.total_sales
            .total_cmp(&b.total_sales)
            .then_with(|| a.sales_person.cmp(&b.sales_person))
    })?;

    Some(Performers {
        top: top.clone(),
        bottom: bottom.clone(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total_sales: f64,
}

/// Total sales per calendar day, ascending. Rows without a date are skipped;
/// a table without a `date` column yields no points.
pub fn daily_totals(df: &DataFrame) -> Result<Vec<DailyTotal>> {
    if !has_column(df, DATE_COLUMN) {
        return Ok(Vec::new());
    }

    let grouped = df
        .clone()
        .lazy()
        .select([
            col(DATE_COLUMN).cast(DataType::Date),
            col(VALUE_COLUMN).cast(DataType::Float64),
        ])
        .drop_nulls(None)
        .group_by([col(DATE_COLUMN)])
        .agg([col(VALUE_COLUMN).sum().alias("total_sales")])
        .sort([DATE_COLUMN], SortMultipleOptions::default())
        .collect()?;

    let dates = date_values(grouped.column(DATE_COLUMN)?.as_materialized_series())?;
    let totals = float_values(grouped.column("total_sales")?.as_materialized_series())?;

    Ok(dates
        .into_iter()
        .zip(totals)
        .filter_map(|(date, total_sales)| {
            Some(DailyTotal {
                date: date?,
                total_sales: total_sales?,
            })
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityTotal {
    pub priority: Priority,
    pub total_sales: f64,
}

/// Total sales per priority in chart order (Critical first). Absent levels
/// report zero.
pub fn priority_totals(df: &DataFrame) -> Result<Vec<PriorityTotal>> {
    let grouped = df
        .clone()
        .lazy()
        .select([
            col(PRIORITY_COLUMN).cast(DataType::String),
            col(VALUE_COLUMN).cast(DataType::Float64),
        ])
        .drop_nulls(None)
        .group_by([col(PRIORITY_COLUMN)])
        .agg([col(VALUE_COLUMN).sum().alias("total_sales")])
        .collect()?;

    let labels = string_values(grouped.column(PRIORITY_COLUMN)?.as_materialized_series())?;
    let totals = float_values(grouped.column("total_sales")?.as_materialized_series())?;
    let by_priority: Vec<(Priority, f64)> = labels
        .into_iter()
        .zip(totals)
        .filter_map(|(label, total)| Some((Priority::from_label(label.as_deref()?)?, total?)))
        .collect();

    Ok(Priority::CHART_ORDER
        .into_iter()
        .map(|priority| PriorityTotal {
            priority,
            total_sales: by_priority
                .iter()
                .filter(|(p, _)| *p == priority)
                .map(|(_, total)| total)
                .sum(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::DateNormalizer;
    use crate::config::CleanerConfig;

    fn clean_sample() -> DataFrame {
        df![
            "sales_person" => ["Bob", "Alice", "Alice", "Cara", "Dan"],
            "total_sales_value" => [300.0, 100.0, 200.0, 50.0, 300.0],
            "priority" => ["High", "Low", "Low", "Critical", "High"],
        ]
        .unwrap()
    }

    // ========================================================================
    // Salesperson summary
    // ========================================================================

    #[test]
    fn test_salesperson_summary_order() {
        let summary = salesperson_summary(&clean_sample()).unwrap();
        let names: Vec<&str> = summary.iter().map(|s| s.sales_person.as_str()).collect();
        // Alice, Bob and Dan tie on 300; names break the tie.
        assert_eq!(names, vec!["Alice", "Bob", "Dan", "Cara"]);

        let alice = &summary[0];
        assert_eq!(alice.total_sales, 300.0);
        assert_eq!(alice.avg_sales, 150.0);
        assert_eq!(alice.deal_count, 2);
    }

    #[test]
    fn test_salesperson_summary_skips_missing_values() {
        let df = df![
            "sales_person" => [Some("Eve"), Some("Eve"), None, Some("Finn")],
            "total_sales_value" => [Some(40.0), None, Some(90.0), Some(40.0)],
        ]
        .unwrap();

        let summary = salesperson_summary(&df).unwrap();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].sales_person, "Eve");
        assert_eq!(summary[0].deal_count, 1);
        assert_eq!(summary[1].sales_person, "Finn");
        assert_eq!(summary[1].total_sales, 40.0);
    }

    #[test]
    fn test_summary_frame_shape() {
        let summary = salesperson_summary(&clean_sample()).unwrap();
        let frame = summary_frame(&summary).unwrap();
        assert_eq!(frame.shape(), (4, 4));
    }

    #[test]
    fn test_top_and_bottom() {
        let summary = salesperson_summary(&clean_sample()).unwrap();
        let performers = top_and_bottom_performer(&summary).unwrap();
        assert_eq!(performers.top.sales_person, "Alice");
        assert_eq!(performers.bottom.sales_person, "Cara");
        assert!(top_and_bottom_performer(&[]).is_none());
    }

    // ========================================================================
    // Daily and priority totals
    // ========================================================================

    #[test]
    fn test_daily_totals_skip_missing_dates() {
        let raw = df![
            "total_sales_value" => [10.0, 20.0, 5.0, 7.0],
            "date" => [Some("2024-01-02"), Some("2024-01-01"), Some("2024-01-02"), None],
        ]
        .unwrap();
        let formats = CleanerConfig::default().date_formats;
        let (df, _) = DateNormalizer { formats: &formats }.normalize(&raw).unwrap();

        let daily = daily_totals(&df).unwrap();
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(daily[0].total_sales, 20.0);
        assert_eq!(daily[1].total_sales, 15.0);
    }

    #[test]
    fn test_daily_totals_without_date_column() {
        assert!(daily_totals(&clean_sample()).unwrap().is_empty());
    }

    #[test]
    fn test_priority_totals_fixed_order() {
        let totals = priority_totals(&clean_sample()).unwrap();
        let order: Vec<Priority> = totals.iter().map(|t| t.priority).collect();
        assert_eq!(order, Priority::CHART_ORDER.to_vec());

        let values: Vec<f64> = totals.iter().map(|t| t.total_sales).collect();
        assert_eq!(values, vec![50.0, 600.0, 0.0, 300.0]);
    }
}
