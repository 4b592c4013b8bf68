//! Integration tests for the sales cleaning pipeline.
//!
//! These tests verify end-to-end behavior from CSV fixtures through cleaning,
//! analysis and output generation.

use chrono::NaiveDate;
use polars::prelude::*;
use pretty_assertions::assert_eq;
use sales_eda::{
    AnalysisReport, ChartSet, Cleaner, CleanerConfig, CleaningError, DataProfiler,
    OutlierHandler, OutputFormat, Priority, ReportGenerator, ReportParams, SchemaError,
    UnmappedPriorityPolicy, clean, daily_totals, load_csv, priority_totals, salesperson_summary,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_fixture(filename: &str) -> DataFrame {
    load_csv(fixtures_path().join(filename)).expect("Failed to read fixture")
}

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|c| c.to_string()).collect()
}

fn f64_column(df: &DataFrame, name: &str) -> Vec<f64> {
    df.column(name)
        .unwrap()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_no_null_iter()
        .collect()
}

fn str_column(df: &DataFrame, name: &str) -> Vec<String> {
    df.column(name)
        .unwrap()
        .str()
        .unwrap()
        .into_no_null_iter()
        .map(|s| s.to_string())
        .collect()
}

fn cleaner_with(config: CleanerConfig) -> Cleaner {
    Cleaner::builder().config(config).build().unwrap()
}

fn temp_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("sales_eda_it_{}_{}", tag, std::process::id()))
}

// ============================================================================
// Messy Input
// ============================================================================

#[test]
fn test_messy_headers_are_normalized() {
    let raw = load_fixture("sales_messy.csv");
    let (df, report) = clean(&raw).unwrap();

    assert_eq!(
        column_names(&df),
        vec![
            "sales_person",
            "total_sales_value",
            "priority",
            "date",
            "units",
            "priority_numeric",
        ]
    );
    assert_eq!(report.value_column_renamed_from.as_deref(), Some("value_"));
    assert_eq!(report.renamed_columns.len(), 5);
}

#[test]
fn test_messy_row_accounting() {
    let raw = load_fixture("sales_messy.csv");
    let (df, report) = clean(&raw).unwrap();

    assert_eq!(report.rows_in, 8);
    assert_eq!(report.rows_dropped_missing_required, 2);
    assert_eq!(report.rows_dropped_unmapped_priority, 1);
    assert_eq!(report.unmapped_priority_values, vec!["Banana"]);
    assert_eq!(report.duplicates_removed, 1);
    assert_eq!(report.outliers_removed, 0);
    assert_eq!(report.rows_out, 4);
    assert_eq!(df.height(), 4);
    assert_eq!(report.total_rows_removed(), 4);

    assert_eq!(str_column(&df, "sales_person"), vec!["Alice", "Bob", "Carol", "Frank"]);
    assert!(report.warnings.iter().any(|w| w.contains("narrowed")));
    assert!(report.warnings.iter().any(|w| w.contains("High data loss")));
}

#[test]
fn test_messy_imputation_and_dates() {
    let raw = load_fixture("sales_messy.csv");
    let (df, report) = clean(&raw).unwrap();

    // Median of the remaining units [5, 7, 4, 5, 6]
    assert_eq!(f64_column(&df, "units"), vec![5.0, 5.0, 7.0, 6.0]);
    assert_eq!(report.total_imputed(), 1);
    assert_eq!(report.imputations[0].column, "units");

    assert_eq!(df.column("date").unwrap().dtype(), &DataType::Date);
    assert_eq!(report.unparseable_dates, 1);
    assert_eq!(report.missing_dates, 1);

    let daily = daily_totals(&df).unwrap();
    let dates: Vec<NaiveDate> = daily.iter().map(|d| d.date).collect();
    assert_eq!(
        dates,
        vec![
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
        ]
    );
}

// ============================================================================
// Invariants
// ============================================================================

#[test]
fn test_no_missing_values_outside_date() {
    let (df, _) = clean(&load_fixture("sales_messy.csv")).unwrap();

    for column in df.get_columns() {
        if column.name().as_str() == "date" {
            continue;
        }
        assert_eq!(column.null_count(), 0, "column '{}' has nulls", column.name());
    }
}

#[test]
fn test_priority_numeric_matches_label() {
    let (df, _) = clean(&load_fixture("sales_messy.csv")).unwrap();

    let labels = str_column(&df, "priority");
    let ranks: Vec<i64> = df
        .column("priority_numeric")
        .unwrap()
        .i64()
        .unwrap()
        .into_no_null_iter()
        .collect();

    assert_eq!(labels, vec!["Low", "High", "Medium", "Critical"]);
    assert_eq!(ranks, vec![1, 3, 2, 4]);
    for (label, rank) in labels.iter().zip(ranks) {
        assert_eq!(Priority::from_label(label).map(Priority::rank), Some(rank));
    }
}

#[test]
fn test_values_within_reported_bounds() {
    let (df, report) = clean(&load_fixture("sales_outliers.csv")).unwrap();
    let bounds = report.outlier_bounds.expect("bounds should be reported");

    for value in f64_column(&df, "total_sales_value") {
        assert!(bounds.contains(value), "{} outside [{}, {}]", value, bounds.lower, bounds.upper);
    }
}

#[test]
fn test_cleaning_is_idempotent() {
    let (first, _) = clean(&load_fixture("sales_messy.csv")).unwrap();
    let (second, report) = clean(&first).unwrap();

    assert_eq!(report.rows_in, report.rows_out);
    assert_eq!(report.duplicates_removed, 0);
    assert_eq!(report.rows_dropped_unmapped_priority, 0);
    assert!(report.renamed_columns.is_empty());
    assert!(first.equals_missing(&second));
}

#[test]
fn test_cleaning_is_idempotent_after_removing_outliers() {
    let (first, report) = clean(&load_fixture("sales_shifting_outliers.csv")).unwrap();
    // Dropping 1000 moves Q3 enough that 12 and then 11 fall outside too.
    assert_eq!(report.outliers_removed, 3);
    assert_eq!(f64_column(&first, "total_sales_value"), vec![10.0; 4]);

    let (second, again) = clean(&first).unwrap();
    assert_eq!(again.outliers_removed, 0);
    assert_eq!(again.outlier_bounds, report.outlier_bounds);
    assert!(first.equals_missing(&second));
}

#[test]
fn test_reported_bounds_reproduce_from_clean_table() {
    for fixture in ["sales_outliers.csv", "sales_shifting_outliers.csv", "sales_messy.csv"] {
        let (df, report) = clean(&load_fixture(fixture)).unwrap();
        let values = df.column("total_sales_value").unwrap().as_materialized_series();

        let recomputed = OutlierHandler::iqr_bounds(values, 1.5).unwrap();
        assert_eq!(recomputed, report.outlier_bounds, "{}", fixture);
    }
}

#[test]
fn test_input_is_not_modified() {
    let raw = load_fixture("sales_messy.csv");
    let before = raw.clone();
    clean(&raw).unwrap();
    assert!(raw.equals_missing(&before));
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_duplicate_removed_after_imputation() {
    let raw = df![
        "Sales Person" => ["Alice", "Bob", "Alice"],
        "Value £" => [100.0, 200.0, 100.0],
        "Priority" => ["Low", "High", "Low"],
        "Date" => ["2024-01-01", "2024-01-02", "2024-01-01"],
        "Units" => [Some(100.0), None, Some(100.0)],
    ]
    .unwrap();

    let (df, report) = clean(&raw).unwrap();

    assert_eq!(df.height(), 2);
    assert_eq!(report.duplicates_removed, 1);
    assert_eq!(f64_column(&df, "units"), vec![100.0, 100.0]);
    assert_eq!(f64_column(&df, "total_sales_value"), vec![100.0, 200.0]);
    assert_eq!(report.outliers_removed, 0);
}

#[test]
fn test_unmapped_priority_is_filtered() {
    let raw = df![
        "sales_person" => ["Alice", "Bob", "Cara"],
        "total_sales_value" => [100.0, 110.0, 120.0],
        "priority" => ["low", "banana", " HIGH "],
    ]
    .unwrap();

    let (df, report) = clean(&raw).unwrap();

    assert_eq!(str_column(&df, "sales_person"), vec!["Alice", "Cara"]);
    assert_eq!(str_column(&df, "priority"), vec!["Low", "High"]);
    assert_eq!(report.rows_dropped_unmapped_priority, 1);
}

#[test]
fn test_unmapped_priority_rejected_in_strict_mode() {
    let raw = load_fixture("sales_messy.csv");
    let cleaner = cleaner_with(
        CleanerConfig::builder()
            .unmapped_priority(UnmappedPriorityPolicy::Reject)
            .build()
            .unwrap(),
    );

    let err = cleaner.clean(&raw).unwrap_err();
    assert_eq!(err.error_code(), "UNMAPPED_PRIORITY");
    match err {
        CleaningError::UnmappedPriority { count, values } => {
            assert_eq!(count, 1);
            assert_eq!(values, vec!["Banana"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_outlier_removed_with_default_multiplier() {
    let (df, report) = clean(&load_fixture("sales_outliers.csv")).unwrap();

    assert_eq!(report.outliers_removed, 1);
    assert_eq!(f64_column(&df, "total_sales_value"), vec![10.0, 11.0, 12.0, 13.0]);

    // Final fences come from the four kept values.
    let bounds = report.outlier_bounds.unwrap();
    assert_eq!(bounds.q1, 10.75);
    assert_eq!(bounds.q3, 12.25);
    assert_eq!(bounds.lower, 8.5);
    assert_eq!(bounds.upper, 14.5);
}

#[test]
fn test_wide_multiplier_keeps_everything() {
    let cleaner = cleaner_with(CleanerConfig::builder().iqr_multiplier(1000.0).build().unwrap());
    let (df, report) = cleaner.clean(&load_fixture("sales_outliers.csv")).unwrap();

    assert_eq!(report.outliers_removed, 0);
    assert_eq!(df.height(), 5);
}

#[test]
fn test_missing_date_column_is_optional() {
    let (df, report) = clean(&load_fixture("sales_no_date.csv")).unwrap();

    assert_eq!(df.height(), 3);
    assert_eq!(report.value_column_renamed_from.as_deref(), Some("value"));
    assert!(report.warnings.iter().any(|w| w.contains("date")));
    assert!(daily_totals(&df).unwrap().is_empty());

    let summary = salesperson_summary(&df).unwrap();
    assert_eq!(summary[0].sales_person, "Alice");
    assert_eq!(summary[0].total_sales, 275.0);
    assert_eq!(summary[0].deal_count, 2);
}

// ============================================================================
// Schema Errors
// ============================================================================

#[test]
fn test_header_collision_is_rejected() {
    let raw = df![
        "Sales Person" => ["Alice"],
        "sales person" => ["Bob"],
        "total_sales_value" => [1.0],
        "priority" => ["Low"],
    ]
    .unwrap();

    let err = clean(&raw).unwrap_err();
    assert!(err.is_schema_error());
    assert_eq!(err.error_code(), "COLUMN_COLLISION");
}

#[test]
fn test_missing_required_column() {
    let raw = df![
        "sales_person" => ["Alice"],
        "total_sales_value" => [1.0],
    ]
    .unwrap();

    let err = clean(&raw).unwrap_err();
    assert_eq!(
        err.as_schema_error(),
        Some(&SchemaError::MissingColumn("priority".to_string()))
    );
}

#[test]
fn test_empty_table() {
    let raw = df![
        "sales_person" => Vec::<String>::new(),
        "total_sales_value" => Vec::<f64>::new(),
        "priority" => Vec::<String>::new(),
    ]
    .unwrap();

    let err = clean(&raw).unwrap_err();
    assert_eq!(err.as_schema_error(), Some(&SchemaError::EmptyTable));
}

#[test]
fn test_all_rows_unmapped() {
    let raw = df![
        "sales_person" => ["Alice", "Bob"],
        "total_sales_value" => [1.0, 2.0],
        "priority" => ["urgent", "someday"],
    ]
    .unwrap();

    let err = clean(&raw).unwrap_err();
    assert_eq!(err.error_code(), "NO_USABLE_ROWS");
}

// ============================================================================
// Progress And Outputs
// ============================================================================

#[test]
fn test_progress_reaches_completion() {
    let updates = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&updates);

    Cleaner::builder()
        .on_progress(move |update| sink.lock().unwrap().push(update.progress))
        .build()
        .unwrap()
        .clean(&load_fixture("sales_messy.csv"))
        .unwrap();

    let updates = updates.lock().unwrap();
    assert!(updates.len() > 8);
    assert!(updates.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(updates.last().copied(), Some(1.0));
}

#[test]
fn test_end_to_end_outputs() {
    let input = fixtures_path().join("sales_messy.csv");
    let raw = load_csv(&input).unwrap();
    let cleaner = Cleaner::builder().build().unwrap();
    let (df, cleaning) = cleaner.clean(&raw).unwrap();

    let totals = priority_totals(&df).unwrap();
    let labels: Vec<&str> = totals.iter().map(|t| t.priority.label()).collect();
    assert_eq!(labels, vec!["Low", "Medium", "High", "Critical"]);

    let report = AnalysisReport::build(ReportParams {
        input_file: input.to_str(),
        config: cleaner.config(),
        raw_overview: DataProfiler::overview(&raw).unwrap(),
        cleaning,
        clean: &df,
    })
    .unwrap();
    assert_eq!(report.raw_overview.shape, (8, 5));
    assert_eq!(report.clean_shape, (4, 6));

    let dir = temp_dir("e2e");
    let generator = ReportGenerator::for_input(&dir, "sales_messy.csv");
    let dataset = generator.write_dataset(&df, OutputFormat::Csv).unwrap();
    let report_path = generator.write_report(&report).unwrap();
    let charts = generator.write_charts(&ChartSet::from_clean(&df).unwrap()).unwrap();

    assert_eq!(dataset, dir.join("sales_messy_cleaned.csv"));
    let reloaded = load_csv(&dataset).unwrap();
    assert_eq!(reloaded.shape(), df.shape());

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(json["cleaning"]["rows_out"], 4);
    assert_eq!(json["performers"]["top"]["sales_person"], "Bob");

    assert_eq!(charts.len(), 5);
    for path in &charts {
        let spec: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert!(spec["$schema"].as_str().unwrap().contains("vega-lite"));
    }

    std::fs::remove_dir_all(&dir).unwrap();
}
