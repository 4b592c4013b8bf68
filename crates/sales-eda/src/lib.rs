//! Sales EDA Library
//!
//! Cleaning, aggregate analysis and chart specifications for tabular sales
//! datasets, built with Rust and Polars.
//!
//! # Overview
//!
//! - **Cleaning**: header normalization, required-column checks, median and
//!   mode imputation, date parsing, ordinal priority mapping, deduplication
//!   and IQR outlier rejection, with a full audit report
//! - **Analysis**: descriptive and grouped statistics, correlation,
//!   salesperson performance, daily and per-priority totals
//! - **Charts**: Vega-Lite specifications for the standard sales plots
//! - **Progress Reporting**: per-stage updates through a callback
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sales_eda::{Cleaner, ChartSet, load_csv, salesperson_summary};
//!
//! let raw = load_csv("data/sales.csv")?;
//!
//! let (clean, report) = Cleaner::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .clean(&raw)?;
//!
//! println!("{} -> {} rows", report.rows_in, report.rows_out);
//! for row in salesperson_summary(&clean)? {
//!     println!("{}: {:.2}", row.sales_person, row.total_sales);
//! }
//!
//! ChartSet::from_clean(&clean)?.write_to_dir("output/charts")?;
//! ```
//!
//! # Configuration
//!
//! ```rust,ignore
//! use sales_eda::config::*;
//!
//! let config = CleanerConfig::builder()
//!     .iqr_multiplier(3.0)
//!     .unmapped_priority(UnmappedPriorityPolicy::Reject)
//!     .value_column_aliases(["value_", "value", "amount"])
//!     .build()?;
//! ```

pub mod analysis;
pub mod charts;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod io;
pub mod pipeline;
pub mod profiler;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use analysis::{
    CorrelationMatrix, DailyTotal, DescriptiveStats, GroupStats, Performers, PriorityTotal,
    SalespersonSummary, correlation_matrix, daily_totals, describe_numeric, grouped_describe,
    pearson, priority_totals, priority_value_correlation, salesperson_summary, summary_frame,
    top_and_bottom_performer,
};
pub use charts::{ChartSet, ChartSpec};
pub use cleaner::{
    DATE_COLUMN, PERSON_COLUMN, PRIORITY_COLUMN, PRIORITY_NUMERIC_COLUMN, VALUE_COLUMN,
    normalize_column_name,
};
pub use config::{
    CleanerConfig, CleanerConfigBuilder, ConfigValidationError, UnmappedPriorityPolicy,
};
pub use error::{CleaningError, Result, ResultExt, SchemaError};
pub use io::load_csv;
pub use pipeline::{
    CleaningStage, Cleaner, CleanerBuilder, ClosureProgressReporter, OutlierHandler,
    ProgressReporter, ProgressUpdate, clean,
};
pub use profiler::{DataProfiler, DatasetOverview};
pub use reporting::{AnalysisReport, OutputFormat, ReportGenerator, ReportParams};
pub use types::{
    ActionType, CleaningAction, CleaningReport, ColumnKind, ImputationRecord, ImputationStrategy,
    OutlierBounds, Priority, TableSchema,
};
