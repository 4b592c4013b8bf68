//! Report generation module.
//!
//! This module bundles the downstream analysis into an [`AnalysisReport`]
//! and saves the cleaned dataset, the JSON report and the chart specs.
//!
//! # Example
//!
//! ```rust,ignore
//! use sales_eda::reporting::{AnalysisReport, OutputFormat, ReportGenerator, ReportParams};
//!
//! let report = AnalysisReport::build(ReportParams {
//!     input_file: Some("data/sales.csv"),
//!     config: cleaner.config(),
//!     raw_overview,
//!     cleaning,
//!     clean: &clean,
//! })?;
//!
//! let generator = ReportGenerator::for_input("output", "data/sales.csv");
//! generator.write_dataset(&clean, OutputFormat::Csv)?;
//! generator.write_report(&report)?;
//! ```

mod generator;

pub use generator::{
    AnalysisReport, OutputFormat, ReportGenerator, ReportParams, extract_file_stem,
};
