//! CLI entry point for the sales EDA pipeline.

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use dotenv::dotenv;
use polars::prelude::*;
use sales_eda::{
    AnalysisReport, ChartSet, Cleaner, CleanerConfig, CleaningReport, DataProfiler,
    DatasetOverview, DescriptiveStats, GroupStats, OutputFormat, ReportGenerator, ReportParams,
    UnmappedPriorityPolicy, load_csv, summary_frame,
};
use std::path::Path;
use tracing::{debug, error, info};

/// CLI-compatible output format enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    /// Comma-separated values
    Csv,
    /// Apache Parquet
    Parquet,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(cli: CliOutputFormat) -> Self {
        match cli {
            CliOutputFormat::Csv => OutputFormat::Csv,
            CliOutputFormat::Parquet => OutputFormat::Parquet,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Clean and explore a sales dataset",
    long_about = "Cleans a sales CSV, prints descriptive statistics and writes \
                  the cleaned data, a JSON report and Vega-Lite chart specs.\n\n\
                  EXAMPLES:\n  \
                  # Clean and analyze with defaults\n  \
                  sales-eda -i sales.csv\n\n  \
                  # Fail on unknown priority labels instead of dropping them\n  \
                  sales-eda -i sales.csv --strict-priority\n\n  \
                  # Machine-readable report only\n  \
                  sales-eda -i sales.csv --json --no-save"
)]
struct Args {
    /// Path to the CSV file to process
    #[arg(short, long)]
    input: String,

    /// Output directory for results
    #[arg(short, long, default_value = "output")]
    output: String,

    /// Base name for output files (defaults to the input file stem)
    #[arg(long)]
    output_name: Option<String>,

    /// IQR multiplier for outlier rejection
    #[arg(long)]
    iqr_multiplier: Option<f64>,

    /// Abort when a priority is not Low/Medium/High/Critical
    #[arg(long)]
    strict_priority: bool,

    /// Column name (after normalization) to treat as the sales value.
    /// Repeat to give several; the first present wins
    #[arg(long = "value-alias")]
    value_alias: Vec<String>,

    /// File format for the cleaned dataset
    #[arg(long, value_enum, default_value = "csv")]
    format: CliOutputFormat,

    /// Skip writing chart specs
    #[arg(long)]
    no_charts: bool,

    /// Do not write any files
    #[arg(long)]
    no_save: bool,

    /// Rows to show in previews
    #[arg(long, default_value = "5")]
    head: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Print the JSON report to stdout instead of the console summary
    ///
    /// Disables all logs so stdout only carries the report.
    #[arg(long)]
    json: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// With `--json`, logging is disabled so that only the report
/// is written to stdout.
fn init_logging(args: &Args) {
    use tracing_subscriber::EnvFilter;

    if args.json {
        return;
    }

    let effective_level = if args.quiet { "error" } else { args.log_level.as_str() };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if args.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    // Load environment variables from .env file so RUST_LOG can be set there
    dotenv().ok();

    let args = Args::parse();
    init_logging(&args);

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    info!("Loading dataset from: {}", args.input);
    let raw = load_csv(&args.input)?;
    info!("Dataset loaded successfully: {:?}", raw.shape());

    let overview = DataProfiler::overview(&raw)?;
    if !args.json {
        print_raw_overview(&raw, &overview, args.head);
    }

    let cleaner = build_cleaner(&args)?;

    info!("{}", "=".repeat(80));
    info!("Starting cleaning pipeline...");
    info!("{}", "=".repeat(80));

    let (clean, cleaning) = cleaner.clean(&raw).map_err(|e| {
        error!("Cleaning failed [{}]: {}", e.error_code(), e);
        anyhow!("Cleaning failed: {}", e)
    })?;

    let report = AnalysisReport::build(ReportParams {
        input_file: Some(&args.input),
        config: cleaner.config(),
        raw_overview: overview,
        cleaning,
        clean: &clean,
    })?;

    if !args.no_save {
        save_outputs(&args, &clean, &report)?;
    }

    if args.json {
        println!("{}", report.to_pretty_json()?);
        return Ok(());
    }

    print_analysis(&report, &clean, args.head);
    Ok(())
}

fn build_cleaner(args: &Args) -> Result<Cleaner> {
    let mut config_builder = CleanerConfig::builder();

    if let Some(k) = args.iqr_multiplier {
        config_builder = config_builder.iqr_multiplier(k);
    }
    if args.strict_priority {
        config_builder = config_builder.unmapped_priority(UnmappedPriorityPolicy::Reject);
    }
    if !args.value_alias.is_empty() {
        config_builder = config_builder.value_column_aliases(args.value_alias.iter().cloned());
    }

    let config = config_builder.build()?;
    debug!("Cleaner configuration: {:?}", config);

    let mut builder = Cleaner::builder().config(config);
    if !args.quiet && !args.json {
        builder = builder.on_progress(|update| {
            debug!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }

    Ok(builder.build()?)
}

fn save_outputs(args: &Args, clean: &DataFrame, report: &AnalysisReport) -> Result<()> {
    let generator = match &args.output_name {
        Some(name) => ReportGenerator::new(&args.output, name.as_str()),
        None => ReportGenerator::for_input(&args.output, &args.input),
    };

    generator.write_dataset(clean, args.format.into())?;
    generator.write_report(report)?;

    if !args.no_charts {
        let charts = ChartSet::from_clean(clean)?;
        generator.write_charts(&charts)?;
    }
    Ok(())
}

// ============================================================================
// Console output
// ============================================================================

fn section(title: &str) {
    println!();
    println!("{}", "=".repeat(80));
    println!("{}", title);
    println!("{}", "=".repeat(80));
}

/// Print head, shape, dtypes and missing values of the raw table.
fn print_raw_overview(raw: &DataFrame, overview: &DatasetOverview, head: usize) {
    section("RAW DATA");
    println!("{}", raw.head(Some(head)));

    println!();
    println!("Shape: {} rows x {} columns", overview.shape.0, overview.shape.1);
    println!("Duplicate rows: {}", overview.duplicate_count);

    println!();
    println!("{:<30} {:<12} {:>10} {:>10}", "Column", "Type", "Missing", "Unique");
    println!("{}", "-".repeat(65));
    for col in &overview.columns {
        println!(
            "{:<30} {:<12} {:>10} {:>10}",
            truncate_str(&col.name, 29),
            col.dtype,
            col.null_count,
            col.unique_count
        );
    }
}

fn print_cleaning_report(report: &CleaningReport) {
    section("CLEANING REPORT");
    println!("Duration: {}ms", report.duration_ms);
    println!(
        "Rows: {} -> {} ({:.1}% removed)",
        report.rows_in,
        report.rows_out,
        report.rows_removed_percentage()
    );
    println!("Columns: {} -> {}", report.columns_in, report.columns_out);
    println!("  Missing required field: {}", report.rows_dropped_missing_required);
    println!("  Unmapped priority:      {}", report.rows_dropped_unmapped_priority);
    println!("  Duplicates:             {}", report.duplicates_removed);
    println!("  Outliers:               {}", report.outliers_removed);
    println!("Values imputed: {}", report.total_imputed());
    println!(
        "Dates: {} unparseable, {} missing",
        report.unparseable_dates, report.missing_dates
    );
    if let Some(bounds) = &report.outlier_bounds {
        println!(
            "IQR bounds: [{:.2}, {:.2}] (Q1 {:.2}, Q3 {:.2}, k {})",
            bounds.lower, bounds.upper, bounds.q1, bounds.q3, bounds.multiplier
        );
    }

    if !report.actions.is_empty() {
        println!();
        println!("Actions Taken:");
        for action in &report.actions {
            println!("  - [{}] {}", action.action_type.display_name(), action.description);
        }
    }

    if !report.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &report.warnings {
            println!("  ! {}", warning);
        }
    }
}

fn print_stats_header(label: &str) {
    println!(
        "{:<24} {:>7} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
        label, "count", "mean", "std", "min", "25%", "50%", "75%", "max"
    );
    println!("{}", "-".repeat(24 + 8 + 13 * 7));
}

fn print_stats_row(label: &str, stats: &DescriptiveStats) {
    let std = stats
        .std
        .map_or_else(|| "NaN".to_string(), |s| format!("{:.2}", s));
    println!(
        "{:<24} {:>7} {:>12.2} {:>12} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>12.2}",
        truncate_str(label, 23),
        stats.count,
        stats.mean,
        std,
        stats.min,
        stats.q25,
        stats.median,
        stats.q75,
        stats.max
    );
}

fn print_grouped(title: &str, key: &str, groups: &[GroupStats]) {
    section(title);
    print_stats_header(key);
    for group in groups {
        print_stats_row(&group.group, &group.stats);
    }
}

fn print_analysis(report: &AnalysisReport, clean: &DataFrame, head: usize) {
    print_cleaning_report(&report.cleaning);

    section("DESCRIPTIVE STATISTICS");
    print_stats_header("column");
    for stats in &report.descriptive_statistics {
        print_stats_row(&stats.column, stats);
    }

    print_grouped("SALES BY PRIORITY", "priority", &report.sales_by_priority);
    print_grouped("SALES BY SALESPERSON", "sales_person", &report.sales_by_person);

    section("CORRELATION");
    match report.priority_value_correlation {
        Some(r) => println!("Correlation between priority and total sales value: {:.2}", r),
        None => println!("Correlation between priority and total sales value: undefined"),
    }

    section("SALESPERSON SUMMARY");
    match summary_frame(&report.salesperson_summary) {
        Ok(frame) => println!("{}", frame),
        Err(e) => error!("Could not render salesperson summary: {}", e),
    }

    if let Some(performers) = &report.performers {
        println!();
        println!(
            "Top performer:    {} ({:.2})",
            performers.top.sales_person, performers.top.total_sales
        );
        println!(
            "Bottom performer: {} ({:.2})",
            performers.bottom.sales_person, performers.bottom.total_sales
        );
    }

    section("CLEANED DATA");
    println!("Shape: {} rows x {} columns", clean.height(), clean.width());
    println!("{}", clean.head(Some(head)));
    println!("{}", "=".repeat(80));
}

/// Truncate a string to max length with ellipsis
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
