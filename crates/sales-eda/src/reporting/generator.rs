use crate::analysis::{
    CorrelationMatrix, DailyTotal, DescriptiveStats, GroupStats, Performers, PriorityTotal,
    SalespersonSummary, correlation_matrix, daily_totals, describe_numeric, grouped_describe,
    priority_totals, priority_value_correlation, salesperson_summary, top_and_bottom_performer,
};
use crate::charts::ChartSet;
use crate::cleaner::{PERSON_COLUMN, PRIORITY_COLUMN, PRIORITY_NUMERIC_COLUMN, VALUE_COLUMN};
use crate::config::CleanerConfig;
use crate::error::{CleaningError, Result, ResultExt};
use crate::profiler::DatasetOverview;
use crate::types::CleaningReport;
use chrono::Local;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

// ============================================================================
// Analysis report
// ============================================================================

/// Everything computed for one run, serializable to JSON.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Path to the input file, when known
    pub input_file: Option<String>,
    pub config: CleanerConfig,

    /// Overview of the table before cleaning
    pub raw_overview: DatasetOverview,
    pub cleaning: CleaningReport,
    /// `(rows, columns)` of the clean table
    pub clean_shape: (usize, usize),

    pub descriptive_statistics: Vec<DescriptiveStats>,
    pub sales_by_priority: Vec<GroupStats>,
    pub sales_by_person: Vec<GroupStats>,

    /// Pearson correlation of priority rank and sales value
    pub priority_value_correlation: Option<f64>,
    pub correlation_matrix: CorrelationMatrix,

    pub salesperson_summary: Vec<SalespersonSummary>,
    pub performers: Option<Performers>,
    pub daily_totals: Vec<DailyTotal>,
    pub priority_totals: Vec<PriorityTotal>,
}

/// Inputs for [`AnalysisReport::build`].
pub struct ReportParams<'a> {
    pub input_file: Option<&'a str>,
    pub config: &'a CleanerConfig,
    pub raw_overview: DatasetOverview,
    pub cleaning: CleaningReport,
    pub clean: &'a DataFrame,
}

impl AnalysisReport {
    /// Run every downstream aggregate over the clean table.
    pub fn build(params: ReportParams<'_>) -> Result<Self> {
        let ReportParams {
            input_file,
            config,
            raw_overview,
            cleaning,
            clean,
        } = params;

        let summary = salesperson_summary(clean)?;
        let performers = top_and_bottom_performer(&summary);

        Ok(Self {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.map(str::to_string),
            config: config.clone(),
            raw_overview,
            cleaning,
            clean_shape: clean.shape(),
            descriptive_statistics: describe_numeric(clean)?,
            sales_by_priority: grouped_describe(clean, PRIORITY_COLUMN)?,
            sales_by_person: grouped_describe(clean, PERSON_COLUMN)?,
            priority_value_correlation: priority_value_correlation(clean)?,
            correlation_matrix: correlation_matrix(
                clean,
                &[PRIORITY_NUMERIC_COLUMN, VALUE_COLUMN],
            )?,
            salesperson_summary: summary,
            performers,
            daily_totals: daily_totals(clean)?,
            priority_totals: priority_totals(clean)?,
        })
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ============================================================================
// Output files
// ============================================================================

/// File format for the cleaned dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Csv,
    Parquet,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Parquet => "parquet",
        }
    }
}

/// Writes the cleaned dataset, the JSON report and chart specs.
///
/// Files land in `output_dir` as `<name>_cleaned.<ext>` and
/// `<name>_report.json`; charts go to `output_dir/charts/`.
pub struct ReportGenerator {
    output_dir: PathBuf,
    output_name: String,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            output_name: "sales".to_string(),
        }
    }
}

impl ReportGenerator {
    /// Create a new ReportGenerator with custom output settings.
    pub fn new(output_dir: impl Into<PathBuf>, output_name: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            output_name: output_name.into(),
        }
    }

    /// Name outputs after the input file's stem.
    pub fn for_input(output_dir: impl Into<PathBuf>, input: &str) -> Self {
        Self::new(output_dir, extract_file_stem(input))
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn dataset_path(&self, format: OutputFormat) -> PathBuf {
        self.output_dir
            .join(format!("{}_cleaned.{}", self.output_name, format.extension()))
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_report.json", self.output_name))
    }

    pub fn charts_dir(&self) -> PathBuf {
        self.output_dir.join("charts")
    }

    /// Save the cleaned table.
    pub fn write_dataset(&self, df: &DataFrame, format: OutputFormat) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let output_path = self.dataset_path(format);
        let mut file = File::create(&output_path)?;
        let mut out = df.clone();

        match format {
            OutputFormat::Csv => {
                CsvWriter::new(&mut file)
                    .include_header(true)
                    .with_separator(b',')
                    .finish(&mut out)
                    .context("writing cleaned CSV")?;
            }
            OutputFormat::Parquet => {
                ParquetWriter::new(&mut file)
                    .finish(&mut out)
                    .context("writing cleaned Parquet")?;
            }
        }

        info!("Dataset saved: {}", output_path.display());
        Ok(output_path)
    }

    /// Write the analysis report as pretty JSON.
    pub fn write_report(&self, report: &AnalysisReport) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let report_path = self.report_path();
        let mut file = File::create(&report_path)?;
        file.write_all(report.to_pretty_json()?.as_bytes())?;

        info!("Report saved: {}", report_path.display());
        Ok(report_path)
    }

    /// Write every chart spec into the charts directory.
    pub fn write_charts(&self, charts: &ChartSet) -> Result<Vec<PathBuf>> {
        let dir = self.charts_dir();
        let written = charts.write_to_dir(&dir).map_err(|e| {
            CleaningError::ReportGenerationFailed(format!(
                "could not write charts to {}: {}",
                dir.display(),
                e
            ))
        })?;
        debug!("Wrote {} chart specs", written.len());
        info!("Charts saved: {}", dir.display());
        Ok(written)
    }
}

/// Extract the file stem (name without extension) from a path.
pub fn extract_file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiler::DataProfiler;

    fn clean_sample() -> DataFrame {
        df![
            "sales_person" => ["Alice", "Bob", "Alice"],
            "total_sales_value" => [100.0, 200.0, 300.0],
            "priority" => ["Low", "High", "Critical"],
            "priority_numeric" => [1i64, 3, 4],
        ]
        .unwrap()
    }

    fn temp_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("sales_eda_{}_{}", tag, std::process::id()))
    }

    fn build_report(clean: &DataFrame) -> AnalysisReport {
        let config = CleanerConfig::default();
        AnalysisReport::build(ReportParams {
            input_file: Some("data/sales.csv"),
            config: &config,
            raw_overview: DataProfiler::overview(clean).unwrap(),
            cleaning: CleaningReport::new(),
            clean,
        })
        .unwrap()
    }

    #[test]
    fn test_extract_file_stem() {
        assert_eq!(extract_file_stem("data/sales.csv"), "sales");
        assert_eq!(extract_file_stem(""), "output");
    }

    #[test]
    fn test_output_paths() {
        let generator = ReportGenerator::for_input("out", "data/sales.csv");
        assert_eq!(
            generator.dataset_path(OutputFormat::Parquet),
            PathBuf::from("out/sales_cleaned.parquet")
        );
        assert_eq!(generator.report_path(), PathBuf::from("out/sales_report.json"));
        assert_eq!(generator.charts_dir(), PathBuf::from("out/charts"));
    }

    #[test]
    fn test_build_report() {
        let clean = clean_sample();
        let report = build_report(&clean);

        assert_eq!(report.clean_shape, (3, 4));
        assert_eq!(report.salesperson_summary[0].sales_person, "Alice");
        assert_eq!(report.sales_by_person.len(), 2);
        assert_eq!(report.priority_totals.len(), 4);
        assert!(report.priority_value_correlation.is_some());
        assert_eq!(report.input_file.as_deref(), Some("data/sales.csv"));

        let json: serde_json::Value =
            serde_json::from_str(&report.to_pretty_json().unwrap()).unwrap();
        assert_eq!(json["performers"]["top"]["sales_person"], "Alice");
        assert_eq!(json["config"]["iqr_multiplier"], 1.5);
    }

    #[test]
    fn test_write_outputs() {
        let dir = temp_dir("report");
        let clean = clean_sample();
        let generator = ReportGenerator::new(&dir, "sales");

        let csv_path = generator.write_dataset(&clean, OutputFormat::Csv).unwrap();
        let text = fs::read_to_string(&csv_path).unwrap();
        assert!(text.starts_with("sales_person,total_sales_value,priority,priority_numeric"));

        let parquet_path = generator.write_dataset(&clean, OutputFormat::Parquet).unwrap();
        let reloaded = ParquetReader::new(File::open(&parquet_path).unwrap())
            .finish()
            .unwrap();
        assert_eq!(reloaded.shape(), clean.shape());
        assert_eq!(reloaded.get_column_names(), clean.get_column_names());

        let report_path = generator.write_report(&build_report(&clean)).unwrap();
        assert!(report_path.exists());

        let charts = ChartSet::from_clean(&clean).unwrap();
        let written = generator.write_charts(&charts).unwrap();
        assert_eq!(written.len(), 5);
        assert!(dir.join("charts").join("daily_sales_trend.vl.json").exists());

        fs::remove_dir_all(&dir).unwrap();
    }
}
