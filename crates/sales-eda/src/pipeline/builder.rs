//! Main cleaning pipeline module.
//!
//! This module provides the core [`Cleaner`] struct and builder for
//! orchestrating the cleaning stages.

use crate::cleaner::{
    ColumnNormalizer, DATE_COLUMN, DataCleaner, DateNormalizer, PERSON_COLUMN, PRIORITY_COLUMN,
    PRIORITY_NUMERIC_COLUMN, SchemaClassifier, VALUE_COLUMN, has_column, nullify_missing_markers,
};
use crate::config::{CleanerConfig, ConfigValidationError};
use crate::error::{CleaningError, Result, SchemaError};
use crate::imputers::{ImputationOutcome, StatisticalImputer};
use crate::pipeline::outliers::OutlierHandler;
use crate::pipeline::priority::PriorityMapper;
use crate::pipeline::progress::{
    ClosureProgressReporter, CleaningStage, ProgressReporter, ProgressUpdate,
};
use crate::types::{ActionType, CleaningAction, CleaningReport, ColumnKind};
use polars::prelude::*;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// The dataset cleaner.
///
/// Use [`Cleaner::builder()`] to create a cleaner with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use sales_eda::{Cleaner, CleanerConfig, UnmappedPriorityPolicy};
///
/// let config = CleanerConfig::builder()
///     .unmapped_priority(UnmappedPriorityPolicy::Reject)
///     .build()?;
///
/// let (clean, report) = Cleaner::builder()
///     .config(config)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .clean(&raw)?;
/// ```
pub struct Cleaner {
    config: CleanerConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    normalizer: ColumnNormalizer,
    cleaner: DataCleaner,
}

// Callers may run the cleaner on a worker thread.
static_assertions::assert_impl_all!(Cleaner: Send);

impl Cleaner {
    /// Create a new cleaner builder.
    pub fn builder() -> CleanerBuilder {
        CleanerBuilder::default()
    }

    /// The configuration this cleaner runs with.
    pub fn config(&self) -> &CleanerConfig {
        &self.config
    }

    /// Run every cleaning stage over `raw`.
    ///
    /// Returns the cleaned table and the audit report. The input is never
    /// modified.
    ///
    /// # Errors
    ///
    /// - [`SchemaError`] when the table is empty, a required column is missing,
    ///   two headers collide, or a stage leaves no rows.
    /// - [`CleaningError::UnmappedPriority`] under the reject policy.
    pub fn clean(&self, raw: &DataFrame) -> Result<(DataFrame, CleaningReport)> {
        match self.clean_internal(raw) {
            Ok(result) => {
                self.report_progress(
                    ProgressUpdate::complete("Cleaning completed successfully")
                        .with_rows(result.0.height()),
                );
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Cleaning error: {}", e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn start_stage(&self, stage: CleaningStage, message: &str, rows: usize) {
        info!("Step {}: {}", stage.step_number(), message);
        self.report_progress(ProgressUpdate::new(stage, 0.0, message).with_rows(rows));
    }

    fn finish_stage(&self, stage: CleaningStage, message: impl Into<String>, df: &DataFrame) {
        self.report_progress(ProgressUpdate::new(stage, 1.0, message).with_rows(df.height()));
    }

    fn ensure_rows(df: &DataFrame, stage: CleaningStage) -> Result<()> {
        if df.height() == 0 {
            return Err(SchemaError::NoUsableRows {
                stage: stage.display_name().to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn clean_internal(&self, raw: &DataFrame) -> Result<(DataFrame, CleaningReport)> {
        let start_time = Instant::now();

        info!("Starting cleaning pipeline...");
        self.report_progress(
            ProgressUpdate::new(CleaningStage::Initializing, 0.0, "Validating input...")
                .with_rows(raw.height()),
        );

        if raw.height() == 0 {
            return Err(SchemaError::EmptyTable.into());
        }

        let mut report = CleaningReport::new();
        report.rows_in = raw.height();
        report.columns_in = raw.width();

        // Step 1: Column normalization
        let stage = CleaningStage::NormalizingColumns;
        self.start_stage(stage, "Normalizing column names...", raw.height());

        let (df, renamed) = self.normalizer.normalize(raw)?;
        for (original, normalized) in &renamed {
            report.add_action(CleaningAction::new(
                ActionType::ColumnRenamed,
                normalized.as_str(),
                format!("Renamed '{}' to '{}'", original, normalized),
            ));
        }
        report.renamed_columns = renamed;
        self.finish_stage(
            stage,
            format!("Renamed {} columns", report.renamed_columns.len()),
            &df,
        );

        // Step 2: Required-field rule and classification
        let stage = CleaningStage::ResolvingSchema;
        self.start_stage(stage, "Resolving schema...", df.height());

        let (df, alias) = self
            .normalizer
            .resolve_value_column(&df, &self.config.value_column_aliases)?;
        if let Some(alias) = &alias {
            report.add_action(CleaningAction::new(
                ActionType::ColumnRenamed,
                VALUE_COLUMN,
                format!("Renamed value column '{}' to '{}'", alias, VALUE_COLUMN),
            ));
        }
        report.value_column_renamed_from = alias;

        self.normalizer.ensure_required(&df)?;
        let has_date = has_column(&df, DATE_COLUMN);
        if !has_date {
            warn!("No '{}' column; date parsing will be skipped", DATE_COLUMN);
            report.add_warning(format!(
                "No '{}' column found; date parsing skipped",
                DATE_COLUMN
            ));
        }

        let (df, markers) = nullify_missing_markers(&df)?;
        if markers > 0 {
            debug!("Converted {} missing-value markers to null", markers);
        }

        let classification = SchemaClassifier {
            coerce_numeric_strings: self.config.coerce_numeric_strings,
        }
        .classify(&df)?;
        if !classification.coerced.is_empty() {
            report.add_action(
                CleaningAction::new(
                    ActionType::TypeCorrected,
                    "dataset",
                    format!(
                        "Converted {} text columns to numbers",
                        classification.coerced.len()
                    ),
                )
                .with_details(classification.coerced.join(", ")),
            );
        }
        if classification.unparseable_values > 0 {
            report.add_warning(format!(
                "{} '{}' values were not numbers and were treated as missing",
                classification.unparseable_values, VALUE_COLUMN
            ));
        }
        report.numeric_coercions = classification.coerced;
        report.schema = classification.schema;

        let (df, dropped) = self
            .cleaner
            .drop_incomplete_rows(&classification.df, &[PERSON_COLUMN, VALUE_COLUMN])?;
        report.rows_dropped_missing_required = dropped;
        if dropped > 0 {
            report.add_action(CleaningAction::new(
                ActionType::RowsRemoved,
                "dataset",
                format!(
                    "Removed {} rows missing '{}' or '{}'",
                    dropped, PERSON_COLUMN, VALUE_COLUMN
                ),
            ));
        }
        Self::ensure_rows(&df, stage)?;
        self.finish_stage(
            stage,
            format!("Schema resolved with {} columns", report.schema.columns.len()),
            &df,
        );

        // Step 3: Numeric imputation
        let stage = CleaningStage::ImputingNumeric;
        self.start_stage(stage, "Imputing numeric columns with the median...", df.height());
        let outcome = StatisticalImputer::impute_median(&df, &report.schema.numeric_columns())?;
        let df = Self::record_imputation(&mut report, outcome);
        self.finish_stage(stage, "Numeric imputation complete", &df);

        // Step 4: Categorical imputation
        let stage = CleaningStage::ImputingCategorical;
        self.start_stage(stage, "Imputing categorical columns with the mode...", df.height());
        let outcome =
            StatisticalImputer::impute_mode(&df, &report.schema.categorical_columns())?;
        let df = Self::record_imputation(&mut report, outcome);
        self.finish_stage(stage, "Categorical imputation complete", &df);

        // Step 5: Date normalization
        let stage = CleaningStage::ParsingDates;
        let df = if has_date {
            self.start_stage(stage, "Parsing dates...", df.height());
            let (parsed, outcome) = DateNormalizer {
                formats: &self.config.date_formats,
            }
            .normalize(&df)?;

            report.unparseable_dates = outcome.unparseable;
            report.missing_dates = outcome.missing;
            report.add_action(CleaningAction::new(
                ActionType::DatesParsed,
                DATE_COLUMN,
                format!("Parsed '{}' to dates", DATE_COLUMN),
            ));
            if outcome.unparseable > 0 {
                warn!(
                    "{} date values could not be parsed and were set to missing",
                    outcome.unparseable
                );
                report.add_warning(format!(
                    "{} date values could not be parsed and were set to missing",
                    outcome.unparseable
                ));
            }
            self.finish_stage(
                stage,
                format!("{} dates missing after parsing", outcome.missing),
                &parsed,
            );
            parsed
        } else {
            info!("Step {}: Skipping date parsing (no date column)", stage.step_number());
            self.finish_stage(stage, "No date column", &df);
            df
        };

        // Step 6: Priority filter and ordinal mapping
        let stage = CleaningStage::FilteringPriority;
        self.start_stage(stage, "Mapping priority to ordinal ranks...", df.height());
        let outcome = PriorityMapper::apply(&df, self.config.unmapped_priority)?;
        let df = outcome.df;
        report.schema.upsert(PRIORITY_NUMERIC_COLUMN, ColumnKind::Numeric);
        report.rows_dropped_unmapped_priority = outcome.dropped;
        if outcome.dropped > 0 {
            report.add_action(
                CleaningAction::new(
                    ActionType::PriorityFiltered,
                    PRIORITY_COLUMN,
                    format!("Removed {} rows with unmapped priority", outcome.dropped),
                )
                .with_details(outcome.unmapped_values.join(", ")),
            );
            report.add_warning(format!(
                "Analyzed population narrowed: {} rows with priority outside \
                 Low/Medium/High/Critical were excluded ({})",
                outcome.dropped,
                outcome.unmapped_values.join(", ")
            ));
        }
        report.unmapped_priority_values = outcome.unmapped_values;
        Self::ensure_rows(&df, stage)?;
        self.finish_stage(stage, "Priority mapping complete", &df);

        // Step 7: Deduplication
        let stage = CleaningStage::Deduplicating;
        let df = if self.config.remove_duplicates {
            self.start_stage(stage, "Removing duplicate rows...", df.height());
            let (unique, removed) = self.cleaner.remove_duplicates(&df)?;
            report.duplicates_removed = removed;
            if removed > 0 {
                report.add_action(CleaningAction::new(
                    ActionType::DuplicatesRemoved,
                    "dataset",
                    format!("Removed {} duplicate rows", removed),
                ));
            }
            self.finish_stage(stage, format!("Removed {} duplicates", removed), &unique);
            unique
        } else {
            info!("Step {}: Skipping duplicate removal (disabled)", stage.step_number());
            self.finish_stage(stage, "Duplicate removal disabled", &df);
            df
        };

        // Step 8: Outlier rejection
        let stage = CleaningStage::RemovingOutliers;
        self.start_stage(stage, "Removing outliers with the IQR method...", df.height());
        let df = match OutlierHandler::remove_iqr_outliers(
            &df,
            VALUE_COLUMN,
            self.config.iqr_multiplier,
        )? {
            Some(outcome) => {
                report.outliers_removed = outcome.removed;
                report.outlier_bounds = Some(outcome.bounds);
                if outcome.removed > 0 {
                    report.add_action(
                        CleaningAction::new(
                            ActionType::OutlierHandled,
                            VALUE_COLUMN,
                            format!("Removed {} outlier rows", outcome.removed),
                        )
                        .with_details(format!(
                            "kept [{:.2}, {:.2}] after {} passes",
                            outcome.bounds.lower, outcome.bounds.upper, outcome.passes
                        )),
                    );
                }
                outcome.df
            }
            None => df,
        };
        Self::ensure_rows(&df, stage)?;
        self.finish_stage(
            stage,
            format!("Removed {} outliers", report.outliers_removed),
            &df,
        );

        // Finalize report
        report.rows_out = df.height();
        report.columns_out = df.width();
        report.duration_ms = duration_ms(start_time.elapsed());

        if report.rows_removed_percentage() > 30.0 {
            report.add_warning(format!(
                "High data loss: {:.1}% of rows were removed",
                report.rows_removed_percentage()
            ));
        }

        info!(
            "Cleaning finished: {} -> {} rows in {} ms",
            report.rows_in, report.rows_out, report.duration_ms
        );

        Ok((df, report))
    }

    fn record_imputation(report: &mut CleaningReport, outcome: ImputationOutcome) -> DataFrame {
        for record in &outcome.records {
            report.add_action(CleaningAction::new(
                ActionType::ValueImputed,
                record.column.as_str(),
                format!(
                    "Filled {} missing values with {:?} '{}'",
                    record.count, record.strategy, record.fill_value
                ),
            ));
        }
        report.imputations.extend(outcome.records);
        for warning in outcome.warnings {
            report.add_warning(warning);
        }
        outcome.df
    }
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn duration_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Clean `raw` with the default configuration.
pub fn clean(raw: &DataFrame) -> Result<(DataFrame, CleaningReport)> {
    Cleaner::builder()
        .build()
        .map_err(|e| CleaningError::InvalidConfig(e.to_string()))?
        .clean(raw)
}

/// Builder for creating a [`Cleaner`] instance.
///
/// Use [`Cleaner::builder()`] to get started.
#[derive(Default)]
pub struct CleanerBuilder {
    config: Option<CleanerConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(CleanerBuilder: Send);

impl CleanerBuilder {
    /// Set the cleaner configuration.
    pub fn config(mut self, config: CleanerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during cleaning.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use sales_eda::{Cleaner, ProgressReporter, ProgressUpdate};
    /// use std::sync::Arc;
    ///
    /// struct StageLogger;
    ///
    /// impl ProgressReporter for StageLogger {
    ///     fn report(&self, update: ProgressUpdate) {
    ///         println!("{}: {}", update.stage.display_name(), update.message);
    ///     }
    /// }
    ///
    /// let cleaner = Cleaner::builder()
    ///     .progress_reporter(Arc::new(StageLogger))
    ///     .build()?;
    /// ```
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the cleaner.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Cleaner, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Cleaner {
            config,
            progress_reporter: self.progress_reporter,
            normalizer: ColumnNormalizer,
            cleaner: DataCleaner,
        })
    }
}
