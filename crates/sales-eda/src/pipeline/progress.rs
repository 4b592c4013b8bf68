//! Progress reporting for the cleaning pipeline.
//!
//! The pipeline is synchronous; updates are delivered on the calling thread
//! as each stage starts and finishes.
//!
//! # Example
//!
//! ```rust,ignore
//! use sales_eda::Cleaner;
//!
//! let (clean, report) = Cleaner::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .clean(&raw)?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the cleaning pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningStage {
    /// Validating the raw table
    Initializing,
    /// Normalizing header names
    NormalizingColumns,
    /// Renaming the value column, checking required columns, classifying
    /// columns and dropping incomplete rows
    ResolvingSchema,
    /// Median imputation of numeric columns
    ImputingNumeric,
    /// Mode imputation of categorical columns
    ImputingCategorical,
    /// Parsing the date column
    ParsingDates,
    /// Ordinal priority mapping and filtering
    FilteringPriority,
    /// Removing exact duplicate rows
    Deduplicating,
    /// IQR outlier rejection
    RemovingOutliers,
    /// Pipeline completed successfully
    Complete,
    /// Pipeline failed with an error
    Failed,
}

impl CleaningStage {
    /// Stages that do work, in order.
    pub const ORDERED: [CleaningStage; 8] = [
        CleaningStage::NormalizingColumns,
        CleaningStage::ResolvingSchema,
        CleaningStage::ImputingNumeric,
        CleaningStage::ImputingCategorical,
        CleaningStage::ParsingDates,
        CleaningStage::FilteringPriority,
        CleaningStage::Deduplicating,
        CleaningStage::RemovingOutliers,
    ];

    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Initializing => "Initializing",
            Self::NormalizingColumns => "Normalizing Columns",
            Self::ResolvingSchema => "Resolving Schema",
            Self::ImputingNumeric => "Imputing Numeric Values",
            Self::ImputingCategorical => "Imputing Categorical Values",
            Self::ParsingDates => "Parsing Dates",
            Self::FilteringPriority => "Filtering Priority",
            Self::Deduplicating => "Removing Duplicates",
            Self::RemovingOutliers => "Removing Outliers",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// 1-based position among the working stages, 0 for the others.
    pub fn step_number(&self) -> usize {
        Self::ORDERED
            .iter()
            .position(|s| s == self)
            .map_or(0, |i| i + 1)
    }

    /// Cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Initializing | Self::Failed => 0.0,
            Self::Complete => 1.0,
            _ => (self.step_number() - 1) as f32 / Self::ORDERED.len() as f32,
        }
    }

    /// Share of overall progress taken by this stage.
    pub fn weight(&self) -> f32 {
        if self.step_number() == 0 {
            0.0
        } else {
            1.0 / Self::ORDERED.len() as f32
        }
    }
}

/// A progress update emitted by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Current pipeline stage
    pub stage: CleaningStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within current stage (0.0 - 1.0)
    pub stage_progress: f32,

    /// Human-readable message describing current activity
    pub message: String,

    /// Rows in the table when the update was emitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
}

impl ProgressUpdate {
    /// Creates a new progress update for a stage.
    pub fn new(stage: CleaningStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
            rows: None,
        }
    }

    /// Attach the current row count.
    pub fn with_rows(mut self, rows: usize) -> Self {
        self.rows = Some(rows);
        self
    }

    /// Creates a completion progress update.
    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: CleaningStage::Complete,
            progress: 1.0,
            stage_progress: 1.0,
            message: message.into(),
            rows: None,
        }
    }

    /// Creates a failed progress update.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: CleaningStage::Failed,
            progress: 0.0,
            stage_progress: 0.0,
            message: message.into(),
            rows: None,
        }
    }
}

/// Trait for receiving progress updates during cleaning.
///
/// Implementations must be `Send + Sync` so a [`Cleaner`](crate::Cleaner)
/// holding one can be moved to a worker thread.
pub trait ProgressReporter: Send + Sync {
    /// Called at the start and end of every stage.
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    /// Creates a new closure-based progress reporter.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}
