//! Pipeline module.
//!
//! This module provides the cleaning pipeline and its later stages.

mod builder;
pub mod outliers;
pub mod priority;
pub mod progress;

pub use builder::{Cleaner, CleanerBuilder, clean};
pub use outliers::{OutlierHandler, OutlierOutcome};
pub use priority::{PriorityMapper, PriorityOutcome};
pub use progress::{
    ClosureProgressReporter, CleaningStage, ProgressReporter, ProgressUpdate,
};
