//! Imputation module for handling missing values.
//!
//! - Median imputation for numeric columns
//! - Mode imputation for categorical columns

mod statistical;

pub use statistical::{ImputationOutcome, StatisticalImputer};
