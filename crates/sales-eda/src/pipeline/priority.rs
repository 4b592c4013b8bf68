//! Ordinal priority mapping.

use crate::cleaner::{PRIORITY_COLUMN, PRIORITY_NUMERIC_COLUMN};
use crate::config::UnmappedPriorityPolicy;
use crate::error::{CleaningError, Result};
use crate::types::Priority;
use crate::utils::string_values;
use polars::prelude::*;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Placeholder used in reports for a missing priority value.
const MISSING_PRIORITY: &str = "<missing>";

#[derive(Debug, Clone)]
pub struct PriorityOutcome {
    pub df: DataFrame,
    pub dropped: usize,
    /// Distinct rejected values after normalization, sorted.
    pub unmapped_values: Vec<String>,
}

/// Maps the `priority` column onto [`Priority`] and attaches `priority_numeric`.
pub struct PriorityMapper;

impl PriorityMapper {
    /// Normalize priorities, keep only rows in the ordinal set and attach
    /// the numeric rank.
    ///
    /// Under [`UnmappedPriorityPolicy::Reject`] any unmapped row is an error
    /// and the table is left untouched.
    pub fn apply(df: &DataFrame, policy: UnmappedPriorityPolicy) -> Result<PriorityOutcome> {
        let series = df.column(PRIORITY_COLUMN)?.as_materialized_series();
        let raw = string_values(series)?;

        let parsed: Vec<Option<Priority>> = raw
            .iter()
            .map(|v| v.as_deref().and_then(Priority::parse))
            .collect();

        let unmapped_values: Vec<String> = raw
            .iter()
            .zip(&parsed)
            .filter(|(_, p)| p.is_none())
            .map(|(v, _)| match v {
                Some(s) => Priority::normalize(s),
                None => MISSING_PRIORITY.to_string(),
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let dropped = parsed.iter().filter(|p| p.is_none()).count();

        if dropped > 0 && policy == UnmappedPriorityPolicy::Reject {
            return Err(CleaningError::UnmappedPriority {
                count: dropped,
                values: unmapped_values,
            });
        }

        let labels: Vec<Option<&str>> = parsed.iter().map(|p| p.map(Priority::label)).collect();
        let ranks: Vec<Option<i64>> = parsed.iter().map(|p| p.map(Priority::rank)).collect();

        let mut out = df.clone();
        out.replace(PRIORITY_COLUMN, Series::new(PRIORITY_COLUMN.into(), labels))?;
        out.with_column(Series::new(PRIORITY_NUMERIC_COLUMN.into(), ranks))?;

        if dropped > 0 {
            let mask_values: Vec<bool> = parsed.iter().map(Option::is_some).collect();
            let mask = BooleanChunked::from_slice("mask".into(), &mask_values);
            out = out.filter(&mask)?;
            warn!(
                "Excluded {} rows with unmapped priority {:?}; analyzed population narrowed",
                dropped, unmapped_values
            );
        } else {
            debug!("All priority values mapped");
        }

        Ok(PriorityOutcome {
            df: out,
            dropped,
            unmapped_values,
        })
    }
}
