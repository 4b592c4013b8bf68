//! Column name normalization and required-column resolution.

use crate::error::{Result, SchemaError};
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// Canonical name of the sales value column.
pub const VALUE_COLUMN: &str = "total_sales_value";
/// Canonical name of the salesperson column.
pub const PERSON_COLUMN: &str = "sales_person";
/// Canonical name of the priority column.
pub const PRIORITY_COLUMN: &str = "priority";
/// Numeric rank attached by the priority stage.
pub const PRIORITY_NUMERIC_COLUMN: &str = "priority_numeric";
/// Canonical name of the date column.
pub const DATE_COLUMN: &str = "date";

/// Columns that must exist after renaming.
pub const REQUIRED_COLUMNS: [&str; 3] = [PERSON_COLUMN, VALUE_COLUMN, PRIORITY_COLUMN];

/// Currency and encoding artifacts removed from header names.
pub const HEADER_ARTIFACT_CHARS: [char; 5] = ['£', '€', '$', 'â', '\u{feff}'];

/// Normalize a raw header: trim, lowercase, strip artifacts, spaces to `_`.
///
/// Stripping happens after trimming, so `"Value £"` becomes `"value_"`.
pub fn normalize_column_name(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .filter(|c| !HEADER_ARTIFACT_CHARS.contains(c))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}

/// Renames columns and checks that the required ones are present.
pub struct ColumnNormalizer;

impl ColumnNormalizer {
    /// Normalize every column name.
    ///
    /// Returns the renamed table and the `(original, normalized)` pairs that
    /// actually changed. Fails if two source columns end up with the same name.
    pub fn normalize(&self, df: &DataFrame) -> Result<(DataFrame, Vec<(String, String)>)> {
        let originals: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();

        let mut by_normalized: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for original in &originals {
            by_normalized
                .entry(normalize_column_name(original))
                .or_default()
                .push(original.clone());
        }

        if let Some((normalized, sources)) =
            by_normalized.into_iter().find(|(_, sources)| sources.len() > 1)
        {
            return Err(SchemaError::ColumnCollision {
                normalized,
                sources,
            }
            .into());
        }

        let mut out = df.clone();
        let mut renamed = Vec::new();
        for original in originals {
            let normalized = normalize_column_name(&original);
            if normalized != original {
                out.rename(&original, normalized.as_str().into())?;
                debug!("Renamed column '{}' -> '{}'", original, normalized);
                renamed.push((original, normalized));
            }
        }

        Ok((out, renamed))
    }

    /// Rename the first alias present to `total_sales_value`.
    ///
    /// Nothing happens if `total_sales_value` already exists.
    pub fn resolve_value_column(
        &self,
        df: &DataFrame,
        aliases: &[String],
    ) -> Result<(DataFrame, Option<String>)> {
        if has_column(df, VALUE_COLUMN) {
            return Ok((df.clone(), None));
        }

        let Some(alias) = aliases.iter().find(|alias| has_column(df, alias)) else {
            return Ok((df.clone(), None));
        };

        let mut out = df.clone();
        out.rename(alias, VALUE_COLUMN.into())?;
        debug!("Renamed value column '{}' -> '{}'", alias, VALUE_COLUMN);
        Ok((out, Some(alias.clone())))
    }

    /// Fail with [`SchemaError::MissingColumn`] for the first absent required column.
    pub fn ensure_required(&self, df: &DataFrame) -> Result<()> {
        match REQUIRED_COLUMNS.iter().find(|name| !has_column(df, name)) {
            Some(missing) => Err(SchemaError::MissingColumn(missing.to_string()).into()),
            None => Ok(()),
        }
    }
}

/// Check whether a column exists by exact name.
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}
