//! Configuration types for the cleaning pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup.

use serde::{Deserialize, Serialize};

/// Default date formats tried in order when parsing the `date` column.
///
/// Ambiguous day/month input resolves month-first.
pub const DEFAULT_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%Y%m%d",
];

/// Default aliases renamed to `total_sales_value`.
pub const DEFAULT_VALUE_ALIASES: &[&str] = &["value_", "value"];

/// What to do with rows whose priority is outside Low/Medium/High/Critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnmappedPriorityPolicy {
    /// Drop the rows, count them and emit a warning
    #[default]
    Filter,
    /// Abort the run with an error
    Reject,
}

/// Configuration for the cleaning pipeline.
///
/// Use [`CleanerConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use sales_eda::config::{CleanerConfig, UnmappedPriorityPolicy};
///
/// let config = CleanerConfig::builder()
///     .iqr_multiplier(3.0)
///     .unmapped_priority(UnmappedPriorityPolicy::Reject)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    /// Column names (after normalization) renamed to `total_sales_value`.
    /// The first one present wins.
    /// Default: ["value_", "value"]
    pub value_column_aliases: Vec<String>,

    /// Multiplier applied to the IQR when computing outlier bounds.
    /// Default: 1.5
    pub iqr_multiplier: f64,

    /// Handling of priority values outside the ordinal set.
    /// Default: Filter
    pub unmapped_priority: UnmappedPriorityPolicy,

    /// chrono format strings tried in order for the `date` column.
    /// Default: [`DEFAULT_DATE_FORMATS`]
    pub date_formats: Vec<String>,

    /// Whether string columns whose values all look numeric become Float64.
    /// Default: true
    pub coerce_numeric_strings: bool,

    /// Whether to remove exact duplicate rows.
    /// Default: true
    pub remove_duplicates: bool,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            value_column_aliases: DEFAULT_VALUE_ALIASES.iter().map(|s| s.to_string()).collect(),
            iqr_multiplier: 1.5,
            unmapped_priority: UnmappedPriorityPolicy::default(),
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|s| s.to_string()).collect(),
            coerce_numeric_strings: true,
            remove_duplicates: true,
        }
    }
}

impl CleanerConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CleanerConfigBuilder {
        CleanerConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.iqr_multiplier.is_finite() || self.iqr_multiplier < 0.0 {
            return Err(ConfigValidationError::InvalidIqrMultiplier(
                self.iqr_multiplier,
            ));
        }

        if self.date_formats.is_empty() {
            return Err(ConfigValidationError::NoDateFormats);
        }

        if let Some(alias) = self
            .value_column_aliases
            .iter()
            .find(|a| a.trim().is_empty())
        {
            return Err(ConfigValidationError::InvalidAlias(alias.clone()));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid IQR multiplier: {0} (must be finite and non-negative)")]
    InvalidIqrMultiplier(f64),

    #[error("At least one date format is required")]
    NoDateFormats,

    #[error("Invalid value column alias: '{0}'")]
    InvalidAlias(String),
}

/// Builder for [`CleanerConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CleanerConfigBuilder {
    value_column_aliases: Option<Vec<String>>,
    iqr_multiplier: Option<f64>,
    unmapped_priority: Option<UnmappedPriorityPolicy>,
    date_formats: Option<Vec<String>>,
    coerce_numeric_strings: Option<bool>,
    remove_duplicates: Option<bool>,
}

impl CleanerConfigBuilder {
    /// Replace the list of column names renamed to `total_sales_value`.
    ///
    /// Aliases are matched against normalized column names.
    pub fn value_column_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.value_column_aliases = Some(aliases.into_iter().map(Into::into).collect());
        self
    }

    /// Set the IQR multiplier used for outlier bounds.
    ///
    /// # Arguments
    /// * `k` - Non-negative multiplier (1.5 = classic Tukey fences)
    pub fn iqr_multiplier(mut self, k: f64) -> Self {
        self.iqr_multiplier = Some(k);
        self
    }

    /// Set the policy for priority values outside the ordinal set.
    pub fn unmapped_priority(mut self, policy: UnmappedPriorityPolicy) -> Self {
        self.unmapped_priority = Some(policy);
        self
    }

    /// Replace the date formats tried when parsing the `date` column.
    pub fn date_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.date_formats = Some(formats.into_iter().map(Into::into).collect());
        self
    }

    /// Enable or disable coercion of numeric-looking string columns.
    pub fn coerce_numeric_strings(mut self, enable: bool) -> Self {
        self.coerce_numeric_strings = Some(enable);
        self
    }

    /// Enable or disable duplicate row removal.
    pub fn remove_duplicates(mut self, remove: bool) -> Self {
        self.remove_duplicates = Some(remove);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CleanerConfig` or an error if validation fails.
    pub fn build(self) -> Result<CleanerConfig, ConfigValidationError> {
        let defaults = CleanerConfig::default();
        let config = CleanerConfig {
            value_column_aliases: self
                .value_column_aliases
                .unwrap_or(defaults.value_column_aliases),
            iqr_multiplier: self.iqr_multiplier.unwrap_or(defaults.iqr_multiplier),
            unmapped_priority: self.unmapped_priority.unwrap_or_default(),
            date_formats: self.date_formats.unwrap_or(defaults.date_formats),
            coerce_numeric_strings: self.coerce_numeric_strings.unwrap_or(true),
            remove_duplicates: self.remove_duplicates.unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CleanerConfig::default();
        assert_eq!(config.iqr_multiplier, 1.5);
        assert_eq!(config.unmapped_priority, UnmappedPriorityPolicy::Filter);
        assert_eq!(config.value_column_aliases, vec!["value_", "value"]);
        assert_eq!(config.date_formats.len(), DEFAULT_DATE_FORMATS.len());
        assert!(config.coerce_numeric_strings);
        assert!(config.remove_duplicates);
    }

    #[test]
    fn test_builder_defaults() {
        let config = CleanerConfig::builder().build().unwrap();
        assert_eq!(config, CleanerConfig::default());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = CleanerConfig::builder()
            .iqr_multiplier(3.0)
            .unmapped_priority(UnmappedPriorityPolicy::Reject)
            .value_column_aliases(["amount"])
            .date_formats(["%d/%m/%Y"])
            .remove_duplicates(false)
            .build()
            .unwrap();

        assert_eq!(config.iqr_multiplier, 3.0);
        assert_eq!(config.unmapped_priority, UnmappedPriorityPolicy::Reject);
        assert_eq!(config.value_column_aliases, vec!["amount"]);
        assert_eq!(config.date_formats, vec!["%d/%m/%Y"]);
        assert!(!config.remove_duplicates);
    }

    #[test]
    fn test_validation_negative_multiplier() {
        let result = CleanerConfig::builder().iqr_multiplier(-1.0).build();
        assert!(matches!(
            result,
            Err(ConfigValidationError::InvalidIqrMultiplier(_))
        ));
    }

    #[test]
    fn test_validation_nan_multiplier() {
        let result = CleanerConfig::builder().iqr_multiplier(f64::NAN).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_empty_date_formats() {
        let result = CleanerConfig::builder()
            .date_formats(Vec::<String>::new())
            .build();
        assert!(matches!(result, Err(ConfigValidationError::NoDateFormats)));
    }

    #[test]
    fn test_validation_blank_alias() {
        let result = CleanerConfig::builder().value_column_aliases([" "]).build();
        assert!(matches!(result, Err(ConfigValidationError::InvalidAlias(_))));
    }

    #[test]
    fn test_deserialize_partial_json() {
        let json = r#"{"iqr_multiplier": 2.0, "unmapped_priority": "reject"}"#;
        let config: CleanerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.iqr_multiplier, 2.0);
        assert_eq!(config.unmapped_priority, UnmappedPriorityPolicy::Reject);
        assert_eq!(config.value_column_aliases, vec!["value_", "value"]);
    }
}
