//! Error types for the cleaning pipeline.
//!
//! Two layers are used:
//!
//! - [`SchemaError`]: the input table cannot be turned into the clean schema at all
//!   (no rows, required columns missing, ambiguous column names). These abort the run
//!   before any statistics are computed.
//! - [`CleaningError`]: the crate-wide error, wrapping schema errors together with
//!   I/O, Polars and JSON failures.
//!
//! Errors serialize as `{code, message}` so they can be embedded in JSON reports.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The input table does not satisfy the shape the cleaner needs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The raw table has no rows.
    #[error("Input table has no rows")]
    EmptyTable,

    /// A required column is absent after normalization and renaming.
    #[error("Required column '{0}' not found after column normalization")]
    MissingColumn(String),

    /// Several source columns normalize to the same name.
    #[error("Columns {sources:?} all normalize to '{normalized}'")]
    ColumnCollision {
        normalized: String,
        sources: Vec<String>,
    },

    /// A stage removed every remaining row.
    #[error("No usable rows left after stage '{stage}'")]
    NoUsableRows { stage: String },
}

impl SchemaError {
    /// Stable code for this schema failure.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyTable => "EMPTY_TABLE",
            Self::MissingColumn(_) => "MISSING_COLUMN",
            Self::ColumnCollision { .. } => "COLUMN_COLLISION",
            Self::NoUsableRows { .. } => "NO_USABLE_ROWS",
        }
    }
}

/// The main error type for the cleaning pipeline.
#[derive(Error, Debug)]
pub enum CleaningError {
    /// Input schema is unusable.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Priority values outside the ordinal set under the reject policy.
    #[error("{count} rows have priority values outside Low/Medium/High/Critical: {values:?}")]
    UnmappedPriority { count: usize, values: Vec<String> },

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Report or chart generation failed.
    #[error("Failed to generate report: {0}")]
    ReportGenerationFailed(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CleaningError>,
    },
}

impl CleaningError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CleaningError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code, looking through context wrappers.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Schema(e) => e.error_code(),
            Self::UnmappedPriority { .. } => "UNMAPPED_PRIORITY",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::ReportGenerationFailed(_) => "REPORT_GENERATION_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error comes from an unusable input schema.
    pub fn is_schema_error(&self) -> bool {
        match self {
            Self::Schema(_) => true,
            Self::WithContext { source, .. } => source.is_schema_error(),
            _ => false,
        }
    }

    /// Return the underlying schema error, if any.
    pub fn as_schema_error(&self) -> Option<&SchemaError> {
        match self {
            Self::Schema(e) => Some(e),
            Self::WithContext { source, .. } => source.as_schema_error(),
            _ => None,
        }
    }
}

impl Serialize for CleaningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("CleaningError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for cleaning operations.
pub type Result<T> = std::result::Result<T, CleaningError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CleaningError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            CleaningError::from(SchemaError::EmptyTable).error_code(),
            "EMPTY_TABLE"
        );
        assert_eq!(
            CleaningError::ColumnNotFound("priority".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
        assert_eq!(
            CleaningError::UnmappedPriority {
                count: 1,
                values: vec!["Banana".to_string()]
            }
            .error_code(),
            "UNMAPPED_PRIORITY"
        );
    }

    #[test]
    fn test_is_schema_error() {
        let err = CleaningError::from(SchemaError::MissingColumn("sales_person".to_string()));
        assert!(err.is_schema_error());
        assert!(!CleaningError::InvalidConfig("x".to_string()).is_schema_error());

        let wrapped = err.with_context("During schema resolution");
        assert!(wrapped.is_schema_error());
        assert_eq!(
            wrapped.as_schema_error(),
            Some(&SchemaError::MissingColumn("sales_person".to_string()))
        );
    }

    #[test]
    fn test_collision_message_names_sources() {
        let err = SchemaError::ColumnCollision {
            normalized: "sales_person".to_string(),
            sources: vec!["Sales Person".to_string(), "sales person".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("Sales Person"));
        assert!(msg.contains("sales_person"));
    }

    #[test]
    fn test_error_serialization() {
        let error = CleaningError::from(SchemaError::MissingColumn("priority".to_string()));
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("MISSING_COLUMN"));
        assert!(json.contains("priority"));
    }

    #[test]
    fn test_with_context() {
        let error = CleaningError::ColumnNotFound("date".to_string()).with_context("Parsing dates");
        assert!(error.to_string().contains("Parsing dates"));
        assert_eq!(error.error_code(), "COLUMN_NOT_FOUND");
    }
}
