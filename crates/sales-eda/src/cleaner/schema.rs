//! Explicit column classification.
//!
//! Every later stage reads the [`TableSchema`] produced here instead of
//! inspecting dtypes on its own.

use super::columns::{DATE_COLUMN, PERSON_COLUMN, PRIORITY_COLUMN, VALUE_COLUMN};
use super::converters::{is_numeric_string_series, to_float_series};
use crate::error::Result;
use crate::types::{ColumnKind, TableSchema};
use crate::utils::{DtypeCategory, get_dtype_category};
use polars::prelude::*;
use tracing::debug;

/// Outcome of classification.
#[derive(Debug, Clone)]
pub struct Classification {
    pub df: DataFrame,
    pub schema: TableSchema,
    /// String columns converted to Float64.
    pub coerced: Vec<String>,
    /// Non-null `total_sales_value` entries that were not numbers.
    pub unparseable_values: usize,
}

/// Assigns a [`ColumnKind`] to every column and converts columns to the
/// physical type their kind requires.
pub struct SchemaClassifier {
    pub coerce_numeric_strings: bool,
}

impl SchemaClassifier {
    pub fn classify(&self, df: &DataFrame) -> Result<Classification> {
        let mut out = df.clone();
        let mut schema = TableSchema::default();
        let mut coerced = Vec::new();
        let mut unparseable_values = 0;

        let column_names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        for name in &column_names {
            let series = df.column(name)?.as_materialized_series();
            let category = get_dtype_category(series.dtype());
            let numeric_strings = category == DtypeCategory::String
                && self.coerce_numeric_strings
                && is_numeric_string_series(series)?;

            let kind = match name.as_str() {
                DATE_COLUMN => ColumnKind::Date,
                VALUE_COLUMN => {
                    if category != DtypeCategory::Numeric
                        || series.dtype() != &DataType::Float64
                    {
                        let (converted, bad) = to_float_series(series)?;
                        if category != DtypeCategory::Numeric {
                            coerced.push(name.clone());
                        }
                        unparseable_values = bad;
                        out.replace(name, converted)?;
                    }
                    ColumnKind::Numeric
                }
                PERSON_COLUMN | PRIORITY_COLUMN => {
                    if category != DtypeCategory::String {
                        out.replace(name, series.cast(&DataType::String)?)?;
                    }
                    ColumnKind::Categorical
                }
                _ => match category {
                    DtypeCategory::Numeric => ColumnKind::Numeric,
                    DtypeCategory::Datetime => ColumnKind::Date,
                    DtypeCategory::String if numeric_strings => {
                        let (converted, _) = to_float_series(series)?;
                        out.replace(name, converted)?;
                        coerced.push(name.clone());
                        ColumnKind::Numeric
                    }
                    DtypeCategory::String => ColumnKind::Categorical,
                    DtypeCategory::Boolean | DtypeCategory::Other => {
                        out.replace(name, series.cast(&DataType::String)?)?;
                        ColumnKind::Categorical
                    }
                },
            };

            debug!("Column '{}' classified as {:?}", name, kind);
            schema.push(name.as_str(), kind);
        }

        Ok(Classification {
            df: out,
            schema,
            coerced,
            unparseable_values,
        })
    }
}
