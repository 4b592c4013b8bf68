//! Shared utilities for the cleaning pipeline.
//!
//! This module contains common helper functions used across multiple modules
//! to reduce code duplication and ensure consistency.

use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use std::collections::BTreeMap;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type for classification purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// Date or datetime types
    Datetime,
    /// Boolean type
    Boolean,
    /// String/text type
    String,
    /// Other/unknown types
    Other,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a date or datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Datetime(_, _) | DataType::Date)
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else if is_datetime_dtype(dtype) {
        DtypeCategory::Datetime
    } else if matches!(dtype, DataType::Boolean) {
        DtypeCategory::Boolean
    } else if matches!(dtype, DataType::String | DataType::Categorical(_, _)) {
        DtypeCategory::String
    } else {
        DtypeCategory::Other
    }
}

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Characters commonly used in numeric formatting that should be stripped.
pub const NUMERIC_FORMAT_CHARS: [char; 6] = [',', '$', '%', '€', '£', ' '];

/// Textual markers read as missing values (compared case-insensitively).
pub const MISSING_MARKERS: [&str; 7] = ["na", "n/a", "nan", "null", "none", "#n/a", "<na>"];

static NUMERIC_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$").expect("Invalid regex: numeric")
});

/// Clean a string for numeric parsing by removing formatting characters.
///
/// # Example
///
/// ```rust,ignore
/// use sales_eda::utils::clean_numeric_string;
///
/// assert_eq!(clean_numeric_string("£1,234.56"), "1234.56");
/// ```
pub fn clean_numeric_string(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !NUMERIC_FORMAT_CHARS.contains(c))
        .collect()
}

/// Check if a string is blank or a missing-value marker.
pub fn is_missing_marker(s: &str) -> bool {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return true;
    }
    let lower = trimmed.to_ascii_lowercase();
    MISSING_MARKERS.iter().any(|&marker| lower == marker)
}

/// Try to parse a string as a plain decimal number.
///
/// Currency symbols and thousands separators are stripped first. Words such
/// as `inf` or `nan` are not accepted.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let cleaned = clean_numeric_string(s);
    if !NUMERIC_PATTERN.is_match(&cleaned) {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// Render a float without trailing noise, e.g. `100` or `12.5`.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

// =============================================================================
// Series Access Utilities
// =============================================================================

/// Read a numeric Series as `f64` options, treating NaN as missing.
pub fn float_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let casted = series.cast(&DataType::Float64)?;
    Ok(casted
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

/// Read a Series as owned string options.
pub fn string_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let casted = series.cast(&DataType::String)?;
    Ok(casted
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Count missing numeric values (nulls and NaN).
pub fn count_missing_numeric(series: &Series) -> PolarsResult<usize> {
    Ok(float_values(series)?.iter().filter(|v| v.is_none()).count())
}

// =============================================================================
// Statistics Utilities
// =============================================================================

/// Float64 view of a numeric Series with NaN turned into null.
pub fn float_chunked(series: &Series) -> PolarsResult<Float64Chunked> {
    let casted = series.cast(&DataType::Float64)?;
    Ok(casted
        .f64()?
        .apply(|v| v.filter(|x| !x.is_nan()))
        .with_name(series.name().clone()))
}

/// Quantile of the non-missing values, interpolating linearly between ranks.
pub fn linear_quantile(series: &Series, q: f64) -> PolarsResult<Option<f64>> {
    float_chunked(series)?.quantile(q, QuantileMethod::Linear)
}

/// Most frequent value; ties resolve to the smallest value in sorted order.
pub fn string_mode<'a, I>(values: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut value_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for val in values {
        *value_counts.entry(val).or_insert(0) += 1;
    }

    // BTreeMap iterates in ascending key order, so keeping only strictly
    // greater counts leaves the smallest key among the tied maxima.
    let mut best: Option<(&str, usize)> = None;
    for (val, count) in value_counts {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((val, count));
        }
    }
    best.map(|(val, _)| val.to_string())
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill missing values in a numeric Series, returning a Float64 Series and
/// the number of values filled.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<(Series, usize)> {
    let values = float_values(series)?;
    let filled_count = values.iter().filter(|v| v.is_none()).count();
    let filled: Vec<Option<f64>> = values
        .into_iter()
        .map(|v| Some(v.unwrap_or(fill_value)))
        .collect();
    Ok((Series::new(series.name().clone(), filled), filled_count))
}

/// Fill null values in a string Series, returning the new Series and the
/// number of values filled.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<(Series, usize)> {
    let values = string_values(series)?;
    let filled_count = values.iter().filter(|v| v.is_none()).count();
    let filled: Vec<Option<String>> = values
        .into_iter()
        .map(|v| Some(v.unwrap_or_else(|| fill_value.to_string())))
        .collect();
    Ok((Series::new(series.name().clone(), filled), filled_count))
}
