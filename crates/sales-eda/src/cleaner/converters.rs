//! Type conversion functions for data cleaning.

use crate::error::Result;
use crate::utils::{is_numeric_dtype, parse_numeric_string, string_values};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;

/// Datetime layouts accepted in addition to the configured date formats.
/// Only the date part is kept.
pub(crate) const DATETIME_FORMATS: [&str; 3] =
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Check that a string series has at least one value and that every
/// non-null value parses as a number.
pub(crate) fn is_numeric_string_series(series: &Series) -> Result<bool> {
    if series.dtype() != &DataType::String {
        return Ok(false);
    }
    let mut seen = 0usize;
    for val in series.str()?.into_iter().flatten() {
        if parse_numeric_string(val).is_none() {
            return Ok(false);
        }
        seen += 1;
    }
    Ok(seen > 0)
}

/// Convert a series to Float64.
///
/// Numeric series are cast directly. Anything else is parsed value by value;
/// values that do not parse become null. Returns the new series and the
/// number of non-null inputs that failed to parse.
pub(crate) fn to_float_series(series: &Series) -> Result<(Series, usize)> {
    if is_numeric_dtype(series.dtype()) {
        return Ok((series.cast(&DataType::Float64)?, 0));
    }

    let mut unparseable = 0;
    let parsed: Vec<Option<f64>> = string_values(series)?
        .into_iter()
        .map(|opt_val| {
            let val = opt_val?;
            let num = parse_numeric_string(&val);
            if num.is_none() {
                unparseable += 1;
            }
            num
        })
        .collect();

    Ok((Series::new(series.name().clone(), parsed), unparseable))
}

/// Parse one date string, trying each format in order, then the datetime
/// layouts.
pub(crate) fn parse_date(value: &str, formats: &[String]) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Days since 1970-01-01, the physical representation of polars `Date`.
pub(crate) fn date_to_days(date: NaiveDate) -> i32 {
    (date - NaiveDate::default()).num_days() as i32
}

/// Inverse of [`date_to_days`].
pub(crate) fn days_to_date(days: i32) -> Option<NaiveDate> {
    NaiveDate::default().checked_add_signed(chrono::TimeDelta::days(days as i64))
}

/// Convert a series to the `Date` dtype.
///
/// `Date` passes through and `Datetime` is truncated. Everything else is
/// rendered as text and parsed; failures become null. Returns the new series
/// and the number of non-null inputs that failed to parse.
pub(crate) fn to_date_series(series: &Series, formats: &[String]) -> Result<(Series, usize)> {
    match series.dtype() {
        DataType::Date => return Ok((series.clone(), 0)),
        DataType::Datetime(_, _) => return Ok((series.cast(&DataType::Date)?, 0)),
        _ => {}
    }

    let mut unparseable = 0;
    let days: Vec<Option<i32>> = string_values(series)?
        .into_iter()
        .map(|opt_val| {
            let val = opt_val?;
            let parsed = parse_date(&val, formats).map(date_to_days);
            if parsed.is_none() {
                unparseable += 1;
            }
            parsed
        })
        .collect();

    let date_series = Series::new(series.name().clone(), days).cast(&DataType::Date)?;
    Ok((date_series, unparseable))
}

/// Read a `Date` series back as chrono dates.
pub(crate) fn date_values(series: &Series) -> Result<Vec<Option<NaiveDate>>> {
    let days = series.cast(&DataType::Date)?.cast(&DataType::Int32)?;
    Ok(days
        .i32()?
        .into_iter()
        .map(|d| d.and_then(days_to_date))
        .collect())
}
