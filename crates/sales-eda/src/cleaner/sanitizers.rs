//! Value sanitization applied before column classification.

use crate::error::Result;
use crate::utils::is_missing_marker;
use polars::prelude::*;
use tracing::debug;

/// Replace blank and textual missing markers (`n/a`, `null`, ...) in every
/// string column with real nulls.
///
/// Returns the new table and the number of values replaced.
pub(crate) fn nullify_missing_markers(df: &DataFrame) -> Result<(DataFrame, usize)> {
    let mut out = df.clone();
    let mut total_replaced = 0;

    let column_names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    for col_name in &column_names {
        let series = df.column(col_name)?.as_materialized_series();
        if series.dtype() != &DataType::String {
            continue;
        }

        let str_series = series.str()?;
        let mut replaced = 0;
        let cleaned: Vec<Option<&str>> = str_series
            .into_iter()
            .map(|opt_val| match opt_val {
                Some(val) if is_missing_marker(val) => {
                    replaced += 1;
                    None
                }
                other => other,
            })
            .collect();

        if replaced > 0 {
            debug!("Column '{}': {} missing markers -> null", col_name, replaced);
            out.replace(col_name, Series::new(col_name.as_str().into(), cleaned))?;
            total_replaced += replaced;
        }
    }

    Ok((out, total_replaced))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nullify_missing_markers() {
        let df = df![
            "sales_person" => [Some("Alice"), Some("N/A"), Some("  "), None],
            "units" => [1, 2, 3, 4],
        ]
        .unwrap();

        let (out, replaced) = nullify_missing_markers(&df).unwrap();
        assert_eq!(replaced, 2);
        assert_eq!(out.column("sales_person").unwrap().null_count(), 3);
        assert_eq!(out.column("units").unwrap().null_count(), 0);
    }

    #[test]
    fn test_nullify_keeps_real_values() {
        let df = df!["region" => ["unknown", "Nancy", "North"]].unwrap();
        let (out, replaced) = nullify_missing_markers(&df).unwrap();
        assert_eq!(replaced, 0);
        assert_eq!(out.column("region").unwrap().null_count(), 0);
    }
}
