use super::columns::DATE_COLUMN;
use super::converters::to_date_series;
use crate::error::Result;
use polars::prelude::*;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateOutcome {
    /// Non-null inputs that failed every format.
    pub unparseable: usize,
    /// Nulls in the parsed column.
    pub missing: usize,
}

/// Parses the `date` column into a polars `Date`.
pub struct DateNormalizer<'a> {
    pub formats: &'a [String],
}

impl DateNormalizer<'_> {
    /// Convert the `date` column. Bad values become null; this never fails on
    /// content, only on a missing column.
    pub fn normalize(&self, df: &DataFrame) -> Result<(DataFrame, DateOutcome)> {
        let series = df.column(DATE_COLUMN)?.as_materialized_series();
        let (parsed, unparseable) = to_date_series(series, self.formats)?;

        let outcome = DateOutcome {
            unparseable,
            missing: parsed.null_count(),
        };
        debug!(
            "Parsed '{}': {} unparseable, {} missing",
            DATE_COLUMN, outcome.unparseable, outcome.missing
        );

        let mut out = df.clone();
        out.replace(DATE_COLUMN, parsed)?;
        Ok((out, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CleanerConfig;

    #[test]
    fn test_normalize_dates() {
        let df = df![
            "sales_person" => ["Alice", "Bob", "Cara"],
            "date" => [Some("2024-01-01"), Some("yesterday"), None],
        ]
        .unwrap();
        let formats = CleanerConfig::default().date_formats;

        let (out, outcome) = DateNormalizer { formats: &formats }.normalize(&df).unwrap();
        assert_eq!(out.column("date").unwrap().dtype(), &DataType::Date);
        assert_eq!(outcome.unparseable, 1);
        assert_eq!(outcome.missing, 2);
        assert_eq!(out.height(), 3);
    }

    #[test]
    fn test_normalize_dates_is_stable() {
        let df = df!["date" => ["2024-01-01", "2024-02-01"]].unwrap();
        let formats = CleanerConfig::default().date_formats;
        let normalizer = DateNormalizer { formats: &formats };

        let (once, _) = normalizer.normalize(&df).unwrap();
        let (twice, outcome) = normalizer.normalize(&once).unwrap();
        assert!(once.equals_missing(&twice));
        assert_eq!(outcome, DateOutcome::default());
    }
}
