//! CSV input.

use anyhow::{Context, Result};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, warn};

/// Rows sampled for schema inference.
pub const INFER_SCHEMA_ROWS: usize = 1000;

/// Load a headed CSV file.
///
/// The schema is inferred from the first [`INFER_SCHEMA_ROWS`] rows. If that
/// read fails (typically a column that changes type further down), the file
/// is read again with every column as a string and left for the cleaner to
/// coerce.
pub fn load_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();

    match read_csv(path, Some(INFER_SCHEMA_ROWS)) {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Schema-inferred loading failed: {}", e);
        }
    }

    warn!(
        "Could not infer a schema for {}; reading every column as text",
        path.display()
    );
    read_csv(path, Some(0))
        .with_context(|| format!("Failed to read CSV file {}", path.display()))
}

fn read_csv(path: &Path, infer_schema_length: Option<usize>) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_infer_schema_length(infer_schema_length)
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
}
