//! Declarative chart specifications.
//!
//! Charts are emitted as Vega-Lite v5 documents with inline data, so any
//! Vega-Lite viewer can render them. Every chart is built from the clean
//! table or one of its aggregates.
//!
//! # Example
//!
//! ```rust,ignore
//! use sales_eda::charts::ChartSet;
//!
//! let charts = ChartSet::from_clean(&clean)?;
//! let written = charts.write_to_dir("output/charts")?;
//! ```

use crate::analysis::{
    CorrelationMatrix, DailyTotal, PriorityTotal, SalespersonSummary, correlation_matrix,
    daily_totals, priority_totals, salesperson_summary,
};
use crate::cleaner::{PRIORITY_NUMERIC_COLUMN, VALUE_COLUMN};
use crate::error::Result;
use crate::types::Priority;
use polars::prelude::DataFrame;
use serde::Serialize;
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

pub const AVG_SALES_COLOR: &str = "#2ca02c";
pub const TOTAL_SALES_COLOR: &str = "#e377c2";
pub const TREND_COLOR: &str = "#9467bd";

/// A single named chart document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub name: String,
    pub spec: Value,
}

impl ChartSpec {
    fn new(name: &str, spec: Value) -> Self {
        Self {
            name: name.to_string(),
            spec,
        }
    }

    /// File name used by [`ChartSet::write_to_dir`].
    pub fn file_name(&self) -> String {
        format!("{}.vl.json", self.name)
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.spec)?)
    }
}

/// Bar chart of average sales per person, highest first.
pub fn avg_sales_by_person(summary: &[SalespersonSummary]) -> ChartSpec {
    let mut rows: Vec<&SalespersonSummary> = summary.iter().collect();
    rows.sort_by(|a, b| {
        b.avg_sales
            .total_cmp(&a.avg_sales)
            .then_with(|| a.sales_person.cmp(&b.sales_person))
    });
    let order: Vec<&str> = rows.iter().map(|s| s.sales_person.as_str()).collect();
    let values: Vec<Value> = rows
        .iter()
        .map(|s| json!({ "sales_person": s.sales_person, "avg_sales": s.avg_sales }))
        .collect();

    ChartSpec::new(
        "avg_sales_by_person",
        person_bar(
            "Average sales value by salesperson",
            values,
            "avg_sales",
            "Average sales value",
            &order,
            AVG_SALES_COLOR,
        ),
    )
}

/// Bar chart of total sales per person, highest first.
pub fn total_sales_by_person(summary: &[SalespersonSummary]) -> ChartSpec {
    let order: Vec<&str> = summary.iter().map(|s| s.sales_person.as_str()).collect();
    let values: Vec<Value> = summary
        .iter()
        .map(|s| json!({ "sales_person": s.sales_person, "total_sales": s.total_sales }))
        .collect();

    ChartSpec::new(
        "total_sales_by_person",
        person_bar(
            "Total sales value by salesperson",
            values,
            "total_sales",
            "Total sales value",
            &order,
            TOTAL_SALES_COLOR,
        ),
    )
}

fn person_bar(
    title: &str,
    values: Vec<Value>,
    field: &str,
    axis_title: &str,
    order: &[&str],
    color: &str,
) -> Value {
    json!({
        "$schema": VEGA_LITE_SCHEMA,
        "title": title,
        "data": { "values": values },
        "mark": { "type": "bar", "color": color },
        "encoding": {
            "x": {
                "field": "sales_person",
                "type": "nominal",
                "sort": order,
                "title": "Sales person",
                "axis": { "labelAngle": -45 }
            },
            "y": { "field": field, "type": "quantitative", "title": axis_title }
        }
    })
}

/// Line chart of daily totals.
pub fn daily_sales_trend(daily: &[DailyTotal]) -> ChartSpec {
    let values: Vec<Value> = daily
        .iter()
        .map(|d| {
            json!({
                "date": d.date.format("%Y-%m-%d").to_string(),
                "total_sales": d.total_sales
            })
        })
        .collect();

    ChartSpec::new(
        "daily_sales_trend",
        json!({
            "$schema": VEGA_LITE_SCHEMA,
            "title": "Total sales value over time",
            "data": { "values": values },
            "mark": { "type": "line", "point": true, "color": TREND_COLOR },
            "encoding": {
                "x": { "field": "date", "type": "temporal", "title": "Date" },
                "y": { "field": "total_sales", "type": "quantitative", "title": "Total sales value" }
            }
        }),
    )
}

/// Bar chart of totals per priority, Critical first, one fixed color per level.
pub fn sales_by_priority(totals: &[PriorityTotal]) -> ChartSpec {
    let values: Vec<Value> = totals
        .iter()
        .map(|t| json!({ "priority": t.priority.label(), "total_sales": t.total_sales }))
        .collect();
    let domain: Vec<&str> = Priority::CHART_ORDER.iter().map(|p| p.label()).collect();
    let range: Vec<&str> = Priority::CHART_ORDER.iter().map(|p| p.color()).collect();

    ChartSpec::new(
        "sales_by_priority",
        json!({
            "$schema": VEGA_LITE_SCHEMA,
            "title": "Total sales value by priority",
            "data": { "values": values },
            "mark": "bar",
            "encoding": {
                "x": { "field": "priority", "type": "ordinal", "sort": domain, "title": "Priority" },
                "y": { "field": "total_sales", "type": "quantitative", "title": "Total sales value" },
                "color": {
                    "field": "priority",
                    "type": "nominal",
                    "scale": { "domain": domain, "range": range },
                    "legend": null
                }
            }
        }),
    )
}

/// Annotated heatmap of a correlation matrix. Undefined cells are left empty.
pub fn correlation_heatmap(matrix: &CorrelationMatrix) -> ChartSpec {
    let mut values = Vec::new();
    for (row, cells) in matrix.columns.iter().zip(&matrix.values) {
        for (col, cell) in matrix.columns.iter().zip(cells) {
            values.push(json!({ "row": row, "column": col, "correlation": cell }));
        }
    }

    ChartSpec::new(
        "correlation_heatmap",
        json!({
            "$schema": VEGA_LITE_SCHEMA,
            "title": "Correlation heatmap",
            "data": { "values": values },
            "encoding": {
                "x": { "field": "column", "type": "nominal", "sort": matrix.columns, "title": null },
                "y": { "field": "row", "type": "nominal", "sort": matrix.columns, "title": null }
            },
            "layer": [
                {
                    "mark": "rect",
                    "encoding": {
                        "color": {
                            "field": "correlation",
                            "type": "quantitative",
                            "scale": { "scheme": "blueorange", "domain": [-1, 1] }
                        }
                    }
                },
                {
                    "mark": { "type": "text", "baseline": "middle" },
                    "encoding": {
                        "text": { "field": "correlation", "type": "quantitative", "format": ".2f" }
                    }
                }
            ]
        }),
    )
}

/// The full set of charts for one clean table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChartSet {
    pub charts: Vec<ChartSpec>,
}

impl ChartSet {
    /// Build every chart from a clean table.
    pub fn from_clean(df: &DataFrame) -> Result<Self> {
        let summary = salesperson_summary(df)?;
        let matrix = correlation_matrix(df, &[PRIORITY_NUMERIC_COLUMN, VALUE_COLUMN])?;

        Ok(Self {
            charts: vec![
                avg_sales_by_person(&summary),
                total_sales_by_person(&summary),
                daily_sales_trend(&daily_totals(df)?),
                sales_by_priority(&priority_totals(df)?),
                correlation_heatmap(&matrix),
            ],
        })
    }

    pub fn get(&self, name: &str) -> Option<&ChartSpec> {
        self.charts.iter().find(|c| c.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.charts.iter().map(|c| c.name.as_str()).collect()
    }

    /// Write each chart as `<name>.vl.json` into `dir`, creating it if needed.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let mut written = Vec::with_capacity(self.charts.len());
        for chart in &self.charts {
            let path = dir.join(chart.file_name());
            fs::write(&path, chart.to_pretty_json()?)?;
            debug!("Wrote chart {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}
