//! Presentation-ready metric tables.
//!
//! This module provides `MetricTable`, a grid of display strings that can be
//! directly consumed by terminal adapters or serialized to JSON.
//!
//! The data flow is:
//! 1. Raw series (price/equity history)
//! 2. DataRow (metric values per entity, with missing/null states)
//! 3. MetricTable (table-ready: headers, keys, body rows)
//!
//! Rendering is a stateless pure transform: the grid is rebuilt from scratch
//! on every call, cell order equals input order, and an optional benchmark
//! reference is always appended last, never interleaved with primary
//! entities. Anomalous values degrade to placeholder cells; the only hard
//! failures are configuration mistakes (empty or duplicated definitions,
//! a definition without a formatter).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::TearsheetError;
use crate::format::{FormatRegistry, MetricFormat, MISSING_PLACEHOLDER};
use crate::metrics::MetricDefinition;
use crate::options::{Orientation, RenderOptions};
use crate::row::{DataRow, MetricValue};
use crate::Result;

/// Corner cell for entities-as-rows layouts.
const ENTITY_CORNER: &str = "Ticker";

/// Corner cell for metrics-as-rows layouts.
const METRIC_CORNER: &str = "Metric";

/// A single body row (label cell plus one value cell per column).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Row label (ticker with optional note, or metric label)
    pub label: String,
    /// Display strings for each value column
    pub values: Vec<String>,
}

impl TableRow {
    /// Total cell count including the label cell.
    pub fn width(&self) -> usize {
        1 + self.values.len()
    }
}

/// Table-ready metric data.
///
/// This is the final data structure before presentation. Adapters iterate
/// over headers/rows and apply styling only; no formatting decisions are
/// left to them. `keys` carries the stable metric keys in display order so
/// interaction layers (column sorting and the like) can address a column or
/// row by key rather than by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricTable {
    /// Optional title (e.g. "PORT vs SPY")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Metric keys in display order (columns for entity rows, rows otherwise)
    pub keys: Vec<String>,
    /// Header cells: corner cell first, then one per column
    pub headers: Vec<String>,
    /// Body rows
    pub rows: Vec<TableRow>,
}

impl MetricTable {
    /// Render a grid from definitions, formatters, and data rows.
    ///
    /// Two passes, no backtracking: headers first, then one body row per
    /// entity (or per metric, for [`Orientation::MetricRows`]). Fails fast
    /// if `definitions` is empty, contains a duplicate key, or names a key
    /// `formats` does not cover.
    pub fn render(
        definitions: &[MetricDefinition],
        formats: &FormatRegistry,
        rows: &[DataRow],
        options: &RenderOptions,
    ) -> Result<Self> {
        validate(definitions, formats)?;

        let keys: Vec<String> = definitions.iter().map(|d| d.key.clone()).collect();
        let (headers, body) = match options.orientation {
            Orientation::EntityRows => {
                let headers = entity_headers(definitions);
                let body = entity_rows(definitions, formats, rows, options.reference.as_ref());
                (headers, body)
            }
            Orientation::MetricRows => {
                let headers = metric_headers(rows, options.reference.as_ref());
                let body = metric_rows(definitions, formats, rows, options.reference.as_ref());
                (headers, body)
            }
        };

        Ok(MetricTable {
            title: options.title.clone(),
            keys,
            headers,
            rows: body,
        })
    }

    /// Scan view: one row per ticker, metrics as columns, benchmark last.
    pub fn from_scan(
        definitions: &[MetricDefinition],
        formats: &FormatRegistry,
        results: &[DataRow],
        benchmark: Option<DataRow>,
    ) -> Result<Self> {
        let mut options = RenderOptions::new();
        if let Some(benchmark) = benchmark {
            options = options.reference(benchmark);
        }
        Self::render(definitions, formats, results, &options)
    }

    /// Backtest view: one column for the portfolio, metrics as rows.
    pub fn from_backtest(
        definitions: &[MetricDefinition],
        formats: &FormatRegistry,
        portfolio: &DataRow,
    ) -> Result<Self> {
        let options = RenderOptions::new().orientation(Orientation::MetricRows);
        Self::render(definitions, formats, std::slice::from_ref(portfolio), &options)
    }

    /// Comparison view: portfolio column plus benchmark column, metrics as
    /// rows, benchmark last.
    pub fn from_comparison(
        definitions: &[MetricDefinition],
        formats: &FormatRegistry,
        portfolio: &DataRow,
        benchmark: DataRow,
    ) -> Result<Self> {
        let options = RenderOptions::new()
            .orientation(Orientation::MetricRows)
            .title(format!("{} vs {}", portfolio.label(), benchmark.label()))
            .reference(benchmark);
        Self::render(definitions, formats, std::slice::from_ref(portfolio), &options)
    }

    /// Header cell count; every body row has exactly this width.
    pub fn width(&self) -> usize {
        self.headers.len()
    }
}

/// Check the formatter-coverage precondition.
fn validate(definitions: &[MetricDefinition], formats: &FormatRegistry) -> Result<()> {
    if definitions.is_empty() {
        return Err(TearsheetError::EmptyDefinitions);
    }
    let mut seen = HashSet::new();
    for definition in definitions {
        if !seen.insert(definition.key.as_str()) {
            return Err(TearsheetError::DuplicateKey {
                key: definition.key.clone(),
            });
        }
        if formats.get(&definition.key).is_none() {
            return Err(TearsheetError::MissingFormatter {
                key: definition.key.clone(),
            });
        }
    }
    Ok(())
}

/// One cell: missing values short-circuit to the placeholder without
/// touching the formatter; everything else is the formatter's call.
fn format_cell(format: &MetricFormat, value: MetricValue) -> String {
    match value {
        MetricValue::Missing => MISSING_PLACEHOLDER.to_string(),
        MetricValue::Null => format.format(None),
        MetricValue::Num(v) => format.format(Some(v)),
    }
}

/// Headers for entities-as-rows: corner cell, then metric labels.
fn entity_headers(definitions: &[MetricDefinition]) -> Vec<String> {
    let mut headers = vec![ENTITY_CORNER.to_string()];
    headers.extend(definitions.iter().map(|d| d.label.clone()));
    headers
}

/// Body for entities-as-rows: one row per entity, reference appended last.
fn entity_rows(
    definitions: &[MetricDefinition],
    formats: &FormatRegistry,
    rows: &[DataRow],
    reference: Option<&DataRow>,
) -> Vec<TableRow> {
    rows.iter()
        .chain(reference)
        .map(|row| TableRow {
            label: row.display_label(),
            values: definitions
                .iter()
                .map(|d| {
                    // coverage was validated up front
                    let format = formats.get(&d.key).unwrap();
                    format_cell(format, row.value(&d.key))
                })
                .collect(),
        })
        .collect()
}

/// Headers for metrics-as-rows: corner cell, then entity labels, reference
/// last.
fn metric_headers(rows: &[DataRow], reference: Option<&DataRow>) -> Vec<String> {
    let mut headers = vec![METRIC_CORNER.to_string()];
    headers.extend(rows.iter().chain(reference).map(DataRow::display_label));
    headers
}

/// Body for metrics-as-rows: one row per metric, entity columns in input
/// order with the reference column last.
fn metric_rows(
    definitions: &[MetricDefinition],
    formats: &FormatRegistry,
    rows: &[DataRow],
    reference: Option<&DataRow>,
) -> Vec<TableRow> {
    definitions
        .iter()
        .map(|d| {
            let format = formats.get(&d.key).unwrap();
            TableRow {
                label: d.label.clone(),
                values: rows
                    .iter()
                    .chain(reference)
                    .map(|row| format_cell(format, row.value(&d.key)))
                    .collect(),
            }
        })
        .collect()
}
