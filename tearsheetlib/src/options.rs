//! Input options for rendering and row ordering.
//!
//! This module contains the configuration types that control how a table is
//! laid out. Ordering is deliberately a separate step applied to data rows
//! before rendering: the renderer itself never sorts.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::row::DataRow;

/// Which axis the metrics occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    /// Each data row becomes a table row; metrics are columns
    #[default]
    EntityRows,
    /// Each metric becomes a table row; entities are columns
    MetricRows,
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "entities" | "entity-rows" | "tickers" => Ok(Orientation::EntityRows),
            "metrics" | "metric-rows" => Ok(Orientation::MetricRows),
            _ => Err(format!("Unknown orientation: {}", s)),
        }
    }
}

/// Options for one render call.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Table layout
    pub orientation: Orientation,
    /// Optional benchmark row, appended after all primary entities
    pub reference: Option<DataRow>,
    /// Optional table title
    pub title: Option<String>,
}

impl RenderOptions {
    /// Default options: entities as rows, no reference, no title.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the orientation.
    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Builder: attach a benchmark reference row.
    pub fn reference(mut self, row: DataRow) -> Self {
        self.reference = Some(row);
        self
    }

    /// Builder: set the table title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Field to order data rows by.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderBy {
    /// Order by entity label (lexicographical)
    #[default]
    Label,
    /// Order by a metric's numeric value, addressed by stable key
    Metric(String),
}

impl FromStr for OrderBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "label" | "name" | "ticker" => Ok(OrderBy::Label),
            key if !key.is_empty() => Ok(OrderBy::Metric(key.to_string())),
            _ => Err("Empty order field".to_string()),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderDirection {
    /// Ascending (A-Z, smallest first)
    #[default]
    Ascending,
    /// Descending (Z-A, largest first)
    Descending,
}

/// Ordering configuration for data rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ordering {
    /// Field to order by
    pub by: OrderBy,
    /// Sort direction
    pub direction: OrderDirection,
}

impl Default for Ordering {
    fn default() -> Self {
        Self {
            by: OrderBy::Label,
            direction: OrderDirection::Ascending,
        }
    }
}

impl Ordering {
    /// Order by label ascending (default).
    pub fn by_label() -> Self {
        Self::default()
    }

    /// Order by a metric key, descending (best first).
    pub fn by_metric(key: impl Into<String>) -> Self {
        Self {
            by: OrderBy::Metric(key.into()),
            direction: OrderDirection::Descending,
        }
    }

    /// Set sort direction to ascending.
    pub fn ascending(mut self) -> Self {
        self.direction = OrderDirection::Ascending;
        self
    }

    /// Set sort direction to descending.
    pub fn descending(mut self) -> Self {
        self.direction = OrderDirection::Descending;
        self
    }

    /// Sort rows in place.
    ///
    /// When ordering by a metric, rows without a number for that key
    /// (missing or null) sort after all numeric rows regardless of
    /// direction. The sort is stable, so ties keep their input order.
    pub fn apply(&self, rows: &mut [DataRow]) {
        match &self.by {
            OrderBy::Label => rows.sort_by(|a, b| {
                let ord = a.label().cmp(b.label());
                match self.direction {
                    OrderDirection::Ascending => ord,
                    OrderDirection::Descending => ord.reverse(),
                }
            }),
            OrderBy::Metric(key) => rows.sort_by(|a, b| {
                match (a.number(key), b.number(key)) {
                    (Some(x), Some(y)) => {
                        let ord = x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal);
                        match self.direction {
                            OrderDirection::Ascending => ord,
                            OrderDirection::Descending => ord.reverse(),
                        }
                    }
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                }
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::MetricValue;

    fn row(label: &str, cagr: Option<f64>) -> DataRow {
        let row = DataRow::new(label);
        match cagr {
            Some(v) => row.with_value("cagr", MetricValue::Num(v)),
            None => row,
        }
    }

    fn labels(rows: &[DataRow]) -> Vec<&str> {
        rows.iter().map(|r| r.label()).collect()
    }

    #[test]
    fn test_orientation_from_str() {
        assert_eq!(
            Orientation::from_str("entities").unwrap(),
            Orientation::EntityRows
        );
        assert_eq!(
            Orientation::from_str("metrics").unwrap(),
            Orientation::MetricRows
        );
        assert!(Orientation::from_str("sideways").is_err());
    }

    #[test]
    fn test_ordering_default() {
        let ordering = Ordering::default();
        assert_eq!(ordering.by, OrderBy::Label);
        assert_eq!(ordering.direction, OrderDirection::Ascending);
    }

    #[test]
    fn test_order_by_from_str() {
        assert_eq!(OrderBy::from_str("label").unwrap(), OrderBy::Label);
        assert_eq!(OrderBy::from_str("ticker").unwrap(), OrderBy::Label);
        assert_eq!(
            OrderBy::from_str("sharpe_ratio").unwrap(),
            OrderBy::Metric("sharpe_ratio".to_string())
        );
    }

    #[test]
    fn test_sort_by_label() {
        let mut rows = vec![row("MSFT", None), row("AAPL", None), row("GOOG", None)];
        Ordering::by_label().apply(&mut rows);
        assert_eq!(labels(&rows), vec!["AAPL", "GOOG", "MSFT"]);
    }

    #[test]
    fn test_sort_by_metric_descending() {
        let mut rows = vec![
            row("A", Some(0.05)),
            row("B", Some(0.25)),
            row("C", Some(0.10)),
        ];
        Ordering::by_metric("cagr").apply(&mut rows);
        assert_eq!(labels(&rows), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_valueless_rows_sort_last_both_directions() {
        let mut rows = vec![row("A", None), row("B", Some(0.1)), row("C", Some(0.2))];
        Ordering::by_metric("cagr").apply(&mut rows);
        assert_eq!(labels(&rows), vec!["C", "B", "A"]);

        let mut rows = vec![row("A", None), row("B", Some(0.1)), row("C", Some(0.2))];
        Ordering::by_metric("cagr").ascending().apply(&mut rows);
        assert_eq!(labels(&rows), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let mut rows = vec![
            row("first", Some(0.1)),
            row("second", Some(0.1)),
            row("third", Some(0.1)),
        ];
        Ordering::by_metric("cagr").apply(&mut rows);
        assert_eq!(labels(&rows), vec!["first", "second", "third"]);
    }
}
