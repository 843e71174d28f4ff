//! Metric definitions and the built-in catalog.
//!
//! A [`MetricDefinition`] names one column (or row) of a tear sheet: a stable
//! `key` that data rows and formatters are addressed by, and a human-readable
//! `label` for headers. Definition order is display order.

use serde::{Deserialize, Serialize};

/// A single named metric.
///
/// Keys must be unique within a definition list; the renderer rejects
/// duplicates at call time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricDefinition {
    /// Stable identifier, matches the field name in data rows (e.g. `"cagr"`)
    pub key: String,
    /// Header/row title shown to the user (e.g. `"CAGR"`)
    pub label: String,
}

impl MetricDefinition {
    /// Create a definition from a key and display label.
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

/// The standard tear-sheet metric set, in canonical display order.
///
/// This is the column set produced by [`crate::stats::MetricSet`] and covered
/// by [`crate::format::FormatRegistry::standard`].
pub fn standard_definitions() -> Vec<MetricDefinition> {
    vec![
        MetricDefinition::new("cagr", "CAGR"),
        MetricDefinition::new("volatility", "Volatility"),
        MetricDefinition::new("mdd", "MDD"),
        MetricDefinition::new("sharpe_ratio", "Sharpe"),
        MetricDefinition::new("sortino_ratio", "Sortino"),
        MetricDefinition::new("beta", "Beta"),
        MetricDefinition::new("alpha", "Alpha"),
        MetricDefinition::new("custom_score", "Score"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_definitions_order() {
        let defs = standard_definitions();
        let keys: Vec<&str> = defs.iter().map(|d| d.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "cagr",
                "volatility",
                "mdd",
                "sharpe_ratio",
                "sortino_ratio",
                "beta",
                "alpha",
                "custom_score"
            ]
        );
    }

    #[test]
    fn test_standard_definitions_unique_keys() {
        let defs = standard_definitions();
        let mut keys: Vec<&str> = defs.iter().map(|d| d.key.as_str()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), defs.len());
    }
}
