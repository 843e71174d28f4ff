//! Metric value formatting.
//!
//! Formatting is value-level: anomalies degrade to placeholder strings, they
//! never abort a render. A value that was never computed (key absent from the
//! row) renders as [`MISSING_PLACEHOLDER`] without the formatter being
//! invoked at all; a value that is present but unusable for its metric renders
//! as [`NOT_AVAILABLE`], and deciding that is the formatter's job.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::metrics::MetricDefinition;

/// Cell text for a metric that was never computed (key absent from the row).
pub const MISSING_PLACEHOLDER: &str = "—";

/// Cell text for a value that is present but unusable (null or non-finite,
/// per the metric's [`NullPolicy`]).
pub const NOT_AVAILABLE: &str = "N/A";

/// Numeric presentation class of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricClass {
    /// Fractional value shown as a percentage: `v * 100`, fixed decimals, `%` suffix
    Percentage,
    /// Plain ratio: fixed decimals, no suffix
    Ratio,
}

/// How a formatter treats degenerate values.
///
/// The beta/alpha null check and the sharpe/sortino finiteness check are
/// distinct: upstream reports beta/alpha as null when the regression is
/// undefined, while sharpe/sortino arrive as plain numbers that may be
/// non-finite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NullPolicy {
    /// Value is contractually numeric (CAGR, volatility, MDD)
    #[default]
    AlwaysNumeric,
    /// Render [`NOT_AVAILABLE`] for non-finite values (Sharpe, Sortino, score)
    NaIfNotFinite,
    /// Render [`NOT_AVAILABLE`] for null values (beta, alpha)
    NaIfNull,
}

/// A pure value-to-string formatter for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricFormat {
    /// Presentation class
    pub class: MetricClass,
    /// Fixed decimal places
    pub precision: usize,
    /// Degenerate-value handling
    pub null_policy: NullPolicy,
}

impl MetricFormat {
    /// Percentage metric with the given precision, always numeric.
    pub fn percentage(precision: usize) -> Self {
        Self {
            class: MetricClass::Percentage,
            precision,
            null_policy: NullPolicy::AlwaysNumeric,
        }
    }

    /// Ratio metric with the given precision, always numeric.
    pub fn ratio(precision: usize) -> Self {
        Self {
            class: MetricClass::Ratio,
            precision,
            null_policy: NullPolicy::AlwaysNumeric,
        }
    }

    /// Builder: set the null policy.
    pub fn with_null_policy(mut self, policy: NullPolicy) -> Self {
        self.null_policy = policy;
        self
    }

    /// Format a value that is present in the row.
    ///
    /// `None` is the upstream null (computed but statistically undefined).
    /// Null always renders as [`NOT_AVAILABLE`]: for `NaIfNull` metrics that
    /// is the contract, and for the other policies a null is already outside
    /// the contract, so it degrades the same way rather than panicking.
    pub fn format(&self, value: Option<f64>) -> String {
        let v = match value {
            Some(v) => v,
            None => return NOT_AVAILABLE.to_string(),
        };
        if self.null_policy == NullPolicy::NaIfNotFinite && !v.is_finite() {
            return NOT_AVAILABLE.to_string();
        }
        match self.class {
            MetricClass::Percentage => {
                format!("{:.prec$}%", v * 100.0, prec = self.precision)
            }
            MetricClass::Ratio => format!("{:.prec$}", v, prec = self.precision),
        }
    }
}

/// Formatter lookup table keyed by metric key.
///
/// Callers supply one of these per deployment; the renderer requires it to
/// cover every definition in use and fails fast on a gap, since a missing
/// formatter is a configuration mismatch rather than a data problem.
#[derive(Debug, Clone, Default)]
pub struct FormatRegistry {
    formats: HashMap<String, MetricFormat>,
}

impl FormatRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry covering [`crate::metrics::standard_definitions`].
    pub fn standard() -> Self {
        Self::new()
            .with("cagr", MetricFormat::percentage(2))
            .with("volatility", MetricFormat::percentage(2))
            .with("mdd", MetricFormat::percentage(2))
            .with(
                "sharpe_ratio",
                MetricFormat::ratio(2).with_null_policy(NullPolicy::NaIfNotFinite),
            )
            .with(
                "sortino_ratio",
                MetricFormat::ratio(2).with_null_policy(NullPolicy::NaIfNotFinite),
            )
            .with(
                "beta",
                MetricFormat::ratio(2).with_null_policy(NullPolicy::NaIfNull),
            )
            .with(
                "alpha",
                MetricFormat::percentage(2).with_null_policy(NullPolicy::NaIfNull),
            )
            .with(
                "custom_score",
                MetricFormat::ratio(4).with_null_policy(NullPolicy::NaIfNotFinite),
            )
    }

    /// Builder: register a formatter for a key.
    pub fn with(mut self, key: impl Into<String>, format: MetricFormat) -> Self {
        self.formats.insert(key.into(), format);
        self
    }

    /// Look up the formatter for a key.
    pub fn get(&self, key: &str) -> Option<&MetricFormat> {
        self.formats.get(key)
    }

    /// Check that every definition has a formatter.
    pub fn covers(&self, definitions: &[MetricDefinition]) -> bool {
        definitions.iter().all(|d| self.formats.contains_key(&d.key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::standard_definitions;

    #[test]
    fn test_percentage_format() {
        let fmt = MetricFormat::percentage(2);
        assert_eq!(fmt.format(Some(0.1534)), "15.34%");
        assert_eq!(fmt.format(Some(-0.25)), "-25.00%");
        assert_eq!(fmt.format(Some(0.0)), "0.00%");
    }

    #[test]
    fn test_ratio_format() {
        let fmt = MetricFormat::ratio(2);
        assert_eq!(fmt.format(Some(1.5)), "1.50");
        assert_eq!(fmt.format(Some(-0.333)), "-0.33");
    }

    #[test]
    fn test_score_precision() {
        let fmt = MetricFormat::ratio(4).with_null_policy(NullPolicy::NaIfNotFinite);
        assert_eq!(fmt.format(Some(1.23456)), "1.2346");
    }

    #[test]
    fn test_non_finite_ratio_is_na() {
        let fmt = MetricFormat::ratio(2).with_null_policy(NullPolicy::NaIfNotFinite);
        assert_eq!(fmt.format(Some(f64::INFINITY)), "N/A");
        assert_eq!(fmt.format(Some(f64::NEG_INFINITY)), "N/A");
        assert_eq!(fmt.format(Some(f64::NAN)), "N/A");
    }

    #[test]
    fn test_null_beta_is_na() {
        let fmt = MetricFormat::ratio(2).with_null_policy(NullPolicy::NaIfNull);
        assert_eq!(fmt.format(None), "N/A");
        assert_eq!(fmt.format(Some(0.85)), "0.85");
    }

    #[test]
    fn test_null_alpha_is_na() {
        let fmt = MetricFormat::percentage(2).with_null_policy(NullPolicy::NaIfNull);
        assert_eq!(fmt.format(None), "N/A");
        assert_eq!(fmt.format(Some(0.031)), "3.10%");
    }

    #[test]
    fn test_always_numeric_degrades_on_null() {
        let fmt = MetricFormat::percentage(2);
        assert_eq!(fmt.format(None), "N/A");
    }

    #[test]
    fn test_standard_registry_covers_standard_definitions() {
        let registry = FormatRegistry::standard();
        assert!(registry.covers(&standard_definitions()));
    }

    #[test]
    fn test_standard_registry_policies() {
        let registry = FormatRegistry::standard();
        assert_eq!(
            registry.get("beta").unwrap().null_policy,
            NullPolicy::NaIfNull
        );
        assert_eq!(
            registry.get("sharpe_ratio").unwrap().null_policy,
            NullPolicy::NaIfNotFinite
        );
        assert_eq!(registry.get("custom_score").unwrap().precision, 4);
        assert_eq!(
            registry.get("alpha").unwrap().class,
            MetricClass::Percentage
        );
    }

    #[test]
    fn test_empty_registry_covers_nothing() {
        let registry = FormatRegistry::new();
        assert!(!registry.covers(&standard_definitions()));
        assert!(registry.covers(&[]));
    }
}
