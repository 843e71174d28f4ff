//! Data rows: one entity's metric values as supplied by the computation layer.

use std::collections::HashMap;

/// One metric observation.
///
/// The upstream contract distinguishes a metric that was never computed
/// (the key is absent from the result object) from one that was computed but
/// is statistically undefined (the key maps to null, as beta/alpha do with
/// insufficient regression data). Rendering treats the two differently:
/// missing values short-circuit to a placeholder, null values go through the
/// metric's formatter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MetricValue {
    /// Key absent: the metric was never computed
    #[default]
    Missing,
    /// Present but statistically undefined
    Null,
    /// A plain number (may be non-finite; the formatter decides)
    Num(f64),
}

impl MetricValue {
    /// Map an upstream optional number: `None` is null, never missing.
    pub fn from_option(value: Option<f64>) -> Self {
        match value {
            Some(v) => MetricValue::Num(v),
            None => MetricValue::Null,
        }
    }

    /// The numeric value, if there is one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            MetricValue::Num(v) => Some(*v),
            _ => None,
        }
    }

    /// Check for the missing (never computed) state.
    pub fn is_missing(&self) -> bool {
        matches!(self, MetricValue::Missing)
    }
}

/// One entity (ticker, portfolio, benchmark) with its metric values.
///
/// Values are read-only inputs to rendering; a row is built once by the
/// computation or loading layer and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataRow {
    label: String,
    note: Option<String>,
    values: HashMap<String, MetricValue>,
}

impl DataRow {
    /// Create an empty row for the given entity label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            note: None,
            values: HashMap::new(),
        }
    }

    /// Builder: attach an annotation (e.g. a data-completeness footnote).
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Builder: set a metric value. Storing [`MetricValue::Missing`] is the
    /// same as not storing the key at all.
    pub fn with_value(mut self, key: impl Into<String>, value: MetricValue) -> Self {
        if !value.is_missing() {
            self.values.insert(key.into(), value);
        }
        self
    }

    /// Entity label without the annotation.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Annotation, if any.
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    /// Label cell text: the label with the annotation appended directly
    /// after it, no separator.
    pub fn display_label(&self) -> String {
        match &self.note {
            Some(note) => format!("{}{}", self.label, note),
            None => self.label.clone(),
        }
    }

    /// Value for a metric key; [`MetricValue::Missing`] when absent.
    pub fn value(&self, key: &str) -> MetricValue {
        self.values.get(key).copied().unwrap_or_default()
    }

    /// Numeric value for a metric key, if present and a number.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.value(key).as_number()
    }
}
