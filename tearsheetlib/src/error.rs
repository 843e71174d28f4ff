//! Error types for tearsheetlib

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading data or building tables
#[derive(Error, Debug)]
pub enum TearsheetError {
    /// A metric definition has no registered formatter
    #[error("no formatter registered for metric '{key}'")]
    MissingFormatter { key: String },

    /// Two metric definitions share the same key
    #[error("duplicate metric key '{key}' in definitions")]
    DuplicateKey { key: String },

    /// The definition list was empty
    #[error("metric definitions must not be empty")]
    EmptyDefinitions,

    /// No tickers were requested
    #[error("ticker list must not be empty")]
    NoTickers,

    /// A requested ticker has no column in the price table
    #[error("ticker '{0}' not found in price data")]
    UnknownTicker(String),

    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Price CSV did not have the expected shape
    #[error("malformed price CSV '{path}': {message}")]
    MalformedCsv { path: PathBuf, message: String },

    /// Results JSON did not have the expected shape
    #[error("malformed results JSON: {0}")]
    MalformedResults(String),

    /// Invalid date string
    #[error("invalid date '{value}': {message}")]
    InvalidDate { value: String, message: String },

    /// CSV parse error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parse error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
