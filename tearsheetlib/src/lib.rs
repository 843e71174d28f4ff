//! # tearsheetlib
//!
//! A library for turning price history into portfolio performance tear
//! sheets: CAGR, volatility, max drawdown, Sharpe/Sortino, benchmark-relative
//! beta/alpha, and a combined score, rendered into presentation-ready tables.
//!
//! ## Overview
//!
//! The pipeline has three independent layers:
//!
//! - **Computation**: [`stats::MetricSet`] over dated [`stats::EquitySeries`],
//!   with per-ticker [`scan::scan`] and equal-weight [`backtest::run_backtest`]
//!   drivers on top.
//! - **Data model**: [`row::DataRow`] carries one entity's metric values and
//!   distinguishes *missing* (never computed) from *null* (computed but
//!   statistically undefined); the two render differently.
//! - **Rendering**: [`table::MetricTable`] is a pure transform from
//!   definitions, formatters, and rows to a rectangular grid of display
//!   strings. Orientation decides whether entities or metrics occupy the
//!   rows; an optional benchmark reference is always appended last.
//!
//! Presentation (terminal styling, CSV) lives in adapters outside this
//! crate; the grid they consume already contains every formatting decision.
//!
//! ## Example
//!
//! ```rust
//! use tearsheetlib::{
//!     standard_definitions, DataRow, FormatRegistry, MetricTable, MetricValue,
//!     RenderOptions,
//! };
//!
//! let definitions = standard_definitions();
//! let formats = FormatRegistry::standard();
//! let rows = vec![DataRow::new("AAPL")
//!     .with_value("cagr", MetricValue::Num(0.1534))
//!     .with_value("beta", MetricValue::Null)];
//!
//! let table =
//!     MetricTable::render(&definitions, &formats, &rows, &RenderOptions::new()).unwrap();
//! assert_eq!(table.headers[0], "Ticker");
//! assert_eq!(table.rows[0].values[0], "15.34%"); // cagr
//! assert_eq!(table.rows[0].values[5], "N/A");    // null beta
//! assert_eq!(table.rows[0].values[6], "—");      // alpha never computed
//! ```

pub mod backtest;
pub mod error;
pub mod format;
pub mod input;
pub mod metrics;
pub mod options;
pub mod row;
pub mod scan;
pub mod stats;
pub mod table;

pub use backtest::{run_backtest, BacktestOptions, BacktestResult, Performance};
pub use error::TearsheetError;
pub use format::{
    FormatRegistry, MetricClass, MetricFormat, NullPolicy, MISSING_PLACEHOLDER, NOT_AVAILABLE,
};
pub use input::{load_price_csv, load_results_json, PriceTable, DATE_FORMAT};
pub use metrics::{standard_definitions, MetricDefinition};
pub use options::{OrderBy, OrderDirection, Ordering, Orientation, RenderOptions};
pub use row::{DataRow, MetricValue};
pub use scan::{scan, ScanOptions, ScanResult};
pub use stats::{EquitySeries, MetricSet, DEFAULT_RISK_FREE_RATE};
pub use table::{MetricTable, TableRow};

/// Result type for tearsheetlib operations
pub type Result<T> = std::result::Result<T, TearsheetError>;
