//! Equal-weight portfolio backtests.
//!
//! The portfolio holds each requested ticker at weight 1/n. Closes are
//! forward-filled before weighting; dates before every constituent has at
//! least one observation are dropped, since the portfolio does not exist
//! yet on those days.

use chrono::NaiveDate;

use crate::error::TearsheetError;
use crate::input::PriceTable;
use crate::row::DataRow;
use crate::stats::{EquitySeries, MetricSet, DEFAULT_RISK_FREE_RATE};
use crate::Result;

/// Options for a backtest run.
#[derive(Debug, Clone)]
pub struct BacktestOptions {
    /// First date to include
    pub start: Option<NaiveDate>,
    /// Last date to include
    pub end: Option<NaiveDate>,
    /// Benchmark ticker; must exist in the price table
    pub benchmark: Option<String>,
    /// Annual risk-free rate
    pub risk_free_rate: f64,
    /// Portfolio label for the output column
    pub label: String,
}

impl Default for BacktestOptions {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            benchmark: None,
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            label: "Portfolio".to_string(),
        }
    }
}

impl BacktestOptions {
    /// Default options: full range, no benchmark, zero risk-free rate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the start date.
    pub fn start(mut self, date: NaiveDate) -> Self {
        self.start = Some(date);
        self
    }

    /// Builder: set the end date.
    pub fn end(mut self, date: NaiveDate) -> Self {
        self.end = Some(date);
        self
    }

    /// Builder: set the benchmark ticker.
    pub fn benchmark(mut self, ticker: impl Into<String>) -> Self {
        self.benchmark = Some(ticker.into());
        self
    }

    /// Builder: set the annual risk-free rate.
    pub fn risk_free_rate(mut self, rate: f64) -> Self {
        self.risk_free_rate = rate;
        self
    }

    /// Builder: set the portfolio label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

/// An evaluated series with its metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct Performance {
    /// The underlying equity curve
    pub series: EquitySeries,
    /// Metrics over that curve
    pub metrics: MetricSet,
}

impl Performance {
    /// Metric row labeled with the series label.
    pub fn to_row(&self) -> DataRow {
        self.metrics.to_row(self.series.label().to_string())
    }
}

/// Result of a backtest: the portfolio leg and, when requested, the
/// benchmark leg evaluated over the same range.
#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub portfolio: Performance,
    pub benchmark: Option<Performance>,
}

/// Backtest an equal-weight portfolio of the given tickers.
///
/// Unlike [`crate::scan::scan`], a bad ticker here is a hard error: the
/// portfolio cannot be constructed without every constituent.
pub fn run_backtest(
    prices: &PriceTable,
    tickers: &[String],
    options: &BacktestOptions,
) -> Result<BacktestResult> {
    if tickers.is_empty() {
        return Err(TearsheetError::NoTickers);
    }
    let clamped = prices.clamp(options.start, options.end);

    let equity = equity_curve(&clamped, tickers, &options.label)?;

    let benchmark = match options.benchmark.as_deref() {
        Some(ticker) => {
            let series = clamped.series(ticker)?;
            let metrics =
                MetricSet::compute(&series, Some(&series), options.risk_free_rate);
            Some(Performance { series, metrics })
        }
        None => None,
    };

    let metrics = MetricSet::compute(
        &equity,
        benchmark.as_ref().map(|leg| &leg.series),
        options.risk_free_rate,
    );

    Ok(BacktestResult {
        portfolio: Performance {
            series: equity,
            metrics,
        },
        benchmark,
    })
}

/// Build the equal-weight equity curve.
///
/// Forward-fills each constituent, then averages at weight 1/n. Dates where
/// some constituent has never traded are skipped.
fn equity_curve(prices: &PriceTable, tickers: &[String], label: &str) -> Result<EquitySeries> {
    let mut indices = Vec::with_capacity(tickers.len());
    for ticker in tickers {
        let idx = prices
            .tickers()
            .iter()
            .position(|t| t == ticker)
            .ok_or_else(|| TearsheetError::UnknownTicker(ticker.clone()))?;
        indices.push(idx);
    }

    let weight = 1.0 / tickers.len() as f64;
    let mut filled: Vec<Option<f64>> = vec![None; tickers.len()];
    let mut points = Vec::with_capacity(prices.len());
    for (date, values) in prices.rows() {
        for (slot, &idx) in filled.iter_mut().zip(&indices) {
            if let Some(value) = values[idx] {
                *slot = Some(value);
            }
        }
        if filled.iter().all(Option::is_some) {
            let equity: f64 = filled.iter().flatten().map(|v| v * weight).sum();
            points.push((*date, equity));
        }
    }

    Ok(EquitySeries::new(label, points))
}
