//! Per-ticker scans: the full metric set for each requested ticker over a
//! date range, optionally against a benchmark.
//!
//! A scan never aborts on a bad ticker: tickers with no usable data degrade
//! to an annotated empty row and the rest of the scan proceeds.

use chrono::NaiveDate;

use crate::error::TearsheetError;
use crate::input::PriceTable;
use crate::row::DataRow;
use crate::stats::{EquitySeries, MetricSet, DEFAULT_RISK_FREE_RATE};
use crate::Result;

/// Options for a scan run.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// First date to include
    pub start: Option<NaiveDate>,
    /// Last date to include
    pub end: Option<NaiveDate>,
    /// Benchmark ticker for beta/alpha; silently skipped when it has no
    /// data in range (the upstream behavior)
    pub benchmark: Option<String>,
    /// Annual risk-free rate
    pub risk_free_rate: f64,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            benchmark: None,
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
        }
    }
}

impl ScanOptions {
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
}

/// Result of a scan: one row per requested ticker, in request order, plus
/// the benchmark's own row when a benchmark was usable.
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// Metric rows in request order
    pub rows: Vec<DataRow>,
    /// Benchmark row (beta 1, alpha 0 against itself)
    pub benchmark: Option<DataRow>,
}

/// Scan each requested ticker.
///
/// Fails only on an empty ticker list; per-ticker problems degrade to an
/// annotated row with no metric values. Tickers whose history starts after
/// the requested start date get a `(from YYYY-MM-DD)` annotation.
pub fn scan(
    prices: &PriceTable,
    tickers: &[String],
    options: &ScanOptions,
) -> Result<ScanResult> {
    if tickers.is_empty() {
        return Err(TearsheetError::NoTickers);
    }
    let clamped = prices.clamp(options.start, options.end);

    let benchmark_series: Option<EquitySeries> = options
        .benchmark
        .as_deref()
        .filter(|b| clamped.has_ticker(b))
        .and_then(|b| clamped.series(b).ok())
        .filter(|series| !series.is_empty());

    let mut rows = Vec::with_capacity(tickers.len());
    for ticker in tickers {
        if !clamped.has_ticker(ticker) {
            rows.push(DataRow::new(ticker.clone()).with_note("(no data found)"));
            continue;
        }
        let series = clamped.series(ticker)?;
        if series.is_empty() {
            rows.push(DataRow::new(ticker.clone()).with_note("(no data in range)"));
            continue;
        }

        let metrics = MetricSet::compute(
            &series,
            benchmark_series.as_ref(),
            options.risk_free_rate,
        );
        let mut row = metrics.to_row(ticker.clone());
        if let Some(start) = options.start {
            if let Some(note) = clamped.completeness_note(ticker, start) {
                row = row.with_note(note);
            }
        }
        rows.push(row);
    }

    let benchmark = benchmark_series.as_ref().map(|series| {
        MetricSet::compute(series, Some(series), options.risk_free_rate)
            .to_row(series.label().to_string())
    });

    Ok(ScanResult { rows, benchmark })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::load_price_csv;
    use crate::row::MetricValue;
    use std::io::Write;

    fn fixture() -> (tempfile::TempDir, PriceTable) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(
            b"Date,AAA,BBB,SPY,LATE\n\
              2022-01-03,100.0,50.0,400.0,\n\
              2022-01-04,104.0,50.5,402.0,\n\
              2022-01-05,99.0,49.0,398.0,10.0\n\
              2022-01-06,108.0,51.0,405.0,10.5\n\
              2022-01-07,103.0,50.2,401.0,10.2\n",
        )
        .unwrap();
        let table = load_price_csv(&path).unwrap();
        (dir, table)
    }

    fn tickers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_scan_produces_rows_in_request_order() {
        let (_dir, table) = fixture();
        let result = scan(&table, &tickers(&["BBB", "AAA"]), &ScanOptions::new()).unwrap();

        let labels: Vec<&str> = result.rows.iter().map(|r| r.label()).collect();
        assert_eq!(labels, vec!["BBB", "AAA"]);
        assert!(result.benchmark.is_none());
        assert!(result.rows[0].number("cagr").is_some());
    }

    #[test]
    fn test_scan_empty_ticker_list_fails() {
        let (_dir, table) = fixture();
        let err = scan(&table, &[], &ScanOptions::new()).unwrap_err();
        assert!(matches!(err, TearsheetError::NoTickers));
    }

    #[test]
    fn test_unknown_ticker_degrades_to_error_row() {
        let (_dir, table) = fixture();
        let result = scan(&table, &tickers(&["AAA", "ZZZ"]), &ScanOptions::new()).unwrap();

        assert_eq!(result.rows[1].display_label(), "ZZZ(no data found)");
        assert!(result.rows[1].value("cagr").is_missing());
    }

    #[test]
    fn test_benchmark_gives_beta_and_own_row() {
        let (_dir, table) = fixture();
        let options = ScanOptions::new().benchmark("SPY");
        let result = scan(&table, &tickers(&["AAA"]), &options).unwrap();

        assert!(result.rows[0].number("beta").is_some());
        let benchmark = result.benchmark.unwrap();
        assert_eq!(benchmark.label(), "SPY");
        // benchmark against itself
        let beta = benchmark.number("beta").unwrap();
        assert!((beta - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_benchmark_is_skipped() {
        let (_dir, table) = fixture();
        let options = ScanOptions::new().benchmark("NOPE");
        let result = scan(&table, &tickers(&["AAA"]), &options).unwrap();

        assert!(result.benchmark.is_none());
        assert_eq!(result.rows[0].value("beta"), MetricValue::Null);
    }

    #[test]
    fn test_late_starter_gets_completeness_note() {
        let (_dir, table) = fixture();
        let options = ScanOptions::new().start(
            NaiveDate::from_ymd_opt(2022, 1, 3).unwrap(),
        );
        let result = scan(&table, &tickers(&["LATE"]), &options).unwrap();

        assert_eq!(result.rows[0].display_label(), "LATE(from 2022-01-05)");
        assert!(result.rows[0].number("cagr").is_some());
    }

    #[test]
    fn test_date_clamp_limits_series() {
        let (_dir, table) = fixture();
        let options = ScanOptions::new()
            .start(NaiveDate::from_ymd_opt(2022, 1, 6).unwrap())
            .end(NaiveDate::from_ymd_opt(2022, 1, 6).unwrap());
        let result = scan(&table, &tickers(&["AAA"]), &options).unwrap();

        // single observation in range: degenerate, all-zero metrics
        assert_eq!(result.rows[0].number("cagr"), Some(0.0));
        assert_eq!(result.rows[0].value("beta"), MetricValue::Null);
    }
}
