//! Input loading: wide price CSVs and precomputed results JSON.
//!
//! The price CSV mirrors the upstream price store: a `Date` column followed
//! by one column per ticker, blank cells where a ticker has no observation
//! that day. The results JSON is the upstream scan-response shape: an array
//! of objects with a `ticker` field and metric fields, where an absent key
//! means "not computed" and an explicit `null` means "computed but
//! undefined". The two must survive loading as distinct states.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::TearsheetError;
use crate::row::{DataRow, MetricValue};
use crate::stats::EquitySeries;
use crate::Result;

/// Date format used throughout the price store.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A wide table of daily prices: dates down, tickers across.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    tickers: Vec<String>,
    rows: Vec<(NaiveDate, Vec<Option<f64>>)>,
}

impl PriceTable {
    /// Ticker column names in file order.
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    /// Number of date rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no date rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether a ticker column exists.
    pub fn has_ticker(&self, ticker: &str) -> bool {
        self.tickers.iter().any(|t| t == ticker)
    }

    /// New table restricted to dates within `[start, end]` (inclusive).
    pub fn clamp(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        let rows = self
            .rows
            .iter()
            .filter(|(date, _)| {
                start.map_or(true, |s| *date >= s) && end.map_or(true, |e| *date <= e)
            })
            .cloned()
            .collect();
        Self {
            tickers: self.tickers.clone(),
            rows,
        }
    }

    /// One ticker's observed values as a series (unobserved days dropped).
    pub fn series(&self, ticker: &str) -> Result<EquitySeries> {
        let idx = self
            .tickers
            .iter()
            .position(|t| t == ticker)
            .ok_or_else(|| TearsheetError::UnknownTicker(ticker.to_string()))?;
        let points = self
            .rows
            .iter()
            .filter_map(|(date, values)| values[idx].map(|v| (*date, v)))
            .collect();
        Ok(EquitySeries::new(ticker, points))
    }

    /// Date of a ticker's first observation, if it has any.
    pub fn first_observation(&self, ticker: &str) -> Option<NaiveDate> {
        let idx = self.tickers.iter().position(|t| t == ticker)?;
        self.rows
            .iter()
            .find(|(_, values)| values[idx].is_some())
            .map(|(date, _)| *date)
    }

    /// Data-completeness annotation for a ticker.
    ///
    /// When the ticker's history starts after the requested start date, the
    /// caller gets a footnote to append to the label; otherwise nothing.
    pub fn completeness_note(
        &self,
        ticker: &str,
        requested_start: NaiveDate,
    ) -> Option<String> {
        let first = self.first_observation(ticker)?;
        if first > requested_start {
            Some(format!("(from {})", first.format(DATE_FORMAT)))
        } else {
            None
        }
    }

    /// Raw date rows, ascending.
    pub(crate) fn rows(&self) -> &[(NaiveDate, Vec<Option<f64>>)] {
        &self.rows
    }
}

/// Load a wide price CSV (`Date` column plus one column per ticker).
///
/// Rows are sorted by date after loading; blank cells become unobserved
/// days. Duplicate ticker columns are rejected.
pub fn load_price_csv(path: impl AsRef<Path>) -> Result<PriceTable> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| TearsheetError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);

    let headers = reader.headers()?.clone();
    let mut columns = headers.iter();
    match columns.next() {
        Some(first) if first.eq_ignore_ascii_case("date") => {}
        _ => {
            return Err(malformed(path, "first column must be 'Date'"));
        }
    }
    let tickers: Vec<String> = columns.map(str::to_string).collect();
    if tickers.is_empty() {
        return Err(malformed(path, "no ticker columns"));
    }
    let mut seen = std::collections::HashSet::new();
    for ticker in &tickers {
        if !seen.insert(ticker.as_str()) {
            return Err(malformed(path, &format!("duplicate ticker column '{}'", ticker)));
        }
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let date_field = record.get(0).unwrap_or_default();
        let date = NaiveDate::parse_from_str(date_field, DATE_FORMAT).map_err(|e| {
            TearsheetError::InvalidDate {
                value: date_field.to_string(),
                message: e.to_string(),
            }
        })?;
        let mut values = Vec::with_capacity(tickers.len());
        for (i, ticker) in tickers.iter().enumerate() {
            let field = record.get(i + 1).unwrap_or_default().trim();
            if field.is_empty() {
                values.push(None);
            } else {
                let value = field.parse::<f64>().map_err(|_| {
                    malformed(
                        path,
                        &format!("bad value '{}' for {} on {}", field, ticker, date),
                    )
                })?;
                values.push(Some(value));
            }
        }
        rows.push((date, values));
    }
    rows.sort_by_key(|(date, _)| *date);

    Ok(PriceTable { tickers, rows })
}

/// Load precomputed scan results from a JSON array.
///
/// Each object becomes a [`DataRow`]: `ticker` is the label, `note` is kept
/// as the label annotation, an `error` string becomes a parenthesized
/// annotation on an otherwise empty row, numeric fields become values, and
/// JSON `null` fields become the null state (never missing).
pub fn load_results_json(path: impl AsRef<Path>) -> Result<Vec<DataRow>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| TearsheetError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let value: serde_json::Value = serde_json::from_reader(file)?;

    let entries = value
        .as_array()
        .ok_or_else(|| TearsheetError::MalformedResults("top level must be an array".into()))?;

    let mut rows = Vec::with_capacity(entries.len());
    for entry in entries {
        let object = entry
            .as_object()
            .ok_or_else(|| TearsheetError::MalformedResults("entry must be an object".into()))?;
        let ticker = object
            .get("ticker")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| {
                TearsheetError::MalformedResults("entry missing 'ticker' field".into())
            })?;

        let mut row = DataRow::new(ticker);
        if let Some(error) = object.get("error").and_then(serde_json::Value::as_str) {
            row = row.with_note(format!("({})", error));
        } else if let Some(note) = object.get("note").and_then(serde_json::Value::as_str) {
            row = row.with_note(note);
        }

        for (key, field) in object {
            if key == "ticker" || key == "note" || key == "error" {
                continue;
            }
            match field {
                serde_json::Value::Null => {
                    row = row.with_value(key.clone(), MetricValue::Null);
                }
                serde_json::Value::Number(n) => {
                    if let Some(v) = n.as_f64() {
                        row = row.with_value(key.clone(), MetricValue::Num(v));
                    }
                }
                // non-metric payloads (dates, nested series) are not cells
                _ => {}
            }
        }
        rows.push(row);
    }
    Ok(rows)
}

fn malformed(path: &Path, message: &str) -> TearsheetError {
    TearsheetError::MalformedCsv {
        path: PathBuf::from(path),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const PRICES: &str = "\
Date,AAA,BBB
2022-01-03,100.0,50.0
2022-01-04,102.0,
2022-01-05,101.0,51.0
";

    #[test]
    fn test_load_price_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "prices.csv", PRICES);

        let table = load_price_csv(&path).unwrap();
        assert_eq!(table.tickers(), &["AAA", "BBB"]);
        assert_eq!(table.len(), 3);

        let aaa = table.series("AAA").unwrap();
        assert_eq!(aaa.len(), 3);
        // blank cell dropped
        let bbb = table.series("BBB").unwrap();
        assert_eq!(bbb.len(), 2);
    }

    #[test]
    fn test_rows_sorted_by_date() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "prices.csv",
            "Date,AAA\n2022-01-05,3.0\n2022-01-03,1.0\n2022-01-04,2.0\n",
        );

        let table = load_price_csv(&path).unwrap();
        let series = table.series("AAA").unwrap();
        let values: Vec<f64> = series.points().iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_clamp_is_inclusive() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "prices.csv", PRICES);
        let table = load_price_csv(&path).unwrap();

        let clamped = table.clamp(Some(date(2022, 1, 4)), Some(date(2022, 1, 5)));
        assert_eq!(clamped.len(), 2);
        let open_ended = table.clamp(None, None);
        assert_eq!(open_ended.len(), 3);
    }

    #[test]
    fn test_completeness_note() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "prices.csv",
            "Date,AAA,LATE\n2022-01-03,1.0,\n2022-01-04,2.0,\n2022-01-05,3.0,10.0\n",
        );
        let table = load_price_csv(&path).unwrap();

        assert_eq!(
            table.completeness_note("LATE", date(2022, 1, 3)),
            Some("(from 2022-01-05)".to_string())
        );
        assert_eq!(table.completeness_note("AAA", date(2022, 1, 3)), None);
        assert_eq!(table.completeness_note("LATE", date(2022, 1, 5)), None);
    }

    #[test]
    fn test_missing_date_header_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "prices.csv", "Ticker,AAA\n2022-01-03,1.0\n");
        let err = load_price_csv(&path).unwrap_err();
        assert!(matches!(err, TearsheetError::MalformedCsv { .. }));
    }

    #[test]
    fn test_duplicate_ticker_column_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "prices.csv", "Date,AAA,AAA\n2022-01-03,1.0,2.0\n");
        let err = load_price_csv(&path).unwrap_err();
        assert!(matches!(err, TearsheetError::MalformedCsv { .. }));
    }

    #[test]
    fn test_bad_date_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "prices.csv", "Date,AAA\n03/01/2022,1.0\n");
        let err = load_price_csv(&path).unwrap_err();
        assert!(matches!(err, TearsheetError::InvalidDate { .. }));
    }

    #[test]
    fn test_bad_value_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "prices.csv", "Date,AAA\n2022-01-03,abc\n");
        let err = load_price_csv(&path).unwrap_err();
        assert!(matches!(err, TearsheetError::MalformedCsv { .. }));
    }

    #[test]
    fn test_missing_file_is_file_read_error() {
        let err = load_price_csv("/no/such/file.csv").unwrap_err();
        assert!(matches!(err, TearsheetError::FileRead { .. }));
    }

    #[test]
    fn test_load_results_json_preserves_null_vs_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "results.json",
            r#"[
                {"ticker": "AAPL", "cagr": 0.1534, "beta": null},
                {"ticker": "TSM", "note": "(from 2021-03-04)", "cagr": 0.2},
                {"ticker": "BAD", "error": "no data found"}
            ]"#,
        );

        let rows = load_results_json(&path).unwrap();
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].label(), "AAPL");
        assert_eq!(rows[0].value("cagr"), MetricValue::Num(0.1534));
        assert_eq!(rows[0].value("beta"), MetricValue::Null);
        assert_eq!(rows[0].value("alpha"), MetricValue::Missing);

        assert_eq!(rows[1].display_label(), "TSM(from 2021-03-04)");

        assert_eq!(rows[2].display_label(), "BAD(no data found)");
        assert!(rows[2].value("cagr").is_missing());
    }

    #[test]
    fn test_load_results_json_rejects_non_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "results.json", r#"{"ticker": "AAPL"}"#);
        let err = load_results_json(&path).unwrap_err();
        assert!(matches!(err, TearsheetError::MalformedResults(_)));
    }

    #[test]
    fn test_load_results_json_requires_ticker() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "results.json", r#"[{"cagr": 0.1}]"#);
        let err = load_results_json(&path).unwrap_err();
        assert!(matches!(err, TearsheetError::MalformedResults(_)));
    }
}
