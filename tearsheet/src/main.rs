//! # tearsheet
//!
//! A CLI tool for rendering portfolio performance tear sheets from price
//! history.
//!
//! ## Overview
//!
//! tearsheet is built on top of tearsheetlib and provides a command-line
//! interface for scanning tickers, backtesting equal-weight portfolios, and
//! comparing them against a benchmark. Prices come from a wide CSV (a `Date`
//! column plus one column per ticker); precomputed scan results can also be
//! rendered directly from JSON.
//!
//! ## Usage
//!
//! ```bash
//! # Per-ticker tear sheet
//! tearsheet scan prices.csv -t AAPL -t MSFT
//!
//! # With a benchmark (adds beta/alpha and a benchmark row)
//! tearsheet scan prices.csv -t AAPL -t MSFT -b SPY
//!
//! # Equal-weight portfolio backtest, metrics as rows
//! tearsheet backtest prices.csv -t AAPL -t MSFT --start 2020-01-01
//!
//! # Portfolio vs benchmark, side by side
//! tearsheet compare prices.csv -t AAPL -t MSFT -b SPY
//!
//! # Render precomputed scan results
//! tearsheet render results.json --sort sharpe_ratio --desc
//!
//! # Output as JSON or CSV
//! tearsheet scan prices.csv -t AAPL --output json
//! ```

use std::process::ExitCode;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Arg, ArgAction, ArgMatches, Command};
use tearsheetlib::{
    load_price_csv, load_results_json, run_backtest, scan, standard_definitions,
    BacktestOptions, FormatRegistry, MetricTable, OrderBy, OrderDirection, Ordering,
    Orientation, RenderOptions, ScanOptions, TearsheetError, DATE_FORMAT,
    DEFAULT_RISK_FREE_RATE,
};

mod render;

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("tearsheet")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Portfolio performance tear sheets from price history")
        .arg(
            Arg::new("prices")
                .help("Wide price CSV (Date column plus one column per ticker)"),
        )
        .arg(
            Arg::new("ticker")
                .short('t')
                .long("ticker")
                .action(ArgAction::Append)
                .help("Ticker to scan (can be specified multiple times)"),
        )
        .arg(
            Arg::new("benchmark")
                .short('b')
                .long("benchmark")
                .help("Benchmark ticker for beta/alpha and a reference row"),
        )
        .arg(
            Arg::new("start")
                .long("start")
                .help("First date to include (YYYY-MM-DD)"),
        )
        .arg(
            Arg::new("end")
                .long("end")
                .help("Last date to include (YYYY-MM-DD)"),
        )
        .arg(
            Arg::new("risk-free-rate")
                .long("risk-free-rate")
                .value_parser(clap::value_parser!(f64))
                .help("Annual risk-free rate (default 0)"),
        )
        .arg(
            Arg::new("sort")
                .long("sort")
                .help("Order rows by 'label' or a metric key (e.g. sharpe_ratio)"),
        )
        .arg(
            Arg::new("desc")
                .long("desc")
                .action(ArgAction::SetTrue)
                .help("Sort descending"),
        )
        .arg(
            Arg::new("orientation")
                .long("orientation")
                .value_parser(["entities", "metrics"])
                .help("Table layout: tickers as rows (default) or metrics as rows"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_parser(["table", "json", "csv"])
                .help("Output format (default table)"),
        )
        .subcommand(
            Command::new("scan")
                .about("Per-ticker tear sheet (default command)")
                .arg(
                    Arg::new("prices")
                        .required(true)
                        .help("Wide price CSV (Date column plus one column per ticker)"),
                )
                .arg(
                    Arg::new("ticker")
                        .short('t')
                        .long("ticker")
                        .action(ArgAction::Append)
                        .help("Ticker to scan (can be specified multiple times)"),
                )
                .arg(
                    Arg::new("benchmark")
                        .short('b')
                        .long("benchmark")
                        .help("Benchmark ticker for beta/alpha and a reference row"),
                )
                .arg(
                    Arg::new("start")
                        .long("start")
                        .help("First date to include (YYYY-MM-DD)"),
                )
                .arg(
                    Arg::new("end")
                        .long("end")
                        .help("Last date to include (YYYY-MM-DD)"),
                )
                .arg(
                    Arg::new("risk-free-rate")
                        .long("risk-free-rate")
                        .value_parser(clap::value_parser!(f64))
                        .help("Annual risk-free rate (default 0)"),
                )
                .arg(
                    Arg::new("sort")
                        .long("sort")
                        .help("Order rows by 'label' or a metric key"),
                )
                .arg(
                    Arg::new("desc")
                        .long("desc")
                        .action(ArgAction::SetTrue)
                        .help("Sort descending"),
                )
                .arg(
                    Arg::new("orientation")
                        .long("orientation")
                        .value_parser(["entities", "metrics"])
                        .help("Table layout: tickers as rows (default) or metrics as rows"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_parser(["table", "json", "csv"])
                        .help("Output format (default table)"),
                ),
        )
        .subcommand(
            Command::new("backtest")
                .about("Equal-weight portfolio backtest, metrics as rows")
                .arg(
                    Arg::new("prices")
                        .required(true)
                        .help("Wide price CSV (Date column plus one column per ticker)"),
                )
                .arg(
                    Arg::new("ticker")
                        .short('t')
                        .long("ticker")
                        .action(ArgAction::Append)
                        .help("Portfolio constituent (can be specified multiple times)"),
                )
                .arg(
                    Arg::new("benchmark")
                        .short('b')
                        .long("benchmark")
                        .help("Benchmark ticker for beta/alpha"),
                )
                .arg(
                    Arg::new("label")
                        .long("label")
                        .help("Portfolio label (default 'Portfolio')"),
                )
                .arg(
                    Arg::new("start")
                        .long("start")
                        .help("First date to include (YYYY-MM-DD)"),
                )
                .arg(
                    Arg::new("end")
                        .long("end")
                        .help("Last date to include (YYYY-MM-DD)"),
                )
                .arg(
                    Arg::new("risk-free-rate")
                        .long("risk-free-rate")
                        .value_parser(clap::value_parser!(f64))
                        .help("Annual risk-free rate (default 0)"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_parser(["table", "json", "csv"])
                        .help("Output format (default table)"),
                ),
        )
        .subcommand(
            Command::new("compare")
                .about("Portfolio vs benchmark, metrics as rows")
                .arg(
                    Arg::new("prices")
                        .required(true)
                        .help("Wide price CSV (Date column plus one column per ticker)"),
                )
                .arg(
                    Arg::new("ticker")
                        .short('t')
                        .long("ticker")
                        .action(ArgAction::Append)
                        .help("Portfolio constituent (can be specified multiple times)"),
                )
                .arg(
                    Arg::new("benchmark")
                        .short('b')
                        .long("benchmark")
                        .required(true)
                        .help("Benchmark ticker (required)"),
                )
                .arg(
                    Arg::new("label")
                        .long("label")
                        .help("Portfolio label (default 'Portfolio')"),
                )
                .arg(
                    Arg::new("start")
                        .long("start")
                        .help("First date to include (YYYY-MM-DD)"),
                )
                .arg(
                    Arg::new("end")
                        .long("end")
                        .help("Last date to include (YYYY-MM-DD)"),
                )
                .arg(
                    Arg::new("risk-free-rate")
                        .long("risk-free-rate")
                        .value_parser(clap::value_parser!(f64))
                        .help("Annual risk-free rate (default 0)"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_parser(["table", "json", "csv"])
                        .help("Output format (default table)"),
                ),
        )
        .subcommand(
            Command::new("render")
                .about("Render precomputed scan results from JSON")
                .arg(
                    Arg::new("results")
                        .required(true)
                        .help("JSON array of scan result objects"),
                )
                .arg(
                    Arg::new("benchmark")
                        .short('b')
                        .long("benchmark")
                        .help("Label of the row to pin last as the benchmark"),
                )
                .arg(
                    Arg::new("sort")
                        .long("sort")
                        .help("Order rows by 'label' or a metric key"),
                )
                .arg(
                    Arg::new("desc")
                        .long("desc")
                        .action(ArgAction::SetTrue)
                        .help("Sort descending"),
                )
                .arg(
                    Arg::new("orientation")
                        .long("orientation")
                        .value_parser(["entities", "metrics"])
                        .help("Table layout: tickers as rows (default) or metrics as rows"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_parser(["table", "json", "csv"])
                        .help("Output format (default table)"),
                ),
        )
}

/// Extract the repeated ticker list from matches
fn extract_tickers(matches: &ArgMatches) -> Vec<String> {
    matches
        .get_many::<String>("ticker")
        .map(|v| v.cloned().collect())
        .unwrap_or_default()
}

/// Parse an optional date argument
fn extract_date(matches: &ArgMatches, name: &str) -> anyhow::Result<Option<NaiveDate>> {
    match matches.get_one::<String>(name) {
        Some(value) => {
            let date = NaiveDate::parse_from_str(value, DATE_FORMAT)
                .with_context(|| format!("invalid --{} date '{}'", name, value))?;
            Ok(Some(date))
        }
        None => Ok(None),
    }
}

fn extract_risk_free_rate(matches: &ArgMatches) -> f64 {
    matches
        .get_one::<f64>("risk-free-rate")
        .copied()
        .unwrap_or(DEFAULT_RISK_FREE_RATE)
}

/// Parse the optional --sort/--desc pair into an ordering
fn extract_ordering(matches: &ArgMatches) -> anyhow::Result<Option<Ordering>> {
    let Some(sort) = matches.get_one::<String>("sort") else {
        return Ok(None);
    };
    let by = sort.parse::<OrderBy>().map_err(anyhow::Error::msg)?;
    let direction = if matches.get_flag("desc") {
        OrderDirection::Descending
    } else {
        OrderDirection::Ascending
    };
    Ok(Some(Ordering { by, direction }))
}

fn extract_orientation(matches: &ArgMatches) -> anyhow::Result<Orientation> {
    match matches.get_one::<String>("orientation") {
        Some(value) => value.parse::<Orientation>().map_err(anyhow::Error::msg),
        None => Ok(Orientation::EntityRows),
    }
}

/// Serialize the grid in the requested output format
fn emit(matches: &ArgMatches, table: &MetricTable) -> anyhow::Result<String> {
    let mode = matches
        .get_one::<String>("output")
        .map(|s| s.as_str())
        .unwrap_or("table");
    match mode {
        "json" => {
            let mut json = serde_json::to_string_pretty(table)?;
            json.push('\n');
            Ok(json)
        }
        "csv" => Ok(render::render_csv(table)),
        _ => Ok(render::render_table(table)),
    }
}

/// Handler for the scan command (and the bare root invocation)
fn scan_handler(matches: &ArgMatches) -> anyhow::Result<String> {
    let path = matches
        .get_one::<String>("prices")
        .context("missing price CSV path")?;
    let prices = load_price_csv(path)?;

    let tickers = extract_tickers(matches);
    let mut options = ScanOptions::new().risk_free_rate(extract_risk_free_rate(matches));
    if let Some(date) = extract_date(matches, "start")? {
        options = options.start(date);
    }
    if let Some(date) = extract_date(matches, "end")? {
        options = options.end(date);
    }
    if let Some(benchmark) = matches.get_one::<String>("benchmark") {
        if !prices.has_ticker(benchmark) {
            return Err(TearsheetError::UnknownTicker(benchmark.clone()).into());
        }
        options = options.benchmark(benchmark.clone());
    }

    let result = scan(&prices, &tickers, &options)?;

    let mut rows = result.rows;
    if let Some(ordering) = extract_ordering(matches)? {
        ordering.apply(&mut rows);
    }

    let mut render_options =
        RenderOptions::new().orientation(extract_orientation(matches)?);
    if let Some(benchmark) = result.benchmark {
        render_options = render_options.reference(benchmark);
    }

    let table = MetricTable::render(
        &standard_definitions(),
        &FormatRegistry::standard(),
        &rows,
        &render_options,
    )?;
    emit(matches, &table)
}

/// Handler for the backtest command
fn backtest_handler(matches: &ArgMatches) -> anyhow::Result<String> {
    let path = matches
        .get_one::<String>("prices")
        .context("missing price CSV path")?;
    let prices = load_price_csv(path)?;

    let options = build_backtest_options(matches)?;
    let result = run_backtest(&prices, &extract_tickers(matches), &options)?;

    let table = MetricTable::from_backtest(
        &standard_definitions(),
        &FormatRegistry::standard(),
        &result.portfolio.to_row(),
    )?;
    emit(matches, &table)
}

/// Handler for the compare command
fn compare_handler(matches: &ArgMatches) -> anyhow::Result<String> {
    let path = matches
        .get_one::<String>("prices")
        .context("missing price CSV path")?;
    let prices = load_price_csv(path)?;

    let options = build_backtest_options(matches)?;
    let result = run_backtest(&prices, &extract_tickers(matches), &options)?;
    let benchmark = result
        .benchmark
        .context("compare requires a benchmark leg")?;

    let table = MetricTable::from_comparison(
        &standard_definitions(),
        &FormatRegistry::standard(),
        &result.portfolio.to_row(),
        benchmark.to_row(),
    )?;
    emit(matches, &table)
}

fn build_backtest_options(matches: &ArgMatches) -> anyhow::Result<BacktestOptions> {
    let mut options =
        BacktestOptions::new().risk_free_rate(extract_risk_free_rate(matches));
    if let Some(date) = extract_date(matches, "start")? {
        options = options.start(date);
    }
    if let Some(date) = extract_date(matches, "end")? {
        options = options.end(date);
    }
    if let Some(benchmark) = matches.get_one::<String>("benchmark") {
        options = options.benchmark(benchmark.clone());
    }
    if let Some(label) = matches.get_one::<String>("label") {
        options = options.label(label.clone());
    }
    Ok(options)
}

/// Handler for the render command
fn render_handler(matches: &ArgMatches) -> anyhow::Result<String> {
    let path = matches
        .get_one::<String>("results")
        .context("missing results JSON path")?;
    let mut rows = load_results_json(path)?;

    let reference = match matches.get_one::<String>("benchmark") {
        Some(label) => {
            let position = rows
                .iter()
                .position(|row| row.label() == label)
                .with_context(|| format!("no result row labeled '{}'", label))?;
            Some(rows.remove(position))
        }
        None => None,
    };

    if let Some(ordering) = extract_ordering(matches)? {
        ordering.apply(&mut rows);
    }

    let mut render_options =
        RenderOptions::new().orientation(extract_orientation(matches)?);
    if let Some(reference) = reference {
        render_options = render_options.reference(reference);
    }

    let table = MetricTable::render(
        &standard_definitions(),
        &FormatRegistry::standard(),
        &rows,
        &render_options,
    )?;
    emit(matches, &table)
}

fn main() -> ExitCode {
    let matches = build_command().get_matches();

    let result = match matches.subcommand() {
        Some(("scan", sub)) => scan_handler(sub),
        Some(("backtest", sub)) => backtest_handler(sub),
        Some(("compare", sub)) => compare_handler(sub),
        Some(("render", sub)) => render_handler(sub),
        _ => scan_handler(&matches),
    };

    match result {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parses_scan() {
        let matches = build_command().get_matches_from([
            "tearsheet", "scan", "prices.csv", "-t", "AAPL", "-t", "MSFT", "-b", "SPY",
            "--sort", "sharpe_ratio", "--desc", "--output", "json",
        ]);
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "scan");
        assert_eq!(extract_tickers(sub), vec!["AAPL", "MSFT"]);
        assert_eq!(sub.get_one::<String>("benchmark").unwrap(), "SPY");
        assert!(sub.get_flag("desc"));
    }

    #[test]
    fn test_root_invocation_is_scan_shaped() {
        let matches =
            build_command().get_matches_from(["tearsheet", "prices.csv", "-t", "AAPL"]);
        assert!(matches.subcommand().is_none());
        assert_eq!(
            matches.get_one::<String>("prices").map(String::as_str),
            Some("prices.csv")
        );
    }

    #[test]
    fn test_extract_ordering() {
        let matches = build_command().get_matches_from([
            "tearsheet", "scan", "p.csv", "--sort", "cagr", "--desc",
        ]);
        let (_, sub) = matches.subcommand().unwrap();
        let ordering = extract_ordering(sub).unwrap().unwrap();
        assert_eq!(ordering.by, OrderBy::Metric("cagr".to_string()));
        assert_eq!(ordering.direction, OrderDirection::Descending);
    }

    #[test]
    fn test_extract_date_rejects_bad_format() {
        let matches = build_command().get_matches_from([
            "tearsheet", "scan", "p.csv", "--start", "01/03/2022",
        ]);
        let (_, sub) = matches.subcommand().unwrap();
        assert!(extract_date(sub, "start").is_err());
    }
}
