//! Performance metrics over dated equity series.
//!
//! CAGR, max drawdown, volatility, Sharpe/Sortino, benchmark-relative
//! beta/alpha, and the combined score. All metrics degrade to zeros (with
//! null beta/alpha) on degenerate input rather than failing: a series that
//! is too short to measure is an everyday occurrence upstream, not an error.

use chrono::NaiveDate;

use crate::row::{DataRow, MetricValue};

/// Annualization base for daily return statistics.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Calendar-year length used for CAGR exponents.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Guard against division by zero in ratio denominators.
pub const EPSILON: f64 = 1e-9;

/// Default annual risk-free rate.
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.0;

/// A labeled, date-ascending value series (equity curve or price history).
#[derive(Debug, Clone, PartialEq)]
pub struct EquitySeries {
    label: String,
    points: Vec<(NaiveDate, f64)>,
}

impl EquitySeries {
    /// Create a series; points are sorted by date on construction.
    pub fn new(label: impl Into<String>, mut points: Vec<(NaiveDate, f64)>) -> Self {
        points.sort_by_key(|(date, _)| *date);
        Self {
            label: label.into(),
            points,
        }
    }

    /// Series label (ticker or portfolio name).
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the series has no observations.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Observations in date order.
    pub fn points(&self) -> &[(NaiveDate, f64)] {
        &self.points
    }

    /// Date of the first observation.
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|(date, _)| *date)
    }

    /// Value of the first observation.
    fn start_value(&self) -> f64 {
        self.points.first().map(|(_, v)| *v).unwrap_or(0.0)
    }

    /// Value of the last observation.
    fn end_value(&self) -> f64 {
        self.points.last().map(|(_, v)| *v).unwrap_or(0.0)
    }

    /// Span of the series in calendar years.
    fn years(&self) -> f64 {
        match (self.points.first(), self.points.last()) {
            (Some((start, _)), Some((end, _))) => {
                (*end - *start).num_days() as f64 / DAYS_PER_YEAR
            }
            _ => 0.0,
        }
    }

    /// Day-over-day fractional returns, dated at the later observation.
    pub fn daily_returns(&self) -> Vec<(NaiveDate, f64)> {
        self.points
            .windows(2)
            .map(|w| {
                let (_, prev) = w[0];
                let (date, curr) = w[1];
                (date, (curr - prev) / prev)
            })
            .collect()
    }
}

/// The full metric set for one entity.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct MetricSet {
    pub cagr: f64,
    pub mdd: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    /// None when the regression is undefined (no benchmark, too little
    /// overlap, or zero benchmark variance)
    pub beta: Option<f64>,
    pub alpha: Option<f64>,
    pub custom_score: f64,
}

impl MetricSet {
    /// All-zero metrics with null beta/alpha.
    pub fn zero() -> Self {
        Self {
            cagr: 0.0,
            mdd: 0.0,
            volatility: 0.0,
            sharpe_ratio: 0.0,
            sortino_ratio: 0.0,
            beta: None,
            alpha: None,
            custom_score: 0.0,
        }
    }

    /// Compute metrics for a series, optionally against a benchmark.
    ///
    /// Degenerate inputs do not fail:
    /// - fewer than 2 observations: all zeros
    /// - start value below epsilon: `mdd = -1`, everything else zero
    /// - fewer than 2 daily returns: CAGR and MDD only
    pub fn compute(
        series: &EquitySeries,
        benchmark: Option<&EquitySeries>,
        risk_free_rate: f64,
    ) -> Self {
        if series.len() < 2 {
            return Self::zero();
        }

        let start_value = series.start_value();
        let end_value = series.end_value();
        if start_value < EPSILON {
            return Self {
                mdd: -1.0,
                ..Self::zero()
            };
        }

        let years = series.years();
        let cagr = if years > 0.0 {
            (end_value / start_value).powf(1.0 / years) - 1.0
        } else {
            0.0
        };

        let mdd = max_drawdown(series);

        let returns = series.daily_returns();
        if returns.len() < 2 {
            return Self {
                cagr,
                mdd,
                ..Self::zero()
            };
        }

        let values: Vec<f64> = returns.iter().map(|(_, r)| *r).collect();
        let annual_std = sample_std(&values) * TRADING_DAYS_PER_YEAR.sqrt();
        let excess_return = cagr - risk_free_rate;
        let sharpe_ratio = excess_return / (annual_std + EPSILON);

        let daily_rf = (1.0 + risk_free_rate).powf(1.0 / TRADING_DAYS_PER_YEAR) - 1.0;
        let downside: Vec<f64> = values.iter().map(|r| (r - daily_rf).min(0.0)).collect();
        let downside_std =
            mean(&downside.iter().map(|d| d * d).collect::<Vec<_>>()).sqrt()
                * TRADING_DAYS_PER_YEAR.sqrt();
        let sortino_ratio = if downside_std > EPSILON {
            excess_return / downside_std
        } else {
            0.0
        };

        let mut beta = None;
        let mut alpha = None;
        if let Some(bench) = benchmark {
            if let Some((b, a)) = regression(bench, &returns, cagr, years, risk_free_rate) {
                beta = Some(b);
                alpha = Some(a);
            }
        }

        // upstream serializes plain numbers; scrub non-finite results the
        // same way it does
        let sharpe_ratio = if sharpe_ratio.is_finite() {
            sharpe_ratio
        } else {
            0.0
        };
        let sortino_ratio = if sortino_ratio.is_finite() {
            sortino_ratio
        } else {
            0.0
        };
        let beta = beta.filter(|b| b.is_finite());
        let alpha = alpha.filter(|a| a.is_finite());

        let custom_score = sortino_ratio * alpha.unwrap_or(0.0) * (1.0 + mdd);

        Self {
            cagr,
            mdd,
            volatility: annual_std,
            sharpe_ratio,
            sortino_ratio,
            beta,
            alpha,
            custom_score,
        }
    }

    /// Convert to a data row under the standard metric keys.
    ///
    /// Beta and alpha map to null (not missing) when undefined, matching
    /// the upstream result shape.
    pub fn to_row(&self, label: impl Into<String>) -> DataRow {
        DataRow::new(label)
            .with_value("cagr", MetricValue::Num(self.cagr))
            .with_value("volatility", MetricValue::Num(self.volatility))
            .with_value("mdd", MetricValue::Num(self.mdd))
            .with_value("sharpe_ratio", MetricValue::Num(self.sharpe_ratio))
            .with_value("sortino_ratio", MetricValue::Num(self.sortino_ratio))
            .with_value("beta", MetricValue::from_option(self.beta))
            .with_value("alpha", MetricValue::from_option(self.alpha))
            .with_value("custom_score", MetricValue::Num(self.custom_score))
    }
}

/// Largest peak-to-trough decline against the running peak (non-positive).
fn max_drawdown(series: &EquitySeries) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut mdd = 0.0_f64;
    for (_, value) in series.points() {
        peak = peak.max(*value);
        let drawdown = (value - peak) / (peak + EPSILON);
        mdd = mdd.min(drawdown);
    }
    mdd
}

/// Beta and alpha over date-aligned daily returns.
///
/// Inner-join alignment: only dates where both series have a return
/// participate. Returns None when fewer than 2 dates align or the
/// benchmark variance vanishes.
fn regression(
    bench: &EquitySeries,
    returns: &[(NaiveDate, f64)],
    cagr: f64,
    years: f64,
    risk_free_rate: f64,
) -> Option<(f64, f64)> {
    if bench.is_empty() {
        return None;
    }
    let bench_returns = bench.daily_returns();

    let mut aligned_series = Vec::new();
    let mut aligned_bench = Vec::new();
    let mut bench_iter = bench_returns.iter().peekable();
    for (date, r) in returns {
        while let Some((bench_date, _)) = bench_iter.peek() {
            if bench_date < date {
                bench_iter.next();
            } else {
                break;
            }
        }
        if let Some((bench_date, bench_r)) = bench_iter.peek() {
            if bench_date == date {
                aligned_series.push(*r);
                aligned_bench.push(*bench_r);
            }
        }
    }
    if aligned_series.len() < 2 {
        return None;
    }

    let covariance = sample_cov(&aligned_series, &aligned_bench);
    let bench_variance = sample_cov(&aligned_bench, &aligned_bench);
    if bench_variance <= EPSILON {
        return None;
    }

    let beta = covariance / bench_variance;
    let bench_start = bench.start_value();
    let bench_end = bench.end_value();
    let bench_cagr = if years > 0.0 && bench_start > 0.0 {
        (bench_end / bench_start).powf(1.0 / years) - 1.0
    } else {
        0.0
    };
    let expected_return = risk_free_rate + beta * (bench_cagr - risk_free_rate);
    let alpha = cagr - expected_return;

    Some((beta, alpha))
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n − 1 denominator).
fn sample_std(values: &[f64]) -> f64 {
    sample_cov(values, values).sqrt()
}

/// Sample covariance (n − 1 denominator). Requires equal lengths ≥ 2.
fn sample_cov(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len();
    if n < 2 {
        return 0.0;
    }
    let mean_x = mean(xs);
    let mean_y = mean(ys);
    xs.iter()
        .zip(ys)
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum::<f64>()
        / (n - 1) as f64
}
