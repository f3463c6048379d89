//! Trend lines over the daily median price series.
//!
//! Linear and polynomial trends are least-squares fits against the day offset
//! from the first observed date, projected a number of days past the last one.
//! Rolling trends only smooth the observed range.

use crate::error::AnalyticsError;
use crate::notice::Notice;
use crate::stats::{self, DateSeries};
use chrono::{Duration, NaiveDate};
use core_types::TrendKind;
use rust_decimal::prelude::*;
use serde::Serialize;

/// Highest polynomial degree a trend may request.
pub const MAX_DEGREE: usize = 20;

/// Longest projection past the last observed date, in days.
pub const MAX_PROJECTION_DAYS: u32 = 3650;

/// A validated trend request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendSpec {
    Linear { projection_days: u32 },
    Polynomial { degree: usize, projection_days: u32 },
    Rolling { window: usize },
}

impl TrendSpec {
    /// Interprets the raw `param` list of the trend settings for the given kind.
    pub fn from_params(kind: TrendKind, param: &[f64]) -> Result<Self, AnalyticsError> {
        match kind {
            TrendKind::Linear => Ok(TrendSpec::Linear {
                projection_days: whole(param, 0, "projection days", 0, MAX_PROJECTION_DAYS.into())? as u32,
            }),
            TrendKind::Polynomial => Ok(TrendSpec::Polynomial {
                degree: whole(param, 0, "polynomial degree", 1, MAX_DEGREE as u64)? as usize,
                projection_days: whole(param, 1, "projection days", 0, MAX_PROJECTION_DAYS.into())? as u32,
            }),
            TrendKind::Rolling => Ok(TrendSpec::Rolling {
                window: whole(param, 0, "rolling window", 1, u32::MAX.into())? as usize,
            }),
        }
    }
}

fn whole(param: &[f64], index: usize, name: &str, min: u64, max: u64) -> Result<u64, AnalyticsError> {
    let value = param.get(index).copied().ok_or_else(|| {
        AnalyticsError::InvalidTrendParameters(format!("missing {name} at position {index}"))
    })?;
    if !value.is_finite() || value.fract() != 0.0 || value < min as f64 || value > max as f64 {
        return Err(AnalyticsError::InvalidTrendParameters(format!(
            "{name} must be a whole number in {min}..={max}, got {value}"
        )));
    }
    Ok(value as u64)
}

/// A least-squares polynomial through the daily medians.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendFit {
    /// The requested degree (1 for linear).
    pub degree: usize,
    /// Coefficients in ascending powers of the day offset.
    pub coefficients: Vec<f64>,
    /// The fit evaluated at each observed date.
    pub fitted_series: Vec<(NaiveDate, f64)>,
    /// The fit evaluated at every day from the first observed date through the projection horizon.
    pub projected_series: Vec<(NaiveDate, f64)>,
    /// Goodness of fit against the observed medians.
    pub r_squared: f64,
    pub overfit: Option<Notice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingTrend {
    pub window: usize,
    pub series: DateSeries,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trend {
    Fit(TrendFit),
    Rolling(RollingTrend),
}

impl Trend {
    pub fn notices(&self) -> Vec<Notice> {
        match self {
            Trend::Fit(fit) => fit.overfit.iter().cloned().collect(),
            Trend::Rolling(_) => Vec::new(),
        }
    }
}

/// Applies a `TrendSpec` to a date-ordered series. `None` for an empty series.
pub fn fit_trend(
    series: &[(NaiveDate, Decimal)],
    spec: TrendSpec,
) -> Result<Option<Trend>, AnalyticsError> {
    match spec {
        TrendSpec::Linear { projection_days } => {
            Ok(fit_polynomial(series, 1, projection_days)?.map(Trend::Fit))
        }
        TrendSpec::Polynomial {
            degree,
            projection_days,
        } => Ok(fit_polynomial(series, degree, projection_days)?.map(Trend::Fit)),
        TrendSpec::Rolling { window } => {
            if series.is_empty() {
                return Ok(None);
            }
            Ok(Some(Trend::Rolling(RollingTrend {
                window,
                series: stats::rolling_mean(series, window),
            })))
        }
    }
}

/// Fits a polynomial of `degree` to the series and projects it `projection_days` ahead.
///
/// Fails when the degree or projection exceeds [`MAX_DEGREE`] or
/// [`MAX_PROJECTION_DAYS`], or when the projection runs past the last
/// representable date.
pub fn fit_polynomial(
    series: &[(NaiveDate, Decimal)],
    degree: usize,
    projection_days: u32,
) -> Result<Option<TrendFit>, AnalyticsError> {
    if degree > MAX_DEGREE {
        return Err(AnalyticsError::InvalidTrendParameters(format!(
            "polynomial degree must be at most {MAX_DEGREE}, got {degree}"
        )));
    }
    if projection_days > MAX_PROJECTION_DAYS {
        return Err(AnalyticsError::InvalidTrendParameters(format!(
            "projection days must be at most {MAX_PROJECTION_DAYS}, got {projection_days}"
        )));
    }
    let Some(&(first, _)) = series.first() else {
        return Ok(None);
    };
    let xs: Vec<f64> = series
        .iter()
        .map(|(date, _)| (*date - first).num_days() as f64)
        .collect();
    let ys: Vec<f64> = series
        .iter()
        .map(|(_, value)| value.to_f64().unwrap_or(0.0))
        .collect();

    let points = xs.len();
    let (coefficients, rank_deficient) = polyfit(&xs, &ys, degree);

    let overfit = if degree + 1 >= points || rank_deficient {
        let notice = Notice::OverfitWarning { degree, points };
        notice.log();
        Some(notice)
    } else {
        None
    };

    let fitted: Vec<f64> = xs.iter().map(|x| polyval(&coefficients, *x)).collect();
    let r_squared = r_squared(&ys, &fitted);
    tracing::debug!(?coefficients, r_squared, "Polynomial trend fitted.");

    let fitted_series = series
        .iter()
        .zip(&fitted)
        .map(|((date, _), y)| (*date, *y))
        .collect();

    let horizon = xs.last().copied().unwrap_or(0.0) as i64 + i64::from(projection_days);
    if first.checked_add_signed(Duration::days(horizon)).is_none() {
        return Err(AnalyticsError::InvalidTrendParameters(format!(
            "projecting {projection_days} days past the last observed date overflows the calendar"
        )));
    }
    // Every date up to the horizon is representable once the horizon itself is.
    let projected_series = (0..=horizon)
        .filter_map(|offset| {
            let date = first.checked_add_signed(Duration::days(offset))?;
            Some((date, polyval(&coefficients, offset as f64)))
        })
        .collect();

    Ok(Some(TrendFit {
        degree,
        coefficients,
        fitted_series,
        projected_series,
        r_squared,
        overfit,
    }))
}

/// Least-squares polynomial coefficients (ascending powers), plus whether the
/// system was rank deficient.
///
/// The Vandermonde columns are scaled by the largest |x| before a Householder
/// QR solve. With fewer points than coefficients, the surplus high-order
/// coefficients are zero.
pub fn polyfit(xs: &[f64], ys: &[f64], degree: usize) -> (Vec<f64>, bool) {
    let n = xs.len();
    let wanted = degree + 1;
    let cols = wanted.min(n);
    let mut coefficients = vec![0.0; wanted];
    if cols == 0 {
        return (coefficients, true);
    }

    let scale = xs.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()));
    let scale = if scale > 0.0 { scale } else { 1.0 };

    // Column-major copy of the scaled Vandermonde matrix.
    let mut a: Vec<Vec<f64>> = (0..cols)
        .map(|j| xs.iter().map(|x| (x / scale).powi(j as i32)).collect())
        .collect();
    let mut b = ys.to_vec();

    for k in 0..cols {
        let norm = a[k][k..].iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm == 0.0 {
            continue;
        }
        let alpha = if a[k][k] > 0.0 { -norm } else { norm };
        let mut v: Vec<f64> = a[k][k..].to_vec();
        v[0] -= alpha;
        let v_norm2: f64 = v.iter().map(|x| x * x).sum();
        if v_norm2 == 0.0 {
            continue;
        }
        for column in a.iter_mut().skip(k) {
            reflect(&mut column[k..], &v, v_norm2);
        }
        reflect(&mut b[k..], &v, v_norm2);
    }

    let max_diag = (0..cols).fold(0.0_f64, |acc, k| acc.max(a[k][k].abs()));
    let tolerance = max_diag * n as f64 * f64::EPSILON;
    let mut rank_deficient = cols < wanted;
    let mut scaled = vec![0.0; cols];
    for k in (0..cols).rev() {
        let diag = a[k][k];
        if diag.abs() <= tolerance {
            rank_deficient = true;
            continue;
        }
        let tail: f64 = ((k + 1)..cols).map(|j| a[j][k] * scaled[j]).sum();
        scaled[k] = (b[k] - tail) / diag;
    }

    for (j, c) in scaled.into_iter().enumerate() {
        coefficients[j] = c / scale.powi(j as i32);
    }
    (coefficients, rank_deficient)
}

/// Applies the Householder reflection `I - 2vvᵀ/‖v‖²` to `target`.
fn reflect(target: &mut [f64], v: &[f64], v_norm2: f64) {
    let dot: f64 = target.iter().zip(v).map(|(t, v)| t * v).sum();
    let tau = 2.0 * dot / v_norm2;
    for (t, v) in target.iter_mut().zip(v) {
        *t -= tau * v;
    }
}

/// Evaluates a polynomial with ascending-power coefficients (Horner's rule).
pub fn polyval(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Coefficient of determination of `predicted` against `observed`.
///
/// A constant observed series scores 1.0 when matched exactly and 0.0 otherwise.
pub fn r_squared(observed: &[f64], predicted: &[f64]) -> f64 {
    if observed.is_empty() {
        return 0.0;
    }
    let mean = observed.iter().sum::<f64>() / observed.len() as f64;
    let ss_res: f64 = observed
        .iter()
        .zip(predicted)
        .map(|(y, f)| (y - f) * (y - f))
        .sum();
    let ss_tot: f64 = observed.iter().map(|y| (y - mean) * (y - mean)).sum();
    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}
