//! Several items on one chart, as a share of their MSRP and in currency.

use crate::chart::{Line, floor_at_most_100, rolling_title, smoothed};
use analytics::stats;
use analytics::{DateAggregate, DateSeries, MetricEngine, Notice};
use chrono::NaiveDate;
use configuration::settings::Config;
use core_types::{RecordSet, Statistic};
use rust_decimal::Decimal;
use serde::Serialize;

/// The shaded one-standard-deviation area around a mean line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandPoint {
    pub date: NaiveDate,
    pub lower: Decimal,
    pub upper: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparedItem {
    pub line: Line,
    /// Present only for mean charts with the deviation band switched on.
    pub band: Option<Vec<BandPoint>>,
}

/// One chart's worth of compared items.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonChart {
    pub title: String,
    pub y_label: String,
    pub items: Vec<ComparedItem>,
    /// 100, or the lowest plotted value when any line dips below it.
    pub y_floor: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub statistic: Statistic,
    pub roll: usize,
    pub percent_msrp: ComparisonChart,
    pub currency: ComparisonChart,
    /// Items left off the percent chart because their MSRP is unknown.
    pub skipped_items: Vec<String>,
    pub notices: Vec<Notice>,
}

pub fn build(
    engine: &MetricEngine,
    config: &Config,
    sets: &[RecordSet],
    title: &str,
    statistic: Statistic,
    roll: usize,
    stdev_band: bool,
) -> ComparisonReport {
    let with_band = stdev_band && statistic == Statistic::Mean;
    let currency_code = &config.report.currency_code;

    let mut percent_items = Vec::new();
    let mut currency_items = Vec::new();
    let mut skipped_items = Vec::new();
    let mut notices = Vec::new();

    for set in sets {
        let label = set.item_label();
        if set.is_empty() {
            notices.push(Notice::empty_input("comparison item"));
            continue;
        }
        let daily = engine.daily_aggregates(set.records());
        let values = statistic_series(&daily, statistic);
        let spread: Vec<(NaiveDate, Option<Decimal>)> =
            daily.iter().map(|d| (d.date, d.std_price)).collect();

        currency_items.push(compared_item(label, values.clone(), &spread, roll, with_band));

        let msrp = set.msrp();
        if msrp <= Decimal::ZERO {
            tracing::debug!(item = label, "Item has no MSRP; left off the percent chart.");
            skipped_items.push(label.to_string());
            continue;
        }
        let scale = |v: Decimal| v / msrp * Decimal::ONE_HUNDRED;
        let percent_values = values.into_iter().map(|(d, v)| (d, scale(v))).collect();
        let percent_spread: Vec<_> = spread.iter().map(|(d, s)| (*d, s.map(scale))).collect();
        percent_items.push(compared_item(label, percent_values, &percent_spread, roll, with_band));
    }

    ComparisonReport {
        statistic,
        roll,
        percent_msrp: chart(percent_name(title, roll), "% of MSRP".to_string(), percent_items),
        currency: chart(
            currency_name(title, roll, currency_code),
            format!("{} Sale Price ({currency_code})", statistic.label()),
            currency_items,
        ),
        skipped_items,
        notices,
    }
}

pub fn percent_name(title: &str, roll: usize) -> String {
    rolling_title(title, roll, " - % MSRP")
}

pub fn currency_name(title: &str, roll: usize, currency_code: &str) -> String {
    rolling_title(title, roll, &format!(" - {currency_code}"))
}

fn statistic_series(daily: &[DateAggregate], statistic: Statistic) -> DateSeries {
    daily
        .iter()
        .map(|d| match statistic {
            Statistic::Median => (d.date, d.median_price),
            Statistic::Mean => (d.date, d.mean_price),
        })
        .collect()
}

/// Builds one line, smoothing it and attaching the deviation band when asked.
///
/// A rolling band uses the moving deviation of the unsmoothed line; otherwise
/// each date's own listing deviation is used. Dates without a deviation get no band point.
fn compared_item(
    label: &str,
    values: DateSeries,
    spread: &[(NaiveDate, Option<Decimal>)],
    roll: usize,
    with_band: bool,
) -> ComparedItem {
    let spread = if roll > 0 {
        stats::rolling_std(&values, roll)
    } else {
        spread.to_vec()
    };
    let points = smoothed(values, roll);

    let band = with_band.then(|| {
        points
            .iter()
            .zip(spread.iter())
            .filter_map(|((date, value), (_, std))| {
                std.map(|std| BandPoint {
                    date: *date,
                    lower: *value - std,
                    upper: *value + std,
                })
            })
            .collect()
    });

    ComparedItem {
        line: Line::new(label, points),
        band,
    }
}

fn chart(title: String, y_label: String, items: Vec<ComparedItem>) -> ComparisonChart {
    let y_floor = floor_at_most_100(items.iter().map(|i| &i.line));
    ComparisonChart {
        title,
        y_label,
        items,
        y_floor,
    }
}
