//! Building blocks shared by the chart payloads of every report.

use analytics::DateSeries;
use analytics::stats;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// The visible range of a value axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisBounds {
    pub bottom: Decimal,
    pub top: Decimal,
}

/// A labelled date series drawn as one line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub label: String,
    pub points: DateSeries,
}

impl Line {
    pub fn new(label: impl Into<String>, points: DateSeries) -> Self {
        Self {
            label: label.into(),
            points,
        }
    }

    pub fn min_value(&self) -> Option<Decimal> {
        self.points.iter().map(|(_, v)| *v).min()
    }

    pub fn max_value(&self) -> Option<Decimal> {
        self.points.iter().map(|(_, v)| *v).max()
    }
}

/// Turns a search query such as `"RTX+3080-LHR -mining"` into a chart title prefix.
///
/// `+` separates words and everything after the first `-` is a search filter.
pub fn title_from_query(query: &str, suffix: &str) -> String {
    let spaced = query.replace('+', " ");
    let head = spaced.split('-').next().unwrap_or_default().trim();
    format!("{head}{suffix}")
}

/// `"{title} {roll} Day Rolling Average{tail}"`, or `"{title}{tail}"` when not rolling.
pub fn rolling_title(title: &str, roll: usize, tail: &str) -> String {
    if roll > 0 {
        format!("{title} {roll} Day Rolling Average{tail}")
    } else {
        format!("{title}{tail}")
    }
}

/// Applies a `roll`-day moving average, or returns the series untouched when `roll` is 0.
pub fn smoothed(series: DateSeries, roll: usize) -> DateSeries {
    if roll > 0 {
        stats::rolling_mean(&series, roll)
    } else {
        series
    }
}

/// Lowest value on a percent-of-MSRP style chart: 100, or lower if any line dips below.
pub fn floor_at_most_100<'a>(lines: impl IntoIterator<Item = &'a Line>) -> Decimal {
    lines
        .into_iter()
        .filter_map(Line::min_value)
        .fold(dec!(100), Decimal::min)
}
