//! Item prices per unit of mining hash rate against a normalized coin price.

use crate::chart::{Line, smoothed};
use crate::comparison::{currency_name, percent_name};
use crate::error::ReportError;
use analytics::{DateSeries, MetricEngine, Notice};
use api_client::PriceFeed;
use api_client::error::ApiError;
use chrono::{Duration, NaiveDate};
use configuration::settings::Config;
use core_types::RecordSet;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HashRatedItem {
    pub line: Line,
    pub hash_rate: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct CryptoReport {
    pub title: String,
    pub currency_title: String,
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Daily closes divided by the first close of the fetched range.
    pub normalized_price: Line,
    /// Daily median price / hash rate / normalized close, per item.
    pub items: Vec<HashRatedItem>,
    /// Daily median price per item, in currency.
    pub currency: Vec<Line>,
    pub notices: Vec<Notice>,
}

/// Fetches the coin price once for the span covered by every item and builds the chart.
///
/// Any failure of the feed fails this report only.
#[allow(clippy::too_many_arguments)]
pub async fn build(
    engine: &MetricEngine,
    config: &Config,
    sets: &[RecordSet],
    title: &str,
    start: NaiveDate,
    end: NaiveDate,
    roll: usize,
    feed: &dyn PriceFeed,
) -> Result<CryptoReport, ReportError> {
    let symbol = config.price_feed.symbol.as_str();
    let windowed: Vec<RecordSet> = sets.iter().map(|s| s.between(start, end)).collect();

    let mut report = CryptoReport {
        title: percent_name(title, roll),
        currency_title: currency_name(title, roll, &config.report.currency_code),
        symbol: symbol.to_string(),
        start,
        end,
        normalized_price: Line::new(symbol, Vec::new()),
        items: Vec::new(),
        currency: Vec::new(),
        notices: Vec::new(),
    };

    let first = windowed.iter().filter_map(RecordSet::first_date).min();
    let last = windowed.iter().filter_map(RecordSet::last_date).max();
    let (Some(first), Some(last)) = (first, last) else {
        report.notices.push(Notice::empty_input("crypto comparison"));
        return Ok(report);
    };

    let fetch_start = first - Duration::days(1);
    let closes = feed.fetch_daily_closes(symbol, fetch_start, last).await?;
    let normalized = normalize(&closes).ok_or_else(|| ApiError::NoData {
        symbol: symbol.to_string(),
        start: fetch_start.to_string(),
        end: last.to_string(),
    })?;
    let by_date: BTreeMap<NaiveDate, Decimal> = normalized.iter().copied().collect();

    for set in &windowed {
        if set.is_empty() {
            report.notices.push(Notice::empty_input("crypto comparison item"));
            continue;
        }
        let label = set.item_label();
        let hash_rate = config.hash_rate_for(label);
        let medians: DateSeries = engine
            .daily_aggregates(set.records())
            .into_iter()
            .map(|d| (d.date, d.median_price))
            .collect();

        let per_hash: DateSeries = medians
            .iter()
            .filter_map(|(date, median)| {
                let price = by_date.get(date)?;
                median.checked_div(hash_rate * *price).map(|v| (*date, v))
            })
            .collect();

        report.items.push(HashRatedItem {
            line: Line::new(label, smoothed(per_hash, roll)),
            hash_rate,
        });
        report.currency.push(Line::new(label, smoothed(medians, roll)));
    }
    report.normalized_price = Line::new(symbol, normalized);

    tracing::info!(
        symbol,
        days = report.normalized_price.points.len(),
        items = report.items.len(),
        "Crypto comparison built."
    );
    Ok(report)
}

/// Divides every close by the first one. `None` when there is no usable first close.
fn normalize(closes: &[(NaiveDate, Decimal)]) -> Option<DateSeries> {
    let (_, base) = closes.first()?;
    if base.is_zero() {
        return None;
    }
    Some(closes.iter().map(|(d, c)| (*d, *c / *base)).collect())
}
