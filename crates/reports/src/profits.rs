use analytics::engine::percent_of_msrp;
use analytics::{CumulativePoint, DailyTotals, DateSeries, MetricEngine, Notice};
use core_types::RecordSet;
use rust_decimal::Decimal;
use serde::Serialize;

/// Final cumulative amounts taken by the platform, the payment processor and resellers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfitSummary {
    pub platform: Decimal,
    pub payment: Decimal,
    pub seller: Decimal,
}

/// Cumulative sales and profits over time, plus the daily median as a share of MSRP.
#[derive(Debug, Clone, Serialize)]
pub struct ProfitReport {
    pub title: String,
    pub daily: Vec<DailyTotals>,
    pub cumulative: Vec<CumulativePoint>,
    /// `None` when the MSRP is zero.
    pub median_percent_msrp: Option<DateSeries>,
    /// `None` when the MSRP is zero or there were no sales.
    pub summary: Option<ProfitSummary>,
    pub notices: Vec<Notice>,
}

pub fn artifact_name(title: &str) -> String {
    format!("{title} Cumulative Plots")
}

pub fn build(engine: &MetricEngine, title: &str, msrp: Decimal, set: &RecordSet) -> ProfitReport {
    let records = set.records();
    let mut notices = Vec::new();
    if records.is_empty() {
        notices.push(Notice::empty_input("profit series"));
    } else if msrp > Decimal::ZERO {
        let (_, shipping_notice) = engine.estimated_shipping(records);
        notices.extend(shipping_notice);
    }

    let series = engine.cumulative_profits(records, msrp);
    let summary = match series.last() {
        Some(last) if series.includes_profit_split => Some(ProfitSummary {
            platform: last.cum_platform,
            payment: last.cum_payment,
            seller: last.cum_seller,
        }),
        _ => None,
    };

    let medians: DateSeries = engine
        .daily_aggregates(records)
        .into_iter()
        .map(|d| (d.date, d.median_price))
        .collect();

    ProfitReport {
        title: format!("{title} Cumulative Sales/Profits and Profits over time"),
        daily: series.daily,
        cumulative: series.by_date,
        median_percent_msrp: percent_of_msrp(&medians, msrp),
        summary,
        notices,
    }
}
