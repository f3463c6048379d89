use crate::chart::{AxisBounds, title_from_query};
use crate::error::ReportError;
use analytics::trend::{self, TrendSpec};
use analytics::{DateAggregate, DateSeries, MetricEngine, Notice, SalesSummary, Trend};
use chrono::NaiveDate;
use configuration::settings::Config;
use core_types::RecordSet;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Every sold listing over time, with the daily median, MSRP, break-even lines and trend.
#[derive(Debug, Clone, Serialize)]
pub struct SalesReport {
    pub title: String,
    /// One point per listing: (sale date, total price).
    pub scatter: Vec<(NaiveDate, Decimal)>,
    pub daily: Vec<DateAggregate>,
    pub median_line: DateSeries,
    pub msrp: Decimal,
    pub trend: Option<Trend>,
    pub y_axis: AxisBounds,
    pub summary: SalesSummary,
    pub notices: Vec<Notice>,
}

/// Artifact name: the raw query plus the configured title suffix.
pub fn artifact_name(query: &str, config: &Config) -> String {
    format!("{}{}", query, config.report.title_suffix)
}

pub fn build(
    engine: &MetricEngine,
    config: &Config,
    query: &str,
    msrp: Decimal,
    set: &RecordSet,
) -> Result<SalesReport, ReportError> {
    let records = set.records();
    let title = format!(
        "{} Sold Prices Over Time",
        title_from_query(query, &config.report.title_suffix)
    );

    let daily = engine.daily_aggregates(records);
    let median_line: DateSeries = daily.iter().map(|d| (d.date, d.median_price)).collect();
    let (summary, mut notices) = engine.summarize(records, msrp)?;

    let trend = match config.trend.kind {
        Some(kind) => {
            let spec = TrendSpec::from_params(kind, &config.trend.param)?;
            trend::fit_trend(&median_line, spec)?
        }
        None => None,
    };
    if let Some(trend) = &trend {
        notices.extend(trend.notices());
    }

    Ok(SalesReport {
        title,
        scatter: records.iter().map(|r| (r.sold_date, r.total_price)).collect(),
        y_axis: y_axis(&daily, msrp),
        daily,
        median_line,
        msrp,
        trend,
        summary,
        notices,
    })
}

/// Leaves headroom above the daily medians without letting outliers stretch the
/// axis, and keeps the MSRP line in view.
fn y_axis(daily: &[DateAggregate], msrp: Decimal) -> AxisBounds {
    let max_median = daily.iter().map(|d| d.median_price).max();
    let max_max = daily.iter().map(|d| d.max_price).max();
    let min_min = daily.iter().map(|d| d.min_price).min();

    match (max_median, max_max, min_min) {
        (Some(max_median), Some(max_max), Some(min_min)) => AxisBounds {
            top: (max_median * dec!(1.25)).min(max_max),
            bottom: (min_min * dec!(0.95)).min(msrp * dec!(0.95)),
        },
        _ => AxisBounds {
            top: msrp,
            bottom: msrp * dec!(0.95),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use configuration::FeeSchedule;
    use core_types::{SaleRecord, TrendKind};

    fn sale(day: u32, price: Decimal, shipping: Decimal) -> SaleRecord {
        SaleRecord {
            sold_date: NaiveDate::from_ymd_opt(2021, 1, day).unwrap(),
            total_price: price,
            shipping,
            quantity: 1,
            is_store_seller: false,
            seller_name: None,
            seller_feedback_score: None,
            brand: None,
            msrp_reference: Some(dec!(100)),
            item_label: "Widget".to_string(),
        }
    }

    #[test]
    fn builds_summary_axis_and_trend() {
        let mut config = Config::default();
        config.trend.kind = Some(TrendKind::Linear);
        config.trend.param = vec![5.0];
        let engine = MetricEngine::new(FeeSchedule::default());
        let set = RecordSet::new(vec![
            sale(1, dec!(140), dec!(15)),
            sale(1, dec!(160), dec!(0)),
            sale(2, dec!(150), dec!(15)),
            sale(3, dec!(400), dec!(15)),
            sale(3, dec!(180), dec!(15)),
            sale(3, dec!(170), dec!(15)),
        ]);

        let report = build(&engine, &config, "Widget+Pro-broken", dec!(100), &set).unwrap();
        assert_eq!(report.title, "Widget Pro Sold Prices Over Time");
        assert_eq!(report.scatter.len(), 6);
        assert_eq!(report.daily.len(), 3);
        assert_eq!(report.summary.total_sold, 6);
        assert_eq!(report.summary.estimated_shipping, dec!(15));
        assert_eq!(report.summary.break_even.unwrap().estimated, dec!(137));

        // Highest daily median is 180; 1.25x that (225) beats the 400 outlier.
        assert_eq!(report.y_axis.top, dec!(225));
        assert_eq!(report.y_axis.bottom, dec!(95));

        let Some(Trend::Fit(fit)) = &report.trend else {
            panic!("expected a linear fit");
        };
        assert_eq!(fit.projected_series.len(), 8);
    }

    #[test]
    fn empty_set_still_reports() {
        let report = build(
            &MetricEngine::default(),
            &Config::default(),
            "Nothing",
            dec!(100),
            &RecordSet::default(),
        )
        .unwrap();
        assert!(report.daily.is_empty());
        assert_eq!(report.summary.total_sold, 0);
        assert!(report.notices.contains(&Notice::empty_input("sales summary")));
    }

    #[test]
    fn bad_trend_params_fail_the_report() {
        let mut config = Config::default();
        config.trend.kind = Some(TrendKind::Polynomial);
        config.trend.param = vec![2.0];
        let set = RecordSet::new(vec![sale(1, dec!(150), dec!(0))]);
        let result = build(&MetricEngine::default(), &config, "Widget", dec!(100), &set);
        assert!(matches!(result, Err(ReportError::Analytics(_))));
    }

    #[test]
    fn oversized_projection_fails_the_report() {
        let mut config = Config::default();
        config.trend.kind = Some(TrendKind::Linear);
        config.trend.param = vec![1e8];
        let set = RecordSet::new(vec![sale(1, dec!(150), dec!(0)), sale(2, dec!(160), dec!(0))]);
        let result = build(&MetricEngine::default(), &config, "Widget", dec!(100), &set);
        assert!(matches!(result, Err(ReportError::Analytics(_))));
    }
}
