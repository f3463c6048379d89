use crate::chart::title_from_query;
use analytics::buckets::{feedback_breakdown, sales_count_breakdown};
use analytics::{Notice, ParetoBreakdown};
use configuration::settings::Config;
use core_types::RecordSet;
use serde::Serialize;

/// A Pareto chart: quantity bars per tier with the cumulative share line.
#[derive(Debug, Clone, Serialize)]
pub struct ParetoChart {
    pub title: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub breakdown: ParetoBreakdown,
}

#[derive(Debug, Clone, Serialize)]
pub struct SellerReport {
    pub feedback: ParetoChart,
    pub sales_count: ParetoChart,
    pub notices: Vec<Notice>,
}

/// Pools every set and breaks the units sold down by seller feedback and seller volume.
pub fn build(config: &Config, sets: &[RecordSet], title_text: &str) -> SellerReport {
    let pooled = RecordSet::concat(sets);
    let records = pooled.records();
    let prefix = title_from_query(title_text, &config.report.title_suffix);

    let mut notices = Vec::new();
    if records.is_empty() {
        notices.push(Notice::empty_input("seller breakdown"));
    }
    let (sales_breakdown, gap_notice) = sales_count_breakdown(records);
    notices.extend(gap_notice);

    SellerReport {
        feedback: ParetoChart {
            title: format!("{prefix} Seller Feedback vs Quantity Sold"),
            x_label: "Star Category",
            y_label: "Quantity Sold",
            breakdown: feedback_breakdown(records),
        },
        sales_count: ParetoChart {
            title: format!("{prefix} Seller Sales vs Total Sold"),
            x_label: "Number of Sales",
            y_label: "Quantity Sold",
            breakdown: sales_breakdown,
        },
        notices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::SaleRecord;
    use rust_decimal_macros::dec;

    fn sale(seller: &str, feedback: u64, quantity: u32, store: bool) -> SaleRecord {
        SaleRecord {
            sold_date: NaiveDate::from_ymd_opt(2021, 7, 1).unwrap(),
            total_price: dec!(300),
            shipping: dec!(0),
            quantity,
            is_store_seller: store,
            seller_name: Some(seller.to_string()),
            seller_feedback_score: Some(feedback),
            brand: None,
            msrp_reference: None,
            item_label: "Widget".to_string(),
        }
    }

    #[test]
    fn pools_sets_and_titles_both_charts() {
        let a = RecordSet::new(vec![sale("alice", 0, 1, false), sale("bob", 120, 3, true)]);
        let b = RecordSet::new(vec![sale("bob", 120, 2, true)]);
        let report = build(&Config::default(), &[a, b], "Widget+Pro-used");

        assert_eq!(report.feedback.title, "Widget Pro Seller Feedback vs Quantity Sold");
        assert_eq!(report.sales_count.title, "Widget Pro Seller Sales vs Total Sold");
        assert_eq!(report.feedback.breakdown.total, 6);
        // bob's five units land in the "5" tier.
        assert_eq!(report.sales_count.breakdown.rows[4].all, 5);
        assert_eq!(report.sales_count.breakdown.rows[4].store, 5);
        assert!(report.notices.is_empty());
    }

    #[test]
    fn sellers_in_tier_gaps_raise_a_notice() {
        let set = RecordSet::new(vec![sale("carol", 10, 10, false)]);
        let report = build(&Config::default(), &[set], "Widget");
        assert_eq!(
            report.notices,
            vec![Notice::UnbucketedSellers {
                sellers: 1,
                quantity: 10
            }]
        );
        assert_eq!(report.sales_count.breakdown.total, 0);
    }
}
