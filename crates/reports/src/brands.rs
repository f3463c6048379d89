use crate::chart::{AxisBounds, Line, floor_at_most_100, rolling_title, smoothed};
use analytics::stats;
use analytics::{DateSeries, Notice};
use chrono::NaiveDate;
use configuration::settings::Config;
use core_types::{RecordSet, SaleRecord};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::BTreeMap;

/// Brands need more listings than this to get a line on the chart.
const MIN_BRAND_LISTINGS: usize = 10;

/// Listing statistics for one brand of one item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandStats {
    pub item: String,
    pub brand: String,
    pub listings: usize,
    /// Rounded to whole currency units.
    pub mean_price: Decimal,
    /// Rounded to whole currency units.
    pub total_price: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct BrandReport {
    pub title: String,
    pub roll: usize,
    pub stats: Vec<BrandStats>,
    /// Daily median price as a percent of each listing's MSRP, one line per brand.
    pub lines: Vec<Line>,
    pub y_axis: AxisBounds,
    /// Items whose prices could not be scaled because their MSRP is unknown.
    pub skipped_items: Vec<String>,
    pub notices: Vec<Notice>,
}

pub fn artifact_name(title: &str, roll: usize) -> String {
    rolling_title(title, roll, "")
}

pub fn build(config: &Config, sets: &[RecordSet], title: &str, roll: usize) -> BrandReport {
    let brands = &config.brand_list;
    let mut stats_rows = Vec::new();
    let mut scaled: Vec<SaleRecord> = Vec::new();
    let mut skipped_items = Vec::new();

    for set in sets {
        let item = set.item_label();
        for brand in brands {
            let prices: Vec<Decimal> = of_brand(set.records(), brand).map(|r| r.total_price).collect();
            if let Some(mean) = stats::mean(&prices) {
                stats_rows.push(BrandStats {
                    item: item.to_string(),
                    brand: brand.clone(),
                    listings: prices.len(),
                    mean_price: mean.round(),
                    total_price: prices.iter().sum::<Decimal>().round(),
                });
            }
        }

        let msrp = set.msrp();
        if msrp <= Decimal::ZERO {
            if !set.is_empty() {
                skipped_items.push(item.to_string());
            }
            continue;
        }
        scaled.extend(set.iter().map(|r| SaleRecord {
            total_price: r.total_price / msrp,
            ..r.clone()
        }));
    }

    let lines: Vec<Line> = brands
        .iter()
        .filter_map(|brand| {
            let rows: Vec<&SaleRecord> = of_brand(&scaled, brand).collect();
            if rows.len() <= MIN_BRAND_LISTINGS {
                return None;
            }
            tracing::debug!(brand = brand.as_str(), listings = rows.len(), "Plotting brand.");
            Some(Line::new(brand.as_str(), smoothed(unit_medians(&rows), roll)))
        })
        .collect();

    let top = lines
        .iter()
        .filter_map(Line::max_value)
        .fold(dec!(300), Decimal::max);
    let y_axis = AxisBounds {
        bottom: floor_at_most_100(&lines),
        top,
    };

    let mut notices = Vec::new();
    if lines.is_empty() {
        notices.push(Notice::empty_input("brand chart"));
    }

    BrandReport {
        title: artifact_name(title, roll),
        roll,
        stats: stats_rows,
        lines,
        y_axis,
        skipped_items,
        notices,
    }
}

fn of_brand<'a>(records: &'a [SaleRecord], brand: &'a str) -> impl Iterator<Item = &'a SaleRecord> {
    records.iter().filter(move |r| r.brand.as_deref() == Some(brand))
}

/// Daily median x 100 where every unit sold counts once. Non-positive prices are dropped.
fn unit_medians(rows: &[&SaleRecord]) -> DateSeries {
    let mut by_date: BTreeMap<NaiveDate, Vec<(Decimal, u64)>> = BTreeMap::new();
    for row in rows.iter().filter(|r| r.total_price > Decimal::ZERO) {
        by_date
            .entry(row.sold_date)
            .or_default()
            .push((row.total_price, u64::from(row.quantity)));
    }
    by_date
        .into_iter()
        .filter_map(|(date, units)| {
            stats::weighted_median(&units).map(|m| (date, m * Decimal::ONE_HUNDRED))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sale(item: &str, msrp: Decimal, brand: &str, day: u32, price: Decimal, quantity: u32) -> SaleRecord {
        SaleRecord {
            sold_date: NaiveDate::from_ymd_opt(2021, 8, day).unwrap(),
            total_price: price,
            shipping: Decimal::ZERO,
            quantity,
            is_store_seller: false,
            seller_name: None,
            seller_feedback_score: None,
            brand: Some(brand.to_string()),
            msrp_reference: Some(msrp),
            item_label: item.to_string(),
        }
    }

    fn config(brands: &[&str]) -> Config {
        Config {
            brand_list: brands.iter().map(|b| b.to_string()).collect(),
            ..Config::default()
        }
    }

    #[test]
    fn stats_round_half_to_even() {
        let set = RecordSet::new(vec![
            sale("Widget", dec!(100), "Acme", 1, dec!(100), 1),
            sale("Widget", dec!(100), "Acme", 1, dec!(101), 1),
        ]);
        let report = build(&config(&["Acme", "Other"]), &[set], "Brands", 0);
        assert_eq!(report.stats.len(), 1);
        assert_eq!(report.stats[0].listings, 2);
        // 100.5 rounds to the even neighbour.
        assert_eq!(report.stats[0].mean_price, dec!(100));
        assert_eq!(report.stats[0].total_price, dec!(201));
        assert!(report.lines.is_empty());
    }

    #[test]
    fn brands_need_more_than_ten_listings() {
        let mut rows: Vec<SaleRecord> = (1..=11)
            .map(|day| sale("Widget", dec!(200), "Acme", day, dec!(500), 1))
            .collect();
        rows.extend((1..=10).map(|day| sale("Widget", dec!(200), "Tiny", day, dec!(100), 1)));
        let report = build(&config(&["Acme", "Tiny"]), &[RecordSet::new(rows)], "Brands", 0);

        assert_eq!(report.lines.len(), 1);
        assert_eq!(report.lines[0].label, "Acme");
        assert_eq!(report.lines[0].points[0].1, dec!(250));
        assert_eq!(report.y_axis.top, dec!(300));
        assert_eq!(report.y_axis.bottom, dec!(100));
    }

    #[test]
    fn quantity_weights_the_median() {
        let rows = vec![
            sale("Widget", dec!(100), "Acme", 1, dec!(100), 1),
            sale("Widget", dec!(100), "Acme", 1, dec!(400), 3),
        ];
        let medians = unit_medians(&rows.iter().collect::<Vec<_>>());
        assert_eq!(medians, vec![(NaiveDate::from_ymd_opt(2021, 8, 1).unwrap(), dec!(40000))]);
    }

    #[test]
    fn huge_quantities_are_weighted_without_expanding() {
        let rows = vec![
            sale("Widget", dec!(100), "Acme", 1, dec!(100), u32::MAX),
            sale("Widget", dec!(100), "Acme", 1, dec!(400), u32::MAX),
            sale("Widget", dec!(100), "Acme", 2, dec!(300), u32::MAX),
            sale("Widget", dec!(100), "Acme", 2, dec!(0), u32::MAX),
        ];
        let medians = unit_medians(&rows.iter().collect::<Vec<_>>());
        assert_eq!(
            medians,
            vec![
                (NaiveDate::from_ymd_opt(2021, 8, 1).unwrap(), dec!(25000)),
                (NaiveDate::from_ymd_opt(2021, 8, 2).unwrap(), dec!(30000)),
            ]
        );
    }

    #[test]
    fn items_without_msrp_are_not_scaled() {
        let set = RecordSet::new(vec![sale("Gadget", Decimal::ZERO, "Acme", 1, dec!(50), 1)]);
        let report = build(&config(&["Acme"]), &[set], "Brands", 7);
        assert_eq!(report.title, "Brands 7 Day Rolling Average");
        assert_eq!(report.skipped_items, vec!["Gadget".to_string()]);
        assert_eq!(report.stats.len(), 1);
        assert_eq!(report.notices, vec![Notice::empty_input("brand chart")]);
    }
}
