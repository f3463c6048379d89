use crate::error::AnalyticsError;
use crate::notice::Notice;
use crate::report::{
    BreakEvenThresholds, CumulativePoint, CumulativeProfitSeries, DailyTotals, DateAggregate,
    ProfitSplit, SalesSummary,
};
use crate::stats::{self, DateSeries};
use chrono::NaiveDate;
use configuration::FeeSchedule;
use core_types::SaleRecord;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// A stateless calculator for deriving price and profit metrics from sold listings.
///
/// The engine only borrows the records it is given; every series it returns is
/// a freshly built value.
#[derive(Debug, Clone, Default)]
pub struct MetricEngine {
    fees: FeeSchedule,
}

impl MetricEngine {
    pub fn new(fees: FeeSchedule) -> Self {
        Self { fees }
    }

    pub fn fees(&self) -> &FeeSchedule {
        &self.fees
    }

    /// Computes one `DateAggregate` per distinct sale date, in ascending date order.
    pub fn daily_aggregates(&self, records: &[SaleRecord]) -> Vec<DateAggregate> {
        group_by_date(records)
            .into_iter()
            .map(|(date, rows)| {
                let prices: Vec<Decimal> = rows.iter().map(|r| r.total_price).collect();
                // Every group holds at least one row, so the fallbacks are never used.
                DateAggregate {
                    date,
                    median_price: stats::median(&prices).unwrap_or_default(),
                    mean_price: stats::mean(&prices).unwrap_or_default(),
                    std_price: stats::sample_std(&prices),
                    max_price: prices.iter().copied().max().unwrap_or_default(),
                    min_price: prices.iter().copied().min().unwrap_or_default(),
                    total_price: prices.iter().sum(),
                    total_quantity: rows.iter().map(|r| u64::from(r.quantity)).sum(),
                    listing_count: rows.len(),
                }
            })
            .collect()
    }

    /// Typical shipping cost: the median of all strictly positive shipping charges.
    ///
    /// When no listing charged shipping the median is undefined and the estimate is 0.
    pub fn estimated_shipping(&self, records: &[SaleRecord]) -> (Decimal, Option<Notice>) {
        let charged: Vec<Decimal> = records
            .iter()
            .map(|r| r.shipping)
            .filter(|s| *s > Decimal::ZERO)
            .collect();
        match stats::median(&charged) {
            Some(median) => (median, None),
            None => (Decimal::ZERO, Some(Notice::undefined_median("estimated shipping"))),
        }
    }

    /// Computes the estimated and minimum break-even resale prices.
    ///
    /// Returns `Ok(None)` without touching the fee arithmetic when the MSRP is zero.
    pub fn break_even(
        &self,
        msrp: Decimal,
        estimated_shipping: Decimal,
    ) -> Result<Option<BreakEvenThresholds>, AnalyticsError> {
        if msrp <= Decimal::ZERO {
            return Ok(None);
        }
        let fees = &self.fees;

        let estimated_margin = self.margin("estimated", fees.estimated_platform_fee_rate)?;
        let minimum_margin = self.margin("minimum", fees.minimum_platform_fee_rate)?;

        let estimated = (msrp * (Decimal::ONE + fees.tax_rate) / estimated_margin
            + fees.payment_flat_fee
            + estimated_shipping)
            .round();
        let minimum = (msrp * (Decimal::ONE - fees.msrp_discount) / minimum_margin
            + fees.payment_flat_fee)
            .round();

        Ok(Some(BreakEvenThresholds { estimated, minimum }))
    }

    /// The share of a sale left after the platform and payment percentages.
    fn margin(&self, threshold: &'static str, fee_rate: Decimal) -> Result<Decimal, AnalyticsError> {
        let margin = Decimal::ONE - fee_rate - self.fees.payment_fee_rate;
        if margin <= Decimal::ZERO {
            return Err(AnalyticsError::InvalidFeeConfiguration {
                threshold,
                fee_rate,
                payment_fee_rate: self.fees.payment_fee_rate,
            });
        }
        Ok(margin)
    }

    pub fn payment_fee(&self, price: Decimal) -> Decimal {
        price * self.fees.payment_fee_rate + self.fees.payment_flat_fee
    }

    /// Splits one sale between platform, payment processor and reseller.
    ///
    /// The reseller's cost basis is the MSRP plus tax plus the estimated
    /// shipping they paid to receive the item.
    pub fn profit_split(
        &self,
        record: &SaleRecord,
        msrp: Decimal,
        estimated_shipping: Decimal,
    ) -> ProfitSplit {
        let price = record.total_price;
        let fee_rate = if record.is_store_seller {
            self.fees.store_fee_rate
        } else {
            self.fees.non_store_fee_rate
        };
        let platform_fee = price * fee_rate;
        let payment_fee = self.payment_fee(price);
        let cost_basis = msrp * (Decimal::ONE + self.fees.tax_rate) + estimated_shipping;

        ProfitSplit {
            platform_fee,
            payment_fee,
            seller_profit: price - cost_basis - platform_fee - payment_fee,
        }
    }

    /// Builds per-date totals and their running sums.
    ///
    /// The profit split is applied to each sale before grouping, so the
    /// cumulative profit reflects individual transactions.
    pub fn cumulative_profits(&self, records: &[SaleRecord], msrp: Decimal) -> CumulativeProfitSeries {
        let includes_profit_split = msrp > Decimal::ZERO;
        let (estimated_shipping, _) = self.estimated_shipping(records);

        let daily: Vec<DailyTotals> = group_by_date(records)
            .into_iter()
            .map(|(date, rows)| {
                let mut totals = DailyTotals {
                    date,
                    sales: Decimal::ZERO,
                    quantity: 0,
                    platform: Decimal::ZERO,
                    payment: Decimal::ZERO,
                    seller: Decimal::ZERO,
                };
                for record in rows {
                    totals.sales += record.total_price;
                    totals.quantity += u64::from(record.quantity);
                    if includes_profit_split {
                        let split = self.profit_split(record, msrp, estimated_shipping);
                        totals.platform += split.platform_fee;
                        totals.payment += split.payment_fee;
                        totals.seller += split.seller_profit;
                    }
                }
                totals
            })
            .collect();

        let mut running = CumulativePoint {
            date: NaiveDate::MIN,
            cum_sales: Decimal::ZERO,
            cum_quantity: 0,
            cum_platform: Decimal::ZERO,
            cum_payment: Decimal::ZERO,
            cum_seller: Decimal::ZERO,
        };
        let by_date = daily
            .iter()
            .map(|day| {
                running.date = day.date;
                running.cum_sales += day.sales;
                running.cum_quantity += day.quantity;
                running.cum_platform += day.platform;
                running.cum_payment += day.payment;
                running.cum_seller += day.seller;
                running.clone()
            })
            .collect();

        CumulativeProfitSeries {
            daily,
            by_date,
            includes_profit_split,
        }
    }

    /// The scalar summary of a record set: overall median, thresholds, units and shipping.
    pub fn summarize(
        &self,
        records: &[SaleRecord],
        msrp: Decimal,
    ) -> Result<(SalesSummary, Vec<Notice>), AnalyticsError> {
        let mut notices = Vec::new();
        if records.is_empty() {
            notices.push(Notice::empty_input("sales summary"));
        }

        let prices: Vec<Decimal> = records.iter().map(|r| r.total_price).collect();
        let median_price = stats::median(&prices).unwrap_or_default().trunc();

        let (estimated_shipping, shipping_notice) = self.estimated_shipping(records);
        if !records.is_empty() {
            notices.extend(shipping_notice);
        }

        let summary = SalesSummary {
            median_price,
            break_even: self.break_even(msrp, estimated_shipping)?,
            total_sold: total_quantity(records),
            estimated_shipping,
        };
        Ok((summary, notices))
    }
}

/// Total units sold across all records.
pub fn total_quantity(records: &[SaleRecord]) -> u64 {
    records.iter().map(|r| u64::from(r.quantity)).sum()
}

/// Rescales a series to percent of MSRP. `None` when the MSRP is not positive.
pub fn percent_of_msrp(series: &[(NaiveDate, Decimal)], msrp: Decimal) -> Option<DateSeries> {
    if msrp <= Decimal::ZERO {
        return None;
    }
    Some(
        series
            .iter()
            .map(|(date, value)| (*date, *value / msrp * Decimal::ONE_HUNDRED))
            .collect(),
    )
}

/// Groups records by sale date, in ascending date order.
pub fn group_by_date(records: &[SaleRecord]) -> BTreeMap<NaiveDate, Vec<&SaleRecord>> {
    let mut groups: BTreeMap<NaiveDate, Vec<&SaleRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.sold_date).or_default().push(record);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sale(day: u32, price: Decimal, shipping: Decimal, store: bool) -> SaleRecord {
        SaleRecord {
            sold_date: NaiveDate::from_ymd_opt(2021, 2, day).unwrap(),
            total_price: price,
            shipping,
            quantity: 1,
            is_store_seller: store,
            seller_name: None,
            seller_feedback_score: None,
            brand: None,
            msrp_reference: Some(dec!(100)),
            item_label: "Widget".to_string(),
        }
    }

    #[test]
    fn break_even_matches_closed_form() {
        let engine = MetricEngine::new(FeeSchedule::default());
        let thresholds = engine.break_even(dec!(100), dec!(15)).unwrap().unwrap();
        // 100 * 1.0625 / 0.871 + 0.30 + 15 = 137.286...
        assert_eq!(thresholds.estimated, dec!(137));
        // 100 * 0.95 / 0.935 + 0.30 = 101.904...
        assert_eq!(thresholds.minimum, dec!(102));
    }

    #[test]
    fn zero_msrp_skips_break_even_even_with_broken_fees() {
        let fees = FeeSchedule {
            estimated_platform_fee_rate: dec!(0.971),
            ..FeeSchedule::default()
        };
        let engine = MetricEngine::new(fees);
        assert_eq!(engine.break_even(Decimal::ZERO, dec!(15)).unwrap(), None);
    }

    #[test]
    fn zero_margin_is_invalid_fee_configuration() {
        let fees = FeeSchedule {
            estimated_platform_fee_rate: dec!(0.971),
            ..FeeSchedule::default()
        };
        let engine = MetricEngine::new(fees);
        let err = engine.break_even(dec!(100), Decimal::ZERO).unwrap_err();
        assert_eq!(
            err,
            AnalyticsError::InvalidFeeConfiguration {
                threshold: "estimated",
                fee_rate: dec!(0.971),
                payment_fee_rate: dec!(0.029),
            }
        );
    }

    #[test]
    fn estimated_shipping_ignores_free_shipping() {
        let engine = MetricEngine::default();
        let records = vec![
            sale(1, dec!(150), dec!(0), false),
            sale(1, dec!(160), dec!(10), false),
            sale(2, dec!(170), dec!(20), false),
        ];
        assert_eq!(engine.estimated_shipping(&records), (dec!(15), None));

        let free = vec![sale(1, dec!(150), dec!(0), false)];
        let (shipping, notice) = engine.estimated_shipping(&free);
        assert_eq!(shipping, Decimal::ZERO);
        assert!(matches!(notice, Some(Notice::UndefinedMedian { .. })));
    }

    #[test]
    fn profit_split_uses_store_rate_for_store_sellers() {
        let engine = MetricEngine::new(FeeSchedule::default());
        let casual = engine.profit_split(&sale(1, dec!(200), dec!(0), false), dec!(100), dec!(15));
        assert_eq!(casual.platform_fee, dec!(20.0));
        assert_eq!(casual.payment_fee, dec!(6.100));
        // 200 - (106.25 + 15) - 20 - 6.1
        assert_eq!(casual.seller_profit, dec!(52.65));

        let store = engine.profit_split(&sale(1, dec!(200), dec!(0), true), dec!(100), dec!(15));
        assert_eq!(store.platform_fee, dec!(18.30));
    }

    #[test]
    fn summarize_empty_input_defaults_to_zero() {
        let engine = MetricEngine::default();
        let (summary, notices) = engine.summarize(&[], Decimal::ZERO).unwrap();
        assert_eq!(summary, SalesSummary::default());
        assert_eq!(notices, vec![Notice::empty_input("sales summary")]);
    }

    #[test]
    fn summarize_truncates_overall_median() {
        let engine = MetricEngine::default();
        let records = vec![sale(1, dec!(150.9), dec!(0), false), sale(2, dec!(151.9), dec!(0), false)];
        let (summary, _) = engine.summarize(&records, dec!(100)).unwrap();
        assert_eq!(summary.median_price, dec!(151));
        assert_eq!(summary.total_sold, 2);
        assert!(summary.break_even.is_some());
    }

    #[test]
    fn percent_of_msrp_needs_positive_msrp() {
        let series = vec![(NaiveDate::from_ymd_opt(2021, 2, 1).unwrap(), dec!(150))];
        assert_eq!(percent_of_msrp(&series, Decimal::ZERO), None);
        assert_eq!(percent_of_msrp(&series, dec!(100)).unwrap()[0].1, dec!(150));
    }
}
