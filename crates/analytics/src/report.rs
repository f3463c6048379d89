use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Price statistics for all listings sold on one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateAggregate {
    pub date: NaiveDate,
    pub median_price: Decimal,
    pub mean_price: Decimal,
    /// Sample standard deviation; `None` when only one listing sold that day.
    pub std_price: Option<Decimal>,
    pub max_price: Decimal,
    pub min_price: Decimal,
    pub total_price: Decimal,
    pub total_quantity: u64,
    pub listing_count: usize,
}

/// The resale prices at which a reseller who bought at MSRP stops losing money.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakEvenThresholds {
    /// Assumes the configured tax, the typical platform fee and typical shipping.
    pub estimated: Decimal,
    /// Assumes a discounted purchase and the best-case platform fee.
    pub minimum: Decimal,
}

/// How one sale's price is divided between the platform, the payment
/// processor and the reseller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfitSplit {
    pub platform_fee: Decimal,
    pub payment_fee: Decimal,
    pub seller_profit: Decimal,
}

/// Per-date sums of prices, quantities and profit components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTotals {
    pub date: NaiveDate,
    pub sales: Decimal,
    pub quantity: u64,
    pub platform: Decimal,
    pub payment: Decimal,
    pub seller: Decimal,
}

/// Running totals up to and including `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativePoint {
    pub date: NaiveDate,
    pub cum_sales: Decimal,
    pub cum_quantity: u64,
    pub cum_platform: Decimal,
    pub cum_payment: Decimal,
    pub cum_seller: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CumulativeProfitSeries {
    pub daily: Vec<DailyTotals>,
    pub by_date: Vec<CumulativePoint>,
    /// False when the MSRP was zero and no profit split could be computed;
    /// the profit columns are then all zero.
    pub includes_profit_split: bool,
}

impl CumulativeProfitSeries {
    pub fn last(&self) -> Option<&CumulativePoint> {
        self.by_date.last()
    }
}

/// The scalar values a sales report hands back to its caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesSummary {
    /// Overall median price, truncated to whole currency units.
    pub median_price: Decimal,
    /// `None` when the MSRP is zero.
    pub break_even: Option<BreakEvenThresholds>,
    pub total_sold: u64,
    pub estimated_shipping: Decimal,
}

impl Default for SalesSummary {
    fn default() -> Self {
        Self {
            median_price: Decimal::ZERO,
            break_even: None,
            total_sold: 0,
            estimated_shipping: Decimal::ZERO,
        }
    }
}
