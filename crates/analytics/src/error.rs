use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum AnalyticsError {
    /// A break-even denominator `1 - fee_rate - payment_fee_rate` is zero or negative.
    #[error(
        "Invalid fee configuration for {threshold} break-even: platform fee {fee_rate} and payment fee {payment_fee_rate} leave no margin"
    )]
    InvalidFeeConfiguration {
        threshold: &'static str,
        fee_rate: Decimal,
        payment_fee_rate: Decimal,
    },

    #[error("Invalid trend parameters: {0}")]
    InvalidTrendParameters(String),
}
