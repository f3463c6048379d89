use core_types::TrendKind;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// The root configuration structure for the entire application.
///
/// Every section may be omitted from `config.toml`; the defaults below are the
/// assumptions the reports were tuned with.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub report: ReportSettings,
    #[serde(default)]
    pub fees: FeeSchedule,
    #[serde(default)]
    pub trend: TrendSettings,
    /// Brands to break out in the brand report, in legend order.
    #[serde(default)]
    pub brand_list: Vec<String>,
    #[serde(default)]
    pub price_feed: PriceFeedSettings,
    /// Hash rate per item, matched by substring against the item label.
    #[serde(default = "default_hash_rates")]
    pub hash_rates: Vec<HashRate>,
}

/// Presentation settings shared by every report.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Currency symbol prefixed to money labels (e.g. "$").
    pub currency_code: String,
    /// Extra text appended to titles and artifact names.
    pub title_suffix: String,
    /// Print each chart's series to the terminal after computing it.
    pub show_plots: bool,
    /// Directory the chart artifacts are written to.
    pub output_dir: String,
}

/// Fee and tax assumptions used for break-even and profit calculations.
///
/// All rates are fractions: 0.029 corresponds to 2.9%.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeeSchedule {
    /// Sales tax paid by the reseller when buying at MSRP.
    pub tax_rate: Decimal,
    /// Platform fee for sellers with a store subscription.
    pub store_fee_rate: Decimal,
    /// Platform fee for casual sellers.
    pub non_store_fee_rate: Decimal,
    /// Platform fee assumed for the estimated break-even line.
    pub estimated_platform_fee_rate: Decimal,
    /// Best-case platform fee, used for the minimum break-even line.
    pub minimum_platform_fee_rate: Decimal,
    pub payment_fee_rate: Decimal,
    pub payment_flat_fee: Decimal,
    /// Effective discount on MSRP (cash back etc.) for the minimum break-even line.
    pub msrp_discount: Decimal,
}

/// Trend line drawn over the daily median series of the sales report.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TrendSettings {
    /// `None` disables the trend line.
    pub kind: Option<TrendKind>,
    /// `[projection_days]` for linear, `[degree, projection_days]` for
    /// polynomial, `[window]` for rolling.
    pub param: Vec<f64>,
}

/// Where the crypto comparison report gets its daily closes from.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PriceFeedSettings {
    pub base_url: String,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HashRate {
    pub pattern: String,
    /// Mega-hashes per second.
    pub rate: Decimal,
}

// --- Default Implementations ---

impl Default for Config {
    fn default() -> Self {
        Self {
            report: ReportSettings::default(),
            fees: FeeSchedule::default(),
            trend: TrendSettings::default(),
            brand_list: Vec::new(),
            price_feed: PriceFeedSettings::default(),
            hash_rates: default_hash_rates(),
        }
    }
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            currency_code: "$".to_string(),
            title_suffix: String::new(),
            show_plots: false,
            output_dir: "Images".to_string(),
        }
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            tax_rate: dec!(0.0625),
            store_fee_rate: dec!(0.0915),
            non_store_fee_rate: dec!(0.1),
            estimated_platform_fee_rate: dec!(0.1),
            minimum_platform_fee_rate: dec!(0.036),
            payment_fee_rate: dec!(0.029),
            payment_flat_fee: dec!(0.30),
            msrp_discount: dec!(0.05),
        }
    }
}

impl Default for PriceFeedSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.binance.com".to_string(),
            symbol: "ETHUSDT".to_string(),
        }
    }
}

/// Ethereum hash rates of the cards the crypto comparison was built for.
/// More specific patterns come first, since the first match wins.
fn default_hash_rates() -> Vec<HashRate> {
    [
        ("3060 Ti", dec!(59)),
        ("3060", dec!(37.5)),
        ("3070", dec!(59)),
        ("3080 Ti", dec!(64)),
        ("3080", dec!(100)),
        ("3090", dec!(111)),
    ]
    .into_iter()
    .map(|(pattern, rate)| HashRate {
        pattern: pattern.to_string(),
        rate,
    })
    .collect()
}

impl Config {
    /// Looks up the hash rate for an item label; items without a match count as 1.
    pub fn hash_rate_for(&self, item_label: &str) -> Decimal {
        self.hash_rates
            .iter()
            .find(|h| item_label.contains(&h.pattern))
            .map(|h| h.rate)
            .unwrap_or(Decimal::ONE)
    }
}
