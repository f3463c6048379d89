use api_client::PriceFeed;
use api_client::error::ApiError;
use async_trait::async_trait;
use chrono::NaiveDate;
use configuration::settings::Config;
use core_types::{RecordSet, SaleRecord, Statistic};
use reports::{ReportError, Reporter};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Mutex;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 6, d).unwrap()
}

fn sale(item: &str, msrp: Decimal, d: u32, price: Decimal) -> SaleRecord {
    SaleRecord {
        sold_date: day(d),
        total_price: price,
        shipping: dec!(10),
        quantity: 1,
        is_store_seller: false,
        seller_name: Some("seller".to_string()),
        seller_feedback_score: Some(42),
        brand: Some("Acme".to_string()),
        msrp_reference: Some(msrp),
        item_label: item.to_string(),
    }
}

fn reporter(dir: &tempfile::TempDir) -> Reporter {
    let mut config = Config::default();
    config.report.output_dir = dir.path().display().to_string();
    config.brand_list = vec!["Acme".to_string()];
    Reporter::new(config)
}

/// Serves a fixed series and remembers the range it was asked for.
struct FixedFeed {
    closes: Vec<(NaiveDate, Decimal)>,
    requested: Mutex<Option<(String, NaiveDate, NaiveDate)>>,
}

#[async_trait]
impl PriceFeed for FixedFeed {
    async fn fetch_daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, Decimal)>, ApiError> {
        *self.requested.lock().unwrap() = Some((symbol.to_string(), start, end));
        Ok(self.closes.clone())
    }
}

struct BrokenFeed;

#[async_trait]
impl PriceFeed for BrokenFeed {
    async fn fetch_daily_closes(
        &self,
        _symbol: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<(NaiveDate, Decimal)>, ApiError> {
        Err(ApiError::Exchange(-1121, "Invalid symbol.".to_string()))
    }
}

#[test]
fn sales_report_writes_named_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let set = RecordSet::new(vec![sale("RTX 3080", dec!(700), 1, dec!(1500)), sale("RTX 3080", dec!(700), 2, dec!(1400))]);

    let generated = reporter(&dir).sales_report("RTX+3080", dec!(700), &set).unwrap();

    assert_eq!(generated.artifacts, vec![dir.path().join("RTX+3080.json")]);
    assert!(generated.artifacts[0].exists());
    assert_eq!(generated.report.summary.total_sold, 2);
    assert_eq!(generated.report.summary.median_price, dec!(1450));
}

#[test]
fn comparison_report_writes_both_charts() {
    let dir = tempfile::tempdir().unwrap();
    let sets = vec![
        RecordSet::new(vec![sale("RTX 3080", dec!(700), 1, dec!(1400))]),
        RecordSet::new(vec![sale("RTX 3090", dec!(1500), 1, dec!(3000))]),
    ];

    let generated = reporter(&dir)
        .comparison_report(&sets, "GPUs", Statistic::Median, 0, false)
        .unwrap();

    assert_eq!(
        generated.artifacts,
        vec![dir.path().join("GPUs - % MSRP.json"), dir.path().join("GPUs - $.json")]
    );
    assert_eq!(generated.report.percent_msrp.items.len(), 2);
}

#[test]
fn seller_and_brand_reports_write_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let sets = vec![RecordSet::new(
        (1..=12).map(|d| sale("RTX 3080", dec!(700), d, dec!(1400))).collect(),
    )];
    let reporter = reporter(&dir);

    let sellers = reporter.seller_report(&sets, "RTX+3080").unwrap();
    assert_eq!(sellers.artifacts.len(), 2);
    assert!(dir.path().join("RTX 3080 Seller Feedback vs Quantity Sold.json").exists());

    let brands = reporter.brand_report(&sets, "GPU Brands", 3).unwrap();
    assert_eq!(brands.artifacts, vec![dir.path().join("GPU Brands 3 Day Rolling Average.json")]);
    assert_eq!(brands.report.lines.len(), 1);
    assert_eq!(brands.report.lines[0].points[0].1, dec!(200));
}

#[tokio::test]
async fn crypto_report_uses_feed_over_covered_range() {
    let dir = tempfile::tempdir().unwrap();
    let sets = vec![RecordSet::new(vec![
        sale("RTX 3080", dec!(700), 1, dec!(1000)),
        sale("RTX 3080", dec!(700), 2, dec!(1000)),
        sale("RTX 3080", dec!(700), 20, dec!(5000)),
    ])];
    let feed = FixedFeed {
        closes: vec![(day(1), dec!(2000)), (day(2), dec!(4000))],
        requested: Mutex::new(None),
    };

    let generated = reporter(&dir)
        .crypto_report(&sets, "Mining", day(1), day(10), 0, &feed)
        .await
        .unwrap();

    let requested = feed.requested.lock().unwrap().clone().unwrap();
    assert_eq!(requested, ("ETHUSDT".to_string(), NaiveDate::from_ymd_opt(2021, 5, 31).unwrap(), day(2)));

    let item = &generated.report.items[0];
    assert_eq!(item.hash_rate, dec!(100));
    // 1000 / 100 / 1 and 1000 / 100 / 2
    assert_eq!(item.line.points, vec![(day(1), dec!(10)), (day(2), dec!(5))]);
    assert_eq!(generated.artifacts, vec![dir.path().join("Mining - % MSRP.json")]);
}

#[tokio::test]
async fn feed_failure_only_fails_the_crypto_report() {
    let dir = tempfile::tempdir().unwrap();
    let sets = vec![RecordSet::new(vec![sale("RTX 3080", dec!(700), 1, dec!(1000))])];
    let reporter = reporter(&dir);

    let result = reporter
        .crypto_report(&sets, "Mining", day(1), day(10), 0, &BrokenFeed)
        .await;
    assert!(matches!(
        result,
        Err(ReportError::ExternalFeedFailure(ApiError::Exchange(-1121, _)))
    ));

    assert!(reporter.profit_report("RTX 3080", dec!(700), &sets[0]).is_ok());
}

#[test]
fn invalid_fees_fail_only_the_sales_report() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.report.output_dir = dir.path().display().to_string();
    config.fees.minimum_platform_fee_rate = dec!(0.971);
    let reporter = Reporter::new(config);
    let set = RecordSet::new(vec![sale("RTX 3080", dec!(700), 1, dec!(1000))]);

    assert!(matches!(
        reporter.sales_report("RTX+3080", dec!(700), &set),
        Err(ReportError::Analytics(_))
    ));
    assert!(reporter.profit_report("RTX 3080", dec!(700), &set).is_ok());
}
