//! # Salescope Reports
//!
//! Turns record sets into chart payloads and writes each chart as a JSON artifact.
//!
//! ## Architectural Principles
//!
//! - **Layer 3 Orchestration:** Each report module has a pure `build` function
//!   over the analytics crate. `Reporter` adds the side effects: logging
//!   notices, naming and writing artifacts.
//! - **Read-only configuration:** The `Config` is owned by the `Reporter` and
//!   never mutated; every call sees the same fee schedule and presentation settings.
//! - **Independent reports:** An error fails only the report that raised it.
//!   The price feed is only touched by the crypto comparison.
//!
//! ## Public API
//!
//! - `Reporter`: one method per report, each returning `Generated<T>`.
//! - `sales`, `profits`, `comparison`, `crypto`, `sellers`, `brands`: report types and builders.
//! - `ReportError`: failures surfaced to the binary.

pub mod artifact;
pub mod brands;
pub mod chart;
pub mod comparison;
pub mod crypto;
pub mod error;
pub mod profits;
pub mod sales;
pub mod sellers;

pub use artifact::ArtifactWriter;
pub use brands::BrandReport;
pub use comparison::ComparisonReport;
pub use crypto::CryptoReport;
pub use error::ReportError;
pub use profits::{ProfitReport, ProfitSummary};
pub use sales::SalesReport;
pub use sellers::SellerReport;

use analytics::{MetricEngine, Notice};
use api_client::PriceFeed;
use chrono::NaiveDate;
use configuration::settings::Config;
use core_types::{RecordSet, Statistic};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// A finished report together with the artifact files written for it.
#[derive(Debug, Clone)]
pub struct Generated<T> {
    pub report: T,
    pub artifacts: Vec<PathBuf>,
}

/// Builds reports with one configuration and writes their artifacts.
#[derive(Debug, Clone)]
pub struct Reporter {
    config: Config,
    engine: MetricEngine,
    artifacts: ArtifactWriter,
}

impl Reporter {
    pub fn new(config: Config) -> Self {
        let engine = MetricEngine::new(config.fees.clone());
        let artifacts = ArtifactWriter::new(&config.report.output_dir);
        Self {
            config,
            engine,
            artifacts,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Sold prices over time for one search query.
    pub fn sales_report(
        &self,
        query: &str,
        msrp: Decimal,
        set: &RecordSet,
    ) -> Result<Generated<SalesReport>, ReportError> {
        let report = sales::build(&self.engine, &self.config, query, msrp, set)?;
        log_notices(&report.notices);
        let path = self
            .artifacts
            .write(&sales::artifact_name(query, &self.config), "sales", &report)?;

        tracing::info!(
            query,
            median = %report.summary.median_price,
            total_sold = report.summary.total_sold,
            "Sales report complete."
        );
        Ok(Generated {
            report,
            artifacts: vec![path],
        })
    }

    /// Cumulative sales and the platform, payment and reseller shares.
    pub fn profit_report(
        &self,
        title: &str,
        msrp: Decimal,
        set: &RecordSet,
    ) -> Result<Generated<ProfitReport>, ReportError> {
        let report = profits::build(&self.engine, title, msrp, set);
        log_notices(&report.notices);
        let path = self
            .artifacts
            .write(&profits::artifact_name(title), "profits", &report)?;

        match &report.summary {
            Some(summary) => tracing::info!(
                title,
                platform = %summary.platform,
                payment = %summary.payment,
                seller = %summary.seller,
                "Profit report complete."
            ),
            None => tracing::info!(title, "Profit report complete without a profit split."),
        }
        Ok(Generated {
            report,
            artifacts: vec![path],
        })
    }

    /// Several items on one chart, scaled to MSRP and in currency.
    pub fn comparison_report(
        &self,
        sets: &[RecordSet],
        title: &str,
        statistic: Statistic,
        roll: usize,
        stdev_band: bool,
    ) -> Result<Generated<ComparisonReport>, ReportError> {
        let report = comparison::build(&self.engine, &self.config, sets, title, statistic, roll, stdev_band);
        log_notices(&report.notices);

        let percent = self
            .artifacts
            .write(&report.percent_msrp.title, "comparison", &report.percent_msrp)?;
        let currency = self
            .artifacts
            .write(&report.currency.title, "comparison", &report.currency)?;

        tracing::info!(
            title,
            statistic = statistic.label(),
            items = report.currency.items.len(),
            skipped = report.skipped_items.len(),
            "Comparison report complete."
        );
        Ok(Generated {
            report,
            artifacts: vec![percent, currency],
        })
    }

    /// Item prices per unit of hash rate against the normalized coin price.
    pub async fn crypto_report(
        &self,
        sets: &[RecordSet],
        title: &str,
        start: NaiveDate,
        end: NaiveDate,
        roll: usize,
        feed: &dyn PriceFeed,
    ) -> Result<Generated<CryptoReport>, ReportError> {
        let report = crypto::build(&self.engine, &self.config, sets, title, start, end, roll, feed).await?;
        log_notices(&report.notices);
        let path = self.artifacts.write(&report.title, "crypto", &report)?;
        Ok(Generated {
            report,
            artifacts: vec![path],
        })
    }

    /// Units sold by seller feedback tier and by seller sales-count tier.
    pub fn seller_report(
        &self,
        sets: &[RecordSet],
        title_text: &str,
    ) -> Result<Generated<SellerReport>, ReportError> {
        let report = sellers::build(&self.config, sets, title_text);
        log_notices(&report.notices);

        let feedback = self
            .artifacts
            .write(&report.feedback.title, "sellers", &report.feedback)?;
        let sales_count = self
            .artifacts
            .write(&report.sales_count.title, "sellers", &report.sales_count)?;

        tracing::info!(
            total = report.feedback.breakdown.total,
            "Seller report complete."
        );
        Ok(Generated {
            report,
            artifacts: vec![feedback, sales_count],
        })
    }

    /// Per-brand statistics and the brand median price as a share of MSRP.
    pub fn brand_report(
        &self,
        sets: &[RecordSet],
        title: &str,
        roll: usize,
    ) -> Result<Generated<BrandReport>, ReportError> {
        let report = brands::build(&self.config, sets, title, roll);
        log_notices(&report.notices);
        for row in &report.stats {
            tracing::info!(
                item = %row.item,
                brand = %row.brand,
                listings = row.listings,
                mean = %row.mean_price,
                total = %row.total_price,
                "Brand statistics."
            );
        }
        let path = self.artifacts.write(&report.title, "brands", &report)?;
        Ok(Generated {
            report,
            artifacts: vec![path],
        })
    }
}

fn log_notices(notices: &[Notice]) {
    for notice in notices {
        notice.log();
    }
}
