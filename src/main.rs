use anyhow::{Context, Result};
use api_client::BinanceClient;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use core_types::{RecordSet, Statistic};
use reports::Reporter;
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

mod output;

/// Directory the daily rolling log files are written to.
const LOG_DIR: &str = "logs";

#[tokio::main]
async fn main() -> Result<()> {
    // SALESCOPE__* overrides may live in a .env file; it is optional.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let _guard = init_tracing()?;

    let config = match &cli.config {
        Some(path) => configuration::load_config_from(path),
        None => configuration::load_config(),
    }
    .context("Failed to load configuration")?;

    let reporter = Reporter::new(config);
    let result = match cli.command {
        Commands::Sales(args) => handle_sales(&reporter, args),
        Commands::Profits(args) => handle_profits(&reporter, args),
        Commands::Compare(args) => handle_compare(&reporter, args),
        Commands::Crypto(args) => handle_crypto(&reporter, args).await,
        Commands::Sellers(args) => handle_sellers(&reporter, args),
        Commands::Brands(args) => handle_brands(&reporter, args),
    };

    if let Err(e) = &result {
        tracing::error!("Report failed: {:#}", e);
    }
    result
}

/// Logs to stderr and to a daily rolling file under `logs/`.
///
/// The returned guard must stay alive for the file writer to flush.
fn init_tracing() -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(LOG_DIR, "salescope.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .try_init()?;
    Ok(guard)
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Price, profit and seller analytics for sold marketplace listings.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults to `config.toml` if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sold prices over time for one search query, with break-even lines and trend.
    Sales(SalesArgs),
    /// Cumulative sales and the platform, payment and reseller profit shares.
    Profits(ProfitArgs),
    /// Compare several items as a share of MSRP and in currency.
    Compare(CompareArgs),
    /// Compare item price per hash rate with the normalized coin price.
    Crypto(CryptoArgs),
    /// Quantity sold by seller feedback and by seller sales count.
    Sellers(MultiArgs),
    /// Per-brand statistics and median price as a share of MSRP.
    Brands(BrandArgs),
}

#[derive(Parser)]
struct SalesArgs {
    /// The search query the listings were collected with (e.g., "RTX+3080-LHR").
    #[arg(long)]
    query: String,
    /// Reference price. Defaults to the MSRP recorded in the file.
    #[arg(long)]
    msrp: Option<Decimal>,
    /// JSON file of sold listings.
    file: PathBuf,
}

#[derive(Parser)]
struct ProfitArgs {
    /// Chart title.
    #[arg(long)]
    title: String,
    /// Reference price. Defaults to the MSRP recorded in the file.
    #[arg(long)]
    msrp: Option<Decimal>,
    /// JSON file of sold listings.
    file: PathBuf,
}

#[derive(Parser)]
struct CompareArgs {
    #[arg(long)]
    title: String,
    /// The per-date statistic to plot.
    #[arg(long, value_enum, default_value_t = Statistic::Median)]
    statistic: Statistic,
    /// Rolling average window in days; 0 disables smoothing.
    #[arg(long, default_value_t = 0)]
    roll: usize,
    /// Shade one standard deviation around mean lines.
    #[arg(long)]
    stdev_band: bool,
    /// One JSON file of sold listings per item.
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Parser)]
struct CryptoArgs {
    #[arg(long)]
    title: String,
    /// First sale date to include (format: YYYY-MM-DD).
    #[arg(long)]
    from: NaiveDate,
    /// Last sale date to include (format: YYYY-MM-DD).
    #[arg(long)]
    to: NaiveDate,
    #[arg(long, default_value_t = 0)]
    roll: usize,
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Parser)]
struct MultiArgs {
    /// Search query or title text; `+` becomes a space and filters after `-` are dropped.
    #[arg(long)]
    title: String,
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Parser)]
struct BrandArgs {
    #[arg(long)]
    title: String,
    #[arg(long, default_value_t = 0)]
    roll: usize,
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

// ==============================================================================
// Command Handlers
// ==============================================================================

fn load_one(path: &Path) -> Result<RecordSet> {
    dataset::load_record_set(path).with_context(|| format!("Failed to load {}", path.display()))
}

fn load_many(paths: &[PathBuf]) -> Result<Vec<RecordSet>> {
    dataset::load_record_sets(paths).context("Failed to load record files")
}

fn handle_sales(reporter: &Reporter, args: SalesArgs) -> Result<()> {
    let set = load_one(&args.file)?;
    let msrp = args.msrp.unwrap_or_else(|| set.msrp());
    let generated = reporter.sales_report(&args.query, msrp, &set)?;
    output::print_sales(reporter.config(), &generated.report);
    output::print_artifacts(&generated.artifacts);
    Ok(())
}

fn handle_profits(reporter: &Reporter, args: ProfitArgs) -> Result<()> {
    let set = load_one(&args.file)?;
    let msrp = args.msrp.unwrap_or_else(|| set.msrp());
    let generated = reporter.profit_report(&args.title, msrp, &set)?;
    output::print_profits(reporter.config(), &generated.report);
    output::print_artifacts(&generated.artifacts);
    Ok(())
}

fn handle_compare(reporter: &Reporter, args: CompareArgs) -> Result<()> {
    let sets = load_many(&args.files)?;
    let generated =
        reporter.comparison_report(&sets, &args.title, args.statistic, args.roll, args.stdev_band)?;
    output::print_comparison(reporter.config(), &generated.report);
    output::print_artifacts(&generated.artifacts);
    Ok(())
}

async fn handle_crypto(reporter: &Reporter, args: CryptoArgs) -> Result<()> {
    let sets = load_many(&args.files)?;
    let feed = BinanceClient::new(&reporter.config().price_feed)?;
    let generated = reporter
        .crypto_report(&sets, &args.title, args.from, args.to, args.roll, &feed)
        .await?;
    output::print_crypto(reporter.config(), &generated.report);
    output::print_artifacts(&generated.artifacts);
    Ok(())
}

fn handle_sellers(reporter: &Reporter, args: MultiArgs) -> Result<()> {
    let sets = load_many(&args.files)?;
    let generated = reporter.seller_report(&sets, &args.title)?;
    output::print_sellers(&generated.report);
    output::print_artifacts(&generated.artifacts);
    Ok(())
}

fn handle_brands(reporter: &Reporter, args: BrandArgs) -> Result<()> {
    let sets = load_many(&args.files)?;
    let generated = reporter.brand_report(&sets, &args.title, args.roll)?;
    output::print_brands(reporter.config(), &generated.report);
    output::print_artifacts(&generated.artifacts);
    Ok(())
}
