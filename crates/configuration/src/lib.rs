use crate::error::ConfigError;
use crate::settings::Config;
use rust_decimal::Decimal;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{FeeSchedule, HashRate, PriceFeedSettings, ReportSettings, TrendSettings};

/// Prefix for environment overrides, e.g. `SALESCOPE__FEES__TAX_RATE=0.07`.
const ENV_PREFIX: &str = "SALESCOPE";

/// Loads the application configuration from `config.toml` in the working directory.
///
/// A missing file is not an error: every section falls back to its defaults.
pub fn load_config() -> Result<Config, ConfigError> {
    build(config::File::with_name("config.toml").required(false))
}

/// Loads the application configuration from an explicit file, which must exist.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    build(config::File::from(path).required(true))
}

fn build<S>(file: S) -> Result<Config, ConfigError>
where
    S: config::Source + Send + Sync + 'static,
{
    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;

    tracing::debug!(
        currency = %config.report.currency_code,
        tax_rate = %config.fees.tax_rate,
        "Configuration loaded."
    );
    Ok(config)
}

/// Rejects values that would make every report meaningless.
///
/// Fee combinations that only break a single formula (a zero break-even
/// denominator) are left to the analytics layer, which reports them per report.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let fees = &config.fees;
    if fees.tax_rate < Decimal::ZERO {
        return Err(ConfigError::ValidationError(format!(
            "fees.tax_rate must be >= 0, got {}",
            fees.tax_rate
        )));
    }

    let rates = [
        ("fees.store_fee_rate", fees.store_fee_rate),
        ("fees.non_store_fee_rate", fees.non_store_fee_rate),
        ("fees.estimated_platform_fee_rate", fees.estimated_platform_fee_rate),
        ("fees.minimum_platform_fee_rate", fees.minimum_platform_fee_rate),
        ("fees.payment_fee_rate", fees.payment_fee_rate),
        ("fees.msrp_discount", fees.msrp_discount),
    ];
    for (name, rate) in rates {
        if rate < Decimal::ZERO || rate > Decimal::ONE {
            return Err(ConfigError::ValidationError(format!(
                "{name} must be within [0, 1], got {rate}"
            )));
        }
    }
    if fees.payment_flat_fee < Decimal::ZERO {
        return Err(ConfigError::ValidationError(format!(
            "fees.payment_flat_fee must be >= 0, got {}",
            fees.payment_flat_fee
        )));
    }

    if config.report.output_dir.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "report.output_dir must not be empty".to_string(),
        ));
    }

    if let Some(bad) = config.hash_rates.iter().find(|h| h.rate <= Decimal::ZERO) {
        return Err(ConfigError::ValidationError(format!(
            "hash rate for '{}' must be positive, got {}",
            bad.pattern, bad.rate
        )));
    }

    Ok(())
}
