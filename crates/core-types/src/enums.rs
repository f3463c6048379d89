use serde::{Deserialize, Serialize};

/// The shape of the trend line drawn over the daily median price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum TrendKind {
    /// A degree-1 least-squares fit, projected forward.
    Linear,
    /// A least-squares polynomial of configurable degree, projected forward.
    Polynomial,
    /// A simple moving average over the historical range only.
    Rolling,
}

/// The per-date statistic used when several items are compared on one chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    #[default]
    Median,
    Mean,
}

impl Statistic {
    pub fn label(&self) -> &'static str {
        match self {
            Statistic::Median => "Median",
            Statistic::Mean => "Mean",
        }
    }
}
