use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Analytics calculation error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),

    #[error("External price feed failed: {0}")]
    ExternalFeedFailure(#[from] api_client::error::ApiError),

    #[error("Failed to write chart artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize chart artifact: {0}")]
    Serialization(#[from] serde_json::Error),
}
