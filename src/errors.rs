//! Centralised error type for the exporter.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("HTTP error fetching {0}: {1}")]
    Fetch(String, #[source] reqwest::Error),

    #[error("Unexpected status {status} from {endpoint}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
    },

    #[error("Could not decode response from {0}: {1}")]
    Decode(String, #[source] reqwest::Error),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Upload error: {0}")]
    Upload(String),
}
