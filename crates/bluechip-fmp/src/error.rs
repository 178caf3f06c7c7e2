//! Error types for FMP API client.

use bluechip_traits::BlueChipError;
use thiserror::Error;

/// Errors that can occur when using the FMP API.
#[derive(Debug, Error)]
pub enum FmpError {
    /// Missing API key.
    #[error("FMP_API_KEY environment variable not set")]
    MissingApiKey,

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("Failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error.
    #[error("FMP API error: {0}")]
    Api(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Symbol not found.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// No data available.
    #[error("No data available for {0}")]
    NoData(String),

    /// A date field could not be parsed.
    #[error("Invalid date '{0}'")]
    InvalidDate(String),

    /// Environment variable error.
    #[error("Environment error: {0}")]
    Env(#[from] dotenvy::Error),
}

impl From<FmpError> for BlueChipError {
    fn from(err: FmpError) -> Self {
        let text = err.to_string();
        match err {
            FmpError::RateLimitExceeded => Self::RateLimited,
            FmpError::Request(ref e)
                if e.status() == Some(reqwest::StatusCode::TOO_MANY_REQUESTS) =>
            {
                Self::RateLimited
            }
            FmpError::Json(_) | FmpError::InvalidDate(_) => Self::MalformedTimeSeries(text),
            FmpError::MissingApiKey | FmpError::Env(_) => Self::InvalidConfig(text),
            FmpError::Request(_)
            | FmpError::Api(_)
            | FmpError::SymbolNotFound(_)
            | FmpError::NoData(_) => Self::DataUnavailable(text),
        }
    }
}
