//! Error types for the bluechip workspace.
//!
//! Every failure that can happen while screening or modelling a single symbol
//! is expressed as a [`BlueChipError`]. The pipeline inspects the variant to
//! decide whether a symbol is retried, skipped, or whether the whole run has
//! to stop.

use thiserror::Error;

/// The main error type for bluechip operations.
#[derive(Debug, Error)]
pub enum BlueChipError {
    /// The symbol has never paid a dividend.
    #[error("No dividend history for {0}")]
    NoDividendHistory(String),

    /// Holder tables or share counts are missing from the provider response.
    #[error("Insufficient ownership data: {0}")]
    InsufficientOwnershipData(String),

    /// The provider asked us to slow down. Recoverable after a cool-down.
    #[error("Rate limited by market data provider")]
    RateLimited,

    /// The provider could not deliver data for the symbol.
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// A time series could not be parsed or violates its invariants.
    #[error("Malformed time series: {0}")]
    MalformedTimeSeries(String),

    /// Not enough observations to compute a meaningful statistic.
    #[error("Insufficient sample size for {what}: required {required}, got {actual}")]
    InsufficientSampleSize {
        /// What was being computed.
        what: String,
        /// Minimum number of observations.
        required: usize,
        /// Observations available.
        actual: usize,
    },

    /// Criteria or pipeline settings are out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The screening universe contains no symbols.
    #[error("Screening universe is empty")]
    EmptyUniverse,

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl BlueChipError {
    /// Whether the failure is a rate-limit signal that warrants a retry.
    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited)
    }

    /// Whether the failure stops a whole screening run rather than one symbol.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::InvalidConfig(_) | Self::EmptyUniverse)
    }
}

/// A specialized Result type for bluechip operations.
pub type Result<T> = std::result::Result<T, BlueChipError>;
