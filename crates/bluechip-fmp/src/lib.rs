//! Financial Modeling Prep (FMP) market data for bluechip.
//!
//! [`FmpClient`] wraps the endpoints the screener needs (dividends, share
//! counts, 13F ownership summaries, company profiles, daily prices and
//! exchange listings). [`FmpProvider`] adapts the client to
//! [`bluechip_traits::MarketDataProvider`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use bluechip_fmp::{FmpClient, FmpProvider};
//!
//! let provider = FmpProvider::new(FmpClient::from_env()?, today);
//! let shares = provider.share_count("KO").await?;
//! ```
//!
//! # Environment Variables
//!
//! Set `FMP_API_KEY` in your environment or `.env` file:
//!
//! ```bash
//! FMP_API_KEY=your_api_key_here
//! ```

mod client;
mod error;
mod exchange;
mod provider;
mod types;

pub use client::FmpClient;
pub use error::FmpError;
pub use exchange::exchange_offset;
pub use provider::{FmpProvider, latest_filed_quarter};
pub use types::*;

/// Result type for FMP operations.
pub type Result<T> = std::result::Result<T, FmpError>;
