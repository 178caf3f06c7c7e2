#![doc(issue_tracker_base_url = "https://github.com/factordynamics/bluechip/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # bluechip
//!
//! Blue chip dividend screener and dividend yield valuation model.
//!
//! bluechip is an umbrella crate that re-exports all bluechip sub-crates for
//! convenience: screen a universe of tickers for long, uninterrupted and
//! growing dividend records, then value the survivors against their own
//! historical dividend yield band.
//!
//! ## Quick Start
//!
//! ```ignore
//! use bluechip::fmp::{FmpClient, FmpProvider};
//! use bluechip::screen::{PipelineConfig, ScreeningCriteria, ScreeningPipeline};
//!
//! # async fn example(universe: Vec<bluechip::TickerRecord>, today: bluechip::Date) -> bluechip::Result<()> {
//! let provider = FmpProvider::new(FmpClient::from_env()?, today);
//! let pipeline = ScreeningPipeline::new(&ScreeningCriteria::default(), PipelineConfig::default())?;
//! let result = pipeline.run_filter(&universe, &provider).await?;
//! println!("{} blue chips", result.accepted.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`traits`] - Shared types, errors and the [`MarketDataProvider`] trait
//! - [`screen`] - Screening criteria and the pipeline
//! - [`value`] - Yield band, fair values and price trend
//! - [`fmp`] - Financial Modeling Prep data provider
//!
//! ## Architecture
//!
//! 1. **Providers** supply dividend, price and ownership data per symbol
//! 2. **Criteria** run in order and stop at the first rejection
//! 3. **The pipeline** isolates per-symbol failures and paces provider calls
//! 4. **Valuation profiles** turn a ticker's history into a yield band, fair
//!    value prices and annual trend slopes

/// Version information for the bluechip crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Core Types
// ============================================================================

/// Core types and traits.
///
/// # Example
///
/// ```ignore
/// use bluechip::traits::{DividendSeries, MarketDataProvider};
/// ```
pub mod traits {
    pub use bluechip_traits::*;
}

pub use bluechip_traits::{
    BlueChipError, Date, DividendEvent, DividendSeries, MarketDataProvider, PriceBar, PriceSeries,
    Quarter, Result, Symbol, TickerHistory, TickerRecord,
};

// ============================================================================
// Screening
// ============================================================================

/// Blue chip screening.
///
/// The default criterion chain, in order:
///
/// - **has_dividend_history**: at least one dividend was ever paid
/// - **share_count**: enough shares outstanding
/// - **institutional_ownership**: enough holders and a large enough held
///   fraction of the float
/// - **dividend_continuity**: no more than the allowed number of quarters
///   without a payment
/// - **dividend_growth**: enough dividend increases in the lookback window
/// - **quality_rating** / **earnings_growth**: pass-through hooks
pub mod screen {
    pub use bluechip_screen::*;
}

pub use bluechip_screen::{PipelineConfig, ScreeningCriteria, ScreeningPipeline, ScreeningResult};

// ============================================================================
// Valuation
// ============================================================================

/// Dividend yield valuation and price trend.
///
/// The yield band is read from annual aggregates:
///
/// ```text
/// high_yield_y = dividends_y / low_close_y
/// low_yield_y  = dividends_y / high_close_y
/// ```
///
/// The undervalue yield is a high quantile of the largest high yields, the
/// overvalue yield a low quantile of the smallest low yields. Fair value
/// prices divide each year's dividends by these two yields.
pub mod value {
    pub use bluechip_value::*;
}

pub use bluechip_value::{ValuationConfig, ValuationProfile, ValuationZone, YieldBand};

// ============================================================================
// Data Providers
// ============================================================================

/// Financial Modeling Prep (FMP) market data.
///
/// ## Setup
///
/// 1. Get an API key at <https://financialmodelingprep.com/>
/// 2. Set the `FMP_API_KEY` environment variable or add it to `.env`
pub mod fmp {
    pub use bluechip_fmp::*;
}

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```ignore
/// use bluechip::prelude::*;
/// ```
pub mod prelude {
    pub use crate::screen::{Criterion, CriterionOutcome, Metric};
    pub use crate::{
        BlueChipError, Date, DividendSeries, MarketDataProvider, PipelineConfig, PriceSeries,
        Result, ScreeningCriteria, ScreeningPipeline, TickerHistory, TickerRecord,
        ValuationConfig, ValuationProfile,
    };
}
