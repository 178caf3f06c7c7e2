//! Dividend yield valuation and price trend model for bluechip.
//!
//! Given the dividend and price history of a ticker, this crate estimates:
//! - the yield band: the historically low (overvalued) and high
//!   (undervalued) dividend yields
//! - fair value prices implied by the band for each dividend year
//! - the per-year linear trend of weekly mean closes
//!
//! [`ValuationProfile`] computes all of it in one step and exposes polars
//! frames for reporting.
//!
//! # Example
//!
//! ```ignore
//! use bluechip_value::{ValuationConfig, ValuationProfile};
//!
//! let profile = ValuationProfile::build(&history, &ValuationConfig::default())?;
//! println!("{:.2}% - {:.2}%", profile.band().overvalue_yield * 100.0, profile.band().undervalue_yield * 100.0);
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod annual;
pub mod fair_value;
pub mod profile;
pub mod regression;
pub mod yield_band;

// Re-export key types
pub use annual::{AnnualAggregate, PriceExtreme, annual_aggregates};
pub use fair_value::{FairValuePoint, FairValueSeries, reconstruct_prices};
pub use profile::{ValuationProfile, ValuationZone};
pub use regression::{AnnualTrend, TrendPoint, compute_annual_trend};
pub use yield_band::{AnnualYield, ValuationConfig, YieldBand, YieldHistory, build_yield_band};
