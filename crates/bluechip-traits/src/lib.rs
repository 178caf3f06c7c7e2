#![doc(issue_tracker_base_url = "https://github.com/factordynamics/bluechip/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types and trait definitions for the bluechip dividend screener.
//!
//! This crate provides the shared vocabulary of the workspace: dated dividend
//! and price observations, ticker records, the error taxonomy, the
//! [`MarketDataProvider`] abstraction and the statistics primitives used by the
//! valuation model.

/// The version of the bluechip-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod error;
pub mod provider;
pub mod stats;
pub mod types;

// Re-exports
pub use error::{BlueChipError, Result};
pub use provider::MarketDataProvider;
pub use types::{
    Date, DividendEvent, DividendSeries, PriceBar, PriceSeries, Quarter, Symbol, TickerHistory,
    TickerRecord,
};
