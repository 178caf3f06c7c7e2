//! Blue chip screening for the bluechip dividend screener.
//!
//! This crate decides which symbols of a universe count as blue chips:
//! - Analyzers: dividend continuity per quarter, dividend trend, size and
//!   ownership thresholds
//! - Criteria: the analyzers wrapped as pluggable [`Criterion`] values
//! - Pipeline: the ordered criterion chain with per-symbol fault isolation,
//!   bounded rate-limit retry and quota pauses
//!
//! # Example
//!
//! ```ignore
//! use bluechip_screen::{PipelineConfig, ScreeningCriteria, ScreeningPipeline};
//!
//! let pipeline = ScreeningPipeline::new(&ScreeningCriteria::default(), PipelineConfig::default())?;
//! let result = pipeline.run_filter(&universe, &provider).await?;
//! for symbol in result.accepted_symbols() {
//!     println!("{symbol}");
//! }
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod continuity;
pub mod criteria;
pub mod ownership;
pub mod pipeline;
pub mod registry;
pub mod retry;
pub mod trend;

// Re-export key types
pub use config::{PipelineConfig, ScreeningCriteria};
pub use continuity::{ContinuityReport, check_continuity};
pub use criteria::{Criterion, CriterionOutcome, Metric, SymbolContext};
pub use pipeline::{
    AcceptedTicker, CancellationToken, Rejection, ScreeningPipeline, ScreeningResult, Skip,
    SymbolState, run_filter,
};
pub use registry::{CriterionCategory, CriterionInfo, available_criteria, default_chain};
pub use retry::{Backoff, RetryPolicy};
pub use trend::{TrendReport, check_trend};
