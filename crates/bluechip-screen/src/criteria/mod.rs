//! Screening criteria.
//!
//! A [`Criterion`] is one predicate of the blue chip screen. Criteria pull the
//! data they need through a [`SymbolContext`] and return an explicit
//! [`CriterionOutcome`]; they never modify the ticker record. The pipeline
//! collects the metrics of passing criteria into the accepted ticker.
//!
//! Categories:
//! - Dividend: history present, uninterrupted quarters, raises in the lookback
//! - Ownership: shares outstanding, institutional holders and float
//! - Placeholder: quality rating and earnings growth, which always pass until
//!   a real data source is plugged in

mod dividend;
mod ownership;
mod placeholder;

pub use dividend::{DividendContinuity, DividendGrowth, HasDividendHistory};
pub use ownership::{InstitutionalOwnership, ShareCount};
pub use placeholder::{EarningsGrowth, QualityRating};

use async_trait::async_trait;
use bluechip_traits::{DividendSeries, MarketDataProvider, Result, TickerRecord};
use serde::Serialize;
use tokio::sync::OnceCell;

/// A value computed by a criterion while evaluating a symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Metric {
    /// Number of dividend payments on record.
    DividendPayments {
        /// Payment count.
        count: usize,
    },
    /// Shares outstanding.
    SharesOutstanding {
        /// Share count.
        shares: u64,
    },
    /// Institutional ownership breadth and depth.
    InstitutionalOwnership {
        /// Number of institutional holders.
        holders: u64,
        /// Fraction of the float held by institutions.
        float_fraction: f64,
    },
    /// Quarter coverage of the continuity window.
    DividendContinuity {
        /// Quarters in which a dividend was expected.
        expected_quarters: usize,
        /// Quarters without a dividend.
        missing_quarters: usize,
    },
    /// Dividend changes within the lookback window.
    DividendChanges {
        /// Raises.
        increases: usize,
        /// Cuts.
        decreases: usize,
    },
}

/// Result of evaluating one criterion for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct CriterionOutcome {
    /// Whether the symbol passed.
    pub passed: bool,
    /// Why the symbol failed, if it did.
    pub reason: Option<String>,
    /// What the criterion measured.
    pub metric: Option<Metric>,
}

impl CriterionOutcome {
    /// A passing outcome carrying the measured value.
    #[must_use]
    pub const fn pass(metric: Option<Metric>) -> Self {
        Self {
            passed: true,
            reason: None,
            metric,
        }
    }

    /// A failing outcome with a reason.
    #[must_use]
    pub fn fail(reason: impl Into<String>, metric: Option<Metric>) -> Self {
        Self {
            passed: false,
            reason: Some(reason.into()),
            metric,
        }
    }
}

/// Per-symbol view handed to each criterion.
///
/// The dividend history is fetched at most once per evaluation attempt and
/// shared between the dividend criteria.
pub struct SymbolContext<'a> {
    record: &'a TickerRecord,
    provider: &'a dyn MarketDataProvider,
    dividends: OnceCell<DividendSeries>,
}

impl std::fmt::Debug for SymbolContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymbolContext")
            .field("symbol", &self.record.symbol)
            .field("dividends_loaded", &self.dividends.initialized())
            .finish()
    }
}

impl<'a> SymbolContext<'a> {
    /// Create a fresh context with nothing loaded yet.
    #[must_use]
    pub const fn new(record: &'a TickerRecord, provider: &'a dyn MarketDataProvider) -> Self {
        Self {
            record,
            provider,
            dividends: OnceCell::const_new(),
        }
    }

    /// The ticker being evaluated.
    #[must_use]
    pub const fn record(&self) -> &TickerRecord {
        self.record
    }

    /// Ticker symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.record.symbol
    }

    /// The market data provider.
    #[must_use]
    pub const fn provider(&self) -> &dyn MarketDataProvider {
        self.provider
    }

    /// The symbol's dividend history, fetched on first use.
    ///
    /// # Errors
    ///
    /// Propagates provider failures and rejects malformed histories.
    pub async fn dividends(&self) -> Result<&DividendSeries> {
        self.dividends
            .get_or_try_init(|| async {
                let events = self.provider.dividend_history(self.symbol()).await?;
                DividendSeries::new(events)
            })
            .await
    }
}

/// One predicate of the blue chip screen.
///
/// Implementations must be thread-safe so a pipeline can be shared.
#[async_trait]
pub trait Criterion: Send + Sync + std::fmt::Debug {
    /// Unique, stable name used in logs and rejection reports.
    fn name(&self) -> &str;

    /// Evaluate the criterion for the symbol behind `ctx`.
    ///
    /// # Errors
    ///
    /// Returns an error when the required data cannot be fetched. The pipeline
    /// retries rate-limit errors and skips the symbol on any other error.
    async fn evaluate(&self, ctx: &SymbolContext<'_>) -> Result<CriterionOutcome>;

    /// Whether this criterion is a stand-in that always passes.
    fn is_placeholder(&self) -> bool {
        false
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{MockProvider, MockSymbol};
    use super::*;
    use bluechip_traits::Date;
    use std::sync::atomic::Ordering;

    fn record(symbol: &str) -> TickerRecord {
        TickerRecord::new(
            symbol,
            symbol,
            "NYSE",
            Date::from_ymd_opt(1990, 1, 2).unwrap(),
            Date::from_ymd_opt(2025, 1, 15).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_context_fetches_dividends_once() {
        let provider = MockProvider::new().with_symbol("KO", MockSymbol::blue_chip(1990, 2024, 6));
        let record = record("KO");
        let ctx = SymbolContext::new(&record, &provider);

        let first = ctx.dividends().await.unwrap().len();
        let second = ctx.dividends().await.unwrap().len();
        assert_eq!(first, second);
        assert_eq!(provider.dividend_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_context_retries_after_failed_fetch() {
        let provider = MockProvider::new()
            .with_symbol("KO", MockSymbol::blue_chip(1990, 2024, 6))
            .rate_limited(1);
        let record = record("KO");
        let ctx = SymbolContext::new(&record, &provider);

        assert!(ctx.dividends().await.unwrap_err().is_rate_limited());
        assert!(ctx.dividends().await.is_ok());
    }

    #[test]
    fn test_outcome_constructors() {
        let ok = CriterionOutcome::pass(Some(Metric::SharesOutstanding { shares: 1 }));
        assert!(ok.passed);
        assert!(ok.reason.is_none());

        let bad = CriterionOutcome::fail("too small", None);
        assert!(!bad.passed);
        assert_eq!(bad.reason.as_deref(), Some("too small"));
    }

    #[test]
    fn test_criterion_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn Criterion>();
    }
}
