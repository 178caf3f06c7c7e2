//! Screening pipeline: runs the criterion chain over a universe of symbols.
//!
//! Symbols are evaluated one at a time. Each symbol moves through
//! [`SymbolState`]:
//!
//! ```text
//! Pending -> Evaluating{1} -> Accepted | Rejected | Skipped
//!            Evaluating{n} -> Evaluating{n+1}   (rate limited, after cool-down)
//! ```
//!
//! A failure to fetch data never aborts the run. Rate limits are retried up to
//! [`RetryPolicy::max_attempts`](crate::RetryPolicy) times, every other
//! error skips the symbol. Only an empty universe or an invalid configuration
//! is returned as an error.

use crate::config::{PipelineConfig, ScreeningCriteria};
use crate::criteria::{Criterion, EarningsGrowth, Metric, QualityRating, SymbolContext};
use crate::registry::default_chain;
use bluechip_traits::{BlueChipError, MarketDataProvider, Result, Symbol, TickerRecord};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, warn};

/// Cloneable flag that stops a run between two symbols.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Create a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. The current symbol is finished first.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A symbol that passed every criterion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceptedTicker {
    /// The ticker as it entered the pipeline.
    pub record: TickerRecord,
    /// Metrics computed by the criteria, keyed by criterion name.
    pub metrics: BTreeMap<String, Metric>,
}

/// A symbol that failed a criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    /// Ticker symbol.
    pub symbol: Symbol,
    /// First criterion that failed.
    pub criterion: String,
    /// Why it failed.
    pub reason: String,
}

/// A symbol abandoned because its data could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skip {
    /// Ticker symbol.
    pub symbol: Symbol,
    /// The error that stopped the evaluation.
    pub reason: String,
    /// Attempts made.
    pub attempts: u32,
}

/// Accepted symbols plus the log of a screening run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScreeningResult {
    /// Symbols that passed every criterion.
    pub accepted: HashMap<Symbol, AcceptedTicker>,
    /// Symbols rejected by a criterion, in processing order.
    pub rejected: Vec<Rejection>,
    /// Symbols skipped after a fetch error, in processing order.
    pub skipped: Vec<Skip>,
    /// Number of symbols that reached a final state.
    pub processed: usize,
    /// Whether the run stopped early on a cancellation request.
    pub cancelled: bool,
}

impl ScreeningResult {
    /// Accepted symbols in alphabetical order.
    #[must_use]
    pub fn accepted_symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.accepted.keys().map(String::as_str).collect();
        symbols.sort_unstable();
        symbols
    }

    fn record(&mut self, symbol: &str, state: SymbolState) {
        self.processed += 1;
        match state {
            SymbolState::Accepted(ticker) => {
                self.accepted.insert(symbol.to_string(), ticker);
            }
            SymbolState::Rejected { criterion, reason } => self.rejected.push(Rejection {
                symbol: symbol.to_string(),
                criterion,
                reason,
            }),
            SymbolState::Skipped { reason, attempts } => self.skipped.push(Skip {
                symbol: symbol.to_string(),
                reason,
                attempts,
            }),
            SymbolState::Pending | SymbolState::Evaluating { .. } => {}
        }
    }
}

/// Evaluation state of a single symbol.
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolState {
    /// Not evaluated yet.
    Pending,
    /// Criterion chain running; `attempt` is 1-based.
    Evaluating {
        /// Current attempt.
        attempt: u32,
    },
    /// Passed every criterion.
    Accepted(AcceptedTicker),
    /// Failed a criterion.
    Rejected {
        /// Name of the failing criterion.
        criterion: String,
        /// Why it failed.
        reason: String,
    },
    /// Abandoned after a fetch error.
    Skipped {
        /// The error.
        reason: String,
        /// Attempts made.
        attempts: u32,
    },
}

impl SymbolState {
    /// Whether the state is final.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Accepted(_) | Self::Rejected { .. } | Self::Skipped { .. }
        )
    }
}

/// Ordered criterion chain with fault isolation, retry and quota pauses.
#[derive(Debug, Clone)]
pub struct ScreeningPipeline {
    criteria: Vec<Arc<dyn Criterion>>,
    config: PipelineConfig,
}

impl ScreeningPipeline {
    /// Build the default chain for the given thresholds.
    ///
    /// # Errors
    ///
    /// Returns [`BlueChipError::InvalidConfig`] if a threshold or scheduling
    /// setting is out of range.
    pub fn new(criteria: &ScreeningCriteria, config: PipelineConfig) -> Result<Self> {
        criteria.validate()?;
        Self::with_criteria(default_chain(criteria), config)
    }

    /// Build a pipeline around an explicit criterion chain.
    ///
    /// # Errors
    ///
    /// Returns [`BlueChipError::InvalidConfig`] for invalid scheduling settings
    /// or an empty chain.
    pub fn with_criteria(criteria: Vec<Arc<dyn Criterion>>, config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        if criteria.is_empty() {
            return Err(BlueChipError::InvalidConfig(
                "criterion chain is empty".to_string(),
            ));
        }
        Ok(Self {
            criteria,
            config,
        })
    }

    /// Replace the quality rating placeholder.
    #[must_use]
    pub fn with_quality_rating(self, criterion: Arc<dyn Criterion>) -> Self {
        self.replace(QualityRating.name(), criterion)
    }

    /// Replace the earnings growth placeholder.
    #[must_use]
    pub fn with_earnings_growth(self, criterion: Arc<dyn Criterion>) -> Self {
        self.replace(EarningsGrowth.name(), criterion)
    }

    fn replace(mut self, name: &str, criterion: Arc<dyn Criterion>) -> Self {
        match self.criteria.iter().position(|c| c.name() == name) {
            Some(i) => self.criteria[i] = criterion,
            None => self.criteria.push(criterion),
        }
        self
    }

    /// Names of the criteria in evaluation order.
    #[must_use]
    pub fn criterion_names(&self) -> Vec<&str> {
        self.criteria.iter().map(|c| c.name()).collect()
    }

    /// Screen a universe of symbols.
    ///
    /// # Errors
    ///
    /// Returns [`BlueChipError::EmptyUniverse`] if `universe` is empty and
    /// [`BlueChipError::InvalidConfig`] if the provider reports a setup error.
    /// Data errors for individual symbols are recorded in the result instead.
    pub async fn run_filter(
        &self,
        universe: &[TickerRecord],
        provider: &dyn MarketDataProvider,
    ) -> Result<ScreeningResult> {
        self.run_filter_with_cancel(universe, provider, &CancellationToken::new())
            .await
    }

    /// Screen a universe, stopping between symbols once `cancel` is set.
    ///
    /// # Errors
    ///
    /// Same as [`run_filter`](Self::run_filter).
    pub async fn run_filter_with_cancel(
        &self,
        universe: &[TickerRecord],
        provider: &dyn MarketDataProvider,
        cancel: &CancellationToken,
    ) -> Result<ScreeningResult> {
        if universe.is_empty() {
            return Err(BlueChipError::EmptyUniverse);
        }

        info!(
            symbols = universe.len(),
            criteria = self.criteria.len(),
            "Starting blue chip screen"
        );
        let mut result = ScreeningResult::default();

        for (i, record) in universe.iter().enumerate() {
            if cancel.is_cancelled() {
                warn!(processed = result.processed, "Screen cancelled");
                result.cancelled = true;
                break;
            }

            let state = self.evaluate_symbol(record, provider).await?;
            result.record(&record.symbol, state);

            let done = i + 1;
            if done % self.config.batch_size == 0 && done < universe.len() {
                info!(
                    processed = done,
                    pause_secs = self.config.batch_pause_secs,
                    "Pausing to respect provider quota"
                );
                tokio::time::sleep(self.config.batch_pause()).await;
            }
        }

        info!(
            accepted = result.accepted.len(),
            rejected = result.rejected.len(),
            skipped = result.skipped.len(),
            cancelled = result.cancelled,
            "Screen finished"
        );
        Ok(result)
    }

    /// Drive one symbol from `Pending` to a final state.
    ///
    /// # Errors
    ///
    /// Only fatal errors (see [`BlueChipError::is_fatal`]) are returned; every
    /// other failure ends in [`SymbolState::Skipped`].
    pub async fn evaluate_symbol(
        &self,
        record: &TickerRecord,
        provider: &dyn MarketDataProvider,
    ) -> Result<SymbolState> {
        let symbol = record.symbol.as_str();
        let mut state = SymbolState::Pending;

        while !state.is_terminal() {
            state = match state {
                SymbolState::Pending => SymbolState::Evaluating { attempt: 1 },
                SymbolState::Evaluating { attempt } => {
                    match self.evaluate_chain(record, provider).await {
                        Ok(done) => done,
                        Err(e) if e.is_rate_limited() && self.config.retry.allows_retry(attempt) => {
                            let cool_down = self.config.retry.cool_down(attempt);
                            warn!(
                                symbol,
                                attempt,
                                cool_down_ms = cool_down.as_millis() as u64,
                                "Rate limited, retrying after cool-down"
                            );
                            tokio::time::sleep(cool_down).await;
                            SymbolState::Evaluating {
                                attempt: attempt + 1,
                            }
                        }
                        Err(e) if e.is_fatal() => {
                            error!(symbol, error = %e, "Aborting screen");
                            return Err(e);
                        }
                        Err(e) => {
                            warn!(symbol, attempt, error = %e, "Skipping symbol");
                            SymbolState::Skipped {
                                reason: e.to_string(),
                                attempts: attempt,
                            }
                        }
                    }
                }
                terminal => terminal,
            };
        }
        Ok(state)
    }

    /// Run the chain once, from scratch.
    async fn evaluate_chain(
        &self,
        record: &TickerRecord,
        provider: &dyn MarketDataProvider,
    ) -> Result<SymbolState> {
        let ctx = SymbolContext::new(record, provider);
        let mut metrics = BTreeMap::new();

        for criterion in &self.criteria {
            let outcome = criterion.evaluate(&ctx).await?;
            if !outcome.passed {
                let reason = outcome.reason.unwrap_or_default();
                info!(
                    symbol = %record.symbol,
                    criterion = criterion.name(),
                    %reason,
                    "Rejected"
                );
                return Ok(SymbolState::Rejected {
                    criterion: criterion.name().to_string(),
                    reason,
                });
            }
            debug!(symbol = %record.symbol, criterion = criterion.name(), "Passed");
            if let Some(metric) = outcome.metric {
                metrics.insert(criterion.name().to_string(), metric);
            }
        }

        let mut record = record.clone();
        if record.first_trade_date.is_none() {
            match provider.first_trade_date(&record.symbol).await {
                Ok(date) => record.first_trade_date = date,
                Err(e) => debug!(symbol = %record.symbol, error = %e, "First trade date unavailable"),
            }
        }

        info!(symbol = %record.symbol, "Accepted");
        Ok(SymbolState::Accepted(AcceptedTicker { record, metrics }))
    }
}

/// Screen a universe with the default chain and scheduling settings.
///
/// # Errors
///
/// Returns [`BlueChipError::EmptyUniverse`] for an empty universe and
/// [`BlueChipError::InvalidConfig`] for out-of-range thresholds.
pub async fn run_filter(
    universe: &[TickerRecord],
    criteria: &ScreeningCriteria,
    provider: &dyn MarketDataProvider,
) -> Result<ScreeningResult> {
    ScreeningPipeline::new(criteria, PipelineConfig::default())?
        .run_filter(universe, provider)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::testing::{MockProvider, MockSymbol};
    use crate::criteria::CriterionOutcome;
    use crate::retry::RetryPolicy;
    use async_trait::async_trait;
    use bluechip_traits::Date;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

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

    fn fast_config(batch_size: usize) -> PipelineConfig {
        PipelineConfig {
            batch_size,
            batch_pause_secs: 30,
            retry: RetryPolicy::fixed(3, Duration::from_secs(10)),
        }
    }

    fn pipeline(config: PipelineConfig) -> ScreeningPipeline {
        ScreeningPipeline::new(&ScreeningCriteria::default(), config).unwrap()
    }

    #[tokio::test]
    async fn test_blue_chip_is_accepted_with_metrics() {
        let provider =
            MockProvider::new().with_symbol("KO", MockSymbol::blue_chip(2000, 2024, 6));
        let result = pipeline(fast_config(100))
            .run_filter(&[record("KO")], &provider)
            .await
            .unwrap();

        assert_eq!(result.accepted_symbols(), vec!["KO"]);
        let ticker = &result.accepted["KO"];
        assert_eq!(ticker.record, record("KO"));
        assert_eq!(
            ticker.metrics["share_count"],
            Metric::SharesOutstanding { shares: 10_000_000 }
        );
        assert_eq!(
            ticker.metrics["dividend_continuity"],
            Metric::DividendContinuity {
                expected_quarters: 96,
                missing_quarters: 0
            }
        );
        assert!(!ticker.metrics.contains_key("quality_rating"));
        assert_eq!(result.processed, 1);
        assert!(!result.cancelled);
    }

    #[tokio::test]
    async fn test_small_company_rejected_before_continuity() {
        let mut small = MockSymbol::blue_chip(2000, 2024, 6);
        small.shares = 1_000_000;
        let provider = MockProvider::new().with_symbol("SMALL", small);

        let result = pipeline(fast_config(100))
            .run_filter(&[record("SMALL")], &provider)
            .await
            .unwrap();

        assert!(result.accepted.is_empty());
        assert_eq!(result.rejected.len(), 1);
        assert_eq!(result.rejected[0].criterion, "share_count");
        assert_eq!(provider.timezone_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_is_retried_from_scratch() {
        let provider = MockProvider::new()
            .with_symbol("KO", MockSymbol::blue_chip(2000, 2024, 6))
            .rate_limited(2);

        let start = tokio::time::Instant::now();
        let result = pipeline(fast_config(100))
            .run_filter(&[record("KO")], &provider)
            .await
            .unwrap();

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(20) && elapsed < Duration::from_secs(21));
        assert!(result.accepted.contains_key("KO"));
        assert_eq!(provider.dividend_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_skip_symbol() {
        let provider = MockProvider::new()
            .with_symbol("KO", MockSymbol::blue_chip(2000, 2024, 6))
            .with_symbol("PG", MockSymbol::blue_chip(2000, 2024, 6))
            .rate_limited(3);

        let result = pipeline(fast_config(100))
            .run_filter(&[record("KO"), record("PG")], &provider)
            .await
            .unwrap();

        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].symbol, "KO");
        assert_eq!(result.skipped[0].attempts, 3);
        assert_eq!(result.accepted_symbols(), vec!["PG"]);
        assert_eq!(result.processed, 2);
    }

    #[tokio::test]
    async fn test_data_error_skips_without_retry() {
        let mut broken = MockSymbol::blue_chip(2000, 2024, 6);
        broken.broken = true;
        let provider = MockProvider::new()
            .with_symbol("BAD", broken)
            .with_symbol("KO", MockSymbol::blue_chip(2000, 2024, 6));

        let result = pipeline(fast_config(100))
            .run_filter(&[record("BAD"), record("MISSING"), record("KO")], &provider)
            .await
            .unwrap();

        assert_eq!(result.skipped.len(), 2);
        assert!(result.skipped.iter().all(|s| s.attempts == 1));
        assert_eq!(result.accepted_symbols(), vec!["KO"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_pause_not_after_last_symbol() {
        let mut provider = MockProvider::new();
        let mut universe = Vec::new();
        for symbol in ["A", "B", "C", "D"] {
            provider = provider.with_symbol(symbol, MockSymbol::blue_chip(2000, 2024, 6));
            universe.push(record(symbol));
        }

        let start = tokio::time::Instant::now();
        let result = pipeline(fast_config(2))
            .run_filter(&universe, &provider)
            .await
            .unwrap();

        assert_eq!(result.accepted.len(), 4);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(30) && elapsed < Duration::from_secs(31));
    }

    #[tokio::test]
    async fn test_empty_universe_is_fatal() {
        let provider = MockProvider::new();
        let err = pipeline(fast_config(100))
            .run_filter(&[], &provider)
            .await
            .unwrap_err();
        assert!(matches!(err, BlueChipError::EmptyUniverse));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let criteria = ScreeningCriteria {
            min_float_held_fraction: -0.1,
            ..Default::default()
        };
        let err = ScreeningPipeline::new(&criteria, PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, BlueChipError::InvalidConfig(_)));

        let err = ScreeningPipeline::new(&ScreeningCriteria::default(), fast_config(0)).unwrap_err();
        assert!(matches!(err, BlueChipError::InvalidConfig(_)));
    }

    /// Cancels the run the first time it is evaluated.
    #[derive(Debug)]
    struct CancelAfterFirst {
        token: CancellationToken,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Criterion for CancelAfterFirst {
        fn name(&self) -> &str {
            "quality_rating"
        }

        async fn evaluate(&self, _ctx: &SymbolContext<'_>) -> Result<CriterionOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.token.cancel();
            Ok(CriterionOutcome::pass(None))
        }
    }

    #[tokio::test]
    async fn test_cancellation_returns_partial_result() {
        let provider = MockProvider::new()
            .with_symbol("KO", MockSymbol::blue_chip(2000, 2024, 6))
            .with_symbol("PG", MockSymbol::blue_chip(2000, 2024, 6));
        let token = CancellationToken::new();
        let quality = Arc::new(CancelAfterFirst {
            token: token.clone(),
            calls: AtomicUsize::new(0),
        });
        let pipeline = pipeline(fast_config(100)).with_quality_rating(quality.clone());
        let universe = [record("KO"), record("PG")];

        let result = pipeline
            .run_filter_with_cancel(&universe, &provider, &token)
            .await
            .unwrap();

        assert!(result.cancelled);
        assert_eq!(result.processed, 1);
        assert_eq!(result.accepted_symbols(), vec!["KO"]);
        assert_eq!(quality.calls.load(Ordering::SeqCst), 1);

        // A later run with its own token is not affected.
        let rerun = pipeline.run_filter(&universe, &provider).await.unwrap();
        assert!(!rerun.cancelled);
        assert_eq!(rerun.processed, 2);
        assert_eq!(rerun.accepted_symbols(), vec!["KO", "PG"]);
    }

    #[tokio::test]
    async fn test_missing_ownership_data_skips_symbol() {
        let mut unknown = MockSymbol::blue_chip(2000, 2024, 6);
        unknown.ownership_reported = false;
        let provider = MockProvider::new()
            .with_symbol("NOHOLD", unknown)
            .with_symbol("KO", MockSymbol::blue_chip(2000, 2024, 6));

        let result = pipeline(fast_config(100))
            .run_filter(&[record("NOHOLD"), record("KO")], &provider)
            .await
            .unwrap();

        assert!(result.rejected.is_empty());
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].symbol, "NOHOLD");
        assert!(result.skipped[0].reason.contains("ownership"));
        assert_eq!(result.accepted_symbols(), vec!["KO"]);
    }

    #[tokio::test]
    async fn test_accepted_record_gets_first_trade_date() {
        let mut listed = MockSymbol::blue_chip(2000, 2024, 6);
        listed.first_trade = Date::from_ymd_opt(1919, 9, 5);
        let provider = MockProvider::new().with_symbol("KO", listed);

        let result = pipeline(fast_config(100))
            .run_filter(&[record("KO")], &provider)
            .await
            .unwrap();

        let accepted = &result.accepted["KO"].record;
        assert_eq!(accepted.first_trade_date, Date::from_ymd_opt(1919, 9, 5));
        assert_eq!(accepted.start_date, record("KO").start_date);
    }

    #[tokio::test]
    async fn test_provider_setup_error_aborts_run() {
        let provider = MockProvider::new()
            .with_symbol("KO", MockSymbol::blue_chip(2000, 2024, 6))
            .misconfigured();

        let err = pipeline(fast_config(100))
            .run_filter(&[record("KO"), record("PG")], &provider)
            .await
            .unwrap_err();
        assert!(matches!(err, BlueChipError::InvalidConfig(_)));
        assert_eq!(provider.dividend_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_placeholder_substitution_keeps_order() {
        let pipeline = pipeline(PipelineConfig::default()).with_earnings_growth(Arc::new(
            CancelAfterFirst {
                token: CancellationToken::new(),
                calls: AtomicUsize::new(0),
            },
        ));
        let names = pipeline.criterion_names();
        assert_eq!(names.len(), 7);
        assert_eq!(names[0], "has_dividend_history");
        assert_eq!(names[6], "quality_rating");
    }

    #[tokio::test]
    async fn test_free_run_filter_uses_defaults() {
        let provider =
            MockProvider::new().with_symbol("KO", MockSymbol::blue_chip(2000, 2024, 6));
        let result = run_filter(&[record("KO")], &ScreeningCriteria::default(), &provider)
            .await
            .unwrap();
        assert_eq!(result.accepted.len(), 1);
    }
}
