//! Dividend criteria: history present, continuity and growth.

use super::{Criterion, CriterionOutcome, Metric, SymbolContext};
use crate::continuity::check_continuity;
use crate::trend::check_trend;
use async_trait::async_trait;
use bluechip_traits::{BlueChipError, Result};
use std::collections::BTreeSet;

/// Rejects symbols that never paid a dividend.
#[derive(Debug, Clone, Copy, Default)]
pub struct HasDividendHistory;

#[async_trait]
impl Criterion for HasDividendHistory {
    fn name(&self) -> &str {
        "has_dividend_history"
    }

    async fn evaluate(&self, ctx: &SymbolContext<'_>) -> Result<CriterionOutcome> {
        let dividends = match ctx.dividends().await {
            Ok(dividends) => dividends,
            Err(BlueChipError::NoDividendHistory(_)) => {
                return Ok(CriterionOutcome::fail("no dividend history", None));
            }
            Err(e) => return Err(e),
        };

        let metric = Some(Metric::DividendPayments {
            count: dividends.len(),
        });
        if dividends.is_empty() {
            Ok(CriterionOutcome::fail("no dividend history", metric))
        } else {
            Ok(CriterionOutcome::pass(metric))
        }
    }
}

/// Requires a dividend in every elapsed quarter of the continuity window.
#[derive(Debug, Clone)]
pub struct DividendContinuity {
    window_years: u32,
    allowed_missing_quarters: usize,
    excluded_years: BTreeSet<i32>,
}

impl DividendContinuity {
    /// Create the criterion.
    #[must_use]
    pub const fn new(
        window_years: u32,
        allowed_missing_quarters: usize,
        excluded_years: BTreeSet<i32>,
    ) -> Self {
        Self {
            window_years,
            allowed_missing_quarters,
            excluded_years,
        }
    }
}

#[async_trait]
impl Criterion for DividendContinuity {
    fn name(&self) -> &str {
        "dividend_continuity"
    }

    async fn evaluate(&self, ctx: &SymbolContext<'_>) -> Result<CriterionOutcome> {
        let dividends = ctx.dividends().await?;
        let tz = ctx.provider().exchange_timezone(ctx.symbol()).await?;

        let report = check_continuity(
            dividends.dates(),
            ctx.record().end_date,
            self.window_years,
            &self.excluded_years,
            self.allowed_missing_quarters,
            &tz,
        );
        let metric = Some(Metric::DividendContinuity {
            expected_quarters: report.expected_quarters,
            missing_quarters: report.missing_quarters.len(),
        });

        if report.passed() {
            Ok(CriterionOutcome::pass(metric))
        } else {
            Ok(CriterionOutcome::fail(
                format!("missing dividends in {}", report.missing_summary()),
                metric,
            ))
        }
    }
}

/// Requires enough dividend raises, and optionally no cut, in the lookback.
#[derive(Debug, Clone, Copy)]
pub struct DividendGrowth {
    lookback_years: u32,
    min_increases: usize,
    veto_on_decrease: bool,
}

impl DividendGrowth {
    /// Create the criterion.
    #[must_use]
    pub const fn new(lookback_years: u32, min_increases: usize, veto_on_decrease: bool) -> Self {
        Self {
            lookback_years,
            min_increases,
            veto_on_decrease,
        }
    }
}

#[async_trait]
impl Criterion for DividendGrowth {
    fn name(&self) -> &str {
        "dividend_growth"
    }

    async fn evaluate(&self, ctx: &SymbolContext<'_>) -> Result<CriterionOutcome> {
        let dividends = ctx.dividends().await?;
        let report = check_trend(
            dividends,
            ctx.record().end_date,
            self.lookback_years,
            self.min_increases,
            self.veto_on_decrease,
        );
        let metric = Some(Metric::DividendChanges {
            increases: report.increases,
            decreases: report.decreases,
        });

        if report.passed() {
            return Ok(CriterionOutcome::pass(metric));
        }
        let reason = if report.increases < report.min_increases {
            format!(
                "{} dividend increases in {} years, {} required",
                report.increases, self.lookback_years, report.min_increases
            )
        } else {
            format!(
                "{} dividend decreases in {} years",
                report.decreases, self.lookback_years
            )
        };
        Ok(CriterionOutcome::fail(reason, metric))
    }
}
