//! Size and ownership criteria.

use super::{Criterion, CriterionOutcome, Metric, SymbolContext};
use crate::ownership::{check_institutional_ownership, check_shares};
use async_trait::async_trait;
use bluechip_traits::Result;

/// Requires a minimum number of shares outstanding.
#[derive(Debug, Clone, Copy)]
pub struct ShareCount {
    min_shares: u64,
}

impl ShareCount {
    /// Create the criterion.
    #[must_use]
    pub const fn new(min_shares: u64) -> Self {
        Self { min_shares }
    }
}

#[async_trait]
impl Criterion for ShareCount {
    fn name(&self) -> &str {
        "share_count"
    }

    async fn evaluate(&self, ctx: &SymbolContext<'_>) -> Result<CriterionOutcome> {
        let shares = ctx.provider().share_count(ctx.symbol()).await?;
        let metric = Some(Metric::SharesOutstanding { shares });

        if check_shares(shares, self.min_shares) {
            Ok(CriterionOutcome::pass(metric))
        } else {
            Ok(CriterionOutcome::fail(
                format!("{shares} shares outstanding, {} required", self.min_shares),
                metric,
            ))
        }
    }
}

/// Requires broad and deep institutional ownership.
#[derive(Debug, Clone, Copy)]
pub struct InstitutionalOwnership {
    min_holders: u64,
    min_float_fraction: f64,
}

impl InstitutionalOwnership {
    /// Create the criterion.
    #[must_use]
    pub const fn new(min_holders: u64, min_float_fraction: f64) -> Self {
        Self {
            min_holders,
            min_float_fraction,
        }
    }
}

#[async_trait]
impl Criterion for InstitutionalOwnership {
    fn name(&self) -> &str {
        "institutional_ownership"
    }

    async fn evaluate(&self, ctx: &SymbolContext<'_>) -> Result<CriterionOutcome> {
        let holders = ctx.provider().institutional_holder_count(ctx.symbol()).await?;
        let float_fraction = ctx
            .provider()
            .institutional_float_fraction(ctx.symbol())
            .await?;
        let metric = Some(Metric::InstitutionalOwnership {
            holders,
            float_fraction,
        });

        if check_institutional_ownership(
            holders,
            float_fraction,
            self.min_holders,
            self.min_float_fraction,
        ) {
            Ok(CriterionOutcome::pass(metric))
        } else {
            Ok(CriterionOutcome::fail(
                format!(
                    "{holders} institutional holders with {:.1}% of float, {} holders and {:.1}% required",
                    float_fraction * 100.0,
                    self.min_holders,
                    self.min_float_fraction * 100.0
                ),
                metric,
            ))
        }
    }
}
