//! Stand-ins for criteria without a data source yet.
//!
//! Both always pass. Replace them through
//! [`ScreeningPipeline::with_quality_rating`](crate::ScreeningPipeline::with_quality_rating)
//! and
//! [`ScreeningPipeline::with_earnings_growth`](crate::ScreeningPipeline::with_earnings_growth).

use super::{Criterion, CriterionOutcome, SymbolContext};
use async_trait::async_trait;
use bluechip_traits::Result;

/// Credit or quality rating check.
#[derive(Debug, Clone, Copy, Default)]
pub struct QualityRating;

#[async_trait]
impl Criterion for QualityRating {
    fn name(&self) -> &str {
        "quality_rating"
    }

    async fn evaluate(&self, _ctx: &SymbolContext<'_>) -> Result<CriterionOutcome> {
        Ok(CriterionOutcome::pass(None))
    }

    fn is_placeholder(&self) -> bool {
        true
    }
}

/// Earnings growth check.
#[derive(Debug, Clone, Copy, Default)]
pub struct EarningsGrowth;

#[async_trait]
impl Criterion for EarningsGrowth {
    fn name(&self) -> &str {
        "earnings_growth"
    }

    async fn evaluate(&self, _ctx: &SymbolContext<'_>) -> Result<CriterionOutcome> {
        Ok(CriterionOutcome::pass(None))
    }

    fn is_placeholder(&self) -> bool {
        true
    }
}
