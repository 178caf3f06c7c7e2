//! Criterion registry: metadata for listing criteria and the default chain.

use crate::config::ScreeningCriteria;
use crate::criteria::{
    Criterion, DividendContinuity, DividendGrowth, EarningsGrowth, HasDividendHistory,
    InstitutionalOwnership, QualityRating, ShareCount,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Criterion category classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CriterionCategory {
    /// Dividend history criteria
    Dividend,
    /// Company size and ownership criteria
    Ownership,
    /// Fundamental criteria without a data source yet
    Fundamental,
}

impl CriterionCategory {
    /// Get a human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &str {
        match self {
            Self::Dividend => "Dividend payment history, continuity and growth",
            Self::Ownership => "Shares outstanding and institutional ownership",
            Self::Fundamental => "Quality rating and earnings (placeholders, always pass)",
        }
    }
}

/// Metadata about a criterion.
#[derive(Debug, Clone, Serialize)]
pub struct CriterionInfo {
    /// Name reported in rejections
    pub name: &'static str,

    /// Category classification
    pub category: CriterionCategory,

    /// Human-readable description
    pub description: &'static str,

    /// Provider calls made by the criterion
    pub requires: &'static [&'static str],

    /// Whether the criterion is a placeholder that always passes
    pub placeholder: bool,
}

/// All criteria of the default chain, in evaluation order.
#[must_use]
pub fn available_criteria() -> Vec<CriterionInfo> {
    vec![
        CriterionInfo {
            name: "has_dividend_history",
            category: CriterionCategory::Dividend,
            description: "At least one dividend on record",
            requires: &["dividend_history"],
            placeholder: false,
        },
        CriterionInfo {
            name: "share_count",
            category: CriterionCategory::Ownership,
            description: "Minimum number of shares outstanding",
            requires: &["share_count"],
            placeholder: false,
        },
        CriterionInfo {
            name: "institutional_ownership",
            category: CriterionCategory::Ownership,
            description: "Minimum institutional holders and fraction of float held",
            requires: &["institutional_holder_count", "institutional_float_fraction"],
            placeholder: false,
        },
        CriterionInfo {
            name: "dividend_continuity",
            category: CriterionCategory::Dividend,
            description: "A dividend in every elapsed quarter of the window",
            requires: &["dividend_history", "exchange_timezone"],
            placeholder: false,
        },
        CriterionInfo {
            name: "dividend_growth",
            category: CriterionCategory::Dividend,
            description: "Enough dividend raises and no cut within the lookback",
            requires: &["dividend_history"],
            placeholder: false,
        },
        CriterionInfo {
            name: "quality_rating",
            category: CriterionCategory::Fundamental,
            description: "Credit or quality rating",
            requires: &[],
            placeholder: true,
        },
        CriterionInfo {
            name: "earnings_growth",
            category: CriterionCategory::Fundamental,
            description: "Earnings growth",
            requires: &[],
            placeholder: true,
        },
    ]
}

/// Get information about a specific criterion by name.
#[must_use]
pub fn get_criterion_info(name: &str) -> Option<CriterionInfo> {
    available_criteria()
        .into_iter()
        .find(|info| info.name == name)
}

/// Get all criteria in a specific category.
#[must_use]
pub fn criteria_by_category(category: &CriterionCategory) -> Vec<CriterionInfo> {
    available_criteria()
        .into_iter()
        .filter(|info| &info.category == category)
        .collect()
}

/// Build the default criterion chain from screening thresholds.
///
/// Cheap checks run before the ones that need the full dividend history and
/// exchange timezone; the placeholders run last.
#[must_use]
pub fn default_chain(criteria: &ScreeningCriteria) -> Vec<Arc<dyn Criterion>> {
    vec![
        Arc::new(HasDividendHistory),
        Arc::new(ShareCount::new(criteria.min_shares)),
        Arc::new(InstitutionalOwnership::new(
            criteria.min_institutional_holders,
            criteria.min_float_held_fraction,
        )),
        Arc::new(DividendContinuity::new(
            criteria.uninterrupted_dividend_years,
            criteria.allowed_missing_quarters,
            criteria.excluded_years.clone(),
        )),
        Arc::new(DividendGrowth::new(
            criteria.dividend_lookback_years,
            criteria.min_dividend_increases,
            criteria.veto_on_dividend_decrease,
        )),
        Arc::new(QualityRating),
        Arc::new(EarningsGrowth),
    ]
}
