//! Screening thresholds and pipeline scheduling settings.

use crate::retry::RetryPolicy;
use crate::trend::DEFAULT_LOOKBACK_YEARS;
use bluechip_traits::{BlueChipError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// Thresholds a symbol has to meet to count as a blue chip.
///
/// Every field has a default, so a partial JSON document only needs to name
/// the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreeningCriteria {
    /// Minimum number of shares outstanding (default: 5,000,000)
    pub min_shares: u64,

    /// Minimum number of institutions holding the symbol (default: 80)
    pub min_institutional_holders: u64,

    /// Minimum fraction of the float held by institutions (default: 0.5)
    pub min_float_held_fraction: f64,

    /// Years of dividends checked for continuity (default: 25)
    pub uninterrupted_dividend_years: u32,

    /// Missing quarters at which continuity fails (default: 1, i.e. no gaps)
    pub allowed_missing_quarters: usize,

    /// Minimum number of dividend increases within the lookback (default: 5)
    pub min_dividend_increases: usize,

    /// Lookback window for counting dividend changes (default: 12 years)
    pub dividend_lookback_years: u32,

    /// Reject on any dividend decrease within the lookback (default: true)
    pub veto_on_dividend_decrease: bool,

    /// Calendar years ignored by the continuity check (default: 2020)
    pub excluded_years: BTreeSet<i32>,
}

impl Default for ScreeningCriteria {
    fn default() -> Self {
        Self {
            min_shares: 5_000_000,
            min_institutional_holders: 80,
            min_float_held_fraction: 0.5,
            uninterrupted_dividend_years: 25,
            allowed_missing_quarters: 1,
            min_dividend_increases: 5,
            dividend_lookback_years: DEFAULT_LOOKBACK_YEARS,
            veto_on_dividend_decrease: true,
            excluded_years: BTreeSet::from([2020]),
        }
    }
}

impl ScreeningCriteria {
    /// Check that every threshold is in range.
    ///
    /// # Errors
    ///
    /// Returns [`BlueChipError::InvalidConfig`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_float_held_fraction) {
            return Err(BlueChipError::InvalidConfig(format!(
                "min_float_held_fraction must be within [0, 1], got {}",
                self.min_float_held_fraction
            )));
        }
        if self.uninterrupted_dividend_years == 0 {
            return Err(BlueChipError::InvalidConfig(
                "uninterrupted_dividend_years must be positive".to_string(),
            ));
        }
        if self.dividend_lookback_years == 0 {
            return Err(BlueChipError::InvalidConfig(
                "dividend_lookback_years must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Scheduling policy of a screening run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of symbols processed between quota pauses (default: 100)
    pub batch_size: usize,

    /// Length of the quota pause in seconds (default: 60)
    pub batch_pause_secs: u64,

    /// Retry policy applied when the provider rate-limits a symbol
    pub retry: RetryPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            batch_pause_secs: 60,
            retry: RetryPolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// The quota pause as a [`Duration`].
    #[must_use]
    pub const fn batch_pause(&self) -> Duration {
        Duration::from_secs(self.batch_pause_secs)
    }

    /// Check that the scheduling settings are usable.
    ///
    /// # Errors
    ///
    /// Returns [`BlueChipError::InvalidConfig`] for a zero batch size or a
    /// retry policy without attempts.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(BlueChipError::InvalidConfig(
                "batch_size must be positive".to_string(),
            ));
        }
        self.retry.validate()
    }
}
