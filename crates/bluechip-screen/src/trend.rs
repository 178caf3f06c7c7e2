//! Dividend trend: count raises and cuts within a trailing window.

use bluechip_traits::types::years_back;
use bluechip_traits::{Date, DividendSeries};

/// Default trailing window for counting dividend changes.
pub const DEFAULT_LOOKBACK_YEARS: u32 = 12;

/// Dividend changes found in the lookback window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendReport {
    /// Consecutive payments that were strictly higher than the previous one.
    pub increases: usize,
    /// Consecutive payments that were strictly lower than the previous one.
    pub decreases: usize,
    /// Increases required to pass.
    pub min_increases: usize,
    /// Whether a single decrease fails the check.
    pub veto_on_decrease: bool,
}

impl TrendReport {
    /// Whether the trend meets the thresholds.
    #[must_use]
    pub const fn passed(&self) -> bool {
        if self.increases < self.min_increases {
            return false;
        }
        !(self.veto_on_decrease && self.decreases > 0)
    }
}

/// Count strictly positive and strictly negative changes between consecutive
/// payments. Unchanged payments count as neither.
#[must_use]
pub fn count_changes(amounts: &[f64]) -> (usize, usize) {
    amounts
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold((0, 0), |(up, down), diff| {
            if diff > 0.0 {
                (up + 1, down)
            } else if diff < 0.0 {
                (up, down + 1)
            } else {
                (up, down)
            }
        })
}

/// Check the dividend trend over `[end_date - lookback_years, end_date]`.
#[must_use]
pub fn check_trend(
    dividends: &DividendSeries,
    end_date: Date,
    lookback_years: u32,
    min_increases: usize,
    veto_on_decrease: bool,
) -> TrendReport {
    let window = dividends.window(years_back(end_date, lookback_years), end_date);
    let amounts: Vec<f64> = window.iter().map(|e| e.amount).collect();
    let (increases, decreases) = count_changes(&amounts);

    TrendReport {
        increases,
        decreases,
        min_increases,
        veto_on_decrease,
    }
}
