//! Dividend continuity: did the symbol pay in every elapsed quarter?
//!
//! Quarters are compared after an explicit timezone normalization step. A
//! calendar date is interpreted as local midnight on the listing exchange,
//! converted to UTC, and only then bucketed into a [`Quarter`]. Expected
//! quarters (taken at their quarter-end date) and observed dividend dates go
//! through the same conversion, so on an exchange east of UTC a payment on the
//! first day of a quarter is attributed to the previous one.

use bluechip_traits::types::years_back;
use bluechip_traits::{Date, Quarter};
use chrono::{NaiveTime, TimeZone};
use std::collections::BTreeSet;

/// Quarter of `date` taken at local midnight in `tz`, normalized to UTC.
pub fn quarter_of_local_date<Tz: TimeZone>(date: Date, tz: &Tz) -> Quarter {
    let utc_date = tz
        .from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
        .map_or(date, |dt| dt.naive_utc().date());
    Quarter::of(utc_date)
}

/// Quarters whose quarter-end date lies within
/// `[end_date - window_years, end_date]`, minus the excluded years.
///
/// Only elapsed quarters are returned: the quarter containing `end_date` is
/// included only if `end_date` is its last day.
pub fn expected_quarters<Tz: TimeZone>(
    end_date: Date,
    window_years: u32,
    excluded_years: &BTreeSet<i32>,
    tz: &Tz,
) -> BTreeSet<Quarter> {
    let start_date = years_back(end_date, window_years);
    let mut quarters = BTreeSet::new();

    let mut quarter = Quarter::of(start_date);
    loop {
        let quarter_end = quarter.end_date();
        if quarter_end > end_date {
            break;
        }
        if quarter_end >= start_date {
            quarters.insert(quarter_of_local_date(quarter_end, tz));
        }
        quarter = quarter.next();
    }

    quarters.retain(|q| !excluded_years.contains(&q.year));
    quarters
}

/// Outcome of a continuity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuityReport {
    /// Number of quarters in which a dividend was expected.
    pub expected_quarters: usize,
    /// Expected quarters without any dividend, in ascending order.
    pub missing_quarters: Vec<Quarter>,
    /// Missing-quarter count at which the check fails.
    pub allowed_missing_quarters: usize,
}

impl ContinuityReport {
    /// Whether the dividend history counts as uninterrupted.
    ///
    /// No gap always passes. Otherwise the check fails once the number of
    /// gaps reaches `allowed_missing_quarters`.
    #[must_use]
    pub fn passed(&self) -> bool {
        let missing = self.missing_quarters.len();
        missing == 0 || missing < self.allowed_missing_quarters
    }

    /// Missing quarters formatted as `2009Q1, 2009Q2`.
    #[must_use]
    pub fn missing_summary(&self) -> String {
        self.missing_quarters
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Compare the quarters of a window against the quarters with dividends.
pub fn check_continuity<Tz, I>(
    dividend_dates: I,
    end_date: Date,
    window_years: u32,
    excluded_years: &BTreeSet<i32>,
    allowed_missing_quarters: usize,
    tz: &Tz,
) -> ContinuityReport
where
    Tz: TimeZone,
    I: IntoIterator<Item = Date>,
{
    let expected = expected_quarters(end_date, window_years, excluded_years, tz);
    let observed: BTreeSet<Quarter> = dividend_dates
        .into_iter()
        .map(|d| quarter_of_local_date(d, tz))
        .collect();

    ContinuityReport {
        expected_quarters: expected.len(),
        missing_quarters: expected.difference(&observed).copied().collect(),
        allowed_missing_quarters,
    }
}
