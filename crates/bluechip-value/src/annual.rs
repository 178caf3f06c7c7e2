//! Per-calendar-year aggregation of dividends and closing prices.

use bluechip_traits::{Date, DividendSeries, PriceSeries};
use chrono::Datelike;
use serde::Serialize;
use std::collections::BTreeMap;

/// Days between 0001-01-01 and 1970-01-01 in the proleptic Gregorian calendar.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Days since 1970-01-01, the physical encoding of a polars `Date`.
#[must_use]
pub fn epoch_days(date: Date) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

/// The extreme close of a year and the day it was reached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceExtreme {
    /// Trading day of the extreme. The first such day if it repeats.
    pub date: Date,
    /// Closing price.
    pub close: f64,
}

/// Dividends and price range of one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnnualAggregate {
    /// Calendar year.
    pub year: i32,
    /// Sum of the year's dividend payments.
    pub dividends: f64,
    /// Highest close.
    pub high: PriceExtreme,
    /// Lowest close.
    pub low: PriceExtreme,
}

impl AnnualAggregate {
    /// Dividend yield at the year's highest close.
    #[must_use]
    pub fn high_yield(&self) -> f64 {
        self.dividends / self.high.close
    }

    /// Dividend yield at the year's lowest close.
    #[must_use]
    pub fn low_yield(&self) -> f64 {
        self.dividends / self.low.close
    }
}

/// Sum of dividend payments per calendar year. Years without a payment are
/// absent.
#[must_use]
pub fn annual_dividends(dividends: &DividendSeries) -> BTreeMap<i32, f64> {
    let mut sums = BTreeMap::new();
    for event in dividends.events() {
        *sums.entry(event.date.year()).or_insert(0.0) += event.amount;
    }
    sums
}

/// Highest and lowest close per calendar year.
#[must_use]
pub fn annual_extremes(prices: &PriceSeries) -> BTreeMap<i32, (PriceExtreme, PriceExtreme)> {
    let mut extremes: BTreeMap<i32, (PriceExtreme, PriceExtreme)> = BTreeMap::new();
    for bar in prices.bars() {
        let point = PriceExtreme {
            date: bar.date,
            close: bar.close,
        };
        extremes
            .entry(bar.date.year())
            .and_modify(|(high, low)| {
                if bar.close > high.close {
                    *high = point;
                }
                if bar.close < low.close {
                    *low = point;
                }
            })
            .or_insert((point, point));
    }
    extremes
}

/// Aggregates for the years that have both dividends and prices.
#[must_use]
pub fn annual_aggregates(dividends: &DividendSeries, prices: &PriceSeries) -> Vec<AnnualAggregate> {
    let sums = annual_dividends(dividends);
    let extremes = annual_extremes(prices);

    sums.iter()
        .filter_map(|(&year, &total)| {
            extremes.get(&year).map(|&(high, low)| AnnualAggregate {
                year,
                dividends: total,
                high,
                low,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bluechip_traits::{DividendEvent, PriceBar};

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_epoch_days() {
        assert_eq!(epoch_days(date(1970, 1, 1)), 0);
        assert_eq!(epoch_days(date(1970, 1, 8)), 7);
        assert_eq!(epoch_days(date(1969, 12, 31)), -1);
    }

    #[test]
    fn test_annual_dividends_sum_per_year() {
        let series = DividendSeries::new(vec![
            DividendEvent::new(date(2020, 3, 1), 0.25),
            DividendEvent::new(date(2020, 9, 1), 0.25),
            DividendEvent::new(date(2022, 3, 1), 0.30),
        ])
        .unwrap();

        let sums = annual_dividends(&series);
        assert_eq!(sums.len(), 2);
        assert_relative_eq!(sums[&2020], 0.5);
        assert!(!sums.contains_key(&2021));
    }

    #[test]
    fn test_extremes_keep_first_occurrence() {
        let prices = PriceSeries::new(vec![
            PriceBar::new(date(2021, 1, 4), 10.0),
            PriceBar::new(date(2021, 2, 1), 12.0),
            PriceBar::new(date(2021, 3, 1), 12.0),
            PriceBar::new(date(2021, 4, 1), 8.0),
            PriceBar::new(date(2022, 1, 3), 9.0),
        ])
        .unwrap();

        let extremes = annual_extremes(&prices);
        let (high, low) = extremes[&2021];
        assert_eq!(high.date, date(2021, 2, 1));
        assert_relative_eq!(low.close, 8.0);
        let (high, low) = extremes[&2022];
        assert_eq!(high, low);
    }

    #[test]
    fn test_aggregates_use_overlapping_years_only() {
        let dividends = DividendSeries::new(vec![
            DividendEvent::new(date(2019, 6, 1), 1.0),
            DividendEvent::new(date(2020, 6, 1), 1.0),
        ])
        .unwrap();
        let prices = PriceSeries::new(vec![
            PriceBar::new(date(2020, 1, 2), 50.0),
            PriceBar::new(date(2020, 6, 2), 40.0),
            PriceBar::new(date(2021, 1, 4), 60.0),
        ])
        .unwrap();

        let aggregates = annual_aggregates(&dividends, &prices);
        assert_eq!(aggregates.len(), 1);
        assert_eq!(aggregates[0].year, 2020);
        assert_relative_eq!(aggregates[0].high_yield(), 0.02);
        assert_relative_eq!(aggregates[0].low_yield(), 0.025);
    }
}
