//! Per-year price trend from weekly mean closes.

use crate::annual::epoch_days;
use bluechip_traits::stats::ols;
use bluechip_traits::{Date, PriceSeries};
use chrono::{Datelike, Days};
use serde::Serialize;
use std::collections::BTreeMap;

/// Mean close of one week.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeeklyPrice {
    /// The Sunday that ends the week.
    pub week_ending: Date,
    /// Mean of the week's closes.
    pub mean_close: f64,
}

/// The Sunday on or after `date`.
#[must_use]
pub fn week_ending(date: Date) -> Date {
    let to_sunday = (7 - date.weekday().num_days_from_sunday()) % 7;
    date.checked_add_days(Days::new(u64::from(to_sunday)))
        .unwrap_or(date)
}

/// Weekly mean closes, labelled by the Sunday ending each week.
#[must_use]
pub fn weekly_means(prices: &PriceSeries) -> Vec<WeeklyPrice> {
    let mut weeks: BTreeMap<Date, (f64, usize)> = BTreeMap::new();
    for bar in prices.bars() {
        let entry = weeks.entry(week_ending(bar.date)).or_insert((0.0, 0));
        entry.0 += bar.close;
        entry.1 += 1;
    }
    weeks
        .into_iter()
        .map(|(week_ending, (sum, n))| WeeklyPrice {
            week_ending,
            mean_close: sum / n as f64,
        })
        .collect()
}

/// Linear trend of one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    /// Calendar year of the week labels.
    pub year: i32,
    /// Price change per day.
    pub slope: f64,
    /// Whether `slope > 0`.
    pub is_positive_trend: bool,
    /// Weekly observations in the fit.
    pub observations: usize,
}

/// Trend per calendar year.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnnualTrend {
    /// Fitted years in ascending order.
    pub points: Vec<TrendPoint>,
    /// Years with fewer than two weekly observations.
    pub insufficient_years: Vec<i32>,
}

impl AnnualTrend {
    /// Trend of a given year, if it could be fitted.
    #[must_use]
    pub fn year(&self, year: i32) -> Option<&TrendPoint> {
        self.points.iter().find(|p| p.year == year)
    }

    /// Share of fitted years with a positive trend.
    #[must_use]
    pub fn positive_share(&self) -> Option<f64> {
        if self.points.is_empty() {
            return None;
        }
        let positive = self.points.iter().filter(|p| p.is_positive_trend).count();
        Some(positive as f64 / self.points.len() as f64)
    }
}

/// Regress weekly mean closes on days since the Unix epoch, one fit per
/// calendar year of the week labels.
#[must_use]
pub fn compute_annual_trend(prices: &PriceSeries) -> AnnualTrend {
    let mut by_year: BTreeMap<i32, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for week in weekly_means(prices) {
        let (x, y) = by_year.entry(week.week_ending.year()).or_default();
        x.push(f64::from(epoch_days(week.week_ending)));
        y.push(week.mean_close);
    }

    let mut trend = AnnualTrend::default();
    for (year, (x, y)) in by_year {
        match ols(&x, &y) {
            Some(fit) => trend.points.push(TrendPoint {
                year,
                slope: fit.slope,
                is_positive_trend: fit.slope > 0.0,
                observations: fit.n_obs,
            }),
            None => trend.insufficient_years.push(year),
        }
    }
    trend
}
