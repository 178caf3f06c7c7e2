//! Fair value price series derived from annual dividends and a yield band.

use crate::annual::annual_dividends;
use crate::yield_band::YieldBand;
use bluechip_traits::{Date, TickerHistory};
use serde::Serialize;
use std::collections::BTreeMap;

/// One fair value price, valid from `date` until the next point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FairValuePoint {
    /// First day the price applies, 1 January of the dividend year.
    pub date: Date,
    /// Fair price.
    pub price: f64,
    /// Whether the point is projected rather than observed.
    pub synthetic: bool,
}

/// Step function of fair value prices, one point per dividend year.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FairValueSeries {
    points: Vec<FairValuePoint>,
}

impl FairValueSeries {
    /// Points in ascending date order.
    #[must_use]
    pub fn points(&self) -> &[FairValuePoint] {
        &self.points
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Price in effect on `date`, forward-filled from the latest point on or
    /// before it. `None` before the first point.
    #[must_use]
    pub fn value_at(&self, date: Date) -> Option<f64> {
        let idx = self.points.partition_point(|p| p.date <= date);
        idx.checked_sub(1).map(|i| self.points[i].price)
    }

    /// Forward-filled prices on each of `dates`.
    #[must_use]
    pub fn reindex(&self, dates: &[Date]) -> Vec<Option<f64>> {
        dates.iter().map(|&d| self.value_at(d)).collect()
    }
}

fn year_start(year: i32) -> Option<Date> {
    Date::from_ymd_opt(year, 1, 1)
}

/// Mean year-over-year growth of annual dividends.
///
/// Only pairs of consecutive calendar years contribute. `None` when there is
/// no such pair.
#[must_use]
pub fn mean_dividend_growth(annual: &BTreeMap<i32, f64>) -> Option<f64> {
    let rates: Vec<f64> = annual
        .iter()
        .zip(annual.iter().skip(1))
        .filter(|((y0, _), (y1, _))| **y1 == **y0 + 1)
        .map(|((_, d0), (_, d1))| d1 / d0 - 1.0)
        .collect();
    bluechip_traits::stats::mean(&rates)
}

/// Fair value points for annual dividends at a fixed yield.
///
/// With `growth`, a synthetic point for the year after the last dividend year
/// is appended, priced at the last annual dividend grown by `growth`.
#[must_use]
pub fn fair_value_series(
    annual: &BTreeMap<i32, f64>,
    yield_: f64,
    growth: Option<f64>,
) -> FairValueSeries {
    let mut points: Vec<FairValuePoint> = annual
        .iter()
        .filter_map(|(&year, &dividend)| {
            year_start(year).map(|date| FairValuePoint {
                date,
                price: dividend / yield_,
                synthetic: false,
            })
        })
        .collect();

    if let (Some(g), Some((&year, &dividend))) = (growth, annual.last_key_value()) {
        if let Some(date) = year_start(year + 1) {
            points.push(FairValuePoint {
                date,
                price: dividend * (1.0 + g) / yield_,
                synthetic: true,
            });
        }
    }

    FairValueSeries { points }
}

/// Overvalue and undervalue price series of a ticker.
#[must_use]
pub fn reconstruct_prices(history: &TickerHistory, band: &YieldBand) -> (FairValueSeries, FairValueSeries) {
    let annual = annual_dividends(&history.dividends);
    (
        fair_value_series(&annual, band.overvalue_yield, None),
        fair_value_series(&annual, band.undervalue_yield, None),
    )
}

/// Like [`reconstruct_prices`], with a synthetic point for the next year
/// based on the mean historical dividend growth.
#[must_use]
pub fn reconstruct_prices_with_projection(
    history: &TickerHistory,
    band: &YieldBand,
) -> (FairValueSeries, FairValueSeries) {
    let annual = annual_dividends(&history.dividends);
    let growth = mean_dividend_growth(&annual);
    (
        fair_value_series(&annual, band.overvalue_yield, growth),
        fair_value_series(&annual, band.undervalue_yield, growth),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bluechip_traits::{DividendEvent, DividendSeries, PriceSeries, TickerRecord};

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    fn band() -> YieldBand {
        YieldBand {
            overvalue_yield: 0.025,
            undervalue_yield: 0.05,
            sample_years: 10,
        }
    }

    fn history(payments: &[(i32, f64)]) -> TickerHistory {
        let events = payments
            .iter()
            .map(|&(year, amount)| DividendEvent::new(date(year, 6, 15), amount))
            .collect();
        TickerHistory::new(
            TickerRecord::new("KO", "Coca-Cola", "NYSE", date(2000, 1, 1), date(2024, 12, 31))
                .unwrap(),
            DividendSeries::new(events).unwrap(),
            PriceSeries::default(),
        )
    }

    #[test]
    fn test_one_point_per_dividend_year() {
        let (over, under) = reconstruct_prices(&history(&[(2020, 1.0), (2021, 1.1), (2023, 1.2)]), &band());

        assert_eq!(over.len(), 3);
        assert_eq!(over.points()[0].date, date(2020, 1, 1));
        assert_relative_eq!(over.points()[0].price, 40.0);
        assert_relative_eq!(under.points()[0].price, 20.0);
        assert!(over.points().iter().all(|p| !p.synthetic));
    }

    #[test]
    fn test_forward_fill() {
        let (over, _) = reconstruct_prices(&history(&[(2020, 1.0), (2021, 1.1), (2023, 1.2)]), &band());

        assert_eq!(over.value_at(date(2019, 12, 31)), None);
        assert_relative_eq!(over.value_at(date(2020, 1, 1)).unwrap(), 40.0);
        // 2022 has no dividend, so the 2021 price carries over
        assert_relative_eq!(over.value_at(date(2022, 7, 1)).unwrap(), 44.0);
        assert_relative_eq!(over.value_at(date(2030, 1, 1)).unwrap(), 48.0);

        let filled = over.reindex(&[date(2019, 6, 1), date(2021, 6, 1)]);
        assert_eq!(filled[0], None);
        assert!(filled[1].is_some());
    }

    #[test]
    fn test_mean_growth_uses_consecutive_years() {
        let annual = BTreeMap::from([(2018, 1.0), (2019, 1.1), (2020, 1.21), (2023, 5.0)]);
        assert_relative_eq!(mean_dividend_growth(&annual).unwrap(), 0.1, epsilon = 1e-12);
        assert!(mean_dividend_growth(&BTreeMap::from([(2018, 1.0)])).is_none());
    }

    #[test]
    fn test_projection_is_synthetic() {
        let (over, under) = reconstruct_prices_with_projection(
            &history(&[(2021, 1.0), (2022, 1.1), (2023, 1.21)]),
            &band(),
        );

        assert_eq!(over.len(), 4);
        let last = over.points()[3];
        assert!(last.synthetic);
        assert_eq!(last.date, date(2024, 1, 1));
        assert_relative_eq!(last.price, 1.331 / 0.025, epsilon = 1e-9);
        assert!(under.points()[3].synthetic);
    }

    #[test]
    fn test_projection_without_growth_history() {
        let (over, _) = reconstruct_prices_with_projection(&history(&[(2021, 1.0)]), &band());
        assert_eq!(over.len(), 1);
    }
}
