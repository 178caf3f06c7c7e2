//! Dividend yield band.
//!
//! For every year with both dividends and prices, the annual dividend is set
//! against the year's highest and lowest close. The lowest yields (paid at
//! the highs) mark the overvalued end of the band, the highest yields (paid at
//! the lows) the undervalued end:
//!
//! - overvalue yield: mean of the high-price yields strictly below their
//!   lower quantile (default 25th percentile)
//! - undervalue yield: mean of the low-price yields strictly above their
//!   upper quantile (default 75th percentile)
//!
//! Quantiles interpolate linearly between closest ranks, see
//! [`bluechip_traits::stats::quantile`]. Both yields are rounded to four
//! decimal places, one hundredth of a percentage point.

use crate::annual::{AnnualAggregate, annual_aggregates};
use bluechip_traits::stats::{mean, quantile, round_to};
use bluechip_traits::{BlueChipError, Date, Result, TickerHistory};
use serde::{Deserialize, Serialize};

/// Configuration for the yield band and fair value model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationConfig {
    /// Minimum number of years with both dividends and prices (default: 4)
    pub min_years: usize,

    /// Quantile of the high-price yields below which a year counts as
    /// overvalued (default: 0.25)
    pub overvalue_quantile: f64,

    /// Quantile of the low-price yields above which a year counts as
    /// undervalued (default: 0.75)
    pub undervalue_quantile: f64,

    /// Decimal places kept in the yields (default: 4)
    pub yield_decimals: i32,

    /// Add a synthetic fair value point for the year after the last dividend
    /// year (default: false)
    pub project_next_year: bool,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            min_years: 4,
            overvalue_quantile: 0.25,
            undervalue_quantile: 0.75,
            yield_decimals: 4,
            project_next_year: false,
        }
    }
}

impl ValuationConfig {
    /// Check that the settings are usable.
    ///
    /// # Errors
    ///
    /// Returns [`BlueChipError::InvalidConfig`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.min_years < 2 {
            return Err(BlueChipError::InvalidConfig(
                "min_years must be at least 2".to_string(),
            ));
        }
        for (name, q) in [
            ("overvalue_quantile", self.overvalue_quantile),
            ("undervalue_quantile", self.undervalue_quantile),
        ] {
            if !(0.0..=1.0).contains(&q) {
                return Err(BlueChipError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {q}"
                )));
            }
        }
        if self.yield_decimals < 1 {
            return Err(BlueChipError::InvalidConfig(
                "yield_decimals must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// The two yields that bound the fair value range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YieldBand {
    /// Yield at which the stock is considered overvalued.
    pub overvalue_yield: f64,
    /// Yield at which the stock is considered undervalued.
    pub undervalue_yield: f64,
    /// Number of years the band was estimated from.
    pub sample_years: usize,
}

impl YieldBand {
    /// Fair price for `annual_dividend` at the overvalue yield.
    #[must_use]
    pub fn overvalue_price(&self, annual_dividend: f64) -> f64 {
        annual_dividend / self.overvalue_yield
    }

    /// Fair price for `annual_dividend` at the undervalue yield.
    #[must_use]
    pub fn undervalue_price(&self, annual_dividend: f64) -> f64 {
        annual_dividend / self.undervalue_yield
    }
}

/// Yields of one year and whether they were used for the band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnnualYield {
    /// Calendar year.
    pub year: i32,
    /// Day of the highest close.
    pub high_date: Date,
    /// Dividend yield at the highest close.
    pub high_yield: f64,
    /// Day of the lowest close.
    pub low_date: Date,
    /// Dividend yield at the lowest close.
    pub low_yield: f64,
    /// Whether `high_yield` fell in the overvalue tail.
    pub selected_high: bool,
    /// Whether `low_yield` fell in the undervalue tail.
    pub selected_low: bool,
}

/// Per-year yields behind a [`YieldBand`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct YieldHistory {
    years: Vec<AnnualYield>,
}

impl YieldHistory {
    /// Yields in ascending year order.
    #[must_use]
    pub fn years(&self) -> &[AnnualYield] {
        &self.years
    }

    /// Years whose high-price yield was averaged into the overvalue yield.
    pub fn selected_high_years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.iter().filter(|y| y.selected_high).map(|y| y.year)
    }

    /// Years whose low-price yield was averaged into the undervalue yield.
    pub fn selected_low_years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.iter().filter(|y| y.selected_low).map(|y| y.year)
    }
}

fn tail_mean(values: &[f64], selected: &[bool], what: &str, decimals: i32) -> Result<f64> {
    let tail: Vec<f64> = values
        .iter()
        .zip(selected)
        .filter_map(|(&v, &s)| s.then_some(v))
        .collect();
    let value = mean(&tail).ok_or_else(|| BlueChipError::InsufficientSampleSize {
        what: what.to_string(),
        required: 1,
        actual: 0,
    })?;

    let rounded = round_to(value, decimals);
    if rounded <= 0.0 {
        return Err(BlueChipError::MalformedTimeSeries(format!(
            "{what} of {value} rounds to zero"
        )));
    }
    Ok(rounded)
}

/// Estimate the yield band from annual aggregates and report the per-year
/// yields.
///
/// # Errors
///
/// Returns [`BlueChipError::InsufficientSampleSize`] when fewer than
/// `config.min_years` years are available or a tail is empty because all
/// yields are equal.
pub fn band_from_aggregates(
    aggregates: &[AnnualAggregate],
    config: &ValuationConfig,
) -> Result<(YieldBand, YieldHistory)> {
    config.validate()?;
    if aggregates.len() < config.min_years {
        return Err(BlueChipError::InsufficientSampleSize {
            what: "years with dividends and prices".to_string(),
            required: config.min_years,
            actual: aggregates.len(),
        });
    }

    let high_yields: Vec<f64> = aggregates.iter().map(AnnualAggregate::high_yield).collect();
    let low_yields: Vec<f64> = aggregates.iter().map(AnnualAggregate::low_yield).collect();

    let not_enough = |what: &str| BlueChipError::InsufficientSampleSize {
        what: what.to_string(),
        required: config.min_years,
        actual: 0,
    };
    let high_cut =
        quantile(&high_yields, config.overvalue_quantile).ok_or_else(|| not_enough("high yields"))?;
    let low_cut =
        quantile(&low_yields, config.undervalue_quantile).ok_or_else(|| not_enough("low yields"))?;

    let selected_high: Vec<bool> = high_yields.iter().map(|&y| y < high_cut).collect();
    let selected_low: Vec<bool> = low_yields.iter().map(|&y| y > low_cut).collect();

    let band = YieldBand {
        overvalue_yield: tail_mean(
            &high_yields,
            &selected_high,
            "overvalue yield tail",
            config.yield_decimals,
        )?,
        undervalue_yield: tail_mean(
            &low_yields,
            &selected_low,
            "undervalue yield tail",
            config.yield_decimals,
        )?,
        sample_years: aggregates.len(),
    };

    let years = aggregates
        .iter()
        .enumerate()
        .map(|(i, agg)| AnnualYield {
            year: agg.year,
            high_date: agg.high.date,
            high_yield: high_yields[i],
            low_date: agg.low.date,
            low_yield: low_yields[i],
            selected_high: selected_high[i],
            selected_low: selected_low[i],
        })
        .collect();

    Ok((band, YieldHistory { years }))
}

/// Estimate the yield band of a ticker.
///
/// # Errors
///
/// See [`band_from_aggregates`].
pub fn build_yield_band(history: &TickerHistory, config: &ValuationConfig) -> Result<YieldBand> {
    let aggregates = annual_aggregates(&history.dividends, &history.prices);
    band_from_aggregates(&aggregates, config).map(|(band, _)| band)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annual::PriceExtreme;
    use approx::assert_relative_eq;
    use bluechip_traits::{
        DividendEvent, DividendSeries, PriceBar, PriceSeries, TickerRecord,
    };

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    /// Aggregates with a dividend of 1.0 so that each yield is `1 / close`.
    fn aggregates(high_yields: &[f64], low_yields: &[f64]) -> Vec<AnnualAggregate> {
        high_yields
            .iter()
            .zip(low_yields)
            .enumerate()
            .map(|(i, (&hy, &ly))| {
                let year = 2000 + i as i32;
                AnnualAggregate {
                    year,
                    dividends: 1.0,
                    high: PriceExtreme {
                        date: date(year, 6, 1),
                        close: 1.0 / hy,
                    },
                    low: PriceExtreme {
                        date: date(year, 10, 1),
                        close: 1.0 / ly,
                    },
                }
            })
            .collect()
    }

    #[test]
    fn test_overvalue_tail_selection() {
        let aggs = aggregates(
            &[0.01, 0.02, 0.03, 0.04, 0.10],
            &[0.02, 0.03, 0.04, 0.05, 0.06],
        );
        let (band, history) = band_from_aggregates(&aggs, &ValuationConfig::default()).unwrap();

        assert_relative_eq!(band.overvalue_yield, 0.01);
        assert_eq!(history.selected_high_years().collect::<Vec<_>>(), vec![2000]);
        // 75th percentile of the low yields is 0.05, only 0.06 lies above
        assert_relative_eq!(band.undervalue_yield, 0.06);
        assert_eq!(history.selected_low_years().collect::<Vec<_>>(), vec![2004]);
        assert_eq!(band.sample_years, 5);
    }

    #[test]
    fn test_yields_are_rounded_to_four_decimals() {
        // Nine years: the tails hold two values each.
        let aggs = aggregates(
            &[0.01234, 0.01238, 0.03, 0.04, 0.05, 0.06, 0.07, 0.08, 0.09],
            &[0.01, 0.02, 0.03, 0.04, 0.05, 0.055, 0.058, 0.06121, 0.06125],
        );
        let (band, history) = band_from_aggregates(&aggs, &ValuationConfig::default()).unwrap();
        assert_eq!(history.selected_high_years().count(), 2);
        assert_eq!(history.selected_low_years().count(), 2);
        assert_relative_eq!(band.overvalue_yield, 0.0124);
        assert_relative_eq!(band.undervalue_yield, 0.0612);
    }

    #[test]
    fn test_band_is_deterministic() {
        let aggs = aggregates(
            &[0.031, 0.027, 0.035, 0.029, 0.033, 0.026],
            &[0.041, 0.038, 0.044, 0.036, 0.047, 0.039],
        );
        let config = ValuationConfig::default();
        let (first, _) = band_from_aggregates(&aggs, &config).unwrap();
        let (second, _) = band_from_aggregates(&aggs, &config).unwrap();
        assert_eq!(first.overvalue_yield.to_bits(), second.overvalue_yield.to_bits());
        assert_eq!(first.undervalue_yield.to_bits(), second.undervalue_yield.to_bits());
    }

    #[test]
    fn test_too_few_years() {
        let aggs = aggregates(&[0.01, 0.02, 0.03], &[0.02, 0.03, 0.04]);
        let err = band_from_aggregates(&aggs, &ValuationConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            BlueChipError::InsufficientSampleSize {
                required: 4,
                actual: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_constant_yields_have_empty_tail() {
        let aggs = aggregates(&[0.03; 5], &[0.04, 0.05, 0.06, 0.07, 0.08]);
        let err = band_from_aggregates(&aggs, &ValuationConfig::default()).unwrap_err();
        assert!(matches!(err, BlueChipError::InsufficientSampleSize { .. }));
    }

    #[test]
    fn test_invalid_config() {
        let config = ValuationConfig {
            overvalue_quantile: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(BlueChipError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_build_yield_band_from_history() {
        let mut dividends = Vec::new();
        let mut prices = Vec::new();
        for (i, (high, low)) in [(50.0, 40.0), (55.0, 45.0), (60.0, 42.0), (52.0, 38.0), (58.0, 47.0)]
            .into_iter()
            .enumerate()
        {
            let year = 2015 + i as i32;
            dividends.push(DividendEvent::new(date(year, 4, 1), 1.0));
            dividends.push(DividendEvent::new(date(year, 10, 1), 1.0));
            prices.push(PriceBar::new(date(year, 2, 1), high));
            prices.push(PriceBar::new(date(year, 8, 1), low));
        }
        let record = TickerRecord::new("KO", "Coca-Cola", "NYSE", date(2015, 1, 1), date(2019, 12, 31))
            .unwrap();
        let history = TickerHistory::new(
            record,
            DividendSeries::new(dividends).unwrap(),
            PriceSeries::new(prices).unwrap(),
        );

        let band = build_yield_band(&history, &ValuationConfig::default()).unwrap();
        // high yields 2/50, 2/55, 2/60, 2/52, 2/58; only 2/60 lies below q25 = 2/58
        assert_relative_eq!(band.overvalue_yield, 0.0333);
        // low yields 2/40, 2/45, 2/42, 2/38, 2/47; only 2/38 lies above q75 = 2/40
        assert_relative_eq!(band.undervalue_yield, 0.0526);
        assert!(band.overvalue_price(2.0) < band.undervalue_price(2.0));
    }
}
