//! Valuation profile of a ticker.
//!
//! A [`ValuationProfile`] bundles everything the value report shows for one
//! symbol: the yield band with its per-year yields, the fair value price
//! series and the annual price trend. It is computed once in
//! [`ValuationProfile::build`] and immutable afterwards. The `*_frame` methods
//! expose the results as polars `DataFrame`s with `Date` typed date columns.

use crate::annual::{AnnualAggregate, annual_aggregates, epoch_days};
use crate::fair_value::{FairValueSeries, reconstruct_prices, reconstruct_prices_with_projection};
use crate::regression::{AnnualTrend, compute_annual_trend};
use crate::yield_band::{ValuationConfig, YieldBand, YieldHistory, band_from_aggregates};
use bluechip_traits::{Date, PriceBar, PriceSeries, Result, Symbol, TickerHistory};
use polars::prelude::*;
use serde::Serialize;
use tracing::info;

/// Where a price sits relative to the yield band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationZone {
    /// At or below the undervalue price.
    Undervalued,
    /// Between the two fair value prices.
    FairlyValued,
    /// At or above the overvalue price.
    Overvalued,
}

impl std::fmt::Display for ValuationZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Undervalued => "undervalued",
            Self::FairlyValued => "fairly valued",
            Self::Overvalued => "overvalued",
        };
        f.write_str(label)
    }
}

/// Yield band, fair value prices and price trend of one ticker.
#[derive(Debug, Clone)]
pub struct ValuationProfile {
    symbol: Symbol,
    band: YieldBand,
    yields: YieldHistory,
    aggregates: Vec<AnnualAggregate>,
    overvalue: FairValueSeries,
    undervalue: FairValueSeries,
    trend: AnnualTrend,
    prices: PriceSeries,
}

fn cast_dates(df: DataFrame, columns: &[&str]) -> Result<DataFrame> {
    let casts: Vec<Expr> = columns
        .iter()
        .map(|name| col(*name).cast(DataType::Date))
        .collect();
    Ok(df.lazy().with_columns(casts).collect()?)
}

impl ValuationProfile {
    /// Compute the profile of a ticker.
    ///
    /// # Errors
    ///
    /// Returns [`bluechip_traits::BlueChipError::InsufficientSampleSize`] when
    /// the history is too short for a yield band and
    /// [`bluechip_traits::BlueChipError::InvalidConfig`] for invalid settings.
    pub fn build(history: &TickerHistory, config: &ValuationConfig) -> Result<Self> {
        let aggregates = annual_aggregates(&history.dividends, &history.prices);
        let (band, yields) = band_from_aggregates(&aggregates, config)?;
        let (overvalue, undervalue) = if config.project_next_year {
            reconstruct_prices_with_projection(history, &band)
        } else {
            reconstruct_prices(history, &band)
        };
        let trend = compute_annual_trend(&history.prices);

        info!(
            symbol = history.symbol(),
            overvalue_yield = band.overvalue_yield,
            undervalue_yield = band.undervalue_yield,
            years = band.sample_years,
            "Created valuation profile"
        );

        Ok(Self {
            symbol: history.symbol().to_string(),
            band,
            yields,
            aggregates,
            overvalue,
            undervalue,
            trend,
            prices: history.prices.clone(),
        })
    }

    /// Ticker symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The yield band.
    #[must_use]
    pub const fn band(&self) -> &YieldBand {
        &self.band
    }

    /// Per-year yields and tail selection.
    #[must_use]
    pub const fn yields(&self) -> &YieldHistory {
        &self.yields
    }

    /// Overvalue fair price series.
    #[must_use]
    pub const fn overvalue_prices(&self) -> &FairValueSeries {
        &self.overvalue
    }

    /// Undervalue fair price series.
    #[must_use]
    pub const fn undervalue_prices(&self) -> &FairValueSeries {
        &self.undervalue
    }

    /// Annual price trend.
    #[must_use]
    pub const fn trend(&self) -> &AnnualTrend {
        &self.trend
    }

    /// Most recent close.
    #[must_use]
    pub fn latest_close(&self) -> Option<PriceBar> {
        self.prices.bars().last().copied()
    }

    /// Zone of `price` on `date`, `None` before the first fair value point.
    #[must_use]
    pub fn zone(&self, date: Date, price: f64) -> Option<ValuationZone> {
        let over = self.overvalue.value_at(date)?;
        let under = self.undervalue.value_at(date)?;
        Some(if price >= over {
            ValuationZone::Overvalued
        } else if price <= under {
            ValuationZone::Undervalued
        } else {
            ValuationZone::FairlyValued
        })
    }

    /// Zone of the most recent close.
    #[must_use]
    pub fn current_zone(&self) -> Option<ValuationZone> {
        let bar = self.latest_close()?;
        self.zone(bar.date, bar.close)
    }

    /// One row per year with dividends and prices.
    ///
    /// Columns: `year`, `dividends`, `high_date`, `high_close`, `high_yield`,
    /// `selected_high`, `low_date`, `low_close`, `low_yield`, `selected_low`.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be assembled.
    pub fn aggregates_frame(&self) -> Result<DataFrame> {
        let years = self.yields.years();
        let df = df! {
            "year" => self.aggregates.iter().map(|a| a.year).collect::<Vec<_>>(),
            "dividends" => self.aggregates.iter().map(|a| a.dividends).collect::<Vec<_>>(),
            "high_date" => self.aggregates.iter().map(|a| epoch_days(a.high.date)).collect::<Vec<_>>(),
            "high_close" => self.aggregates.iter().map(|a| a.high.close).collect::<Vec<_>>(),
            "high_yield" => years.iter().map(|y| y.high_yield).collect::<Vec<_>>(),
            "selected_high" => years.iter().map(|y| y.selected_high).collect::<Vec<_>>(),
            "low_date" => self.aggregates.iter().map(|a| epoch_days(a.low.date)).collect::<Vec<_>>(),
            "low_close" => self.aggregates.iter().map(|a| a.low.close).collect::<Vec<_>>(),
            "low_yield" => years.iter().map(|y| y.low_yield).collect::<Vec<_>>(),
            "selected_low" => years.iter().map(|y| y.selected_low).collect::<Vec<_>>(),
        }?;
        cast_dates(df, &["high_date", "low_date"])
    }

    /// Daily closes with the fair value prices in effect on each day.
    ///
    /// Columns: `date`, `close`, `overvalue_price`, `undervalue_price`. The
    /// fair value columns are null before the first dividend year.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be assembled.
    pub fn fair_value_frame(&self) -> Result<DataFrame> {
        let dates: Vec<Date> = self.prices.bars().iter().map(|b| b.date).collect();
        let df = df! {
            "date" => dates.iter().map(|&d| epoch_days(d)).collect::<Vec<_>>(),
            "close" => self.prices.bars().iter().map(|b| b.close).collect::<Vec<_>>(),
            "overvalue_price" => self.overvalue.reindex(&dates),
            "undervalue_price" => self.undervalue.reindex(&dates),
        }?;
        cast_dates(df, &["date"])
    }

    /// One row per fitted year.
    ///
    /// Columns: `year`, `slope`, `is_positive_trend`, `observations`.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be assembled.
    pub fn trend_frame(&self) -> Result<DataFrame> {
        let points = &self.trend.points;
        let df = df! {
            "year" => points.iter().map(|p| p.year).collect::<Vec<_>>(),
            "slope" => points.iter().map(|p| p.slope).collect::<Vec<_>>(),
            "is_positive_trend" => points.iter().map(|p| p.is_positive_trend).collect::<Vec<_>>(),
            "observations" => points.iter().map(|p| p.observations as u32).collect::<Vec<_>>(),
        }?;
        Ok(df)
    }
}
