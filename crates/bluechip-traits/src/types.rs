//! Common types used throughout the bluechip workspace.
//!
//! Dividend events and price bars are plain dated observations. They are
//! wrapped in [`DividendSeries`] and [`PriceSeries`], which validate and order
//! the observations once and are immutable afterwards.

use crate::{BlueChipError, Result};
use chrono::{Datelike, Days, Months};
use derive_more::Display;
use serde::{Deserialize, Serialize};

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// A market symbol identifier, e.g. "KO" or "JNJ".
pub type Symbol = String;

/// History assumed when neither an explicit start date nor a first-trade date
/// is known for a listing.
pub const DEFAULT_HISTORY_YEARS: u32 = 50;

/// Shift a date back by a whole number of calendar years.
///
/// February 29th maps to February 28th in non-leap target years.
#[must_use]
pub fn years_back(date: Date, years: u32) -> Date {
    years
        .checked_mul(12)
        .and_then(|months| date.checked_sub_months(Months::new(months)))
        .unwrap_or(Date::MIN)
}

/// The day before `today`, used as the default end of an analysis window.
#[must_use]
pub fn yesterday(today: Date) -> Date {
    today.checked_sub_days(Days::new(1)).unwrap_or(today)
}

/// A single dividend payment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DividendEvent {
    /// Ex-dividend date in the exchange's local calendar.
    pub date: Date,
    /// Cash amount per share.
    pub amount: f64,
}

impl DividendEvent {
    /// Create a new dividend event.
    #[must_use]
    pub const fn new(date: Date, amount: f64) -> Self {
        Self { date, amount }
    }
}

/// A daily closing price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Trading date.
    pub date: Date,
    /// Closing price (split and dividend adjusted where the provider supports it).
    pub close: f64,
}

impl PriceBar {
    /// Create a new price bar.
    #[must_use]
    pub const fn new(date: Date, close: f64) -> Self {
        Self { date, close }
    }
}

/// A calendar quarter, e.g. `2024Q3`.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[display("{year}Q{quarter}")]
pub struct Quarter {
    /// Calendar year.
    pub year: i32,
    /// Quarter number in `1..=4`.
    pub quarter: u32,
}

impl Quarter {
    /// The quarter a date falls into.
    #[must_use]
    pub fn of(date: Date) -> Self {
        Self {
            year: date.year(),
            quarter: date.month0() / 3 + 1,
        }
    }

    /// The last day of the quarter.
    #[must_use]
    pub fn end_date(&self) -> Date {
        let first_of_next = match self.quarter {
            4 => Date::from_ymd_opt(self.year + 1, 1, 1),
            q => Date::from_ymd_opt(self.year, q * 3 + 1, 1),
        };
        first_of_next
            .and_then(|d| d.pred_opt())
            .unwrap_or(Date::MAX)
    }

    /// The quarter immediately following this one.
    #[must_use]
    pub const fn next(&self) -> Self {
        if self.quarter == 4 {
            Self {
                year: self.year + 1,
                quarter: 1,
            }
        } else {
            Self {
                year: self.year,
                quarter: self.quarter + 1,
            }
        }
    }
}

/// Date-ordered, validated dividend history.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DividendSeries {
    events: Vec<DividendEvent>,
}

impl DividendSeries {
    /// Build a series from raw events.
    ///
    /// Events are sorted by date; events sharing a date are kept in their
    /// original order.
    ///
    /// # Errors
    ///
    /// Returns [`BlueChipError::MalformedTimeSeries`] if an amount is not a
    /// strictly positive finite number.
    pub fn new(mut events: Vec<DividendEvent>) -> Result<Self> {
        if let Some(bad) = events
            .iter()
            .find(|e| !e.amount.is_finite() || e.amount <= 0.0)
        {
            return Err(BlueChipError::MalformedTimeSeries(format!(
                "dividend of {} on {} is not a positive amount",
                bad.amount, bad.date
            )));
        }
        events.sort_by_key(|e| e.date);
        Ok(Self { events })
    }

    /// All events in date order.
    #[must_use]
    pub fn events(&self) -> &[DividendEvent] {
        &self.events
    }

    /// Number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the series holds no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterator over the event dates.
    pub fn dates(&self) -> impl Iterator<Item = Date> + '_ {
        self.events.iter().map(|e| e.date)
    }

    /// Events with `start <= date <= end`.
    #[must_use]
    pub fn window(&self, start: Date, end: Date) -> &[DividendEvent] {
        let lo = self.events.partition_point(|e| e.date < start);
        let hi = self.events.partition_point(|e| e.date <= end);
        if lo >= hi { &[] } else { &self.events[lo..hi] }
    }
}

/// Date-ordered, validated daily closing prices.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series from raw bars, sorting them by date.
    ///
    /// # Errors
    ///
    /// Returns [`BlueChipError::MalformedTimeSeries`] if a close is not a
    /// strictly positive finite number.
    pub fn new(mut bars: Vec<PriceBar>) -> Result<Self> {
        if let Some(bad) = bars.iter().find(|b| !b.close.is_finite() || b.close <= 0.0) {
            return Err(BlueChipError::MalformedTimeSeries(format!(
                "close of {} on {} is not a positive price",
                bad.close, bad.date
            )));
        }
        bars.sort_by_key(|b| b.date);
        Ok(Self { bars })
    }

    /// All bars in date order.
    #[must_use]
    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    /// Number of bars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Whether the series holds no bars.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// First and last trading date, if any.
    #[must_use]
    pub fn date_range(&self) -> Option<(Date, Date)> {
        Some((self.bars.first()?.date, self.bars.last()?.date))
    }
}

/// Identity and analysis window of a listed symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerRecord {
    /// Ticker symbol.
    pub symbol: Symbol,
    /// Display name of the company.
    pub name: String,
    /// Listing exchange code.
    pub exchange: String,
    /// First trading day, when known.
    pub first_trade_date: Option<Date>,
    /// Inclusive start of the analysis window.
    pub start_date: Date,
    /// Inclusive end of the analysis window.
    pub end_date: Date,
}

impl TickerRecord {
    /// Create a record with an explicit analysis window.
    ///
    /// # Errors
    ///
    /// Returns [`BlueChipError::InvalidConfig`] if `start_date > end_date`.
    pub fn new(
        symbol: impl Into<Symbol>,
        name: impl Into<String>,
        exchange: impl Into<String>,
        start_date: Date,
        end_date: Date,
    ) -> Result<Self> {
        let symbol = symbol.into();
        if start_date > end_date {
            return Err(BlueChipError::InvalidConfig(format!(
                "{symbol}: start date {start_date} is after end date {end_date}"
            )));
        }
        Ok(Self {
            symbol,
            name: name.into(),
            exchange: exchange.into(),
            first_trade_date: None,
            start_date,
            end_date,
        })
    }

    /// Create a record from a listing row, deriving missing window bounds.
    ///
    /// The start defaults to the first-trade date (or
    /// [`DEFAULT_HISTORY_YEARS`] before the end), the end to the day before
    /// `today`.
    ///
    /// # Errors
    ///
    /// Returns [`BlueChipError::InvalidConfig`] if the resulting window is empty.
    pub fn from_listing(
        symbol: impl Into<Symbol>,
        name: impl Into<String>,
        exchange: impl Into<String>,
        first_trade_date: Option<Date>,
        start: Option<Date>,
        end: Option<Date>,
        today: Date,
    ) -> Result<Self> {
        let end_date = end.unwrap_or_else(|| yesterday(today));
        let start_date = start
            .or(first_trade_date)
            .unwrap_or_else(|| years_back(end_date, DEFAULT_HISTORY_YEARS));
        let mut record = Self::new(symbol, name, exchange, start_date, end_date)?;
        record.first_trade_date = first_trade_date;
        Ok(record)
    }
}

/// A ticker together with the series downloaded for its analysis window.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerHistory {
    /// Identity and window.
    pub record: TickerRecord,
    /// Dividend payments.
    pub dividends: DividendSeries,
    /// Daily closes.
    pub prices: PriceSeries,
}

impl TickerHistory {
    /// Bundle a record with its series.
    #[must_use]
    pub const fn new(record: TickerRecord, dividends: DividendSeries, prices: PriceSeries) -> Self {
        Self {
            record,
            dividends,
            prices,
        }
    }

    /// Ticker symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.record.symbol
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_years_back_handles_leap_day() {
        assert_eq!(years_back(date(2024, 2, 29), 1), date(2023, 2, 28));
        assert_eq!(years_back(date(2024, 10, 16), 25), date(1999, 10, 16));
    }

    #[test]
    fn test_years_back_saturates() {
        assert_eq!(years_back(date(2024, 10, 16), u32::MAX), Date::MIN);
        assert_eq!(years_back(date(2024, 10, 16), 400_000), Date::MIN);
    }

    #[test]
    fn test_quarter_of_and_end() {
        let q = Quarter::of(date(2024, 5, 17));
        assert_eq!(q, Quarter { year: 2024, quarter: 2 });
        assert_eq!(q.end_date(), date(2024, 6, 30));
        assert_eq!(q.to_string(), "2024Q2");

        let q4 = Quarter::of(date(2023, 12, 31));
        assert_eq!(q4.end_date(), date(2023, 12, 31));
        assert_eq!(q4.next(), Quarter { year: 2024, quarter: 1 });
    }

    #[test]
    fn test_dividend_series_sorts_and_keeps_duplicates() {
        let series = DividendSeries::new(vec![
            DividendEvent::new(date(2020, 6, 1), 0.5),
            DividendEvent::new(date(2020, 3, 1), 0.4),
            DividendEvent::new(date(2020, 6, 1), 0.1),
        ])
        .unwrap();

        let amounts: Vec<f64> = series.events().iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![0.4, 0.5, 0.1]);
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn test_dividend_series_rejects_non_positive() {
        let err = DividendSeries::new(vec![DividendEvent::new(date(2020, 1, 1), 0.0)]).unwrap_err();
        assert!(matches!(err, BlueChipError::MalformedTimeSeries(_)));
    }

    #[test]
    fn test_dividend_window_is_inclusive() {
        let series = DividendSeries::new(vec![
            DividendEvent::new(date(2020, 1, 1), 1.0),
            DividendEvent::new(date(2021, 1, 1), 1.0),
            DividendEvent::new(date(2022, 1, 1), 1.0),
        ])
        .unwrap();
        assert_eq!(series.window(date(2020, 1, 1), date(2021, 1, 1)).len(), 2);
        assert!(series.window(date(2023, 1, 1), date(2024, 1, 1)).is_empty());
    }

    #[test]
    fn test_price_series_rejects_nan() {
        let err = PriceSeries::new(vec![PriceBar::new(date(2020, 1, 2), f64::NAN)]).unwrap_err();
        assert!(matches!(err, BlueChipError::MalformedTimeSeries(_)));
    }

    #[test]
    fn test_ticker_record_from_listing_defaults() {
        let record = TickerRecord::from_listing(
            "KO",
            "Coca-Cola",
            "NYSE",
            Some(date(1962, 1, 2)),
            None,
            None,
            date(2024, 10, 17),
        )
        .unwrap();
        assert_eq!(record.start_date, date(1962, 1, 2));
        assert_eq!(record.end_date, date(2024, 10, 16));

        let record =
            TickerRecord::from_listing("X", "X", "NYSE", None, None, None, date(2024, 10, 17))
                .unwrap();
        assert_eq!(record.start_date, date(1974, 10, 16));
    }

    #[test]
    fn test_ticker_record_rejects_inverted_window() {
        let err = TickerRecord::new("X", "X", "NYSE", date(2024, 1, 2), date(2024, 1, 1));
        assert!(matches!(err, Err(BlueChipError::InvalidConfig(_))));
    }
}
