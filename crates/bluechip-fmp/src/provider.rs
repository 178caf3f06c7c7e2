//! [`MarketDataProvider`] backed by the FMP API.

use crate::{
    FmpClient,
    error::FmpError,
    exchange::exchange_offset,
    types::{CompanyProfile, InstitutionalPositionsSummary, SharesFloat},
};
use async_trait::async_trait;
use bluechip_traits::{
    BlueChipError, Date, DividendEvent, MarketDataProvider, PriceBar, Quarter, Result,
};
use chrono::{Days, FixedOffset, Offset, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Days after quarter end by which 13F filings are due.
const FILING_DELAY_DAYS: u64 = 45;

/// The quarter before `quarter`.
const fn previous_quarter(quarter: Quarter) -> Quarter {
    if quarter.quarter == 1 {
        Quarter {
            year: quarter.year - 1,
            quarter: 4,
        }
    } else {
        Quarter {
            year: quarter.year,
            quarter: quarter.quarter - 1,
        }
    }
}

/// Most recent quarter whose 13F filing deadline has passed on `as_of`.
#[must_use]
pub fn latest_filed_quarter(as_of: Date) -> Quarter {
    let mut quarter = previous_quarter(Quarter::of(as_of));
    while quarter
        .end_date()
        .checked_add_days(Days::new(FILING_DELAY_DAYS))
        .is_some_and(|due| due > as_of)
    {
        quarter = previous_quarter(quarter);
    }
    quarter
}

fn missing_ownership(symbol: &str, what: &str) -> BlueChipError {
    BlueChipError::InsufficientOwnershipData(format!("{symbol}: {what} not reported"))
}

/// Shares outstanding from a float snapshot.
fn outstanding_shares(symbol: &str, float: &SharesFloat) -> Result<u64> {
    let shares = float
        .outstanding_shares
        .ok_or_else(|| missing_ownership(symbol, "shares outstanding"))?;
    if !shares.is_finite() || shares < 0.0 {
        return Err(BlueChipError::DataUnavailable(format!(
            "{symbol}: invalid share count {shares}"
        )));
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let shares = shares.round() as u64;
    Ok(shares)
}

fn holder_count(symbol: &str, summary: &InstitutionalPositionsSummary) -> Result<u64> {
    summary
        .investors_holding
        .ok_or_else(|| missing_ownership(symbol, "institutional holder count"))
}

fn float_fraction(symbol: &str, summary: &InstitutionalPositionsSummary) -> Result<f64> {
    summary
        .ownership_fraction()
        .ok_or_else(|| missing_ownership(symbol, "institutional ownership percent"))
}

/// FMP-backed market data.
///
/// Company profiles and 13F summaries are fetched once per symbol and cached,
/// since several criteria read from the same response.
#[derive(Debug)]
pub struct FmpProvider {
    client: FmpClient,
    as_of: Date,
    profiles: Mutex<HashMap<String, CompanyProfile>>,
    summaries: Mutex<HashMap<String, InstitutionalPositionsSummary>>,
}

impl FmpProvider {
    /// Create a provider that reports ownership as known on `as_of`.
    #[must_use]
    pub fn new(client: FmpClient, as_of: Date) -> Self {
        Self {
            client,
            as_of,
            profiles: Mutex::new(HashMap::new()),
            summaries: Mutex::new(HashMap::new()),
        }
    }

    /// The underlying API client.
    #[must_use]
    pub const fn client(&self) -> &FmpClient {
        &self.client
    }

    async fn profile(&self, symbol: &str) -> std::result::Result<CompanyProfile, FmpError> {
        if let Some(profile) = self.profiles.lock().await.get(symbol) {
            return Ok(profile.clone());
        }
        let profile = self.client.profile(symbol).await?;
        self.profiles
            .lock()
            .await
            .insert(symbol.to_string(), profile.clone());
        Ok(profile)
    }

    /// 13F summary for the latest filed quarter, falling back one quarter when
    /// the latest has no filings yet.
    async fn summary(
        &self,
        symbol: &str,
    ) -> std::result::Result<InstitutionalPositionsSummary, FmpError> {
        if let Some(summary) = self.summaries.lock().await.get(symbol) {
            return Ok(summary.clone());
        }
        let quarter = latest_filed_quarter(self.as_of);
        let summary = match self.client.institutional_summary(symbol, quarter).await {
            Err(FmpError::NoData(_)) => {
                debug!(symbol, %quarter, "no 13F summary, trying previous quarter");
                self.client
                    .institutional_summary(symbol, previous_quarter(quarter))
                    .await?
            }
            other => other?,
        };
        self.summaries
            .lock()
            .await
            .insert(symbol.to_string(), summary.clone());
        Ok(summary)
    }
}

#[async_trait]
impl MarketDataProvider for FmpProvider {
    async fn dividend_history(&self, symbol: &str) -> Result<Vec<DividendEvent>> {
        let records = self.client.dividends(symbol).await?;
        let mut events = Vec::with_capacity(records.len());
        for record in &records {
            let amount = record.amount();
            if amount > 0.0 {
                events.push(DividendEvent::new(record.parsed_date()?, amount));
            }
        }
        events.sort_by_key(|e| e.date);
        Ok(events)
    }

    async fn share_count(&self, symbol: &str) -> Result<u64> {
        let float = self.client.shares_float(symbol).await?;
        outstanding_shares(symbol, &float)
    }

    async fn institutional_holder_count(&self, symbol: &str) -> Result<u64> {
        holder_count(symbol, &self.summary(symbol).await?)
    }

    async fn institutional_float_fraction(&self, symbol: &str) -> Result<f64> {
        float_fraction(symbol, &self.summary(symbol).await?)
    }

    async fn daily_price_history(
        &self,
        symbol: &str,
        start: Date,
        end: Date,
    ) -> Result<Vec<PriceBar>> {
        let prices = self.client.historical_prices(symbol, start, end).await?;
        let mut bars = Vec::with_capacity(prices.len());
        for price in &prices {
            bars.push(PriceBar::new(price.parsed_date()?, price.best_close()));
        }
        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    async fn exchange_timezone(&self, symbol: &str) -> Result<FixedOffset> {
        let profile = self.profile(symbol).await?;
        match exchange_offset(&profile.exchange) {
            Some(offset) => Ok(offset),
            None => {
                warn!(symbol, exchange = %profile.exchange, "unknown exchange, assuming UTC");
                Ok(Utc.fix())
            }
        }
    }

    async fn first_trade_date(&self, symbol: &str) -> Result<Option<Date>> {
        Ok(self.profile(symbol).await?.parsed_ipo_date())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_latest_filed_quarter() {
        // 2024Q2 ends June 30, filings due August 14.
        assert_eq!(
            latest_filed_quarter(date(2024, 8, 14)),
            Quarter {
                year: 2024,
                quarter: 2
            }
        );
        assert_eq!(
            latest_filed_quarter(date(2024, 8, 13)),
            Quarter {
                year: 2024,
                quarter: 1
            }
        );
    }

    #[test]
    fn test_latest_filed_quarter_crosses_year() {
        assert_eq!(
            latest_filed_quarter(date(2025, 1, 10)),
            Quarter {
                year: 2024,
                quarter: 3
            }
        );
        assert_eq!(
            latest_filed_quarter(date(2025, 2, 20)),
            Quarter {
                year: 2024,
                quarter: 4
            }
        );
    }

    fn summary(json: &str) -> InstitutionalPositionsSummary {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_missing_ownership_is_insufficient_data() {
        let empty = summary(r#"{"symbol":"KO"}"#);
        assert!(matches!(
            holder_count("KO", &empty),
            Err(BlueChipError::InsufficientOwnershipData(ref s)) if s.starts_with("KO")
        ));
        assert!(matches!(
            float_fraction("KO", &empty),
            Err(BlueChipError::InsufficientOwnershipData(_))
        ));

        let float: SharesFloat = serde_json::from_str(r#"{"symbol":"KO"}"#).unwrap();
        assert!(matches!(
            outstanding_shares("KO", &float),
            Err(BlueChipError::InsufficientOwnershipData(_))
        ));
    }

    #[test]
    fn test_reported_ownership() {
        let full = summary(r#"{"symbol":"KO","investorsHolding":3401,"ownershipPercent":64.2}"#);
        assert_eq!(holder_count("KO", &full).unwrap(), 3401);
        assert!((float_fraction("KO", &full).unwrap() - 0.642).abs() < 1e-12);

        let float: SharesFloat =
            serde_json::from_str(r#"{"symbol":"KO","outstandingShares":4.31e9}"#).unwrap();
        assert_eq!(outstanding_shares("KO", &float).unwrap(), 4_310_000_000);

        let negative: SharesFloat =
            serde_json::from_str(r#"{"symbol":"KO","outstandingShares":-1.0}"#).unwrap();
        assert!(matches!(
            outstanding_shares("KO", &negative),
            Err(BlueChipError::DataUnavailable(_))
        ));
    }

    #[test]
    fn test_previous_quarter() {
        let q1 = Quarter {
            year: 2024,
            quarter: 1,
        };
        assert_eq!(previous_quarter(q1).to_string(), "2023Q4");
        assert_eq!(previous_quarter(q1).next(), q1);
    }
}
