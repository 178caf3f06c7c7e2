//! Data types for FMP API responses.

use crate::{Result, error::FmpError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

fn parse_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| FmpError::InvalidDate(date.to_string()))
}

/// A dividend payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DividendRecord {
    /// Ex-dividend date.
    pub date: String,
    /// Record date.
    #[serde(default)]
    pub record_date: Option<String>,
    /// Payment date.
    #[serde(default)]
    pub payment_date: Option<String>,
    /// Split-adjusted dividend per share.
    #[serde(default)]
    pub adj_dividend: f64,
    /// Dividend per share as declared.
    #[serde(default)]
    pub dividend: f64,
}

impl DividendRecord {
    /// Parse the ex-dividend date.
    ///
    /// # Errors
    ///
    /// Returns [`FmpError::InvalidDate`] if the date is not `YYYY-MM-DD`.
    pub fn parsed_date(&self) -> Result<NaiveDate> {
        parse_date(&self.date)
    }

    /// Split-adjusted amount, falling back to the declared amount.
    #[must_use]
    pub fn amount(&self) -> f64 {
        if self.adj_dividend > 0.0 {
            self.adj_dividend
        } else {
            self.dividend
        }
    }
}

/// Float and outstanding share counts.
///
/// FMP omits fields it has no figure for, so every count is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharesFloat {
    /// Ticker symbol.
    pub symbol: String,
    /// Snapshot date.
    #[serde(default)]
    pub date: Option<String>,
    /// Free float in percent.
    #[serde(default)]
    pub free_float: Option<f64>,
    /// Shares in the float.
    #[serde(default)]
    pub float_shares: Option<f64>,
    /// Shares outstanding.
    #[serde(default)]
    pub outstanding_shares: Option<f64>,
}

/// Quarterly summary of 13F institutional positions in a symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstitutionalPositionsSummary {
    /// Ticker symbol.
    pub symbol: String,
    /// Quarter end of the filings.
    #[serde(default)]
    pub date: Option<String>,
    /// Number of institutions holding the symbol.
    #[serde(default)]
    pub investors_holding: Option<u64>,
    /// Shares held by institutions.
    #[serde(rename = "numberOf13Fshares", default)]
    pub number_of_13f_shares: Option<f64>,
    /// Percentage of shares held by institutions.
    #[serde(default)]
    pub ownership_percent: Option<f64>,
}

impl InstitutionalPositionsSummary {
    /// Ownership as a fraction in `[0, 1]`, `None` if not reported.
    #[must_use]
    pub fn ownership_fraction(&self) -> Option<f64> {
        self.ownership_percent
            .filter(|p| p.is_finite())
            .map(|p| (p / 100.0).clamp(0.0, 1.0))
    }
}

/// Company profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    /// Ticker symbol.
    pub symbol: String,
    /// Company name.
    #[serde(default)]
    pub company_name: String,
    /// Exchange short name, e.g. "NYSE".
    #[serde(default)]
    pub exchange: String,
    /// First trading day.
    #[serde(default)]
    pub ipo_date: Option<String>,
    /// Whether the symbol still trades.
    #[serde(default)]
    pub is_actively_trading: bool,
}

impl CompanyProfile {
    /// Parse the IPO date, if present and well formed.
    #[must_use]
    pub fn parsed_ipo_date(&self) -> Option<NaiveDate> {
        self.ipo_date.as_deref().and_then(|d| parse_date(d).ok())
    }
}

/// Historical price data point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalPrice {
    /// Date.
    pub date: String,
    /// Close price.
    pub close: f64,
    /// Adjusted close.
    #[serde(rename = "adjClose", default)]
    pub adj_close: Option<f64>,
}

impl HistoricalPrice {
    /// Parse the date string into a NaiveDate.
    ///
    /// # Errors
    ///
    /// Returns [`FmpError::InvalidDate`] if the date is not `YYYY-MM-DD`.
    pub fn parsed_date(&self) -> Result<NaiveDate> {
        parse_date(&self.date)
    }

    /// Adjusted close when available, raw close otherwise.
    #[must_use]
    pub fn best_close(&self) -> f64 {
        self.adj_close.filter(|c| *c > 0.0).unwrap_or(self.close)
    }
}

/// A row of the company screener.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenerEntry {
    /// Ticker symbol.
    pub symbol: String,
    /// Company name.
    #[serde(default)]
    pub company_name: String,
    /// Exchange short name.
    #[serde(default)]
    pub exchange_short_name: String,
    /// Whether the symbol is an ETF.
    #[serde(default)]
    pub is_etf: bool,
    /// Whether the symbol is a fund.
    #[serde(default)]
    pub is_fund: bool,
}
