//! FMP API client implementation.

use crate::{
    Result,
    error::FmpError,
    types::{
        CompanyProfile, DividendRecord, HistoricalPrice, InstitutionalPositionsSummary,
        ScreenerEntry, SharesFloat,
    },
};
use bluechip_traits::{Date, Quarter};
use reqwest::Client;
use std::env;
use tracing::debug;

/// Base URL for the FMP stable API.
const FMP_BASE_URL: &str = "https://financialmodelingprep.com/stable";

/// Upper bound on rows requested from the company screener.
const SCREENER_LIMIT: u32 = 10_000;

/// Financial Modeling Prep API client.
#[derive(Debug, Clone)]
pub struct FmpClient {
    client: Client,
    api_key: String,
}

impl FmpClient {
    /// Create a new FMP client with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
        }
    }

    /// Create a new FMP client from the `FMP_API_KEY` environment variable.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    ///
    /// # Errors
    ///
    /// Returns [`FmpError::MissingApiKey`] if the variable is not set.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let api_key = env::var("FMP_API_KEY").map_err(|_| FmpError::MissingApiKey)?;

        Ok(Self::new(api_key))
    }

    fn url(&self, endpoint: &str) -> String {
        if endpoint.contains('?') {
            format!("{FMP_BASE_URL}/{endpoint}&apikey={}", self.api_key)
        } else {
            format!("{FMP_BASE_URL}/{endpoint}?apikey={}", self.api_key)
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        debug!(endpoint, "FMP request");
        let response = self.client.get(self.url(endpoint)).send().await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FmpError::RateLimitExceeded);
        }

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(FmpError::Api(format!("HTTP {status}: {text}")));
        }

        let text = response.text().await?;

        if text.contains("\"Error Message\"") {
            if text.contains("Limit Reach") {
                return Err(FmpError::RateLimitExceeded);
            }
            return Err(FmpError::Api(text));
        }

        Ok(serde_json::from_str(&text)?)
    }

    /// Full dividend history of a symbol, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn dividends(&self, symbol: &str) -> Result<Vec<DividendRecord>> {
        let endpoint = format!("dividends?symbol={}", symbol.to_uppercase());
        self.get(&endpoint).await
    }

    /// Float and outstanding shares of a symbol.
    ///
    /// # Errors
    ///
    /// Returns [`FmpError::NoData`] if the response is empty.
    pub async fn shares_float(&self, symbol: &str) -> Result<SharesFloat> {
        let endpoint = format!("shares-float?symbol={}", symbol.to_uppercase());
        let rows: Vec<SharesFloat> = self.get(&endpoint).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| FmpError::NoData(format!("{symbol} shares float")))
    }

    /// Summary of 13F positions in a symbol for one filing quarter.
    ///
    /// # Errors
    ///
    /// Returns [`FmpError::NoData`] if no filings are reported for the quarter.
    pub async fn institutional_summary(
        &self,
        symbol: &str,
        quarter: Quarter,
    ) -> Result<InstitutionalPositionsSummary> {
        let endpoint = format!(
            "institutional-ownership/symbol-positions-summary?symbol={}&year={}&quarter={}",
            symbol.to_uppercase(),
            quarter.year,
            quarter.quarter
        );
        let rows: Vec<InstitutionalPositionsSummary> = self.get(&endpoint).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| FmpError::NoData(format!("{symbol} 13F summary for {quarter}")))
    }

    /// Company profile.
    ///
    /// # Errors
    ///
    /// Returns [`FmpError::SymbolNotFound`] if the symbol is unknown.
    pub async fn profile(&self, symbol: &str) -> Result<CompanyProfile> {
        let endpoint = format!("profile?symbol={}", symbol.to_uppercase());
        let profiles: Vec<CompanyProfile> = self.get(&endpoint).await?;
        profiles
            .into_iter()
            .next()
            .ok_or_else(|| FmpError::SymbolNotFound(symbol.to_string()))
    }

    /// Daily end-of-day prices within `[from, to]`, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn historical_prices(
        &self,
        symbol: &str,
        from: Date,
        to: Date,
    ) -> Result<Vec<HistoricalPrice>> {
        let endpoint = format!(
            "historical-price-eod/full?symbol={}&from={}&to={}",
            symbol.to_uppercase(),
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d")
        );
        self.get(&endpoint).await
    }

    /// Actively traded common stocks listed on an exchange.
    ///
    /// ETFs and funds are excluded.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn exchange_listing(&self, exchange: &str) -> Result<Vec<ScreenerEntry>> {
        let endpoint = format!(
            "company-screener?exchange={}&isEtf=false&isFund=false&isActivelyTrading=true&limit={SCREENER_LIMIT}",
            exchange.to_uppercase()
        );
        let entries: Vec<ScreenerEntry> = self.get(&endpoint).await?;
        Ok(entries
            .into_iter()
            .filter(|e| !e.is_etf && !e.is_fund)
            .collect())
    }
}
