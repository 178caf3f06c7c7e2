//! Data loading utilities for the bluechip CLI.

use anyhow::{Context, Result};
use bluechip_fmp::{FmpClient, FmpProvider};
use bluechip_traits::{
    Date, DividendSeries, MarketDataProvider, PriceSeries, TickerHistory, TickerRecord,
};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::info;

/// Parse a date string in YYYY-MM-DD format.
pub(crate) fn parse_date(date_str: &str) -> Result<Date> {
    Date::parse_from_str(date_str, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{date_str}', expected YYYY-MM-DD"))
}

/// Parse an optional date argument.
pub(crate) fn parse_opt_date(date_str: Option<&str>) -> Result<Option<Date>> {
    date_str.map(parse_date).transpose()
}

/// Load a JSON config file, or the type's defaults when no path is given.
pub(crate) fn load_config<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T> {
    let Some(path) = path else {
        return Ok(T::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid config '{}'", path.display()))
}

/// Create the FMP provider from `FMP_API_KEY`.
pub(crate) fn fmp_provider(today: Date) -> Result<FmpProvider> {
    let client = FmpClient::from_env().context("FMP client setup failed")?;
    Ok(FmpProvider::new(client, today))
}

/// Download the dividend and price history of a ticker for its window.
pub(crate) async fn load_history(
    provider: &dyn MarketDataProvider,
    record: TickerRecord,
) -> Result<TickerHistory> {
    let symbol = record.symbol.clone();
    let dividends = provider
        .dividend_history(&symbol)
        .await
        .with_context(|| format!("{symbol}: dividend history"))?;
    let prices = provider
        .daily_price_history(&symbol, record.start_date, record.end_date)
        .await
        .with_context(|| format!("{symbol}: price history"))?;

    let dividends = DividendSeries::new(dividends)?;
    let prices = PriceSeries::new(prices)?;
    info!(
        symbol = %symbol,
        dividends = dividends.len(),
        prices = prices.len(),
        "Loaded history"
    );
    Ok(TickerHistory::new(record, dividends, prices))
}
