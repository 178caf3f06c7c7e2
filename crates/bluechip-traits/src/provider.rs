//! Market data provider trait.
//!
//! The screening pipeline and the valuation model never talk to a remote API
//! directly. They pull everything through a [`MarketDataProvider`], which keeps
//! transport, authentication and response parsing out of the core logic and
//! lets tests substitute an in-memory implementation.

use crate::{Date, DividendEvent, PriceBar, Result};
use async_trait::async_trait;
use chrono::FixedOffset;

/// A source of per-symbol market data.
///
/// Implementations must report provider throttling as
/// [`BlueChipError::RateLimited`](crate::BlueChipError::RateLimited) so the
/// pipeline can tell a recoverable slowdown apart from missing data, which
/// should surface as
/// [`BlueChipError::DataUnavailable`](crate::BlueChipError::DataUnavailable).
///
/// # Example
///
/// ```no_run
/// use async_trait::async_trait;
/// use bluechip_traits::{Date, DividendEvent, MarketDataProvider, PriceBar, Result};
/// use chrono::FixedOffset;
///
/// #[derive(Debug)]
/// struct Offline;
///
/// #[async_trait]
/// impl MarketDataProvider for Offline {
///     async fn dividend_history(&self, _symbol: &str) -> Result<Vec<DividendEvent>> {
///         Ok(Vec::new())
///     }
///     async fn share_count(&self, _symbol: &str) -> Result<u64> {
///         Ok(0)
///     }
///     async fn institutional_holder_count(&self, _symbol: &str) -> Result<u64> {
///         Ok(0)
///     }
///     async fn institutional_float_fraction(&self, _symbol: &str) -> Result<f64> {
///         Ok(0.0)
///     }
///     async fn daily_price_history(
///         &self,
///         _symbol: &str,
///         _start: Date,
///         _end: Date,
///     ) -> Result<Vec<PriceBar>> {
///         Ok(Vec::new())
///     }
///     async fn exchange_timezone(&self, _symbol: &str) -> Result<FixedOffset> {
///         Ok(FixedOffset::east_opt(0).unwrap())
///     }
/// }
/// ```
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Full dividend history of a symbol in ascending date order.
    async fn dividend_history(&self, symbol: &str) -> Result<Vec<DividendEvent>>;

    /// Number of shares outstanding.
    async fn share_count(&self, symbol: &str) -> Result<u64>;

    /// Number of institutions holding the symbol.
    async fn institutional_holder_count(&self, symbol: &str) -> Result<u64>;

    /// Fraction of the float held by institutions, in `[0, 1]`.
    async fn institutional_float_fraction(&self, symbol: &str) -> Result<f64>;

    /// Daily closing prices within `[start, end]`.
    async fn daily_price_history(&self, symbol: &str, start: Date, end: Date)
    -> Result<Vec<PriceBar>>;

    /// UTC offset of the exchange the symbol trades on.
    async fn exchange_timezone(&self, symbol: &str) -> Result<FixedOffset>;

    /// First trading day of the symbol, `None` if the provider does not know it.
    async fn first_trade_date(&self, _symbol: &str) -> Result<Option<Date>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BlueChipError;
    use std::sync::Arc;

    #[derive(Debug)]
    struct Throttled;

    #[async_trait]
    impl MarketDataProvider for Throttled {
        async fn dividend_history(&self, _symbol: &str) -> Result<Vec<DividendEvent>> {
            Err(BlueChipError::RateLimited)
        }
        async fn share_count(&self, _symbol: &str) -> Result<u64> {
            Ok(1)
        }
        async fn institutional_holder_count(&self, _symbol: &str) -> Result<u64> {
            Ok(1)
        }
        async fn institutional_float_fraction(&self, _symbol: &str) -> Result<f64> {
            Ok(1.0)
        }
        async fn daily_price_history(
            &self,
            _symbol: &str,
            _start: Date,
            _end: Date,
        ) -> Result<Vec<PriceBar>> {
            Err(BlueChipError::DataUnavailable("offline".into()))
        }
        async fn exchange_timezone(&self, _symbol: &str) -> Result<FixedOffset> {
            Ok(FixedOffset::west_opt(5 * 3600).unwrap())
        }
    }

    #[tokio::test]
    async fn test_provider_is_object_safe() {
        let provider: Arc<dyn MarketDataProvider> = Arc::new(Throttled);
        let err = provider.dividend_history("KO").await.unwrap_err();
        assert!(err.is_rate_limited());
        assert_eq!(provider.share_count("KO").await.unwrap(), 1);
        assert_eq!(provider.first_trade_date("KO").await.unwrap(), None);
    }

    #[test]
    fn test_provider_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn MarketDataProvider>();
    }
}
