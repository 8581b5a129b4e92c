//! State-owning conversion session driven by user events and refresh ticks

use crate::core::convert::{self, NOT_AVAILABLE, parse_amount};
use crate::core::error::QuoteError;
use crate::core::preferences::Preferences;
use crate::core::rate::{ConversionMode, QuotePair, Rate};
use crate::core::resolver::RateResolver;
use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// One rendered conversion, ready for display.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub pair: QuotePair,
    pub amount: String,
    pub result: String,
    pub rate_label: Option<String>,
    pub mode: ConversionMode,
    pub updated_at: DateTime<Local>,
}

impl Conversion {
    pub fn is_available(&self) -> bool {
        self.result != NOT_AVAILABLE
    }
}

/// Holds the user's inputs and turns them into conversions.
///
/// User events go through [`ConversionSession::convert`], which reuses the
/// cached live rate for an unchanged pair. Scheduler ticks go through
/// [`ConversionSession::refresh`], which always asks the service again.
pub struct ConversionSession {
    resolver: RateResolver,
    pair: QuotePair,
    amount_text: String,
    manual_rate_text: String,
    mode: ConversionMode,
    inverted: bool,
}

impl ConversionSession {
    pub fn new(resolver: RateResolver, pair: QuotePair) -> Self {
        Self {
            resolver,
            pair,
            amount_text: "1".to_string(),
            manual_rate_text: String::new(),
            mode: ConversionMode::Live,
            inverted: false,
        }
    }

    pub fn pair(&self) -> &QuotePair {
        &self.pair
    }

    pub fn mode(&self) -> ConversionMode {
        self.mode
    }

    pub fn inverted(&self) -> bool {
        self.inverted
    }

    pub fn set_pair(&mut self, pair: QuotePair) {
        self.pair = pair;
    }

    pub fn set_amount(&mut self, text: impl Into<String>) {
        self.amount_text = text.into();
    }

    pub fn set_manual_rate(&mut self, text: impl Into<String>) {
        self.manual_rate_text = text.into();
    }

    pub fn set_mode(&mut self, mode: ConversionMode) {
        self.mode = mode;
    }

    pub fn set_inverted(&mut self, inverted: bool) {
        self.inverted = inverted;
    }

    pub fn preferences(&self) -> Preferences {
        Preferences::from_pair(&self.pair)
    }

    /// Resolves the rate for the current inputs and converts the amount.
    ///
    /// A malformed amount short-circuits to `N/A` without touching the
    /// network.
    pub async fn convert(&mut self) -> Conversion {
        let amount = match parse_amount(&self.amount_text) {
            Ok(amount) => amount,
            Err(e) => {
                log_failure(&e);
                return self.unavailable();
            }
        };

        match self
            .resolver
            .resolve(&self.pair, self.mode, Some(self.manual_rate_text.as_str()))
            .await
        {
            Ok(rate) => self.render(&rate, amount),
            Err(e) => {
                log_failure(&e);
                self.unavailable()
            }
        }
    }

    /// Re-fetches the live rate and converts again.
    ///
    /// Returns `None` when there is nothing to refresh (manual mode, malformed
    /// amount) or the fetch failed; the caller keeps showing what it had.
    pub async fn refresh(&mut self) -> Option<Conversion> {
        if self.mode != ConversionMode::Live {
            return None;
        }
        let amount = match parse_amount(&self.amount_text) {
            Ok(amount) => amount,
            Err(e) => {
                debug!("Skipping refresh: {}", e);
                return None;
            }
        };

        match self.resolver.refresh_live(&self.pair).await {
            Ok(rate) => Some(self.render(&rate, amount)),
            Err(e) => {
                log_failure(&e);
                None
            }
        }
    }

    fn render(&self, rate: &Rate, amount: Decimal) -> Conversion {
        Conversion {
            pair: self.pair.clone(),
            amount: self.amount_text.clone(),
            result: convert::convert(rate, amount, self.mode, self.inverted),
            rate_label: Some(convert::rate_label(rate, &self.pair, self.inverted)),
            mode: self.mode,
            updated_at: Local::now(),
        }
    }

    fn unavailable(&self) -> Conversion {
        Conversion {
            pair: self.pair.clone(),
            amount: self.amount_text.clone(),
            result: NOT_AVAILABLE.to_string(),
            rate_label: None,
            mode: self.mode,
            updated_at: Local::now(),
        }
    }
}

fn log_failure(err: &QuoteError) {
    match err {
        QuoteError::RemoteFetchFailure(_) | QuoteError::NoAssets => warn!("{}", err),
        _ => debug!("{}", err),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::catalog::AssetCatalogCache;
    use crate::core::quote::{AssetLists, RemoteQuoteClient};
    use crate::core::store::AssetCatalogStore;
    use crate::store::memory::MemoryStore;
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::str::FromStr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Quote client answering from a fixed table, counting rate fetches.
    pub(crate) struct TableClient {
        pub(crate) rate_calls: AtomicUsize,
        pub(crate) rates: Mutex<HashMap<String, String>>,
    }

    impl TableClient {
        pub(crate) fn new(rates: &[(&str, &str)]) -> Arc<Self> {
            Arc::new(Self {
                rate_calls: AtomicUsize::new(0),
                rates: Mutex::new(
                    rates
                        .iter()
                        .map(|(key, rate)| (key.to_string(), rate.to_string()))
                        .collect(),
                ),
            })
        }

        pub(crate) fn calls(&self) -> usize {
            self.rate_calls.load(Ordering::SeqCst)
        }

        pub(crate) fn set(&self, key: &str, rate: &str) {
            self.rates
                .lock()
                .unwrap()
                .insert(key.to_string(), rate.to_string());
        }
    }

    #[async_trait]
    impl RemoteQuoteClient for TableClient {
        async fn fetch_asset_lists(&self) -> Result<AssetLists> {
            Ok(AssetLists {
                crypto_ids_by_symbol: HashMap::from([("btc".to_string(), "bitcoin".to_string())]),
                currencies: vec!["usd".to_string()],
            })
        }

        async fn fetch_rate(&self, remote_id: &str, target_unit: &str) -> Result<Decimal> {
            self.rate_calls.fetch_add(1, Ordering::SeqCst);
            let key = format!("{remote_id}/{target_unit}");
            let text = self
                .rates
                .lock()
                .unwrap()
                .get(&key)
                .cloned()
                .ok_or_else(|| anyhow!("no rate for {key}"))?;
            Ok(Decimal::from_str(&text)?)
        }
    }

    pub(crate) async fn session_with(client: Arc<TableClient>) -> ConversionSession {
        let cache = AssetCatalogCache::new(
            client.clone(),
            AssetCatalogStore::new(Arc::new(MemoryStore::new())),
        );
        cache.load().await.expect("catalog");
        let resolver = RateResolver::new(cache, client, Duration::from_secs(5));
        ConversionSession::new(resolver, QuotePair::new("btc", "usd"))
    }

    #[tokio::test]
    async fn test_live_conversion() {
        let client = TableClient::new(&[("bitcoin/usd", "43123.5")]);
        let mut session = session_with(client.clone()).await;
        session.set_amount("2");

        let conversion = session.convert().await;
        assert_eq!(conversion.result, "86247.0");
        assert_eq!(conversion.rate_label.as_deref(), Some("43123.5 USD/BTC"));
        assert_eq!(conversion.amount, "2");
        assert!(conversion.is_available());

        // Amount edits reuse the cached rate
        session.set_amount("3");
        assert_eq!(session.convert().await.result, "129370.5");
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_malformed_amount_makes_no_network_call() {
        let client = TableClient::new(&[("bitcoin/usd", "43123.5")]);
        let mut session = session_with(client.clone()).await;

        for text in ["", "abc", "1.2.3", "12abc"] {
            session.set_amount(text);
            let conversion = session.convert().await;
            assert_eq!(conversion.result, NOT_AVAILABLE);
            assert!(!conversion.is_available());
            assert!(session.refresh().await.is_none());
        }
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_not_available() {
        let client = TableClient::new(&[]);
        let mut session = session_with(client.clone()).await;
        session.set_pair(QuotePair::new("doge", "usd"));

        let conversion = session.convert().await;
        assert_eq!(conversion.result, NOT_AVAILABLE);
        assert!(conversion.rate_label.is_none());
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_manual_inverted_conversion() {
        let client = TableClient::new(&[]);
        let mut session = session_with(client.clone()).await;
        session.set_mode(ConversionMode::Manual);
        session.set_inverted(true);
        session.set_manual_rate("0.00031200");
        session.set_amount("10");

        let conversion = session.convert().await;
        assert_eq!(conversion.result, "32051.28205128");
        assert_eq!(
            conversion.rate_label.as_deref(),
            Some("3205.12820513 BTC/USD")
        );

        session.set_manual_rate("0");
        assert_eq!(session.convert().await.result, NOT_AVAILABLE);
        session.set_manual_rate("not a rate");
        assert_eq!(session.convert().await.result, NOT_AVAILABLE);
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_back_to_live_reuses_rate() {
        let client = TableClient::new(&[("bitcoin/usd", "43123.5")]);
        let mut session = session_with(client.clone()).await;
        session.set_amount("1");
        session.convert().await;

        session.set_mode(ConversionMode::Manual);
        session.set_manual_rate("40000");
        assert_eq!(session.convert().await.result, "40000");

        session.set_mode(ConversionMode::Live);
        assert_eq!(session.convert().await.result, "43123.5");
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_refresh_fetches_again() {
        let client = TableClient::new(&[("bitcoin/usd", "43123.5")]);
        let mut session = session_with(client.clone()).await;
        session.convert().await;

        client.set("bitcoin/usd", "43130.0");
        let refreshed = session.refresh().await.expect("refresh");
        assert_eq!(refreshed.result, "43130.0");
        assert_eq!(client.calls(), 2);

        session.set_mode(ConversionMode::Manual);
        assert!(session.refresh().await.is_none());
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn test_preferences_follow_pair() {
        let mut session = session_with(TableClient::new(&[])).await;
        session.set_pair(QuotePair::new("eth", "eur"));

        let prefs = session.preferences();
        assert_eq!(prefs.cryptocurrency, "ETH");
        assert_eq!(prefs.vs_currency, "EUR");
    }
}
