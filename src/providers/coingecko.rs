use super::util::with_retry;
use crate::core::quote::{AssetLists, RemoteQuoteClient};
use crate::core::rate::parse_decimal;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::{HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

const API_KEY_HEADER: &str = "x-cg-demo-api-key";
const LIST_RETRIES: usize = 2;
const LIST_RETRY_DELAY: Duration = Duration::from_millis(500);
/// `/coins/list` then `/simple/supported_vs_currencies`, one after the other.
const LIST_ENDPOINTS: u32 = 2;

#[derive(Debug, Deserialize)]
struct CoinListing {
    id: String,
    symbol: String,
}

/// Raw `/simple/price` body, e.g. `{"bitcoin": {"usd": 43123.5}}`.
///
/// Prices stay as raw JSON text so their precision survives deserialization.
type SimplePriceResponse = HashMap<String, HashMap<String, Box<RawValue>>>;

/// CoinGecko-backed quote client.
pub struct CoinGeckoClient {
    base_url: String,
    client: reqwest::Client,
}

impl CoinGeckoClient {
    pub fn new(base_url: &str, api_key: Option<&str>, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            headers.insert(
                API_KEY_HEADER,
                HeaderValue::from_str(key).context("Invalid CoinGecko API key")?,
            );
        }

        let client = reqwest::Client::builder()
            .user_agent("coinconv/0.1")
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Longest a full asset-list fetch can take when every attempt times out.
    pub fn asset_lists_deadline(request_timeout: Duration) -> Duration {
        let attempts = LIST_ENDPOINTS * (LIST_RETRIES as u32 + 1);
        let pauses = LIST_ENDPOINTS * LIST_RETRIES as u32;
        request_timeout * attempts + LIST_RETRY_DELAY * pauses
    }

    async fn get_with_retry<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("Requesting {}", url);

        let client = &self.client;
        let target = &url;
        let response = with_retry(
            || async move { client.get(target).send().await?.error_for_status() },
            LIST_RETRIES,
            LIST_RETRY_DELAY,
        )
        .await
        .with_context(|| format!("Request failed: {url}"))?;

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse JSON response from {url}"))
    }
}

#[async_trait]
impl RemoteQuoteClient for CoinGeckoClient {
    #[instrument(name = "CoinGeckoAssetLists", skip(self))]
    async fn fetch_asset_lists(&self) -> Result<AssetLists> {
        let coins: Vec<CoinListing> = self.get_with_retry("/coins/list").await?;
        let currencies: Vec<String> = self
            .get_with_retry("/simple/supported_vs_currencies")
            .await?;

        // Symbols are not unique upstream; the last listing wins.
        let mut crypto_ids_by_symbol = HashMap::with_capacity(coins.len());
        for coin in coins {
            crypto_ids_by_symbol.insert(coin.symbol.to_lowercase(), coin.id);
        }
        debug!(
            cryptos = crypto_ids_by_symbol.len(),
            currencies = currencies.len(),
            "Received asset lists"
        );

        Ok(AssetLists {
            crypto_ids_by_symbol,
            currencies,
        })
    }

    #[instrument(
        name = "CoinGeckoRateFetch",
        skip(self),
        fields(remote_id = %remote_id, target_unit = %target_unit)
    )]
    async fn fetch_rate(&self, remote_id: &str, target_unit: &str) -> Result<Decimal> {
        let target_unit = target_unit.to_lowercase();
        let mut url = Url::parse(&format!("{}/simple/price", self.base_url))
            .with_context(|| format!("Invalid base URL: {}", self.base_url))?;
        url.query_pairs_mut()
            .append_pair("ids", remote_id)
            .append_pair("vs_currencies", &target_unit);
        debug!("Requesting rate from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for {}/{}", e, remote_id, target_unit))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for {}/{}",
                response.status(),
                remote_id,
                target_unit
            ));
        }

        let data: SimplePriceResponse = response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response for {remote_id}"))?;

        let raw = data
            .get(remote_id)
            .and_then(|prices| prices.get(&target_unit))
            .ok_or_else(|| anyhow!("No rate found for {}/{}", remote_id, target_unit))?;

        parse_decimal(raw.get())
            .ok_or_else(|| anyhow!("Unparsable rate {} for {}/{}", raw.get(), remote_id, target_unit))
    }
}
