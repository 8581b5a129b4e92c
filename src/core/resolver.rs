//! Resolves the active exchange rate from the live service or a manual entry

use crate::core::catalog::AssetCatalogCache;
use crate::core::error::QuoteError;
use crate::core::quote::RemoteQuoteClient;
use crate::core::rate::{ConversionMode, QuotePair, Rate};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

pub struct RateResolver {
    catalog: Arc<AssetCatalogCache>,
    client: Arc<dyn RemoteQuoteClient>,
    timeout: Duration,
    last_live: Option<(QuotePair, Rate)>,
}

impl RateResolver {
    pub fn new(
        catalog: Arc<AssetCatalogCache>,
        client: Arc<dyn RemoteQuoteClient>,
        timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            client,
            timeout,
            last_live: None,
        }
    }

    /// Resolves the rate for `pair`.
    ///
    /// Manual mode parses `manual_rate_text`. Live mode reuses the last live
    /// rate while the pair is unchanged and otherwise fetches once. A manual
    /// resolution leaves the remembered live rate alone.
    pub async fn resolve(
        &mut self,
        pair: &QuotePair,
        mode: ConversionMode,
        manual_rate_text: Option<&str>,
    ) -> Result<Rate, QuoteError> {
        match mode {
            ConversionMode::Manual => manual_rate_text.unwrap_or_default().parse::<Rate>(),
            ConversionMode::Live => {
                if let Some(rate) = self.cached(pair) {
                    debug!(%pair, "Live rate cache HIT");
                    return Ok(rate);
                }
                debug!(%pair, "Live rate cache MISS");
                self.fetch_live(pair).await
            }
        }
    }

    /// Fetches the live rate for `pair` even if it is cached.
    ///
    /// On failure the previously cached rate is kept.
    pub async fn refresh_live(&mut self, pair: &QuotePair) -> Result<Rate, QuoteError> {
        self.fetch_live(pair).await
    }

    /// Last successfully fetched live rate for `pair`, if any.
    pub fn cached(&self, pair: &QuotePair) -> Option<Rate> {
        self.last_live
            .as_ref()
            .filter(|(cached_pair, _)| cached_pair == pair)
            .map(|(_, rate)| *rate)
    }

    #[instrument(name = "LiveRateFetch", skip(self), fields(pair = %pair))]
    async fn fetch_live(&mut self, pair: &QuotePair) -> Result<Rate, QuoteError> {
        let catalog = self.catalog.current_catalog().ok_or(QuoteError::NoAssets)?;
        let remote_id = catalog
            .remote_id(pair.source())
            .ok_or_else(|| QuoteError::UnknownSymbol(pair.display_source()))?;

        let value = tokio::time::timeout(
            self.timeout,
            self.client.fetch_rate(remote_id, pair.target()),
        )
        .await
        .map_err(|_| {
            QuoteError::RemoteFetchFailure(format!("Timed out after {:?}", self.timeout))
        })?
        .map_err(|e| QuoteError::remote(&e))?;

        let rate = Rate::from_decimal(value)?;
        debug!(%rate, precision = rate.precision(), "Fetched live rate");
        self.last_live = Some((pair.clone(), rate));
        Ok(rate)
    }
}
