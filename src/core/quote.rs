//! Remote price-quote service abstraction

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// The two supported-asset lists as returned by the quote service.
#[derive(Debug, Clone, Default)]
pub struct AssetLists {
    pub crypto_ids_by_symbol: HashMap<String, String>,
    pub currencies: Vec<String>,
}

#[async_trait]
pub trait RemoteQuoteClient: Send + Sync {
    async fn fetch_asset_lists(&self) -> Result<AssetLists>;

    /// Fetches the price of `remote_id` in `target_unit`. The returned decimal
    /// keeps the scale of the service's representation.
    async fn fetch_rate(&self, remote_id: &str, target_unit: &str) -> Result<Decimal>;
}
