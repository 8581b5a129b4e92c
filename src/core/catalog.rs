//! Supported-asset catalog and its load/refresh policy
//!
//! The catalog is published as an immutable `Arc` snapshot. A refresh builds a
//! complete replacement and swaps it in, so readers only ever see the old or
//! the new catalog.

use crate::core::quote::{AssetLists, RemoteQuoteClient};
use crate::core::store::AssetCatalogStore;
use anyhow::{Context, Result, anyhow, ensure};
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Crypto symbol to remote id map plus the set of quotable currencies.
///
/// Symbols are stored lower-cased. Remote ids are opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetCatalog {
    crypto_ids: HashMap<String, String>,
    currencies: BTreeSet<String>,
}

impl AssetCatalog {
    /// Builds a catalog from fetched or stored lists. Both lists must be
    /// non-empty.
    pub fn from_lists(lists: AssetLists) -> Result<Self> {
        ensure!(
            !lists.crypto_ids_by_symbol.is_empty(),
            "Asset catalog has no crypto symbols"
        );
        ensure!(
            !lists.currencies.is_empty(),
            "Asset catalog has no currencies"
        );

        let crypto_ids = lists
            .crypto_ids_by_symbol
            .into_iter()
            .map(|(symbol, id)| (symbol.to_lowercase(), id))
            .collect();
        let currencies = lists
            .currencies
            .into_iter()
            .map(|c| c.to_lowercase())
            .collect();

        Ok(Self {
            crypto_ids,
            currencies,
        })
    }

    pub fn remote_id(&self, symbol: &str) -> Option<&str> {
        self.crypto_ids
            .get(&symbol.to_lowercase())
            .map(String::as_str)
    }

    pub fn crypto_ids(&self) -> &HashMap<String, String> {
        &self.crypto_ids
    }

    /// Lower-cased currencies in sorted order.
    pub fn currencies(&self) -> impl Iterator<Item = &str> {
        self.currencies.iter().map(String::as_str)
    }

    pub fn supports_currency(&self, unit: &str) -> bool {
        self.currencies.contains(&unit.to_lowercase())
    }

    pub fn crypto_count(&self) -> usize {
        self.crypto_ids.len()
    }

    pub fn currency_count(&self) -> usize {
        self.currencies.len()
    }
}

/// Snapshot of the refresh bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshState {
    pub last_refreshed_at: Option<DateTime<Utc>>,
    pub in_flight: bool,
}

/// Clears the in-flight flag when a refresh ends, including by panic.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(flag))
    }

    /// Takes over a flag that the caller has already set.
    fn held(flag: &'a AtomicBool) -> Self {
        InFlight(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns the current catalog and keeps it in sync with the local store and the
/// remote service.
pub struct AssetCatalogCache {
    client: Arc<dyn RemoteQuoteClient>,
    store: AssetCatalogStore,
    snapshot: RwLock<Option<Arc<AssetCatalog>>>,
    in_flight: AtomicBool,
    last_refreshed_at: Mutex<Option<DateTime<Utc>>>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl AssetCatalogCache {
    pub fn new(client: Arc<dyn RemoteQuoteClient>, store: AssetCatalogStore) -> Arc<Self> {
        Arc::new(Self {
            client,
            store,
            snapshot: RwLock::new(None),
            in_flight: AtomicBool::new(false),
            last_refreshed_at: Mutex::new(None),
            pending: Mutex::new(None),
        })
    }

    /// Makes the catalog available at startup.
    ///
    /// A stored catalog is used immediately and refreshed in the background.
    /// Without one, the lists are fetched before returning. `None` means no
    /// asset knowledge could be obtained at all.
    pub async fn load(self: &Arc<Self>) -> Option<Arc<AssetCatalog>> {
        match self.store.load() {
            Some(catalog) => {
                info!(
                    cryptos = catalog.crypto_count(),
                    currencies = catalog.currency_count(),
                    "Loaded stored asset catalog"
                );
                self.publish(catalog);
                self.refresh_async();
            }
            None => {
                info!("No stored asset catalog, fetching from remote");
                if let Err(e) = self.refresh_now().await {
                    warn!("Asset catalog unavailable: {:#}", e);
                }
            }
        }
        self.current_catalog()
    }

    /// Latest known-good snapshot, possibly stale.
    pub fn current_catalog(&self) -> Option<Arc<AssetCatalog>> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn refresh_state(&self) -> RefreshState {
        RefreshState {
            last_refreshed_at: *self
                .last_refreshed_at
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
            in_flight: self.in_flight.load(Ordering::Acquire),
        }
    }

    /// Fetches, persists and publishes a fresh catalog, waiting for the result.
    pub async fn refresh_now(&self) -> Result<Arc<AssetCatalog>> {
        let _in_flight = InFlight::acquire(&self.in_flight)
            .ok_or_else(|| anyhow!("Asset catalog refresh already in progress"))?;
        self.fetch_and_publish().await
    }

    /// Starts a background refresh unless one is already running.
    ///
    /// Returns whether a refresh was started. Failures are logged and leave the
    /// current catalog untouched.
    pub fn refresh_async(self: &Arc<Self>) -> bool {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Asset catalog refresh already in flight, skipping");
            return false;
        }

        let this = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let _in_flight = InFlight::held(&this.in_flight);
            if let Err(e) = this.fetch_and_publish().await {
                warn!("Background asset catalog refresh failed: {:#}", e);
            }
        });
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        true
    }

    /// Waits up to `timeout` for a background refresh to finish.
    pub async fn settle(&self, timeout: Duration) {
        let handle = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(handle) = handle else {
            return;
        };

        match tokio::time::timeout(timeout, handle).await {
            Ok(Ok(())) => debug!("Background asset catalog refresh settled"),
            Ok(Err(e)) => warn!("Background asset catalog refresh aborted: {}", e),
            Err(_) => debug!("Background asset catalog refresh still running, not waiting"),
        }
    }

    async fn fetch_and_publish(&self) -> Result<Arc<AssetCatalog>> {
        debug!("Fetching asset lists");
        let lists = self
            .client
            .fetch_asset_lists()
            .await
            .context("Failed to fetch asset lists")?;
        let catalog = AssetCatalog::from_lists(lists)?;

        if let Err(e) = self.store.save(&catalog) {
            warn!("{:#}", e);
        }

        info!(
            cryptos = catalog.crypto_count(),
            currencies = catalog.currency_count(),
            "Asset catalog refreshed"
        );
        let published = self.publish(catalog);
        *self
            .last_refreshed_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Utc::now());
        Ok(published)
    }

    fn publish(&self, catalog: AssetCatalog) -> Arc<AssetCatalog> {
        let catalog = Arc::new(catalog);
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&catalog));
        catalog
    }
}
