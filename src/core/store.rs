//! Durable local documents and the asset catalog's view of them

use crate::core::catalog::AssetCatalog;
use crate::core::quote::AssetLists;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub const CRYPTOS_DOCUMENT: &str = "supported_cryptos";
pub const CURRENCIES_DOCUMENT: &str = "supported_vs_currencies";
pub const PREFERENCES_DOCUMENT: &str = "preferences";

/// Named byte documents with whole-document replacement.
pub trait DocumentStore: Send + Sync {
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>>;

    /// Replaces all given documents as one unit: either every document is
    /// written or none is.
    fn replace(&self, documents: &[(&str, Vec<u8>)]) -> Result<()>;
}

/// Reads a JSON document, treating a missing or unreadable one as absent.
pub(crate) fn read_json<T: DeserializeOwned>(store: &dyn DocumentStore, name: &str) -> Option<T> {
    let parsed: Result<Option<T>> = store.read(name).and_then(|bytes| {
        bytes
            .map(|b| serde_json::from_slice(&b))
            .transpose()
            .with_context(|| format!("Failed to parse document: {name}"))
    });

    match parsed {
        Ok(Some(value)) => Some(value),
        Ok(None) => {
            debug!("Document {} not found", name);
            None
        }
        Err(e) => {
            debug!("Document {} unusable: {:#}", name, e);
            None
        }
    }
}

/// Persists the two supported-asset lists as a pair of JSON documents:
/// `{symbol: remote_id}` and `[currency]`.
pub struct AssetCatalogStore {
    store: Arc<dyn DocumentStore>,
}

impl AssetCatalogStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Returns the stored catalog, or `None` when either list is missing or
    /// does not parse.
    pub fn load(&self) -> Option<AssetCatalog> {
        let crypto_ids_by_symbol: HashMap<String, String> =
            read_json(self.store.as_ref(), CRYPTOS_DOCUMENT)?;
        let currencies: Vec<String> = read_json(self.store.as_ref(), CURRENCIES_DOCUMENT)?;

        match AssetCatalog::from_lists(AssetLists {
            crypto_ids_by_symbol,
            currencies,
        }) {
            Ok(catalog) => Some(catalog),
            Err(e) => {
                debug!("Stored catalog rejected: {:#}", e);
                None
            }
        }
    }

    pub fn save(&self, catalog: &AssetCatalog) -> Result<()> {
        let cryptos = serde_json::to_vec(catalog.crypto_ids())?;
        let currencies = serde_json::to_vec(&catalog.currencies().collect::<Vec<_>>())?;
        self.store
            .replace(&[(CRYPTOS_DOCUMENT, cryptos), (CURRENCIES_DOCUMENT, currencies)])
            .context("Failed to persist asset catalog")
    }
}
