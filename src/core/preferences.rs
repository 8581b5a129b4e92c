//! Last-used conversion pair, remembered across launches

use crate::core::rate::QuotePair;
use crate::core::store::{DocumentStore, PREFERENCES_DOCUMENT, read_json};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub cryptocurrency: String,
    pub vs_currency: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences {
            cryptocurrency: "BTC".to_string(),
            vs_currency: "USD".to_string(),
        }
    }
}

impl Preferences {
    /// Reads saved preferences, falling back to the defaults.
    pub fn load(store: &dyn DocumentStore) -> Self {
        read_json(store, PREFERENCES_DOCUMENT).unwrap_or_default()
    }

    pub fn save(&self, store: &dyn DocumentStore) -> Result<()> {
        let bytes = serde_json::to_vec(self)?;
        store
            .replace(&[(PREFERENCES_DOCUMENT, bytes)])
            .context("Failed to save preferences")
    }

    pub fn from_pair(pair: &QuotePair) -> Self {
        Preferences {
            cryptocurrency: pair.display_source(),
            vs_currency: pair.display_target(),
        }
    }

    pub fn pair(&self) -> QuotePair {
        QuotePair::new(&self.cryptocurrency, &self.vs_currency)
    }
}
