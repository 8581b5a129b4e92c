pub mod disk;
pub mod memory;

use crate::core::config::AppConfig;
use crate::core::store::DocumentStore;
use disk::DiskStore;
use memory::MemoryStore;
use std::sync::Arc;
use tracing::warn;

/// Opens the on-disk document store under the configured data path.
///
/// Falls back to a process-local store when the disk store is unavailable, in
/// which case nothing survives the process.
pub fn open_store(config: &AppConfig) -> Arc<dyn DocumentStore> {
    let opened = config
        .default_data_path()
        .and_then(|path| DiskStore::open(&path.join("store")));

    match opened {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!("Using in-memory store: {:#}", e);
            Arc::new(MemoryStore::new())
        }
    }
}
