use crate::core::store::DocumentStore;
use anyhow::{Context, Result};
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

const DOCUMENTS_PARTITION: &str = "documents";

/// Document store backed by a fjall keyspace on disk.
pub struct DiskStore {
    keyspace: Keyspace,
    documents: PartitionHandle,
}

impl DiskStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create store directory: {}", path.display()))?;

        let keyspace = Config::new(path)
            .open()
            .with_context(|| format!("Failed to open store at {}", path.display()))?;
        let documents =
            keyspace.open_partition(DOCUMENTS_PARTITION, PartitionCreateOptions::default())?;
        debug!("Opened document store at {}", path.display());

        Ok(Self {
            keyspace,
            documents,
        })
    }
}

impl DocumentStore for DiskStore {
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let value = self
            .documents
            .get(name)
            .with_context(|| format!("Failed to read document: {name}"))?;
        debug!(
            "Store {} for document: {}",
            if value.is_some() { "HIT" } else { "MISS" },
            name
        );
        Ok(value.map(|slice| slice.to_vec()))
    }

    fn replace(&self, documents: &[(&str, Vec<u8>)]) -> Result<()> {
        let mut batch = self.keyspace.batch();
        for (name, bytes) in documents {
            batch.insert(&self.documents, *name, bytes.as_slice());
        }
        batch.commit().context("Failed to write documents")?;
        self.keyspace
            .persist(PersistMode::SyncAll)
            .context("Failed to flush documents")?;
        debug!("Store PUT for {} document(s)", documents.len());
        Ok(())
    }
}
