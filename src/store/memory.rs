use crate::core::store::DocumentStore;
use anyhow::Result;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Process-local document store.
#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let documents = self.documents.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(documents.get(name).cloned())
    }

    fn replace(&self, documents: &[(&str, Vec<u8>)]) -> Result<()> {
        let mut stored = self.documents.lock().unwrap_or_else(PoisonError::into_inner);
        for (name, bytes) in documents {
            stored.insert(name.to_string(), bytes.clone());
        }
        debug!("Memory store PUT for {} document(s)", documents.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_read_replace() {
        let store = MemoryStore::new();
        assert!(store.read("doc").unwrap().is_none());

        store.replace(&[("doc", b"one".to_vec())]).unwrap();
        assert_eq!(store.read("doc").unwrap(), Some(b"one".to_vec()));

        store
            .replace(&[("doc", b"two".to_vec()), ("other", b"x".to_vec())])
            .unwrap();
        assert_eq!(store.read("doc").unwrap(), Some(b"two".to_vec()));
        assert_eq!(store.read("other").unwrap(), Some(b"x".to_vec()));
    }
}
