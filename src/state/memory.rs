//! In-memory state storage backend.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::Result;

use super::store::StateStore;
use super::types::ResourceRecord;

/// State store that keeps records in process memory.
///
/// Nothing survives the process; used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    records: RwLock<BTreeMap<String, ResourceRecord>>,
}

impl MemoryStateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, address: &str) -> Result<Option<ResourceRecord>> {
        Ok(self.records.read().await.get(address).cloned())
    }

    async fn put(&self, address: &str, record: ResourceRecord) -> Result<()> {
        debug!("Storing {address} in memory");
        self.records.write().await.insert(address.to_string(), record);
        Ok(())
    }

    async fn remove(&self, address: &str) -> Result<Option<ResourceRecord>> {
        Ok(self.records.write().await.remove(address))
    }

    async fn list(&self) -> Result<Vec<(String, ResourceRecord)>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .map(|(address, record)| (address.clone(), record.clone()))
            .collect())
    }

    fn backend_type(&self) -> &'static str {
        "memory"
    }
}
