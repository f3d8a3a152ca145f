//! State store trait definition.
//!
//! This module defines the common interface for managed-state backends.

use async_trait::async_trait;

use crate::error::Result;
use super::types::ResourceRecord;

/// Key-value store of managed records, keyed by managed-entity address.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Gets the record at `address`.
    ///
    /// Returns `None` if nothing is stored there.
    async fn get(&self, address: &str) -> Result<Option<ResourceRecord>>;

    /// Inserts or replaces the record at `address`.
    async fn put(&self, address: &str, record: ResourceRecord) -> Result<()>;

    /// Removes the record at `address`, returning it if it existed.
    async fn remove(&self, address: &str) -> Result<Option<ResourceRecord>>;

    /// Lists all records ordered by address.
    async fn list(&self) -> Result<Vec<(String, ResourceRecord)>>;

    /// Gets the backend type name.
    fn backend_type(&self) -> &'static str;
}
