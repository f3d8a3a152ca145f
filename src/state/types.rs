//! Managed-state record types.
//!
//! Each managed entity (resource or data source instance) is stored as one
//! [`ResourceRecord`] under its address, e.g. `dhcp_server.primary`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Current version of the state format.
pub const STATE_VERSION: &str = "1.0";

/// Attribute map written by handlers.
pub type Attributes = Map<String, Value>;

/// The complete managed state of the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderState {
    /// State format version.
    pub version: String,
    /// Records keyed by managed-entity address.
    #[serde(default)]
    pub records: BTreeMap<String, ResourceRecord>,
    /// When the state was last updated.
    pub last_updated: DateTime<Utc>,
}

/// Persisted state of one managed entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceRecord {
    /// Resource or data-source kind (e.g. `dhcp_server`).
    pub kind: String,
    /// Primary identifier; for resources the encoded resource handle.
    pub id: String,
    /// Attribute values.
    #[serde(default)]
    pub attributes: Attributes,
    /// When the record was last written.
    pub updated_at: DateTime<Utc>,
}

impl ProviderState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: STATE_VERSION.to_string(),
            records: BTreeMap::new(),
            last_updated: Utc::now(),
        }
    }

    /// Inserts or replaces a record.
    pub fn upsert(&mut self, address: &str, record: ResourceRecord) {
        self.records.insert(address.to_string(), record);
        self.last_updated = Utc::now();
    }

    /// Removes a record, returning it if present.
    pub fn remove(&mut self, address: &str) -> Option<ResourceRecord> {
        let removed = self.records.remove(address);
        if removed.is_some() {
            self.last_updated = Utc::now();
        }
        removed
    }
}

impl Default for ProviderState {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceRecord {
    /// Creates a record with no attributes.
    #[must_use]
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
            attributes: Attributes::new(),
            updated_at: Utc::now(),
        }
    }

    /// Replaces all attributes.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Sets a single attribute.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.attributes.insert(key.to_string(), value.into());
        self.updated_at = Utc::now();
    }

    /// Gets a string attribute.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_and_remove() {
        let mut state = ProviderState::new();
        state.upsert("dhcp_server.main", ResourceRecord::new("dhcp_server", "inst/dhcp-1"));

        assert_eq!(state.records.len(), 1);
        assert!(state.remove("dhcp_server.main").is_some());
        assert!(state.remove("dhcp_server.main").is_none());
    }

    #[test]
    fn test_record_attributes() {
        let mut record = ResourceRecord::new("dhcp_server", "inst/dhcp-1");
        record.set("status", "ACTIVE");
        record.set("lease_count", 3);

        assert_eq!(record.get_str("status"), Some("ACTIVE"));
        assert_eq!(record.get_str("lease_count"), None);
    }

    #[test]
    fn test_state_round_trips_through_json() {
        let mut state = ProviderState::new();
        let mut record = ResourceRecord::new("dhcp_server", "inst/dhcp-1");
        record.set("status", "Building");
        state.upsert("dhcp_server.main", record.clone());

        let json = serde_json::to_string(&state).unwrap();
        let loaded: ProviderState = serde_json::from_str(&json).unwrap();

        assert_eq!(loaded.version, STATE_VERSION);
        assert_eq!(loaded.records.get("dhcp_server.main"), Some(&record));
    }
}
