//! DHCP servers data source.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::Result;
use crate::power::DhcpApi;
use crate::state::{ResourceRecord, StateStore};

use super::{dhcp_server_attributes, require};

/// Record kind of the DHCP servers data source.
pub const DHCP_SERVERS_KIND: &str = "dhcp_servers";

/// Lists every DHCP server of a cloud instance.
pub struct DhcpServersDataSource {
    api: Arc<dyn DhcpApi>,
    state: Arc<dyn StateStore>,
}

impl DhcpServersDataSource {
    /// Creates the data source.
    #[must_use]
    pub fn new(api: Arc<dyn DhcpApi>, state: Arc<dyn StateStore>) -> Self {
        Self { api, state }
    }

    /// Reads all DHCP servers of `cloud_instance_id` into the record at `address`.
    ///
    /// The listing has no natural identifier, so each read stores a fresh one.
    ///
    /// # Errors
    ///
    /// Returns an error if the cloud instance ID is empty or the list call fails.
    pub async fn read(&self, address: &str, cloud_instance_id: &str) -> Result<ResourceRecord> {
        require(cloud_instance_id, "cloud_instance_id")?;
        debug!("Listing DHCP servers of {cloud_instance_id}");

        let servers = self.api.list(cloud_instance_id).await?;
        let entries: Vec<Value> = servers
            .iter()
            .map(|server| Value::Object(dhcp_server_attributes(server)))
            .collect();

        let mut record = ResourceRecord::new(DHCP_SERVERS_KIND, Uuid::new_v4().to_string());
        record.set("cloud_instance_id", cloud_instance_id);
        record.set("servers", entries);

        self.state.put(address, record.clone()).await?;
        info!("Read {} DHCP servers into {address}", servers.len());
        Ok(record)
    }
}

impl std::fmt::Debug for DhcpServersDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DhcpServersDataSource")
            .field("state", &self.state.backend_type())
            .finish_non_exhaustive()
    }
}
