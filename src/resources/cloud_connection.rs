//! Cloud connection data source.
//!
//! The API cannot fetch a connection by name, so the data source lists all
//! connections of the cloud instance and picks the first exact name match.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{ApiError, Result};
use crate::power::{CloudConnection, CloudConnectionApi};
use crate::state::{ResourceRecord, StateStore};

use super::require;

/// Record kind of the cloud connection data source.
pub const CLOUD_CONNECTION_KIND: &str = "cloud_connection";

/// Looks up one cloud connection by name.
pub struct CloudConnectionDataSource {
    api: Arc<dyn CloudConnectionApi>,
    state: Arc<dyn StateStore>,
}

impl CloudConnectionDataSource {
    /// Creates the data source.
    #[must_use]
    pub fn new(api: Arc<dyn CloudConnectionApi>, state: Arc<dyn StateStore>) -> Self {
        Self { api, state }
    }

    /// Reads the connection called `name` into the record at `address`.
    ///
    /// # Errors
    ///
    /// Returns an error if an input is empty, the list call fails, or no
    /// connection has that name.
    pub async fn read(
        &self,
        address: &str,
        cloud_instance_id: &str,
        name: &str,
    ) -> Result<ResourceRecord> {
        require(cloud_instance_id, "cloud_instance_id")?;
        require(name, "name")?;
        debug!("Looking up cloud connection '{name}' in {cloud_instance_id}");

        let connections = self.api.list(cloud_instance_id).await?;
        let connection = connections
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ApiError::not_found("Cloud connection", name))?;

        let record = Self::record(cloud_instance_id, connection);
        self.state.put(address, record.clone()).await?;

        info!("Found cloud connection '{name}' ({})", connection.cloud_connection_id);
        Ok(record)
    }

    fn record(cloud_instance_id: &str, connection: &CloudConnection) -> ResourceRecord {
        let mut record =
            ResourceRecord::new(CLOUD_CONNECTION_KIND, connection.cloud_connection_id.clone());

        record.set("cloud_instance_id", cloud_instance_id);
        record.set("name", connection.name.clone());
        record.set("speed", connection.speed);
        record.set("global_routing", connection.global_routing);
        record.set("metered", connection.metered);
        record.set("status", optional(connection.link_status.as_deref()));
        record.set("ibm_ip_address", optional(connection.ibm_ip_address.as_deref()));
        record.set("user_ip_address", optional(connection.user_ip_address.as_deref()));
        record.set("port", optional(connection.port.as_deref()));
        record.set("networks", connection.network_ids());

        if let Some(classic) = &connection.classic {
            record.set("classic_enabled", classic.enabled);
            if let Some(gre) = &classic.gre {
                record.set("gre_destination_address", optional(gre.dest_ip_address.as_deref()));
                record.set("gre_source_address", optional(gre.source_ip_address.as_deref()));
            }
        }

        if let Some(vpc) = &connection.vpc {
            record.set("vpc_enabled", vpc.enabled);
            let crns = connection.vpc_crns();
            if !crns.is_empty() {
                record.set("vpc_crns", crns);
            }
        }

        record
    }
}

fn optional(value: Option<&str>) -> Value {
    value.map_or(Value::Null, Value::from)
}

impl std::fmt::Debug for CloudConnectionDataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudConnectionDataSource")
            .field("state", &self.state.backend_type())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::power::{
        ClassicEndpoint, CloudConnectionNetwork, GreTunnel, MockCloudConnectionApi, VpcEndpoint,
        VpcRef,
    };
    use crate::state::MemoryStateStore;

    fn connection(id: &str, name: &str) -> CloudConnection {
        CloudConnection {
            cloud_connection_id: id.to_string(),
            name: name.to_string(),
            speed: 1000,
            global_routing: false,
            metered: true,
            link_status: Some(String::from("established")),
            ibm_ip_address: Some(String::from("169.254.0.1")),
            user_ip_address: Some(String::from("169.254.0.2")),
            port: None,
            networks: vec![CloudConnectionNetwork {
                network_id: String::from("net-1"),
                name: None,
            }],
            classic: None,
            vpc: None,
        }
    }

    fn data_source(api: MockCloudConnectionApi) -> (CloudConnectionDataSource, Arc<MemoryStateStore>) {
        let state = Arc::new(MemoryStateStore::new());
        (CloudConnectionDataSource::new(Arc::new(api), state.clone()), state)
    }

    #[tokio::test]
    async fn test_read_matches_by_name() {
        let mut api = MockCloudConnectionApi::new();
        api.expect_list()
            .withf(|instance| instance == "inst")
            .returning(|_| Ok(vec![connection("cc-1", "other"), connection("cc-2", "to-vpc")]));

        let (source, state) = data_source(api);
        let record = source
            .read("data.cloud_connection.main", "inst", "to-vpc")
            .await
            .unwrap();

        assert_eq!(record.id, "cc-2");
        assert_eq!(record.get_str("status"), Some("established"));
        assert_eq!(record.attributes["speed"], 1000);
        assert_eq!(record.attributes["networks"][0], "net-1");
        assert!(record.attributes["port"].is_null());
        assert!(!record.attributes.contains_key("classic_enabled"));
        assert_eq!(state.len().await, 1);
    }

    #[tokio::test]
    async fn test_read_endpoints() {
        let mut cc = connection("cc-1", "edge");
        cc.classic = Some(ClassicEndpoint {
            enabled: true,
            gre: Some(GreTunnel {
                dest_ip_address: Some(String::from("10.0.0.1")),
                source_ip_address: Some(String::from("172.16.0.1")),
            }),
        });
        cc.vpc = Some(VpcEndpoint {
            enabled: true,
            vpcs: vec![VpcRef {
                vpc_id: String::from("crn:v1:vpc-1"),
                name: None,
            }],
        });

        let mut api = MockCloudConnectionApi::new();
        api.expect_list().returning(move |_| Ok(vec![cc.clone()]));

        let (source, _state) = data_source(api);
        let record = source.read("data.cloud_connection.edge", "inst", "edge").await.unwrap();

        assert_eq!(record.attributes["classic_enabled"], true);
        assert_eq!(record.get_str("gre_destination_address"), Some("10.0.0.1"));
        assert_eq!(record.get_str("gre_source_address"), Some("172.16.0.1"));
        assert_eq!(record.attributes["vpc_crns"][0], "crn:v1:vpc-1");
    }

    #[tokio::test]
    async fn test_read_missing_name() {
        let mut api = MockCloudConnectionApi::new();
        api.expect_list().returning(|_| Ok(vec![connection("cc-1", "other")]));

        let (source, state) = data_source(api);
        let err = source
            .read("data.cloud_connection.main", "inst", "to-vpc")
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Api(ApiError::NotFound { .. })));
        assert!(state.is_empty().await);
    }

    #[tokio::test]
    async fn test_read_requires_name() {
        let (source, _state) = data_source(MockCloudConnectionApi::new());
        assert!(source.read("data.cloud_connection.main", "inst", "").await.is_err());
    }
}
