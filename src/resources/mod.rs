//! Resource and data-source handlers.
//!
//! Each handler is a thin adapter between managed state and the vendor API:
//! it calls the API, waits for eventual consistency through the reconciler
//! where needed, and writes the observed attributes back as a
//! [`ResourceRecord`](crate::state::ResourceRecord).

mod cloud_connection;
mod dhcp;
mod dhcp_servers;

pub use cloud_connection::{CloudConnectionDataSource, CLOUD_CONNECTION_KIND};
pub use dhcp::{DhcpServerResource, DHCP_SERVER_KIND};
pub use dhcp_servers::{DhcpServersDataSource, DHCP_SERVERS_KIND};

use serde_json::{json, Value};

use crate::error::{ConfigError, Result};
use crate::power::DhcpServer;
use crate::state::Attributes;

/// Attribute map describing one DHCP server.
fn dhcp_server_attributes(server: &DhcpServer) -> Attributes {
    let leases: Vec<Value> = server
        .leases
        .iter()
        .map(|lease| {
            json!({
                "instance_ip": lease.instance_ip,
                "instance_mac": lease.instance_mac_address,
            })
        })
        .collect();

    let mut attributes = Attributes::new();
    attributes.insert(String::from("dhcp_id"), Value::from(server.id.clone()));
    attributes.insert(String::from("status"), Value::from(server.status.clone()));
    attributes.insert(
        String::from("network"),
        server.network_id().map_or(Value::Null, Value::from),
    );
    attributes.insert(String::from("leases"), Value::Array(leases));
    attributes
}

/// Rejects an empty required input.
fn require(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::validation(format!("{field} cannot be empty"), field).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::power::{DhcpLease, DhcpNetwork, DHCP_STATUS_ACTIVE};

    #[test]
    fn test_dhcp_server_attributes() {
        let server = DhcpServer {
            id: String::from("dhcp-1"),
            status: String::from(DHCP_STATUS_ACTIVE),
            network: Some(DhcpNetwork {
                id: String::from("net-1"),
                name: None,
            }),
            leases: vec![DhcpLease {
                instance_ip: String::from("192.168.0.10"),
                instance_mac_address: String::from("fa:16:3e:00:00:01"),
            }],
        };

        let attributes = dhcp_server_attributes(&server);
        assert_eq!(attributes["dhcp_id"], "dhcp-1");
        assert_eq!(attributes["network"], "net-1");
        assert_eq!(attributes["leases"][0]["instance_mac"], "fa:16:3e:00:00:01");
    }

    #[test]
    fn test_require_rejects_blank() {
        assert!(require("inst", "cloud_instance_id").is_ok());
        assert!(require("  ", "cloud_instance_id").is_err());
    }
}
