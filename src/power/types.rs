//! Power Virtual Server API types.
//!
//! These mirror the JSON payloads of the DHCP and cloud-connection services.

use serde::{Deserialize, Serialize};

/// DHCP server is still being provisioned.
pub const DHCP_STATUS_BUILDING: &str = "Building";

/// DHCP server is provisioned and serving leases.
pub const DHCP_STATUS_ACTIVE: &str = "ACTIVE";

/// DHCP server provisioning failed.
pub const DHCP_STATUS_ERROR: &str = "ERROR";

/// DHCP server is being torn down.
pub const DHCP_STATUS_DELETING: &str = "Deleting";

/// DHCP server has been torn down but is still listed.
pub const DHCP_STATUS_DELETED: &str = "Deleted";

/// A DHCP server attached to a cloud instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DhcpServer {
    /// DHCP server ID.
    pub id: String,
    /// Vendor-reported status.
    pub status: String,
    /// Private network served by this DHCP server.
    #[serde(default)]
    pub network: Option<DhcpNetwork>,
    /// Leases handed out to instances.
    #[serde(default)]
    pub leases: Vec<DhcpLease>,
}

/// Private network reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DhcpNetwork {
    /// Network ID.
    pub id: String,
    /// Network name.
    #[serde(default)]
    pub name: Option<String>,
}

/// A single DHCP lease.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DhcpLease {
    /// IP address handed to the instance.
    #[serde(rename = "instanceIP")]
    pub instance_ip: String,
    /// MAC address of the instance.
    pub instance_mac_address: String,
}

/// A cloud connection between a cloud instance and classic/VPC networks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CloudConnection {
    /// Cloud connection ID.
    #[serde(rename = "cloudConnectionID")]
    pub cloud_connection_id: String,
    /// Display name.
    pub name: String,
    /// Link speed in Mbps.
    #[serde(default)]
    pub speed: u32,
    /// Whether global routing is enabled.
    #[serde(default)]
    pub global_routing: bool,
    /// Whether the connection is metered.
    #[serde(default)]
    pub metered: bool,
    /// Link status.
    #[serde(default)]
    pub link_status: Option<String>,
    /// Vendor-side IP address.
    #[serde(default, rename = "ibmIPAddress")]
    pub ibm_ip_address: Option<String>,
    /// Customer-side IP address.
    #[serde(default, rename = "userIPAddress")]
    pub user_ip_address: Option<String>,
    /// Port identifier.
    #[serde(default)]
    pub port: Option<String>,
    /// Attached networks.
    #[serde(default)]
    pub networks: Vec<CloudConnectionNetwork>,
    /// Classic endpoint configuration.
    #[serde(default)]
    pub classic: Option<ClassicEndpoint>,
    /// VPC endpoint configuration.
    #[serde(default)]
    pub vpc: Option<VpcEndpoint>,
}

/// Network attached to a cloud connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CloudConnectionNetwork {
    /// Network ID.
    #[serde(rename = "networkID")]
    pub network_id: String,
    /// Network name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Classic endpoint of a cloud connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClassicEndpoint {
    /// Whether the classic endpoint is enabled.
    #[serde(default)]
    pub enabled: bool,
    /// GRE tunnel, if configured.
    #[serde(default)]
    pub gre: Option<GreTunnel>,
}

/// GRE tunnel endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GreTunnel {
    /// Destination IP address.
    #[serde(default, rename = "destIPAddress")]
    pub dest_ip_address: Option<String>,
    /// Auto-assigned source IP address.
    #[serde(default, rename = "sourceIPAddress")]
    pub source_ip_address: Option<String>,
}

/// VPC endpoint of a cloud connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VpcEndpoint {
    /// Whether the VPC endpoint is enabled.
    #[serde(default)]
    pub enabled: bool,
    /// Attached VPCs.
    #[serde(default)]
    pub vpcs: Vec<VpcRef>,
}

/// Reference to an attached VPC.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VpcRef {
    /// VPC CRN.
    #[serde(rename = "vpcID")]
    pub vpc_id: String,
    /// VPC name.
    #[serde(default)]
    pub name: Option<String>,
}

impl DhcpServer {
    /// Returns true if the server is serving leases.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == DHCP_STATUS_ACTIVE
    }

    /// Returns the served network ID, if any.
    #[must_use]
    pub fn network_id(&self) -> Option<&str> {
        self.network.as_ref().map(|n| n.id.as_str())
    }
}

impl CloudConnection {
    /// Returns the IDs of attached networks.
    #[must_use]
    pub fn network_ids(&self) -> Vec<&str> {
        self.networks.iter().map(|n| n.network_id.as_str()).collect()
    }

    /// Returns the CRNs of attached VPCs.
    #[must_use]
    pub fn vpc_crns(&self) -> Vec<&str> {
        self.vpc
            .as_ref()
            .map(|v| v.vpcs.iter().map(|vpc| vpc.vpc_id.as_str()).collect())
            .unwrap_or_default()
    }
}
