//! Power Virtual Server API boundary.
//!
//! This module provides the typed payloads and service traits through which
//! handlers talk to the vendor API, plus the status fetcher used to wait for
//! DHCP servers.

mod api;
mod types;

pub use api::{CloudConnectionApi, DhcpApi, DhcpStatusFetcher};
#[cfg(test)]
pub use api::{MockCloudConnectionApi, MockDhcpApi};
pub use types::{
    ClassicEndpoint, CloudConnection, CloudConnectionNetwork, DhcpLease, DhcpNetwork, DhcpServer,
    GreTunnel, VpcEndpoint, VpcRef, DHCP_STATUS_ACTIVE, DHCP_STATUS_BUILDING, DHCP_STATUS_DELETED,
    DHCP_STATUS_DELETING, DHCP_STATUS_ERROR,
};
