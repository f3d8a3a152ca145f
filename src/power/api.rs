//! Service traits for the Power Virtual Server API.
//!
//! The HTTP client lives outside this crate. Implementations classify
//! failures with [`ApiError::from_status`] so a missing resource always
//! surfaces as [`ApiError::NotFound`].

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::ApiError;
use crate::handle::ResourceHandle;
use crate::reconciler::{FetchError, ObservedState, StatusFetcher};

use super::types::{CloudConnection, DhcpServer};

/// DHCP server service of a cloud instance.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DhcpApi: Send + Sync {
    /// Requests a new DHCP server; the returned server is usually `Building`.
    async fn create(&self, cloud_instance_id: &str) -> Result<DhcpServer, ApiError>;

    /// Gets a DHCP server by ID.
    async fn get(&self, cloud_instance_id: &str, dhcp_id: &str) -> Result<DhcpServer, ApiError>;

    /// Lists all DHCP servers of a cloud instance.
    async fn list(&self, cloud_instance_id: &str) -> Result<Vec<DhcpServer>, ApiError>;

    /// Deletes a DHCP server.
    async fn delete(&self, cloud_instance_id: &str, dhcp_id: &str) -> Result<(), ApiError>;
}

/// Cloud connection service of a cloud instance.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CloudConnectionApi: Send + Sync {
    /// Lists all cloud connections of a cloud instance.
    async fn list(&self, cloud_instance_id: &str) -> Result<Vec<CloudConnection>, ApiError>;
}

/// Status fetcher reading DHCP servers through a [`DhcpApi`].
#[derive(Clone)]
pub struct DhcpStatusFetcher {
    api: Arc<dyn DhcpApi>,
}

impl DhcpStatusFetcher {
    /// Creates a fetcher backed by the given API.
    #[must_use]
    pub fn new(api: Arc<dyn DhcpApi>) -> Self {
        Self { api }
    }
}

impl std::fmt::Debug for DhcpStatusFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DhcpStatusFetcher").finish_non_exhaustive()
    }
}

#[async_trait]
impl StatusFetcher for DhcpStatusFetcher {
    type Payload = DhcpServer;

    async fn fetch(&self, handle: &ResourceHandle) -> Result<ObservedState<DhcpServer>, FetchError> {
        let server = self.api.get(handle.scope(), handle.resource_id()).await?;
        Ok(ObservedState::new(server.status.clone(), server))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::power::types::DHCP_STATUS_BUILDING;

    #[tokio::test]
    async fn test_dhcp_fetcher_uses_handle_parts() {
        let mut api = MockDhcpApi::new();
        api.expect_get()
            .withf(|instance, id| instance == "inst" && id == "dhcp-1")
            .times(1)
            .returning(|_, id| {
                Ok(DhcpServer {
                    id: id.to_string(),
                    status: String::from(DHCP_STATUS_BUILDING),
                    network: None,
                    leases: vec![],
                })
            });

        let fetcher = DhcpStatusFetcher::new(Arc::new(api));
        let handle = ResourceHandle::new("inst", "dhcp-1").unwrap();
        let observed = fetcher.fetch(&handle).await.unwrap();

        assert_eq!(observed.status, DHCP_STATUS_BUILDING);
        assert_eq!(observed.payload.id, "dhcp-1");
    }

    #[tokio::test]
    async fn test_dhcp_fetcher_classifies_not_found() {
        let mut api = MockDhcpApi::new();
        api.expect_get()
            .returning(|_, id| Err(ApiError::not_found("DHCP server", id)));

        let fetcher = DhcpStatusFetcher::new(Arc::new(api));
        let handle = ResourceHandle::new("inst", "gone").unwrap();

        assert!(matches!(
            fetcher.fetch(&handle).await,
            Err(FetchError::NotFound { .. })
        ));
    }
}
