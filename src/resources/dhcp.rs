//! DHCP server resource.
//!
//! A DHCP server is created in `Building` status and becomes usable once the
//! vendor reports `ACTIVE`. The record is written as soon as the server
//! exists remotely, so an interrupted wait never orphans it.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ProviderConfig;
use crate::error::{ApiError, ReconcileError, Result};
use crate::handle::ResourceHandle;
use crate::power::{DhcpApi, DhcpServer, DhcpStatusFetcher};
use crate::reconciler::{reconcile, ReconciliationSpec};
use crate::state::{ResourceRecord, StateStore};

use super::{dhcp_server_attributes, require};

/// Record kind of DHCP server resources.
pub const DHCP_SERVER_KIND: &str = "dhcp_server";

/// Handler for the DHCP server resource.
pub struct DhcpServerResource {
    /// DHCP service.
    api: Arc<dyn DhcpApi>,
    /// Managed state.
    state: Arc<dyn StateStore>,
    /// Wait for `Building` to become `ACTIVE`.
    create_spec: ReconciliationSpec,
    /// Wait for the server to disappear.
    delete_spec: ReconciliationSpec,
}

impl DhcpServerResource {
    /// Creates a handler with the default timeouts.
    #[must_use]
    pub fn new(api: Arc<dyn DhcpApi>, state: Arc<dyn StateStore>) -> Self {
        Self::from_config(api, state, &ProviderConfig::default())
    }

    /// Creates a handler using the polling and timeouts of `config`.
    #[must_use]
    pub fn from_config(
        api: Arc<dyn DhcpApi>,
        state: Arc<dyn StateStore>,
        config: &ProviderConfig,
    ) -> Self {
        Self {
            api,
            state,
            create_spec: config.dhcp_create_spec(),
            delete_spec: config.dhcp_delete_spec(),
        }
    }

    /// Overrides the create spec.
    #[must_use]
    pub fn with_create_spec(mut self, spec: ReconciliationSpec) -> Self {
        self.create_spec = spec;
        self
    }

    /// Overrides the delete spec.
    #[must_use]
    pub fn with_delete_spec(mut self, spec: ReconciliationSpec) -> Self {
        self.delete_spec = spec;
        self
    }

    fn record(handle: &ResourceHandle, server: &DhcpServer) -> ResourceRecord {
        let mut record = ResourceRecord::new(DHCP_SERVER_KIND, handle.encode())
            .with_attributes(dhcp_server_attributes(server));
        record.set("cloud_instance_id", handle.scope());
        record
    }

    /// Creates a DHCP server in `cloud_instance_id` and waits until it is active.
    ///
    /// # Errors
    ///
    /// Returns an error if the cloud instance ID is empty, if the create call
    /// fails, or if the server does not become active. In the last case the
    /// record stays in state with the last known status.
    pub async fn create(
        &self,
        address: &str,
        cloud_instance_id: &str,
        cancel: &CancellationToken,
    ) -> Result<ResourceRecord> {
        require(cloud_instance_id, "cloud_instance_id")?;
        info!("Creating DHCP server {address} in {cloud_instance_id}");

        let server = self.api.create(cloud_instance_id).await?;
        let handle = ResourceHandle::new(cloud_instance_id, server.id.as_str())?;
        self.state
            .put(address, Self::record(&handle, &server))
            .await?;

        debug!("DHCP server {handle} created with status {}", server.status);

        let fetcher = DhcpStatusFetcher::new(Arc::clone(&self.api));
        let observed = reconcile(&handle, &self.create_spec, &fetcher, cancel).await?;

        let record = Self::record(&handle, &observed.payload);
        self.state.put(address, record.clone()).await?;

        info!("DHCP server {handle} is {}", observed.status);
        Ok(record)
    }

    /// Refreshes the record at `address` from the API.
    ///
    /// Returns `None` if nothing is managed there or if the server no longer
    /// exists, in which case the record is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored ID is malformed or the API call fails.
    pub async fn read(&self, address: &str) -> Result<Option<ResourceRecord>> {
        let Some(existing) = self.state.get(address).await? else {
            debug!("No DHCP server managed at {address}");
            return Ok(None);
        };

        let handle = ResourceHandle::parse(&existing.id)?;
        match self.api.get(handle.scope(), handle.resource_id()).await {
            Ok(server) => {
                let record = Self::record(&handle, &server);
                self.state.put(address, record.clone()).await?;
                Ok(Some(record))
            }
            Err(err) if err.is_not_found() => {
                warn!("DHCP server {handle} no longer exists, dropping {address}");
                self.state.remove(address).await?;
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Deletes the DHCP server at `address` and waits until it is gone.
    ///
    /// Deleting something that is not managed, or that has already
    /// disappeared remotely, succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete call fails or the removal cannot be
    /// confirmed before the delete timeout.
    pub async fn delete(&self, address: &str, cancel: &CancellationToken) -> Result<()> {
        let Some(existing) = self.state.get(address).await? else {
            debug!("No DHCP server managed at {address}, nothing to delete");
            return Ok(());
        };

        let handle = ResourceHandle::parse(&existing.id)?;
        info!("Deleting DHCP server {handle}");

        match self.api.delete(handle.scope(), handle.resource_id()).await {
            Ok(()) => self.confirm_deleted(&handle, cancel).await?,
            Err(err) if err.is_not_found() => {
                info!("DHCP server {handle} was already deleted");
            }
            Err(err) => return Err(err.into()),
        }

        self.state.remove(address).await?;
        info!("Deleted DHCP server {handle}");
        Ok(())
    }

    async fn confirm_deleted(
        &self,
        handle: &ResourceHandle,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let fetcher = DhcpStatusFetcher::new(Arc::clone(&self.api));
        match reconcile(handle, &self.delete_spec, &fetcher, cancel).await {
            Ok(_) | Err(ReconcileError::NotFound { .. }) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Adopts an existing server under `address` from its `scope/id`.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is malformed or the server does not exist.
    pub async fn import(&self, address: &str, id: &str) -> Result<ResourceRecord> {
        let handle = ResourceHandle::parse(id)?;
        info!("Importing DHCP server {handle} as {address}");

        self.state
            .put(address, ResourceRecord::new(DHCP_SERVER_KIND, handle.encode()))
            .await?;

        self.read(address)
            .await?
            .ok_or_else(|| ApiError::not_found("DHCP server", id).into())
    }
}

impl std::fmt::Debug for DhcpServerResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DhcpServerResource")
            .field("state", &self.state.backend_type())
            .field("create_spec", &self.create_spec)
            .field("delete_spec", &self.delete_spec)
            .finish_non_exhaustive()
    }
}
