//! Configuration specification types for the provider.
//!
//! This module defines the structs that map to the `powervs.provider.yaml`
//! file. Every section is optional; missing values fall back to the
//! provider's defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::power::{
    DHCP_STATUS_ACTIVE, DHCP_STATUS_BUILDING, DHCP_STATUS_DELETED, DHCP_STATUS_DELETING,
    DHCP_STATUS_ERROR,
};
use crate::reconciler::{ReconciliationSpec, UnknownStatusPolicy};
use crate::state::STATE_DIR;

/// The root configuration structure for the provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ProviderConfig {
    /// Target cloud location.
    #[serde(default)]
    pub provider: LocationConfig,
    /// Managed-state storage.
    #[serde(default)]
    pub state: StateConfig,
    /// Polling cadence shared by all reconciliations.
    #[serde(default)]
    pub polling: PollingConfig,
    /// Per-resource operation timeouts.
    #[serde(default)]
    pub timeouts: TimeoutsConfig,
}

/// Target cloud location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocationConfig {
    /// Region (e.g. `us-south`).
    #[serde(default = "default_region")]
    pub region: String,
    /// Availability zone within the region.
    #[serde(default)]
    pub zone: Option<String>,
    /// Default cloud instance for handlers that need one.
    #[serde(default)]
    pub cloud_instance_id: Option<String>,
}

/// Managed-state storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StateConfig {
    /// Directory holding `state.json`.
    #[serde(default = "default_state_dir")]
    pub dir: PathBuf,
}

/// Polling cadence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PollingConfig {
    /// Wait before the first status check, in seconds.
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,
    /// Wait between status checks, in seconds.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Treatment of statuses the provider does not recognize.
    #[serde(default)]
    pub unknown_status: UnknownStatusPolicy,
}

/// Operation timeouts per resource kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TimeoutsConfig {
    /// DHCP server timeouts.
    #[serde(default)]
    pub dhcp: OperationTimeouts,
}

/// Create and delete timeouts, in seconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperationTimeouts {
    /// Budget for a create to reach its target state.
    #[serde(default = "default_operation_secs")]
    pub create_secs: u64,
    /// Budget for a delete to be confirmed.
    #[serde(default = "default_operation_secs")]
    pub delete_secs: u64,
}

// Default value functions

const fn default_delay_secs() -> u64 {
    10
}

const fn default_interval_secs() -> u64 {
    10
}

const fn default_operation_secs() -> u64 {
    30 * 60
}

fn default_region() -> String {
    String::from("us-south")
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(STATE_DIR)
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            zone: None,
            cloud_instance_id: None,
        }
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            dir: default_state_dir(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            delay_secs: default_delay_secs(),
            interval_secs: default_interval_secs(),
            unknown_status: UnknownStatusPolicy::default(),
        }
    }
}

impl Default for OperationTimeouts {
    fn default() -> Self {
        Self {
            create_secs: default_operation_secs(),
            delete_secs: default_operation_secs(),
        }
    }
}

impl PollingConfig {
    /// Returns the initial delay.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }

    /// Returns the poll interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl ProviderConfig {
    /// Spec for waiting on a freshly created DHCP server.
    ///
    /// `ERROR` is a failure status: the wait stops as soon as it is seen
    /// and reports [`ReconcileError::Failed`](crate::error::ReconcileError::Failed).
    /// Older provider releases folded every non-`ACTIVE` status into
    /// `Building` and kept polling until the timeout.
    #[must_use]
    pub fn dhcp_create_spec(&self) -> ReconciliationSpec {
        self.with_polling(
            ReconciliationSpec::new([DHCP_STATUS_BUILDING], [DHCP_STATUS_ACTIVE])
                .with_failure([DHCP_STATUS_ERROR]),
            self.timeouts.dhcp.create_secs,
        )
    }

    /// Spec for confirming a DHCP server deletion.
    ///
    /// The server may still report its previous status for a while after
    /// the delete call is accepted.
    #[must_use]
    pub fn dhcp_delete_spec(&self) -> ReconciliationSpec {
        self.with_polling(
            ReconciliationSpec::new(
                [DHCP_STATUS_ACTIVE, DHCP_STATUS_BUILDING, DHCP_STATUS_DELETING],
                [DHCP_STATUS_DELETED],
            )
            .with_failure([DHCP_STATUS_ERROR]),
            self.timeouts.dhcp.delete_secs,
        )
    }

    fn with_polling(&self, spec: ReconciliationSpec, timeout_secs: u64) -> ReconciliationSpec {
        spec.with_delay(self.polling.delay())
            .with_poll_interval(self.polling.interval())
            .with_timeout(Duration::from_secs(timeout_secs))
            .with_unknown_status(self.polling.unknown_status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_provider_timeouts() {
        let config = ProviderConfig::default();
        let spec = config.dhcp_create_spec();

        assert_eq!(spec.delay, Duration::from_secs(10));
        assert_eq!(spec.poll_interval, Duration::from_secs(10));
        assert_eq!(spec.timeout, Duration::from_secs(1800));
        assert_eq!(spec.target, vec![String::from("ACTIVE")]);
        assert_eq!(spec.pending, vec![String::from("Building")]);
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_create_spec_fails_fast_on_error() {
        let spec = ProviderConfig::default().dhcp_create_spec();
        assert_eq!(spec.failure, vec![String::from("ERROR")]);
        assert!(!spec.pending.iter().any(|s| s == "ERROR"));
    }

    #[test]
    fn test_delete_spec_uses_delete_timeout() {
        let mut config = ProviderConfig::default();
        config.timeouts.dhcp.delete_secs = 120;
        config.polling.unknown_status = UnknownStatusPolicy::Fail;

        let spec = config.dhcp_delete_spec();
        assert_eq!(spec.timeout, Duration::from_secs(120));
        assert_eq!(spec.target, vec![String::from("Deleted")]);
        assert_eq!(spec.unknown_status, UnknownStatusPolicy::Fail);
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_state_dir_default() {
        assert_eq!(StateConfig::default().dir, PathBuf::from(".powervs"));
    }
}
