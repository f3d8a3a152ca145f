//! Error types for the Power Virtual Server provider.
//!
//! This module provides the error hierarchy for every stage of a managed
//! resource's lifecycle: configuration, managed state, the vendor API
//! boundary, resource identifiers, and provisioning reconciliation.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// The main error type for the provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Managed state errors.
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// Vendor API errors.
    #[error("Power API error: {0}")]
    Api(#[from] ApiError),

    /// Resource identifier errors.
    #[error("Resource ID error: {0}")]
    Handle(#[from] HandleError),

    /// Reconciliation errors.
    #[error("Reconciliation error: {0}")]
    Reconcile(#[from] ReconcileError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },

    /// Environment variable is missing.
    #[error("Missing environment variable: {name}")]
    MissingEnvVar {
        /// Name of the missing variable.
        name: String,
    },
}

/// Managed state errors.
#[derive(Debug, Error)]
pub enum StateError {
    /// No record exists at the given address.
    #[error("No managed record at address: {address}")]
    RecordNotFound {
        /// Address of the missing record.
        address: String,
    },

    /// State is corrupted.
    #[error("State is corrupted: {message}")]
    Corrupted {
        /// Description of the corruption.
        message: String,
    },

    /// Reading or writing the state backend failed.
    #[error("State backend IO failed for {path}: {message}")]
    Backend {
        /// Path the backend was operating on.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },

    /// Serialization error.
    #[error("State serialization error: {message}")]
    SerializationError {
        /// Description of the serialization error.
        message: String,
    },

    /// State version mismatch.
    #[error("State version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Expected state version.
        expected: String,
        /// Found state version.
        found: String,
    },
}

/// Vendor API errors, classified where the response is received.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The requested resource does not exist.
    #[error("{resource} not found: {id}")]
    NotFound {
        /// Kind of resource that was requested.
        resource: String,
        /// Identifier that was requested.
        id: String,
    },

    /// Authentication failed.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        /// Description of the auth failure.
        message: String,
    },

    /// API request failed.
    #[error("API request failed: {status} - {message}")]
    RequestFailed {
        /// HTTP status code.
        status: u16,
        /// Error message from API.
        message: String,
    },

    /// Rate limited.
    #[error("API rate limited, retry after {retry_after_secs} seconds")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// Network error.
    #[error("Network error: {message}")]
    Network {
        /// Description of the network error.
        message: String,
    },
}

/// Errors raised while encoding or decoding a resource identifier.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HandleError {
    /// The identifier does not have the `<scope>/<resource-id>` shape.
    #[error("Malformed resource ID '{id}': expected '<cloud-instance-id>/<resource-id>'")]
    Malformed {
        /// The offending identifier.
        id: String,
    },

    /// One part of the identifier is empty or contains the separator.
    #[error("Invalid {part} '{value}': must be non-empty and must not contain '/'")]
    InvalidPart {
        /// Which part was invalid (`scope` or `resource id`).
        part: &'static str,
        /// The offending value.
        value: String,
    },
}

/// Reconciliation errors.
///
/// `Timeout`, `Remote` and `Cancelled` carry the last status observed before
/// the poll loop stopped, so operators can tell a stuck resource from one
/// that never answered.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReconcileError {
    /// The reconciliation spec was rejected before any fetch.
    #[error("Invalid reconciliation spec: {message}")]
    InvalidSpec {
        /// Description of the problem.
        message: String,
    },

    /// The resource disappeared (or never existed) while polling.
    #[error("{resource} not found while waiting for it")]
    NotFound {
        /// Encoded identifier of the resource.
        resource: String,
    },

    /// The status fetch failed with a non-retryable error.
    #[error(
        "Failed to fetch status of {resource}: {message} (last status: {})",
        .last_status.as_deref().unwrap_or("none")
    )]
    Remote {
        /// Encoded identifier of the resource.
        resource: String,
        /// Last status observed before the failure.
        last_status: Option<String>,
        /// Description of the failure.
        message: String,
    },

    /// The deadline elapsed before a target state was reached.
    #[error(
        "Timed out after {timeout:?} waiting for {resource} to reach {expected} (last status: {})",
        .last_status.as_deref().unwrap_or("none")
    )]
    Timeout {
        /// Encoded identifier of the resource.
        resource: String,
        /// Target states that were not reached.
        expected: String,
        /// Configured timeout.
        timeout: Duration,
        /// Last status observed before the deadline.
        last_status: Option<String>,
    },

    /// The resource reported a status that will never lead to a target state.
    #[error("{resource} entered failure status '{status}'")]
    Failed {
        /// Encoded identifier of the resource.
        resource: String,
        /// The failure status.
        status: String,
    },

    /// The caller cancelled the reconciliation.
    #[error(
        "Reconciliation of {resource} was cancelled (last status: {})",
        .last_status.as_deref().unwrap_or("none")
    )]
    Cancelled {
        /// Encoded identifier of the resource.
        resource: String,
        /// Last status observed before cancellation.
        last_status: Option<String>,
    },
}

/// Result type alias for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

impl ProviderError {
    /// Returns true if this error means the remote resource is gone.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Api(ApiError::NotFound { .. }) | Self::Reconcile(ReconcileError::NotFound { .. })
        )
    }
}

impl ConfigError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl StateError {
    /// Creates a backend error for the given path.
    #[must_use]
    pub fn backend(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Backend {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a serialization error with the given message.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }
}

impl ApiError {
    /// Classifies a failed HTTP response.
    ///
    /// `resource` and `id` name what was requested so a 404 can be reported
    /// as a structured [`ApiError::NotFound`].
    #[must_use]
    pub fn from_status(
        status: u16,
        resource: impl Into<String>,
        id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        match status {
            404 => Self::NotFound {
                resource: resource.into(),
                id: id.into(),
            },
            401 | 403 => Self::AuthenticationFailed {
                message: message.into(),
            },
            429 => Self::RateLimited {
                retry_after_secs: 60,
            },
            _ => Self::RequestFailed {
                status,
                message: message.into(),
            },
        }
    }

    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Returns true if the resource does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
