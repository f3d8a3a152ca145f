//! The status-fetch capability consumed by the poll loop.

use async_trait::async_trait;
use std::future::Future;
use std::marker::PhantomData;
use thiserror::Error;

use crate::error::ApiError;
use crate::handle::ResourceHandle;

use super::observed::ObservedState;

/// Failure of a single status fetch, classified by the fetcher.
///
/// Classification happens where the vendor response is decoded; the poll
/// loop never inspects error messages.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The resource does not exist.
    #[error("not found: {message}")]
    NotFound {
        /// Description from the API.
        message: String,
    },

    /// Any other failure (auth, transport, malformed payload).
    #[error("{message}")]
    Remote {
        /// Description of the failure.
        message: String,
    },
}

impl FetchError {
    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a remote error.
    #[must_use]
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
        }
    }
}

impl From<ApiError> for FetchError {
    fn from(err: ApiError) -> Self {
        if err.is_not_found() {
            Self::not_found(err.to_string())
        } else {
            Self::remote(err.to_string())
        }
    }
}

/// Reads the current status of a remote resource.
#[async_trait]
pub trait StatusFetcher: Send + Sync {
    /// Payload carried alongside the status.
    type Payload: Send;

    /// Fetches one snapshot of the resource.
    async fn fetch(&self, handle: &ResourceHandle) -> Result<ObservedState<Self::Payload>, FetchError>;
}

/// Adapts an async closure into a [`StatusFetcher`].
pub struct FnFetcher<F, T> {
    f: F,
    _payload: PhantomData<fn() -> T>,
}

/// Wraps `f` so it can be handed to the reconciler.
///
/// The closure receives an owned copy of the handle for each call.
pub const fn fetch_fn<F, Fut, T>(f: F) -> FnFetcher<F, T>
where
    F: Fn(ResourceHandle) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ObservedState<T>, FetchError>> + Send + 'static,
    T: Send,
{
    FnFetcher {
        f,
        _payload: PhantomData,
    }
}

#[async_trait]
impl<F, Fut, T> StatusFetcher for FnFetcher<F, T>
where
    F: Fn(ResourceHandle) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ObservedState<T>, FetchError>> + Send + 'static,
    T: Send,
{
    type Payload = T;

    async fn fetch(&self, handle: &ResourceHandle) -> Result<ObservedState<T>, FetchError> {
        (self.f)(handle.clone()).await
    }
}

impl<F, T> std::fmt::Debug for FnFetcher<F, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnFetcher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_not_found_stays_distinct() {
        let err: FetchError = ApiError::not_found("DHCP server", "abc").into();
        assert!(matches!(err, FetchError::NotFound { .. }));

        let err: FetchError = ApiError::network("connection reset").into();
        assert_eq!(
            err,
            FetchError::remote("Network error: connection reset")
        );
    }

    #[tokio::test]
    async fn test_fn_fetcher_passes_handle() {
        let fetcher = fetch_fn(|handle: ResourceHandle| async move {
            Ok::<_, FetchError>(ObservedState::new("ACTIVE", handle.resource_id().to_string()))
        });

        let handle = ResourceHandle::new("inst", "dhcp-1").unwrap();
        let observed = fetcher.fetch(&handle).await.unwrap();
        assert_eq!(observed.status, "ACTIVE");
        assert_eq!(observed.payload, "dhcp-1");
    }
}
