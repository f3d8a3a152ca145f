//! Snapshots returned by status fetches.

use serde::Serialize;

use crate::error::ReconcileError;

/// One observation of a remote resource.
///
/// Only the latest snapshot matters; the poll loop keeps nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObservedState<T> {
    /// Vendor-reported status.
    pub status: String,
    /// Associated resource payload.
    pub payload: T,
}

impl<T> ObservedState<T> {
    /// Creates a new snapshot.
    #[must_use]
    pub fn new(status: impl Into<String>, payload: T) -> Self {
        Self {
            status: status.into(),
            payload,
        }
    }

    /// Consumes the snapshot and returns its payload.
    #[must_use]
    pub fn into_payload(self) -> T {
        self.payload
    }
}

/// Final result of a reconciliation run.
pub type TerminalOutcome<T> = Result<ObservedState<T>, ReconcileError>;
