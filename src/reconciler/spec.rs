//! Per-operation polling configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

use crate::error::ReconcileError;

/// Default delay before the first status check.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(10);

/// Default interval between status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default overall timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// How the poll loop treats a status that is neither pending, target nor failure.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnknownStatusPolicy {
    /// Keep polling as if the status were pending.
    #[default]
    Tolerate,
    /// Stop immediately with [`ReconcileError::Failed`].
    Fail,
}

/// Classification of an observed status against a spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// The resource reached a target state.
    Target,
    /// The resource is still transitioning.
    Pending,
    /// The resource reached a known failure state.
    Failure,
    /// The status is not listed anywhere in the spec.
    Unknown,
}

/// Configuration for one polling run.
///
/// Built per operation and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationSpec {
    /// Statuses that end the run successfully.
    pub target: Vec<String>,
    /// Expected intermediate statuses.
    pub pending: Vec<String>,
    /// Statuses that end the run with a failure.
    pub failure: Vec<String>,
    /// Wait before the first status check.
    pub delay: Duration,
    /// Wait between status checks.
    pub poll_interval: Duration,
    /// Overall budget, measured from the start of the run.
    pub timeout: Duration,
    /// Treatment of unlisted statuses.
    pub unknown_status: UnknownStatusPolicy,
}

impl ReconciliationSpec {
    /// Creates a spec with the given pending and target statuses and
    /// default timings.
    #[must_use]
    pub fn new<P, T>(pending: P, target: T) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        Self {
            target: target.into_iter().map(Into::into).collect(),
            pending: pending.into_iter().map(Into::into).collect(),
            failure: Vec::new(),
            delay: DEFAULT_DELAY,
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            unknown_status: UnknownStatusPolicy::default(),
        }
    }

    /// Sets the failure statuses.
    #[must_use]
    pub fn with_failure<F>(mut self, failure: F) -> Self
    where
        F: IntoIterator,
        F::Item: Into<String>,
    {
        self.failure = failure.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the initial delay.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the poll interval.
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Sets the overall timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the unknown-status policy.
    #[must_use]
    pub const fn with_unknown_status(mut self, policy: UnknownStatusPolicy) -> Self {
        self.unknown_status = policy;
        self
    }

    /// Checks the spec before any network activity.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::InvalidSpec`] if the interval or timeout is
    /// zero, if the target or pending set is empty, or if a status appears
    /// in more than one set.
    pub fn validate(&self) -> Result<(), ReconcileError> {
        let invalid = |message: String| Err(ReconcileError::InvalidSpec { message });

        if self.poll_interval.is_zero() {
            return invalid(String::from("poll interval must be greater than zero"));
        }
        if self.timeout.is_zero() {
            return invalid(String::from("timeout must be greater than zero"));
        }
        if self.target.is_empty() {
            return invalid(String::from("at least one target status is required"));
        }
        if self.pending.is_empty() {
            return invalid(String::from("at least one pending status is required"));
        }

        let mut seen = HashSet::new();
        for status in self.target.iter().chain(&self.pending).chain(&self.failure) {
            if !seen.insert(status.as_str()) {
                return invalid(format!("status '{status}' is listed more than once"));
            }
        }

        Ok(())
    }

    /// Classifies an observed status.
    #[must_use]
    pub fn classify(&self, status: &str) -> StatusClass {
        if self.target.iter().any(|s| s == status) {
            StatusClass::Target
        } else if self.failure.iter().any(|s| s == status) {
            StatusClass::Failure
        } else if self.pending.iter().any(|s| s == status) {
            StatusClass::Pending
        } else {
            StatusClass::Unknown
        }
    }

    /// Human-readable list of target statuses.
    #[must_use]
    pub fn expected(&self) -> String {
        self.target.join(" | ")
    }
}
