//! Asynchronous provisioning reconciler.
//!
//! Remote resources such as DHCP servers are created in a pending state
//! (`Building`) and only become usable once the vendor reports a target
//! state (`ACTIVE`). This module drives that transition: it polls a
//! [`StatusFetcher`] at a fixed cadence until the resource reaches a target
//! state, a known failure state, or the deadline expires.
//!
//! The same engine serves every resource kind; each kind only supplies a
//! [`ReconciliationSpec`] and a fetcher.

mod fetch;
mod observed;
mod poller;
mod spec;

pub use fetch::{fetch_fn, FetchError, FnFetcher, StatusFetcher};
pub use observed::{ObservedState, TerminalOutcome};
pub use poller::{reconcile, Reconciler};
pub use spec::{ReconciliationSpec, StatusClass, UnknownStatusPolicy};
