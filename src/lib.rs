// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::panic)]
#![warn(clippy::print_stdout)]
#![warn(clippy::todo)]
#![warn(clippy::unimplemented)]
#![warn(clippy::unwrap_in_result)]
#![warn(clippy::redundant_clone)]
#![warn(clippy::cognitive_complexity)]

// Safety and robustness lints
#![deny(overflowing_literals)]
#![deny(arithmetic_overflow)]

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Power Virtual Server provider
//!
//! Resource and data-source handlers that map declarative configuration onto
//! the Power Virtual Server APIs.
//!
//! ## Overview
//!
//! Handlers are thin CRUD adapters. The interesting part is eventual
//! consistency: a DHCP server is created in `Building` status and only
//! becomes usable once the vendor reports `ACTIVE`. The [`reconciler`]
//! polls such resources at a fixed cadence until they reach a target state,
//! a known failure state, or a deadline.
//!
//! ## Modules
//!
//! - [`handle`]: `<cloud-instance-id>/<resource-id>` identifiers
//! - [`reconciler`]: The asynchronous provisioning poll loop
//! - [`power`]: Vendor API payloads and service traits
//! - [`resources`]: DHCP server resource and data sources
//! - [`state`]: Managed-state storage backends (local, memory)
//! - [`config`]: Configuration parsing and validation
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use powervs_provider::power::DhcpApi;
//! use powervs_provider::resources::DhcpServerResource;
//! use powervs_provider::state::MemoryStateStore;
//! use tokio_util::sync::CancellationToken;
//!
//! async fn provision(api: Arc<dyn DhcpApi>) -> powervs_provider::Result<()> {
//!     let dhcp = DhcpServerResource::new(api, Arc::new(MemoryStateStore::new()));
//!     let record = dhcp
//!         .create("dhcp_server.main", "my-cloud-instance", &CancellationToken::new())
//!         .await?;
//!     assert_eq!(record.get_str("status"), Some("ACTIVE"));
//!     Ok(())
//! }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod config;
pub mod error;
pub mod handle;
pub mod power;
pub mod reconciler;
pub mod resources;
pub mod state;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{ConfigParser, ConfigValidator, ProviderConfig};
pub use error::{ProviderError, ReconcileError, Result};
pub use handle::ResourceHandle;
pub use reconciler::{reconcile, ReconciliationSpec, Reconciler, StatusFetcher, UnknownStatusPolicy};
pub use resources::{CloudConnectionDataSource, DhcpServerResource, DhcpServersDataSource};
pub use state::{LocalStateStore, MemoryStateStore, ResourceRecord, StateStore};
