//! Managed-state persistence.
//!
//! Handlers write one [`ResourceRecord`] per managed entity, keyed by the
//! entity's address. Records carry the encoded resource handle and the
//! attributes last observed on the remote resource.

mod local;
mod memory;
mod store;
mod types;

pub use local::{LocalStateStore, STATE_DIR};
pub use memory::MemoryStateStore;
pub use store::StateStore;
pub use types::{Attributes, ProviderState, ResourceRecord, STATE_VERSION};
