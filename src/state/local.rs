//! Local file-based state storage backend.
//!
//! The whole provider state lives in one JSON file. Every mutation is a
//! read-modify-write of that file, serialized within the process by a mutex
//! and made durable by writing a temporary file and renaming it.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{ProviderError, Result, StateError};

use super::store::StateStore;
use super::types::{ProviderState, ResourceRecord, STATE_VERSION};

/// Default state directory name.
pub const STATE_DIR: &str = ".powervs";

/// State file name.
const STATE_FILE: &str = "state.json";

/// Local file-based state store.
#[derive(Debug)]
pub struct LocalStateStore {
    /// Base directory for state files.
    base_dir: PathBuf,
    /// Path to the state file.
    state_path: PathBuf,
    /// Serializes read-modify-write cycles.
    write_lock: Mutex<()>,
}

impl LocalStateStore {
    /// Creates a new local state store with a custom base directory.
    #[must_use]
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        let state_path = base_dir.join(STATE_FILE);

        Self {
            base_dir,
            state_path,
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the path of the state file.
    #[must_use]
    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    /// Ensures the state directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if !self.base_dir.exists() {
            debug!("Creating state directory: {}", self.base_dir.display());
            fs::create_dir_all(&self.base_dir).await.map_err(|e| {
                StateError::backend(&self.base_dir, format!("Failed to create state directory: {e}"))
            })?;
        }
        Ok(())
    }

    /// Reads the state file, or returns an empty state if it does not exist.
    async fn load(&self) -> Result<ProviderState> {
        if !self.state_path.exists() {
            debug!("State file does not exist: {}", self.state_path.display());
            return Ok(ProviderState::new());
        }

        let content = fs::read_to_string(&self.state_path).await.map_err(|e| {
            ProviderError::State(StateError::Corrupted {
                message: format!("Failed to read state file: {e}"),
            })
        })?;

        let state: ProviderState = serde_json::from_str(&content).map_err(|e| {
            ProviderError::State(StateError::Corrupted {
                message: format!("Failed to parse state file: {e}"),
            })
        })?;

        if state.version != STATE_VERSION {
            return Err(ProviderError::State(StateError::VersionMismatch {
                expected: STATE_VERSION.to_string(),
                found: state.version,
            }));
        }

        Ok(state)
    }

    /// Writes the state file atomically.
    async fn save(&self, state: &ProviderState) -> Result<()> {
        self.ensure_dir().await?;

        debug!("Saving state to: {}", self.state_path.display());

        let content = serde_json::to_string_pretty(state)
            .map_err(|e| StateError::serialization(format!("Failed to serialize state: {e}")))?;

        // Write to a temporary file first, then rename for atomicity
        let temp_path = self.state_path.with_extension("tmp");

        let mut file = fs::File::create(&temp_path).await.map_err(|e| {
            StateError::backend(&temp_path, format!("Failed to create temp state file: {e}"))
        })?;

        file.write_all(content.as_bytes())
            .await
            .map_err(|e| StateError::backend(&temp_path, format!("Failed to write state file: {e}")))?;

        file.sync_all()
            .await
            .map_err(|e| StateError::backend(&temp_path, format!("Failed to sync state file: {e}")))?;

        fs::rename(&temp_path, &self.state_path).await.map_err(|e| {
            StateError::backend(&self.state_path, format!("Failed to rename state file: {e}"))
        })?;

        Ok(())
    }
}

#[async_trait]
impl StateStore for LocalStateStore {
    async fn get(&self, address: &str) -> Result<Option<ResourceRecord>> {
        let state = self.load().await?;
        Ok(state.records.get(address).cloned())
    }

    async fn put(&self, address: &str, record: ResourceRecord) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut state = self.load().await?;
        state.upsert(address, record);
        self.save(&state).await?;

        info!("Stored {address} in {}", self.state_path.display());
        Ok(())
    }

    async fn remove(&self, address: &str) -> Result<Option<ResourceRecord>> {
        let _guard = self.write_lock.lock().await;

        let mut state = self.load().await?;
        let removed = state.remove(address);
        if removed.is_some() {
            self.save(&state).await?;
            info!("Removed {address} from {}", self.state_path.display());
        }

        Ok(removed)
    }

    async fn list(&self) -> Result<Vec<(String, ResourceRecord)>> {
        let state = self.load().await?;
        Ok(state.records.into_iter().collect())
    }

    fn backend_type(&self) -> &'static str {
        "local"
    }
}
