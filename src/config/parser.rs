//! Configuration parser for loading and merging configuration files.
//!
//! Values come from the YAML file first, then from environment variables
//! (optionally seeded from a `.env` file), which take precedence.

use crate::error::{ConfigError, ProviderError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::spec::ProviderConfig;

/// Environment variable overriding `provider.region`.
pub const ENV_REGION: &str = "POWERVS_REGION";
/// Environment variable overriding `provider.zone`.
pub const ENV_ZONE: &str = "POWERVS_ZONE";
/// Environment variable overriding `provider.cloud_instance_id`.
pub const ENV_CLOUD_INSTANCE_ID: &str = "POWERVS_CLOUD_INSTANCE_ID";
/// Environment variable overriding `state.dir`.
pub const ENV_STATE_DIR: &str = "POWERVS_STATE_DIR";

/// Configuration parser for loading provider configuration.
#[derive(Debug, Default)]
pub struct ConfigParser {
    /// Directory searched for `.env`.
    base_path: Option<PathBuf>,
}

impl ConfigParser {
    /// Creates a new configuration parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the directory searched for `.env`.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<ProviderConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(ProviderError::Config(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            ProviderError::Config(ConfigError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        self.parse_yaml(&content, Some(path))
    }

    /// Parses configuration from a YAML string.
    ///
    /// An empty document yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<ProviderConfig> {
        debug!("Parsing YAML configuration");

        if content.trim().is_empty() {
            return Ok(ProviderConfig::default());
        }

        let config: ProviderConfig = serde_yaml::from_str(content).map_err(|e| {
            let location = source.map(|p| p.display().to_string());
            ProviderError::Config(ConfigError::ParseError {
                message: format!("YAML parse error: {e}"),
                location,
            })
        })?;

        debug!("Parsed configuration for region: {}", config.provider.region);
        Ok(config)
    }

    /// Loads configuration with environment variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_with_env(&self, path: impl AsRef<Path>) -> Result<ProviderConfig> {
        let mut config = self.load_file(path)?;
        apply_env_overrides(&mut config, |name| std::env::var(name).ok());
        Ok(config)
    }

    /// Builds configuration from defaults and the environment only.
    #[must_use]
    pub fn defaults_with_env(&self) -> ProviderConfig {
        let mut config = ProviderConfig::default();
        apply_env_overrides(&mut config, |name| std::env::var(name).ok());
        config
    }

    /// Loads the .env file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the .env file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| {
                ProviderError::Config(ConfigError::ParseError {
                    message: format!("Failed to load .env file: {e}"),
                    location: Some(env_path.display().to_string()),
                })
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }

    /// Gets the default cloud instance ID, from configuration or environment.
    ///
    /// # Errors
    ///
    /// Returns an error if neither source provides one.
    pub fn cloud_instance_id(config: &ProviderConfig) -> Result<String> {
        config
            .provider
            .cloud_instance_id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                ProviderError::Config(ConfigError::MissingEnvVar {
                    name: String::from(ENV_CLOUD_INSTANCE_ID),
                })
            })
    }
}

/// Applies environment overrides using the given lookup.
fn apply_env_overrides(config: &mut ProviderConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(region) = lookup(ENV_REGION) {
        debug!("Overriding provider.region from environment");
        config.provider.region = region;
    }

    if let Some(zone) = lookup(ENV_ZONE) {
        debug!("Overriding provider.zone from environment");
        config.provider.zone = Some(zone);
    }

    if let Some(id) = lookup(ENV_CLOUD_INSTANCE_ID) {
        debug!("Overriding provider.cloud_instance_id from environment");
        config.provider.cloud_instance_id = Some(id);
    }

    if let Some(dir) = lookup(ENV_STATE_DIR) {
        debug!("Overriding state.dir from environment");
        config.state.dir = PathBuf::from(dir);
    }
}

/// Default configuration file names to search for.
pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    "powervs.provider.yaml",
    "powervs.provider.yml",
    "provider.yaml",
    "provider.yml",
];

/// Finds the configuration file in the given directory or its parents.
///
/// # Errors
///
/// Returns an error if no configuration file is found.
pub fn find_config_file(start_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let start = start_dir.as_ref();
    let mut current = start.to_path_buf();

    loop {
        for filename in DEFAULT_CONFIG_FILES {
            let config_path = current.join(filename);
            if config_path.exists() {
                info!("Found configuration file: {}", config_path.display());
                return Ok(config_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    Err(ProviderError::Config(ConfigError::FileNotFound {
        path: start.join(DEFAULT_CONFIG_FILES[0]),
    }))
}
