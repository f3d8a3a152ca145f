//! Provider configuration.
//!
//! This module handles:
//! - Parsing `powervs.provider.yaml` and environment overrides
//! - Validation of polling cadence and timeouts
//! - Building per-operation reconciliation specs

mod parser;
mod spec;
mod validator;

pub use parser::{
    find_config_file, ConfigParser, DEFAULT_CONFIG_FILES, ENV_CLOUD_INSTANCE_ID, ENV_REGION,
    ENV_STATE_DIR, ENV_ZONE,
};
pub use spec::{
    LocationConfig, OperationTimeouts, PollingConfig, ProviderConfig, StateConfig, TimeoutsConfig,
};
pub use validator::{ConfigValidator, ValidationError, ValidationResult, MAX_INTERVAL_SECS};
