//! Configuration validation.
//!
//! Validation collects every problem it finds, then fails on the first error.
//! Warnings never fail validation.

use crate::error::{ConfigError, ProviderError, Result};
use tracing::debug;

use super::spec::{OperationTimeouts, PollingConfig, ProviderConfig};

/// Longest accepted poll interval, in seconds.
pub const MAX_INTERVAL_SECS: u64 = 86_400;

/// Validator for provider configurations.
#[derive(Debug, Default)]
pub struct ConfigValidator;

/// Validation result containing all problems found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// List of validation errors.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct ValidationError {
    /// The field path that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl ConfigValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a provider configuration.
    ///
    /// # Errors
    ///
    /// Returns the first validation error if any were found.
    pub fn validate(&self, config: &ProviderConfig) -> Result<ValidationResult> {
        let result = Self::check(config);

        if let Some(first_error) = result.errors.first() {
            return Err(ProviderError::Config(ConfigError::ValidationError {
                message: first_error.message.clone(),
                field: Some(first_error.field.clone()),
            }));
        }

        debug!("Configuration validation passed");
        Ok(result)
    }

    /// Collects all errors and warnings without failing.
    #[must_use]
    pub fn check(config: &ProviderConfig) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_provider(config, &mut result);
        Self::validate_polling(&config.polling, &mut result);
        Self::validate_timeouts("timeouts.dhcp", &config.timeouts.dhcp, &config.polling, &mut result);

        result
    }

    fn validate_provider(config: &ProviderConfig, result: &mut ValidationResult) {
        if config.provider.region.trim().is_empty() {
            result.push_error("provider.region", "Region cannot be empty");
        }

        if config
            .provider
            .cloud_instance_id
            .as_ref()
            .is_some_and(|id| id.contains('/'))
        {
            result.push_error(
                "provider.cloud_instance_id",
                "Cloud instance ID cannot contain '/'",
            );
        }

        if config.provider.cloud_instance_id.is_none() {
            result
                .warnings
                .push(String::from("No default cloud instance configured"));
        }

        if config.state.dir.as_os_str().is_empty() {
            result.push_error("state.dir", "State directory cannot be empty");
        }
    }

    fn validate_polling(polling: &PollingConfig, result: &mut ValidationResult) {
        if polling.interval_secs == 0 {
            result.push_error("polling.interval_secs", "Poll interval must be greater than zero");
        } else if polling.interval_secs > MAX_INTERVAL_SECS {
            result.push_error(
                "polling.interval_secs",
                &format!("Poll interval cannot exceed {MAX_INTERVAL_SECS}s"),
            );
        }
    }

    fn validate_timeouts(
        prefix: &str,
        timeouts: &OperationTimeouts,
        polling: &PollingConfig,
        result: &mut ValidationResult,
    ) {
        for (name, secs) in [("create_secs", timeouts.create_secs), ("delete_secs", timeouts.delete_secs)] {
            let field = format!("{prefix}.{name}");

            if secs == 0 {
                result.push_error(&field, "Timeout must be greater than zero");
                continue;
            }

            if polling.delay_secs >= secs {
                result.push_error(
                    &field,
                    &format!(
                        "Timeout of {secs}s leaves no time after the initial delay of {}s",
                        polling.delay_secs
                    ),
                );
            } else if polling.delay_secs.saturating_add(polling.interval_secs) >= secs {
                result.warnings.push(format!(
                    "{field}: timeout of {secs}s allows only a single status check"
                ));
            }
        }
    }
}

impl ValidationResult {
    fn push_error(&mut self, field: &str, message: &str) {
        self.errors.push(ValidationError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    /// Returns true if validation passed (no errors).
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of errors.
    #[must_use]
    pub const fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Returns the number of warnings.
    #[must_use]
    pub const fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
