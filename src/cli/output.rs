//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying
//! information to the user in various formats.

use colored::Colorize;
use serde_json::json;
use std::fmt::Write;
use std::time::Duration;
use tabled::{Table, Tabled};

use crate::config::{ProviderConfig, ValidationResult};
use crate::handle::ResourceHandle;
use crate::reconciler::ReconciliationSpec;
use crate::state::ResourceRecord;

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Managed record row for table display.
#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

/// Reconciliation spec row for table display.
#[derive(Tabled)]
struct SpecRow {
    #[tabled(rename = "Operation")]
    operation: String,
    #[tabled(rename = "Pending")]
    pending: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Delay")]
    delay: String,
    #[tabled(rename = "Interval")]
    interval: String,
    #[tabled(rename = "Timeout")]
    timeout: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a validation result together with a configuration summary.
    #[must_use]
    pub fn format_validation(
        &self,
        result: &ValidationResult,
        config: &ProviderConfig,
        show_warnings: bool,
    ) -> String {
        match self.format {
            OutputFormat::Json => {
                let errors: Vec<String> = result.errors.iter().map(ToString::to_string).collect();
                let value = json!({
                    "valid": result.is_valid(),
                    "errors": errors,
                    "warnings": result.warnings,
                    "region": config.provider.region,
                    "zone": config.provider.zone,
                    "cloud_instance_id": config.provider.cloud_instance_id,
                    "state_dir": config.state.dir,
                });
                serde_json::to_string_pretty(&value).unwrap_or_default()
            }
            OutputFormat::Text => {
                let mut output = if result.is_valid() {
                    format!("{} Configuration is valid!\n", "✓".green())
                } else {
                    let mut output = format!("{} Configuration is invalid:\n", "✗".red());
                    for error in &result.errors {
                        let _ = writeln!(output, "   - {error}");
                    }
                    output
                };

                if show_warnings && !result.warnings.is_empty() {
                    let _ = write!(output, "\n{} Warnings:\n", "⚠".yellow());
                    for warning in &result.warnings {
                        let _ = writeln!(output, "   - {warning}");
                    }
                }

                output.push_str("\nConfiguration summary:\n");
                let _ = writeln!(output, "   Region: {}", config.provider.region);
                let _ = writeln!(
                    output,
                    "   Zone: {}",
                    config.provider.zone.as_deref().unwrap_or("-")
                );
                let _ = writeln!(
                    output,
                    "   Cloud instance: {}",
                    config.provider.cloud_instance_id.as_deref().unwrap_or("-")
                );
                let _ = writeln!(output, "   State dir: {}", config.state.dir.display());
                output
            }
        }
    }

    /// Formats named reconciliation specs.
    #[must_use]
    pub fn format_specs(&self, specs: &[(&str, ReconciliationSpec)]) -> String {
        match self.format {
            OutputFormat::Json => {
                let value: Vec<_> = specs
                    .iter()
                    .map(|(operation, spec)| {
                        json!({
                            "operation": operation,
                            "pending": spec.pending,
                            "target": spec.target,
                            "failure": spec.failure,
                            "delay_secs": spec.delay.as_secs(),
                            "interval_secs": spec.poll_interval.as_secs(),
                            "timeout_secs": spec.timeout.as_secs(),
                            "unknown_status": spec.unknown_status,
                        })
                    })
                    .collect();
                serde_json::to_string_pretty(&value).unwrap_or_default()
            }
            OutputFormat::Text => {
                let rows: Vec<SpecRow> = specs
                    .iter()
                    .map(|(operation, spec)| SpecRow {
                        operation: (*operation).to_string(),
                        pending: spec.pending.join(", "),
                        target: spec.target.join(", ").green().to_string(),
                        delay: Self::format_duration(spec.delay),
                        interval: Self::format_duration(spec.poll_interval),
                        timeout: Self::format_duration(spec.timeout),
                    })
                    .collect();

                let mut output = Table::new(rows).to_string();
                output.push('\n');
                output
            }
        }
    }

    /// Formats a list of managed records.
    #[must_use]
    pub fn format_records(&self, records: &[(String, ResourceRecord)]) -> String {
        match self.format {
            OutputFormat::Json => {
                let value: serde_json::Map<String, serde_json::Value> = records
                    .iter()
                    .map(|(address, record)| {
                        (address.clone(), serde_json::to_value(record).unwrap_or_default())
                    })
                    .collect();
                serde_json::to_string_pretty(&value).unwrap_or_default()
            }
            OutputFormat::Text => {
                if records.is_empty() {
                    return String::from("No managed records.\n");
                }

                let rows: Vec<RecordRow> = records
                    .iter()
                    .map(|(address, record)| RecordRow {
                        address: address.clone(),
                        kind: record.kind.clone(),
                        id: Self::truncate(&record.id, 40),
                        status: Self::format_status(record.get_str("status")),
                        updated: record.updated_at.format("%Y-%m-%d %H:%M").to_string(),
                    })
                    .collect();

                let mut output = Table::new(rows).to_string();
                let _ = write!(output, "\n\n{} managed record(s)\n", records.len());
                output
            }
        }
    }

    /// Formats a single managed record with all attributes.
    #[must_use]
    pub fn format_record(&self, address: &str, record: &ResourceRecord) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(record).unwrap_or_default(),
            OutputFormat::Text => {
                let mut output = format!("\n{}\n\n", address.bold());
                let _ = writeln!(output, "   Kind: {}", record.kind);
                let _ = writeln!(output, "   ID: {}", record.id);
                let _ = writeln!(output, "   Updated: {}", record.updated_at);

                if !record.attributes.is_empty() {
                    output.push_str("\n   Attributes:\n");
                    for (key, value) in &record.attributes {
                        let _ = writeln!(output, "     {key} = {value}");
                    }
                }
                output
            }
        }
    }

    /// Formats the parts of a resource ID.
    #[must_use]
    pub fn format_handle(&self, handle: &ResourceHandle) -> String {
        match self.format {
            OutputFormat::Json => {
                let value = json!({
                    "id": handle.encode(),
                    "cloud_instance_id": handle.scope(),
                    "resource_id": handle.resource_id(),
                });
                serde_json::to_string_pretty(&value).unwrap_or_default()
            }
            OutputFormat::Text => format!(
                "Cloud instance: {}\nResource:       {}\n",
                handle.scope(),
                handle.resource_id()
            ),
        }
    }

    /// Formats a success message.
    #[must_use]
    pub fn success(&self, message: &str) -> String {
        match self.format {
            OutputFormat::Json => {
                let json = json!({ "status": "success", "message": message });
                serde_json::to_string_pretty(&json).unwrap_or_default()
            }
            OutputFormat::Text => format!("{} {message}", "✓".green()),
        }
    }

    /// Formats an error message.
    #[must_use]
    pub fn error(&self, message: &str) -> String {
        match self.format {
            OutputFormat::Json => {
                let json = json!({ "status": "error", "message": message });
                serde_json::to_string_pretty(&json).unwrap_or_default()
            }
            OutputFormat::Text => format!("{} {message}", "✗".red()),
        }
    }

    /// Formats a vendor status with color.
    fn format_status(status: Option<&str>) -> String {
        match status {
            Some("ACTIVE") => "ACTIVE".green().to_string(),
            Some(s @ ("ERROR" | "Deleted")) => s.red().to_string(),
            Some(s) => s.yellow().to_string(),
            None => "-".dimmed().to_string(),
        }
    }

    fn format_duration(duration: Duration) -> String {
        let secs = duration.as_secs();
        if secs >= 60 && secs % 60 == 0 {
            format!("{}m", secs / 60)
        } else {
            format!("{secs}s")
        }
    }

    /// Truncates a string to a maximum length.
    fn truncate(s: &str, max_len: usize) -> String {
        if s.chars().count() <= max_len {
            s.to_string()
        } else {
            let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
            format!("{kept}...")
        }
    }
}
