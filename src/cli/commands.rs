//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// powervs - Operator tool for the Power Virtual Server provider.
#[derive(Parser, Debug)]
#[command(name = "powervs")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true, env = "POWERVS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the provider configuration.
    Validate {
        /// Show all warnings, not just errors.
        #[arg(short, long)]
        warnings: bool,
    },

    /// Show the resolved polling cadence and timeouts per operation.
    Timeouts,

    /// Inspect managed state.
    State {
        /// State subcommand.
        #[command(subcommand)]
        command: StateCommands,
    },

    /// Work with resource IDs.
    Id {
        /// ID subcommand.
        #[command(subcommand)]
        command: IdCommands,
    },
}

/// State management subcommands.
#[derive(Subcommand, Debug)]
pub enum StateCommands {
    /// List all managed records.
    List,

    /// Show one managed record.
    Show {
        /// Address of the record (e.g. `dhcp_server.main`).
        address: String,
    },

    /// Forget a managed record without touching the remote resource.
    Rm {
        /// Address of the record.
        address: String,
    },
}

/// Resource ID subcommands.
#[derive(Subcommand, Debug)]
pub enum IdCommands {
    /// Split a `<cloud-instance-id>/<resource-id>` into its parts.
    Parse {
        /// The encoded ID.
        id: String,
    },
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
