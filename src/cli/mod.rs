//! CLI module for the provider's operator tool.
//!
//! This module provides the command-line interface for checking
//! configuration and inspecting managed state.

mod commands;
mod output;

pub use commands::{Cli, Commands, IdCommands, OutputFormat, StateCommands};
pub use output::OutputFormatter;
