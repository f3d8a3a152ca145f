//! powervs CLI entrypoint.
//!
//! This is the main entrypoint for the provider's operator tool.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use powervs_provider::cli::{Cli, Commands, IdCommands, OutputFormatter, StateCommands};
use powervs_provider::config::{find_config_file, ConfigParser, ConfigValidator, ProviderConfig};
use powervs_provider::error::{ProviderError, Result, StateError};
use powervs_provider::handle::ResourceHandle;
use powervs_provider::state::{LocalStateStore, StateStore};

use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let formatter = OutputFormatter::new(cli.output);
    match runtime.block_on(run(cli, &formatter)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", formatter.error(&e.to_string()));
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli, formatter: &OutputFormatter) -> Result<()> {
    match cli.command {
        Commands::Validate { warnings } => cmd_validate(cli.config.as_ref(), warnings, formatter),
        Commands::Timeouts => cmd_timeouts(cli.config.as_ref(), formatter),
        Commands::State { command } => cmd_state(cli.config.as_ref(), command, formatter).await,
        Commands::Id { command } => cmd_id(command, formatter),
    }
}

/// Validate configuration.
fn cmd_validate(
    config_path: Option<&PathBuf>,
    show_warnings: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    let (config, _) = load_config(config_path)?;
    let result = ConfigValidator::check(&config);

    eprintln!("{}", formatter.format_validation(&result, &config, show_warnings));

    // Report the first error through the usual error path
    ConfigValidator::new().validate(&config)?;
    Ok(())
}

/// Show resolved reconciliation specs.
fn cmd_timeouts(config_path: Option<&PathBuf>, formatter: &OutputFormatter) -> Result<()> {
    let (config, _) = load_config(config_path)?;
    ConfigValidator::new().validate(&config)?;

    let specs = [
        ("dhcp_server create", config.dhcp_create_spec()),
        ("dhcp_server delete", config.dhcp_delete_spec()),
    ];
    eprintln!("{}", formatter.format_specs(&specs));
    Ok(())
}

/// State inspection commands.
async fn cmd_state(
    config_path: Option<&PathBuf>,
    command: StateCommands,
    formatter: &OutputFormatter,
) -> Result<()> {
    let state_store = load_state(config_path)?;

    match command {
        StateCommands::List => {
            let records = state_store.list().await?;
            eprintln!("{}", formatter.format_records(&records));
        }
        StateCommands::Show { address } => {
            let record = state_store
                .get(&address)
                .await?
                .ok_or(StateError::RecordNotFound { address: address.clone() })?;
            eprintln!("{}", formatter.format_record(&address, &record));
        }
        StateCommands::Rm { address } => {
            if state_store.remove(&address).await?.is_some() {
                warn!("Forgot {address}; the remote resource was not touched");
                eprintln!("{}", formatter.success(&format!("Removed {address} from state")));
            } else {
                return Err(ProviderError::State(StateError::RecordNotFound { address }));
            }
        }
    }

    Ok(())
}

/// Resource ID commands.
fn cmd_id(command: IdCommands, formatter: &OutputFormatter) -> Result<()> {
    match command {
        IdCommands::Parse { id } => {
            let handle = ResourceHandle::parse(&id)?;
            eprintln!("{}", formatter.format_handle(&handle));
        }
    }
    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Loads configuration; without a file, defaults plus environment are used.
///
/// Returns the configuration and the directory relative paths resolve against.
fn load_config(config_path: Option<&PathBuf>) -> Result<(ProviderConfig, PathBuf)> {
    let config_file = match config_path {
        Some(path) => Some(path.clone()),
        None => find_config_file(".").ok(),
    };

    let Some(config_file) = config_file else {
        debug!("No configuration file found, using defaults");
        let parser = ConfigParser::new();
        parser.load_dotenv()?;
        return Ok((parser.defaults_with_env(), PathBuf::from(".")));
    };

    let base_dir = config_file
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

    let parser = ConfigParser::new().with_base_path(&base_dir);
    parser.load_dotenv()?;
    let config = parser.load_with_env(&config_file)?;

    Ok((config, base_dir))
}

/// Opens the local state store configured for this project.
fn load_state(config_path: Option<&PathBuf>) -> Result<Box<dyn StateStore>> {
    let (config, base_dir) = load_config(config_path)?;
    ConfigValidator::new().validate(&config)?;

    let dir = if config.state.dir.is_absolute() {
        config.state.dir
    } else {
        base_dir.join(&config.state.dir)
    };

    info!("Using state directory: {}", dir.display());
    Ok(Box::new(LocalStateStore::with_base_dir(dir)))
}
