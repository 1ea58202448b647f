//! pidinfo - version 0.1.0
//!
//! Per-process introspection CLI with tracing logging.
//! This is the main entry point that resolves configuration and dispatches subcommands.

mod cli;
mod commands;
mod config;
mod startup_checks;

use clap::{CommandFactory, Parser};
use tracing::{debug, Level};

use cli::{Args, Commands};
use commands::{command_check, command_config, command_pid, command_top};
use config::{resolve_config, show_config, validate_effective_config, Config};

/// Initializes tracing logging subsystem with the configured log level.
/// Logs go to stderr so command output on stdout stays clean.
fn setup_logging(config: &Config) {
    let log_level = match config.log_level().to_ascii_lowercase().as_str() {
        "off" => None,
        "error" => Some(Level::ERROR),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => Some(Level::WARN),
    };
    let Some(log_level) = log_level else {
        return;
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    debug!("Logging initialized with level: {}", log_level);
}

/// Main application entry point.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match resolve_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if args.check_config {
        if let Err(e) = validate_effective_config(&config) {
            eprintln!("❌ Configuration invalid: {}", e);
            std::process::exit(1);
        }
        println!("✅ Configuration is valid");
        return Ok(());
    }

    if args.show_config {
        return show_config(&config, args.config_format);
    }

    let Some(command) = args.command else {
        Args::command().print_help()?;
        return Ok(());
    };

    // Config generation works even when the loaded config is broken
    if let Commands::Config {
        output,
        format,
        commented,
    } = command
    {
        return command_config(output, format, commented);
    }

    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }
    setup_logging(&config);

    match command {
        Commands::Pid { pid, format } => {
            let code = command_pid(pid, format, &config).await?;
            if code != 0 {
                std::process::exit(code);
            }
            Ok(())
        }
        Commands::Top { page, page_size } => command_top(page, page_size, &config).await,
        Commands::Check => command_check(&config).await,
        Commands::Config { .. } => unreachable!("Config handled above"),
    }
}
