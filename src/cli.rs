//! CLI arguments and subcommands for pidinfo.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Largest PID the Linux kernel can hand out (2^31 - 1).
pub const MAX_PID: i64 = 2_147_483_647;

/// Log level options for CLI parsing
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Output format for a resolved process record
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "pidinfo",
    about = "Per-process CPU, memory, uptime and command line lookup",
    long_about = "Per-process CPU, memory, uptime and command line lookup.\n\n\
                  Resolves a PID through the host `ps` utility, supporting both procps and \
                  BusyBox builds. When the listing lacks usage columns, CPU and memory \
                  percentages are sampled directly from /proc.",
    version,
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log level (overrides config, default warn)
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// Clock ticks per second override (0 = ask the platform)
    #[arg(long, env = "CLOCK_TICK_RATE")]
    pub clock_tick_rate: Option<u64>,

    /// Delay between the two CPU samples in milliseconds
    #[arg(long)]
    pub sample_interval_ms: Option<u64>,

    /// Process listing program
    #[arg(long)]
    pub ps_command: Option<String>,

    /// Try the reduced listing whenever the full listing fails
    #[arg(long)]
    pub fallback_on_any_failure: bool,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show CPU, memory, uptime, user and command line of one process
    Pid {
        /// Process ID to look up
        #[arg(value_parser = clap::value_parser!(u32).range(1..=MAX_PID))]
        pid: u32,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List unique processes ordered by CPU usage
    Top {
        /// Page number (1-based)
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Rows per page (overrides config)
        #[arg(long)]
        page_size: Option<usize>,
    },

    /// Validate configuration and system requirements
    Check,

    /// Generate configuration files
    Config {
        /// Output file path ("-" for stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Include comments and examples
        #[arg(long)]
        commented: bool,
    },
}
