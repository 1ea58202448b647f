//! CLI command implementations for pidinfo.
//!
//! This module provides implementations for all CLI subcommands:
//! - `pid`: Single process lookup
//! - `top`: Paginated process table
//! - `check`: System validation
//! - `config`: Configuration file generation

pub mod check;
pub mod config;
pub mod pid;
pub mod top;

// Re-export command functions
pub use check::command_check;
pub use config::command_config;
pub use pid::command_pid;
pub use top::command_top;
