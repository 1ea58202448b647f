//! Configuration management for pidinfo.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat};
use pidinfo::process::{ResolverSettings, DEFAULT_REDUCED_SIGNATURES};
use pidinfo::render::DEFAULT_COMMAND_MAX_CHARS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

// Default configuration constants
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 250;
pub const MAX_SAMPLE_INTERVAL_MS: u64 = 10_000;
pub const DEFAULT_PS_COMMAND: &str = "ps";
pub const DEFAULT_TOP_PAGE_SIZE: usize = 9;
pub const DEFAULT_LOG_LEVEL: &str = "warn";

const LOG_LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

/// Configuration file locations probed when no path is given.
const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "/etc/pidinfo/pidinfo.yaml",
    "/etc/pidinfo/pidinfo.yml",
    "/etc/pidinfo/pidinfo.json",
    "./pidinfo.yaml",
    "./pidinfo.yml",
    "./pidinfo.json",
];

/// Configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    // Resolver
    /// Clock ticks per second; unset or 0 asks the platform
    #[serde(alias = "clock-tick-rate")]
    pub clock_tick_rate: Option<u64>,
    #[serde(alias = "sample-interval-ms")]
    pub sample_interval_ms: Option<u64>,
    #[serde(alias = "ps-command")]
    pub ps_command: Option<String>,
    /// Case-insensitive stderr fragments that mark a BusyBox `ps`
    #[serde(alias = "reduced-signatures")]
    pub reduced_signatures: Option<Vec<String>>,
    #[serde(alias = "fallback-on-any-failure")]
    pub fallback_on_any_failure: Option<bool>,

    // Presentation
    #[serde(alias = "command-max-chars")]
    pub command_max_chars: Option<usize>,
    #[serde(alias = "top-page-size")]
    pub top_page_size: Option<usize>,

    // Logging
    #[serde(alias = "log-level")]
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            clock_tick_rate: None,
            sample_interval_ms: Some(DEFAULT_SAMPLE_INTERVAL_MS),
            ps_command: Some(DEFAULT_PS_COMMAND.to_string()),
            reduced_signatures: Some(
                DEFAULT_REDUCED_SIGNATURES
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            ),
            fallback_on_any_failure: Some(false),
            command_max_chars: Some(DEFAULT_COMMAND_MAX_CHARS),
            top_page_size: Some(DEFAULT_TOP_PAGE_SIZE),
            log_level: Some(DEFAULT_LOG_LEVEL.to_string()),
        }
    }
}

impl Config {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(
            self.sample_interval_ms
                .unwrap_or(DEFAULT_SAMPLE_INTERVAL_MS),
        )
    }

    pub fn command_max_chars(&self) -> usize {
        self.command_max_chars.unwrap_or(DEFAULT_COMMAND_MAX_CHARS)
    }

    pub fn top_page_size(&self) -> usize {
        self.top_page_size.unwrap_or(DEFAULT_TOP_PAGE_SIZE)
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Explicit settings handed to the resolver.
    pub fn resolver_settings(&self) -> ResolverSettings {
        let defaults = ResolverSettings::default();
        ResolverSettings {
            clock_tick_override: self.clock_tick_rate.filter(|&t| t > 0),
            sample_interval: self.sample_interval(),
            ps_command: self.ps_command.clone().unwrap_or(defaults.ps_command),
            reduced_signatures: self
                .reduced_signatures
                .clone()
                .unwrap_or(defaults.reduced_signatures),
            fallback_on_any_failure: self.fallback_on_any_failure.unwrap_or(false),
        }
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let interval = cfg.sample_interval_ms.unwrap_or(DEFAULT_SAMPLE_INTERVAL_MS);
    if interval == 0 || interval > MAX_SAMPLE_INTERVAL_MS {
        return Err(format!(
            "sample_interval_ms must be between 1 and {}, got {}",
            MAX_SAMPLE_INTERVAL_MS, interval
        )
        .into());
    }

    if cfg.ps_command.as_deref().is_some_and(|c| c.trim().is_empty()) {
        return Err("ps_command must not be empty".into());
    }

    let has_signatures = cfg
        .reduced_signatures
        .as_ref()
        .map_or(true, |v| v.iter().any(|s| !s.trim().is_empty()));
    if !has_signatures && !cfg.fallback_on_any_failure.unwrap_or(false) {
        return Err("reduced_signatures is empty and fallback_on_any_failure is false, \
            the reduced listing would never be tried"
            .into());
    }

    if cfg.command_max_chars() < 4 {
        return Err(format!(
            "command_max_chars must be at least 4, got {}",
            cfg.command_max_chars()
        )
        .into());
    }

    if cfg.top_page_size() == 0 {
        return Err("top_page_size must be greater than 0".into());
    }

    let level = cfg.log_level().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        return Err(format!(
            "Invalid log_level '{}', expected one of {}",
            cfg.log_level(),
            LOG_LEVELS.join(", ")
        )
        .into());
    }

    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(rate) = args.clock_tick_rate {
        config.clock_tick_rate = Some(rate);
    }
    if let Some(ms) = args.sample_interval_ms {
        config.sample_interval_ms = Some(ms);
    }
    if let Some(cmd) = &args.ps_command {
        config.ps_command = Some(cmd.clone());
    }
    if args.fallback_on_any_failure {
        config.fallback_on_any_failure = Some(true);
    }
    if let Some(level) = &args.log_level {
        config.log_level = Some(format!("{:?}", level).to_ascii_lowercase());
    }

    Ok(config)
}

/// Configuration loading with multiple format support
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(format!("Config file not found: {}", p.display()).into());
            }
            p.to_path_buf()
        }
        None => match DEFAULT_CONFIG_PATHS
            .iter()
            .find(|p| Path::new(p).exists())
            .map(PathBuf::from)
        {
            Some(p) => p,
            None => return Ok(Config::default()),
        },
    };

    let content = fs::read_to_string(&path)?;

    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => {
            let config: Config = serde_json::from_str(&content)?;
            info!("Loaded JSON configuration from: {}", path.display());
            Ok(config)
        }
        Some("toml") => {
            let config: Config = toml::from_str(&content)?;
            info!("Loaded TOML configuration from: {}", path.display());
            Ok(config)
        }
        _ => {
            // Default to YAML
            let config: Config = serde_yaml::from_str(&content)?;
            info!("Loaded YAML configuration from: {}", path.display());
            Ok(config)
        }
    }
}

/// Renders configuration in the requested format
pub fn format_config(config: &Config, format: &ConfigFormat) -> Result<String, Box<dyn std::error::Error>> {
    Ok(match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    })
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", format_config(config, &format)?);
    Ok(())
}
