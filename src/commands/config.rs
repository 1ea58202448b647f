//! Config command implementation.
//!
//! Generates configuration files in various formats.

use std::fs;
use std::path::PathBuf;

use crate::cli::ConfigFormat;
use crate::config::{format_config, Config};

/// Generates configuration files.
pub fn command_config(
    output: Option<PathBuf>,
    format: ConfigFormat,
    commented: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let output = match output {
        Some(path) => path,
        None => PathBuf::from(match format {
            ConfigFormat::Yaml => "pidinfo.yaml",
            ConfigFormat::Json => "pidinfo.json",
            ConfigFormat::Toml => "pidinfo.toml",
        }),
    };

    let mut content = format_config(&config, &format)?;
    if commented && matches!(format, ConfigFormat::Yaml) {
        content = add_config_comments(content);
    }

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}

/// Adds comments to YAML configuration.
fn add_config_comments(yaml: String) -> String {
    let comments = r#"# pidinfo Configuration
# ======================
#
# Resolver
# --------
# clock_tick_rate: null        # Ticks per second (null/0 = ask the platform, else 100)
# sample_interval_ms: 250      # Delay between the two CPU samples (1..10000)
# ps_command: "ps"             # Process listing program
# reduced_signatures:          # stderr fragments that identify BusyBox ps
#   - "unrecognized option: p"
#   - "busybox"
# fallback_on_any_failure: false # Try the BusyBox listing on any ps failure
#
# Presentation
# ------------
# command_max_chars: 1000      # Longer command lines end in "..."
# top_page_size: 9             # Rows per page for `pidinfo top`
#
# Logging
# -------
# log_level: "warn"            # off, error, warn, info, debug, trace
"#;

    format!("{comments}\n{yaml}")
}
