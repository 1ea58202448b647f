//! Pid command implementation.
//!
//! Resolves one process and prints it.

use pidinfo::render::{failure_message, RecordView};
use pidinfo::Resolver;
use tracing::{error, info};

use crate::cli::OutputFormat;
use crate::config::Config;

/// Exit code for a pid that does not exist.
pub const EXIT_NOT_FOUND: i32 = 2;
/// Exit code for any other lookup failure.
pub const EXIT_FAILURE: i32 = 1;

/// Resolves `pid` and prints it. Returns the process exit code.
pub async fn command_pid(
    pid: u32,
    format: OutputFormat,
    config: &Config,
) -> Result<i32, Box<dyn std::error::Error>> {
    let resolver = Resolver::new(config.resolver_settings());

    match resolver.resolve(pid).await {
        Ok(record) => {
            info!("pid {} resolved from {} listing", pid, record.source);
            let view = RecordView::from_record(&record, config.command_max_chars());
            match format {
                OutputFormat::Text => print!("{}", view.render_text()),
                OutputFormat::Json => println!("{}", view.render_json()?),
                OutputFormat::Yaml => print!("{}", view.render_yaml()?),
            }
            Ok(0)
        }
        Err(e) => {
            println!("{}", failure_message(&e));
            if e.is_not_found() {
                info!("{}", e);
                Ok(EXIT_NOT_FOUND)
            } else {
                error!("{}", e);
                Ok(EXIT_FAILURE)
            }
        }
    }
}
