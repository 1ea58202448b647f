//! Top command implementation.
//!
//! Prints one page of unique processes ordered by CPU usage.

use pidinfo::process::top::{collect_top, display_name, page};
use pidinfo::ProcFs;
use tracing::debug;

use crate::config::Config;
use crate::startup_checks;

/// Samples all processes and prints page `page_number` (1-based).
pub async fn command_top(
    page_number: usize,
    page_size: Option<usize>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let procfs = ProcFs::default();
    startup_checks::validate_requirements(&procfs)?;

    let page_size = page_size.unwrap_or_else(|| config.top_page_size()).max(1);
    let interval = config.sample_interval();

    let rows = tokio::task::spawn_blocking(move || collect_top(&procfs, interval)).await??;
    debug!("{} unique processes sampled", rows.len());

    let shown = page(&rows, page_number.saturating_sub(1), page_size);

    println!(
        "{:>3}  {:>7}  {:<20}  {:>6}  {:>6}",
        "#", "PID", "NAME", "CPU %", "MEM %"
    );
    for (offset, row) in shown.rows.iter().enumerate() {
        println!(
            "{:>3}  {:>7}  {:<20}  {:>6.1}  {:>6.1}",
            shown.first_rank + offset,
            row.pid,
            display_name(&row.name),
            row.cpu_percent,
            row.mem_percent
        );
    }
    println!(
        "\nPage {}/{} ({} processes)",
        shown.index + 1,
        shown.total_pages.max(1),
        rows.len()
    );

    Ok(())
}
