//! Table of unique processes ordered by CPU usage.
//!
//! Every process is sampled twice, one interval apart, to get its share of
//! the system tick delta. Processes sharing a name collapse into the entry
//! with the highest combined CPU and memory usage.

use ahash::AHashMap as HashMap;
use rayon::prelude::*;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::ProcReadError;
use crate::process::memory::memory_percent;
use crate::process::scanner::{collect_proc_entries, read_process_name};
use crate::procfs::ProcFs;

/// Display width of a process name before it is shortened.
const MAX_NAME_CHARS: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopEntry {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f64,
    pub mem_percent: f64,
}

/// One page of a top table.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a> {
    pub rows: &'a [TopEntry],
    /// Zero-based page index, clamped to the last page.
    pub index: usize,
    pub total_pages: usize,
    /// One-based rank of the first row.
    pub first_rank: usize,
}

fn tick_snapshot(procfs: &ProcFs, pids: &[u32]) -> HashMap<u32, u64> {
    pids.par_iter()
        .filter_map(|&pid| {
            procfs
                .process_ticks_blocking(pid)
                .ok()
                .map(|ticks| (pid, ticks.total))
        })
        .collect::<Vec<_>>()
        .into_iter()
        .collect()
}

/// Samples every process under the /proc root. Blocks for `interval`.
pub fn collect_top(procfs: &ProcFs, interval: Duration) -> Result<Vec<TopEntry>, ProcReadError> {
    let entries = collect_proc_entries(procfs.root(), None);
    let pids: Vec<u32> = entries.iter().map(|e| e.pid).collect();
    debug!("Sampling {} processes", pids.len());

    let total_before = procfs.total_ticks_blocking()?;
    let before = tick_snapshot(procfs, &pids);
    std::thread::sleep(interval);
    let total_after = procfs.total_ticks_blocking()?;
    let after = tick_snapshot(procfs, &pids);

    let total_delta = total_after.saturating_sub(total_before);
    let mem_total_kb = match procfs.mem_total_kb_blocking() {
        Ok(kb) => kb,
        Err(e) => {
            warn!("Memory total unavailable, reporting 0% memory: {}", e);
            0
        }
    };

    let rows = entries
        .par_iter()
        .filter_map(|entry| {
            let ticks_after = *after.get(&entry.pid)?;
            let ticks_before = before.get(&entry.pid).copied().unwrap_or(ticks_after);
            let name = read_process_name(&entry.proc_path)?;

            let cpu_percent = if total_delta > 0 {
                ticks_after.saturating_sub(ticks_before) as f64 / total_delta as f64 * 100.0
            } else {
                0.0
            };
            let resident_kb = procfs.resident_kb_blocking(entry.pid).unwrap_or(0);

            Some(TopEntry {
                pid: entry.pid,
                name,
                cpu_percent,
                mem_percent: memory_percent(resident_kb, mem_total_kb),
            })
        })
        .collect();

    Ok(unique_by_name(rows))
}

/// Keeps one entry per name (highest cpu + mem), sorted by CPU descending.
pub fn unique_by_name(rows: Vec<TopEntry>) -> Vec<TopEntry> {
    let mut by_name: HashMap<String, TopEntry> = HashMap::new();
    for row in rows {
        match by_name.get(&row.name) {
            Some(existing)
                if existing.cpu_percent + existing.mem_percent
                    >= row.cpu_percent + row.mem_percent => {}
            _ => {
                by_name.insert(row.name.clone(), row);
            }
        }
    }

    let mut unique: Vec<TopEntry> = by_name.into_values().collect();
    unique.sort_by(|a, b| {
        b.cpu_percent
            .total_cmp(&a.cpu_percent)
            .then_with(|| a.name.cmp(&b.name))
    });
    unique
}

/// Slices out one page. Out-of-range indices show the last page.
pub fn page(rows: &[TopEntry], index: usize, page_size: usize) -> Page<'_> {
    let page_size = page_size.max(1);
    let total_pages = rows.len().div_ceil(page_size);
    let index = index.min(total_pages.saturating_sub(1));
    let start = index * page_size;
    let end = (start + page_size).min(rows.len());

    Page {
        rows: &rows[start..end],
        index,
        total_pages,
        first_rank: start + 1,
    }
}

/// Shortens long names to 17 characters plus an ellipsis.
pub fn display_name(name: &str) -> String {
    if name.chars().count() > MAX_NAME_CHARS {
        let head: String = name.chars().take(MAX_NAME_CHARS - 3).collect();
        format!("{}…", head)
    } else {
        name.to_string()
    }
}
