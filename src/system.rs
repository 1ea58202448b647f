//! System-wide counters from the /proc filesystem.
//!
//! This module provides parsers for the system-wide accounting sources the
//! resolver needs: aggregate CPU ticks from `/proc/stat`, total memory from
//! `/proc/meminfo` and uptime from `/proc/uptime`, plus the clock
//! resolution used to turn ticks into seconds.

use std::path::Path;

use crate::error::ProcReadError;

/// Clock resolution used when neither an override nor the platform provides one.
pub const DEFAULT_CLK_TCK: u64 = 100;

/// Parses the aggregate CPU tick counter: the sum of every numeric field on
/// the first line of `/proc/stat`.
///
/// Format: "cpu  4705 356 584 3699 23 23 0 0 0 0"
pub fn parse_total_ticks(path: &Path, content: &str) -> Result<u64, ProcReadError> {
    let first_line = content
        .lines()
        .next()
        .ok_or_else(|| ProcReadError::missing(path, "cpu"))?;

    let mut parts = first_line.split_whitespace();
    match parts.next() {
        Some(label) if label.starts_with("cpu") => {}
        _ => return Err(ProcReadError::missing(path, "cpu")),
    }

    let mut total: u64 = 0;
    let mut fields = 0;
    for value in parts {
        let ticks = value
            .parse::<u64>()
            .map_err(|_| ProcReadError::invalid(path, "cpu", value))?;
        total = total.saturating_add(ticks);
        fields += 1;
    }

    if fields == 0 {
        return Err(ProcReadError::missing(path, "cpu"));
    }

    Ok(total)
}

/// Parses `MemTotal` from `/proc/meminfo`, in kilobytes.
pub fn parse_mem_total_kb(path: &Path, content: &str) -> Result<u64, ProcReadError> {
    parse_kb_line(path, content, "MemTotal:")
}

/// Parses the first field of `/proc/uptime`, in seconds.
///
/// Format: "<uptime_seconds> <idle_seconds>"
pub fn parse_uptime_seconds(path: &Path, content: &str) -> Result<f64, ProcReadError> {
    let first = content
        .split_whitespace()
        .next()
        .ok_or_else(|| ProcReadError::missing(path, "uptime"))?;

    first
        .parse::<f64>()
        .map_err(|_| ProcReadError::invalid(path, "uptime", first))
}

/// Finds a `Key:   1234 kB` line and returns its numeric part.
pub(crate) fn parse_kb_line(
    path: &Path,
    content: &str,
    key: &'static str,
) -> Result<u64, ProcReadError> {
    let field = key.trim_end_matches(':');
    let line = content
        .lines()
        .find(|l| l.starts_with(key))
        .ok_or_else(|| ProcReadError::missing(path, field))?;

    let value = &line[key.len()..];
    parse_kb_value(value).ok_or_else(|| ProcReadError::invalid(path, field, value.trim()))
}

/// Parses kilobyte values such as `"   1234 kB"`.
pub fn parse_kb_value(v: &str) -> Option<u64> {
    v.split_whitespace().next()?.parse().ok()
}

/// Get system clock ticks per second as reported by the platform.
pub fn platform_clock_ticks() -> Option<u64> {
    #[cfg(unix)]
    {
        // SAFETY: sysconf is safe to call with _SC_CLK_TCK
        // Returns -1 on error, 0 if undefined - both are handled by the > 0 check
        let tck = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
        if tck > 0 {
            return Some(tck as u64);
        }
    }
    None
}

/// Resolves the clock resolution: operator override, then the platform
/// value, then [`DEFAULT_CLK_TCK`]. An override of 0 counts as unset.
pub fn clock_ticks_per_second(override_ticks: Option<u64>) -> u64 {
    override_ticks
        .filter(|&t| t > 0)
        .or_else(platform_clock_ticks)
        .unwrap_or(DEFAULT_CLK_TCK)
}
