//! Per-process counters from `/proc/<pid>/stat` and `/proc/<pid>/status`.

use std::path::Path;

use crate::error::ProcReadError;
use crate::system::parse_kb_line;

/// CPU accounting for one process, in clock ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProcessTicks {
    /// utime + stime
    pub total: u64,
    /// Start time after boot; fixed for the lifetime of the process.
    pub start: u64,
}

/// Parses utime (field 14), stime (field 15) and starttime (field 22) from
/// `/proc/<pid>/stat`.
///
/// comm (field 2) may contain spaces and parentheses, so fields are counted
/// from the last ')' rather than from the start of the line.
pub fn parse_process_ticks(path: &Path, content: &str) -> Result<ProcessTicks, ProcReadError> {
    let after_comm = content
        .rfind(')')
        .map(|i| &content[i + 1..])
        .ok_or_else(|| ProcReadError::missing(path, "comm"))?;

    // After ')': state(0) ppid(1) ... utime(11) stime(12) ... starttime(19)
    let fields: Vec<&str> = after_comm.split_whitespace().collect();
    let field = |idx: usize, name: &'static str| -> Result<u64, ProcReadError> {
        let raw = fields
            .get(idx)
            .ok_or_else(|| ProcReadError::missing(path, name))?;
        raw.parse::<u64>()
            .map_err(|_| ProcReadError::invalid(path, name, raw))
    };

    let utime = field(11, "utime")?;
    let stime = field(12, "stime")?;
    let start = field(19, "starttime")?;

    Ok(ProcessTicks {
        total: utime.saturating_add(stime),
        start,
    })
}

/// Parses resident set size (`VmRSS`) from `/proc/<pid>/status`, in kilobytes.
///
/// Kernel threads have no `VmRSS` line; that surfaces as a missing field.
pub fn parse_resident_kb(path: &Path, content: &str) -> Result<u64, ProcReadError> {
    parse_kb_line(path, content, "VmRSS:")
}
