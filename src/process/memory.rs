//! Memory percentage estimation for a single process.
//!
//! Resident set size from `/proc/<pid>/status` relative to `MemTotal` from
//! `/proc/meminfo`.

use tracing::debug;

use crate::error::ProcReadError;
use crate::procfs::ProcFs;

/// `resident / total * 100`, or 0 if either side is 0. Not clamped.
pub fn memory_percent(resident_kb: u64, total_kb: u64) -> f64 {
    if resident_kb == 0 || total_kb == 0 {
        return 0.0;
    }
    resident_kb as f64 / total_kb as f64 * 100.0
}

/// Estimates the memory percentage of `pid`.
///
/// A missing `VmRSS` or `MemTotal` line yields 0; unreadable files are
/// returned as errors for the caller to degrade.
pub async fn sample_memory_percent(procfs: &ProcFs, pid: u32) -> Result<f64, ProcReadError> {
    let (resident, total) = tokio::join!(procfs.resident_kb(pid), procfs.mem_total_kb());

    match (resident, total) {
        (Ok(resident_kb), Ok(total_kb)) => Ok(memory_percent(resident_kb, total_kb)),
        (Err(e), _) | (_, Err(e)) if e.is_missing_field() => {
            debug!("pid {}: {}, reporting 0% memory", pid, e);
            Ok(0.0)
        }
        (Err(e), _) | (_, Err(e)) => Err(e),
    }
}
