//! Runtime requirement validation for pidinfo.
//!
//! Checks that the /proc counters needed by the CPU and memory estimators are
//! readable before a command relies on them.

use nix::unistd::geteuid;
use pidinfo::ProcFs;
use std::fs;
use tracing::{debug, error, info, warn};

/// Validate all runtime requirements
pub fn validate_requirements(procfs: &ProcFs) -> Result<(), ValidationError> {
    info!("🔍 Validating runtime requirements...");

    check_user_privileges();
    check_proc_access(procfs)?;

    info!("✅ All runtime requirements validated");
    Ok(())
}

/// Warns when other users' processes may be hidden from us
fn check_user_privileges() {
    if !geteuid().is_root() {
        warn!("⚠️  Not running as root - /proc entries of other users may be unreadable");
        warn!("   On hosts mounting /proc with hidepid, only own processes are visible");
    } else {
        info!("✅ Running as root (uid=0)");
    }
}

/// Check the system-wide counter files and our own per-process files
fn check_proc_access(procfs: &ProcFs) -> Result<(), ValidationError> {
    let root = procfs.root();
    if !root.is_dir() {
        error!("❌ {} not found - CPU and memory cannot be sampled", root.display());
        return Err(ValidationError::ProcUnavailable(root.display().to_string()));
    }

    for name in ["stat", "meminfo", "uptime"] {
        let path = root.join(name);
        if let Err(e) = fs::metadata(&path) {
            error!("❌ Cannot access {}: {}", path.display(), e);
            return Err(ValidationError::CounterUnreadable(path.display().to_string(), e));
        }
        debug!("{} accessible", path.display());
    }

    let own = std::process::id();
    match procfs.process_ticks_blocking(own) {
        Ok(_) => info!("✅ /proc access: per-process counters readable"),
        Err(e) => {
            error!("❌ Cannot read counters of our own process {}: {}", own, e);
            return Err(ValidationError::InsufficientPermissions(e.to_string()));
        }
    }

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("proc filesystem not mounted at {0}")]
    ProcUnavailable(String),

    #[error("Cannot read {0}: {1}")]
    CounterUnreadable(String, #[source] std::io::Error),

    #[error("Insufficient permissions: {0}")]
    InsufficientPermissions(String),
}
