//! Handle on a /proc-like filesystem.
//!
//! Every read opens, reads and releases its file within the call. Async
//! readers use `tokio::fs` and serve the resolver; the `_blocking` variants
//! serve the rayon-based process table scan.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ProcReadError;
use crate::process::stat::{parse_process_ticks, parse_resident_kb, ProcessTicks};
use crate::system::{parse_mem_total_kb, parse_total_ticks, parse_uptime_seconds};

pub const DEFAULT_PROC_ROOT: &str = "/proc";

#[derive(Debug, Clone)]
pub struct ProcFs {
    root: PathBuf,
}

impl Default for ProcFs {
    fn default() -> Self {
        Self::new(DEFAULT_PROC_ROOT)
    }
}

impl ProcFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn pid_path(&self, pid: u32, file: &str) -> PathBuf {
        self.root.join(pid.to_string()).join(file)
    }

    async fn read(&self, path: PathBuf) -> Result<(PathBuf, String), ProcReadError> {
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok((path, content)),
            Err(source) => {
                debug!("Failed to read {}: {}", path.display(), source);
                Err(ProcReadError::Io { path, source })
            }
        }
    }

    fn read_blocking(&self, path: PathBuf) -> Result<(PathBuf, String), ProcReadError> {
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok((path, content)),
            Err(source) => Err(ProcReadError::Io { path, source }),
        }
    }

    /// Aggregate CPU ticks across all cores (`/proc/stat`).
    pub async fn total_ticks(&self) -> Result<u64, ProcReadError> {
        let (path, content) = self.read(self.root.join("stat")).await?;
        parse_total_ticks(&path, &content)
    }

    /// utime+stime and start ticks for `pid` (`/proc/<pid>/stat`).
    pub async fn process_ticks(&self, pid: u32) -> Result<ProcessTicks, ProcReadError> {
        let (path, content) = self.read(self.pid_path(pid, "stat")).await?;
        parse_process_ticks(&path, &content)
    }

    /// Resident set size of `pid` in KB (`/proc/<pid>/status`).
    pub async fn resident_kb(&self, pid: u32) -> Result<u64, ProcReadError> {
        let (path, content) = self.read(self.pid_path(pid, "status")).await?;
        parse_resident_kb(&path, &content)
    }

    /// Total physical memory in KB (`/proc/meminfo`).
    pub async fn mem_total_kb(&self) -> Result<u64, ProcReadError> {
        let (path, content) = self.read(self.root.join("meminfo")).await?;
        parse_mem_total_kb(&path, &content)
    }

    /// Seconds since boot (`/proc/uptime`).
    pub async fn uptime_seconds(&self) -> Result<f64, ProcReadError> {
        let (path, content) = self.read(self.root.join("uptime")).await?;
        parse_uptime_seconds(&path, &content)
    }

    pub fn total_ticks_blocking(&self) -> Result<u64, ProcReadError> {
        let (path, content) = self.read_blocking(self.root.join("stat"))?;
        parse_total_ticks(&path, &content)
    }

    pub fn process_ticks_blocking(&self, pid: u32) -> Result<ProcessTicks, ProcReadError> {
        let (path, content) = self.read_blocking(self.pid_path(pid, "stat"))?;
        parse_process_ticks(&path, &content)
    }

    pub fn resident_kb_blocking(&self, pid: u32) -> Result<u64, ProcReadError> {
        let (path, content) = self.read_blocking(self.pid_path(pid, "status"))?;
        parse_resident_kb(&path, &content)
    }

    pub fn mem_total_kb_blocking(&self) -> Result<u64, ProcReadError> {
        let (path, content) = self.read_blocking(self.root.join("meminfo"))?;
        parse_mem_total_kb(&path, &content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn fake_proc(dir: &Path) {
        fs::write(dir.join("stat"), "cpu  100 0 50 850 0 0 0 0 0 0\n").unwrap();
        fs::write(dir.join("meminfo"), "MemTotal:        2000000 kB\n").unwrap();
        fs::write(dir.join("uptime"), "500.25 1800.00\n").unwrap();
        fs::create_dir(dir.join("77")).unwrap();
        fs::write(
            dir.join("77/stat"),
            "77 (worker) R 1 77 77 0 -1 0 0 0 0 0 30 20 0 0 20 0 1 0 4000 0 0",
        )
        .unwrap();
        fs::write(dir.join("77/status"), "Name:\tworker\nVmRSS:\t  100000 kB\n").unwrap();
    }

    #[tokio::test]
    async fn test_async_readers() {
        let dir = tempdir().expect("Failed to create temp dir");
        fake_proc(dir.path());
        let procfs = ProcFs::new(dir.path());

        assert_eq!(procfs.total_ticks().await.unwrap(), 1000);
        assert_eq!(
            procfs.process_ticks(77).await.unwrap(),
            ProcessTicks { total: 50, start: 4000 }
        );
        assert_eq!(procfs.resident_kb(77).await.unwrap(), 100_000);
        assert_eq!(procfs.mem_total_kb().await.unwrap(), 2_000_000);
        assert!((procfs.uptime_seconds().await.unwrap() - 500.25).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_missing_pid_is_io_error() {
        let dir = tempdir().expect("Failed to create temp dir");
        fake_proc(dir.path());
        let procfs = ProcFs::new(dir.path());

        let err = procfs.process_ticks(999).await.unwrap_err();
        assert!(matches!(err, ProcReadError::Io { .. }));
        assert!(err.to_string().contains("999"));
    }

    #[test]
    fn test_blocking_readers_match_async() {
        let dir = tempdir().expect("Failed to create temp dir");
        fake_proc(dir.path());
        let procfs = ProcFs::new(dir.path());

        assert_eq!(procfs.total_ticks_blocking().unwrap(), 1000);
        assert_eq!(procfs.process_ticks_blocking(77).unwrap().total, 50);
        assert_eq!(procfs.resident_kb_blocking(77).unwrap(), 100_000);
        assert_eq!(procfs.mem_total_kb_blocking().unwrap(), 2_000_000);
        assert!(procfs.resident_kb_blocking(78).is_err());
    }

    #[test]
    fn test_default_root() {
        assert_eq!(ProcFs::default().root(), Path::new("/proc"));
    }
}
