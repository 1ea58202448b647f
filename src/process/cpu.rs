//! CPU percentage estimation for a single process.
//!
//! Two snapshots of (system ticks, process ticks) are taken a fixed interval
//! apart. The tick delta ratio gives the instantaneous share; when that is
//! not strictly positive (idle process, too short a window) the lifetime
//! average since process start is reported instead.

use std::time::Duration;
use tracing::debug;

use crate::error::ProcReadError;
use crate::process::stat::ProcessTicks;
use crate::procfs::ProcFs;

/// Default delay between the two snapshots.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(250);

/// Smallest process age used by the lifetime average, in seconds.
const MIN_ELAPSED_SECONDS: f64 = 0.01;

/// One time-aligned reading of system and process ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuSample {
    pub total_ticks: u64,
    pub process: ProcessTicks,
}

/// Reads system and process ticks concurrently to keep the pair close in time.
pub async fn take_sample(procfs: &ProcFs, pid: u32) -> Result<CpuSample, ProcReadError> {
    let (total, process) = tokio::join!(procfs.total_ticks(), procfs.process_ticks(pid));
    Ok(CpuSample {
        total_ticks: total?,
        process: process?,
    })
}

/// `procDelta / totalDelta * 100`, or `None` when the window shows no usable
/// activity.
pub fn instantaneous_percent(first: &CpuSample, second: &CpuSample) -> Option<f64> {
    let total_delta = second.total_ticks as i128 - first.total_ticks as i128;
    let proc_delta = second.process.total as i128 - first.process.total as i128;

    if total_delta > 0 && proc_delta >= 0 {
        let pct = proc_delta as f64 / total_delta as f64 * 100.0;
        if pct > 0.0 {
            return Some(pct);
        }
    }
    None
}

/// Average CPU share over the whole life of the process.
pub fn lifetime_percent(process: &ProcessTicks, uptime_seconds: f64, clock_ticks: u64) -> f64 {
    let clk = clock_ticks.max(1) as f64;
    let elapsed = (uptime_seconds - process.start as f64 / clk).max(MIN_ELAPSED_SECONDS);
    process.total as f64 / clk / elapsed * 100.0
}

/// Estimates the CPU percentage of `pid`.
///
/// Fails only if one of the underlying reads fails; callers decide whether to
/// degrade that to 0.
pub async fn sample_cpu_percent(
    procfs: &ProcFs,
    pid: u32,
    interval: Duration,
    clock_ticks: u64,
) -> Result<f64, ProcReadError> {
    let first = take_sample(procfs, pid).await?;
    tokio::time::sleep(interval).await;
    let second = take_sample(procfs, pid).await?;

    if let Some(pct) = instantaneous_percent(&first, &second) {
        debug!("pid {}: instantaneous CPU {:.2}%", pid, pct);
        return Ok(pct);
    }

    let uptime = procfs.uptime_seconds().await?;
    let pct = lifetime_percent(&second.process, uptime, clock_ticks);
    debug!(
        "pid {}: no tick delta over {:?}, lifetime CPU {:.2}%",
        pid, interval, pct
    );
    Ok(pct)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn sample(total_ticks: u64, process_total: u64) -> CpuSample {
        CpuSample {
            total_ticks,
            process: ProcessTicks {
                total: process_total,
                start: 0,
            },
        }
    }

    // -------------------------------------------------------------------------
    // Tests for instantaneous_percent
    // -------------------------------------------------------------------------

    #[test]
    fn test_instantaneous_percent() {
        let pct = instantaneous_percent(&sample(1000, 100), &sample(1400, 150)).unwrap();
        assert!((pct - 12.5).abs() < 1e-9);
    }

    #[test]
    fn test_instantaneous_percent_bounds() {
        for (total_delta, proc_delta) in [(1u64, 1u64), (400, 1), (400, 399), (7, 3)] {
            let pct = instantaneous_percent(
                &sample(10_000, 500),
                &sample(10_000 + total_delta, 500 + proc_delta),
            )
            .unwrap();
            let upper = 100.0 * proc_delta as f64 / total_delta as f64;
            assert!(pct > 0.0 && pct <= upper + 1e-9, "{pct} not in (0, {upper}]");
        }
    }

    #[test]
    fn test_instantaneous_percent_degenerate_windows() {
        // No process activity
        assert_eq!(instantaneous_percent(&sample(1000, 100), &sample(1400, 100)), None);
        // No system activity
        assert_eq!(instantaneous_percent(&sample(1000, 100), &sample(1000, 150)), None);
        // Counter went backwards
        assert_eq!(instantaneous_percent(&sample(1000, 100), &sample(1400, 90)), None);
        assert_eq!(instantaneous_percent(&sample(1000, 100), &sample(900, 150)), None);
    }

    // -------------------------------------------------------------------------
    // Tests for lifetime_percent
    // -------------------------------------------------------------------------

    #[test]
    fn test_lifetime_percent() {
        // Started 100s after boot, uptime 300s -> 200s old, 50s of CPU -> 25%
        let ticks = ProcessTicks {
            total: 5000,
            start: 10_000,
        };
        let pct = lifetime_percent(&ticks, 300.0, 100);
        assert!((pct - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_lifetime_percent_just_started() {
        // Age rounds to zero; the 0.01s floor keeps the result finite
        let ticks = ProcessTicks {
            total: 1,
            start: 30_000,
        };
        let pct = lifetime_percent(&ticks, 300.0, 100);
        assert!(pct.is_finite());
        assert!((pct - 100.0).abs() < 1e-9);
    }

    // -------------------------------------------------------------------------
    // Tests for sample_cpu_percent
    // -------------------------------------------------------------------------

    fn fake_proc(dir: &Path) {
        fs::write(dir.join("stat"), "cpu  100 0 50 850 0 0 0 0 0 0\n").unwrap();
        fs::write(dir.join("uptime"), "300.00 1200.00\n").unwrap();
        fs::create_dir(dir.join("42")).unwrap();
        // utime=3000 stime=2000 starttime=10000
        fs::write(
            dir.join("42/stat"),
            "42 (busy loop) R 1 42 42 0 -1 0 0 0 0 0 3000 2000 0 0 20 0 1 0 10000 0 0",
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_sample_falls_back_to_lifetime_average() {
        let dir = tempdir().expect("Failed to create temp dir");
        fake_proc(dir.path());
        let procfs = ProcFs::new(dir.path());

        // Static files: zero delta, so the lifetime average is used
        let pct = sample_cpu_percent(&procfs, 42, Duration::ZERO, 100)
            .await
            .unwrap();
        assert!((pct - 25.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_sample_missing_process_fails() {
        let dir = tempdir().expect("Failed to create temp dir");
        fake_proc(dir.path());
        let procfs = ProcFs::new(dir.path());

        assert!(sample_cpu_percent(&procfs, 43, Duration::ZERO, 100)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_take_sample() {
        let dir = tempdir().expect("Failed to create temp dir");
        fake_proc(dir.path());
        let procfs = ProcFs::new(dir.path());

        let s = take_sample(&procfs, 42).await.unwrap();
        assert_eq!(s.total_ticks, 1000);
        assert_eq!(s.process.total, 5000);
        assert_eq!(s.process.start, 10_000);
    }
}
