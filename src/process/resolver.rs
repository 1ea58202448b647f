//! Process resolver: pid in, `ProcessRecord` out.
//!
//! The full `ps` variant is tried first. If the invocation itself fails with
//! a diagnostic that identifies the reduced (BusyBox) family, the reduced
//! variant is tried once; its missing usage columns are filled in from
//! /proc by the CPU and memory estimators. Any other invocation failure, and
//! any parse failure of a successful invocation, is terminal.

use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::ResolveError;
use crate::process::cpu::{sample_cpu_percent, DEFAULT_SAMPLE_INTERVAL};
use crate::process::listing::{
    is_header_only, matches_reduced_signature, FullListing, ListingRow, ListingStrategy,
    ListingVariant, ReducedListing,
};
use crate::process::memory::sample_memory_percent;
use crate::process::runner::{CommandOutput, CommandRunner, SystemRunner};
use crate::procfs::ProcFs;
use crate::system::clock_ticks_per_second;

/// Diagnostics that identify a BusyBox-style `ps`, matched case-insensitively.
pub const DEFAULT_REDUCED_SIGNATURES: &[&str] = &["unrecognized option: p", "busybox"];

/// Explicit resolver configuration. Nothing is read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverSettings {
    /// Operator override for the clock resolution (ticks per second).
    pub clock_tick_override: Option<u64>,
    /// Delay between the two CPU snapshots.
    pub sample_interval: Duration,
    /// Listing program.
    pub ps_command: String,
    /// Diagnostic substrings that route a failed full listing to the reduced one.
    pub reduced_signatures: Vec<String>,
    /// Try the reduced listing after any failed full invocation.
    pub fallback_on_any_failure: bool,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            clock_tick_override: None,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            ps_command: "ps".to_string(),
            reduced_signatures: DEFAULT_REDUCED_SIGNATURES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            fallback_on_any_failure: false,
        }
    }
}

/// Resolved information about one process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessRecord {
    pub pid: u32,
    pub ppid: i64,
    pub user: String,
    pub cpu_percent: f64,
    pub mem_percent: f64,
    /// Elapsed time exactly as reported by `ps`.
    pub elapsed: String,
    /// Full command line; never truncated here.
    pub command: String,
    /// Listing variant that produced the record.
    pub source: ListingVariant,
}

/// Why a listing attempt did not yield a row.
enum Attempt {
    Spawn(std::io::Error),
    Exited(CommandOutput),
    Rejected(ResolveError),
}

pub struct Resolver<R = SystemRunner> {
    runner: R,
    procfs: ProcFs,
    settings: ResolverSettings,
}

impl Resolver<SystemRunner> {
    /// Resolver using the real `ps` and `/proc`.
    pub fn new(settings: ResolverSettings) -> Self {
        Self::with_parts(SystemRunner, ProcFs::default(), settings)
    }
}

impl<R: CommandRunner> Resolver<R> {
    pub fn with_parts(runner: R, procfs: ProcFs, settings: ResolverSettings) -> Self {
        Self {
            runner,
            procfs,
            settings,
        }
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Resolves `pid` into a `ProcessRecord`.
    pub async fn resolve(&self, pid: u32) -> Result<ProcessRecord, ResolveError> {
        if pid == 0 {
            return Err(ResolveError::NotFound { pid });
        }

        let failure = match self.attempt(&FullListing, pid).await {
            Ok(row) => {
                debug!("pid {}: resolved via full ps listing", pid);
                return Ok(self.complete(row, ListingVariant::Full).await);
            }
            Err(failure) => failure,
        };

        let output = match failure {
            Attempt::Rejected(err) => return Err(err),
            Attempt::Spawn(e) if !self.settings.fallback_on_any_failure => {
                return Err(self.invocation_error(e.to_string()));
            }
            Attempt::Spawn(e) => {
                info!(
                    "pid {}: full ps listing could not start ({}), trying reduced listing",
                    pid, e
                );
                None
            }
            Attempt::Exited(output) => Some(output),
        };

        if let Some(output) = output {
            if matches_reduced_signature(&output.stderr, &self.settings.reduced_signatures) {
                info!(
                    "pid {}: {} looks like BusyBox ({}), using reduced listing",
                    pid,
                    self.settings.ps_command,
                    output.stderr.trim()
                );
            } else if output.code == Some(1)
                && output.stderr.trim().is_empty()
                && is_header_only(&output.stdout)
            {
                // procps exits 1 with a bare header when the pid does not exist
                return Err(ResolveError::NotFound { pid });
            } else if self.settings.fallback_on_any_failure {
                info!(
                    "pid {}: full ps listing failed ({}), trying reduced listing",
                    pid,
                    output.describe_failure()
                );
            } else {
                return Err(self.invocation_error(output.describe_failure()));
            }
        }

        match self.attempt(&ReducedListing, pid).await {
            Ok(row) => {
                debug!("pid {}: resolved via reduced ps listing", pid);
                Ok(self.complete(row, ListingVariant::Reduced).await)
            }
            Err(Attempt::Rejected(err)) => Err(err),
            Err(Attempt::Spawn(e)) => Err(self.invocation_error(e.to_string())),
            Err(Attempt::Exited(output)) => Err(self.invocation_error(output.describe_failure())),
        }
    }

    async fn attempt<S: ListingStrategy>(&self, strategy: &S, pid: u32) -> Result<ListingRow, Attempt> {
        let output = self
            .runner
            .run(&self.settings.ps_command, &strategy.args(pid))
            .await
            .map_err(Attempt::Spawn)?;

        if !output.success {
            debug!(
                "pid {}: {} listing failed: {}",
                pid,
                strategy.variant(),
                output.describe_failure()
            );
            return Err(Attempt::Exited(output));
        }

        strategy
            .parse(pid, &output.stdout)
            .map_err(Attempt::Rejected)
    }

    /// Fills in usage columns the listing did not report.
    async fn complete(&self, row: ListingRow, source: ListingVariant) -> ProcessRecord {
        let pid = row.pid;
        let (cpu_percent, mem_percent) = match (row.cpu_percent, row.mem_percent) {
            (Some(cpu), Some(mem)) => (cpu, mem),
            (cpu, mem) => {
                let (sampled_cpu, sampled_mem) = tokio::join!(
                    async {
                        match cpu {
                            Some(v) => v,
                            None => self.estimate_cpu(pid).await,
                        }
                    },
                    async {
                        match mem {
                            Some(v) => v,
                            None => self.estimate_memory(pid).await,
                        }
                    }
                );
                (sampled_cpu, sampled_mem)
            }
        };

        ProcessRecord {
            pid,
            ppid: row.ppid,
            user: row.user,
            cpu_percent,
            mem_percent,
            elapsed: row.elapsed,
            command: row.command,
            source,
        }
    }

    async fn estimate_cpu(&self, pid: u32) -> f64 {
        let clock_ticks = clock_ticks_per_second(self.settings.clock_tick_override);
        match sample_cpu_percent(&self.procfs, pid, self.settings.sample_interval, clock_ticks).await
        {
            Ok(pct) => pct,
            Err(e) => {
                warn!("pid {}: CPU estimate unavailable, reporting 0: {}", pid, e);
                0.0
            }
        }
    }

    async fn estimate_memory(&self, pid: u32) -> f64 {
        match sample_memory_percent(&self.procfs, pid).await {
            Ok(pct) => pct,
            Err(e) => {
                warn!("pid {}: memory estimate unavailable, reporting 0: {}", pid, e);
                0.0
            }
        }
    }

    fn invocation_error(&self, reason: String) -> ResolveError {
        ResolveError::Invocation {
            program: self.settings.ps_command.clone(),
            reason,
        }
    }
}
