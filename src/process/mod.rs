//! Process-level modules: kernel counters, listings and the resolver.
//!
//! This module provides:
//! - `stat`: per-process counter parsing from /proc/<pid>/stat and status
//! - `cpu`: two-sample CPU percentage estimator
//! - `memory`: resident memory percentage estimator
//! - `listing`: full and reduced `ps` output parsers
//! - `runner`: external command invocation
//! - `resolver`: pid to `ProcessRecord` orchestration
//! - `scanner` / `top`: system-wide process table

pub mod cpu;
pub mod listing;
pub mod memory;
pub mod resolver;
pub mod runner;
pub mod scanner;
pub mod stat;
pub mod top;

// Re-export commonly used types
pub use cpu::{sample_cpu_percent, DEFAULT_SAMPLE_INTERVAL};
pub use listing::{FullListing, ListingRow, ListingStrategy, ListingVariant, ReducedListing};
pub use memory::{memory_percent, sample_memory_percent};
pub use resolver::{ProcessRecord, Resolver, ResolverSettings, DEFAULT_REDUCED_SIGNATURES};
pub use runner::{CommandOutput, CommandRunner, SystemRunner};
pub use scanner::{collect_proc_entries, read_process_name};
pub use top::{collect_top, TopEntry};
