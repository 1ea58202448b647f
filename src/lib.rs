//! pidinfo: per-process introspection library
//!
//! Resolves a PID into CPU %, memory %, elapsed time, owning user and command
//! line. Works against both full-featured (procps) and BusyBox `ps`, and
//! computes the usage columns BusyBox lacks directly from `/proc`.
//!
//! # Features
//!
//! - **Dual listing strategy**: full `ps -p` first, reduced BusyBox listing on a recognized diagnostic
//! - **Two-sample CPU estimator**: tick deltas with a lifetime-average fallback
//! - **Elapsed-time normalization**: five `etime` encodings rendered as `2d 3h 4m 9s`
//! - **Typed failures**: `NotFound`, `Parse` and `Invocation` are distinct
//!
//! # Usage
//!
//! ```rust
//! use pidinfo::normalize_elapsed;
//!
//! assert_eq!(normalize_elapsed("2-03:04:09"), "2d 3h 4m 9s");
//! assert_eq!(normalize_elapsed("05:09"), "5m 9s");
//! // Unknown shapes pass through untouched
//! assert_eq!(normalize_elapsed("soon"), "soon");
//! ```
//!
//! Resolving a process needs an async runtime:
//!
//! ```no_run
//! use pidinfo::{Resolver, ResolverSettings};
//!
//! # async fn demo() {
//! let resolver = Resolver::new(ResolverSettings::default());
//! match resolver.resolve(std::process::id()).await {
//!     Ok(record) => println!("{} uses {:.1}% CPU", record.command, record.cpu_percent),
//!     Err(e) if e.is_not_found() => println!("gone"),
//!     Err(e) => eprintln!("{}", e),
//! }
//! # }
//! ```

pub mod elapsed;
pub mod error;
pub mod process;
pub mod procfs;
pub mod render;
pub mod system;

// Re-export main types for convenience
pub use elapsed::{normalize_elapsed, parse_elapsed, ElapsedTime};
pub use error::{ProcReadError, ResolveError};
pub use process::{ListingVariant, ProcessRecord, Resolver, ResolverSettings};
pub use procfs::ProcFs;
