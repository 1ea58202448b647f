//! Error types for process resolution.
//!
//! `ResolveError` is what callers of [`crate::Resolver::resolve`] see.
//! `ProcReadError` covers single /proc counter reads; the estimators turn
//! those into a zeroed metric instead of failing the lookup.

use std::path::PathBuf;

use crate::process::listing::ListingVariant;

/// Failure reading or parsing one kernel accounting file.
#[derive(Debug, thiserror::Error)]
pub enum ProcReadError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Field '{field}' not found in {}", .path.display())]
    MissingField { path: PathBuf, field: &'static str },

    #[error("Invalid value '{value}' for '{field}' in {}", .path.display())]
    InvalidValue {
        path: PathBuf,
        field: &'static str,
        value: String,
    },
}

impl ProcReadError {
    pub(crate) fn missing(path: impl Into<PathBuf>, field: &'static str) -> Self {
        ProcReadError::MissingField {
            path: path.into(),
            field,
        }
    }

    pub(crate) fn invalid(path: impl Into<PathBuf>, field: &'static str, value: &str) -> Self {
        ProcReadError::InvalidValue {
            path: path.into(),
            field,
            value: value.to_string(),
        }
    }

    /// True if the file was readable but lacked the requested field.
    pub fn is_missing_field(&self) -> bool {
        matches!(self, ProcReadError::MissingField { .. })
    }
}

/// Typed failure returned by the resolver.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The pid is absent from the listing.
    #[error("PID {pid} not found")]
    NotFound { pid: u32 },

    /// The listing ran but its output matched no known column layout.
    #[error("Unable to parse {variant} ps output: {line:?}")]
    Parse {
        variant: ListingVariant,
        line: String,
    },

    /// The listing utility could not run, or failed for an unrecognised reason.
    #[error("Failed to run {program}: {reason}")]
    Invocation { program: String, reason: String },
}

impl ResolveError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveError::NotFound { .. })
    }
}
