//! Elapsed-time normalization.
//!
//! `ps` reports a process's elapsed time (etime) in a handful of shorthand
//! encodings depending on the implementation. This module recognises them
//! and renders a uniform `"2d 3h 4m 9s"` form. Unknown input is passed
//! through untouched.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Recognised etime shapes, tried in order; first match wins.
/// Each pattern uses the named groups `d`, `h`, `m` and `s`.
static ETIME_SHAPES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // [dd-]hh:mm:ss
        r"^(?:(?P<d>\d+)-)?(?P<h>\d{1,2}):(?P<m>\d{2}):(?P<s>\d{2})$",
        // 2d03:04:09, 2d03:04, 2d03
        r"^(?P<d>\d+)d(?P<h>\d{1,2})(?::(?P<m>\d{2}))?(?::(?P<s>\d{2}))?$",
        // 2d03h04m09s
        r"^(?P<d>\d+)d(?P<h>\d{1,2})h(?:(?P<m>\d{1,2})m)?(?:(?P<s>\d{1,2})s)?$",
        // mm:ss
        r"^(?P<m>\d{1,2}):(?P<s>\d{2})$",
        // 2d03 (days + hours only)
        r"^(?P<d>\d+)d(?P<h>\d{1,2})$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("etime pattern must compile"))
    .collect()
});

/// A parsed elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ElapsedTime {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl ElapsedTime {
    pub fn total_seconds(&self) -> u64 {
        self.days
            .saturating_mul(86_400)
            .saturating_add(self.hours * 3_600 + self.minutes * 60 + self.seconds)
    }
}

impl fmt::Display for ElapsedTime {
    /// Leading zero units are dropped; seconds are always present.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.days > 0 {
            write!(f, "{}d ", self.days)?;
        }
        if self.hours > 0 || self.days > 0 {
            write!(f, "{}h ", self.hours)?;
        }
        if self.minutes > 0 || self.hours > 0 || self.days > 0 {
            write!(f, "{}m ", self.minutes)?;
        }
        write!(f, "{}s", self.seconds)
    }
}

/// Parses an etime token in any of the recognised shapes.
pub fn parse_elapsed(raw: &str) -> Option<ElapsedTime> {
    let raw = raw.trim();
    let caps = ETIME_SHAPES.iter().find_map(|re| re.captures(raw))?;

    let unit = |name: &str| -> Option<u64> {
        match caps.name(name) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };

    Some(ElapsedTime {
        days: unit("d")?,
        hours: unit("h")?,
        minutes: unit("m")?,
        seconds: unit("s")?,
    })
}

/// Normalizes an etime token, returning the input unchanged if no shape matches.
pub fn normalize_elapsed(raw: &str) -> String {
    match parse_elapsed(raw) {
        Some(elapsed) => elapsed.to_string(),
        None => raw.to_string(),
    }
}
