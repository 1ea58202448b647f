//! `ps` listing strategies.
//!
//! Two incompatible `ps` families are supported:
//! - `FullListing`: procps-style `ps -p <pid> -o ...` with `%cpu`/`%mem`
//!   columns, one data row expected.
//! - `ReducedListing`: BusyBox `ps`, which lacks `-p` and the usage columns,
//!   so the whole table is listed and scanned for the target pid.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

use crate::error::ResolveError;

/// `pid ppid user %cpu %mem etime cmd...`
static FULL_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)\s+(-?\d+)\s+(\S+)\s+(\d+(?:\.\d+)?)\s+(\d+(?:\.\d+)?)\s+(\d[\d:dhms-]*)\s+(.+)$")
        .expect("full ps row pattern must compile")
});

/// `pid ppid user etime time stat args...`
static REDUCED_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)\s+(-?\d+)\s+(\S+)\s+(\d[\d:dhms-]*)\s+(\S+)\s+(\S+)\s+(.+)$")
        .expect("reduced ps row pattern must compile")
});

/// Which `ps` family produced a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingVariant {
    Full,
    Reduced,
}

impl fmt::Display for ListingVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingVariant::Full => write!(f, "full"),
            ListingVariant::Reduced => write!(f, "reduced"),
        }
    }
}

/// One parsed listing row. Usage columns are `None` when the variant does
/// not report them.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRow {
    pub pid: u32,
    pub ppid: i64,
    pub user: String,
    pub cpu_percent: Option<f64>,
    pub mem_percent: Option<f64>,
    pub elapsed: String,
    pub command: String,
}

/// A way of asking `ps` about one pid and reading its answer.
pub trait ListingStrategy: Send + Sync {
    fn variant(&self) -> ListingVariant;

    /// Arguments passed to the listing program.
    fn args(&self, pid: u32) -> Vec<String>;

    /// Extracts the row for `pid` from the program's stdout.
    fn parse(&self, pid: u32, stdout: &str) -> Result<ListingRow, ResolveError>;
}

/// Data rows of a listing: everything after the header, blank lines skipped.
pub fn data_rows(stdout: &str) -> impl Iterator<Item = &str> {
    stdout
        .lines()
        .skip_while(|l| l.trim().is_empty())
        .skip(1)
        .map(str::trim)
        .filter(|l| !l.is_empty())
}

/// True if `stdout` holds a header line and no data rows.
pub fn is_header_only(stdout: &str) -> bool {
    stdout.lines().any(|l| !l.trim().is_empty()) && data_rows(stdout).next().is_none()
}

/// True if `diagnostic` contains any of `signatures`, ignoring case.
pub fn matches_reduced_signature(diagnostic: &str, signatures: &[String]) -> bool {
    let diagnostic = diagnostic.to_lowercase();
    signatures
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .any(|s| diagnostic.contains(&s.to_lowercase()))
}

fn parse_error(variant: ListingVariant, line: &str) -> ResolveError {
    ResolveError::Parse {
        variant,
        line: line.to_string(),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FullListing;

impl ListingStrategy for FullListing {
    fn variant(&self) -> ListingVariant {
        ListingVariant::Full
    }

    fn args(&self, pid: u32) -> Vec<String> {
        vec![
            "-p".to_string(),
            pid.to_string(),
            "-o".to_string(),
            "pid,ppid,user,%cpu,%mem,etime,cmd".to_string(),
        ]
    }

    fn parse(&self, pid: u32, stdout: &str) -> Result<ListingRow, ResolveError> {
        let line = data_rows(stdout)
            .next()
            .ok_or(ResolveError::NotFound { pid })?;

        let caps = FULL_ROW
            .captures(line)
            .ok_or_else(|| parse_error(self.variant(), line))?;

        let parsed_pid: u32 = caps[1]
            .parse()
            .map_err(|_| parse_error(self.variant(), line))?;
        if parsed_pid != pid {
            return Err(ResolveError::NotFound { pid });
        }

        Ok(ListingRow {
            pid: parsed_pid,
            ppid: caps[2]
                .parse()
                .map_err(|_| parse_error(self.variant(), line))?,
            user: caps[3].to_string(),
            cpu_percent: Some(
                caps[4]
                    .parse()
                    .map_err(|_| parse_error(self.variant(), line))?,
            ),
            mem_percent: Some(
                caps[5]
                    .parse()
                    .map_err(|_| parse_error(self.variant(), line))?,
            ),
            elapsed: caps[6].to_string(),
            command: caps[7].to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReducedListing;

impl ListingStrategy for ReducedListing {
    fn variant(&self) -> ListingVariant {
        ListingVariant::Reduced
    }

    fn args(&self, _pid: u32) -> Vec<String> {
        vec![
            "-o".to_string(),
            "pid,ppid,user,etime,time,stat,args".to_string(),
        ]
    }

    fn parse(&self, pid: u32, stdout: &str) -> Result<ListingRow, ResolveError> {
        let wanted = pid.to_string();
        // Leading field must equal the pid exactly: pid 1 must not match 12
        let line = data_rows(stdout)
            .find(|row| {
                row.strip_prefix(wanted.as_str())
                    .is_some_and(|rest| rest.starts_with(char::is_whitespace))
            })
            .ok_or(ResolveError::NotFound { pid })?;

        let caps = REDUCED_ROW
            .captures(line)
            .ok_or_else(|| parse_error(self.variant(), line))?;

        let parsed_pid: u32 = caps[1]
            .parse()
            .map_err(|_| parse_error(self.variant(), line))?;
        if parsed_pid != pid {
            return Err(ResolveError::NotFound { pid });
        }

        Ok(ListingRow {
            pid: parsed_pid,
            ppid: caps[2]
                .parse()
                .map_err(|_| parse_error(self.variant(), line))?,
            user: caps[3].to_string(),
            cpu_percent: None,
            mem_percent: None,
            elapsed: caps[4].to_string(),
            command: caps[7].to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_header_only() {
        assert!(is_header_only("  PID  PPID USER %CPU %MEM ELAPSED CMD\n"));
        assert!(is_header_only("\nPID CMD\n\n"));
        assert!(!is_header_only(""));
        assert!(!is_header_only("  \n"));
        assert!(!is_header_only("PID CMD\n1 init\n"));
    }

    const FULL_OUTPUT: &str = "    PID    PPID USER     %CPU %MEM     ELAPSED CMD\n   4821       1 app       2.3  1.1    01:02:03 node app.js --port 8080\n";

    const BUSYBOX_OUTPUT: &str = "PID   PPID  USER     ELAPSED TIME   STAT COMMAND\n    1     0 root     2d03h   0:01   S    /sbin/init\n   12     1 root     2d03h   0:00   S    /sbin/syslogd -n\n 4821     1 app      2d03h   1:23   S    node app.js\n";

    // -------------------------------------------------------------------------
    // Tests for FullListing
    // -------------------------------------------------------------------------

    #[test]
    fn test_full_args() {
        assert_eq!(
            FullListing.args(4821),
            vec!["-p", "4821", "-o", "pid,ppid,user,%cpu,%mem,etime,cmd"]
        );
    }

    #[test]
    fn test_full_parse() {
        let row = FullListing.parse(4821, FULL_OUTPUT).unwrap();
        assert_eq!(row.pid, 4821);
        assert_eq!(row.ppid, 1);
        assert_eq!(row.user, "app");
        assert_eq!(row.cpu_percent, Some(2.3));
        assert_eq!(row.mem_percent, Some(1.1));
        assert_eq!(row.elapsed, "01:02:03");
        // Embedded whitespace in the command is preserved
        assert_eq!(row.command, "node app.js --port 8080");
    }

    #[test]
    fn test_full_parse_header_only_is_not_found() {
        let err = FullListing
            .parse(4821, "    PID    PPID USER     %CPU %MEM     ELAPSED CMD\n")
            .unwrap_err();
        assert!(err.is_not_found());

        assert!(FullListing.parse(4821, "").unwrap_err().is_not_found());
    }

    #[test]
    fn test_full_parse_rejects_other_pid() {
        let output = FULL_OUTPUT.replace("4821", "4822");
        let err = FullListing.parse(4821, &output).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_full_parse_unexpected_column() {
        let output = "PID PPID USER STAT %CPU %MEM ELAPSED CMD\n4821 1 app S 2.3 1.1 01:02:03 node app.js\n";
        let err = FullListing.parse(4821, output).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Parse {
                variant: ListingVariant::Full,
                ..
            }
        ));
    }

    #[test]
    fn test_full_parse_day_etime_and_numeric_user() {
        let output = "PID PPID USER %CPU %MEM ELAPSED CMD\n77 2 1001 150.0 0.0 12-04:05:06 [kworker/u8:2]\n";
        let row = FullListing.parse(77, output).unwrap();
        assert_eq!(row.user, "1001");
        assert_eq!(row.cpu_percent, Some(150.0));
        assert_eq!(row.elapsed, "12-04:05:06");
        assert_eq!(row.command, "[kworker/u8:2]");
    }

    // -------------------------------------------------------------------------
    // Tests for ReducedListing
    // -------------------------------------------------------------------------

    #[test]
    fn test_reduced_args_do_not_select_pid() {
        assert_eq!(
            ReducedListing.args(4821),
            vec!["-o", "pid,ppid,user,etime,time,stat,args"]
        );
    }

    #[test]
    fn test_reduced_parse() {
        let row = ReducedListing.parse(4821, BUSYBOX_OUTPUT).unwrap();
        assert_eq!(row.pid, 4821);
        assert_eq!(row.ppid, 1);
        assert_eq!(row.user, "app");
        assert_eq!(row.cpu_percent, None);
        assert_eq!(row.mem_percent, None);
        assert_eq!(row.elapsed, "2d03h");
        assert_eq!(row.command, "node app.js");
    }

    #[test]
    fn test_reduced_parse_no_prefix_match() {
        let only_12 = "PID PPID USER ELAPSED TIME STAT COMMAND\n12 1 root 2d03h 0:00 S /sbin/syslogd -n\n";
        assert!(ReducedListing.parse(1, only_12).unwrap_err().is_not_found());
        assert_eq!(ReducedListing.parse(12, only_12).unwrap().pid, 12);

        let row = ReducedListing.parse(1, BUSYBOX_OUTPUT).unwrap();
        assert_eq!(row.command, "/sbin/init");
    }

    #[test]
    fn test_reduced_parse_missing_pid() {
        assert!(ReducedListing
            .parse(999, BUSYBOX_OUTPUT)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_reduced_parse_truncated_row() {
        let output = "PID PPID USER ELAPSED TIME STAT COMMAND\n4821 1 app 2d03h\n";
        let err = ReducedListing.parse(4821, output).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Parse {
                variant: ListingVariant::Reduced,
                ..
            }
        ));
    }

    // -------------------------------------------------------------------------
    // Tests for matches_reduced_signature / data_rows
    // -------------------------------------------------------------------------

    #[test]
    fn test_matches_reduced_signature() {
        let sigs = vec!["unrecognized option: p".to_string(), "BusyBox".to_string()];
        assert!(matches_reduced_signature("ps: unrecognized option: p\n", &sigs));
        assert!(matches_reduced_signature(
            "BusyBox v1.36.1 (2023-07-27) multi-call binary.",
            &sigs
        ));
        assert!(matches_reduced_signature("ps: Unrecognized Option: P", &sigs));
        assert!(!matches_reduced_signature("ps: permission denied", &sigs));
        assert!(!matches_reduced_signature("", &sigs));
        // Blank signatures never match everything
        assert!(!matches_reduced_signature("anything", &["  ".to_string()]));
    }

    #[test]
    fn test_data_rows_skip_header_and_blanks() {
        let rows: Vec<&str> = data_rows("\nHEADER\n  a b \n\n c\n").collect();
        assert_eq!(rows, vec!["a b", "c"]);
        assert_eq!(data_rows("HEADER\n").count(), 0);
    }

    #[test]
    fn test_variant_display() {
        assert_eq!(ListingVariant::Full.to_string(), "full");
        assert_eq!(ListingVariant::Reduced.to_string(), "reduced");
    }
}
