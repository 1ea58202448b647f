//! Presentation helpers for callers of the resolver.

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::elapsed::normalize_elapsed;
use crate::error::ResolveError;
use crate::process::resolver::ProcessRecord;

pub const DEFAULT_COMMAND_MAX_CHARS: usize = 1000;

pub const NOT_FOUND_MESSAGE: &str = "No process found for that PID.";
pub const FAILURE_MESSAGE: &str = "Failed to fetch PID info.";

/// Cuts `text` to at most `max` characters, ending in `...` when shortened.
pub fn truncate_command(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let head: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", head)
}

/// User-facing message for a resolver failure.
pub fn failure_message(err: &ResolveError) -> &'static str {
    if err.is_not_found() {
        NOT_FOUND_MESSAGE
    } else {
        FAILURE_MESSAGE
    }
}

/// Display-ready form of a `ProcessRecord`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordView {
    pub pid: u32,
    pub ppid: i64,
    pub user: String,
    /// One decimal place.
    pub cpu_percent: String,
    pub mem_percent: String,
    /// Normalized elapsed time, e.g. `2d 3h 0m 0s`.
    pub uptime: String,
    pub command: String,
    pub source: String,
    pub generated_at: DateTime<Local>,
}

impl RecordView {
    pub fn from_record(record: &ProcessRecord, command_max_chars: usize) -> Self {
        Self::at(record, command_max_chars, Local::now())
    }

    pub fn at(record: &ProcessRecord, command_max_chars: usize, generated_at: DateTime<Local>) -> Self {
        Self {
            pid: record.pid,
            ppid: record.ppid,
            user: record.user.clone(),
            cpu_percent: format!("{:.1}", record.cpu_percent),
            mem_percent: format!("{:.1}", record.mem_percent),
            uptime: normalize_elapsed(&record.elapsed),
            command: truncate_command(&record.command, command_max_chars),
            source: record.source.to_string(),
            generated_at,
        }
    }

    /// Labelled multi-line text block.
    pub fn render_text(&self) -> String {
        format!(
            "PID:     {}\n\
             PPID:    {}\n\
             User:    {}\n\
             CPU %:   {}\n\
             MEM %:   {}\n\
             Uptime:  {}\n\
             Command: {}\n\
             \n\
             Source {} ps listing, generated {}\n",
            self.pid,
            self.ppid,
            self.user,
            self.cpu_percent,
            self.mem_percent,
            self.uptime,
            self.command,
            self.source,
            self.generated_at.format("%Y-%m-%d %H:%M:%S %Z"),
        )
    }

    pub fn render_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn render_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::listing::ListingVariant;
    use chrono::TimeZone;

    fn record() -> ProcessRecord {
        ProcessRecord {
            pid: 4821,
            ppid: 1,
            user: "app".to_string(),
            cpu_percent: 2.34,
            mem_percent: 1.05,
            elapsed: "2-03:04:09".to_string(),
            command: "node app.js --port 8080".to_string(),
            source: ListingVariant::Full,
        }
    }

    // -------------------------------------------------------------------------
    // Tests for truncate_command
    // -------------------------------------------------------------------------

    #[test]
    fn test_truncate_command_short_passthrough() {
        assert_eq!(truncate_command("node app.js", 1000), "node app.js");
        assert_eq!(truncate_command("abcd", 4), "abcd");
    }

    #[test]
    fn test_truncate_command_long() {
        let long = "x".repeat(1200);
        let cut = truncate_command(&long, 1000);
        assert_eq!(cut.chars().count(), 1000);
        assert!(cut.ends_with("..."));
        assert_eq!(truncate_command("abcdef", 5), "ab...");
    }

    #[test]
    fn test_truncate_command_multibyte() {
        assert_eq!(truncate_command("ääääää", 5), "ää...");
    }

    // -------------------------------------------------------------------------
    // Tests for RecordView
    // -------------------------------------------------------------------------

    #[test]
    fn test_record_view_fields() {
        let ts = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let view = RecordView::at(&record(), 10, ts);
        assert_eq!(view.cpu_percent, "2.3");
        assert_eq!(view.mem_percent, "1.1");
        assert_eq!(view.uptime, "2d 3h 4m 9s");
        assert_eq!(view.command, "node ap...");
        assert_eq!(view.source, "full");

        let text = view.render_text();
        assert!(text.contains("PID:     4821"));
        assert!(text.contains("Uptime:  2d 3h 4m 9s"));
        assert!(text.contains("2024-01-02 03:04:05"));
    }

    #[test]
    fn test_record_view_serialization() {
        let view = RecordView::from_record(&record(), DEFAULT_COMMAND_MAX_CHARS);
        let json: serde_json::Value = serde_json::from_str(&view.render_json().unwrap()).unwrap();
        assert_eq!(json["pid"], 4821);
        assert_eq!(json["command"], "node app.js --port 8080");

        let yaml = view.render_yaml().unwrap();
        assert!(yaml.contains("user: app"));
    }

    #[test]
    fn test_failure_message() {
        assert_eq!(
            failure_message(&ResolveError::NotFound { pid: 7 }),
            NOT_FOUND_MESSAGE
        );
        let err = ResolveError::Invocation {
            program: "ps".to_string(),
            reason: "exit status 2".to_string(),
        };
        assert_eq!(failure_message(&err), FAILURE_MESSAGE);
    }
}
