//! Execution of the external process-listing utility.
//!
//! `CommandRunner` is the seam between the resolver and the operating
//! system; `SystemRunner` spawns a real child process.

use std::future::Future;
use std::process::Stdio;
use tracing::debug;

/// Captured result of one command invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// True if the command exited with status 0.
    pub success: bool,
    /// Exit code, if the command was not terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Short human-readable description of a failed run.
    pub fn describe_failure(&self) -> String {
        let status = match self.code {
            Some(code) => format!("exit status {}", code),
            None => "terminated by signal".to_string(),
        };
        let diagnostic = self.stderr.trim();
        if diagnostic.is_empty() {
            status
        } else {
            format!("{}: {}", status, diagnostic)
        }
    }
}

/// Runs a program with explicit arguments and captures its output.
///
/// An `Err` means the program could not be started at all.
pub trait CommandRunner: Send + Sync {
    fn run(
        &self,
        program: &str,
        args: &[String],
    ) -> impl Future<Output = std::io::Result<CommandOutput>> + Send;
}

/// Spawns real child processes through `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[String]) -> std::io::Result<CommandOutput> {
        debug!("Running {} {}", program, args.join(" "));

        // Untranslated diagnostics keep the reduced-variant signatures matchable
        let output = tokio::process::Command::new(program)
            .args(args)
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .output()
            .await?;

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_failure() {
        let out = CommandOutput {
            success: false,
            code: Some(1),
            stdout: String::new(),
            stderr: "ps: unrecognized option: p\n".to_string(),
        };
        assert_eq!(out.describe_failure(), "exit status 1: ps: unrecognized option: p");

        let out = CommandOutput {
            success: false,
            code: None,
            ..Default::default()
        };
        assert_eq!(out.describe_failure(), "terminated by signal");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_system_runner_captures_output() {
        let out = SystemRunner
            .run("sh", &["-c".to_string(), "echo out; echo err >&2; exit 3".to_string()])
            .await
            .unwrap();
        assert!(!out.success);
        assert_eq!(out.code, Some(3));
        assert_eq!(out.stdout, "out\n");
        assert_eq!(out.stderr, "err\n");
    }

    #[tokio::test]
    async fn test_system_runner_missing_program() {
        let result = SystemRunner
            .run("no-such-command-we-hope", &[])
            .await;
        assert!(result.is_err());
    }
}
