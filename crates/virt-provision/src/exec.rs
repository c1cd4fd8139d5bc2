use std::fmt;
use std::process::{ExitStatus, Stdio};

use tokio::process::Command;
use tracing::{error, info, trace};

use crate::error::{ProvisionError, ProvisionResult};

/// A program plus its argument list, passed to the process API without a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arg_list(&self) -> &[String] {
        &self.args
    }

    /// Human-readable rendering for logs. Never re-parsed.
    pub fn display(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 1);
        parts.push(self.program.as_str());
        parts.extend(self.args.iter().map(String::as_str));
        parts.join(" ")
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Whether side-effecting commands actually run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Execute,
    DryRun,
}

impl RunMode {
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run { Self::DryRun } else { Self::Execute }
    }

    pub fn is_dry_run(self) -> bool {
        matches!(self, Self::DryRun)
    }
}

/// Run a command with inherited stdio and wait for it.
///
/// In dry-run mode the command is only logged. The exit status is read once
/// and every branch below uses that value.
pub async fn run(cmd: &CommandLine, mode: RunMode) -> ProvisionResult<()> {
    let rendered = cmd.display();
    if mode.is_dry_run() {
        info!("DRY RUN: would execute: {rendered}");
        return Ok(());
    }

    info!("executing: {rendered}");
    let status = Command::new(cmd.program())
        .args(cmd.arg_list())
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|e| ProvisionError::ExternalToolFailure {
            command: rendered.clone(),
            status: format!("failed to spawn: {e}"),
        })?;

    if status.success() {
        trace!(command = %rendered, "command succeeded");
        return Ok(());
    }

    let described = describe_status(status);
    error!("command failed with {described}: {rendered}");
    Err(ProvisionError::ExternalToolFailure {
        command: rendered,
        status: described,
    })
}

/// Run a read-only probe and return trimmed stdout. Runs in every mode.
pub async fn probe(cmd: &CommandLine) -> ProvisionResult<String> {
    let rendered = cmd.display();
    trace!(command = %rendered, "probe");

    let output = Command::new(cmd.program())
        .args(cmd.arg_list())
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| ProvisionError::ExternalToolFailure {
            command: rendered.clone(),
            status: format!("failed to spawn: {e}"),
        })?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        Err(ProvisionError::ExternalToolFailure {
            command: rendered,
            status: describe_status(output.status),
        })
    }
}

fn describe_status(status: ExitStatus) -> String {
    if let Some(code) = status.code() {
        return format!("exit code {code}");
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            return format!("signal {sig}");
        }
    }
    "unknown status".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::capture;

    #[test]
    fn display_joins_program_and_args() {
        let cmd = CommandLine::new("apt-get").args(["install", "-y", "virtinst"]);
        assert_eq!(cmd.display(), "apt-get install -y virtinst");
        assert_eq!(cmd.to_string(), cmd.display());
    }

    #[test]
    fn display_without_args_is_program() {
        assert_eq!(CommandLine::new("true").display(), "true");
    }

    #[tokio::test]
    async fn run_succeeds_on_zero_exit() {
        run(&CommandLine::new("true"), RunMode::Execute).await.unwrap();
    }

    #[tokio::test]
    async fn run_reports_exit_code() {
        let cmd = CommandLine::new("sh").args(["-c", "exit 3"]);
        let err = run(&cmd, RunMode::Execute).await.unwrap_err();
        match err {
            ProvisionError::ExternalToolFailure { command, status } => {
                assert_eq!(command, "sh -c exit 3");
                assert_eq!(status, "exit code 3");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn run_reports_terminating_signal() {
        let cmd = CommandLine::new("sh").args(["-c", "kill -9 $$"]);
        let err = run(&cmd, RunMode::Execute).await.unwrap_err();
        match err {
            ProvisionError::ExternalToolFailure { status, .. } => {
                assert_eq!(status, "signal 9");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    fn logged_after<'a>(logs: &'a str, marker: &str) -> &'a str {
        logs.lines()
            .find_map(|line| line.split_once(marker).map(|(_, rest)| rest))
            .unwrap_or_else(|| panic!("no '{marker}' line in:\n{logs}"))
    }

    #[tokio::test]
    async fn dry_run_and_execute_log_identical_rendering() {
        let cmd = CommandLine::new("/nonexistent/virt-install").args([
            "--name",
            "testvm",
            "--cdrom",
            "/isos/my image.iso",
            "--network",
            "bridge=br0",
        ]);
        let (logs, _guard) = capture::install();

        run(&cmd, RunMode::DryRun).await.unwrap();
        run(&cmd, RunMode::Execute).await.unwrap_err();

        let logs = logs.contents();
        let dry = logged_after(&logs, "DRY RUN: would execute: ");
        let real = logged_after(&logs, "executing: ");
        assert_eq!(dry, real);
        assert_eq!(dry, cmd.display());
    }

    #[tokio::test]
    async fn run_reports_spawn_failure() {
        let cmd = CommandLine::new("/nonexistent/virt-install");
        let err = run(&cmd, RunMode::Execute).await.unwrap_err();
        assert!(err.to_string().contains("failed to spawn"), "got: {err}");
    }

    #[tokio::test]
    async fn dry_run_never_spawns() {
        // Would fail to spawn if it were executed.
        let cmd = CommandLine::new("/nonexistent/virt-install").arg("--name");
        run(&cmd, RunMode::DryRun).await.unwrap();
    }

    #[tokio::test]
    async fn probe_returns_trimmed_stdout() {
        let out = probe(&CommandLine::new("echo").arg("  hello  ")).await.unwrap();
        assert_eq!(out, "hello");
    }

    #[tokio::test]
    async fn probe_fails_on_nonzero_exit() {
        assert!(probe(&CommandLine::new("false")).await.is_err());
    }
}
