//! Subprocess execution

use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::build::env::EnvironmentOverlay;

/// Result of a subprocess execution
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded (exit code 0)
    pub success: bool,

    /// Process exit code, `None` when terminated by a signal
    pub exit_code: Option<i32>,

    /// Execution duration
    pub duration: Duration,
}

impl CommandResult {
    /// Create a CommandResult from an exit status
    pub fn from_status(status: ExitStatus, duration: Duration) -> Self {
        Self {
            success: status.success(),
            exit_code: status.code(),
            duration,
        }
    }
}

/// Build the command for a program, arguments and environment overlay
pub fn build_command(program: &Path, args: &[String], overlay: &EnvironmentOverlay) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args);
    overlay.apply(&mut cmd);
    cmd
}

/// Run a command with inherited stdio and block until it exits
///
/// There is no timeout: a hung child hangs the caller.
pub fn run_command(
    program: &Path,
    args: &[String],
    overlay: &EnvironmentOverlay,
) -> Result<CommandResult> {
    let start = Instant::now();

    let status = build_command(program, args, overlay)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .with_context(|| format!("Failed to execute {}", program.display()))?;

    Ok(CommandResult::from_status(status, start.elapsed()))
}
