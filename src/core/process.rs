//! Collaborator subprocess execution
//!
//! Builders, uploaders and docker run with inherited stdio so their progress is
//! visible. A non-zero exit is always fatal for the run.

use crate::core::error::{ReleaseError, ReleaseResult, ResultExt};
use std::path::Path;
use std::process::Command;

/// Build a `Command` from a configured argv (`["python", "-m", "build"]`)
pub fn command_from_argv(argv: &[String], cwd: &Path) -> ReleaseResult<Command> {
  let (program, args) = argv
    .split_first()
    .ok_or_else(|| ReleaseError::message("Empty command line"))?;

  let mut cmd = Command::new(program);
  cmd.args(args).current_dir(cwd);
  Ok(cmd)
}

/// Human-readable label for a command line, used in errors and logs
pub fn describe(argv: &[String]) -> String {
  argv.join(" ")
}

/// Run a collaborator to completion, mapping failure to `SubprocessFailure`
pub fn run_tool(tool: &str, cmd: &mut Command) -> ReleaseResult<()> {
  tracing::debug!(tool, command = ?cmd, "running collaborator");

  let status = cmd.status().with_context(|| format!("Failed to execute {}", tool))?;

  if !status.success() {
    tracing::debug!(tool, code = ?status.code(), "collaborator failed");
    return Err(ReleaseError::subprocess(tool, status.code()));
  }

  Ok(())
}
