//! System git backend
//!
//! Every operation is a single `git` subprocess run against the project root
//! with an isolated environment. Output is captured; on failure git's stderr
//! is forwarded before the error is returned.

use super::VersionControl;
use crate::core::error::{ReleaseError, ReleaseResult, ResultExt};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Environment variables passed through to git
///
/// PATH/HOME/XDG_CONFIG_HOME locate git and the user's config. Identity
/// overrides keep commits and tags attributed to the user; the rest keep SSH
/// and HTTPS pushes and signed tags working.
const PASSTHROUGH_ENV: &[&str] = &[
  "PATH",
  "HOME",
  "XDG_CONFIG_HOME",
  "GIT_CONFIG_GLOBAL",
  "GIT_CONFIG_NOSYSTEM",
  "GIT_AUTHOR_NAME",
  "GIT_AUTHOR_EMAIL",
  "GIT_AUTHOR_DATE",
  "GIT_COMMITTER_NAME",
  "GIT_COMMITTER_EMAIL",
  "GIT_COMMITTER_DATE",
  "EMAIL",
  "SSH_AUTH_SOCK",
  "GIT_SSH_COMMAND",
  "GIT_ASKPASS",
  "SSH_ASKPASS",
  "GIT_TERMINAL_PROMPT",
  "GNUPGHOME",
  "GPG_TTY",
];

/// Pairs from `PASSTHROUGH_ENV` that `lookup` resolves
fn passthrough_env(lookup: impl Fn(&str) -> Option<String>) -> Vec<(&'static str, String)> {
  PASSTHROUGH_ENV
    .iter()
    .filter_map(|key| lookup(key).map(|value| (*key, value)))
    .collect()
}

/// Git backend using system git (zero crate dependencies)
pub struct SystemGit {
  /// Repository working directory
  pub(crate) repo_path: PathBuf,
}

impl SystemGit {
  /// Create a backend rooted at `path` (no subprocess is run yet)
  pub fn at(path: &Path) -> Self {
    Self {
      repo_path: path.to_path_buf(),
    }
  }

  /// Run a git command that must succeed
  fn run(&self, args: &[&str]) -> ReleaseResult<Output> {
    let label = format!("git {}", args.first().copied().unwrap_or_default());
    tracing::debug!(args = ?args, repo = %self.repo_path.display(), "running git");

    let output = self
      .git_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute {}", label))?;

    if !output.status.success() {
      let _ = std::io::stderr().write_all(&output.stderr);
      return Err(ReleaseError::subprocess(label, output.status.code()));
    }

    Ok(output)
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to repo path
  /// - Clears environment variables except `PASSTHROUGH_ENV`
  /// - Adds safe configuration overrides
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&self.repo_path);

    cmd.env_clear();
    cmd.envs(passthrough_env(|key| std::env::var(key).ok()));

    cmd.arg("-c").arg("advice.detachedHead=false");
    cmd.arg("-c").arg("core.quotePath=false");

    cmd
  }
}

impl VersionControl for SystemGit {
  fn verify_work_tree(&self) -> ReleaseResult<()> {
    let output = self
      .git_cmd()
      .args(["rev-parse", "--is-inside-work-tree"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() || String::from_utf8_lossy(&output.stdout).trim() != "true" {
      return Err(ReleaseError::NoVersionControlRoot {
        path: self.repo_path.clone(),
      });
    }

    Ok(())
  }

  fn has_uncommitted_changes(&self) -> ReleaseResult<bool> {
    let output = self.run(&["status", "--porcelain"])?;
    Ok(is_dirty(&String::from_utf8_lossy(&output.stdout)))
  }

  fn stage(&self, path: &Path) -> ReleaseResult<()> {
    let path = path.to_string_lossy();
    self.run(&["add", "--", &path]).map(|_| ())
  }

  fn commit(&self, message: &str) -> ReleaseResult<()> {
    self.run(&["commit", "-m", message]).map(|_| ())
  }

  fn create_annotated_tag(&self, tag: &str, message: &str) -> ReleaseResult<()> {
    self.run(&["tag", "-a", tag, "-m", message]).map(|_| ())
  }

  fn push_branch(&self, remote: &str, branch: &str) -> ReleaseResult<()> {
    self.run(&["push", remote, branch]).map(|_| ())
  }

  fn push_tags(&self, remote: &str) -> ReleaseResult<()> {
    self.run(&["push", remote, "--tags"]).map(|_| ())
  }
}

/// Porcelain status output lists one entry per changed path
fn is_dirty(porcelain: &str) -> bool {
  porcelain.lines().any(|line| !line.trim().is_empty())
}
