//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Build step that records the package name it saw and leaves two artifacts
pub const RECORDING_BUILD: &str = r#"["sh", "-c", "mkdir -p dist && grep '^name' pyproject.toml > built-name.txt && touch dist/pkg-1.tar.gz dist/pkg-1-py3-none-any.whl"]"#;

/// Upload step that records the package name and its own arguments
pub const RECORDING_UPLOAD: &str =
  r#"["sh", "-c", "grep '^name' pyproject.toml > uploaded-name.txt && echo \"$@\" > upload-args.txt", "upload"]"#;

/// A project with a pyproject.toml, a release.toml and git history
pub struct TestWorkspace {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestWorkspace {
  /// Project at `version` whose build and upload only record what they see
  pub fn new(version: &str) -> Result<Self> {
    Self::with_commands(version, RECORDING_BUILD, RECORDING_UPLOAD)
  }

  /// Project with custom build/upload argv (TOML arrays)
  pub fn with_commands(version: &str, build: &str, upload: &str) -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;
    git(&path, &["config", "commit.gpgsign", "false"])?;
    git(&path, &["config", "tag.gpgsign", "false"])?;

    write_pyproject(&path, "echo", version)?;
    std::fs::write(
      path.join("release.toml"),
      format!("[build]\ncommand = {}\n\n[upload]\ncommand = {}\n", build, upload),
    )?;
    std::fs::write(path.join(".gitignore"), "dist/\n*-name.txt\nupload-args.txt\n")?;

    git(&path, &["add", "."])?;
    git(&path, &["commit", "-m", "Initial project"])?;

    Ok(Self { _root: root, path })
  }

  /// Add a bare repository as `origin`
  pub fn add_remote(&self) -> Result<PathBuf> {
    let remote = self.path.join("remote.git");
    git(&self.path, &["init", "--bare", "--initial-branch=main", "remote.git"])?;
    git(&self.path, &["remote", "add", "origin", &remote.to_string_lossy()])?;
    std::fs::write(self.path.join(".git/info/exclude"), "remote.git/\n")?;
    Ok(remote)
  }

  /// Remove the repo-local identity so git must take it from the environment
  pub fn forget_identity(&self) -> Result<()> {
    git(&self.path, &["config", "--unset", "user.name"])?;
    git(&self.path, &["config", "--unset", "user.email"])?;
    Ok(())
  }

  /// Read a file
  pub fn read_file(&self, path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(path))?)
  }

  /// Check if a file exists
  pub fn file_exists(&self, path: &str) -> bool {
    self.path.join(path).exists()
  }

  pub fn git_log(&self, n: usize) -> Result<Vec<String>> {
    let output = git(&self.path, &["log", &format!("-{}", n), "--format=%s"])?;
    Ok(
      String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(String::from)
        .collect(),
    )
  }
}

/// Write a minimal pyproject.toml
pub fn write_pyproject(dir: &Path, name: &str, version: &str) -> Result<()> {
  std::fs::write(
    dir.join("pyproject.toml"),
    format!(
      "[build-system]\nrequires = [\"setuptools\"]\n\n[project]\nname = \"{}\"\nversion = \"{}\"\ndescription = \"Echo things\"\n",
      name, version
    ),
  )?;
  Ok(())
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run the `release` binary, feeding `stdin` to its prompts
///
/// Does not assert success; callers inspect the exit status.
pub fn run_release(cwd: &Path, args: &[&str], stdin: &str) -> Result<Output> {
  run_release_with_env(cwd, args, stdin, &[])
}

/// Run the `release` binary with extra environment variables
pub fn run_release_with_env(cwd: &Path, args: &[&str], stdin: &str, env: &[(&str, &str)]) -> Result<Output> {
  run_bin(env!("CARGO_BIN_EXE_release"), cwd, args, stdin, env)
}

/// Run the `publish-image` binary
pub fn run_publish_image(cwd: &Path, args: &[&str]) -> Result<Output> {
  run_bin(env!("CARGO_BIN_EXE_publish-image"), cwd, args, "", &[])
}

fn run_bin(bin: &str, cwd: &Path, args: &[&str], stdin: &str, env: &[(&str, &str)]) -> Result<Output> {
  let mut child = Command::new(bin)
    .current_dir(cwd)
    .args(args)
    .envs(env.iter().copied())
    .stdin(Stdio::piped())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .spawn()
    .with_context(|| format!("Failed to run {}", bin))?;

  if let Some(mut input) = child.stdin.take() {
    // The binary may exit before reading everything.
    let _ = input.write_all(stdin.as_bytes());
  }

  child.wait_with_output().context("Failed to wait for binary")
}

pub fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).to_string()
}
