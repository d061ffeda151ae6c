//! Integration tests for the `release` binary

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_unknown_option_fails_before_reading_manifest() -> Result<()> {
  let dir = tempfile::TempDir::new()?;

  let output = run_release(dir.path(), &["--bogus"], "")?;

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("Unknown option: --bogus"), "{}", stderr(&output));
  Ok(())
}

#[test]
fn test_conflicting_bump_flags() -> Result<()> {
  let ws = TestWorkspace::new("0.1.0")?;

  let output = run_release(&ws.path, &["--patch", "--major"], "")?;

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("Only one of --patch"), "{}", stderr(&output));
  assert!(ws.read_file("pyproject.toml")?.contains("version = \"0.1.0\""));
  Ok(())
}

#[test]
fn test_repeated_flag_reports_repetition() -> Result<()> {
  let ws = TestWorkspace::new("0.1.0")?;

  let output = run_release(&ws.path, &["--patch", "--patch"], "")?;

  assert_eq!(output.status.code(), Some(1));
  assert!(!stderr(&output).contains("Only one of"), "{}", stderr(&output));
  assert!(stderr(&output).contains("--patch"));
  assert!(ws.read_file("pyproject.toml")?.contains("version = \"0.1.0\""));
  Ok(())
}

#[test]
fn test_help_exits_zero() -> Result<()> {
  let dir = tempfile::TempDir::new()?;
  let output = run_release(dir.path(), &["--help"], "")?;
  assert_eq!(output.status.code(), Some(0));
  assert!(stdout(&output).contains("--no-bump"));
  Ok(())
}

#[test]
fn test_version_flag_prints_manifest_version() -> Result<()> {
  let ws = TestWorkspace::new("0.4.2")?;

  let output = run_release(&ws.path, &["-v"], "")?;

  assert_eq!(output.status.code(), Some(0));
  assert_eq!(stdout(&output).trim(), "0.4.2");
  Ok(())
}

#[test]
fn test_patch_release_to_test_registry() -> Result<()> {
  let ws = TestWorkspace::new("0.1.0")?;

  let output = run_release(&ws.path, &["--patch", "--no-tag", "--test"], "")?;
  let out = stdout(&output);

  assert!(output.status.success(), "stdout: {}\nstderr: {}", out, stderr(&output));

  let manifest = ws.read_file("pyproject.toml")?;
  assert!(manifest.contains("name = \"echo\"\n"));
  assert!(manifest.contains("version = \"0.1.1\"\n"));
  assert!(manifest.contains("description = \"Echo things\"\n"));

  assert_eq!(ws.read_file("built-name.txt")?.trim(), "name = \"echo-app\"");
  assert_eq!(ws.read_file("uploaded-name.txt")?.trim(), "name = \"echo-app\"");

  let upload_args = ws.read_file("upload-args.txt")?;
  assert!(upload_args.starts_with("--repository testpypi "));
  assert!(upload_args.contains("pkg-1.tar.gz"));

  assert!(out.contains("[SUCCESS] Version bumped (patch): 0.1.0 -> 0.1.1"));
  assert!(out.contains("https://test.pypi.org/project/echo-app/0.1.1/"));

  // No tag prompt, no commit
  assert_eq!(ws.git_log(5)?, vec!["Initial project"]);
  Ok(())
}

#[test]
fn test_minor_and_major_bumps() -> Result<()> {
  let ws = TestWorkspace::new("0.9.0")?;
  let output = run_release(&ws.path, &["--minor", "--no-tag"], "")?;
  assert!(output.status.success(), "{}", stderr(&output));
  assert!(ws.read_file("pyproject.toml")?.contains("version = \"0.10.0\""));
  assert!(stdout(&output).contains("https://pypi.org/project/echo-app/0.10.0/"));

  let ws = TestWorkspace::new("1.2.3")?;
  let output = run_release(&ws.path, &["--major", "--no-tag"], "")?;
  assert!(output.status.success(), "{}", stderr(&output));
  assert!(ws.read_file("pyproject.toml")?.contains("version = \"2.0.0\""));
  Ok(())
}

#[test]
fn test_interactive_bump_menu() -> Result<()> {
  let ws = TestWorkspace::new("0.1.0")?;

  let output = run_release(&ws.path, &["--no-tag", "--test"], "3\n")?;

  assert!(output.status.success(), "{}", stderr(&output));
  assert!(stdout(&output).contains("Choice [1-4]:"));
  assert!(ws.read_file("pyproject.toml")?.contains("version = \"1.0.0\""));
  Ok(())
}

#[test]
fn test_invalid_menu_choice_fails() -> Result<()> {
  let ws = TestWorkspace::new("0.1.0")?;

  let output = run_release(&ws.path, &["--test"], "9\n")?;

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("Invalid bump type: 9"));
  assert!(ws.read_file("pyproject.toml")?.contains("version = \"0.1.0\""));
  Ok(())
}

#[test]
fn test_dirty_tree_declined_is_a_clean_exit() -> Result<()> {
  let ws = TestWorkspace::new("0.1.0")?;
  std::fs::write(ws.path.join("notes.txt"), "uncommitted")?;
  let before = ws.read_file("pyproject.toml")?;

  let output = run_release(&ws.path, &["--patch", "--test"], "n\n")?;

  assert_eq!(output.status.code(), Some(0));
  assert!(stdout(&output).contains("[WARNING] You have uncommitted changes"));
  assert_eq!(ws.read_file("pyproject.toml")?, before);
  assert!(!ws.file_exists("built-name.txt"));
  assert!(!ws.file_exists("uploaded-name.txt"));
  assert_eq!(ws.git_log(5)?, vec!["Initial project"]);
  Ok(())
}

#[test]
fn test_confirmed_tag_commits_tags_and_pushes() -> Result<()> {
  let ws = TestWorkspace::new("0.1.0")?;
  let remote = ws.add_remote()?;

  let output = run_release(&ws.path, &["--patch", "--test"], "y\n")?;

  assert!(output.status.success(), "{}", stderr(&output));
  assert_eq!(ws.git_log(1)?, vec!["Bump version to 0.1.1"]);

  let tags = git(&remote, &["tag", "--list"])?;
  assert_eq!(String::from_utf8_lossy(&tags.stdout).trim(), "v0.1.1");

  let message = git(&remote, &["tag", "--list", "--format=%(contents:subject)", "v0.1.1"])?;
  assert_eq!(String::from_utf8_lossy(&message.stdout).trim(), "Release version 0.1.1");

  // The committed manifest carries the original name
  let committed = git(&ws.path, &["show", "HEAD:pyproject.toml"])?;
  assert!(String::from_utf8_lossy(&committed.stdout).contains("name = \"echo\""));
  Ok(())
}

#[test]
fn test_commit_and_tag_identity_from_environment() -> Result<()> {
  let ws = TestWorkspace::new("0.1.0")?;
  let remote = ws.add_remote()?;
  ws.forget_identity()?;

  let home = tempfile::TempDir::new()?;
  let home_dir = home.path().to_string_lossy().to_string();
  let global_config = home.path().join(".gitconfig").to_string_lossy().to_string();
  let env = [
    ("HOME", home_dir.as_str()),
    ("XDG_CONFIG_HOME", home_dir.as_str()),
    ("GIT_CONFIG_GLOBAL", global_config.as_str()),
    ("GIT_CONFIG_NOSYSTEM", "1"),
    ("GIT_AUTHOR_NAME", "Release Bot"),
    ("GIT_AUTHOR_EMAIL", "bot@example.com"),
    ("GIT_COMMITTER_NAME", "Release Bot"),
    ("GIT_COMMITTER_EMAIL", "bot@example.com"),
  ];

  let output = run_release_with_env(&ws.path, &["--patch", "--test"], "y\n", &env)?;

  assert!(output.status.success(), "{}", stderr(&output));
  let author = git(&ws.path, &["log", "-1", "--format=%an <%ae>"])?;
  assert_eq!(String::from_utf8_lossy(&author.stdout).trim(), "Release Bot <bot@example.com>");

  let tagger = git(&remote, &["for-each-ref", "--format=%(taggername)", "refs/tags/v0.1.1"])?;
  assert_eq!(String::from_utf8_lossy(&tagger.stdout).trim(), "Release Bot");
  Ok(())
}

#[test]
fn test_declined_tag_leaves_history_alone() -> Result<()> {
  let ws = TestWorkspace::new("0.1.0")?;

  let output = run_release(&ws.path, &["--patch", "--test"], "n\n")?;

  assert!(output.status.success(), "{}", stderr(&output));
  assert_eq!(ws.git_log(5)?, vec!["Initial project"]);
  assert!(ws.read_file("pyproject.toml")?.contains("version = \"0.1.1\""));
  Ok(())
}

#[test]
fn test_no_bump_keeps_version() -> Result<()> {
  let ws = TestWorkspace::new("0.1.0")?;
  let before = ws.read_file("pyproject.toml")?;

  let output = run_release(&ws.path, &["--no-bump", "--test"], "")?;

  assert!(output.status.success(), "{}", stderr(&output));
  assert_eq!(ws.read_file("pyproject.toml")?, before);
  assert_eq!(ws.read_file("uploaded-name.txt")?.trim(), "name = \"echo-app\"");
  Ok(())
}

#[test]
fn test_outside_git_repository_fails() -> Result<()> {
  let dir = tempfile::TempDir::new()?;
  write_pyproject(dir.path(), "echo", "0.1.0")?;

  let output = run_release(dir.path(), &["--patch", "--no-tag", "--test"], "")?;

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("[ERROR] Not a git repository"));
  let manifest = std::fs::read_to_string(dir.path().join("pyproject.toml"))?;
  assert!(manifest.contains("version = \"0.1.0\""));
  Ok(())
}

#[test]
fn test_missing_version_field_fails() -> Result<()> {
  let ws = TestWorkspace::new("0.1.0")?;
  std::fs::write(ws.path.join("pyproject.toml"), "[project]\nname = \"echo\"\n")?;
  git(&ws.path, &["commit", "-am", "Drop version"])?;

  let output = run_release(&ws.path, &["--patch", "--no-tag"], "")?;

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("Field 'version' not found"));
  Ok(())
}

#[test]
fn test_failed_build_restores_name() -> Result<()> {
  let ws = TestWorkspace::with_commands("0.1.0", r#"["sh", "-c", "exit 4"]"#, RECORDING_UPLOAD)?;

  let output = run_release(&ws.path, &["--patch", "--no-tag", "--test"], "")?;

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("failed with exit code 4"));
  let manifest = ws.read_file("pyproject.toml")?;
  assert!(manifest.contains("name = \"echo\"\n"));
  assert!(manifest.contains("version = \"0.1.1\""));
  assert!(!ws.file_exists("uploaded-name.txt"));
  Ok(())
}

#[cfg(unix)]
#[test]
fn test_interrupt_during_upload_restores_name() -> Result<()> {
  let ws = TestWorkspace::with_commands(
    "0.1.0",
    RECORDING_BUILD,
    r#"["sh", "-c", "kill -INT $PPID; sleep 2"]"#,
  )?;

  let output = run_release(&ws.path, &["--patch", "--no-tag", "--test"], "")?;

  assert_eq!(output.status.code(), Some(130));
  assert!(stderr(&output).contains("Interrupted"));
  assert!(ws.read_file("pyproject.toml")?.contains("name = \"echo\"\n"));
  Ok(())
}

#[cfg(unix)]
#[test]
fn test_terminate_and_hangup_during_upload_restore_name() -> Result<()> {
  for signal in ["TERM", "HUP"] {
    let upload = format!(r#"["sh", "-c", "kill -{} $PPID; sleep 2"]"#, signal);
    let ws = TestWorkspace::with_commands("0.1.0", RECORDING_BUILD, &upload)?;

    let output = run_release(&ws.path, &["--patch", "--no-tag", "--test"], "")?;

    assert_eq!(output.status.code(), Some(130), "SIG{}: {}", signal, stderr(&output));
    assert!(stderr(&output).contains("Interrupted"));
    assert!(ws.read_file("pyproject.toml")?.contains("name = \"echo\"\n"));
  }
  Ok(())
}

#[cfg(unix)]
#[test]
fn test_interrupt_then_failed_upload_still_exits_interrupted() -> Result<()> {
  // The uploader fails right after the signal, so the run may be unwinding
  // before the listener thread sees it.
  let ws = TestWorkspace::with_commands(
    "0.1.0",
    RECORDING_BUILD,
    r#"["sh", "-c", "kill -INT $PPID; exit 1"]"#,
  )?;

  let output = run_release(&ws.path, &["--patch", "--no-tag", "--test"], "")?;

  assert_eq!(output.status.code(), Some(130), "{}", stderr(&output));
  assert!(ws.read_file("pyproject.toml")?.contains("name = \"echo\"\n"));
  Ok(())
}
