pub mod system_git;

pub use system_git::SystemGit;

use crate::core::error::ReleaseResult;
use std::path::Path;

/// Version-control operations the release run depends on
///
/// `SystemGit` is the production implementation. Tests substitute a recorder
/// so the coordinator can be exercised without a real repository or remote.
pub trait VersionControl {
  /// Fail with `NoVersionControlRoot` unless a working tree is present
  fn verify_work_tree(&self) -> ReleaseResult<()>;

  /// Whether `git status` reports staged, unstaged or untracked changes
  fn has_uncommitted_changes(&self) -> ReleaseResult<bool>;

  fn stage(&self, path: &Path) -> ReleaseResult<()>;

  fn commit(&self, message: &str) -> ReleaseResult<()>;

  fn create_annotated_tag(&self, tag: &str, message: &str) -> ReleaseResult<()>;

  fn push_branch(&self, remote: &str, branch: &str) -> ReleaseResult<()>;

  fn push_tags(&self, remote: &str) -> ReleaseResult<()>;
}
