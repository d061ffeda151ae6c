//! Semantic version parsing and bumping

use crate::core::error::{ReleaseError, ReleaseResult};
use semver::Version;
use std::fmt;

/// Which version component to increment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpKind {
  Patch,
  Minor,
  Major,
  None,
}

impl BumpKind {
  /// Apply bump to a version, resetting every lower component
  pub fn apply(&self, current: &Version) -> Version {
    let mut version = current.clone();

    match self {
      BumpKind::Major => {
        version.major += 1;
        version.minor = 0;
        version.patch = 0;
      }
      BumpKind::Minor => {
        version.minor += 1;
        version.patch = 0;
      }
      BumpKind::Patch => {
        version.patch += 1;
      }
      BumpKind::None => {}
    }

    version
  }

  /// Map an interactive menu answer (1-4) to a bump kind
  pub fn from_menu_choice(choice: &str) -> ReleaseResult<Self> {
    match choice.trim() {
      "1" => Ok(BumpKind::Patch),
      "2" => Ok(BumpKind::Minor),
      "3" => Ok(BumpKind::Major),
      "4" => Ok(BumpKind::None),
      other => Err(ReleaseError::InvalidBumpKind {
        input: other.to_string(),
      }),
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      BumpKind::Patch => "patch",
      BumpKind::Minor => "minor",
      BumpKind::Major => "major",
      BumpKind::None => "none",
    }
  }
}

impl fmt::Display for BumpKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Parse a plain MAJOR.MINOR.PATCH version
///
/// Pre-release and build metadata are rejected: the manifest version must be
/// exactly three dot-separated integers.
pub fn parse_version(input: &str) -> ReleaseResult<Version> {
  let version = Version::parse(input.trim()).map_err(|e| ReleaseError::InvalidVersion {
    input: input.to_string(),
    reason: e.to_string(),
  })?;

  if !version.pre.is_empty() || !version.build.is_empty() {
    return Err(ReleaseError::InvalidVersion {
      input: input.to_string(),
      reason: "pre-release and build metadata are not supported".to_string(),
    });
  }

  Ok(version)
}

/// Next version for a bump kind
pub fn compute_next_version(current: &Version, kind: BumpKind) -> Version {
  kind.apply(current)
}
