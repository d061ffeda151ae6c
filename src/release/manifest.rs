//! Manifest field access
//!
//! The manifest is only ever touched through `key = "value"` lines that start
//! at column zero. The first such line per key is authoritative; every other
//! byte of the file (other lines, spacing around `=`, trailing comments, line
//! endings) is preserved on write.

use crate::core::error::{ReleaseError, ReleaseResult, ResultExt};
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Handle to the manifest file on disk
///
/// Reads always go to the file so that a restore observes what an earlier
/// write left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
  path: PathBuf,
}

impl Manifest {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Value of the first `key = "…"` line
  pub fn read_field(&self, key: &str) -> ReleaseResult<String> {
    let contents = self.read()?;
    find_field(&contents, key)
      .map(str::to_string)
      .ok_or_else(|| self.missing(key))
  }

  /// Replace the value of the first `key = "…"` line in place
  pub fn write_field(&self, key: &str, value: &str) -> ReleaseResult<()> {
    validate_value(key, value)?;

    let contents = self.read()?;
    let updated = replace_field(&contents, key, value).ok_or_else(|| self.missing(key))?;

    if updated != contents {
      fs::write(&self.path, updated).with_context(|| format!("Failed to write {}", self.path.display()))?;
    }
    tracing::debug!(key, value, path = %self.path.display(), "manifest field written");
    Ok(())
  }

  pub fn name(&self) -> ReleaseResult<String> {
    self.read_field("name")
  }

  pub fn version(&self) -> ReleaseResult<String> {
    self.read_field("version")
  }

  fn read(&self) -> ReleaseResult<String> {
    fs::read_to_string(&self.path).with_context(|| format!("Failed to read {}", self.path.display()))
  }

  fn missing(&self, key: &str) -> ReleaseError {
    ReleaseError::ManifestFieldMissing {
      key: key.to_string(),
      path: self.path.clone(),
    }
  }
}

/// Value of the first `key = "…"` line in `contents`
pub fn find_field<'a>(contents: &'a str, key: &str) -> Option<&'a str> {
  locate(contents, key).map(|range| &contents[range])
}

/// `contents` with the first `key = "…"` value replaced, or None if absent
pub fn replace_field(contents: &str, key: &str, value: &str) -> Option<String> {
  let range = locate(contents, key)?;
  let mut updated = String::with_capacity(contents.len() - range.len() + value.len());
  updated.push_str(&contents[..range.start]);
  updated.push_str(value);
  updated.push_str(&contents[range.end..]);
  Some(updated)
}

/// Byte range of the first matching value within `contents`
fn locate(contents: &str, key: &str) -> Option<Range<usize>> {
  if key.is_empty() {
    return None;
  }

  let mut offset = 0;
  for line in contents.split_inclusive('\n') {
    if let Some(range) = value_range(line, key) {
      return Some(offset + range.start..offset + range.end);
    }
    offset += line.len();
  }
  None
}

/// Byte range of the quoted value if `line` is `key = "value"`
fn value_range(line: &str, key: &str) -> Option<Range<usize>> {
  let rest = line.strip_prefix(key)?;
  let rest = rest.trim_start_matches([' ', '\t']).strip_prefix('=')?;
  let value = rest.trim_start_matches([' ', '\t']).strip_prefix('"')?;

  let start = line.len() - value.len();
  let len = value.find(['"', '\n'])?;
  if value[len..].starts_with('\n') {
    return None;
  }
  Some(start..start + len)
}

/// Values are written verbatim between quotes, so they cannot contain one
fn validate_value(key: &str, value: &str) -> ReleaseResult<()> {
  if value.contains(['"', '\n', '\r']) {
    return Err(ReleaseError::message(format!(
      "Refusing to write {} = {:?}: quotes and line breaks are not supported",
      key, value
    )));
  }
  Ok(())
}
