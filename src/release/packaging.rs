//! Artifact build and upload collaborators

use crate::core::config::{BuildConfig, RegistryConfig, UploadConfig};
use crate::core::error::{ReleaseError, ReleaseResult, ResultExt};
use crate::core::process::{command_from_argv, describe, run_tool};
use std::fs;
use std::path::{Path, PathBuf};

/// Packaging steps of a release, in the order the coordinator runs them
pub trait Packager {
  /// Remove outputs of previous builds
  fn clean(&self) -> ReleaseResult<()>;

  /// Produce distributable artifacts
  fn build(&self) -> ReleaseResult<()>;

  /// Upload the built artifacts to `registry`
  fn upload(&self, registry: &RegistryConfig) -> ReleaseResult<()>;
}

/// Runs the configured builder and uploader as subprocesses
pub struct SystemPackager {
  root: PathBuf,
  build: BuildConfig,
  upload: UploadConfig,
}

impl SystemPackager {
  pub fn new(root: &Path, build: BuildConfig, upload: UploadConfig) -> Self {
    Self {
      root: root.to_path_buf(),
      build,
      upload,
    }
  }

  /// Paths under the project root matching `pattern`, sorted
  fn expand(&self, pattern: &str) -> ReleaseResult<Vec<PathBuf>> {
    let root = glob::Pattern::escape(&self.root.to_string_lossy());
    let full = format!("{}/{}", root.trim_end_matches('/'), pattern);

    let mut paths = glob::glob(&full)?.collect::<Result<Vec<_>, _>>()?;
    paths.sort();
    Ok(paths)
  }
}

impl Packager for SystemPackager {
  fn clean(&self) -> ReleaseResult<()> {
    for pattern in &self.build.clean {
      for path in self.expand(pattern)? {
        tracing::debug!(path = %path.display(), "removing previous build output");
        if path.is_dir() {
          fs::remove_dir_all(&path).with_context(|| format!("Failed to remove {}", path.display()))?;
        } else {
          fs::remove_file(&path).with_context(|| format!("Failed to remove {}", path.display()))?;
        }
      }
    }
    Ok(())
  }

  fn build(&self) -> ReleaseResult<()> {
    let mut cmd = command_from_argv(&self.build.command, &self.root)?;
    run_tool(&describe(&self.build.command), &mut cmd)
  }

  fn upload(&self, registry: &RegistryConfig) -> ReleaseResult<()> {
    let artifacts = self.expand(&self.upload.artifacts)?;
    if artifacts.is_empty() {
      return Err(ReleaseError::with_help(
        format!("No artifacts matched '{}'", self.upload.artifacts),
        "Check that the build step writes its output where [upload].artifacts points.",
      ));
    }

    let mut cmd = command_from_argv(&self.upload.command, &self.root)?;
    cmd.arg("--repository").arg(&registry.repository);
    cmd.args(&artifacts);
    run_tool(&describe(&self.upload.command), &mut cmd)
  }
}
