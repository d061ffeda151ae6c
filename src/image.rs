//! Multi-platform container image publishing
//!
//! The image is tagged twice, `latest` and the manifest version, and built
//! with `docker buildx` for every configured platform.

use crate::core::config::ImageConfig;
use crate::core::error::{ConfigError, ReleaseError, ReleaseResult};
use crate::core::process::{command_from_argv, describe, run_tool};
use crate::release::manifest::Manifest;
use crate::release::version::parse_version;
use std::path::Path;

/// A resolved buildx invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuild {
  /// `<namespace>/<name>` without a tag
  pub repository: String,
  pub version: String,
  pub push: bool,
  pub argv: Vec<String>,
}

impl ImageBuild {
  /// Resolve image coordinates from config and the manifest
  ///
  /// The image name falls back to the manifest `name`; the namespace has no
  /// default and must be configured.
  pub fn resolve(config: &ImageConfig, manifest: &Manifest, push: bool) -> ReleaseResult<Self> {
    let namespace = config
      .namespace
      .as_deref()
      .map(|ns| ns.trim().trim_end_matches('/'))
      .filter(|ns| !ns.is_empty())
      .ok_or_else(|| {
        ReleaseError::Config(ConfigError::MissingField {
          field: "image.namespace".to_string(),
        })
      })?;

    let name = match &config.name {
      Some(name) => name.clone(),
      None => manifest.name()?,
    };

    let version = manifest.version()?;
    parse_version(&version)?;

    Ok(Self::new(config, &format!("{}/{}", namespace, name), &version, push))
  }

  /// Build the argv for `repository` at `version`
  pub fn new(config: &ImageConfig, repository: &str, version: &str, push: bool) -> Self {
    let mut argv: Vec<String> = ["docker", "buildx", "build", "--platform"]
      .iter()
      .map(|s| s.to_string())
      .collect();
    argv.push(config.platforms.join(","));

    for tag in ["latest", version] {
      argv.push("-t".to_string());
      argv.push(format!("{}:{}", repository, tag));
    }

    if let Some(dockerfile) = &config.dockerfile {
      argv.push("--file".to_string());
      argv.push(dockerfile.display().to_string());
    }

    if push {
      argv.push("--push".to_string());
    }
    argv.push(config.context.display().to_string());

    Self {
      repository: repository.to_string(),
      version: version.to_string(),
      push,
      argv,
    }
  }

  /// Fully qualified references produced by this build
  pub fn references(&self) -> [String; 2] {
    [
      format!("{}:latest", self.repository),
      format!("{}:{}", self.repository, self.version),
    ]
  }

  /// Run buildx from `root`
  pub fn execute(&self, root: &Path) -> ReleaseResult<()> {
    let mut cmd = command_from_argv(&self.argv, root)?;
    run_tool(&describe(&self.argv[..self.argv.len().min(3)]), &mut cmd)
  }
}
