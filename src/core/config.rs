use crate::core::error::{ConfigError, ReleaseError, ReleaseResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for the release binaries
/// Searched in order: release.toml, .release.toml, .config/release.toml
///
/// Every field has a default, so a project without a config file releases
/// `pyproject.toml` to PyPI with `python -m build` and `twine`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseConfig {
  /// Manifest holding `name = "…"` and `version = "…"` (relative to the project root)
  #[serde(default = "default_manifest")]
  pub manifest: PathBuf,

  /// Name written to the manifest while building and uploading (default: "{name}-app")
  #[serde(default)]
  pub publish_name: Option<String>,

  #[serde(default)]
  pub git: GitConfig,

  #[serde(default)]
  pub build: BuildConfig,

  #[serde(default)]
  pub upload: UploadConfig,

  #[serde(default)]
  pub registry: RegistriesConfig,

  #[serde(default)]
  pub image: ImageConfig,
}

const PUBLISH_SUFFIX: &str = "-app";

fn default_manifest() -> PathBuf {
  PathBuf::from("pyproject.toml")
}

/// Where the version bump commit and tags are pushed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
  #[serde(default = "default_remote")]
  pub remote: String,

  #[serde(default = "default_branch")]
  pub branch: String,
}

fn default_remote() -> String {
  "origin".to_string()
}

fn default_branch() -> String {
  "main".to_string()
}

impl Default for GitConfig {
  fn default() -> Self {
    Self {
      remote: default_remote(),
      branch: default_branch(),
    }
  }
}

/// Artifact builder invocation and the build outputs removed beforehand
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
  #[serde(default = "default_build_command")]
  pub command: Vec<String>,

  /// Glob patterns (relative to the project root) of previous build outputs
  #[serde(default = "default_clean_patterns")]
  pub clean: Vec<String>,
}

fn default_build_command() -> Vec<String> {
  vec!["python".to_string(), "-m".to_string(), "build".to_string()]
}

fn default_clean_patterns() -> Vec<String> {
  vec!["dist".to_string(), "build".to_string(), "*.egg-info".to_string()]
}

impl Default for BuildConfig {
  fn default() -> Self {
    Self {
      command: default_build_command(),
      clean: default_clean_patterns(),
    }
  }
}

/// Artifact uploader invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
  #[serde(default = "default_upload_command")]
  pub command: Vec<String>,

  /// Glob pattern of the files handed to the uploader
  #[serde(default = "default_artifacts")]
  pub artifacts: String,
}

fn default_upload_command() -> Vec<String> {
  vec![
    "python".to_string(),
    "-m".to_string(),
    "twine".to_string(),
    "upload".to_string(),
  ]
}

fn default_artifacts() -> String {
  "dist/*".to_string()
}

impl Default for UploadConfig {
  fn default() -> Self {
    Self {
      command: default_upload_command(),
      artifacts: default_artifacts(),
    }
  }
}

/// Production and test package indexes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistriesConfig {
  #[serde(default = "RegistryConfig::pypi")]
  pub production: RegistryConfig,

  #[serde(default = "RegistryConfig::test_pypi")]
  pub test: RegistryConfig,
}

impl Default for RegistriesConfig {
  fn default() -> Self {
    Self {
      production: RegistryConfig::pypi(),
      test: RegistryConfig::test_pypi(),
    }
  }
}

impl RegistriesConfig {
  /// Pick the registry for this run
  pub fn select(&self, use_test_registry: bool) -> &RegistryConfig {
    if use_test_registry { &self.test } else { &self.production }
  }
}

/// A single package index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
  /// Repository name passed to the uploader (`--repository`)
  pub repository: String,

  /// Project page template; `{name}` and `{version}` are substituted
  pub url: String,
}

impl RegistryConfig {
  pub fn pypi() -> Self {
    Self {
      repository: "pypi".to_string(),
      url: "https://pypi.org/project/{name}/{version}/".to_string(),
    }
  }

  pub fn test_pypi() -> Self {
    Self {
      repository: "testpypi".to_string(),
      url: "https://test.pypi.org/project/{name}/{version}/".to_string(),
    }
  }

  /// Render the project page URL for a published name and version
  pub fn project_url(&self, name: &str, version: &str) -> String {
    self.url.replace("{name}", name).replace("{version}", version)
  }
}

/// Container image publishing (`publish-image`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
  /// Registry namespace, e.g. "ghcr.io/acme" (required to publish)
  #[serde(default)]
  pub namespace: Option<String>,

  /// Image name (default: the manifest `name`)
  #[serde(default)]
  pub name: Option<String>,

  #[serde(default = "default_platforms")]
  pub platforms: Vec<String>,

  #[serde(default = "default_context")]
  pub context: PathBuf,

  #[serde(default)]
  pub dockerfile: Option<PathBuf>,
}

fn default_platforms() -> Vec<String> {
  vec!["linux/amd64".to_string(), "linux/arm64".to_string()]
}

fn default_context() -> PathBuf {
  PathBuf::from(".")
}

impl Default for ImageConfig {
  fn default() -> Self {
    Self {
      namespace: None,
      name: None,
      platforms: default_platforms(),
      context: default_context(),
      dockerfile: None,
    }
  }
}

impl Default for ReleaseConfig {
  fn default() -> Self {
    Self {
      manifest: default_manifest(),
      publish_name: None,
      git: GitConfig::default(),
      build: BuildConfig::default(),
      upload: UploadConfig::default(),
      registry: RegistriesConfig::default(),
      image: ImageConfig::default(),
    }
  }
}

impl ReleaseConfig {
  /// Find config file in search order: release.toml, .release.toml, .config/release.toml
  pub fn find_config_path(root: &Path) -> Option<PathBuf> {
    let candidates = vec![
      root.join("release.toml"),
      root.join(".release.toml"),
      root.join(".config").join("release.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config for a project root
  ///
  /// An explicit path must exist; otherwise the search locations are tried
  /// and defaults are used when none is present.
  pub fn load(root: &Path, explicit: Option<&Path>) -> ReleaseResult<Self> {
    let config_path = match explicit {
      Some(path) => {
        let path = root.join(path);
        if !path.exists() {
          return Err(ReleaseError::Config(ConfigError::NotFound { path }));
        }
        Some(path)
      }
      None => Self::find_config_path(root),
    };

    let Some(config_path) = config_path else {
      tracing::debug!(root = %root.display(), "no release.toml found, using defaults");
      return Ok(Self::default());
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config = Self::parse(&content).with_context(|| format!("Invalid config in {}", config_path.display()))?;

    tracing::debug!(path = %config_path.display(), "loaded release config");
    Ok(config)
  }

  /// Parse and validate config text
  pub fn parse(content: &str) -> ReleaseResult<Self> {
    let config: ReleaseConfig = toml_edit::de::from_str(content)?;
    config.validate()?;
    Ok(config)
  }

  /// Validate configuration
  pub fn validate(&self) -> ReleaseResult<()> {
    if self.build.command.is_empty() {
      return Err(ReleaseError::Config(ConfigError::MissingField {
        field: "build.command".to_string(),
      }));
    }

    if self.upload.command.is_empty() {
      return Err(ReleaseError::Config(ConfigError::MissingField {
        field: "upload.command".to_string(),
      }));
    }

    if let Some(name) = &self.publish_name
      && name.trim().is_empty()
    {
      return Err(ReleaseError::Config(ConfigError::Invalid {
        field: "publish_name".to_string(),
        reason: "must not be empty".to_string(),
      }));
    }

    if self.image.platforms.is_empty() {
      return Err(ReleaseError::Config(ConfigError::MissingField {
        field: "image.platforms".to_string(),
      }));
    }

    Ok(())
  }

  /// Absolute manifest path for a project root
  pub fn manifest_path(&self, root: &Path) -> PathBuf {
    root.join(&self.manifest)
  }

  /// Name used while packaging and uploading
  ///
  /// The default is derived from the base name, so a manifest that was left
  /// carrying the publish name maps to the same publish name.
  pub fn publish_name_for(&self, current: &str) -> String {
    if let Some(name) = &self.publish_name {
      return name.clone();
    }
    let base = current.strip_suffix(PUBLISH_SUFFIX).unwrap_or(current);
    format!("{}{}", base, PUBLISH_SUFFIX)
  }
}
