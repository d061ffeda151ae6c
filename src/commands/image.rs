//! `publish-image` command implementation

use crate::core::config::ReleaseConfig;
use crate::core::error::ReleaseResult;
use crate::image::ImageBuild;
use crate::release::Manifest;
use crate::ui::output;
use std::path::{Path, PathBuf};

/// Build (and by default push) the container image for the manifest version
pub fn run_publish_image(
  root: &Path,
  manifest: Option<PathBuf>,
  config_path: Option<PathBuf>,
  no_push: bool,
) -> ReleaseResult<ImageBuild> {
  let config = ReleaseConfig::load(root, config_path.as_deref())?;
  let manifest = match manifest {
    Some(path) => Manifest::new(root.join(path)),
    None => Manifest::new(config.manifest_path(root)),
  };

  let build = ImageBuild::resolve(&config.image, &manifest, !no_push)?;
  let [latest, versioned] = build.references();

  output::info(format!(
    "Building {} for {}",
    build.repository,
    config.image.platforms.join(", ")
  ));
  build.execute(root)?;

  if build.push {
    output::success(format!("Pushed {} and {}", latest, versioned));
  } else {
    output::success(format!("Built {} and {} (not pushed)", latest, versioned));
  }

  Ok(build)
}
