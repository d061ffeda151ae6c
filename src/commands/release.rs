//! `release` command implementation

use crate::core::config::ReleaseConfig;
use crate::core::error::ReleaseResult;
use crate::core::vcs::SystemGit;
use crate::release::{
  BumpKind, Manifest, ReleaseCoordinator, RunOptions, RunOutcome, SystemPackager, TerminalPrompter,
};
use crate::ui::output;
use std::path::{Path, PathBuf};

/// Parsed `release` arguments
#[derive(Debug, Clone, Default)]
pub struct ReleaseArgs {
  pub bump: Option<BumpKind>,
  pub no_tag: bool,
  pub test: bool,
  /// Manifest path overriding the config (relative to the project root)
  pub manifest: Option<PathBuf>,
  pub config: Option<PathBuf>,
}

impl ReleaseArgs {
  fn options(&self) -> RunOptions {
    RunOptions {
      bump: self.bump,
      no_tag: self.no_tag,
      use_test_registry: self.test,
    }
  }
}

fn resolve_manifest(root: &Path, config: &ReleaseConfig, explicit: Option<&Path>) -> Manifest {
  match explicit {
    Some(path) => Manifest::new(root.join(path)),
    None => Manifest::new(config.manifest_path(root)),
  }
}

/// Print the manifest's current version (`-v/--version`)
pub fn print_version(root: &Path, args: &ReleaseArgs) -> ReleaseResult<()> {
  let config = ReleaseConfig::load(root, args.config.as_deref())?;
  let manifest = resolve_manifest(root, &config, args.manifest.as_deref());
  println!("{}", manifest.version()?);
  Ok(())
}

/// Run a full release from `root`
pub fn run_release(root: &Path, args: &ReleaseArgs) -> ReleaseResult<RunOutcome> {
  let config = ReleaseConfig::load(root, args.config.as_deref())?;
  let manifest = resolve_manifest(root, &config, args.manifest.as_deref());
  tracing::debug!(manifest = %manifest.path().display(), "starting release");

  let vcs = SystemGit::at(root);
  let packager = SystemPackager::new(root, config.build.clone(), config.upload.clone());
  let mut coordinator = ReleaseCoordinator::new(manifest, config, vcs, packager, TerminalPrompter);

  let outcome = coordinator.run(&args.options())?;

  if let RunOutcome::Published {
    version,
    published_name,
    registry_url,
  } = &outcome
  {
    output::success(format!("Released {} {}", published_name, version));
    output::info(format!("View at: {}", registry_url));
  }

  Ok(outcome)
}
