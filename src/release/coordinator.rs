//! Release orchestration
//!
//! One run walks a fixed sequence:
//!
//! ```text
//! Idle -> VersionDecided -> TreeClean -> VersionWritten? -> TaggedPushed?
//!      -> NameSwapped -> Published -> NameRestored -> Done
//! ```
//!
//! Any failure moves the run to `Aborted`. The manifest name is restored by
//! `with_temporary_name` on every path out of the publish phase; git history
//! that was already pushed is never rolled back.

use crate::core::config::ReleaseConfig;
use crate::core::error::{ReleaseError, ReleaseResult};
use crate::core::vcs::VersionControl;
use crate::release::manifest::Manifest;
use crate::release::name_swap;
use crate::release::packaging::Packager;
use crate::release::prompt::{self, Prompter};
use crate::release::version::{BumpKind, compute_next_version, parse_version};
use crate::ui::output;
use semver::Version;
use std::cell::Cell;

/// Flags that shape a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
  /// Bump selected on the command line; prompt when None
  pub bump: Option<BumpKind>,
  /// Never offer to commit, tag and push
  pub no_tag: bool,
  /// Upload to the test registry instead of production
  pub use_test_registry: bool,
}

/// How a run ended when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
  Published {
    version: String,
    published_name: String,
    registry_url: String,
  },
  /// The user declined to continue; nothing was modified
  Cancelled,
}

/// Progress marker for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  Idle,
  VersionDecided,
  TreeClean,
  VersionWritten,
  TaggedPushed,
  NameSwapped,
  Published,
  NameRestored,
  Done,
  Aborted,
}

/// Drives a release against one manifest with pluggable collaborators
pub struct ReleaseCoordinator<V, P, Q> {
  manifest: Manifest,
  config: ReleaseConfig,
  vcs: V,
  packager: P,
  prompter: Q,
  stage: Cell<Stage>,
}

impl<V, P, Q> ReleaseCoordinator<V, P, Q>
where
  V: VersionControl,
  P: Packager,
  Q: Prompter,
{
  pub fn new(manifest: Manifest, config: ReleaseConfig, vcs: V, packager: P, prompter: Q) -> Self {
    Self {
      manifest,
      config,
      vcs,
      packager,
      prompter,
      stage: Cell::new(Stage::Idle),
    }
  }

  pub fn stage(&self) -> Stage {
    self.stage.get()
  }

  pub fn prompter(&self) -> &Q {
    &self.prompter
  }

  fn transition(&self, next: Stage) {
    tracing::debug!(from = ?self.stage.get(), to = ?next, "release stage");
    self.stage.set(next);
  }

  pub fn read_field(&self, key: &str) -> ReleaseResult<String> {
    self.manifest.read_field(key)
  }

  pub fn write_field(&self, key: &str, value: &str) -> ReleaseResult<()> {
    self.manifest.write_field(key, value)
  }

  /// Current manifest version bumped by `kind`
  pub fn next_version(&self, kind: BumpKind) -> ReleaseResult<(Version, Version)> {
    let current = parse_version(&self.read_field("version")?)?;
    let next = compute_next_version(&current, kind);
    Ok((current, next))
  }

  /// Run `body` while the manifest name is `temp_name`
  pub fn with_temporary_name<T, F>(&self, temp_name: &str, body: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> ReleaseResult<T>,
  {
    name_swap::with_temporary_name(&self.manifest, temp_name, body)
  }

  /// Commit the manifest, tag `v{version}` and push branch and tags
  ///
  /// Does nothing unless `confirmed`. The first failing git step ends the run.
  pub fn tag_and_push(&self, version: &str, confirmed: bool) -> ReleaseResult<()> {
    if !confirmed {
      output::info("Skipping git commit, tag and push");
      return Ok(());
    }

    let remote = &self.config.git.remote;
    let branch = &self.config.git.branch;
    let tag = format!("v{}", version);

    output::info(format!("Committing version {}", version));
    self.vcs.stage(self.manifest.path())?;
    self.vcs.commit(&format!("Bump version to {}", version))?;

    output::info(format!("Creating tag {}", tag));
    self
      .vcs
      .create_annotated_tag(&tag, &format!("Release version {}", version))?;

    output::info(format!("Pushing {} and tags to {}", branch, remote));
    self.vcs.push_branch(remote, branch)?;
    self.vcs.push_tags(remote)?;

    output::success(format!("Tagged and pushed {}", tag));
    Ok(())
  }

  /// Clean previous outputs, build, and upload to the selected registry
  pub fn build_and_publish(&self, use_test_registry: bool) -> ReleaseResult<()> {
    let registry = self.config.registry.select(use_test_registry);

    output::info("Cleaning previous build artifacts");
    self.packager.clean()?;

    output::info("Building distribution");
    self.packager.build()?;

    output::info(format!("Uploading to {}", registry.repository));
    self.packager.upload(registry)?;

    output::success(format!("Uploaded to {}", registry.repository));
    Ok(())
  }

  /// Execute a full release
  ///
  /// A declined continuation prompt is reported as `RunOutcome::Cancelled`.
  pub fn run(&mut self, options: &RunOptions) -> ReleaseResult<RunOutcome> {
    match self.run_steps(options) {
      Ok(outcome) => Ok(outcome),
      Err(ReleaseError::UserDeclined) => {
        self.transition(Stage::Aborted);
        Ok(RunOutcome::Cancelled)
      }
      Err(err) => {
        self.transition(Stage::Aborted);
        Err(err)
      }
    }
  }

  fn run_steps(&mut self, options: &RunOptions) -> ReleaseResult<RunOutcome> {
    let kind = match options.bump {
      Some(kind) => kind,
      None => prompt::choose_bump_kind(&mut self.prompter)?,
    };
    self.transition(Stage::VersionDecided);

    self.vcs.verify_work_tree()?;
    if self.vcs.has_uncommitted_changes()? {
      output::warning("You have uncommitted changes");
      if !prompt::confirm(&mut self.prompter, "Continue anyway?")? {
        output::info("Release cancelled");
        return Err(ReleaseError::UserDeclined);
      }
    }
    self.transition(Stage::TreeClean);

    let version = if kind == BumpKind::None {
      let current = self.read_field("version")?;
      output::info(format!("Keeping version {}", current));
      current
    } else {
      let (current, next) = self.next_version(kind)?;
      let next = next.to_string();
      self.write_field("version", &next)?;
      output::success(format!("Version bumped ({}): {} -> {}", kind, current, next));
      self.transition(Stage::VersionWritten);

      if !options.no_tag {
        let question = format!(
          "Commit, tag v{} and push to {}/{}?",
          next, self.config.git.remote, self.config.git.branch
        );
        let confirmed = prompt::confirm(&mut self.prompter, &question)?;
        self.tag_and_push(&next, confirmed)?;
        if confirmed {
          self.transition(Stage::TaggedPushed);
        }
      }
      next
    };

    let original_name = self.read_field("name")?;
    let publish_name = self.config.publish_name_for(&original_name);

    self.with_temporary_name(&publish_name, || {
      self.transition(Stage::NameSwapped);
      self.build_and_publish(options.use_test_registry)?;
      self.transition(Stage::Published);
      Ok(())
    })?;
    self.transition(Stage::NameRestored);

    let registry = self.config.registry.select(options.use_test_registry);
    let registry_url = registry.project_url(&publish_name, &version);
    self.transition(Stage::Done);

    Ok(RunOutcome::Published {
      version,
      published_name: publish_name,
      registry_url,
    })
  }
}
