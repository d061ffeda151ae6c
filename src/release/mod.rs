//! Release orchestration for a single-manifest package
//!
//! - **manifest**: line-oriented `key = "value"` reader/writer
//! - **version**: bump kinds and semver arithmetic
//! - **prompt**: interactive questions behind the `Prompter` trait
//! - **name_swap**: temporary package rename with guaranteed restore
//! - **packaging**: clean/build/upload collaborators behind the `Packager` trait
//! - **coordinator**: the end-to-end run

pub mod coordinator;
pub mod manifest;
pub mod name_swap;
pub mod packaging;
pub mod prompt;
pub mod version;

pub use coordinator::{ReleaseCoordinator, RunOptions, RunOutcome, Stage};
pub use manifest::Manifest;
pub use name_swap::{NameSwap, NameSwapState, with_temporary_name};
pub use packaging::{Packager, SystemPackager};
pub use prompt::{Prompter, ScriptedPrompter, TerminalPrompter};
pub use version::{BumpKind, compute_next_version, parse_version};
