//! Building blocks shared by the release binaries
//!
//! - **config**: optional release.toml parsing and validation
//! - **error**: error types with contextual help messages and exit codes
//! - **process**: fail-fast subprocess execution for external tools
//! - **vcs**: git operations abstraction (SystemGit)

pub mod config;
pub mod error;
pub mod process;
pub mod vcs;
