//! Release coordinator for manifest-versioned packages
//!
//! Bumps the version in a `name`/`version` manifest, optionally commits, tags
//! and pushes it, then builds and uploads artifacts under a temporary publish
//! name that is always restored afterwards. A companion binary publishes a
//! multi-platform container image tagged with the manifest version.

pub mod commands;
pub mod core;
pub mod image;
pub mod release;
pub mod ui;
