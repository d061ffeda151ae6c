//! CLI entry points
//!
//! - **release**: bump, tag, build and upload a package release
//! - **image**: build and push the container image for the current version
//!
//! Each command takes the project root and wires the real collaborators
//! (system git, subprocess packager, terminal prompts) together.

pub mod image;
pub mod release;

pub use image::run_publish_image;
pub use release::{ReleaseArgs, print_version, run_release};
