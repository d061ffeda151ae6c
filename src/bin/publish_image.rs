use clap::Parser;
use release_coordinator::commands;
use release_coordinator::core::error::{ReleaseError, print_error};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Build and push a multi-platform container image tagged with the manifest version
#[derive(Parser)]
#[command(name = "publish-image")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Manifest holding the version (default: from release.toml, else pyproject.toml)
  #[arg(long, value_name = "PATH")]
  manifest: Option<PathBuf>,

  /// Config file (default: release.toml, .release.toml, .config/release.toml)
  #[arg(long, value_name = "PATH")]
  config: Option<PathBuf>,

  /// Build without pushing
  #[arg(long = "no-push")]
  no_push: bool,
}

fn main() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .with_target(false)
    .init();

  let cli = Cli::parse();

  let result = std::env::current_dir()
    .map_err(|e| ReleaseError::message(format!("Failed to get current directory: {}", e)))
    .and_then(|root| commands::run_publish_image(&root, cli.manifest, cli.config, cli.no_push));

  if let Err(err) = result {
    print_error(&err);
    std::process::exit(err.exit_code().as_i32());
  }
}
