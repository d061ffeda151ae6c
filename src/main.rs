use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{ArgGroup, Parser};
use release_coordinator::commands::{self, ReleaseArgs};
use release_coordinator::core::error::{ExitCode, ReleaseError, print_error};
use release_coordinator::release::BumpKind;
use release_coordinator::ui::output;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Bump, tag, build and upload a package release
#[derive(Parser)]
#[command(name = "release")]
#[command(about, long_about = None)]
#[command(disable_version_flag = true)]
#[command(styles = get_styles())]
#[command(group(ArgGroup::new("bump").args(["patch", "minor", "major", "no_bump"])))]
struct Cli {
  /// Print the manifest's current version and exit
  #[arg(short = 'v', long = "version")]
  show_version: bool,

  /// Bump the patch version (x.y.Z)
  #[arg(long)]
  patch: bool,

  /// Bump the minor version (x.Y.0)
  #[arg(long)]
  minor: bool,

  /// Bump the major version (X.0.0)
  #[arg(long)]
  major: bool,

  /// Keep the current version
  #[arg(long = "no-bump")]
  no_bump: bool,

  /// Never commit, tag or push
  #[arg(long = "no-tag")]
  no_tag: bool,

  /// Upload to the test registry
  #[arg(long)]
  test: bool,

  /// Manifest to release (default: from release.toml, else pyproject.toml)
  #[arg(long, value_name = "PATH")]
  manifest: Option<PathBuf>,

  /// Config file (default: release.toml, .release.toml, .config/release.toml)
  #[arg(long, value_name = "PATH")]
  config: Option<PathBuf>,
}

impl Cli {
  fn bump(&self) -> Option<BumpKind> {
    if self.patch {
      Some(BumpKind::Patch)
    } else if self.minor {
      Some(BumpKind::Minor)
    } else if self.major {
      Some(BumpKind::Major)
    } else if self.no_bump {
      Some(BumpKind::None)
    } else {
      None
    }
  }

  fn into_args(self) -> ReleaseArgs {
    ReleaseArgs {
      bump: self.bump(),
      no_tag: self.no_tag,
      test: self.test,
      manifest: self.manifest,
      config: self.config,
    }
  }
}

/// Custom color scheme for CLI help output
fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .with_target(false)
    .init();
}

fn main() {
  init_tracing();

  let cli = match Cli::try_parse() {
    Ok(cli) => cli,
    Err(err) => handle_parse_error(err),
  };

  let project_root = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => handle_error(ReleaseError::message(format!("Failed to get current directory: {}", e))),
  };

  let show_version = cli.show_version;
  let args = cli.into_args();

  let result = if show_version {
    commands::print_version(&project_root, &args)
  } else {
    commands::run_release(&project_root, &args).map(|_| ())
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

/// Usage errors exit 1; help exits 0
fn handle_parse_error(err: clap::Error) -> ! {
  match err.kind() {
    ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
      let _ = err.print();
      std::process::exit(ExitCode::Success.as_i32());
    }
    ErrorKind::UnknownArgument => {
      let flag = match err.get(ContextKind::InvalidArg) {
        Some(ContextValue::String(flag)) => flag.clone(),
        _ => String::from("?"),
      };
      output::error(format!("Unknown option: {}", flag));
      output::hint("Run with --help to see available options.");
    }
    ErrorKind::ArgumentConflict if bump_conflict(&err).is_some() => {
      output::error("Only one of --patch, --minor, --major or --no-bump may be given");
    }
    _ => {
      let _ = err.print();
    }
  }
  std::process::exit(ExitCode::Failure.as_i32());
}

const BUMP_FLAGS: [&str; 4] = ["--patch", "--minor", "--major", "--no-bump"];

/// The two bump flags of a conflict, when it is between different bump flags
///
/// A repeated flag (`--patch --patch`) is a conflict too, but not this one.
fn bump_conflict(err: &clap::Error) -> Option<(String, String)> {
  let invalid = match err.get(ContextKind::InvalidArg)? {
    ContextValue::String(arg) => arg.clone(),
    _ => return None,
  };
  let prior = match err.get(ContextKind::PriorArg)? {
    ContextValue::String(arg) => arg.clone(),
    ContextValue::Strings(args) => args.first()?.clone(),
    _ => return None,
  };
  let is_bump = |arg: &str| BUMP_FLAGS.iter().any(|flag| arg.starts_with(flag));
  (invalid != prior && is_bump(&invalid) && is_bump(&prior)).then_some((invalid, prior))
}

fn handle_error(err: ReleaseError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
