//! Error types for the release coordinator with labeled messages and exit codes
//!
//! Every failure is terminal for a run. The only cleanup that happens on the
//! error path is restoring the manifest `name` (see `release::name_swap`).
//! `UserDeclined` is modelled as an error so it can short-circuit with `?`,
//! but it maps to a zero exit code.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for the release binaries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// Completed, displayed help/version, or the user cancelled
  Success = 0,
  /// Any validation, configuration or collaborator failure
  Failure = 1,
  /// Interrupted by SIGINT/SIGTERM/SIGHUP while the package name was swapped
  Interrupted = 130,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type
#[derive(Debug)]
pub enum ReleaseError {
  /// The manifest has no `key = "…"` line for the requested key
  ManifestFieldMissing { key: String, path: PathBuf },

  /// A bump kind (flag value or prompt answer) that is not patch/minor/major/none
  InvalidBumpKind { input: String },

  /// The manifest `version` is not a plain MAJOR.MINOR.PATCH triple
  InvalidVersion { input: String, reason: String },

  /// No git working tree at the project root
  NoVersionControlRoot { path: PathBuf },

  /// An external tool exited non-zero (or was killed by a signal)
  SubprocessFailure { tool: String, exit_code: Option<i32> },

  /// The user answered "no" to a continuation prompt
  UserDeclined,

  /// Configuration errors
  Config(ConfigError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ReleaseError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Record a failed collaborator invocation
  pub fn subprocess(tool: impl Into<String>, exit_code: Option<i32>) -> Self {
    ReleaseError::SubprocessFailure {
      tool: tool.into(),
      exit_code,
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ReleaseError::Message { message, context, help } => ReleaseError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ReleaseError::Io(err) => ReleaseError::Message {
        message: format!("{}: {}", ctx_str, err),
        context: None,
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ReleaseError::UserDeclined => ExitCode::Success,
      _ => ExitCode::Failure,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::ManifestFieldMissing { key, path } => Some(format!(
        "Add a line of the form `{} = \"...\"` to {}",
        key,
        path.display()
      )),
      ReleaseError::InvalidBumpKind { .. } => Some("Use one of --patch, --minor, --major or --no-bump.".to_string()),
      ReleaseError::NoVersionControlRoot { .. } => {
        Some("Run the release from inside the project's git working tree.".to_string())
      }
      ReleaseError::Config(e) => e.help_message(),
      ReleaseError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::ManifestFieldMissing { key, path } => {
        write!(f, "Field '{}' not found in {}", key, path.display())
      }
      ReleaseError::InvalidBumpKind { input } => write!(f, "Invalid bump type: {}", input),
      ReleaseError::InvalidVersion { input, reason } => {
        write!(f, "Invalid version '{}': {}", input, reason)
      }
      ReleaseError::NoVersionControlRoot { path } => {
        write!(f, "Not a git repository: {}", path.display())
      }
      ReleaseError::SubprocessFailure { tool, exit_code } => match exit_code {
        Some(code) => write!(f, "{} failed with exit code {}", tool, code),
        None => write!(f, "{} was terminated by a signal", tool),
      },
      ReleaseError::UserDeclined => write!(f, "Release cancelled by user"),
      ReleaseError::Config(e) => write!(f, "{}", e),
      ReleaseError::Io(e) => write!(f, "I/O error: {}", e),
      ReleaseError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ReleaseError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ReleaseError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ReleaseError {
  fn from(err: io::Error) -> Self {
    ReleaseError::Io(err)
  }
}

impl From<toml_edit::de::Error> for ReleaseError {
  fn from(err: toml_edit::de::Error) -> Self {
    ReleaseError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<glob::PatternError> for ReleaseError {
  fn from(err: glob::PatternError) -> Self {
    ReleaseError::message(format!("Invalid glob pattern: {}", err))
  }
}

impl From<glob::GlobError> for ReleaseError {
  fn from(err: glob::GlobError) -> Self {
    ReleaseError::message(format!("Failed to read path while expanding pattern: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// An explicitly requested config file does not exist
  NotFound { path: PathBuf },

  /// Missing or empty required field
  MissingField { field: String },

  /// A field is present but unusable
  Invalid { field: String, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => {
        Some("Omit --config to search release.toml, .release.toml and .config/release.toml.".to_string())
      }
      ConfigError::MissingField { field } => Some(format!("Set `{}` in release.toml.", field)),
      ConfigError::Invalid { .. } => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { path } => write!(f, "Config file not found: {}", path.display()),
      ConfigError::MissingField { field } => write!(f, "Missing required field in config: {}", field),
      ConfigError::Invalid { field, reason } => write!(f, "Invalid config field '{}': {}", field, reason),
    }
  }
}

/// Result type alias for the release coordinator
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ReleaseError>,
{
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Print an error as a single labeled line, plus an optional help line
pub fn print_error(error: &ReleaseError) {
  crate::ui::output::error(error.to_string());

  if let Some(help) = error.help_message() {
    crate::ui::output::hint(help);
  }
}
