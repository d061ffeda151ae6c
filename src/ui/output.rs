//! Labeled terminal output
//!
//! Each user-facing line starts with a fixed label (`[INFO]`, `[SUCCESS]`,
//! `[WARNING]`, `[ERROR]`) so automated callers can grep for them. Labels are
//! colored only when the target stream is a terminal.

use anstyle::{AnsiColor, Style};
use std::io::{IsTerminal, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
  Info,
  Success,
  Warning,
  Error,
  Hint,
}

impl Level {
  fn label(self) -> &'static str {
    match self {
      Level::Info => "[INFO]",
      Level::Success => "[SUCCESS]",
      Level::Warning => "[WARNING]",
      Level::Error => "[ERROR]",
      Level::Hint => "[HINT]",
    }
  }

  fn style(self) -> Style {
    let color = match self {
      Level::Info => AnsiColor::Blue,
      Level::Success => AnsiColor::Green,
      Level::Warning => AnsiColor::Yellow,
      Level::Error => AnsiColor::Red,
      Level::Hint => AnsiColor::Cyan,
    };
    Style::new().bold().fg_color(Some(color.into()))
  }

  fn to_stderr(self) -> bool {
    matches!(self, Level::Error | Level::Hint)
  }
}

/// Format a labeled line, optionally with ANSI styling around the label
fn format_line(level: Level, message: &str, colored: bool) -> String {
  if colored {
    let style = level.style();
    format!("{}{}{} {}", style.render(), level.label(), style.render_reset(), message)
  } else {
    format!("{} {}", level.label(), message)
  }
}

fn emit(level: Level, message: &str) {
  // Broken pipes are ignored; the run's outcome is reported via exit code.
  if level.to_stderr() {
    let stderr = std::io::stderr();
    let line = format_line(level, message, stderr.is_terminal());
    let _ = writeln!(stderr.lock(), "{}", line);
  } else {
    let stdout = std::io::stdout();
    let line = format_line(level, message, stdout.is_terminal());
    let _ = writeln!(stdout.lock(), "{}", line);
  }
}

pub fn info(message: impl AsRef<str>) {
  emit(Level::Info, message.as_ref());
}

pub fn success(message: impl AsRef<str>) {
  emit(Level::Success, message.as_ref());
}

pub fn warning(message: impl AsRef<str>) {
  emit(Level::Warning, message.as_ref());
}

pub fn error(message: impl AsRef<str>) {
  emit(Level::Error, message.as_ref());
}

/// Follow-up suggestion printed after an error
pub fn hint(message: impl AsRef<str>) {
  emit(Level::Hint, message.as_ref());
}
