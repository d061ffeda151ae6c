//! Interactive questions asked during a release
//!
//! The coordinator only talks to the `Prompter` trait. `TerminalPrompter`
//! reads answers from stdin; `ScriptedPrompter` replays canned answers.

use crate::core::error::{ReleaseResult, ResultExt};
use crate::release::version::BumpKind;
use std::collections::VecDeque;
use std::io::{BufRead, Write};

/// Source of answers to release questions
pub trait Prompter {
  /// Ask a question and return the answer line without its line ending
  ///
  /// End of input yields an empty answer, which every caller treats as the default.
  fn ask(&mut self, question: &str) -> ReleaseResult<String>;
}

const BUMP_MENU: &str = "Select version bump type:\n  1) patch\n  2) minor\n  3) major\n  4) skip (keep current version)\nChoice [1-4]: ";

/// Yes/no question that defaults to "no"
pub fn confirm(prompter: &mut dyn Prompter, question: &str) -> ReleaseResult<bool> {
  let answer = prompter.ask(&format!("{} [y/N] ", question))?;
  Ok(is_yes(&answer))
}

/// Ask for a bump kind from the numbered menu; anything else is `InvalidBumpKind`
pub fn choose_bump_kind(prompter: &mut dyn Prompter) -> ReleaseResult<BumpKind> {
  let answer = prompter.ask(BUMP_MENU)?;
  BumpKind::from_menu_choice(&answer)
}

fn is_yes(answer: &str) -> bool {
  matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Prompts on stdout, reads answers from stdin
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
  fn ask(&mut self, question: &str) -> ReleaseResult<String> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{}", question).context("Failed to write prompt")?;
    stdout.flush().context("Failed to write prompt")?;

    let mut input = String::new();
    std::io::stdin()
      .lock()
      .read_line(&mut input)
      .context("Failed to read input")?;

    Ok(input.trim_end_matches(['\r', '\n']).to_string())
  }
}

/// Replays a fixed list of answers and records every question asked
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
  answers: VecDeque<String>,
  pub asked: Vec<String>,
}

impl ScriptedPrompter {
  pub fn new<I, S>(answers: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      answers: answers.into_iter().map(Into::into).collect(),
      asked: Vec::new(),
    }
  }
}

impl Prompter for ScriptedPrompter {
  fn ask(&mut self, question: &str) -> ReleaseResult<String> {
    self.asked.push(question.to_string());
    Ok(self.answers.pop_front().unwrap_or_default())
  }
}
