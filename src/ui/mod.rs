//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - the [`Prompter`] input source and the prompt loops built on it

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use console::style;
use tracing::debug;

use crate::domain::{validate, ValidationOutcome, Version};
use crate::error::{ReleaseError, Result};

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_error, display_initialized, display_release_summary, display_status,
    display_success, display_suggested_version,
};

pub const PROJECT_NAME_QUESTION: &str = "What is the name of your project?";
pub const VERSION_QUESTION: &str = "What is the version you would like to release?";

/// Source of interactive answers.
///
/// The terminal implementation reads stdin; [`ScriptedPrompter`] replays
/// canned answers so the prompt loops run without a terminal.
pub trait Prompter {
    /// Asks `question`, showing `default`. Returns the raw answer without
    /// its line terminator; an empty answer means "take the default".
    fn ask(&mut self, question: &str, default: &str) -> Result<String>;

    /// Tells the user why the last answer was refused.
    fn reject(&mut self, reason: &str);
}

/// Prompter reading from any line-oriented input, stdin by default.
pub struct TerminalPrompter<R> {
    input: R,
}

impl TerminalPrompter<io::StdinLock<'static>> {
    pub fn stdin() -> Self {
        TerminalPrompter {
            input: io::stdin().lock(),
        }
    }
}

impl<R: BufRead> TerminalPrompter<R> {
    pub fn new(input: R) -> Self {
        TerminalPrompter { input }
    }
}

impl<R: BufRead> Prompter for TerminalPrompter<R> {
    fn ask(&mut self, question: &str, default: &str) -> Result<String> {
        print!(
            "{} {} {}: ",
            style("?").green().bold(),
            style(question).bold(),
            style(format!("({})", default)).dim()
        );
        io::stdout().flush()?;

        let mut input = String::new();
        if self.input.read_line(&mut input)? == 0 {
            return Err(ReleaseError::prompt("input closed before an answer was given"));
        }

        Ok(strip_line_ending(&input).to_string())
    }

    fn reject(&mut self, reason: &str) {
        formatter::display_rejection(reason);
    }
}

fn strip_line_ending(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}

/// Prompter replaying a fixed list of answers, recording every rejection.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    pub questions: Vec<String>,
    pub rejections: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedPrompter {
            answers: answers.into_iter().map(Into::into).collect(),
            questions: Vec::new(),
            rejections: Vec::new(),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, question: &str, _default: &str) -> Result<String> {
        self.questions.push(question.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| ReleaseError::prompt("no scripted answer left"))
    }

    fn reject(&mut self, reason: &str) {
        self.rejections.push(reason.to_string());
    }
}

/// Asks for the project name, defaulting to `default` on an empty answer.
///
/// Like the version answer, the name is taken as typed: surrounding
/// whitespace is kept, and only a completely empty line takes the default.
pub fn prompt_project_name(prompter: &mut dyn Prompter, default: &str) -> Result<String> {
    let answer = prompter.ask(PROJECT_NAME_QUESTION, default)?;
    if answer.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(answer)
    }
}

/// Asks for a release version until one passes validation.
///
/// An empty answer takes `suggested`. Every rejection is reported through
/// the prompter and the question is asked again, with no retry limit.
pub fn prompt_for_version(
    prompter: &mut dyn Prompter,
    suggested: Version,
    minimum: Version,
) -> Result<Version> {
    let default = suggested.to_string();
    loop {
        let answer = prompter.ask(VERSION_QUESTION, &default)?;
        let candidate = if answer.is_empty() {
            default.as_str()
        } else {
            answer.as_str()
        };

        match validate(candidate, minimum) {
            ValidationOutcome::Accepted(version) => return Ok(version),
            ValidationOutcome::Rejected(reason) => {
                debug!(candidate, %reason, "Version rejected");
                prompter.reject(&reason.to_string());
            }
        }
    }
}
