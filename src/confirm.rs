//! Yes/no confirmation abstraction
//!
//! Overwriting an existing config option needs the user's consent. The
//! question is asked through the [`Confirmer`] trait so that the hooks can be
//! driven by a terminal, by a fixed policy in unattended environments, or by
//! scripted answers in tests.
//!
//! An answer is accepted only when the trimmed, lowercased line equals
//! `"y"`. Anything else, an empty line or end of input, declines.

use anyhow::{anyhow, Result};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, StdinLock, Stdout, Write};
use std::str::FromStr;

use crate::constants::PROMPT_ANSWER_YES;

/// Trait for asking the user a yes/no question
pub trait Confirmer {
    /// Ask `message` and return whether the user accepted
    fn confirm(&self, message: &str) -> Result<bool>;
}

/// Interprets one line of user input
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().to_lowercase() == PROMPT_ANSWER_YES
}

/// Asks on any writer and reads the answer from any reader
///
/// End of input is treated as a decline, so a closed stdin never blocks an
/// install.
pub struct LineConfirmer<R, W> {
    input: RefCell<R>,
    output: RefCell<W>,
}

impl<R: BufRead, W: Write> LineConfirmer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: RefCell::new(input),
            output: RefCell::new(output),
        }
    }

    /// Returns the writer, e.g. to inspect what was printed
    pub fn into_output(self) -> W {
        self.output.into_inner()
    }
}

impl LineConfirmer<StdinLock<'static>, Stdout> {
    /// Production confirmer: prompt on stdout, answer from stdin
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Confirmer for LineConfirmer<R, W> {
    fn confirm(&self, message: &str) -> Result<bool> {
        {
            let mut output = self.output.borrow_mut();
            writeln!(output, "{message}")?;
            output.flush()?;
        }
        let mut answer = String::new();
        let read = self.input.borrow_mut().read_line(&mut answer)?;
        Ok(read > 0 && is_affirmative(&answer))
    }
}

/// How existing options are treated when a package wants to change them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwritePolicy {
    /// Prompt for every existing option
    #[default]
    Ask,
    /// Overwrite without prompting
    Always,
    /// Keep existing values without prompting
    Never,
}

impl FromStr for OverwritePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ask" | "prompt" => Ok(OverwritePolicy::Ask),
            "always" | "yes" | "y" | "true" => Ok(OverwritePolicy::Always),
            "never" | "no" | "n" | "false" => Ok(OverwritePolicy::Never),
            other => Err(anyhow!(
                "Invalid overwrite policy '{other}': expected ask, always or never"
            )),
        }
    }
}

/// Answers every question according to a fixed policy
#[derive(Debug, Clone, Copy)]
pub struct PolicyConfirmer {
    answer: bool,
}

impl PolicyConfirmer {
    pub fn always() -> Self {
        Self { answer: true }
    }

    pub fn never() -> Self {
        Self { answer: false }
    }
}

impl Confirmer for PolicyConfirmer {
    fn confirm(&self, message: &str) -> Result<bool> {
        tracing::info!(answer = self.answer, "{message}");
        Ok(self.answer)
    }
}

/// Builds the confirmer for a policy
pub fn confirmer_for(policy: OverwritePolicy) -> Box<dyn Confirmer> {
    match policy {
        OverwritePolicy::Ask => Box::new(LineConfirmer::stdio()),
        OverwritePolicy::Always => Box::new(PolicyConfirmer::always()),
        OverwritePolicy::Never => Box::new(PolicyConfirmer::never()),
    }
}

/// Mock implementation for testing
///
/// Replays scripted answers in order and records every prompt it was asked.
#[derive(Debug, Default)]
pub struct MockConfirmer {
    answers: RefCell<VecDeque<bool>>,
    prompts: RefCell<Vec<String>>,
}

impl MockConfirmer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an answer for the next confirm() call
    pub fn with_answer(self, answer: bool) -> Self {
        self.answers.borrow_mut().push_back(answer);
        self
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }

    /// Check if all configured answers have been consumed
    pub fn is_exhausted(&self) -> bool {
        self.answers.borrow().is_empty()
    }
}

impl Confirmer for MockConfirmer {
    fn confirm(&self, message: &str) -> Result<bool> {
        self.prompts.borrow_mut().push(message.to_string());
        self.answers
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow!("No more answers configured for MockConfirmer"))
    }
}
