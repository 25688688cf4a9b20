/*
[INPUT]:  Prompt text, choices and defaults from commands and the shell
[OUTPUT]: User answers (terminal or scripted)
[POS]:    Prompt layer - dialoguer terminal prompts behind a trait
[UPDATE]: When commands need a new kind of prompt
*/

use std::collections::VecDeque;
use std::io;

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Editor, Input, MultiSelect, Select};

use crate::error::{ConsoleError, Result};

/// Source of user answers
///
/// Every method blocks until the user answers. Dismissing a prompt
/// surfaces as [`ConsoleError::PromptCancelled`].
pub trait Prompter {
    /// Pick one of `items`, returning its index
    fn select(&mut self, prompt: &str, items: &[String], default: usize) -> Result<usize>;

    /// Pick any of `items`, returning their indices
    fn multi_select(&mut self, prompt: &str, items: &[String], defaults: &[bool]) -> Result<Vec<usize>>;

    /// Free text; an empty answer returns `default` when one is given
    fn input(&mut self, prompt: &str, default: Option<&str>) -> Result<String>;

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool>;

    /// Open `initial` in an editor and return the saved text
    fn edit(&mut self, prompt: &str, initial: &str) -> Result<String>;
}

/// Interactive prompts on the controlling terminal
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

fn prompt_error(err: dialoguer::Error) -> ConsoleError {
    match err {
        dialoguer::Error::IO(ref io_err) if io_err.kind() == io::ErrorKind::Interrupted => {
            ConsoleError::PromptCancelled
        }
        other => ConsoleError::Prompt(other),
    }
}

impl Prompter for TerminalPrompter {
    fn select(&mut self, prompt: &str, items: &[String], default: usize) -> Result<usize> {
        Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(default)
            .max_length(20)
            .interact_opt()
            .map_err(prompt_error)?
            .ok_or(ConsoleError::PromptCancelled)
    }

    fn multi_select(&mut self, prompt: &str, items: &[String], defaults: &[bool]) -> Result<Vec<usize>> {
        MultiSelect::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .defaults(defaults)
            .interact_opt()
            .map_err(prompt_error)?
            .ok_or(ConsoleError::PromptCancelled)
    }

    fn input(&mut self, prompt: &str, default: Option<&str>) -> Result<String> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        input.interact_text().map_err(prompt_error)
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact_opt()
            .map_err(prompt_error)?
            .ok_or(ConsoleError::PromptCancelled)
    }

    fn edit(&mut self, prompt: &str, initial: &str) -> Result<String> {
        println!("{prompt}");
        Editor::new()
            .extension(".json")
            .edit(initial)
            .map_err(|err| prompt_error(dialoguer::Error::from(err)))?
            .ok_or(ConsoleError::PromptCancelled)
    }
}

/// One scripted answer
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    /// Select the item with this exact text
    Choose(String),
    /// Select the item at this index
    Index(usize),
    /// Pick these indices in a multi-select
    Picks(Vec<usize>),
    /// Type this text (or save this text from the editor)
    Text(String),
    Confirm(bool),
    /// Accept whatever default the prompt offers
    Default,
    /// Dismiss the prompt
    Cancel,
}

/// Prompter that replays a fixed list of answers, for tests
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    seen: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            seen: Vec::new(),
        }
    }

    pub fn push(&mut self, answer: Answer) {
        self.answers.push_back(answer);
    }

    /// Prompt texts shown so far, in order
    pub fn prompts(&self) -> &[String] {
        &self.seen
    }

    /// Answers not consumed yet
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, prompt: &str) -> Result<Answer> {
        self.seen.push(prompt.to_string());
        match self.answers.pop_front() {
            Some(Answer::Cancel) | None => Err(ConsoleError::PromptCancelled),
            Some(answer) => Ok(answer),
        }
    }

    fn mismatch(prompt: &str, answer: &Answer) -> ConsoleError {
        ConsoleError::InvalidInput(format!("scripted answer {answer:?} does not fit prompt '{prompt}'"))
    }
}

impl Prompter for ScriptedPrompter {
    fn select(&mut self, prompt: &str, items: &[String], default: usize) -> Result<usize> {
        match self.next(prompt)? {
            Answer::Index(index) if index < items.len() => Ok(index),
            Answer::Choose(text) => items
                .iter()
                .position(|item| *item == text)
                .ok_or_else(|| ConsoleError::InvalidInput(format!("'{text}' is not offered by '{prompt}'"))),
            Answer::Default => Ok(default),
            other => Err(Self::mismatch(prompt, &other)),
        }
    }

    fn multi_select(&mut self, prompt: &str, _items: &[String], defaults: &[bool]) -> Result<Vec<usize>> {
        match self.next(prompt)? {
            Answer::Picks(picks) => Ok(picks),
            Answer::Default => Ok(defaults
                .iter()
                .enumerate()
                .filter(|(_, selected)| **selected)
                .map(|(index, _)| index)
                .collect()),
            other => Err(Self::mismatch(prompt, &other)),
        }
    }

    fn input(&mut self, prompt: &str, default: Option<&str>) -> Result<String> {
        match self.next(prompt)? {
            Answer::Text(text) if text.is_empty() => Ok(default.unwrap_or_default().to_string()),
            Answer::Text(text) => Ok(text),
            Answer::Default => Ok(default.unwrap_or_default().to_string()),
            other => Err(Self::mismatch(prompt, &other)),
        }
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        match self.next(prompt)? {
            Answer::Confirm(value) => Ok(value),
            Answer::Default => Ok(default),
            other => Err(Self::mismatch(prompt, &other)),
        }
    }

    fn edit(&mut self, prompt: &str, initial: &str) -> Result<String> {
        match self.next(prompt)? {
            Answer::Text(text) => Ok(text),
            Answer::Default => Ok(initial.to_string()),
            other => Err(Self::mismatch(prompt, &other)),
        }
    }
}
