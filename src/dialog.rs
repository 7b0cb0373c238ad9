//! The seam to the modal dialog layer.
//!
//! Controllers suspend on a [`Dialog`] whenever an action needs a yes/no or a
//! typed value from the user. The rendering layer supplies the real one.

use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub title: String,
    pub text: String,
}

impl Prompt {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Prompt {
            title: title.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DialogResult {
    Confirmed(String),
    Cancelled,
}

/// The result of a user-facing action that passed through a dialog.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Done(T),
    Cancelled,
}

impl<T> Outcome<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done(_))
    }

    pub fn done(self) -> Option<T> {
        match self {
            Outcome::Done(value) => Some(value),
            Outcome::Cancelled => None,
        }
    }
}

pub type Validator<'a> = &'a dyn Fn(&str) -> Result<(), String>;

pub trait Dialog {
    fn confirm(&mut self, prompt: &Prompt) -> bool;

    /// Shows an input. A rejected value keeps the dialog open with the
    /// validator's message until a value passes or the user cancels.
    fn input(&mut self, prompt: &Prompt, validate: Validator<'_>) -> DialogResult;

    /// A blocking notice with a single button.
    fn alert(&mut self, prompt: &Prompt);
}

#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Yes,
    No,
    Input(String),
    Cancel,
}

/// Plays back a fixed list of answers and records what the user was shown.
///
/// Running out of answers counts as cancelling.
#[derive(Debug, Default)]
pub struct ScriptedDialog {
    answers: VecDeque<Answer>,
    pub shown: Vec<Prompt>,
    pub validation_messages: Vec<String>,
    pub alerts: Vec<Prompt>,
}

impl ScriptedDialog {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        ScriptedDialog {
            answers: answers.into_iter().collect(),
            ..Default::default()
        }
    }
}

impl Dialog for ScriptedDialog {
    fn confirm(&mut self, prompt: &Prompt) -> bool {
        self.shown.push(prompt.clone());
        matches!(self.answers.pop_front(), Some(Answer::Yes))
    }

    fn input(&mut self, prompt: &Prompt, validate: Validator<'_>) -> DialogResult {
        self.shown.push(prompt.clone());
        loop {
            match self.answers.pop_front() {
                Some(Answer::Input(value)) => match validate(&value) {
                    Ok(()) => return DialogResult::Confirmed(value),
                    Err(msg) => self.validation_messages.push(msg),
                },
                Some(Answer::Yes) => match validate("") {
                    Ok(()) => return DialogResult::Confirmed(String::new()),
                    Err(msg) => self.validation_messages.push(msg),
                },
                Some(Answer::No) | Some(Answer::Cancel) | None => return DialogResult::Cancelled,
            }
        }
    }

    fn alert(&mut self, prompt: &Prompt) {
        self.alerts.push(prompt.clone());
    }
}
