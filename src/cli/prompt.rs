//! Interactive prompting. All operator questions go through the [`Prompter`]
//! seam so flows can be driven by scripted answers in tests; the production
//! implementation wraps `inquire`.

use crate::shared::error::{Result, WizardError};
use colored::Colorize;
use inquire::{Confirm, Editor, InquireError, MultiSelect, Password, PasswordDisplayMode, Select, Text};

pub trait Prompter {
    fn text(&mut self, message: &str, default: Option<&str>) -> Result<String>;
    /// Masked input for secret values (access keys, tokens).
    fn password(&mut self, message: &str) -> Result<String>;
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool>;
    fn select(&mut self, message: &str, options: Vec<String>) -> Result<String>;
    fn multi_select(&mut self, message: &str, options: Vec<String>) -> Result<Vec<String>>;
    /// Long-form input (kubeconfig contents, raw YAML); opens $EDITOR.
    fn editor(&mut self, message: &str) -> Result<String>;
}

/// Terminal prompter backed by `inquire`.
pub struct TermPrompter;

fn map_inquire(err: InquireError) -> WizardError {
    match err {
        InquireError::OperationCanceled | InquireError::OperationInterrupted => {
            WizardError::Cancelled
        }
        other => WizardError::Config(format!("prompt failed: {}", other)),
    }
}

impl Prompter for TermPrompter {
    fn text(&mut self, message: &str, default: Option<&str>) -> Result<String> {
        let mut prompt = Text::new(message);
        if let Some(d) = default {
            prompt = prompt.with_default(d);
        }
        prompt.prompt().map_err(map_inquire)
    }

    fn password(&mut self, message: &str) -> Result<String> {
        Password::new(message)
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()
            .map_err(map_inquire)
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        Confirm::new(message)
            .with_default(default)
            .prompt()
            .map_err(map_inquire)
    }

    fn select(&mut self, message: &str, options: Vec<String>) -> Result<String> {
        Select::new(message, options).prompt().map_err(map_inquire)
    }

    fn multi_select(&mut self, message: &str, options: Vec<String>) -> Result<Vec<String>> {
        MultiSelect::new(message, options)
            .prompt()
            .map_err(map_inquire)
    }

    fn editor(&mut self, message: &str) -> Result<String> {
        Editor::new(message).prompt().map_err(map_inquire)
    }
}

/// Ask one question and re-ask with the identical spec until `validate`
/// accepts the answer. Each rejected attempt prints `error` before retrying.
///
/// `max_attempts: None` retries forever (the operator can still cancel);
/// `Some(n)` fails with a validation error after `n` rejected answers.
/// Implemented as a loop rather than recursion on purpose.
pub fn validated_text(
    prompter: &mut dyn Prompter,
    message: &str,
    default: Option<&str>,
    validate: &dyn Fn(&str) -> bool,
    error: &str,
    max_attempts: Option<u32>,
) -> Result<String> {
    let mut attempts = 0u32;
    loop {
        let answer = prompter.text(message, default)?;
        if validate(&answer) {
            return Ok(answer);
        }

        println!("{}", error.red());
        attempts += 1;
        if let Some(max) = max_attempts {
            if attempts >= max {
                return Err(WizardError::Validation(format!(
                    "no valid answer after {} attempts: {}",
                    max, error
                )));
            }
        }
    }
}

/// Scripted prompter used by flow tests. Lives outside `#[cfg(test)]` so
/// integration tests under `tests/` can drive full wizard flows with it.
pub mod scripted {
    use super::Prompter;
    use crate::shared::error::{Result, WizardError};
    use std::collections::VecDeque;

    /// One pre-recorded answer.
    #[derive(Debug, Clone)]
    pub enum Answer {
        Text(String),
        Confirm(bool),
        Select(String),
        MultiSelect(Vec<String>),
        Editor(String),
    }

    /// Replays a fixed sequence of answers and records every question asked.
    #[derive(Debug, Default)]
    pub struct ScriptedPrompter {
        answers: VecDeque<Answer>,
        pub asked: Vec<String>,
    }

    impl ScriptedPrompter {
        pub fn new(answers: Vec<Answer>) -> Self {
            Self {
                answers: answers.into_iter().collect(),
                asked: Vec::new(),
            }
        }

        fn next(&mut self, message: &str) -> Result<Answer> {
            self.asked.push(message.to_string());
            self.answers
                .pop_front()
                .ok_or_else(|| WizardError::Config(format!("no scripted answer for: {}", message)))
        }
    }

    impl Prompter for ScriptedPrompter {
        fn text(&mut self, message: &str, _default: Option<&str>) -> Result<String> {
            match self.next(message)? {
                Answer::Text(s) => Ok(s),
                other => Err(WizardError::Config(format!(
                    "expected text answer for '{}', got {:?}",
                    message, other
                ))),
            }
        }

        // Secret values are still plain text on the scripted side.
        fn password(&mut self, message: &str) -> Result<String> {
            match self.next(message)? {
                Answer::Text(s) => Ok(s),
                other => Err(WizardError::Config(format!(
                    "expected text answer for '{}', got {:?}",
                    message, other
                ))),
            }
        }

        fn confirm(&mut self, message: &str, _default: bool) -> Result<bool> {
            match self.next(message)? {
                Answer::Confirm(b) => Ok(b),
                other => Err(WizardError::Config(format!(
                    "expected confirm answer for '{}', got {:?}",
                    message, other
                ))),
            }
        }

        fn select(&mut self, message: &str, _options: Vec<String>) -> Result<String> {
            match self.next(message)? {
                Answer::Select(s) => Ok(s),
                other => Err(WizardError::Config(format!(
                    "expected select answer for '{}', got {:?}",
                    message, other
                ))),
            }
        }

        fn multi_select(&mut self, message: &str, _options: Vec<String>) -> Result<Vec<String>> {
            match self.next(message)? {
                Answer::MultiSelect(v) => Ok(v),
                other => Err(WizardError::Config(format!(
                    "expected multi-select answer for '{}', got {:?}",
                    message, other
                ))),
            }
        }

        fn editor(&mut self, message: &str) -> Result<String> {
            match self.next(message)? {
                Answer::Editor(s) => Ok(s),
                other => Err(WizardError::Config(format!(
                    "expected editor answer for '{}', got {:?}",
                    message, other
                ))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::scripted::{Answer, ScriptedPrompter};
    use super::*;

    #[test]
    fn test_validated_text_retries_until_valid() {
        let mut prompter = ScriptedPrompter::new(vec![
            Answer::Text("abc".into()),
            Answer::Text("0".into()),
            Answer::Text("3".into()),
        ]);

        let answer = validated_text(
            &mut prompter,
            "Replicas?",
            Some("1"),
            &|v| matches!(v.parse::<i32>(), Ok(n) if n > 0),
            "Please enter a number greater than 0",
            None,
        )
        .unwrap();

        assert_eq!(answer, "3");
        assert_eq!(prompter.asked.len(), 3);
    }

    #[test]
    fn test_validated_text_attempt_cap() {
        let mut prompter = ScriptedPrompter::new(vec![
            Answer::Text("x".into()),
            Answer::Text("y".into()),
        ]);

        let err = validated_text(
            &mut prompter,
            "Port?",
            None,
            &|v| v.parse::<u16>().is_ok(),
            "Please enter a valid port input",
            Some(2),
        )
        .unwrap_err();

        assert!(matches!(err, WizardError::Validation(_)));
    }

    #[test]
    fn test_first_valid_answer_returns_immediately() {
        let mut prompter = ScriptedPrompter::new(vec![Answer::Text("8080".into())]);
        let answer = validated_text(
            &mut prompter,
            "Port?",
            None,
            &|v| v.parse::<u16>().is_ok(),
            "Please enter a valid port input",
            Some(1),
        )
        .unwrap();
        assert_eq!(answer, "8080");
    }
}
