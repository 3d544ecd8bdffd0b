//! Recording [`UserInterface`] for tests.
//!
//! `MockUI` keeps everything shown to the operator so tests can assert on
//! it, and answers prompts from canned responses.
//!
//! # Example
//!
//! ```
//! use autosetup::ui::{MockUI, Prompt, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.set_prompt_response("UC_CATALOG", "main");
//!
//! let answer = ui.prompt(&Prompt::input("UC_CATALOG", "Catalog", None)).unwrap();
//! assert_eq!(answer.as_string(), "main");
//! assert_eq!(ui.prompts_shown(), ["UC_CATALOG".to_string()]);
//! ```

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crate::error::Result;

use super::{OutputMode, Prompt, PromptResult, SpinnerHandle, UserInterface};

type SpinnerLog = Rc<RefCell<Vec<(SpinnerStatus, String)>>>;

/// Non-interactive UI that records output and replays prompt answers.
///
/// A key answered through `queue_prompt_responses` uses the queue first,
/// then the fixed answer from `set_prompt_response`, then the prompt default.
#[derive(Debug, Default)]
pub struct MockUI {
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    headers: Vec<String>,
    hints: Vec<String>,
    steps: Vec<(usize, usize, String)>,
    spinner_log: SpinnerLog,
    error_blocks: Vec<(String, String, Option<String>)>,
    answers: HashMap<String, String>,
    queued: HashMap<String, VecDeque<String>>,
    prompts_shown: Vec<String>,
}

impl MockUI {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every prompt for `key` with `response`.
    pub fn set_prompt_response(&mut self, key: &str, response: &str) {
        self.answers.insert(key.to_string(), response.to_string());
    }

    /// Answer the next prompts for `key` with `responses`, in order.
    pub fn queue_prompt_responses(&mut self, key: &str, responses: Vec<&str>) {
        self.queued.insert(
            key.to_string(),
            responses.into_iter().map(String::from).collect(),
        );
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Steps announced, as (current, total, name).
    pub fn steps(&self) -> &[(usize, usize, String)] {
        &self.steps
    }

    /// How each spinner finished, in start order.
    pub fn spinner_outcomes(&self) -> Vec<(SpinnerStatus, String)> {
        self.spinner_log.borrow().clone()
    }

    /// Failure blocks, as (command, output, hint).
    pub fn error_blocks(&self) -> &[(String, String, Option<String>)] {
        &self.error_blocks
    }

    /// Keys of the prompts asked so far.
    pub fn prompts_shown(&self) -> &[String] {
        &self.prompts_shown
    }

    pub fn has_message(&self, needle: &str) -> bool {
        contains(&self.messages, needle)
    }

    pub fn has_success(&self, needle: &str) -> bool {
        contains(&self.successes, needle)
    }

    pub fn has_warning(&self, needle: &str) -> bool {
        contains(&self.warnings, needle)
    }

    pub fn has_error(&self, needle: &str) -> bool {
        contains(&self.errors, needle)
    }

    pub fn has_hint(&self, needle: &str) -> bool {
        contains(&self.hints, needle)
    }

    fn answer_for(&mut self, key: &str) -> Option<String> {
        if let Some(next) = self.queued.get_mut(key).and_then(VecDeque::pop_front) {
            return Some(next);
        }
        self.answers.get(key).cloned()
    }
}

fn contains(lines: &[String], needle: &str) -> bool {
    lines.iter().any(|line| line.contains(needle))
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        OutputMode::Normal
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        self.prompts_shown.push(prompt.key.clone());
        let answer = self
            .answer_for(&prompt.key)
            .or_else(|| prompt.default.clone())
            .unwrap_or_default();
        Ok(PromptResult::from_answer(&prompt.prompt_type, &answer))
    }

    fn start_spinner(&mut self, _message: &str) -> Box<dyn SpinnerHandle> {
        Box::new(MockSpinner {
            log: Rc::clone(&self.spinner_log),
        })
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn show_step(&mut self, current: usize, total: usize, name: &str, _description: &str) {
        self.steps.push((current, total, name.to_string()));
    }

    fn show_hint(&mut self, hint: &str) {
        self.hints.push(hint.to_string());
    }

    fn show_error_block(&mut self, command: &str, output: &str, hint: Option<&str>) {
        self.error_blocks
            .push((command.to_string(), output.to_string(), hint.map(String::from)));
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// How a mock spinner was finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinnerStatus {
    Success,
    Error,
    Skipped,
}

/// Spinner that appends its outcome to the owning `MockUI`.
#[derive(Debug)]
pub struct MockSpinner {
    log: SpinnerLog,
}

impl SpinnerHandle for MockSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn output_line(&mut self, _line: &str) {}

    fn finish_success(&mut self, msg: &str) {
        self.log
            .borrow_mut()
            .push((SpinnerStatus::Success, msg.to_string()));
    }

    fn finish_error(&mut self, msg: &str) {
        self.log
            .borrow_mut()
            .push((SpinnerStatus::Error, msg.to_string()));
    }

    fn finish_skipped(&mut self, msg: &str) {
        self.log
            .borrow_mut()
            .push((SpinnerStatus::Skipped, msg.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::PromptType;

    #[test]
    fn captures_output_by_kind() {
        let mut ui = MockUI::new();
        ui.message("Hello");
        ui.success("Done");
        ui.warning("Careful");
        ui.error("Broken");
        ui.show_hint("Try again");

        assert!(ui.has_message("Hello"));
        assert!(ui.has_success("Done"));
        assert!(ui.has_warning("Care"));
        assert!(ui.has_error("Broken"));
        assert!(ui.has_hint("again"));
    }

    #[test]
    fn queued_responses_then_fixed_then_default() {
        let mut ui = MockUI::new();
        ui.queue_prompt_responses("NAME", vec!["Bad_Name", "good-name"]);
        ui.set_prompt_response("NAME", "fixed");
        let prompt = Prompt::input("NAME", "Name", Some("fallback"));

        assert_eq!(ui.prompt(&prompt).unwrap().as_string(), "Bad_Name");
        assert_eq!(ui.prompt(&prompt).unwrap().as_string(), "good-name");
        assert_eq!(ui.prompt(&prompt).unwrap().as_string(), "fixed");
        assert_eq!(ui.prompts_shown().len(), 3);

        let other = Prompt::input("OTHER", "Other", Some("fallback"));
        assert_eq!(ui.prompt(&other).unwrap().as_string(), "fallback");
    }

    #[test]
    fn confirm_parses_response() {
        let mut ui = MockUI::new();
        ui.set_prompt_response("confirm_install", "n");
        let result = ui
            .prompt(&Prompt::confirm("confirm_install", "Continue?", true))
            .unwrap();
        assert_eq!(result, PromptResult::Bool(false));
    }

    #[test]
    fn unanswered_input_is_empty() {
        let mut ui = MockUI::new();
        let result = ui
            .prompt(&Prompt {
                key: "K".to_string(),
                question: "?".to_string(),
                prompt_type: PromptType::Input,
                default: None,
            })
            .unwrap();
        assert_eq!(result.as_string(), "");
    }

    #[test]
    fn spinner_outcomes_are_shared() {
        let mut ui = MockUI::new();
        let mut first = ui.start_spinner("one");
        first.finish_success("one done");
        let mut second = ui.start_spinner("two");
        second.finish_error("two failed");
        let mut third = ui.start_spinner("three");
        third.finish_skipped("three skipped");

        assert_eq!(
            ui.spinner_outcomes(),
            vec![
                (SpinnerStatus::Success, "one done".to_string()),
                (SpinnerStatus::Error, "two failed".to_string()),
                (SpinnerStatus::Skipped, "three skipped".to_string()),
            ]
        );
    }

    #[test]
    fn records_steps_and_error_blocks() {
        let mut ui = MockUI::new();
        ui.show_step(2, 16, "Detect Environment", "");
        ui.show_error_block("uv sync", "boom", Some("check network"));

        assert_eq!(ui.steps(), [(2, 16, "Detect Environment".to_string())]);
        assert_eq!(ui.error_blocks()[0].2.as_deref(), Some("check network"));
    }
}
