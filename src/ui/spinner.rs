//! Progress spinners.

use indicatif::{ProgressBar, ProgressStyle};
use std::collections::VecDeque;
use std::time::Duration;

use super::theme::SetupTheme;
use super::SpinnerHandle;

/// A progress spinner for long-running operations.
pub struct ProgressSpinner {
    bar: ProgressBar,
    theme: SetupTheme,
    base_message: String,
    tail: VecDeque<String>,
}

/// Number of live output lines shown under the spinner.
const TAIL_LINES: usize = 3;

/// Longest output line shown before truncation.
const MAX_LINE_WIDTH: usize = 72;

impl ProgressSpinner {
    /// Create a new spinner with a message.
    pub fn new(message: &str, theme: SetupTheme) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));

        Self {
            bar,
            theme,
            base_message: message.to_string(),
            tail: VecDeque::new(),
        }
    }

    /// Create a spinner that doesn't draw anything.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            theme: SetupTheme::plain(),
            base_message: String::new(),
            tail: VecDeque::new(),
        }
    }

    fn finish(&mut self, line: String) {
        self.bar.set_style(
            ProgressStyle::default_spinner()
                .template("{msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        self.bar.finish_with_message(line);
    }

    fn render(&self) -> String {
        let mut msg = self.base_message.clone();
        for line in &self.tail {
            msg.push_str("\n  ");
            msg.push_str(&self.theme.dim.apply_to(format!("» {}", line)).to_string());
        }
        msg
    }
}

/// Shorten a command output line for display under a spinner.
pub fn truncate_line(text: &str) -> String {
    let text = text.trim_end();
    if text.chars().count() > MAX_LINE_WIDTH {
        let cut: String = text.chars().take(MAX_LINE_WIDTH - 3).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

impl SpinnerHandle for ProgressSpinner {
    fn set_message(&mut self, msg: &str) {
        self.base_message = msg.to_string();
        self.bar.set_message(self.render());
    }

    fn output_line(&mut self, line: &str) {
        let line = truncate_line(line);
        if line.is_empty() {
            return;
        }
        self.tail.push_back(line);
        while self.tail.len() > TAIL_LINES {
            self.tail.pop_front();
        }
        self.bar.set_message(self.render());
    }

    fn finish_success(&mut self, msg: &str) {
        let line = self.theme.format_success(msg);
        self.finish(line);
    }

    fn finish_error(&mut self, msg: &str) {
        let line = self.theme.format_error(msg);
        self.finish(line);
    }

    fn finish_skipped(&mut self, msg: &str) {
        let line = self.theme.format_skipped(msg);
        self.finish(line);
    }
}
