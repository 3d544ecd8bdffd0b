//! Shared display helpers for step status formatting.
//!
//! Used by `status` and `steps` to render [`StepStatus`] values
//! consistently.

use crate::state::StepStatus;
use crate::ui::{StatusKind, UserInterface};

/// Return the icon string for a step status (TTY output).
pub fn status_icon(status: StepStatus) -> &'static str {
    StatusKind::from(status).icon()
}

/// Return a bracketed symbol for a step status (non-TTY output).
pub fn status_symbol(status: StepStatus) -> &'static str {
    StatusKind::from(status).bracketed()
}

/// Print a single step's status line, styled by severity.
pub fn show_step_status(ui: &mut dyn UserInterface, name: &str, status: StepStatus) {
    let line = format!("  {} {}", status_icon(status), name);
    match status {
        StepStatus::Completed => ui.success(&line),
        StepStatus::Failed => ui.error(&line),
        StepStatus::Skipped | StepStatus::InProgress => ui.warning(&line),
        StepStatus::Pending => ui.message(&line),
    }
}
