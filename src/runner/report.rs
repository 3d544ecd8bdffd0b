//! Read-only progress reporting.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::state::{ResultData, StepStatus};
use crate::ui::{format_duration, StatusKind};

use super::tracker::ProgressTracker;

/// Per-status step counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProgressSummary {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub pending: usize,
    pub in_progress: usize,
}

impl ProgressSummary {
    /// Completed steps as a percentage of all steps.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }

    /// One-line summary, e.g. `3/16 completed, 1 failed`.
    pub fn line(&self) -> String {
        let mut line = format!("{}/{} completed", self.completed, self.total);
        if self.failed > 0 {
            let _ = write!(line, ", {} failed", self.failed);
        }
        if self.skipped > 0 {
            let _ = write!(line, ", {} skipped", self.skipped);
        }
        line
    }
}

/// Serializable view of one step, for `status --json`.
#[derive(Debug, Clone, Serialize)]
pub struct StepSnapshot {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: StepStatus,
    pub dependencies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_data: Option<ResultData>,
}

/// Serializable view of the whole workflow.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressSnapshot {
    pub session_id: String,
    pub last_updated: Option<DateTime<Utc>>,
    pub state_file: String,
    pub complete: bool,
    pub next_step: Option<String>,
    pub summary: ProgressSummary,
    pub steps: Vec<StepSnapshot>,
}

impl ProgressTracker {
    /// Count steps by status.
    pub fn summary(&self) -> ProgressSummary {
        let mut summary = ProgressSummary {
            total: self.table().len(),
            ..Default::default()
        };
        for id in self.table().ids() {
            match self.status(id).unwrap_or_default() {
                StepStatus::Pending => summary.pending += 1,
                StepStatus::InProgress => summary.in_progress += 1,
                StepStatus::Completed => summary.completed += 1,
                StepStatus::Failed => summary.failed += 1,
                StepStatus::Skipped => summary.skipped += 1,
            }
        }
        summary
    }

    /// Human-readable per-step progress.
    pub fn detailed_report(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Detailed Setup Progress");
        let _ = writeln!(out, "{}", "=".repeat(50));

        for def in self.table().iter() {
            let Some(step) = self.step(&def.id) else {
                continue;
            };
            let _ = writeln!(out, "{} {}", StatusKind::from(step.status).icon(), def.name);
            let _ = writeln!(out, "    {}", def.description);

            match step.status {
                StepStatus::Completed => {
                    if let Some(duration) = step.duration() {
                        let _ = writeln!(out, "    Duration: {}", format_duration(duration));
                    }
                }
                StepStatus::Failed | StepStatus::Skipped => {
                    if let Some(message) = &step.error_message {
                        let label = if step.status == StepStatus::Failed {
                            "Error: "
                        } else {
                            ""
                        };
                        let _ = writeln!(out, "    {}{}", label, message);
                    }
                }
                StepStatus::Pending | StepStatus::InProgress => {}
            }
            out.push('\n');
        }

        let _ = write!(out, "Progress: {}", self.summary().line());
        out
    }

    /// Render the exportable report.
    pub fn render_report(&self) -> String {
        let summary = self.summary();
        let mut out = String::new();

        let _ = writeln!(out, "Setup Progress Report");
        let _ = writeln!(out, "{}", "=".repeat(40));
        let _ = writeln!(out, "Session ID: {}", self.state().session_id);
        let _ = writeln!(out, "Generated: {}", Local::now().to_rfc3339());
        let _ = writeln!(out);

        let _ = writeln!(out, "Summary:");
        let _ = writeln!(out, "  Total Steps: {}", summary.total);
        let _ = writeln!(out, "  Completed: {}", summary.completed);
        let _ = writeln!(out, "  Failed: {}", summary.failed);
        let _ = writeln!(out, "  Skipped: {}", summary.skipped);
        let _ = writeln!(out, "  Success Rate: {:.1}%", summary.success_rate());
        let _ = writeln!(out);

        let _ = writeln!(out, "Detailed Steps:");
        for def in self.table().iter() {
            let Some(step) = self.step(&def.id) else {
                continue;
            };
            let _ = writeln!(out, "  {} ({})", def.name, step.status);
            if let Some(duration) = step.duration() {
                let _ = writeln!(out, "    Duration: {}", format_duration(duration));
            }
            if let Some(message) = &step.error_message {
                let _ = writeln!(out, "    Error: {}", message);
            }
        }

        out
    }

    /// Write the report to `destination` and return its content.
    pub fn export_report(&self, destination: &Path) -> Result<String> {
        let content = self.render_report();
        if let Some(dir) = destination.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        fs::write(destination, &content)?;
        tracing::info!("Progress report saved to {}", destination.display());
        Ok(content)
    }

    /// Snapshot for machine-readable output.
    pub fn snapshot(&self) -> ProgressSnapshot {
        let steps = self
            .table()
            .iter()
            .map(|def| {
                let state = self.step(&def.id).cloned().unwrap_or_default();
                StepSnapshot {
                    id: def.id.clone(),
                    name: def.name.clone(),
                    description: def.description.clone(),
                    status: state.status,
                    dependencies: def.dependencies.clone(),
                    start_time: state.start_time,
                    end_time: state.end_time,
                    duration_ms: state.duration_ms,
                    error_message: state.error_message,
                    result_data: state.result_data,
                }
            })
            .collect();

        ProgressSnapshot {
            session_id: self.state().session_id.clone(),
            last_updated: self.state().last_updated,
            state_file: self.location(),
            complete: self.is_complete(),
            next_step: self.next_eligible_step().map(str::to_string),
            summary: self.summary(),
            steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::runner::{ProgressTracker, StepDefinition, StepTable};
    use crate::state::{MemoryBackend, ResultData};
    use tempfile::TempDir;

    fn tracker() -> ProgressTracker {
        let table = StepTable::from_definitions([
            StepDefinition::new("validate", "Validate", "Check inputs"),
            StepDefinition::new("configure", "Configure", "Write config").depends_on(["validate"]),
            StepDefinition::new("deploy", "Deploy", "Ship it").depends_on(["configure"]),
            StepDefinition::new("notify", "Notify", "Tell people"),
        ])
        .unwrap();
        ProgressTracker::open(table, MemoryBackend::new())
    }

    #[test]
    fn summary_counts_statuses() {
        let mut t = tracker();
        t.start("validate").unwrap();
        t.complete("validate", ResultData::new()).unwrap();
        t.start("configure").unwrap();
        t.fail("configure", "bad input").unwrap();
        t.skip("notify", "quiet mode").unwrap();

        let s = t.summary();
        assert_eq!(s.total, 4);
        assert_eq!(s.completed, 1);
        assert_eq!(s.failed, 1);
        assert_eq!(s.skipped, 1);
        assert_eq!(s.pending, 1);
        assert_eq!(s.in_progress, 0);
        assert_eq!(s.success_rate(), 25.0);
        assert_eq!(s.line(), "1/4 completed, 1 failed, 1 skipped");
    }

    #[test]
    fn empty_summary_has_zero_rate() {
        assert_eq!(super::ProgressSummary::default().success_rate(), 0.0);
    }

    #[test]
    fn detailed_report_shows_errors_and_reasons() {
        let mut t = tracker();
        t.start("validate").unwrap();
        t.fail("validate", "missing tool").unwrap();
        t.skip("notify", "quiet mode").unwrap();

        let report = t.detailed_report();
        assert!(report.contains("✗ Validate"));
        assert!(report.contains("Error: missing tool"));
        assert!(report.contains("Skipped: quiet mode"));
        assert!(report.contains("◌ Deploy"));
        assert!(report.ends_with("Progress: 0/4 completed, 1 failed, 1 skipped"));
    }

    #[test]
    fn export_writes_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("reports").join("progress.txt");
        let mut t = tracker();
        t.start("validate").unwrap();
        t.complete("validate", ResultData::new()).unwrap();

        let content = t.export_report(&path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
        assert!(content.contains("Total Steps: 4"));
        assert!(content.contains("Success Rate: 25.0%"));
        assert!(content.contains("  Validate (completed)"));
        assert!(content.contains("  Deploy (pending)"));
    }

    #[test]
    fn snapshot_serializes() {
        let mut t = tracker();
        t.skip("validate", "done elsewhere").unwrap();

        let json = serde_json::to_value(t.snapshot()).unwrap();
        assert_eq!(json["next_step"], "configure");
        assert_eq!(json["summary"]["skipped"], 1);
        assert_eq!(json["steps"][0]["status"], "skipped");
        assert!(json["steps"][1].get("error_message").is_none());
    }
}
