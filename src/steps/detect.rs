//! Environment detection.
//!
//! Suggests values for configuration keys from the process environment
//! and from configured detection commands. Nothing here can fail the
//! step; a detector that errors simply suggests nothing.

use std::collections::BTreeMap;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::DetectConfig;
use crate::runner::SUGGESTIONS_KEY;
use crate::shell::{execute, CommandOptions};

use super::{StepBody, StepContext, StepOutcome};

/// Body of `detect_environment`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetectBody;

impl StepBody for DetectBody {
    fn execute(&self, ctx: &mut StepContext<'_>) -> crate::error::Result<StepOutcome> {
        let config = ctx.config;
        let mut suggestions = BTreeMap::new();

        let keys = config
            .inputs
            .iter()
            .map(|input| input.key.as_str())
            .chain(config.detect.keys().map(String::as_str));
        for key in keys {
            if suggestions.contains_key(key) {
                continue;
            }
            if let Some(value) = std::env::var(key).ok().filter(|v| !v.trim().is_empty()) {
                debug!("Detected {} from environment", key);
                suggestions.insert(key.to_string(), value);
            }
        }

        for (key, detector) in &config.detect {
            if suggestions.contains_key(key) {
                continue;
            }
            if ctx.dry_run {
                ctx.ui.message(&format!("Would run: {}", detector.run));
                continue;
            }
            let options = CommandOptions {
                cwd: Some(ctx.project_root.to_path_buf()),
                timeout: Some(30),
                ..Default::default()
            };
            if let Some(value) = run_detector(detector, &options) {
                debug!("Detected {} via '{}'", key, detector.run);
                suggestions.insert(key.clone(), value);
            }
        }

        for (key, value) in &suggestions {
            ctx.ui.message(&format!("Detected {}: {}", key, value));
            ctx.setup.suggest(key.clone(), value.clone());
        }
        if suggestions.is_empty() {
            ctx.ui.message("No existing configuration detected");
        }

        let suggestions: Map<String, Value> = suggestions
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        Ok(StepOutcome::success().insert(SUGGESTIONS_KEY, suggestions))
    }
}

fn run_detector(detector: &DetectConfig, options: &CommandOptions) -> Option<String> {
    let result = execute(&detector.run, options).ok()?;
    if !result.success {
        return None;
    }
    extract(&result.stdout, detector.pattern.as_deref())
}

/// Pick the suggested value out of a detector's output.
///
/// With a pattern, the first match wins, or its first capture group when
/// the pattern has one. Without, the first non-empty line.
fn extract(output: &str, pattern: Option<&str>) -> Option<String> {
    let value = match pattern {
        Some(pattern) => {
            let re = Regex::new(pattern).ok()?;
            let caps = re.captures(output)?;
            caps.get(1).or_else(|| caps.get(0))?.as_str().to_string()
        }
        None => output.lines().map(str::trim).find(|l| !l.is_empty())?.to_string(),
    };
    let value = value.trim().to_string();
    (!value.is_empty()).then_some(value)
}
