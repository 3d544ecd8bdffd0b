//! Collection of operator-supplied configuration.

use regex::Regex;
use serde_json::{Map, Value};

use crate::config::InputConfig;
use crate::error::{Result, SetupError};
use crate::runner::CONFIG_KEY;
use crate::ui::{Prompt, PromptOption, PromptType};

use super::{StepBody, StepContext, StepOutcome};

/// Body of `collect_user_input`.
///
/// Prompts for every configured input. Defaults come from values already
/// collected, then detected suggestions, then the input's own default.
/// Answers that do not match the input's pattern are asked again.
#[derive(Debug, Clone, Copy)]
pub struct InputBody {
    /// Attempts per input before the step fails.
    pub max_attempts: usize,
}

impl Default for InputBody {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

impl StepBody for InputBody {
    fn execute(&self, ctx: &mut StepContext<'_>) -> Result<StepOutcome> {
        let mut collected = Map::new();

        let config = ctx.config;
        for input in &config.inputs {
            let pattern = compile(input)?;
            let default = [
                ctx.setup.get(&input.key),
                ctx.setup.suggestion(&input.key),
                input.default.as_deref(),
            ]
            .into_iter()
            .flatten()
            .find(|candidate| accepts(pattern.as_ref(), candidate))
            .map(String::from);

            let prompt = build_prompt(input, default);
            let Some(answer) = self.ask(ctx, input, &prompt, pattern.as_ref())? else {
                return Ok(StepOutcome::failed(format!(
                    "No valid value for {} after {} attempts",
                    input.key, self.max_attempts
                )));
            };

            ctx.setup.set(input.key.clone(), answer.clone());
            collected.insert(input.key.clone(), Value::String(answer));
        }

        Ok(StepOutcome::success().insert(CONFIG_KEY, collected))
    }
}

impl InputBody {
    fn ask(
        &self,
        ctx: &mut StepContext<'_>,
        input: &InputConfig,
        prompt: &Prompt,
        pattern: Option<&Regex>,
    ) -> Result<Option<String>> {
        for _ in 0..self.max_attempts {
            let answer = ctx.ui.prompt(prompt)?.as_string();
            let answer = answer.trim();
            if answer.is_empty() {
                ctx.ui.warning(&format!("{} is required", input.key));
                continue;
            }
            if !accepts(pattern, answer) {
                let hint = input
                    .hint
                    .clone()
                    .unwrap_or_else(|| format!("{} has an invalid format", input.key));
                ctx.ui.warning(&hint);
                continue;
            }
            return Ok(Some(answer.to_string()));
        }
        Ok(None)
    }
}

fn compile(input: &InputConfig) -> Result<Option<Regex>> {
    input
        .pattern
        .as_deref()
        .map(Regex::new)
        .transpose()
        .map_err(|e| SetupError::ConfigValidationError {
            message: format!("Invalid pattern for input '{}': {}", input.key, e),
        })
}

fn accepts(pattern: Option<&Regex>, value: &str) -> bool {
    !value.is_empty() && pattern.is_none_or(|re| re.is_match(value))
}

fn build_prompt(input: &InputConfig, default: Option<String>) -> Prompt {
    let prompt_type = if input.choices.is_empty() {
        PromptType::Input
    } else {
        PromptType::Select {
            options: input
                .choices
                .iter()
                .map(|choice| PromptOption {
                    label: choice.clone(),
                    value: choice.clone(),
                })
                .collect(),
        }
    };
    Prompt {
        key: input.key.clone(),
        question: input.question.clone(),
        prompt_type,
        default,
    }
}
