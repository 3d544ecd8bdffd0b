//! Environment file generation.

use std::collections::BTreeMap;

use crate::config::EnvFileWriter;

use super::{StepBody, StepContext, StepOutcome};

/// Body of `generate_env_file`.
///
/// Writes the configured defaults overlaid with every collected value.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvFileBody;

impl StepBody for EnvFileBody {
    fn execute(&self, ctx: &mut StepContext<'_>) -> crate::error::Result<StepOutcome> {
        let vars = env_vars(ctx);
        let path = ctx.project_path(&ctx.config.env_file);
        let display = ctx.config.env_file.display().to_string();

        if ctx.dry_run {
            ctx.ui.message(&format!(
                "Would write {} with {} variables: {}",
                display,
                vars.len(),
                vars.keys().cloned().collect::<Vec<_>>().join(", ")
            ));
            return Ok(StepOutcome::success().insert("env_file", display));
        }

        EnvFileWriter::write(&path, &vars)?;
        tracing::info!("Wrote {} variables to {}", vars.len(), path.display());
        ctx.ui.message(&format!("Wrote {}", display));

        let keys: Vec<_> = vars.into_keys().collect();
        Ok(StepOutcome::success()
            .insert("env_file", display)
            .insert("keys", keys))
    }
}

fn env_vars(ctx: &StepContext<'_>) -> BTreeMap<String, String> {
    let mut vars = ctx.config.defaults.clone();
    vars.extend(
        ctx.setup
            .config()
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.clone(), v.clone())),
    );
    vars
}
