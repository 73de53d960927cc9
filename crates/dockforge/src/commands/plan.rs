//! The `plan` subcommand: assemble and emit the build-matrix plan.

use crate::cli::{CliError, OkEnvelope};
use dockforge_core::{BuildContext, MatrixConfig};
use dockforge_plan::Planner;
use std::path::Path;
use tracing::info;

/// Assemble the plan and write it to stdout or a file.
pub fn execute(
    config: &MatrixConfig,
    output: Option<&Path>,
    json_mode: bool,
) -> Result<(), CliError> {
    let context = BuildContext::from_env();
    let plan = Planner::new(config, &context).plan()?;
    let rendered = plan.to_json()?;

    match output {
        Some(path) => {
            std::fs::write(path, &rendered).map_err(|e| {
                CliError::run(format!("failed to write plan to {}: {e}", path.display()))
            })?;
            info!(path = %path.display(), targets = plan.targets.len(), "Wrote plan");
            if json_mode {
                let envelope = OkEnvelope::new(serde_json::json!({
                    "path": path.display().to_string(),
                    "targets": plan.targets.len(),
                }));
                println!(
                    "{}",
                    serde_json::to_string(&envelope)
                        .map_err(|e| CliError::run(format!("JSON serialization failed: {e}")))?
                );
            } else {
                println!("wrote plan with {} targets to {}", plan.targets.len(), path.display());
            }
        }
        None => {
            // The plan itself is the JSON payload; no envelope needed.
            println!("{rendered}");
        }
    }

    Ok(())
}
