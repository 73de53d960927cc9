//! The `generate` subcommand: run the artifact-generation strategies.

use crate::cli::{CliError, OkEnvelope, StrategyArg};
use dockforge_core::{MatrixConfig, VariantKey};
use dockforge_generate::{TemplateGenerator, TransformGenerator};
use std::path::Path;
use tracing::info;

/// Axis filters for the generate command.
#[derive(Debug, Clone, Default)]
pub struct GenerateFilter {
    /// Restrict to one runtime version.
    pub runtime: Option<String>,
    /// Restrict to one OS variant.
    pub variant: Option<String>,
}

impl GenerateFilter {
    fn matches(&self, key: &VariantKey) -> bool {
        self.runtime
            .as_deref()
            .is_none_or(|v| key.runtime_version.as_str() == v)
            && self
                .variant
                .as_deref()
                .is_none_or(|v| key.os_variant.as_str() == v)
    }
}

/// Generate the selected artifacts under `root`.
pub async fn execute(
    config: &MatrixConfig,
    root: &Path,
    filter: &GenerateFilter,
    strategy: StrategyArg,
    json_mode: bool,
) -> Result<(), CliError> {
    let transform = TransformGenerator::new();
    let template = TemplateGenerator::new();

    let mut written: Vec<String> = Vec::new();
    let mut matched = false;

    for key in config.matrix().enumerate() {
        if !filter.matches(&key) {
            continue;
        }
        matched = true;

        if strategy.includes_transform() {
            let path = transform.generate(config, root, &key).await?;
            written.push(path.display().to_string());
        }
        if strategy.includes_template() {
            let path = template.generate(config, root, &key)?;
            written.push(path.display().to_string());
        }
    }

    if !matched {
        return Err(CliError::config_with_help(
            "no matrix entry matches the given filters",
            "check --runtime and --variant against the configured axes",
        ));
    }

    info!(count = written.len(), "Generated artifacts");

    if json_mode {
        let envelope = OkEnvelope::new(serde_json::json!({ "written": written }));
        println!(
            "{}",
            serde_json::to_string(&envelope)
                .map_err(|e| CliError::run(format!("JSON serialization failed: {e}")))?
        );
    } else {
        for path in &written {
            println!("{path}");
        }
    }

    Ok(())
}
