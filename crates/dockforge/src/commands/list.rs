//! The `list` subcommand: every target and shortcut basename.

use crate::cli::{CliError, OkEnvelope};
use dockforge_core::{MatrixConfig, TargetIdentity, TargetKind};

/// Collect every basename in plan order.
#[must_use]
pub fn target_names(config: &MatrixConfig) -> Vec<String> {
    let mut names = Vec::new();
    for key in config.matrix().enumerate() {
        for kind in TargetKind::ALL {
            names.push(TargetIdentity::new(key.clone(), kind).basename());
        }
        names.push(key.subdir());
        names.push(format!("test-{}", key.subdir()));
    }
    names
}

/// Print the target listing.
pub fn execute(config: &MatrixConfig, json_mode: bool) -> Result<(), CliError> {
    let names = target_names(config);

    if json_mode {
        let envelope = OkEnvelope::new(serde_json::json!({ "targets": names }));
        println!(
            "{}",
            serde_json::to_string(&envelope)
                .map_err(|e| CliError::run(format!("JSON serialization failed: {e}")))?
        );
    } else {
        for name in &names {
            println!("{name}");
        }
    }

    Ok(())
}
