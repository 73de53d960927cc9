//! Template strategy: render the fixed template against layered variables.
//!
//! Variables come from a two-tier document: a `global` tier plus one tier
//! per base subtag, with the subtag tier taking precedence. Rendering is
//! strict: a variable referenced by the template but absent from both tiers
//! is an error, never a silent blank.

use crate::error::{Error, Result};
use crate::write::write_artifact;
use dockforge_core::{MatrixConfig, TargetIdentity, TargetKind, VariantKey};
use minijinja::{Environment, UndefinedBehavior};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Admonition line prepended to every rendered artifact.
pub const ADMONITION: &str = "## THIS FILE IS GENERATED - DO NOT EDIT BY HAND";

/// The two-tier variable document backing template rendering.
#[derive(Debug, Clone, Deserialize)]
pub struct VariableDocument {
    global: BTreeMap<String, serde_json::Value>,
    #[serde(flatten)]
    tiers: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
}

impl VariableDocument {
    /// Parse a variable document from JSON text.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| Error::VarsParse {
            message: e.to_string(),
        })
    }

    /// Load a variable document from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::io(e, Some(path.to_path_buf()), "reading variable document"))?;
        Self::from_json(&raw)
    }

    /// Resolve the effective mapping for one subtag.
    ///
    /// The subtag tier overrides the global tier key by key. A subtag with
    /// no tier in the document is an error: every variant the matrix knows
    /// about must be described.
    pub fn resolve(&self, subtag: &str) -> Result<BTreeMap<String, serde_json::Value>> {
        let tier = self
            .tiers
            .get(subtag)
            .ok_or_else(|| Error::missing_variable_tier(subtag))?;

        let mut merged = self.global.clone();
        merged.extend(tier.clone());
        Ok(merged)
    }
}

/// Render template source with strict undefined-variable checking.
///
/// A trailing newline in the template is preserved in the output.
pub fn render(source: &str, vars: &BTreeMap<String, serde_json::Value>) -> Result<String> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_keep_trailing_newline(true);
    Ok(env.render_str(source, vars)?)
}

/// Generator for the template-rendered configuration artifact.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateGenerator;

impl TemplateGenerator {
    /// Create a new template generator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Render and write the artifact for one variant key.
    ///
    /// Returns the path of the written artifact.
    pub fn generate(
        &self,
        config: &MatrixConfig,
        root: &Path,
        key: &VariantKey,
    ) -> Result<PathBuf> {
        let template_path = root.join(&config.template_path);
        let source = std::fs::read_to_string(&template_path)
            .map_err(|e| Error::io(e, Some(template_path.clone()), "reading template"))?;

        let document = VariableDocument::load(&root.join(&config.vars_path))?;
        let vars = document.resolve(&key.base_subtag())?;

        let rendered = render(&source, &vars)?;
        let output = format!("{ADMONITION}\n{rendered}");

        let identity = TargetIdentity::new(key.clone(), TargetKind::ConfigTemplate);
        let path = write_artifact(root, &identity.basename(), &output)?;
        info!(target = %identity.basename(), "Generated templated artifact");
        Ok(path)
    }
}
