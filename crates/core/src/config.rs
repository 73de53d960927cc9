//! Matrix configuration: axes, registry coordinates and collaborator paths.
//!
//! The configuration is fully defaulted; a JSON file can override any subset
//! of fields. Validation happens at load time so that axis/lookup mismatches
//! fail before any target runs.

use crate::errors::{Error, Result};
use crate::matrix::{OsVariant, RuntimeVersion, VariantKey, VariantMatrix};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::debug;

/// Registry coordinates of the produced images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageCoordinates {
    /// Registry host.
    pub registry: String,
    /// Namespace under the registry.
    pub namespace: String,
    /// Image name.
    pub name: String,
}

impl ImageCoordinates {
    /// The repository part of a tag: `{registry}/{namespace}/{name}`.
    #[must_use]
    pub fn repository(&self) -> String {
        format!("{}/{}/{}", self.registry, self.namespace, self.name)
    }
}

impl Default for ImageCoordinates {
    fn default() -> Self {
        Self {
            registry: "registry.example.com".to_string(),
            namespace: "ci".to_string(),
            name: "python".to_string(),
        }
    }
}

/// Full matrix configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct MatrixConfig {
    /// Registry coordinates for built images.
    pub image: ImageCoordinates,
    /// The OS-variant axis, in listing order.
    pub os_variants: Vec<OsVariant>,
    /// The runtime-version axis, in listing order.
    pub runtime_versions: Vec<RuntimeVersion>,
    /// The runtime version that additionally receives the `latest` tag.
    pub latest_version: RuntimeVersion,
    /// Upstream source identifier per OS variant.
    pub source_for_variant: BTreeMap<String, String>,
    /// Base URL of the upstream document tree.
    pub upstream_base_url: String,
    /// Template source for the s6 config artifact, relative to the root.
    pub template_path: String,
    /// Two-tier variable document for the template, relative to the root.
    pub vars_path: String,
    /// Build context directory for s6 image builds.
    pub s6_context: String,
    /// Command run inside the image as the smoke test.
    pub smoke_command: Vec<String>,
    /// Remote scan server consulted in CI contexts.
    pub scan_server: String,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            image: ImageCoordinates::default(),
            os_variants: vec!["jammy".into(), "slim-jammy".into()],
            runtime_versions: vec![
                "3.7".into(),
                "3.8".into(),
                "3.9".into(),
                "3.10".into(),
                "3.11-rc".into(),
            ],
            latest_version: "3.10".into(),
            source_for_variant: BTreeMap::from([
                ("jammy".to_string(), "bullseye".to_string()),
                ("slim-jammy".to_string(), "slim-bullseye".to_string()),
            ]),
            upstream_base_url: "https://raw.githubusercontent.com/docker-library/python/master"
                .to_string(),
            template_path: "s6-Dockerfile.jinja".to_string(),
            vars_path: "s6-vars.json".to_string(),
            s6_context: "s6-context".to_string(),
            smoke_command: vec!["python".to_string(), "--version".to_string()],
            scan_server: "http://trivy.service.consul".to_string(),
        }
    }
}

impl MatrixConfig {
    /// Load the configuration from a JSON file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::io(e, Some(path.to_path_buf()), "reading configuration"))?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            Error::serialization(format!("invalid configuration {}: {e}", path.display()))
        })?;
        config.validate()?;
        debug!(path = %path.display(), "Loaded matrix configuration");
        Ok(config)
    }

    /// Validate axis and lookup-table consistency.
    ///
    /// # Errors
    ///
    /// Returns an error if an OS variant lacks an upstream source mapping,
    /// if the latest version is not a member of the runtime-version axis, or
    /// if either axis contains duplicates.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for osv in &self.os_variants {
            if !seen.insert(osv.as_str()) {
                return Err(Error::DuplicateAxisValue {
                    value: osv.as_str().to_string(),
                });
            }
            if !self.source_for_variant.contains_key(osv.as_str()) {
                return Err(Error::missing_source_mapping(osv.as_str()));
            }
        }

        let mut seen = HashSet::new();
        for ver in &self.runtime_versions {
            if !seen.insert(ver.as_str()) {
                return Err(Error::DuplicateAxisValue {
                    value: ver.as_str().to_string(),
                });
            }
        }

        if !self.runtime_versions.contains(&self.latest_version) {
            return Err(Error::UnknownLatestVersion {
                version: self.latest_version.as_str().to_string(),
            });
        }

        Ok(())
    }

    /// The variant matrix spanned by this configuration.
    #[must_use]
    pub fn matrix(&self) -> VariantMatrix {
        VariantMatrix::new(self.os_variants.clone(), self.runtime_versions.clone())
    }

    /// Upstream source identifier for an OS variant.
    pub fn source_for(&self, os_variant: &OsVariant) -> Result<&str> {
        self.source_for_variant
            .get(os_variant.as_str())
            .map(String::as_str)
            .ok_or_else(|| Error::missing_source_mapping(os_variant.as_str()))
    }

    /// URL of the upstream document for one variant key.
    pub fn source_url(&self, key: &VariantKey) -> Result<String> {
        let source = self.source_for(&key.os_variant)?;
        Ok(format!(
            "{}/{}/{}/Dockerfile",
            self.upstream_base_url, key.runtime_version, source
        ))
    }

    /// Whether a runtime version is the designated latest one.
    #[must_use]
    pub fn is_latest(&self, version: &RuntimeVersion) -> bool {
        *version == self.latest_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = MatrixConfig::default();
        config.validate().unwrap();
        assert_eq!(config.matrix().len(), 10);
    }

    #[test]
    fn test_missing_source_mapping_rejected() {
        let mut config = MatrixConfig::default();
        config.os_variants.push("noble".into());
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::MissingSourceMapping { os_variant } if os_variant == "noble"));
    }

    #[test]
    fn test_unknown_latest_rejected() {
        let mut config = MatrixConfig::default();
        config.latest_version = "4.0".into();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::UnknownLatestVersion { version } if version == "4.0"));
    }

    #[test]
    fn test_duplicate_axis_value_rejected() {
        let mut config = MatrixConfig::default();
        config.runtime_versions.push("3.9".into());
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::DuplicateAxisValue { value } if value == "3.9"));
    }

    #[test]
    fn test_source_url() {
        let config = MatrixConfig::default();
        let key = VariantKey::new("slim-jammy", "3.10");
        assert_eq!(
            config.source_url(&key).unwrap(),
            "https://raw.githubusercontent.com/docker-library/python/master/3.10/slim-bullseye/Dockerfile"
        );
    }

    #[test]
    fn test_partial_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matrix.json");
        std::fs::write(
            &path,
            r#"{"image": {"registry": "registry.corp.internal", "namespace": "images", "name": "python"}}"#,
        )
        .unwrap();

        let config = MatrixConfig::load(&path).unwrap();
        assert_eq!(config.image.registry, "registry.corp.internal");
        // Untouched fields keep their defaults.
        assert_eq!(config.latest_version.as_str(), "3.10");
        assert_eq!(config.os_variants.len(), 2);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matrix.json");
        std::fs::write(&path, r#"{"latest_version": "9.9"}"#).unwrap();

        let err = MatrixConfig::load(&path).unwrap_err();
        assert!(matches!(err, Error::UnknownLatestVersion { .. }));
    }
}
