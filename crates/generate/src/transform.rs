//! Transform strategy: fetch an upstream document and patch its base image.
//!
//! The upstream project publishes Dockerfiles against Debian bases. This
//! strategy rewrites the `FROM` line for the target OS variant and refuses
//! to continue when the expected line is not found, since a silent no-op
//! would ship an unpatched artifact.

use crate::error::{Error, Result};
use crate::write::write_artifact;
use dockforge_core::{MatrixConfig, OsVariant, TargetIdentity, TargetKind, VariantKey};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Generator for the patched-upstream configuration artifact.
pub struct TransformGenerator {
    client: Client,
}

impl Default for TransformGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformGenerator {
    /// Create a new transform generator.
    ///
    /// # Panics
    ///
    /// `reqwest::Client::builder().build()` only fails on broken TLS backend
    /// initialization, which with default settings indicates a fundamental
    /// environment issue; panicking is acceptable there.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .user_agent("dockforge")
                .build()
                .expect("failed to create HTTP client - TLS backend initialization failed"),
        }
    }

    /// Fetch, patch and write the artifact for one variant key.
    ///
    /// Returns the path of the written artifact.
    pub async fn generate(
        &self,
        config: &MatrixConfig,
        root: &Path,
        key: &VariantKey,
    ) -> Result<PathBuf> {
        let url = config.source_url(key)?;
        let source_id = config.source_for(&key.os_variant)?.to_string();

        let original = self.fetch(&url).await?;
        let patched = patch(&key.os_variant, &source_id, &original)?;

        let identity = TargetIdentity::new(key.clone(), TargetKind::ConfigTransform);
        let path = write_artifact(root, &identity.basename(), &patched)?;
        info!(target = %identity.basename(), %url, "Generated patched artifact");
        Ok(path)
    }

    /// Fetch the upstream document body.
    async fn fetch(&self, url: &str) -> Result<String> {
        debug!(%url, "Fetching upstream document");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::fetch(url, e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::fetch(url, format!("HTTP {}", response.status())));
        }

        response
            .text()
            .await
            .map_err(|e| Error::fetch(url, e.to_string()))
    }
}

/// Apply the base-image substitution for one OS variant.
///
/// Slim variants: the upstream `FROM` line writes the source identifier with
/// its hyphenated components reversed (`slim-bullseye` appears as
/// `bullseye-slim`); that reference is swapped for an `ubuntu` image named
/// after the variant's release. Non-slim variants: the shared
/// `buildpack-deps` reference is re-pointed from the source identifier to
/// the variant itself.
///
/// # Errors
///
/// Returns [`Error::PatchUnmatched`] when the substitution changes nothing,
/// which also makes re-patching an already-patched document an error.
pub fn patch(os_variant: &OsVariant, source_id: &str, original: &str) -> Result<String> {
    let (needle, replacement) = if os_variant.is_slim() {
        (
            format!("FROM debian:{}", reverse_hyphenated(source_id)),
            format!("FROM ubuntu:{}", os_variant.release()),
        )
    } else {
        (
            format!("FROM buildpack-deps:{source_id}"),
            format!("FROM buildpack-deps:{os_variant}"),
        )
    };

    let patched = original.replace(&needle, &replacement);
    if patched == original {
        return Err(Error::patch_unmatched(needle));
    }

    debug!(%needle, %replacement, "Patched base image reference");
    Ok(patched)
}

/// Reverse the hyphen-separated components of a string.
fn reverse_hyphenated(s: &str) -> String {
    s.split('-').rev().collect::<Vec<_>>().join("-")
}
