//! Build-matrix axes and variant enumeration.
//!
//! The matrix has two independent axes: an OS variant (e.g. `jammy`,
//! `slim-jammy`) and a runtime version (e.g. `3.10`). One concrete
//! combination of both axes is a [`VariantKey`], the join key used by every
//! target kind in the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One value of the OS-variant axis.
///
/// A variant is "slim" when its name carries the `slim` marker, which
/// selects the slim patch rule and appends `-slim` to image subtags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OsVariant(String);

impl OsVariant {
    /// Create a new OS variant value.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The variant name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this variant is a slim flavor.
    #[must_use]
    pub fn is_slim(&self) -> bool {
        self.0.contains("slim")
    }

    /// The trailing hyphen-separated component of the variant name.
    ///
    /// For `slim-jammy` this is `jammy`; for `jammy` it is the whole name.
    /// Slim variants use this as the release of the replacement base image.
    #[must_use]
    pub fn release(&self) -> &str {
        self.0.rsplit('-').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for OsVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OsVariant {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// One value of the runtime-version axis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuntimeVersion(String);

impl RuntimeVersion {
    /// Create a new runtime version value.
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    /// The version as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuntimeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RuntimeVersion {
    fn from(version: &str) -> Self {
        Self::new(version)
    }
}

/// One concrete combination of both axes: a single pipeline instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantKey {
    /// The OS-variant axis value.
    pub os_variant: OsVariant,
    /// The runtime-version axis value.
    pub runtime_version: RuntimeVersion,
}

impl VariantKey {
    /// Create a key from both axis values.
    pub fn new(os_variant: impl Into<OsVariant>, runtime_version: impl Into<RuntimeVersion>) -> Self {
        Self {
            os_variant: os_variant.into(),
            runtime_version: runtime_version.into(),
        }
    }

    /// Subdirectory holding every artifact of this variant:
    /// `{runtime_version}/{os_variant}`.
    #[must_use]
    pub fn subdir(&self) -> String {
        format!("{}/{}", self.runtime_version, self.os_variant)
    }

    /// The base registry subtag: the runtime version, with `-slim` appended
    /// for slim OS variants.
    ///
    /// `3.8`, `3.9-slim`, `3.11-rc-slim` and so on; just the part past the
    /// colon of a full tag. Kind-specific suffixes are applied on top by
    /// [`crate::identity::TargetIdentity`].
    #[must_use]
    pub fn base_subtag(&self) -> String {
        if self.os_variant.is_slim() {
            format!("{}-slim", self.runtime_version)
        } else {
            self.runtime_version.as_str().to_string()
        }
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.runtime_version, self.os_variant)
    }
}

/// The full cross product of both axes.
#[derive(Debug, Clone)]
pub struct VariantMatrix {
    os_variants: Vec<OsVariant>,
    runtime_versions: Vec<RuntimeVersion>,
}

impl VariantMatrix {
    /// Create a matrix from both axis sets.
    #[must_use]
    pub fn new(os_variants: Vec<OsVariant>, runtime_versions: Vec<RuntimeVersion>) -> Self {
        Self {
            os_variants,
            runtime_versions,
        }
    }

    /// Enumerate every variant key in a stable order.
    ///
    /// OS variant is the outer axis and runtime version the inner one, both
    /// in configured order. This order determines task listing order for
    /// humans, so it must not change between runs.
    pub fn enumerate(&self) -> impl Iterator<Item = VariantKey> + '_ {
        self.os_variants.iter().flat_map(move |osv| {
            self.runtime_versions
                .iter()
                .map(move |ver| VariantKey::new(osv.clone(), ver.clone()))
        })
    }

    /// Number of variant keys in the matrix.
    #[must_use]
    pub fn len(&self) -> usize {
        self.os_variants.len() * self.runtime_versions.len()
    }

    /// Whether the matrix is empty (either axis has no values).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.os_variants.is_empty() || self.runtime_versions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> VariantMatrix {
        VariantMatrix::new(
            vec!["jammy".into(), "slim-jammy".into()],
            vec!["3.9".into(), "3.10".into()],
        )
    }

    #[test]
    fn test_cross_product_size() {
        let m = matrix();
        assert_eq!(m.len(), 4);
        assert_eq!(m.enumerate().count(), 4);
        assert!(!m.is_empty());
    }

    #[test]
    fn test_enumeration_order_is_stable() {
        let keys: Vec<String> = matrix().enumerate().map(|k| k.to_string()).collect();
        assert_eq!(
            keys,
            vec!["3.9/jammy", "3.10/jammy", "3.9/slim-jammy", "3.10/slim-jammy"]
        );
    }

    #[test]
    fn test_slim_detection() {
        assert!(OsVariant::new("slim-jammy").is_slim());
        assert!(!OsVariant::new("jammy").is_slim());
    }

    #[test]
    fn test_release_component() {
        assert_eq!(OsVariant::new("slim-jammy").release(), "jammy");
        assert_eq!(OsVariant::new("jammy").release(), "jammy");
    }

    #[test]
    fn test_base_subtag() {
        let slim = VariantKey::new("slim-jammy", "3.10");
        assert_eq!(slim.base_subtag(), "3.10-slim");

        let full = VariantKey::new("jammy", "3.11-rc");
        assert_eq!(full.base_subtag(), "3.11-rc");
    }

    #[test]
    fn test_subdir() {
        let key = VariantKey::new("jammy", "3.9");
        assert_eq!(key.subdir(), "3.9/jammy");
    }
}
