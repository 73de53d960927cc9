//! Target identity: basenames, subtags and full registry tags.
//!
//! A target is one (variant key, kind) pair. Its basename doubles as the
//! task key for the external engine and as the on-disk artifact path, so it
//! must be unique across the whole matrix.

use crate::config::ImageCoordinates;
use crate::matrix::VariantKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Image flavor: the plain base image or the s6-overlay variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    /// Plain base image.
    Base,
    /// Image with the s6 process supervisor baked in.
    S6,
}

/// The kind of a target, dispatched through a single resolver rather than a
/// subclass chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetKind {
    /// Configuration artifact produced by patching an upstream document.
    ConfigTransform,
    /// Configuration artifact produced by rendering the fixed template.
    ConfigTemplate,
    /// Image build target.
    Build {
        /// Which image flavor to build.
        flavor: Flavor,
    },
    /// Image verification target.
    Test {
        /// Which image flavor to verify.
        flavor: Flavor,
    },
}

impl TargetKind {
    /// Every target kind, in pipeline order.
    pub const ALL: [TargetKind; 6] = [
        TargetKind::ConfigTransform,
        TargetKind::ConfigTemplate,
        TargetKind::Build {
            flavor: Flavor::Base,
        },
        TargetKind::Build { flavor: Flavor::S6 },
        TargetKind::Test {
            flavor: Flavor::Base,
        },
        TargetKind::Test { flavor: Flavor::S6 },
    ];

    /// The basename suffix for this kind.
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            TargetKind::ConfigTransform => "Dockerfile",
            TargetKind::ConfigTemplate => "with-s6.Dockerfile",
            TargetKind::Build {
                flavor: Flavor::Base,
            } => "Dockerimage",
            TargetKind::Build { flavor: Flavor::S6 } => "with-s6.Dockerimage",
            TargetKind::Test {
                flavor: Flavor::Base,
            } => "Dockerimage.test",
            TargetKind::Test { flavor: Flavor::S6 } => "with-s6.Dockerimage.test",
        }
    }

    /// Whether this kind tags its image with an `-s6` subtag suffix.
    ///
    /// Only build and test kinds carry the suffix; the template config
    /// artifact uses the base subtag even though it feeds the s6 build.
    #[must_use]
    pub fn is_s6_tagged(self) -> bool {
        matches!(
            self,
            TargetKind::Build { flavor: Flavor::S6 } | TargetKind::Test { flavor: Flavor::S6 }
        )
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Identity of one target: a variant key plus a target kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetIdentity {
    /// The variant this target belongs to.
    pub key: VariantKey,
    /// The target kind.
    pub kind: TargetKind,
}

impl TargetIdentity {
    /// Create an identity for a (variant, kind) pair.
    #[must_use]
    pub fn new(key: VariantKey, kind: TargetKind) -> Self {
        Self { key, kind }
    }

    /// The unique task/output identifier: `{runtime}/{variant}/{suffix}`.
    ///
    /// Injective over (variant key, kind): no two distinct targets share a
    /// basename.
    #[must_use]
    pub fn basename(&self) -> String {
        format!("{}/{}", self.key.subdir(), self.kind.suffix())
    }

    /// The registry subtag for this target's image.
    ///
    /// The base subtag (`3.10`, `3.10-slim`, ...) with `-s6` appended for
    /// s6-flavored build/test kinds. The suffix never leaks into basenames.
    #[must_use]
    pub fn subtag(&self) -> String {
        let mut subtag = self.key.base_subtag();
        if self.kind.is_s6_tagged() {
            subtag.push_str("-s6");
        }
        subtag
    }

    /// The full registry tag: `{registry}/{namespace}/{name}:{subtag}`.
    #[must_use]
    pub fn full_tag(&self, image: &ImageCoordinates) -> String {
        format!("{}:{}", image.repository(), self.subtag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::VariantMatrix;
    use std::collections::HashSet;

    fn image() -> ImageCoordinates {
        ImageCoordinates {
            registry: "registry.example.com".to_string(),
            namespace: "ci".to_string(),
            name: "python".to_string(),
        }
    }

    #[test]
    fn test_basenames_unique_across_matrix() {
        let matrix = VariantMatrix::new(
            vec!["jammy".into(), "slim-jammy".into()],
            vec!["3.7".into(), "3.8".into(), "3.9".into(), "3.10".into(), "3.11-rc".into()],
        );

        let mut seen = HashSet::new();
        for key in matrix.enumerate() {
            for kind in TargetKind::ALL {
                let basename = TargetIdentity::new(key.clone(), kind).basename();
                assert!(seen.insert(basename.clone()), "duplicate basename {basename}");
            }
        }
        assert_eq!(seen.len(), 2 * 5 * 6);
    }

    #[test]
    fn test_basename_shapes() {
        let key = VariantKey::new("jammy", "3.10");
        let id = TargetIdentity::new(key.clone(), TargetKind::ConfigTransform);
        assert_eq!(id.basename(), "3.10/jammy/Dockerfile");

        let id = TargetIdentity::new(key, TargetKind::Test { flavor: Flavor::S6 });
        assert_eq!(id.basename(), "3.10/jammy/with-s6.Dockerimage.test");
    }

    #[test]
    fn test_subtag_slim_marker() {
        let key = VariantKey::new("slim-jammy", "3.10");
        let id = TargetIdentity::new(
            key,
            TargetKind::Build {
                flavor: Flavor::Base,
            },
        );
        assert_eq!(id.subtag(), "3.10-slim");
    }

    #[test]
    fn test_subtag_s6_suffix_only_on_build_and_test() {
        let key = VariantKey::new("slim-jammy", "3.9");

        let build = TargetIdentity::new(key.clone(), TargetKind::Build { flavor: Flavor::S6 });
        assert_eq!(build.subtag(), "3.9-slim-s6");

        let test = TargetIdentity::new(key.clone(), TargetKind::Test { flavor: Flavor::S6 });
        assert_eq!(test.subtag(), "3.9-slim-s6");

        // The template artifact feeds the s6 build but keeps the base subtag.
        let template = TargetIdentity::new(key, TargetKind::ConfigTemplate);
        assert_eq!(template.subtag(), "3.9-slim");
    }

    #[test]
    fn test_full_tag() {
        let key = VariantKey::new("jammy", "3.10");
        let id = TargetIdentity::new(key, TargetKind::Build { flavor: Flavor::S6 });
        assert_eq!(
            id.full_tag(&image()),
            "registry.example.com/ci/python:3.10-s6"
        );
    }
}
