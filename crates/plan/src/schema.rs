//! Plan document schema.
//!
//! The plan is the bridge between the matrix definition and the external
//! task engine: one entry per target, each with its basename (the unique
//! task key, doubling as the artifact/iidfile path), its dependencies and
//! its action list.

use dockforge_core::{OsVariant, RuntimeVersion};
use serde::{Deserialize, Serialize};

/// Plan schema version identifier.
pub const PLAN_VERSION: &str = "1";

/// Root plan document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanDocument {
    /// Schema version (always [`PLAN_VERSION`]).
    pub version: String,
    /// Every target in the matrix, in enumeration order.
    pub targets: Vec<TargetSpec>,
}

impl PlanDocument {
    /// Create a plan document for a set of targets.
    #[must_use]
    pub fn new(targets: Vec<TargetSpec>) -> Self {
        Self {
            version: PLAN_VERSION.to_string(),
            targets,
        }
    }

    /// Serialize the plan as pretty-printed JSON.
    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| crate::Error::Serialization {
            message: e.to_string(),
        })
    }
}

/// One target in the plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetSpec {
    /// Unique task key; also the on-disk artifact or iidfile path.
    pub basename: String,

    /// Files this target reads; the engine treats the target as stale when
    /// any of them changes. Entries that are themselves target basenames
    /// induce ordering edges.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_deps: Vec<String>,

    /// Targets that must complete before this one runs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub task_deps: Vec<String>,

    /// Actions executed in order; empty for pure aggregation nodes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
}

/// A single action of a target.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Run one of the artifact-generation strategies for a variant.
    ///
    /// The engine re-invokes `dockforge generate` for these; the strategy
    /// and axis values identify the exact artifact.
    Generate {
        /// Which generation strategy produces the artifact.
        strategy: GenerateStrategy,
        /// The OS-variant axis value.
        os_variant: OsVariant,
        /// The runtime-version axis value.
        runtime_version: RuntimeVersion,
    },

    /// Spawn an external command; the argument vector is opaque to the plan.
    Command {
        /// The argument vector, program first.
        argv: Vec<String>,
    },
}

impl Action {
    /// Convenience constructor for a command action.
    #[must_use]
    pub fn command<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Command {
            argv: argv.into_iter().map(Into::into).collect(),
        }
    }
}

/// The artifact-generation strategies the engine can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerateStrategy {
    /// Patch a fetched upstream document.
    Transform,
    /// Render the fixed template.
    Template,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_serialization_shape() {
        let action = Action::command(["docker", "build", "--pull"]);
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "command");
        assert_eq!(json["argv"][0], "docker");

        let action = Action::Generate {
            strategy: GenerateStrategy::Template,
            os_variant: "slim-jammy".into(),
            runtime_version: "3.10".into(),
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "generate");
        assert_eq!(json["strategy"], "template");
    }

    #[test]
    fn test_document_round_trip() {
        let doc = PlanDocument::new(vec![TargetSpec {
            basename: "3.10/jammy/Dockerfile".to_string(),
            file_deps: vec![],
            task_deps: vec![],
            actions: vec![Action::Generate {
                strategy: GenerateStrategy::Transform,
                os_variant: "jammy".into(),
                runtime_version: "3.10".into(),
            }],
        }]);

        let json = doc.to_json().unwrap();
        let parsed: PlanDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, doc);
        assert_eq!(parsed.version, PLAN_VERSION);
    }

    #[test]
    fn test_empty_dep_lists_omitted() {
        let target = TargetSpec {
            basename: "3.10/jammy/Dockerfile".to_string(),
            file_deps: vec![],
            task_deps: vec![],
            actions: vec![],
        };
        let json = serde_json::to_string(&target).unwrap();
        assert!(!json.contains("file_deps"));
        assert!(!json.contains("task_deps"));
        assert!(!json.contains("actions"));
    }
}
