//! Error types for task graph operations.

use thiserror::Error;

/// Result type for task graph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or validating a task graph.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Two tasks were registered under the same name.
    ///
    /// Task names double as output paths, so collisions are always a bug in
    /// the plan, never something to deduplicate silently.
    #[error("duplicate task name '{name}'")]
    DuplicateTask {
        /// The colliding task name.
        name: String,
    },

    /// A task depends on another task that doesn't exist.
    #[error("task '{task}' depends on missing task '{dependency}'")]
    MissingDependency {
        /// The task that has the missing dependency.
        task: String,
        /// The name of the missing dependency.
        dependency: String,
    },

    /// Multiple missing dependencies were found.
    #[error("missing dependencies: {}", format_missing(missing))]
    MissingDependencies {
        /// List of (task, missing dependency) pairs.
        missing: Vec<(String, String)>,
    },

    /// A dependency cycle was detected in the graph.
    #[error("cycle detected in task graph: {message}")]
    CycleDetected {
        /// Human-readable description of the cycle.
        message: String,
    },

    /// Failed to perform topological sort.
    #[error("failed to sort tasks topologically: {reason}")]
    TopologicalSortFailed {
        /// Reason for the failure.
        reason: String,
    },
}

fn format_missing(missing: &[(String, String)]) -> String {
    missing
        .iter()
        .map(|(task, dep)| format!("'{task}' -> '{dep}'"))
        .collect::<Vec<_>>()
        .join(", ")
}
