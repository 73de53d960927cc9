//! Error types for plan assembly.

use miette::Diagnostic;
use thiserror::Error;

/// Result type for plan assembly.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while assembling or serializing the plan.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Error bubbled up from core configuration or lookup tables.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Core(#[from] dockforge_core::Error),

    /// The assembled targets do not form a valid DAG.
    #[error("invalid plan graph: {source}")]
    #[diagnostic(code(dockforge::plan::graph))]
    Graph {
        /// The structural problem reported by the graph.
        #[from]
        source: dockforge_task_graph::Error,
    },

    /// The plan could not be serialized.
    #[error("failed to serialize plan: {message}")]
    #[diagnostic(code(dockforge::plan::serialization))]
    Serialization {
        /// Description of the serialization failure.
        message: String,
    },
}
