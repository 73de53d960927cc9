//! Validation utilities for task graphs.

use crate::{Error, TaskGraph, TaskNode};

/// Result of graph validation.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the graph is valid (no cycles).
    pub is_valid: bool,
    /// List of validation errors, if any.
    pub errors: Vec<Error>,
}

impl ValidationResult {
    /// Create a valid result.
    #[must_use]
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: vec![],
        }
    }

    /// Create an invalid result with errors.
    #[must_use]
    pub fn invalid(errors: Vec<Error>) -> Self {
        Self {
            is_valid: false,
            errors,
        }
    }
}

impl<T: TaskNode> TaskGraph<T> {
    /// Validate the graph structure.
    ///
    /// Duplicate names and missing dependencies are caught earlier, by
    /// `add_task` and `add_dependency_edges`; this checks for cycles once
    /// all edges are in place.
    #[must_use]
    pub fn validate(&self) -> ValidationResult {
        if self.has_cycles() {
            ValidationResult::invalid(vec![Error::CycleDetected {
                message: "task dependency graph contains cycles".to_string(),
            }])
        } else {
            ValidationResult::valid()
        }
    }
}
