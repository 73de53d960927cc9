//! Task graph builder using petgraph.
//!
//! Builds a directed acyclic graph from plan targets to validate the
//! dependency structure and to compute a deterministic execution order.

use crate::{Error, Result, TaskNode};
use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::IntoNodeReferences;
use std::collections::HashMap;
use tracing::debug;

/// A node in the task graph.
#[derive(Debug, Clone)]
pub struct GraphNode<T> {
    /// Name of the task (its basename in the plan).
    pub name: String,
    /// The task data.
    pub task: T,
}

/// Task graph for dependency validation and execution ordering.
///
/// Generic over any task type implementing [`TaskNode`]. Edges point from
/// producer to consumer, so a topological sort yields a valid build order.
pub struct TaskGraph<T: TaskNode> {
    graph: DiGraph<GraphNode<T>, ()>,
    name_to_node: HashMap<String, NodeIndex>,
}

impl<T: TaskNode> TaskGraph<T> {
    /// Create a new empty task graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            name_to_node: HashMap::new(),
        }
    }

    /// Add a single task to the graph.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateTask`] if a task with the same name was
    /// already added. Names identify output paths, so collisions are never
    /// merged.
    pub fn add_task(&mut self, name: &str, task: T) -> Result<NodeIndex> {
        if self.name_to_node.contains_key(name) {
            return Err(Error::DuplicateTask {
                name: name.to_string(),
            });
        }

        let node_index = self.graph.add_node(GraphNode {
            name: name.to_string(),
            task,
        });
        self.name_to_node.insert(name.to_string(), node_index);
        debug!("Added task node '{}'", name);

        Ok(node_index)
    }

    /// Add dependency edges after all tasks have been added.
    ///
    /// Deferring the edge pass ensures every dependency can be resolved and
    /// that missing ones are reported together.
    ///
    /// # Errors
    ///
    /// Returns an error listing every task that depends on a non-existent
    /// task.
    pub fn add_dependency_edges(&mut self) -> Result<()> {
        let mut missing = Vec::new();
        let mut edges = Vec::new();

        for (node_index, node) in self.graph.node_references() {
            for dep_name in node.task.dependency_names() {
                if let Some(&dep_index) = self.name_to_node.get(dep_name) {
                    edges.push((dep_index, node_index));
                } else {
                    missing.push((node.name.clone(), dep_name.to_string()));
                }
            }
        }

        if !missing.is_empty() {
            return Err(Error::MissingDependencies { missing });
        }

        for (from, to) in edges {
            self.graph.add_edge(from, to, ());
        }

        Ok(())
    }

    /// Check if the graph has cycles.
    #[must_use]
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Get a topologically sorted list of tasks.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph contains cycles.
    pub fn topological_sort(&self) -> Result<Vec<GraphNode<T>>> {
        if self.has_cycles() {
            return Err(Error::CycleDetected {
                message: "task dependency graph contains cycles".to_string(),
            });
        }

        match toposort(&self.graph, None) {
            Ok(sorted) => Ok(sorted.into_iter().map(|idx| self.graph[idx].clone()).collect()),
            Err(_) => Err(Error::TopologicalSortFailed {
                reason: "petgraph toposort failed".to_string(),
            }),
        }
    }

    /// Get the number of tasks in the graph.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Check if a task exists in the graph.
    #[must_use]
    pub fn contains_task(&self, name: &str) -> bool {
        self.name_to_node.contains_key(name)
    }

    /// Get a reference to a task node by name.
    #[must_use]
    pub fn get_node_by_name(&self, name: &str) -> Option<&GraphNode<T>> {
        self.name_to_node
            .get(name)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    /// Iterate over all nodes in the graph.
    pub fn iter_nodes(&self) -> impl Iterator<Item = (NodeIndex, &GraphNode<T>)> {
        self.graph.node_references()
    }
}

impl<T: TaskNode> Default for TaskGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, Default)]
    struct TestTask {
        depends_on: Vec<String>,
    }

    impl TestTask {
        fn on(deps: &[&str]) -> Self {
            Self {
                depends_on: deps.iter().map(ToString::to_string).collect(),
            }
        }
    }

    impl TaskNode for TestTask {
        fn dependency_names(&self) -> impl Iterator<Item = &str> {
            self.depends_on.iter().map(String::as_str)
        }
    }

    #[test]
    fn test_add_and_count() {
        let mut graph = TaskGraph::new();
        graph.add_task("a", TestTask::default()).unwrap();
        graph.add_task("b", TestTask::on(&["a"])).unwrap();
        assert_eq!(graph.task_count(), 2);
        assert!(graph.contains_task("a"));
        assert!(!graph.contains_task("c"));
    }

    #[test]
    fn test_duplicate_task_rejected() {
        let mut graph = TaskGraph::new();
        graph.add_task("a", TestTask::default()).unwrap();
        let err = graph.add_task("a", TestTask::default()).unwrap_err();
        assert!(matches!(err, Error::DuplicateTask { name } if name == "a"));
    }

    #[test]
    fn test_missing_dependency_reported() {
        let mut graph = TaskGraph::new();
        graph.add_task("b", TestTask::on(&["nope"])).unwrap();
        let err = graph.add_dependency_edges().unwrap_err();
        match err {
            Error::MissingDependencies { missing } => {
                assert_eq!(missing, vec![("b".to_string(), "nope".to_string())]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_topological_order_respects_edges() {
        let mut graph = TaskGraph::new();
        graph.add_task("test", TestTask::on(&["build"])).unwrap();
        graph.add_task("build", TestTask::on(&["config"])).unwrap();
        graph.add_task("config", TestTask::default()).unwrap();
        graph.add_dependency_edges().unwrap();

        let order: Vec<String> = graph
            .topological_sort()
            .unwrap()
            .into_iter()
            .map(|n| n.name)
            .collect();
        let pos = |name: &str| order.iter().position(|n| n == name).unwrap();
        assert!(pos("config") < pos("build"));
        assert!(pos("build") < pos("test"));
    }

    #[test]
    fn test_cycle_detected() {
        let mut graph = TaskGraph::new();
        graph.add_task("a", TestTask::on(&["b"])).unwrap();
        graph.add_task("b", TestTask::on(&["a"])).unwrap();
        graph.add_dependency_edges().unwrap();

        assert!(graph.has_cycles());
        assert!(matches!(
            graph.topological_sort().unwrap_err(),
            Error::CycleDetected { .. }
        ));
    }
}
