//! Comparison graphs: relabelled copies of a pathway used for edit distance.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;

use crate::level::InfoWeight;

/// A simple directed graph whose nodes carry abstracted labels.
///
/// Nodes are identified by a key. Under `LabelPolicy::MergeByLabel` the key
/// is the label itself, so equal labels share one node; under
/// `LabelPolicy::KeepDistinct` the key is the original node id.
#[derive(Debug, Clone, Default)]
pub struct ComparisonGraph {
    graph: DiGraph<String, ()>,
    keys: HashMap<String, NodeIndex>,
}

impl ComparisonGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node unless its key already exists.
    pub fn add_node(&mut self, key: &str, label: &str) -> NodeIndex {
        if let Some(&idx) = self.keys.get(key) {
            return idx;
        }
        let idx = self.graph.add_node(label.to_string());
        self.keys.insert(key.to_string(), idx);
        idx
    }

    /// Connect two keyed nodes; repeated edges collapse into one.
    pub fn add_edge(&mut self, from_key: &str, to_key: &str) -> bool {
        match (self.keys.get(from_key), self.keys.get(to_key)) {
            (Some(&from), Some(&to)) => {
                self.graph.update_edge(from, to, ());
                true
            }
            _ => false,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn label(&self, idx: NodeIndex) -> &str {
        &self.graph[idx]
    }

    /// All labels, sorted.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.graph.node_weights().map(String::as_str).collect();
        labels.sort_unstable();
        labels
    }

    /// Whether some edge joins a node labelled `from` to one labelled `to`.
    pub fn has_labelled_edge(&self, from: &str, to: &str) -> bool {
        self.graph
            .edge_references()
            .any(|e| self.graph[e.source()] == from && self.graph[e.target()] == to)
    }

    pub fn in_degree(&self, idx: NodeIndex) -> usize {
        self.graph.neighbors_directed(idx, Direction::Incoming).count()
    }

    pub fn out_degree(&self, idx: NodeIndex) -> usize {
        self.graph.neighbors_directed(idx, Direction::Outgoing).count()
    }

    pub(crate) fn inner(&self) -> &DiGraph<String, ()> {
        &self.graph
    }
}

/// A comparison graph tagged with the information content of its labels.
#[derive(Debug, Clone)]
pub struct WeightedGraph {
    pub graph: ComparisonGraph,
    pub weight: InfoWeight,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_by_key() {
        let mut graph = ComparisonGraph::new();
        let a = graph.add_node("X", "X");
        let b = graph.add_node("X", "X");
        assert_eq!(a, b);
        graph.add_node("R", "R");
        assert!(graph.add_edge("X", "R"));
        assert!(graph.add_edge("X", "R"));
        assert!(!graph.add_edge("X", "missing"));
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.has_labelled_edge("X", "R"));
        assert!(!graph.has_labelled_edge("R", "X"));
    }

    #[test]
    fn test_distinct_keys_share_label() {
        let mut graph = ComparisonGraph::new();
        let a = graph.add_node("A", "L");
        let b = graph.add_node("B", "L");
        assert_ne!(a, b);
        assert_eq!(graph.labels(), vec!["L", "L"]);
        assert_eq!(graph.label(a), "L");
    }

    #[test]
    fn test_degrees() {
        let mut graph = ComparisonGraph::new();
        let a = graph.add_node("A", "A");
        let r = graph.add_node("R", "R");
        graph.add_node("B", "B");
        graph.add_edge("A", "R");
        graph.add_edge("R", "B");
        assert_eq!(graph.out_degree(a), 1);
        assert_eq!(graph.in_degree(a), 0);
        assert_eq!(graph.in_degree(r), 1);
        assert_eq!(graph.out_degree(r), 1);
    }
}
