//! Terminal species: pure sources and pure sinks of the pathway.

use petgraph::Direction;
use std::collections::BTreeSet;

use crate::graph::PathwayGraph;

/// Classifies species by their position in the reaction network.
pub struct TerminalNodeClassifier;

impl TerminalNodeClassifier {
    /// Species consumed by some reaction but produced by none.
    pub fn only_consumed(graph: &PathwayGraph, central_only: bool) -> BTreeSet<String> {
        Self::select(graph, central_only, |incoming, outgoing| {
            outgoing > 0 && incoming == 0
        })
    }

    /// Species produced by some reaction but consumed by none.
    pub fn only_produced(graph: &PathwayGraph, central_only: bool) -> BTreeSet<String> {
        Self::select(graph, central_only, |incoming, outgoing| {
            outgoing == 0 && incoming > 0
        })
    }

    /// Species flagged as part of the pathway backbone.
    pub fn central_species(graph: &PathwayGraph) -> BTreeSet<String> {
        graph
            .species_nodes()
            .filter(|s| s.is_central)
            .map(|s| s.id.clone())
            .collect()
    }

    /// Species flagged as sinks, whatever their degree.
    pub fn sink_species(graph: &PathwayGraph) -> BTreeSet<String> {
        graph
            .species_nodes()
            .filter(|s| s.is_sink)
            .map(|s| s.id.clone())
            .collect()
    }

    fn select(
        graph: &PathwayGraph,
        central_only: bool,
        predicate: impl Fn(usize, usize) -> bool,
    ) -> BTreeSet<String> {
        let inner = graph.inner();
        graph
            .species_nodes()
            .filter(|s| !central_only || s.is_central)
            .filter(|s| {
                let Some(idx) = graph.index_of(&s.id) else {
                    return false;
                };
                let incoming = inner.neighbors_directed(idx, Direction::Incoming).count();
                let outgoing = inner.neighbors_directed(idx, Direction::Outgoing).count();
                predicate(incoming, outgoing)
            })
            .map(|s| s.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::{build, linear_record};
    use rpgraph_core::{PathwayRecord, ReactionRecord, SpeciesRecord};

    fn ids(set: &BTreeSet<String>) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_linear_terminals() {
        let graph = build(linear_record()).unwrap();
        assert_eq!(ids(&TerminalNodeClassifier::only_consumed(&graph, true)), vec!["A"]);
        assert_eq!(ids(&TerminalNodeClassifier::only_produced(&graph, true)), vec!["C"]);
        // Water is a dead-end product but not central.
        assert_eq!(
            ids(&TerminalNodeClassifier::only_produced(&graph, false)),
            vec!["C", "W"]
        );
    }

    #[test]
    fn test_interior_species_are_neither() {
        let graph = build(linear_record()).unwrap();
        assert!(!TerminalNodeClassifier::only_consumed(&graph, false).contains("B"));
        assert!(!TerminalNodeClassifier::only_produced(&graph, false).contains("B"));
    }

    #[test]
    fn test_cycle_has_no_terminals() {
        let record = PathwayRecord::new()
            .with_species(SpeciesRecord::new("A", "a"))
            .with_species(SpeciesRecord::new("B", "b"))
            .with_reaction(ReactionRecord::new("R1", &["A"], &["B"]))
            .with_reaction(ReactionRecord::new("R2", &["B"], &["A"]))
            .with_group("rp_pathway", &["R1", "R2"])
            .with_group("central_species", &["A", "B"])
            .with_group("rp_sink_species", &[]);
        let graph = build(record).unwrap();
        assert!(TerminalNodeClassifier::only_consumed(&graph, false).is_empty());
        assert!(TerminalNodeClassifier::only_produced(&graph, false).is_empty());
    }

    #[test]
    fn test_flag_listings() {
        let graph = build(linear_record()).unwrap();
        assert_eq!(ids(&TerminalNodeClassifier::central_species(&graph)), vec!["A", "B", "C"]);
        assert_eq!(ids(&TerminalNodeClassifier::sink_species(&graph)), vec!["A"]);
    }
}
