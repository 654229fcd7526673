//! Reaction order reconstruction for linear pathways.
//!
//! Walks the central-species backbone from the terminal species, collecting
//! reactions step by step. A walk is a depth-first search on an explicit
//! stack: each stack entry is a branch `(node, steps so far)`. A branch is
//! complete once its steps cover every reaction of the pathway; a branch
//! that runs out of unvisited reactions first is dropped.
//!
//! The pathway is walked backward from the only-produced central species and
//! forward from the only-consumed ones. The order is accepted only when it is
//! unique and both directions (when both have seeds) agree on it.

use petgraph::graph::NodeIndex;
use petgraph::Direction;
use rpgraph_core::{Error, Result};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::graph::{PathwayGraph, PathwayNode};
use crate::terminal::TerminalNodeClassifier;

/// Reactions grouped by step; a step holds the reactions reached together.
pub type ReactionSteps = Vec<Vec<String>>;

/// Result of an ordering query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OrderOutcome {
    /// A unique total order, first reaction first.
    Ordered { reactions: Vec<String> },
    /// Several covers were found, or the cover has parallel steps.
    Ambiguous { candidates: Vec<ReactionSteps> },
    /// No walk covered all reactions.
    NoOrderFound,
}

impl OrderOutcome {
    /// Collapse into a `Result`, surfacing ambiguity and failure as errors.
    pub fn into_result(self) -> Result<Vec<String>> {
        match self {
            Self::Ordered { reactions } => Ok(reactions),
            Self::Ambiguous { candidates } => Err(Error::AmbiguousOrder(candidates.len())),
            Self::NoOrderFound => Err(Error::NoOrderFound),
        }
    }

    pub fn is_ordered(&self) -> bool {
        matches!(self, Self::Ordered { .. })
    }
}

/// Walk direction along the reaction edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkDirection {
    /// From only-consumed species through successors.
    Forward,
    /// From only-produced species through predecessors.
    Backward,
}

impl WalkDirection {
    fn edges(self) -> Direction {
        match self {
            Self::Forward => Direction::Outgoing,
            Self::Backward => Direction::Incoming,
        }
    }
}

/// Outcome of walking one direction from all of its seeds.
#[derive(Debug, Clone, PartialEq)]
enum DirectionResult {
    NoSeeds,
    Failed,
    Unique(ReactionSteps),
    Ambiguous(Vec<ReactionSteps>),
}

struct Branch {
    node: NodeIndex,
    steps: Vec<Vec<NodeIndex>>,
}

/// Reconstructs the execution order of a linear pathway.
pub struct OrderReconstructor;

impl OrderReconstructor {
    /// Reaction ids in execution order, or why no unique order exists.
    pub fn ordered_reactions(graph: &PathwayGraph) -> OrderOutcome {
        let span = tracing::debug_span!("ordered_reactions", pathway = graph.pathway_id());
        let _guard = span.enter();

        let forward = Self::walk_direction(graph, WalkDirection::Forward);
        let backward = Self::walk_direction(graph, WalkDirection::Backward);
        debug!("Forward walk: {:?}; backward walk: {:?}", forward, backward);

        let steps = match (forward, backward) {
            (DirectionResult::Ambiguous(mut a), other) | (other, DirectionResult::Ambiguous(mut a)) => {
                match other {
                    DirectionResult::Unique(s) => push_unique(&mut a, s),
                    DirectionResult::Ambiguous(b) => {
                        for s in b {
                            push_unique(&mut a, s);
                        }
                    }
                    DirectionResult::NoSeeds | DirectionResult::Failed => {}
                }
                warn!("Ambiguous reaction order: {} candidates", a.len());
                return OrderOutcome::Ambiguous { candidates: a };
            }
            (DirectionResult::Failed, _) | (_, DirectionResult::Failed) => {
                warn!("No walk covers all {} reactions", graph.num_reactions());
                return OrderOutcome::NoOrderFound;
            }
            (DirectionResult::NoSeeds, DirectionResult::NoSeeds) => {
                warn!("No terminal central species to start a walk from");
                return OrderOutcome::NoOrderFound;
            }
            (DirectionResult::Unique(f), DirectionResult::Unique(b)) => {
                if f != b {
                    warn!("Forward and backward walks disagree: {:?} vs {:?}", f, b);
                    return OrderOutcome::Ambiguous {
                        candidates: vec![f, b],
                    };
                }
                f
            }
            (DirectionResult::Unique(s), DirectionResult::NoSeeds)
            | (DirectionResult::NoSeeds, DirectionResult::Unique(s)) => s,
        };

        if steps.iter().any(|step| step.len() > 1) {
            warn!("Reaction cover has parallel steps: {:?}", steps);
            return OrderOutcome::Ambiguous {
                candidates: vec![steps],
            };
        }

        let reactions: Vec<String> = steps.into_iter().flatten().collect();
        info!("Found reaction order: {:?}", reactions);
        OrderOutcome::Ordered { reactions }
    }

    /// Distinct complete covers found from every seed of one direction,
    /// expressed in forward order.
    fn walk_direction(graph: &PathwayGraph, direction: WalkDirection) -> DirectionResult {
        let seeds = match direction {
            WalkDirection::Forward => TerminalNodeClassifier::only_consumed(graph, true),
            WalkDirection::Backward => TerminalNodeClassifier::only_produced(graph, true),
        };
        if seeds.is_empty() {
            return DirectionResult::NoSeeds;
        }

        let mut covers: Vec<ReactionSteps> = Vec::new();
        for seed in &seeds {
            let Some(start) = graph.index_of(seed) else {
                continue;
            };
            for steps in Self::walk(graph, start, direction) {
                let mut named: ReactionSteps = steps
                    .iter()
                    .map(|step| {
                        step.iter()
                            .map(|&idx| graph.inner()[idx].id().to_string())
                            .collect()
                    })
                    .collect();
                if direction == WalkDirection::Backward {
                    named.reverse();
                }
                push_unique(&mut covers, named);
            }
        }

        match covers.len() {
            0 => DirectionResult::Failed,
            1 => DirectionResult::Unique(covers.remove(0)),
            _ => DirectionResult::Ambiguous(covers),
        }
    }

    /// Complete covers reachable from `start`, in walk order.
    fn walk(
        graph: &PathwayGraph,
        start: NodeIndex,
        direction: WalkDirection,
    ) -> Vec<Vec<Vec<NodeIndex>>> {
        let inner = graph.inner();
        let total = graph.num_reactions();
        let mut complete: Vec<Vec<Vec<NodeIndex>>> = Vec::new();
        let mut stack = vec![Branch {
            node: start,
            steps: Vec::new(),
        }];

        while let Some(Branch { node, steps }) = stack.pop() {
            let visited: HashSet<NodeIndex> = steps.iter().flatten().copied().collect();
            if visited.len() == total {
                push_unique(&mut complete, steps);
                continue;
            }

            let neighbors = graph.sorted_neighbors(node, direction.edges());
            let frontier: Vec<NodeIndex> = neighbors
                .iter()
                .copied()
                .filter(|n| inner[*n].is_reaction() && !visited.contains(n))
                .collect();

            let mut next_steps = steps;
            if !frontier.is_empty() {
                next_steps.push(frontier.clone());
            }

            let children: Vec<NodeIndex> = neighbors
                .into_iter()
                .filter(|n| match &inner[*n] {
                    PathwayNode::Reaction(_) => frontier.contains(n),
                    PathwayNode::Species(s) => s.is_central,
                })
                .collect();

            // Reverse so the first neighbor is explored first.
            for child in children.into_iter().rev() {
                stack.push(Branch {
                    node: child,
                    steps: next_steps.clone(),
                });
            }
        }

        complete
    }
}

fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if !items.contains(&item) {
        items.push(item);
    }
}

impl PathwayGraph {
    /// Reaction ids in execution order; see [`OrderReconstructor`].
    pub fn ordered_reactions(&self) -> OrderOutcome {
        OrderReconstructor::ordered_reactions(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::{build, linear_record};
    use rpgraph_core::{PathwayRecord, ReactionRecord, SpeciesRecord};

    fn record(species: &[&str], central: &[&str], reactions: &[(&str, &[&str], &[&str])]) -> PathwayRecord {
        let mut record = PathwayRecord::new();
        for s in species {
            record = record.with_species(SpeciesRecord::new(*s, *s));
        }
        let mut ids = Vec::new();
        for (id, reactants, products) in reactions {
            record = record.with_reaction(ReactionRecord::new(*id, reactants, products));
            ids.push(*id);
        }
        record
            .with_group("rp_pathway", &ids)
            .with_group("central_species", central)
            .with_group("rp_sink_species", &[])
    }

    fn ordered(outcome: OrderOutcome) -> Vec<String> {
        match outcome {
            OrderOutcome::Ordered { reactions } => reactions,
            other => panic!("expected an order, got {:?}", other),
        }
    }

    #[test]
    fn test_two_step_chain() {
        let graph = build(record(
            &["A", "B", "C"],
            &["A", "B", "C"],
            &[("R1", &["A"], &["B"]), ("R2", &["B"], &["C"])],
        ))
        .unwrap();
        assert_eq!(ordered(graph.ordered_reactions()), vec!["R1", "R2"]);
    }

    #[test]
    fn test_chain_with_cofactors() {
        let graph = build(linear_record()).unwrap();
        assert_eq!(ordered(graph.ordered_reactions()), vec!["R1", "R2"]);
    }

    #[test]
    fn test_long_chain_declared_out_of_order() {
        let graph = build(record(
            &["A", "B", "C", "D", "E"],
            &["A", "B", "C", "D", "E"],
            &[
                ("R3", &["C"], &["D"]),
                ("R1", &["A"], &["B"]),
                ("R4", &["D"], &["E"]),
                ("R2", &["B"], &["C"]),
            ],
        ))
        .unwrap();
        assert_eq!(ordered(graph.ordered_reactions()), vec!["R1", "R2", "R3", "R4"]);
    }

    #[test]
    fn test_fork_is_not_ordered() {
        let graph = build(record(
            &["A", "B", "C"],
            &["A", "B", "C"],
            &[("R1", &["A"], &["B"]), ("R2", &["A"], &["C"])],
        ))
        .unwrap();
        let outcome = graph.ordered_reactions();
        assert!(matches!(
            outcome,
            OrderOutcome::NoOrderFound | OrderOutcome::Ambiguous { .. }
        ));
        assert!(outcome.into_result().is_err());
    }

    #[test]
    fn test_shortcut_makes_order_ambiguous() {
        // A -> B -> C plus a direct A -> C reaction.
        let graph = build(record(
            &["A", "B", "C"],
            &["A", "B", "C"],
            &[
                ("R1", &["A"], &["B"]),
                ("R2", &["B"], &["C"]),
                ("R3", &["A"], &["C"]),
            ],
        ))
        .unwrap();
        match graph.ordered_reactions() {
            OrderOutcome::Ambiguous { candidates } => assert_eq!(candidates.len(), 2),
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }

    #[test]
    fn test_broken_backbone_has_no_order() {
        // B is not central, so the walk cannot cross it.
        let graph = build(record(
            &["A", "B", "C"],
            &["A", "C"],
            &[("R1", &["A"], &["B"]), ("R2", &["B"], &["C"])],
        ))
        .unwrap();
        assert_eq!(graph.ordered_reactions(), OrderOutcome::NoOrderFound);
    }

    #[test]
    fn test_cycle_terminates_without_order() {
        let graph = build(record(
            &["A", "B"],
            &["A", "B"],
            &[("R1", &["A"], &["B"]), ("R2", &["B"], &["A"])],
        ))
        .unwrap();
        assert_eq!(graph.ordered_reactions(), OrderOutcome::NoOrderFound);
    }

    #[test]
    fn test_cycle_inside_chain_terminates() {
        // B <-> C loop in the middle of A -> B ... C -> D.
        let graph = build(record(
            &["A", "B", "C", "D"],
            &["A", "B", "C", "D"],
            &[
                ("R1", &["A"], &["B"]),
                ("R2", &["B"], &["C"]),
                ("R3", &["C"], &["B"]),
                ("R4", &["C"], &["D"]),
            ],
        ))
        .unwrap();
        assert!(!graph.ordered_reactions().is_ordered());
    }

    #[test]
    fn test_into_result_errors() {
        assert!(matches!(
            OrderOutcome::NoOrderFound.into_result(),
            Err(Error::NoOrderFound)
        ));
        let ambiguous = OrderOutcome::Ambiguous {
            candidates: vec![vec![vec!["R1".into()]], vec![vec!["R2".into()]]],
        };
        assert!(matches!(ambiguous.into_result(), Err(Error::AmbiguousOrder(2))));
    }

    #[test]
    fn test_outcome_json_shape() {
        let outcome = OrderOutcome::Ordered {
            reactions: vec!["R1".into()],
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "ordered");
        assert_eq!(json["reactions"][0], "R1");
    }
}
