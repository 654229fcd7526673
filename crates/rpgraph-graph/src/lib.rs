//! rpgraph Graph: bipartite pathway graph, terminal species, reaction order.
//!
//! `PathwayGraph::build` turns provider data into a petgraph `DiGraph`.
//! `TerminalNodeClassifier` finds the pure sources and sinks of the network,
//! and `OrderReconstructor` recovers the execution order of a linear pathway
//! or reports why none is unique.

pub mod export;
pub mod graph;
pub mod order;
pub mod terminal;

pub use export::{DocumentGraph, NodeLink, NodeLinkDocument};
pub use graph::{GraphStats, ParticipantEdge, PathwayGraph, PathwayNode, ReactionNode, SpeciesNode};
pub use order::{OrderOutcome, OrderReconstructor, ReactionSteps, WalkDirection};
pub use terminal::TerminalNodeClassifier;
