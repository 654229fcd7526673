//! Bipartite pathway graph built on petgraph.
//!
//! Species and reactions are nodes; reactant edges point species → reaction
//! and product edges point reaction → species. The graph is built once from a
//! `PathwayDataProvider` and is read-only afterwards.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use rpgraph_core::{
    Error, MiriamAnnotation, PathwayDataProvider, Result, RpGraphConfig, SecondaryAnnotation,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// A chemical species of the pathway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesNode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub miriam: MiriamAnnotation,
    #[serde(default)]
    pub secondary: SecondaryAnnotation,
    #[serde(rename = "central_species")]
    pub is_central: bool,
    #[serde(rename = "sink_species")]
    pub is_sink: bool,
}

/// A reaction of the pathway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionNode {
    pub id: String,
    #[serde(default)]
    pub miriam: MiriamAnnotation,
    #[serde(default)]
    pub secondary: SecondaryAnnotation,
}

/// A node in the pathway graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PathwayNode {
    Species(SpeciesNode),
    Reaction(ReactionNode),
}

impl PathwayNode {
    pub fn id(&self) -> &str {
        match self {
            Self::Species(s) => &s.id,
            Self::Reaction(r) => &r.id,
        }
    }

    pub fn is_reaction(&self) -> bool {
        matches!(self, Self::Reaction(_))
    }

    pub fn as_species(&self) -> Option<&SpeciesNode> {
        match self {
            Self::Species(s) => Some(s),
            Self::Reaction(_) => None,
        }
    }
}

/// Reactant or product edge weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticipantEdge {
    pub stoichiometry: f64,
}

/// In-memory pathway graph.
pub struct PathwayGraph {
    pathway_id: String,
    annotation: SecondaryAnnotation,
    graph: DiGraph<PathwayNode, ParticipantEdge>,
    node_index: HashMap<String, NodeIndex>,
    reaction_ids: Vec<String>,
}

impl PathwayGraph {
    /// Build the graph of a pathway using the group ids from `config`.
    pub fn build(
        provider: &dyn PathwayDataProvider,
        pathway_id: &str,
        config: &RpGraphConfig,
    ) -> Result<Self> {
        Self::build_with_groups(
            provider,
            pathway_id,
            &config.central_group_id,
            &config.sink_group_id,
        )
    }

    /// Build the graph of a pathway with explicit central and sink group ids.
    pub fn build_with_groups(
        provider: &dyn PathwayDataProvider,
        pathway_id: &str,
        central_group_id: &str,
        sink_group_id: &str,
    ) -> Result<Self> {
        let span = tracing::debug_span!("build_graph", pathway = pathway_id);
        let _guard = span.enter();

        let reaction_ids = provider.pathway_reaction_ids(pathway_id)?;
        let species_ids = provider.pathway_species_ids(pathway_id)?;
        let central = provider.group_member_ids(central_group_id)?;
        let sinks = provider.group_member_ids(sink_group_id)?;
        let annotation = provider.secondary_annotation(pathway_id)?;

        let mut graph = Self::empty(pathway_id, annotation);

        for species_id in &species_ids {
            graph.insert_node(PathwayNode::Species(SpeciesNode {
                id: species_id.clone(),
                name: provider.species_name(species_id)?,
                miriam: provider.miriam_annotation(species_id)?,
                secondary: provider.secondary_annotation(species_id)?,
                is_central: central.contains(species_id),
                is_sink: sinks.contains(species_id),
            }))?;
        }

        for reaction_id in &reaction_ids {
            graph.insert_node(PathwayNode::Reaction(ReactionNode {
                id: reaction_id.clone(),
                miriam: provider.miriam_annotation(reaction_id)?,
                secondary: provider.secondary_annotation(reaction_id)?,
            }))?;
        }

        for reaction_id in &reaction_ids {
            let participants = provider.reaction_participants(reaction_id)?;
            for reactant in &participants.reactants {
                graph.insert_edge(&reactant.species, reaction_id, reactant.stoichiometry)?;
            }
            for product in &participants.products {
                graph.insert_edge(reaction_id, &product.species, product.stoichiometry)?;
            }
        }

        let stats = graph.stats();
        info!(
            "Built pathway graph {}: species={}, reactions={}, edges={}",
            pathway_id, stats.species_count, stats.reaction_count, stats.edge_count
        );

        Ok(graph)
    }

    pub(crate) fn empty(pathway_id: &str, annotation: SecondaryAnnotation) -> Self {
        Self {
            pathway_id: pathway_id.to_string(),
            annotation,
            graph: DiGraph::new(),
            node_index: HashMap::new(),
            reaction_ids: Vec::new(),
        }
    }

    pub(crate) fn insert_node(&mut self, node: PathwayNode) -> Result<NodeIndex> {
        if self.node_index.contains_key(node.id()) {
            return Err(Error::DataIntegrity(format!(
                "duplicate node id in pathway {}: {}",
                self.pathway_id,
                node.id()
            )));
        }
        let id = node.id().to_string();
        if node.is_reaction() {
            self.reaction_ids.push(id.clone());
        }
        let idx = self.graph.add_node(node);
        self.node_index.insert(id, idx);
        Ok(idx)
    }

    /// Connect two existing nodes. Exactly one endpoint must be a reaction.
    pub(crate) fn insert_edge(&mut self, source: &str, target: &str, stoichiometry: f64) -> Result<()> {
        let from = self.resolve(source)?;
        let to = self.resolve(target)?;
        if self.graph[from].is_reaction() == self.graph[to].is_reaction() {
            return Err(Error::DataIntegrity(format!(
                "edge {} -> {} does not join a species and a reaction",
                source, target
            )));
        }
        // A participant listed twice keeps its last stoichiometry.
        self.graph
            .update_edge(from, to, ParticipantEdge { stoichiometry });
        Ok(())
    }

    fn resolve(&self, id: &str) -> Result<NodeIndex> {
        self.node_index.get(id).copied().ok_or_else(|| {
            Error::DataIntegrity(format!(
                "pathway {} references unknown node: {}",
                self.pathway_id, id
            ))
        })
    }

    pub fn pathway_id(&self) -> &str {
        &self.pathway_id
    }

    /// Computed annotation of the pathway itself.
    pub fn annotation(&self) -> &SecondaryAnnotation {
        &self.annotation
    }

    pub fn node(&self, id: &str) -> Option<&PathwayNode> {
        self.node_index.get(id).map(|&idx| &self.graph[idx])
    }

    pub fn species(&self, id: &str) -> Option<&SpeciesNode> {
        self.node(id).and_then(PathwayNode::as_species)
    }

    pub fn reaction(&self, id: &str) -> Option<&ReactionNode> {
        match self.node(id)? {
            PathwayNode::Reaction(r) => Some(r),
            PathwayNode::Species(_) => None,
        }
    }

    /// All species nodes in insertion order.
    pub fn species_nodes(&self) -> impl Iterator<Item = &SpeciesNode> + '_ {
        self.graph
            .node_indices()
            .filter_map(move |idx| self.graph[idx].as_species())
    }

    /// Reaction ids in pathway order.
    pub fn reaction_ids(&self) -> &[String] {
        &self.reaction_ids
    }

    pub fn num_reactions(&self) -> usize {
        self.reaction_ids.len()
    }

    pub fn num_species(&self) -> usize {
        self.graph.node_count() - self.reaction_ids.len()
    }

    /// Stoichiometry of the edge `source -> target`, if present.
    pub fn stoichiometry(&self, source: &str, target: &str) -> Option<f64> {
        let from = *self.node_index.get(source)?;
        let to = *self.node_index.get(target)?;
        self.graph
            .find_edge(from, to)
            .map(|e| self.graph[e].stoichiometry)
    }

    /// Predecessor ids, sorted.
    pub fn predecessors(&self, id: &str) -> Vec<&str> {
        self.neighbor_ids(id, Direction::Incoming)
    }

    /// Successor ids, sorted.
    pub fn successors(&self, id: &str) -> Vec<&str> {
        self.neighbor_ids(id, Direction::Outgoing)
    }

    fn neighbor_ids(&self, id: &str, direction: Direction) -> Vec<&str> {
        match self.node_index.get(id) {
            Some(&idx) => self
                .sorted_neighbors(idx, direction)
                .into_iter()
                .map(|n| self.graph[n].id())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Neighbors of `idx` ordered by node id, so walks are deterministic.
    pub(crate) fn sorted_neighbors(&self, idx: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
        let mut neighbors: Vec<NodeIndex> = self.graph.neighbors_directed(idx, direction).collect();
        neighbors.sort_by(|a, b| self.graph[*a].id().cmp(self.graph[*b].id()));
        neighbors.dedup();
        neighbors
    }

    pub(crate) fn inner(&self) -> &DiGraph<PathwayNode, ParticipantEdge> {
        &self.graph
    }

    pub(crate) fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.node_index.get(id).copied()
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            node_count: self.graph.node_count(),
            edge_count: self.graph.edge_count(),
            species_count: self.num_species(),
            reaction_count: self.num_reactions(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub species_count: usize,
    pub reaction_count: usize,
}

impl std::fmt::Debug for PathwayGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathwayGraph")
            .field("pathway_id", &self.pathway_id)
            .field("stats", &self.stats())
            .finish()
    }
}
