//! Abstraction family generation.
//!
//! A pathway is turned into every comparison graph obtainable by choosing a
//! species layer, a reaction layer, and one label per node when a node has
//! several annotation values (several InChIKeys, several EC numbers). Layers
//! are enumerated finest first; within a layer pair, label choices follow a
//! lexicographic odometer with the last node changing fastest.

use rpgraph_core::{
    Error, LabelPolicy, MiriamAnnotation, PathwayDataProvider, ReactionParticipants, Result,
    RpGraphConfig, SecondaryAnnotation,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, warn};

use crate::comparison::{ComparisonGraph, WeightedGraph};
use crate::level::{
    truncate_ec, truncate_inchikey, InfoWeight, ReactionLayer, ReactionSpecificity,
    SpeciesLayer, SpeciesSpecificity,
};

/// Which annotation a node lacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingKind {
    Inchikey,
    EcNumber,
    Smiles,
}

/// A node labelled by its raw id because the expected annotation was absent.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct MissingAnnotation {
    pub node_id: String,
    pub kind: MissingKind,
}

impl std::fmt::Display for MissingAnnotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let what = match self.kind {
            MissingKind::Inchikey => "InChIKey",
            MissingKind::EcNumber => "EC number",
            MissingKind::Smiles => "SMILES",
        };
        write!(f, "no {} for {}, using its id as label", what, self.node_id)
    }
}

/// Labels of one layer: original node id → candidate labels (sorted, unique).
#[derive(Debug, Clone)]
pub struct AbstractionLayer {
    pub info: u8,
    pub labels: BTreeMap<String, Vec<String>>,
}

impl AbstractionLayer {
    /// Number of label combinations this layer produces.
    fn combinations(&self) -> Option<usize> {
        self.labels
            .values()
            .try_fold(1usize, |acc, c| acc.checked_mul(c.len().max(1)))
    }
}

/// Every comparison graph of one pathway, with degraded-annotation warnings.
#[derive(Debug, Clone)]
pub struct AbstractionFamily {
    pub pathway_id: String,
    pub graphs: Vec<WeightedGraph>,
    pub warnings: Vec<MissingAnnotation>,
}

impl AbstractionFamily {
    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }
}

struct NodeData {
    id: String,
    miriam: MiriamAnnotation,
    secondary: SecondaryAnnotation,
}

/// Provider data needed to build comparison graphs, fetched once.
struct PathwayData {
    species: Vec<NodeData>,
    reactions: Vec<NodeData>,
    participants: Vec<ReactionParticipants>,
}

impl PathwayData {
    fn fetch(provider: &dyn PathwayDataProvider, pathway_id: &str) -> Result<Self> {
        let species_ids = provider.pathway_species_ids(pathway_id)?;
        let reaction_ids = provider.pathway_reaction_ids(pathway_id)?;

        let mut species = Vec::with_capacity(species_ids.len());
        for id in &species_ids {
            species.push(NodeData {
                id: id.clone(),
                miriam: provider.miriam_annotation(id)?,
                secondary: provider.secondary_annotation(id)?,
            });
        }

        let mut seen = HashSet::new();
        let mut reactions = Vec::with_capacity(reaction_ids.len());
        let mut participants = Vec::with_capacity(reaction_ids.len());
        for id in reaction_ids {
            if !seen.insert(id.clone()) {
                return Err(Error::DataIntegrity(format!(
                    "reaction {} listed twice in pathway {}",
                    id, pathway_id
                )));
            }
            let parts = provider.reaction_participants(&id)?;
            for p in parts.reactants.iter().chain(&parts.products) {
                if !species_ids.contains(&p.species) {
                    return Err(Error::DataIntegrity(format!(
                        "reaction {} references species {} outside pathway {}",
                        id, p.species, pathway_id
                    )));
                }
            }
            reactions.push(NodeData {
                miriam: provider.miriam_annotation(&id)?,
                secondary: provider.secondary_annotation(&id)?,
                id,
            });
            participants.push(parts);
        }

        Ok(Self {
            species,
            reactions,
            participants,
        })
    }
}

/// Builds abstraction families from provider data.
pub struct AbstractionGenerator {
    max_family_size: usize,
    label_policy: LabelPolicy,
}

impl AbstractionGenerator {
    pub fn new(config: &RpGraphConfig) -> Self {
        Self::with_limits(config.max_family_size, config.label_policy)
    }

    pub fn with_limits(max_family_size: usize, label_policy: LabelPolicy) -> Self {
        Self {
            max_family_size,
            label_policy,
        }
    }

    /// Generate the family for raw specificity values
    /// (species 0..=3, reaction -1..=4).
    pub fn generate(
        &self,
        provider: &dyn PathwayDataProvider,
        pathway_id: &str,
        species_specificity: i32,
        reaction_specificity: i32,
    ) -> Result<AbstractionFamily> {
        let species = SpeciesSpecificity::try_from(species_specificity)?;
        let reaction = ReactionSpecificity::try_from(reaction_specificity)?;
        self.generate_levels(provider, pathway_id, species, reaction)
    }

    pub fn generate_levels(
        &self,
        provider: &dyn PathwayDataProvider,
        pathway_id: &str,
        species: SpeciesSpecificity,
        reaction: ReactionSpecificity,
    ) -> Result<AbstractionFamily> {
        let span = tracing::debug_span!("abstraction_family", pathway = pathway_id);
        let _guard = span.enter();

        let data = PathwayData::fetch(provider, pathway_id)?;
        let mut warnings = BTreeSet::new();

        let species_layers: Vec<AbstractionLayer> = species
            .layers()
            .into_iter()
            .map(|layer| species_layer(&data, layer, &mut warnings))
            .collect();
        let reaction_layers: Vec<AbstractionLayer> = reaction
            .layers()
            .into_iter()
            .map(|layer| reaction_layer(&data, layer, &mut warnings))
            .collect();

        let size = species_layers
            .iter()
            .flat_map(|s| reaction_layers.iter().map(move |r| (s, r)))
            .try_fold(0usize, |acc, (s, r)| {
                let n = s.combinations()?.checked_mul(r.combinations()?)?;
                acc.checked_add(n)
            })
            .unwrap_or(usize::MAX);
        if size > self.max_family_size {
            return Err(Error::FamilyTooLarge {
                size,
                limit: self.max_family_size,
            });
        }

        let mut graphs = Vec::with_capacity(size);
        for s in &species_layers {
            for r in &reaction_layers {
                let weight = InfoWeight::new(s.info, r.info);
                self.expand(&data, s, r, weight, &mut graphs);
            }
        }

        for warning in &warnings {
            warn!("{}", warning);
        }
        debug!(
            "Generated {} comparison graphs for {} ({} species layers, {} reaction layers)",
            graphs.len(),
            pathway_id,
            species_layers.len(),
            reaction_layers.len()
        );

        Ok(AbstractionFamily {
            pathway_id: pathway_id.to_string(),
            graphs,
            warnings: warnings.into_iter().collect(),
        })
    }

    /// Enumerate every label choice of a species/reaction layer pair.
    fn expand(
        &self,
        data: &PathwayData,
        species: &AbstractionLayer,
        reactions: &AbstractionLayer,
        weight: InfoWeight,
        out: &mut Vec<WeightedGraph>,
    ) {
        let choices: Vec<&[String]> = data
            .species
            .iter()
            .map(|n| species.labels[&n.id].as_slice())
            .chain(data.reactions.iter().map(|n| reactions.labels[&n.id].as_slice()))
            .collect();

        let mut odometer = vec![0usize; choices.len()];
        loop {
            out.push(WeightedGraph {
                graph: self.build_graph(data, &choices, &odometer),
                weight,
            });

            // Advance, last position fastest.
            let mut pos = choices.len();
            loop {
                if pos == 0 {
                    return;
                }
                pos -= 1;
                odometer[pos] += 1;
                if odometer[pos] < choices[pos].len() {
                    break;
                }
                odometer[pos] = 0;
            }
        }
    }

    fn build_graph(&self, data: &PathwayData, choices: &[&[String]], picked: &[usize]) -> ComparisonGraph {
        let offset = data.species.len();
        let key_of = |position: usize, id: &str| -> String {
            let label = &choices[position][picked[position]];
            match self.label_policy {
                LabelPolicy::MergeByLabel => label.clone(),
                LabelPolicy::KeepDistinct => id.to_string(),
            }
        };

        let mut graph = ComparisonGraph::new();
        let mut species_keys = BTreeMap::new();
        for (i, node) in data.species.iter().enumerate() {
            let key = key_of(i, &node.id);
            graph.add_node(&key, &choices[i][picked[i]]);
            species_keys.insert(node.id.as_str(), key);
        }

        for (j, node) in data.reactions.iter().enumerate() {
            let position = offset + j;
            let reaction_key = key_of(position, &node.id);
            graph.add_node(&reaction_key, &choices[position][picked[position]]);

            let parts = &data.participants[j];
            for reactant in &parts.reactants {
                if let Some(key) = species_keys.get(reactant.species.as_str()) {
                    graph.add_edge(key, &reaction_key);
                }
            }
            for product in &parts.products {
                if let Some(key) = species_keys.get(product.species.as_str()) {
                    graph.add_edge(&reaction_key, key);
                }
            }
        }
        graph
    }
}

fn species_layer(
    data: &PathwayData,
    layer: SpeciesLayer,
    warnings: &mut BTreeSet<MissingAnnotation>,
) -> AbstractionLayer {
    let labels = data
        .species
        .iter()
        .map(|node| {
            let candidates = match layer {
                SpeciesLayer::RawId => vec![node.id.clone()],
                SpeciesLayer::Inchikey(n) => {
                    let keys: Vec<&str> = match &node.secondary.inchikey {
                        Some(key) => vec![key.as_str()],
                        None => node.miriam.inchikeys(),
                    };
                    unique_labels(keys.into_iter().map(|k| truncate_inchikey(k, n)))
                        .unwrap_or_else(|| {
                            warnings.insert(MissingAnnotation {
                                node_id: node.id.clone(),
                                kind: MissingKind::Inchikey,
                            });
                            vec![node.id.clone()]
                        })
                }
            };
            (node.id.clone(), candidates)
        })
        .collect();

    AbstractionLayer {
        info: layer.info(),
        labels,
    }
}

fn reaction_layer(
    data: &PathwayData,
    layer: ReactionLayer,
    warnings: &mut BTreeSet<MissingAnnotation>,
) -> AbstractionLayer {
    let labels = data
        .reactions
        .iter()
        .map(|node| {
            let (found, kind) = match layer {
                ReactionLayer::RawId => (Some(vec![node.id.clone()]), None),
                ReactionLayer::Smiles => (
                    unique_labels(node.secondary.smiles.iter().map(|s| s.to_uppercase())),
                    Some(MissingKind::Smiles),
                ),
                ReactionLayer::Ec(n) => (
                    unique_labels(node.miriam.ec_codes().into_iter().map(|ec| truncate_ec(ec, n))),
                    Some(MissingKind::EcNumber),
                ),
            };
            let candidates = found.unwrap_or_else(|| {
                if let Some(kind) = kind {
                    warnings.insert(MissingAnnotation {
                        node_id: node.id.clone(),
                        kind,
                    });
                }
                vec![node.id.clone()]
            });
            (node.id.clone(), candidates)
        })
        .collect();

    AbstractionLayer {
        info: layer.info(),
        labels,
    }
}

/// Sorted, deduplicated, non-empty labels; `None` when nothing usable remains.
fn unique_labels(labels: impl Iterator<Item = String>) -> Option<Vec<String>> {
    let set: BTreeSet<String> = labels.filter(|l| !l.is_empty()).collect();
    if set.is_empty() {
        None
    } else {
        Some(set.into_iter().collect())
    }
}
