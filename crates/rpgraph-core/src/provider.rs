//! Pathway data providers.
//!
//! The `PathwayDataProvider` trait is the only way the graph builder and the
//! abstraction generator see pathway data. File parsing and annotation
//! extraction live behind it. `MemoryProvider` serves a `PathwayRecord`
//! document held in memory, optionally loaded from JSON.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use crate::annotation::{MiriamAnnotation, SecondaryAnnotation};
use crate::error::{Error, Result};

/// One reactant or product of a reaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub species: String,
    #[serde(default = "default_stoichiometry")]
    pub stoichiometry: f64,
}

fn default_stoichiometry() -> f64 {
    1.0
}

impl Participant {
    pub fn new(species: impl Into<String>, stoichiometry: f64) -> Self {
        Self {
            species: species.into(),
            stoichiometry,
        }
    }
}

/// Reactants and products of a reaction, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReactionParticipants {
    pub reactants: Vec<Participant>,
    pub products: Vec<Participant>,
}

/// Source of pathway species, reactions, groups and annotations.
pub trait PathwayDataProvider {
    /// Reaction ids of the pathway, in pathway order.
    fn pathway_reaction_ids(&self, pathway_id: &str) -> Result<Vec<String>>;

    /// Unique species referenced by the pathway's reactions.
    fn pathway_species_ids(&self, pathway_id: &str) -> Result<BTreeSet<String>>;

    /// Members of a named group (central species, sink species, ...).
    fn group_member_ids(&self, group_id: &str) -> Result<BTreeSet<String>>;

    fn reaction_participants(&self, reaction_id: &str) -> Result<ReactionParticipants>;

    fn species_name(&self, species_id: &str) -> Result<String>;

    fn miriam_annotation(&self, node_id: &str) -> Result<MiriamAnnotation>;

    /// Computed annotation of a species, a reaction, or a pathway group.
    fn secondary_annotation(&self, node_id: &str) -> Result<SecondaryAnnotation>;
}

/// A species entry of a pathway document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub miriam: MiriamAnnotation,
    #[serde(default)]
    pub secondary: SecondaryAnnotation,
}

impl SpeciesRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            miriam: MiriamAnnotation::default(),
            secondary: SecondaryAnnotation::default(),
        }
    }

    /// Attach a computed InChIKey.
    pub fn with_inchikey(mut self, inchikey: impl Into<String>) -> Self {
        self.secondary.inchikey = Some(inchikey.into());
        self
    }

    /// Attach MIRIAM InChIKey cross-references.
    pub fn with_miriam_inchikeys(mut self, inchikeys: &[&str]) -> Self {
        self.miriam.inchikey = inchikeys.iter().map(|s| s.to_string()).collect();
        self
    }
}

/// A reaction entry of a pathway document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionRecord {
    pub id: String,
    #[serde(default)]
    pub reactants: Vec<Participant>,
    #[serde(default)]
    pub products: Vec<Participant>,
    #[serde(default)]
    pub miriam: MiriamAnnotation,
    #[serde(default)]
    pub secondary: SecondaryAnnotation,
}

impl ReactionRecord {
    /// Reaction with unit stoichiometry on every participant.
    pub fn new(id: impl Into<String>, reactants: &[&str], products: &[&str]) -> Self {
        Self {
            id: id.into(),
            reactants: reactants.iter().map(|s| Participant::new(*s, 1.0)).collect(),
            products: products.iter().map(|s| Participant::new(*s, 1.0)).collect(),
            miriam: MiriamAnnotation::default(),
            secondary: SecondaryAnnotation::default(),
        }
    }

    pub fn with_ec(mut self, ec_codes: &[&str]) -> Self {
        self.miriam.ec_code = ec_codes.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_smiles(mut self, smiles: impl Into<String>) -> Self {
        self.secondary.smiles = Some(smiles.into());
        self
    }
}

/// A self-contained pathway document: species, reactions, groups.
///
/// Groups map a group id to its ordered member list; the pathway itself is a
/// group whose members are reaction ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathwayRecord {
    #[serde(default)]
    pub species: Vec<SpeciesRecord>,
    #[serde(default)]
    pub reactions: Vec<ReactionRecord>,
    #[serde(default)]
    pub groups: BTreeMap<String, Vec<String>>,
    /// Computed annotation of group-level entities, keyed by group id.
    #[serde(default)]
    pub group_annotations: BTreeMap<String, SecondaryAnnotation>,
}

impl PathwayRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_species(mut self, species: SpeciesRecord) -> Self {
        self.species.push(species);
        self
    }

    pub fn with_reaction(mut self, reaction: ReactionRecord) -> Self {
        self.reactions.push(reaction);
        self
    }

    pub fn with_group(mut self, group_id: impl Into<String>, members: &[&str]) -> Self {
        self.groups.insert(
            group_id.into(),
            members.iter().map(|s| s.to_string()).collect(),
        );
        self
    }
}

/// In-memory provider over a `PathwayRecord`.
pub struct MemoryProvider {
    record: PathwayRecord,
    species_index: HashMap<String, usize>,
    reaction_index: HashMap<String, usize>,
}

impl MemoryProvider {
    /// Index a pathway document. Duplicate species or reaction ids are rejected.
    pub fn new(record: PathwayRecord) -> Result<Self> {
        let mut species_index = HashMap::with_capacity(record.species.len());
        for (i, species) in record.species.iter().enumerate() {
            if species_index.insert(species.id.clone(), i).is_some() {
                return Err(Error::DataIntegrity(format!(
                    "duplicate species id: {}",
                    species.id
                )));
            }
        }

        let mut reaction_index = HashMap::with_capacity(record.reactions.len());
        for (i, reaction) in record.reactions.iter().enumerate() {
            if species_index.contains_key(&reaction.id)
                || reaction_index.insert(reaction.id.clone(), i).is_some()
            {
                return Err(Error::DataIntegrity(format!(
                    "duplicate reaction id: {}",
                    reaction.id
                )));
            }
        }

        Ok(Self {
            record,
            species_index,
            reaction_index,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::new(serde_json::from_str(json)?)
    }

    /// Load a pathway document from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        tracing::debug!("Loaded pathway document {}", path.as_ref().display());
        Self::from_json_str(&text)
    }

    pub fn record(&self) -> &PathwayRecord {
        &self.record
    }

    fn species(&self, id: &str) -> Result<&SpeciesRecord> {
        self.species_index
            .get(id)
            .map(|&i| &self.record.species[i])
            .ok_or_else(|| Error::DataIntegrity(format!("unknown species: {}", id)))
    }

    fn reaction(&self, id: &str) -> Result<&ReactionRecord> {
        self.reaction_index
            .get(id)
            .map(|&i| &self.record.reactions[i])
            .ok_or_else(|| Error::DataIntegrity(format!("unknown reaction: {}", id)))
    }

    fn group(&self, id: &str) -> Result<&Vec<String>> {
        self.record
            .groups
            .get(id)
            .ok_or_else(|| Error::DataIntegrity(format!("unknown group: {}", id)))
    }
}

impl PathwayDataProvider for MemoryProvider {
    fn pathway_reaction_ids(&self, pathway_id: &str) -> Result<Vec<String>> {
        self.group(pathway_id).cloned()
    }

    fn pathway_species_ids(&self, pathway_id: &str) -> Result<BTreeSet<String>> {
        let mut ids = BTreeSet::new();
        for reaction_id in self.group(pathway_id)? {
            let reaction = self.reaction(reaction_id)?;
            for participant in reaction.reactants.iter().chain(&reaction.products) {
                ids.insert(participant.species.clone());
            }
        }
        Ok(ids)
    }

    fn group_member_ids(&self, group_id: &str) -> Result<BTreeSet<String>> {
        Ok(self.group(group_id)?.iter().cloned().collect())
    }

    fn reaction_participants(&self, reaction_id: &str) -> Result<ReactionParticipants> {
        let reaction = self.reaction(reaction_id)?;
        Ok(ReactionParticipants {
            reactants: reaction.reactants.clone(),
            products: reaction.products.clone(),
        })
    }

    fn species_name(&self, species_id: &str) -> Result<String> {
        Ok(self.species(species_id)?.name.clone())
    }

    fn miriam_annotation(&self, node_id: &str) -> Result<MiriamAnnotation> {
        if let Some(&i) = self.species_index.get(node_id) {
            return Ok(self.record.species[i].miriam.clone());
        }
        Ok(self.reaction(node_id)?.miriam.clone())
    }

    fn secondary_annotation(&self, node_id: &str) -> Result<SecondaryAnnotation> {
        if let Some(&i) = self.species_index.get(node_id) {
            return Ok(self.record.species[i].secondary.clone());
        }
        if let Some(&i) = self.reaction_index.get(node_id) {
            return Ok(self.record.reactions[i].secondary.clone());
        }
        if self.record.groups.contains_key(node_id) {
            return Ok(self
                .record
                .group_annotations
                .get(node_id)
                .cloned()
                .unwrap_or_default());
        }
        Err(Error::DataIntegrity(format!("unknown node: {}", node_id)))
    }
}
