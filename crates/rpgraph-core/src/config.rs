//! Configuration for graph construction and pathway comparison.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default group holding the pathway's reactions.
pub const DEFAULT_PATHWAY_ID: &str = "rp_pathway";
/// Default group holding the backbone species.
pub const DEFAULT_CENTRAL_GROUP: &str = "central_species";
/// Default group holding the sink species.
pub const DEFAULT_SINK_GROUP: &str = "rp_sink_species";
/// Default upper bound on the number of comparison graphs per pathway.
pub const DEFAULT_MAX_FAMILY_SIZE: usize = 512;

/// Unit costs used by the graph edit distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EditCosts {
    pub node_insertion: f64,
    pub node_deletion: f64,
    pub node_substitution: f64,
    pub edge_insertion: f64,
    pub edge_deletion: f64,
}

impl EditCosts {
    /// Uniform cost for every edit operation.
    pub fn uniform(cost: f64) -> Self {
        Self {
            node_insertion: cost,
            node_deletion: cost,
            node_substitution: cost,
            edge_insertion: cost,
            edge_deletion: cost,
        }
    }

    fn is_valid(&self) -> bool {
        [
            self.node_insertion,
            self.node_deletion,
            self.node_substitution,
            self.edge_insertion,
            self.edge_deletion,
        ]
        .iter()
        .all(|c| c.is_finite() && *c >= 0.0)
    }
}

impl Default for EditCosts {
    fn default() -> Self {
        Self::uniform(1.0)
    }
}

/// How the node-to-node assignment of the edit distance is solved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStrategy {
    /// Optimal assignment (Hungarian method).
    #[default]
    Hungarian,
    /// Row-by-row cheapest free column.
    Greedy,
}

/// Node identity in comparison graphs when two nodes end up with the same label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelPolicy {
    /// The label is the node identity: equal labels collapse into one node.
    #[default]
    MergeByLabel,
    /// Every original node stays distinct and carries its label as an attribute.
    KeepDistinct,
}

/// Top-level rpgraph configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpGraphConfig {
    /// Group listing the pathway's reactions.
    pub pathway_id: String,
    /// Group listing the central species.
    pub central_group_id: String,
    /// Group listing the sink species.
    pub sink_group_id: String,
    /// Default InChIKey layer depth (0 = raw species id).
    pub species_specificity: i32,
    /// Default EC layer depth (-1 = SMILES, 0 = raw reaction id).
    pub reaction_specificity: i32,
    /// Maximum number of comparison graphs generated for one pathway.
    pub max_family_size: usize,
    pub edit_costs: EditCosts,
    pub assignment: AssignmentStrategy,
    pub label_policy: LabelPolicy,
}

impl Default for RpGraphConfig {
    fn default() -> Self {
        Self {
            pathway_id: DEFAULT_PATHWAY_ID.to_string(),
            central_group_id: DEFAULT_CENTRAL_GROUP.to_string(),
            sink_group_id: DEFAULT_SINK_GROUP.to_string(),
            species_specificity: 2,
            reaction_specificity: 3,
            max_family_size: DEFAULT_MAX_FAMILY_SIZE,
            edit_costs: EditCosts::default(),
            assignment: AssignmentStrategy::default(),
            label_policy: LabelPolicy::default(),
        }
    }
}

impl RpGraphConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            pathway_id: std::env::var("RPGRAPH_PATHWAY_ID").unwrap_or(defaults.pathway_id),
            central_group_id: std::env::var("RPGRAPH_CENTRAL_GROUP")
                .unwrap_or(defaults.central_group_id),
            sink_group_id: std::env::var("RPGRAPH_SINK_GROUP").unwrap_or(defaults.sink_group_id),
            species_specificity: env_parse("RPGRAPH_SPECIES_SPECIFICITY")
                .unwrap_or(defaults.species_specificity),
            reaction_specificity: env_parse("RPGRAPH_REACTION_SPECIFICITY")
                .unwrap_or(defaults.reaction_specificity),
            max_family_size: env_parse("RPGRAPH_MAX_FAMILY_SIZE")
                .unwrap_or(defaults.max_family_size),
            edit_costs: env_parse("RPGRAPH_EDIT_COST")
                .map(EditCosts::uniform)
                .unwrap_or(defaults.edit_costs),
            assignment: match std::env::var("RPGRAPH_ASSIGNMENT").as_deref() {
                Ok("greedy") => AssignmentStrategy::Greedy,
                Ok("hungarian") | Err(_) => AssignmentStrategy::Hungarian,
                Ok(other) => {
                    return Err(Error::Config(format!("unknown assignment strategy: {}", other)))
                }
            },
            label_policy: match std::env::var("RPGRAPH_LABEL_POLICY").as_deref() {
                Ok("keep_distinct") => LabelPolicy::KeepDistinct,
                Ok("merge_by_label") | Err(_) => LabelPolicy::MergeByLabel,
                Ok(other) => return Err(Error::Config(format!("unknown label policy: {}", other))),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject settings no component can work with.
    pub fn validate(&self) -> Result<()> {
        if self.max_family_size == 0 {
            return Err(Error::Config("max_family_size must be at least 1".into()));
        }
        if !self.edit_costs.is_valid() {
            return Err(Error::Config(
                "edit costs must be finite and non-negative".into(),
            ));
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
