//! rpgraph Compare: abstraction graphs and pathway similarity.
//!
//! `AbstractionGenerator` relabels a pathway at decreasing levels of chemical
//! detail, `BipartiteEditDistance` compares the resulting graphs, and
//! `SimilarityScorer` reduces everything to one score in [0, 1].

pub mod abstraction;
pub mod comparison;
pub mod edit_distance;
pub mod level;
pub mod scorer;

pub use abstraction::{
    AbstractionFamily, AbstractionGenerator, AbstractionLayer, MissingAnnotation, MissingKind,
};
pub use comparison::{ComparisonGraph, WeightedGraph};
pub use edit_distance::{BipartiteEditDistance, GraphSimilarity, PairwiseMatrix};
pub use level::{
    InfoWeight, ReactionLayer, ReactionSpecificity, SpeciesLayer, SpeciesSpecificity,
};
pub use scorer::{Origin, PathwayRef, SimilarityMatrix, SimilarityScorer};
