//! Pathway similarity scoring.
//!
//! Both pathways are expanded into abstraction families, pooled, and compared
//! pairwise. Each pair's similarity is scaled by the geometric mean of the two
//! graphs' information weights; pairs drawn from the same pathway are masked
//! out and the best cross-pathway value is the score.

use ndarray::Array2;
use rpgraph_core::{Error, PathwayDataProvider, Result, RpGraphConfig};
use serde::Serialize;
use tracing::{debug, info};

use crate::abstraction::{AbstractionFamily, AbstractionGenerator};
use crate::comparison::ComparisonGraph;
use crate::edit_distance::{BipartiteEditDistance, GraphSimilarity};

/// Which pathway a pooled graph came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Source,
    Target,
}

/// A pathway held by some provider.
#[derive(Clone, Copy)]
pub struct PathwayRef<'a> {
    pub provider: &'a dyn PathwayDataProvider,
    pub pathway_id: &'a str,
}

impl<'a> PathwayRef<'a> {
    pub fn new(provider: &'a dyn PathwayDataProvider, pathway_id: &'a str) -> Self {
        Self {
            provider,
            pathway_id,
        }
    }
}

/// Pairwise comparison of a pooled `[source..., target...]` family.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    pub distances: Array2<f64>,
    pub similarities: Array2<f64>,
    pub origins: Vec<Origin>,
    /// Normalized information weight of each pooled graph.
    pub weights: Vec<f64>,
}

impl SimilarityMatrix {
    /// Similarities scaled by `sqrt(w_i * w_j)`.
    pub fn weighted(&self) -> Array2<f64> {
        let mut weighted = self.similarities.clone();
        for ((i, j), value) in weighted.indexed_iter_mut() {
            *value *= (self.weights[i] * self.weights[j]).sqrt();
        }
        weighted
    }

    /// Weighted similarities with same-origin pairs set to zero.
    pub fn masked(&self) -> Array2<f64> {
        let mut masked = self.weighted();
        for ((i, j), value) in masked.indexed_iter_mut() {
            if self.origins[i] == self.origins[j] {
                *value = 0.0;
            }
        }
        masked
    }

    /// Indices and value of the best cross-origin pair (first in row order on ties).
    pub fn best_pair(&self) -> Option<(usize, usize, f64)> {
        let masked = self.masked();
        let mut best: Option<(usize, usize, f64)> = None;
        for ((i, j), &value) in masked.indexed_iter() {
            if self.origins[i] == self.origins[j] {
                continue;
            }
            if best.map_or(true, |(_, _, b)| value > b) {
                best = Some((i, j, value));
            }
        }
        best
    }

    /// Maximum of the masked matrix.
    pub fn best(&self) -> f64 {
        self.best_pair().map_or(0.0, |(_, _, value)| value)
    }
}

/// Scores how structurally similar two pathways are.
pub struct SimilarityScorer {
    generator: AbstractionGenerator,
    similarity: Box<dyn GraphSimilarity>,
}

impl SimilarityScorer {
    pub fn new(config: &RpGraphConfig) -> Self {
        Self::with_similarity(
            AbstractionGenerator::new(config),
            Box::new(BipartiteEditDistance::from_config(config)),
        )
    }

    pub fn with_similarity(
        generator: AbstractionGenerator,
        similarity: Box<dyn GraphSimilarity>,
    ) -> Self {
        Self {
            generator,
            similarity,
        }
    }

    /// Best weighted similarity between any abstraction of `source` and any
    /// abstraction of `target`, in [0, 1].
    pub fn similarity_score(
        &self,
        source: PathwayRef<'_>,
        target: PathwayRef<'_>,
        species_specificity: i32,
        reaction_specificity: i32,
    ) -> Result<f64> {
        let source_family = self.family(source, species_specificity, reaction_specificity)?;
        let target_family = self.family(target, species_specificity, reaction_specificity)?;

        let matrix = self.compare_families(&source_family, &target_family)?;
        let score = matrix.best();
        info!(
            "Similarity {} vs {} (species {}, reaction {}): {:.4}",
            source.pathway_id, target.pathway_id, species_specificity, reaction_specificity, score
        );
        Ok(score)
    }

    /// Pool two families and compare every pair.
    pub fn compare_families(
        &self,
        source: &AbstractionFamily,
        target: &AbstractionFamily,
    ) -> Result<SimilarityMatrix> {
        for family in [source, target] {
            if family.is_empty() {
                return Err(Error::ComparisonUnavailable(format!(
                    "no comparison graphs for {}",
                    family.pathway_id
                )));
            }
        }

        let pooled = source.graphs.iter().chain(target.graphs.iter());
        let graphs: Vec<&ComparisonGraph> = pooled.clone().map(|g| &g.graph).collect();
        let weights: Vec<f64> = pooled.map(|g| g.weight.normalized()).collect();
        let origins: Vec<Origin> = std::iter::repeat(Origin::Source)
            .take(source.len())
            .chain(std::iter::repeat(Origin::Target).take(target.len()))
            .collect();

        debug!(
            "Comparing {} x {} comparison graphs",
            source.len(),
            target.len()
        );
        let pairwise = self.similarity.compare(&graphs);

        Ok(SimilarityMatrix {
            distances: pairwise.distances,
            similarities: pairwise.similarities,
            origins,
            weights,
        })
    }

    fn family(
        &self,
        pathway: PathwayRef<'_>,
        species_specificity: i32,
        reaction_specificity: i32,
    ) -> Result<AbstractionFamily> {
        self.generator
            .generate(
                pathway.provider,
                pathway.pathway_id,
                species_specificity,
                reaction_specificity,
            )
            .map_err(|e| match e {
                Error::InvalidAbstractionLevel { .. } => e,
                other => Error::ComparisonUnavailable(format!(
                    "{}: {}",
                    pathway.pathway_id, other
                )),
            })
    }
}
