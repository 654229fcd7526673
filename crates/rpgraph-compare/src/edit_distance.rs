//! Graph edit distance between comparison graphs.
//!
//! `GraphSimilarity` is the capability the scorer needs: a distance between
//! two graphs and the worst-case distance used to normalize it. The pairwise
//! matrix over a list of graphs is computed in parallel with rayon.
//!
//! `BipartiteEditDistance` approximates the edit distance the Riesen–Bunke
//! way: node edits are cast as an assignment problem whose cost matrix adds a
//! local edge-degree estimate to each node operation; the assignment is then
//! turned into a complete edit path and its exact cost is returned. The
//! result is an upper bound of the true edit distance and is zero for two
//! identically labelled graphs.

use ndarray::Array2;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use rayon::prelude::*;
use rpgraph_core::{AssignmentStrategy, EditCosts, RpGraphConfig};
use std::collections::HashSet;

use crate::comparison::ComparisonGraph;

/// Stand-in for a forbidden assignment. Finite so potentials stay numeric.
const FORBIDDEN: f64 = 1.0e12;

/// Pairwise distances and similarities over a list of graphs.
#[derive(Debug, Clone)]
pub struct PairwiseMatrix {
    pub distances: Array2<f64>,
    /// Similarities in [0, 1]; 1 on the diagonal.
    pub similarities: Array2<f64>,
}

/// Structural similarity between comparison graphs.
pub trait GraphSimilarity: Send + Sync {
    /// Edit distance from `a` to `b`.
    fn distance(&self, a: &ComparisonGraph, b: &ComparisonGraph) -> f64;

    /// Cost of deleting all of `a` and inserting all of `b`.
    fn max_distance(&self, a: &ComparisonGraph, b: &ComparisonGraph) -> f64;

    /// Similarity in [0, 1] derived from the distance.
    fn similarity(&self, a: &ComparisonGraph, b: &ComparisonGraph) -> (f64, f64) {
        let distance = self.distance(a, b);
        let max = self.max_distance(a, b);
        let similarity = if max <= 0.0 {
            1.0
        } else {
            (1.0 - distance / max).clamp(0.0, 1.0)
        };
        (distance, similarity)
    }

    /// Symmetric pairwise matrix over `graphs`, computed in parallel.
    fn compare(&self, graphs: &[&ComparisonGraph]) -> PairwiseMatrix {
        let n = graphs.len();
        let indices: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .collect();

        let pairs: Vec<((usize, usize), (f64, f64))> = indices
            .par_iter()
            .map(|&(i, j)| ((i, j), self.similarity(graphs[i], graphs[j])))
            .collect();

        // Upper triangle mirrored; the diagonal is identity.
        let mut distances = Array2::<f64>::zeros((n, n));
        let mut similarities = Array2::<f64>::eye(n);
        for ((i, j), (d, s)) in pairs {
            distances[[i, j]] = d;
            distances[[j, i]] = d;
            similarities[[i, j]] = s;
            similarities[[j, i]] = s;
        }

        PairwiseMatrix {
            distances,
            similarities,
        }
    }
}

/// Bipartite approximation of the graph edit distance.
#[derive(Debug, Clone)]
pub struct BipartiteEditDistance {
    costs: EditCosts,
    strategy: AssignmentStrategy,
}

impl BipartiteEditDistance {
    pub fn new(costs: EditCosts, strategy: AssignmentStrategy) -> Self {
        Self { costs, strategy }
    }

    pub fn from_config(config: &RpGraphConfig) -> Self {
        Self::new(config.edit_costs, config.assignment)
    }

    /// Assignment cost matrix of size (n + m)²: substitutions top-left,
    /// deletions top-right diagonal, insertions bottom-left diagonal.
    fn cost_matrix(&self, a: &ComparisonGraph, b: &ComparisonGraph) -> Vec<f64> {
        let c = &self.costs;
        let (n, m) = (a.node_count(), b.node_count());
        let size = n + m;
        let mut cost = vec![0.0; size * size];

        let degrees = |g: &ComparisonGraph, i: usize| {
            let idx = NodeIndex::new(i);
            (g.in_degree(idx) as f64, g.out_degree(idx) as f64)
        };
        let edge_gap = |x: f64, y: f64| {
            if x > y {
                (x - y) * c.edge_deletion
            } else {
                (y - x) * c.edge_insertion
            }
        };

        for i in 0..n {
            let (in_a, out_a) = degrees(a, i);
            for j in 0..m {
                let (in_b, out_b) = degrees(b, j);
                let relabel = if a.label(NodeIndex::new(i)) == b.label(NodeIndex::new(j)) {
                    0.0
                } else {
                    c.node_substitution
                };
                // Each edge touches two nodes, so half its cost goes to each end.
                let edges = (edge_gap(in_a, in_b) + edge_gap(out_a, out_b)) / 2.0;
                cost[i * size + j] = relabel + edges;
            }
            for k in 0..n {
                cost[i * size + m + k] = if k == i {
                    c.node_deletion + (in_a + out_a) * c.edge_deletion / 2.0
                } else {
                    FORBIDDEN
                };
            }
        }
        for k in 0..m {
            let (in_b, out_b) = degrees(b, k);
            for j in 0..m {
                cost[(n + k) * size + j] = if k == j {
                    c.node_insertion + (in_b + out_b) * c.edge_insertion / 2.0
                } else {
                    FORBIDDEN
                };
            }
            // Bottom-right block (dummy to dummy) stays zero.
        }
        cost
    }

    /// Exact cost of the edit path induced by a node mapping from `a` into `b`.
    fn edit_path_cost(&self, a: &ComparisonGraph, b: &ComparisonGraph, mapping: &[Option<usize>]) -> f64 {
        let c = &self.costs;
        let mut total = 0.0;
        let mut used = vec![false; b.node_count()];

        for (i, target) in mapping.iter().enumerate() {
            match target {
                Some(j) => {
                    used[*j] = true;
                    if a.label(NodeIndex::new(i)) != b.label(NodeIndex::new(*j)) {
                        total += c.node_substitution;
                    }
                }
                None => total += c.node_deletion,
            }
        }
        total += used.iter().filter(|u| !**u).count() as f64 * c.node_insertion;

        let mut matched: HashSet<(usize, usize)> = HashSet::new();
        for edge in a.inner().edge_references() {
            let mapped = (
                mapping[edge.source().index()],
                mapping[edge.target().index()],
            );
            match mapped {
                (Some(s), Some(t))
                    if b.inner()
                        .find_edge(NodeIndex::new(s), NodeIndex::new(t))
                        .is_some() =>
                {
                    matched.insert((s, t));
                }
                _ => total += c.edge_deletion,
            }
        }
        let unmatched_b = b
            .inner()
            .edge_references()
            .filter(|e| !matched.contains(&(e.source().index(), e.target().index())))
            .count();
        total += unmatched_b as f64 * c.edge_insertion;

        total
    }
}

impl Default for BipartiteEditDistance {
    fn default() -> Self {
        Self::new(EditCosts::default(), AssignmentStrategy::default())
    }
}

impl GraphSimilarity for BipartiteEditDistance {
    fn distance(&self, a: &ComparisonGraph, b: &ComparisonGraph) -> f64 {
        let (n, m) = (a.node_count(), b.node_count());
        if n + m == 0 {
            return 0.0;
        }

        let cost = self.cost_matrix(a, b);
        let assignment = match self.strategy {
            AssignmentStrategy::Hungarian => hungarian(&cost, n + m),
            AssignmentStrategy::Greedy => greedy(&cost, n + m),
        };

        let mapping: Vec<Option<usize>> = assignment[..n]
            .iter()
            .map(|&col| if col < m { Some(col) } else { None })
            .collect();
        self.edit_path_cost(a, b, &mapping)
    }

    fn max_distance(&self, a: &ComparisonGraph, b: &ComparisonGraph) -> f64 {
        let c = &self.costs;
        a.node_count() as f64 * c.node_deletion
            + b.node_count() as f64 * c.node_insertion
            + a.edge_count() as f64 * c.edge_deletion
            + b.edge_count() as f64 * c.edge_insertion
    }
}

/// Minimum-cost assignment of an `n × n` row-major matrix (Hungarian method
/// with row/column potentials). Returns the column assigned to each row.
pub fn hungarian(cost: &[f64], n: usize) -> Vec<usize> {
    // 1-based internally; index 0 is the virtual start column.
    let mut u = vec![0.0; n + 1];
    let mut v = vec![0.0; n + 1];
    let mut row_of = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for row in 1..=n {
        row_of[0] = row;
        let mut col0 = 0;
        let mut min_slack = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[col0] = true;
            let row0 = row_of[col0];
            let mut delta = f64::INFINITY;
            let mut col1 = 0;
            for col in 1..=n {
                if used[col] {
                    continue;
                }
                let slack = cost[(row0 - 1) * n + (col - 1)] - u[row0] - v[col];
                if slack < min_slack[col] {
                    min_slack[col] = slack;
                    way[col] = col0;
                }
                if min_slack[col] < delta {
                    delta = min_slack[col];
                    col1 = col;
                }
            }
            for col in 0..=n {
                if used[col] {
                    u[row_of[col]] += delta;
                    v[col] -= delta;
                } else {
                    min_slack[col] -= delta;
                }
            }
            col0 = col1;
            if row_of[col0] == 0 {
                break;
            }
        }

        loop {
            let col1 = way[col0];
            row_of[col0] = row_of[col1];
            col0 = col1;
            if col0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![0usize; n];
    for col in 1..=n {
        if row_of[col] != 0 {
            assignment[row_of[col] - 1] = col - 1;
        }
    }
    assignment
}

/// Row by row, take the cheapest column still free (ties go to the lowest index).
pub fn greedy(cost: &[f64], n: usize) -> Vec<usize> {
    let mut taken = vec![false; n];
    let mut assignment = vec![0usize; n];
    for row in 0..n {
        let mut best: Option<usize> = None;
        for col in 0..n {
            if taken[col] {
                continue;
            }
            if best.map_or(true, |b| cost[row * n + col] < cost[row * n + b]) {
                best = Some(col);
            }
        }
        if let Some(col) = best {
            taken[col] = true;
            assignment[row] = col;
        }
    }
    assignment
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Chain s0 -> r0 -> s1 -> r1 -> s2 ... with the given labels alternating.
    fn chain(labels: &[&str]) -> ComparisonGraph {
        let mut graph = ComparisonGraph::new();
        for label in labels {
            graph.add_node(label, label);
        }
        for pair in labels.windows(2) {
            graph.add_edge(pair[0], pair[1]);
        }
        graph
    }

    fn assignment_cost(cost: &[f64], n: usize, assignment: &[usize]) -> f64 {
        assignment
            .iter()
            .enumerate()
            .map(|(row, &col)| cost[row * n + col])
            .sum()
    }

    #[test]
    fn test_hungarian_finds_optimum() {
        let cost = vec![
            4.0, 1.0, 3.0, //
            2.0, 0.0, 5.0, //
            3.0, 2.0, 2.0,
        ];
        let assignment = hungarian(&cost, 3);
        assert_eq!(assignment_cost(&cost, 3, &assignment), 5.0);
        let mut cols = assignment.clone();
        cols.sort_unstable();
        assert_eq!(cols, vec![0, 1, 2]);
    }

    #[test]
    fn test_greedy_is_a_permutation() {
        let cost = vec![
            1.0, 2.0, //
            1.0, 9.0,
        ];
        let assignment = greedy(&cost, 2);
        assert_eq!(assignment, vec![0, 1]);
        // Greedy is not optimal here: 1 + 9 instead of 2 + 1.
        assert_eq!(assignment_cost(&cost, 2, &assignment), 10.0);
        assert_eq!(assignment_cost(&cost, 2, &hungarian(&cost, 2)), 3.0);
    }

    #[test]
    fn test_identical_graphs_have_zero_distance() {
        let a = chain(&["A", "1.1.1.1", "B", "2.2.2.2", "C"]);
        let b = chain(&["A", "1.1.1.1", "B", "2.2.2.2", "C"]);
        for strategy in [AssignmentStrategy::Hungarian, AssignmentStrategy::Greedy] {
            let ged = BipartiteEditDistance::new(EditCosts::default(), strategy);
            assert_eq!(ged.distance(&a, &b), 0.0);
            assert_eq!(ged.similarity(&a, &b).1, 1.0);
        }
    }

    #[test]
    fn test_single_relabel() {
        let a = chain(&["A", "1.1.1.1", "B"]);
        let b = chain(&["A", "1.1.1.2", "B"]);
        let ged = BipartiteEditDistance::default();
        assert_eq!(ged.distance(&a, &b), 1.0);
        // 3 + 3 nodes and 2 + 2 edges.
        assert_eq!(ged.max_distance(&a, &b), 10.0);
        assert!((ged.similarity(&a, &b).1 - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_extra_step_costs_node_and_edges() {
        let a = chain(&["A", "1.1.1.1", "B"]);
        let b = chain(&["A", "1.1.1.1", "B", "2.2.2.2", "C"]);
        let ged = BipartiteEditDistance::default();
        // Insert 2 nodes and 2 edges.
        assert_eq!(ged.distance(&a, &b), 4.0);
        assert_eq!(ged.distance(&b, &a), 4.0);
    }

    #[test]
    fn test_empty_graphs() {
        let empty = ComparisonGraph::new();
        let ged = BipartiteEditDistance::default();
        assert_eq!(ged.distance(&empty, &empty), 0.0);
        assert_eq!(ged.similarity(&empty, &empty).1, 1.0);

        let a = chain(&["A", "R", "B"]);
        assert_eq!(ged.distance(&a, &empty), 5.0);
        assert_eq!(ged.similarity(&a, &empty).1, 0.0);
    }

    #[test]
    fn test_costs_are_configurable() {
        let a = chain(&["A", "1.1.1.1", "B"]);
        let b = chain(&["A", "1.1.1.2", "B"]);
        let mut costs = EditCosts::default();
        costs.node_substitution = 0.5;
        let ged = BipartiteEditDistance::new(costs, AssignmentStrategy::Hungarian);
        assert_eq!(ged.distance(&a, &b), 0.5);
    }

    #[test]
    fn test_pairwise_matrix_is_symmetric() {
        let graphs = [
            chain(&["A", "1.1.1.1", "B"]),
            chain(&["A", "1.1.1.2", "B"]),
            chain(&["A", "1.1.1.1", "B", "2.2.2.2", "C"]),
        ];
        let refs: Vec<&ComparisonGraph> = graphs.iter().collect();
        let matrix = BipartiteEditDistance::default().compare(&refs);

        assert_eq!(matrix.distances.shape(), &[3, 3]);
        for i in 0..3 {
            assert_eq!(matrix.similarities[[i, i]], 1.0);
            assert_eq!(matrix.distances[[i, i]], 0.0);
            for j in 0..3 {
                assert_eq!(matrix.distances[[i, j]], matrix.distances[[j, i]]);
            }
        }
        assert_eq!(matrix.distances[[0, 1]], 1.0);
        assert_eq!(matrix.distances[[0, 2]], 4.0);
    }
}
