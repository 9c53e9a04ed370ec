//! Modularity scoring for greedy merge candidates.
//!
//! The score of merging two adjacent vertices is the classic modularity
//! gain `w(u,v)/2m − deg(u)·deg(v)/(2m)²`: positive when the shared edge
//! weight exceeds what the degrees alone would predict. The normalizing
//! constant `m` is fixed here as the sum of undirected edge weights as
//! inserted, self-loops counted once. That is the convention maintained by
//! [`crate::WeightedGraph::total_weight`] and pinned by unit test, since an
//! inconsistent convention silently rescales every score.

/// Scores candidate merges against a fixed total graph weight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModularityScorer {
    two_m: f64,
}

impl ModularityScorer {
    /// Creates a scorer for a graph of the given total edge weight.
    ///
    /// Returns `None` when the weight is not positive: an empty graph
    /// admits no merges, so no scorer exists for it.
    #[must_use]
    pub fn new(total_weight: f64) -> Option<Self> {
        (total_weight > 0.0).then_some(Self {
            two_m: 2.0 * total_weight,
        })
    }

    /// Modularity contribution of merging two vertices joined by an edge of
    /// `edge_weight`, given their current weighted degrees.
    #[must_use]
    pub fn score(&self, edge_weight: f64, degree_u: f64, degree_v: f64) -> f64 {
        edge_weight / self.two_m - (degree_u * degree_v) / (self.two_m * self.two_m)
    }
}
