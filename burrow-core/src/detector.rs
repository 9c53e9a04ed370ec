//! Single-pass greedy community detection.
//!
//! One pass over a fixed snapshot ordering of the vertices, processing the
//! lightest vertices first: each vertex is contracted into the neighbor
//! whose merge yields the greatest positive modularity score, and every
//! merge is recorded in the dendrogram. The pass is deliberately not
//! iterated to convergence; a single sweep is the documented design
//! limitation of this algorithm, not a defect.

use tracing::{info, instrument};

use crate::{
    dendrogram::Dendrogram, error::Result, graph::WeightedGraph, modularity::ModularityScorer,
};

/// Drives one greedy merge pass over a working graph.
#[derive(Clone, Copy, Debug, Default)]
pub struct CommunityDetector;

impl CommunityDetector {
    /// Creates a detector.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Runs one greedy pass, contracting vertices into their best-scoring
    /// neighbors and recording each merge in `dendrogram`.
    ///
    /// Degenerate inputs (no edge weight, at most one vertex) are not
    /// errors: the pass simply performs no merges and the dendrogram stays
    /// a flat forest of leaves.
    ///
    /// # Errors
    /// Returns an invariant-violation error when the graph or dendrogram
    /// reaches a corrupted state mid-pass; no partial result is usable
    /// afterwards.
    #[instrument(
        name = "core.community_detection",
        err,
        skip_all,
        fields(
            vertices = graph.vertex_count(),
            total_weight = graph.total_weight(),
        ),
    )]
    pub fn run(&self, graph: &mut WeightedGraph, dendrogram: &mut Dendrogram) -> Result<()> {
        let Some(scorer) = ModularityScorer::new(graph.total_weight()) else {
            return Ok(());
        };
        if graph.vertex_count() <= 1 {
            return Ok(());
        }

        // The ordering is computed once, before any merge, and never
        // recomputed as contractions change degrees.
        let order = snapshot_order(graph);
        let mut merges = 0_usize;
        for vertex in order {
            if graph.is_merged(vertex) {
                continue;
            }
            let Some(current_label) = graph.label_of(vertex) else {
                continue;
            };
            let Some(neighbor_label) = best_neighbor(graph, &scorer, vertex, current_label)?
            else {
                continue;
            };

            // The neighbor's label before contraction reassigns it; the
            // dendrogram must be told about the node that existed when the
            // merge was decided.
            let neighbor_slot = graph.resolve(neighbor_label)?;
            graph.contract(vertex, neighbor_slot)?;
            dendrogram.connect(current_label, neighbor_label)?;
            merges += 1;
        }

        info!(merges, "community detection pass completed");
        Ok(())
    }
}

/// All vertex slots sorted ascending by weighted degree, ties broken by
/// original index for determinism.
fn snapshot_order(graph: &WeightedGraph) -> Vec<usize> {
    let mut order: Vec<usize> = (0..graph.vertex_count()).collect();
    order.sort_by(|&a, &b| {
        graph
            .weighted_degree(a)
            .total_cmp(&graph.weighted_degree(b))
            .then(a.cmp(&b))
    });
    order
}

/// The neighbor of `vertex` whose merge scores strictly greatest, provided
/// that score is positive. Neighbors are scanned in ascending label order,
/// so score ties break toward the lowest label.
fn best_neighbor(
    graph: &WeightedGraph,
    scorer: &ModularityScorer,
    vertex: usize,
    current_label: usize,
) -> Result<Option<usize>> {
    let degree = graph.weighted_degree(vertex);
    let mut candidates: Vec<(usize, f64)> = graph.neighbors(vertex).collect();
    candidates.sort_by_key(|&(label, _)| label);

    let mut best: Option<(usize, f64)> = None;
    for (label, weight) in candidates {
        if label == current_label {
            // Self-loops record weight internal to the community and are
            // never merge candidates.
            continue;
        }
        let slot = graph.resolve(label)?;
        let score = scorer.score(weight, graph.weighted_degree(slot), degree);
        if best.is_none_or(|(_, incumbent)| score > incumbent) {
            best = Some((label, score));
        }
    }
    Ok(best.and_then(|(label, score)| (score > 0.0).then_some(label)))
}
