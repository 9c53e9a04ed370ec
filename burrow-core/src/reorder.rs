//! Orchestrates community detection and dendrogram traversal.

use tracing::{info, instrument};

use crate::{
    dendrogram::Dendrogram,
    detector::CommunityDetector,
    error::{ReorderError, Result},
    graph::WeightedGraph,
    permutation::Permutation,
};

/// Generates locality-improving relabelings for weighted graphs.
///
/// The detection pass mutates a working copy of the caller's graph, so the
/// original is preserved for callers that also want to emit the relabeled
/// edge set afterwards.
///
/// # Examples
/// ```
/// use burrow_core::{Reorderer, WeightedGraph};
///
/// let mut graph = WeightedGraph::new(3);
/// graph.insert_edge(0, 1, 1.0)?;
/// graph.insert_edge(1, 2, 1.0)?;
///
/// let permutation = Reorderer::new().permutation(&graph)?;
/// assert_eq!(permutation.len(), 3);
/// # Ok::<(), burrow_core::ReorderError>(())
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Reorderer;

impl Reorderer {
    /// Creates a reorderer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Computes the old-index → new-position permutation for `graph`.
    ///
    /// The permutation is the depth-first leaf order of the merge
    /// dendrogram; no reversal or other post-processing is applied.
    /// Degenerate inputs (no vertices, no edges, a single vertex) yield the
    /// identity permutation.
    ///
    /// # Errors
    /// Returns an invariant-violation [`ReorderError`] when the detection
    /// pass or the traversal reaches a corrupted state; no partial
    /// permutation is ever returned.
    #[instrument(
        name = "core.reorder",
        err,
        skip_all,
        fields(vertices = graph.vertex_count(), total_weight = graph.total_weight()),
    )]
    pub fn permutation(&self, graph: &WeightedGraph) -> Result<Permutation> {
        let mut working = graph.clone();
        let mut dendrogram = Dendrogram::new(graph.vertex_count());
        CommunityDetector::new().run(&mut working, &mut dendrogram)?;

        let permutation = Permutation::try_from_positions(dendrogram.traverse())?;
        info!(vertices = permutation.len(), "ordering generation completed");
        Ok(permutation)
    }

    /// Expresses every directed adjacency entry of `graph` in the new
    /// labels, for callers emitting a relabeled graph file.
    ///
    /// `graph` must be the unmodified input the permutation was computed
    /// from, so its labels coincide with original vertex indices.
    ///
    /// # Errors
    /// Returns [`ReorderError::InvalidVertex`] when an edge references a
    /// label the permutation does not cover.
    pub fn relabeled_edges(
        &self,
        graph: &WeightedGraph,
        permutation: &Permutation,
    ) -> Result<Vec<(usize, usize, f64)>> {
        graph
            .edges()
            .map(|(from, to, weight)| {
                let new_from = self.position_for(permutation, from)?;
                let new_to = self.position_for(permutation, to)?;
                Ok((new_from, new_to, weight))
            })
            .collect()
    }

    fn position_for(&self, permutation: &Permutation, label: usize) -> Result<usize> {
        permutation
            .position_of(label)
            .ok_or(ReorderError::InvalidVertex {
                vertex: label,
                vertex_count: permutation.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_from_edges(vertex_count: usize, edges: &[(usize, usize)]) -> WeightedGraph {
        let mut graph = WeightedGraph::new(vertex_count);
        for &(from, to) in edges {
            graph.insert_edge(from, to, 1.0).expect("edge must insert");
        }
        graph
    }

    #[test]
    fn degenerate_inputs_yield_the_identity_permutation() {
        let reorderer = Reorderer::new();
        for vertex_count in [0, 1, 5] {
            let graph = WeightedGraph::new(vertex_count);
            let permutation = reorderer.permutation(&graph).expect("must succeed");
            assert_eq!(permutation, Permutation::identity(vertex_count));
        }
    }

    #[test]
    fn six_vertex_scenario_produces_the_expected_permutation() {
        let graph = graph_from_edges(6, &[(2, 5), (1, 2), (2, 4), (4, 5)]);
        let permutation = Reorderer::new()
            .permutation(&graph)
            .expect("must succeed");
        assert_eq!(permutation.as_slice(), &[0, 2, 3, 1, 4, 5]);
    }

    #[test]
    fn input_graph_is_preserved_and_reruns_agree() {
        let graph = graph_from_edges(6, &[(2, 5), (1, 2), (2, 4), (4, 5)]);
        let reorderer = Reorderer::new();

        let first = reorderer.permutation(&graph).expect("first run");
        assert_eq!(graph.total_weight(), 4.0);
        assert_eq!(graph.label_of(2), Some(2), "input graph must stay untouched");

        let second = reorderer.permutation(&graph).expect("second run");
        assert_eq!(first, second);
    }

    #[test]
    fn relabeled_edges_map_both_directions_through_the_permutation() {
        let graph = graph_from_edges(3, &[(0, 1), (1, 2)]);
        let reorderer = Reorderer::new();
        let permutation = reorderer.permutation(&graph).expect("must succeed");

        let mut edges = reorderer
            .relabeled_edges(&graph, &permutation)
            .expect("labels are covered");
        edges.sort_by(|a, b| a.partial_cmp(b).expect("weights are finite"));

        assert_eq!(edges.len(), 4);
        for (from, to, weight) in &edges {
            assert!(*from < 3 && *to < 3);
            assert_eq!(*weight, 1.0);
            // The mirrored direction survives relabeling.
            assert!(edges.contains(&(*to, *from, *weight)));
        }
    }

    #[test]
    fn relabeled_edges_reject_labels_outside_the_permutation() {
        let graph = graph_from_edges(3, &[(0, 1), (1, 2)]);
        let reorderer = Reorderer::new();
        let short = Permutation::identity(1);

        let err = reorderer
            .relabeled_edges(&graph, &short)
            .expect_err("labels exceed the permutation");
        assert!(matches!(err, ReorderError::InvalidVertex { .. }));
    }
}
