//! Append-only binary merge forest and its relabeling traversal.
//!
//! Each successful contraction is recorded by [`Dendrogram::connect`],
//! which joins the two participating labels under a fresh internal node.
//! Nodes live in an arena addressed by index, children are optional index
//! pairs, and labels resolve through an explicit label→index map, so
//! lookups never scan. The fresh internal labels advance in lockstep with
//! the graph's fresh vertex labels: the node created for a merge carries
//! the same label the surviving graph vertex was just assigned, which is
//! how later merges of that community find it.

use std::collections::HashMap;

use thiserror::Error;

/// Errors raised by [`Dendrogram::connect`].
///
/// Both variants indicate a corrupted merge history rather than malformed
/// caller input: the detector only ever connects labels it just observed
/// live in the graph.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum DendrogramError {
    /// A connect referenced a label with no corresponding node.
    #[error("label {label} is not present in the dendrogram")]
    UnknownLabel {
        /// The label that failed to resolve.
        label: usize,
    },
    /// A connect named the same node on both sides.
    #[error("cannot connect label {label} to itself")]
    SelfConnect {
        /// The label named twice.
        label: usize,
    },
}

#[derive(Clone, Debug)]
struct Node {
    children: Option<(usize, usize)>,
    has_parent: bool,
}

/// Binary forest recording the merge history of one detection pass.
///
/// Leaves are created up front in 1:1 correspondence with original vertex
/// indices; internal nodes are appended by [`Dendrogram::connect`] and
/// each has exactly two children. The forest grows monotonically and is
/// consumed once by [`Dendrogram::traverse`].
#[derive(Clone, Debug)]
pub struct Dendrogram {
    nodes: Vec<Node>,
    index_by_label: HashMap<usize, usize>,
    leaf_count: usize,
    next_label: usize,
}

impl Dendrogram {
    /// Creates a forest of `leaf_count` parentless leaves labeled
    /// `0..leaf_count`. Internal labels are minted from `leaf_count`
    /// upward, matching the graph's fresh-label counter.
    #[must_use]
    pub fn new(leaf_count: usize) -> Self {
        let nodes = (0..leaf_count)
            .map(|_| Node {
                children: None,
                has_parent: false,
            })
            .collect();
        let index_by_label = (0..leaf_count).map(|label| (label, label)).collect();
        Self {
            nodes,
            index_by_label,
            leaf_count,
            next_label: leaf_count,
        }
    }

    fn resolve(&self, label: usize) -> Result<usize, DendrogramError> {
        self.index_by_label
            .get(&label)
            .copied()
            .ok_or(DendrogramError::UnknownLabel { label })
    }

    /// Joins the nodes labeled `first` and `second` under a new internal
    /// node, in that child order, and returns the new node's label.
    ///
    /// # Errors
    /// Returns [`DendrogramError::UnknownLabel`] when either label has no
    /// node and [`DendrogramError::SelfConnect`] when both name the same
    /// node. Either means the merge history is corrupted and the run must
    /// abort.
    pub fn connect(&mut self, first: usize, second: usize) -> Result<usize, DendrogramError> {
        let first_index = self.resolve(first)?;
        let second_index = self.resolve(second)?;
        if first_index == second_index {
            return Err(DendrogramError::SelfConnect { label: first });
        }

        let label = self.next_label;
        self.next_label += 1;
        let index = self.nodes.len();
        self.nodes.push(Node {
            children: Some((first_index, second_index)),
            has_parent: false,
        });
        self.index_by_label.insert(label, index);
        self.nodes[first_index].has_parent = true;
        self.nodes[second_index].has_parent = true;
        Ok(label)
    }

    /// Node indices of the forest roots, in ascending creation order.
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| !node.has_parent)
            .map(|(index, _)| index)
    }

    /// Assigns each leaf its depth-first visit position and returns the
    /// mapping from original vertex index to output position.
    ///
    /// Roots are visited in ascending creation order, so a merge-free
    /// forest traverses to the identity mapping. Within a tree the first
    /// child is fully explored before the second; the explicit stack and
    /// per-node visited markers keep the walk iterative and avoid
    /// re-pushing explored subtrees. Every leaf is reached exactly once,
    /// so the result is a bijection on `[0, leaf_count)` by construction.
    #[must_use]
    pub fn traverse(&self) -> Vec<usize> {
        let mut positions = vec![0; self.leaf_count];
        let mut visited = vec![false; self.nodes.len()];
        let mut next_position = 0;
        let mut stack = Vec::new();

        for root in self.roots() {
            stack.push(root);
            while let Some(&top) = stack.last() {
                visited[top] = true;
                match self.nodes[top].children {
                    None => {
                        // Leaf indices coincide with original vertex indices.
                        positions[top] = next_position;
                        next_position += 1;
                        stack.pop();
                    }
                    Some((first, _)) if !visited[first] => stack.push(first),
                    Some((_, second)) if !visited[second] => stack.push(second),
                    Some(_) => {
                        stack.pop();
                    }
                }
            }
        }
        positions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_free_forest_traverses_to_identity() {
        let dendrogram = Dendrogram::new(4);
        assert_eq!(dendrogram.roots().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert_eq!(dendrogram.traverse(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn empty_forest_traverses_to_nothing() {
        let dendrogram = Dendrogram::new(0);
        assert!(dendrogram.traverse().is_empty());
    }

    #[test]
    fn connect_mints_labels_in_lockstep_with_leaf_count() {
        let mut dendrogram = Dendrogram::new(3);
        assert_eq!(dendrogram.connect(0, 1), Ok(3));
        assert_eq!(dendrogram.connect(3, 2), Ok(4));
        assert_eq!(dendrogram.roots().collect::<Vec<_>>(), vec![4]);
    }

    #[test]
    fn traversal_visits_first_child_subtree_first() {
        // ((0, 1), 2) and a detached leaf 3.
        let mut dendrogram = Dendrogram::new(4);
        dendrogram.connect(0, 1).expect("labels are known");
        dendrogram.connect(4, 2).expect("labels are known");

        // Root order: leaf 3 first (created before the internal nodes),
        // then the merged tree in child order 0, 1, 2.
        assert_eq!(dendrogram.traverse(), vec![1, 2, 3, 0]);
    }

    #[test]
    fn child_order_follows_argument_order() {
        let mut dendrogram = Dendrogram::new(2);
        dendrogram.connect(1, 0).expect("labels are known");
        // First argument's subtree is visited first.
        assert_eq!(dendrogram.traverse(), vec![1, 0]);
    }

    #[test]
    fn disconnected_merges_leave_one_root_per_tree() {
        let mut dendrogram = Dendrogram::new(4);
        dendrogram.connect(0, 1).expect("labels are known");
        dendrogram.connect(2, 3).expect("labels are known");

        assert_eq!(dendrogram.roots().collect::<Vec<_>>(), vec![4, 5]);
        assert_eq!(dendrogram.traverse(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn connect_rejects_unknown_and_duplicate_labels() {
        let mut dendrogram = Dendrogram::new(2);
        assert_eq!(
            dendrogram.connect(0, 9),
            Err(DendrogramError::UnknownLabel { label: 9 })
        );
        assert_eq!(
            dendrogram.connect(1, 1),
            Err(DendrogramError::SelfConnect { label: 1 })
        );
    }
}
