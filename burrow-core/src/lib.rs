//! Burrow core library.
//!
//! Computes a vertex permutation intended to improve memory locality for
//! sparse graph and tensor storage. A single greedy, modularity-guided
//! community detection pass contracts vertex pairs in place, the merge
//! history is recorded as an append-only binary forest, and a depth-first
//! traversal of that forest yields the final relabeling.

mod dendrogram;
mod detector;
mod error;
mod graph;
mod modularity;
mod permutation;
mod reorder;

pub use crate::{
    dendrogram::{Dendrogram, DendrogramError},
    detector::CommunityDetector,
    error::{ReorderError, ReorderErrorCode, Result},
    graph::{GraphError, WeightedGraph},
    modularity::ModularityScorer,
    permutation::{NonBijectivePositions, Permutation},
    reorder::Reorderer,
};
