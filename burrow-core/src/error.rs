//! Error types for the burrow core library.
//!
//! Defines the crate-level error enum, its stable machine-readable codes,
//! and a convenient result alias. The enum separates malformed input from
//! the two invariant-violation classes (graph and dendrogram) so callers
//! can tell "bad input" apart from "internal bug".

use std::fmt;

use thiserror::Error;

use crate::{
    dendrogram::DendrogramError, graph::GraphError, permutation::NonBijectivePositions,
};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// Error type produced while generating a relabeling.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ReorderError {
    /// The input referenced a vertex outside the declared vertex count.
    #[error("vertex {vertex} is out of bounds for a graph of {vertex_count} vertices")]
    InvalidVertex {
        /// The offending vertex index.
        vertex: usize,
        /// Number of vertices in the graph.
        vertex_count: usize,
    },
    /// The working graph reached a state that violates its own invariants.
    ///
    /// The detection run is aborted: continuing would propagate
    /// inconsistent weights into the permutation.
    #[error("graph invariant violated: {error}")]
    GraphInvariant {
        /// Underlying graph error describing the corrupted state.
        #[source]
        error: GraphError,
    },
    /// The dendrogram was asked to connect labels it does not know.
    #[error("dendrogram invariant violated: {error}")]
    DendrogramInvariant {
        /// Underlying dendrogram error describing the corrupted history.
        #[source]
        error: DendrogramError,
    },
    /// The dendrogram traversal did not cover every vertex exactly once.
    ///
    /// A partial merge history cannot be repaired into a permutation, so
    /// the whole computation fails rather than returning a partial result.
    #[error("traversal produced a non-bijective relabeling: {error}")]
    NonBijective {
        /// The bijection check that failed.
        #[source]
        error: NonBijectivePositions,
    },
}

define_error_codes! {
    /// Stable codes describing [`ReorderError`] variants.
    enum ReorderErrorCode for ReorderError {
        /// The input referenced a vertex outside the declared vertex count.
        InvalidVertex => InvalidVertex { .. } => "REORDER_INVALID_VERTEX",
        /// The working graph reached a state that violates its own invariants.
        GraphInvariantViolation => GraphInvariant { .. } => "REORDER_GRAPH_INVARIANT_VIOLATION",
        /// The dendrogram was asked to connect labels it does not know.
        DendrogramInvariantViolation => DendrogramInvariant { .. }
            => "REORDER_DENDROGRAM_INVARIANT_VIOLATION",
        /// The dendrogram traversal did not cover every vertex exactly once.
        NonBijectivePermutation => NonBijective { .. } => "REORDER_NON_BIJECTIVE_PERMUTATION",
    }
}

impl From<GraphError> for ReorderError {
    fn from(error: GraphError) -> Self {
        match error {
            GraphError::VertexOutOfBounds {
                vertex,
                vertex_count,
            } => Self::InvalidVertex {
                vertex,
                vertex_count,
            },
            other => Self::GraphInvariant { error: other },
        }
    }
}

impl From<DendrogramError> for ReorderError {
    fn from(error: DendrogramError) -> Self {
        Self::DendrogramInvariant { error }
    }
}

impl From<NonBijectivePositions> for ReorderError {
    fn from(error: NonBijectivePositions) -> Self {
        Self::NonBijective { error }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, ReorderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_vertices_map_to_invalid_input() {
        let err = ReorderError::from(GraphError::VertexOutOfBounds {
            vertex: 7,
            vertex_count: 3,
        });
        assert_eq!(err.code(), ReorderErrorCode::InvalidVertex);
        assert_eq!(err.code().as_str(), "REORDER_INVALID_VERTEX");
    }

    #[test]
    fn invariant_violations_keep_their_class() {
        let graph = ReorderError::from(GraphError::MissingEdge { from: 1, to: 2 });
        assert_eq!(graph.code(), ReorderErrorCode::GraphInvariantViolation);

        let dendrogram = ReorderError::from(DendrogramError::UnknownLabel { label: 9 });
        assert_eq!(
            dendrogram.code(),
            ReorderErrorCode::DendrogramInvariantViolation
        );
    }
}
