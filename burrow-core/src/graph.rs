//! Mutable weighted graph with in-place vertex contraction.
//!
//! The backing store is a vector of vertices addressed by original index;
//! indices are stable for the lifetime of the graph. A vertex's live
//! identity is its *label*: contraction retires the labels of both
//! participants and assigns the surviving slot a fresh label from a
//! monotonically increasing counter owned by the graph, so adjacency maps
//! always key on live labels. A label→slot map resolves labels without
//! scanning the backing store.

use std::collections::HashMap;

use thiserror::Error;

/// Errors raised by [`WeightedGraph`] operations.
///
/// Every variant except [`GraphError::VertexOutOfBounds`] indicates
/// corrupted internal state rather than malformed caller input; see
/// [`GraphError::is_invariant_violation`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum GraphError {
    /// An operation referenced a vertex index outside the backing store.
    #[error("vertex {vertex} is out of bounds for a graph of {vertex_count} vertices")]
    VertexOutOfBounds {
        /// The offending vertex index.
        vertex: usize,
        /// Number of vertices in the graph.
        vertex_count: usize,
    },
    /// A label failed to resolve to an active vertex.
    #[error("label {label} does not resolve to an active vertex")]
    UnknownLabel {
        /// The label that failed to resolve.
        label: usize,
    },
    /// A required adjacency entry was absent during contraction.
    #[error("edge from label {from} to label {to} is missing")]
    MissingEdge {
        /// Label of the vertex whose adjacency was searched.
        from: usize,
        /// Label the missing entry should have pointed at.
        to: usize,
    },
    /// Contraction addressed a vertex that was already absorbed.
    #[error("vertex {vertex} has already been merged")]
    MergedVertex {
        /// Index of the inert vertex.
        vertex: usize,
    },
    /// Contraction was asked to merge a vertex with itself.
    #[error("cannot contract vertex {vertex} with itself")]
    SelfContraction {
        /// Index of the vertex named on both sides.
        vertex: usize,
    },
}

impl GraphError {
    /// Whether this error indicates a corrupted internal state rather than
    /// malformed caller input.
    #[must_use]
    pub const fn is_invariant_violation(&self) -> bool {
        !matches!(self, Self::VertexOutOfBounds { .. })
    }
}

#[derive(Clone, Debug, Default)]
struct Vertex {
    label: usize,
    edges: HashMap<usize, f64>,
    merged: bool,
}

/// Undirected weighted graph supporting destructive pairwise contraction.
///
/// Symmetric by construction: [`WeightedGraph::insert_edge`] records both
/// directions of every edge, and [`WeightedGraph::contract`] rewires both
/// sides of every affected adjacency. Self-loops are stored as a single
/// entry keyed by the vertex's own label.
#[derive(Clone, Debug, Default)]
pub struct WeightedGraph {
    vertices: Vec<Vertex>,
    slots_by_label: HashMap<usize, usize>,
    next_label: usize,
    total_weight: f64,
}

impl WeightedGraph {
    /// Creates a graph with `vertex_count` isolated vertices labeled
    /// `0..vertex_count`. The fresh-label counter starts at `vertex_count`.
    #[must_use]
    pub fn new(vertex_count: usize) -> Self {
        let vertices = (0..vertex_count)
            .map(|label| Vertex {
                label,
                edges: HashMap::new(),
                merged: false,
            })
            .collect();
        let slots_by_label = (0..vertex_count).map(|label| (label, label)).collect();
        Self {
            vertices,
            slots_by_label,
            next_label: vertex_count,
            total_weight: 0.0,
        }
    }

    /// Number of original vertices in the backing store, merged or not.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Running total edge weight `m`, incremented once per inserted logical
    /// undirected edge (self-loops counted once). This is the normalizing
    /// constant for modularity scoring; contraction conserves it.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Inserts the undirected edge `(from, to)` with the given weight,
    /// recording both directions. Parallel edges accumulate additively.
    ///
    /// # Errors
    /// Returns [`GraphError::VertexOutOfBounds`] when either endpoint lies
    /// outside the declared vertex count.
    pub fn insert_edge(&mut self, from: usize, to: usize, weight: f64) -> Result<(), GraphError> {
        let vertex_count = self.vertices.len();
        for vertex in [from, to] {
            if vertex >= vertex_count {
                return Err(GraphError::VertexOutOfBounds {
                    vertex,
                    vertex_count,
                });
            }
        }

        let from_label = self.vertices[from].label;
        let to_label = self.vertices[to].label;
        *self.vertices[from].edges.entry(to_label).or_insert(0.0) += weight;
        if from != to {
            *self.vertices[to].edges.entry(from_label).or_insert(0.0) += weight;
        }
        self.total_weight += weight;
        Ok(())
    }

    /// Current label of the vertex at `slot`, or `None` when out of bounds.
    #[must_use]
    pub fn label_of(&self, slot: usize) -> Option<usize> {
        self.vertices.get(slot).map(|vertex| vertex.label)
    }

    /// Whether the vertex at `slot` has been absorbed by a contraction.
    #[must_use]
    pub fn is_merged(&self, slot: usize) -> bool {
        self.vertices.get(slot).is_some_and(|vertex| vertex.merged)
    }

    /// Resolves a live label to its backing slot.
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownLabel`] when the label does not belong
    /// to any active vertex.
    pub fn resolve(&self, label: usize) -> Result<usize, GraphError> {
        self.slots_by_label
            .get(&label)
            .copied()
            .ok_or(GraphError::UnknownLabel { label })
    }

    /// Sum of all edge weights incident to the vertex at `slot`, including
    /// its self-loop if present. Zero for out-of-bounds or merged vertices.
    #[must_use]
    pub fn weighted_degree(&self, slot: usize) -> f64 {
        self.vertices
            .get(slot)
            .map(|vertex| vertex.edges.values().sum())
            .unwrap_or(0.0)
    }

    /// Iterates the adjacency of the vertex at `slot` as
    /// `(neighbor_label, weight)` pairs, self-loop included. No ordering is
    /// guaranteed.
    pub fn neighbors(&self, slot: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.vertices
            .get(slot)
            .into_iter()
            .flat_map(|vertex| vertex.edges.iter().map(|(&label, &weight)| (label, weight)))
    }

    /// Iterates every directed adjacency entry as
    /// `(from_label, to_label, weight)`. Each undirected edge appears once
    /// per direction; self-loops appear once.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.vertices.iter().flat_map(|vertex| {
            vertex
                .edges
                .iter()
                .map(move |(&to, &weight)| (vertex.label, to, weight))
        })
    }

    /// Contracts the active, adjacent vertices at slots `u` and `v` into a
    /// single vertex surviving at slot `v` under a freshly minted label.
    ///
    /// Every neighbor of `u` has its edge to `u` replaced by an edge to the
    /// fresh label, merging additively with any pre-existing edge to `v`;
    /// the remaining references to `v`'s old label are renamed in the same
    /// pass so adjacency keys stay live. The contracted edge becomes a
    /// self-loop of weight `2·w(u,v) + selfloop(u) + selfloop(v)`: once
    /// internal to the community, it counts from both endpoints'
    /// perspectives. Slot `u` is cleared and marked merged.
    ///
    /// Returns the fresh label assigned to the surviving vertex.
    ///
    /// # Errors
    /// Returns [`GraphError::VertexOutOfBounds`], [`GraphError::MergedVertex`]
    /// or [`GraphError::SelfContraction`] when the pre-conditions do not
    /// hold, and [`GraphError::MissingEdge`] or [`GraphError::UnknownLabel`]
    /// when an adjacency lookup that must succeed fails; the latter two mean
    /// the graph state is corrupted and the surrounding run must abort.
    pub fn contract(&mut self, u: usize, v: usize) -> Result<usize, GraphError> {
        if u == v {
            return Err(GraphError::SelfContraction { vertex: u });
        }
        let vertex_count = self.vertices.len();
        for vertex in [u, v] {
            if vertex >= vertex_count {
                return Err(GraphError::VertexOutOfBounds {
                    vertex,
                    vertex_count,
                });
            }
            if self.vertices[vertex].merged {
                return Err(GraphError::MergedVertex { vertex });
            }
        }

        let u_label = self.vertices[u].label;
        let v_label = self.vertices[v].label;

        // Retire the contracted edge from both endpoints.
        let joining =
            self.vertices[v]
                .edges
                .remove(&u_label)
                .ok_or(GraphError::MissingEdge {
                    from: v_label,
                    to: u_label,
                })?;
        self.vertices[u]
            .edges
            .remove(&v_label)
            .ok_or(GraphError::MissingEdge {
                from: u_label,
                to: v_label,
            })?;

        let u_loop = self.vertices[u].edges.remove(&u_label).unwrap_or(0.0);
        let v_loop = self.vertices[v].edges.remove(&v_label).unwrap_or(0.0);

        // Fold u's remaining neighbors into v. Their edges keep pointing at
        // v's old label here; the relabel pass below renames them all
        // uniformly.
        let reconnect: Vec<usize> = self.vertices[u].edges.drain().map(|(label, _)| label).collect();
        for neighbor_label in reconnect {
            let slot = self.resolve(neighbor_label)?;
            let carried =
                self.vertices[slot]
                    .edges
                    .remove(&u_label)
                    .ok_or(GraphError::MissingEdge {
                        from: neighbor_label,
                        to: u_label,
                    })?;
            *self.vertices[slot].edges.entry(v_label).or_insert(0.0) += carried;
            *self.vertices[v].edges.entry(neighbor_label).or_insert(0.0) += carried;
        }

        // Mint the fresh label and rename every surviving reference to v.
        let fresh = self.next_label;
        self.next_label += 1;
        let survivors: Vec<usize> = self.vertices[v].edges.keys().copied().collect();
        for neighbor_label in survivors {
            let slot = self.resolve(neighbor_label)?;
            let weight =
                self.vertices[slot]
                    .edges
                    .remove(&v_label)
                    .ok_or(GraphError::MissingEdge {
                        from: neighbor_label,
                        to: v_label,
                    })?;
            self.vertices[slot].edges.insert(fresh, weight);
        }
        self.slots_by_label.remove(&u_label);
        self.slots_by_label.remove(&v_label);
        self.slots_by_label.insert(fresh, v);
        self.vertices[v].label = fresh;
        self.vertices[v]
            .edges
            .insert(fresh, 2.0 * joining + u_loop + v_loop);

        self.vertices[u].merged = true;
        Ok(fresh)
    }
}
