//! Weighted edge-list reader and writer.
//!
//! The on-disk format carries two comment-style header lines followed by
//! one edge triple per line:
//!
//! ```text
//! % <width1> <width2> ... <widthK>
//! % <edge_count>
//! <u> <v> <weight>
//! ...
//! ```
//!
//! The first header lists tensor dimension widths; the vertex count is
//! their sum. Graphs that did not originate from a tensor carry a single
//! width. The widths are preserved so the permutation writer can echo them
//! back for downstream relabeling tools.

use std::io::{self, BufRead, Write};

use thiserror::Error;
use tracing::{info, instrument, warn};

use burrow_core::{GraphError, Permutation, WeightedGraph};

/// Errors raised while reading an edge-list file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EdgeListError {
    /// The underlying reader failed.
    #[error("failed to read the edge list: {source}")]
    Io {
        /// Underlying operating system error.
        #[from]
        source: io::Error,
    },
    /// A header line was missing or did not start with `%`.
    #[error("header line {line_number} is missing or malformed")]
    MalformedHeader {
        /// One-based line number of the offending header.
        line_number: usize,
    },
    /// An edge line did not parse as `<u> <v> <weight>`.
    #[error("edge on line {line_number} is malformed: `{line}`")]
    MalformedEdge {
        /// One-based line number of the offending edge.
        line_number: usize,
        /// The raw line content.
        line: String,
    },
    /// A one-based input contained the label zero.
    #[error("edge on line {line_number} uses label 0 in a one-based input")]
    ZeroLabel {
        /// One-based line number of the offending edge.
        line_number: usize,
    },
    /// An edge referenced a vertex outside the declared widths.
    #[error("edge on line {line_number} is invalid: {error}")]
    Edge {
        /// One-based line number of the offending edge.
        line_number: usize,
        /// Underlying graph error.
        #[source]
        error: GraphError,
    },
}

/// How the input stream encodes edge direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// The stream lists each undirected edge once; the reader mirrors it.
    /// When unset, the stream lists both directions and lines with
    /// `u > v` are taken to be the mirror of an already-seen edge.
    pub symmetric: bool,
    /// Vertex labels in the stream start at one and are shifted down.
    pub one_based: bool,
}

/// An edge-list graph together with the header metadata it arrived with.
#[derive(Clone, Debug)]
pub struct EdgeListGraph {
    /// The loaded, symmetric weighted graph.
    pub graph: WeightedGraph,
    /// Tensor dimension widths from the first header line.
    pub dimension_widths: Vec<usize>,
}

/// Reads an edge-list graph from `reader`.
///
/// # Errors
/// Returns [`EdgeListError`] when the stream, a header, or an edge line is
/// malformed, or when an edge references a vertex outside the declared
/// vertex count.
#[instrument(
    name = "cli.read_graph",
    err,
    skip(reader),
    fields(symmetric = options.symmetric, one_based = options.one_based),
)]
pub fn read_graph(
    reader: impl BufRead,
    options: ReadOptions,
) -> Result<EdgeListGraph, EdgeListError> {
    let mut lines = reader.lines();

    let dimension_widths = parse_header_numbers(next_header(&mut lines, 1)?, 1)?;
    let declared_edges = parse_header_numbers(next_header(&mut lines, 2)?, 2)?
        .into_iter()
        .next()
        .ok_or(EdgeListError::MalformedHeader { line_number: 2 })?;

    let vertex_count: usize = dimension_widths.iter().sum();
    let mut graph = WeightedGraph::new(vertex_count);

    let mut edges_read = 0_usize;
    for (offset, line) in lines.enumerate() {
        let line_number = offset + 3;
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let (from, to, weight) = parse_edge(&line, line_number)?;
        let (from, to) = rebase(from, to, options, line_number)?;
        edges_read += 1;

        // Streams listing both directions repeat each edge as its mirror;
        // inserting only the canonical direction keeps weights unscaled.
        if !options.symmetric && from > to {
            continue;
        }
        graph
            .insert_edge(from, to, weight)
            .map_err(|error| EdgeListError::Edge { line_number, error })?;
    }

    if edges_read != declared_edges {
        warn!(
            declared = declared_edges,
            read = edges_read,
            "edge list header disagrees with the number of edge lines"
        );
    }
    info!(
        vertices = vertex_count,
        edges = edges_read,
        total_weight = graph.total_weight(),
        "edge list loaded"
    );

    Ok(EdgeListGraph {
        graph,
        dimension_widths,
    })
}

fn next_header(
    lines: &mut impl Iterator<Item = io::Result<String>>,
    line_number: usize,
) -> Result<String, EdgeListError> {
    match lines.next() {
        Some(Ok(line)) => Ok(line),
        Some(Err(source)) => Err(EdgeListError::Io { source }),
        None => Err(EdgeListError::MalformedHeader { line_number }),
    }
}

fn parse_header_numbers(line: String, line_number: usize) -> Result<Vec<usize>, EdgeListError> {
    let body = line
        .trim()
        .strip_prefix('%')
        .ok_or(EdgeListError::MalformedHeader { line_number })?;
    let numbers: Result<Vec<usize>, _> = body
        .split_whitespace()
        .map(str::parse::<usize>)
        .collect();
    let numbers = numbers.map_err(|_| EdgeListError::MalformedHeader { line_number })?;
    if numbers.is_empty() {
        return Err(EdgeListError::MalformedHeader { line_number });
    }
    Ok(numbers)
}

fn parse_edge(line: &str, line_number: usize) -> Result<(usize, usize, f64), EdgeListError> {
    let malformed = || EdgeListError::MalformedEdge {
        line_number,
        line: line.to_owned(),
    };
    let mut fields = line.split_whitespace();
    let from = fields
        .next()
        .and_then(|field| field.parse().ok())
        .ok_or_else(malformed)?;
    let to = fields
        .next()
        .and_then(|field| field.parse().ok())
        .ok_or_else(malformed)?;
    let weight = fields
        .next()
        .and_then(|field| field.parse().ok())
        .ok_or_else(malformed)?;
    if fields.next().is_some() {
        return Err(malformed());
    }
    Ok((from, to, weight))
}

fn rebase(
    from: usize,
    to: usize,
    options: ReadOptions,
    line_number: usize,
) -> Result<(usize, usize), EdgeListError> {
    if !options.one_based {
        return Ok((from, to));
    }
    match (from.checked_sub(1), to.checked_sub(1)) {
        (Some(from), Some(to)) => Ok((from, to)),
        _ => Err(EdgeListError::ZeroLabel { line_number }),
    }
}

/// Writes the permutation file: the dimension-width header, a vertex-count
/// header, then the new position of every vertex in original-index order.
///
/// # Errors
/// Returns [`io::Error`] when the writer fails.
pub fn write_permutation(
    mut writer: impl Write,
    dimension_widths: &[usize],
    permutation: &Permutation,
) -> io::Result<()> {
    write!(writer, "%")?;
    for width in dimension_widths {
        write!(writer, " {width}")?;
    }
    writeln!(writer)?;
    writeln!(writer, "% {}", permutation.len())?;
    for (index, position) in permutation.as_slice().iter().enumerate() {
        if index > 0 {
            write!(writer, " ")?;
        }
        write!(writer, "{position}")?;
    }
    writeln!(writer)?;
    Ok(())
}

/// Writes a relabeled graph as one `<u> <v> <weight>` line per directed
/// adjacency entry.
///
/// # Errors
/// Returns [`io::Error`] when the writer fails.
pub fn write_relabeled_graph(
    mut writer: impl Write,
    edges: &[(usize, usize, f64)],
) -> io::Result<()> {
    for (from, to, weight) in edges {
        writeln!(writer, "{from} {to} {weight}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    const SAMPLE: &str = "% 2 2\n% 3\n0 1 1\n1 2 2\n2 3 1\n";

    #[test]
    fn reads_headers_and_mirrors_symmetric_input() {
        let loaded = read_graph(
            SAMPLE.as_bytes(),
            ReadOptions {
                symmetric: true,
                one_based: false,
            },
        )
        .expect("sample must parse");

        assert_eq!(loaded.dimension_widths, vec![2, 2]);
        assert_eq!(loaded.graph.vertex_count(), 4);
        assert_eq!(loaded.graph.total_weight(), 4.0);
        assert_eq!(loaded.graph.weighted_degree(1), 3.0);
    }

    #[test]
    fn deduplicates_streams_that_list_both_directions() {
        let input = "% 3\n% 4\n0 1 1\n1 0 1\n1 2 1\n2 1 1\n";
        let loaded = read_graph(input.as_bytes(), ReadOptions::default()).expect("must parse");

        assert_eq!(loaded.graph.total_weight(), 2.0);
        assert_eq!(loaded.graph.weighted_degree(1), 2.0);
    }

    #[test]
    fn shifts_one_based_labels_down() {
        let input = "% 2\n% 1\n1 2 5\n";
        let loaded = read_graph(
            input.as_bytes(),
            ReadOptions {
                symmetric: true,
                one_based: true,
            },
        )
        .expect("must parse");

        assert_eq!(loaded.graph.weighted_degree(0), 5.0);
        assert_eq!(loaded.graph.weighted_degree(1), 5.0);
    }

    #[test]
    fn rejects_label_zero_in_one_based_input() {
        let input = "% 2\n% 1\n0 2 1\n";
        let err = read_graph(
            input.as_bytes(),
            ReadOptions {
                symmetric: true,
                one_based: true,
            },
        )
        .expect_err("label 0 is invalid when one-based");
        assert!(matches!(err, EdgeListError::ZeroLabel { line_number: 3 }));
    }

    #[rstest]
    #[case::missing_headers("")]
    #[case::no_percent_prefix("4\n% 1\n0 1 1\n")]
    #[case::empty_width_list("%\n% 1\n0 1 1\n")]
    fn rejects_malformed_headers(#[case] input: &str) {
        let err = read_graph(input.as_bytes(), ReadOptions::default())
            .expect_err("header is malformed");
        assert!(matches!(err, EdgeListError::MalformedHeader { .. }));
    }

    #[rstest]
    #[case::too_few_fields("% 2\n% 1\n0 1\n")]
    #[case::too_many_fields("% 2\n% 1\n0 1 1 1\n")]
    #[case::non_numeric("% 2\n% 1\na b c\n")]
    fn rejects_malformed_edges(#[case] input: &str) {
        let err =
            read_graph(input.as_bytes(), ReadOptions::default()).expect_err("edge is malformed");
        assert!(matches!(err, EdgeListError::MalformedEdge { line_number: 3, .. }));
    }

    #[test]
    fn rejects_edges_outside_the_declared_widths() {
        let input = "% 2\n% 1\n0 9 1\n";
        let err = read_graph(input.as_bytes(), ReadOptions::default())
            .expect_err("vertex 9 exceeds the declared widths");
        assert!(matches!(err, EdgeListError::Edge { line_number: 3, .. }));
    }

    #[test]
    fn permutation_round_trips_through_the_writer() {
        let permutation = Permutation::try_from_positions(vec![2, 0, 1]).expect("bijection");
        let mut out = Vec::new();
        write_permutation(&mut out, &[3], &permutation).expect("write must succeed");
        assert_eq!(String::from_utf8(out).expect("utf8"), "% 3\n% 3\n2 0 1\n");
    }

    #[test]
    fn relabeled_graph_writer_emits_one_line_per_entry() {
        let mut out = Vec::new();
        write_relabeled_graph(&mut out, &[(0, 1, 1.0), (1, 0, 1.0)]).expect("write must succeed");
        assert_eq!(String::from_utf8(out).expect("utf8"), "0 1 1\n1 0 1\n");
    }
}
