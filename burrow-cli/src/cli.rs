//! Command-line interface for the burrow reordering pipeline.
//!
//! Offers a `reorder` command that loads a weighted edge-list graph,
//! computes the modularity-guided relabeling, and writes the permutation
//! file plus, on request, the relabeled graph.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use burrow_core::{Permutation, ReorderError, Reorderer};

use crate::edgelist::{self, EdgeListError, ReadOptions};

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "burrow", about = "Compute locality-improving graph relabelings.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Reorder a weighted edge-list graph.
    Reorder(ReorderCommand),
}

/// Options accepted by the `reorder` command.
#[derive(Debug, Args, Clone)]
pub struct ReorderCommand {
    /// Path to the edge-list graph file.
    pub graph: PathBuf,

    /// The file lists each undirected edge once; mirror it on load.
    #[arg(long)]
    pub symmetric: bool,

    /// Vertex labels in the file start at one.
    #[arg(long)]
    pub one_based: bool,

    /// Path of the permutation file to write.
    #[arg(long, short = 'o', default_value = "permutation.txt")]
    pub output: PathBuf,

    /// Also write the relabeled graph to this path.
    #[arg(long)]
    pub write_graph: Option<PathBuf>,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CliError {
    /// File I/O failed for an input or output path.
    #[error("failed to access `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// Edge-list parsing failed.
    #[error(transparent)]
    EdgeList(#[from] EdgeListError),
    /// The core reordering engine failed.
    #[error(transparent)]
    Core(#[from] ReorderError),
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// Number of vertices in the loaded graph.
    pub vertex_count: usize,
    /// Total edge weight of the loaded graph.
    pub total_weight: f64,
    /// Where the permutation file was written.
    pub permutation_path: PathBuf,
    /// Where the relabeled graph was written, when requested.
    pub graph_path: Option<PathBuf>,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading, reordering, or writing fails.
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Reorder(command) => run_reorder(command),
    }
}

fn run_reorder(command: ReorderCommand) -> Result<ExecutionSummary, CliError> {
    let reader = open_reader(&command.graph)?;
    let loaded = edgelist::read_graph(
        reader,
        ReadOptions {
            symmetric: command.symmetric,
            one_based: command.one_based,
        },
    )?;

    let reorderer = Reorderer::new();
    let permutation = reorderer.permutation(&loaded.graph)?;
    write_permutation_file(&command.output, &loaded.dimension_widths, &permutation)?;

    let graph_path = match command.write_graph {
        Some(path) => {
            let edges = reorderer.relabeled_edges(&loaded.graph, &permutation)?;
            let mut writer = open_writer(&path)?;
            edgelist::write_relabeled_graph(&mut writer, &edges)
                .and_then(|()| writer.flush())
                .map_err(|source| CliError::Io {
                    path: path.clone(),
                    source,
                })?;
            Some(path)
        }
        None => None,
    };

    Ok(ExecutionSummary {
        vertex_count: loaded.graph.vertex_count(),
        total_weight: loaded.graph.total_weight(),
        permutation_path: command.output,
        graph_path,
    })
}

fn write_permutation_file(
    path: &Path,
    dimension_widths: &[usize],
    permutation: &Permutation,
) -> Result<(), CliError> {
    let mut writer = open_writer(path)?;
    edgelist::write_permutation(&mut writer, dimension_widths, permutation)
        .and_then(|()| writer.flush())
        .map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn open_reader(path: &Path) -> Result<BufReader<File>, CliError> {
    let file = File::open(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

fn open_writer(path: &Path) -> Result<BufWriter<File>, CliError> {
    let file = File::create(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufWriter::new(file))
}

/// Renders `summary` to `writer` in a human-readable text format.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    writeln!(writer, "vertices: {}", summary.vertex_count)?;
    writeln!(writer, "total weight: {}", summary.total_weight)?;
    writeln!(writer, "permutation: {}", summary.permutation_path.display())?;
    if let Some(path) = &summary.graph_path {
        writeln!(writer, "relabeled graph: {}", path.display())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    const SCENARIO: &str = "% 6\n% 4\n2 5 1\n1 2 1\n2 4 1\n4 5 1\n";

    fn reorder_command(dir: &TempDir, write_graph: bool) -> ReorderCommand {
        let graph = dir.path().join("graph.txt");
        fs::write(&graph, SCENARIO).expect("fixture must write");
        ReorderCommand {
            graph,
            symmetric: true,
            one_based: false,
            output: dir.path().join("permutation.txt"),
            write_graph: write_graph.then(|| dir.path().join("relabeled.txt")),
        }
    }

    #[test]
    fn reorder_writes_the_expected_permutation_file() {
        let dir = TempDir::new().expect("temp dir must create");
        let command = reorder_command(&dir, false);
        let output = command.output.clone();

        let summary = run_cli(Cli {
            command: Command::Reorder(command),
        })
        .expect("command must succeed");

        assert_eq!(summary.vertex_count, 6);
        assert_eq!(summary.total_weight, 4.0);
        assert!(summary.graph_path.is_none());

        let written = fs::read_to_string(output).expect("permutation file exists");
        assert_eq!(written, "% 6\n% 6\n0 2 3 1 4 5\n");
    }

    #[test]
    fn reorder_optionally_writes_the_relabeled_graph() {
        let dir = TempDir::new().expect("temp dir must create");
        let command = reorder_command(&dir, true);

        let summary = run_cli(Cli {
            command: Command::Reorder(command),
        })
        .expect("command must succeed");

        let path = summary.graph_path.expect("graph path was requested");
        let written = fs::read_to_string(path).expect("relabeled graph exists");
        // Four undirected edges, mirrored on load: eight directed entries.
        assert_eq!(written.lines().count(), 8);
        for line in written.lines() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            assert_eq!(fields.len(), 3);
        }
    }

    #[test]
    fn missing_input_surfaces_an_io_error() {
        let dir = TempDir::new().expect("temp dir must create");
        let err = run_cli(Cli {
            command: Command::Reorder(ReorderCommand {
                graph: dir.path().join("absent.txt"),
                symmetric: true,
                one_based: false,
                output: dir.path().join("permutation.txt"),
                write_graph: None,
            }),
        })
        .expect_err("input file does not exist");
        assert!(matches!(err, CliError::Io { .. }));
    }

    #[test]
    fn summary_renders_one_line_per_artifact() {
        let summary = ExecutionSummary {
            vertex_count: 6,
            total_weight: 4.0,
            permutation_path: PathBuf::from("permutation.txt"),
            graph_path: None,
        };
        let mut out = Vec::new();
        render_summary(&summary, &mut out).expect("render must succeed");
        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            "vertices: 6\ntotal weight: 4\npermutation: permutation.txt\n"
        );
    }
}
