//! Support library for the burrow CLI binary.
//!
//! Exposes the CLI, edge-list, and logging modules so integration tests and
//! doctests can exercise the command pipeline without forking a subprocess.

pub mod cli;
pub mod edgelist;
pub mod logging;
