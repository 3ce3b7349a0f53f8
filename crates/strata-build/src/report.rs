//! Structured build reports and CSV exports of the flattened instance.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use strata_core::errors::{ErrorInfo, StrataError};
use strata_core::ClusterId;

use crate::instance::GraphInstance;

/// Whether a build regenerated everything or only what changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildMode {
    /// Every leaf regenerated from scratch.
    Full,
    /// Only leaves with changed tokens regenerated.
    Incremental,
}

/// A leaf whose generation failed and was replaced by an empty graph.
///
/// Degradation is part of the public build result; sibling leaves are never
/// affected and the build itself succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradedLeaf {
    /// Leaf cluster that failed to generate.
    pub cluster: ClusterId,
    /// The generation error that was absorbed.
    pub error: StrataError,
}

/// Per-connection sampling summary carried on the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionSummary {
    /// Source cluster of the definition connection.
    pub source: ClusterId,
    /// Target cluster of the definition connection.
    pub target: ClusterId,
    /// Edges the definition asked for.
    pub requested_edges: usize,
    /// Edges the sampler produced.
    pub produced_edges: usize,
    /// Number of bias-bucket draws that could not be satisfied.
    pub shortfall_count: usize,
}

/// Summary returned alongside every built instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildReport {
    /// Whether the build was full or incremental.
    pub mode: BuildMode,
    /// Leaves regenerated during this build, in build order.
    pub regenerated: Vec<ClusterId>,
    /// Leaves reused verbatim from the previous instance.
    pub reused: Vec<ClusterId>,
    /// Clusters present previously but absent from this definition.
    pub removed: Vec<ClusterId>,
    /// Leaves whose generation failed and degraded to an empty graph.
    pub degraded: Vec<DegradedLeaf>,
    /// Sampling summaries, one per generated connection.
    pub connections: Vec<ConnectionSummary>,
    /// Node count of the flattened instance.
    pub node_count: usize,
    /// Edge count of the flattened instance.
    pub edge_count: usize,
    /// Canonical hash of the flattened instance.
    pub instance_hash: String,
    /// Canonical hash of the definition that was built.
    pub definition_hash: String,
}

impl BuildReport {
    /// Returns true when any leaf degraded during the build.
    pub fn has_degraded_leaves(&self) -> bool {
        !self.degraded.is_empty()
    }

    /// Writes the report as pretty JSON.
    pub fn write(&self, path: &Path) -> Result<(), StrataError> {
        let json = serde_json::to_string_pretty(self).map_err(|err| {
            StrataError::Serde(
                ErrorInfo::new("report-serialize", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        std::fs::write(path, json).map_err(|err| {
            StrataError::Serde(
                ErrorInfo::new("report-write", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }
}

/// Writes the flattened node table as CSV.
///
/// Columns: dense flat id, owning cluster and the node's local id within it.
pub fn write_nodes_csv(instance: &GraphInstance, path: &Path) -> Result<(), StrataError> {
    let mut file = create(path)?;
    writeln!(file, "flat_id,cluster,local_node").map_err(|err| io_error(err, path))?;
    for (index, node) in instance.flattened.nodes().iter().enumerate() {
        writeln!(
            file,
            "{},{},{}",
            index,
            node.origin.cluster.as_raw(),
            node.origin.node.as_raw()
        )
        .map_err(|err| io_error(err, path))?;
    }
    Ok(())
}

/// Writes the flattened edge table as CSV.
pub fn write_edges_csv(instance: &GraphInstance, path: &Path) -> Result<(), StrataError> {
    let mut file = create(path)?;
    writeln!(file, "source,target").map_err(|err| io_error(err, path))?;
    for edge in instance.flattened.edges() {
        writeln!(file, "{},{}", edge.source, edge.target).map_err(|err| io_error(err, path))?;
    }
    Ok(())
}

fn create(path: &Path) -> Result<File, StrataError> {
    File::create(path).map_err(|err| io_error(err, path))
}

fn io_error(err: std::io::Error, path: &Path) -> StrataError {
    StrataError::Serde(
        ErrorInfo::new("csv-write", err.to_string())
            .with_context("path", path.display().to_string()),
    )
}
