//! Built graph instances: derived, disposable products of a definition.

use std::collections::BTreeMap;

use serde::Serialize;

use strata_core::{ClusterId, GlobalNodeId};
use strata_graph::{flat_hash, FlatGraph, GlobalEdge, LeafGraph};
use strata_sample::SampleReport;

/// Display metadata for one cluster of a built instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterMeta {
    /// Palette or user color carried over from the definition.
    pub color: String,
    /// Display level: leaves carry `-depth`, groups their subtree height.
    ///
    /// A top-level leaf sits at zero, deeper leaves at increasingly negative
    /// values, and groups always at one or more.
    pub level: i32,
    /// True when the cluster generates its own graph.
    pub leaf: bool,
    /// Nodes visible at this cluster (own or aggregated).
    pub node_count: usize,
    /// Edges visible at this cluster (own or aggregated).
    pub edge_count: usize,
}

/// Aggregated view of a group cluster.
///
/// Member edges lifted from descendant leaves and folded connection edges
/// are kept apart so flattening can append each exactly once.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateGraph {
    /// Descendant leaf nodes in depth-first leaf order.
    pub members: Vec<GlobalNodeId>,
    /// Intra-leaf edges lifted from descendant leaves.
    pub member_edges: Vec<GlobalEdge>,
    /// Connection edges whose endpoints both live under this group.
    pub connection_edges: Vec<GlobalEdge>,
}

impl AggregateGraph {
    /// Total number of member nodes.
    pub fn node_count(&self) -> usize {
        self.members.len()
    }

    /// Total number of edges, member and connection combined.
    pub fn edge_count(&self) -> usize {
        self.member_edges.len() + self.connection_edges.len()
    }
}

/// Sampled edges of one definition connection.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionInstance {
    /// Source cluster of the definition connection.
    pub source: ClusterId,
    /// Target cluster of the definition connection.
    pub target: ClusterId,
    /// Drawn edges in sampling order.
    pub edges: Vec<GlobalEdge>,
    /// Sampling diagnostics.
    pub report: SampleReport,
}

/// Fully built snapshot of a definition.
///
/// Instances are derived state: they are rebuilt from the definition on
/// demand and never serialized wholesale. Consumers receive them behind an
/// `Arc` and must treat them as immutable.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphInstance {
    /// Master seed the instance was built with.
    pub seed: u64,
    /// Canonical hash of the definition that produced the instance.
    pub definition_hash: String,
    /// Change tokens of every leaf at build time.
    pub tokens: BTreeMap<ClusterId, String>,
    /// Generated graph per leaf cluster.
    pub leaf_graphs: BTreeMap<ClusterId, LeafGraph>,
    /// Aggregated view per group cluster.
    pub aggregates: BTreeMap<ClusterId, AggregateGraph>,
    /// Sampled connections in definition order, one per cluster pair.
    pub connections: Vec<ConnectionInstance>,
    /// Single flat graph with dense renumbered identifiers.
    pub flattened: FlatGraph,
    /// Display metadata per cluster.
    pub meta: BTreeMap<ClusterId, ClusterMeta>,
    /// Ancestor chain per leaf: the leaf itself, then parents up to a root.
    pub chains: BTreeMap<ClusterId, Vec<ClusterId>>,
}

impl GraphInstance {
    /// Canonical hash of the flattened instance.
    pub fn instance_hash(&self) -> String {
        flat_hash(&self.flattened)
    }

    /// Number of nodes in the flattened instance.
    pub fn node_count(&self) -> usize {
        self.flattened.node_count()
    }

    /// Number of edges in the flattened instance.
    pub fn edge_count(&self) -> usize {
        self.flattened.edge_count()
    }

    /// Maps stable global addresses to the dense flat identifiers.
    ///
    /// The map is only valid for this instance; rebuilds renumber.
    pub fn flat_index(&self) -> BTreeMap<GlobalNodeId, u32> {
        self.flattened
            .nodes()
            .iter()
            .enumerate()
            .map(|(index, node)| (node.origin, index as u32))
            .collect()
    }
}
