#![deny(missing_docs)]
#![doc = "Core identifiers, error surface and deterministic primitives shared by the Strata crates."]

use serde::{Deserialize, Serialize};

pub mod cancel;
pub mod errors;
pub mod provenance;
pub mod rng;
pub mod series;
mod types;

pub use cancel::CancellationToken;
pub use errors::{ErrorInfo, StrataError};
pub use provenance::SchemaVersion;
pub use rng::{derive_substream_seed, RngHandle};
pub use series::{Series, SeriesPoint};
pub use types::Point2;

/// Identifier for a cluster in the hierarchy definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClusterId(u64);

impl ClusterId {
    /// Creates a new identifier from its raw integer representation.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer representation of the identifier.
    pub fn as_raw(&self) -> u64 {
        self.0
    }
}

/// Identifier for a node local to a single leaf cluster graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    /// Creates a new identifier from its raw integer representation.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw integer representation of the identifier.
    pub fn as_raw(&self) -> u32 {
        self.0
    }

    /// Returns the identifier as a vector index.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Globally unique node address combining a cluster with a local node.
///
/// Local node identifiers are only meaningful within their owning leaf
/// cluster; this pair form is the stable address used for anything that
/// crosses cluster boundaries (inter-cluster edges, aggregate membership,
/// cached layout positions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GlobalNodeId {
    /// Leaf cluster owning the node.
    pub cluster: ClusterId,
    /// Node identifier local to the owning cluster.
    pub node: NodeId,
}

impl GlobalNodeId {
    /// Creates a global address from a cluster and a local node.
    pub fn new(cluster: ClusterId, node: NodeId) -> Self {
        Self { cluster, node }
    }
}
