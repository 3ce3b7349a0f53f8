use serde::{Deserialize, Serialize};

use strata_core::errors::{ErrorInfo, StrataError};
use strata_core::NodeId;

use crate::storage::LeafGraph;

/// Serializes a leaf graph to a compact binary representation using `bincode`.
pub fn leaf_to_bytes(graph: &LeafGraph) -> Result<Vec<u8>, StrataError> {
    let serializable = SerializableLeaf::from_graph(graph);
    bincode::serialize(&serializable)
        .map_err(|err| StrataError::Serde(ErrorInfo::new("serialize-bytes", err.to_string())))
}

/// Restores a leaf graph from its binary representation.
pub fn leaf_from_bytes(bytes: &[u8]) -> Result<LeafGraph, StrataError> {
    let serializable: SerializableLeaf = bincode::deserialize(bytes)
        .map_err(|err| StrataError::Serde(ErrorInfo::new("deserialize-bytes", err.to_string())))?;
    serializable.into_graph()
}

/// Serializes a leaf graph to a JSON string.
pub fn leaf_to_json(graph: &LeafGraph) -> Result<String, StrataError> {
    let serializable = SerializableLeaf::from_graph(graph);
    serde_json::to_string_pretty(&serializable)
        .map_err(|err| StrataError::Serde(ErrorInfo::new("serialize-json", err.to_string())))
}

/// Restores a leaf graph from a JSON string.
pub fn leaf_from_json(json: &str) -> Result<LeafGraph, StrataError> {
    let serializable: SerializableLeaf = serde_json::from_str(json)
        .map_err(|err| StrataError::Serde(ErrorInfo::new("deserialize-json", err.to_string())))?;
    serializable.into_graph()
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializableLeaf {
    node_count: u64,
    edges: Vec<(u32, u32)>,
}

impl SerializableLeaf {
    fn from_graph(graph: &LeafGraph) -> Self {
        Self {
            node_count: graph.node_count() as u64,
            edges: graph
                .edges()
                .iter()
                .map(|&(a, b)| (a.as_raw(), b.as_raw()))
                .collect(),
        }
    }

    fn into_graph(self) -> Result<LeafGraph, StrataError> {
        let mut graph = LeafGraph::with_nodes(self.node_count as usize);
        for (a, b) in self.edges {
            graph.add_edge(NodeId::from_raw(a), NodeId::from_raw(b))?;
        }
        Ok(graph)
    }
}
