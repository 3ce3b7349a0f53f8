use serde::{Deserialize, Serialize};

use strata_core::errors::{ErrorInfo, StrataError};
use strata_core::{GlobalNodeId, NodeId};

/// Undirected graph local to one leaf cluster.
///
/// Nodes are the dense range `0..node_count`. Edges are stored both as a flat
/// list (in insertion order) and as adjacency lists; a self loop contributes
/// two entries to its node's adjacency list, so `degree` counts it twice.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LeafGraph {
    adjacency: Vec<Vec<NodeId>>,
    edges: Vec<(NodeId, NodeId)>,
}

impl LeafGraph {
    /// Creates a graph with no nodes and no edges.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a graph with `count` isolated nodes.
    pub fn with_nodes(count: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); count],
            edges: Vec::new(),
        }
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Iterates over all node identifiers in ascending order.
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = NodeId> + '_ {
        (0..self.adjacency.len()).map(|index| NodeId::from_raw(index as u32))
    }

    /// Returns the edge list in insertion order.
    pub fn edges(&self) -> &[(NodeId, NodeId)] {
        &self.edges
    }

    /// Inserts an undirected edge between `a` and `b`.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> Result<(), StrataError> {
        self.check_bounds(a)?;
        self.check_bounds(b)?;
        self.adjacency[a.index()].push(b);
        self.adjacency[b.index()].push(a);
        self.edges.push((a, b));
        Ok(())
    }

    /// Returns the neighbours of `node` in edge insertion order.
    pub fn neighbors(&self, node: NodeId) -> Result<&[NodeId], StrataError> {
        self.check_bounds(node)?;
        Ok(&self.adjacency[node.index()])
    }

    /// Returns the degree of `node`; self loops count twice.
    pub fn degree(&self, node: NodeId) -> Result<usize, StrataError> {
        self.check_bounds(node)?;
        Ok(self.adjacency[node.index()].len())
    }

    /// Returns per-node degrees indexed by raw node id.
    pub fn degrees(&self) -> Vec<u32> {
        self.adjacency.iter().map(|list| list.len() as u32).collect()
    }

    /// Returns true when an edge between `a` and `b` exists.
    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        match self.neighbors(a) {
            Ok(list) => list.contains(&b),
            Err(_) => false,
        }
    }

    pub(crate) fn adjacency(&self) -> &[Vec<NodeId>] {
        &self.adjacency
    }

    fn check_bounds(&self, node: NodeId) -> Result<(), StrataError> {
        if node.index() >= self.adjacency.len() {
            return Err(StrataError::Graph(
                ErrorInfo::new("node-out-of-bounds", "node index past the arena")
                    .with_context("node", node.as_raw().to_string())
                    .with_context("node-count", self.adjacency.len().to_string()),
            ));
        }
        Ok(())
    }
}

/// Undirected edge between two globally addressed nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GlobalEdge {
    /// First endpoint.
    pub source: GlobalNodeId,
    /// Second endpoint.
    pub target: GlobalNodeId,
}

impl GlobalEdge {
    /// Creates a new edge.
    pub fn new(source: GlobalNodeId, target: GlobalNodeId) -> Self {
        Self { source, target }
    }
}

/// Node of a flattened instance; the flat identifier is the vector index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatNode {
    /// Stable global address the flat node was renumbered from.
    pub origin: GlobalNodeId,
}

/// Edge of a flattened instance expressed in dense flat identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatEdge {
    /// Flat identifier of the first endpoint.
    pub source: u32,
    /// Flat identifier of the second endpoint.
    pub target: u32,
}

/// Single flat graph produced by renumbering a built hierarchy.
///
/// Flat identifiers are dense and assigned last, so they are only valid for
/// the instance that produced them; `origin` is the address that survives
/// rebuilds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatGraph {
    nodes: Vec<FlatNode>,
    edges: Vec<FlatEdge>,
}

impl FlatGraph {
    /// Creates an empty flat graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node and returns its flat identifier.
    pub fn push_node(&mut self, origin: GlobalNodeId) -> u32 {
        let id = self.nodes.len() as u32;
        self.nodes.push(FlatNode { origin });
        id
    }

    /// Appends an edge between two flat identifiers.
    pub fn push_edge(&mut self, source: u32, target: u32) -> Result<(), StrataError> {
        let count = self.nodes.len() as u32;
        if source >= count || target >= count {
            return Err(StrataError::Graph(
                ErrorInfo::new("flat-edge-out-of-bounds", "flat edge references unknown node")
                    .with_context("source", source.to_string())
                    .with_context("target", target.to_string())
                    .with_context("node-count", count.to_string()),
            ));
        }
        self.edges.push(FlatEdge { source, target });
        Ok(())
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns all nodes; the index in the slice is the flat identifier.
    pub fn nodes(&self) -> &[FlatNode] {
        &self.nodes
    }

    /// Returns all edges.
    pub fn edges(&self) -> &[FlatEdge] {
        &self.edges
    }

    /// Returns edges as raw index pairs for measure backends.
    pub fn edge_pairs(&self) -> Vec<(u32, u32)> {
        self.edges
            .iter()
            .map(|edge| (edge.source, edge.target))
            .collect()
    }
}
