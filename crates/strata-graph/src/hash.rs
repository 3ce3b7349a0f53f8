use sha2::{Digest, Sha256};

use crate::storage::{FlatGraph, LeafGraph};

/// Computes the canonical structural hash for a leaf graph.
///
/// The hash covers the node count and the sorted multiset of undirected edge
/// signatures, so two graphs hash equally exactly when they are structurally
/// identical regardless of edge insertion order.
pub fn leaf_hash(graph: &LeafGraph) -> String {
    let mut hasher = Sha256::new();
    hasher.update((graph.node_count() as u64).to_le_bytes());

    let mut signatures: Vec<(u32, u32)> = graph
        .edges()
        .iter()
        .map(|&(a, b)| {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            (lo.as_raw(), hi.as_raw())
        })
        .collect();
    signatures.sort_unstable();

    hasher.update((signatures.len() as u64).to_le_bytes());
    for (a, b) in signatures {
        hasher.update(a.to_le_bytes());
        hasher.update(b.to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}

/// Computes the canonical structural hash for a flattened instance.
///
/// Node origins are encoded in flat order and edges as a sorted multiset, so
/// equal hashes mean the same nodes received the same dense numbering and
/// the same undirected edges connect them.
pub fn flat_hash(flat: &FlatGraph) -> String {
    let mut hasher = Sha256::new();
    hasher.update((flat.node_count() as u64).to_le_bytes());
    for node in flat.nodes() {
        hasher.update(node.origin.cluster.as_raw().to_le_bytes());
        hasher.update(node.origin.node.as_raw().to_le_bytes());
    }

    let mut signatures: Vec<(u32, u32)> = flat
        .edges()
        .iter()
        .map(|edge| {
            if edge.source <= edge.target {
                (edge.source, edge.target)
            } else {
                (edge.target, edge.source)
            }
        })
        .collect();
    signatures.sort_unstable();

    hasher.update((signatures.len() as u64).to_le_bytes());
    for (a, b) in signatures {
        hasher.update(a.to_le_bytes());
        hasher.update(b.to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}
