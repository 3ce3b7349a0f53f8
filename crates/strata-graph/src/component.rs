//! Connected component extraction for leaf graphs.

use std::collections::BTreeSet;

use strata_core::errors::StrataError;
use strata_core::NodeId;

use crate::storage::LeafGraph;

/// Extracts the largest connected component as a new graph.
///
/// Components are discovered by iterative depth-first search in ascending
/// node order; ties in size keep the first discovered component. Surviving
/// nodes are renumbered compactly while preserving their relative order, and
/// each undirected pair is emitted once.
pub fn giant_component(graph: &LeafGraph) -> Result<LeafGraph, StrataError> {
    let node_count = graph.node_count();
    if node_count == 0 {
        return Ok(LeafGraph::empty());
    }

    let adjacency = graph.adjacency();
    let mut label = vec![usize::MAX; node_count];
    let mut stack: Vec<usize> = Vec::new();
    let mut best_label = 0usize;
    let mut best_size = 0usize;
    let mut next_label = 0usize;

    for start in 0..node_count {
        if label[start] != usize::MAX {
            continue;
        }
        let current = next_label;
        next_label += 1;
        let mut size = 0usize;
        label[start] = current;
        stack.push(start);
        while let Some(node) = stack.pop() {
            size += 1;
            for neighbor in &adjacency[node] {
                let index = neighbor.index();
                if label[index] == usize::MAX {
                    label[index] = current;
                    stack.push(index);
                }
            }
        }
        // Strict comparison keeps the first discovered component on ties.
        if size > best_size {
            best_size = size;
            best_label = current;
        }
    }

    let mut remap: Vec<Option<NodeId>> = vec![None; node_count];
    let mut next_id = 0u32;
    for index in 0..node_count {
        if label[index] == best_label {
            remap[index] = Some(NodeId::from_raw(next_id));
            next_id += 1;
        }
    }

    let mut kept = LeafGraph::with_nodes(best_size);
    let mut emitted: BTreeSet<(NodeId, NodeId)> = BTreeSet::new();
    for &(a, b) in graph.edges() {
        if let (Some(ra), Some(rb)) = (remap[a.index()], remap[b.index()]) {
            let key = if ra <= rb { (ra, rb) } else { (rb, ra) };
            if emitted.insert(key) {
                kept.add_edge(ra, rb)?;
            }
        }
    }
    Ok(kept)
}
