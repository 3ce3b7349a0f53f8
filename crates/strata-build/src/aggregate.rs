//! Aggregation of leaf graphs into group views and the final flat graph.

use std::collections::{BTreeMap, BTreeSet};

use strata_core::errors::{ErrorInfo, StrataError};
use strata_core::{ClusterId, GlobalNodeId};
use strata_graph::{FlatGraph, GlobalEdge, LeafGraph};
use strata_sample::SampleSide;

use crate::instance::{AggregateGraph, ConnectionInstance};
use crate::topology::ClusterTopology;

/// Leaf graphs plus the aggregate views folded from them.
pub(crate) struct Assembly {
    pub leaf_graphs: BTreeMap<ClusterId, LeafGraph>,
    pub aggregates: BTreeMap<ClusterId, AggregateGraph>,
    leaf_degrees: BTreeMap<ClusterId, Vec<u32>>,
}

/// Lifts every leaf into global address space and folds members and member
/// edges into each ancestor group exactly once.
pub(crate) fn assemble(
    topology: &ClusterTopology,
    leaf_graphs: BTreeMap<ClusterId, LeafGraph>,
) -> Result<Assembly, StrataError> {
    let mut aggregates: BTreeMap<ClusterId, AggregateGraph> = topology
        .groups
        .iter()
        .map(|group| (*group, AggregateGraph::default()))
        .collect();
    let mut leaf_degrees = BTreeMap::new();

    for leaf in &topology.leaves {
        let graph = leaf_graphs.get(leaf).ok_or_else(|| missing_leaf(*leaf))?;
        let members: Vec<GlobalNodeId> = graph
            .nodes()
            .map(|node| GlobalNodeId::new(*leaf, node))
            .collect();
        let lifted: Vec<GlobalEdge> = graph
            .edges()
            .iter()
            .map(|&(a, b)| {
                GlobalEdge::new(GlobalNodeId::new(*leaf, a), GlobalNodeId::new(*leaf, b))
            })
            .collect();
        leaf_degrees.insert(*leaf, graph.degrees());

        for ancestor in topology.group_ancestors(*leaf)? {
            let aggregate = aggregates.get_mut(ancestor).ok_or_else(|| {
                StrataError::Build(
                    ErrorInfo::new("missing-cluster", "ancestor group has no aggregate slot")
                        .with_context("cluster", ancestor.as_raw().to_string()),
                )
            })?;
            aggregate.members.extend(members.iter().copied());
            aggregate.member_edges.extend(lifted.iter().copied());
        }
    }

    Ok(Assembly {
        leaf_graphs,
        aggregates,
        leaf_degrees,
    })
}

/// Builds the sampling side for a cluster: its own nodes for a leaf, the
/// aggregated members for a group. Degrees are leaf degrees in both cases
/// since member edges are exactly the union of leaf edges.
pub(crate) fn side_for(cluster: ClusterId, assembly: &Assembly) -> Result<SampleSide, StrataError> {
    if let Some(graph) = assembly.leaf_graphs.get(&cluster) {
        let nodes: Vec<GlobalNodeId> = graph
            .nodes()
            .map(|node| GlobalNodeId::new(cluster, node))
            .collect();
        return SampleSide::new(nodes, graph.degrees());
    }
    if let Some(aggregate) = assembly.aggregates.get(&cluster) {
        let mut degrees = Vec::with_capacity(aggregate.members.len());
        for member in &aggregate.members {
            let leaf = assembly
                .leaf_degrees
                .get(&member.cluster)
                .ok_or_else(|| missing_leaf(member.cluster))?;
            degrees.push(leaf.get(member.node.index()).copied().unwrap_or(0));
        }
        return SampleSide::new(aggregate.members.clone(), degrees);
    }
    Err(StrataError::Build(
        ErrorInfo::new("missing-cluster", "connection endpoint was not built")
            .with_context("cluster", cluster.as_raw().to_string()),
    ))
}

/// Folds sampled connection edges into every group that contains both
/// endpoints. Endpoint leaves vary per edge when a side is a group, so the
/// common ancestors are computed edge by edge.
pub(crate) fn fold_connection_edges(
    edges: &[GlobalEdge],
    topology: &ClusterTopology,
    assembly: &mut Assembly,
) -> Result<(), StrataError> {
    let mut ancestor_sets: BTreeMap<ClusterId, BTreeSet<ClusterId>> = BTreeMap::new();
    for edge in edges {
        for endpoint in [edge.source.cluster, edge.target.cluster] {
            if !ancestor_sets.contains_key(&endpoint) {
                let set: BTreeSet<ClusterId> =
                    topology.group_ancestors(endpoint)?.iter().copied().collect();
                ancestor_sets.insert(endpoint, set);
            }
        }
        let source_set = &ancestor_sets[&edge.source.cluster];
        let target_set = &ancestor_sets[&edge.target.cluster];
        for group in source_set.intersection(target_set) {
            if let Some(aggregate) = assembly.aggregates.get_mut(group) {
                aggregate.connection_edges.push(*edge);
            }
        }
    }
    Ok(())
}

/// Flattens the assembly into a single dense graph.
///
/// Nodes are numbered last: every leaf's nodes in depth-first leaf order,
/// then member edges in the same order, then connection edges in instance
/// order. Member and connection edges are kept apart upstream precisely so
/// this pass appends each once.
pub(crate) fn flatten(
    topology: &ClusterTopology,
    assembly: &Assembly,
    connections: &[ConnectionInstance],
) -> Result<FlatGraph, StrataError> {
    let mut flat = FlatGraph::new();
    let mut index: BTreeMap<GlobalNodeId, u32> = BTreeMap::new();

    for leaf in &topology.leaves {
        let graph = assembly
            .leaf_graphs
            .get(leaf)
            .ok_or_else(|| missing_leaf(*leaf))?;
        for node in graph.nodes() {
            let origin = GlobalNodeId::new(*leaf, node);
            let id = flat.push_node(origin);
            index.insert(origin, id);
        }
    }

    for leaf in &topology.leaves {
        let graph = assembly
            .leaf_graphs
            .get(leaf)
            .ok_or_else(|| missing_leaf(*leaf))?;
        for &(a, b) in graph.edges() {
            let source = resolve(&index, GlobalNodeId::new(*leaf, a))?;
            let target = resolve(&index, GlobalNodeId::new(*leaf, b))?;
            flat.push_edge(source, target)?;
        }
    }

    for connection in connections {
        for edge in &connection.edges {
            let source = resolve(&index, edge.source)?;
            let target = resolve(&index, edge.target)?;
            flat.push_edge(source, target)?;
        }
    }

    Ok(flat)
}

fn resolve(index: &BTreeMap<GlobalNodeId, u32>, origin: GlobalNodeId) -> Result<u32, StrataError> {
    index.get(&origin).copied().ok_or_else(|| {
        StrataError::Build(
            ErrorInfo::new("unmapped-node", "edge endpoint missing from the flat numbering")
                .with_context("cluster", origin.cluster.as_raw().to_string())
                .with_context("node", origin.node.as_raw().to_string()),
        )
    })
}

fn missing_leaf(leaf: ClusterId) -> StrataError {
    StrataError::Build(
        ErrorInfo::new("missing-cluster", "leaf graph missing during aggregation")
            .with_context("cluster", leaf.as_raw().to_string()),
    )
}
