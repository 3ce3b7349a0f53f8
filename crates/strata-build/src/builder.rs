//! The hierarchy builder: change detection, regeneration, assembly.

use std::collections::BTreeMap;

use indexmap::IndexSet;
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use strata_core::errors::{ErrorInfo, StrataError};
use strata_core::rng::{connection_seed, leaf_seed};
use strata_core::{ClusterId, RngHandle};
use strata_graph::{
    configuration_model_graph, degree_sequence_from_series, expected_degree_graph,
    giant_component, repair_odd_degree_sum, GlobalEdge, LeafGraph,
};
use strata_sample::{sample_connection, ConnectionSpec};

use crate::aggregate::{assemble, flatten, fold_connection_edges, side_for};
use crate::definition::{ClusterConnection, ClusterNode, GeneratorKind, GraphDefinition};
use crate::instance::{ClusterMeta, ConnectionInstance, GraphInstance};
use crate::report::{BuildMode, BuildReport, ConnectionSummary, DegradedLeaf};
use crate::serde::definition_hash;
use crate::topology::ClusterTopology;

/// Options controlling a build.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Regenerate every leaf regardless of change tokens.
    ///
    /// Undo, redo and structural imports must set this: their previous
    /// instance does not describe the definition being restored.
    pub force_full: bool,
}

/// Change-detection outcome: what a build would regenerate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlan {
    /// Whether the build would be full or incremental.
    pub mode: BuildMode,
    /// Leaves that would regenerate, in depth-first order.
    pub regenerate: Vec<ClusterId>,
    /// Leaves that would reuse their previous graph.
    pub reuse: Vec<ClusterId>,
    /// Previously built clusters absent from this definition.
    pub remove: Vec<ClusterId>,
}

/// Computes the change-detection plan without building anything.
///
/// `previous_tokens` is the token map recorded on the previous instance (or
/// derived from a previous definition); `None` forces a full rebuild, as
/// does `force_full`.
pub fn plan(
    definition: &GraphDefinition,
    previous_tokens: Option<&BTreeMap<ClusterId, String>>,
    force_full: bool,
) -> Result<BuildPlan, StrataError> {
    definition.validate()?;
    let topology = ClusterTopology::new(definition)?;
    let tokens = definition.tokens();

    let full = force_full || previous_tokens.is_none();
    let mut regenerate = Vec::new();
    let mut reuse = Vec::new();
    for leaf in &topology.leaves {
        let unchanged = !full
            && previous_tokens
                .and_then(|previous| previous.get(leaf))
                .is_some_and(|token| Some(token) == tokens.get(leaf));
        if unchanged {
            reuse.push(*leaf);
        } else {
            regenerate.push(*leaf);
        }
    }

    let remove = previous_tokens
        .map(|previous| {
            previous
                .keys()
                .filter(|id| !tokens.contains_key(id))
                .copied()
                .collect()
        })
        .unwrap_or_default();

    Ok(BuildPlan {
        mode: if full {
            BuildMode::Full
        } else {
            BuildMode::Incremental
        },
        regenerate,
        reuse,
        remove,
    })
}

/// Builds an instance from a definition.
///
/// Unchanged leaves reuse their previous graph verbatim; dirty leaves
/// regenerate in parallel, each under a seed derived from the master seed
/// and its cluster id. A leaf whose generation fails contributes an empty
/// graph and a report entry rather than aborting the build. Connections
/// regenerate every build under their own substream seeds, so an unchanged
/// definition reproduces an identical instance.
pub fn build(
    definition: &GraphDefinition,
    previous: Option<&GraphInstance>,
    options: BuildOptions,
) -> Result<(GraphInstance, BuildReport), StrataError> {
    let build_plan = plan(
        definition,
        previous.map(|instance| &instance.tokens),
        options.force_full,
    )?;
    let topology = ClusterTopology::new(definition)?;
    let tokens = definition.tokens();
    let seed = definition.seed;

    for leaf in &build_plan.regenerate {
        debug!("leaf {} regenerates", leaf.as_raw());
    }
    for removed in &build_plan.remove {
        debug!("cluster {} removed since the previous build", removed.as_raw());
    }

    let mut leaf_graphs: BTreeMap<ClusterId, LeafGraph> = BTreeMap::new();
    for leaf in &build_plan.reuse {
        let graph = previous
            .and_then(|instance| instance.leaf_graphs.get(leaf))
            .ok_or_else(|| {
                StrataError::Build(
                    ErrorInfo::new("missing-cluster", "reused leaf has no previous graph")
                        .with_context("cluster", leaf.as_raw().to_string()),
                )
            })?;
        leaf_graphs.insert(*leaf, graph.clone());
    }

    let dirty: Vec<&ClusterNode> = build_plan
        .regenerate
        .iter()
        .map(|leaf| {
            definition.cluster(*leaf).ok_or_else(|| {
                StrataError::Build(
                    ErrorInfo::new("missing-cluster", "planned leaf vanished from the definition")
                        .with_context("cluster", leaf.as_raw().to_string()),
                )
            })
        })
        .collect::<Result<_, _>>()?;

    let mut degraded = Vec::new();
    let generated: Vec<(ClusterId, Result<LeafGraph, StrataError>)> = dirty
        .par_iter()
        .map(|node| (node.id, generate_leaf(node, seed)))
        .collect();
    for (id, outcome) in generated {
        match outcome {
            Ok(graph) => {
                leaf_graphs.insert(id, graph);
            }
            Err(error) => {
                warn!("leaf {} degraded to an empty graph: {error}", id.as_raw());
                leaf_graphs.insert(id, LeafGraph::empty());
                degraded.push(DegradedLeaf { cluster: id, error });
            }
        }
    }

    let mut assembly = assemble(&topology, leaf_graphs)?;

    let mut connections = Vec::new();
    let mut summaries = Vec::new();
    let mut seen: IndexSet<(ClusterId, ClusterId)> = IndexSet::new();
    for connection in definition.connections() {
        if !seen.insert((connection.source, connection.target)) {
            debug!(
                "duplicate connection {} -> {} skipped",
                connection.source.as_raw(),
                connection.target.as_raw()
            );
            continue;
        }
        let spec = connection_spec(connection);
        let source_side = side_for(connection.source, &assembly)?;
        let target_side = side_for(connection.target, &assembly)?;
        let mut rng = RngHandle::from_seed(connection_seed(
            seed,
            connection.source.as_raw(),
            connection.target.as_raw(),
        ));
        let sample = sample_connection(&spec, &source_side, &target_side, &mut rng)?;
        for shortfall in &sample.report.shortfalls {
            warn!(
                "connection {} -> {} could not satisfy {} draws near degree {}",
                connection.source.as_raw(),
                connection.target.as_raw(),
                shortfall.missing,
                shortfall.degree
            );
        }
        let edges: Vec<GlobalEdge> = sample
            .edges
            .iter()
            .map(|&(source, target)| GlobalEdge::new(source, target))
            .collect();
        fold_connection_edges(&edges, &topology, &mut assembly)?;
        summaries.push(ConnectionSummary {
            source: connection.source,
            target: connection.target,
            requested_edges: sample.report.requested_edges,
            produced_edges: sample.report.produced_edges,
            shortfall_count: sample.report.shortfalls.len(),
        });
        connections.push(ConnectionInstance {
            source: connection.source,
            target: connection.target,
            edges,
            report: sample.report,
        });
    }

    let flattened = flatten(&topology, &assembly, &connections)?;

    let mut meta = BTreeMap::new();
    for node in definition.clusters() {
        let level = *topology.levels.get(&node.id).ok_or_else(|| {
            StrataError::Build(
                ErrorInfo::new("missing-cluster", "cluster has no display level")
                    .with_context("cluster", node.id.as_raw().to_string()),
            )
        })?;
        let (node_count, edge_count) = if node.is_leaf() {
            let graph = assembly.leaf_graphs.get(&node.id).ok_or_else(|| {
                StrataError::Build(
                    ErrorInfo::new("missing-cluster", "leaf graph missing at metadata assembly")
                        .with_context("cluster", node.id.as_raw().to_string()),
                )
            })?;
            (graph.node_count(), graph.edge_count())
        } else {
            let aggregate = assembly.aggregates.get(&node.id).ok_or_else(|| {
                StrataError::Build(
                    ErrorInfo::new("missing-cluster", "group aggregate missing at metadata assembly")
                        .with_context("cluster", node.id.as_raw().to_string()),
                )
            })?;
            (aggregate.node_count(), aggregate.edge_count())
        };
        meta.insert(
            node.id,
            ClusterMeta {
                color: node.color.clone(),
                level,
                leaf: node.is_leaf(),
                node_count,
                edge_count,
            },
        );
    }

    let definition_hash = definition_hash(definition)?;
    let instance = GraphInstance {
        seed,
        definition_hash: definition_hash.clone(),
        tokens,
        leaf_graphs: assembly.leaf_graphs,
        aggregates: assembly.aggregates,
        connections,
        flattened,
        meta,
        chains: topology.chains,
    };

    let report = BuildReport {
        mode: build_plan.mode,
        regenerated: build_plan.regenerate,
        reused: build_plan.reuse,
        removed: build_plan.remove,
        degraded,
        connections: summaries,
        node_count: instance.node_count(),
        edge_count: instance.edge_count(),
        instance_hash: instance.instance_hash(),
        definition_hash,
    };
    info!(
        "built instance: {} nodes, {} edges, {} regenerated, {} reused",
        report.node_count,
        report.edge_count,
        report.regenerated.len(),
        report.reused.len()
    );

    Ok((instance, report))
}

/// Generates the graph of one leaf cluster under its substream seed.
fn generate_leaf(node: &ClusterNode, master_seed: u64) -> Result<LeafGraph, StrataError> {
    let params = node.generator.params().ok_or_else(|| {
        StrataError::Build(
            ErrorInfo::new("missing-cluster", "group reached the leaf generation path")
                .with_context("cluster", node.id.as_raw().to_string()),
        )
    })?;
    let mut rng = RngHandle::from_seed(leaf_seed(master_seed, node.id.as_raw()));
    let mut degrees =
        degree_sequence_from_series(&params.degree_distribution, params.node_count, &mut rng)?;

    let graph = match &node.generator {
        GeneratorKind::ChungLu(_) => expected_degree_graph(&degrees, &mut rng)?,
        GeneratorKind::ConfigurationModel(_) => {
            if repair_odd_degree_sum(&mut degrees) {
                debug!(
                    "leaf {} stub count was odd, appended a degree-1 node",
                    node.id.as_raw()
                );
            }
            configuration_model_graph(&degrees, params.self_loops, &mut rng)?
        }
        GeneratorKind::MetaGroup => {
            return Err(StrataError::Build(
                ErrorInfo::new("missing-cluster", "group reached the leaf generation path")
                    .with_context("cluster", node.id.as_raw().to_string()),
            ))
        }
    };

    if params.giant_component_only {
        return giant_component(&graph);
    }
    Ok(graph)
}

fn connection_spec(connection: &ClusterConnection) -> ConnectionSpec {
    ConnectionSpec {
        edge_count: connection.edge_count,
        fraction_source: connection.fraction_source,
        fraction_target: connection.fraction_target,
        bias_source: connection.bias_source.clone(),
        bias_target: connection.bias_target.clone(),
        assortativity: connection.assortativity,
    }
}
