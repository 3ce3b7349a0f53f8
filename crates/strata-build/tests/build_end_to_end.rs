use strata_build::{
    build, BuildMode, BuildOptions, ClusterConnection, GeneratorKind, GraphDefinition, LeafParams,
};
use strata_core::series::{Series, SeriesPoint};

fn uniform_degrees(lo: f64, hi: f64) -> Series {
    Series::from_points(vec![SeriesPoint::new(lo, 1.0), SeriesPoint::new(hi, 1.0)]).unwrap()
}

fn leaf_params(node_count: usize) -> LeafParams {
    LeafParams {
        node_count,
        degree_distribution: uniform_degrees(1.0, 4.0),
        giant_component_only: false,
        self_loops: false,
    }
}

/// Two 20-node leaves joined by a half-assortative 10-edge connection.
fn two_leaf_definition() -> GraphDefinition {
    let mut definition = GraphDefinition::new(42);
    let a = definition
        .add_cluster(None, GeneratorKind::ChungLu(leaf_params(20)))
        .unwrap();
    let b = definition
        .add_cluster(None, GeneratorKind::ChungLu(leaf_params(20)))
        .unwrap();
    definition
        .connect(ClusterConnection {
            source: a,
            target: b,
            edge_count: 10,
            fraction_source: 1.0,
            fraction_target: 1.0,
            bias_source: None,
            bias_target: None,
            assortativity: 0.5,
        })
        .unwrap();
    definition
}

#[test]
fn same_seed_reproduces_the_same_flattened_graph() {
    let definition = two_leaf_definition();

    let (first, report_a) = build(&definition, None, BuildOptions::default()).unwrap();
    let (second, report_b) = build(&definition, None, BuildOptions::default()).unwrap();

    assert_eq!(first.node_count(), 40);
    assert_eq!(first.node_count(), second.node_count());
    assert_eq!(first.instance_hash(), second.instance_hash());
    assert_eq!(report_a.instance_hash, report_b.instance_hash);
    assert_eq!(report_a.mode, BuildMode::Full);
}

#[test]
fn connection_edges_land_in_the_flattened_graph() {
    let definition = two_leaf_definition();
    let (instance, report) = build(&definition, None, BuildOptions::default()).unwrap();

    let leaf_edges: usize = instance
        .leaf_graphs
        .values()
        .map(|graph| graph.edge_count())
        .sum();
    let connection_edges: usize = instance
        .connections
        .iter()
        .map(|connection| connection.edges.len())
        .sum();
    assert_eq!(connection_edges, 10);
    assert_eq!(instance.edge_count(), leaf_edges + connection_edges);
    assert_eq!(report.connections.len(), 1);
    assert_eq!(report.connections[0].produced_edges, 10);
}

#[test]
fn flat_identifiers_are_dense_and_every_edge_resolves() {
    let definition = two_leaf_definition();
    let (instance, _) = build(&definition, None, BuildOptions::default()).unwrap();

    let count = instance.flattened.node_count() as u32;
    for edge in instance.flattened.edges() {
        assert!(edge.source < count);
        assert!(edge.target < count);
    }
    // The flat index covers every origin exactly once.
    assert_eq!(instance.flat_index().len(), count as usize);
}

#[test]
fn groups_aggregate_their_descendant_leaves() {
    let mut definition = GraphDefinition::new(7);
    let group = definition
        .add_cluster(None, GeneratorKind::MetaGroup)
        .unwrap();
    let a = definition
        .add_cluster(Some(group), GeneratorKind::ChungLu(leaf_params(10)))
        .unwrap();
    let b = definition
        .add_cluster(
            Some(group),
            GeneratorKind::ConfigurationModel(leaf_params(10)),
        )
        .unwrap();
    definition
        .connect(ClusterConnection {
            source: a,
            target: b,
            edge_count: 4,
            fraction_source: 1.0,
            fraction_target: 1.0,
            bias_source: None,
            bias_target: None,
            assortativity: 0.0,
        })
        .unwrap();

    let (instance, _) = build(&definition, None, BuildOptions::default()).unwrap();
    let aggregate = instance.aggregates.get(&group).unwrap();

    let leaf_nodes: usize = instance
        .leaf_graphs
        .values()
        .map(|graph| graph.node_count())
        .sum();
    let leaf_edges: usize = instance
        .leaf_graphs
        .values()
        .map(|graph| graph.edge_count())
        .sum();
    assert_eq!(aggregate.node_count(), leaf_nodes);
    assert_eq!(aggregate.member_edges.len(), leaf_edges);
    // Both endpoints live under the group, so the connection folds into it.
    let connection_edges: usize = instance
        .connections
        .iter()
        .map(|connection| connection.edges.len())
        .sum();
    assert_eq!(aggregate.connection_edges.len(), connection_edges);

    // Group metadata counts the aggregate view; levels separate groups from leaves.
    let group_meta = instance.meta.get(&group).unwrap();
    assert!(!group_meta.leaf);
    assert_eq!(group_meta.level, 1);
    assert_eq!(group_meta.node_count, leaf_nodes);
    assert_eq!(instance.meta.get(&a).unwrap().level, -1);
}
