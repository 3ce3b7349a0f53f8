use std::fs;

use strata_build::{
    build, instance_to_json, write_edges_csv, write_nodes_csv, BuildManifest, BuildOptions,
    GeneratorKind, GraphDefinition, LeafParams,
};
use strata_core::series::{Series, SeriesPoint};

fn small_definition() -> GraphDefinition {
    let mut definition = GraphDefinition::new(21);
    definition
        .add_cluster(
            None,
            GeneratorKind::ConfigurationModel(LeafParams {
                node_count: 12,
                degree_distribution: Series::from_points(vec![
                    SeriesPoint::new(1.0, 1.0),
                    SeriesPoint::new(3.0, 1.0),
                ])
                .unwrap(),
                giant_component_only: false,
                self_loops: false,
            }),
        )
        .unwrap();
    definition
}

#[test]
fn csv_exports_cover_the_flattened_graph() {
    let definition = small_definition();
    let (instance, _) = build(&definition, None, BuildOptions::default()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let nodes_path = dir.path().join("nodes.csv");
    let edges_path = dir.path().join("edges.csv");
    write_nodes_csv(&instance, &nodes_path).unwrap();
    write_edges_csv(&instance, &edges_path).unwrap();

    let nodes = fs::read_to_string(&nodes_path).unwrap();
    let edges = fs::read_to_string(&edges_path).unwrap();
    assert!(nodes.starts_with("flat_id,cluster,local_node"));
    assert_eq!(nodes.lines().count(), 1 + instance.node_count());
    assert!(edges.starts_with("source,target"));
    assert_eq!(edges.lines().count(), 1 + instance.edge_count());
}

#[test]
fn manifest_roundtrips_through_disk() {
    let definition = small_definition();
    let (_, report) = build(&definition, None, BuildOptions::default()).unwrap();

    let manifest = BuildManifest::new(definition.seed, report.clone(), vec!["nodes.csv".into()]);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out/manifest.json");
    manifest.write(&path).unwrap();

    let loaded = BuildManifest::load(&path).unwrap();
    assert_eq!(loaded.seed, definition.seed);
    assert_eq!(loaded.instance_hash, report.instance_hash);
    assert_eq!(loaded.report, report);
    assert!(!loaded.created_at.is_empty());
}

#[test]
fn instance_export_carries_nodes_edges_and_clusters() {
    let definition = small_definition();
    let (instance, _) = build(&definition, None, BuildOptions::default()).unwrap();

    let json = instance_to_json(&instance).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(
        value["nodes"].as_array().unwrap().len(),
        instance.node_count()
    );
    assert_eq!(
        value["edges"].as_array().unwrap().len(),
        instance.edge_count()
    );
    assert_eq!(value["clusters"].as_array().unwrap().len(), 1);
    assert_eq!(value["seed"], 21);
}
