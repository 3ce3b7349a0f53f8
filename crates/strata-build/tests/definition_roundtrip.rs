use strata_build::{
    definition_from_json, definition_hash, definition_to_json, snapshot_from_bytes,
    snapshot_to_bytes, ClusterConnection, GeneratorKind, GraphDefinition, LeafParams,
};
use strata_core::series::{Series, SeriesPoint};

fn series(points: &[(f64, f64)]) -> Series {
    Series::from_points(
        points
            .iter()
            .map(|&(x, y)| SeriesPoint::new(x, y))
            .collect(),
    )
    .unwrap()
}

/// One leaf of each generator kind, a group, and a biased connection.
fn representative_definition() -> GraphDefinition {
    let mut definition = GraphDefinition::new(1234);
    let chung_lu = definition
        .add_cluster(
            None,
            GeneratorKind::ChungLu(LeafParams {
                node_count: 30,
                degree_distribution: series(&[(1.0, 1.0), (5.0, 0.2)]),
                giant_component_only: true,
                self_loops: false,
            }),
        )
        .unwrap();
    let group = definition
        .add_cluster(None, GeneratorKind::MetaGroup)
        .unwrap();
    let stub = definition
        .add_cluster(
            Some(group),
            GeneratorKind::ConfigurationModel(LeafParams {
                node_count: 25,
                degree_distribution: series(&[(2.0, 1.0), (6.0, 1.0)]),
                giant_component_only: false,
                self_loops: true,
            }),
        )
        .unwrap();
    definition
        .connect(ClusterConnection {
            source: chung_lu,
            target: stub,
            edge_count: 12,
            fraction_source: 0.8,
            fraction_target: 0.5,
            bias_source: Some(series(&[(1.0, 0.1), (5.0, 1.0)])),
            bias_target: None,
            assortativity: -0.3,
        })
        .unwrap();
    definition
}

#[test]
fn json_roundtrip_reconstructs_an_equal_definition() {
    let definition = representative_definition();
    let json = definition_to_json(&definition).unwrap();
    let restored = definition_from_json(&json).unwrap();
    assert_eq!(definition, restored);
}

#[test]
fn generator_kinds_survive_the_roundtrip() {
    let definition = representative_definition();
    let restored = definition_from_json(&definition_to_json(&definition).unwrap()).unwrap();

    let kinds: Vec<&str> = restored
        .clusters()
        .iter()
        .map(|node| node.generator.label())
        .collect();
    assert_eq!(kinds, vec!["chung-lu", "meta-group", "configuration-model"]);

    let connection = &restored.connections()[0];
    assert!(connection.bias_source.is_some());
    assert!(connection.bias_target.is_none());
    assert_eq!(connection.assortativity, -0.3);
}

#[test]
fn snapshot_roundtrip_matches_and_hash_is_stable() {
    let definition = representative_definition();
    let bytes = snapshot_to_bytes(&definition).unwrap();
    let restored = snapshot_from_bytes(&bytes).unwrap();
    assert_eq!(definition, restored);
    assert_eq!(
        definition_hash(&definition).unwrap(),
        definition_hash(&restored).unwrap()
    );
}

#[test]
fn malformed_payloads_are_rejected_with_codes() {
    let err = definition_from_json("{not json").unwrap_err();
    assert_eq!(err.info().code, "definition-parse");

    let mut json: serde_json::Value =
        serde_json::from_str(&definition_to_json(&representative_definition()).unwrap()).unwrap();
    json["schema_version"]["major"] = serde_json::json!(99);
    let err = definition_from_json(&json.to_string()).unwrap_err();
    assert_eq!(err.info().code, "schema-too-new");
}
