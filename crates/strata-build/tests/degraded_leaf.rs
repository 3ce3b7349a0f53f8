use strata_build::{build, BuildOptions, GeneratorKind, GraphDefinition, LeafParams};
use strata_core::series::{Series, SeriesPoint};

fn healthy(node_count: usize) -> LeafParams {
    LeafParams {
        node_count,
        degree_distribution: Series::from_points(vec![
            SeriesPoint::new(1.0, 1.0),
            SeriesPoint::new(3.0, 1.0),
        ])
        .unwrap(),
        giant_component_only: false,
        self_loops: false,
    }
}

/// A distribution whose extent contains no integer degree cannot be drawn
/// from; generation for that leaf fails.
fn undrawable(node_count: usize) -> LeafParams {
    LeafParams {
        node_count,
        degree_distribution: Series::from_points(vec![
            SeriesPoint::new(1.2, 1.0),
            SeriesPoint::new(1.8, 1.0),
        ])
        .unwrap(),
        giant_component_only: false,
        self_loops: false,
    }
}

#[test]
fn a_failing_leaf_degrades_without_aborting_the_build() {
    let mut definition = GraphDefinition::new(3);
    let good = definition
        .add_cluster(None, GeneratorKind::ChungLu(healthy(12)))
        .unwrap();
    let bad = definition
        .add_cluster(None, GeneratorKind::ChungLu(undrawable(12)))
        .unwrap();

    let (instance, report) = build(&definition, None, BuildOptions::default()).unwrap();

    // The degradation is explicit in the report, not swallowed.
    assert!(report.has_degraded_leaves());
    assert_eq!(report.degraded.len(), 1);
    assert_eq!(report.degraded[0].cluster, bad);
    assert_eq!(report.degraded[0].error.info().code, "empty-distribution");

    // The sibling leaf still built; the bad leaf is present but empty.
    assert!(instance.leaf_graphs.get(&good).unwrap().node_count() > 0);
    assert_eq!(instance.leaf_graphs.get(&bad).unwrap().node_count(), 0);
    assert_eq!(instance.node_count(), 12);
}

#[test]
fn degraded_leaves_regenerate_once_repaired() {
    let mut definition = GraphDefinition::new(3);
    let bad = definition
        .add_cluster(None, GeneratorKind::ChungLu(undrawable(12)))
        .unwrap();
    let (first, report) = build(&definition, None, BuildOptions::default()).unwrap();
    assert!(report.has_degraded_leaves());

    definition
        .set_generator(bad, GeneratorKind::ChungLu(healthy(12)))
        .unwrap();
    let (second, report) = build(&definition, Some(&first), BuildOptions::default()).unwrap();

    assert!(!report.has_degraded_leaves());
    assert_eq!(report.regenerated, vec![bad]);
    assert_eq!(second.leaf_graphs.get(&bad).unwrap().node_count(), 12);
}
