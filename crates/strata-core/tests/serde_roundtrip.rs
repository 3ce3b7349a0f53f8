use strata_core::series::{Series, SeriesPoint};
use strata_core::{ClusterId, GlobalNodeId, NodeId};

#[test]
fn series_round_trip_json() {
    let series = Series::from_points(vec![
        SeriesPoint::new(1.0, 4.0),
        SeriesPoint::new(8.0, 0.5),
        SeriesPoint::new(20.0, 0.0),
    ])
    .expect("valid series");

    let json = serde_json::to_string_pretty(&series).expect("serialize");
    let decoded: Series = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(decoded, series);
}

#[test]
fn series_deserialization_revalidates_ordering() {
    let json = r#"[{"x": 3.0, "y": 1.0}, {"x": 1.0, "y": 1.0}]"#;
    let decoded: Result<Series, _> = serde_json::from_str(json);
    assert!(decoded.is_err());
}

#[test]
fn global_ids_round_trip_and_order() {
    let a = GlobalNodeId::new(ClusterId::from_raw(1), NodeId::from_raw(9));
    let b = GlobalNodeId::new(ClusterId::from_raw(2), NodeId::from_raw(0));
    assert!(a < b);

    let json = serde_json::to_string(&a).expect("serialize");
    let decoded: GlobalNodeId = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded, a);
    assert_eq!(decoded.cluster.as_raw(), 1);
    assert_eq!(decoded.node.as_raw(), 9);
}
