use proptest::prelude::*;
use strata_core::{ClusterId, GlobalNodeId, NodeId, RngHandle};
use strata_sample::{sample_connection, ConnectionSpec, SampleSide};

fn gid(cluster: u64, node: u32) -> GlobalNodeId {
    GlobalNodeId::new(ClusterId::from_raw(cluster), NodeId::from_raw(node))
}

fn spec(edge_count: usize, assortativity: f64) -> ConnectionSpec {
    ConnectionSpec {
        edge_count,
        fraction_source: 1.0,
        fraction_target: 1.0,
        bias_source: None,
        bias_target: None,
        assortativity,
    }
}

fn two_degree_sides() -> (SampleSide, SampleSide) {
    let source = SampleSide::new(vec![gid(1, 0), gid(1, 1)], vec![1, 10]).unwrap();
    let target = SampleSide::new(vec![gid(2, 0), gid(2, 1)], vec![1, 10]).unwrap();
    (source, target)
}

#[test]
fn full_assortativity_selects_smallest_distances() {
    let (source, target) = two_degree_sides();
    let mut rng = RngHandle::from_seed(5);
    let sample = sample_connection(&spec(2, 1.0), &source, &target, &mut rng).unwrap();

    let mut edges = sample.edges.clone();
    edges.sort();
    assert_eq!(edges, vec![(gid(1, 0), gid(2, 0)), (gid(1, 1), gid(2, 1))]);
    assert_eq!(sample.report.produced_edges, 2);
}

#[test]
fn full_disassortativity_selects_largest_distances() {
    let (source, target) = two_degree_sides();
    let mut rng = RngHandle::from_seed(5);
    let sample = sample_connection(&spec(2, -1.0), &source, &target, &mut rng).unwrap();

    let mut edges = sample.edges.clone();
    edges.sort();
    assert_eq!(edges, vec![(gid(1, 0), gid(2, 1)), (gid(1, 1), gid(2, 0))]);
}

#[test]
fn zero_assortativity_is_seed_deterministic() {
    let source = SampleSide::new(
        (0..4).map(|n| gid(1, n)).collect(),
        vec![2, 3, 4, 5],
    )
    .unwrap();
    let target = SampleSide::new(
        (0..4).map(|n| gid(2, n)).collect(),
        vec![2, 3, 4, 5],
    )
    .unwrap();

    let mut rng_a = RngHandle::from_seed(77);
    let sample_a = sample_connection(&spec(3, 0.0), &source, &target, &mut rng_a).unwrap();
    let mut rng_b = RngHandle::from_seed(77);
    let sample_b = sample_connection(&spec(3, 0.0), &source, &target, &mut rng_b).unwrap();

    assert_eq!(sample_a.edges, sample_b.edges);
    assert_eq!(sample_a.report.produced_edges, 3);
}

/// Mean degree distance of the drawn edges, pooled over many seeds. Node ids
/// double as degrees on both sides, so the distance of an edge is the raw-id
/// difference of its endpoints.
fn mean_drawn_distance(
    source: &SampleSide,
    target: &SampleSide,
    edge_count: usize,
    assortativity: f64,
) -> f64 {
    let mut total = 0.0;
    let mut edges = 0usize;
    for seed in 0..64u64 {
        let mut rng = RngHandle::from_seed(seed);
        let sample =
            sample_connection(&spec(edge_count, assortativity), source, target, &mut rng).unwrap();
        for (u, v) in &sample.edges {
            total += f64::from(u.node.as_raw().abs_diff(v.node.as_raw()));
        }
        edges += sample.edges.len();
    }
    total / edges as f64
}

#[test]
fn zero_assortativity_shows_no_degree_distance_bias() {
    let degrees: Vec<u32> = (0..12).collect();
    let source = SampleSide::new((0..12).map(|n| gid(1, n)).collect(), degrees.clone()).unwrap();
    let target = SampleSide::new((0..12).map(|n| gid(2, n)).collect(), degrees.clone()).unwrap();

    // With full fractions and no bias curves every cross-cluster pair is a
    // candidate, so the unbiased reference is the mean degree distance over
    // the whole candidate population.
    let mut population = 0.0;
    for &du in &degrees {
        for &dv in &degrees {
            population += f64::from(du.abs_diff(dv));
        }
    }
    let population_mean = population / (degrees.len() * degrees.len()) as f64;

    // 64 seeds x 24 edges keeps the standard error of the pooled mean under
    // a tenth of a unit, so half a unit of tolerance is comfortably wide.
    let uniform_mean = mean_drawn_distance(&source, &target, 24, 0.0);
    assert!(
        (uniform_mean - population_mean).abs() < 0.5,
        "uniform draws skew by degree distance: {uniform_mean} vs {population_mean}",
    );

    let assortative_mean = mean_drawn_distance(&source, &target, 24, 1.0);
    assert!(
        assortative_mean < uniform_mean,
        "assortative draws are not closer in degree: {assortative_mean} vs {uniform_mean}",
    );
}

#[test]
fn same_cluster_pairs_are_excluded() {
    // The source side offers a node of cluster 2, which must never pair
    // with the cluster-2 target node.
    let source = SampleSide::new(vec![gid(1, 0), gid(2, 0)], vec![1, 1]).unwrap();
    let target = SampleSide::new(vec![gid(2, 1)], vec![1]).unwrap();

    let mut rng = RngHandle::from_seed(9);
    let sample = sample_connection(&spec(5, 0.0), &source, &target, &mut rng).unwrap();

    assert_eq!(sample.edges, vec![(gid(1, 0), gid(2, 1))]);
    assert_eq!(sample.report.requested_edges, 5);
    assert_eq!(sample.report.produced_edges, 1);
}

#[test]
fn empty_side_produces_no_edges() {
    let source = SampleSide::new(vec![gid(1, 0)], vec![3]).unwrap();
    let target = SampleSide::new(Vec::new(), Vec::new()).unwrap();

    let mut rng = RngHandle::from_seed(1);
    let sample = sample_connection(&spec(4, 0.5), &source, &target, &mut rng).unwrap();
    assert!(sample.edges.is_empty());
    assert_eq!(sample.report.drawn_target_nodes, 0);
}

#[test]
fn fraction_limits_participants() {
    let source = SampleSide::new((0..10).map(|n| gid(1, n)).collect(), vec![2; 10]).unwrap();
    let target = SampleSide::new((0..10).map(|n| gid(2, n)).collect(), vec![2; 10]).unwrap();

    let mut spec = spec(100, 0.0);
    spec.fraction_source = 0.5;
    spec.fraction_target = 0.2;

    let mut rng = RngHandle::from_seed(12);
    let sample = sample_connection(&spec, &source, &target, &mut rng).unwrap();

    assert_eq!(sample.report.requested_source_nodes, 5);
    assert_eq!(sample.report.drawn_source_nodes, 5);
    assert_eq!(sample.report.requested_target_nodes, 2);
    // At most 5 * 2 candidate pairs exist.
    assert_eq!(sample.report.produced_edges, 10);
}

#[test]
fn out_of_range_parameters_are_rejected() {
    let (source, target) = two_degree_sides();
    let mut rng = RngHandle::from_seed(1);

    let mut bad = spec(1, 0.0);
    bad.fraction_source = 1.5;
    let err = sample_connection(&bad, &source, &target, &mut rng).unwrap_err();
    assert_eq!(err.info().code, "invalid-fraction");

    let bad = spec(1, 2.0);
    let err = sample_connection(&bad, &source, &target, &mut rng).unwrap_err();
    assert_eq!(err.info().code, "invalid-assortativity");
}

#[test]
fn mismatched_side_vectors_are_rejected() {
    let err = SampleSide::new(vec![gid(1, 0)], vec![1, 2]).unwrap_err();
    assert_eq!(err.info().code, "side-shape-mismatch");
}

proptest! {
    #[test]
    fn samples_never_pair_within_a_cluster(
        seed in any::<u64>(),
        source_count in 0usize..12,
        target_count in 0usize..12,
        edge_count in 0usize..40,
        assortativity in -1.0f64..=1.0,
    ) {
        let source = SampleSide::new(
            (0..source_count as u32).map(|n| gid(1, n)).collect(),
            (0..source_count as u32).map(|n| n % 5).collect(),
        ).unwrap();
        let target = SampleSide::new(
            (0..target_count as u32).map(|n| gid(2, n)).collect(),
            (0..target_count as u32).map(|n| n % 7).collect(),
        ).unwrap();

        let spec = ConnectionSpec {
            edge_count,
            fraction_source: 1.0,
            fraction_target: 1.0,
            bias_source: None,
            bias_target: None,
            assortativity,
        };

        let mut rng = RngHandle::from_seed(seed);
        let sample = sample_connection(&spec, &source, &target, &mut rng).unwrap();
        prop_assert!(sample.edges.len() <= edge_count);
        prop_assert_eq!(sample.edges.len(), sample.report.produced_edges);
        for (u, v) in &sample.edges {
            prop_assert!(u.cluster != v.cluster);
        }

        let mut rng = RngHandle::from_seed(seed);
        let again = sample_connection(&spec, &source, &target, &mut rng).unwrap();
        prop_assert_eq!(sample.edges, again.edges);
    }
}
