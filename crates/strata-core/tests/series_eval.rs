use strata_core::series::{rescale_to_sum, weighted_index, Series, SeriesPoint};

fn ramp() -> Series {
    Series::from_points(vec![SeriesPoint::new(0.0, -1.0), SeriesPoint::new(4.0, 3.0)])
        .expect("valid series")
}

#[test]
fn interpolates_between_control_points() {
    let series = ramp();
    assert_eq!(series.value_at(0.0), -1.0);
    assert_eq!(series.value_at(4.0), 3.0);
    assert!((series.value_at(2.0) - 1.0).abs() < 1e-12);
}

#[test]
fn evaluates_to_zero_outside_extent() {
    let series = ramp();
    assert_eq!(series.value_at(-0.5), 0.0);
    assert_eq!(series.value_at(4.5), 0.0);
}

#[test]
fn single_point_series_is_a_spike() {
    let series = Series::from_points(vec![SeriesPoint::new(2.0, 5.0)]).expect("valid series");
    assert_eq!(series.value_at(2.0), 5.0);
    assert_eq!(series.value_at(1.9), 0.0);
    assert_eq!(series.resample_integer(), vec![(2, 5.0)]);
}

#[test]
fn resample_clamps_negative_weights() {
    let series = ramp();
    let dense = series.resample_integer();
    assert_eq!(dense.len(), 5);
    assert_eq!(dense[0], (0, 0.0));
    assert_eq!(dense[1], (1, 0.0));
    assert!((dense[2].1 - 1.0).abs() < 1e-12);
    assert!((dense[4].1 - 3.0).abs() < 1e-12);
}

#[test]
fn narrow_extent_resamples_to_nothing() {
    let series = Series::from_points(vec![
        SeriesPoint::new(0.25, 1.0),
        SeriesPoint::new(0.75, 1.0),
    ])
    .expect("valid series");
    assert!(series.resample_integer().is_empty());
}

#[test]
fn rejects_unsorted_points() {
    let err = Series::from_points(vec![SeriesPoint::new(1.0, 0.0), SeriesPoint::new(1.0, 2.0)])
        .unwrap_err();
    assert_eq!(err.info().code, "unsorted-series");
}

#[test]
fn rejects_non_finite_points() {
    let err =
        Series::from_points(vec![SeriesPoint::new(0.0, f64::NAN)]).unwrap_err();
    assert_eq!(err.info().code, "non-finite-point");
}

#[test]
fn rescale_hits_requested_total() {
    let mut values = vec![(0, 1.0), (1, 3.0)];
    rescale_to_sum(&mut values, 8.0);
    let total: f64 = values.iter().map(|(_, w)| w).sum();
    assert!((total - 8.0).abs() < 1e-12);
    assert!((values[0].1 - 2.0).abs() < 1e-12);
}

#[test]
fn rescale_leaves_zero_mass_untouched() {
    let mut values = vec![(0, 0.0), (1, 0.0)];
    rescale_to_sum(&mut values, 5.0);
    assert_eq!(values, vec![(0, 0.0), (1, 0.0)]);
}

#[test]
fn weighted_index_follows_cumulative_mass() {
    let weights = [1.0, 3.0];
    assert_eq!(weighted_index(&weights, 0.0), Some(0));
    assert_eq!(weighted_index(&weights, 0.2), Some(0));
    assert_eq!(weighted_index(&weights, 0.3), Some(1));
    assert_eq!(weighted_index(&weights, 0.999), Some(1));
}

#[test]
fn weighted_index_skips_non_positive_mass() {
    let weights = [0.0, -2.0, 4.0];
    assert_eq!(weighted_index(&weights, 0.0), Some(2));
    assert_eq!(weighted_index(&[0.0, 0.0], 0.5), None);
    assert_eq!(weighted_index(&[], 0.5), None);
}
