//! Piecewise-linear series used for degree distributions and bias curves.

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, StrataError};

/// Single control point of a [`Series`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Position on the horizontal axis.
    pub x: f64,
    /// Value at the position.
    pub y: f64,
}

impl SeriesPoint {
    /// Creates a new control point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Piecewise-linear curve over a finite x-extent.
///
/// Control points are finite and strictly ascending in x. The curve evaluates
/// by linear interpolation between neighbouring points and to zero outside
/// the extent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SeriesPoint>", into = "Vec<SeriesPoint>")]
pub struct Series {
    points: Vec<SeriesPoint>,
}

impl Series {
    /// Builds a series from control points, validating the ordering invariant.
    pub fn from_points(points: Vec<SeriesPoint>) -> Result<Self, StrataError> {
        if points.is_empty() {
            return Err(StrataError::Graph(ErrorInfo::new(
                "empty-series",
                "a series requires at least one control point",
            )));
        }
        for point in &points {
            if !point.x.is_finite() || !point.y.is_finite() {
                return Err(StrataError::Graph(
                    ErrorInfo::new("non-finite-point", "series control points must be finite")
                        .with_context("x", point.x.to_string())
                        .with_context("y", point.y.to_string()),
                ));
            }
        }
        for pair in points.windows(2) {
            if pair[1].x <= pair[0].x {
                return Err(StrataError::Graph(
                    ErrorInfo::new(
                        "unsorted-series",
                        "series control points must be strictly ascending in x",
                    )
                    .with_context("left", pair[0].x.to_string())
                    .with_context("right", pair[1].x.to_string()),
                ));
            }
        }
        Ok(Self { points })
    }

    /// Returns the control points in ascending x order.
    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    /// Returns the inclusive x-extent covered by the series.
    pub fn extent(&self) -> (f64, f64) {
        (
            self.points[0].x,
            self.points[self.points.len() - 1].x,
        )
    }

    /// Evaluates the curve at `x`.
    ///
    /// Positions outside the extent evaluate to zero.
    pub fn value_at(&self, x: f64) -> f64 {
        let (lo, hi) = self.extent();
        if x < lo || x > hi {
            return 0.0;
        }
        let mut previous = self.points[0];
        if x == previous.x {
            return previous.y;
        }
        for point in &self.points[1..] {
            if x <= point.x {
                let span = point.x - previous.x;
                let t = (x - previous.x) / span;
                return previous.y + t * (point.y - previous.y);
            }
            previous = *point;
        }
        previous.y
    }

    /// Densifies the curve to integer-step samples over its extent.
    ///
    /// Sampled values are clamped below at zero so the result can be used as
    /// a weight vector. An extent narrower than one integer step yields an
    /// empty sample list.
    pub fn resample_integer(&self) -> Vec<(i64, f64)> {
        let (lo, hi) = self.extent();
        let start = lo.ceil() as i64;
        let end = hi.floor() as i64;
        if start > end {
            return Vec::new();
        }
        (start..=end)
            .map(|x| (x, self.value_at(x as f64).max(0.0)))
            .collect()
    }
}

impl TryFrom<Vec<SeriesPoint>> for Series {
    type Error = StrataError;

    fn try_from(points: Vec<SeriesPoint>) -> Result<Self, Self::Error> {
        Series::from_points(points)
    }
}

impl From<Series> for Vec<SeriesPoint> {
    fn from(series: Series) -> Self {
        series.points
    }
}

/// Rescales weights in place so they sum to `target`.
///
/// All-zero inputs are left untouched.
pub fn rescale_to_sum(values: &mut [(i64, f64)], target: f64) {
    let total: f64 = values.iter().map(|(_, weight)| weight).sum();
    if total <= 0.0 {
        return;
    }
    let factor = target / total;
    for (_, weight) in values.iter_mut() {
        *weight *= factor;
    }
}

/// Picks an index proportionally to `weights` given a uniform roll in `[0, 1)`.
///
/// Returns `None` when the weights carry no positive mass.
pub fn weighted_index(weights: &[f64], roll: f64) -> Option<usize> {
    let total: f64 = weights.iter().filter(|weight| **weight > 0.0).sum();
    if total <= 0.0 {
        return None;
    }
    let mut remaining = roll * total;
    let mut last_positive = None;
    for (idx, weight) in weights.iter().enumerate() {
        if *weight <= 0.0 {
            continue;
        }
        last_positive = Some(idx);
        if remaining < *weight {
            return Some(idx);
        }
        remaining -= *weight;
    }
    last_positive
}
