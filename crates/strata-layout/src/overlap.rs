//! Anti-overlap post-processing over cluster centroids.

use std::collections::BTreeMap;

use strata_core::errors::StrataError;
use strata_core::{CancellationToken, ClusterId, Point2};

/// Upper bound on fixed-point iterations of the anti-overlap pass.
pub const MAX_OVERLAP_ITERATIONS: usize = 100;

/// Whether two display levels are shown together and may repel.
///
/// Leaves carry non-positive levels (zero at the top, more negative when
/// nested); groups carry strictly positive levels. Groups repel everything,
/// equal non-negative levels repel each other, and leaves on different
/// levels never interact.
pub fn levels_repel(a: i32, b: i32) -> bool {
    a > 0 || b > 0 || (a == b && a >= 0)
}

/// Pushes overlapping co-displayed centroids apart.
///
/// Runs fixed-point iterations over every repelling centroid pair closer
/// than `min_distance`, displacing both endpoints along their separating
/// direction, until an iteration moves nothing or the iteration budget is
/// exhausted. The token is observed at the top of every iteration, so a
/// cancelled token leaves the map untouched. Returns the number of
/// iterations that applied a displacement.
pub fn anti_overlap(
    centroids: &mut BTreeMap<ClusterId, Point2>,
    levels: &BTreeMap<ClusterId, i32>,
    min_distance: f32,
    token: &CancellationToken,
) -> Result<usize, StrataError> {
    let ids: Vec<ClusterId> = centroids.keys().copied().collect();
    for iteration in 0..MAX_OVERLAP_ITERATIONS {
        token.checkpoint("anti-overlap")?;
        let mut moved = false;
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                let level_i = levels.get(&ids[i]).copied().unwrap_or(0);
                let level_j = levels.get(&ids[j]).copied().unwrap_or(0);
                if !levels_repel(level_i, level_j) {
                    continue;
                }
                let a = centroids[&ids[i]];
                let b = centroids[&ids[j]];
                let distance = a.distance(&b);
                if distance >= min_distance {
                    continue;
                }
                // Coincident centroids have no separating direction; pick one.
                let (dx, dy) = if distance > f32::EPSILON {
                    ((b.x - a.x) / distance, (b.y - a.y) / distance)
                } else {
                    (1.0, 0.0)
                };
                let push = 0.5 * (min_distance - distance);
                centroids.insert(ids[i], Point2::new(a.x - dx * push, a.y - dy * push));
                centroids.insert(ids[j], Point2::new(b.x + dx * push, b.y + dy * push));
                moved = true;
            }
        }
        if !moved {
            return Ok(iteration);
        }
    }
    Ok(MAX_OVERLAP_ITERATIONS)
}
