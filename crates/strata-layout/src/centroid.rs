//! Per-cluster centroid derivation from node positions.

use std::collections::BTreeMap;

use strata_core::{ClusterId, Point2};

/// Computes the mean position of every cluster's member nodes.
///
/// Clusters with no members in the laid-out node set are omitted rather
/// than reported at the origin.
pub fn centroids(
    positions: &[Point2],
    membership: &BTreeMap<ClusterId, Vec<u32>>,
) -> BTreeMap<ClusterId, Point2> {
    let mut result = BTreeMap::new();
    for (cluster, members) in membership {
        let mut x = 0.0f32;
        let mut y = 0.0f32;
        let mut count = 0usize;
        for &member in members {
            if let Some(position) = positions.get(member as usize) {
                x += position.x;
                y += position.y;
                count += 1;
            }
        }
        if count > 0 {
            result.insert(*cluster, Point2::new(x / count as f32, y / count as f32));
        }
    }
    result
}
