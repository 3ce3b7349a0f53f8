//! Degree-bucket node selection with quota curves and outward fallback.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;

use strata_core::series::rescale_to_sum;
use strata_core::{GlobalNodeId, RngHandle, Series};

use crate::report::{BucketShortfall, SideLabel};
use crate::spec::SampleSide;

/// Nodes grouped by degree, consumed as draws remove them.
pub(crate) struct DegreeBuckets {
    buckets: BTreeMap<u32, Vec<GlobalNodeId>>,
    initial_count: usize,
}

impl DegreeBuckets {
    pub(crate) fn new(side: &SampleSide) -> Self {
        let mut buckets: BTreeMap<u32, Vec<GlobalNodeId>> = BTreeMap::new();
        for (node, degree) in side.nodes().iter().zip(side.degrees()) {
            buckets.entry(*degree).or_default().push(*node);
        }
        let initial_count = buckets.len();
        Self {
            buckets,
            initial_count,
        }
    }

    /// Number of distinct degrees present before any draws.
    pub(crate) fn bucket_count(&self) -> usize {
        self.initial_count
    }

    fn draw_exact(&mut self, degree: i64, rng: &mut RngHandle) -> Option<GlobalNodeId> {
        let key = u32::try_from(degree).ok()?;
        let list = self.buckets.get_mut(&key)?;
        let index = rng.gen_range(0..list.len());
        let node = list.swap_remove(index);
        if list.is_empty() {
            self.buckets.remove(&key);
        }
        Some(node)
    }

    /// Draws near `degree`, probing offsets `0, +1, -1, +2, -2, ...` up to
    /// `radius` before giving up.
    pub(crate) fn draw_near(
        &mut self,
        degree: i64,
        radius: usize,
        rng: &mut RngHandle,
    ) -> Option<GlobalNodeId> {
        if let Some(node) = self.draw_exact(degree, rng) {
            return Some(node);
        }
        for offset in 1..=radius as i64 {
            if let Some(node) = self.draw_exact(degree + offset, rng) {
                return Some(node);
            }
            if let Some(node) = self.draw_exact(degree - offset, rng) {
                return Some(node);
            }
        }
        None
    }
}

/// Draws `count` nodes uniformly without replacement.
pub(crate) fn uniform_nodes(
    side: &SampleSide,
    count: usize,
    rng: &mut RngHandle,
) -> Vec<GlobalNodeId> {
    let mut pool: Vec<GlobalNodeId> = side.nodes().to_vec();
    pool.shuffle(rng);
    pool.truncate(count);
    pool
}

/// Draws `count` nodes following a degree bias curve.
///
/// The curve is densified to integer degrees over its extent and rescaled so
/// the per-degree quotas sum to `count`. Draws that no bucket can satisfy are
/// recorded in `shortfalls` and skipped.
pub(crate) fn biased_nodes(
    side: &SampleSide,
    curve: &Series,
    count: usize,
    side_label: SideLabel,
    shortfalls: &mut Vec<BucketShortfall>,
    rng: &mut RngHandle,
) -> Vec<GlobalNodeId> {
    let mut buckets = DegreeBuckets::new(side);
    let radius = buckets.bucket_count() * 2;
    let mut quotas = curve.resample_integer();
    rescale_to_sum(&mut quotas, count as f64);
    let quotas = integer_quotas(&quotas, count);

    let mut drawn = Vec::with_capacity(count);
    for (degree, want) in quotas {
        let mut satisfied = 0usize;
        for _ in 0..want {
            if drawn.len() == count {
                break;
            }
            match buckets.draw_near(degree, radius, rng) {
                Some(node) => {
                    drawn.push(node);
                    satisfied += 1;
                }
                None => {
                    // Buckets only shrink, so the remaining draws for this
                    // degree cannot succeed either.
                    shortfalls.push(BucketShortfall {
                        side: side_label,
                        degree,
                        missing: want - satisfied,
                    });
                    break;
                }
            }
        }
        if drawn.len() == count {
            break;
        }
    }
    drawn
}

/// Rounds fractional quotas to integers summing to `count` by largest
/// remainder.
///
/// Each quota keeps its floor; the units lost to flooring go to the degrees
/// with the largest fractional parts. A curve whose every quota falls below
/// one half still yields `count` draws instead of rounding away to nothing.
fn integer_quotas(quotas: &[(i64, f64)], count: usize) -> Vec<(i64, usize)> {
    let mut rounded: Vec<(i64, usize)> = quotas
        .iter()
        .map(|(degree, quota)| (*degree, quota.max(0.0).floor() as usize))
        .collect();
    let floored: usize = rounded.iter().map(|(_, want)| want).sum();
    let mut leftover = count.saturating_sub(floored);
    if leftover == 0 {
        return rounded;
    }
    let mut by_remainder: Vec<usize> = (0..quotas.len()).collect();
    by_remainder.sort_by(|a, b| {
        let left = quotas[*a].1 - quotas[*a].1.floor();
        let right = quotas[*b].1 - quotas[*b].1.floor();
        right.total_cmp(&left)
    });
    for index in by_remainder {
        if leftover == 0 {
            break;
        }
        rounded[index].1 += 1;
        leftover -= 1;
    }
    rounded
}
