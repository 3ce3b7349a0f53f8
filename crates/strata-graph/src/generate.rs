//! Seeded random graph generators over prescribed degree sequences.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;

use strata_core::errors::{ErrorInfo, StrataError};
use strata_core::series::weighted_index;
use strata_core::{NodeId, RngHandle, Series};

use crate::storage::LeafGraph;

/// Draws a degree sequence of `node_count` entries from a distribution curve.
///
/// The curve is densified to integer steps over its extent and each node draws
/// one degree proportionally to the densified weights. A curve with no
/// positive mass over its extent cannot be drawn from and is rejected.
pub fn degree_sequence_from_series(
    series: &Series,
    node_count: usize,
    rng: &mut RngHandle,
) -> Result<Vec<u32>, StrataError> {
    let dense = series.resample_integer();
    let weights: Vec<f64> = dense.iter().map(|(_, weight)| *weight).collect();
    let total: f64 = weights.iter().sum();
    if dense.is_empty() || total <= 0.0 {
        let (lo, hi) = series.extent();
        return Err(StrataError::Generate(
            ErrorInfo::new(
                "empty-distribution",
                "degree distribution has no positive mass over its extent",
            )
            .with_context("extent-lo", lo.to_string())
            .with_context("extent-hi", hi.to_string())
            .with_hint("widen the extent or raise the curve above zero"),
        ));
    }
    let mut degrees = Vec::with_capacity(node_count);
    for _ in 0..node_count {
        let roll = rng.gen::<f64>();
        let slot = weighted_index(&weights, roll).ok_or_else(|| {
            StrataError::Generate(ErrorInfo::new(
                "empty-distribution",
                "degree distribution has no positive mass over its extent",
            ))
        })?;
        degrees.push(dense[slot].0.max(0) as u32);
    }
    Ok(degrees)
}

/// Appends one degree-1 entry when the stub count is odd.
///
/// Returns true when a repair node was appended. The configuration model
/// requires an even stub count; hierarchy builders call this before
/// generating rather than failing the whole leaf.
pub fn repair_odd_degree_sum(degrees: &mut Vec<u32>) -> bool {
    let total: u64 = degrees.iter().map(|&degree| u64::from(degree)).sum();
    if total % 2 == 1 {
        degrees.push(1);
        return true;
    }
    false
}

/// Generates an expected-degree random graph over the given weights.
///
/// Node pairs connect independently with probability `w_u * w_v / total`,
/// capped at one. The scan walks pairs in descending weight order and skips
/// geometrically between candidate partners, so the work is proportional to
/// the number of edges produced rather than the number of pairs. Zero-degree
/// nodes take part in no pair but keep their identifier and stay in the
/// output as isolated nodes. No self loops are produced.
pub fn expected_degree_graph(
    degrees: &[u32],
    rng: &mut RngHandle,
) -> Result<LeafGraph, StrataError> {
    let mut graph = LeafGraph::with_nodes(degrees.len());
    let mut ranked: Vec<(u32, f64)> = degrees
        .iter()
        .enumerate()
        .filter(|(_, degree)| **degree > 0)
        .map(|(index, degree)| (index as u32, f64::from(*degree)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let total: f64 = ranked.iter().map(|(_, weight)| weight).sum();
    if total <= 0.0 {
        return Ok(graph);
    }

    for anchor in 0..ranked.len() {
        let anchor_weight = ranked[anchor].1;
        let mut probe = anchor + 1;
        if probe >= ranked.len() {
            break;
        }
        let mut p = (anchor_weight * ranked[probe].1 / total).min(1.0);
        while probe < ranked.len() && p > 0.0 {
            if p < 1.0 {
                let roll = rng.gen::<f64>();
                // Geometric skip over partners that would all have been
                // rejected at probability p.
                let skip = (roll.ln() / (1.0 - p).ln()).floor();
                probe = probe.saturating_add(skip as usize);
            }
            if probe < ranked.len() {
                let q = (anchor_weight * ranked[probe].1 / total).min(1.0);
                if rng.gen::<f64>() < q / p {
                    graph.add_edge(
                        NodeId::from_raw(ranked[anchor].0),
                        NodeId::from_raw(ranked[probe].0),
                    )?;
                }
                p = q;
                probe += 1;
            }
        }
    }
    Ok(graph)
}

/// Generates a configuration-model graph realizing the degree sequence.
///
/// Each node contributes `degree` stubs; the stub list is shuffled, split in
/// half and paired positionally. Self loops are dropped unless
/// `allow_self_loops` is set. Duplicate undirected pairs are always dropped
/// rather than re-drawn, so the result carries at most `stub_count / 2`
/// edges and large degrees under-realize.
pub fn configuration_model_graph(
    degrees: &[u32],
    allow_self_loops: bool,
    rng: &mut RngHandle,
) -> Result<LeafGraph, StrataError> {
    let stub_total: u64 = degrees.iter().map(|&degree| u64::from(degree)).sum();
    if stub_total % 2 == 1 {
        return Err(StrataError::Generate(
            ErrorInfo::new(
                "invalid-degree-sequence",
                "configuration model requires an even stub count",
            )
            .with_context("stub-count", stub_total.to_string())
            .with_hint("append one degree-1 node to even out the stub count"),
        ));
    }

    let mut graph = LeafGraph::with_nodes(degrees.len());
    let mut stubs: Vec<NodeId> = Vec::with_capacity(stub_total as usize);
    for (index, &degree) in degrees.iter().enumerate() {
        for _ in 0..degree {
            stubs.push(NodeId::from_raw(index as u32));
        }
    }
    stubs.shuffle(rng);

    let half = stubs.len() / 2;
    let mut seen: BTreeSet<(NodeId, NodeId)> = BTreeSet::new();
    for index in 0..half {
        let a = stubs[index];
        let b = stubs[half + index];
        if a == b && !allow_self_loops {
            continue;
        }
        let key = if a <= b { (a, b) } else { (b, a) };
        if !seen.insert(key) {
            continue;
        }
        graph.add_edge(a, b)?;
    }
    Ok(graph)
}
