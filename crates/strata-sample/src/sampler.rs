//! Candidate construction and assortative edge selection.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;

use strata_core::errors::StrataError;
use strata_core::{GlobalNodeId, RngHandle};

use crate::bias::{biased_nodes, uniform_nodes};
use crate::report::{SampleReport, SideLabel};
use crate::spec::{ConnectionSpec, SampleSide};

/// Edges drawn for one connection together with the sampling report.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionSample {
    /// Drawn edges as `(source node, target node)` pairs.
    pub edges: Vec<(GlobalNodeId, GlobalNodeId)>,
    /// Diagnostics for the run.
    pub report: SampleReport,
}

struct Candidate {
    source: GlobalNodeId,
    target: GlobalNodeId,
    distance: u32,
}

/// Samples the edges of one inter-cluster connection.
///
/// The run proceeds in stages: derive per-side node counts from the
/// fractions, draw participating nodes (uniformly or along the bias curves),
/// form all cross-cluster candidate pairs tagged with their degree distance,
/// then fill the requested edge count with a random portion followed by an
/// assortativity-ordered portion. Scarce candidates shrink the result rather
/// than failing; the report records what was requested versus produced.
pub fn sample_connection(
    spec: &ConnectionSpec,
    source: &SampleSide,
    target: &SampleSide,
    rng: &mut RngHandle,
) -> Result<ConnectionSample, StrataError> {
    spec.validate()?;

    let requested_source = rounded_count(spec.fraction_source, source.len());
    let requested_target = rounded_count(spec.fraction_target, target.len());

    let mut report = SampleReport {
        requested_edges: spec.edge_count,
        requested_source_nodes: requested_source,
        requested_target_nodes: requested_target,
        ..SampleReport::default()
    };

    let drawn_source = match &spec.bias_source {
        Some(curve) => biased_nodes(
            source,
            curve,
            requested_source,
            SideLabel::Source,
            &mut report.shortfalls,
            rng,
        ),
        None => uniform_nodes(source, requested_source, rng),
    };
    let drawn_target = match &spec.bias_target {
        Some(curve) => biased_nodes(
            target,
            curve,
            requested_target,
            SideLabel::Target,
            &mut report.shortfalls,
            rng,
        ),
        None => uniform_nodes(target, requested_target, rng),
    };
    report.drawn_source_nodes = drawn_source.len();
    report.drawn_target_nodes = drawn_target.len();

    let source_degrees = degree_lookup(source);
    let target_degrees = degree_lookup(target);

    let mut candidates: Vec<Candidate> = Vec::new();
    for &u in &drawn_source {
        for &v in &drawn_target {
            // Nodes of the same leaf cluster never pair up; sides built from
            // overlapping groups can otherwise offer the same leaf twice.
            if u.cluster == v.cluster {
                continue;
            }
            let du = source_degrees.get(&u).copied().unwrap_or(0);
            let dv = target_degrees.get(&v).copied().unwrap_or(0);
            candidates.push(Candidate {
                source: u,
                target: v,
                distance: du.abs_diff(dv),
            });
        }
    }

    let assortative_quota = (spec.assortativity.abs() * spec.edge_count as f64).round() as usize;
    let assortative_quota = assortative_quota.min(spec.edge_count);
    let random_quota = spec.edge_count - assortative_quota;

    candidates.shuffle(rng);
    let taken_random = random_quota.min(candidates.len());
    let mut rest = candidates.split_off(taken_random);
    let mut selected = candidates;

    if spec.assortativity >= 0.0 {
        rest.sort_by(|a, b| a.distance.cmp(&b.distance));
    } else {
        rest.sort_by(|a, b| b.distance.cmp(&a.distance));
    }
    let taken_assortative = assortative_quota.min(rest.len());
    selected.extend(rest.into_iter().take(taken_assortative));
    selected.truncate(spec.edge_count);

    report.produced_edges = selected.len();
    let edges = selected
        .into_iter()
        .map(|candidate| (candidate.source, candidate.target))
        .collect();

    Ok(ConnectionSample { edges, report })
}

fn rounded_count(fraction: f64, len: usize) -> usize {
    (fraction * len as f64).round() as usize
}

fn degree_lookup(side: &SampleSide) -> BTreeMap<GlobalNodeId, u32> {
    side.nodes()
        .iter()
        .copied()
        .zip(side.degrees().iter().copied())
        .collect()
}
