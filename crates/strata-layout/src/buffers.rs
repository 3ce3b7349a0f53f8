//! Device buffer preparation for the force accelerator.

use rand::Rng;

use strata_core::errors::{ErrorInfo, StrataError};
use strata_core::{Point2, RngHandle};

/// Buffers uploaded to the accelerator for one run.
///
/// The edge list is additionally provided pre-sorted by each endpoint; the
/// kernel's parallel force accumulation walks edges grouped per node and
/// expects both orderings.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBuffers {
    /// Per-node positions, updated in place each frame.
    pub positions: Vec<Point2>,
    /// Edge list in graph order.
    pub edges: Vec<(u32, u32)>,
    /// Edge list sorted by source endpoint.
    pub edges_by_source: Vec<(u32, u32)>,
    /// Edge list sorted by target endpoint.
    pub edges_by_target: Vec<(u32, u32)>,
}

/// Prepares accelerator buffers for a graph.
///
/// Prior positions are reused where available; new nodes start uniform in
/// `[-0.5, 0.5]` on both axes.
pub fn prepare_buffers(
    node_count: usize,
    edges: &[(u32, u32)],
    prior: &[Option<Point2>],
    rng: &mut RngHandle,
) -> Result<LayoutBuffers, StrataError> {
    if prior.len() != node_count {
        return Err(StrataError::Layout(
            ErrorInfo::new("prior-shape-mismatch", "prior positions do not match node count")
                .with_context("nodes", node_count.to_string())
                .with_context("prior", prior.len().to_string()),
        ));
    }
    for &(source, target) in edges {
        if source as usize >= node_count || target as usize >= node_count {
            return Err(StrataError::Layout(
                ErrorInfo::new("edge-out-of-bounds", "layout edge references unknown node")
                    .with_context("source", source.to_string())
                    .with_context("target", target.to_string())
                    .with_context("nodes", node_count.to_string()),
            ));
        }
    }

    let positions = prior
        .iter()
        .map(|position| match position {
            Some(point) => *point,
            None => Point2::new(rng.gen_range(-0.5..0.5), rng.gen_range(-0.5..0.5)),
        })
        .collect();

    let mut edges_by_source = edges.to_vec();
    edges_by_source.sort_by_key(|&(source, target)| (source, target));
    let mut edges_by_target = edges.to_vec();
    edges_by_target.sort_by_key(|&(source, target)| (target, source));

    Ok(LayoutBuffers {
        positions,
        edges: edges.to_vec(),
        edges_by_source,
        edges_by_target,
    })
}
