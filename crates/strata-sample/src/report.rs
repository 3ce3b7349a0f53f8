//! Structured outcome reporting for connection sampling.

use serde::{Deserialize, Serialize};

/// Which side of a connection a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SideLabel {
    /// Source side of the connection.
    Source,
    /// Target side of the connection.
    Target,
}

/// A degree bucket that could not satisfy its quota even after fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketShortfall {
    /// Side the quota applied to.
    pub side: SideLabel,
    /// Degree the quota targeted.
    pub degree: i64,
    /// Number of draws that could not be satisfied.
    pub missing: usize,
}

/// Summary of one sampling run; shortfalls are reported, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SampleReport {
    /// Edge count the caller asked for.
    pub requested_edges: usize,
    /// Edge count actually produced.
    pub produced_edges: usize,
    /// Source node count derived from the fraction.
    pub requested_source_nodes: usize,
    /// Source nodes actually drawn.
    pub drawn_source_nodes: usize,
    /// Target node count derived from the fraction.
    pub requested_target_nodes: usize,
    /// Target nodes actually drawn.
    pub drawn_target_nodes: usize,
    /// Quota buckets that ran dry.
    pub shortfalls: Vec<BucketShortfall>,
}
