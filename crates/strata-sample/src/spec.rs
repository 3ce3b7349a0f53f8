//! Input contracts for connection sampling.

use serde::{Deserialize, Serialize};

use strata_core::errors::{ErrorInfo, StrataError};
use strata_core::{GlobalNodeId, Series};

/// Parameters of one inter-cluster connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionSpec {
    /// Number of edges to draw.
    pub edge_count: usize,
    /// Fraction of the source side participating, in `[0, 1]`.
    pub fraction_source: f64,
    /// Fraction of the target side participating, in `[0, 1]`.
    pub fraction_target: f64,
    /// Optional degree bias curve for the source side.
    #[serde(default)]
    pub bias_source: Option<Series>,
    /// Optional degree bias curve for the target side.
    #[serde(default)]
    pub bias_target: Option<Series>,
    /// Degree assortativity in `[-1, 1]`; zero selects uniformly.
    #[serde(default)]
    pub assortativity: f64,
}

impl ConnectionSpec {
    /// Validates parameter ranges.
    pub fn validate(&self) -> Result<(), StrataError> {
        for (label, fraction) in [
            ("fraction-source", self.fraction_source),
            ("fraction-target", self.fraction_target),
        ] {
            if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
                return Err(StrataError::Sample(
                    ErrorInfo::new("invalid-fraction", "node fraction outside the unit interval")
                        .with_context("which", label)
                        .with_context("value", fraction.to_string()),
                ));
            }
        }
        if !self.assortativity.is_finite() || self.assortativity.abs() > 1.0 {
            return Err(StrataError::Sample(
                ErrorInfo::new("invalid-assortativity", "assortativity outside [-1, 1]")
                    .with_context("value", self.assortativity.to_string()),
            ));
        }
        Ok(())
    }
}

/// One side of a connection: participating nodes with their degrees.
///
/// Degrees are the node degrees inside the owning cluster's own graph; for a
/// group side these are still the leaf degrees, since a group's member edges
/// are exactly the union of its leaf edges.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSide {
    nodes: Vec<GlobalNodeId>,
    degrees: Vec<u32>,
}

impl SampleSide {
    /// Builds a side from parallel node and degree vectors.
    pub fn new(nodes: Vec<GlobalNodeId>, degrees: Vec<u32>) -> Result<Self, StrataError> {
        if nodes.len() != degrees.len() {
            return Err(StrataError::Sample(
                ErrorInfo::new("side-shape-mismatch", "node and degree vectors differ in length")
                    .with_context("nodes", nodes.len().to_string())
                    .with_context("degrees", degrees.len().to_string()),
            ));
        }
        Ok(Self { nodes, degrees })
    }

    /// Returns the number of nodes on this side.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true when the side has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the participating nodes.
    pub fn nodes(&self) -> &[GlobalNodeId] {
        &self.nodes
    }

    /// Returns the degrees parallel to [`SampleSide::nodes`].
    pub fn degrees(&self) -> &[u32] {
        &self.degrees
    }
}
