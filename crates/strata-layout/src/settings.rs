//! User-facing layout settings and the constants handed to the accelerator.

use serde::{Deserialize, Serialize};

/// Repulsion radius the accelerator applies around every node.
///
/// The kernel treats this as a fixed constant of its force scheme; it is not
/// user tunable.
pub const REPULSION_RADIUS: f32 = 0.2;

/// Settings for one layout run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSettings {
    /// Fraction of edges laid out; below one the graph is subsampled first.
    #[serde(default = "default_sampling")]
    pub sampling: f64,
    /// Accelerator iteration budget.
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Raw gravity strength as exposed to the user.
    #[serde(default = "default_gravity")]
    pub gravity: f64,
    /// Minimum distance enforced between co-displayed cluster centroids.
    #[serde(default = "default_min_centroid_distance")]
    pub min_centroid_distance: f32,
}

fn default_sampling() -> f64 {
    1.0
}

fn default_iterations() -> usize {
    300
}

fn default_gravity() -> f64 {
    50.0
}

fn default_min_centroid_distance() -> f32 {
    0.1
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            sampling: default_sampling(),
            iterations: default_iterations(),
            gravity: default_gravity(),
            min_centroid_distance: default_min_centroid_distance(),
        }
    }
}

/// Maps the raw gravity setting onto the accelerator's scale.
///
/// The kernel expects a gently compressed value; the raw setting is also
/// passed through untouched for kernels that want it.
pub fn transformed_gravity(gravity: f64) -> f64 {
    0.05 + (1.0 + gravity / 100.0).ln()
}

/// Scalar simulation parameters handed to the accelerator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConstants {
    /// Fixed repulsion radius.
    pub repulsion_radius: f32,
    /// Gravity after the accelerator-scale transform.
    pub gravity_transformed: f64,
    /// Iteration budget.
    pub iterations: usize,
    /// Raw gravity setting.
    pub gravity: f64,
}

impl SimConstants {
    /// Derives the constants for a run from its settings.
    pub fn from_settings(settings: &LayoutSettings) -> Self {
        Self {
            repulsion_radius: REPULSION_RADIUS,
            gravity_transformed: transformed_gravity(settings.gravity),
            iterations: settings.iterations,
            gravity: settings.gravity,
        }
    }
}
