#![deny(missing_docs)]
#![doc = "Orchestration around the external force-directed accelerator."]

mod accelerator;
mod buffers;
mod centroid;
mod orchestrator;
mod overlap;
mod settings;

pub use accelerator::{AcceleratorOutcome, ForceAccelerator};
pub use buffers::{prepare_buffers, LayoutBuffers};
pub use centroid::centroids;
pub use orchestrator::{
    orchestrate, subsample_task, LayoutFrame, LayoutOutcome, LayoutRun, LayoutTask,
};
pub use overlap::{anti_overlap, levels_repel, MAX_OVERLAP_ITERATIONS};
pub use settings::{transformed_gravity, LayoutSettings, SimConstants, REPULSION_RADIUS};
