//! Trait seam for the external force-directed kernel.

use strata_core::errors::StrataError;
use strata_core::Point2;

use crate::buffers::LayoutBuffers;
use crate::settings::SimConstants;

/// How an accelerator run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceleratorOutcome {
    /// The simulation ran its iteration budget to completion.
    Converged,
    /// The per-frame callback asked the kernel to stop.
    Halted,
}

/// The external force-directed kernel, seen as an opaque accelerator.
///
/// Implementations update `buffers.positions` in place and invoke the
/// callback once per frame with the fresh positions. A `false` return from
/// the callback must stop the simulation promptly; the orchestrator uses it
/// to propagate cancellation.
pub trait ForceAccelerator: Send {
    /// Runs the simulation until convergence or until the callback declines.
    fn run(
        &mut self,
        buffers: &mut LayoutBuffers,
        constants: &SimConstants,
        on_frame: &mut dyn FnMut(&[Point2]) -> bool,
    ) -> Result<AcceleratorOutcome, StrataError>;
}
