//! Layout orchestration: subsampling, frame streaming, post-processing.

use std::collections::{BTreeMap, BTreeSet};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::debug;
use rand::seq::SliceRandom;

use strata_core::errors::{ErrorInfo, StrataError};
use strata_core::{CancellationToken, ClusterId, Point2, RngHandle};

use crate::accelerator::ForceAccelerator;
use crate::buffers::prepare_buffers;
use crate::centroid::centroids;
use crate::overlap::anti_overlap;
use crate::settings::{LayoutSettings, SimConstants};

/// Graph slice handed to the orchestrator.
///
/// Node indices are dense `0..node_count`; `membership` and `levels` drive
/// centroid derivation and the anti-overlap pass. `prior` carries the
/// previous run's position for every node that has one.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutTask {
    /// Number of nodes.
    pub node_count: usize,
    /// Edges as dense index pairs.
    pub edges: Vec<(u32, u32)>,
    /// Member node indices per cluster, leaves and groups alike.
    pub membership: BTreeMap<ClusterId, Vec<u32>>,
    /// Display level per cluster.
    pub levels: BTreeMap<ClusterId, i32>,
    /// Prior position per node, `None` for new nodes.
    pub prior: Vec<Option<Point2>>,
}

/// One frame of an in-flight layout run.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutFrame {
    /// Per-node positions at this frame.
    pub positions: Vec<Point2>,
    /// Cluster centroids derived from the positions.
    pub centroids: BTreeMap<ClusterId, Point2>,
    /// True only for the post-processed final frame.
    pub last: bool,
}

/// Final state of a completed layout run.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOutcome {
    /// Final per-node positions.
    pub positions: Vec<Point2>,
    /// Final centroids after anti-overlap.
    pub centroids: BTreeMap<ClusterId, Point2>,
    /// Anti-overlap iterations that displaced something.
    pub overlap_iterations: usize,
}

/// Handle on a running layout: the frame stream plus the worker.
pub struct LayoutRun {
    /// Stream of frames; closes when the run ends.
    pub frames: Receiver<LayoutFrame>,
    /// Maps laid-out node indices back to the task's node indices.
    ///
    /// Identity unless the run subsampled; frame positions are indexed by
    /// the laid-out node, not the original one.
    pub node_map: Vec<u32>,
    handle: JoinHandle<Result<LayoutOutcome, StrataError>>,
}

impl LayoutRun {
    /// Waits for the worker and returns its outcome.
    ///
    /// A cancelled run surfaces as the `Cancelled` error; its partial
    /// positions are discarded.
    pub fn join(self) -> Result<LayoutOutcome, StrataError> {
        self.handle.join().map_err(|_| {
            StrataError::Layout(ErrorInfo::new(
                "layout-worker-panicked",
                "the layout worker thread panicked",
            ))
        })?
    }
}

/// Subsamples a task to roughly `sampling * edge_count` edges.
///
/// The kept edges are a seeded uniform draw; the node set is induced from
/// them and renumbered densely in ascending original order. Returns the
/// reduced task and the new-to-original node index map.
pub fn subsample_task(
    task: &LayoutTask,
    sampling: f64,
    rng: &mut RngHandle,
) -> (LayoutTask, Vec<u32>) {
    let target = (sampling * task.edges.len() as f64).round() as usize;
    let mut pool = task.edges.clone();
    pool.shuffle(rng);
    pool.truncate(target);

    let mut induced: BTreeSet<u32> = BTreeSet::new();
    for &(source, target) in &pool {
        induced.insert(source);
        induced.insert(target);
    }
    let node_map: Vec<u32> = induced.into_iter().collect();
    let dense: BTreeMap<u32, u32> = node_map
        .iter()
        .enumerate()
        .map(|(index, &original)| (original, index as u32))
        .collect();

    let edges = pool
        .iter()
        .map(|&(source, target)| (dense[&source], dense[&target]))
        .collect();
    let membership = task
        .membership
        .iter()
        .map(|(cluster, members)| {
            let kept: Vec<u32> = members
                .iter()
                .filter_map(|member| dense.get(member).copied())
                .collect();
            (*cluster, kept)
        })
        .collect();
    let prior = node_map
        .iter()
        .map(|&original| task.prior.get(original as usize).copied().flatten())
        .collect();

    (
        LayoutTask {
            node_count: node_map.len(),
            edges,
            membership,
            levels: task.levels.clone(),
            prior,
        },
        node_map,
    )
}

/// Starts a layout run on a worker thread.
///
/// Frames stream on the returned channel while the accelerator runs; the
/// token is observed in the per-frame callback and throughout the
/// anti-overlap pass, so cancellation stops the stream without a final
/// frame. The final frame, when produced, carries the overlap-adjusted
/// centroids and `last = true`.
pub fn orchestrate(
    task: &LayoutTask,
    settings: &LayoutSettings,
    mut accelerator: Box<dyn ForceAccelerator>,
    seed: u64,
    token: CancellationToken,
) -> Result<LayoutRun, StrataError> {
    let mut rng = RngHandle::from_seed(seed);
    let (task, node_map) = if settings.sampling < 1.0 {
        let (reduced, node_map) = subsample_task(task, settings.sampling, &mut rng);
        debug!(
            "layout subsampled to {} of {} nodes",
            reduced.node_count,
            task.node_count
        );
        (reduced, node_map)
    } else {
        (
            task.clone(),
            (0..task.node_count as u32).collect::<Vec<u32>>(),
        )
    };

    let mut buffers = prepare_buffers(task.node_count, &task.edges, &task.prior, &mut rng)?;
    let constants = SimConstants::from_settings(settings);
    let settings = settings.clone();
    let (frames_tx, frames_rx) = unbounded::<LayoutFrame>();

    let handle = thread::spawn(move || {
        run_worker(
            &mut *accelerator,
            &mut buffers,
            &constants,
            &task,
            &settings,
            &token,
            &frames_tx,
        )
    });

    Ok(LayoutRun {
        frames: frames_rx,
        node_map,
        handle,
    })
}

fn run_worker(
    accelerator: &mut dyn ForceAccelerator,
    buffers: &mut crate::buffers::LayoutBuffers,
    constants: &SimConstants,
    task: &LayoutTask,
    settings: &LayoutSettings,
    token: &CancellationToken,
    frames: &Sender<LayoutFrame>,
) -> Result<LayoutOutcome, StrataError> {
    let mut on_frame = |positions: &[Point2]| -> bool {
        if token.is_cancelled() {
            return false;
        }
        let frame = LayoutFrame {
            positions: positions.to_vec(),
            centroids: centroids(positions, &task.membership),
            last: false,
        };
        frames.send(frame).is_ok()
    };
    accelerator.run(buffers, constants, &mut on_frame)?;

    // The post-process must not run or publish after cancellation.
    token.checkpoint("post-layout")?;
    let mut final_centroids = centroids(&buffers.positions, &task.membership);
    let overlap_iterations = anti_overlap(
        &mut final_centroids,
        &task.levels,
        settings.min_centroid_distance,
        token,
    )?;

    let _ = frames.send(LayoutFrame {
        positions: buffers.positions.clone(),
        centroids: final_centroids.clone(),
        last: true,
    });
    Ok(LayoutOutcome {
        positions: buffers.positions.clone(),
        centroids: final_centroids,
        overlap_iterations,
    })
}
