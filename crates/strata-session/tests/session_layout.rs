use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};
use strata_build::{GeneratorKind, GraphDefinition, LeafParams};
use strata_core::errors::StrataError;
use strata_core::series::{Series, SeriesPoint};
use strata_core::Point2;
use strata_layout::{
    AcceleratorOutcome, ForceAccelerator, LayoutBuffers, LayoutSettings, SimConstants,
};
use strata_measures::MeasureService;
use strata_session::Session;

fn leaf_params(node_count: usize) -> LeafParams {
    LeafParams {
        node_count,
        degree_distribution: Series::from_points(vec![
            SeriesPoint::new(1.0, 1.0),
            SeriesPoint::new(4.0, 1.0),
        ])
        .unwrap(),
        giant_component_only: false,
        self_loops: false,
    }
}

fn grouped_definition() -> GraphDefinition {
    let mut definition = GraphDefinition::new(7);
    let group = definition
        .add_cluster(None, GeneratorKind::MetaGroup)
        .unwrap();
    definition
        .add_cluster(Some(group), GeneratorKind::ChungLu(leaf_params(10)))
        .unwrap();
    definition
        .add_cluster(Some(group), GeneratorKind::ChungLu(leaf_params(10)))
        .unwrap();
    definition
}

struct StubService;

impl MeasureService for StubService {
    fn set_graph(&mut self, _edges: &[(u32, u32)], _node_count: usize) -> Result<(), StrataError> {
        Ok(())
    }

    fn distribution(&mut self, _name: &str, _bins: usize) -> Result<Series, StrataError> {
        Ok(Series::from_points(vec![SeriesPoint::new(0.0, 1.0)]).unwrap())
    }

    fn assortativity(&mut self) -> Result<f64, StrataError> {
        Ok(0.0)
    }

    fn diameter(&mut self) -> Result<Option<f64>, StrataError> {
        Ok(None)
    }

    fn clustering_by_degree(&mut self) -> Result<Series, StrataError> {
        Ok(Series::from_points(vec![SeriesPoint::new(0.0, 1.0)]).unwrap())
    }
}

/// Scripted kernel: drifts every node right by 0.1 per frame.
struct DriftAccelerator {
    frames: usize,
}

impl ForceAccelerator for DriftAccelerator {
    fn run(
        &mut self,
        buffers: &mut LayoutBuffers,
        _constants: &SimConstants,
        on_frame: &mut dyn FnMut(&[Point2]) -> bool,
    ) -> Result<AcceleratorOutcome, StrataError> {
        for _ in 0..self.frames {
            for position in buffers.positions.iter_mut() {
                position.x += 0.1;
            }
            if !on_frame(&buffers.positions) {
                return Ok(AcceleratorOutcome::Halted);
            }
        }
        Ok(AcceleratorOutcome::Converged)
    }
}

/// Kernel that waits for the test between frames.
struct GatedAccelerator {
    started: Sender<()>,
    release: Receiver<()>,
}

impl ForceAccelerator for GatedAccelerator {
    fn run(
        &mut self,
        buffers: &mut LayoutBuffers,
        _constants: &SimConstants,
        on_frame: &mut dyn FnMut(&[Point2]) -> bool,
    ) -> Result<AcceleratorOutcome, StrataError> {
        loop {
            self.started.send(()).expect("test listens for frames");
            if self.release.recv().is_err() {
                return Ok(AcceleratorOutcome::Halted);
            }
            for position in buffers.positions.iter_mut() {
                position.x += 0.1;
            }
            if !on_frame(&buffers.positions) {
                return Ok(AcceleratorOutcome::Halted);
            }
        }
    }
}

#[test]
fn a_completed_layout_publishes_centroids_for_leaves_and_groups() {
    let (mut session, _) =
        Session::new(grouped_definition(), Box::new(StubService)).unwrap();
    let instance = session.instance().expect("initial build published");

    let handle = session
        .start_layout(
            &LayoutSettings::default(),
            Box::new(DriftAccelerator { frames: 3 }),
        )
        .unwrap();
    let outcome = handle.wait().unwrap();

    assert_eq!(outcome.positions.len(), instance.node_count());
    // One centroid per cluster: the group plus both leaves.
    assert_eq!(outcome.centroids.len(), 3);
    let published = session.centroids();
    assert_eq!(published.as_ref(), &outcome.centroids);
}

#[test]
fn a_second_layout_resumes_from_cached_positions() {
    let (mut session, _) =
        Session::new(grouped_definition(), Box::new(StubService)).unwrap();

    let first = session
        .start_layout(
            &LayoutSettings::default(),
            Box::new(DriftAccelerator { frames: 3 }),
        )
        .unwrap()
        .wait()
        .unwrap();

    // A zero-frame kernel leaves its starting positions untouched, so the
    // second run's outcome equals the first run's cached result.
    let second = session
        .start_layout(
            &LayoutSettings::default(),
            Box::new(DriftAccelerator { frames: 0 }),
        )
        .unwrap()
        .wait()
        .unwrap();

    assert_eq!(first.positions, second.positions);
}

#[test]
fn an_edit_cancels_the_running_layout_and_clears_centroids() {
    let (started_tx, started_rx) = unbounded();
    let (release_tx, release_rx) = unbounded();

    let (mut session, _) =
        Session::new(grouped_definition(), Box::new(StubService)).unwrap();
    let handle = session
        .start_layout(
            &LayoutSettings::default(),
            Box::new(GatedAccelerator {
                started: started_tx,
                release: release_rx,
            }),
        )
        .unwrap();

    started_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("kernel reaches its first frame");

    // The rebuild supersedes the run before its next frame is accepted.
    session.edit(|definition| {
        definition.set_seed(8);
        Ok(())
    })
    .unwrap();
    release_tx.send(()).expect("kernel is waiting");

    let err = handle.wait().expect_err("superseded run must not finish");
    assert!(err.is_cancelled());
    assert!(session.centroids().is_empty());
}

#[test]
fn frames_of_a_superseded_run_never_resurrect_centroids() {
    let (started_tx, started_rx) = unbounded();
    let (release_tx, release_rx) = unbounded();

    let (mut session, _) =
        Session::new(grouped_definition(), Box::new(StubService)).unwrap();
    let handle = session
        .start_layout(
            &LayoutSettings::default(),
            Box::new(GatedAccelerator {
                started: started_tx,
                release: release_rx,
            }),
        )
        .unwrap();

    // Let the run publish one centroid frame before superseding it.
    started_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("kernel reaches its first frame");
    release_tx.send(()).expect("kernel is waiting");
    started_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("kernel produced a frame");
    let deadline = Instant::now() + Duration::from_secs(5);
    while session.centroids().is_empty() {
        assert!(Instant::now() < deadline, "first frame never published");
        thread::sleep(Duration::from_millis(10));
    }

    // The rebuild resets the snapshot and reclaims the cell's stamp.
    session.edit(|definition| {
        definition.set_seed(8);
        Ok(())
    })
    .unwrap();
    assert!(session.centroids().is_empty());

    // Keep the stale run producing frames until it notices the
    // cancellation; none of them may land in the reset snapshot.
    release_tx.send(()).expect("kernel is waiting");
    drop(release_tx);

    let err = handle.wait().expect_err("superseded run must not finish");
    assert!(err.is_cancelled());
    assert!(session.centroids().is_empty());
}
