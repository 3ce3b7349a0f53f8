//! Worker thread executing measure plans under cooperative cancellation.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, warn};

use strata_core::errors::{ErrorInfo, StrataError};
use strata_core::CancellationToken;

use crate::protocol::{MeasurePlan, MeasureRequest, MeasureService, MeasureUpdate, MeasureValue};

struct Job {
    plan: MeasurePlan,
    token: CancellationToken,
}

/// Owns a [`MeasureService`] on a worker thread and runs plans against it.
///
/// Plans are executed one at a time in submission order, so the service's
/// active graph never changes while a request is outstanding. The token is
/// re-checked before every request is issued and again before its result is
/// published; a cancelled plan therefore publishes nothing past the
/// cancellation point and its partial results are discarded.
pub struct MeasureRunner {
    jobs: Option<Sender<Job>>,
    handle: Option<JoinHandle<()>>,
}

impl MeasureRunner {
    /// Spawns the worker and returns the runner with its update stream.
    pub fn spawn(mut service: Box<dyn MeasureService>) -> (Self, Receiver<MeasureUpdate>) {
        let (jobs_tx, jobs_rx) = unbounded::<Job>();
        let (updates_tx, updates_rx) = unbounded::<MeasureUpdate>();
        let handle = thread::spawn(move || {
            while let Ok(job) = jobs_rx.recv() {
                match run_plan(service.as_mut(), &job.plan, &job.token, &updates_tx) {
                    Ok(()) => {}
                    Err(err) if err.is_cancelled() => {
                        debug!("measure plan for build {} cancelled", job.plan.build_id);
                    }
                    Err(err) => {
                        warn!("measure plan for build {} failed: {err}", job.plan.build_id);
                    }
                }
            }
        });
        (
            Self {
                jobs: Some(jobs_tx),
                handle: Some(handle),
            },
            updates_rx,
        )
    }

    /// Queues a plan for execution under the given token.
    pub fn submit(&self, plan: MeasurePlan, token: CancellationToken) -> Result<(), StrataError> {
        let jobs = self.jobs.as_ref().ok_or_else(worker_gone)?;
        jobs.send(Job { plan, token }).map_err(|_| worker_gone())
    }
}

impl Drop for MeasureRunner {
    fn drop(&mut self) {
        // Closing the job channel lets the worker drain and exit.
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run_plan(
    service: &mut dyn MeasureService,
    plan: &MeasurePlan,
    token: &CancellationToken,
    updates: &Sender<MeasureUpdate>,
) -> Result<(), StrataError> {
    token.checkpoint("measure-set-graph")?;
    service.set_graph(&plan.edges, plan.node_count)?;
    for request in &plan.requests {
        token.checkpoint("measure-request")?;
        let value = execute(service, request)?;
        token.checkpoint("measure-publish")?;
        let update = MeasureUpdate {
            build_id: plan.build_id,
            key: request.key(),
            value,
        };
        if updates.send(update).is_err() {
            // Nobody is listening anymore; stop quietly.
            return Ok(());
        }
    }
    Ok(())
}

fn execute(
    service: &mut dyn MeasureService,
    request: &MeasureRequest,
) -> Result<MeasureValue, StrataError> {
    match request {
        MeasureRequest::Distribution { name, bins } => {
            Ok(MeasureValue::Series(service.distribution(name, *bins)?))
        }
        MeasureRequest::Assortativity => Ok(MeasureValue::Scalar(service.assortativity()?)),
        MeasureRequest::Diameter => Ok(MeasureValue::MaybeScalar(service.diameter()?)),
        MeasureRequest::ClusteringByDegree => {
            Ok(MeasureValue::Series(service.clustering_by_degree()?))
        }
    }
}

fn worker_gone() -> StrataError {
    StrataError::Measure(ErrorInfo::new(
        "runner-stopped",
        "the measure worker thread is no longer running",
    ))
}
