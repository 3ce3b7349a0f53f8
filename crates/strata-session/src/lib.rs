#![deny(missing_docs)]
#![doc = "The serialized mutation path tying builds, measures and layout together."]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use log::debug;

use strata_build::{
    build, BuildOptions, BuildReport, DefinitionHistory, GraphDefinition, GraphInstance,
};
use strata_core::errors::{ErrorInfo, StrataError};
use strata_core::rng::layout_seed;
use strata_core::{CancellationToken, ClusterId, GlobalNodeId, Point2};
use strata_layout::{orchestrate, ForceAccelerator, LayoutOutcome, LayoutSettings, LayoutTask};
use strata_measures::{MeasurePlan, MeasureRunner, MeasureService, MeasureStore};

/// Published centroid map snapshot.
pub type CentroidMap = BTreeMap<ClusterId, Point2>;

/// Centroid snapshot stamped with the layout run that owns it.
///
/// Stamps are compared under the lock before a frame is published, so a
/// frame of a superseded run that already passed its cancellation check is
/// dropped instead of overwriting the reset snapshot.
#[derive(Default)]
struct CentroidCell {
    stamp: u64,
    map: Arc<CentroidMap>,
}

/// Owns a definition, its history and the published derived state.
///
/// All mutation runs through `&mut self`, so a session serializes edits by
/// construction; callers that edit from several threads must share the
/// session behind their own lock. Published snapshots (instance, centroids,
/// measures) are handed out as `Arc` clones: consumers read a consistent
/// copy and never observe a rebuild mid-flight.
///
/// Every rebuild cancels in-flight layout and measure work before starting
/// replacements under fresh tokens; results of superseded runs are dropped
/// at their next cooperative checkpoint and never published.
pub struct Session {
    definition: GraphDefinition,
    history: DefinitionHistory,
    instance: Arc<Mutex<Option<Arc<GraphInstance>>>>,
    centroids: Arc<Mutex<CentroidCell>>,
    measures: Arc<Mutex<Arc<MeasureStore>>>,
    positions: Arc<Mutex<BTreeMap<GlobalNodeId, Point2>>>,
    runner: Option<MeasureRunner>,
    measure_pump: Option<JoinHandle<()>>,
    layout_token: CancellationToken,
    measure_token: CancellationToken,
    build_counter: u64,
    layout_counter: u64,
}

/// Handle on a layout run started through a session.
pub struct LayoutHandle {
    pump: JoinHandle<Result<LayoutOutcome, StrataError>>,
}

impl LayoutHandle {
    /// Waits for the run; a cancelled run surfaces the `Cancelled` error.
    pub fn wait(self) -> Result<LayoutOutcome, StrataError> {
        self.pump.join().map_err(|_| {
            StrataError::Layout(ErrorInfo::new(
                "layout-pump-panicked",
                "the layout pump thread panicked",
            ))
        })?
    }
}

impl Session {
    /// Opens a session, building the definition fully and publishing it.
    pub fn new(
        definition: GraphDefinition,
        service: Box<dyn MeasureService>,
    ) -> Result<(Self, BuildReport), StrataError> {
        let history = DefinitionHistory::new(&definition)?;
        let (runner, updates) = MeasureRunner::spawn(service);
        let measures: Arc<Mutex<Arc<MeasureStore>>> = Arc::new(Mutex::new(Arc::default()));

        // The pump folds worker updates into the published store; the store
        // itself rejects updates from superseded builds.
        let pump_cell = Arc::clone(&measures);
        let measure_pump = thread::spawn(move || {
            while let Ok(update) = updates.recv() {
                if let Ok(mut cell) = pump_cell.lock() {
                    let mut store = MeasureStore::clone(&cell);
                    if store.apply(update) {
                        *cell = Arc::new(store);
                    }
                }
            }
        });

        let mut session = Self {
            definition,
            history,
            instance: Arc::new(Mutex::new(None)),
            centroids: Arc::new(Mutex::new(CentroidCell::default())),
            measures,
            positions: Arc::new(Mutex::new(BTreeMap::new())),
            runner: Some(runner),
            measure_pump: Some(measure_pump),
            layout_token: CancellationToken::new(),
            measure_token: CancellationToken::new(),
            build_counter: 0,
            layout_counter: 0,
        };
        let report = session.rebuild(true)?;
        Ok((session, report))
    }

    /// Returns the current definition.
    pub fn definition(&self) -> &GraphDefinition {
        &self.definition
    }

    /// Returns the most recently published instance.
    pub fn instance(&self) -> Option<Arc<GraphInstance>> {
        self.instance.lock().ok()?.clone()
    }

    /// Returns the published centroid snapshot.
    pub fn centroids(&self) -> Arc<CentroidMap> {
        self.centroids
            .lock()
            .map(|cell| Arc::clone(&cell.map))
            .unwrap_or_default()
    }

    /// Returns the published measure snapshot.
    pub fn measures(&self) -> Arc<MeasureStore> {
        self.measures
            .lock()
            .map(|cell| Arc::clone(&cell))
            .unwrap_or_default()
    }

    /// Identifier of the most recent build.
    pub fn build_id(&self) -> u64 {
        self.build_counter
    }

    /// Applies an edit, commits it to history and rebuilds incrementally.
    ///
    /// A failing edit leaves the definition, history and published state
    /// untouched.
    pub fn edit(
        &mut self,
        apply: impl FnOnce(&mut GraphDefinition) -> Result<(), StrataError>,
    ) -> Result<BuildReport, StrataError> {
        let mut edited = self.definition.clone();
        apply(&mut edited)?;
        edited.validate()?;
        self.definition = edited;
        self.history.commit(&self.definition)?;
        self.rebuild(false)
    }

    /// Steps back one history snapshot and rebuilds fully.
    pub fn undo(&mut self) -> Result<Option<BuildReport>, StrataError> {
        match self.history.undo()? {
            Some(definition) => {
                self.definition = definition;
                Ok(Some(self.rebuild(true)?))
            }
            None => Ok(None),
        }
    }

    /// Steps forward one history snapshot and rebuilds fully.
    pub fn redo(&mut self) -> Result<Option<BuildReport>, StrataError> {
        match self.history.redo()? {
            Some(definition) => {
                self.definition = definition;
                Ok(Some(self.rebuild(true)?))
            }
            None => Ok(None),
        }
    }

    /// Starts a layout run over the published instance.
    ///
    /// Any previous layout run is cancelled first. The session consumes the
    /// frame stream itself: each frame refreshes the published centroid
    /// snapshot for as long as the run still holds the cell's stamp, and the
    /// final frame's positions are cached under their stable node addresses
    /// so the next run resumes from them.
    pub fn start_layout(
        &mut self,
        settings: &LayoutSettings,
        accelerator: Box<dyn ForceAccelerator>,
    ) -> Result<LayoutHandle, StrataError> {
        let instance = self.instance().ok_or_else(|| {
            StrataError::Layout(ErrorInfo::new(
                "no-instance",
                "no instance has been published yet",
            ))
        })?;

        self.layout_token.cancel();
        self.layout_token = CancellationToken::new();
        let token = self.layout_token.clone();
        self.layout_counter += 1;

        // Claim the centroid cell for this run; earlier runs lose the stamp
        // race and can no longer publish.
        let stamp = {
            let mut cell = self.centroids.lock().map_err(poisoned)?;
            cell.stamp += 1;
            cell.stamp
        };

        let task = layout_task(&instance, &*self.positions.lock().map_err(poisoned)?);
        let seed = layout_seed(instance.seed, self.layout_counter);
        let run = orchestrate(&task, settings, accelerator, seed, token.clone())?;

        let centroid_cell = Arc::clone(&self.centroids);
        let position_cache = Arc::clone(&self.positions);
        let pump = thread::spawn(move || {
            for frame in run.frames.iter() {
                if token.is_cancelled() {
                    break;
                }
                if let Ok(mut cell) = centroid_cell.lock() {
                    if cell.stamp == stamp {
                        cell.map = Arc::new(frame.centroids);
                    }
                }
            }
            let node_map = run.node_map.clone();
            let outcome = run.join()?;
            token.checkpoint("layout-publish")?;
            if let Ok(mut cache) = position_cache.lock() {
                for (index, &flat) in node_map.iter().enumerate() {
                    if let Some(node) = instance.flattened.nodes().get(flat as usize) {
                        cache.insert(node.origin, outcome.positions[index]);
                    }
                }
            }
            Ok(outcome)
        });
        Ok(LayoutHandle { pump })
    }

    fn rebuild(&mut self, force_full: bool) -> Result<BuildReport, StrataError> {
        // Cancel everything computed against the previous instance.
        self.layout_token.cancel();
        self.measure_token.cancel();
        self.layout_token = CancellationToken::new();
        self.measure_token = CancellationToken::new();

        let previous = self.instance();
        let (instance, report) = build(
            &self.definition,
            previous.as_deref(),
            BuildOptions { force_full },
        )?;
        let instance = Arc::new(instance);
        self.build_counter += 1;
        debug!("publishing build {}", self.build_counter);

        *self.instance.lock().map_err(poisoned)? = Some(Arc::clone(&instance));
        {
            let mut cell = self.centroids.lock().map_err(poisoned)?;
            cell.stamp += 1;
            cell.map = Arc::default();
        }
        *self.measures.lock().map_err(poisoned)? =
            Arc::new(MeasureStore::for_build(self.build_counter));

        // Drop cached positions for nodes that no longer exist.
        {
            let mut cache = self.positions.lock().map_err(poisoned)?;
            let live = instance.flat_index();
            cache.retain(|origin, _| live.contains_key(origin));
        }

        let plan = MeasurePlan::standard(
            self.build_counter,
            instance.node_count(),
            instance.flattened.edge_pairs(),
        );
        if let Some(runner) = &self.runner {
            runner.submit(plan, self.measure_token.clone())?;
        }
        Ok(report)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.layout_token.cancel();
        self.measure_token.cancel();
        // Dropping the runner closes the update stream the pump reads.
        drop(self.runner.take());
        if let Some(pump) = self.measure_pump.take() {
            let _ = pump.join();
        }
    }
}

/// Builds the layout task for an instance.
///
/// Leaf membership groups flat nodes by their origin cluster; every group
/// additionally receives the flat nodes of its descendant leaves, walking
/// each leaf's ancestor chain. Levels come from the instance metadata.
fn layout_task(
    instance: &GraphInstance,
    position_cache: &BTreeMap<GlobalNodeId, Point2>,
) -> LayoutTask {
    let mut membership: BTreeMap<ClusterId, Vec<u32>> = BTreeMap::new();
    for (index, node) in instance.flattened.nodes().iter().enumerate() {
        let flat = index as u32;
        membership
            .entry(node.origin.cluster)
            .or_default()
            .push(flat);
        if let Some(chain) = instance.chains.get(&node.origin.cluster) {
            for ancestor in chain.iter().skip(1) {
                membership.entry(*ancestor).or_default().push(flat);
            }
        }
    }
    let levels = instance
        .meta
        .iter()
        .map(|(cluster, meta)| (*cluster, meta.level))
        .collect();
    let prior = instance
        .flattened
        .nodes()
        .iter()
        .map(|node| position_cache.get(&node.origin).copied())
        .collect();
    LayoutTask {
        node_count: instance.node_count(),
        edges: instance.flattened.edge_pairs(),
        membership,
        levels,
        prior,
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> StrataError {
    StrataError::Build(ErrorInfo::new(
        "poisoned-lock",
        "a publication cell was poisoned by a panicking thread",
    ))
}
