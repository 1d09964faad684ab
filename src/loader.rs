//! The scene loader: request staging, batch ordering, and the tick driver.
//!
//! [`SceneLoader`] is the façade the rest of a game talks to. It converts
//! [`LoadRequest`]/[`UnloadRequest`] values into operations on a
//! [`SceneHost`], keeps the ordering guarantees (transition scene first,
//! post-load unloads strictly after the batch activates), and aggregates
//! progress across everything in flight.
//!
//! The loader owns no thread and no timer. The host application calls
//! [`SceneLoader::tick`] once per frame; everything else is a consequence of
//! those ticks.
//!
//! # Example
//!
//! ```
//! use skene::{LoadRequest, SceneCatalog, SceneLoader, SimHost};
//!
//! let catalog = SceneCatalog::from_paths(["scenes/loading.scene", "scenes/level_1.scene"]);
//! let mut host = SimHost::new(catalog).with_step(0.5);
//! let mut loader = SceneLoader::new();
//!
//! loader.on_completed(|| println!("level ready"));
//! loader.start_load(
//!     &mut host,
//!     LoadRequest::new()
//!         .scene("scenes/level_1.scene")
//!         .with_transition("scenes/loading.scene"),
//! );
//!
//! while !loader.is_idle() {
//!     host.step(); // the engine makes progress...
//!     loader.tick(&mut host); // ...and the loader reacts to it
//! }
//! assert!(host.is_loaded("scenes/level_1.scene"));
//! ```

use itertools::Itertools;
use log::{debug, warn};

use crate::host::{LoadMode, OperationId, SceneHost};
use crate::reference::{SceneCatalog, SceneRef};
use crate::request::{LoadRequest, UnloadRequest};
use crate::tracker::ProgressTracker;

/// Errors surfaced by the synchronous load entry points.
///
/// The asynchronous paths never return errors: a request with nothing to do
/// completes immediately instead, so completion chains cannot stall.
#[derive(Debug)]
pub enum LoadError {
    /// A synchronous load was requested with no resolvable target scene.
    /// This indicates a misconfigured request or descriptor.
    NoSceneConfigured,
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::NoSceneConfigured => {
                write!(f, "synchronous load requested with no target scene configured")
            }
        }
    }
}

impl std::error::Error for LoadError {}

struct TransitionState {
    op: OperationId,
    path: String,
    auto_unload: bool,
    finished: bool,
}

struct LoadBatch {
    mode: LoadMode,
    allow_activation: bool,
    /// Main scenes waiting on the transition scene.
    pending: Vec<String>,
    transition: Option<TransitionState>,
    /// The main batch's operations; composite progress covers exactly these.
    ops: Vec<OperationId>,
    active_scene: Option<String>,
    then_unload: Vec<String>,
    /// Post-activation unloads. Ordering-only; they emit no events.
    drain: Vec<OperationId>,
    settled: bool,
}

struct UnloadBatch {
    ops: Vec<OperationId>,
    reclaim: bool,
    finished: bool,
}

/// Stages scene requests into host operations and drives them to completion.
///
/// See the [module docs](self) for the overall flow. One loader serves the
/// whole application; each request builds and discards its own configuration,
/// so there is no builder state shared between callers.
pub struct SceneLoader {
    tracker: ProgressTracker,
    load_batches: Vec<LoadBatch>,
    unload_batches: Vec<UnloadBatch>,
    activation_allowed: bool,
}

impl Default for SceneLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneLoader {
    /// Create a loader with nothing in flight.
    pub fn new() -> Self {
        Self {
            tracker: ProgressTracker::new(),
            load_batches: Vec::new(),
            unload_batches: Vec::new(),
            activation_allowed: true,
        }
    }

    // ========================================================================
    // Listeners
    // ========================================================================

    /// Register a listener for composite progress. Called once per tick while
    /// work is in flight, with the arithmetic mean of every tracked
    /// operation's progress.
    pub fn on_progress(&mut self, listener: impl FnMut(f32) + 'static) {
        self.tracker.on_progress(listener);
    }

    /// Register a listener for batch completion. Fired exactly once when
    /// every tracked operation has reached its terminal state.
    pub fn on_completed(&mut self, listener: impl FnMut() + 'static) {
        self.tracker.on_completed(listener);
    }

    // ========================================================================
    // Synchronous loads
    // ========================================================================

    /// Load the request's first scene synchronously, unloading every other
    /// scene on activation.
    ///
    /// An empty (or invalid-only) scene list is a configuration error, not a
    /// no-op: synchronous loads exist to jump somewhere specific, and having
    /// nowhere to jump means the request is broken.
    pub fn load<H: SceneHost>(&mut self, host: &mut H, request: LoadRequest) -> Result<(), LoadError> {
        self.load_sync(host, request, LoadMode::Single)
    }

    /// Load the request's first scene synchronously, keeping existing scenes.
    pub fn load_additive<H: SceneHost>(
        &mut self,
        host: &mut H,
        request: LoadRequest,
    ) -> Result<(), LoadError> {
        self.load_sync(host, request, LoadMode::Additive)
    }

    fn load_sync<H: SceneHost>(
        &mut self,
        host: &mut H,
        request: LoadRequest,
        mode: LoadMode,
    ) -> Result<(), LoadError> {
        let scenes = resolve_scenes(&request.scenes, host.catalog());
        let Some(path) = scenes.first() else {
            return Err(LoadError::NoSceneConfigured);
        };
        if scenes.len() > 1 {
            debug!("synchronous load takes one scene; ignoring {} extra", scenes.len() - 1);
        }
        host.load(path, mode);
        Ok(())
    }

    // ========================================================================
    // Asynchronous loads
    // ========================================================================

    /// Start loading the request's scenes, unloading every other scene once
    /// the batch activates. Returns immediately; progress arrives through the
    /// listeners as [`tick`](Self::tick) runs.
    ///
    /// A request whose scene list resolves to nothing completes immediately:
    /// listeners see full progress and then completion before this call
    /// returns.
    pub fn start_load<H: SceneHost>(&mut self, host: &mut H, request: LoadRequest) {
        self.start_load_mode(host, request, LoadMode::Single);
    }

    /// Start loading the request's scenes while keeping existing scenes
    /// loaded. Same no-op policy as [`start_load`](Self::start_load).
    pub fn start_load_additive<H: SceneHost>(&mut self, host: &mut H, request: LoadRequest) {
        self.start_load_mode(host, request, LoadMode::Additive);
    }

    fn start_load_mode<H: SceneHost>(&mut self, host: &mut H, request: LoadRequest, mode: LoadMode) {
        let scenes = resolve_scenes(&request.scenes, host.catalog());
        if scenes.is_empty() {
            debug!("load request resolved to no scenes; completing immediately");
            self.tracker.complete_empty();
            return;
        }

        self.activation_allowed = request.allow_activation;

        let active_scene = request.active_scene.and_then(|scene| {
            let resolved = scene.resolve(host.catalog()).map(str::to_owned);
            if resolved.is_none() {
                warn!("active-scene reference {} is invalid, ignoring", scene);
            }
            resolved
        });
        let transition = request.transition.and_then(|scene| {
            let resolved = scene.resolve(host.catalog()).map(str::to_owned);
            if resolved.is_none() {
                warn!("transition-scene reference {} is invalid, ignoring", scene);
            }
            resolved
        });

        let mut batch = LoadBatch {
            mode,
            allow_activation: request.allow_activation,
            pending: Vec::new(),
            transition: None,
            ops: Vec::new(),
            active_scene,
            then_unload: resolve_scenes(&request.then_unload, host.catalog()),
            drain: Vec::new(),
            settled: false,
        };

        match transition {
            Some(path) => {
                // The transition scene loads and activates before the main
                // batch starts; its load is never gated.
                let op = host.begin_load(&path, LoadMode::Additive, true);
                batch.transition = Some(TransitionState {
                    op,
                    path,
                    auto_unload: request.auto_unload_transition,
                    finished: false,
                });
                batch.pending = scenes;
            }
            None => {
                for (i, path) in scenes.iter().enumerate() {
                    let op = host.begin_load(path, op_mode(mode, i), request.allow_activation);
                    self.tracker.track(op);
                    batch.ops.push(op);
                }
            }
        }

        self.load_batches.push(batch);
    }

    // ========================================================================
    // Asynchronous unloads
    // ========================================================================

    /// Start unloading the request's scenes. Unloads are independent of one
    /// another and may complete in any relative order.
    ///
    /// Empty requests complete immediately, like the load paths. When the
    /// request asked for it, a resource-reclamation pass runs on the host
    /// once every unload in the batch has finished.
    pub fn start_unload<H: SceneHost>(&mut self, host: &mut H, request: UnloadRequest) {
        let scenes = resolve_scenes(&request.scenes, host.catalog());
        if scenes.is_empty() {
            debug!("unload request resolved to no scenes; completing immediately");
            self.tracker.complete_empty();
            return;
        }

        let mut ops = Vec::with_capacity(scenes.len());
        for path in &scenes {
            let op = host.begin_unload(path);
            self.tracker.track(op);
            ops.push(op);
        }
        self.unload_batches.push(UnloadBatch {
            ops,
            reclaim: request.unload_unused_assets,
            finished: false,
        });
    }

    // ========================================================================
    // Activation gate
    // ========================================================================

    /// Permit activation on every gated operation.
    ///
    /// Loads started with `allow_activation(false)` hold at 0.9 progress
    /// until this is called; batches queued behind a transition scene pick
    /// the open gate up when they start.
    pub fn activate_scenes<H: SceneHost>(&mut self, host: &mut H) {
        self.activation_allowed = true;
        for batch in &mut self.load_batches {
            if batch.allow_activation {
                continue;
            }
            batch.allow_activation = true;
            for op in &batch.ops {
                host.set_allow_activation(*op, true);
            }
        }
    }

    /// Whether activation is currently permitted. Reflects the most recent
    /// load request's gate, flipped by [`activate_scenes`](Self::activate_scenes).
    pub fn allow_scene_activation(&self) -> bool {
        self.activation_allowed
    }

    /// Whether nothing at all is in flight.
    pub fn is_idle(&self) -> bool {
        self.load_batches.is_empty() && self.unload_batches.is_empty() && !self.tracker.has_work()
    }

    // ========================================================================
    // The tick driver
    // ========================================================================

    /// Advance every batch by one frame.
    ///
    /// In order: transition scenes that finished release their main batch;
    /// main batches whose operations are all terminal settle (active-scene
    /// selection, then post-activation unload registration); the tracker
    /// publishes composite progress and completion; finished batches retire.
    pub fn tick<H: SceneHost>(&mut self, host: &mut H) {
        // Transition scenes that finished start their main batch.
        for batch in &mut self.load_batches {
            let Some(transition) = &mut batch.transition else {
                continue;
            };
            if transition.finished || !host.poll(transition.op).done {
                continue;
            }
            transition.finished = true;
            debug!("transition scene {} ready; starting main batch", transition.path);
            for (i, path) in batch.pending.drain(..).enumerate() {
                let op = host.begin_load(&path, op_mode(batch.mode, i), batch.allow_activation);
                self.tracker.track(op);
                batch.ops.push(op);
            }
        }

        // Main batches that reached terminal state settle.
        for batch in &mut self.load_batches {
            if batch.settled || batch.ops.is_empty() {
                continue;
            }
            if !batch.ops.iter().all(|op| host.poll(*op).done) {
                continue;
            }
            batch.settled = true;
            if let Some(path) = &batch.active_scene {
                host.set_active_scene(path);
            }
            for path in &batch.then_unload {
                debug!("batch activated; unloading {}", path);
                batch.drain.push(host.begin_unload(path));
            }
            if let Some(transition) = &batch.transition {
                if transition.auto_unload {
                    debug!("batch activated; unloading transition scene {}", transition.path);
                    batch.drain.push(host.begin_unload(&transition.path));
                }
            }
        }

        // Unload batches that drained trigger their reclamation pass.
        for batch in &mut self.unload_batches {
            if batch.finished || !batch.ops.iter().all(|op| host.poll(*op).done) {
                continue;
            }
            batch.finished = true;
            if batch.reclaim {
                debug!("unload batch drained; reclaiming unused assets");
                host.unload_unused_assets();
            }
        }

        // Publish progress and completion.
        self.tracker.tick(host);

        // Retire finished batches.
        let host_ref: &H = host;
        self.load_batches
            .retain(|batch| !(batch.settled && batch.drain.iter().all(|op| host_ref.poll(*op).done)));
        self.unload_batches.retain(|batch| !batch.finished);
    }
}

/// Pick the host-facing mode for the i-th scene of a batch: a single-mode
/// batch clears the world with its first scene, the rest pile on additively.
fn op_mode(mode: LoadMode, index: usize) -> LoadMode {
    match mode {
        LoadMode::Single if index == 0 => LoadMode::Single,
        _ => LoadMode::Additive,
    }
}

/// Resolve references against the catalog: invalid entries are dropped with a
/// warning, duplicates are kept (the host tolerates them) but flagged.
fn resolve_scenes(refs: &[SceneRef], catalog: &SceneCatalog) -> Vec<String> {
    let resolved: Vec<String> = refs
        .iter()
        .filter_map(|scene| match scene.resolve(catalog) {
            Some(path) => Some(path.to_owned()),
            None => {
                warn!("scene reference {} does not resolve against the build, skipping", scene);
                None
            }
        })
        .collect();

    let duplicates = resolved.iter().duplicates().join(", ");
    if !duplicates.is_empty() {
        warn!("request repeats scenes ({}); keeping the duplicates", duplicates);
    }
    resolved
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::sim::SimHost;

    fn catalog() -> SceneCatalog {
        SceneCatalog::from_paths([
            "scenes/loading.scene",
            "scenes/lobby.scene",
            "scenes/level_1.scene",
            "scenes/level_2.scene",
        ])
    }

    struct Recorded {
        progress: Rc<RefCell<Vec<f32>>>,
        completions: Rc<RefCell<u32>>,
    }

    fn record(loader: &mut SceneLoader) -> Recorded {
        let progress = Rc::new(RefCell::new(Vec::new()));
        let completions = Rc::new(RefCell::new(0));

        let seen = Rc::clone(&progress);
        loader.on_progress(move |p| seen.borrow_mut().push(p));
        let seen = Rc::clone(&completions);
        loader.on_completed(move || *seen.borrow_mut() += 1);

        Recorded { progress, completions }
    }

    fn run_frames(loader: &mut SceneLoader, host: &mut SimHost, frames: usize) {
        for _ in 0..frames {
            host.step();
            loader.tick(host);
        }
    }

    #[test]
    fn empty_load_completes_before_returning() {
        let mut host = SimHost::new(catalog());
        let mut loader = SceneLoader::new();
        let recorded = record(&mut loader);

        loader.start_load(&mut host, LoadRequest::new());

        assert_eq!(*recorded.completions.borrow(), 1);
        assert!(recorded.progress.borrow().iter().all(|p| *p >= 1.0));
        assert!(loader.is_idle());
        assert_eq!(host.in_flight(), 0);
    }

    #[test]
    fn invalid_only_load_is_a_noop_completion() {
        let mut host = SimHost::new(catalog());
        let mut loader = SceneLoader::new();
        let recorded = record(&mut loader);

        loader.start_load(
            &mut host,
            LoadRequest::new().scene("scenes/deleted.scene").scene(SceneRef::index(99)),
        );

        assert_eq!(*recorded.completions.borrow(), 1);
        assert_eq!(host.in_flight(), 0);
    }

    #[test]
    fn sync_load_without_scene_is_an_error() {
        let mut host = SimHost::new(catalog());
        let mut loader = SceneLoader::new();

        let result = loader.load(&mut host, LoadRequest::new());
        assert!(matches!(result, Err(LoadError::NoSceneConfigured)));

        // Invalid references are treated as absent, so this is the same error.
        let result = loader.load(&mut host, LoadRequest::new().scene("scenes/deleted.scene"));
        assert!(matches!(result, Err(LoadError::NoSceneConfigured)));
    }

    #[test]
    fn sync_load_takes_the_first_valid_scene() {
        let mut host = SimHost::new(catalog());
        let mut loader = SceneLoader::new();

        loader
            .load(
                &mut host,
                LoadRequest::new()
                    .scene("scenes/deleted.scene")
                    .scene("scenes/level_1.scene")
                    .scene("scenes/level_2.scene"),
            )
            .unwrap();
        assert_eq!(host.loaded_scenes(), ["scenes/level_1.scene"]);
    }

    #[test]
    fn gated_load_stalls_at_nine_tenths_until_activated() {
        let mut host = SimHost::new(catalog());
        let mut loader = SceneLoader::new();
        let recorded = record(&mut loader);

        loader.start_load(
            &mut host,
            LoadRequest::new().scene("scenes/level_1.scene").allow_activation(false),
        );
        assert!(!loader.allow_scene_activation());

        run_frames(&mut loader, &mut host, 9);
        {
            let progress = recorded.progress.borrow();
            assert_eq!(*progress.last().unwrap(), 0.9);
            assert!(progress.windows(2).all(|w| w[0] <= w[1]), "progress must not decrease");
        }
        assert_eq!(*recorded.completions.borrow(), 0);

        // Stalled: more frames change nothing.
        run_frames(&mut loader, &mut host, 5);
        assert_eq!(*recorded.progress.borrow().last().unwrap(), 0.9);
        assert_eq!(*recorded.completions.borrow(), 0);

        // One frame after the gate opens, completion fires exactly once.
        loader.activate_scenes(&mut host);
        assert!(loader.allow_scene_activation());
        run_frames(&mut loader, &mut host, 1);
        assert_eq!(*recorded.completions.borrow(), 1);
        assert!(host.is_loaded("scenes/level_1.scene"));

        run_frames(&mut loader, &mut host, 3);
        assert_eq!(*recorded.completions.borrow(), 1);
        assert!(loader.is_idle());
    }

    #[test]
    fn then_unload_waits_for_every_load_in_the_batch() {
        let mut host = SimHost::new(catalog()).with_step(0.5);
        let mut loader = SceneLoader::new();

        loader.start_load_additive(
            &mut host,
            LoadRequest::new()
                .scenes(["scenes/level_1.scene", "scenes/level_2.scene"])
                .then_unload(["scenes/lobby.scene"]),
        );

        run_frames(&mut loader, &mut host, 2);
        assert!(host.unload_requests().is_empty(), "unload must wait for the batch");

        run_frames(&mut loader, &mut host, 1);
        assert_eq!(host.unload_requests(), ["scenes/lobby.scene"]);
    }

    #[test]
    fn transition_scene_precedes_the_main_batch_and_auto_unloads() {
        let mut host = SimHost::new(catalog()).with_step(0.5);
        let mut loader = SceneLoader::new();
        let recorded = record(&mut loader);

        loader.start_load_additive(
            &mut host,
            LoadRequest::new()
                .scene("scenes/level_1.scene")
                .with_transition("scenes/loading.scene"),
        );

        // While the transition scene streams in, the main batch has not started.
        run_frames(&mut loader, &mut host, 2);
        assert!(!host.is_loaded("scenes/loading.scene"));
        assert!(!host.is_loaded("scenes/level_1.scene"));
        run_frames(&mut loader, &mut host, 1);
        assert!(host.is_loaded("scenes/loading.scene"));
        assert!(!host.is_loaded("scenes/level_1.scene"));
        assert!(host.unload_requests().is_empty());

        // Main batch runs; its unload of the transition scene registers only
        // after the batch is terminal.
        run_frames(&mut loader, &mut host, 3);
        assert!(host.is_loaded("scenes/level_1.scene"));
        assert_eq!(host.unload_requests(), ["scenes/loading.scene"]);
        assert_eq!(*recorded.completions.borrow(), 1);

        // The drain finishes and the transition scene is gone.
        run_frames(&mut loader, &mut host, 2);
        assert!(!host.is_loaded("scenes/loading.scene"));
        assert!(loader.is_idle());
        assert_eq!(*recorded.completions.borrow(), 1, "drains emit no second completion");
    }

    #[test]
    fn transition_scene_can_be_kept() {
        let mut host = SimHost::new(catalog()).with_step(0.5);
        let mut loader = SceneLoader::new();

        loader.start_load_additive(
            &mut host,
            LoadRequest::new()
                .scene("scenes/level_1.scene")
                .with_transition("scenes/loading.scene")
                .auto_unload_transition(false),
        );

        run_frames(&mut loader, &mut host, 8);
        assert!(loader.is_idle());
        assert!(host.is_loaded("scenes/loading.scene"));
        assert!(host.unload_requests().is_empty());
    }

    #[test]
    fn active_scene_is_selected_when_the_batch_settles() {
        let mut host = SimHost::new(catalog()).with_step(0.5);
        let mut loader = SceneLoader::new();

        loader.start_load_additive(
            &mut host,
            LoadRequest::new()
                .scenes(["scenes/level_1.scene", "scenes/level_2.scene"])
                .activate("scenes/level_2.scene"),
        );

        run_frames(&mut loader, &mut host, 2);
        assert_eq!(host.active_scene(), None);
        run_frames(&mut loader, &mut host, 1);
        assert_eq!(host.active_scene(), Some("scenes/level_2.scene"));
    }

    #[test]
    fn invalid_active_scene_is_ignored() {
        let mut host = SimHost::new(catalog()).with_step(0.5);
        let mut loader = SceneLoader::new();

        loader.start_load_additive(
            &mut host,
            LoadRequest::new().scene("scenes/level_1.scene").activate("scenes/deleted.scene"),
        );
        run_frames(&mut loader, &mut host, 4);
        assert!(loader.is_idle());
        assert_eq!(host.active_scene(), None);
    }

    #[test]
    fn unload_batch_completes_and_reclaims() {
        let mut host = SimHost::new(catalog()).with_step(0.5);
        host.load("scenes/lobby.scene", LoadMode::Additive);
        let mut loader = SceneLoader::new();
        let recorded = record(&mut loader);

        loader.start_unload(
            &mut host,
            UnloadRequest::new().scene("scenes/lobby.scene").unload_unused_assets(true),
        );
        assert_eq!(*recorded.completions.borrow(), 0);

        run_frames(&mut loader, &mut host, 2);
        assert!(!host.is_loaded("scenes/lobby.scene"));
        assert_eq!(host.reclaim_passes(), 1);
        assert_eq!(*recorded.completions.borrow(), 1);
        assert!(loader.is_idle());
    }

    #[test]
    fn empty_unload_completes_immediately_without_reclaiming() {
        let mut host = SimHost::new(catalog());
        let mut loader = SceneLoader::new();
        let recorded = record(&mut loader);

        loader.start_unload(&mut host, UnloadRequest::new().unload_unused_assets(true));
        assert_eq!(*recorded.completions.borrow(), 1);
        assert_eq!(host.reclaim_passes(), 0);
    }

    #[test]
    fn gate_opens_for_batches_still_behind_a_transition() {
        let mut host = SimHost::new(catalog()).with_step(0.5);
        let mut loader = SceneLoader::new();

        loader.start_load_additive(
            &mut host,
            LoadRequest::new()
                .scene("scenes/level_1.scene")
                .allow_activation(false)
                .with_transition("scenes/loading.scene")
                .auto_unload_transition(false),
        );

        // Open the gate before the main batch even starts.
        loader.activate_scenes(&mut host);
        run_frames(&mut loader, &mut host, 7);
        assert!(host.is_loaded("scenes/level_1.scene"));
        assert!(loader.is_idle());
    }

    #[test]
    fn duplicate_scenes_are_preserved() {
        let mut host = SimHost::new(catalog()).with_step(0.5);
        let mut loader = SceneLoader::new();

        loader.start_load_additive(
            &mut host,
            LoadRequest::new().scenes(["scenes/level_1.scene", "scenes/level_1.scene"]),
        );
        run_frames(&mut loader, &mut host, 3);
        assert_eq!(
            host.loaded_scenes(),
            ["scenes/level_1.scene", "scenes/level_1.scene"],
            "the host decides what duplicates mean"
        );
    }
}
