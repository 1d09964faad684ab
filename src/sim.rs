//! A simulated scene host for demos and tests.
//!
//! Real engines implement [`SceneHost`] over their streaming machinery.
//! [`SimHost`] stands in for one: every call to [`SimHost::step`] advances
//! each in-flight operation by a fixed increment, loads honor the activation
//! gate by stalling at 0.9, and unloads run straight to completion. The whole
//! thing is deterministic, which makes ordering guarantees easy to assert on.
//!
//! # Example
//!
//! ```
//! use skene::{LoadMode, OpStatus, SceneCatalog, SceneHost, SimHost};
//!
//! let mut host = SimHost::new(SceneCatalog::from_paths(["a.scene"])).with_step(0.5);
//! let op = host.begin_load("a.scene", LoadMode::Additive, true);
//!
//! host.step();
//! assert_eq!(host.poll(op), OpStatus { progress: 0.5, done: false });
//!
//! host.step(); // caps at 0.9 while streaming
//! host.step(); // activation permitted: jump to 1.0
//! assert!(host.poll(op).done);
//! assert!(host.is_loaded("a.scene"));
//! ```

use crate::host::{LoadMode, OpStatus, OperationId, SceneHost};
use crate::reference::SceneCatalog;

const ACTIVATION_HOLD: f32 = 0.9;

enum SimOpKind {
    Load { mode: LoadMode, allow_activation: bool },
    Unload,
}

struct SimOp {
    id: u64,
    path: String,
    kind: SimOpKind,
    progress: f32,
    done: bool,
}

/// Deterministic in-memory [`SceneHost`].
pub struct SimHost {
    catalog: SceneCatalog,
    step_size: f32,
    next_id: u64,
    ops: Vec<SimOp>,
    loaded: Vec<String>,
    active: Option<String>,
    unload_requests: Vec<String>,
    reclaim_passes: usize,
}

impl SimHost {
    /// Create a host over the given build catalog. Operations advance by 0.1
    /// per [`step`](Self::step) unless overridden with
    /// [`with_step`](Self::with_step).
    pub fn new(catalog: SceneCatalog) -> Self {
        Self {
            catalog,
            step_size: 0.1,
            next_id: 0,
            ops: Vec::new(),
            loaded: Vec::new(),
            active: None,
            unload_requests: Vec::new(),
            reclaim_passes: 0,
        }
    }

    /// Override the per-step progress increment.
    pub fn with_step(mut self, step: f32) -> Self {
        self.step_size = step;
        self
    }

    /// Advance every in-flight operation by one simulated frame.
    ///
    /// Loads climb to 0.9 and then either hold (activation withheld) or jump
    /// to 1.0 and apply their effect. Unloads climb straight to 1.0.
    pub fn step(&mut self) {
        let step = self.step_size;
        for i in 0..self.ops.len() {
            if self.ops[i].done {
                continue;
            }
            match self.ops[i].kind {
                SimOpKind::Load { mode, allow_activation } => {
                    if self.ops[i].progress < ACTIVATION_HOLD {
                        self.ops[i].progress = (self.ops[i].progress + step).min(ACTIVATION_HOLD);
                    } else if allow_activation {
                        self.ops[i].progress = 1.0;
                        self.ops[i].done = true;
                        let path = self.ops[i].path.clone();
                        self.apply_load(&path, mode);
                    }
                }
                SimOpKind::Unload => {
                    self.ops[i].progress = (self.ops[i].progress + step).min(1.0);
                    if self.ops[i].progress >= 1.0 {
                        self.ops[i].done = true;
                        let path = self.ops[i].path.clone();
                        self.loaded.retain(|p| p != &path);
                    }
                }
            }
        }
        // Terminal operations are forgotten; poll reports them as DONE.
        self.ops.retain(|op| !op.done);
    }

    /// Whether a scene is currently loaded.
    pub fn is_loaded(&self, path: &str) -> bool {
        self.loaded.iter().any(|p| p == path)
    }

    /// Every loaded scene, in load-completion order.
    pub fn loaded_scenes(&self) -> &[String] {
        &self.loaded
    }

    /// The scene most recently made active, if any.
    pub fn active_scene(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Every unload registered so far, in registration order.
    pub fn unload_requests(&self) -> &[String] {
        &self.unload_requests
    }

    /// How many resource-reclamation passes have run.
    pub fn reclaim_passes(&self) -> usize {
        self.reclaim_passes
    }

    /// Number of operations that have not reached a terminal state.
    pub fn in_flight(&self) -> usize {
        self.ops.iter().filter(|op| !op.done).count()
    }

    fn apply_load(&mut self, path: &str, mode: LoadMode) {
        if mode == LoadMode::Single {
            self.loaded.clear();
        }
        self.loaded.push(path.to_owned());
    }

    fn register(&mut self, path: &str, kind: SimOpKind) -> OperationId {
        let id = self.next_id;
        self.next_id += 1;
        self.ops.push(SimOp {
            id,
            path: path.to_owned(),
            kind,
            progress: 0.0,
            done: false,
        });
        OperationId(id)
    }
}

impl SceneHost for SimHost {
    fn catalog(&self) -> &SceneCatalog {
        &self.catalog
    }

    fn load(&mut self, path: &str, mode: LoadMode) {
        self.apply_load(path, mode);
    }

    fn begin_load(&mut self, path: &str, mode: LoadMode, allow_activation: bool) -> OperationId {
        self.register(path, SimOpKind::Load { mode, allow_activation })
    }

    fn begin_unload(&mut self, path: &str) -> OperationId {
        self.unload_requests.push(path.to_owned());
        self.register(path, SimOpKind::Unload)
    }

    fn poll(&self, op: OperationId) -> OpStatus {
        match self.ops.iter().find(|o| o.id == op.0) {
            Some(op) => OpStatus {
                progress: op.progress,
                done: op.done,
            },
            None => OpStatus::DONE,
        }
    }

    fn set_allow_activation(&mut self, op: OperationId, allow: bool) {
        if let Some(op) = self.ops.iter_mut().find(|o| o.id == op.0) {
            if let SimOpKind::Load { allow_activation, .. } = &mut op.kind {
                *allow_activation = allow;
            }
        }
    }

    fn set_active_scene(&mut self, path: &str) {
        self.active = Some(path.to_owned());
    }

    fn unload_unused_assets(&mut self) {
        self.reclaim_passes += 1;
    }
}
