//! The host scene-manager abstraction.
//!
//! `skene` never loads anything itself. The engine integrating it implements
//! [`SceneHost`], and the loader drives that implementation: it begins
//! operations, polls their progress once per tick, and flips the activation
//! gate. Host-level failures (a scene missing from the build, I/O errors in
//! the engine's streamer) stay host-level; this crate does not intercept or
//! wrap them.
//!
//! The crate ships one implementation, [`SimHost`](crate::SimHost), which
//! simulates an engine deterministically for demos and tests.

use crate::reference::SceneCatalog;

/// Whether a load replaces the currently loaded scenes or adds to them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadMode {
    /// Activation unloads every other scene.
    #[default]
    Single,
    /// Existing scenes stay loaded.
    Additive,
}

/// Opaque key for one in-flight load or unload operation.
///
/// Issued by the host, held by the loader. There is no way to cancel an
/// operation once it exists; the only gate is allow-activation, which pauses
/// but never aborts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OperationId(pub(crate) u64);

/// Snapshot of one operation, as reported by [`SceneHost::poll`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OpStatus {
    /// Load progress. Climbs through [0.0, 0.9] while streaming and only
    /// reaches 1.0 once activation is permitted.
    pub progress: f32,
    /// Whether the operation reached its terminal state.
    pub done: bool,
}

impl OpStatus {
    /// Status of an operation that finished instantly.
    pub const DONE: OpStatus = OpStatus {
        progress: 1.0,
        done: true,
    };
}

/// The engine-side scene manager the loader delegates to.
///
/// All methods are expected to return promptly: `begin_*` registers work and
/// hands back a handle, `poll` reads state that the host updates on its own
/// schedule. The loader calls `poll` once per [`tick`](crate::SceneLoader::tick),
/// never from another thread.
pub trait SceneHost {
    /// The build's scene list, used to validate references before starting
    /// operations.
    fn catalog(&self) -> &SceneCatalog;

    /// Load a scene synchronously. Fire-and-forget; completion is implied
    /// when the call returns.
    fn load(&mut self, path: &str, mode: LoadMode);

    /// Begin an asynchronous load and return its handle.
    ///
    /// With `allow_activation` false the operation must stall at 0.9 until
    /// [`set_allow_activation`](Self::set_allow_activation) flips it.
    fn begin_load(&mut self, path: &str, mode: LoadMode, allow_activation: bool) -> OperationId;

    /// Begin an asynchronous unload and return its handle.
    fn begin_unload(&mut self, path: &str) -> OperationId;

    /// Read the current status of an operation.
    fn poll(&self, op: OperationId) -> OpStatus;

    /// Change the activation gate of an in-flight load.
    fn set_allow_activation(&mut self, op: OperationId, allow: bool);

    /// Make a loaded scene the active one.
    fn set_active_scene(&mut self, path: &str);

    /// Run a resource-reclamation pass over assets no loaded scene uses.
    fn unload_unused_assets(&mut self);
}
