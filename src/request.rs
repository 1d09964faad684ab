//! Fluent request configuration for scene loads and unloads.
//!
//! A request is a plain value: the fluent methods consume and return it, so
//! configuration is built once, handed to the [`SceneLoader`](crate::SceneLoader)
//! start methods exactly once, and never reused across invocations. That
//! keeps flags from one load leaking into the next.
//!
//! # Example
//!
//! ```
//! use skene::LoadRequest;
//!
//! let request = LoadRequest::new()
//!     .scene("scenes/level_2.scene")
//!     .allow_activation(false)
//!     .with_transition("scenes/loading.scene")
//!     .then_unload(["scenes/level_1.scene"]);
//! # let _ = request;
//! ```

use crate::reference::SceneRef;

/// Configuration for one batch of scene loads.
///
/// Built with the fluent methods below and consumed by
/// [`SceneLoader::start_load`](crate::SceneLoader::start_load),
/// [`SceneLoader::start_load_additive`](crate::SceneLoader::start_load_additive),
/// or the synchronous [`SceneLoader::load`](crate::SceneLoader::load) /
/// [`SceneLoader::load_additive`](crate::SceneLoader::load_additive).
#[derive(Clone, Debug)]
pub struct LoadRequest {
    pub(crate) scenes: Vec<SceneRef>,
    pub(crate) allow_activation: bool,
    pub(crate) active_scene: Option<SceneRef>,
    pub(crate) transition: Option<SceneRef>,
    pub(crate) auto_unload_transition: bool,
    pub(crate) then_unload: Vec<SceneRef>,
}

impl Default for LoadRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadRequest {
    /// Create an empty request. Activation is allowed by default.
    pub fn new() -> Self {
        Self {
            scenes: Vec::new(),
            allow_activation: true,
            active_scene: None,
            transition: None,
            auto_unload_transition: true,
            then_unload: Vec::new(),
        }
    }

    /// Append one scene to the load list.
    pub fn scene(mut self, scene: impl Into<SceneRef>) -> Self {
        self.scenes.push(scene.into());
        self
    }

    /// Append several scenes to the load list, preserving order.
    pub fn scenes(mut self, scenes: impl IntoIterator<Item = impl Into<SceneRef>>) -> Self {
        self.scenes.extend(scenes.into_iter().map(Into::into));
        self
    }

    /// Set the activation gate forwarded to every operation this request
    /// starts.
    ///
    /// With `false`, every load stalls at 0.9 progress until
    /// [`SceneLoader::activate_scenes`](crate::SceneLoader::activate_scenes)
    /// is called. This is the mechanism behind "press any key to continue"
    /// loading screens.
    pub fn allow_activation(mut self, allow: bool) -> Self {
        self.allow_activation = allow;
        self
    }

    /// Select which loaded scene becomes the active scene once the whole
    /// batch has activated. Ignored if the reference proves invalid at start
    /// time.
    pub fn activate(mut self, scene: impl Into<SceneRef>) -> Self {
        self.active_scene = Some(scene.into());
        self
    }

    /// Show a transition scene while the batch loads.
    ///
    /// The transition scene is loaded additively and activated before the
    /// main batch starts.
    pub fn with_transition(mut self, scene: impl Into<SceneRef>) -> Self {
        self.transition = Some(scene.into());
        self
    }

    /// Whether the transition scene is unloaded automatically once the main
    /// batch activates. Defaults to true; has no effect without
    /// [`with_transition`](Self::with_transition).
    pub fn auto_unload_transition(mut self, auto: bool) -> Self {
        self.auto_unload_transition = auto;
        self
    }

    /// Queue scenes to unload after the batch's activation completes.
    ///
    /// These unloads never start before every load in the batch is terminal.
    pub fn then_unload(mut self, scenes: impl IntoIterator<Item = impl Into<SceneRef>>) -> Self {
        self.then_unload.extend(scenes.into_iter().map(Into::into));
        self
    }
}

/// Configuration for one batch of scene unloads.
///
/// Consumed by [`SceneLoader::start_unload`](crate::SceneLoader::start_unload).
#[derive(Clone, Debug)]
pub struct UnloadRequest {
    pub(crate) scenes: Vec<SceneRef>,
    pub(crate) unload_unused_assets: bool,
}

impl Default for UnloadRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl UnloadRequest {
    /// Create an empty request.
    pub fn new() -> Self {
        Self {
            scenes: Vec::new(),
            unload_unused_assets: false,
        }
    }

    /// Append one scene to the unload list.
    pub fn scene(mut self, scene: impl Into<SceneRef>) -> Self {
        self.scenes.push(scene.into());
        self
    }

    /// Append several scenes to the unload list, preserving order.
    pub fn scenes(mut self, scenes: impl IntoIterator<Item = impl Into<SceneRef>>) -> Self {
        self.scenes.extend(scenes.into_iter().map(Into::into));
        self
    }

    /// Run a resource-reclamation pass once every unload in the batch has
    /// completed.
    pub fn unload_unused_assets(mut self, reclaim: bool) -> Self {
        self.unload_unused_assets = reclaim;
        self
    }
}
