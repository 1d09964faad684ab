//! Declarative scene actions.
//!
//! A [`SceneAction`] is a data-driven description of one loader call: which
//! scenes to touch, synchronously or not, with which flags. Actions serialize
//! with serde, so level designers can keep them in data files next to the
//! scenes they describe and game code just executes whatever it is handed.
//!
//! Each variant carries only the fields that matter to it; there is no flat
//! record with fields that must be ignored depending on a tag.
//!
//! # Example
//!
//! A RON asset describing "load level 2 behind a loading screen, then drop
//! level 1":
//!
//! ```text
//! LoadAdditiveAsync(
//!     scenes: [Path("scenes/level_2.scene")],
//!     allow_activation: true,
//!     active_scene: Some(Path("scenes/level_2.scene")),
//!     transition: Some((scene: Path("scenes/loading.scene"), auto_unload: true)),
//!     then_unload: [Path("scenes/level_1.scene")],
//! )
//! ```

use serde::{Deserialize, Serialize};

use crate::host::SceneHost;
use crate::loader::{LoadError, SceneLoader};
use crate::reference::SceneRef;
use crate::request::{LoadRequest, UnloadRequest};

fn default_true() -> bool {
    true
}

/// Transition-scene settings carried by the async load actions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionConfig {
    /// The scene shown while the batch loads.
    pub scene: SceneRef,
    /// Unload the transition scene automatically once the batch activates.
    #[serde(default = "default_true")]
    pub auto_unload: bool,
}

impl TransitionConfig {
    /// A transition scene with automatic unload.
    pub fn new(scene: impl Into<SceneRef>) -> Self {
        Self {
            scene: scene.into(),
            auto_unload: true,
        }
    }

    /// Keep the transition scene loaded after the batch activates.
    pub fn keep(mut self) -> Self {
        self.auto_unload = false;
        self
    }
}

/// One configured loader invocation, as data.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum SceneAction {
    /// Do nothing. Executing this registers no operations and fires no
    /// notifications.
    #[default]
    None,
    /// Load one scene synchronously, unloading every other scene.
    Load {
        /// The target scene.
        scene: SceneRef,
    },
    /// Load one scene synchronously, keeping existing scenes.
    LoadAdditive {
        /// The target scene.
        scene: SceneRef,
    },
    /// Load scenes asynchronously, unloading every other scene on
    /// activation.
    LoadAsync {
        /// Scenes to load, in order.
        scenes: Vec<SceneRef>,
        /// Activation gate forwarded to every operation.
        #[serde(default = "default_true")]
        allow_activation: bool,
        /// Which loaded scene becomes active once the batch settles.
        #[serde(default)]
        active_scene: Option<SceneRef>,
        /// Optional transition scene shown while the batch loads.
        #[serde(default)]
        transition: Option<TransitionConfig>,
    },
    /// Load scenes asynchronously on top of what is already loaded.
    LoadAdditiveAsync {
        /// Scenes to load, in order.
        scenes: Vec<SceneRef>,
        /// Activation gate forwarded to every operation.
        #[serde(default = "default_true")]
        allow_activation: bool,
        /// Which loaded scene becomes active once the batch settles.
        #[serde(default)]
        active_scene: Option<SceneRef>,
        /// Optional transition scene shown while the batch loads.
        #[serde(default)]
        transition: Option<TransitionConfig>,
        /// Scenes to unload once the batch's activation completes.
        #[serde(default)]
        then_unload: Vec<SceneRef>,
    },
    /// Unload scenes asynchronously.
    UnloadAsync {
        /// Scenes to unload.
        scenes: Vec<SceneRef>,
        /// Run a resource-reclamation pass once the batch drains.
        #[serde(default)]
        unload_unused_assets: bool,
    },
    /// Unload the scene that owns this action. Only meaningful through an
    /// [`ActionBinding`], which knows its owning scene.
    UnloadSelf {
        /// Run a resource-reclamation pass once the unload completes.
        #[serde(default)]
        unload_unused_assets: bool,
    },
}

/// Errors surfaced by [`SceneAction::execute`].
#[derive(Debug)]
pub enum ActionError {
    /// A synchronous variant had no resolvable target scene.
    InvalidConfiguration(LoadError),
    /// `UnloadSelf` was executed without a binding to resolve it against.
    NoOwningScene,
}

impl std::fmt::Display for ActionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionError::InvalidConfiguration(e) => write!(f, "misconfigured scene action: {}", e),
            ActionError::NoOwningScene => {
                write!(f, "UnloadSelf executed without an owning scene binding")
            }
        }
    }
}

impl std::error::Error for ActionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ActionError::InvalidConfiguration(e) => Some(e),
            ActionError::NoOwningScene => None,
        }
    }
}

impl From<LoadError> for ActionError {
    fn from(e: LoadError) -> Self {
        ActionError::InvalidConfiguration(e)
    }
}

impl SceneAction {
    /// Execute this action against the loader.
    ///
    /// Standalone execution cannot resolve [`SceneAction::UnloadSelf`]; use
    /// an [`ActionBinding`] for actions that live inside a scene.
    pub fn execute<H: SceneHost>(
        &self,
        loader: &mut SceneLoader,
        host: &mut H,
    ) -> Result<(), ActionError> {
        self.execute_within(None, loader, host)
    }

    fn execute_within<H: SceneHost>(
        &self,
        owner: Option<&SceneRef>,
        loader: &mut SceneLoader,
        host: &mut H,
    ) -> Result<(), ActionError> {
        match self {
            SceneAction::None => Ok(()),
            SceneAction::Load { scene } => {
                loader.load(host, LoadRequest::new().scene(scene.clone()))?;
                Ok(())
            }
            SceneAction::LoadAdditive { scene } => {
                loader.load_additive(host, LoadRequest::new().scene(scene.clone()))?;
                Ok(())
            }
            SceneAction::LoadAsync {
                scenes,
                allow_activation,
                active_scene,
                transition,
            } => {
                let request =
                    load_request(scenes, *allow_activation, active_scene, transition, &[]);
                loader.start_load(host, request);
                Ok(())
            }
            SceneAction::LoadAdditiveAsync {
                scenes,
                allow_activation,
                active_scene,
                transition,
                then_unload,
            } => {
                let request =
                    load_request(scenes, *allow_activation, active_scene, transition, then_unload);
                loader.start_load_additive(host, request);
                Ok(())
            }
            SceneAction::UnloadAsync {
                scenes,
                unload_unused_assets,
            } => {
                let request = UnloadRequest::new()
                    .scenes(scenes.iter().cloned())
                    .unload_unused_assets(*unload_unused_assets);
                loader.start_unload(host, request);
                Ok(())
            }
            SceneAction::UnloadSelf { unload_unused_assets } => {
                let owner = owner.ok_or(ActionError::NoOwningScene)?;
                let request = UnloadRequest::new()
                    .scene(owner.clone())
                    .unload_unused_assets(*unload_unused_assets);
                loader.start_unload(host, request);
                Ok(())
            }
        }
    }
}

fn load_request(
    scenes: &[SceneRef],
    allow_activation: bool,
    active_scene: &Option<SceneRef>,
    transition: &Option<TransitionConfig>,
    then_unload: &[SceneRef],
) -> LoadRequest {
    let mut request = LoadRequest::new()
        .scenes(scenes.iter().cloned())
        .allow_activation(allow_activation)
        .then_unload(then_unload.iter().cloned());
    if let Some(scene) = active_scene {
        request = request.activate(scene.clone());
    }
    if let Some(transition) = transition {
        request = request
            .with_transition(transition.scene.clone())
            .auto_unload_transition(transition.auto_unload);
    }
    request
}

/// An action bound to the scene that carries it, the per-object counterpart
/// to a standalone action asset. The binding is what gives
/// [`SceneAction::UnloadSelf`] its meaning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionBinding {
    /// The scene this action lives in.
    pub owner: SceneRef,
    /// The action to run.
    pub action: SceneAction,
}

impl ActionBinding {
    /// Bind an action to its owning scene.
    pub fn new(owner: impl Into<SceneRef>, action: SceneAction) -> Self {
        Self {
            owner: owner.into(),
            action,
        }
    }

    /// Execute the bound action; `UnloadSelf` targets the owning scene.
    pub fn execute<H: SceneHost>(
        &self,
        loader: &mut SceneLoader,
        host: &mut H,
    ) -> Result<(), ActionError> {
        self.action.execute_within(Some(&self.owner), loader, host)
    }
}
