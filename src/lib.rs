//! # Skene
//!
//! **A declarative scene-loading toolkit for games that gets out of your way.**
//!
//! Describe *what* to load — scene batches, transition screens, activation
//! gates, post-load cleanup — and let your engine do the actual streaming.
//! Skene stages the requests, keeps the ordering honest, and tells you how
//! far along everything is.
//!
//! ## Quick Start
//!
//! ```
//! use skene::*;
//!
//! // Your engine implements `SceneHost`; `SimHost` simulates one.
//! let catalog = SceneCatalog::from_paths(["scenes/loading.scene", "scenes/level_1.scene"]);
//! let mut host = SimHost::new(catalog);
//! let mut loader = SceneLoader::new();
//!
//! loader.on_progress(|p| println!("loading... {:.0}%", p * 100.0));
//! loader.on_completed(|| println!("ready!"));
//!
//! loader.start_load(
//!     &mut host,
//!     LoadRequest::new()
//!         .scene("scenes/level_1.scene")
//!         .with_transition("scenes/loading.scene")
//!         .allow_activation(false), // hold at 90% for "press any key"
//! );
//!
//! // Once per frame:
//! host.step();
//! loader.tick(&mut host);
//!
//! // When the player presses a key:
//! loader.activate_scenes(&mut host);
//! ```
//!
//! ## Philosophy
//!
//! - **One request, one start** — Configuration is a value, built once and
//!   consumed once. No builder state leaks between loads.
//! - **Your engine does the work** — Skene never loads a byte. It drives the
//!   [`SceneHost`] you give it and reacts to what it reports.
//! - **Tick-driven, thread-free** — Call [`SceneLoader::tick`] once per
//!   frame. There is no hidden thread and nothing to synchronize with.
//! - **Data-driven when you want it** — [`SceneAction`] descriptors serialize
//!   with serde, so load sequences can live in asset files.

mod action;
mod host;
mod loader;
mod reference;
mod request;
mod sim;
mod tracker;

pub use action::{ActionBinding, ActionError, SceneAction, TransitionConfig};
pub use host::{LoadMode, OpStatus, OperationId, SceneHost};
pub use loader::{LoadError, SceneLoader};
pub use reference::{SceneCatalog, SceneRef};
pub use request::{LoadRequest, UnloadRequest};
pub use sim::SimHost;
