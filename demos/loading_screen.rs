//! Loading screen demo - the "press any key to continue" flow.
//!
//! This example shows:
//! - A transition (loading) scene that appears before the level streams in
//! - An activation gate holding progress at 90% until the player confirms
//! - Automatic unload of the loading scene once the level activates
//!
//! The engine side is played by `SimHost`; a real game would implement
//! `SceneHost` over its own scene manager and call `loader.tick` once per
//! frame.

use std::cell::RefCell;
use std::rc::Rc;

use skene::{LoadRequest, SceneCatalog, SceneLoader, SimHost};

fn main() {
    env_logger::init();

    let catalog = SceneCatalog::from_paths([
        "scenes/boot.scene",
        "scenes/loading.scene",
        "scenes/level_1.scene",
    ]);
    let mut host = SimHost::new(catalog);
    let mut loader = SceneLoader::new();

    let progress = Rc::new(RefCell::new(0.0f32));
    let shared = Rc::clone(&progress);
    loader.on_progress(move |p| {
        *shared.borrow_mut() = p;
        println!("loading... {:>5.1}%", p * 100.0);
    });
    loader.on_completed(|| println!("level ready!"));

    loader.start_load(
        &mut host,
        LoadRequest::new()
            .scene("scenes/level_1.scene")
            .allow_activation(false)
            .with_transition("scenes/loading.scene"),
    );

    let mut keypress_frame = None;
    for frame in 0.. {
        host.step();
        loader.tick(&mut host);

        // The gate holds composite progress at 0.9; show the prompt and,
        // a few frames later, pretend the player pressed a key.
        if !loader.allow_scene_activation() && *progress.borrow() >= 0.9 {
            match keypress_frame {
                None => {
                    println!("-- press any key --");
                    keypress_frame = Some(frame + 3);
                }
                Some(at) if frame == at => {
                    println!("-- key pressed --");
                    loader.activate_scenes(&mut host);
                }
                _ => {}
            }
        }

        if loader.is_idle() {
            break;
        }
    }

    println!("loaded scenes: {:?}", host.loaded_scenes());
    assert!(host.is_loaded("scenes/level_1.scene"));
    assert!(!host.is_loaded("scenes/loading.scene"));
}
