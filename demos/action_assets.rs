//! Action asset demo - data-driven scene sequencing.
//!
//! This example shows:
//! - `SceneAction` descriptors parsed from RON text, as a game would load
//!   them from asset files
//! - The additive load + transition + unload-after-load sequence
//! - An `ActionBinding` giving `UnloadSelf` its owning scene
//!
//! Run with `RUST_LOG=debug` to watch the loader's sequencing decisions.

use skene::{ActionBinding, SceneAction, SceneCatalog, SceneHost, SceneLoader, SimHost};

const SWAP_LEVELS: &str = r#"
LoadAdditiveAsync(
    scenes: [Path("scenes/level_2.scene")],
    allow_activation: true,
    active_scene: Some(Path("scenes/level_2.scene")),
    transition: Some((scene: Path("scenes/loading.scene"), auto_unload: true)),
    then_unload: [Path("scenes/level_1.scene")],
)
"#;

const DROP_OVERLAY: &str = r#"
UnloadSelf(unload_unused_assets: true)
"#;

fn main() {
    env_logger::init();

    let catalog = SceneCatalog::from_paths([
        "scenes/loading.scene",
        "scenes/level_1.scene",
        "scenes/level_2.scene",
        "scenes/pause_overlay.scene",
    ]);
    let mut host = SimHost::new(catalog).with_step(0.25);
    let mut loader = SceneLoader::new();
    loader.on_completed(|| println!("batch complete"));

    // Start from level 1 with the pause overlay open.
    host.load("scenes/level_1.scene", skene::LoadMode::Single);
    host.load("scenes/pause_overlay.scene", skene::LoadMode::Additive);

    // The overlay closes itself through a bound action...
    let close_overlay: SceneAction = ron::from_str(DROP_OVERLAY).expect("valid action asset");
    ActionBinding::new("scenes/pause_overlay.scene", close_overlay)
        .execute(&mut loader, &mut host)
        .expect("overlay action");

    // ...and a level-swap action drives the whole load sequence.
    let swap: SceneAction = ron::from_str(SWAP_LEVELS).expect("valid action asset");
    swap.execute(&mut loader, &mut host).expect("swap action");

    while !loader.is_idle() {
        host.step();
        loader.tick(&mut host);
    }

    println!("loaded scenes: {:?}", host.loaded_scenes());
    println!("active scene:  {:?}", host.active_scene());
    println!("reclaim passes: {}", host.reclaim_passes());
    assert!(host.is_loaded("scenes/level_2.scene"));
    assert!(!host.is_loaded("scenes/level_1.scene"));
    assert!(!host.is_loaded("scenes/pause_overlay.scene"));
}
