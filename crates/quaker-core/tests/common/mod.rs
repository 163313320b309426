#![allow(dead_code)]

use std::path::PathBuf;

use quaker_core::{EngineConfig, PresetLibrary, ShakeEngine, SimulatedCamera};

/// Path to a file in the workspace `config/` directory.
pub fn config_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../config")
        .join(name)
}

pub fn shipped_presets() -> PresetLibrary {
    PresetLibrary::load(config_path("presets.toml")).expect("shipped presets must parse")
}

pub fn seeded_engine(seed: u64) -> ShakeEngine<SimulatedCamera> {
    ShakeEngine::new(Some(SimulatedCamera::default()), &EngineConfig::seeded(seed))
        .expect("camera is present")
}

/// Tick until the engine goes idle, returning the elapsed time, or `None`
/// if it is still running after `max_secs`.
pub fn run_until_idle(
    engine: &mut ShakeEngine<SimulatedCamera>,
    dt: f32,
    max_secs: f32,
) -> Option<f32> {
    let mut elapsed = 0.0;
    while elapsed < max_secs {
        if engine.is_idle() {
            return Some(elapsed);
        }
        engine.tick(dt);
        elapsed += dt;
    }
    engine.is_idle().then_some(elapsed)
}
