pub mod camera;
pub mod config;
pub mod curve;
pub mod engine;
pub mod error;
pub mod instance;
pub mod preset;

pub use camera::{CameraSink, SimulatedCamera};
pub use config::{EngineConfig, OffsetBlend};
pub use curve::{Keyframe, ResponseCurve};
pub use engine::{PlayOutcome, SLOT_COUNT, SUSTAINED_SLOT, ShakeEngine, TRANSIENT_SLOT};
pub use error::QuakeError;
pub use instance::{Phase, ShakeInstance};
pub use preset::{BumpMode, PresetLibrary, QuakePreset, QuakeType};
