use std::f32::consts::TAU;

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::camera::CameraSink;
use crate::config::{EngineConfig, OffsetBlend};
use crate::error::QuakeError;
use crate::instance::{NO_SEGMENT, Phase, ShakeInstance};
use crate::preset::{QuakePreset, QuakeType};

/// Slot reserved for Sustained quakes.
pub const SUSTAINED_SLOT: usize = 0;
/// Slot shared by OneShot and Bump quakes.
pub const TRANSIENT_SLOT: usize = 1;
pub const SLOT_COUNT: usize = 2;

/// What `play` did with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// The slot was idle and now runs the preset.
    Started { slot: usize },
    /// An in-flight quake was replaced (the engine is overwritable).
    Replaced { slot: usize },
    /// The slot was busy and the engine is not overwritable; nothing changed.
    Dropped { slot: usize },
}

/// Result of advancing one slot by one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Step {
    /// The slot produced a new offset.
    Moved(Vec2),
    /// A segment just completed; the next tick starts a new one.
    Skipped,
    /// Random-walk phases are exhausted.
    Finished,
    /// A bump is back at the origin.
    Settled,
}

/// Two-slot camera shake engine for one camera rig.
///
/// Call [`ShakeEngine::tick`] once per frame; [`ShakeEngine::play`] and the
/// other controls may be called at any point between ticks.
pub struct ShakeEngine<S: CameraSink> {
    slots: [ShakeInstance; SLOT_COUNT],
    paused: bool,
    overwritable: bool,
    blend: OffsetBlend,
    camera: S,
    rng: StdRng,
}

impl<S: CameraSink> ShakeEngine<S> {
    /// Build an engine driving `camera`, resetting its offset to zero.
    ///
    /// Fails with [`QuakeError::MissingCamera`] when no camera is given, since
    /// no shake could ever be rendered.
    pub fn new(camera: Option<S>, config: &EngineConfig) -> Result<Self, QuakeError> {
        let Some(mut camera) = camera else {
            tracing::error!("Shake engine has no camera to drive");
            return Err(QuakeError::MissingCamera);
        };
        camera.set_local_offset(Vec2::ZERO);

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Self {
            slots: Default::default(),
            paused: false,
            overwritable: config.overwritable,
            blend: config.blend,
            camera,
            rng,
        })
    }

    /// Play `preset` in the slot for its category.
    pub fn play(&mut self, preset: &QuakePreset) -> Result<PlayOutcome, QuakeError> {
        self.play_inner(preset, None)
    }

    /// Play a bump towards `target` (world space), overriding the preset's
    /// own target without modifying the preset.
    pub fn play_at(
        &mut self,
        preset: &QuakePreset,
        target: Vec2,
    ) -> Result<PlayOutcome, QuakeError> {
        self.play_inner(preset, Some(target))
    }

    fn play_inner(
        &mut self,
        preset: &QuakePreset,
        target: Option<Vec2>,
    ) -> Result<PlayOutcome, QuakeError> {
        let target = target.or(preset.bump_target);
        let validated = match preset.validate() {
            Err(QuakeError::MissingBumpTarget) if target.is_some() => Ok(()),
            other => other,
        };
        if let Err(e) = validated {
            tracing::warn!(kind = ?preset.kind, error = %e, "Rejected quake preset");
            return Err(e);
        }

        let index = preset.kind.slot();
        let camera_world = self.camera.world_position();
        let slot = &mut self.slots[index];
        let was_idle = slot.finished;
        if !was_idle && !self.overwritable {
            tracing::debug!(slot = index, kind = ?preset.kind, "Slot busy, quake dropped");
            return Ok(PlayOutcome::Dropped { slot: index });
        }

        slot.set_parameters(preset, target, camera_world)?;
        tracing::debug!(
            slot = index,
            kind = ?preset.kind,
            magnitude = preset.magnitude,
            replaced = !was_idle,
            "Quake started"
        );
        Ok(if was_idle {
            PlayOutcome::Started { slot: index }
        } else {
            PlayOutcome::Replaced { slot: index }
        })
    }

    /// Advance every active slot by `dt` seconds and update the camera.
    pub fn tick(&mut self, dt: f32) {
        if self.paused {
            return;
        }

        let mut any_active = false;
        for index in 0..SLOT_COUNT {
            if self.slots[index].finished {
                continue;
            }
            any_active = true;

            let slot = &mut self.slots[index];
            let step = match slot.kind {
                QuakeType::OneShot | QuakeType::Sustained => {
                    step_random_walk(slot, dt, &mut self.rng)
                },
                QuakeType::Bump => step_bump(slot, dt),
            };

            match step {
                Step::Moved(offset) => {
                    slot.offset = offset;
                    if self.blend == OffsetBlend::LastWriterWins {
                        self.camera.set_local_offset(offset);
                    }
                },
                Step::Skipped => {},
                Step::Settled => {
                    slot.offset = Vec2::ZERO;
                    tracing::debug!(slot = index, "Bump settled");
                    if self.blend == OffsetBlend::LastWriterWins {
                        self.camera.set_local_offset(Vec2::ZERO);
                    }
                },
                Step::Finished => {
                    slot.offset = Vec2::ZERO;
                    tracing::debug!(slot = index, "Quake finished");
                    if self.blend == OffsetBlend::LastWriterWins && self.is_idle() {
                        self.camera.set_local_offset(Vec2::ZERO);
                    }
                },
            }
        }

        if any_active && self.blend == OffsetBlend::Additive {
            let sum = self
                .slots
                .iter()
                .filter(|s| !s.finished)
                .map(|s| s.offset)
                .fold(Vec2::ZERO, |acc, o| acc + o);
            self.camera.set_local_offset(sum);
        }
    }

    /// Let the Sustained slot leave its sustain loop and fade out.
    ///
    /// No-op unless that slot currently holds a Sustained quake.
    pub fn stop_sustain(&mut self) {
        let slot = &mut self.slots[SUSTAINED_SLOT];
        if slot.kind == QuakeType::Sustained {
            slot.sustained = false;
            tracing::debug!("Sustained quake released");
        }
    }

    /// Stop every quake immediately and put the camera back at rest.
    pub fn cancel_all(&mut self) {
        for slot in &mut self.slots {
            slot.finished = true;
            slot.offset = Vec2::ZERO;
        }
        self.camera.set_local_offset(Vec2::ZERO);
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn unpause(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn overwritable(&self) -> bool {
        self.overwritable
    }

    pub fn set_overwritable(&mut self, overwritable: bool) {
        self.overwritable = overwritable;
    }

    pub fn blend(&self) -> OffsetBlend {
        self.blend
    }

    /// True when no slot is running.
    pub fn is_idle(&self) -> bool {
        self.slots.iter().all(|s| s.finished)
    }

    pub fn slot(&self, index: usize) -> Option<&ShakeInstance> {
        self.slots.get(index)
    }

    pub fn slots(&self) -> &[ShakeInstance; SLOT_COUNT] {
        &self.slots
    }

    pub fn camera(&self) -> &S {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut S {
        &mut self.camera
    }

    /// Give the camera back, e.g. when tearing down the rig.
    pub fn into_camera(self) -> S {
        self.camera
    }
}

/// `remaining / length`, or 0 for a zero-length phase.
fn phase_fraction(remaining: f32, length: f32) -> f32 {
    if length > 0.0 {
        remaining / length
    } else {
        0.0
    }
}

/// Uniform random point inside the disc of `radius`.
fn random_in_disc(rng: &mut impl Rng, radius: f32) -> Vec2 {
    let r = rng.random::<f32>().sqrt() * radius;
    let theta = rng.random::<f32>() * TAU;
    Vec2::from_angle(theta) * r
}

/// Advance the phase timers by `dt` and return this tick's envelope radius,
/// or `None` once every phase is exhausted.
fn envelope_radius(slot: &mut ShakeInstance, dt: f32) -> Option<f32> {
    match slot.phase() {
        Phase::FadeIn => {
            let p = phase_fraction(slot.fade_in_remaining, slot.fade_in_length);
            slot.fade_in_remaining = (slot.fade_in_remaining - dt).max(0.0);
            Some(slot.magnitude * (1.0 - slot.fade_in_curve.sample(p)))
        },
        Phase::Sustain => {
            slot.sustain_remaining = (slot.sustain_remaining - dt).max(0.0);
            Some(slot.magnitude)
        },
        Phase::FadeOut => {
            let p = phase_fraction(slot.fade_out_remaining, slot.fade_out_length);
            slot.fade_out_remaining = (slot.fade_out_remaining - dt).max(0.0);
            Some(slot.magnitude * slot.fade_out_curve.sample(p))
        },
        Phase::Idle | Phase::Bump => None,
    }
}

/// One tick of a OneShot or Sustained quake.
fn step_random_walk(slot: &mut ShakeInstance, dt: f32, rng: &mut impl Rng) -> Step {
    let Some(radius) = envelope_radius(slot, dt) else {
        slot.finished = true;
        return Step::Finished;
    };
    step_segment(slot, radius, dt, rng)
}

/// Advance the current point-to-point segment, drawing a new destination
/// inside `radius` when the previous one is done.
fn step_segment(slot: &mut ShakeInstance, radius: f32, dt: f32, rng: &mut impl Rng) -> Step {
    if slot.lerp_param <= NO_SEGMENT {
        slot.start_pos = slot.destination;
        slot.destination = random_in_disc(rng, radius);
        slot.distance = slot.start_pos.distance(slot.destination);
        slot.lerp_param = 0.0;
    } else if slot.lerp_param < 1.0 {
        if slot.move_rate > 0.0 && slot.distance > f32::EPSILON {
            let advanced = slot.lerp_param + slot.move_rate / slot.distance * dt;
            slot.lerp_param = advanced.min(1.0);
        } else {
            slot.lerp_param = 1.0;
        }
    } else {
        slot.lerp_param = NO_SEGMENT;
        return Step::Skipped;
    }
    Step::Moved(slot.start_pos.lerp(slot.destination, slot.lerp_param))
}

/// One tick of a bump: out to the destination over `[0, 1]`, back over
/// `[1, 2]`, with the curve folded so both legs share its shape.
fn step_bump(slot: &mut ShakeInstance, dt: f32) -> Step {
    if slot.lerp_param >= 2.0 {
        slot.finished = true;
        return Step::Settled;
    }

    let folded = if slot.lerp_param <= 1.0 {
        slot.lerp_param
    } else {
        2.0 - slot.lerp_param
    };
    let t = slot.bump_curve.sample(folded).clamp(0.0, 1.0);
    let offset = Vec2::ZERO.lerp(slot.destination, t);

    let advance = if slot.move_rate > 0.0 {
        slot.move_rate * dt
    } else {
        1.0
    };
    slot.lerp_param = (slot.lerp_param + advance).min(2.0);
    Step::Moved(offset)
}
