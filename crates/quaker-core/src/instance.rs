use glam::Vec2;

use crate::curve::ResponseCurve;
use crate::error::QuakeError;
use crate::preset::{BumpMode, QuakePreset, QuakeType};

/// Sentinel for `lerp_param`: no active segment, draw a new destination.
pub const NO_SEGMENT: f32 = -1.0;

/// Which part of its lifetime a slot is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Finished, or every phase exhausted (finishes on the next tick).
    Idle,
    FadeIn,
    Sustain,
    FadeOut,
    /// Travelling out to the bump destination or back.
    Bump,
}

/// Runtime state of one engine slot.
///
/// Allocated once per slot and reinitialized in place by
/// [`ShakeInstance::set_parameters`] every time a preset is played into it.
#[derive(Debug, Clone, PartialEq)]
pub struct ShakeInstance {
    /// True when the slot is idle and has no effect.
    pub finished: bool,
    /// True while a Sustained quake should keep looping its sustain phase.
    pub sustained: bool,
    /// Kind of the preset last played into this slot.
    pub kind: QuakeType,
    /// Maximum offset length, in world units.
    pub magnitude: f32,
    /// Progress per second across one segment; 0 snaps instantly.
    pub move_rate: f32,
    /// Segment progress in `[-1, 2]`; see [`NO_SEGMENT`].
    pub lerp_param: f32,

    /// Whether the fade-in phase runs at all.
    pub fade_in: bool,
    /// Fade-in duration in seconds.
    pub fade_in_length: f32,
    /// Seconds of fade-in left.
    pub fade_in_remaining: f32,
    /// Sustain duration in seconds (OneShot only).
    pub sustain_length: f32,
    /// Seconds of sustain left.
    pub sustain_remaining: f32,
    /// Whether the fade-out phase runs at all.
    pub fade_out: bool,
    /// Fade-out duration in seconds.
    pub fade_out_length: f32,
    /// Seconds of fade-out left.
    pub fade_out_remaining: f32,

    /// Envelope curves and bump shape, copied from the preset.
    pub fade_in_curve: ResponseCurve,
    pub fade_out_curve: ResponseCurve,
    pub bump_curve: ResponseCurve,

    /// Where the current segment started, relative to the rig.
    pub start_pos: Vec2,
    /// Segment end point, or the bump's turnaround point.
    pub destination: Vec2,
    /// `|destination - start_pos|`, refreshed whenever a destination is drawn.
    pub distance: f32,
    /// Last offset this slot produced.
    pub offset: Vec2,
}

impl Default for ShakeInstance {
    fn default() -> Self {
        Self {
            finished: true,
            sustained: false,
            kind: QuakeType::OneShot,
            magnitude: 0.0,
            move_rate: 0.0,
            lerp_param: NO_SEGMENT,
            fade_in: false,
            fade_in_length: 0.0,
            fade_in_remaining: 0.0,
            sustain_length: 0.0,
            sustain_remaining: 0.0,
            fade_out: false,
            fade_out_length: 0.0,
            fade_out_remaining: 0.0,
            fade_in_curve: ResponseCurve::Linear,
            fade_out_curve: ResponseCurve::Linear,
            bump_curve: ResponseCurve::Linear,
            start_pos: Vec2::ZERO,
            destination: Vec2::ZERO,
            distance: 0.0,
            offset: Vec2::ZERO,
        }
    }
}

/// `100 / travel_time`, or 0 for instant travel.
pub fn move_rate(travel_time: f32) -> f32 {
    if travel_time <= 0.0 {
        0.0
    } else {
        100.0 / travel_time
    }
}

/// Resolve a bump's destination: the bump direction scaled to `magnitude`.
///
/// `target` is the world-space target for [`BumpMode::Target`]; the
/// direction is taken relative to `camera_world`. A zero direction stays
/// zero rather than producing NaN.
pub fn bump_destination(
    preset: &QuakePreset,
    target: Option<Vec2>,
    camera_world: Vec2,
) -> Result<Vec2, QuakeError> {
    let direction = match preset.bump_mode {
        BumpMode::Degrees => Vec2::from_angle(preset.bump_degrees.to_radians()),
        BumpMode::Vector => preset.bump_direction,
        BumpMode::Target => target.ok_or(QuakeError::MissingBumpTarget)? - camera_world,
    };
    Ok(direction.normalize_or_zero() * preset.magnitude)
}

impl ShakeInstance {
    /// Reinitialize this slot from `preset`.
    ///
    /// `bump_target` is the effective world-space bump target (the preset's
    /// own target or an override); `camera_world` is the camera's current
    /// world position. On error the instance is left exactly as it was.
    pub fn set_parameters(
        &mut self,
        preset: &QuakePreset,
        bump_target: Option<Vec2>,
        camera_world: Vec2,
    ) -> Result<(), QuakeError> {
        let bump = if preset.kind == QuakeType::Bump {
            Some(bump_destination(preset, bump_target, camera_world)?)
        } else {
            None
        };

        self.finished = false;
        self.sustained = false;
        self.kind = preset.kind;
        self.magnitude = preset.magnitude;
        self.move_rate = move_rate(preset.travel_time);
        self.lerp_param = NO_SEGMENT;
        self.start_pos = Vec2::ZERO;
        self.destination = Vec2::ZERO;
        self.distance = 0.0;
        self.offset = Vec2::ZERO;

        self.fade_in = false;
        self.fade_in_length = 0.0;
        self.fade_in_remaining = 0.0;
        self.sustain_length = 0.0;
        self.sustain_remaining = 0.0;
        self.fade_out = false;
        self.fade_out_length = 0.0;
        self.fade_out_remaining = 0.0;
        self.fade_in_curve = ResponseCurve::Linear;
        self.fade_out_curve = ResponseCurve::Linear;
        self.bump_curve = ResponseCurve::Linear;

        match preset.kind {
            QuakeType::OneShot | QuakeType::Sustained => {
                self.copy_fades(preset);
                if preset.kind == QuakeType::OneShot {
                    self.sustain_length = preset.sustain_length;
                    self.sustain_remaining = preset.sustain_length;
                } else {
                    self.sustained = true;
                }
            },
            QuakeType::Bump => {
                self.bump_curve.clone_from(&preset.bump_curve);
                self.destination = bump.unwrap_or_default();
            },
        }
        Ok(())
    }

    fn copy_fades(&mut self, preset: &QuakePreset) {
        self.fade_in = preset.fade_in;
        self.fade_in_curve.clone_from(&preset.fade_in_curve);
        self.fade_in_length = preset.fade_in_length;
        self.fade_in_remaining = preset.fade_in_length;

        self.fade_out = preset.fade_out;
        self.fade_out_curve.clone_from(&preset.fade_out_curve);
        self.fade_out_length = preset.fade_out_length;
        self.fade_out_remaining = preset.fade_out_length;
    }

    /// The phase that governs the next tick. Checked in priority order:
    /// fade-in, sustain, fade-out. Zero-length phases are skipped.
    pub fn phase(&self) -> Phase {
        if self.finished {
            return Phase::Idle;
        }
        if self.kind == QuakeType::Bump {
            return Phase::Bump;
        }
        if self.fade_in && self.fade_in_remaining > 0.0 {
            Phase::FadeIn
        } else if self.sustain_remaining > 0.0 || self.sustained {
            Phase::Sustain
        } else if self.fade_out && self.fade_out_remaining > 0.0 {
            Phase::FadeOut
        } else {
            Phase::Idle
        }
    }

    /// True when the slot holds a Sustained quake that is still looping.
    pub fn is_looping(&self) -> bool {
        !self.finished && self.kind == QuakeType::Sustained && self.sustained
    }
}
