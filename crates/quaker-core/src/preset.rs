use std::collections::BTreeMap;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::curve::ResponseCurve;
use crate::error::QuakeError;

/// Defines the behavior of a quake.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuakeType {
    /// A single quake that runs through its phases once, then stops.
    #[default]
    OneShot,
    /// Quakes until `stop_sustain` is called, then fades out.
    Sustained,
    /// Pushes the camera in one direction and back.
    Bump,
}

impl QuakeType {
    /// Which engine slot this kind of quake occupies.
    pub fn slot(self) -> usize {
        match self {
            Self::Sustained => crate::engine::SUSTAINED_SLOT,
            Self::OneShot | Self::Bump => crate::engine::TRANSIENT_SLOT,
        }
    }
}

/// Where a bump's direction comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BumpMode {
    /// `bump_degrees`, counter-clockwise from +X.
    #[default]
    Degrees,
    /// `bump_direction`, normalized.
    Vector,
    /// Towards `bump_target`, a world-space position.
    Target,
}

/// Authored shake parameters. Read-only input to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuakePreset {
    /// Free-form notes for whoever tunes the preset. Not used at runtime.
    pub notes: String,
    /// Which slot the quake uses and how it ends.
    pub kind: QuakeType,
    /// How far from rest the camera may travel, in world units.
    pub magnitude: f32,
    /// Seconds to move between shake points (0 = instant).
    ///
    /// Bumps advance their 0..2 out-and-back at `100 / travel_time` per
    /// second, without the distance normalization shakes use.
    pub travel_time: f32,

    /// Ramp the shake radius up from zero before sustaining.
    pub fade_in: bool,
    /// Fade-in envelope, sampled on remaining/length.
    pub fade_in_curve: ResponseCurve,
    /// Fade-in duration in seconds.
    pub fade_in_length: f32,

    /// Seconds at full magnitude. OneShot only.
    pub sustain_length: f32,

    /// Ramp the shake radius down to zero before finishing.
    pub fade_out: bool,
    /// Fade-out envelope, sampled on remaining/length.
    pub fade_out_curve: ResponseCurve,
    /// Fade-out duration in seconds.
    pub fade_out_length: f32,

    /// Where a bump's direction comes from.
    pub bump_mode: BumpMode,
    /// Bump angle in degrees, counter-clockwise from +X.
    pub bump_degrees: f32,
    /// Bump direction; normalized before use.
    pub bump_direction: Vec2,
    /// World-space bump target; may be supplied at play time instead.
    pub bump_target: Option<Vec2>,
    /// Shape of the bump's outbound leg, mirrored on the way back.
    pub bump_curve: ResponseCurve,
}

impl Default for QuakePreset {
    fn default() -> Self {
        Self {
            notes: String::new(),
            kind: QuakeType::OneShot,
            magnitude: 0.3,
            travel_time: 1.0,
            fade_in: false,
            fade_in_curve: ResponseCurve::Linear,
            fade_in_length: 0.0,
            sustain_length: 0.0,
            fade_out: true,
            fade_out_curve: ResponseCurve::Linear,
            fade_out_length: 1.0,
            bump_mode: BumpMode::Degrees,
            bump_degrees: 0.0,
            bump_direction: Vec2::ZERO,
            bump_target: None,
            bump_curve: ResponseCurve::Linear,
        }
    }
}

impl QuakePreset {
    pub fn one_shot(magnitude: f32, sustain_length: f32) -> Self {
        Self {
            kind: QuakeType::OneShot,
            magnitude,
            sustain_length,
            ..Self::default()
        }
    }

    pub fn sustained(magnitude: f32) -> Self {
        Self {
            kind: QuakeType::Sustained,
            magnitude,
            ..Self::default()
        }
    }

    pub fn bump(magnitude: f32, mode: BumpMode) -> Self {
        Self {
            kind: QuakeType::Bump,
            magnitude,
            bump_mode: mode,
            ..Self::default()
        }
    }

    pub fn with_travel_time(mut self, travel_time: f32) -> Self {
        self.travel_time = travel_time;
        self
    }

    pub fn with_fade_in(mut self, length: f32, curve: ResponseCurve) -> Self {
        self.fade_in = true;
        self.fade_in_length = length;
        self.fade_in_curve = curve;
        self
    }

    pub fn with_fade_out(mut self, length: f32, curve: ResponseCurve) -> Self {
        self.fade_out = true;
        self.fade_out_length = length;
        self.fade_out_curve = curve;
        self
    }

    pub fn without_fade_out(mut self) -> Self {
        self.fade_out = false;
        self
    }

    pub fn with_bump_degrees(mut self, degrees: f32) -> Self {
        self.bump_degrees = degrees;
        self
    }

    pub fn with_bump_direction(mut self, direction: Vec2) -> Self {
        self.bump_direction = direction;
        self
    }

    pub fn with_bump_target(mut self, target: Vec2) -> Self {
        self.bump_target = Some(target);
        self
    }

    pub fn with_bump_curve(mut self, curve: ResponseCurve) -> Self {
        self.bump_curve = curve;
        self
    }

    /// Check that the preset can be played as-is.
    ///
    /// A Target bump without a target is reported here so that `play` can
    /// refuse it before touching any slot.
    pub fn validate(&self) -> Result<(), QuakeError> {
        if !(self.magnitude.is_finite() && self.magnitude > 0.0) {
            return Err(QuakeError::InvalidMagnitude(self.magnitude));
        }
        for (field, value) in [
            ("travel_time", self.travel_time),
            ("fade_in_length", self.fade_in_length),
            ("sustain_length", self.sustain_length),
            ("fade_out_length", self.fade_out_length),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(QuakeError::NegativeDuration { field, value });
            }
        }
        for (field, curve) in [
            ("fade_in_curve", &self.fade_in_curve),
            ("fade_out_curve", &self.fade_out_curve),
            ("bump_curve", &self.bump_curve),
        ] {
            if !curve.is_well_formed() {
                return Err(QuakeError::InvalidCurve(field));
            }
        }
        if self.kind == QuakeType::Bump
            && self.bump_mode == BumpMode::Target
            && self.bump_target.is_none()
        {
            return Err(QuakeError::MissingBumpTarget);
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PresetFile {
    presets: BTreeMap<String, QuakePreset>,
}

/// Named presets, usually loaded from a TOML file with one
/// `[presets.<name>]` table per preset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresetLibrary {
    presets: BTreeMap<String, QuakePreset>,
}

impl PresetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a library, rejecting any preset that fails validation.
    ///
    /// Target bumps are allowed to omit their target here; the target is
    /// normally supplied at play time.
    pub fn from_toml_str(contents: &str) -> Result<Self, QuakeError> {
        let file: PresetFile = toml::from_str(contents)?;
        for (name, preset) in &file.presets {
            match preset.validate() {
                Ok(()) | Err(QuakeError::MissingBumpTarget) => {},
                Err(e) => {
                    tracing::warn!(preset = %name, error = %e, "Rejected preset");
                    return Err(e);
                },
            }
        }
        tracing::info!(count = file.presets.len(), "Loaded quake presets");
        Ok(Self {
            presets: file.presets,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, QuakeError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    pub fn insert(&mut self, name: impl Into<String>, preset: QuakePreset) {
        self.presets.insert(name.into(), preset);
    }

    pub fn get(&self, name: &str) -> Result<&QuakePreset, QuakeError> {
        self.presets
            .get(name)
            .ok_or_else(|| QuakeError::UnknownPreset(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIBRARY: &str = r#"
        [presets.explosion]
        notes = "Big hit, short tail."
        kind = "one_shot"
        magnitude = 0.8
        travel_time = 0.05
        sustain_length = 0.2
        fade_out_length = 0.6
        fade_out_curve = "ease_out"

        [presets.rumble]
        kind = "sustained"
        magnitude = 0.1
        fade_in = true
        fade_in_length = 0.5

        [presets.recoil]
        kind = "bump"
        magnitude = 0.25
        travel_time = 0.1
        bump_mode = "vector"
        bump_direction = [-1.0, 0.0]

        [presets.lunge]
        kind = "bump"
        magnitude = 0.4
        bump_mode = "target"
    "#;

    #[test]
    fn library_parses_all_presets() {
        let lib = PresetLibrary::from_toml_str(LIBRARY).unwrap();
        assert_eq!(lib.len(), 4);
        assert_eq!(
            lib.names().collect::<Vec<_>>(),
            vec!["explosion", "lunge", "recoil", "rumble"]
        );

        let explosion = lib.get("explosion").unwrap();
        assert_eq!(explosion.kind, QuakeType::OneShot);
        assert_eq!(explosion.fade_out_curve, ResponseCurve::EaseOut);
        assert!(explosion.fade_out, "fade-out defaults to on");
        assert!(!explosion.fade_in);

        let recoil = lib.get("recoil").unwrap();
        assert_eq!(recoil.bump_mode, BumpMode::Vector);
        assert_eq!(recoil.bump_direction, Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn unknown_preset_is_reported_by_name() {
        let lib = PresetLibrary::from_toml_str(LIBRARY).unwrap();
        assert_eq!(
            lib.get("nope"),
            Err(QuakeError::UnknownPreset("nope".to_string()))
        );
    }

    #[test]
    fn unknown_bump_mode_is_a_parse_error() {
        let err = PresetLibrary::from_toml_str(
            r#"
            [presets.bad]
            kind = "bump"
            bump_mode = "sideways"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, QuakeError::Parse(_)), "got {err:?}");
    }

    #[test]
    fn invalid_magnitude_rejects_library() {
        let err = PresetLibrary::from_toml_str(
            r#"
            [presets.flat]
            magnitude = 0.0
            "#,
        )
        .unwrap_err();
        assert_eq!(err, QuakeError::InvalidMagnitude(0.0));
    }

    #[test]
    fn presets_can_be_added_in_code() {
        let mut lib = PresetLibrary::new();
        lib.insert("thud", QuakePreset::one_shot(0.4, 0.1));
        lib.insert("thud", QuakePreset::one_shot(0.2, 0.1));
        assert_eq!(lib.len(), 1, "insert replaces by name");
        assert_eq!(lib.get("thud").unwrap().magnitude, 0.2);
    }

    #[test]
    fn empty_library_is_fine() {
        let lib = PresetLibrary::from_toml_str("").unwrap();
        assert!(lib.is_empty());
    }

    #[test]
    fn validate_rejects_negative_durations() {
        let preset = QuakePreset::one_shot(1.0, -0.5);
        assert_eq!(
            preset.validate(),
            Err(QuakeError::NegativeDuration {
                field: "sustain_length",
                value: -0.5
            })
        );
    }

    #[test]
    fn validate_requires_target_for_target_bumps() {
        let preset = QuakePreset::bump(1.0, BumpMode::Target);
        assert_eq!(preset.validate(), Err(QuakeError::MissingBumpTarget));
        let preset = preset.with_bump_target(Vec2::new(3.0, 4.0));
        assert_eq!(preset.validate(), Ok(()));
    }

    #[test]
    fn preset_roundtrips_through_json() {
        let preset = QuakePreset::sustained(0.5)
            .with_fade_in(1.0, ResponseCurve::EaseIn)
            .with_travel_time(0.2);
        let json = serde_json::to_string(&preset).unwrap();
        let back: QuakePreset = serde_json::from_str(&json).unwrap();
        assert_eq!(back, preset);
    }

    #[test]
    fn slot_follows_category() {
        assert_eq!(QuakeType::Sustained.slot(), 0);
        assert_eq!(QuakeType::OneShot.slot(), 1);
        assert_eq!(QuakeType::Bump.slot(), 1);
    }
}
