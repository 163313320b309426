use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A single control point of a keyframed curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
}

impl Keyframe {
    pub const fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// Most authored curves have a handful of keys; these stay inline so copying
/// a curve into a slot does not allocate.
pub type Keyframes = SmallVec<[Keyframe; 4]>;

/// Response curve shaping shake amplitude or bump travel.
///
/// Treated as an opaque `[0, 1] -> [0, 1]` function: inputs are clamped to
/// the unit interval before sampling. Curves that start at 0 and end at 1
/// are the norm, but nothing enforces that.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseCurve {
    /// `f(t) = t`
    #[default]
    Linear,
    /// Slow start.
    EaseIn,
    /// Slow end.
    EaseOut,
    /// Smoothstep: slow start and end.
    EaseInOut,
    /// Same value everywhere.
    Constant(f32),
    /// Piecewise-linear through the keys; flat before the first and after
    /// the last key.
    Keyframes(Keyframes),
}

impl ResponseCurve {
    /// Build a keyframed curve, sorting keys by time. Keys with a
    /// non-finite time or value are dropped.
    pub fn keyframes(keys: impl IntoIterator<Item = Keyframe>) -> Self {
        let mut keys: Keyframes = keys
            .into_iter()
            .filter(|k| k.time.is_finite() && k.value.is_finite())
            .collect();
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self::Keyframes(keys)
    }

    /// Evaluate the curve at `t`, clamped to `[0, 1]`.
    pub fn sample(&self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Self::EaseInOut => t * t * (3.0 - 2.0 * t),
            Self::Constant(v) => *v,
            Self::Keyframes(keys) => sample_keys(keys, t),
        }
    }

    /// Keys must be finite and in non-decreasing time order.
    pub fn is_well_formed(&self) -> bool {
        match self {
            Self::Constant(v) => v.is_finite(),
            Self::Keyframes(keys) => {
                keys.iter()
                    .all(|k| k.time.is_finite() && k.value.is_finite())
                    && keys.windows(2).all(|w| w[0].time <= w[1].time)
            },
            _ => true,
        }
    }
}

fn sample_keys(keys: &[Keyframe], t: f32) -> f32 {
    let (Some(first), Some(last)) = (keys.first(), keys.last()) else {
        // No keys: behave like a linear curve.
        return t;
    };
    if t <= first.time {
        return first.value;
    }
    if t >= last.time {
        return last.value;
    }

    // First key strictly after t. Unsorted or NaN keys can put it at either
    // end, in which case the curve holds its last value.
    let upper = keys.partition_point(|k| k.time <= t);
    let (Some(a), Some(b)) = (
        upper.checked_sub(1).and_then(|i| keys.get(i)),
        keys.get(upper),
    ) else {
        return last.value;
    };
    let span = b.time - a.time;
    if span <= 0.0 {
        return b.value;
    }
    let f = (t - a.time) / span;
    a.value + (b.value - a.value) * f
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> ResponseCurve {
        ResponseCurve::keyframes([
            Keyframe::new(0.0, 0.0),
            Keyframe::new(0.5, 0.8),
            Keyframe::new(1.0, 1.0),
        ])
    }

    #[test]
    fn builtin_curves_hit_their_endpoints_exactly() {
        for curve in [
            ResponseCurve::Linear,
            ResponseCurve::EaseIn,
            ResponseCurve::EaseOut,
            ResponseCurve::EaseInOut,
        ] {
            assert_eq!(curve.sample(0.0), 0.0, "{curve:?} at 0");
            assert_eq!(curve.sample(1.0), 1.0, "{curve:?} at 1");
        }
    }

    #[test]
    fn input_is_clamped_to_unit_interval() {
        assert_eq!(ResponseCurve::Linear.sample(-1.0), 0.0);
        assert_eq!(ResponseCurve::Linear.sample(3.0), 1.0);
        assert_eq!(ResponseCurve::Linear.sample(f32::NAN), 0.0);
    }

    #[test]
    fn keyframes_interpolate_between_keys() {
        let curve = ramp();
        assert_eq!(curve.sample(0.0), 0.0);
        assert_eq!(curve.sample(0.5), 0.8);
        assert_eq!(curve.sample(1.0), 1.0);
        assert!((curve.sample(0.25) - 0.4).abs() < 1e-6);
        assert!((curve.sample(0.75) - 0.9).abs() < 1e-6);
    }

    #[test]
    fn keyframes_are_flat_outside_their_range() {
        let curve = ResponseCurve::keyframes([Keyframe::new(0.2, 0.3), Keyframe::new(0.6, 0.9)]);
        assert_eq!(curve.sample(0.0), 0.3);
        assert_eq!(curve.sample(1.0), 0.9);
    }

    #[test]
    fn keyframes_constructor_sorts() {
        let curve = ResponseCurve::keyframes([Keyframe::new(1.0, 1.0), Keyframe::new(0.0, 0.0)]);
        assert!(curve.is_well_formed());
        assert_eq!(curve.sample(0.5), 0.5);
    }

    #[test]
    fn empty_keyframes_fall_back_to_linear() {
        let curve = ResponseCurve::Keyframes(Keyframes::new());
        assert_eq!(curve.sample(0.3), 0.3);
    }

    #[test]
    fn non_finite_keys_are_dropped_by_constructor() {
        let curve = ResponseCurve::keyframes([
            Keyframe::new(-f32::NAN, 0.0),
            Keyframe::new(0.5, f32::INFINITY),
            Keyframe::new(1.0, 1.0),
        ]);
        assert!(curve.is_well_formed());
        assert_eq!(curve.sample(0.5), 1.0);
    }

    #[test]
    fn nan_key_time_does_not_panic() {
        let mut keys = Keyframes::new();
        keys.push(Keyframe::new(-f32::NAN, 0.0));
        keys.push(Keyframe::new(1.0, 1.0));
        let curve = ResponseCurve::Keyframes(keys);
        assert!(!curve.is_well_formed());
        assert_eq!(curve.sample(0.5), 1.0);
        assert_eq!(curve.sample(0.0), 1.0);
    }

    #[test]
    fn unsorted_keys_are_rejected() {
        let mut keys = Keyframes::new();
        keys.push(Keyframe::new(0.8, 0.0));
        keys.push(Keyframe::new(0.2, 1.0));
        assert!(!ResponseCurve::Keyframes(keys).is_well_formed());
        assert!(!ResponseCurve::Constant(f32::INFINITY).is_well_formed());
    }

    #[test]
    fn curves_decode_from_toml() {
        #[derive(Deserialize)]
        struct Holder {
            a: ResponseCurve,
            b: ResponseCurve,
        }
        let holder: Holder = toml::from_str(
            r#"
            a = "ease_out"
            b = { keyframes = [{ time = 0.0, value = 1.0 }, { time = 1.0, value = 0.0 }] }
            "#,
        )
        .unwrap();
        assert_eq!(holder.a, ResponseCurve::EaseOut);
        assert_eq!(holder.b.sample(0.25), 0.75);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn builtin_curves_stay_in_unit_range(t in -2.0f32..3.0) {
                for curve in [
                    ResponseCurve::Linear,
                    ResponseCurve::EaseIn,
                    ResponseCurve::EaseOut,
                    ResponseCurve::EaseInOut,
                ] {
                    let v = curve.sample(t);
                    prop_assert!((0.0..=1.0).contains(&v), "{curve:?}({t}) = {v}");
                }
            }

            #[test]
            fn keyframed_sample_is_bounded_by_key_values(
                values in proptest::collection::vec(0.0f32..1.0, 2..8),
                t in 0.0f32..=1.0,
            ) {
                let n = values.len() as f32 - 1.0;
                let curve = ResponseCurve::keyframes(
                    values.iter().enumerate().map(|(i, v)| Keyframe::new(i as f32 / n, *v)),
                );
                let lo = values.iter().copied().fold(f32::INFINITY, f32::min);
                let hi = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
                let v = curve.sample(t);
                prop_assert!(v >= lo - 1e-6 && v <= hi + 1e-6, "sample {v} outside [{lo}, {hi}]");
            }
        }
    }
}
