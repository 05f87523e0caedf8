//! Keyframe curves sampled over normalized particle lifetime
//!
//! A curve is a piecewise function on [0, 1]. Each segment interpolates
//! linearly between its two keyframes after passing the segment-local
//! progress through an optional easing.

use crate::easing::Easing;
use serde::Deserialize;

/// Linear interpolation between two floats, exact at both ends
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Clamp to [0, 1]; NaN maps to 0
pub fn clamp01(v: f32) -> f32 {
    if !(v > 0.0) {
        0.0
    } else if v > 1.0 {
        1.0
    } else {
        v
    }
}

/// A value at a normalized time
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Keyframe {
    /// Normalized lifetime in [0, 1]
    pub time: f32,
    pub value: f32,
    /// Easing for the segment from this keyframe to the next
    #[serde(default)]
    pub ease: Option<Easing>,
}

impl Keyframe {
    pub const fn new(time: f32, value: f32) -> Self {
        Self {
            time,
            value,
            ease: None,
        }
    }

    pub fn with_ease(mut self, ease: Easing) -> Self {
        self.ease = Some(ease);
        self
    }
}

/// Inclusive output range
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CurveOptions {
    /// Used for segments whose start keyframe has no easing
    #[serde(default)]
    pub default_ease: Option<Easing>,
    /// Clamp sampled output
    #[serde(default)]
    pub clamp: Option<ValueRange>,
}

/// Normalized keyframe curve.
///
/// After construction the keyframes are sorted by time, unique per time, and
/// span exactly [0, 1]: missing endpoints copy the nearest keyframe's value.
/// An empty keyframe list yields a flat curve at 0.
#[derive(Debug, Clone)]
pub struct Curve {
    keys: Vec<Keyframe>,
    default_ease: Option<Easing>,
    clamp: Option<ValueRange>,
}

impl Curve {
    pub fn new(keyframes: &[Keyframe], options: CurveOptions) -> Self {
        let mut keys: Vec<Keyframe> = keyframes
            .iter()
            .filter(|k| k.time.is_finite())
            .map(|k| Keyframe {
                time: clamp01(k.time),
                ..*k
            })
            .collect();
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        // Later keyframes override earlier ones at the same time
        keys.dedup_by(|later, earlier| {
            if later.time == earlier.time {
                *earlier = *later;
                true
            } else {
                false
            }
        });

        if keys.is_empty() {
            keys.push(Keyframe::new(0.0, 0.0));
            keys.push(Keyframe::new(1.0, 0.0));
        }
        if keys[0].time != 0.0 {
            let first = keys[0].value;
            keys.insert(0, Keyframe::new(0.0, first));
        }
        if keys[keys.len() - 1].time != 1.0 {
            let last = keys[keys.len() - 1].value;
            keys.push(Keyframe::new(1.0, last));
        }

        Self {
            keys,
            default_ease: options.default_ease,
            clamp: options.clamp,
        }
    }

    /// Flat curve
    pub fn constant(value: f32) -> Self {
        Self::new(&[Keyframe::new(0.0, value)], CurveOptions::default())
    }

    /// Normalized keyframes (sorted, endpoints included)
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keys
    }

    /// Evaluate at `t`; inputs outside [0, 1] are clamped first.
    pub fn sample(&self, t: f32) -> f32 {
        let t = clamp01(t);
        let i = self.find_segment(t);
        let k0 = &self.keys[i];
        let k1 = &self.keys[i + 1];

        let span = k1.time - k0.time;
        if span <= 0.0 {
            return self.clamp_value(k1.value);
        }

        let mut u = clamp01((t - k0.time) / span);
        if let Some(ease) = k0.ease.or(self.default_ease) {
            u = clamp01(ease.apply(u));
        }
        self.clamp_value(lerp_f32(k0.value, k1.value, u))
    }

    fn find_segment(&self, t: f32) -> usize {
        let last_segment = self.keys.len() - 2;
        for i in 0..last_segment {
            if t <= self.keys[i + 1].time {
                return i;
            }
        }
        last_segment
    }

    fn clamp_value(&self, v: f32) -> f32 {
        match self.clamp {
            Some(range) => v.max(range.min).min(range.max),
            None => v,
        }
    }
}
