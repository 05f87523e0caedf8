//! Easing functions applied to normalized segment progress

use serde::Deserialize;
use std::f32::consts::PI;

/// Maps progress in [0, 1] to adjusted progress.
///
/// Named variants deserialize from snake_case strings (`"quad_in"`); `Custom`
/// only exists in code.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    SineIn,
    SineOut,
    SineInOut,
    SmoothStep,
    #[serde(skip)]
    Custom(fn(f32) -> f32),
}

impl Easing {
    pub fn apply(&self, u: f32) -> f32 {
        match self {
            Easing::Linear => u,
            Easing::QuadIn => u * u,
            Easing::QuadOut => u * (2.0 - u),
            Easing::QuadInOut => {
                if u < 0.5 {
                    2.0 * u * u
                } else {
                    1.0 - (-2.0 * u + 2.0).powi(2) / 2.0
                }
            }
            Easing::CubicIn => u * u * u,
            Easing::CubicOut => 1.0 - (1.0 - u).powi(3),
            Easing::CubicInOut => {
                if u < 0.5 {
                    4.0 * u * u * u
                } else {
                    1.0 - (-2.0 * u + 2.0).powi(3) / 2.0
                }
            }
            Easing::SineIn => 1.0 - (u * PI / 2.0).cos(),
            Easing::SineOut => (u * PI / 2.0).sin(),
            Easing::SineInOut => -((PI * u).cos() - 1.0) / 2.0,
            Easing::SmoothStep => u * u * (3.0 - 2.0 * u),
            Easing::Custom(f) => f(u),
        }
    }
}
