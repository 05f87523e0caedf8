//! Size over lifetime

use crate::behaviour::{Behaviour, HookContext};
use crate::curves::{Curve, CurveOptions, Keyframe, ValueRange};
use crate::easing::Easing;
use crate::particle::Particle;
use crate::render::DynamicProperties;
use ember_core::{Result, Vec2};

/// Uniform scale from a keyframe curve. Negative values clamp to 0.
pub struct ScaleCurve {
    curve: Curve,
}

impl ScaleCurve {
    pub fn new(keyframes: &[Keyframe], ease: Option<Easing>) -> Self {
        let options = CurveOptions {
            default_ease: ease,
            clamp: Some(ValueRange {
                min: 0.0,
                max: f32::INFINITY,
            }),
        };
        Self {
            curve: Curve::new(keyframes, options),
        }
    }
}

impl Behaviour for ScaleCurve {
    fn name(&self) -> &str {
        "scale_curve"
    }

    fn requires(&self) -> DynamicProperties {
        DynamicProperties::VERTEX
    }

    fn on_spawn(&self, p: &mut Particle, _ctx: &mut HookContext<'_>) -> Result<()> {
        p.scale = Vec2::splat(self.curve.sample(0.0));
        Ok(())
    }

    fn update(&self, p: &mut Particle, _dt: f32, _ctx: &mut HookContext<'_>) -> Result<()> {
        p.scale = Vec2::splat(self.curve.sample(p.age_ratio()));
        Ok(())
    }
}
