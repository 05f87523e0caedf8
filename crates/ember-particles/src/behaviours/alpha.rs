//! Opacity over lifetime

use crate::behaviour::{Behaviour, HookContext};
use crate::curves::{lerp_f32, Curve, CurveOptions, Keyframe, ValueRange};
use crate::easing::Easing;
use crate::particle::Particle;
use crate::render::DynamicProperties;
use ember_core::Result;

/// Linear fade from `start` to `end`
pub struct Alpha {
    start: f32,
    end: f32,
}

impl Alpha {
    pub fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }
}

impl Behaviour for Alpha {
    fn name(&self) -> &str {
        "alpha"
    }

    fn priority(&self) -> i32 {
        50
    }

    fn requires(&self) -> DynamicProperties {
        DynamicProperties::COLOR
    }

    fn on_spawn(&self, p: &mut Particle, _ctx: &mut HookContext<'_>) -> Result<()> {
        p.alpha = self.start;
        Ok(())
    }

    fn update(&self, p: &mut Particle, _dt: f32, _ctx: &mut HookContext<'_>) -> Result<()> {
        p.alpha = lerp_f32(self.start, self.end, p.age_ratio());
        Ok(())
    }
}

/// Opacity read from a keyframe curve, clamped to [0, 1]
pub struct AlphaCurve {
    curve: Curve,
}

impl AlphaCurve {
    pub fn new(keyframes: &[Keyframe], ease: Option<Easing>) -> Self {
        let options = CurveOptions {
            default_ease: ease,
            clamp: Some(ValueRange { min: 0.0, max: 1.0 }),
        };
        Self {
            curve: Curve::new(keyframes, options),
        }
    }
}

impl Behaviour for AlphaCurve {
    fn name(&self) -> &str {
        "alpha_curve"
    }

    fn requires(&self) -> DynamicProperties {
        DynamicProperties::COLOR
    }

    fn on_spawn(&self, p: &mut Particle, _ctx: &mut HookContext<'_>) -> Result<()> {
        p.alpha = self.curve.sample(0.0);
        Ok(())
    }

    fn update(&self, p: &mut Particle, _dt: f32, _ctx: &mut HookContext<'_>) -> Result<()> {
        p.alpha = self.curve.sample(p.age_ratio());
        Ok(())
    }
}
