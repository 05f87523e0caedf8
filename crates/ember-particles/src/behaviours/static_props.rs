//! Properties fixed at spawn

use super::STATIC_PROPERTY_PRIORITY;
use crate::behaviour::{Behaviour, HookContext};
use crate::particle::Particle;
use crate::render::DynamicProperties;
use ember_core::{Result, Vec2};
use serde::Deserialize;

/// Angular speed in radians per second, fixed or drawn per particle.
///
/// In TOML either `speed = 1.5` or `speed = { min = -1.0, max = 1.0 }`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RotationSpeed {
    Fixed(f32),
    Range { min: f32, max: f32 },
}

impl RotationSpeed {
    fn draw(&self, ctx: &mut HookContext<'_>) -> f32 {
        match *self {
            RotationSpeed::Fixed(speed) => speed,
            RotationSpeed::Range { min, max } => ctx.rng.range(min, max),
        }
    }
}

/// Gives each particle a constant spin
pub struct StaticRotation {
    speed: RotationSpeed,
}

impl StaticRotation {
    pub fn new(speed: RotationSpeed) -> Self {
        Self { speed }
    }
}

impl Behaviour for StaticRotation {
    fn name(&self) -> &str {
        "static_rotation"
    }

    fn priority(&self) -> i32 {
        STATIC_PROPERTY_PRIORITY
    }

    fn requires(&self) -> DynamicProperties {
        DynamicProperties::ROTATION
    }

    fn on_spawn(&self, p: &mut Particle, ctx: &mut HookContext<'_>) -> Result<()> {
        p.angular_velocity = self.speed.draw(ctx);
        Ok(())
    }
}

/// Uniform scale set once at spawn
pub struct StaticScale {
    scale: f32,
}

impl StaticScale {
    pub fn new(scale: f32) -> Self {
        Self { scale }
    }
}

impl Behaviour for StaticScale {
    fn name(&self) -> &str {
        "static_scale"
    }

    fn priority(&self) -> i32 {
        STATIC_PROPERTY_PRIORITY
    }

    fn on_spawn(&self, p: &mut Particle, _ctx: &mut HookContext<'_>) -> Result<()> {
        p.scale = Vec2::splat(self.scale);
        Ok(())
    }
}
