//! Velocity sources

use crate::behaviour::{Behaviour, HookContext, DEFAULT_PRIORITY};
use crate::curves::Curve;
use crate::emitter::EmitterConfig;
use crate::particle::Particle;
use crate::render::DynamicProperties;
use ember_core::{EmberError, Result, Vec2};

/// Velocity read from two curves over the particle's life. Overwrites
/// whatever velocity earlier behaviours set.
pub struct MovementCurve {
    vx: Curve,
    vy: Curve,
}

impl MovementCurve {
    pub fn new(vx: Curve, vy: Curve) -> Self {
        Self { vx, vy }
    }

    fn velocity_at(&self, t: f32) -> Vec2 {
        Vec2::new(self.vx.sample(t), self.vy.sample(t))
    }
}

impl Behaviour for MovementCurve {
    fn name(&self) -> &str {
        "movement_curve"
    }

    fn priority(&self) -> i32 {
        -10
    }

    fn requires(&self) -> DynamicProperties {
        DynamicProperties::POSITION
    }

    fn on_spawn(&self, p: &mut Particle, _ctx: &mut HookContext<'_>) -> Result<()> {
        p.velocity = self.velocity_at(0.0);
        Ok(())
    }

    fn update(&self, p: &mut Particle, _dt: f32, _ctx: &mut HookContext<'_>) -> Result<()> {
        p.velocity = self.velocity_at(p.age_ratio());
        Ok(())
    }
}

/// Constant acceleration scaled by a strength curve
pub struct GravityCurve {
    gravity: Vec2,
    strength: Curve,
}

impl GravityCurve {
    pub fn new(gravity: Vec2, strength: Curve) -> Self {
        Self { gravity, strength }
    }
}

impl Behaviour for GravityCurve {
    fn name(&self) -> &str {
        "gravity_curve"
    }

    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    fn requires(&self) -> DynamicProperties {
        DynamicProperties::POSITION
    }

    fn update(&self, p: &mut Particle, dt: f32, _ctx: &mut HookContext<'_>) -> Result<()> {
        let strength = self.strength.sample(p.age_ratio());
        p.velocity += self.gravity * (strength * dt);
        Ok(())
    }
}

/// Launch velocity inside a cone. Angles are in degrees; 0 points along +x.
pub struct RadialBurst {
    min_speed: f32,
    max_speed: f32,
    direction: f32,
    spread: f32,
}

impl RadialBurst {
    /// `spread` is the full cone width; 360 fires in every direction
    pub fn new(min_speed: f32, max_speed: f32, direction: f32, spread: f32) -> Self {
        Self {
            min_speed,
            max_speed,
            direction,
            spread,
        }
    }
}

impl Behaviour for RadialBurst {
    fn name(&self) -> &str {
        "radial_burst"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn requires(&self) -> DynamicProperties {
        DynamicProperties::POSITION
    }

    fn init(&mut self, _config: &EmitterConfig) -> Result<()> {
        if self.min_speed > self.max_speed {
            return Err(EmberError::Behaviour(format!(
                "radial_burst: min_speed {} exceeds max_speed {}",
                self.min_speed, self.max_speed
            )));
        }
        Ok(())
    }

    fn on_spawn(&self, p: &mut Particle, ctx: &mut HookContext<'_>) -> Result<()> {
        let offset = (ctx.rng.next_f32() - 0.5) * self.spread;
        let angle = (self.direction + offset).to_radians();
        let speed = ctx.rng.range(self.min_speed, self.max_speed);
        p.velocity = Vec2::from_angle(angle, speed);
        Ok(())
    }
}
