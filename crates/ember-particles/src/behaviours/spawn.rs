//! Spawn shapes: where a particle starts

use super::SPAWN_SHAPE_PRIORITY;
use crate::behaviour::{Behaviour, HookContext};
use crate::emitter::EmitterConfig;
use crate::particle::Particle;
use ember_core::{EmberError, Result, Vec2};
use std::f32::consts::TAU;

/// Uniform position inside a circle
pub struct CircleSpawn {
    center: Vec2,
    radius: f32,
}

impl CircleSpawn {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }
}

impl Behaviour for CircleSpawn {
    fn name(&self) -> &str {
        "circle_spawn"
    }

    fn priority(&self) -> i32 {
        SPAWN_SHAPE_PRIORITY
    }

    fn init(&mut self, _config: &EmitterConfig) -> Result<()> {
        if !(self.radius >= 0.0) {
            return Err(EmberError::Behaviour(format!(
                "circle_spawn: radius must be non-negative, got {}",
                self.radius
            )));
        }
        Ok(())
    }

    fn on_spawn(&self, p: &mut Particle, ctx: &mut HookContext<'_>) -> Result<()> {
        let angle = ctx.rng.next_f32() * TAU;
        // sqrt keeps the density uniform by area
        let dist = self.radius * ctx.rng.next_f32().sqrt();
        p.position = self.center + Vec2::from_angle(angle, dist);
        Ok(())
    }
}

/// Uniform position inside an axis-aligned rectangle centred on `center`
pub struct RectangleSpawn {
    center: Vec2,
    size: Vec2,
}

impl RectangleSpawn {
    pub fn new(center: Vec2, width: f32, height: f32) -> Self {
        Self {
            center,
            size: Vec2::new(width, height),
        }
    }
}

impl Behaviour for RectangleSpawn {
    fn name(&self) -> &str {
        "rectangle_spawn"
    }

    fn priority(&self) -> i32 {
        SPAWN_SHAPE_PRIORITY
    }

    fn init(&mut self, _config: &EmitterConfig) -> Result<()> {
        if !(self.size.x >= 0.0 && self.size.y >= 0.0) {
            return Err(EmberError::Behaviour(
                "rectangle_spawn: width and height must be non-negative".into(),
            ));
        }
        Ok(())
    }

    fn on_spawn(&self, p: &mut Particle, ctx: &mut HookContext<'_>) -> Result<()> {
        let x = (ctx.rng.next_f32() - 0.5) * self.size.x;
        let y = (ctx.rng.next_f32() - 0.5) * self.size.y;
        p.position = self.center + Vec2::new(x, y);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rand::{ParticleRng, SequenceRng};
    use ember_core::TextureId;

    #[test]
    fn circle_stays_inside_radius() {
        let config = EmitterConfig::default();
        let mut rng = ParticleRng::new(11);
        let mut ctx = HookContext {
            rng: &mut rng,
            config: &config,
        };
        let shape = CircleSpawn::new(Vec2::new(10.0, -5.0), 2.0);
        let mut p = Particle::pooled(TextureId(0));
        for _ in 0..500 {
            shape.on_spawn(&mut p, &mut ctx).unwrap();
            let offset = p.position - Vec2::new(10.0, -5.0);
            assert!(offset.length() <= 2.0 + 1e-5);
        }
    }

    #[test]
    fn circle_uses_sqrt_radius() {
        let config = EmitterConfig::default();
        // angle 0, radial draw 0.25 -> distance 0.5 * radius
        let mut rng = SequenceRng::new(&[0.0, 0.25]);
        let mut ctx = HookContext {
            rng: &mut rng,
            config: &config,
        };
        let mut p = Particle::pooled(TextureId(0));
        CircleSpawn::new(Vec2::ZERO, 4.0)
            .on_spawn(&mut p, &mut ctx)
            .unwrap();
        assert!((p.position.x - 2.0).abs() < 1e-6);
        assert!(p.position.y.abs() < 1e-6);
    }

    #[test]
    fn negative_radius_fails_init() {
        let config = EmitterConfig::default();
        assert!(CircleSpawn::new(Vec2::ZERO, -1.0).init(&config).is_err());
        assert!(CircleSpawn::new(Vec2::ZERO, 0.0).init(&config).is_ok());
    }

    #[test]
    fn rectangle_is_centred() {
        let config = EmitterConfig::default();
        let mut rng = SequenceRng::new(&[0.0, 0.75]);
        let mut ctx = HookContext {
            rng: &mut rng,
            config: &config,
        };
        let mut p = Particle::pooled(TextureId(0));
        RectangleSpawn::new(Vec2::new(1.0, 1.0), 4.0, 2.0)
            .on_spawn(&mut p, &mut ctx)
            .unwrap();
        assert_eq!(p.position, Vec2::new(-1.0, 1.5));
    }
}
