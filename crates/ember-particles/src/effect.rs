//! Whole effects described in TOML
//!
//! ```toml
//! name = "sparks"
//! textures = ["spark", "ember"]
//!
//! [emitter]
//! max_particles = 200
//! rate_per_second = 40
//!
//! [texture]
//! kind = "weighted"
//! items = [{ texture = "spark", weight = 3 }, { texture = "ember", weight = 1 }]
//!
//! [[behaviours]]
//! type = "radial_burst"
//! min_speed = 40
//! max_speed = 80
//! ```

use crate::behaviour::Behaviour;
use crate::behaviours::{
    Alpha, AlphaCurve, CircleSpawn, GravityCurve, MovementCurve, RadialBurst, RectangleSpawn,
    RotationSpeed, ScaleCurve, StaticRotation, StaticScale,
};
use crate::curves::{Curve, CurveOptions, Keyframe, ValueRange};
use crate::easing::Easing;
use crate::emitter::{Emitter, EmitterConfig};
use crate::rand::RandomSource;
use crate::texture::{TextureAtlas, TextureProvider};
use crate::textures::{
    AnimatedTextureOptions, AnimatedTextureProvider, SingleTextureProvider, WeightedTexture,
    WeightedTextureProvider,
};
use ember_core::{EmberError, Result, Vec2};
use log::debug;
use serde::Deserialize;
use std::path::Path;

/// A curve in TOML: either a bare number or a keyframe table
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CurveSpec {
    Constant(f32),
    Keyframes {
        keyframes: Vec<Keyframe>,
        #[serde(default)]
        ease: Option<Easing>,
        #[serde(default)]
        clamp: Option<ValueRange>,
    },
}

impl CurveSpec {
    pub fn build(&self) -> Curve {
        match self {
            CurveSpec::Constant(value) => Curve::constant(*value),
            CurveSpec::Keyframes {
                keyframes,
                ease,
                clamp,
            } => Curve::new(
                keyframes,
                CurveOptions {
                    default_ease: *ease,
                    clamp: *clamp,
                },
            ),
        }
    }
}

/// Which texture provider to build, tagged by `kind`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TextureSpec {
    Single {
        texture: String,
    },
    Weighted {
        items: Vec<WeightedTexture>,
        /// Defaults to the first item
        #[serde(default)]
        fallback: Option<String>,
    },
    Animated(AnimatedTextureOptions),
}

fn default_spread() -> f32 {
    360.0
}

/// One `[[behaviours]]` entry, tagged by `type`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BehaviourSpec {
    CircleSpawn {
        #[serde(default)]
        center: Vec2,
        radius: f32,
    },
    RectangleSpawn {
        #[serde(default)]
        center: Vec2,
        width: f32,
        height: f32,
    },
    StaticRotation {
        speed: RotationSpeed,
    },
    StaticScale {
        scale: f32,
    },
    MovementCurve {
        vx: CurveSpec,
        vy: CurveSpec,
    },
    GravityCurve {
        #[serde(default)]
        gx: f32,
        gy: f32,
        #[serde(default)]
        strength: Option<CurveSpec>,
    },
    RadialBurst {
        min_speed: f32,
        max_speed: f32,
        /// Degrees, 0 along +x
        #[serde(default)]
        direction: f32,
        #[serde(default = "default_spread")]
        spread: f32,
    },
    Alpha {
        start: f32,
        end: f32,
    },
    AlphaCurve {
        keyframes: Vec<Keyframe>,
        #[serde(default)]
        ease: Option<Easing>,
    },
    ScaleCurve {
        keyframes: Vec<Keyframe>,
        #[serde(default)]
        ease: Option<Easing>,
    },
}

impl BehaviourSpec {
    pub fn build(&self) -> Box<dyn Behaviour> {
        match self {
            BehaviourSpec::CircleSpawn { center, radius } => {
                Box::new(CircleSpawn::new(*center, *radius))
            }
            BehaviourSpec::RectangleSpawn {
                center,
                width,
                height,
            } => Box::new(RectangleSpawn::new(*center, *width, *height)),
            BehaviourSpec::StaticRotation { speed } => Box::new(StaticRotation::new(*speed)),
            BehaviourSpec::StaticScale { scale } => Box::new(StaticScale::new(*scale)),
            BehaviourSpec::MovementCurve { vx, vy } => {
                Box::new(MovementCurve::new(vx.build(), vy.build()))
            }
            BehaviourSpec::GravityCurve { gx, gy, strength } => {
                let strength = strength
                    .as_ref()
                    .map(CurveSpec::build)
                    .unwrap_or_else(|| Curve::constant(1.0));
                Box::new(GravityCurve::new(Vec2::new(*gx, *gy), strength))
            }
            BehaviourSpec::RadialBurst {
                min_speed,
                max_speed,
                direction,
                spread,
            } => Box::new(RadialBurst::new(*min_speed, *max_speed, *direction, *spread)),
            BehaviourSpec::Alpha { start, end } => Box::new(Alpha::new(*start, *end)),
            BehaviourSpec::AlphaCurve { keyframes, ease } => {
                Box::new(AlphaCurve::new(keyframes, *ease))
            }
            BehaviourSpec::ScaleCurve { keyframes, ease } => {
                Box::new(ScaleCurve::new(keyframes, *ease))
            }
        }
    }
}

/// A complete effect: emitter settings, textures and behaviours
#[derive(Debug, Clone, Deserialize)]
pub struct EffectDescription {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub emitter: EmitterConfig,
    /// Texture names to register, in handle order
    #[serde(default)]
    pub textures: Vec<String>,
    pub texture: TextureSpec,
    /// Registration order; the pipeline re-sorts by priority
    #[serde(default)]
    pub behaviours: Vec<BehaviourSpec>,
}

impl EffectDescription {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let effect = Self::from_toml_str(&source)?;
        debug!(
            "Loaded effect '{}' from {} ({} behaviours)",
            effect.display_name(),
            path.display(),
            effect.behaviours.len()
        );
        Ok(effect)
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed")
    }

    /// Atlas holding every name in `textures`
    pub fn atlas(&self) -> TextureAtlas {
        self.textures.iter().collect()
    }

    pub fn build_texture_provider(&self, atlas: &TextureAtlas) -> Result<Box<dyn TextureProvider>> {
        let provider: Box<dyn TextureProvider> = match &self.texture {
            TextureSpec::Single { texture } => {
                Box::new(SingleTextureProvider::from_atlas(atlas, texture)?)
            }
            TextureSpec::Weighted { items, fallback } => {
                let fallback = fallback
                    .as_deref()
                    .or_else(|| items.first().map(|item| item.texture.as_str()))
                    .ok_or_else(|| {
                        EmberError::Config("weighted texture needs at least one item".into())
                    })?;
                Box::new(WeightedTextureProvider::from_atlas(atlas, items, fallback)?)
            }
            TextureSpec::Animated(options) => {
                Box::new(AnimatedTextureProvider::from_atlas(atlas, options)?)
            }
        };
        Ok(provider)
    }

    pub fn build_behaviours(&self) -> Vec<Box<dyn Behaviour>> {
        self.behaviours.iter().map(BehaviourSpec::build).collect()
    }

    /// Build a ready emitter drawing into a `DrawList`
    pub fn build(&self, atlas: &TextureAtlas, rng: impl RandomSource + 'static) -> Result<Emitter> {
        let textures = self.build_texture_provider(atlas)?;
        let mut builder = Emitter::builder(self.emitter.clone()).rng(rng);
        for behaviour in self.build_behaviours() {
            builder = builder.boxed_behaviour(behaviour);
        }
        builder.build(textures)
    }
}
