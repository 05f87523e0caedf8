//! Ember Particles - pooled 2D particle simulation
//!
//! Provides per-emitter particle simulation with:
//! - Fixed-capacity pool; particles move between free and active lists, never allocated after fill
//! - Rate, wave and manual emission schedules with delta clamping
//! - A priority-ordered behaviour pipeline (spawn, update, kill hooks)
//! - Keyframe curves with per-segment easing
//! - Pluggable texture providers and render containers
//! - TOML effect descriptions

pub mod behaviour;
pub mod behaviours;
pub mod curves;
pub mod easing;
pub mod effect;
pub mod emitter;
pub mod particle;
pub mod rand;
pub mod render;
pub mod system;
pub mod texture;
pub mod textures;

pub use behaviour::{Behaviour, BehaviourPipeline, HookContext, DEFAULT_PRIORITY};
pub use curves::{Curve, CurveOptions, Keyframe, ValueRange};
pub use easing::Easing;
pub use effect::{BehaviourSpec, CurveSpec, EffectDescription, TextureSpec};
pub use emitter::{
    EmissionMode, Emitter, EmitterBuilder, EmitterConfig, EmitterStats, LifetimeRange,
};
pub use particle::{Particle, ParticleExtension, ParticleInstance, ParticlePool};
pub use rand::{ParticleRng, RandomSource};
pub use render::{DrawList, DynamicProperties, ParticleContainer, Placement};
pub use system::ParticleSystem;
pub use texture::{TextureAtlas, TextureProvider};
