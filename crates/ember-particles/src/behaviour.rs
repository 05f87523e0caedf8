//! Behaviour contract and the priority-ordered pipeline that dispatches it

use crate::emitter::EmitterConfig;
use crate::particle::Particle;
use crate::rand::RandomSource;
use crate::render::DynamicProperties;
use ember_core::Result;

/// Priority of behaviours that do not choose one. Negative priorities run
/// before it, positive after.
pub const DEFAULT_PRIORITY: i32 = 0;

/// What a hook can reach besides the particle itself
pub struct HookContext<'a> {
    /// The emitter's random source
    pub rng: &'a mut dyn RandomSource,
    /// The emitter's current configuration
    pub config: &'a EmitterConfig,
}

/// A modular unit of particle logic.
///
/// One instance serves every particle of its emitter, so hooks take `&self`.
/// Per-particle state belongs in [`Particle::extension`].
///
/// All hooks are optional. Errors returned from a hook propagate to whoever
/// called the emitter operation that ran it.
pub trait Behaviour {
    fn name(&self) -> &str;

    /// Lower runs earlier. Read once, at registration.
    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    /// Attributes this behaviour changes after spawn
    fn requires(&self) -> DynamicProperties {
        DynamicProperties::empty()
    }

    /// Called once when registered on an emitter
    fn init(&mut self, _config: &EmitterConfig) -> Result<()> {
        Ok(())
    }

    /// Called after the particle's base reset on every spawn
    fn on_spawn(&self, _p: &mut Particle, _ctx: &mut HookContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Called every frame after base integration; `dt` is already clamped
    fn update(&self, _p: &mut Particle, _dt: f32, _ctx: &mut HookContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Called when the particle is recycled
    fn on_kill(&self, _p: &mut Particle, _ctx: &mut HookContext<'_>) -> Result<()> {
        Ok(())
    }
}

struct PipelineEntry {
    behaviour: Box<dyn Behaviour>,
    priority: i32,
    order: usize,
}

/// Behaviours sorted by (priority, registration order).
///
/// Spawn and update run front to back; kill runs back to front so teardown
/// mirrors initialization.
#[derive(Default)]
pub struct BehaviourPipeline {
    entries: Vec<PipelineEntry>,
    next_order: usize,
}

impl BehaviourPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize and register a behaviour, keeping the pipeline sorted
    pub fn add(&mut self, mut behaviour: Box<dyn Behaviour>, config: &EmitterConfig) -> Result<()> {
        behaviour.init(config)?;
        let priority = behaviour.priority();
        self.entries.push(PipelineEntry {
            behaviour,
            priority,
            order: self.next_order,
        });
        self.next_order += 1;
        // Stable sort; the order tiebreak keeps it stable across re-sorts too
        self.entries.sort_by_key(|e| (e.priority, e.order));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Behaviour names in execution order
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.behaviour.name())
    }

    /// (name, priority) pairs in execution order
    pub fn ordered(&self) -> impl Iterator<Item = (&str, i32)> + '_ {
        self.entries
            .iter()
            .map(|e| (e.behaviour.name(), e.priority))
    }

    /// Union of every registered behaviour's requirements
    pub fn requires(&self) -> DynamicProperties {
        self.entries
            .iter()
            .fold(DynamicProperties::empty(), |acc, e| acc | e.behaviour.requires())
    }

    pub fn spawn(&self, p: &mut Particle, ctx: &mut HookContext<'_>) -> Result<()> {
        for entry in &self.entries {
            entry.behaviour.on_spawn(p, ctx)?;
        }
        Ok(())
    }

    pub fn update(&self, p: &mut Particle, dt: f32, ctx: &mut HookContext<'_>) -> Result<()> {
        for entry in &self.entries {
            entry.behaviour.update(p, dt, ctx)?;
        }
        Ok(())
    }

    pub fn kill(&self, p: &mut Particle, ctx: &mut HookContext<'_>) -> Result<()> {
        for entry in self.entries.iter().rev() {
            entry.behaviour.on_kill(p, ctx)?;
        }
        Ok(())
    }
}
