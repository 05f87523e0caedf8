//! Emitter configuration (parsed from TOML) and runtime state

use crate::behaviour::{Behaviour, BehaviourPipeline, HookContext};
use crate::particle::{Particle, ParticlePool};
use crate::rand::{ParticleRng, RandomSource};
use crate::render::{DrawList, DynamicProperties, ParticleContainer, Placement};
use crate::texture::TextureProvider;
use ember_core::{EmberError, Result};
use log::{debug, trace};
use serde::Deserialize;

/// Wave interval used when wave mode is configured without one
pub const DEFAULT_WAVE_INTERVAL: f32 = 0.25;

/// Largest delta a single tick may integrate
pub const DEFAULT_MAX_DELTA: f32 = 0.1;

/// How an emitter issues spawns on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmissionMode {
    /// Continuous, `rate_per_second` particles per second
    #[default]
    Rate,
    /// `particles_per_wave` particles every `wave_interval` seconds
    Wave,
    /// Only `emit_burst` / `emit_wave` spawn
    Manual,
}

/// Lifetime range in seconds; each spawn draws uniformly from it
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LifetimeRange {
    pub min: f32,
    pub max: f32,
}

impl LifetimeRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// An inverted range has zero span and always yields `min`
    pub fn sample(&self, rng: &mut dyn RandomSource) -> f32 {
        self.min + rng.next_f32() * (self.max - self.min).max(0.0)
    }
}

impl Default for LifetimeRange {
    fn default() -> Self {
        Self { min: 1.0, max: 2.0 }
    }
}

/// Configuration parsed from an `[emitter]` TOML table
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Pool size, and so the hard cap on live particles
    pub max_particles: usize,
    pub mode: EmissionMode,
    pub rate_per_second: Option<f32>,
    pub wave_interval: Option<f32>,
    pub particles_per_wave: Option<u32>,
    pub lifetime: LifetimeRange,
    pub emitting: bool,
    pub max_delta_seconds: f32,
    /// Register new particles behind existing ones instead of in front
    pub add_at_back: bool,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            max_particles: 256,
            mode: EmissionMode::Rate,
            rate_per_second: None,
            wave_interval: None,
            particles_per_wave: None,
            lifetime: LifetimeRange::default(),
            emitting: true,
            max_delta_seconds: DEFAULT_MAX_DELTA,
            add_at_back: false,
        }
    }
}

impl EmitterConfig {
    /// Parse an EmitterConfig from a TOML string
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Rate in particles per second; unset means no rate emission
    pub fn rate(&self) -> f32 {
        self.rate_per_second.unwrap_or(0.0)
    }

    pub fn wave_interval(&self) -> f32 {
        self.wave_interval.unwrap_or(DEFAULT_WAVE_INTERVAL)
    }

    pub fn particles_per_wave(&self) -> u32 {
        self.particles_per_wave.unwrap_or(1)
    }
}

/// Lifetime counters for one emitter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitterStats {
    pub spawned: u64,
    /// Spawn requests that found the pool empty
    pub dropped: u64,
    pub killed: u64,
}

/// Owns a particle pool and decides when particles spawn and die.
///
/// Each `update` clamps the delta, runs the emission schedule, then makes
/// one backward pass over the active particles: texture update, base
/// integration, behaviour updates, and a kill once `age >= life`.
pub struct Emitter<C: ParticleContainer = DrawList> {
    config: EmitterConfig,
    pool: ParticlePool,
    pipeline: BehaviourPipeline,
    textures: Box<dyn TextureProvider>,
    container: C,
    rng: Box<dyn RandomSource>,
    dynamic: DynamicProperties,
    emit_acc: f32,
    wave_acc: f32,
    ticker_attached: bool,
    stats: EmitterStats,
}

/// Collects behaviours and collaborators before the pool is filled
pub struct EmitterBuilder<C: ParticleContainer = DrawList> {
    config: EmitterConfig,
    behaviours: Vec<Box<dyn Behaviour>>,
    rng: Option<Box<dyn RandomSource>>,
    container: C,
}

impl Emitter<DrawList> {
    pub fn builder(config: EmitterConfig) -> EmitterBuilder<DrawList> {
        EmitterBuilder {
            config,
            behaviours: Vec::new(),
            rng: None,
            container: DrawList::new(),
        }
    }

    /// Emitter with no behaviours, drawing into a [`DrawList`]
    pub fn new(config: EmitterConfig, textures: Box<dyn TextureProvider>) -> Result<Self> {
        Self::builder(config).build(textures)
    }
}

impl<C: ParticleContainer> EmitterBuilder<C> {
    /// Append a behaviour. Registration order breaks priority ties.
    pub fn behaviour(self, behaviour: impl Behaviour + 'static) -> Self {
        self.boxed_behaviour(Box::new(behaviour))
    }

    pub fn boxed_behaviour(mut self, behaviour: Box<dyn Behaviour>) -> Self {
        self.behaviours.push(behaviour);
        self
    }

    /// Random source for every draw this emitter makes. Defaults to a
    /// time-seeded [`ParticleRng`].
    pub fn rng(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Some(Box::new(rng));
        self
    }

    pub fn container<D: ParticleContainer>(self, container: D) -> EmitterBuilder<D> {
        EmitterBuilder {
            config: self.config,
            behaviours: self.behaviours,
            rng: self.rng,
            container,
        }
    }

    pub fn build(self, textures: Box<dyn TextureProvider>) -> Result<Emitter<C>> {
        let EmitterBuilder {
            config,
            behaviours,
            rng,
            mut container,
        } = self;

        if config.max_particles == 0 {
            return Err(EmberError::Config(
                "emitter capacity must be at least 1".into(),
            ));
        }

        let mut pipeline = BehaviourPipeline::new();
        for behaviour in behaviours {
            pipeline.add(behaviour, &config)?;
        }

        let dynamic = pipeline.requires() | textures.requires();
        container.configure(config.max_particles, dynamic);

        let pool = ParticlePool::new(config.max_particles, || textures.initial_texture());

        debug!(
            "Emitter: capacity {}, mode {:?}, dynamic [{}], pipeline [{}]",
            config.max_particles,
            config.mode,
            dynamic.attribute_names().join(", "),
            pipeline.names().collect::<Vec<_>>().join(", ")
        );

        let ticker_attached = config.mode != EmissionMode::Manual;
        Ok(Emitter {
            config,
            pool,
            pipeline,
            textures,
            container,
            rng: rng.unwrap_or_else(|| Box::new(ParticleRng::from_time())),
            dynamic,
            emit_acc: 0.0,
            wave_acc: 0.0,
            ticker_attached,
            stats: EmitterStats::default(),
        })
    }
}

impl<C: ParticleContainer> Emitter<C> {
    /// Advance the simulation by one frame
    pub fn update(&mut self, dt: f32) -> Result<()> {
        let max = self.config.max_delta_seconds;
        let dt = if dt > max { max } else { dt };
        // Also rejects NaN
        if !(dt > 0.0) {
            return Ok(());
        }

        if self.config.emitting {
            match self.config.mode {
                EmissionMode::Rate => self.emit_rate(dt)?,
                EmissionMode::Wave => self.emit_waves(dt)?,
                EmissionMode::Manual => {}
            }
        }

        // Backward: a swap-removed kill moves an already-visited particle
        // into the current index
        let mut index = self.pool.active_count();
        while index > 0 {
            index -= 1;
            let slot = self.pool.active_slot(index);
            let p = self.pool.get_mut(slot);

            self.textures.update(p, dt);

            p.age += dt;
            p.position += p.velocity * dt;
            p.rotation += p.angular_velocity * dt;

            let mut ctx = HookContext {
                rng: self.rng.as_mut(),
                config: &self.config,
            };
            self.pipeline.update(p, dt, &mut ctx)?;

            if p.age >= p.life {
                self.kill_at(index)?;
            }
        }
        Ok(())
    }

    fn emit_rate(&mut self, dt: f32) -> Result<()> {
        let rate = self.config.rate();
        // Frozen while the rate is non-positive or non-finite, so no backlog
        // builds up
        if !(rate > 0.0 && rate.is_finite()) {
            return Ok(());
        }
        self.emit_acc += dt;
        let owed = (self.emit_acc * rate).floor();
        if owed < 1.0 {
            return Ok(());
        }
        self.emit_acc -= owed / rate;
        self.spawn_capped(owed as u64)?;
        Ok(())
    }

    fn emit_waves(&mut self, dt: f32) -> Result<()> {
        let interval = self.config.wave_interval();
        let per_wave = self.config.particles_per_wave();
        if !(interval > 0.0 && interval.is_finite()) || per_wave == 0 {
            return Ok(());
        }
        self.wave_acc += dt;
        // Counted up front: repeated subtraction stalls once the interval
        // drops below the accumulator's precision
        let waves = (self.wave_acc / interval).floor();
        if waves < 1.0 {
            return Ok(());
        }
        self.wave_acc = (self.wave_acc - waves * interval).max(0.0);
        let requested = (waves as u64).saturating_mul(u64::from(per_wave));
        self.spawn_capped(requested)?;
        Ok(())
    }

    /// Attempt at most as many spawns as the pool can supply; the rest of
    /// `requested` is counted as dropped without touching the pool
    fn spawn_capped(&mut self, requested: u64) -> Result<usize> {
        let available = self.pool.pooled_count() as u64;
        let attempts = requested.min(available);
        let excess = requested - attempts;
        if excess > 0 {
            self.stats.dropped = self.stats.dropped.saturating_add(excess);
            trace!("Emitter: pool exhausted, {excess} spawns dropped");
        }
        let mut spawned = 0;
        for _ in 0..attempts {
            if self.spawn_one()? {
                spawned += 1;
            }
        }
        Ok(spawned)
    }

    /// Returns false when the pool is empty
    fn spawn_one(&mut self) -> Result<bool> {
        let Some(slot) = self.pool.acquire() else {
            self.stats.dropped += 1;
            trace!(
                "Emitter: pool exhausted ({} active), spawn dropped",
                self.pool.active_count()
            );
            return Ok(false);
        };

        let p = self.pool.get_mut(slot);
        if let Some(texture) = self.textures.texture_for_spawn(p, self.rng.as_mut()) {
            p.texture = texture;
        }
        p.reset_for_spawn();

        let mut ctx = HookContext {
            rng: self.rng.as_mut(),
            config: &self.config,
        };
        if let Err(err) = self.pipeline.spawn(p, &mut ctx) {
            p.reset_pooled();
            self.pool.release(slot);
            return Err(err);
        }

        let placement = if self.config.add_at_back {
            Placement::Back
        } else {
            Placement::Front
        };
        self.container.add_particle(slot, placement);
        p.life = self.config.lifetime.sample(self.rng.as_mut());
        self.pool.activate(slot);
        self.stats.spawned += 1;
        Ok(true)
    }

    /// Kill the particle at `index` of the active list. A failing kill hook
    /// leaves it active.
    fn kill_at(&mut self, index: usize) -> Result<()> {
        let slot = self.pool.active_slot(index);
        let p = self.pool.get_mut(slot);

        let mut ctx = HookContext {
            rng: self.rng.as_mut(),
            config: &self.config,
        };
        self.pipeline.kill(p, &mut ctx)?;
        self.textures.on_kill(p);
        p.reset_pooled();

        self.container.remove_particle(slot);
        self.pool.deactivate_at(index);
        self.stats.killed += 1;
        Ok(())
    }

    /// Spawn up to `count` particles now, regardless of mode. Returns how
    /// many the pool could supply.
    pub fn emit_burst(&mut self, count: u32) -> Result<usize> {
        self.spawn_capped(u64::from(count))
    }

    /// Spawn one configured wave now, regardless of mode
    pub fn emit_wave(&mut self) -> Result<usize> {
        self.spawn_capped(u64::from(self.config.particles_per_wave()))
    }

    /// Kill every active particle and reset both accumulators
    pub fn clear_all(&mut self) -> Result<()> {
        let count = self.pool.active_count();
        while self.pool.active_count() > 0 {
            self.kill_at(self.pool.active_count() - 1)?;
        }
        self.emit_acc = 0.0;
        self.wave_acc = 0.0;
        debug!("Emitter: cleared {} particles", count);
        Ok(())
    }

    /// Switch emission mode. Only the ticker subscription changes; live
    /// particles and accumulators are untouched.
    pub fn set_mode(&mut self, mode: EmissionMode) {
        if mode == self.config.mode {
            return;
        }
        debug!("Emitter: mode {:?} -> {:?}", self.config.mode, mode);
        self.config.mode = mode;
        if mode == EmissionMode::Manual {
            self.detach_ticker();
        } else {
            self.attach_ticker();
        }
    }

    pub fn set_rate_per_second(&mut self, rate: f32) {
        self.config.rate_per_second = Some(rate);
    }

    pub fn set_wave(&mut self, interval: f32, particles_per_wave: u32) {
        self.config.wave_interval = Some(interval);
        self.config.particles_per_wave = Some(particles_per_wave);
    }

    pub fn set_emitting(&mut self, emitting: bool) {
        self.config.emitting = emitting;
    }

    /// Subscribe to the driving tick (see `ParticleSystem`)
    pub fn attach_ticker(&mut self) {
        self.ticker_attached = true;
    }

    /// Stop automatic simulation. Pool and active state are kept.
    pub fn detach_ticker(&mut self) {
        self.ticker_attached = false;
    }

    pub fn is_ticker_attached(&self) -> bool {
        self.ticker_attached
    }

    /// Detach from the tick and deregister every live particle from the
    /// container, handing the container back
    pub fn teardown(mut self) -> C {
        self.detach_ticker();
        for &slot in self.pool.active_slots() {
            self.container.remove_particle(slot);
        }
        debug!(
            "Emitter: torn down with {} live particles",
            self.pool.active_count()
        );
        self.container
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    pub fn mode(&self) -> EmissionMode {
        self.config.mode
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub fn active_count(&self) -> usize {
        self.pool.active_count()
    }

    pub fn pooled_count(&self) -> usize {
        self.pool.pooled_count()
    }

    /// Active particles, in active-list order (unstable across kills)
    pub fn particles(&self) -> impl Iterator<Item = &Particle> + '_ {
        self.pool.active()
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    pub fn pipeline(&self) -> &BehaviourPipeline {
        &self.pipeline
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut C {
        &mut self.container
    }

    pub fn dynamic_properties(&self) -> DynamicProperties {
        self.dynamic
    }

    pub fn stats(&self) -> EmitterStats {
        self.stats
    }

    pub fn rate_accumulator(&self) -> f32 {
        self.emit_acc
    }

    pub fn wave_accumulator(&self) -> f32 {
        self.wave_acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviour::test_support::{calls, CallLog, Recorder};
    use crate::textures::{SingleTextureProvider, WeightedTextureProvider};
    use ember_core::{TextureId, Vec2};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn single() -> Box<dyn TextureProvider> {
        Box::new(SingleTextureProvider::new(TextureId(0)))
    }

    fn config(mode: EmissionMode, capacity: usize) -> EmitterConfig {
        EmitterConfig {
            max_particles: capacity,
            mode,
            ..Default::default()
        }
    }

    fn seeded(config: EmitterConfig) -> EmitterBuilder {
        Emitter::builder(config).rng(ParticleRng::new(7))
    }

    fn assert_conserved(emitter: &Emitter) {
        assert_eq!(
            emitter.active_count() + emitter.pooled_count(),
            emitter.capacity()
        );
    }

    /// Sets a fixed velocity at spawn
    struct Push(Vec2);

    impl Behaviour for Push {
        fn name(&self) -> &str {
            "push"
        }

        fn on_spawn(&self, p: &mut Particle, _ctx: &mut HookContext<'_>) -> Result<()> {
            p.velocity = self.0;
            Ok(())
        }
    }

    #[test]
    fn parse_config_from_toml() {
        let toml_str = r#"
max_particles = 500
mode = "wave"
wave_interval = 0.5
particles_per_wave = 12
lifetime = { min = 0.5, max = 0.75 }
add_at_back = true
"#;
        let config = EmitterConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.max_particles, 500);
        assert_eq!(config.mode, EmissionMode::Wave);
        assert_eq!(config.wave_interval(), 0.5);
        assert_eq!(config.particles_per_wave(), 12);
        assert_eq!(config.lifetime, LifetimeRange::new(0.5, 0.75));
        assert!(config.add_at_back);
        assert!(config.emitting);
        assert_eq!(config.max_delta_seconds, DEFAULT_MAX_DELTA);
    }

    #[test]
    fn config_defaults() {
        let config = EmitterConfig::from_toml_str("").unwrap();
        assert_eq!(config.max_particles, 256);
        assert_eq!(config.mode, EmissionMode::Rate);
        assert_eq!(config.rate(), 0.0);
        assert_eq!(config.wave_interval(), DEFAULT_WAVE_INTERVAL);
        assert_eq!(config.particles_per_wave(), 1);
        assert!(EmitterConfig::from_toml_str("mode = \"sometimes\"").is_err());
    }

    #[test]
    fn lifetime_sample_bounds() {
        let mut rng = ParticleRng::new(3);
        let range = LifetimeRange::new(0.5, 1.5);
        for _ in 0..500 {
            let life = range.sample(&mut rng);
            assert!((0.5..1.5).contains(&life));
        }
        let inverted = LifetimeRange::new(2.0, 1.0);
        assert_eq!(inverted.sample(&mut rng), 2.0);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(Emitter::new(config(EmissionMode::Rate, 0), single()).is_err());
    }

    #[test]
    fn pool_conservation() {
        let mut cfg = config(EmissionMode::Rate, 20);
        cfg.rate_per_second = Some(60.0);
        cfg.lifetime = LifetimeRange::new(0.1, 0.4);
        let mut emitter = seeded(cfg).build(single()).unwrap();
        assert_conserved(&emitter);
        for frame in 0..200 {
            emitter.update(0.016 + (frame % 5) as f32 * 0.01).unwrap();
            assert_conserved(&emitter);
            if frame % 37 == 0 {
                emitter.emit_burst(8).unwrap();
                assert_conserved(&emitter);
            }
        }
        emitter.clear_all().unwrap();
        assert_conserved(&emitter);
        assert_eq!(emitter.active_count(), 0);
    }

    #[test]
    fn particle_dies_on_the_tick_age_reaches_life() {
        let mut cfg = config(EmissionMode::Manual, 4);
        cfg.lifetime = LifetimeRange::new(0.25, 0.25);
        cfg.max_delta_seconds = 0.5;
        let mut emitter = seeded(cfg).build(single()).unwrap();
        emitter.emit_burst(1).unwrap();

        emitter.update(0.125).unwrap();
        assert_eq!(emitter.active_count(), 1);
        assert!(emitter.particles().all(|p| p.age >= 0.0 && p.age < p.life));

        emitter.update(0.125).unwrap();
        assert_eq!(emitter.active_count(), 0);
        assert_eq!(emitter.stats().killed, 1);
    }

    #[test]
    fn rate_mode_long_run_accuracy() {
        let mut cfg = config(EmissionMode::Rate, 200);
        cfg.rate_per_second = Some(10.0);
        cfg.lifetime = LifetimeRange::new(100.0, 100.0);
        let mut emitter = seeded(cfg).build(single()).unwrap();
        for _ in 0..600 {
            emitter.update(1.0 / 60.0).unwrap();
        }
        let spawned = emitter.stats().spawned;
        assert!((99..=101).contains(&spawned), "spawned {spawned}");
    }

    #[test]
    fn rate_mode_uneven_frames() {
        let mut cfg = config(EmissionMode::Rate, 200);
        cfg.rate_per_second = Some(10.0);
        cfg.lifetime = LifetimeRange::new(100.0, 100.0);
        let mut emitter = seeded(cfg).build(single()).unwrap();
        // 0.01 + 0.03 + 0.06 = 0.1s per cycle, 100 cycles
        for _ in 0..100 {
            for dt in [0.01, 0.03, 0.06] {
                emitter.update(dt).unwrap();
            }
        }
        let spawned = emitter.stats().spawned;
        assert!((99..=101).contains(&spawned), "spawned {spawned}");
    }

    #[test]
    fn wave_mode_bursts() {
        let mut cfg = config(EmissionMode::Wave, 30);
        cfg.wave_interval = Some(1.0);
        cfg.particles_per_wave = Some(3);
        cfg.max_delta_seconds = 0.5;
        cfg.lifetime = LifetimeRange::new(100.0, 100.0);
        let mut emitter = seeded(cfg).build(single()).unwrap();
        for _ in 0..7 {
            emitter.update(0.5).unwrap();
        }
        assert_eq!(emitter.stats().spawned, 9);
        assert_eq!(emitter.active_count(), 9);
        assert!((emitter.wave_accumulator() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn wave_mode_catches_up_within_one_tick() {
        let mut cfg = config(EmissionMode::Wave, 30);
        cfg.wave_interval = Some(0.25);
        cfg.particles_per_wave = Some(2);
        cfg.max_delta_seconds = 1.0;
        cfg.lifetime = LifetimeRange::new(100.0, 100.0);
        let mut emitter = seeded(cfg).build(single()).unwrap();
        emitter.update(1.0).unwrap();
        assert_eq!(emitter.stats().spawned, 8);
    }

    #[test]
    fn invalid_wave_settings_are_a_noop() {
        let mut cfg = config(EmissionMode::Wave, 30);
        cfg.wave_interval = Some(0.0);
        let mut emitter = seeded(cfg).build(single()).unwrap();
        emitter.update(0.1).unwrap();
        emitter.set_wave(0.05, 0);
        emitter.update(0.1).unwrap();
        assert_eq!(emitter.stats().spawned, 0);
    }

    #[test]
    fn behaviour_order_and_kill_symmetry() {
        let log = CallLog::default();
        let mut emitter = seeded(config(EmissionMode::Manual, 4))
            .behaviour(Recorder::new("C", 0, &log))
            .behaviour(Recorder::new("B", 0, &log))
            .behaviour(Recorder::new("A", -10, &log))
            .build(single())
            .unwrap();
        let order: Vec<&str> = emitter.pipeline().names().collect();
        assert_eq!(order, vec!["A", "C", "B"]);

        emitter.emit_burst(1).unwrap();
        assert_eq!(calls(&log, "spawn"), vec!["A", "C", "B"]);

        emitter.update(0.016).unwrap();
        let updates = calls(&log, "update");
        assert_eq!(updates, vec!["A", "C", "B"]);

        emitter.clear_all().unwrap();
        let mut kills = calls(&log, "kill");
        kills.reverse();
        assert_eq!(kills, updates);
    }

    #[test]
    fn manual_mode_never_spawns_on_its_own() {
        let mut cfg = config(EmissionMode::Manual, 16);
        cfg.rate_per_second = Some(100.0);
        cfg.lifetime = LifetimeRange::new(100.0, 100.0);
        let mut emitter = seeded(cfg).build(single()).unwrap();
        assert!(!emitter.is_ticker_attached());
        for _ in 0..100 {
            emitter.update(0.1).unwrap();
        }
        assert_eq!(emitter.active_count(), 0);

        assert_eq!(emitter.emit_burst(5).unwrap(), 5);
        emitter.set_wave(1.0, 3);
        assert_eq!(emitter.emit_wave().unwrap(), 3);
        assert_eq!(emitter.active_count(), 8);
    }

    #[test]
    fn delta_is_clamped() {
        let build = || {
            let mut cfg = config(EmissionMode::Rate, 64);
            cfg.rate_per_second = Some(40.0);
            cfg.lifetime = LifetimeRange::new(100.0, 100.0);
            seeded(cfg)
                .behaviour(Push(Vec2::new(3.0, 4.0)))
                .build(single())
                .unwrap()
        };
        let mut stalled = build();
        let mut exact = build();
        stalled.update(5.0).unwrap();
        exact.update(DEFAULT_MAX_DELTA).unwrap();

        assert_eq!(stalled.stats(), exact.stats());
        assert_eq!(stalled.stats().spawned, 4);
        let a: Vec<Vec2> = stalled.particles().map(|p| p.position).collect();
        let b: Vec<Vec2> = exact.particles().map(|p| p.position).collect();
        assert_eq!(a, b);
        assert!((a[0].x - 0.3).abs() < 1e-6);
    }

    #[test]
    fn non_positive_and_nan_deltas_are_ignored() {
        let mut cfg = config(EmissionMode::Rate, 16);
        cfg.rate_per_second = Some(100.0);
        let mut emitter = seeded(cfg).build(single()).unwrap();
        emitter.emit_burst(1).unwrap();
        for dt in [0.0, -1.0, f32::NAN] {
            emitter.update(dt).unwrap();
        }
        assert_eq!(emitter.stats().spawned, 1);
        assert_eq!(emitter.rate_accumulator(), 0.0);
        assert!(emitter.particles().all(|p| p.age == 0.0));
    }

    #[test]
    fn full_pool_drops_spawns() {
        let mut cfg = config(EmissionMode::Manual, 3);
        cfg.lifetime = LifetimeRange::new(100.0, 100.0);
        let mut emitter = seeded(cfg).build(single()).unwrap();
        assert_eq!(emitter.emit_burst(5).unwrap(), 3);
        assert_eq!(emitter.emit_burst(1).unwrap(), 0);
        let stats = emitter.stats();
        assert_eq!(stats.spawned, 3);
        assert_eq!(stats.dropped, 3);
        assert_conserved(&emitter);
    }

    #[test]
    fn clear_all_resets_accumulators() {
        let mut cfg = config(EmissionMode::Rate, 16);
        cfg.rate_per_second = Some(3.0);
        cfg.lifetime = LifetimeRange::new(100.0, 100.0);
        let mut emitter = seeded(cfg).build(single()).unwrap();
        emitter.update(0.1).unwrap();
        emitter.emit_burst(4).unwrap();
        assert!(emitter.rate_accumulator() > 0.0);

        emitter.clear_all().unwrap();
        assert_eq!(emitter.active_count(), 0);
        assert_eq!(emitter.stats().killed, 4);
        assert_eq!(emitter.rate_accumulator(), 0.0);
        assert!(emitter.container().is_empty());
    }

    #[test]
    fn set_mode_keeps_particles() {
        let mut cfg = config(EmissionMode::Rate, 16);
        cfg.rate_per_second = Some(10.0);
        cfg.lifetime = LifetimeRange::new(100.0, 100.0);
        let mut emitter = seeded(cfg).build(single()).unwrap();
        assert!(emitter.is_ticker_attached());
        emitter.update(0.1).unwrap();
        emitter.update(0.05).unwrap();
        let acc = emitter.rate_accumulator();

        emitter.set_mode(EmissionMode::Manual);
        assert!(!emitter.is_ticker_attached());
        assert_eq!(emitter.active_count(), 1);
        assert_eq!(emitter.rate_accumulator(), acc);

        emitter.set_mode(EmissionMode::Rate);
        assert!(emitter.is_ticker_attached());
        assert_eq!(emitter.active_count(), 1);
        assert_eq!(emitter.rate_accumulator(), acc);
    }

    #[test]
    fn rate_accumulator_freezes_while_rate_is_zero() {
        let cfg = config(EmissionMode::Rate, 64);
        let mut emitter = seeded(cfg).build(single()).unwrap();
        for _ in 0..50 {
            emitter.update(0.1).unwrap();
        }
        assert_eq!(emitter.rate_accumulator(), 0.0);

        emitter.set_rate_per_second(10.0);
        emitter.update(0.1).unwrap();
        assert_eq!(emitter.stats().spawned, 1);
    }

    #[test]
    fn spawn_sees_reset_particle() {
        struct Dirty;
        impl Behaviour for Dirty {
            fn name(&self) -> &str {
                "dirty"
            }
            fn update(&self, p: &mut Particle, _dt: f32, _ctx: &mut HookContext<'_>) -> Result<()> {
                p.alpha = 0.25;
                p.velocity = Vec2::new(9.0, 9.0);
                p.rotation = 2.0;
                Ok(())
            }
        }

        struct Probe(Rc<RefCell<Vec<(f32, f32, Vec2, f32)>>>);
        impl Behaviour for Probe {
            fn name(&self) -> &str {
                "probe"
            }
            fn on_spawn(&self, p: &mut Particle, _ctx: &mut HookContext<'_>) -> Result<()> {
                self.0.borrow_mut().push((p.age, p.alpha, p.velocity, p.rotation));
                Ok(())
            }
        }

        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut cfg = config(EmissionMode::Manual, 1);
        cfg.lifetime = LifetimeRange::new(0.05, 0.05);
        let mut emitter = seeded(cfg)
            .behaviour(Dirty)
            .behaviour(Probe(seen.clone()))
            .build(single())
            .unwrap();
        emitter.emit_burst(1).unwrap();
        emitter.update(0.1).unwrap();
        assert_eq!(emitter.active_count(), 0);
        emitter.emit_burst(1).unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1], (0.0, 1.0, Vec2::ZERO, 0.0));
    }

    #[test]
    fn dynamic_properties_union() {
        let log = CallLog::default();
        let mut colour = Recorder::new("colour", 0, &log);
        colour.requires = DynamicProperties::COLOR;
        let textures = Box::new(WeightedTextureProvider::new(
            vec![(TextureId(1), 1.0)],
            TextureId(0),
        ));
        let emitter = seeded(config(EmissionMode::Manual, 8))
            .behaviour(colour)
            .build(textures)
            .unwrap();
        let expected = DynamicProperties::COLOR | DynamicProperties::UVS;
        assert_eq!(emitter.dynamic_properties(), expected);
        assert_eq!(emitter.container().dynamic_properties(), expected);
    }

    #[test]
    fn failing_spawn_returns_particle_to_pool() {
        struct Refuse;
        impl Behaviour for Refuse {
            fn name(&self) -> &str {
                "refuse"
            }
            fn on_spawn(&self, p: &mut Particle, _ctx: &mut HookContext<'_>) -> Result<()> {
                p.alpha = 0.5;
                Err(EmberError::Behaviour("refuse".into()))
            }
        }

        let mut emitter = seeded(config(EmissionMode::Manual, 4))
            .behaviour(Refuse)
            .build(single())
            .unwrap();
        assert!(emitter.emit_burst(3).is_err());
        assert_eq!(emitter.active_count(), 0);
        assert_conserved(&emitter);
        assert!(emitter.pool().particles().iter().all(|p| p.alpha == 1.0));
        assert!(emitter.container().is_empty());
    }

    #[test]
    fn init_error_fails_construction() {
        struct NeedsWaves;
        impl Behaviour for NeedsWaves {
            fn name(&self) -> &str {
                "needs_waves"
            }
            fn init(&mut self, config: &EmitterConfig) -> Result<()> {
                if config.mode != EmissionMode::Wave {
                    return Err(EmberError::Behaviour("wave mode only".into()));
                }
                Ok(())
            }
        }
        let result = seeded(config(EmissionMode::Rate, 4))
            .behaviour(NeedsWaves)
            .build(single());
        assert!(result.is_err());
    }

    #[test]
    fn placement_follows_add_at_back() {
        let mut cfg = config(EmissionMode::Manual, 4);
        cfg.lifetime = LifetimeRange::new(100.0, 100.0);
        let mut front = seeded(cfg.clone()).build(single()).unwrap();
        front.emit_burst(3).unwrap();
        assert_eq!(front.container().draw_order(), &[0, 1, 2]);

        cfg.add_at_back = true;
        let mut back = seeded(cfg).build(single()).unwrap();
        back.emit_burst(3).unwrap();
        assert_eq!(back.container().draw_order(), &[2, 1, 0]);
    }

    #[test]
    fn teardown_releases_container_registrations() {
        let mut cfg = config(EmissionMode::Rate, 8);
        cfg.lifetime = LifetimeRange::new(100.0, 100.0);
        let mut emitter = seeded(cfg).build(single()).unwrap();
        emitter.emit_burst(5).unwrap();
        assert_eq!(emitter.container().len(), 5);
        let container = emitter.teardown();
        assert!(container.is_empty());
    }

    #[test]
    fn disabled_emitter_still_integrates() {
        let mut cfg = config(EmissionMode::Rate, 8);
        cfg.rate_per_second = Some(100.0);
        cfg.emitting = false;
        cfg.lifetime = LifetimeRange::new(100.0, 100.0);
        let mut emitter = seeded(cfg)
            .behaviour(Push(Vec2::new(1.0, 0.0)))
            .build(single())
            .unwrap();
        emitter.emit_burst(1).unwrap();
        emitter.update(0.1).unwrap();
        assert_eq!(emitter.active_count(), 1);
        assert!(emitter.particles().all(|p| (p.position.x - 0.1).abs() < 1e-6));

        emitter.set_emitting(true);
        emitter.update(0.1).unwrap();
        assert_eq!(emitter.active_count(), 11);
    }

    #[test]
    fn tiny_wave_interval_finishes_in_one_tick() {
        let mut cfg = config(EmissionMode::Wave, 8);
        cfg.wave_interval = Some(1e-9);
        cfg.particles_per_wave = Some(1);
        cfg.lifetime = LifetimeRange::new(100.0, 100.0);
        let mut emitter = seeded(cfg).build(single()).unwrap();

        emitter.update(0.1).unwrap();
        assert_eq!(emitter.active_count(), 8);
        assert_eq!(emitter.stats().spawned, 8);
        assert!(emitter.stats().dropped > 1_000_000);
        assert!(emitter.wave_accumulator().is_finite());
        assert!(emitter.wave_accumulator() >= 0.0);
        assert_conserved(&emitter);

        emitter.update(0.1).unwrap();
        assert_eq!(emitter.active_count(), 8);
    }

    #[test]
    fn non_finite_rate_is_a_noop() {
        for rate in [f32::INFINITY, f32::NAN] {
            let mut cfg = config(EmissionMode::Rate, 8);
            cfg.rate_per_second = Some(rate);
            let mut emitter = seeded(cfg).build(single()).unwrap();
            emitter.update(0.1).unwrap();
            assert_eq!(emitter.stats(), EmitterStats::default());
            assert_eq!(emitter.rate_accumulator(), 0.0);
        }
    }

    #[test]
    fn huge_rate_fills_pool_and_counts_the_rest_as_dropped() {
        let mut cfg = config(EmissionMode::Rate, 4);
        cfg.rate_per_second = Some(1e9);
        cfg.lifetime = LifetimeRange::new(100.0, 100.0);
        let mut emitter = seeded(cfg).build(single()).unwrap();
        emitter.update(0.1).unwrap();

        let stats = emitter.stats();
        assert_eq!(stats.spawned, 4);
        assert!(stats.dropped > 1_000_000);
        assert!(emitter.rate_accumulator().is_finite());
        assert_conserved(&emitter);
    }

    #[test]
    fn failing_kill_keeps_particle_active() {
        struct Cling;
        impl Behaviour for Cling {
            fn name(&self) -> &str {
                "cling"
            }
            fn on_kill(&self, _p: &mut Particle, _ctx: &mut HookContext<'_>) -> Result<()> {
                Err(EmberError::Behaviour("cling".into()))
            }
        }

        let mut cfg = config(EmissionMode::Manual, 4);
        cfg.lifetime = LifetimeRange::new(0.05, 0.05);
        let mut emitter = seeded(cfg).behaviour(Cling).build(single()).unwrap();
        emitter.emit_burst(1).unwrap();

        assert!(emitter.update(0.1).is_err());
        assert_eq!(emitter.active_count(), 1);
        assert_conserved(&emitter);
        assert_eq!(emitter.container().draw_order(), emitter.pool().active_slots());
        assert_eq!(emitter.stats().killed, 0);

        assert!(emitter.clear_all().is_err());
        assert_eq!(emitter.active_count(), 1);
        assert_conserved(&emitter);
        assert_eq!(emitter.container().len(), 1);
    }
}
