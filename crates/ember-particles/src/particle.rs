//! Particle types: CPU simulation state, the fixed-capacity pool, and GPU
//! instance data

use bytemuck::{Pod, Zeroable};
use ember_core::{TextureId, Tint, Vec2};

/// Per-particle scratch owned by whichever behaviour or texture provider
/// set it. Cleared on kill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParticleExtension {
    /// Seconds of flipbook playback
    Animation { elapsed: f32 },
    /// Free-form values for custom behaviours
    Scratch([f32; 4]),
}

/// CPU-side particle state (not sent to GPU)
#[derive(Debug, Clone)]
pub struct Particle {
    pub position: Vec2,
    /// Units per second
    pub velocity: Vec2,
    /// Radians per second
    pub angular_velocity: f32,
    /// Seconds since spawn
    pub age: f32,
    /// Total lifetime in seconds, drawn per spawn
    pub life: f32,
    pub alpha: f32,
    pub scale: Vec2,
    pub rotation: f32,
    pub tint: Tint,
    pub texture: TextureId,
    pub extension: Option<ParticleExtension>,
}

impl Particle {
    /// A particle in pooled state holding a placeholder texture
    pub fn pooled(texture: TextureId) -> Self {
        let mut p = Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            age: 0.0,
            life: 1.0,
            alpha: 1.0,
            scale: Vec2::ONE,
            rotation: 0.0,
            tint: Tint::WHITE,
            texture,
            extension: None,
        };
        p.reset_pooled();
        p
    }

    /// Base reset run on every spawn, before behaviours initialize the
    /// particle. The texture and extension slot are left alone: the texture
    /// provider has already chosen them for this spawn.
    pub fn reset_for_spawn(&mut self) {
        self.position = Vec2::ZERO;
        self.velocity = Vec2::ZERO;
        self.angular_velocity = 0.0;
        self.age = 0.0;
        self.life = 1.0;
        self.alpha = 1.0;
        self.scale = Vec2::ONE;
        self.rotation = 0.0;
        self.tint = Tint::WHITE;
    }

    /// Full reset run when the particle returns to the pool
    pub fn reset_pooled(&mut self) {
        self.reset_for_spawn();
        self.extension = None;
    }

    /// Normalized age in [0, 1]; 1 when the lifetime is not positive
    pub fn age_ratio(&self) -> f32 {
        if self.life <= 0.0 {
            1.0
        } else {
            (self.age / self.life).clamp(0.0, 1.0)
        }
    }
}

/// Fixed-capacity particle storage split into a free list and an active
/// list of slot indices.
///
/// Slots are allocated once. Afterwards particles only move between the two
/// lists, so steady-state simulation never allocates. A slot handed out by
/// `acquire` belongs to neither list until `activate` or `release`.
pub struct ParticlePool {
    particles: Vec<Particle>,
    free: Vec<usize>,
    active: Vec<usize>,
}

impl ParticlePool {
    /// Allocate `capacity` pooled particles, asking `placeholder` for each
    /// particle's initial texture
    pub fn new(capacity: usize, mut placeholder: impl FnMut() -> TextureId) -> Self {
        let mut particles = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            particles.push(Particle::pooled(placeholder()));
        }
        // Reversed so slots are handed out 0, 1, 2, ...
        let free = (0..capacity).rev().collect();
        Self {
            particles,
            free,
            active: Vec::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn pooled_count(&self) -> usize {
        self.free.len()
    }

    /// Take a slot off the free list. Returns None if the pool is empty.
    pub fn acquire(&mut self) -> Option<usize> {
        self.free.pop()
    }

    /// Return an acquired slot that never became active
    pub fn release(&mut self, slot: usize) {
        self.free.push(slot);
    }

    /// Append an acquired slot to the active list
    pub fn activate(&mut self, slot: usize) {
        self.active.push(slot);
    }

    /// Swap-remove the active entry at `index` and return its slot to the
    /// free list. Active order is not preserved.
    pub fn deactivate_at(&mut self, index: usize) -> usize {
        let slot = self.active.swap_remove(index);
        self.free.push(slot);
        slot
    }

    pub fn active_slot(&self, index: usize) -> usize {
        self.active[index]
    }

    pub fn active_slots(&self) -> &[usize] {
        &self.active
    }

    pub fn get(&self, slot: usize) -> &Particle {
        &self.particles[slot]
    }

    pub fn get_mut(&mut self, slot: usize) -> &mut Particle {
        &mut self.particles[slot]
    }

    /// All slots, pooled and active
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Active particles in active-list order
    pub fn active(&self) -> impl Iterator<Item = &Particle> + '_ {
        self.active.iter().map(move |&slot| &self.particles[slot])
    }
}

/// GPU instance data, one per live particle.
/// 48 bytes (3 rows of vec4).
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ParticleInstance {
    /// Position + scale packed into vec4
    pub pos_scale: [f32; 4], // xy = position, zw = scale
    /// Tint with alpha
    pub color: [f32; 4], // rgba
    /// Rotation and texture handle
    pub rotation_texture: [f32; 4], // x = rotation, y = texture id
}

impl ParticleInstance {
    pub fn from_particle(p: &Particle) -> Self {
        Self {
            pos_scale: [p.position.x, p.position.y, p.scale.x, p.scale.y],
            color: p.tint.to_rgba(p.alpha),
            rotation_texture: [p.rotation, p.texture.raw() as f32, 0.0, 0.0],
        }
    }
}
