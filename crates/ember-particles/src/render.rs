//! Rendering collaborator interface and a reference draw list

use crate::particle::{Particle, ParticleInstance};
use bitflags::bitflags;

bitflags! {
    /// Particle attributes that change after spawn and therefore need to be
    /// re-uploaded to the GPU every frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DynamicProperties: u8 {
        const POSITION = 1 << 0;
        const ROTATION = 1 << 1;
        const VERTEX = 1 << 2;
        const UVS = 1 << 3;
        const COLOR = 1 << 4;
    }
}

const ATTRIBUTE_NAMES: [(&str, DynamicProperties); 5] = [
    ("position", DynamicProperties::POSITION),
    ("rotation", DynamicProperties::ROTATION),
    ("vertex", DynamicProperties::VERTEX),
    ("uvs", DynamicProperties::UVS),
    ("color", DynamicProperties::COLOR),
];

impl Default for DynamicProperties {
    fn default() -> Self {
        Self::empty()
    }
}

impl DynamicProperties {
    /// Look up a flag by attribute name (`"position"`, `"uvs"`, ...)
    pub fn from_attribute(name: &str) -> Option<Self> {
        ATTRIBUTE_NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, flag)| *flag)
    }

    /// Attribute names of the set flags, in declaration order
    pub fn attribute_names(&self) -> Vec<&'static str> {
        ATTRIBUTE_NAMES
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(name, _)| *name)
            .collect()
    }
}

/// Where a newly spawned particle is inserted in draw order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Drawn on top of existing particles
    Front,
    /// Drawn behind existing particles
    Back,
}

/// The surface that draws particles.
///
/// Particles are identified by their pool slot, which stays stable for the
/// emitter's whole lifetime.
pub trait ParticleContainer {
    /// Called once at emitter construction
    fn configure(&mut self, capacity: usize, dynamic: DynamicProperties);

    /// Register a freshly spawned particle for drawing
    fn add_particle(&mut self, slot: usize, placement: Placement);

    /// Deregister a killed particle
    fn remove_particle(&mut self, slot: usize);
}

/// Draw-ordered list of registered particle slots.
///
/// Removal keeps the relative order of the remaining slots, so it scans and
/// shifts: O(n) per kill, as is a `Placement::Back` insert. Renderers that
/// need O(1) kills should implement [`ParticleContainer`] themselves.
#[derive(Debug, Default)]
pub struct DrawList {
    order: Vec<usize>,
    dynamic: DynamicProperties,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered slots, back to front
    pub fn draw_order(&self) -> &[usize] {
        &self.order
    }

    pub fn dynamic_properties(&self) -> DynamicProperties {
        self.dynamic
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Append registered particles to `out` as GPU instances, in draw
    /// order. `particles` is the emitter's full slot array.
    pub fn pack_instances(&self, particles: &[Particle], out: &mut Vec<ParticleInstance>) {
        out.extend(
            self.order
                .iter()
                .map(|&slot| ParticleInstance::from_particle(&particles[slot])),
        );
    }
}

impl ParticleContainer for DrawList {
    fn configure(&mut self, capacity: usize, dynamic: DynamicProperties) {
        self.order.reserve(capacity);
        self.dynamic = dynamic;
    }

    fn add_particle(&mut self, slot: usize, placement: Placement) {
        match placement {
            Placement::Front => self.order.push(slot),
            Placement::Back => self.order.insert(0, slot),
        }
    }

    fn remove_particle(&mut self, slot: usize) {
        if let Some(index) = self.order.iter().position(|&s| s == slot) {
            self.order.remove(index);
        }
    }
}
