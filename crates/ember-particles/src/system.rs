//! The particle system: owns emitters and drives them from the frame loop

use crate::emitter::Emitter;
use crate::particle::ParticleInstance;
use crate::render::{DrawList, ParticleContainer};
use ember_core::{EmitterId, Result};
use ember_runtime::RuntimeSystem;
use log::info;
use std::collections::HashMap;

/// Ticks every emitter whose ticker is attached, in the order they were
/// added. Manual-mode emitters are skipped; drive those with
/// [`Emitter::update`] through [`ParticleSystem::get_mut`].
pub struct ParticleSystem<C: ParticleContainer = DrawList> {
    emitters: HashMap<EmitterId, Emitter<C>>,
    order: Vec<EmitterId>,
}

impl<C: ParticleContainer> ParticleSystem<C> {
    pub fn new() -> Self {
        Self {
            emitters: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn add_emitter(&mut self, emitter: Emitter<C>) -> EmitterId {
        let id = EmitterId::new();
        info!(
            "[particles] Added emitter {id} (capacity {}, {:?})",
            emitter.capacity(),
            emitter.mode()
        );
        self.emitters.insert(id, emitter);
        self.order.push(id);
        id
    }

    /// Remove and tear down an emitter, returning its container
    pub fn remove_emitter(&mut self, id: EmitterId) -> Option<C> {
        let emitter = self.emitters.remove(&id)?;
        self.order.retain(|other| *other != id);
        info!("[particles] Removed emitter {id}");
        Some(emitter.teardown())
    }

    pub fn get(&self, id: EmitterId) -> Option<&Emitter<C>> {
        self.emitters.get(&id)
    }

    pub fn get_mut(&mut self, id: EmitterId) -> Option<&mut Emitter<C>> {
        self.emitters.get_mut(&id)
    }

    /// Emitter ids in update order
    pub fn ids(&self) -> &[EmitterId] {
        &self.order
    }

    pub fn emitter_count(&self) -> usize {
        self.emitters.len()
    }

    /// Live particles across all emitters
    pub fn total_alive(&self) -> usize {
        self.emitters.values().map(|e| e.active_count()).sum()
    }
}

impl ParticleSystem<DrawList> {
    /// Pack every emitter's live particles, in emitter then draw order
    pub fn pack_instances(&self, out: &mut Vec<ParticleInstance>) {
        out.clear();
        for id in &self.order {
            if let Some(emitter) = self.emitters.get(id) {
                emitter
                    .container()
                    .pack_instances(emitter.pool().particles(), out);
            }
        }
    }
}

impl<C: ParticleContainer> Default for ParticleSystem<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ParticleContainer> RuntimeSystem for ParticleSystem<C> {
    fn initialize(&mut self) -> Result<()> {
        let count = self.emitters.len();
        if count > 0 {
            info!("[particles] Initialized with {count} emitter(s)");
        }
        Ok(())
    }

    fn update(&mut self, dt: f64) -> Result<()> {
        let dt = dt as f32;
        for id in &self.order {
            if let Some(emitter) = self.emitters.get_mut(id) {
                if emitter.is_ticker_attached() {
                    emitter.update(dt)?;
                }
            }
        }
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        for id in self.order.drain(..) {
            if let Some(emitter) = self.emitters.remove(&id) {
                emitter.teardown();
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "particles"
    }
}
