//! Texture collaborator interface and the name → handle atlas

use crate::particle::Particle;
use crate::rand::RandomSource;
use crate::render::DynamicProperties;
use ember_core::{EmberError, Result, TextureId};
use std::collections::HashMap;

/// Decides which texture each particle shows.
///
/// `initial_texture` is required; the other hooks are optional. Keep them
/// cheap: `update` runs for every active particle every frame.
pub trait TextureProvider {
    /// Attributes this provider changes after spawn (e.g. UVs)
    fn requires(&self) -> DynamicProperties {
        DynamicProperties::empty()
    }

    /// Placeholder for each pooled particle, asked once per slot at pool fill
    fn initial_texture(&self) -> TextureId;

    /// Texture for a spawning particle; `None` keeps the current one
    fn texture_for_spawn(
        &mut self,
        _p: &mut Particle,
        _rng: &mut dyn RandomSource,
    ) -> Option<TextureId> {
        None
    }

    /// Per-frame hook, run before base integration
    fn update(&mut self, _p: &mut Particle, _dt: f32) {}

    /// Clear provider-owned particle state on recycle
    fn on_kill(&mut self, _p: &mut Particle) {}
}

/// Registry mapping texture names to handles.
///
/// Handles are dense and assigned in insertion order.
#[derive(Debug, Default)]
pub struct TextureAtlas {
    by_name: HashMap<String, TextureId>,
    names: Vec<String>,
}

impl TextureAtlas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a name, returning the existing handle if already present
    pub fn insert(&mut self, name: &str) -> TextureId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = TextureId(self.names.len() as u32);
        self.by_name.insert(name.to_string(), id);
        self.names.push(name.to_string());
        id
    }

    pub fn get(&self, name: &str) -> Option<TextureId> {
        self.by_name.get(name).copied()
    }

    /// Like `get`, but a missing name is an error
    pub fn resolve(&self, name: &str) -> Result<TextureId> {
        self.get(name)
            .ok_or_else(|| EmberError::TextureNotFound(name.to_string()))
    }

    pub fn name_of(&self, id: TextureId) -> Option<&str> {
        self.names.get(id.raw() as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for TextureAtlas {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut atlas = Self::new();
        for name in iter {
            atlas.insert(name.as_ref());
        }
        atlas
    }
}
