//! Weighted random texture per spawn

use crate::particle::Particle;
use crate::rand::RandomSource;
use crate::render::DynamicProperties;
use crate::texture::{TextureAtlas, TextureProvider};
use ember_core::{Result, TextureId};
use serde::Deserialize;

/// One weighted choice, by texture name
#[derive(Debug, Clone, Deserialize)]
pub struct WeightedTexture {
    pub texture: String,
    pub weight: f32,
}

/// Picks a texture at spawn with probability proportional to its weight.
///
/// Non-positive weights never win. With no positive weight at all every
/// particle gets the fallback.
pub struct WeightedTextureProvider {
    items: Vec<(TextureId, f32)>,
    fallback: TextureId,
    total: f32,
}

impl WeightedTextureProvider {
    pub fn new(items: Vec<(TextureId, f32)>, fallback: TextureId) -> Self {
        let total = items.iter().map(|(_, w)| w.max(0.0)).sum();
        Self {
            items,
            fallback,
            total,
        }
    }

    pub fn from_atlas(atlas: &TextureAtlas, items: &[WeightedTexture], fallback: &str) -> Result<Self> {
        let resolved = items
            .iter()
            .map(|item| Ok((atlas.resolve(&item.texture)?, item.weight)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(resolved, atlas.resolve(fallback)?))
    }
}

impl TextureProvider for WeightedTextureProvider {
    // Texture swaps on reused particles change UVs
    fn requires(&self) -> DynamicProperties {
        DynamicProperties::UVS
    }

    fn initial_texture(&self) -> TextureId {
        self.fallback
    }

    fn texture_for_spawn(&mut self, _p: &mut Particle, rng: &mut dyn RandomSource) -> Option<TextureId> {
        if self.total <= 0.0 {
            return Some(self.fallback);
        }
        let mut r = rng.next_f32() * self.total;
        for &(texture, weight) in &self.items {
            if weight <= 0.0 {
                continue;
            }
            r -= weight;
            if r <= 0.0 {
                return Some(texture);
            }
        }
        // Float slack: land on the last positive entry
        self.items
            .iter()
            .rev()
            .find(|(_, w)| *w > 0.0)
            .map(|(t, _)| *t)
            .or(Some(self.fallback))
    }
}
