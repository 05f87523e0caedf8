//! Same texture for every particle

use crate::texture::{TextureAtlas, TextureProvider};
use ember_core::{Result, TextureId};

/// Always returns one texture. Good for sparks and smoke puffs.
pub struct SingleTextureProvider {
    texture: TextureId,
}

impl SingleTextureProvider {
    pub fn new(texture: TextureId) -> Self {
        Self { texture }
    }

    pub fn from_atlas(atlas: &TextureAtlas, name: &str) -> Result<Self> {
        Ok(Self::new(atlas.resolve(name)?))
    }
}

impl TextureProvider for SingleTextureProvider {
    fn initial_texture(&self) -> TextureId {
        self.texture
    }
}
