//! Flipbook animation: swap the particle texture frame by frame

use crate::particle::{Particle, ParticleExtension};
use crate::rand::RandomSource;
use crate::render::DynamicProperties;
use crate::texture::{TextureAtlas, TextureProvider};
use ember_core::{EmberError, Result, TextureId};
use serde::Deserialize;

/// Frame names are `texture_prefix` followed by the zero-padded frame
/// number, e.g. `Explosion_000` .. `Explosion_015`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnimatedTextureOptions {
    pub texture_prefix: String,
    pub number_of_frames: u32,
    /// Number of the first frame (default 0)
    #[serde(default)]
    pub first_frame: u32,
    /// Zero padding; defaults to the digit count of `number_of_frames`
    #[serde(default)]
    pub pad_length: Option<usize>,
    #[serde(default = "default_fps")]
    pub fps: f32,
    /// Wrap around, or hold the last frame
    #[serde(default = "default_looping", rename = "loop")]
    pub looping: bool,
}

fn default_fps() -> f32 {
    60.0
}

fn default_looping() -> bool {
    true
}

impl AnimatedTextureOptions {
    pub fn new(texture_prefix: &str, number_of_frames: u32) -> Self {
        Self {
            texture_prefix: texture_prefix.to_string(),
            number_of_frames,
            first_frame: 0,
            pad_length: None,
            fps: default_fps(),
            looping: default_looping(),
        }
    }

    /// Names of every frame, in playback order
    pub fn frame_names(&self) -> Vec<String> {
        let pad = self
            .pad_length
            .unwrap_or_else(|| self.number_of_frames.to_string().len());
        (self.first_frame..self.first_frame + self.number_of_frames)
            .map(|i| format!("{}{:0>pad$}", self.texture_prefix, i, pad = pad))
            .collect()
    }
}

/// Per-particle flipbook. Playback time lives in the particle's extension
/// slot, so one provider serves every particle.
pub struct AnimatedTextureProvider {
    frames: Vec<TextureId>,
    fps: f32,
    looping: bool,
}

impl AnimatedTextureProvider {
    pub fn new(frames: Vec<TextureId>, fps: f32, looping: bool) -> Result<Self> {
        if frames.is_empty() {
            return Err(EmberError::TextureProvider(
                "animated texture provider has no frames".into(),
            ));
        }
        Ok(Self {
            frames,
            fps,
            looping,
        })
    }

    pub fn from_atlas(atlas: &TextureAtlas, options: &AnimatedTextureOptions) -> Result<Self> {
        let frames = options
            .frame_names()
            .iter()
            .map(|name| atlas.resolve(name))
            .collect::<Result<Vec<_>>>()?;
        Self::new(frames, options.fps, options.looping)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl TextureProvider for AnimatedTextureProvider {
    fn requires(&self) -> DynamicProperties {
        DynamicProperties::UVS
    }

    fn initial_texture(&self) -> TextureId {
        self.frames[0]
    }

    fn texture_for_spawn(&mut self, p: &mut Particle, _rng: &mut dyn RandomSource) -> Option<TextureId> {
        p.extension = Some(ParticleExtension::Animation { elapsed: 0.0 });
        Some(self.frames[0])
    }

    fn update(&mut self, p: &mut Particle, dt: f32) {
        if self.frames.len() <= 1 {
            return;
        }
        let Some(ParticleExtension::Animation { elapsed }) = &mut p.extension else {
            return;
        };
        *elapsed += dt;
        // Float-to-int `as` saturates, so negative time lands on frame 0
        let raw = (*elapsed * self.fps).floor() as usize;
        let idx = if self.looping {
            raw % self.frames.len()
        } else {
            raw.min(self.frames.len() - 1)
        };
        p.texture = self.frames[idx];
    }

    fn on_kill(&mut self, p: &mut Particle) {
        if matches!(p.extension, Some(ParticleExtension::Animation { .. })) {
            p.extension = None;
        }
    }
}
