//! Built-in texture providers

mod animated;
mod single;
mod weighted;

pub use animated::{AnimatedTextureOptions, AnimatedTextureProvider};
pub use single::SingleTextureProvider;
pub use weighted::{WeightedTexture, WeightedTextureProvider};
