//! Ember Core - Foundational types for the Ember particle engine
//!
//! This crate provides the core types that all other Ember crates depend on:
//! - `TextureId`, `EmitterId` - Lightweight handles
//! - `Vec2`, `Tint` - 2D spatial and color types
//! - Error types and Result alias

mod error;
mod id;
mod types;

pub use error::{EmberError, Result};
pub use id::{EmitterId, TextureId};
pub use types::{Tint, Vec2};
