//! Ember Runtime - Frame loop infrastructure
//!
//! Provides the pieces a host needs to drive simulation systems:
//! - `FrameClock`: measures (or scripts) per-frame delta time
//! - `RuntimeSystem`: trait for systems ticked once per frame

mod clock;
mod system;

pub use clock::FrameClock;
pub use system::RuntimeSystem;
