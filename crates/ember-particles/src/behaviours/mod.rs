//! Built-in behaviours
//!
//! Spawn shapes run first (priority -100), then static properties (-60),
//! then velocity sources. Curve-driven behaviours sample at the particle's
//! normalized age.

mod alpha;
mod movement;
mod scale;
mod spawn;
mod static_props;

pub use alpha::{Alpha, AlphaCurve};
pub use movement::{GravityCurve, MovementCurve, RadialBurst};
pub use scale::ScaleCurve;
pub use spawn::{CircleSpawn, RectangleSpawn};
pub use static_props::{RotationSpeed, StaticRotation, StaticScale};

/// Priority of spawn-shape behaviours
pub const SPAWN_SHAPE_PRIORITY: i32 = -100;

/// Priority of behaviours that set fixed per-particle properties
pub const STATIC_PROPERTY_PRIORITY: i32 = -60;
