//! Otaviz Core
//!
//! Shared value types for the update-visualization engine: 3D vectors,
//! linear-space colors, and the scalar helpers every animator leans on.

mod color;
mod math;

pub use color::Color;
pub use math::{clamp01, damp, Vec3};
