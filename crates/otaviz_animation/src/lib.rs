//! Otaviz Animation
//!
//! Time-based interpolation primitives for the update visualization:
//!
//! - **Easing**: the curve families the choreography uses
//! - **Interpolate**: lerp support for floats, vectors and colors
//! - **Timeline**: a cancellable interpolation between two values with an
//!   exactly-once completion callback
//!
//! Everything here is driven by wall-clock delta time handed in by the
//! frame loop; nothing counts frames.

pub mod easing;
pub mod timeline;
pub mod values;

pub use easing::Easing;
pub use timeline::Timeline;
pub use values::Interpolate;
