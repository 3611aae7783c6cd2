//! Declarative overlay labels
//!
//! The composer emits the labels active for the current phase as plain
//! data; the surrounding UI renders them as ordinary overlay entries.
//! No imperative creation/removal bookkeeping.

use otaviz_core::Vec3;
use serde::Serialize;

/// One floating label anchored to a world position
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OverlayLabel {
    pub text: String,
    /// World-space anchor
    pub position: Vec3,
    /// Accent color as `0xRRGGBB`, used for the label border
    pub accent: u32,
}

impl OverlayLabel {
    pub fn new(text: impl Into<String>, position: Vec3, accent: u32) -> Self {
        Self {
            text: text.into(),
            position,
            accent,
        }
    }
}
