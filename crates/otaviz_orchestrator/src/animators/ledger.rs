//! Ledger helix animator
//!
//! Twelve blocks arranged on a rising helix, chained by connector edges.
//! The animator keeps the blocks wandering gently at all times, grows the
//! new block in during block-formation, walks a light orb down the chain
//! during light-traversal, and flies a shrinking copy of the new block to
//! the vehicle during vehicle-transfer.

use super::{actor_mut, place_connector};
use otaviz_animation::Easing;
use otaviz_core::{clamp01, Color, Vec3};
use otaviz_scene::{Actor, ActorStore, MaterialEmphasis, SceneError};
use std::f32::consts::PI;

/// Blocks in the resting chain
pub const BLOCK_COUNT: usize = 12;
/// Index of the block formed for this update
pub const FORMED_INDEX: usize = BLOCK_COUNT;
/// Helix center in world space
pub const GROUP_ORIGIN: Vec3 = Vec3::new(-20.0, -2.0, 0.0);
/// Blocks carrying recent transactions, drawn emphasized
pub const HIGHLIGHTED: [usize; 4] = [2, 5, 8, 11];

const HELIX_RADIUS: f32 = 7.0;
const HELIX_Y_BASE: f32 = -10.0;
const HELIX_Y_STEP: f32 = 1.3;
const HELIX_TURNS: f32 = 4.0 * PI;
const WANDER_AMPLITUDE: f32 = 0.1;
const EDGE_GIRTH: f32 = 0.06;

const BLOCK_COLOR: u32 = 0x93C5FD;
const BLOCK_HIGHLIGHT: u32 = 0x3B82F6;
const EDGE_COLOR: u32 = 0x60A5FA;
const ORB_COLOR: u32 = 0xFEF08A;

/// Where the transferred block docks on the vehicle
pub const VEHICLE_DOCK: Vec3 = Vec3::new(0.0, -1.0, 0.0);

fn block_name(i: usize) -> String {
    format!("block-{i}")
}

fn edge_name(i: usize) -> String {
    format!("edge-{i}")
}

/// Helix animator state
#[derive(Default)]
pub struct LedgerAnimator {
    formed: bool,
    transfer_start: Option<Vec3>,
}

impl LedgerAnimator {
    /// Resting helix position of block `i`
    pub fn base_position(i: usize) -> Vec3 {
        let angle = (i as f32 / BLOCK_COUNT as f32) * HELIX_TURNS;
        GROUP_ORIGIN.add(Vec3::new(
            angle.cos() * HELIX_RADIUS,
            HELIX_Y_BASE + HELIX_Y_STEP * i as f32,
            angle.sin() * HELIX_RADIUS,
        ))
    }

    /// Wander offset applied on top of the base position
    fn wander_position(i: usize, t: f32) -> Vec3 {
        let s = t + i as f32 * 0.5;
        Self::base_position(i).add(Vec3::new(
            s.sin() * WANDER_AMPLITUDE,
            s.cos() * WANDER_AMPLITUDE,
            s.sin() * WANDER_AMPLITUDE,
        ))
    }

    fn block_material(highlighted: bool) -> MaterialEmphasis {
        MaterialEmphasis {
            base_color: Color::from_hex(BLOCK_COLOR),
            highlight_color: Color::from_hex(BLOCK_HIGHLIGHT),
            mix: if highlighted { 1.0 } else { 0.0 },
            emissive_intensity: if highlighted { 0.6 } else { 0.15 },
            opacity: 1.0,
        }
    }

    /// Spawn the resting chain. The formed block is created later.
    pub fn mount(&self, store: &mut ActorStore) {
        for i in 0..BLOCK_COUNT {
            let highlighted = HIGHLIGHTED.contains(&i);
            store.spawn(
                Actor::new(block_name(i))
                    .with_position(Self::base_position(i))
                    .with_uniform_scale(if highlighted { 2.0 } else { 1.0 })
                    .with_material(Self::block_material(highlighted)),
            );
        }
        for i in 1..BLOCK_COUNT {
            store.spawn(
                Actor::new(edge_name(i)).with_material(MaterialEmphasis {
                    base_color: Color::from_hex(EDGE_COLOR),
                    highlight_color: Color::WHITE,
                    mix: 0.0,
                    emissive_intensity: 0.15,
                    opacity: 0.8,
                }),
            );
        }
        store.spawn(
            Actor::new("light-orb")
                .with_uniform_scale(0.35)
                .with_material(MaterialEmphasis {
                    base_color: Color::from_hex(ORB_COLOR),
                    highlight_color: Color::from_hex(ORB_COLOR),
                    mix: 0.0,
                    emissive_intensity: 2.0,
                    opacity: 1.0,
                })
                .with_visible(false),
        );
    }

    /// Per-tick wander plus edge refresh; runs in every phase
    pub fn idle(&self, store: &mut ActorStore, t: f32) {
        let top = if self.formed {
            FORMED_INDEX
        } else {
            BLOCK_COUNT - 1
        };
        for i in 0..=top {
            // The forming block keeps whatever scale formation gave it.
            if let Some(block) = store.by_name_mut(&block_name(i)) {
                block.position = Self::wander_position(i, t);
                block.rotation.y = t * 0.1 + i as f32;
            }
        }
        for i in 1..=top {
            let a = Self::wander_position(i - 1, t);
            let b = Self::wander_position(i, t);
            place_connector(store, &edge_name(i), a, b, EDGE_GIRTH);
        }
    }

    /// Grow the new block in, `progress` in `[0, 1]`
    pub fn formation(&mut self, store: &mut ActorStore, progress: f32) {
        if !self.formed {
            self.formed = true;
            store.spawn(
                Actor::new(block_name(FORMED_INDEX))
                    .with_position(Self::base_position(FORMED_INDEX))
                    .with_uniform_scale(0.0)
                    .with_material(Self::block_material(false)),
            );
            store.spawn(
                Actor::new(edge_name(FORMED_INDEX)).with_material(MaterialEmphasis {
                    base_color: Color::from_hex(EDGE_COLOR),
                    highlight_color: Color::WHITE,
                    mix: 0.0,
                    emissive_intensity: 0.15,
                    opacity: 0.8,
                }),
            );
        }
        let scale = clamp01(progress);
        if let Some(block) = actor_mut(store, &block_name(FORMED_INDEX)) {
            block.scale = Vec3::splat(scale);
            block.material.emissive_intensity = 0.15 + (1.0 - scale) * 1.0;
        }
        // The new edge fades in with the block.
        if let Some(edge) = actor_mut(store, &edge_name(FORMED_INDEX)) {
            edge.material.opacity = 0.8 * scale;
        }
    }

    /// Walk the light orb from the formed block down to the genesis block.
    ///
    /// The path has one segment per edge; the segment index saturates at
    /// the last segment so overshoot parks the orb at the genesis block.
    pub fn traversal(&self, store: &mut ActorStore, progress: f32, t: f32) {
        let segments = FORMED_INDEX; // formed block down to block 0
        let along = clamp01(progress) * segments as f32;
        let seg = (along as usize).min(segments - 1);
        let local = along - seg as f32;

        // Walking top-down: segment k spans blocks (top - k) .. (top - k - 1).
        let from = Self::wander_position(FORMED_INDEX - seg, t);
        let to = Self::wander_position(FORMED_INDEX - seg - 1, t);
        if let Some(orb) = actor_mut(store, "light-orb") {
            orb.visible = true;
            orb.position = from.lerp(&to, local);
        }

        // Edge j connects blocks j-1 and j; the orb is currently crossing
        // edge (top - seg), edges above it have already lit up.
        let current = FORMED_INDEX - seg;
        for j in 1..=FORMED_INDEX {
            if let Some(edge) = store.by_name_mut(&edge_name(j)) {
                edge.material.emissive_intensity = if j == current {
                    1.0
                } else if j > current {
                    0.35
                } else {
                    0.15
                };
            }
        }
    }

    /// Hide the orb and settle the edges once traversal ends
    pub fn end_traversal(&self, store: &mut ActorStore) {
        if let Some(orb) = store.by_name_mut("light-orb") {
            orb.visible = false;
        }
        for j in 1..=FORMED_INDEX {
            if let Some(edge) = store.by_name_mut(&edge_name(j)) {
                edge.material.emissive_intensity = 0.15;
            }
        }
    }

    /// Fly a shrinking copy of the formed block to the vehicle dock.
    /// Returns true once the copy has arrived. The formed block is the
    /// transfer source and must exist; a transfer requested before
    /// formation is a typed error, not a skipped frame.
    pub fn transfer(&mut self, store: &mut ActorStore, progress: f32) -> Result<bool, SceneError> {
        let start = match self.transfer_start {
            Some(start) => start,
            None => {
                let block = store.require(&block_name(FORMED_INDEX))?;
                let start = block.position;
                let material = block.material;
                store.spawn(
                    Actor::new("block-transfer")
                        .with_position(start)
                        .with_material(material)
                        .transient(),
                );
                self.transfer_start = Some(start);
                start
            }
        };

        let eased = Easing::EaseInOutQuad.apply(progress);
        if let Some(clone) = actor_mut(store, "block-transfer") {
            clone.position = start.lerp(&VEHICLE_DOCK, eased);
            clone.scale = Vec3::splat(1.0 - 0.9 * eased);
        }
        Ok(progress >= 1.0)
    }

    /// Back to the resting chain (reset to idle)
    pub fn reset(&mut self, store: &mut ActorStore) {
        store.remove_named(&block_name(FORMED_INDEX));
        store.remove_named(&edge_name(FORMED_INDEX));
        self.end_traversal(store);
        self.formed = false;
        self.transfer_start = None;
    }

    /// Forget the captured transfer start (phase exit)
    pub fn end_transfer(&mut self) {
        self.transfer_start = None;
    }

    pub fn is_formed(&self) -> bool {
        self.formed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helix_layout() {
        let p0 = LedgerAnimator::base_position(0);
        let p11 = LedgerAnimator::base_position(11);
        assert!((p0.y - (GROUP_ORIGIN.y + HELIX_Y_BASE)).abs() < 1e-5);
        assert!((p11.y - p0.y - 11.0 * HELIX_Y_STEP).abs() < 1e-4);
        // All blocks sit on the helix cylinder.
        for i in 0..BLOCK_COUNT {
            let p = LedgerAnimator::base_position(i);
            let radial = Vec3::new(p.x - GROUP_ORIGIN.x, 0.0, p.z - GROUP_ORIGIN.z);
            assert!((radial.length() - HELIX_RADIUS).abs() < 1e-4);
        }
    }

    #[test]
    fn test_formation_scales_with_progress() {
        let mut store = ActorStore::new();
        let mut ledger = LedgerAnimator::default();
        ledger.mount(&mut store);

        ledger.formation(&mut store, 0.5);
        let block = store.by_name("block-12").unwrap();
        assert!((block.scale.x - 0.5).abs() < 1e-6);

        ledger.formation(&mut store, 1.0);
        assert!((store.by_name("block-12").unwrap().scale.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_traversal_starts_at_formed_block_and_ends_at_genesis() {
        let mut store = ActorStore::new();
        let mut ledger = LedgerAnimator::default();
        ledger.mount(&mut store);
        ledger.formation(&mut store, 1.0);

        let t = 3.7;
        ledger.traversal(&mut store, 0.0, t);
        let orb = store.by_name("light-orb").unwrap();
        assert!(orb.visible);
        let top = LedgerAnimator::base_position(FORMED_INDEX);
        assert!(orb.position.distance(top) < 0.5);

        ledger.traversal(&mut store, 1.0, t);
        let orb = store.by_name("light-orb").unwrap();
        let genesis = LedgerAnimator::base_position(0);
        assert!(orb.position.distance(genesis) < 0.5);
    }

    #[test]
    fn test_traversal_overshoot_saturates() {
        let mut store = ActorStore::new();
        let mut ledger = LedgerAnimator::default();
        ledger.mount(&mut store);
        ledger.formation(&mut store, 1.0);
        ledger.traversal(&mut store, 1.4, 0.0);
        let orb = store.by_name("light-orb").unwrap();
        assert!(orb.position.distance(LedgerAnimator::base_position(0)) < 0.5);
    }

    #[test]
    fn test_transfer_clone_shrinks_toward_dock() {
        let mut store = ActorStore::new();
        let mut ledger = LedgerAnimator::default();
        ledger.mount(&mut store);
        ledger.formation(&mut store, 1.0);

        assert!(!ledger.transfer(&mut store, 0.0).unwrap());
        let start = store.by_name("block-transfer").unwrap().position;

        assert!(ledger.transfer(&mut store, 1.0).unwrap());
        let clone = store.by_name("block-transfer").unwrap();
        assert!(clone.position.distance(VEHICLE_DOCK) < 1e-4);
        assert!((clone.scale.x - 0.1).abs() < 1e-5);
        assert!(start.distance(VEHICLE_DOCK) > 1.0);
        assert!(clone.transient);
    }

    #[test]
    fn test_transfer_requires_the_formed_block() {
        let mut store = ActorStore::new();
        let mut ledger = LedgerAnimator::default();
        ledger.mount(&mut store);
        // No formation yet, so there is no source block to clone.
        assert!(ledger.transfer(&mut store, 0.5).is_err());
        assert!(store.by_name("block-transfer").is_none());
    }

    #[test]
    fn test_reset_removes_formed_block() {
        let mut store = ActorStore::new();
        let mut ledger = LedgerAnimator::default();
        ledger.mount(&mut store);
        ledger.formation(&mut store, 1.0);
        assert!(ledger.is_formed());
        ledger.reset(&mut store);
        assert!(store.by_name("block-12").is_none());
        assert!(!ledger.is_formed());
    }
}
