//! Hash verification animator
//!
//! Two hash cubes drift toward the center with exponential smoothing.
//! Once close enough they accelerate into each other, snap together, and
//! are replaced by a single merged cube whose color shifts from blue to
//! green. The merge fires once; afterwards the merged cube just spins.

use super::actor_mut;
use otaviz_core::{damp, Color, Vec3};
use otaviz_scene::{Actor, ActorStore, MaterialEmphasis};

const START_X: f32 = 7.0;
const CUBE_Y: f32 = 1.5;
/// Drift destination before the merge takes over
const APPROACH_X: f32 = 0.5;
/// Gap below which the cubes commit to merging
const MERGE_GAP: f32 = 1.2;
/// Distance from center that counts as snapped
const SNAP_EPSILON: f32 = 0.1;

/// Per-frame retention at 60 Hz for the slow drift
const DRIFT_SMOOTHING: f32 = 0.98;
/// Retention once the cubes commit to merging
const MERGE_SMOOTHING: f32 = 0.82;
const MIX_SMOOTHING: f32 = 0.9;

const HASH_COLOR: u32 = 0x60A5FA;
const VERIFIED_COLOR: u32 = 0x22C55E;

/// Hash cube state machine
#[derive(Default)]
pub struct HashMergeAnimator {
    x_left: f32,
    x_right: f32,
    merging: bool,
    merged: bool,
    mix: f32,
}

impl HashMergeAnimator {
    fn cube_material() -> MaterialEmphasis {
        MaterialEmphasis {
            base_color: Color::from_hex(HASH_COLOR),
            highlight_color: Color::from_hex(VERIFIED_COLOR),
            mix: 0.0,
            emissive_intensity: 0.5,
            opacity: 0.95,
        }
    }

    /// Spawn (or respawn) the cubes in their start positions
    pub fn enter(&mut self, store: &mut ActorStore) {
        *self = Self {
            x_left: -START_X,
            x_right: START_X,
            ..Self::default()
        };
        store.spawn(
            Actor::new("hash-cube-left")
                .with_position(Vec3::new(-START_X, CUBE_Y, 0.0))
                .with_material(Self::cube_material()),
        );
        store.spawn(
            Actor::new("hash-cube-right")
                .with_position(Vec3::new(START_X, CUBE_Y, 0.0))
                .with_material(Self::cube_material()),
        );
        store.spawn(
            Actor::new("hash-cube-merged")
                .with_position(Vec3::new(0.0, CUBE_Y, 0.0))
                .with_uniform_scale(1.5)
                .with_material(MaterialEmphasis {
                    mix: 1.0,
                    emissive_intensity: 1.0,
                    ..Self::cube_material()
                })
                .with_visible(false),
        );
    }

    /// Advance the approach/merge. Returns true on the tick the cubes snap.
    pub fn tick(&mut self, store: &mut ActorStore, t: f32, dt: f32) -> bool {
        if self.merged {
            if let Some(cube) = actor_mut(store, "hash-cube-merged") {
                cube.rotation.y = t * 0.8;
            }
            return false;
        }

        if !self.merging {
            let k = damp(DRIFT_SMOOTHING, dt);
            self.x_left += (-APPROACH_X - self.x_left) * k;
            self.x_right += (APPROACH_X - self.x_right) * k;
            if self.x_right - self.x_left < MERGE_GAP {
                self.merging = true;
            }
        } else {
            let k = damp(MERGE_SMOOTHING, dt);
            self.x_left -= self.x_left * k;
            self.x_right -= self.x_right * k;
            self.mix += (1.0 - self.mix) * damp(MIX_SMOOTHING, dt);
            if self.x_left.abs() < SNAP_EPSILON && self.x_right.abs() < SNAP_EPSILON {
                self.merged = true;
                if let Some(left) = store.by_name_mut("hash-cube-left") {
                    left.visible = false;
                }
                if let Some(right) = store.by_name_mut("hash-cube-right") {
                    right.visible = false;
                }
                if let Some(cube) = actor_mut(store, "hash-cube-merged") {
                    cube.visible = true;
                }
                return true;
            }
        }

        let mix = self.mix;
        if let Some(left) = actor_mut(store, "hash-cube-left") {
            left.position = Vec3::new(self.x_left, CUBE_Y, 0.0);
            left.rotation = Vec3::new(t.sin() * 0.2, t * 1.2, 0.0);
            left.material.mix = mix;
        }
        if let Some(right) = actor_mut(store, "hash-cube-right") {
            right.position = Vec3::new(self.x_right, CUBE_Y, 0.0);
            right.rotation = Vec3::new(t.cos() * 0.2, -t * 1.2, 0.0);
            right.material.mix = mix;
        }
        false
    }

    /// Remove the cubes on phase exit
    pub fn exit(&mut self, store: &mut ActorStore) {
        store.remove_named("hash-cube-left");
        store.remove_named("hash-cube-right");
        store.remove_named("hash-cube-merged");
        *self = Self::default();
    }

    pub fn is_merged(&self) -> bool {
        self.merged
    }

    /// Current cube positions, for overlay labels
    pub fn cube_positions(&self) -> (Vec3, Vec3) {
        (
            Vec3::new(self.x_left, CUBE_Y, 0.0),
            Vec3::new(self.x_right, CUBE_Y, 0.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cubes_converge_and_merge_once() {
        let mut store = ActorStore::new();
        let mut anim = HashMergeAnimator::default();
        anim.enter(&mut store);

        let mut merges = 0;
        let mut t = 0.0;
        for _ in 0..3600 {
            t += 1.0 / 60.0;
            if anim.tick(&mut store, t, 1.0 / 60.0) {
                merges += 1;
            }
        }
        assert_eq!(merges, 1);
        assert!(anim.is_merged());
        assert!(!store.by_name("hash-cube-left").unwrap().visible);
        assert!(store.by_name("hash-cube-merged").unwrap().visible);
    }

    #[test]
    fn test_merge_is_frame_rate_independent() {
        let mut run = |dt: f32| -> f32 {
            let mut store = ActorStore::new();
            let mut anim = HashMergeAnimator::default();
            anim.enter(&mut store);
            let mut t = 0.0;
            while !anim.tick(&mut store, t, dt) {
                t += dt;
                assert!(t < 120.0, "merge never happened");
            }
            t
        };
        let at_60 = run(1.0 / 60.0);
        let at_20 = run(1.0 / 20.0);
        assert!((at_60 - at_20).abs() < 1.0);
    }

    #[test]
    fn test_exit_removes_cubes() {
        let mut store = ActorStore::new();
        let mut anim = HashMergeAnimator::default();
        anim.enter(&mut store);
        anim.exit(&mut store);
        assert!(store.by_name("hash-cube-left").is_none());
        assert!(store.by_name("hash-cube-merged").is_none());
    }
}
