//! Storage ring animator
//!
//! Thirteen storage nodes on an undulating ring. Active nodes replicate
//! the update payload; during content-download a copy of the selected
//! node detaches and flies toward the vehicle, shrinking as it goes.

use super::actor_mut;
use otaviz_animation::Easing;
use otaviz_core::{Color, Vec3};
use otaviz_scene::{Actor, ActorStore, MaterialEmphasis};
use std::f32::consts::TAU;

/// Nodes on the ring
pub const NODE_COUNT: usize = 13;
/// Ring center in world space
pub const GROUP_ORIGIN: Vec3 = Vec3::new(20.0, -2.0, 0.0);
/// Nodes currently holding a replica
pub const ACTIVE: [usize; 6] = [1, 3, 5, 7, 9, 11];
/// Node chosen to serve the download
pub const SELECTED: usize = 6;
/// Seconds the shard takes to reach the vehicle
pub const DOWNLOAD_DURATION: f32 = 1.5;

const RING_RADIUS: f32 = 7.5;
const RING_WAVE_HEIGHT: f32 = 3.0;

const NODE_COLOR: u32 = 0xA7F3D0;
const NODE_ACTIVE: u32 = 0x10B981;
const NODE_SELECTED: u32 = 0xF59E0B;

/// Group-local landing point near the vehicle underside
const TRANSFER_TARGET_LOCAL: Vec3 = Vec3::new(-10.0, -10.0, -9.0);

fn node_name(i: usize) -> String {
    format!("node-{i}")
}

/// Ring animator state
#[derive(Default)]
pub struct RetrievalAnimator {
    transfer_start: Option<Vec3>,
}

impl RetrievalAnimator {
    /// Resting ring position of node `i`
    pub fn base_position(i: usize) -> Vec3 {
        let theta = (i as f32 / NODE_COUNT as f32) * TAU;
        GROUP_ORIGIN.add(Vec3::new(
            theta.cos() * RING_RADIUS,
            (2.0 * theta).sin() * RING_WAVE_HEIGHT,
            theta.sin() * RING_RADIUS,
        ))
    }

    // Per-node amplitude/frequency variation keeps the ring from breathing
    // in lockstep.
    fn wander_position(i: usize, t: f32) -> Vec3 {
        let amplitude = 0.18 + 0.04 * (i % 3) as f32;
        let frequency = 0.8 + 0.18 * (i % 2) as f32;
        let s = t * frequency + i as f32 * 0.6;
        Self::base_position(i).add(Vec3::new(
            s.sin() * amplitude,
            s.cos() * amplitude,
            (s * 0.8).sin() * amplitude,
        ))
    }

    /// World-space landing point for the shard
    pub fn transfer_target() -> Vec3 {
        GROUP_ORIGIN.add(TRANSFER_TARGET_LOCAL)
    }

    pub fn mount(&self, store: &mut ActorStore) {
        for i in 0..NODE_COUNT {
            let active = ACTIVE.contains(&i);
            let color = if i == SELECTED {
                NODE_SELECTED
            } else if active {
                NODE_ACTIVE
            } else {
                NODE_COLOR
            };
            store.spawn(
                Actor::new(node_name(i))
                    .with_position(Self::base_position(i))
                    .with_uniform_scale(if active || i == SELECTED { 1.3 } else { 1.0 })
                    .with_material(MaterialEmphasis {
                        base_color: Color::from_hex(color),
                        highlight_color: Color::WHITE,
                        mix: 0.0,
                        emissive_intensity: if active || i == SELECTED { 0.5 } else { 0.1 },
                        opacity: 1.0,
                    }),
            );
        }
    }

    /// Per-tick wander; runs in every phase
    pub fn idle(&self, store: &mut ActorStore, t: f32) {
        for i in 0..NODE_COUNT {
            if let Some(node) = store.by_name_mut(&node_name(i)) {
                node.position = Self::wander_position(i, t);
                node.rotation.y = t * 0.15 + i as f32;
            }
        }
    }

    /// Fly the shard from the selected node toward the vehicle.
    /// Returns true once the shard has arrived.
    pub fn download(&mut self, store: &mut ActorStore, progress: f32) -> bool {
        let start = match self.transfer_start {
            Some(start) => start,
            None => {
                let Some(node) = store.by_name(&node_name(SELECTED)) else {
                    tracing::trace!("selected node missing, download skipped");
                    return false;
                };
                let start = node.position;
                let material = node.material;
                store.spawn(
                    Actor::new("shard-transfer")
                        .with_position(start)
                        .with_material(material)
                        .transient(),
                );
                self.transfer_start = Some(start);
                start
            }
        };

        let eased = Easing::SineIn.apply(progress);
        if let Some(shard) = actor_mut(store, "shard-transfer") {
            shard.position = start.lerp(&Self::transfer_target(), eased);
            shard.scale = Vec3::splat(1.0 - 0.9 * eased);
        }
        progress >= 1.0
    }

    /// Forget the captured start (phase exit)
    pub fn end_download(&mut self) {
        self.transfer_start = None;
    }
}
