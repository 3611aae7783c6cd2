//! Final decryption animator
//!
//! The key card and the symmetric key spiral inward from opposite sides,
//! meet above the vehicle, and fuse into a glowing sphere. After a short
//! hold the sphere swells and detonates; the controller turns the
//! detonation into a particle burst. Camera return is requested at the
//! merge, not at the detonation.

use super::actor_mut;
use otaviz_animation::{Easing, Timeline};
use otaviz_core::{clamp01, Color, Vec3};
use otaviz_scene::{Actor, ActorStore, MaterialEmphasis};
use std::f32::consts::{FRAC_PI_2, PI};

/// Seconds for the inward spiral
pub const MERGE_DURATION: f32 = 3.0;
/// Seconds for the sphere to swell before detonating
pub const GROW_DURATION: f32 = 1.1;
/// Hold between merge and swell
const MERGE_HOLD: f32 = 0.2;

/// Where the two halves fuse
pub const MERGE_POINT: Vec3 = Vec3::new(0.0, 2.5, 0.0);

const KEY_SIDE_X: f32 = -6.0;
const CIPHER_SIDE_X: f32 = 3.0;
const ORBIT_RADIUS_START: f32 = 1.35;
const ORBIT_RADIUS_SHRINK: f32 = 0.95;
const ORBIT_TURNS: f32 = 3.0 * PI;

const SPHERE_COLOR: u32 = 0xFCD34D;

/// What the animator just did
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FinalEvent {
    /// The halves fused; the camera should head home
    MergeReached,
    /// The sphere burst; spawn particles at `origin`
    Detonated { origin: Vec3 },
}

enum BurstStage {
    Orbiting,
    MergedHold { elapsed: f32 },
    Growing(Timeline<f32>),
    Done,
}

/// Final decryption state machine
pub struct FinalDecryptionAnimator {
    merge: Timeline<f32>,
    stage: BurstStage,
}

impl Default for FinalDecryptionAnimator {
    fn default() -> Self {
        Self {
            merge: Timeline::new(0.0, 1.0, MERGE_DURATION, Easing::Linear),
            stage: BurstStage::Orbiting,
        }
    }
}

impl FinalDecryptionAnimator {
    pub fn mount(&self, store: &mut ActorStore) {
        store.spawn(
            Actor::new("merge-sphere")
                .with_position(MERGE_POINT)
                .with_material(MaterialEmphasis {
                    base_color: Color::from_hex(SPHERE_COLOR),
                    highlight_color: Color::WHITE,
                    mix: 0.0,
                    emissive_intensity: 1.5,
                    opacity: 0.9,
                })
                .with_visible(false),
        );
    }

    /// Phase entry: both halves visible at their orbit centers
    pub fn enter(&mut self, store: &mut ActorStore) {
        *self = Self::default();
        if let Some(card) = store.by_name_mut("key-card") {
            card.visible = true;
            card.scale = Vec3::splat(0.3);
            card.material.opacity = 1.0;
        }
        if let Some(sym) = store.by_name_mut("sym-key") {
            sym.visible = true;
        }
    }

    /// Phase exit: everything hidden, timelines dropped
    pub fn exit(&mut self, store: &mut ActorStore) {
        self.merge.cancel();
        for name in ["key-card", "sym-key", "merge-sphere"] {
            if let Some(actor) = store.by_name_mut(name) {
                actor.visible = false;
            }
        }
        *self = Self::default();
    }

    /// Advance the spiral / swell. At most one event per tick.
    pub fn tick(&mut self, store: &mut ActorStore, t: f32, dt: f32) -> Option<FinalEvent> {
        match &mut self.stage {
            BurstStage::Orbiting => {
                self.merge.advance(dt);
                let mt = self.merge.progress();
                let orbit_t = (mt / 0.7).min(1.0);
                let approach = clamp01((mt - 0.7) / 0.3);
                let radius = ORBIT_RADIUS_START - ORBIT_RADIUS_SHRINK * orbit_t;
                let angle = FRAC_PI_2 + ORBIT_TURNS * orbit_t;

                let card_pos = Vec3::new(
                    KEY_SIDE_X + angle.cos() * radius,
                    2.5 + (t * 1.5).sin() * 0.1,
                    angle.sin() * radius,
                )
                .lerp(&MERGE_POINT, approach);
                let sym_pos = Vec3::new(
                    CIPHER_SIDE_X - angle.cos() * radius,
                    1.5 + (t * 1.5).sin() * 0.08,
                    -angle.sin() * radius,
                )
                .lerp(&MERGE_POINT, approach);

                if let Some(card) = actor_mut(store, "key-card") {
                    card.position = card_pos;
                    card.rotation.y = PI * 0.25 + mt * 1.1 * PI;
                }
                if let Some(sym) = actor_mut(store, "sym-key") {
                    sym.position = sym_pos;
                    sym.rotation.y = mt * 1.1 * PI;
                    sym.rotation.x = (mt * PI).sin() * 0.1;
                }

                if self.merge.is_complete() {
                    for name in ["key-card", "sym-key"] {
                        if let Some(actor) = store.by_name_mut(name) {
                            actor.visible = false;
                        }
                    }
                    if let Some(sphere) = actor_mut(store, "merge-sphere") {
                        sphere.visible = true;
                        sphere.scale = Vec3::ONE;
                        sphere.material.opacity = 0.9;
                    }
                    self.stage = BurstStage::MergedHold { elapsed: 0.0 };
                    return Some(FinalEvent::MergeReached);
                }
                None
            }
            BurstStage::MergedHold { elapsed } => {
                *elapsed += dt;
                if let Some(sphere) = actor_mut(store, "merge-sphere") {
                    sphere.scale = Vec3::splat(1.0 + (t * 8.0).sin() * 0.05);
                }
                if *elapsed >= MERGE_HOLD {
                    self.stage = BurstStage::Growing(Timeline::new(
                        0.0,
                        1.1,
                        GROW_DURATION,
                        Easing::Linear,
                    ));
                }
                None
            }
            BurstStage::Growing(grow) => {
                grow.advance(dt);
                let g = grow.value();
                let done = grow.is_complete();
                if let Some(sphere) = actor_mut(store, "merge-sphere") {
                    sphere.scale = Vec3::splat(1.0 + g * 6.0);
                    sphere.material.opacity = (0.9 - g * 0.35).max(0.0);
                    sphere.visible = !done;
                }
                if done {
                    self.stage = BurstStage::Done;
                    return Some(FinalEvent::Detonated {
                        origin: MERGE_POINT,
                    });
                }
                None
            }
            BurstStage::Done => None,
        }
    }
}
