//! Key exchange / attribute decryption animator
//!
//! Two things run concurrently during the key-exchange phase:
//!
//! 1. A sub-phase machine drives the attribute key: it waits by the
//!    vehicle, hops twice, arcs over to the ciphertext sphere, slides
//!    inside, and the sphere bursts open to reveal the recovered
//!    symmetric key. Entering the terminal sub-phase reports completion
//!    exactly once.
//! 2. A slow interior-decryption ramp (independent of the sub-phases)
//!    recolors the ciphertext shells from pink toward gold and carries a
//!    key card along a three-segment arc/insertion/absorption path.

use super::{actor_mut, bezier};
use otaviz_core::{clamp01, Color, Vec3};
use otaviz_scene::{Actor, ActorStore, MaterialEmphasis};
use std::f32::consts::PI;
use tracing::debug;

/// Where the attribute key waits, beside the vehicle
const KEY_START: Vec3 = Vec3::new(-6.0, 0.2, 0.0);
/// Mid-flight waypoint in front of the sphere
const KEY_MID: Vec3 = Vec3::new(2.2, 1.5, 0.0);
/// Final waypoint inside the sphere
const KEY_INSIDE: Vec3 = Vec3::new(3.0, 1.5, 0.0);
/// Ciphertext sphere center
const CIPHER_CENTER: Vec3 = Vec3::new(3.0, 1.5, 0.0);

/// Seconds for the slow interior recoloring ramp
pub const INTERIOR_DURATION: f32 = 12.0;

const OUTER_BASE: u32 = 0xEC4899;
const OUTER_GOLD: u32 = 0xF59E0B;
const INNER_BASE: u32 = 0xFF99CC;
const INNER_GOLD: u32 = 0xFCD34D;
const WIRE_GOLD: u32 = 0xFEF3C7;
const KEY_GOLD: u32 = 0xFFD700;
const CARD_COLOR: u32 = 0x93C5FD;

/// Attribute key journey, advanced by elapsed time within the phase
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeySubPhase {
    /// Resting beside the vehicle
    Wait,
    /// First anticipation hop
    Jump1,
    /// Second, smaller hop
    Jump2,
    /// Arc from the vehicle to the front of the sphere
    Appear,
    /// Short arc from the front to the insertion point
    Move,
    /// Slide inside; the sphere swells and bursts
    Enter,
    /// The recovered key flares
    Light,
    /// Terminal: symmetric key recovered
    Symmetric,
}

impl KeySubPhase {
    /// Seconds this sub-phase lasts; the terminal sub-phase holds forever
    pub fn duration(self) -> Option<f32> {
        match self {
            Self::Wait => Some(1.0),
            Self::Jump1 => Some(0.5),
            Self::Jump2 => Some(0.5),
            Self::Appear => Some(0.7),
            Self::Move => Some(0.7),
            Self::Enter => Some(0.5),
            Self::Light => Some(0.6),
            Self::Symmetric => None,
        }
    }

    fn next(self) -> Self {
        match self {
            Self::Wait => Self::Jump1,
            Self::Jump1 => Self::Jump2,
            Self::Jump2 => Self::Appear,
            Self::Appear => Self::Move,
            Self::Move => Self::Enter,
            Self::Enter => Self::Light,
            Self::Light | Self::Symmetric => Self::Symmetric,
        }
    }
}

/// Key exchange animator state
pub struct KeyExchangeAnimator {
    sub: KeySubPhase,
    sub_elapsed: f32,
    cipher_scale: f32,
    exploded: bool,
    announced: bool,
}

impl Default for KeyExchangeAnimator {
    fn default() -> Self {
        Self {
            sub: KeySubPhase::Wait,
            sub_elapsed: 0.0,
            cipher_scale: 1.0,
            exploded: false,
            announced: false,
        }
    }
}

impl KeyExchangeAnimator {
    /// Spawn every actor this animator drives, hidden
    pub fn mount(&self, store: &mut ActorStore) {
        store.spawn(
            Actor::new("attr-key")
                .with_position(KEY_START)
                .with_uniform_scale(0.2)
                .with_material(MaterialEmphasis {
                    base_color: Color::from_hex(KEY_GOLD),
                    highlight_color: Color::from_hex(KEY_GOLD),
                    mix: 0.0,
                    emissive_intensity: 0.8,
                    opacity: 1.0,
                })
                .with_visible(false),
        );
        store.spawn(
            Actor::new("cipher-outer")
                .with_position(CIPHER_CENTER)
                .with_material(MaterialEmphasis {
                    base_color: Color::from_hex(OUTER_BASE),
                    highlight_color: Color::from_hex(OUTER_GOLD),
                    mix: 0.0,
                    emissive_intensity: 0.4,
                    opacity: 0.9,
                })
                .with_visible(false),
        );
        store.spawn(
            Actor::new("cipher-inner")
                .with_position(CIPHER_CENTER)
                .with_uniform_scale(0.6)
                .with_material(MaterialEmphasis {
                    base_color: Color::from_hex(INNER_BASE),
                    highlight_color: Color::from_hex(INNER_GOLD),
                    mix: 0.0,
                    emissive_intensity: 0.7,
                    opacity: 0.85,
                })
                .with_visible(false),
        );
        store.spawn(
            Actor::new("cipher-wire")
                .with_position(CIPHER_CENTER)
                .with_uniform_scale(1.05)
                .with_material(MaterialEmphasis {
                    base_color: Color::WHITE,
                    highlight_color: Color::from_hex(WIRE_GOLD),
                    mix: 0.0,
                    emissive_intensity: 0.2,
                    opacity: 0.3,
                })
                .with_visible(false),
        );
        store.spawn(
            Actor::new("sym-key")
                .with_position(Vec3::new(CIPHER_CENTER.x, 2.0, 0.0))
                .with_uniform_scale(0.25)
                .with_material(MaterialEmphasis {
                    base_color: Color::from_hex(INNER_GOLD),
                    highlight_color: Color::from_hex(INNER_GOLD),
                    mix: 0.0,
                    emissive_intensity: 1.2,
                    opacity: 1.0,
                })
                .with_visible(false),
        );
        store.spawn(
            Actor::new("key-card")
                .with_position(Vec3::new(KEY_START.x, 1.5, 0.0))
                .with_uniform_scale(0.3)
                .with_material(MaterialEmphasis {
                    base_color: Color::from_hex(CARD_COLOR),
                    highlight_color: Color::WHITE,
                    mix: 0.0,
                    emissive_intensity: 0.4,
                    opacity: 1.0,
                })
                .with_visible(false),
        );
    }

    /// Phase entry: show the cast in starting positions
    pub fn enter(&mut self, store: &mut ActorStore) {
        *self = Self::default();
        for name in ["cipher-outer", "cipher-inner", "cipher-wire", "key-card"] {
            if let Some(actor) = store.by_name_mut(name) {
                actor.visible = true;
            }
        }
        if let Some(key) = store.by_name_mut("attr-key") {
            key.visible = true;
            key.position = KEY_START;
            key.scale = Vec3::splat(0.2);
        }
    }

    /// Phase exit: hide the cast, keep the recovered key if it surfaced
    pub fn exit(&mut self, store: &mut ActorStore) {
        for name in ["attr-key", "cipher-outer", "cipher-inner", "cipher-wire", "key-card"] {
            if let Some(actor) = store.by_name_mut(name) {
                actor.visible = false;
            }
        }
        *self = Self::default();
    }

    /// Advance both the sub-phase machine and the interior ramp.
    /// Returns true on the tick the symmetric key is recovered.
    pub fn tick(
        &mut self,
        store: &mut ActorStore,
        t: f32,
        phase_elapsed: f32,
        dt: f32,
    ) -> bool {
        let mut recovered = false;
        self.sub_elapsed += dt.max(0.0);
        while let Some(duration) = self.sub.duration() {
            if self.sub_elapsed < duration {
                break;
            }
            self.sub_elapsed -= duration;
            self.sub = self.sub.next();
            debug!(sub = ?self.sub, "key sub-phase");
            if self.sub == KeySubPhase::Symmetric && !self.announced {
                self.announced = true;
                recovered = true;
            }
        }

        let local = self
            .sub
            .duration()
            .map(|d| clamp01(self.sub_elapsed / d))
            .unwrap_or(1.0);
        self.apply_sub_phase(store, t, local);

        let p = clamp01(phase_elapsed / INTERIOR_DURATION);
        self.apply_interior(store, t, p, dt);
        self.apply_key_card(store, p);

        recovered
    }

    fn apply_sub_phase(&mut self, store: &mut ActorStore, t: f32, local: f32) {
        match self.sub {
            KeySubPhase::Wait => {
                if let Some(key) = actor_mut(store, "attr-key") {
                    key.position = KEY_START;
                    key.scale = Vec3::splat(0.2);
                }
            }
            KeySubPhase::Jump1 | KeySubPhase::Jump2 => {
                let (height, scale) = if self.sub == KeySubPhase::Jump1 {
                    (0.7, 0.22)
                } else {
                    (0.5, 0.21)
                };
                if let Some(key) = actor_mut(store, "attr-key") {
                    key.position = Vec3::new(
                        KEY_START.x,
                        KEY_START.y + (local * PI).sin() * height,
                        KEY_START.z,
                    );
                    key.scale = Vec3::splat(scale);
                }
            }
            KeySubPhase::Appear => {
                let ctrl = Vec3::new(
                    (KEY_START.x + KEY_MID.x) * 0.5,
                    KEY_START.y.max(KEY_MID.y) + 2.0,
                    0.0,
                );
                if let Some(key) = actor_mut(store, "attr-key") {
                    key.position = bezier(KEY_START, ctrl, KEY_MID, local);
                    key.scale = Vec3::splat(0.23 + 0.05 * local);
                    key.rotation.y = t;
                }
            }
            KeySubPhase::Move => {
                let ctrl = Vec3::new(
                    (KEY_MID.x + KEY_INSIDE.x) * 0.5 + 0.5,
                    KEY_MID.y.max(KEY_INSIDE.y) + 1.0,
                    0.0,
                );
                self.cipher_scale = 1.0 + 0.7 * local;
                if let Some(key) = actor_mut(store, "attr-key") {
                    key.position = bezier(KEY_MID, ctrl, KEY_INSIDE, local);
                    key.scale = Vec3::splat(0.28 - 0.18 * local);
                    key.rotation.y = t;
                }
            }
            KeySubPhase::Enter => {
                self.cipher_scale = 1.7 + 0.5 * local;
                if let Some(key) = actor_mut(store, "attr-key") {
                    key.position = KEY_INSIDE;
                    key.scale = Vec3::splat((0.1 - 0.1 * local).max(0.0));
                    key.visible = local < 1.0;
                }
                if local >= 0.8 && !self.exploded {
                    self.exploded = true;
                    for name in ["cipher-outer", "cipher-inner", "cipher-wire"] {
                        if let Some(shell) = store.by_name_mut(name) {
                            shell.visible = false;
                        }
                    }
                }
                if local >= 0.7 {
                    if let Some(sym) = actor_mut(store, "sym-key") {
                        sym.visible = true;
                        sym.rotation.y = local * PI;
                    }
                }
            }
            KeySubPhase::Light | KeySubPhase::Symmetric => {
                if let Some(key) = actor_mut(store, "attr-key") {
                    key.visible = false;
                }
                if let Some(sym) = actor_mut(store, "sym-key") {
                    sym.visible = true;
                    sym.rotation.y = t * 0.6;
                    sym.position.y = 2.0 + (t * 1.5).sin() * 0.1;
                }
            }
        }
    }

    /// The slow pink-to-gold recoloring, independent of the sub-phases
    fn apply_interior(&mut self, store: &mut ActorStore, t: f32, p: f32, dt: f32) {
        if self.exploded {
            return;
        }
        let final_stage = p > 0.8;
        let scale = self.cipher_scale;
        let k = otaviz_core::damp(0.9, dt);

        if let Some(outer) = actor_mut(store, "cipher-outer") {
            outer.scale = Vec3::splat(scale);
            outer.material.mix = (1.5 * p).min(1.0);
            if final_stage {
                outer.material.opacity += (0.3 - outer.material.opacity) * k;
                outer.material.emissive_intensity = 0.8 + (3.0 * t).sin() * 0.2;
            } else {
                outer.material.opacity = 0.9 - 0.4 * p;
                outer.material.emissive_intensity = 0.4 + 0.5 * p;
            }
        }
        if let Some(inner) = actor_mut(store, "cipher-inner") {
            if final_stage {
                inner.material.mix = 1.0;
                inner.material.opacity += (1.0 - inner.material.opacity) * k;
                inner.material.emissive_intensity = 1.2 + (1.0 + (4.0 * t).sin() * 0.15) * 0.3;
                inner.scale = Vec3::splat(scale * 0.6 * (1.0 + (2.5 * t).sin() * 0.05));
            } else {
                let freq = 3.0 + 2.0 * p;
                let amplitude = 0.1 + 0.15 * p;
                inner.material.mix = (1.2 * p).min(1.0);
                inner.material.emissive_intensity =
                    0.7 + (t * (1.5 + 2.0 * p)).sin() * 0.3 + 0.6 * p;
                inner.scale = Vec3::splat(scale * 0.6 * (1.0 + (t * freq).sin() * amplitude));
            }
        }
        if let Some(wire) = actor_mut(store, "cipher-wire") {
            wire.scale = Vec3::splat(scale * 1.05);
            if final_stage {
                // Spin decays to a slow drift as decryption wraps up.
                wire.rotation = wire
                    .rotation
                    .add(Vec3::new(0.002, 0.003, -0.001).scale(dt * 60.0));
                wire.material.mix = 1.0;
                wire.material.emissive_intensity = 0.7 + (3.0 * t).sin() * 0.2;
                wire.material.opacity = 0.7 + (2.0 * t).sin() * 0.1;
            } else {
                wire.rotation = Vec3::new(t * 0.15, t * 0.2, -t * 0.1);
                wire.material.mix = (1.5 * p).min(1.0);
                wire.material.emissive_intensity = 0.2 + 0.6 * p;
                wire.material.opacity = 0.3 + 0.5 * p;
            }
        }
    }

    /// Key card path: arc to the sphere, slide in, get absorbed
    fn apply_key_card(&self, store: &mut ActorStore, p: f32) {
        let Some(card) = actor_mut(store, "key-card") else {
            return;
        };
        if p < 0.5 {
            let m = p / 0.5;
            card.position = Vec3::new(
                -6.0 + 9.0 * m,
                1.5 + (m * PI).sin() * 2.0,
                0.0,
            );
            card.rotation.y = PI * 0.5 + m * PI;
            card.rotation.z = (m * PI).sin() * 0.5;
            card.scale = Vec3::splat(0.3);
            card.material.opacity = 1.0;
        } else if p < 0.8 {
            let ins = (p - 0.5) / 0.3;
            card.position = Vec3::new(3.0 - ins, 1.5, 0.0);
            card.rotation.y = 1.5 * PI;
            card.scale = Vec3::splat(0.3);
            card.material.opacity = 1.0;
        } else {
            let fp = (p - 0.8) / 0.2;
            card.position = Vec3::new(2.0 - 2.0 * fp, 1.5, 0.0);
            card.scale = Vec3::splat(0.3 * (1.0 - 0.9 * fp));
            card.material.opacity = 1.0 - 0.9 * fp;
        }
    }

    pub fn sub_phase(&self) -> KeySubPhase {
        self.sub
    }

    pub fn symmetric_key_visible(&self, store: &ActorStore) -> bool {
        store.by_name("sym-key").is_some_and(|a| a.visible)
    }
}
