//! Fixed-capacity particle batch
//!
//! The final-decryption detonation spawns one batch of particles whose
//! initial velocities are drawn from a hemisphere distribution (random
//! azimuth, upward-biased elevation). Each tick integrates simple
//! projectile motion under gravity; particles never fall below the
//! configured floor, where their vertical velocity is zeroed and the
//! position held.
//!
//! Randomness is injected as a closure yielding values in `[0, 1)` so the
//! burst stays deterministic under test.

use otaviz_core::{Color, Vec3};
use std::f32::consts::{PI, TAU};

/// A single burst particle
#[derive(Clone, Copy, Debug)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub color: Color,
}

/// Fixed-capacity batch of burst particles
#[derive(Clone, Debug)]
pub struct ParticleBatch {
    particles: Vec<Particle>,
    /// Downward acceleration, m/s^2
    pub gravity: f32,
    /// Height below which particles rest
    pub floor: f32,
}

impl ParticleBatch {
    /// Default gravity: scaled-down free fall tuned for the scene
    pub const GRAVITY: f32 = 9.8 * 0.45;
    /// Default resting height for spent particles
    pub const FLOOR: f32 = -6.5;

    /// Detonate a burst of `count` particles at `origin`.
    ///
    /// Velocities: azimuth uniform in `[0, 2π)`, elevation folded upward,
    /// tangential speed 2 with per-axis jitter and an upward bias of
    /// 2..3.5, matching the detonation the dashboard shipped with.
    pub fn burst(
        origin: Vec3,
        count: usize,
        color: Color,
        rng: &mut impl FnMut() -> f32,
    ) -> Self {
        let mut particles = Vec::with_capacity(count);
        for _ in 0..count {
            let theta = rng() * TAU;
            let phi = rng() * PI;
            let velocity = Vec3::new(
                phi.sin() * theta.cos() * 2.0 + (rng() - 0.5) * 0.5,
                phi.cos().abs() * 2.0 + 2.0 + rng() * 1.5,
                phi.sin() * theta.sin() * 2.0 + (rng() - 0.5) * 0.5,
            );
            particles.push(Particle {
                position: origin,
                velocity,
                color,
            });
        }
        Self {
            particles,
            gravity: Self::GRAVITY,
            floor: Self::FLOOR,
        }
    }

    /// Advance projectile integration by `dt` seconds
    pub fn step(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        for p in &mut self.particles {
            p.velocity.y -= self.gravity * dt;
            p.position = p.position.add(p.velocity.scale(dt));
            if p.position.y < self.floor {
                p.position.y = self.floor;
                p.velocity.y = 0.0;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_rng(seq: &[f32]) -> impl FnMut() -> f32 + '_ {
        let mut i = 0;
        move || {
            let v = seq[i % seq.len()];
            i += 1;
            v
        }
    }

    #[test]
    fn test_burst_velocities_upward_biased() {
        let mut rng = fixed_rng(&[0.1, 0.3, 0.9, 0.2, 0.6, 0.4, 0.8]);
        let batch = ParticleBatch::burst(Vec3::new(0.0, 2.5, 0.0), 50, Color::WHITE, &mut rng);
        assert_eq!(batch.len(), 50);
        for p in batch.iter() {
            // |cos(phi)|*2 + 2 + rng*1.5 is at least 2
            assert!(p.velocity.y >= 2.0);
        }
    }

    #[test]
    fn test_floor_clamp_zeroes_vertical_velocity() {
        let mut rng = fixed_rng(&[0.5]);
        let mut batch = ParticleBatch::burst(Vec3::new(0.0, 2.5, 0.0), 8, Color::WHITE, &mut rng);
        // Integrate well past the time any particle could remain airborne.
        for _ in 0..2000 {
            batch.step(1.0 / 60.0);
        }
        for p in batch.iter() {
            assert!(p.position.y >= batch.floor - 1e-4);
            if (p.position.y - batch.floor).abs() < 1e-4 {
                assert_eq!(p.velocity.y, 0.0);
            }
        }
    }

    #[test]
    fn test_height_never_below_floor_mid_flight() {
        let mut rng = fixed_rng(&[0.0, 0.99, 0.42]);
        let mut batch = ParticleBatch::burst(Vec3::ZERO, 16, Color::WHITE, &mut rng);
        for _ in 0..600 {
            batch.step(1.0 / 30.0);
            for p in batch.iter() {
                assert!(p.position.y >= batch.floor - 1e-4);
            }
        }
    }

    #[test]
    fn test_negative_dt_is_noop() {
        let mut rng = fixed_rng(&[0.5]);
        let mut batch = ParticleBatch::burst(Vec3::ZERO, 4, Color::WHITE, &mut rng);
        let before: Vec<Vec3> = batch.iter().map(|p| p.position).collect();
        batch.step(-1.0);
        for (p, b) in batch.iter().zip(before) {
            assert_eq!(p.position, b);
        }
    }
}
