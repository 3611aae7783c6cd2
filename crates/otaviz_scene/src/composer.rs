//! Scene composer
//!
//! Pure composition: gather the current transforms, materials, particle
//! batch and overlay labels into one renderable frame description. The
//! only branching here is visibility.

use crate::actor::ActorStore;
use crate::camera::CameraRig;
use crate::label::OverlayLabel;
use crate::particles::ParticleBatch;
use otaviz_core::{Color, Vec3};
use smallvec::SmallVec;

/// Snapshot of one actor ready for rendering
#[derive(Clone, Debug)]
pub struct ActorInstance {
    pub name: String,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    pub color: Color,
    pub emissive_intensity: f32,
    pub opacity: f32,
}

/// Snapshot of one particle
#[derive(Clone, Copy, Debug)]
pub struct ParticleInstance {
    pub position: Vec3,
    pub color: Color,
}

/// One composed frame
pub struct Frame {
    pub camera_position: Vec3,
    pub camera_target: Vec3,
    pub actors: Vec<ActorInstance>,
    pub particles: Vec<ParticleInstance>,
    pub labels: SmallVec<[OverlayLabel; 4]>,
}

/// Stateless frame assembly
pub struct SceneComposer;

impl SceneComposer {
    pub fn compose(
        store: &ActorStore,
        camera: &CameraRig,
        particles: Option<&ParticleBatch>,
        labels: &[OverlayLabel],
    ) -> Frame {
        let mut actors = Vec::with_capacity(store.len());
        for (_, actor) in store.iter() {
            if !actor.visible {
                continue;
            }
            actors.push(ActorInstance {
                name: actor.name.clone(),
                position: actor.position,
                rotation: actor.rotation,
                scale: actor.scale,
                color: actor.material.color(),
                emissive_intensity: actor.material.emissive_intensity,
                opacity: actor.material.opacity,
            });
        }

        let particles = particles
            .map(|batch| {
                batch
                    .iter()
                    .map(|p| ParticleInstance {
                        position: p.position,
                        color: p.color,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Frame {
            camera_position: camera.position,
            camera_target: camera.target,
            actors,
            particles,
            labels: labels.iter().cloned().collect(),
        }
    }
}
