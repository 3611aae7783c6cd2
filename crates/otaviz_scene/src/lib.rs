//! Otaviz Scene
//!
//! Retained scene state for the update visualization:
//!
//! - **Actors**: named visual entities whose transforms and material
//!   emphasis the animators mutate every tick
//! - **CameraRig**: the single live camera, plus its lazily captured
//!   home pose
//! - **ParticleBatch**: the fixed-capacity burst used by the
//!   final-decryption detonation
//! - **SceneComposer**: pure gathering of the above into one renderable
//!   frame description
//!
//! Nothing in this crate makes decisions about *what* should move; that is
//! the orchestrator's job. This crate only holds state and composes it.

pub mod actor;
pub mod camera;
pub mod composer;
pub mod label;
pub mod particles;

pub use actor::{Actor, ActorId, ActorStore, MaterialEmphasis, SceneError};
pub use camera::{CameraPose, CameraRig};
pub use composer::{ActorInstance, Frame, ParticleInstance, SceneComposer};
pub use label::OverlayLabel;
pub use particles::{Particle, ParticleBatch};
