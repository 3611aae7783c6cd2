//! Otaviz Orchestrator
//!
//! The staged animation engine behind the vehicle update dashboard. It
//! turns backend notifications and user actions into a scripted 3D
//! story: the camera approaches the ledger, a block forms and is walked
//! by a light pulse, the payload is fetched from the storage ring,
//! hashes merge, the attribute key unlocks the ciphertext, and the final
//! decryption detonates in a particle burst.
//!
//! The embedding UI drives it with two calls per frame:
//!
//! ```ignore
//! controller.tick(now_seconds);
//! let frame = controller.compose_frame();
//! ```
//!
//! plus trigger methods (`confirm_update`, `set_downloading`,
//! `set_verification_stage`, ...) wired to its realtime channel. All
//! animation progress derives from the clock handed to `tick`, so a
//! dropped frame skips ahead instead of slowing the story down.

pub mod animators;
pub mod choreographer;
pub mod controller;
pub mod hooks;
pub mod phase;
pub mod triggers;

pub use choreographer::{CameraChoreographer, CameraEvent};
pub use controller::PhaseController;
pub use hooks::{CompletionHooks, Hook, HookEvent};
pub use phase::Phase;
pub use triggers::{FileInfo, StageParseError, VerificationStage};
