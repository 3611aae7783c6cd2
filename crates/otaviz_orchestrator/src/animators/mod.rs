//! Actor animators
//!
//! One animator per scene group. Animators are handed mutable access to
//! the actor store once per tick, compute transforms from phase progress
//! and absolute scene time, and never retain actor references between
//! ticks. A missing actor skips the write for one tick with a trace line
//! rather than failing the tick.

pub mod final_decryption;
pub mod hash_merge;
pub mod key_exchange;
pub mod ledger;
pub mod retrieval;

pub use final_decryption::{FinalDecryptionAnimator, FinalEvent};
pub use hash_merge::HashMergeAnimator;
pub use key_exchange::KeyExchangeAnimator;
pub use ledger::LedgerAnimator;
pub use retrieval::RetrievalAnimator;

use otaviz_core::Vec3;
use otaviz_scene::{Actor, ActorStore};

/// Aim a unit-depth connector actor from `a` to `b`: midpoint position,
/// yaw/pitch pointing along the segment, z-scale set to the length.
pub(crate) fn place_connector(store: &mut ActorStore, name: &str, a: Vec3, b: Vec3, girth: f32) {
    let Some(actor) = store.by_name_mut(name) else {
        tracing::trace!(name, "connector missing, skipping");
        return;
    };
    let mid = a.lerp(&b, 0.5);
    let dir = b.sub(a);
    let len = dir.length();
    let (yaw, pitch) = if len > 1e-6 {
        (dir.x.atan2(dir.z), -(dir.y / len).asin())
    } else {
        (0.0, 0.0)
    };
    actor.apply_transform(mid, Vec3::new(pitch, yaw, 0.0), Vec3::new(girth, girth, len));
}

/// Quadratic Bézier point
pub(crate) fn bezier(p0: Vec3, ctrl: Vec3, p2: Vec3, t: f32) -> Vec3 {
    let u = 1.0 - t;
    p0.scale(u * u)
        .add(ctrl.scale(2.0 * u * t))
        .add(p2.scale(t * t))
}

/// Fetch a mutable actor, tracing and yielding `None` when absent
pub(crate) fn actor_mut<'a>(store: &'a mut ActorStore, name: &str) -> Option<&'a mut Actor> {
    let found = store.by_name_mut(name);
    if found.is_none() {
        tracing::trace!(name, "actor missing, skipping");
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bezier_endpoints_and_apex() {
        let p0 = Vec3::new(-6.0, 0.2, 0.0);
        let ctrl = Vec3::new(-1.9, 3.5, 0.0);
        let p2 = Vec3::new(2.2, 1.5, 0.0);
        assert!(bezier(p0, ctrl, p2, 0.0).distance(p0) < 1e-6);
        assert!(bezier(p0, ctrl, p2, 1.0).distance(p2) < 1e-6);
        // Control point pulls the midpoint above both endpoints.
        assert!(bezier(p0, ctrl, p2, 0.5).y > p0.y.max(p2.y));
    }

    #[test]
    fn test_place_connector_spans_segment() {
        let mut store = ActorStore::new();
        store.spawn(Actor::new("edge-1"));
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(0.0, 3.0, 4.0);
        place_connector(&mut store, "edge-1", a, b, 0.05);
        let edge = store.by_name("edge-1").unwrap();
        assert!((edge.scale.z - 5.0).abs() < 1e-5);
        assert!(edge.position.distance(a.lerp(&b, 0.5)) < 1e-6);
    }
}
