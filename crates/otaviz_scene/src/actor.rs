//! Actors and actor storage

use otaviz_core::{Color, Vec3};
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use thiserror::Error;

new_key_type! {
    /// Handle to an actor in the store
    pub struct ActorId;
}

/// Scene-level error surface
///
/// Animators treat a missing actor as "skip this step for one tick", so
/// these errors never propagate past a log line.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("actor not found: {0}")]
    MissingActor(String),
}

/// Material emphasis parameters
///
/// Animators express highlight state as a mix between a base and a
/// highlight color rather than swapping materials, mirroring how the
/// renderer blends emissive contributions.
#[derive(Clone, Copy, Debug)]
pub struct MaterialEmphasis {
    /// Resting color
    pub base_color: Color,
    /// Color at full emphasis
    pub highlight_color: Color,
    /// Blend factor between base and highlight, `[0, 1]`
    pub mix: f32,
    /// Emissive strength
    pub emissive_intensity: f32,
    /// Opacity, `[0, 1]`
    pub opacity: f32,
}

impl Default for MaterialEmphasis {
    fn default() -> Self {
        Self {
            base_color: Color::WHITE,
            highlight_color: Color::WHITE,
            mix: 0.0,
            emissive_intensity: 0.0,
            opacity: 1.0,
        }
    }
}

impl MaterialEmphasis {
    pub fn solid(color: Color) -> Self {
        Self {
            base_color: color,
            highlight_color: color,
            ..Default::default()
        }
    }

    /// Current blended color
    pub fn color(&self) -> Color {
        Color::lerp(&self.base_color, &self.highlight_color, self.mix)
    }
}

/// One animated visual entity
///
/// Created once at scene mount (transfer clones excepted), mutated every
/// tick by exactly one animator, never destroyed except transient clones
/// which are discarded on phase exit.
#[derive(Clone, Debug)]
pub struct Actor {
    pub name: String,
    pub position: Vec3,
    /// Euler rotation in radians (x, y, z)
    pub rotation: Vec3,
    pub scale: Vec3,
    pub material: MaterialEmphasis,
    pub visible: bool,
    /// Transient clones are discarded on phase exit
    pub transient: bool,
}

impl Actor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            material: MaterialEmphasis::default(),
            visible: true,
            transient: false,
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    pub fn with_material(mut self, material: MaterialEmphasis) -> Self {
        self.material = material;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }

    /// Narrow write surface for animators: apply a computed transform
    pub fn apply_transform(&mut self, position: Vec3, rotation: Vec3, scale: Vec3) {
        self.position = position;
        self.rotation = rotation;
        self.scale = scale;
    }
}

/// Keyed actor storage with a name index
#[derive(Default)]
pub struct ActorStore {
    actors: SlotMap<ActorId, Actor>,
    by_name: FxHashMap<String, ActorId>,
}

impl ActorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an actor, indexing it by name. Replaces any previous actor
    /// with the same name.
    pub fn spawn(&mut self, actor: Actor) -> ActorId {
        if let Some(old) = self.by_name.remove(&actor.name) {
            self.actors.remove(old);
        }
        let name = actor.name.clone();
        let id = self.actors.insert(actor);
        self.by_name.insert(name, id);
        id
    }

    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(id)
    }

    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(id)
    }

    pub fn id_of(&self, name: &str) -> Option<ActorId> {
        self.by_name.get(name).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<&Actor> {
        self.id_of(name).and_then(|id| self.actors.get(id))
    }

    pub fn by_name_mut(&mut self, name: &str) -> Option<&mut Actor> {
        let id = self.id_of(name)?;
        self.actors.get_mut(id)
    }

    /// Name lookup that surfaces the miss as a typed error. For actors
    /// whose absence is an invariant violation, not a skippable frame.
    pub fn require(&self, name: &str) -> Result<&Actor, SceneError> {
        self.by_name(name)
            .ok_or_else(|| SceneError::MissingActor(name.to_string()))
    }

    pub fn remove(&mut self, id: ActorId) -> Option<Actor> {
        let actor = self.actors.remove(id)?;
        self.by_name.remove(&actor.name);
        Some(actor)
    }

    pub fn remove_named(&mut self, name: &str) -> Option<Actor> {
        let id = self.by_name.remove(name)?;
        self.actors.remove(id)
    }

    /// Drop every transient clone (called on phase exit)
    pub fn discard_transient(&mut self) {
        let doomed: Vec<ActorId> = self
            .actors
            .iter()
            .filter(|(_, a)| a.transient)
            .map(|(id, _)| id)
            .collect();
        if !doomed.is_empty() {
            tracing::debug!(count = doomed.len(), "discarding transient actors");
        }
        for id in doomed {
            if let Some(actor) = self.actors.remove(id) {
                self.by_name.remove(&actor.name);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ActorId, &Actor)> {
        self.actors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_and_lookup() {
        let mut store = ActorStore::new();
        let id = store.spawn(Actor::new("block-0").with_position(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(store.id_of("block-0"), Some(id));
        assert!((store.by_name("block-0").unwrap().position.y - 2.0).abs() < 1e-6);
        assert!(store.require("missing").is_err());
    }

    #[test]
    fn test_spawn_same_name_replaces() {
        let mut store = ActorStore::new();
        store.spawn(Actor::new("key"));
        store.spawn(Actor::new("key").with_uniform_scale(2.0));
        assert_eq!(store.len(), 1);
        assert!((store.by_name("key").unwrap().scale.x - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_discard_transient() {
        let mut store = ActorStore::new();
        store.spawn(Actor::new("node-6"));
        store.spawn(Actor::new("node-6-clone").transient());
        store.discard_transient();
        assert_eq!(store.len(), 1);
        assert!(store.by_name("node-6-clone").is_none());
        assert!(store.by_name("node-6").is_some());
    }

    #[test]
    fn test_material_blend() {
        let m = MaterialEmphasis {
            base_color: Color::BLACK,
            highlight_color: Color::WHITE,
            mix: 0.5,
            ..Default::default()
        };
        assert!((m.color().r - 0.5).abs() < 1e-6);
    }
}
