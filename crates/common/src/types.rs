use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an entity in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A point in world space. Velocities reuse the same representation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location(pub Vec3);

impl Location {
    pub const ORIGIN: Self = Self(Vec3::ZERO);

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self(Vec3::new(x, y, z))
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::ORIGIN
    }
}

/// The runtime type of a live entity.
///
/// Stacks only ever hold entities of a single kind; the kind is captured
/// from the anchor at store creation and passed back to the runtime when
/// snapshots are materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Zombie,
    Skeleton,
    Creeper,
    Cow,
    Sheep,
    Pig,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Zombie => "zombie",
            EntityKind::Skeleton => "skeleton",
            EntityKind::Creeper => "creeper",
            EntityKind::Cow => "cow",
            EntityKind::Sheep => "sheep",
            EntityKind::Pig => "pig",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_uniqueness() {
        let a = EntityId::new();
        let b = EntityId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn location_default_is_origin() {
        assert_eq!(Location::default(), Location::ORIGIN);
        assert_eq!(Location::new(0.0, 0.0, 0.0), Location::ORIGIN);
    }

    #[test]
    fn entity_kind_display() {
        assert_eq!(EntityKind::Zombie.to_string(), "zombie");
        assert_eq!(EntityKind::Cow.to_string(), "cow");
    }
}
