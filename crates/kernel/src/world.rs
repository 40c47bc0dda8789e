use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use stackstore_common::{EntityId, EntityKind, Location};
use stackstore_tag::Compound;

use crate::entity::LiveEntity;
use crate::snapshot::{self, SnapshotError};

/// An event record produced by world mutations.
///
/// Materialization is logged separately from spawning: a materialized
/// entity exists as a value but has not been inserted into the world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WorldEvent {
    /// Entity was inserted into the world.
    Spawned { id: EntityId, kind: EntityKind },
    /// Entity was removed from the world.
    Despawned { id: EntityId, kind: EntityKind },
    /// Entity was reconstructed from a snapshot tree.
    Materialized { id: EntityId, kind: EntityKind },
}

/// The authoritative world state.
///
/// All mutations go through explicit operations. Uses BTreeMap for
/// deterministic iteration order across all platforms.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct World {
    entities: BTreeMap<EntityId, LiveEntity>,
    /// Append-only event log of all mutations.
    #[serde(skip)]
    event_log: Vec<WorldEvent>,
}

impl World {
    /// Create an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entities in the world.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Read-only access to all entities (BTreeMap for deterministic iteration).
    pub fn entities(&self) -> &BTreeMap<EntityId, LiveEntity> {
        &self.entities
    }

    /// Resolve an entity by id. Returns `None` once the entity despawns;
    /// holders of an [`EntityId`] must tolerate that at any time.
    pub fn entity(&self, id: EntityId) -> Option<&LiveEntity> {
        self.entities.get(&id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut LiveEntity> {
        self.entities.get_mut(&id)
    }

    /// Insert an entity into the world. Returns its id.
    pub fn spawn(&mut self, entity: LiveEntity) -> EntityId {
        let id = entity.id;
        let kind = entity.kind;
        tracing::debug!(%id, %kind, "spawning entity");
        self.entities.insert(id, entity);
        self.event_log.push(WorldEvent::Spawned { id, kind });
        id
    }

    /// Remove an entity. Returns the entity if it existed.
    pub fn despawn(&mut self, id: EntityId) -> Option<LiveEntity> {
        let entity = self.entities.remove(&id);
        if let Some(ref e) = entity {
            tracing::debug!(%id, kind = %e.kind, "despawning entity");
            self.event_log.push(WorldEvent::Despawned { id, kind: e.kind });
        }
        entity
    }

    /// Construct a live entity from a full snapshot tree, positioned at
    /// `location`. The entity is returned, not inserted; callers decide
    /// whether it joins the world. Unless `suppress_events` is set, a
    /// [`WorldEvent::Materialized`] record is logged.
    pub fn instantiate(
        &mut self,
        tag: &Compound,
        location: Location,
        suppress_events: bool,
        kind: EntityKind,
    ) -> Result<LiveEntity, SnapshotError> {
        let entity = snapshot::entity_from_tag(tag, location, kind)?;
        if !suppress_events {
            self.event_log.push(WorldEvent::Materialized {
                id: entity.id,
                kind,
            });
        }
        Ok(entity)
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[WorldEvent] {
        &self.event_log
    }
}
