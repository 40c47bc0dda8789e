use std::collections::VecDeque;
use std::io::{Cursor, Read};

use stackstore_common::{EntityId, EntityKind, Location};
use stackstore_kernel::{LiveEntity, World, capture_snapshot};
use stackstore_tag::{Compound, codec};

use crate::diff;
use crate::entry::SnapshotEntry;
use crate::error::StorageError;
use crate::rekey;

/// The stacked snapshot store for one group of near-identical entities.
///
/// Owns the canonical base snapshot and a FIFO queue of diffs against it.
/// The anchor is a weak relation: an [`EntityId`] resolved against the
/// world on every call that needs it, so the anchor despawning at any time
/// degrades anchor-dependent operations to no-ops instead of failing.
#[derive(Debug, Clone)]
pub struct StackedEntityStore {
    anchor: EntityId,
    kind: EntityKind,
    base: Compound,
    queue: VecDeque<Compound>,
}

impl StackedEntityStore {
    /// Create a store anchored on a live entity, capturing its stripped
    /// snapshot as the base. The queue starts empty.
    pub fn new(entity: &LiveEntity) -> Self {
        let mut base = capture_snapshot(entity);
        diff::strip_volatile(&mut base);
        diff::strip_attribute_ids(&mut base);
        Self {
            anchor: entity.id,
            kind: entity.kind,
            base,
            queue: VecDeque::new(),
        }
    }

    /// Restore a store from a serialized buffer, re-anchoring on `entity`.
    ///
    /// The buffer must hold the base tree, a 4-byte big-endian signed entry
    /// count, then exactly that many diff trees. Anything else is reported
    /// as corruption.
    pub fn from_bytes(entity: &LiveEntity, bytes: &[u8]) -> Result<Self, StorageError> {
        let mut cursor = Cursor::new(bytes);
        let base = codec::decode(&mut cursor)?;

        let mut count_bytes = [0u8; 4];
        cursor
            .read_exact(&mut count_bytes)
            .map_err(|_| StorageError::Truncated {
                context: "entry count",
            })?;
        let count = i32::from_be_bytes(count_bytes);
        if count < 0 {
            return Err(StorageError::BadEntryCount { count });
        }

        let mut queue = VecDeque::new();
        for _ in 0..count {
            queue.push_back(codec::decode(&mut cursor)?);
        }
        tracing::debug!(entries = count, bytes = bytes.len(), "restored stack");

        Ok(Self {
            anchor: entity.id,
            kind: entity.kind,
            base,
            queue,
        })
    }

    /// The id of the entity this store is anchored on.
    pub fn anchor(&self) -> EntityId {
        self.anchor
    }

    /// The entity kind shared by every snapshot in this store.
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Number of queued entries.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Capture a live entity, reduce it to a diff against the base, and
    /// append it to the queue tail.
    pub fn add(&mut self, entity: &LiveEntity) {
        let diff = self.process_snapshot(capture_snapshot(entity));
        tracing::debug!(diff_fields = diff.len(), queued = self.queue.len() + 1, "stacked entity");
        self.queue.push_back(diff);
    }

    /// Append a batch of already-captured snapshots, preserving batch order.
    /// Each goes through the same strip-and-diff pipeline as [`add`].
    ///
    /// [`add`]: StackedEntityStore::add
    pub fn add_all(&mut self, entries: Vec<SnapshotEntry>) {
        for entry in entries {
            let diff = self.process_snapshot(entry.into_tag());
            self.queue.push_back(diff);
        }
    }

    /// Append `amount` exact copies of the base snapshot, representing
    /// entities identical to the template.
    pub fn add_clones(&mut self, amount: usize) {
        for _ in 0..amount {
            self.queue.push_back(self.base.clone());
        }
    }

    /// Reconstruct the head entry without removing it.
    pub fn peek(&self) -> Result<SnapshotEntry, StorageError> {
        let diff = self.queue.front().ok_or(StorageError::Empty)?;
        Ok(SnapshotEntry::new(self.rebuild(diff)))
    }

    /// Remove and reconstruct the head entry.
    pub fn pop(&mut self) -> Result<SnapshotEntry, StorageError> {
        let diff = self.queue.pop_front().ok_or(StorageError::Empty)?;
        Ok(SnapshotEntry::new(self.rebuild(&diff)))
    }

    /// Remove and reconstruct up to `amount` entries from the head, in
    /// FIFO order. Returns fewer when the queue is shorter; never fails.
    pub fn pop_many(&mut self, amount: usize) -> Vec<SnapshotEntry> {
        let target = amount.min(self.queue.len());
        let mut popped = Vec::with_capacity(target);
        for _ in 0..target {
            // target is bounded by the queue length.
            if let Some(diff) = self.queue.pop_front() {
                popped.push(SnapshotEntry::new(self.rebuild(&diff)));
            }
        }
        popped
    }

    /// Reconstruct every queued entry, in order, without mutating the queue.
    pub fn get_all(&self) -> Vec<SnapshotEntry> {
        self.queue
            .iter()
            .map(|diff| SnapshotEntry::new(self.rebuild(diff)))
            .collect()
    }

    /// Encode the base plus up to `max_amount` head-first entries into one
    /// contiguous buffer.
    ///
    /// A cap below the queue length makes this a lossy checkpoint: entries
    /// beyond the cap are absent from the buffer but stay queued in memory.
    pub fn serialize(&self, max_amount: usize) -> Result<Vec<u8>, StorageError> {
        let target = max_amount.min(self.queue.len());

        let mut buf = Vec::new();
        codec::encode(&self.base, &mut buf)?;
        buf.extend_from_slice(&(target as i32).to_be_bytes());
        for diff in self.queue.iter().take(target) {
            codec::encode(diff, &mut buf)?;
        }
        tracing::trace!(entries = target, bytes = buf.len(), "serialized stack");
        Ok(buf)
    }

    /// Visit a live instance of every queued entry. Uncapped variant of
    /// [`for_each_capped`].
    ///
    /// [`for_each_capped`]: StackedEntityStore::for_each_capped
    pub fn for_each(
        &self,
        world: &mut World,
        visitor: impl FnMut(LiveEntity),
    ) -> Result<(), StorageError> {
        self.for_each_capped(world, usize::MAX, visitor)
    }

    /// Reconstruct up to `count` entries, instantiate each at the anchor's
    /// current location, and hand them to `visitor` in queue order.
    ///
    /// Silently does nothing when the anchor has despawned.
    pub fn for_each_capped(
        &self,
        world: &mut World,
        count: usize,
        mut visitor: impl FnMut(LiveEntity),
    ) -> Result<(), StorageError> {
        let Some((location, kind)) = self.resolve_anchor(world) else {
            return Ok(());
        };

        let target = count.min(self.queue.len());
        for diff in self.queue.iter().take(target) {
            let tag = self.rebuild(diff);
            let instance = world.instantiate(&tag, location, true, kind)?;
            visitor(instance);
        }
        Ok(())
    }

    /// Evaluate `predicate` against a live instance of every queued entry,
    /// dropping matching entries from the queue. Removed instances are
    /// returned in queue order.
    ///
    /// Returns an empty list without touching the queue when the anchor has
    /// despawned. The queue is swapped in one step, so no partially
    /// filtered state is ever observable.
    pub fn remove_if(
        &mut self,
        world: &mut World,
        mut predicate: impl FnMut(&LiveEntity) -> bool,
    ) -> Result<Vec<LiveEntity>, StorageError> {
        let Some((location, kind)) = self.resolve_anchor(world) else {
            return Ok(Vec::new());
        };

        let mut instances = Vec::with_capacity(self.queue.len());
        for diff in &self.queue {
            let tag = self.rebuild(diff);
            instances.push(world.instantiate(&tag, location, true, kind)?);
        }

        let mut removed = Vec::new();
        let mut kept = VecDeque::with_capacity(self.queue.len());
        for (diff, instance) in self.queue.drain(..).zip(instances) {
            if predicate(&instance) {
                removed.push(instance);
            } else {
                kept.push_back(diff);
            }
        }
        self.queue = kept;
        tracing::debug!(removed = removed.len(), remaining = self.queue.len(), "filtered stack");
        Ok(removed)
    }

    /// Run the fixed pipeline on a freshly captured snapshot: strip
    /// volatile fields, strip attribute identifiers, diff against the base.
    fn process_snapshot(&self, mut tag: Compound) -> Compound {
        diff::strip_volatile(&mut tag);
        diff::strip_attribute_ids(&mut tag);
        diff::diff_against_base(&self.base, &mut tag);
        tag
    }

    /// Merge a queued diff over the base and re-key attribute identifiers.
    /// Always computed fresh; neither the base nor the diff is mutated.
    fn rebuild(&self, diff: &Compound) -> Compound {
        let mut merged = Compound::new();
        merged.overlay(&self.base);
        merged.overlay(diff);
        rekey::reassign_ids(&mut merged);
        merged
    }

    fn resolve_anchor(&self, world: &World) -> Option<(Location, EntityKind)> {
        world
            .entity(self.anchor)
            .map(|entity| (entity.position, entity.kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackstore_kernel::fields;
    use stackstore_kernel::{Attribute, AttributeModifier};

    fn zombie(health: f64) -> LiveEntity {
        LiveEntity::new(EntityKind::Zombie, Location::new(0.0, 64.0, 0.0)).with_health(health)
    }

    fn anchored_store(world: &mut World) -> StackedEntityStore {
        let anchor = zombie(20.0);
        let store = StackedEntityStore::new(&anchor);
        world.spawn(anchor);
        store
    }

    #[test]
    fn new_store_is_empty() {
        let store = StackedEntityStore::new(&zombie(20.0));
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert_eq!(store.kind(), EntityKind::Zombie);
    }

    #[test]
    fn peek_and_pop_on_empty_store_fail() {
        let mut store = StackedEntityStore::new(&zombie(20.0));
        assert!(matches!(store.peek(), Err(StorageError::Empty)));
        assert!(matches!(store.pop(), Err(StorageError::Empty)));
        assert!(store.pop_many(5).is_empty());
    }

    #[test]
    fn diff_entries_hold_only_changed_fields() {
        let mut store = StackedEntityStore::new(&zombie(20.0));
        store.add(&zombie(15.0).with_fire_ticks(2));

        // Inspect the wire form directly: base, count, then the lone diff.
        let bytes = store.serialize(usize::MAX).unwrap();
        let mut cursor = Cursor::new(bytes.as_slice());
        let base = codec::decode(&mut cursor).unwrap();
        assert_eq!(base.get_f64(fields::HEALTH), Some(20.0));

        let mut count_bytes = [0u8; 4];
        cursor.read_exact(&mut count_bytes).unwrap();
        assert_eq!(i32::from_be_bytes(count_bytes), 1);

        let diff = codec::decode(&mut cursor).unwrap();
        assert_eq!(diff.len(), 2);
        assert_eq!(diff.get_f64(fields::HEALTH), Some(15.0));
        assert_eq!(diff.get_i64(fields::FIRE), Some(2));
    }

    #[test]
    fn identical_entity_diffs_to_empty_entry() {
        let mut store = StackedEntityStore::new(&zombie(20.0));
        store.add(&zombie(20.0));

        let bytes = store.serialize(usize::MAX).unwrap();
        let mut cursor = Cursor::new(bytes.as_slice());
        codec::decode(&mut cursor).unwrap();
        let mut count_bytes = [0u8; 4];
        cursor.read_exact(&mut count_bytes).unwrap();
        let diff = codec::decode(&mut cursor).unwrap();
        assert!(diff.is_empty());

        // Reconstruction still yields the full base snapshot.
        let entry = store.pop().unwrap();
        assert_eq!(entry.tag().get_f64(fields::HEALTH), Some(20.0));
    }

    #[test]
    fn stack_scenario_variant_then_clones() {
        let mut store = StackedEntityStore::new(&zombie(20.0));
        store.add(&zombie(15.0).with_fire_ticks(2));
        store.add_clones(3);
        assert_eq!(store.len(), 4);

        let popped = store.pop_many(4);
        assert_eq!(popped.len(), 4);
        assert!(store.is_empty());

        assert_eq!(popped[0].tag().get_f64(fields::HEALTH), Some(15.0));
        assert_eq!(popped[0].tag().get_i64(fields::FIRE), Some(2));
        for entry in &popped[1..] {
            assert_eq!(entry.tag().get_f64(fields::HEALTH), Some(20.0));
            assert_eq!(entry.tag().get_i64(fields::FIRE), Some(0));
        }
    }

    #[test]
    fn pop_order_is_fifo() {
        let mut store = StackedEntityStore::new(&zombie(20.0));
        for health in [1.0, 2.0, 3.0, 4.0, 5.0] {
            store.add(&zombie(health));
        }

        let healths: Vec<f64> = store
            .pop_many(5)
            .iter()
            .map(|e| e.tag().get_f64(fields::HEALTH).unwrap())
            .collect();
        assert_eq!(healths, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn pop_many_caps_at_queue_length() {
        let mut store = StackedEntityStore::new(&zombie(20.0));
        store.add(&zombie(1.0));
        store.add(&zombie(2.0));
        store.add(&zombie(3.0));

        assert_eq!(store.pop_many(2).len(), 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.pop_many(10).len(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn peek_does_not_remove() {
        let mut store = StackedEntityStore::new(&zombie(20.0));
        store.add(&zombie(7.0));

        let peeked = store.peek().unwrap();
        assert_eq!(peeked.tag().get_f64(fields::HEALTH), Some(7.0));
        assert_eq!(store.len(), 1);

        let popped = store.pop().unwrap();
        assert_eq!(popped.tag().get_f64(fields::HEALTH), Some(7.0));
        assert!(store.is_empty());
    }

    #[test]
    fn get_all_leaves_queue_intact() {
        let mut store = StackedEntityStore::new(&zombie(20.0));
        store.add(&zombie(1.0));
        store.add(&zombie(2.0));

        let all = store.get_all();
        assert_eq!(all.len(), 2);
        assert_eq!(store.len(), 2);
        assert_eq!(all[0].tag().get_f64(fields::HEALTH), Some(1.0));
        assert_eq!(all[1].tag().get_f64(fields::HEALTH), Some(2.0));
    }

    #[test]
    fn add_all_preserves_batch_order() {
        let mut store = StackedEntityStore::new(&zombie(20.0));
        let batch: Vec<SnapshotEntry> = [1.0, 2.0, 3.0]
            .iter()
            .map(|&h| SnapshotEntry::new(capture_snapshot(&zombie(h))))
            .collect();
        store.add_all(batch);

        let healths: Vec<f64> = store
            .pop_many(3)
            .iter()
            .map(|e| e.tag().get_f64(fields::HEALTH).unwrap())
            .collect();
        assert_eq!(healths, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn serialize_roundtrip_preserves_entries() {
        let mut store = StackedEntityStore::new(&zombie(20.0));
        store.add(&zombie(5.0));
        store.add(&zombie(10.0).with_fire_ticks(4));
        store.add_clones(1);

        let bytes = store.serialize(store.len()).unwrap();
        let restored = StackedEntityStore::from_bytes(&zombie(20.0), bytes.as_slice()).unwrap();

        assert_eq!(restored.len(), store.len());
        assert_eq!(restored.get_all(), store.get_all());
    }

    #[test]
    fn serialize_roundtrip_with_attributes_matches_modulo_identifiers() {
        let armored = |health: f64| {
            zombie(health).with_attribute(
                Attribute::new("max_health", 20.0)
                    .with_modifier(AttributeModifier::new("armor", 2.0, 0)),
            )
        };
        let mut store = StackedEntityStore::new(&armored(20.0));
        store.add(&armored(12.0));

        let bytes = store.serialize(store.len()).unwrap();
        let restored = StackedEntityStore::from_bytes(&armored(20.0), bytes.as_slice()).unwrap();

        let strip_ids = |entry: &SnapshotEntry| {
            let mut tag = entry.tag().clone();
            diff::strip_attribute_ids(&mut tag);
            tag
        };
        let original: Vec<Compound> = store.get_all().iter().map(&strip_ids).collect();
        let roundtripped: Vec<Compound> = restored.get_all().iter().map(&strip_ids).collect();
        assert_eq!(original, roundtripped);
    }

    #[test]
    fn serialize_cap_is_a_lossy_checkpoint() {
        let mut store = StackedEntityStore::new(&zombie(20.0));
        store.add(&zombie(1.0));
        store.add(&zombie(2.0));
        store.add(&zombie(3.0));

        let bytes = store.serialize(1).unwrap();
        // In-memory queue untouched.
        assert_eq!(store.len(), 3);

        let restored = StackedEntityStore::from_bytes(&zombie(20.0), bytes.as_slice()).unwrap();
        assert_eq!(restored.len(), 1);
        let head = restored.peek().unwrap();
        assert_eq!(head.tag().get_f64(fields::HEALTH), Some(1.0));
    }

    #[test]
    fn serialize_cap_above_len_encodes_exactly_len() {
        let mut store = StackedEntityStore::new(&zombie(20.0));
        store.add(&zombie(1.0));

        let bytes = store.serialize(1000).unwrap();
        let restored = StackedEntityStore::from_bytes(&zombie(20.0), bytes.as_slice()).unwrap();
        assert_eq!(restored.len(), 1);
    }

    #[test]
    fn from_bytes_rejects_empty_buffer() {
        let err = StackedEntityStore::from_bytes(&zombie(20.0), &[]).unwrap_err();
        assert!(matches!(err, StorageError::Codec(_)));
    }

    #[test]
    fn from_bytes_rejects_missing_count() {
        let mut buf = Vec::new();
        codec::encode(&Compound::new(), &mut buf).unwrap();
        let err = StackedEntityStore::from_bytes(&zombie(20.0), &buf).unwrap_err();
        assert!(matches!(err, StorageError::Truncated { .. }));
    }

    #[test]
    fn from_bytes_rejects_negative_count() {
        let mut buf = Vec::new();
        codec::encode(&Compound::new(), &mut buf).unwrap();
        buf.extend_from_slice(&(-1i32).to_be_bytes());
        let err = StackedEntityStore::from_bytes(&zombie(20.0), &buf).unwrap_err();
        assert!(matches!(err, StorageError::BadEntryCount { count: -1 }));
    }

    #[test]
    fn from_bytes_rejects_unsatisfiable_count() {
        let mut buf = Vec::new();
        codec::encode(&Compound::new(), &mut buf).unwrap();
        buf.extend_from_slice(&3i32.to_be_bytes());
        codec::encode(&Compound::new(), &mut buf).unwrap();
        // Claims 3 entries, holds 1.
        let err = StackedEntityStore::from_bytes(&zombie(20.0), &buf).unwrap_err();
        assert!(matches!(err, StorageError::Codec(_)));
    }

    #[test]
    fn reconstruction_rekeys_attribute_identifiers() {
        let anchor = zombie(20.0).with_attribute(
            Attribute::new("max_health", 20.0)
                .with_modifier(AttributeModifier::new("armor", 2.0, 0)),
        );
        let mut store = StackedEntityStore::new(&anchor);
        store.add_clones(1);

        let id_of = |entry: &SnapshotEntry| {
            entry.tag().get_list(fields::ATTRIBUTES).unwrap()[0]
                .as_compound()
                .unwrap()
                .get_str(fields::UUID)
                .unwrap()
                .to_string()
        };
        // Two reconstructions of the same queued entry.
        let first = store.peek().unwrap();
        let second = store.peek().unwrap();
        assert_ne!(id_of(&first), id_of(&second));

        // Everything except the identifiers is identical.
        let strip_ids = |entry: &SnapshotEntry| {
            let mut tag = entry.tag().clone();
            diff::strip_attribute_ids(&mut tag);
            tag
        };
        assert_eq!(strip_ids(&first), strip_ids(&second));
    }

    #[test]
    fn spawn_bonus_only_attribute_loses_its_modifier_list() {
        let anchor = zombie(20.0).with_attribute(
            Attribute::new("max_health", 20.0)
                .with_modifier(AttributeModifier::new(diff::RANDOM_SPAWN_BONUS, 0.05, 1)),
        );
        let mut store = StackedEntityStore::new(&anchor);
        store.add_clones(1);

        let entry = store.pop().unwrap();
        let attribute = entry.tag().get_list(fields::ATTRIBUTES).unwrap()[0]
            .as_compound()
            .unwrap();
        assert!(!attribute.contains_key(fields::MODIFIERS));
    }

    #[test]
    fn rebuilt_entries_keep_base_only_and_diff_only_fields() {
        let mut anchor = zombie(20.0);
        anchor.custom_data.insert("owner", "alice");
        let mut store = StackedEntityStore::new(&anchor);

        let mut variant = zombie(20.0);
        variant.custom_data.insert("owner", "alice");
        variant.custom_data.insert("note", "angry");
        store.add(&variant);

        let entry = store.pop().unwrap();
        let custom = entry.tag().get_compound(fields::CUSTOM_DATA).unwrap();
        // Diff's compound replaced the base's wholesale and carries both keys.
        assert_eq!(custom.get_str("owner"), Some("alice"));
        assert_eq!(custom.get_str("note"), Some("angry"));
        assert_eq!(entry.tag().get_f64(fields::HEALTH), Some(20.0));
    }

    #[test]
    fn for_each_capped_visits_in_order_at_anchor_location() {
        let mut world = World::new();
        let mut store = anchored_store(&mut world);
        store.add(&zombie(1.0));
        store.add(&zombie(2.0));
        store.add(&zombie(3.0));

        let mut seen = Vec::new();
        store
            .for_each_capped(&mut world, 2, |entity| {
                assert_eq!(entity.position, Location::new(0.0, 64.0, 0.0));
                seen.push(entity.health);
            })
            .unwrap();
        assert_eq!(seen, vec![1.0, 2.0]);
        // Iteration never consumes the queue.
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn for_each_visits_everything() {
        let mut world = World::new();
        let mut store = anchored_store(&mut world);
        store.add(&zombie(1.0));
        store.add(&zombie(2.0));

        let mut count = 0;
        store.for_each(&mut world, |_| count += 1).unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn for_each_capped_is_noop_when_anchor_despawned() {
        let mut world = World::new();
        let mut store = anchored_store(&mut world);
        store.add(&zombie(1.0));
        world.despawn(store.anchor());

        let mut count = 0;
        store.for_each_capped(&mut world, 10, |_| count += 1).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn remove_if_matching_none_removes_nothing() {
        let mut world = World::new();
        let mut store = anchored_store(&mut world);
        store.add(&zombie(5.0));
        store.add(&zombie(10.0));

        let removed = store.remove_if(&mut world, |_| false).unwrap();
        assert!(removed.is_empty());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn remove_if_matching_all_drains_queue() {
        let mut world = World::new();
        let mut store = anchored_store(&mut world);
        store.add(&zombie(5.0));
        store.add(&zombie(10.0));

        let removed = store.remove_if(&mut world, |_| true).unwrap();
        assert_eq!(removed.len(), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn remove_if_returns_matches_in_queue_order() {
        let mut world = World::new();
        let mut store = anchored_store(&mut world);
        store.add(&zombie(5.0));
        store.add(&zombie(15.0));
        store.add(&zombie(10.0));

        let removed = store.remove_if(&mut world, |e| e.health < 12.0).unwrap();
        let healths: Vec<f64> = removed.iter().map(|e| e.health).collect();
        assert_eq!(healths, vec![5.0, 10.0]);
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.peek().unwrap().tag().get_f64(fields::HEALTH),
            Some(15.0)
        );
    }

    #[test]
    fn remove_if_is_noop_when_anchor_despawned() {
        let mut world = World::new();
        let mut store = anchored_store(&mut world);
        store.add(&zombie(5.0));
        world.despawn(store.anchor());

        let removed = store.remove_if(&mut world, |_| true).unwrap();
        assert!(removed.is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn detached_store_still_pops_and_serializes() {
        let mut world = World::new();
        let mut store = anchored_store(&mut world);
        store.add(&zombie(5.0));
        world.despawn(store.anchor());

        assert!(store.serialize(usize::MAX).is_ok());
        assert_eq!(
            store.pop().unwrap().tag().get_f64(fields::HEALTH),
            Some(5.0)
        );
    }

    #[test]
    fn add_strips_volatile_fields_from_diffs() {
        let mut store = StackedEntityStore::new(&zombie(20.0));
        // Different position and id: both volatile, neither may survive
        // into the diff.
        let mut wanderer = zombie(20.0);
        wanderer.position = Location::new(100.0, 12.0, -40.0);
        store.add(&wanderer);

        let bytes = store.serialize(usize::MAX).unwrap();
        let mut cursor = Cursor::new(bytes.as_slice());
        codec::decode(&mut cursor).unwrap();
        let mut count_bytes = [0u8; 4];
        cursor.read_exact(&mut count_bytes).unwrap();
        let diff = codec::decode(&mut cursor).unwrap();
        assert!(diff.is_empty());
    }

    #[test]
    fn clone_entries_equal_base_reconstruction() {
        let mut store = StackedEntityStore::new(&zombie(20.0));
        store.add_clones(2);

        let entries = store.pop_many(2);
        assert_eq!(entries[0], entries[1]);
        assert_eq!(entries[0].tag().get_f64(fields::HEALTH), Some(20.0));
        assert!(!entries[0].tag().contains_key(fields::UUID));
    }

    #[test]
    fn serde_count_is_big_endian_on_the_wire() {
        let mut store = StackedEntityStore::new(&zombie(20.0));
        store.add_clones(258); // 0x0102

        let bytes = store.serialize(usize::MAX).unwrap();
        let mut cursor = Cursor::new(bytes.as_slice());
        codec::decode(&mut cursor).unwrap();
        let offset = cursor.position() as usize;
        assert_eq!(&bytes[offset..offset + 4], &[0x00, 0x00, 0x01, 0x02]);
    }
}
