//! Snapshot adapter: conversion between live entities and tag trees.
//!
//! The tree layout here is the persistence contract of the runtime. Field
//! names are exported as constants so that other layers (notably the
//! stacked store's strip pass) refer to them by name rather than by
//! string literal.

use glam::Vec3;
use stackstore_common::{EntityId, EntityKind, Location};
use stackstore_tag::{Compound, Tag};
use uuid::Uuid;

use crate::entity::{Attribute, AttributeModifier, LiveEntity};

/// Field names used by the snapshot tree layout.
pub mod fields {
    pub const UUID: &str = "UUID";
    pub const POS: &str = "Pos";
    pub const MOTION: &str = "Motion";
    pub const ROTATION: &str = "Rotation";
    pub const HEALTH: &str = "Health";
    pub const FIRE: &str = "Fire";
    pub const ATTRIBUTES: &str = "Attributes";
    pub const NAME: &str = "Name";
    pub const BASE: &str = "Base";
    pub const MODIFIERS: &str = "Modifiers";
    pub const AMOUNT: &str = "Amount";
    pub const OPERATION: &str = "Operation";
    pub const CUSTOM_DATA: &str = "CustomData";
    pub const LEASH: &str = "Leash";
    pub const ACTIVE_EFFECTS: &str = "ActiveEffects";
}

/// Top-level fields that are always safe to drop from a snapshot: they are
/// either regenerated by the runtime or vary between otherwise identical
/// entities.
pub const REMOVABLE_KEYS: &[&str] = &[
    fields::UUID,
    fields::POS,
    fields::MOTION,
    fields::ROTATION,
    fields::LEASH,
    fields::ACTIVE_EFFECTS,
];

/// Failures converting a tag tree back into a live entity.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot field `{field}` is malformed")]
    Malformed { field: &'static str },
    #[error("snapshot field `{field}` holds invalid identifier `{value}`")]
    BadIdentifier { field: &'static str, value: String },
}

/// Capture a full snapshot of a live entity as a tag tree.
///
/// Produces every field the runtime persists for the entity, including the
/// volatile ones (position, motion, identifiers); stripping is the stacked
/// store's concern, not the adapter's.
pub fn capture_snapshot(entity: &LiveEntity) -> Compound {
    let mut tag = Compound::new();
    tag.insert(fields::UUID, entity.id.0.to_string());
    tag.insert(fields::POS, vec3_tag(entity.position.0));
    tag.insert(fields::MOTION, vec3_tag(entity.velocity.0));
    tag.insert(fields::HEALTH, entity.health);
    tag.insert(fields::FIRE, entity.fire_ticks);

    if !entity.attributes.is_empty() {
        let attributes: Vec<Tag> = entity.attributes.iter().map(attribute_tag).collect();
        tag.insert(fields::ATTRIBUTES, attributes);
    }

    tag.insert(fields::CUSTOM_DATA, entity.custom_data.clone());
    tag
}

fn vec3_tag(v: Vec3) -> Vec<Tag> {
    vec![
        Tag::Float(v.x as f64),
        Tag::Float(v.y as f64),
        Tag::Float(v.z as f64),
    ]
}

fn attribute_tag(attribute: &Attribute) -> Tag {
    let mut tag = Compound::new();
    tag.insert(fields::NAME, attribute.name.as_str());
    tag.insert(fields::BASE, attribute.base);
    tag.insert(fields::UUID, attribute.id.to_string());
    if !attribute.modifiers.is_empty() {
        let modifiers: Vec<Tag> = attribute.modifiers.iter().map(modifier_tag).collect();
        tag.insert(fields::MODIFIERS, modifiers);
    }
    Tag::Compound(tag)
}

fn modifier_tag(modifier: &AttributeModifier) -> Tag {
    let mut tag = Compound::new();
    tag.insert(fields::NAME, modifier.name.as_str());
    tag.insert(fields::AMOUNT, modifier.amount);
    tag.insert(fields::OPERATION, modifier.operation);
    tag.insert(fields::UUID, modifier.id.to_string());
    Tag::Compound(tag)
}

/// Rebuild a live entity from a full snapshot tree at the given location.
///
/// Fields absent from the tree fall back to runtime defaults; a missing
/// identifier gets a fresh one. The entity is positioned at `location`
/// regardless of any position data in the tree.
pub(crate) fn entity_from_tag(
    tag: &Compound,
    location: Location,
    kind: EntityKind,
) -> Result<LiveEntity, SnapshotError> {
    let id = match tag.get_str(fields::UUID) {
        Some(raw) => EntityId(parse_uuid(fields::UUID, raw)?),
        None => EntityId::new(),
    };

    let velocity = match tag.get_list(fields::MOTION) {
        Some(items) => Location(vec3_from_tags(fields::MOTION, items)?),
        None => Location::ORIGIN,
    };

    let mut attributes = Vec::new();
    if let Some(items) = tag.get_list(fields::ATTRIBUTES) {
        for item in items {
            let compound = item
                .as_compound()
                .ok_or(SnapshotError::Malformed { field: fields::ATTRIBUTES })?;
            attributes.push(attribute_from_tag(compound)?);
        }
    }

    Ok(LiveEntity {
        id,
        kind,
        position: location,
        velocity,
        health: tag.get_f64(fields::HEALTH).unwrap_or(20.0),
        fire_ticks: tag.get_i64(fields::FIRE).unwrap_or(0),
        attributes,
        custom_data: tag.get_compound(fields::CUSTOM_DATA).cloned().unwrap_or_default(),
    })
}

fn attribute_from_tag(tag: &Compound) -> Result<Attribute, SnapshotError> {
    let name = tag
        .get_str(fields::NAME)
        .ok_or(SnapshotError::Malformed { field: fields::NAME })?
        .to_string();
    let id = match tag.get_str(fields::UUID) {
        Some(raw) => parse_uuid(fields::UUID, raw)?,
        None => Uuid::new_v4(),
    };

    let mut modifiers = Vec::new();
    if let Some(items) = tag.get_list(fields::MODIFIERS) {
        for item in items {
            let compound = item
                .as_compound()
                .ok_or(SnapshotError::Malformed { field: fields::MODIFIERS })?;
            modifiers.push(modifier_from_tag(compound)?);
        }
    }

    Ok(Attribute {
        name,
        base: tag.get_f64(fields::BASE).unwrap_or(0.0),
        id,
        modifiers,
    })
}

fn modifier_from_tag(tag: &Compound) -> Result<AttributeModifier, SnapshotError> {
    let name = tag
        .get_str(fields::NAME)
        .ok_or(SnapshotError::Malformed { field: fields::NAME })?
        .to_string();
    let id = match tag.get_str(fields::UUID) {
        Some(raw) => parse_uuid(fields::UUID, raw)?,
        None => Uuid::new_v4(),
    };
    Ok(AttributeModifier {
        name,
        amount: tag.get_f64(fields::AMOUNT).unwrap_or(0.0),
        operation: tag.get_i64(fields::OPERATION).unwrap_or(0),
        id,
    })
}

fn parse_uuid(field: &'static str, raw: &str) -> Result<Uuid, SnapshotError> {
    raw.parse().map_err(|_| SnapshotError::BadIdentifier {
        field,
        value: raw.to_string(),
    })
}

fn vec3_from_tags(field: &'static str, items: &[Tag]) -> Result<Vec3, SnapshotError> {
    if items.len() != 3 {
        return Err(SnapshotError::Malformed { field });
    }
    let mut parts = [0.0f32; 3];
    for (slot, item) in parts.iter_mut().zip(items) {
        *slot = item.as_f64().ok_or(SnapshotError::Malformed { field })? as f32;
    }
    Ok(Vec3::from_array(parts))
}
