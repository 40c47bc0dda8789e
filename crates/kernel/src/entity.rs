use serde::{Deserialize, Serialize};
use stackstore_common::{EntityId, EntityKind, Location};
use stackstore_tag::Compound;
use uuid::Uuid;

/// A modifier applied to an entity attribute.
///
/// The runtime requires every modifier to carry a syntactically valid,
/// distinct identifier; the identifier's value carries no meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeModifier {
    pub name: String,
    pub amount: f64,
    pub operation: i64,
    pub id: Uuid,
}

impl AttributeModifier {
    pub fn new(name: impl Into<String>, amount: f64, operation: i64) -> Self {
        Self {
            name: name.into(),
            amount,
            operation,
            id: Uuid::new_v4(),
        }
    }
}

/// A named entity attribute with a base value and zero or more modifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub base: f64,
    pub id: Uuid,
    pub modifiers: Vec<AttributeModifier>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, base: f64) -> Self {
        Self {
            name: name.into(),
            base,
            id: Uuid::new_v4(),
            modifiers: Vec::new(),
        }
    }

    pub fn with_modifier(mut self, modifier: AttributeModifier) -> Self {
        self.modifiers.push(modifier);
        self
    }
}

/// A live entity instance owned by the world runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveEntity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: Location,
    pub velocity: Location,
    pub health: f64,
    pub fire_ticks: i64,
    pub attributes: Vec<Attribute>,
    /// Plugin-owned auxiliary data carried alongside the entity.
    pub custom_data: Compound,
}

impl LiveEntity {
    /// A fresh entity of the given kind at rest at `position`.
    pub fn new(kind: EntityKind, position: Location) -> Self {
        Self {
            id: EntityId::new(),
            kind,
            position,
            velocity: Location::ORIGIN,
            health: 20.0,
            fire_ticks: 0,
            attributes: Vec::new(),
            custom_data: Compound::new(),
        }
    }

    pub fn with_health(mut self, health: f64) -> Self {
        self.health = health;
        self
    }

    pub fn with_fire_ticks(mut self, ticks: i64) -> Self {
        self.fire_ticks = ticks;
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }
}
