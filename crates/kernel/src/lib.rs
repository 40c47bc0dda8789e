//! Host world runtime: authoritative live-entity state and the snapshot
//! adapter that converts entities to and from tag trees.
//!
//! # Invariants
//! - All entity mutations flow through explicit world operations.
//! - `capture_snapshot` followed by `instantiate` round-trips every
//!   persisted field except position (overridden by the caller's location).

pub mod entity;
pub mod snapshot;
pub mod world;

pub use entity::{Attribute, AttributeModifier, LiveEntity};
pub use snapshot::{REMOVABLE_KEYS, SnapshotError, capture_snapshot, fields};
pub use world::{World, WorldEvent};
