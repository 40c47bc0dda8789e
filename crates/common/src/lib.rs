//! Shared types for the stackstore engine.

pub mod types;

pub use types::{EntityId, EntityKind, Location};
