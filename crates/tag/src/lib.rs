//! Structured tag trees: the snapshot representation for stacked entities.
//!
//! # Invariants
//! - Field names within a compound are unique.
//! - Compound equality is deep and insertion-order-insensitive; insertion
//!   order is still preserved for serialization.
//! - The codec round-trips any tree byte-for-byte.

pub mod codec;
pub mod compound;
pub mod value;

pub use codec::TagError;
pub use compound::Compound;
pub use value::Tag;
