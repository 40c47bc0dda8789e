//! Stacked entity snapshot store.
//!
//! Holds one canonical base snapshot per stack plus a FIFO queue of minimal
//! diffs against it, so per-entry memory is proportional to how much an
//! entity differs from the stack's template rather than to full snapshot
//! size.
//!
//! # Invariants
//! - The base snapshot is immutable after the construction-time strip pass.
//! - Reconstructed snapshots are always computed fresh; they are never
//!   cached or stored.
//! - Queue order is insertion order; batch operations never expose a
//!   partially-updated queue.

pub mod diff;
pub mod entry;
pub mod error;
pub mod rekey;
pub mod store;

pub use entry::SnapshotEntry;
pub use error::StorageError;
pub use store::StackedEntityStore;
