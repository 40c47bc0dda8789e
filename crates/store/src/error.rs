use stackstore_kernel::SnapshotError;
use stackstore_tag::TagError;

/// Failures from stacked store operations.
///
/// `Codec`, `Truncated`, and `BadEntryCount` together form the corruption
/// class: a serialized stack that cannot be read back. Callers log and
/// discard the stack rather than crash. `Empty` is a caller bug (check
/// `is_empty` first). Anchor absence is deliberately not represented here;
/// anchor-dependent operations degrade to no-ops instead.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("stacked entity data codec failure: {0}")]
    Codec(#[from] TagError),
    #[error("serialized stack truncated while reading {context}")]
    Truncated { context: &'static str },
    #[error("serialized stack declares invalid entry count {count}")]
    BadEntryCount { count: i32 },
    #[error("store holds no stacked entries")]
    Empty,
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}
