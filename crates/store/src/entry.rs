use serde::{Deserialize, Serialize};
use stackstore_tag::Compound;

/// One reconstructed snapshot handed out by the store.
///
/// Always freshly computed from the base plus a queued diff; holding an
/// entry never aliases store state. A single concrete backing (tag trees)
/// exists today; the wrapper is the seam where an alternative backing
/// format would slot in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    tag: Compound,
}

impl SnapshotEntry {
    pub fn new(tag: Compound) -> Self {
        Self { tag }
    }

    /// The full snapshot tree.
    pub fn tag(&self) -> &Compound {
        &self.tag
    }

    pub fn into_tag(self) -> Compound {
        self.tag
    }
}

impl From<Compound> for SnapshotEntry {
    fn from(tag: Compound) -> Self {
        Self::new(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_and_unwraps() {
        let mut tag = Compound::new();
        tag.insert("Health", 20.0);
        let entry = SnapshotEntry::new(tag.clone());
        assert_eq!(entry.tag(), &tag);
        assert_eq!(entry.into_tag(), tag);
    }
}
