use serde::{Deserialize, Serialize};

/// Why a change record was emitted for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeReason {
    /// The entity became visible to the cache (snapshot row or new insert).
    Add,
    /// A tracked entity's fields were modified.
    Update,
    /// The entity was deleted from the store.
    Remove,
    /// The entity was re-affirmed unchanged; consumers may refresh derived
    /// state but the cached value is the same logical entity.
    Refresh,
}
