use serde::{Deserialize, Serialize};

/// Lifecycle state the store reports for an entity in a feed event.
///
/// The set is closed: translation matches exhaustively over it, so adding a
/// state is a compile-visible change for every consumer of the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityState {
    /// The entity is leaving observation entirely.
    Detached,
    /// The entity was re-affirmed without a field delta (e.g. a save that
    /// touched nothing).
    Unchanged,
    /// The entity was deleted from the store.
    Deleted,
    /// A tracked entity's fields were modified.
    Modified,
    /// The entity became newly tracked.
    Added,
}

impl EntityState {
    /// True for the states that change the cardinality of the tracked set.
    pub fn affects_count(self) -> bool {
        matches!(self, EntityState::Added | EntityState::Deleted)
    }
}
