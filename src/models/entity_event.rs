use std::sync::Arc;

use super::entity_state::EntityState;

/// A raw lifecycle event emitted by the store for one entity.
///
/// The entity is carried as a shared handle; the store keeps ownership and
/// the cache only observes.
#[derive(Debug)]
pub struct EntityEvent<E> {
    /// Handle to the affected entity.
    pub entity: Arc<E>,
    /// Lifecycle state the store reported for it.
    pub state: EntityState,
}

impl<E> EntityEvent<E> {
    /// Creates an event for `entity` in `state`.
    pub fn new(entity: Arc<E>, state: EntityState) -> Self {
        Self { entity, state }
    }
}

// Manual impl: cloning the event must not require `E: Clone`, only the
// handle is duplicated.
impl<E> Clone for EntityEvent<E> {
    fn clone(&self) -> Self {
        Self {
            entity: Arc::clone(&self.entity),
            state: self.state,
        }
    }
}
