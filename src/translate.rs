//! Translation of raw lifecycle events into keyed change records.

use std::sync::Arc;

use crate::models::{ChangeReason, ChangeRecord, EntityEvent, EntityState};

/// Extracts the identity of an entity. Must be total, side-effect-free and
/// stable for the entity's lifetime.
pub type KeyExtractor<E, K> = Arc<dyn Fn(&E) -> K + Send + Sync>;

/// Narrows a stream to entities the function accepts.
pub type Predicate<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Maps one lifecycle event to at most one change record.
///
/// The predicate is consulted first: a rejected entity produces nothing
/// regardless of state, which lets derived views (watch in particular)
/// reuse this mapping with a key-equality predicate. Detached entities
/// produce nothing; they are leaving observation, not changing.
pub fn translate<K, E>(
    event: &EntityEvent<E>,
    predicate: Option<&Predicate<E>>,
    key: &KeyExtractor<E, K>,
) -> Option<ChangeRecord<K, E>> {
    if let Some(accept) = predicate {
        if !accept(&event.entity) {
            return None;
        }
    }

    let reason = match event.state {
        EntityState::Detached => return None,
        EntityState::Unchanged => ChangeReason::Refresh,
        EntityState::Deleted => ChangeReason::Remove,
        EntityState::Modified => ChangeReason::Update,
        EntityState::Added => ChangeReason::Add,
    };

    Some(ChangeRecord::new(
        reason,
        key(&event.entity),
        Arc::clone(&event.entity),
    ))
}
