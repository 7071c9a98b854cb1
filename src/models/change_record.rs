use std::sync::Arc;

use super::change_reason::ChangeReason;

/// A single keyed change, immutable once created.
///
/// The entity is a shared handle into the store's data; the record never
/// owns it.
#[derive(Debug)]
pub struct ChangeRecord<K, E> {
    /// Why this record exists.
    pub reason: ChangeReason,
    /// Key extracted from the entity.
    pub key: K,
    /// Handle to the entity as observed when the change was translated.
    pub entity: Arc<E>,
}

impl<K, E> ChangeRecord<K, E> {
    /// Creates a record for `key`/`entity` with the given reason.
    pub fn new(reason: ChangeReason, key: K, entity: Arc<E>) -> Self {
        Self { reason, key, entity }
    }
}

impl<K: Clone, E> Clone for ChangeRecord<K, E> {
    fn clone(&self) -> Self {
        Self {
            reason: self.reason,
            key: self.key.clone(),
            entity: Arc::clone(&self.entity),
        }
    }
}
