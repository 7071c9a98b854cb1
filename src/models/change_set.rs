use std::sync::Arc;

use super::change_reason::ChangeReason;
use super::change_record::ChangeRecord;

/// An ordered batch of change records delivered atomically to a subscriber.
///
/// Record order is detection order. A set is assembled once and immutable
/// afterwards; the live path emits singleton sets, the snapshot path emits
/// one batch of Add records.
#[derive(Debug)]
pub struct ChangeSet<K, E> {
    records: Vec<ChangeRecord<K, E>>,
}

impl<K, E> ChangeSet<K, E> {
    /// Assembles a set from already-translated records, preserving their
    /// arrival order.
    pub fn from_records(records: Vec<ChangeRecord<K, E>>) -> Self {
        Self { records }
    }

    /// Assembles a live delta: exactly one record.
    pub fn singleton(record: ChangeRecord<K, E>) -> Self {
        Self {
            records: vec![record],
        }
    }

    /// Assembles the snapshot set: one Add record per entity, in the order
    /// the snapshot source returned them.
    pub fn initial<F>(entities: Vec<Arc<E>>, key: F) -> Self
    where
        F: Fn(&E) -> K,
    {
        let records = entities
            .into_iter()
            .map(|entity| {
                let k = key(&entity);
                ChangeRecord::new(ChangeReason::Add, k, entity)
            })
            .collect();
        Self { records }
    }

    /// Records in delivery order.
    pub fn records(&self) -> &[ChangeRecord<K, E>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records carrying the given reason.
    pub fn count_of(&self, reason: ChangeReason) -> usize {
        self.records.iter().filter(|r| r.reason == reason).count()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChangeRecord<K, E>> {
        self.records.iter()
    }
}

impl<K, E> IntoIterator for ChangeSet<K, E> {
    type Item = ChangeRecord<K, E>;
    type IntoIter = std::vec::IntoIter<ChangeRecord<K, E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a, K, E> IntoIterator for &'a ChangeSet<K, E> {
    type Item = &'a ChangeRecord<K, E>;
    type IntoIter = std::slice::Iter<'a, ChangeRecord<K, E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl<K: Clone, E> Clone for ChangeSet<K, E> {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
        }
    }
}
