//! Consumer-side fold of change sets into a keyed map.
//!
//! The synchronizer only emits deltas; this helper is the canonical fold
//! a consumer runs over them to maintain a `Key -> Entity` view. It has
//! no events and no interior mutability, so it can live inside whatever
//! state a subscriber already owns.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use crate::models::{ChangeReason, ChangeRecord, ChangeSet};

/// A `Key -> Entity` mapping maintained by applying change sets in order.
#[derive(Debug)]
pub struct KeyedCache<K, E> {
    entries: HashMap<K, Arc<E>>,
}

impl<K, E> KeyedCache<K, E>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Applies every record of `set` in delivery order.
    pub fn apply(&mut self, set: &ChangeSet<K, E>) {
        for record in set {
            self.apply_record(record);
        }
    }

    /// Applies a single record. Add, Update and Refresh all (re)install
    /// the carried entity handle; Remove deletes the key. Removing an
    /// unknown key is a no-op: the snapshot/live race makes that possible
    /// for early deltas.
    pub fn apply_record(&mut self, record: &ChangeRecord<K, E>) {
        match record.reason {
            ChangeReason::Add | ChangeReason::Update | ChangeReason::Refresh => {
                self.entries
                    .insert(record.key.clone(), Arc::clone(&record.entity));
            }
            ChangeReason::Remove => {
                self.entries.remove(&record.key);
            }
        }
    }

    pub fn get(&self, key: &K) -> Option<&Arc<E>> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    pub fn entities(&self) -> impl Iterator<Item = &Arc<E>> {
        self.entries.values()
    }
}

impl<K, E> Default for KeyedCache<K, E>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
