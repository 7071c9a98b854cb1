//! The cache synchronizer: composition point of the snapshot source, the
//! change feed and the key extractor.
//!
//! A [`StoreCache`] is created once per (store, feed, key extractor)
//! triple and hands out independent subscription streams. Streams are
//! cold (every `connect` runs its own snapshot read on first poll) and
//! share nothing beyond the broadcast feed, so no locking happens in the
//! core.

use std::sync::Arc;

use crate::error::{CacheError, Result};
use crate::feed::ChangeFeed;
use crate::store::SnapshotSource;
use crate::subscription::{ChangeSetStream, CountStream, WatchStream};
use crate::translate::{KeyExtractor, Predicate};

/// Observable cache over one store handle and one tracked entity type.
///
/// All four operations ([`connect`](Self::connect),
/// [`preview`](Self::preview), [`watch`](Self::watch) and
/// [`count_changed`](Self::count_changed)) are cheap; the store is only
/// touched when a returned stream is first polled.
pub struct StoreCache<E, K> {
    store: Arc<dyn SnapshotSource<E>>,
    feed: ChangeFeed<E>,
    key: KeyExtractor<E, K>,
}

impl<E, K> std::fmt::Debug for StoreCache<E, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreCache").finish_non_exhaustive()
    }
}

impl<E, K> StoreCache<E, K>
where
    E: Send + Sync + 'static,
    K: Clone + Eq + Send + Sync + 'static,
{
    /// Creates a cache from its three collaborators.
    pub fn new(
        store: Arc<dyn SnapshotSource<E>>,
        feed: ChangeFeed<E>,
        key: impl Fn(&E) -> K + Send + Sync + 'static,
    ) -> Self {
        Self {
            store,
            feed,
            key: Arc::new(key),
        }
    }

    /// Builder for call sites that assemble the collaborators gradually.
    pub fn builder() -> StoreCacheBuilder<E, K> {
        StoreCacheBuilder::new()
    }

    /// Full synchronization stream: one snapshot ChangeSet of Add records,
    /// then every subsequent delta, for as long as the handle lives.
    ///
    /// The snapshot read and the live attach are not atomic with respect
    /// to the store: events fired between the two are not observed. A
    /// consumer that needs a tighter bound must quiesce writers around
    /// subscription.
    ///
    /// With `suppress_empty_change_sets` (the default used by
    /// [`connect_default`](Self::connect_default)) an empty snapshot
    /// produces no emission; live deltas are singletons and never empty.
    pub fn connect(
        &self,
        predicate: Option<Predicate<E>>,
        suppress_empty_change_sets: bool,
    ) -> ChangeSetStream<K, E> {
        ChangeSetStream::connect(
            Arc::clone(&self.store),
            self.feed.clone(),
            Arc::clone(&self.key),
            predicate,
            suppress_empty_change_sets,
        )
    }

    /// [`connect`](Self::connect) with no predicate and empty-set
    /// suppression on.
    pub fn connect_default(&self) -> ChangeSetStream<K, E> {
        self.connect(None, true)
    }

    /// Live deltas only, no snapshot. The feed receiver attaches when the
    /// stream is created.
    pub fn preview(&self, predicate: Option<Predicate<E>>) -> ChangeSetStream<K, E> {
        ChangeSetStream::preview(self.feed.clone(), Arc::clone(&self.key), predicate)
    }

    /// Focused stream for one key: a synthetic Add for the current entity,
    /// then each matching delta unwrapped to its record. Fails with
    /// NotFound when no entity has `key` at lookup time.
    pub fn watch(&self, key: K) -> WatchStream<K, E> {
        WatchStream::new(
            Arc::clone(&self.store),
            self.feed.clone(),
            Arc::clone(&self.key),
            key,
        )
    }

    /// Live cardinality of the tracked query: initial count, then a
    /// recount after every Added or Deleted event.
    pub fn count_changed(&self) -> CountStream<E> {
        CountStream::new(Arc::clone(&self.store), self.feed.clone())
    }
}

/// Builder validating the three required collaborators.
///
/// Missing pieces surface as [`CacheError::InvalidArgument`] from
/// [`build`](Self::build), synchronously, before any stream exists.
pub struct StoreCacheBuilder<E, K> {
    store: Option<Arc<dyn SnapshotSource<E>>>,
    feed: Option<ChangeFeed<E>>,
    key: Option<KeyExtractor<E, K>>,
}

impl<E, K> StoreCacheBuilder<E, K>
where
    E: Send + Sync + 'static,
    K: Clone + Eq + Send + Sync + 'static,
{
    fn new() -> Self {
        Self {
            store: None,
            feed: None,
            key: None,
        }
    }

    /// Sets the snapshot source.
    pub fn store(mut self, store: Arc<dyn SnapshotSource<E>>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the live change feed.
    pub fn feed(mut self, feed: ChangeFeed<E>) -> Self {
        self.feed = Some(feed);
        self
    }

    /// Sets the key extractor.
    pub fn key_extractor(mut self, key: impl Fn(&E) -> K + Send + Sync + 'static) -> Self {
        self.key = Some(Arc::new(key));
        self
    }

    /// Builds the cache.
    pub fn build(self) -> Result<StoreCache<E, K>> {
        let store = self
            .store
            .ok_or_else(|| CacheError::invalid_argument("a snapshot source is required"))?;
        let feed = self
            .feed
            .ok_or_else(|| CacheError::invalid_argument("a change feed is required"))?;
        let key = self
            .key
            .ok_or_else(|| CacheError::invalid_argument("a key extractor is required"))?;
        Ok(StoreCache { store, feed, key })
    }
}

impl<E, K> Default for StoreCacheBuilder<E, K>
where
    E: Send + Sync + 'static,
    K: Clone + Eq + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot `connect` from loose parts, without keeping a [`StoreCache`]
/// around.
pub fn connect<E, K>(
    store: Arc<dyn SnapshotSource<E>>,
    feed: &ChangeFeed<E>,
    key: impl Fn(&E) -> K + Send + Sync + 'static,
) -> ChangeSetStream<K, E>
where
    E: Send + Sync + 'static,
    K: Clone + Eq + Send + Sync + 'static,
{
    StoreCache::new(store, feed.clone(), key).connect_default()
}

/// One-shot `preview` from loose parts; no store handle needed since
/// there is no snapshot.
pub fn preview<E, K>(
    feed: &ChangeFeed<E>,
    key: impl Fn(&E) -> K + Send + Sync + 'static,
) -> ChangeSetStream<K, E>
where
    E: Send + Sync + 'static,
    K: Clone + Eq + Send + Sync + 'static,
{
    ChangeSetStream::preview(feed.clone(), Arc::new(key), None)
}
