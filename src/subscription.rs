//! Subscription stream handles.
//!
//! Every operation on a cache hands out an owned handle with an async
//! `next()` in the pull style; `into_stream()` adapts a handle to a
//! `futures` `Stream` for combinator-based consumers.
//!
//! Handles are cold: the snapshot read (and the single-key lookup for a
//! watch) runs lazily inside the first `next()` call, so every
//! subscription re-executes its own store read. Dropping a handle, or
//! calling [`close`](ChangeSetStream::close), detaches its feed receiver
//! and stops delivery. A handle keeps no sending half of the feed once it
//! is live, so a store that drops its feed ends every subscriber stream.

use std::sync::Arc;

use futures_util::stream::{self, Stream};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::error::{CacheError, Result};
use crate::feed::ChangeFeed;
use crate::models::{ChangeReason, ChangeRecord, ChangeSet, EntityEvent};
use crate::store::SnapshotSource;
use crate::translate::{translate, KeyExtractor, Predicate};

fn lagged(skipped: u64) -> CacheError {
    CacheError::Upstream(
        format!("change feed lagged by {skipped} events; resubscribe for a fresh snapshot").into(),
    )
}

enum Phase<E> {
    /// Snapshot not yet read (connect mode only). The feed handle is held
    /// here so it can be dropped once the live receiver is attached.
    Snapshot {
        store: Arc<dyn SnapshotSource<E>>,
        feed: ChangeFeed<E>,
    },
    /// Forwarding translated live events.
    Live { rx: broadcast::Receiver<EntityEvent<E>> },
    /// Failed, exhausted or closed.
    Done,
}

/// Stream of [`ChangeSet`]s returned by `connect` and `preview`.
///
/// In connect mode the first emission is the snapshot set (suppressed if
/// empty and suppression is on), every later emission a singleton delta.
/// In preview mode there is no snapshot; the live receiver is attached at
/// construction.
pub struct ChangeSetStream<K, E> {
    key: KeyExtractor<E, K>,
    predicate: Option<Predicate<E>>,
    suppress_empty: bool,
    phase: Phase<E>,
    closed: bool,
}

impl<K, E> ChangeSetStream<K, E>
where
    E: Send + Sync + 'static,
{
    pub(crate) fn connect(
        store: Arc<dyn SnapshotSource<E>>,
        feed: ChangeFeed<E>,
        key: KeyExtractor<E, K>,
        predicate: Option<Predicate<E>>,
        suppress_empty: bool,
    ) -> Self {
        Self {
            key,
            predicate,
            suppress_empty,
            phase: Phase::Snapshot { store, feed },
            closed: false,
        }
    }

    pub(crate) fn preview(
        feed: ChangeFeed<E>,
        key: KeyExtractor<E, K>,
        predicate: Option<Predicate<E>>,
    ) -> Self {
        let rx = feed.subscribe();
        Self {
            key,
            predicate,
            suppress_empty: true,
            phase: Phase::Live { rx },
            closed: false,
        }
    }

    /// Next change set, or `None` once the stream is finished.
    ///
    /// Cancel-safe: dropping the returned future mid-snapshot discards the
    /// fetch and a later call re-runs it; a pending live receive loses
    /// nothing.
    pub async fn next(&mut self) -> Option<Result<ChangeSet<K, E>>> {
        loop {
            if self.closed {
                return None;
            }
            match &mut self.phase {
                Phase::Done => return None,
                Phase::Snapshot { store, feed } => {
                    let store = Arc::clone(store);
                    let feed = feed.clone();
                    match store.enumerate(self.predicate.as_ref()).await {
                        Err(err) => {
                            self.phase = Phase::Done;
                            return Some(Err(CacheError::Upstream(err)));
                        }
                        Ok(entities) => {
                            // Live listening begins only after the snapshot
                            // read has completed; events fired while the
                            // fetch was in flight are not observed by this
                            // subscription.
                            let rx = feed.subscribe();
                            // Replacing the phase drops the feed handle.
                            self.phase = Phase::Live { rx };
                            log::debug!("snapshot loaded: {} entities", entities.len());

                            let key = Arc::clone(&self.key);
                            let set = ChangeSet::initial(entities, move |e| key(e));
                            if set.is_empty() && self.suppress_empty {
                                continue;
                            }
                            return Some(Ok(set));
                        }
                    }
                }
                Phase::Live { rx } => match rx.recv().await {
                    Ok(event) => {
                        match translate(&event, self.predicate.as_ref(), &self.key) {
                            Some(record) => return Some(Ok(ChangeSet::singleton(record))),
                            None => continue,
                        }
                    }
                    Err(RecvError::Closed) => {
                        log::debug!("change feed closed, ending change set stream");
                        self.phase = Phase::Done;
                        return None;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        log::warn!("change set stream lagged by {skipped} events, failing");
                        self.phase = Phase::Done;
                        return Some(Err(lagged(skipped)));
                    }
                },
            }
        }
    }

    /// Stops delivery. Idempotent; `next()` returns `None` afterwards.
    pub fn close(&mut self) {
        self.closed = true;
        self.phase = Phase::Done;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Adapts the handle to a `futures` [`Stream`].
    pub fn into_stream(self) -> impl Stream<Item = Result<ChangeSet<K, E>>> {
        stream::unfold(self, |mut this| async move {
            this.next().await.map(|item| (item, this))
        })
    }
}

enum WatchPhase<E> {
    Lookup {
        store: Arc<dyn SnapshotSource<E>>,
        feed: ChangeFeed<E>,
    },
    Live {
        rx: broadcast::Receiver<EntityEvent<E>>,
        predicate: Predicate<E>,
    },
    Done,
}

/// Stream of individual [`ChangeRecord`]s for exactly one key.
///
/// The first emission is a synthetic Add for the entity currently behind
/// the key; the stream fails with NotFound when no such entity exists at
/// lookup time.
pub struct WatchStream<K, E> {
    key: KeyExtractor<E, K>,
    target: K,
    phase: WatchPhase<E>,
    closed: bool,
}

impl<K, E> WatchStream<K, E>
where
    K: Clone + Eq + Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    pub(crate) fn new(
        store: Arc<dyn SnapshotSource<E>>,
        feed: ChangeFeed<E>,
        key: KeyExtractor<E, K>,
        target: K,
    ) -> Self {
        Self {
            key,
            target,
            phase: WatchPhase::Lookup { store, feed },
            closed: false,
        }
    }

    fn key_equality(&self) -> Predicate<E> {
        let key = Arc::clone(&self.key);
        let target = self.target.clone();
        Arc::new(move |entity: &E| key(entity) == target)
    }

    /// Next change record for the watched key, or `None` once finished.
    pub async fn next(&mut self) -> Option<Result<ChangeRecord<K, E>>> {
        loop {
            if self.closed {
                return None;
            }
            match &mut self.phase {
                WatchPhase::Done => return None,
                WatchPhase::Lookup { store, feed } => {
                    let store = Arc::clone(store);
                    let feed = feed.clone();
                    let predicate = self.key_equality();
                    match store.find_one(&predicate).await {
                        Err(err) => {
                            self.phase = WatchPhase::Done;
                            return Some(Err(CacheError::Upstream(err)));
                        }
                        Ok(None) => {
                            self.phase = WatchPhase::Done;
                            return Some(Err(CacheError::not_found(
                                "no entity matches the watched key",
                            )));
                        }
                        Ok(Some(entity)) => {
                            let rx = feed.subscribe();
                            let record = ChangeRecord::new(
                                ChangeReason::Add,
                                (self.key)(&entity),
                                entity,
                            );
                            self.phase = WatchPhase::Live { rx, predicate };
                            return Some(Ok(record));
                        }
                    }
                }
                WatchPhase::Live { rx, predicate } => match rx.recv().await {
                    Ok(event) => {
                        // Singleton sets are unwrapped back to their record.
                        match translate(&event, Some(&*predicate), &self.key) {
                            Some(record) => return Some(Ok(record)),
                            None => continue,
                        }
                    }
                    Err(RecvError::Closed) => {
                        log::debug!("change feed closed, ending watch stream");
                        self.phase = WatchPhase::Done;
                        return None;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        log::warn!("watch stream lagged by {skipped} events, failing");
                        self.phase = WatchPhase::Done;
                        return Some(Err(lagged(skipped)));
                    }
                },
            }
        }
    }

    /// Stops delivery. Idempotent; `next()` returns `None` afterwards.
    pub fn close(&mut self) {
        self.closed = true;
        self.phase = WatchPhase::Done;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Adapts the handle to a `futures` [`Stream`].
    pub fn into_stream(self) -> impl Stream<Item = Result<ChangeRecord<K, E>>> {
        stream::unfold(self, |mut this| async move {
            this.next().await.map(|item| (item, this))
        })
    }
}

enum CountPhase<E> {
    Initial { feed: ChangeFeed<E> },
    Live { rx: broadcast::Receiver<EntityEvent<E>> },
    Done,
}

/// Stream of live cardinalities for the tracked query.
///
/// Emits the initial count, then a recount after every Added or Deleted
/// lifecycle event. Modified and Unchanged events do not change
/// cardinality and are ignored.
pub struct CountStream<E> {
    store: Arc<dyn SnapshotSource<E>>,
    phase: CountPhase<E>,
    closed: bool,
}

impl<E> CountStream<E>
where
    E: Send + Sync + 'static,
{
    pub(crate) fn new(store: Arc<dyn SnapshotSource<E>>, feed: ChangeFeed<E>) -> Self {
        Self {
            store,
            phase: CountPhase::Initial { feed },
            closed: false,
        }
    }

    async fn recount(&self) -> Result<usize> {
        self.store.count(None).await.map_err(CacheError::Upstream)
    }

    /// Next count, or `None` once the stream is finished.
    pub async fn next(&mut self) -> Option<Result<usize>> {
        loop {
            if self.closed {
                return None;
            }
            match &mut self.phase {
                CountPhase::Done => return None,
                CountPhase::Initial { feed } => {
                    let feed = feed.clone();
                    match self.recount().await {
                        Err(err) => {
                            self.phase = CountPhase::Done;
                            return Some(Err(err));
                        }
                        Ok(count) => {
                            // Live listening begins only after the initial
                            // count resolves, mirroring connect.
                            let rx = feed.subscribe();
                            self.phase = CountPhase::Live { rx };
                            return Some(Ok(count));
                        }
                    }
                }
                CountPhase::Live { rx } => match rx.recv().await {
                    Ok(event) if event.state.affects_count() => match self.recount().await {
                        Err(err) => {
                            self.phase = CountPhase::Done;
                            return Some(Err(err));
                        }
                        Ok(count) => {
                            log::debug!("tracked entity count changed to {count}");
                            return Some(Ok(count));
                        }
                    },
                    Ok(_) => continue,
                    Err(RecvError::Closed) => {
                        self.phase = CountPhase::Done;
                        return None;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        log::warn!("count stream lagged by {skipped} events, failing");
                        self.phase = CountPhase::Done;
                        return Some(Err(lagged(skipped)));
                    }
                },
            }
        }
    }

    /// Stops delivery. Idempotent; `next()` returns `None` afterwards.
    pub fn close(&mut self) {
        self.closed = true;
        self.phase = CountPhase::Done;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Adapts the handle to a `futures` [`Stream`].
    pub fn into_stream(self) -> impl Stream<Item = Result<usize>> {
        stream::unfold(self, |mut this| async move {
            this.next().await.map(|item| (item, this))
        })
    }
}
