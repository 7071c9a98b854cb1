//! The asynchronous boundary to the backing store.
//!
//! The cache never talks to a storage engine directly; it consumes this
//! trait for one-shot reads (snapshot, count, single-entity lookup) and
//! the [`ChangeFeed`](crate::ChangeFeed) for live mutations. Anything that
//! can answer these three queries (an embedded database, a remote
//! service, a plain `Vec` behind a lock) can back a cache.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::translate::Predicate;

/// One-shot read access to the entities matching the tracked query.
///
/// `filter`, where accepted, narrows the result to entities the predicate
/// passes; implementations must apply it (store-level or in memory, their
/// choice). Errors are returned as the store's own boxed error and reach
/// subscribers undecorated.
#[async_trait]
pub trait SnapshotSource<E>: Send + Sync {
    /// Enumerates the entities currently matching the query, in store
    /// iteration order.
    async fn enumerate(
        &self,
        filter: Option<&Predicate<E>>,
    ) -> std::result::Result<Vec<Arc<E>>, StoreError>;

    /// Counts the entities currently matching the query.
    async fn count(
        &self,
        filter: Option<&Predicate<E>>,
    ) -> std::result::Result<usize, StoreError>;

    /// Resolves at most one entity matching the predicate. `Ok(None)`
    /// means no match; the cache maps that to a NotFound stream failure.
    async fn find_one(
        &self,
        predicate: &Predicate<E>,
    ) -> std::result::Result<Option<Arc<E>>, StoreError>;
}
