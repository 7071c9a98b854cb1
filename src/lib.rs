//! Observable entity cache kept in sync with a mutable backing store.
//!
//! A store that can answer one-shot reads and report per-entity lifecycle
//! events is turned into a live, keyed view: subscribers get the current
//! contents once, as a batch of Add records, and every subsequent
//! mutation as an incremental, typed delta. Nobody re-queries the store
//! on change.
//!
//! # Core concepts
//!
//! - [`SnapshotSource`]: the async read boundary to the store
//!   (enumerate, count, single-entity lookup).
//! - [`ChangeFeed`]: broadcast fan-out of raw [`EntityEvent`]s published
//!   by the store side; one publish, every subscriber sees it.
//! - [`StoreCache`]: the synchronizer. Composes the two with a key
//!   extractor and hands out subscription streams.
//! - [`ChangeSet`] / [`ChangeRecord`]: ordered, keyed deltas delivered to
//!   subscribers.
//! - [`KeyedCache`]: the consumer-side fold of those deltas into a
//!   `Key -> Entity` map.
//!
//! # Operations
//!
//! - `connect`: snapshot ChangeSet first, then live deltas.
//! - `preview`: live deltas only.
//! - `watch(key)`: single-key records, failing with NotFound when the key
//!   has no entity at lookup time.
//! - `count_changed`: live cardinality of the tracked query.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use livecache::{ChangeFeed, KeyedCache, StoreCache};
//!
//! // `UserStore` implements `SnapshotSource<User>` and publishes its
//! // mutations into the feed.
//! let feed: ChangeFeed<User> = ChangeFeed::default();
//! let store = Arc::new(UserStore::open(feed.clone())?);
//!
//! let cache = StoreCache::new(store, feed, |user: &User| user.id);
//! let mut stream = cache.connect_default();
//!
//! let mut view = KeyedCache::new();
//! while let Some(set) = stream.next().await {
//!     view.apply(&set?);
//!     println!("{} users cached", view.len());
//! }
//! ```
//!
//! # Delivery semantics
//!
//! Within one subscription the snapshot set precedes every live set, and
//! live sets preserve event arrival order. The snapshot read and the live
//! attach are not atomic with respect to the store; events fired between
//! the two are not observed by that subscription. There are no retries:
//! any collaborator failure terminates the stream with the original
//! error, and a fresh subscription is an independent attempt.

pub mod cache;
pub mod error;
pub mod feed;
pub mod fold;
pub mod models;
pub mod store;
pub mod subscription;
pub mod translate;

pub use cache::{connect, preview, StoreCache, StoreCacheBuilder};
pub use error::{CacheError, Result, StoreError};
pub use feed::{ChangeFeed, DEFAULT_FEED_CAPACITY};
pub use fold::KeyedCache;
pub use models::{ChangeReason, ChangeRecord, ChangeSet, EntityEvent, EntityState};
pub use store::SnapshotSource;
pub use subscription::{ChangeSetStream, CountStream, WatchStream};
pub use translate::{translate, KeyExtractor, Predicate};
