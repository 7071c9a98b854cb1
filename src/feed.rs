//! Broadcast fan-out of entity lifecycle events.
//!
//! The store side publishes each lifecycle event once; every active
//! subscription receives its own copy through a broadcast channel. The
//! feed itself holds no subscriber registry: dropping a receiver is all
//! it takes to detach.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::models::{EntityEvent, EntityState};

/// Default capacity of the broadcast channel behind a feed. A receiver
/// that falls more than this many events behind observes an overflow and
/// its stream terminates with an upstream failure.
pub const DEFAULT_FEED_CAPACITY: usize = 1024;

/// Shared live feed of lifecycle events for one entity type.
///
/// Cloning the feed clones the sending side only; all clones publish into
/// the same channel. The two logical event kinds the store reports,
/// "entity began being tracked" and "tracked state changed", land in the
/// same channel and are indistinguishable downstream, which is exactly
/// what translation wants.
pub struct ChangeFeed<E> {
    tx: broadcast::Sender<EntityEvent<E>>,
}

impl<E: Send + Sync + 'static> ChangeFeed<E> {
    /// Creates a feed whose receivers may lag up to `capacity` events.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publishes that an entity began being tracked.
    ///
    /// Returns the number of subscribers the event was delivered to.
    pub fn publish_tracked(&self, entity: Arc<E>, state: EntityState) -> usize {
        self.publish(EntityEvent::new(entity, state))
    }

    /// Publishes that a tracked entity's state changed.
    ///
    /// Returns the number of subscribers the event was delivered to.
    pub fn publish_state_changed(&self, entity: Arc<E>, state: EntityState) -> usize {
        self.publish(EntityEvent::new(entity, state))
    }

    fn publish(&self, event: EntityEvent<E>) -> usize {
        match self.tx.send(event) {
            Ok(delivered) => delivered,
            // No receivers attached; the event is dropped, which matches a
            // store mutating with nobody watching.
            Err(_) => 0,
        }
    }

    /// Attaches a new receiver. Events published before this call are not
    /// visible to it.
    pub fn subscribe(&self) -> broadcast::Receiver<EntityEvent<E>> {
        self.tx.subscribe()
    }

    /// Number of currently attached receivers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl<E> Clone for ChangeFeed<E> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<E: Send + Sync + 'static> Default for ChangeFeed<E> {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_CAPACITY)
    }
}
