//! In-memory store fixture backing the integration tests.
//!
//! `MemoryStore` plays both external collaborators at once: it answers
//! snapshot reads from a `Vec` behind a lock and publishes a lifecycle
//! event into its feed for every committed mutation, the way a real
//! store's change tracker would.

#![allow(dead_code)]

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use livecache::{ChangeFeed, EntityState, Predicate, SnapshotSource, StoreError};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestEntity {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

impl TestEntity {
    pub fn named(name: &str, description: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.to_string(),
        }
    }

    pub fn justus() -> Self {
        Self::named("Justus", "Its Justus")
    }

    pub fn peter() -> Self {
        Self::named("Peter", "Its Peter")
    }

    pub fn bob() -> Self {
        Self::named("Bob", "Its Bob")
    }
}

pub struct MemoryStore {
    rows: RwLock<Vec<Arc<TestEntity>>>,
    feed: ChangeFeed<TestEntity>,
}

impl MemoryStore {
    pub fn seeded(entities: impl IntoIterator<Item = TestEntity>) -> Arc<Self> {
        let rows = entities.into_iter().map(Arc::new).collect();
        Arc::new(Self {
            rows: RwLock::new(rows),
            feed: ChangeFeed::default(),
        })
    }

    pub fn empty() -> Arc<Self> {
        Self::seeded([])
    }

    pub fn feed(&self) -> &ChangeFeed<TestEntity> {
        &self.feed
    }

    pub fn get(&self, id: Uuid) -> Option<Arc<TestEntity>> {
        self.rows
            .read()
            .unwrap()
            .iter()
            .find(|row| row.id == id)
            .cloned()
    }

    /// Insert and commit: the entity becomes tracked as Added.
    pub fn insert(&self, entity: TestEntity) -> Arc<TestEntity> {
        let entity = Arc::new(entity);
        self.rows.write().unwrap().push(Arc::clone(&entity));
        self.feed
            .publish_tracked(Arc::clone(&entity), EntityState::Added);
        entity
    }

    /// Replace the row with the same id and commit as Modified.
    pub fn update(&self, entity: TestEntity) -> Arc<TestEntity> {
        let entity = Arc::new(entity);
        {
            let mut rows = self.rows.write().unwrap();
            if let Some(slot) = rows.iter_mut().find(|row| row.id == entity.id) {
                *slot = Arc::clone(&entity);
            }
        }
        self.feed
            .publish_state_changed(Arc::clone(&entity), EntityState::Modified);
        entity
    }

    /// Delete and commit as Deleted. Returns the removed row when present.
    pub fn remove(&self, id: Uuid) -> Option<Arc<TestEntity>> {
        let removed = {
            let mut rows = self.rows.write().unwrap();
            match rows.iter().position(|row| row.id == id) {
                Some(index) => Some(rows.remove(index)),
                None => None,
            }
        };
        if let Some(entity) = &removed {
            self.feed
                .publish_state_changed(Arc::clone(entity), EntityState::Deleted);
        }
        removed
    }

    /// Re-affirm a row without a field delta (a save that changed nothing).
    pub fn touch(&self, id: Uuid) {
        if let Some(entity) = self.get(id) {
            self.feed
                .publish_state_changed(entity, EntityState::Unchanged);
        }
    }

    /// Stop observing a row without deleting it.
    pub fn detach(&self, id: Uuid) {
        if let Some(entity) = self.get(id) {
            self.feed
                .publish_state_changed(entity, EntityState::Detached);
        }
    }
}

#[async_trait]
impl SnapshotSource<TestEntity> for MemoryStore {
    async fn enumerate(
        &self,
        filter: Option<&Predicate<TestEntity>>,
    ) -> Result<Vec<Arc<TestEntity>>, StoreError> {
        let rows = self.rows.read().unwrap();
        Ok(rows
            .iter()
            .filter(|row| filter.map_or(true, |accept| accept(row.as_ref())))
            .cloned()
            .collect())
    }

    async fn count(
        &self,
        filter: Option<&Predicate<TestEntity>>,
    ) -> Result<usize, StoreError> {
        let rows = self.rows.read().unwrap();
        Ok(rows
            .iter()
            .filter(|row| filter.map_or(true, |accept| accept(row.as_ref())))
            .count())
    }

    async fn find_one(
        &self,
        predicate: &Predicate<TestEntity>,
    ) -> Result<Option<Arc<TestEntity>>, StoreError> {
        let rows = self.rows.read().unwrap();
        Ok(rows
            .iter()
            .find(|row| predicate(row.as_ref()))
            .cloned())
    }
}

/// Store whose every read fails, for upstream-failure propagation tests.
pub struct FailingStore {
    feed: ChangeFeed<TestEntity>,
}

impl FailingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            feed: ChangeFeed::default(),
        })
    }

    pub fn feed(&self) -> &ChangeFeed<TestEntity> {
        &self.feed
    }

    fn unavailable() -> StoreError {
        Box::new(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "store unavailable",
        ))
    }
}

#[async_trait]
impl SnapshotSource<TestEntity> for FailingStore {
    async fn enumerate(
        &self,
        _filter: Option<&Predicate<TestEntity>>,
    ) -> Result<Vec<Arc<TestEntity>>, StoreError> {
        Err(Self::unavailable())
    }

    async fn count(
        &self,
        _filter: Option<&Predicate<TestEntity>>,
    ) -> Result<usize, StoreError> {
        Err(Self::unavailable())
    }

    async fn find_one(
        &self,
        _predicate: &Predicate<TestEntity>,
    ) -> Result<Option<Arc<TestEntity>>, StoreError> {
        Err(Self::unavailable())
    }
}
