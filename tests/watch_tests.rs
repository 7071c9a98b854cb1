//! Single-key watch scenarios.

mod common;

use std::sync::Arc;

use common::{FailingStore, MemoryStore, TestEntity};
use livecache::{CacheError, ChangeReason, SnapshotSource, StoreCache};
use uuid::Uuid;

fn cache_for(store: &Arc<MemoryStore>) -> StoreCache<TestEntity, Uuid> {
    StoreCache::new(
        Arc::clone(store) as Arc<dyn SnapshotSource<TestEntity>>,
        store.feed().clone(),
        |entity: &TestEntity| entity.id,
    )
}

#[tokio::test]
async fn watch_emits_add_then_follows_the_key() {
    let justus = TestEntity::justus();
    let store = MemoryStore::seeded([justus.clone()]);
    let mut watch = cache_for(&store).watch(justus.id);

    let first = watch.next().await.unwrap().unwrap();
    assert_eq!(first.reason, ChangeReason::Add);
    assert_eq!(first.key, justus.id);
    assert_eq!(first.entity.name, "Justus");

    store.update(TestEntity {
        id: justus.id,
        name: "Justus".to_string(),
        description: "First detective".to_string(),
    });
    let second = watch.next().await.unwrap().unwrap();
    assert_eq!(second.reason, ChangeReason::Update);
    assert_eq!(second.entity.description, "First detective");

    store.remove(justus.id).unwrap();
    let third = watch.next().await.unwrap().unwrap();
    assert_eq!(third.reason, ChangeReason::Remove);
    assert_eq!(third.key, justus.id);
}

#[tokio::test]
async fn watch_on_a_missing_key_fails_with_not_found() {
    let store = MemoryStore::seeded([TestEntity::justus()]);
    let mut watch = cache_for(&store).watch(Uuid::new_v4());

    match watch.next().await.unwrap() {
        Err(CacheError::NotFound(_)) => {}
        other => panic!("expected NotFound, got {other:?}"),
    }
    assert!(watch.next().await.is_none());
}

#[tokio::test]
async fn watch_ignores_events_for_other_keys() {
    let justus = TestEntity::justus();
    let peter = TestEntity::peter();
    let store = MemoryStore::seeded([justus.clone(), peter.clone()]);
    let mut watch = cache_for(&store).watch(justus.id);

    watch.next().await.unwrap().unwrap();

    // Peter's update must not surface; Justus's right after must.
    store.update(TestEntity {
        id: peter.id,
        name: "Peter".to_string(),
        description: "Second detective".to_string(),
    });
    store.touch(justus.id);

    let next = watch.next().await.unwrap().unwrap();
    assert_eq!(next.key, justus.id);
    assert_eq!(next.reason, ChangeReason::Refresh);
}

#[tokio::test]
async fn watch_lookup_failure_propagates_upstream() {
    let store = FailingStore::new();
    let cache = StoreCache::new(
        Arc::clone(&store) as Arc<dyn SnapshotSource<TestEntity>>,
        store.feed().clone(),
        |entity: &TestEntity| entity.id,
    );
    let mut watch = cache.watch(Uuid::new_v4());

    match watch.next().await.unwrap() {
        Err(CacheError::Upstream(err)) => {
            assert!(err.downcast_ref::<std::io::Error>().is_some());
        }
        other => panic!("expected upstream failure, got {other:?}"),
    }
    assert!(watch.next().await.is_none());
}

#[tokio::test]
async fn watch_close_stops_delivery() {
    let justus = TestEntity::justus();
    let store = MemoryStore::seeded([justus.clone()]);
    let mut watch = cache_for(&store).watch(justus.id);

    watch.next().await.unwrap().unwrap();
    watch.close();
    assert!(watch.is_closed());
    assert!(watch.next().await.is_none());
}
