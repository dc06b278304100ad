//! In-process vector store.
//!
//! Points are kept per collection, keyed by id, so an upsert of an existing id
//! replaces it. The store can also be told to misbehave: fail a given upsert
//! call, lose the create race to another writer, delay visibility of a new
//! collection, or add latency to every call.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{CollectionSpec, Point, StoreClient, UpsertRequest};
use crate::error::StoreError;

#[derive(Debug, Clone)]
struct Collection {
    spec: CollectionSpec,
    points: BTreeMap<String, Point>,
    /// Number of further `list_collections` calls that will not show it yet.
    hidden_for: usize,
}

#[derive(Debug, Default)]
struct Faults {
    fail_upsert_call: Option<usize>,
    lose_create_race: bool,
    settle_after_lists: usize,
    latency: Option<Duration>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Collection>>,
    faults: Mutex<Faults>,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
    upsert_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-creates a collection, as if another job had made it.
    pub fn with_collection(self, name: &str, spec: CollectionSpec) -> Self {
        if let Ok(mut collections) = self.collections.lock() {
            collections.insert(
                name.to_string(),
                Collection {
                    spec,
                    points: BTreeMap::new(),
                    hidden_for: 0,
                },
            );
        }
        self
    }

    /// The `call`-th upsert (1-based, counted across collections) fails.
    pub fn fail_upsert_on_call(self, call: usize) -> Self {
        self.update_faults(|f| f.fail_upsert_call = Some(call));
        self
    }

    /// `create_collection` creates the collection but reports that it already
    /// existed, as when a concurrent writer won the race.
    pub fn lose_create_race(self) -> Self {
        self.update_faults(|f| f.lose_create_race = true);
        self
    }

    /// A newly created collection stays invisible to the next `lists` listings.
    pub fn settle_after_lists(self, lists: usize) -> Self {
        self.update_faults(|f| f.settle_after_lists = lists);
        self
    }

    pub fn with_latency(self, latency: Duration) -> Self {
        self.update_faults(|f| f.latency = Some(latency));
        self
    }

    fn update_faults(&self, update: impl FnOnce(&mut Faults)) {
        if let Ok(mut faults) = self.faults.lock() {
            update(&mut faults);
        }
    }

    fn latency(&self) -> Option<Duration> {
        self.faults.lock().ok().and_then(|f| f.latency)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    /// Total calls of any kind.
    pub fn total_calls(&self) -> usize {
        self.list_calls() + self.create_calls() + self.upsert_calls()
    }

    pub fn point_count(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .ok()
            .and_then(|c| c.get(collection).map(|col| col.points.len()))
            .unwrap_or(0)
    }

    pub fn point(&self, collection: &str, id: &str) -> Option<Point> {
        self.collections
            .lock()
            .ok()
            .and_then(|c| c.get(collection).and_then(|col| col.points.get(id).cloned()))
    }

    pub fn collection_spec(&self, collection: &str) -> Option<CollectionSpec> {
        self.collections
            .lock()
            .ok()
            .and_then(|c| c.get(collection).map(|col| col.spec))
    }

    fn lock_error() -> StoreError {
        StoreError::Request("memory store lock poisoned".to_string())
    }

    async fn pause(&self) {
        if let Some(latency) = self.latency() {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl StoreClient for MemoryStore {
    async fn list_collections(&self) -> Result<BTreeSet<String>, StoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        let mut collections = self.collections.lock().map_err(|_| Self::lock_error())?;
        let mut names = BTreeSet::new();
        for (name, collection) in collections.iter_mut() {
            if collection.hidden_for > 0 {
                collection.hidden_for -= 1;
            } else {
                names.insert(name.clone());
            }
        }
        Ok(names)
    }

    async fn create_collection(&self, name: &str, spec: &CollectionSpec) -> Result<(), StoreError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        let (lose_race, hidden_for) = {
            let faults = self.faults.lock().map_err(|_| Self::lock_error())?;
            (faults.lose_create_race, faults.settle_after_lists)
        };

        let mut collections = self.collections.lock().map_err(|_| Self::lock_error())?;
        if collections.contains_key(name) {
            return Err(StoreError::CollectionExists(name.to_string()));
        }
        collections.insert(
            name.to_string(),
            Collection {
                spec: *spec,
                points: BTreeMap::new(),
                hidden_for,
            },
        );

        if lose_race {
            return Err(StoreError::CollectionExists(name.to_string()));
        }
        Ok(())
    }

    async fn upsert(&self, collection: &str, request: UpsertRequest) -> Result<(), StoreError> {
        let call = self.upsert_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.pause().await;

        let fail_call = self
            .faults
            .lock()
            .map_err(|_| Self::lock_error())?
            .fail_upsert_call;
        if fail_call == Some(call) {
            return Err(StoreError::Api {
                status: 503,
                body: format!("injected failure on upsert call {}", call),
            });
        }

        let mut collections = self.collections.lock().map_err(|_| Self::lock_error())?;
        let target = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::CollectionMissing(collection.to_string()))?;

        for point in &request.points {
            if point.vector.len() != target.spec.dimension {
                return Err(StoreError::DimensionMismatch {
                    id: point.id.clone(),
                    collection: collection.to_string(),
                    expected: target.spec.dimension,
                    actual: point.vector.len(),
                });
            }
        }
        for point in request.points {
            target.points.insert(point.id.clone(), point);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Distance;

    fn spec(dimension: usize) -> CollectionSpec {
        CollectionSpec {
            dimension,
            distance: Distance::Cosine,
        }
    }

    fn point(id: &str, dim: usize) -> Point {
        Point {
            id: id.to_string(),
            vector: vec![0.1; dim],
            payload: serde_json::Map::new(),
        }
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let store = MemoryStore::new().with_collection("docs", spec(3));

        let request = UpsertRequest {
            points: vec![point("a", 3), point("b", 3)],
            wait: true,
        };
        store.upsert("docs", request.clone()).await.unwrap();
        store.upsert("docs", request).await.unwrap();

        assert_eq!(store.point_count("docs"), 2);
        assert_eq!(store.upsert_calls(), 2);
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let store = MemoryStore::new();
        store.create_collection("docs", &spec(4)).await.unwrap();

        let names = store.list_collections().await.unwrap();
        assert!(names.contains("docs"));
        assert_eq!(store.collection_spec("docs"), Some(spec(4)));
    }

    #[tokio::test]
    async fn test_duplicate_create_reports_exists() {
        let store = MemoryStore::new().with_collection("docs", spec(4));
        let err = store.create_collection("docs", &spec(4)).await.unwrap_err();
        assert!(matches!(err, StoreError::CollectionExists(_)));
    }

    #[tokio::test]
    async fn test_lost_race_still_creates_collection() {
        let store = MemoryStore::new().lose_create_race();
        let err = store.create_collection("docs", &spec(4)).await.unwrap_err();

        assert!(matches!(err, StoreError::CollectionExists(_)));
        assert!(store.list_collections().await.unwrap().contains("docs"));
    }

    #[tokio::test]
    async fn test_collection_settles_after_listings() {
        let store = MemoryStore::new().settle_after_lists(2);
        store.create_collection("docs", &spec(4)).await.unwrap();

        assert!(!store.list_collections().await.unwrap().contains("docs"));
        assert!(!store.list_collections().await.unwrap().contains("docs"));
        assert!(store.list_collections().await.unwrap().contains("docs"));
    }

    #[tokio::test]
    async fn test_injected_upsert_failure() {
        let store = MemoryStore::new()
            .with_collection("docs", spec(2))
            .fail_upsert_on_call(2);

        let req = || UpsertRequest {
            points: vec![point("a", 2)],
            wait: true,
        };
        assert!(store.upsert("docs", req()).await.is_ok());
        assert!(matches!(
            store.upsert("docs", req()).await,
            Err(StoreError::Api { status: 503, .. })
        ));
        assert!(store.upsert("docs", req()).await.is_ok());
    }

    #[tokio::test]
    async fn test_dimension_mismatch_rejected() {
        let store = MemoryStore::new().with_collection("docs", spec(3));
        let err = store
            .upsert(
                "docs",
                UpsertRequest {
                    points: vec![point("a", 5)],
                    wait: true,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StoreError::DimensionMismatch {
                expected: 3,
                actual: 5,
                ..
            }
        ));
        assert_eq!(store.point_count("docs"), 0);
    }

    #[tokio::test]
    async fn test_upsert_into_missing_collection() {
        let store = MemoryStore::new();
        let err = store
            .upsert(
                "nope",
                UpsertRequest {
                    points: vec![],
                    wait: true,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::CollectionMissing(_)));
    }
}
