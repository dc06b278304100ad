//! Vector store collaborator.
//!
//! The pipeline only needs three operations from a store: list the existing
//! collections, create one, and upsert a batch of points. [`StoreClient`]
//! captures that surface; [`QdrantClient`] talks to a Qdrant server over REST
//! and [`MemoryStore`] keeps points in process.

pub mod memory;
pub mod qdrant;

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

pub use memory::MemoryStore;
pub use qdrant::QdrantClient;

/// Similarity metric of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Distance {
    #[default]
    Cosine,
    Dot,
    Euclid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSpec {
    pub dimension: usize,
    pub distance: Distance,
}

/// The unit of storage: an id, a vector and a flat JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpsertRequest {
    pub points: Vec<Point>,
    /// Do not return until the store confirms the points are persisted.
    pub wait: bool,
}

#[async_trait]
pub trait StoreClient: Send + Sync {
    async fn list_collections(&self) -> Result<BTreeSet<String>, StoreError>;

    /// Creates `name`. Fails with [`StoreError::CollectionExists`] if another
    /// writer created it first.
    async fn create_collection(&self, name: &str, spec: &CollectionSpec) -> Result<(), StoreError>;

    /// Insert-or-replace by point id.
    async fn upsert(&self, collection: &str, request: UpsertRequest) -> Result<(), StoreError>;
}

/// Store settings as handed to a pipeline invocation. Any field may be missing;
/// [`StoreConfig::target`] checks completeness.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    pub endpoint: Option<String>,
    pub credential: Option<SecretString>,
    pub collection_name: Option<String>,
}

impl StoreConfig {
    pub fn new(
        endpoint: impl Into<String>,
        credential: impl Into<String>,
        collection_name: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            credential: Some(SecretString::from(credential.into())),
            collection_name: Some(collection_name.into()),
        }
    }

    /// Names of the fields that are absent or empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.endpoint.as_deref().is_none_or(str::is_empty) {
            missing.push("endpoint");
        }
        if self
            .credential
            .as_ref()
            .is_none_or(|c| c.expose_secret().is_empty())
        {
            missing.push("credential");
        }
        if self.collection_name.as_deref().is_none_or(str::is_empty) {
            missing.push("collection name");
        }
        missing
    }

    /// A complete target, or the list of missing fields.
    pub fn target(&self) -> Result<StoreTarget, Vec<&'static str>> {
        match (&self.endpoint, &self.credential, &self.collection_name) {
            (Some(endpoint), Some(credential), Some(collection)) if self.missing_fields().is_empty() => {
                Ok(StoreTarget {
                    endpoint: endpoint.trim_end_matches('/').to_string(),
                    credential: credential.clone(),
                    collection: collection.clone(),
                })
            }
            _ => Err(self.missing_fields()),
        }
    }
}

/// A validated store configuration.
#[derive(Debug, Clone)]
pub struct StoreTarget {
    pub endpoint: String,
    pub credential: SecretString,
    pub collection: String,
}

/// Turns a [`StoreTarget`] into a client for one pipeline invocation.
pub trait StoreConnector: Send + Sync {
    fn connect(&self, target: &StoreTarget) -> Result<Arc<dyn StoreClient>, StoreError>;
}

/// Builds a fresh [`QdrantClient`] for every invocation.
#[derive(Debug, Clone)]
pub struct QdrantConnector {
    timeout: Duration,
}

impl QdrantConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for QdrantConnector {
    fn default() -> Self {
        Self::new(qdrant::DEFAULT_REQUEST_TIMEOUT)
    }
}

impl StoreConnector for QdrantConnector {
    fn connect(&self, target: &StoreTarget) -> Result<Arc<dyn StoreClient>, StoreError> {
        let client = QdrantClient::new(&target.endpoint, target.credential.clone(), self.timeout)?;
        Ok(Arc::new(client))
    }
}

/// Hands out the same client every time and counts how often it was asked.
pub struct SharedStoreConnector {
    client: Arc<dyn StoreClient>,
    connects: AtomicUsize,
}

impl SharedStoreConnector {
    pub fn new(client: Arc<dyn StoreClient>) -> Self {
        Self {
            client,
            connects: AtomicUsize::new(0),
        }
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl StoreConnector for SharedStoreConnector {
    fn connect(&self, _target: &StoreTarget) -> Result<Arc<dyn StoreClient>, StoreError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::clone(&self.client))
    }
}
