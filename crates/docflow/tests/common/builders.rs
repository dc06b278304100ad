//! Builder patterns for creating test data programmatically.
//!
//! These builders allow creating configurations and wired-up pipelines
//! without repetitive boilerplate code.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use docflow::chunker::ChunkingConfig;
use docflow::config::schema::{Config, EmbeddingProvider};
use docflow::embedding::{Embedder, HashEmbedder};
use docflow::pipeline::{Pipeline, PipelineConfig};
use docflow::processor::Extractor;
use docflow::secrets::CredentialSource;
use docflow::store::{MemoryStore, SharedStoreConnector, StoreConfig};

use super::harness::ScriptedExtractor;

pub const TEST_ENDPOINT: &str = "http://vectors.test:6333";
pub const TEST_CREDENTIAL: &str = "test-key";
pub const TEST_COLLECTION: &str = "docs";

/// Builder for creating `Config` instances.
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with sensible defaults for testing.
    pub fn new() -> Self {
        let mut config = Config::default();
        config.worker_count = 1;
        Self { config }
    }

    pub fn version(mut self, version: &str) -> Self {
        self.config.version = version.to_string();
        self
    }

    pub fn worker_count(mut self, count: usize) -> Self {
        self.config.worker_count = count;
        self
    }

    /// Set chunk size and overlap without validating them.
    pub fn chunking(mut self, chunk_size: usize, chunk_overlap: usize) -> Self {
        self.config.chunking = ChunkingConfig {
            chunk_size,
            chunk_overlap,
        };
        self
    }

    pub fn hash_embeddings(mut self, dimension: usize) -> Self {
        self.config.embedding.provider = EmbeddingProvider::Hash;
        self.config.embedding.dimension = dimension;
        self
    }

    pub fn http_embeddings(mut self, endpoint: &str, model: &str, dimension: usize) -> Self {
        self.config.embedding.provider = EmbeddingProvider::Http;
        self.config.embedding.endpoint = Some(endpoint.to_string());
        self.config.embedding.model = model.to_string();
        self.config.embedding.dimension = dimension;
        self
    }

    pub fn store(mut self, endpoint: &str, api_key: &str, collection: &str) -> Self {
        self.config.store.endpoint = Some(endpoint.to_string());
        self.config.store.credential = CredentialSource::direct(api_key);
        self.config.store.collection_name = Some(collection.to_string());
        self
    }

    pub fn store_key_env_var(mut self, name: &str) -> Self {
        self.config.store.credential = CredentialSource::env_var(name);
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.store.batch_size = size;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }

    pub fn to_json(self) -> String {
        serde_json::to_string_pretty(&self.config).expect("Failed to serialize config")
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder wiring a [`Pipeline`] to in-process collaborators.
pub struct PipelineBuilder {
    config: PipelineConfig,
    extractor: Arc<dyn Extractor>,
    embedder: Option<Arc<dyn Embedder>>,
    store: Arc<MemoryStore>,
}

impl PipelineBuilder {
    /// Chunks of 10 with overlap 2, batches of 2, dimension 8, quick settling.
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default()
                .with_chunking(ChunkingConfig {
                    chunk_size: 10,
                    chunk_overlap: 2,
                })
                .with_batch_size(2)
                .with_dimension(8)
                .with_settle(3, Duration::from_millis(1)),
            extractor: Arc::new(ScriptedExtractor::text("")),
            embedder: None,
            store: Arc::new(MemoryStore::new()),
        }
    }

    pub fn chunking(mut self, chunk_size: usize, chunk_overlap: usize) -> Self {
        self.config = self.config.with_chunking(ChunkingConfig {
            chunk_size,
            chunk_overlap,
        });
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.config = self.config.with_batch_size(size);
        self
    }

    pub fn dimension(mut self, dimension: usize) -> Self {
        self.config = self.config.with_dimension(dimension);
        self
    }

    pub fn settle(mut self, attempts: u32) -> Self {
        self.config = self
            .config
            .with_settle(attempts, Duration::from_millis(1));
        self
    }

    /// Extract stage returns `text` verbatim.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.extractor = Arc::new(ScriptedExtractor::text(text));
        self
    }

    pub fn extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn store(mut self, store: Arc<MemoryStore>) -> Self {
        self.store = store;
        self
    }

    /// The pipeline and the store it writes to.
    pub fn build(self) -> (Pipeline, Arc<MemoryStore>) {
        let embedder = self
            .embedder
            .unwrap_or_else(|| Arc::new(HashEmbedder::new(self.config.dimension)));
        let pipeline = Pipeline::new(
            self.config,
            self.extractor,
            embedder,
            Arc::new(SharedStoreConnector::new(self.store.clone())),
        )
        .expect("Failed to build pipeline");
        (pipeline, self.store)
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A complete store configuration pointing at [`TEST_COLLECTION`].
pub fn store_config() -> StoreConfig {
    StoreConfig::new(TEST_ENDPOINT, TEST_CREDENTIAL, TEST_COLLECTION)
}
