use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::chunker::ChunkingConfig;
use crate::embedding::DEFAULT_VECTOR_DIMENSION;
use crate::error::ConfigError;
use crate::secrets::CredentialSource;
use crate::store::StoreConfig;

pub const CONFIG_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub store: StoreSettings,
}

fn default_worker_count() -> usize {
    num_cpus::get()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            worker_count: default_worker_count(),
            chunking: ChunkingConfig::default(),
            extraction: ExtractionConfig::default(),
            embedding: EmbeddingConfig::default(),
            store: StoreSettings::default(),
        }
    }
}

impl Config {
    /// `<platform config dir>/docflow/config.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("docflow").join("config.json"))
    }

    /// Resolves the store credential and returns the settings a pipeline
    /// invocation stores into. Missing fields are left as `None`.
    pub fn store_config(&self) -> Result<StoreConfig, ConfigError> {
        let credential = self
            .store
            .credential
            .resolve()
            .map_err(|source| ConfigError::Secret {
                section: "store",
                source,
            })?;

        Ok(StoreConfig {
            endpoint: non_empty(&self.store.endpoint),
            credential,
            collection_name: non_empty(&self.store.collection_name),
        })
    }

    /// Replaces store settings with values given on the command line or in the
    /// environment. `None` keeps the configured value.
    pub fn with_store_overrides(
        mut self,
        endpoint: Option<String>,
        api_key: Option<String>,
        collection_name: Option<String>,
    ) -> Self {
        if let Some(endpoint) = endpoint {
            self.store.endpoint = Some(endpoint);
        }
        if let Some(key) = api_key {
            self.store.credential = CredentialSource::direct(key);
        }
        if let Some(collection) = collection_name {
            self.store.collection_name = Some(collection);
        }
        self
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,
}

fn default_max_file_size_mb() -> u64 {
    50
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: default_max_file_size_mb(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Deterministic hash-based vectors.
    #[default]
    Hash,
    /// OpenAI-compatible embeddings endpoint.
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub provider: EmbeddingProvider,
    #[serde(default = "default_dimension")]
    pub dimension: usize,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(flatten)]
    pub credential: CredentialSource,
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_dimension() -> usize {
    DEFAULT_VECTOR_DIMENSION
}

fn default_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_embedding_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::default(),
            dimension: default_dimension(),
            model: default_model(),
            endpoint: None,
            credential: CredentialSource::default(),
            timeout_secs: default_embedding_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

/// Vector store section. Incomplete settings load fine; the Store stage
/// reports what is missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(flatten)]
    pub credential: CredentialSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_name: Option<String>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_settle_attempts")]
    pub settle_attempts: u32,
    #[serde(default = "default_settle_interval_ms")]
    pub settle_interval_ms: u64,
}

fn default_batch_size() -> usize {
    100
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_settle_attempts() -> u32 {
    10
}

fn default_settle_interval_ms() -> u64 {
    200
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            credential: CredentialSource::default(),
            collection_name: None,
            batch_size: default_batch_size(),
            timeout_secs: default_timeout_secs(),
            settle_attempts: default_settle_attempts(),
            settle_interval_ms: default_settle_interval_ms(),
        }
    }
}

impl StoreSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn settle_interval(&self) -> Duration {
        Duration::from_millis(self.settle_interval_ms)
    }
}
