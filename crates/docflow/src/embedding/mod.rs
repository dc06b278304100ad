//! Embedding collaborator: text in, fixed-length vector out.

pub mod hash;
pub mod http;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::schema::{EmbeddingConfig, EmbeddingProvider};
use crate::error::{ConfigError, EmbedError};

pub use hash::HashEmbedder;
pub use http::HttpEmbedder;

pub const DEFAULT_VECTOR_DIMENSION: usize = 768;

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;

    /// Length of every vector this embedder returns.
    fn dimension(&self) -> usize;

    fn model_name(&self) -> &str;
}

/// Builds the embedder selected in the config.
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>, ConfigError> {
    match config.provider {
        EmbeddingProvider::Hash => Ok(Arc::new(HashEmbedder::new(config.dimension))),
        EmbeddingProvider::Http => {
            let endpoint = config
                .endpoint
                .as_deref()
                .filter(|e| !e.is_empty())
                .ok_or_else(|| ConfigError::Validation {
                    message: "embedding.endpoint is required for the http provider".to_string(),
                })?;
            let api_key = config
                .credential
                .resolve()
                .map_err(|source| ConfigError::Secret {
                    section: "embedding",
                    source,
                })?;
            let embedder = HttpEmbedder::new(
                endpoint,
                api_key,
                &config.model,
                config.dimension,
                std::time::Duration::from_secs(config.timeout_secs),
                config.max_retries,
            )
            .map_err(|e| ConfigError::Validation {
                message: e.to_string(),
            })?;
            Ok(Arc::new(embedder))
        }
    }
}
