use std::time::Duration;

use crate::config::Config;
use crate::embedding::DEFAULT_VECTOR_DIMENSION;

pub use crate::chunker::ChunkingConfig;

pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_SETTLE_ATTEMPTS: u32 = 10;
pub const DEFAULT_SETTLE_INTERVAL: Duration = Duration::from_millis(200);

/// Fixed per-pipeline settings. None of these vary between jobs.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub chunking: ChunkingConfig,
    /// Points per upsert call.
    pub batch_size: usize,
    /// Vector length expected from the embedder and used for new collections.
    pub dimension: usize,
    /// How many times to re-list collections after creating one.
    pub settle_attempts: u32,
    pub settle_interval: Duration,
}

impl PipelineConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            chunking: config.chunking,
            batch_size: config.store.batch_size,
            dimension: config.embedding.dimension,
            settle_attempts: config.store.settle_attempts,
            settle_interval: config.store.settle_interval(),
        }
    }

    pub fn with_chunking(mut self, chunking: ChunkingConfig) -> Self {
        self.chunking = chunking;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn with_settle(mut self, attempts: u32, interval: Duration) -> Self {
        self.settle_attempts = attempts;
        self.settle_interval = interval;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunking: ChunkingConfig::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            dimension: DEFAULT_VECTOR_DIMENSION,
            settle_attempts: DEFAULT_SETTLE_ATTEMPTS,
            settle_interval: DEFAULT_SETTLE_INTERVAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_config_defaults() {
        assert_eq!(PipelineConfig::from_config(&Config::default()), PipelineConfig::default());
    }

    #[test]
    fn test_from_config_reads_store_section() {
        let mut config = Config::default();
        config.store.batch_size = 7;
        config.store.settle_attempts = 3;
        config.store.settle_interval_ms = 5;
        config.embedding.dimension = 16;

        let pipeline = PipelineConfig::from_config(&config);
        assert_eq!(pipeline.batch_size, 7);
        assert_eq!(pipeline.settle_attempts, 3);
        assert_eq!(pipeline.settle_interval, Duration::from_millis(5));
        assert_eq!(pipeline.dimension, 16);
    }
}
