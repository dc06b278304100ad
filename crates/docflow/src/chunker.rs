//! Fixed-size, overlapping text windows.
//!
//! Windows are measured in characters (Unicode scalar values) so a window
//! boundary never splits a multi-byte sequence.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::worker::job::{Chunk, ChunkMetadata, JobStatus};

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_chunk_overlap() -> usize {
    DEFAULT_CHUNK_OVERLAP
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl ChunkingConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, ConfigError> {
        let config = Self {
            chunk_size,
            chunk_overlap,
        };
        config.validate()?;
        Ok(config)
    }

    /// Requires `0 < overlap < size`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_overlap == 0 {
            return Err(ConfigError::InvalidChunking {
                reason: "chunk_overlap must be greater than 0".to_string(),
            });
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(ConfigError::InvalidChunking {
                reason: format!(
                    "chunk_overlap ({}) must be smaller than chunk_size ({})",
                    self.chunk_overlap, self.chunk_size
                ),
            });
        }
        Ok(())
    }

    fn stride(&self) -> usize {
        self.chunk_size - self.chunk_overlap
    }
}

/// Splits `text` into overlapping windows and wraps each one in a pending [`Chunk`].
///
/// Starting at offset 0, each window covers `[offset, offset + size)` clipped to the
/// text length, and the offset advances by `size - overlap` until it reaches the end.
/// Empty text yields no chunks.
///
/// `config` must already be validated.
pub fn chunk(
    text: &str,
    config: &ChunkingConfig,
    parent_id: &str,
    metadata: &ChunkMetadata,
) -> Vec<Chunk> {
    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();
    let stride = config.stride();

    let mut chunks = Vec::with_capacity(expected_chunk_count(total, config));
    let mut offset = 0;

    while offset < total {
        let end = (offset + config.chunk_size).min(total);
        let index = chunks.len();

        chunks.push(Chunk {
            id: Chunk::derive_id(parent_id, index),
            parent_id: parent_id.to_string(),
            sequence_index: index + 1,
            text: chars[offset..end].iter().collect(),
            metadata: metadata.clone(),
            embedding_status: JobStatus::Pending,
            storage_status: JobStatus::Pending,
            embedding_vector: None,
        });

        offset += stride;
    }

    tracing::debug!(
        input_chars = total,
        chunk_count = chunks.len(),
        chunk_size = config.chunk_size,
        chunk_overlap = config.chunk_overlap,
        "Text chunked"
    );

    chunks
}

/// Number of windows [`chunk`] produces for a text of `len` characters.
pub fn expected_chunk_count(len: usize, config: &ChunkingConfig) -> usize {
    if len == 0 {
        return 0;
    }
    len.div_ceil(config.stride())
}
