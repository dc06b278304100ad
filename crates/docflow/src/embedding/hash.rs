use async_trait::async_trait;

use super::Embedder;
use crate::error::EmbedError;

/// Deterministic stand-in for an embedding model.
///
/// The vector is derived from a hash of the text and L2-normalised, so equal
/// texts always map to equal vectors. Useful for dry runs and tests; it carries
/// no semantic meaning.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn generate(&self, text: &str) -> Vec<f32> {
        let hash = djb2(text);
        let mut vector: Vec<f32> = (0..self.dimension)
            .map(|i| {
                ((hash.wrapping_add(i as u64).wrapping_mul(2654435761)) % 10000) as f32 / 10000.0
                    - 0.5
            })
            .collect();

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        vector
    }
}

fn djb2(text: &str) -> u64 {
    text.bytes()
        .fold(5381u64, |hash, byte| hash.wrapping_mul(33).wrapping_add(byte as u64))
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        if text.is_empty() {
            return Err(EmbedError::EmptyInput);
        }
        Ok(self.generate(text))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "docflow-hash"
    }
}
