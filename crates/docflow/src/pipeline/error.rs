use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::worker::job::StageName;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{0}")]
    Extraction(#[from] crate::error::ExtractError),

    #[error("Precondition violated: {0}")]
    Precondition(String),

    #[error("Store configuration incomplete: {0}")]
    Configuration(String),

    #[error("{0}")]
    Embedding(#[from] crate::error::EmbedError),

    #[error("{0}")]
    Store(#[from] crate::error::StoreError),

    #[error("Processing cancelled during {0}")]
    Cancelled(StageName),
}

/// Coarse classification of a [`PipelineError`], for drivers that branch on the
/// failure cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Extraction,
    Precondition,
    Configuration,
    Embedding,
    Store,
    Cancelled,
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Extraction(_) => ErrorKind::Extraction,
            PipelineError::Precondition(_) => ErrorKind::Precondition,
            PipelineError::Configuration(_) => ErrorKind::Configuration,
            PipelineError::Embedding(_) => ErrorKind::Embedding,
            PipelineError::Store(_) => ErrorKind::Store,
            PipelineError::Cancelled(_) => ErrorKind::Cancelled,
        }
    }
}
