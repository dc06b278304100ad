pub mod broadcast;
pub mod chunker;
pub mod config;
pub mod embedding;
pub mod error;
pub mod pipeline;
pub mod processor;
pub mod sanitize;
pub mod secrets;
pub mod store;
pub mod worker;

pub use broadcast::{JobProgressBroadcaster, JobProgressEvent, JobStore};
pub use chunker::ChunkingConfig;
pub use config::{load_config, load_config_from_str, Config};
pub use embedding::{Embedder, HashEmbedder, HttpEmbedder};
pub use error::{
    ConfigError, DocflowError, EmbedError, ExtractError, Result, StoreError, WorkerError,
};
pub use pipeline::{
    BroadcastProgress, CancelFlag, ErrorKind, NoopProgress, Pipeline, PipelineConfig,
    PipelineError, ProgressReporter,
};
pub use processor::{Extractor, ProcessorRegistry};
pub use secrets::{resolve_secret, resolve_secret_optional, CredentialSource, SecretError};
pub use store::{MemoryStore, QdrantClient, StoreClient, StoreConfig, StoreConnector};
pub use worker::{FileJob, JobStatus, PoolSummary, SourceFile, StageName, WorkerPool};
