use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocflowError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Embedding error: {0}")]
    Embed(#[from] EmbedError),

    #[error("Vector store error: {0}")]
    Store(#[from] StoreError),

    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Invalid chunking configuration: {reason}")]
    InvalidChunking { reason: String },

    #[error("Failed to resolve credential for {section}: {source}")]
    Secret {
        section: &'static str,
        #[source]
        source: crate::secrets::SecretError,
    },
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to read document '{path}': {source}")]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File size {size_mb:.1}MB exceeds {limit_mb}MB limit")]
    FileTooLarge { size_mb: f64, limit_mb: u64 },

    #[error("Failed to process PDF: {0}")]
    PdfProcessing(String),

    #[error("Failed to process DOCX: {0}")]
    DocxProcessing(String),

    #[error("No text content found in document")]
    NoTextContent,

    #[error("Extraction task failed: {0}")]
    TaskFailed(String),
}

#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("Embedding request failed: {0}")]
    Request(String),

    #[error("Embedding service returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Embedding response was malformed: {0}")]
    MalformedResponse(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Cannot embed empty text")]
    EmptyInput,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Vector store request failed: {0}")]
    Request(String),

    #[error("Vector store returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Vector store response was malformed: {0}")]
    MalformedResponse(String),

    #[error("Collection '{0}' already exists")]
    CollectionExists(String),

    #[error("Collection '{0}' does not exist")]
    CollectionMissing(String),

    #[error("Point '{id}' has {actual} dimensions, collection '{collection}' expects {expected}")]
    DimensionMismatch {
        id: String,
        collection: String,
        expected: usize,
        actual: usize,
    },

    #[error("Collection '{collection}' did not become available after {attempts} checks")]
    CollectionNotReady { collection: String, attempts: u32 },

    #[error("Upsert into '{collection}' was not acknowledged")]
    NotAcknowledged { collection: String },
}

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Directory scan failed for '{path}': {source}")]
    ScanFailed {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Path does not exist: {0}")]
    MissingPath(PathBuf),

    #[error("Job panicked: {0}")]
    JobPanicked(String),
}

pub type Result<T> = std::result::Result<T, DocflowError>;
