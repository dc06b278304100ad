use std::sync::Arc;

use tracing::{debug, info, info_span, warn, Instrument};

use crate::chunker;
use crate::config::Config;
use crate::embedding::{create_embedder, Embedder};
use crate::error::{ConfigError, EmbedError, StoreError};
use crate::processor::{Extractor, ProcessorRegistry};
use crate::sanitize;
use crate::store::{
    CollectionSpec, Distance, Point, QdrantConnector, StoreClient, StoreConfig, StoreConnector,
    UpsertRequest,
};
use crate::worker::job::{Chunk, ChunkMetadata, FileJob, JobStatus, StageName, StageStatus};

use super::config::PipelineConfig;
use super::error::PipelineError;
use super::progress::{CancelFlag, ProgressReporter};

/// A job that stopped early, together with the error that stopped it.
struct Halted {
    job: FileJob,
    error: PipelineError,
}

type StageResult = Result<FileJob, Box<Halted>>;

fn halt(job: FileJob, error: impl Into<PipelineError>) -> Box<Halted> {
    Box::new(Halted {
        job,
        error: error.into(),
    })
}

/// Drives one file through extract, clean, chunk, embed and store.
pub struct Pipeline {
    config: PipelineConfig,
    extractor: Arc<dyn Extractor>,
    embedder: Arc<dyn Embedder>,
    connector: Arc<dyn StoreConnector>,
    cancel: CancelFlag,
}

impl Pipeline {
    /// Production constructor: builds every collaborator from config.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let extractor = Arc::new(ProcessorRegistry::new(config.extraction.max_file_size_mb));
        let embedder = create_embedder(&config.embedding)?;
        let connector = Arc::new(QdrantConnector::new(config.store.timeout()));

        Self::new(
            PipelineConfig::from_config(config),
            extractor,
            embedder,
            connector,
        )
    }

    /// Injects specific collaborators. Rejects settings that could only fail
    /// halfway through a job.
    pub fn new(
        config: PipelineConfig,
        extractor: Arc<dyn Extractor>,
        embedder: Arc<dyn Embedder>,
        connector: Arc<dyn StoreConnector>,
    ) -> Result<Self, ConfigError> {
        config.chunking.validate()?;
        if config.batch_size == 0 {
            return Err(ConfigError::Validation {
                message: "batch_size must be greater than 0".to_string(),
            });
        }
        if config.settle_attempts == 0 {
            return Err(ConfigError::Validation {
                message: "settle_attempts must be greater than 0".to_string(),
            });
        }
        if embedder.dimension() != config.dimension {
            return Err(ConfigError::Validation {
                message: format!(
                    "embedder '{}' produces {} dimensions but the pipeline expects {}",
                    embedder.model_name(),
                    embedder.dimension(),
                    config.dimension
                ),
            });
        }

        Ok(Self {
            config,
            extractor,
            embedder,
            connector,
            cancel: CancelFlag::new(),
        })
    }

    /// Shares `flag` with this pipeline. Setting it fails every job at its
    /// next stage, chunk or batch boundary.
    pub fn with_cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = flag;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs the full pipeline for a single job.
    ///
    /// Every snapshot is handed to `progress` as soon as it exists. The
    /// returned job is the last published snapshot and is always terminal.
    /// Nothing is retried here; the caller decides whether to run a failed job
    /// again.
    pub async fn process(
        &self,
        job: FileJob,
        progress: &dyn ProgressReporter,
        store_config: &StoreConfig,
    ) -> FileJob {
        let span = info_span!("pipeline",
            job_id = %job.id,
            filename = %sanitize::redact_path(&job.source_file.path),
        );

        async move {
            let job = job.with_status(JobStatus::InProgress);
            progress.report(&job);

            match self.run_stages(job, progress, store_config).await {
                Ok(job) => {
                    let job = job.with_status(JobStatus::Completed);
                    info!(chunks = job.chunks.len(), "Job completed");
                    progress.report(&job);
                    job
                }
                Err(halted) => {
                    let Halted { job, error } = *halted;
                    warn!(kind = ?error.kind(), error = %error, "Job failed");
                    let job = job.into_failed(&error.to_string());
                    progress.report(&job);
                    job
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run_stages(
        &self,
        job: FileJob,
        progress: &dyn ProgressReporter,
        store_config: &StoreConfig,
    ) -> StageResult {
        let job = self
            .extract_text(job, progress)
            .instrument(info_span!("extract_text"))
            .await?;
        let job = self
            .clean_text(job, progress)
            .instrument(info_span!("clean_text"))
            .await?;
        let job = self
            .chunk_text(job, progress)
            .instrument(info_span!("chunk_text"))
            .await?;
        let job = self
            .generate_embeddings(job, progress)
            .instrument(info_span!("generate_embeddings"))
            .await?;
        self.store(job, progress, store_config)
            .instrument(info_span!("store"))
            .await
    }

    /// Marks `stage` in-progress and publishes. A pending cancellation fails
    /// the stage before any work starts.
    fn begin(&self, job: FileJob, stage: StageName, progress: &dyn ProgressReporter) -> StageResult {
        let job = job.with_stage(stage, StageStatus::InProgress, None);
        progress.report(&job);
        self.check_cancelled(job, stage)
    }

    fn finish(
        &self,
        job: FileJob,
        stage: StageName,
        detail: String,
        progress: &dyn ProgressReporter,
    ) -> FileJob {
        debug!(stage = %stage, detail = %detail, "Stage completed");
        let job = job.with_stage(stage, StageStatus::Completed, Some(detail));
        progress.report(&job);
        job
    }

    fn check_cancelled(&self, job: FileJob, stage: StageName) -> StageResult {
        if self.cancel.is_cancelled() {
            return Err(halt(job, PipelineError::Cancelled(stage)));
        }
        Ok(job)
    }

    async fn extract_text(&self, job: FileJob, progress: &dyn ProgressReporter) -> StageResult {
        let job = self.begin(job, StageName::ExtractText, progress)?;

        let extracted = self.extractor.extract(&job.source_file).await;
        let text = match extracted {
            Ok(text) => text,
            Err(e) => return Err(halt(job, e)),
        };

        let detail = format!("Extracted {} characters", text.chars().count());
        let job = job.with_extracted_text(text);
        Ok(self.finish(job, StageName::ExtractText, detail, progress))
    }

    async fn clean_text(&self, job: FileJob, progress: &dyn ProgressReporter) -> StageResult {
        let job = self.begin(job, StageName::CleanText, progress)?;

        let cleaned = match job.extracted_text.as_deref() {
            Some(text) => normalize_whitespace(text),
            None => {
                return Err(halt(
                    job,
                    PipelineError::Precondition("cleaning requires extracted text".to_string()),
                ))
            }
        };

        let detail = format!("{} characters after cleaning", cleaned.chars().count());
        let job = job.with_cleaned_text(cleaned);
        Ok(self.finish(job, StageName::CleanText, detail, progress))
    }

    async fn chunk_text(&self, job: FileJob, progress: &dyn ProgressReporter) -> StageResult {
        let job = self.begin(job, StageName::ChunkText, progress)?;

        let chunking = &self.config.chunking;
        let metadata =
            ChunkMetadata::for_source(&job.source_file, chunking.chunk_size, chunking.chunk_overlap);
        let chunks = match job.cleaned_text.as_deref() {
            Some(text) => chunker::chunk(text, chunking, &job.id, &metadata),
            None => {
                return Err(halt(
                    job,
                    PipelineError::Precondition("chunking requires cleaned text".to_string()),
                ))
            }
        };

        let detail = format!("Created {} chunks", chunks.len());
        let job = job.with_chunks(chunks);
        Ok(self.finish(job, StageName::ChunkText, detail, progress))
    }

    /// Embeds chunks one at a time, in sequence order, publishing after each.
    async fn generate_embeddings(
        &self,
        job: FileJob,
        progress: &dyn ProgressReporter,
    ) -> StageResult {
        let mut job = self.begin(job, StageName::GenerateEmbeddings, progress)?;

        for index in 0..job.chunks.len() {
            if index > 0 {
                job = self.check_cancelled(job, StageName::GenerateEmbeddings)?;
            }

            let embedded = self.embedder.embed(&job.chunks[index].text).await;
            let vector = match embedded {
                Ok(vector) => vector,
                Err(e) => return Err(halt(job, e)),
            };
            if vector.len() != self.config.dimension {
                let error = EmbedError::DimensionMismatch {
                    expected: self.config.dimension,
                    actual: vector.len(),
                };
                return Err(halt(job, error));
            }

            job = job.with_chunk(index, |chunk| {
                chunk.embedding_vector = Some(vector);
                chunk.embedding_status = JobStatus::Completed;
            });
            progress.report(&job);
        }

        let detail = format!(
            "Embedded {} chunks with {}",
            job.chunks.len(),
            self.embedder.model_name()
        );
        Ok(self.finish(job, StageName::GenerateEmbeddings, detail, progress))
    }

    /// Validates the store settings, makes sure the collection exists and
    /// upserts the chunks in acknowledged batches.
    async fn store(
        &self,
        job: FileJob,
        progress: &dyn ProgressReporter,
        store_config: &StoreConfig,
    ) -> StageResult {
        let mut job = self.begin(job, StageName::Store, progress)?;

        let target = match store_config.target() {
            Ok(target) => target,
            Err(missing) => {
                return Err(halt(job, PipelineError::Configuration(missing.join(", "))));
            }
        };
        debug!(
            endpoint = %sanitize::redact_endpoint(&target.endpoint),
            collection = %target.collection,
            "Store target resolved"
        );

        let client = match self.connector.connect(&target) {
            Ok(client) => client,
            Err(e) => return Err(halt(job, e)),
        };

        if let Err(e) = self.ensure_collection(client.as_ref(), &target.collection).await {
            return Err(halt(job, e));
        }

        let total = job.chunks.len();
        let mut start = 0;
        while start < total {
            job = self.check_cancelled(job, StageName::Store)?;
            let end = (start + self.config.batch_size).min(total);

            let points = match job.chunks[start..end]
                .iter()
                .map(point_for_chunk)
                .collect::<Result<Vec<_>, _>>()
            {
                Ok(points) => points,
                Err(e) => return Err(halt(job, e)),
            };

            let request = UpsertRequest { points, wait: true };
            if let Err(e) = client.upsert(&target.collection, request).await {
                return Err(halt(job, e));
            }
            debug!(from = start + 1, to = end, "Batch stored");

            job = (start..end).fold(job, |job, index| {
                job.with_chunk(index, |chunk| chunk.storage_status = JobStatus::Completed)
            });
            progress.report(&job);
            start = end;
        }

        let detail = format!(
            "Stored {} vectors in collection '{}'",
            total, target.collection
        );
        Ok(self.finish(job, StageName::Store, detail, progress))
    }

    async fn ensure_collection(
        &self,
        client: &dyn StoreClient,
        collection: &str,
    ) -> Result<(), StoreError> {
        let existing = client.list_collections().await?;
        if existing.contains(collection) {
            return Ok(());
        }

        let spec = CollectionSpec {
            dimension: self.config.dimension,
            distance: Distance::Cosine,
        };
        match client.create_collection(collection, &spec).await {
            Ok(()) => info!(collection, dimension = spec.dimension, "Collection created"),
            Err(StoreError::CollectionExists(_)) => {
                debug!(collection, "Collection was created concurrently");
            }
            Err(e) => return Err(e),
        }

        self.wait_for_collection(client, collection).await
    }

    /// Re-lists collections until `collection` shows up.
    async fn wait_for_collection(
        &self,
        client: &dyn StoreClient,
        collection: &str,
    ) -> Result<(), StoreError> {
        for attempt in 1..=self.config.settle_attempts {
            if client.list_collections().await?.contains(collection) {
                return Ok(());
            }
            debug!(collection, attempt, "Collection not visible yet");
            if attempt < self.config.settle_attempts {
                tokio::time::sleep(self.config.settle_interval).await;
            }
        }

        Err(StoreError::CollectionNotReady {
            collection: collection.to_string(),
            attempts: self.config.settle_attempts,
        })
    }
}

/// Collapses whitespace runs to a single space and trims both ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Store point for an embedded chunk. The payload is the chunk text plus its
/// metadata fields, flattened.
fn point_for_chunk(chunk: &Chunk) -> Result<Point, PipelineError> {
    let vector = chunk.embedding_vector.clone().ok_or_else(|| {
        PipelineError::Precondition(format!(
            "chunk {} has no embedding vector",
            chunk.sequence_index
        ))
    })?;

    let mut payload = serde_json::Map::new();
    payload.insert("text".into(), chunk.text.clone().into());
    payload.insert("parent_id".into(), chunk.parent_id.clone().into());
    payload.insert("sequence_index".into(), chunk.sequence_index.into());
    payload.insert("file_name".into(), chunk.metadata.file_name.clone().into());
    payload.insert("path".into(), chunk.metadata.path.clone().into());
    payload.insert("media_type".into(), chunk.metadata.media_type.clone().into());
    payload.insert("chunk_size".into(), chunk.metadata.chunk_size.into());
    payload.insert("chunk_overlap".into(), chunk.metadata.chunk_overlap.into());

    Ok(Point {
        id: chunk.id.clone(),
        vector,
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedder;
    use crate::error::ExtractError;
    use crate::pipeline::error::ErrorKind;
    use crate::pipeline::progress::NoopProgress;
    use crate::pipeline::stages::stages_are_ordered;
    use crate::store::{MemoryStore, SharedStoreConnector};
    use crate::worker::job::SourceFile;
    use async_trait::async_trait;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    const DIM: usize = 8;

    struct FixedText(String);

    #[async_trait]
    impl Extractor for FixedText {
        async fn extract(&self, _source: &SourceFile) -> Result<String, ExtractError> {
            Ok(self.0.clone())
        }
    }

    struct ShortEmbedder;

    #[async_trait]
    impl Embedder for ShortEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedError> {
            Ok(vec![0.5; DIM - 1])
        }

        fn dimension(&self) -> usize {
            DIM
        }

        fn model_name(&self) -> &str {
            "short"
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<FileJob>>);

    impl ProgressReporter for Recorder {
        fn report(&self, job: &FileJob) {
            self.0.lock().unwrap().push(job.clone());
        }
    }

    impl Recorder {
        fn snapshots(&self) -> Vec<FileJob> {
            self.0.lock().unwrap().clone()
        }
    }

    fn test_config() -> PipelineConfig {
        PipelineConfig::default()
            .with_chunking(chunker::ChunkingConfig::new(10, 2).unwrap())
            .with_dimension(DIM)
            .with_batch_size(2)
            .with_settle(3, std::time::Duration::from_millis(1))
    }

    fn pipeline(
        text: &str,
        embedder: Arc<dyn Embedder>,
        store: Arc<MemoryStore>,
    ) -> (Pipeline, Arc<SharedStoreConnector>) {
        let connector = Arc::new(SharedStoreConnector::new(store));
        let pipeline = Pipeline::new(
            test_config(),
            Arc::new(FixedText(text.to_string())),
            embedder,
            connector.clone(),
        )
        .unwrap();
        (pipeline, connector)
    }

    fn job() -> FileJob {
        FileJob::with_id("job-1", SourceFile::new("a.txt", "/tmp/a.txt", "text/plain"))
    }

    fn store_config() -> StoreConfig {
        StoreConfig::new("http://localhost:6333", "secret", "docs")
    }

    #[tokio::test]
    async fn test_full_pipeline_success() {
        let store = Arc::new(MemoryStore::new());
        let (pipeline, _) = pipeline(
            "  one two\n three   four five six  ",
            Arc::new(HashEmbedder::new(DIM)),
            store.clone(),
        );

        let recorder = Recorder::default();
        let done = pipeline.process(job(), &recorder, &store_config()).await;

        assert_eq!(done.status, JobStatus::Completed);
        assert_eq!(done.cleaned_text.as_deref(), Some("one two three four five six"));
        assert!(done
            .stages
            .iter()
            .all(|s| s.status == StageStatus::Completed));
        assert_eq!(done.chunks.len(), 4);
        assert_eq!(done.chunks_stored(), 4);
        assert_eq!(store.point_count("docs"), 4);
        assert_eq!(
            store.collection_spec("docs"),
            Some(CollectionSpec {
                dimension: DIM,
                distance: Distance::Cosine
            })
        );
        assert_eq!(
            done.stage(StageName::Store).detail.as_deref(),
            Some("Stored 4 vectors in collection 'docs'")
        );

        let snapshots = recorder.snapshots();
        assert_eq!(snapshots.last(), Some(&done));
        assert!(snapshots.iter().all(stages_are_ordered));
    }

    #[tokio::test]
    async fn test_point_payload_is_flattened() {
        let store = Arc::new(MemoryStore::new());
        let (pipeline, _) = pipeline("short text", Arc::new(HashEmbedder::new(DIM)), store.clone());

        let done = pipeline.process(job(), &NoopProgress, &store_config()).await;
        let chunk = &done.chunks[0];
        let point = store.point("docs", &chunk.id).unwrap();

        assert_eq!(point.payload["text"], "short text");
        assert_eq!(point.payload["file_name"], "a.txt");
        assert_eq!(point.payload["media_type"], "text/plain");
        assert_eq!(point.payload["chunk_size"], 10);
        assert_eq!(point.payload["chunk_overlap"], 2);
        assert_eq!(point.payload["sequence_index"], 1);
        assert_eq!(point.payload["parent_id"], "job-1");
        assert_eq!(Some(&point.vector), chunk.embedding_vector.as_ref());
    }

    #[tokio::test]
    async fn test_extraction_failure_is_verbatim() {
        let store = Arc::new(MemoryStore::new());
        let connector = Arc::new(SharedStoreConnector::new(store));
        let pipeline = Pipeline::new(
            test_config(),
            Arc::new(ProcessorRegistry::default()),
            Arc::new(HashEmbedder::new(DIM)),
            connector.clone(),
        )
        .unwrap();

        let file = NamedTempFile::with_suffix(".xyz").unwrap();
        let job = FileJob::with_id("job-x", SourceFile::from_path(file.path()));
        let done = pipeline.process(job, &NoopProgress, &store_config()).await;

        assert_eq!(done.status, JobStatus::Failed);
        let stage = done.stage(StageName::ExtractText);
        assert_eq!(stage.status, StageStatus::Failed);
        assert_eq!(stage.detail.as_deref(), Some("Unsupported document format: xyz"));
        assert_eq!(done.error, stage.detail);
        assert_eq!(done.stage(StageName::CleanText).status, StageStatus::Pending);
        assert_eq!(connector.connect_count(), 0);
    }

    #[tokio::test]
    async fn test_real_text_file_end_to_end() {
        let mut file = NamedTempFile::with_suffix(".txt").unwrap();
        write!(file, "{}", "word ".repeat(30)).unwrap();

        let store = Arc::new(MemoryStore::new());
        let pipeline = Pipeline::new(
            test_config(),
            Arc::new(ProcessorRegistry::default()),
            Arc::new(HashEmbedder::new(DIM)),
            Arc::new(SharedStoreConnector::new(store.clone())),
        )
        .unwrap();

        let job = FileJob::new(SourceFile::from_path(file.path()));
        let done = pipeline.process(job, &NoopProgress, &store_config()).await;

        assert_eq!(done.status, JobStatus::Completed, "error: {:?}", done.error);
        // 149 characters after cleaning, stride 8
        assert_eq!(done.chunks.len(), 19);
        assert_eq!(store.point_count("docs"), 19);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_fails_embedding() {
        let store = Arc::new(MemoryStore::new());
        let (pipeline, connector) = pipeline("some text here", Arc::new(ShortEmbedder), store);

        let done = pipeline.process(job(), &NoopProgress, &store_config()).await;

        let stage = done.stage(StageName::GenerateEmbeddings);
        assert_eq!(stage.status, StageStatus::Failed);
        assert_eq!(
            stage.detail.as_deref(),
            Some("Embedding dimension mismatch: expected 8, got 7")
        );
        assert_eq!(done.chunks_embedded(), 0);
        assert_eq!(connector.connect_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_store_config_fails_fast() {
        let store = Arc::new(MemoryStore::new());
        let (pipeline, connector) = pipeline("some text", Arc::new(HashEmbedder::new(DIM)), store.clone());

        let config = StoreConfig::new("http://localhost:6333", "", "docs");
        let done = pipeline.process(job(), &NoopProgress, &config).await;

        assert_eq!(done.status, JobStatus::Failed);
        assert_eq!(
            done.error.as_deref(),
            Some("Store configuration incomplete: credential")
        );
        for stage in &done.stages[..4] {
            assert_eq!(stage.status, StageStatus::Completed);
        }
        assert_eq!(done.stage(StageName::Store).status, StageStatus::Failed);
        assert_eq!(connector.connect_count(), 0);
        assert_eq!(store.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_existing_collection_is_reused() {
        let spec = CollectionSpec {
            dimension: DIM,
            distance: Distance::Cosine,
        };
        let store = Arc::new(MemoryStore::new().with_collection("docs", spec));
        let (pipeline, _) = pipeline("some text", Arc::new(HashEmbedder::new(DIM)), store.clone());

        let done = pipeline.process(job(), &NoopProgress, &store_config()).await;

        assert_eq!(done.status, JobStatus::Completed);
        assert_eq!(store.create_calls(), 0);
        assert_eq!(store.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_collection_that_never_settles_fails_store() {
        let store = Arc::new(MemoryStore::new().settle_after_lists(10));
        let (pipeline, _) = pipeline("some text", Arc::new(HashEmbedder::new(DIM)), store.clone());

        let done = pipeline.process(job(), &NoopProgress, &store_config()).await;

        assert_eq!(done.status, JobStatus::Failed);
        assert_eq!(
            done.error.as_deref(),
            Some("Collection 'docs' did not become available after 3 checks")
        );
        assert_eq!(store.upsert_calls(), 0);
    }

    #[tokio::test]
    async fn test_cancel_before_start() {
        let store = Arc::new(MemoryStore::new());
        let (pipeline, _) = pipeline("some text", Arc::new(HashEmbedder::new(DIM)), store);
        let flag = CancelFlag::new();
        let pipeline = pipeline.with_cancel_flag(flag.clone());
        flag.cancel();

        let done = pipeline.process(job(), &NoopProgress, &store_config()).await;

        assert_eq!(done.status, JobStatus::Failed);
        assert_eq!(done.stage(StageName::ExtractText).status, StageStatus::Failed);
        assert_eq!(
            done.error.as_deref(),
            Some("Processing cancelled during Extract Text")
        );
    }

    #[test]
    fn test_rejects_embedder_with_other_dimension() {
        let store = Arc::new(MemoryStore::new());
        let result = Pipeline::new(
            test_config(),
            Arc::new(FixedText(String::new())),
            Arc::new(HashEmbedder::new(DIM + 1)),
            Arc::new(SharedStoreConnector::new(store)),
        );
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_rejects_zero_batch_size() {
        let store = Arc::new(MemoryStore::new());
        let result = Pipeline::new(
            test_config().with_batch_size(0),
            Arc::new(FixedText(String::new())),
            Arc::new(HashEmbedder::new(DIM)),
            Arc::new(SharedStoreConnector::new(store)),
        );
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_rejects_zero_settle_attempts() {
        let store = Arc::new(MemoryStore::new());
        let result = Pipeline::new(
            test_config().with_settle(0, std::time::Duration::from_millis(1)),
            Arc::new(FixedText(String::new())),
            Arc::new(HashEmbedder::new(DIM)),
            Arc::new(SharedStoreConnector::new(store)),
        );
        let message = result.err().map(|e| e.to_string()).unwrap_or_default();
        assert!(message.contains("settle_attempts"), "got: {}", message);
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a\t\tb\n\nc  "), "a b c");
        assert_eq!(normalize_whitespace(" \n\t "), "");
        assert_eq!(normalize_whitespace("single"), "single");
    }

    #[test]
    fn test_point_requires_vector() {
        let metadata = ChunkMetadata::for_source(
            &SourceFile::new("a.txt", "/a.txt", "text/plain"),
            10,
            2,
        );
        let chunk = chunker::chunk("hello", &chunker::ChunkingConfig::new(10, 2).unwrap(), "j", &metadata)
            .remove(0);
        let err = point_for_chunk(&chunk).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);
    }
}
