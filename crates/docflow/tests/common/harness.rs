//! Test harness for isolated test execution.
//!
//! Provides temporary input/config directories, scripted collaborators whose
//! failures can be placed precisely, and a recorder that keeps every snapshot
//! the pipeline publishes.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::TempDir;

use docflow::config::schema::Config;
use docflow::embedding::{Embedder, HashEmbedder};
use docflow::error::{EmbedError, ExtractError};
use docflow::pipeline::ProgressReporter;
use docflow::processor::Extractor;
use docflow::worker::job::{FileJob, SourceFile};

/// Isolated environment with `input/` and `config/` directories.
pub struct TestHarness {
    temp_dir: TempDir,
    pub input_dir: PathBuf,
    pub config_dir: PathBuf,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let input_dir = temp_dir.path().join("input");
        let config_dir = temp_dir.path().join("config");
        std::fs::create_dir_all(&input_dir).expect("Failed to create input dir");
        std::fs::create_dir_all(&config_dir).expect("Failed to create config dir");

        Self {
            temp_dir,
            input_dir,
            config_dir,
        }
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn write_input(&self, filename: &str, content: &[u8]) -> PathBuf {
        let path = self.input_dir.join(filename);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create input subdirectory");
        }
        std::fs::write(&path, content).expect("Failed to write input file");
        path
    }

    pub fn write_text_input(&self, filename: &str, content: &str) -> PathBuf {
        self.write_input(filename, content.as_bytes())
    }

    pub fn write_config(&self, filename: &str, config: &Config) -> PathBuf {
        let path = self.config_dir.join(filename);
        let json = serde_json::to_string_pretty(config).expect("Failed to serialize config");
        std::fs::write(&path, json).expect("Failed to write config file");
        path
    }

    /// A pending job for a file written with [`TestHarness::write_input`].
    pub fn job_for(&self, filename: &str) -> FileJob {
        FileJob::new(SourceFile::from_path(self.input_dir.join(filename)))
    }
}

/// Extractor that returns a fixed text, or a fixed failure, without touching disk.
pub struct ScriptedExtractor {
    result: Result<String, String>,
    calls: AtomicUsize,
}

impl ScriptedExtractor {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            result: Ok(text.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Fails with a [`ExtractError::PdfProcessing`] carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            result: Err(message.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Extractor for ScriptedExtractor {
    async fn extract(&self, _source: &SourceFile) -> Result<String, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.result {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(ExtractError::PdfProcessing(message.clone())),
        }
    }
}

/// Deterministic embedder that can be told to fail on its N-th call (1-based).
pub struct ScriptedEmbedder {
    inner: HashEmbedder,
    fail_on_call: Option<usize>,
    calls: AtomicUsize,
    texts: Mutex<Vec<String>>,
}

impl ScriptedEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            inner: HashEmbedder::new(dimension),
            fail_on_call: None,
            calls: AtomicUsize::new(0),
            texts: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_on_call(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Texts in the order they were embedded.
    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Embedder for ScriptedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.texts.lock().unwrap().push(text.to_string());
        if self.fail_on_call == Some(call) {
            return Err(EmbedError::Api {
                status: 503,
                body: "model overloaded".to_string(),
            });
        }
        self.inner.embed(text).await
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Keeps a copy of every published snapshot.
#[derive(Default)]
pub struct Recorder {
    snapshots: Mutex<Vec<FileJob>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshots(&self) -> Vec<FileJob> {
        self.snapshots.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<FileJob> {
        self.snapshots.lock().unwrap().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshots.lock().unwrap().len()
    }
}

impl ProgressReporter for Recorder {
    fn report(&self, job: &FileJob) {
        self.snapshots.lock().unwrap().push(job.clone());
    }
}
