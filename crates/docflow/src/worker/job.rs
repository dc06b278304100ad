use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Namespace for deriving chunk ids. Fixed so that ids stay stable across runs.
pub const CHUNK_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6a1f_3c2e_9d4b_4e8a_b7c5_1d2e_3f40_5a6b);

/// Status shared by jobs, stages and the per-chunk sub-progress fields.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum JobStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::InProgress => write!(f, "in-progress"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

pub type StageStatus = JobStatus;

/// The five stages every file passes through, in order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StageName {
    #[serde(rename = "Extract Text")]
    ExtractText,
    #[serde(rename = "Clean Text")]
    CleanText,
    #[serde(rename = "Chunk Text")]
    ChunkText,
    #[serde(rename = "Generate Embeddings")]
    GenerateEmbeddings,
    #[serde(rename = "Store")]
    Store,
}

impl StageName {
    pub const ALL: [StageName; 5] = [
        StageName::ExtractText,
        StageName::CleanText,
        StageName::ChunkText,
        StageName::GenerateEmbeddings,
        StageName::Store,
    ];

    /// Slot of this stage in [`FileJob::stages`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::ExtractText => "Extract Text",
            StageName::CleanText => "Clean Text",
            StageName::ChunkText => "Chunk Text",
            StageName::GenerateEmbeddings => "Generate Embeddings",
            StageName::Store => "Store",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stage {
    pub name: StageName,
    pub status: StageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Stage {
    pub fn pending(name: StageName) -> Self {
        Self {
            name,
            status: StageStatus::Pending,
            detail: None,
        }
    }
}

/// The file a job was created for. Owned by the driver; the pipeline only reads it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SourceFile {
    pub name: String,
    pub path: PathBuf,
    /// Declared media type, e.g. "application/pdf".
    pub media_type: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, media_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            media_type: media_type.into(),
        }
    }

    /// Builds a source from a path, detecting the media type from the extension.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string();
        let media_type = detect_media_type(&path);
        Self {
            name,
            path,
            media_type,
        }
    }
}

/// Detects a media type using the mime_guess crate, falling back to octet-stream.
fn detect_media_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first()
        .map(|m| m.to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

/// Fields copied onto every chunk of a job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkMetadata {
    pub file_name: String,
    pub path: String,
    pub media_type: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl ChunkMetadata {
    pub fn for_source(source: &SourceFile, chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            file_name: source.name.clone(),
            path: source.path.display().to_string(),
            media_type: source.media_type.clone(),
            chunk_size,
            chunk_overlap,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    pub id: String,
    pub parent_id: String,
    /// 1-based position in chunking order.
    pub sequence_index: usize,
    pub text: String,
    pub metadata: ChunkMetadata,
    pub embedding_status: JobStatus,
    pub storage_status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_vector: Option<Vec<f32>>,
}

impl Chunk {
    /// Deterministic chunk id from the parent job id and the zero-based index.
    pub fn derive_id(parent_id: &str, zero_based_index: usize) -> String {
        let name = format!("{}:{}", parent_id, zero_based_index);
        Uuid::new_v5(&CHUNK_ID_NAMESPACE, name.as_bytes()).to_string()
    }
}

/// One file under processing.
///
/// Values are treated as immutable snapshots: every state change goes through a
/// method that consumes the job and returns the next snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileJob {
    pub id: String,
    pub source_file: SourceFile,
    pub status: JobStatus,
    pub stages: [Stage; 5],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleaned_text: Option<String>,
    pub chunks: Vec<Chunk>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileJob {
    /// Creates a pending job with a fresh random id.
    pub fn new(source_file: SourceFile) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), source_file)
    }

    pub fn with_id(id: impl Into<String>, source_file: SourceFile) -> Self {
        Self {
            id: id.into(),
            source_file,
            status: JobStatus::Pending,
            stages: StageName::ALL.map(Stage::pending),
            extracted_text: None,
            cleaned_text: None,
            chunks: Vec::new(),
            error: None,
        }
    }

    pub fn stage(&self, name: StageName) -> &Stage {
        &self.stages[name.index()]
    }

    /// The stage currently marked in-progress, if any.
    pub fn active_stage(&self) -> Option<StageName> {
        self.stages
            .iter()
            .find(|s| s.status == StageStatus::InProgress)
            .map(|s| s.name)
    }

    pub fn chunks_embedded(&self) -> usize {
        self.chunks
            .iter()
            .filter(|c| c.embedding_status == JobStatus::Completed)
            .count()
    }

    pub fn chunks_stored(&self) -> usize {
        self.chunks
            .iter()
            .filter(|c| c.storage_status == JobStatus::Completed)
            .count()
    }
}
