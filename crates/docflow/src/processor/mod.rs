pub mod docx;
pub mod pdf;
pub mod text;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ExtractError;
use crate::worker::job::SourceFile;

pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 50;

/// Extraction collaborator: returns the raw text of a source file.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, source: &SourceFile) -> Result<String, ExtractError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Text,
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "txt" | "text" | "md" => Some(Self::Text),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

pub trait DocumentProcessor: Send + Sync {
    fn process(&self, path: &Path) -> Result<String, ExtractError>;
    fn supports(&self, format: DocumentFormat) -> bool;
}

/// Local-file extractor that dispatches on the file extension.
#[derive(Clone)]
pub struct ProcessorRegistry {
    processors: Arc<Vec<Box<dyn DocumentProcessor>>>,
    max_file_size_mb: u64,
}

impl ProcessorRegistry {
    pub fn new(max_file_size_mb: u64) -> Self {
        let processors: Vec<Box<dyn DocumentProcessor>> = vec![
            Box::new(text::TextProcessor::new()),
            Box::new(pdf::PdfProcessor::new()),
            Box::new(docx::DocxProcessor::new()),
        ];

        Self {
            processors: Arc::new(processors),
            max_file_size_mb,
        }
    }

    pub fn is_supported(path: &Path) -> bool {
        DocumentFormat::from_path(path).is_some()
    }

    /// Blocking extraction of one file.
    pub fn process(&self, path: &Path) -> Result<String, ExtractError> {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let format = DocumentFormat::from_extension(extension)
            .ok_or_else(|| ExtractError::UnsupportedFormat(extension.to_string()))?;

        self.check_size(path)?;

        let processor = self
            .processors
            .iter()
            .find(|p| p.supports(format))
            .ok_or_else(|| ExtractError::UnsupportedFormat(extension.to_string()))?;

        let text = processor.process(path)?;
        if text.trim().is_empty() {
            return Err(ExtractError::NoTextContent);
        }
        Ok(text)
    }

    fn check_size(&self, path: &Path) -> Result<(), ExtractError> {
        let size = std::fs::metadata(path)
            .map_err(|e| ExtractError::ReadDocument {
                path: path.to_path_buf(),
                source: e,
            })?
            .len();

        if size > self.max_file_size_mb * 1024 * 1024 {
            return Err(ExtractError::FileTooLarge {
                size_mb: size as f64 / (1024.0 * 1024.0),
                limit_mb: self.max_file_size_mb,
            });
        }
        Ok(())
    }
}

impl Default for ProcessorRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_SIZE_MB)
    }
}

#[async_trait]
impl Extractor for ProcessorRegistry {
    async fn extract(&self, source: &SourceFile) -> Result<String, ExtractError> {
        let registry = self.clone();
        let path = source.path.clone();
        tokio::task::spawn_blocking(move || registry.process(&path))
            .await
            .map_err(|e| ExtractError::TaskFailed(e.to_string()))?
    }
}
