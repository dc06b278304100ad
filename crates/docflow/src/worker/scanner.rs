use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::WorkerError;
use crate::processor::ProcessorRegistry;
use crate::sanitize;
use crate::worker::job::{FileJob, SourceFile};

/// Turns a directory into one pending [`FileJob`] per supported document.
pub struct DirectoryScanner {
    input_directory: PathBuf,
    recursive: bool,
}

impl DirectoryScanner {
    pub fn new<P: AsRef<Path>>(input_directory: P) -> Self {
        Self {
            input_directory: input_directory.as_ref().to_path_buf(),
            recursive: false,
        }
    }

    /// Also descend into subdirectories.
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn input_directory(&self) -> &Path {
        &self.input_directory
    }

    pub fn scan(&self) -> Result<Vec<FileJob>, WorkerError> {
        if !self.input_directory.exists() {
            return Err(WorkerError::MissingPath(self.input_directory.clone()));
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let mut jobs = Vec::new();

        for entry in WalkDir::new(&self.input_directory)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(WorkerError::ScanFailed {
                        path: self.input_directory.clone(),
                        source: e,
                    });
                }
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if ProcessorRegistry::is_supported(path) {
                debug!(
                    "Found document {} ({})",
                    sanitize::redact_path(path),
                    sanitize::hash_path(path)
                );
                jobs.push(FileJob::new(SourceFile::from_path(path)));
            }
        }

        info!(
            "Scanned {} documents in {}",
            jobs.len(),
            self.input_directory.display()
        );
        Ok(jobs)
    }
}

/// Builds jobs for a mix of files and directories. Files are taken as given,
/// even with an unsupported extension, so that extraction reports the reason.
pub fn collect_jobs(paths: &[PathBuf], recursive: bool) -> Result<Vec<FileJob>, WorkerError> {
    let mut jobs = Vec::new();

    for path in paths {
        if path.is_dir() {
            jobs.extend(DirectoryScanner::new(path).recursive(recursive).scan()?);
        } else if path.is_file() {
            jobs.push(FileJob::new(SourceFile::from_path(path)));
        } else {
            return Err(WorkerError::MissingPath(path.clone()));
        }
    }

    Ok(jobs)
}
