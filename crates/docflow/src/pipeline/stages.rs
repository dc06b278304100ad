//! Snapshot transitions for [`FileJob`].
//!
//! Every function here consumes a job and returns the next snapshot. Nothing
//! outside the returned value is touched, so a caller always rebinds.

use crate::worker::job::{Chunk, FileJob, JobStatus, StageName, StageStatus};

impl FileJob {
    /// Replaces the status and detail of one stage. All other stages and fields
    /// are carried over unchanged.
    pub fn with_stage(
        mut self,
        name: StageName,
        status: StageStatus,
        detail: Option<String>,
    ) -> FileJob {
        let stage = &mut self.stages[name.index()];
        stage.status = status;
        stage.detail = detail;
        self
    }

    pub fn with_status(mut self, status: JobStatus) -> FileJob {
        self.status = status;
        self
    }

    pub fn with_extracted_text(mut self, text: String) -> FileJob {
        self.extracted_text = Some(text);
        self
    }

    pub fn with_cleaned_text(mut self, text: String) -> FileJob {
        self.cleaned_text = Some(text);
        self
    }

    pub fn with_chunks(mut self, chunks: Vec<Chunk>) -> FileJob {
        self.chunks = chunks;
        self
    }

    /// Applies `update` to the chunk at zero-based `index`. Out-of-range indices
    /// leave the job unchanged.
    pub fn with_chunk(mut self, index: usize, update: impl FnOnce(&mut Chunk)) -> FileJob {
        if let Some(chunk) = self.chunks.get_mut(index) {
            update(chunk);
        }
        self
    }

    /// Marks the job failed. The in-progress stage, if any, is marked failed with
    /// the same message.
    pub fn into_failed(self, message: &str) -> FileJob {
        let job = match self.active_stage() {
            Some(name) => self.with_stage(name, StageStatus::Failed, Some(message.to_string())),
            None => self,
        };
        let mut job = job.with_status(JobStatus::Failed);
        job.error = Some(message.to_string());
        job
    }
}

/// Checks the stage ordering rules on a snapshot: completed stages form a
/// prefix, at most one stage is in progress and only pending stages follow a
/// failed or in-progress one.
pub fn stages_are_ordered(job: &FileJob) -> bool {
    let mut seen_open = false;
    for stage in &job.stages {
        match stage.status {
            StageStatus::Completed if seen_open => return false,
            StageStatus::Completed => {}
            StageStatus::InProgress | StageStatus::Failed if seen_open => return false,
            StageStatus::InProgress | StageStatus::Failed => seen_open = true,
            StageStatus::Pending => seen_open = true,
        }
    }
    true
}
