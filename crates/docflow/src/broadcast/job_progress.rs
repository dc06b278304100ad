//! Job progress broadcaster for real-time job status streaming.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::worker::job::{FileJob, JobStatus, StageName, StageStatus};

/// Progress event for a job, derived from one published snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobProgressEvent {
    /// Unique job identifier.
    pub job_id: String,
    /// Name of the file being processed.
    pub file_name: String,
    /// Overall job status.
    pub status: JobStatus,
    /// Stage the job is in, or the stage that failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_stage: Option<StageName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage_status: Option<StageStatus>,
    /// Human-readable message describing current activity.
    pub message: String,
    pub chunks_total: usize,
    pub chunks_embedded: usize,
    pub chunks_stored: usize,
    /// Error message (set on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Timestamp of this event.
    pub timestamp: DateTime<Utc>,
}

impl JobProgressEvent {
    pub fn from_job(job: &FileJob) -> Self {
        let focus = focus_stage(job);
        let stage = focus.map(|name| job.stage(name));

        let message = match (job.status, stage) {
            (JobStatus::Completed, _) => "Processing completed successfully".to_string(),
            (JobStatus::Failed, _) => job
                .error
                .clone()
                .unwrap_or_else(|| "Processing failed".to_string()),
            (_, Some(stage)) => match &stage.detail {
                Some(detail) => format!("{}: {}", stage.name, detail),
                None => format!("{} {}", stage.name, stage.status),
            },
            (status, None) => format!("Job {}", status),
        };

        Self {
            job_id: job.id.clone(),
            file_name: job.source_file.name.clone(),
            status: job.status,
            current_stage: focus,
            stage_status: stage.map(|s| s.status),
            message,
            chunks_total: job.chunks.len(),
            chunks_embedded: job.chunks_embedded(),
            chunks_stored: job.chunks_stored(),
            error: job.error.clone(),
            timestamp: Utc::now(),
        }
    }
}

/// The stage an observer cares about: the in-progress or failed one, otherwise
/// the last completed one.
fn focus_stage(job: &FileJob) -> Option<StageName> {
    job.stages
        .iter()
        .find(|s| matches!(s.status, StageStatus::InProgress | StageStatus::Failed))
        .or_else(|| {
            job.stages
                .iter()
                .rev()
                .find(|s| s.status == StageStatus::Completed)
        })
        .map(|s| s.name)
}

/// Broadcasts job progress events for streaming.
#[derive(Clone)]
pub struct JobProgressBroadcaster {
    sender: Arc<broadcast::Sender<JobProgressEvent>>,
}

impl JobProgressBroadcaster {
    /// Creates a new job progress broadcaster with the specified channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Sends a progress event to all subscribers.
    pub fn send(&self, event: JobProgressEvent) {
        // Ignore errors - no active receivers is fine
        let _ = self.sender.send(event);
    }

    /// Creates a new subscriber for progress events.
    pub fn subscribe(&self) -> broadcast::Receiver<JobProgressEvent> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for JobProgressBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}
