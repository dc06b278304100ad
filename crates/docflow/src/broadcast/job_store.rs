//! In-memory job store keeping the latest snapshot per job.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pipeline::progress::ProgressReporter;
use crate::worker::job::{FileJob, JobStatus};

/// A stored job with its timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredJob {
    /// Latest published snapshot.
    pub job: FileJob,
    /// When the first snapshot for this job was seen.
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// When the job reached a terminal status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl StoredJob {
    pub fn from_job(job: &FileJob) -> Self {
        let now = Utc::now();
        Self {
            job: job.clone(),
            started_at: now,
            updated_at: now,
            completed_at: job.status.is_terminal().then_some(now),
        }
    }

    /// Replaces the snapshot, keeping the original start time.
    pub fn update_from_job(&mut self, job: &FileJob) {
        let now = Utc::now();
        self.job = job.clone();
        self.updated_at = now;
        if job.status.is_terminal() && self.completed_at.is_none() {
            self.completed_at = Some(now);
        }
    }

    /// Returns true if this job is finished (completed or failed).
    pub fn is_finished(&self) -> bool {
        self.job.status.is_terminal()
    }
}

/// Query parameters for job listing.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobQueryParams {
    pub status: Option<JobStatus>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Response for job listing with pagination.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListResponse {
    pub jobs: Vec<StoredJob>,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
}

/// Job counts by status.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCounts {
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub failed: usize,
}

/// Job store backed by an in-memory map.
///
/// Registered as a progress observer, it always holds the most recent snapshot
/// published for each job.
#[derive(Default)]
pub struct JobStore {
    cache: RwLock<HashMap<String, StoredJob>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_cache(&self) -> RwLockReadGuard<'_, HashMap<String, StoredJob>> {
        match self.cache.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Job store cache lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, HashMap<String, StoredJob>> {
        match self.cache.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Job store cache lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Records a snapshot.
    pub fn update(&self, job: &FileJob) {
        let mut cache = self.write_cache();
        if let Some(stored) = cache.get_mut(&job.id) {
            stored.update_from_job(job);
        } else {
            cache.insert(job.id.clone(), StoredJob::from_job(job));
        }
    }

    /// Returns a specific job by ID.
    pub fn get(&self, job_id: &str) -> Option<StoredJob> {
        self.read_cache().get(job_id).cloned()
    }

    /// Returns all jobs sorted by started_at (newest first).
    pub fn get_all(&self) -> Vec<StoredJob> {
        let mut result: Vec<StoredJob> = self.read_cache().values().cloned().collect();
        result.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        result
    }

    /// Query jobs with a status filter and pagination.
    pub fn query(&self, params: &JobQueryParams) -> JobListResponse {
        let mut jobs = self.get_all();

        if let Some(status) = params.status {
            jobs.retain(|j| j.job.status == status);
        }

        let total = jobs.len();
        let offset = params.offset.unwrap_or(0);
        let limit = params.limit.unwrap_or(100);
        let jobs: Vec<StoredJob> = jobs.into_iter().skip(offset).take(limit).collect();

        JobListResponse {
            jobs,
            total,
            limit: params.limit,
            offset: params.offset,
        }
    }

    /// Returns all jobs that are still running.
    pub fn get_processing(&self) -> Vec<StoredJob> {
        self.read_cache()
            .values()
            .filter(|j| j.job.status == JobStatus::InProgress)
            .cloned()
            .collect()
    }

    pub fn counts(&self) -> JobCounts {
        let cache = self.read_cache();
        let mut counts = JobCounts::default();

        for stored in cache.values() {
            match stored.job.status {
                JobStatus::Pending => counts.pending += 1,
                JobStatus::InProgress => counts.in_progress += 1,
                JobStatus::Completed => counts.completed += 1,
                JobStatus::Failed => counts.failed += 1,
            }
        }

        counts
    }

    /// Drops finished jobs, returning how many were removed.
    pub fn clear_finished(&self) -> usize {
        let mut cache = self.write_cache();
        let before = cache.len();
        cache.retain(|_, j| !j.is_finished());
        before - cache.len()
    }
}

impl ProgressReporter for JobStore {
    fn report(&self, job: &FileJob) {
        self.update(job);
    }
}
