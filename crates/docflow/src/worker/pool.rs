use std::sync::{Arc, Mutex, PoisonError};

use futures_util::stream::{self, StreamExt};
use log::{debug, error, info};
use serde::Serialize;

use crate::error::WorkerError;
use crate::pipeline::progress::ProgressReporter;
use crate::pipeline::Pipeline;
use crate::store::StoreConfig;
use crate::worker::job::{FileJob, JobStatus};

/// Totals over one pool run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolSummary {
    pub completed: usize,
    pub failed: usize,
    pub chunks_stored: usize,
}

impl PoolSummary {
    fn record(&mut self, job: &FileJob) {
        match job.status {
            JobStatus::Completed => self.completed += 1,
            _ => self.failed += 1,
        }
        self.chunks_stored += job.chunks_stored();
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Terminal snapshots, in submission order, plus their totals.
#[derive(Debug)]
pub struct PoolOutcome {
    pub jobs: Vec<FileJob>,
    pub summary: PoolSummary,
}

/// Forwards snapshots and remembers the last one, so a job whose task died
/// can still be failed from the state observers last saw.
struct LastSnapshot {
    inner: Arc<dyn ProgressReporter>,
    last: Mutex<Option<FileJob>>,
}

impl LastSnapshot {
    fn new(inner: Arc<dyn ProgressReporter>) -> Self {
        Self {
            inner,
            last: Mutex::new(None),
        }
    }

    /// The terminal snapshot for a job that did not finish. A non-terminal
    /// last snapshot is failed with `message` and published.
    fn fail(&self, queued: FileJob, message: &str) -> FileJob {
        let last = self
            .last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match last {
            Some(job) if job.status.is_terminal() => job,
            last => {
                let failed = last.unwrap_or(queued).into_failed(message);
                self.inner.report(&failed);
                failed
            }
        }
    }
}

impl ProgressReporter for LastSnapshot {
    fn report(&self, job: &FileJob) {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(job.clone());
        self.inner.report(job);
    }
}

/// Runs many jobs through one [`Pipeline`], at most `worker_count` at a time.
///
/// Each job is its own task and is processed exactly once; jobs share nothing
/// but the pipeline's collaborators.
pub struct WorkerPool {
    pipeline: Arc<Pipeline>,
    worker_count: usize,
}

impl WorkerPool {
    /// A `worker_count` of 0 is treated as 1.
    pub fn new(pipeline: Arc<Pipeline>, worker_count: usize) -> Self {
        Self {
            pipeline,
            worker_count: worker_count.max(1),
        }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub async fn run(
        &self,
        jobs: Vec<FileJob>,
        progress: Arc<dyn ProgressReporter>,
        store_config: StoreConfig,
    ) -> PoolOutcome {
        info!(
            "Processing {} jobs with {} workers",
            jobs.len(),
            self.worker_count
        );

        let mut finished: Vec<(usize, FileJob)> = stream::iter(jobs.into_iter().enumerate())
            .map(|(position, job)| {
                let pipeline = Arc::clone(&self.pipeline);
                let tracked = Arc::new(LastSnapshot::new(Arc::clone(&progress)));
                let store_config = store_config.clone();
                let queued = job.clone();

                async move {
                    debug!("Starting job {} ({})", job.id, job.source_file.name);
                    let reporter = Arc::clone(&tracked);
                    let handle = tokio::spawn(async move {
                        pipeline
                            .process(job, reporter.as_ref(), &store_config)
                            .await
                    });

                    let done = match handle.await {
                        Ok(done) => done,
                        Err(e) => {
                            let err = WorkerError::JobPanicked(e.to_string());
                            error!("Job {} did not finish: {}", queued.id, err);
                            tracked.fail(queued, &err.to_string())
                        }
                    };
                    (position, done)
                }
            })
            .buffer_unordered(self.worker_count)
            .collect()
            .await;

        finished.sort_by_key(|(position, _)| *position);

        let mut summary = PoolSummary::default();
        let jobs: Vec<FileJob> = finished
            .into_iter()
            .map(|(_, job)| {
                summary.record(&job);
                job
            })
            .collect();

        info!(
            "Pool finished: {} completed, {} failed, {} chunks stored",
            summary.completed, summary.failed, summary.chunks_stored
        );

        PoolOutcome { jobs, summary }
    }
}
