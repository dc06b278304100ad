use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::broadcast::job_progress::{JobProgressBroadcaster, JobProgressEvent};
use crate::worker::job::FileJob;

/// Observer for job snapshots. The pipeline calls `report` with every new
/// snapshot, in order, from the task processing the job.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, job: &FileJob);
}

/// No-op reporter for unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _job: &FileJob) {}
}

impl<F> ProgressReporter for F
where
    F: Fn(&FileJob) + Send + Sync,
{
    fn report(&self, job: &FileJob) {
        self(job)
    }
}

/// Bridges snapshots onto a broadcast channel as [`JobProgressEvent`]s.
#[derive(Clone)]
pub struct BroadcastProgress {
    broadcaster: JobProgressBroadcaster,
}

impl BroadcastProgress {
    pub fn new(broadcaster: JobProgressBroadcaster) -> Self {
        Self { broadcaster }
    }
}

impl ProgressReporter for BroadcastProgress {
    fn report(&self, job: &FileJob) {
        self.broadcaster.send(JobProgressEvent::from_job(job));
    }
}

/// Forwards each snapshot to every inner reporter, in order.
pub struct FanoutProgress {
    reporters: Vec<Arc<dyn ProgressReporter>>,
}

impl FanoutProgress {
    pub fn new(reporters: Vec<Arc<dyn ProgressReporter>>) -> Self {
        Self { reporters }
    }
}

impl ProgressReporter for FanoutProgress {
    fn report(&self, job: &FileJob) {
        for reporter in &self.reporters {
            reporter.report(job);
        }
    }
}

/// Shared cancellation flag. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
