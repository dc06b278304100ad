//! Broadcasting modules for real-time job progress.
//!
//! Both types here observe published job snapshots and can be handed to the
//! pipeline by any integration.

pub mod job_progress;
pub mod job_store;

pub use job_progress::{JobProgressBroadcaster, JobProgressEvent};
pub use job_store::{JobCounts, JobListResponse, JobQueryParams, JobStore, StoredJob};
