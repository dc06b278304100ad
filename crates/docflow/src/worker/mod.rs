pub mod job;
pub mod pool;
pub mod scanner;

pub use job::{Chunk, ChunkMetadata, FileJob, JobStatus, SourceFile, Stage, StageName, StageStatus};
pub use pool::{PoolOutcome, PoolSummary, WorkerPool};
pub use scanner::{collect_jobs, DirectoryScanner};
