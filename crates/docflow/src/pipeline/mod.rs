pub mod config;
pub mod error;
pub mod progress;
pub mod runner;
pub mod stages;

pub use config::PipelineConfig;
pub use error::{ErrorKind, PipelineError};
pub use progress::{BroadcastProgress, CancelFlag, FanoutProgress, NoopProgress, ProgressReporter};
pub use runner::Pipeline;
pub use stages::stages_are_ordered;
