mod context;
mod error;
mod progress;
mod runner;

pub use context::JobContext;
pub use error::PipelineError;
pub use progress::{LogProgress, NoopProgress, ProgressEvent, ProgressReporter, Stage};
pub use runner::{Pipeline, RelocationOutcome};
