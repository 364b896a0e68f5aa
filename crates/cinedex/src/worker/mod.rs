pub mod job;
pub mod pool;
pub mod scanner;
pub mod scheduler;

pub use job::{Job, JobResult};
pub use pool::WorkerPool;
pub use scanner::LibraryScanner;
pub use scheduler::{AggregateReport, JobStatus, ReportEntry, Scheduler};
