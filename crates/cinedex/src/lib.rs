pub mod config;
pub mod error;
pub mod pipeline;
pub mod record;
pub mod session;
pub mod site;
pub mod storage;
pub mod translate;
pub mod worker;

pub use config::{load_config, Config};
pub use error::{CinedexError, ConfigError, Result, SessionError, SiteError, StorageError};
pub use pipeline::{JobContext, Pipeline, RelocationOutcome};
pub use record::{MovieRecord, RecordStore};
pub use session::{Browser, ChromeSessionFactory, SessionFactory, SessionOptions};
pub use site::{ImdbExtractor, SiteExtractor};
pub use storage::Library;
pub use translate::{HttpTranslator, Translator};
pub use worker::{AggregateReport, Job, JobStatus, LibraryScanner, Scheduler, WorkerPool};
