use std::path::PathBuf;

use log::{error, info};

/// Crawl stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Navigate,
    Search,
    OpenResult,
    Extract,
    Translate,
    Persist,
    FetchCover,
    Relocate,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Navigate => "navigate",
            Stage::Search => "search",
            Stage::OpenResult => "open_result",
            Stage::Extract => "extract",
            Stage::Translate => "translate",
            Stage::Persist => "persist",
            Stage::FetchCover => "fetch_cover",
            Stage::Relocate => "relocate",
        }
    }
}

#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// A stage is starting for the named title.
    Stage { stage: Stage, title: String },

    Completed {
        title: String,
        movie_dir: PathBuf,
    },

    Failed {
        stage: Stage,
        error: String,
    },
}

/// Receives progress as a job walks the pipeline.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Discards all events. Used in tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Forwards events to the log.
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Stage { stage, title } => {
                info!("[{}] {}", stage.as_str(), title);
            }
            ProgressEvent::Completed { title, movie_dir } => {
                info!("done: '{}' -> {}", title, movie_dir.display());
            }
            ProgressEvent::Failed { stage, error } => {
                error!("failed during {}: {}", stage.as_str(), error);
            }
        }
    }
}
