use std::path::{Path, PathBuf};

use uuid::Uuid;

/// One video file queued for crawling.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: String,

    /// Position of the file in the scan order. Reports are keyed by it.
    pub index: usize,

    pub source_path: PathBuf,

    pub source_filename: String,

    /// Search title guessed from the filename.
    pub derived_title: String,

    pub mime_type: Option<String>,
}

impl Job {
    pub fn new(index: usize, source_path: PathBuf) -> Self {
        let source_filename = source_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let derived_title = derive_title(&source_filename);
        let mime_type = mime_guess::from_path(&source_path)
            .first()
            .map(|m| m.to_string());

        Job {
            id: Uuid::new_v4().to_string(),
            index,
            source_path,
            source_filename,
            derived_title,
            mime_type,
        }
    }
}

/// Guesses a search title from a file name.
///
/// Everything before the first " - " separator wins; without one the
/// extension is dropped and the rest is the title.
pub fn derive_title(filename: &str) -> String {
    if let Some(pos) = filename.find(" - ") {
        filename[..pos].to_string()
    } else {
        Path::new(filename)
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| filename.to_string())
    }
}

/// Outcome of one crawled job, reported back to the scheduler.
#[derive(Debug, Clone)]
pub struct JobResult {
    pub job_id: String,
    pub index: usize,
    pub source_filename: String,

    /// Site spelling of the movie name when the crawl got that far,
    /// the filename-derived guess otherwise.
    pub title: String,

    pub success: bool,
    pub error: Option<String>,
}

impl JobResult {
    pub fn success(job: &Job, title: impl Into<String>) -> Self {
        JobResult {
            job_id: job.id.clone(),
            index: job.index,
            source_filename: job.source_filename.clone(),
            title: title.into(),
            success: true,
            error: None,
        }
    }

    pub fn failure(job: &Job, title: impl Into<String>, error: impl Into<String>) -> Self {
        JobResult {
            job_id: job.id.clone(),
            index: job.index,
            source_filename: job.source_filename.clone(),
            title: title.into(),
            success: false,
            error: Some(error.into()),
        }
    }
}
