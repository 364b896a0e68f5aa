use std::path::PathBuf;

use crate::record::RecordStore;
use crate::worker::job::Job;

/// State accumulated while a single job walks through the crawl stages.
///
/// Option fields are populated by the stage named in their comment and
/// may be read by every later stage.
#[derive(Debug)]
pub struct JobContext {
    pub job: Job,

    /// Movie name as the site spells it. Set by the extract stage.
    pub resolved_name: Option<String>,

    /// Per-movie folder. Set by the extract stage.
    pub movie_dir: Option<PathBuf>,

    /// Open record handle. Set by the extract stage.
    pub record: Option<RecordStore>,

    /// Raw metadata read off the movie page. Set by the extract stage.
    pub genres: Vec<String>,
    pub rating: Option<f64>,
    pub year: Option<u32>,

    /// Set by the translate stage.
    pub name_translated: Option<String>,
    pub genres_translated: Vec<String>,

    /// Where the cover image lands. Set by the persist stage.
    pub cover_dest: Option<PathBuf>,

    /// True when a failure indicates the browser session itself is broken
    /// and the worker slot should not reuse it.
    pub session_poisoned: bool,
}

impl JobContext {
    pub fn new(job: Job) -> Self {
        JobContext {
            job,
            resolved_name: None,
            movie_dir: None,
            record: None,
            genres: Vec::new(),
            rating: None,
            year: None,
            name_translated: None,
            genres_translated: Vec::new(),
            cover_dest: None,
            session_poisoned: false,
        }
    }

    /// Best title known so far: the site's spelling once resolved, the
    /// filename-derived guess before that.
    pub fn title(&self) -> &str {
        self.resolved_name
            .as_deref()
            .unwrap_or(&self.job.derived_title)
    }
}
