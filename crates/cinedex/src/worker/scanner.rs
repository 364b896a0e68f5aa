use std::path::PathBuf;

use log::warn;
use walkdir::WalkDir;

use crate::error::WorkerError;
use crate::worker::job::Job;

/// Scans the library root for entries to crawl.
///
/// Every direct child of the root becomes a job, in file name order.
/// Entries that look wrong (directories, files without a video MIME type)
/// are flagged in the log but still queued, so a surprising library layout
/// shows up in the report instead of being silently skipped.
pub struct LibraryScanner {
    root: PathBuf,
}

impl LibraryScanner {
    pub fn new(root: PathBuf) -> Self {
        LibraryScanner { root }
    }

    pub fn scan(&self) -> Result<Vec<Job>, WorkerError> {
        let mut jobs = Vec::new();

        for (index, entry) in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .enumerate()
        {
            let entry = entry.map_err(|source| WorkerError::ScanFailed {
                path: self.root.clone(),
                source,
            })?;

            let job = Job::new(index, entry.path().to_path_buf());

            if entry.file_type().is_dir() {
                warn!(
                    "'{}' is a directory, queuing it anyway",
                    job.source_filename
                );
            } else {
                match job.mime_type.as_deref() {
                    Some(mime) if mime.starts_with("video/") => {}
                    Some(mime) => {
                        warn!("'{}' looks like {mime}, not video", job.source_filename)
                    }
                    None => warn!(
                        "'{}' has no recognizable media type",
                        job.source_filename
                    ),
                }
            }

            jobs.push(job);
        }

        Ok(jobs)
    }
}
