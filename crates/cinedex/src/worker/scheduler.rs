use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use crossbeam_channel::Receiver;
use log::{info, warn};

use crate::pipeline::{Pipeline, RelocationOutcome};
use crate::session::SessionFactory;
use crate::worker::job::{Job, JobResult};
use crate::worker::pool::WorkerPool;

const RELOCATION_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    Completed,
    Failed(String),
    /// Never submitted, or still unfinished at shutdown.
    Skipped,
}

#[derive(Debug)]
pub struct ReportEntry {
    pub index: usize,
    pub source_filename: String,
    pub title: String,
    pub status: JobStatus,
}

/// What happened to every scanned file, in scan order.
#[derive(Debug)]
pub struct AggregateReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub entries: Vec<ReportEntry>,
    pub relocation_failures: usize,
}

impl AggregateReport {
    pub fn completed(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == JobStatus::Completed)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.status, JobStatus::Failed(_)))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == JobStatus::Skipped)
            .count()
    }
}

/// Feeds scanned jobs through a worker pool and gathers the results.
pub struct Scheduler {
    pipeline: Arc<Pipeline>,
    relocations: Receiver<RelocationOutcome>,
    factory: Arc<dyn SessionFactory>,
    max_threads: usize,
    isolate_sessions: bool,
    shutdown: Arc<AtomicBool>,
}

impl Scheduler {
    pub fn new(
        pipeline: Arc<Pipeline>,
        relocations: Receiver<RelocationOutcome>,
        factory: Arc<dyn SessionFactory>,
        max_threads: usize,
        isolate_sessions: bool,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Scheduler {
            pipeline,
            relocations,
            factory,
            max_threads,
            isolate_sessions,
            shutdown,
        }
    }

    /// Runs every job to completion and reports per-file outcomes.
    ///
    /// Results are drained while submitting so a slow pool never blocks
    /// progress accounting, then the pool is wound down and outstanding
    /// background relocations are waited for.
    pub fn run(&self, jobs: Vec<Job>) -> AggregateReport {
        let started_at = Utc::now();

        let mut entries: Vec<ReportEntry> = jobs
            .iter()
            .map(|job| ReportEntry {
                index: job.index,
                source_filename: job.source_filename.clone(),
                title: job.derived_title.clone(),
                status: JobStatus::Skipped,
            })
            .collect();

        if jobs.is_empty() {
            info!("Nothing to crawl");
            return AggregateReport {
                started_at,
                finished_at: Utc::now(),
                entries,
                relocation_failures: 0,
            };
        }

        let worker_count = resolve_worker_count(self.max_threads, jobs.len());
        info!(
            "Crawling {} files with {} workers",
            jobs.len(),
            worker_count
        );

        let pool = WorkerPool::new(
            Arc::clone(&self.pipeline),
            Arc::clone(&self.factory),
            worker_count,
            self.isolate_sessions,
        );

        let mut submitted = 0usize;
        let mut received = 0usize;

        for job in jobs {
            while let Some(result) = pool.try_recv_result() {
                apply_result(&mut entries, result);
                received += 1;
            }

            if self.shutdown.load(Ordering::Relaxed) {
                info!("Shutdown requested, not submitting remaining jobs");
                pool.shutdown();
                break;
            }

            if pool.submit(job).is_err() {
                warn!("Worker pool rejected a job, stopping submission");
                break;
            }
            submitted += 1;
        }

        while received < submitted {
            match pool.recv_result() {
                Some(result) => {
                    apply_result(&mut entries, result);
                    received += 1;
                }
                None => {
                    warn!(
                        "Workers exited with {} of {} results outstanding",
                        submitted - received,
                        submitted
                    );
                    break;
                }
            }
        }

        pool.shutdown();
        pool.wait();

        let relocation_failures = self.drain_relocations(&entries);

        AggregateReport {
            started_at,
            finished_at: Utc::now(),
            entries,
            relocation_failures,
        }
    }

    /// Waits for one relocation outcome per completed job. The pipeline
    /// keeps a sender alive, so this counts expected outcomes instead of
    /// waiting for a disconnect.
    fn drain_relocations(&self, entries: &[ReportEntry]) -> usize {
        let expected = entries
            .iter()
            .filter(|e| e.status == JobStatus::Completed)
            .count();

        let mut failures = 0usize;
        for _ in 0..expected {
            match self.relocations.recv_timeout(RELOCATION_DRAIN_TIMEOUT) {
                Ok(outcome) => {
                    if outcome.failed() {
                        warn!(
                            "'{}' was not moved into its folder: {}",
                            outcome.source.display(),
                            outcome.error.as_deref().unwrap_or("unknown error")
                        );
                        failures += 1;
                    }
                }
                Err(_) => {
                    warn!("Timed out waiting for background file moves");
                    break;
                }
            }
        }
        failures
    }
}

fn apply_result(entries: &mut [ReportEntry], result: JobResult) {
    if let Some(entry) = entries.get_mut(result.index) {
        entry.title = result.title;
        entry.status = if result.success {
            JobStatus::Completed
        } else {
            JobStatus::Failed(
                result
                    .error
                    .unwrap_or_else(|| "unknown failure".to_string()),
            )
        };
    }
}

/// Zero means "one worker per job", anything else is taken literally.
fn resolve_worker_count(max_threads: usize, job_count: usize) -> usize {
    if max_threads == 0 {
        job_count.max(1)
    } else {
        max_threads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn zero_threads_means_one_worker_per_job() {
        assert_eq!(resolve_worker_count(0, 5), 5);
        assert_eq!(resolve_worker_count(0, 1), 1);
    }

    #[test]
    fn zero_threads_with_no_jobs_still_yields_one_worker() {
        assert_eq!(resolve_worker_count(0, 0), 1);
    }

    #[test]
    fn explicit_thread_count_is_taken_literally() {
        assert_eq!(resolve_worker_count(4, 100), 4);
        assert_eq!(resolve_worker_count(8, 2), 8);
    }

    #[test]
    fn apply_result_overwrites_matching_entry_only() {
        let mut entries = vec![
            ReportEntry {
                index: 0,
                source_filename: "a.mkv".to_string(),
                title: "a".to_string(),
                status: JobStatus::Skipped,
            },
            ReportEntry {
                index: 1,
                source_filename: "b.mkv".to_string(),
                title: "b".to_string(),
                status: JobStatus::Skipped,
            },
        ];

        let job = Job::new(1, PathBuf::from("/library/b.mkv"));
        apply_result(&mut entries, JobResult::success(&job, "B Movie"));

        assert_eq!(entries[0].status, JobStatus::Skipped);
        assert_eq!(entries[1].status, JobStatus::Completed);
        assert_eq!(entries[1].title, "B Movie");
    }

    #[test]
    fn report_counts_by_status() {
        let report = AggregateReport {
            started_at: Utc::now(),
            finished_at: Utc::now(),
            entries: vec![
                ReportEntry {
                    index: 0,
                    source_filename: "a.mkv".to_string(),
                    title: "a".to_string(),
                    status: JobStatus::Completed,
                },
                ReportEntry {
                    index: 1,
                    source_filename: "b.mkv".to_string(),
                    title: "b".to_string(),
                    status: JobStatus::Failed("boom".to_string()),
                },
                ReportEntry {
                    index: 2,
                    source_filename: "c.mkv".to_string(),
                    title: "c".to_string(),
                    status: JobStatus::Skipped,
                },
            ],
            relocation_failures: 0,
        };

        assert_eq!(report.completed(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.skipped(), 1);
    }
}
