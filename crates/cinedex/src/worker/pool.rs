use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{debug, error, info};

use crate::pipeline::{JobContext, LogProgress, Pipeline};
use crate::session::{Browser, SessionFactory};
use crate::worker::job::{Job, JobResult};

pub struct WorkerPool {
    job_sender: Sender<Job>,
    result_receiver: Receiver<JobResult>,
    workers: Vec<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl WorkerPool {
    /// Starts `worker_count` crawl workers, each owning at most one
    /// browser session at a time.
    ///
    /// # Panics
    /// Panics if `worker_count` is 0.
    pub fn new(
        pipeline: Arc<Pipeline>,
        factory: Arc<dyn SessionFactory>,
        worker_count: usize,
        isolate_sessions: bool,
    ) -> Self {
        assert!(worker_count > 0, "worker_count must be > 0");
        let (job_sender, job_receiver) = bounded::<Job>(worker_count * 2);
        let (result_sender, result_receiver) = bounded::<JobResult>(worker_count * 2);
        let shutdown = Arc::new(AtomicBool::new(false));

        let mut workers = Vec::with_capacity(worker_count);

        for worker_id in 0..worker_count {
            let job_rx = job_receiver.clone();
            let result_tx = result_sender.clone();
            let shutdown_flag = Arc::clone(&shutdown);
            let worker_pipeline = Arc::clone(&pipeline);
            let worker_factory = Arc::clone(&factory);

            let handle = thread::spawn(move || {
                run_worker(
                    worker_id,
                    job_rx,
                    result_tx,
                    shutdown_flag,
                    worker_pipeline,
                    worker_factory,
                    isolate_sessions,
                );
            });

            workers.push(handle);
        }

        info!("Started {} workers", worker_count);

        Self {
            job_sender,
            result_receiver,
            workers,
            shutdown,
        }
    }

    pub fn submit(&self, job: Job) -> Result<(), crate::error::WorkerError> {
        if self.shutdown.load(Ordering::Relaxed) {
            return Err(crate::error::WorkerError::ChannelClosed);
        }

        self.job_sender
            .send(job)
            .map_err(|_| crate::error::WorkerError::ChannelClosed)
    }

    pub fn try_recv_result(&self) -> Option<JobResult> {
        self.result_receiver.try_recv().ok()
    }

    pub fn recv_result(&self) -> Option<JobResult> {
        self.result_receiver.recv().ok()
    }

    pub fn shutdown(&self) {
        info!("Shutting down worker pool...");
        self.shutdown.store(true, Ordering::Relaxed);
    }

    pub fn wait(self) {
        // Drop sender to signal workers to exit
        drop(self.job_sender);

        for (i, worker) in self.workers.into_iter().enumerate() {
            if let Err(e) = worker.join() {
                error!("Worker {} panicked: {:?}", i, e);
            } else {
                debug!("Worker {} finished", i);
            }
        }

        info!("All workers have stopped");
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}

fn run_worker(
    worker_id: usize,
    job_receiver: Receiver<Job>,
    result_sender: Sender<JobResult>,
    shutdown: Arc<AtomicBool>,
    pipeline: Arc<Pipeline>,
    factory: Arc<dyn SessionFactory>,
    isolate_sessions: bool,
) {
    debug!("Worker {} started", worker_id);

    // One session serves the whole slot lifetime unless a job poisons it
    // or isolation is configured.
    let mut session: Option<Box<dyn Browser>> = None;

    loop {
        if shutdown.load(Ordering::Relaxed) {
            debug!("Worker {} received shutdown signal", worker_id);
            break;
        }

        match job_receiver.recv_timeout(std::time::Duration::from_millis(100)) {
            Ok(job) => {
                debug!(
                    "Worker {} processing job: {:?}",
                    worker_id, job.source_path
                );

                if session.is_none() {
                    match factory.create() {
                        Ok(created) => session = Some(created),
                        Err(e) => {
                            error!("Worker {} could not create a session: {}", worker_id, e);
                            let result = JobResult::failure(
                                &job,
                                job.derived_title.clone(),
                                format!("browser session could not be created: {e}"),
                            );
                            if result_sender.send(result).is_err() {
                                break;
                            }
                            continue;
                        }
                    }
                }

                let browser = session.as_mut().expect("session created above");
                let ctx = JobContext::new(job);
                let (result, ctx) = pipeline.run(ctx, browser.as_mut(), &LogProgress);

                if ctx.session_poisoned {
                    debug!("Worker {} discarding poisoned session", worker_id);
                    session = None;
                } else if isolate_sessions {
                    session = None;
                }

                if let Err(e) = result_sender.send(result) {
                    error!("Worker {} failed to send result: {}", worker_id, e);
                    break;
                }
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                continue;
            }
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                debug!("Worker {} job channel disconnected", worker_id);
                break;
            }
        }
    }

    debug!("Worker {} stopped", worker_id);
}
