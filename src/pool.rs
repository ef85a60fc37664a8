//! Fixed-size worker pool driving the per-file pipeline.

use crate::constants::WORKER_THREAD_PREFIX;
use crate::error::{PipelineError, Result};
use crate::pipeline::{is_supported_image, Job, Pipeline};
use crate::queue::JobQueue;
use crate::stats::{RunStats, RunSummary};
use indicatif::ProgressBar;
use std::io;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

struct Worker {
    queue: Arc<JobQueue<Job>>,
    pipeline: Arc<Pipeline>,
    stats: Arc<RunStats>,
    progress: ProgressBar,
}

impl Worker {
    fn run(self) {
        loop {
            match self.queue.take_next() {
                Job::Stop => {
                    self.queue.acknowledge();
                    break;
                }
                Job::File(file_name) => {
                    self.handle(&file_name);
                    self.queue.acknowledge();
                }
            }
        }
        crate::verbose!("Worker stopped");
    }

    fn handle(&self, file_name: &str) {
        match panic::catch_unwind(AssertUnwindSafe(|| self.pipeline.process(file_name))) {
            Ok(result) => {
                match &result {
                    Ok(processed) => self.progress.suspend(|| {
                        crate::info!("✅ Uploaded {} to {}", file_name, processed.key);
                    }),
                    Err(err) => self.progress.suspend(|| {
                        crate::error!("{} | Skipping...", err);
                    }),
                }
                self.stats.record(&result);
            }
            Err(_) => {
                self.stats.record_panic();
                self.progress.suspend(|| {
                    crate::error!("Worker crashed while processing {} | Skipping...", file_name);
                });
            }
        }
        self.progress.inc(1);
    }
}

/// Pool of worker threads sharing one job queue.
///
/// The worker count is fixed at `start`. `shutdown` consumes the pool, so no
/// file can be added once draining has begun.
pub struct SqueezePool {
    queue: Arc<JobQueue<Job>>,
    workers: Vec<JoinHandle<()>>,
    stats: Arc<RunStats>,
    progress: ProgressBar,
    started: Instant,
}

impl SqueezePool {
    /// Spawns `worker_count` workers and returns without waiting for any work.
    pub fn start(
        worker_count: NonZeroUsize,
        pipeline: Arc<Pipeline>,
        progress: ProgressBar,
    ) -> io::Result<Self> {
        let queue = Arc::new(JobQueue::new());
        let stats = Arc::new(RunStats::default());
        let mut workers = Vec::with_capacity(worker_count.get());

        for id in 0..worker_count.get() {
            let worker = Worker {
                queue: Arc::clone(&queue),
                pipeline: Arc::clone(&pipeline),
                stats: Arc::clone(&stats),
                progress: progress.clone(),
            };
            let spawned = thread::Builder::new()
                .name(format!("{}-{}", WORKER_THREAD_PREFIX, id))
                .spawn(move || worker.run());

            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    stop_and_join(&queue, workers);
                    return Err(e);
                }
            }
        }

        crate::verbose!("Started {} workers", workers.len());

        Ok(Self {
            queue,
            workers,
            stats,
            progress,
            started: Instant::now(),
        })
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Queues `file_name` if it has a supported image extension.
    ///
    /// Rejected names are logged and never reach the queue.
    pub fn add_file(&self, file_name: &str) -> Result<()> {
        if !is_supported_image(file_name) {
            let err = PipelineError::Validation {
                file: file_name.to_string(),
            };
            self.stats.record_rejected();
            self.progress.suspend(|| crate::warn!("{} 🚨", err));
            return Err(err);
        }

        self.stats.record_accepted();
        self.progress.inc_length(1);
        self.queue.submit(Job::File(file_name.to_string()));
        Ok(())
    }

    /// Waits for every queued file to be handled, stops all workers and
    /// returns the run summary.
    pub fn shutdown(mut self) -> RunSummary {
        self.queue.await_drain();
        stop_and_join(&self.queue, std::mem::take(&mut self.workers));
        self.progress.finish_and_clear();
        self.stats.snapshot(self.started.elapsed())
    }
}

impl Drop for SqueezePool {
    fn drop(&mut self) {
        if !self.workers.is_empty() {
            stop_and_join(&self.queue, std::mem::take(&mut self.workers));
        }
    }
}

/// Sends one stop signal per worker, then joins them all.
fn stop_and_join(queue: &JobQueue<Job>, workers: Vec<JoinHandle<()>>) {
    for _ in 0..workers.len() {
        queue.submit(Job::Stop);
    }
    for handle in workers {
        let name = handle.thread().name().unwrap_or("worker").to_string();
        if handle.join().is_err() {
            crate::error!("{} exited abnormally", name);
        }
    }
}
