//! Asynchronous preview queue.
//!
//! `PreviewQueue` owns a job table, a bounded pool of workers and a retention
//! reaper. Submission never waits for extraction; workers run the processor
//! on the blocking pool under a wall-clock timeout, and every job reaches
//! exactly one terminal state.

mod job;
mod worker;

pub use job::{JobFailure, JobHandle, JobState, JobStatus, PreviewRequest};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cache::ResultCache;
use crate::error::QueueError;
use crate::extract::PreviewProcessor;
use crate::models::config::QueueConfig;

use job::{Job, JobTable};
use worker::{preview_worker, WorkerContext};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Preview job queue with a fixed worker pool.
pub struct PreviewQueue {
    jobs: Arc<JobTable>,
    sender: Mutex<Option<mpsc::UnboundedSender<Uuid>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    reaper: Mutex<Option<JoinHandle<()>>>,
}

impl PreviewQueue {
    /// Start workers and the reaper on the current tokio runtime.
    pub fn start(
        config: &QueueConfig,
        processor: Arc<dyn PreviewProcessor>,
        cache: Option<Arc<ResultCache>>,
    ) -> Result<Self, QueueError> {
        config.validate().map_err(QueueError::Init)?;
        let runtime = Handle::try_current().map_err(|e| QueueError::Init(e.to_string()))?;

        info!(
            concurrency = config.concurrency,
            timeout_ms = config.timeout_ms,
            "Starting preview queue"
        );

        let jobs = Arc::new(JobTable::default());
        let (sender, receiver) = mpsc::unbounded_channel::<Uuid>();

        let ctx = Arc::new(WorkerContext {
            jobs: Arc::clone(&jobs),
            receiver: Arc::new(tokio::sync::Mutex::new(receiver)),
            processor,
            cache,
            timeout: Duration::from_millis(config.timeout_ms),
        });

        let workers: Vec<JoinHandle<()>> = (0..config.concurrency)
            .map(|worker_id| runtime.spawn(preview_worker(worker_id, Arc::clone(&ctx))))
            .collect();

        let reaper = runtime.spawn(reap_finished_jobs(
            Arc::clone(&jobs),
            Duration::from_secs(config.reap_interval_secs),
            Duration::from_secs(config.retention_age_secs),
            config.retention_count,
        ));

        Ok(Self {
            jobs,
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
            reaper: Mutex::new(Some(reaper)),
        })
    }

    /// Register a job and return its handle without waiting for it to run.
    pub fn enqueue(
        &self,
        request: PreviewRequest,
        submitter_id: &str,
    ) -> Result<JobHandle, QueueError> {
        let sender = lock(&self.sender);
        let Some(sender) = sender.as_ref() else {
            return Err(QueueError::Unavailable("queue is shut down".to_string()));
        };

        let job = Job::new(request, submitter_id);
        let job_id = job.id;
        self.jobs.insert(job);

        if sender.send(job_id).is_err() {
            self.jobs.remove(job_id);
            return Err(QueueError::Unavailable("no preview workers are running".to_string()));
        }

        debug!(job_id = %job_id, submitter_id, "Preview job queued");
        Ok(JobHandle { job_id })
    }

    /// Status of a job, visible only to the identity that submitted it.
    pub fn get_job_for_user(&self, job_id: Uuid, submitter_id: &str) -> Option<JobStatus> {
        self.jobs.status_for(job_id, submitter_id)
    }

    /// Number of jobs currently tracked, finished ones included.
    pub fn tracked_jobs(&self) -> usize {
        self.jobs.len()
    }

    /// Stop accepting work, let workers drain the queue and join them.
    pub async fn shutdown(&self) {
        drop(lock(&self.sender).take());

        let workers: Vec<JoinHandle<()>> = lock(&self.workers).drain(..).collect();
        for handle in workers {
            if let Err(e) = handle.await {
                warn!("Preview worker ended abnormally: {}", e);
            }
        }

        if let Some(reaper) = lock(&self.reaper).take() {
            reaper.abort();
        }

        let aborted = self.jobs.abort_waiting();
        if aborted > 0 {
            warn!("{} preview jobs never ran", aborted);
        }
        info!("Preview queue shut down");
    }
}

impl Drop for PreviewQueue {
    fn drop(&mut self) {
        if let Some(reaper) = lock(&self.reaper).take() {
            reaper.abort();
        }
    }
}

async fn reap_finished_jobs(
    jobs: Arc<JobTable>,
    interval: Duration,
    max_age: Duration,
    max_count: usize,
) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        let removed = jobs.reap(max_age, max_count, Instant::now());
        if removed > 0 {
            debug!("Purged {} finished preview jobs", removed);
        }
    }
}
