//! Preview worker loop.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cache::ResultCache;
use crate::extract::PreviewProcessor;
use crate::models::record::ExtractionResult;

use super::job::{JobFailure, JobTable, PreviewRequest};

/// State shared by every worker of one queue.
pub(crate) struct WorkerContext {
    pub jobs: Arc<JobTable>,
    pub receiver: Arc<Mutex<mpsc::UnboundedReceiver<Uuid>>>,
    pub processor: Arc<dyn PreviewProcessor>,
    pub cache: Option<Arc<ResultCache>>,
    pub timeout: Duration,
}

/// Pull job ids until the queue's sender is dropped.
pub(crate) async fn preview_worker(worker_id: usize, ctx: Arc<WorkerContext>) {
    info!(worker_id, "Preview worker started");

    loop {
        let job_id = {
            let mut rx = ctx.receiver.lock().await;
            rx.recv().await
        };

        let Some(job_id) = job_id else {
            info!(worker_id, "Preview worker shutting down");
            break;
        };

        let Some(request) = ctx.jobs.activate(job_id) else {
            continue;
        };
        debug!(worker_id, job_id = %job_id, "Processing preview job");

        let outcome = run_preview(&ctx, request).await;
        match &outcome {
            Ok(_) => info!(worker_id, job_id = %job_id, "Preview job completed"),
            Err(failure) => warn!(worker_id, job_id = %job_id, error = %failure, "Preview job failed"),
        }
        ctx.jobs.finish(job_id, outcome);
    }
}

/// Serve one request from the cache or the processor, bounded by the timeout.
async fn run_preview(
    ctx: &WorkerContext,
    request: Arc<PreviewRequest>,
) -> Result<ExtractionResult, JobFailure> {
    let cached = ctx
        .cache
        .as_ref()
        .map(|cache| (cache, request.cache_key(cache.prefix())));

    if let Some((cache, key)) = &cached {
        if let Some(hit) = cache.get(key) {
            debug!("Cache hit for {}", key);
            return Ok(hit);
        }
    }

    let processor = Arc::clone(&ctx.processor);
    let task = tokio::task::spawn_blocking(move || processor.process(&request));

    // On timeout the blocking task keeps running; its result is dropped with the handle.
    let result = match tokio::time::timeout(ctx.timeout, task).await {
        Err(_) => return Err(JobFailure::Timeout(ctx.timeout.as_millis() as u64)),
        Ok(Err(join_error)) => return Err(JobFailure::Crashed(panic_message(join_error))),
        Ok(Ok(Err(e))) => return Err(JobFailure::Extraction(e.to_string())),
        Ok(Ok(Ok(result))) => result,
    };

    if let Some((cache, key)) = cached {
        cache.set(key, result.clone());
    }
    Ok(result)
}

fn panic_message(error: JoinError) -> String {
    if !error.is_panic() {
        return error.to_string();
    }
    let payload: Box<dyn Any + Send> = error.into_panic();
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
