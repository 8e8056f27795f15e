//! Job model and the job table shared by the queue and its workers.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cache::CacheKey;
use crate::error::QueueError;
use crate::models::record::ExtractionResult;

/// Lifecycle state of a preview job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Waiting,
    Active,
    Completed,
    Failed,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Allowed moves: waiting -> active -> completed|failed, and
    /// waiting -> failed when the queue stops before the job ran.
    pub fn can_transition_to(&self, next: JobState) -> bool {
        matches!(
            (self, next),
            (Self::Waiting, Self::Active)
                | (Self::Waiting, Self::Failed)
                | (Self::Active, Self::Completed)
                | (Self::Active, Self::Failed)
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a job failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum JobFailure {
    /// The processor did not finish within the queue timeout (ms).
    #[error("preview timed out after {0} ms")]
    Timeout(u64),

    /// The processor returned an error.
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// The processor panicked.
    #[error("preview worker crashed: {0}")]
    Crashed(String),

    /// The queue shut down before a worker picked the job up.
    #[error("queue shut down before the job ran")]
    Aborted,
}

impl JobFailure {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "timeout",
            Self::Extraction(_) => "extraction",
            Self::Crashed(_) => "crashed",
            Self::Aborted => "aborted",
        }
    }
}

/// Payload of a preview job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewRequest {
    /// Raw OCR text.
    pub text: String,
    /// Caller-chosen request fields (file name, OCR engine, ...).
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl PreviewRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Cache key of this request: its params plus a digest of the text.
    pub fn cache_key(&self, prefix: &str) -> CacheKey {
        let mut hasher = DefaultHasher::new();
        self.text.hash(&mut hasher);
        let digest = format!("{:016x}", hasher.finish());

        let fields = self
            .params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .chain(std::iter::once(("text_hash", digest.as_str())));
        CacheKey::from_fields(prefix, fields)
    }
}

/// Handle returned by `enqueue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobHandle {
    pub job_id: Uuid,
}

/// Snapshot of a job as seen by its submitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub id: Uuid,
    pub state: JobState,
    /// 0 while waiting, 10 once a worker has it, 100 when completed.
    pub progress: u8,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ExtractionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
}

/// A queued unit of preview work.
#[derive(Debug)]
pub(crate) struct Job {
    pub id: Uuid,
    pub submitter_id: String,
    pub request: Arc<PreviewRequest>,
    pub state: JobState,
    pub progress: u8,
    pub result: Option<ExtractionResult>,
    pub failure: Option<JobFailure>,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<Instant>,
}

impl Job {
    pub fn new(request: PreviewRequest, submitter_id: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            submitter_id: submitter_id.to_string(),
            request: Arc::new(request),
            state: JobState::Waiting,
            progress: 0,
            result: None,
            failure: None,
            created_at: Utc::now(),
            finished_at: None,
        }
    }

    fn transition(&mut self, to: JobState) -> Result<(), QueueError> {
        if !self.state.can_transition_to(to) {
            return Err(QueueError::InvalidTransition {
                id: self.id,
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }

    fn complete(&mut self, result: ExtractionResult) -> Result<(), QueueError> {
        self.transition(JobState::Completed)?;
        self.progress = 100;
        self.result = Some(result);
        self.finished_at = Some(Instant::now());
        Ok(())
    }

    fn fail(&mut self, failure: JobFailure) -> Result<(), QueueError> {
        self.transition(JobState::Failed)?;
        self.failure = Some(failure);
        self.finished_at = Some(Instant::now());
        Ok(())
    }

    fn status(&self) -> JobStatus {
        JobStatus {
            id: self.id,
            state: self.state,
            progress: self.progress,
            created_at: self.created_at,
            result: self.result.clone(),
            error: self.failure.as_ref().map(ToString::to_string),
            error_kind: self.failure.as_ref().map(|f| f.kind().to_string()),
        }
    }
}

/// All jobs known to one queue.
#[derive(Debug, Default)]
pub(crate) struct JobTable {
    jobs: RwLock<HashMap<Uuid, Job>>,
}

impl JobTable {
    fn read(&self) -> RwLockReadGuard<'_, HashMap<Uuid, Job>> {
        self.jobs.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Uuid, Job>> {
        self.jobs.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, job: Job) {
        self.write().insert(job.id, job);
    }

    pub fn remove(&self, id: Uuid) {
        self.write().remove(&id);
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Status of `id` if it was submitted by `submitter_id`.
    pub fn status_for(&self, id: Uuid, submitter_id: &str) -> Option<JobStatus> {
        self.read()
            .get(&id)
            .filter(|job| job.submitter_id == submitter_id)
            .map(Job::status)
    }

    /// Move a waiting job to active and hand out its request.
    pub fn activate(&self, id: Uuid) -> Option<Arc<PreviewRequest>> {
        let mut jobs = self.write();
        let job = jobs.get_mut(&id)?;
        match job.transition(JobState::Active) {
            Ok(()) => {
                job.progress = 10;
                Some(Arc::clone(&job.request))
            }
            Err(e) => {
                debug!("Skipping job: {}", e);
                None
            }
        }
    }

    /// Record the single outcome of an active job.
    pub fn finish(&self, id: Uuid, outcome: Result<ExtractionResult, JobFailure>) {
        let mut jobs = self.write();
        let Some(job) = jobs.get_mut(&id) else {
            debug!(job_id = %id, "Finished job was already purged");
            return;
        };

        let recorded = match outcome {
            Ok(result) => job.complete(result),
            Err(failure) => job.fail(failure),
        };
        if let Err(e) = recorded {
            warn!("Dropping job outcome: {}", e);
        }
    }

    /// Fail every job still waiting, returning how many there were.
    pub fn abort_waiting(&self) -> usize {
        let mut jobs = self.write();
        jobs.values_mut()
            .filter(|job| job.state == JobState::Waiting)
            .map(|job| job.fail(JobFailure::Aborted))
            .filter(Result::is_ok)
            .count()
    }

    /// Purge finished jobs older than `max_age`, then keep at most
    /// `max_count` of the newest per terminal state.
    pub fn reap(&self, max_age: Duration, max_count: usize, now: Instant) -> usize {
        let mut jobs = self.write();
        let before = jobs.len();

        jobs.retain(|_, job| {
            job.finished_at
                .is_none_or(|finished| now.saturating_duration_since(finished) < max_age)
        });

        for state in [JobState::Completed, JobState::Failed] {
            let mut finished: Vec<(Instant, Uuid)> = jobs
                .values()
                .filter(|job| job.state == state)
                .filter_map(|job| job.finished_at.map(|at| (at, job.id)))
                .collect();
            if finished.len() <= max_count {
                continue;
            }
            // Newest first
            finished.sort_by(|a, b| b.0.cmp(&a.0));
            for (_, id) in finished.into_iter().skip(max_count) {
                jobs.remove(&id);
            }
        }

        before - jobs.len()
    }
}
