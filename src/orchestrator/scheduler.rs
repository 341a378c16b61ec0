//! Single-worker job scheduler
//!
//! Owns the job index (id -> record) and the FIFO queue. Submission
//! registers and enqueues; one dedicated worker task drains the queue
//! and drives each job to completion before taking the next, so at
//! most one job executes at a time and the portal/OCR engine never see
//! concurrent load. The second of two submissions sits at progress 0
//! until the first finishes; that head-of-line blocking is the point,
//! not an oversight.

use crate::error::{AppError, AppResult};
use crate::models::JobParams;
use crate::services::ArtifactWriter;
use crate::workflow::{Job, JobRunner, JobStatus};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Opaque public handle naming a job.
pub type JobId = String;

/// Index entry: a job plus the registration timestamp the janitor
/// measures staleness against. The timestamp is set once and never
/// updated.
struct JobRecord {
    job: Arc<Job>,
    created_at: Instant,
}

/// What a poller learns about a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressReport {
    Known {
        progress: u32,
        max: u32,
        status: JobStatus,
    },
    /// Never submitted, already evicted, or already retrieved-and-cleared
    Unknown,
}

/// What a retrieval call yields.
#[derive(Debug)]
pub enum RetrieveOutcome {
    /// Artifact written; the index entry has been cleared
    Packaged(PathBuf),
    /// Terminal with zero rows; a valid outcome, not an error
    Empty,
    /// Job exists but is not yet terminal
    NotReady,
    /// Job reached `Failed` with the recorded reason
    Failed(String),
    /// No such job
    Unknown,
    /// Rows exist but the artifact could not be assembled
    PackagingError(AppError),
}

/// The scheduler: job index, FIFO queue, artifact packaging.
pub struct Scheduler {
    jobs: Mutex<HashMap<JobId, JobRecord>>,
    queue_tx: UnboundedSender<JobId>,
    writer: ArtifactWriter,
}

impl Scheduler {
    /// Build a scheduler and the receiving half of its queue. Hand the
    /// receiver to [`spawn_worker`](Self::spawn_worker).
    pub fn new(writer: ArtifactWriter) -> (Arc<Self>, UnboundedReceiver<JobId>) {
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        let scheduler = Arc::new(Self {
            jobs: Mutex::new(HashMap::new()),
            queue_tx,
            writer,
        });
        (scheduler, queue_rx)
    }

    /// Validate, register, and enqueue one submission.
    ///
    /// Validation happens synchronously before anything is enqueued so
    /// the caller gets immediate feedback and no job is created for a
    /// malformed request.
    pub fn submit(&self, params: JobParams) -> AppResult<JobId> {
        params.validate()?;

        let id = new_job_id();
        let job = Arc::new(Job::new(id.clone(), params));

        {
            let mut jobs = self.jobs.lock().unwrap();
            jobs.insert(
                id.clone(),
                JobRecord {
                    job,
                    created_at: Instant::now(),
                },
            );
        }

        self.queue_tx
            .send(id.clone())
            .map_err(|_| AppError::Other("worker queue is closed".to_string()))?;

        info!("[job {}] submitted and enqueued", id);
        Ok(id)
    }

    /// O(1) progress lookup. Unknown ids are a normal outcome for
    /// pollers querying after eviction, not an error.
    pub fn progress(&self, id: &str) -> ProgressReport {
        let jobs = self.jobs.lock().unwrap();
        match jobs.get(id) {
            Some(record) => ProgressReport::Known {
                progress: record.job.progress(),
                max: record.job.max(),
                status: record.job.status(),
            },
            None => ProgressReport::Unknown,
        }
    }

    /// Package a terminal job's rows into a CSV artifact.
    ///
    /// A successful packaging clears the index entry (retrieval
    /// cleanup); every other outcome leaves it for the janitor.
    pub fn retrieve(&self, id: &str) -> RetrieveOutcome {
        let job = {
            let jobs = self.jobs.lock().unwrap();
            match jobs.get(id) {
                Some(record) => record.job.clone(),
                None => return RetrieveOutcome::Unknown,
            }
        };

        match job.status() {
            JobStatus::Pending | JobStatus::Running => RetrieveOutcome::NotReady,
            JobStatus::Failed(reason) => RetrieveOutcome::Failed(reason),
            JobStatus::Completed => {
                let rows = job.rows_snapshot();
                if rows.is_empty() {
                    return RetrieveOutcome::Empty;
                }
                match self.writer.write(id, &rows) {
                    Ok(path) => {
                        self.jobs.lock().unwrap().remove(id);
                        debug!("[job {}] retrieved and cleared from index", id);
                        RetrieveOutcome::Packaged(path)
                    }
                    Err(e) => RetrieveOutcome::PackagingError(e),
                }
            }
        }
    }

    /// Remove every entry older than `retention`, except jobs still
    /// `Running`: evicting those would orphan the result the worker is
    /// about to produce, so they wait for a later sweep.
    pub fn evict_stale(&self, retention: Duration) -> Vec<JobId> {
        let now = Instant::now();
        let mut jobs = self.jobs.lock().unwrap();
        let stale: Vec<JobId> = jobs
            .iter()
            .filter(|(_, record)| {
                now.duration_since(record.created_at) > retention && !record.job.is_running()
            })
            .map(|(id, _)| id.clone())
            .collect();
        for id in &stale {
            jobs.remove(id);
        }
        stale
    }

    /// Number of live index entries.
    pub fn job_count(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }

    /// Spawn the single worker that drains the queue.
    ///
    /// One id at a time: look it up (it may have been evicted while
    /// queued, in which case it is skipped) and run the job to
    /// completion before receiving the next.
    pub fn spawn_worker(
        self: &Arc<Self>,
        mut queue_rx: UnboundedReceiver<JobId>,
        runner: JobRunner,
    ) -> JoinHandle<()> {
        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(id) = queue_rx.recv().await {
                let job = {
                    let jobs = scheduler.jobs.lock().unwrap();
                    jobs.get(&id).map(|record| record.job.clone())
                };
                match job {
                    Some(job) => runner.run(&job).await,
                    None => warn!("[job {}] evicted while queued, skipping", id),
                }
            }
            debug!("worker queue closed, worker exiting");
        })
    }
}

/// Mint an unguessable, collision-resistant public handle.
fn new_job_id() -> JobId {
    uuid::Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler() -> Arc<Scheduler> {
        let dir = std::env::temp_dir().join(format!("brs_sched_{}", uuid::Uuid::new_v4()));
        let (scheduler, rx) = Scheduler::new(ArtifactWriter::new(dir));
        // no worker in these tests; keep the queue receivable so
        // submissions do not fail on a closed channel
        std::mem::forget(rx);
        scheduler
    }

    fn params() -> JobParams {
        JobParams {
            department: 5,
            semester: 3,
            maxroll: 3,
            roll_prefix: "0192CS21".to_string(),
        }
    }

    #[test]
    fn submit_registers_a_pending_job() {
        let s = scheduler();
        let id = s.submit(params()).unwrap();
        match s.progress(&id) {
            ProgressReport::Known {
                progress,
                max,
                status,
            } => {
                assert_eq!(progress, 0);
                assert_eq!(max, 3);
                assert_eq!(status, JobStatus::Pending);
            }
            ProgressReport::Unknown => panic!("freshly submitted job must be known"),
        }
    }

    #[test]
    fn submit_rejects_invalid_params_without_registering() {
        let s = scheduler();
        let mut p = params();
        p.maxroll = 0;
        assert!(matches!(
            s.submit(p),
            Err(AppError::InvalidParameters { .. })
        ));
        assert_eq!(s.job_count(), 0);
    }

    #[test]
    fn job_ids_are_unique() {
        let s = scheduler();
        let a = s.submit(params()).unwrap();
        let b = s.submit(params()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn eviction_skips_running_jobs() {
        let s = scheduler();
        let running = s.submit(params()).unwrap();
        let stale = s.submit(params()).unwrap();

        {
            let jobs = s.jobs.lock().unwrap();
            jobs.get(&running).unwrap().job.mark_running();
        }

        let evicted = s.evict_stale(Duration::ZERO);
        assert_eq!(evicted, vec![stale.clone()]);
        assert!(matches!(s.progress(&running), ProgressReport::Known { .. }));
        assert_eq!(s.progress(&stale), ProgressReport::Unknown);
    }

    #[test]
    fn fresh_entries_survive_eviction() {
        let s = scheduler();
        let id = s.submit(params()).unwrap();
        let evicted = s.evict_stale(Duration::from_secs(3600));
        assert!(evicted.is_empty());
        assert!(matches!(s.progress(&id), ProgressReport::Known { .. }));
    }

    #[test]
    fn retrieve_unknown_and_not_ready_are_distinct() {
        let s = scheduler();
        assert!(matches!(s.retrieve("nope"), RetrieveOutcome::Unknown));
        let id = s.submit(params()).unwrap();
        assert!(matches!(s.retrieve(&id), RetrieveOutcome::NotReady));
    }
}
