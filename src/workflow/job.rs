//! One bulk scrape job and its observable state

use crate::models::{JobParams, ResultRow};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// Lifecycle of a job.
///
/// `Pending` is the only initial state; `Completed` and `Failed` are
/// terminal and entered exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed(String),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed(_))
    }
}

/// The unit of asynchronous work.
///
/// Mutated only by the single worker executing it; pollers read
/// concurrently through the snapshot accessors, so progress is an
/// atomic and the rest sits behind short-lived mutexes.
pub struct Job {
    id: String,
    params: JobParams,
    progress: AtomicU32,
    rows: Mutex<Vec<ResultRow>>,
    status: Mutex<JobStatus>,
}

impl Job {
    pub fn new(id: impl Into<String>, params: JobParams) -> Self {
        Self {
            id: id.into(),
            params,
            progress: AtomicU32::new(0),
            rows: Mutex::new(Vec::new()),
            status: Mutex::new(JobStatus::Pending),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn params(&self) -> &JobParams {
        &self.params
    }

    /// Identifiers fully resolved so far (success, not-found, or
    /// given-up all count). Never exceeds [`max`](Self::max).
    pub fn progress(&self) -> u32 {
        self.progress.load(Ordering::Acquire)
    }

    pub fn max(&self) -> u32 {
        self.params.maxroll
    }

    pub fn status(&self) -> JobStatus {
        self.status.lock().unwrap().clone()
    }

    pub fn is_running(&self) -> bool {
        matches!(self.status(), JobStatus::Running)
    }

    pub fn rows_snapshot(&self) -> Vec<ResultRow> {
        self.rows.lock().unwrap().clone()
    }

    // ---- worker-side mutation; called only by the executing worker ----

    pub(crate) fn mark_running(&self) {
        let mut status = self.status.lock().unwrap();
        if *status == JobStatus::Pending {
            *status = JobStatus::Running;
        }
    }

    /// Advance the progress counter by one resolved identifier.
    pub(crate) fn advance(&self) {
        let before = self.progress.fetch_add(1, Ordering::AcqRel);
        debug_assert!(before < self.params.maxroll);
    }

    pub(crate) fn push_row(&self, row: ResultRow) {
        self.rows.lock().unwrap().push(row);
    }

    pub(crate) fn complete(&self) {
        let mut status = self.status.lock().unwrap();
        if !status.is_terminal() {
            *status = JobStatus::Completed;
        }
    }

    pub(crate) fn fail(&self, reason: impl Into<String>) {
        let mut status = self.status.lock().unwrap();
        if !status.is_terminal() {
            *status = JobStatus::Failed(reason.into());
        }
    }
}
