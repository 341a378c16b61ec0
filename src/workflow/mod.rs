//! Workflow layer
//!
//! Defines one bulk scrape job and the state machine that drives it:
//!
//! - `job` - the unit of asynchronous work: identity, parameters,
//!   progress counter, collected rows, terminal status
//! - `job_runner` - iterates the roll-number range, solves CAPTCHAs,
//!   fetches records, applies the retry/backoff policy
//!
//! Only the single worker executing a job writes to it; pollers read
//! snapshots through the job's accessors.

pub mod job;
pub mod job_runner;

pub use job::{Job, JobStatus};
pub use job_runner::{JobRunner, RetryPolicy};
