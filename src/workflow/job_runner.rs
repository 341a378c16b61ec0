//! Per-job state machine
//!
//! Drives one job from `Running` to a terminal state:
//!
//! 1. per identifier: fresh challenge -> solve -> submit -> classify
//! 2. empty/malformed tokens and portal CAPTCHA rejections retry the
//!    challenge, bounded by the CAPTCHA retry budget
//! 3. transport errors retry with exponential backoff, bounded by the
//!    fetch retry budget, then the identifier is skipped as a gap
//! 4. structural portal changes and persistent OCR engine failures
//!    fail the whole job; progress freezes
//!
//! Transient errors never escape this module: the scheduler and the
//! pollers only ever see them as a slower progress rate.

use crate::config::Config;
use crate::error::{AppError, FetchError};
use crate::services::{CaptchaSolver, FetchOutcome, ResultFetcher};
use crate::workflow::Job;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Retry bounds and backoff curve, exposed as configuration rather
/// than hard-coded.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub captcha_max_retries: u32,
    pub fetch_max_retries: u32,
    pub backoff_base_ms: u64,
    pub backoff_max_ms: u64,
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            captcha_max_retries: config.captcha_max_retries,
            fetch_max_retries: config.fetch_max_retries,
            backoff_base_ms: config.backoff_base_ms,
            backoff_max_ms: config.backoff_max_ms,
        }
    }

    /// Exponential backoff: `base * 2^attempt`, capped.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let ms = self
            .backoff_base_ms
            .saturating_mul(1u64 << attempt.min(16))
            .min(self.backoff_max_ms);
        Duration::from_millis(ms)
    }
}

/// How one identifier ended up.
enum Resolution {
    /// Parsed record collected
    Row(crate::models::ResultRow),
    /// The portal has no record for this identifier
    Absent,
    /// Retries exhausted; the identifier is skipped as a gap
    GaveUp,
}

/// Drives jobs to completion against pluggable solver/fetcher
/// capabilities.
pub struct JobRunner {
    solver: Arc<dyn CaptchaSolver>,
    fetcher: Arc<dyn ResultFetcher>,
    retry: RetryPolicy,
}

impl JobRunner {
    pub fn new(
        solver: Arc<dyn CaptchaSolver>,
        fetcher: Arc<dyn ResultFetcher>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            solver,
            fetcher,
            retry,
        }
    }

    /// Run `job` to a terminal state. Identifiers are processed
    /// strictly sequentially, so rows come out in ascending order and
    /// the portal never sees intra-job parallelism.
    pub async fn run(&self, job: &Job) {
        job.mark_running();
        let params = job.params();
        info!(
            "[job {}] started: department={} semester={} range={}1..{}{}",
            job.id(),
            params.department,
            params.semester,
            params.roll_prefix,
            params.roll_prefix,
            params.maxroll
        );

        for n in 1..=params.maxroll {
            let roll = params.identifier(n);
            match self.resolve_identifier(job, &roll).await {
                Ok(Resolution::Row(row)) => {
                    job.push_row(row);
                    job.advance();
                }
                Ok(Resolution::Absent) => {
                    job.advance();
                }
                Ok(Resolution::GaveUp) => {
                    warn!("[job {}] gave up on {} after retries, recorded as gap", job.id(), roll);
                    job.advance();
                }
                Err(e) => {
                    error!("[job {}] unrecoverable at {}: {}", job.id(), roll, e);
                    job.fail(e.to_string());
                    return;
                }
            }
        }

        info!(
            "[job {}] completed: {} of {} identifiers yielded rows",
            job.id(),
            job.rows_snapshot().len(),
            params.maxroll
        );
        job.complete();
    }

    /// Resolve a single identifier, absorbing transient failures.
    ///
    /// `Err` is reserved for unrecoverable conditions that must fail
    /// the whole job.
    async fn resolve_identifier(&self, job: &Job, roll: &str) -> Result<Resolution, AppError> {
        let mut captcha_attempts: u32 = 0;
        let mut net_attempts: u32 = 0;
        let mut engine_failures: u32 = 0;

        loop {
            // Step 1: fresh challenge from the portal
            let image = match self.fetcher.captcha_challenge().await {
                Ok(image) => image,
                Err(FetchError::Network { .. }) if net_attempts < self.retry.fetch_max_retries => {
                    tokio::time::sleep(self.retry.backoff(net_attempts)).await;
                    net_attempts += 1;
                    continue;
                }
                Err(FetchError::Network { .. }) => return Ok(Resolution::GaveUp),
                Err(e @ FetchError::Structural { .. }) => return Err(e.into()),
            };

            // Step 2: best-effort solve
            let token = match self.solver.solve(&image).await {
                Ok(token) => token,
                Err(e) => {
                    // An engine that keeps throwing (rather than
                    // returning empty) takes the whole job down
                    engine_failures += 1;
                    if engine_failures > self.retry.captcha_max_retries {
                        return Err(e);
                    }
                    warn!("[job {}] OCR engine failure on {}: {}", job.id(), roll, e);
                    continue;
                }
            };

            if !token_plausible(&token) {
                captcha_attempts += 1;
                if captcha_attempts > self.retry.captcha_max_retries {
                    return Ok(Resolution::GaveUp);
                }
                continue;
            }

            // Step 3: submit and classify
            match self.fetcher.fetch_one(job.params(), roll, &token).await {
                Ok(FetchOutcome::Record(row)) => return Ok(Resolution::Row(row)),
                Ok(FetchOutcome::NotFound) => return Ok(Resolution::Absent),
                Ok(FetchOutcome::CaptchaRejected) => {
                    captcha_attempts += 1;
                    if captcha_attempts > self.retry.captcha_max_retries {
                        return Ok(Resolution::GaveUp);
                    }
                    continue;
                }
                Err(FetchError::Network { .. }) if net_attempts < self.retry.fetch_max_retries => {
                    tokio::time::sleep(self.retry.backoff(net_attempts)).await;
                    net_attempts += 1;
                    continue;
                }
                Err(FetchError::Network { .. }) => return Ok(Resolution::GaveUp),
                Err(e @ FetchError::Structural { .. }) => return Err(e.into()),
            }
        }
    }
}

/// A token worth submitting: non-empty, at least four characters, all
/// from the recognition alphabet. Anything else is a misread and the
/// challenge is refetched instead of wasting a portal round-trip.
fn token_plausible(token: &str) -> bool {
    token.len() >= 4 && token.chars().all(|c| c.is_ascii_alphanumeric())
}
