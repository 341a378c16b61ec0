//! Stale-job janitor
//!
//! Unretrieved jobs older than the retention window are dropped from
//! the index so their memory is reclaimed and stale downloads stop
//! resolving. Jobs still `Running` are left alone (see
//! [`Scheduler::evict_stale`]) and get swept on a later tick once
//! terminal.

use crate::orchestrator::Scheduler;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Spawn the periodic sweep task: sleep, evict, repeat.
pub fn spawn(
    scheduler: Arc<Scheduler>,
    interval: Duration,
    retention: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;
            let evicted = scheduler.evict_stale(retention);
            if evicted.is_empty() {
                debug!("janitor sweep: nothing stale");
            } else {
                info!(
                    "janitor sweep: evicted {} stale job(s): {}",
                    evicted.len(),
                    evicted.join(", ")
                );
            }
        }
    })
}
