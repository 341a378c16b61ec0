//! Orchestration layer
//!
//! ## Responsibilities
//!
//! - `scheduler` - admits jobs, runs at most one at a time to
//!   completion on a single worker, and indexes jobs by opaque
//!   identifier for progress/result lookup
//! - `janitor` - periodically evicts index entries older than the
//!   retention window
//!
//! ## Layering
//!
//! ```text
//! orchestrator (queue + index + worker + janitor)
//!     |
//! workflow::JobRunner (one job's state machine)
//!     |
//! services (capabilities: solve / fetch / package)
//! ```
//!
//! The job index and queue are the only shared mutable structures in
//! the system; both live here and nowhere else.

pub mod janitor;
pub mod scheduler;

pub use scheduler::{JobId, ProgressReport, RetrieveOutcome, Scheduler};
