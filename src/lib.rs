//! # Bulk Result Scraper
//!
//! A service that accepts a bulk "fetch results for many roll numbers"
//! request, runs it asynchronously as one long-lived job, reports live
//! progress to polling clients, and packages the scraped rows into a
//! downloadable CSV artifact.
//!
//! ## Architecture
//!
//! The system is layered; each layer only reaches downward:
//!
//! ### Services (capabilities)
//! - `services/` - "what I can do", one capability per module
//! - `CaptchaSolver` - OCR a CAPTCHA image (Tesseract behind a trait)
//! - `ResultFetcher` - one classified round-trip against the portal
//! - `ArtifactWriter` - package rows into a CSV file
//!
//! ### Workflow (one job)
//! - `workflow/` - the state machine of a single job
//! - `Job` - identity, parameters, progress, rows, terminal status
//! - `JobRunner` - iterate the range, solve, fetch, retry, back off
//!
//! ### Orchestration (all jobs)
//! - `orchestrator/scheduler` - index + FIFO queue + the single worker
//! - `orchestrator/janitor` - retention-window eviction
//!
//! ### Boundary
//! - `api/` - actix-web routes translating HTTP payloads to scheduler
//!   calls and back
//!
//! At most one job executes at a time by construction, which bounds
//! the load on the scraped portal and the OCR engine.

pub mod api;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod workflow;

// Re-export the types most callers need
pub use config::Config;
pub use error::{AppError, AppResult, CaptchaError, FetchError};
pub use models::{JobParams, ResultRow};
pub use orchestrator::{ProgressReport, RetrieveOutcome, Scheduler};
pub use services::{
    ArtifactWriter, CaptchaSolver, FetchOutcome, PortalFetcher, ResultFetcher, TesseractSolver,
};
pub use workflow::{Job, JobRunner, JobStatus, RetryPolicy};
