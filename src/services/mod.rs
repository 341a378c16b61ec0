pub mod artifact_writer;
pub mod captcha_solver;
pub mod result_fetcher;

pub use artifact_writer::ArtifactWriter;
pub use captcha_solver::{CaptchaSolver, TesseractSolver};
pub use result_fetcher::{FetchOutcome, PortalFetcher, ResultFetcher};
