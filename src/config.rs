/// Runtime configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the results portal being scraped
    pub portal_base_url: String,
    /// Address the HTTP boundary binds to
    pub bind_addr: String,
    /// Port the HTTP boundary listens on
    pub port: u16,
    /// Directory packaged CSV artifacts are written to
    pub artifacts_dir: String,
    /// Seconds an unretrieved job survives before the janitor evicts it
    pub retention_secs: u64,
    /// Seconds between janitor sweeps
    pub janitor_interval_secs: u64,
    /// Bounded retries for empty/misread CAPTCHA solves and portal rejections
    pub captcha_max_retries: u32,
    /// Bounded retries for transport errors on a single identifier
    pub fetch_max_retries: u32,
    /// First backoff delay for transport retries (doubles each attempt)
    pub backoff_base_ms: u64,
    /// Backoff ceiling
    pub backoff_max_ms: u64,
    /// Tesseract binary used by the OCR solver
    pub tesseract_cmd: String,
    /// Timeout for one portal round-trip
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            portal_base_url: "http://result.rgpv.ac.in".to_string(),
            bind_addr: "0.0.0.0".to_string(),
            port: 8080,
            artifacts_dir: "artifacts".to_string(),
            retention_secs: 2700,
            janitor_interval_secs: 300,
            captcha_max_retries: 5,
            fetch_max_retries: 3,
            backoff_base_ms: 500,
            backoff_max_ms: 8000,
            tesseract_cmd: "tesseract".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            portal_base_url: std::env::var("PORTAL_BASE_URL").unwrap_or(default.portal_base_url),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(default.bind_addr),
            port: std::env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.port),
            artifacts_dir: std::env::var("ARTIFACTS_DIR").unwrap_or(default.artifacts_dir),
            retention_secs: std::env::var("RETENTION_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.retention_secs),
            janitor_interval_secs: std::env::var("JANITOR_INTERVAL_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.janitor_interval_secs),
            captcha_max_retries: std::env::var("CAPTCHA_MAX_RETRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.captcha_max_retries),
            fetch_max_retries: std::env::var("FETCH_MAX_RETRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.fetch_max_retries),
            backoff_base_ms: std::env::var("BACKOFF_BASE_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.backoff_base_ms),
            backoff_max_ms: std::env::var("BACKOFF_MAX_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.backoff_max_ms),
            tesseract_cmd: std::env::var("TESSERACT_CMD").unwrap_or(default.tesseract_cmd),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
        }
    }
}
