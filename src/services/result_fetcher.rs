//! Portal boundary service
//!
//! Responsibilities:
//! - one round-trip per call against the external results portal
//! - classify every response so the job can apply the right
//!   retry/skip policy
//! - no internal retries (retry policy belongs to the job)

use crate::config::Config;
use crate::error::{AppError, AppResult, FetchError};
use crate::models::{JobParams, ResultRow};
use async_trait::async_trait;
use regex::Regex;
use std::time::Duration;
use tracing::debug;

/// Classified outcome of one fetch cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The portal returned a parseable record
    Record(ResultRow),
    /// No such student; a normal outcome, not an error
    NotFound,
    /// The portal rejected the CAPTCHA solve
    CaptchaRejected,
}

/// One request/response cycle against the results portal.
#[async_trait]
pub trait ResultFetcher: Send + Sync {
    /// Fetch a fresh CAPTCHA challenge image.
    async fn captcha_challenge(&self) -> Result<Vec<u8>, FetchError>;

    /// Submit one roll number with a solved CAPTCHA token and classify
    /// the portal's answer. Transport failures are `Err(Network)`; a
    /// structurally unrecognizable page is `Err(Structural)`.
    async fn fetch_one(
        &self,
        params: &JobParams,
        roll: &str,
        token: &str,
    ) -> Result<FetchOutcome, FetchError>;
}

/// Production fetcher backed by `reqwest`.
///
/// The portal ties each CAPTCHA to a session cookie, so the client
/// carries a cookie store; one `PortalFetcher` therefore serves one
/// worker, which is all the single-worker scheduler ever needs.
pub struct PortalFetcher {
    client: reqwest::Client,
    base_url: String,
    name_re: Regex,
    status_re: Regex,
    sgpa_re: Regex,
    cgpa_re: Regex,
}

const CAPTCHA_PATH: &str = "/captcha";
const RESULT_PATH: &str = "/result";

impl PortalFetcher {
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::Other(format!("cannot build http client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.portal_base_url.trim_end_matches('/').to_string(),
            // Field extraction; compiled once, the patterns are static
            name_re: Regex::new(r#"(?i)id="lblName"[^>]*>([^<]+)<"#).unwrap(),
            status_re: Regex::new(r#"(?i)id="lblResult"[^>]*>([^<]+)<"#).unwrap(),
            sgpa_re: Regex::new(r#"(?i)id="lblSGPA"[^>]*>([^<]+)<"#).unwrap(),
            cgpa_re: Regex::new(r#"(?i)id="lblCGPA"[^>]*>([^<]+)<"#).unwrap(),
        })
    }

    fn extract(&self, body: &str, roll: &str) -> Result<ResultRow, FetchError> {
        let capture = |re: &Regex, what: &str| -> Result<String, FetchError> {
            re.captures(body)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string())
                .ok_or_else(|| FetchError::structural(format!("missing {} field", what)))
        };

        Ok(ResultRow {
            roll_number: roll.to_string(),
            name: capture(&self.name_re, "name")?,
            status: capture(&self.status_re, "result status")?,
            sgpa: capture(&self.sgpa_re, "SGPA")?,
            cgpa: capture(&self.cgpa_re, "CGPA")?,
        })
    }
}

#[async_trait]
impl ResultFetcher for PortalFetcher {
    async fn captcha_challenge(&self) -> Result<Vec<u8>, FetchError> {
        let url = format!("{}{}", self.base_url, CAPTCHA_PATH);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::network(&url, e))?
            .error_for_status()
            .map_err(|e| FetchError::network(&url, e))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::network(&url, e))?;
        Ok(bytes.to_vec())
    }

    async fn fetch_one(
        &self,
        params: &JobParams,
        roll: &str,
        token: &str,
    ) -> Result<FetchOutcome, FetchError> {
        let url = format!("{}{}", self.base_url, RESULT_PATH);
        let form = [
            ("department", params.department.to_string()),
            ("semester", params.semester.to_string()),
            ("rollno", roll.to_string()),
            ("captcha", token.to_string()),
        ];

        let response = self
            .client
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| FetchError::network(&url, e))?
            .error_for_status()
            .map_err(|e| FetchError::network(&url, e))?;

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::network(&url, e))?;

        // Marker strings come before field extraction: a rejection page
        // carries none of the record fields
        let lowered = body.to_lowercase();
        if lowered.contains("invalid captcha") || lowered.contains("incorrect captcha") {
            debug!("[{}] portal rejected the captcha solve", roll);
            return Ok(FetchOutcome::CaptchaRejected);
        }
        if lowered.contains("result not found") || lowered.contains("no records found") {
            debug!("[{}] no record on the portal", roll);
            return Ok(FetchOutcome::NotFound);
        }

        self.extract(&body, roll).map(FetchOutcome::Record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher() -> PortalFetcher {
        PortalFetcher::new(&Config::default()).unwrap()
    }

    #[test]
    fn extracts_a_full_record() {
        let body = r#"
            <span id="lblName">ANITA SHARMA</span>
            <span id="lblResult">PASS</span>
            <span id="lblSGPA">8.4</span>
            <span id="lblCGPA">8.1</span>
        "#;
        let row = fetcher().extract(body, "0192CS211001").unwrap();
        assert_eq!(row.name, "ANITA SHARMA");
        assert_eq!(row.status, "PASS");
        assert_eq!(row.sgpa, "8.4");
        assert_eq!(row.cgpa, "8.1");
        assert_eq!(row.roll_number, "0192CS211001");
    }

    #[test]
    fn missing_field_is_structural() {
        let body = r#"<span id="lblName">ANITA</span>"#;
        assert!(matches!(
            fetcher().extract(body, "x"),
            Err(FetchError::Structural { .. })
        ));
    }
}
