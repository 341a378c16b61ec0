//! Submission parameters for one bulk scrape

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Parameters of one bulk scrape request.
///
/// Together they define the roll-number range
/// `prefix+1 ..= prefix+maxroll` the job iterates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobParams {
    pub department: u32,
    pub semester: u32,
    pub maxroll: u32,
    pub roll_prefix: String,
}

impl JobParams {
    /// Validate a submission. Runs synchronously at submit time so the
    /// caller gets immediate feedback before anything is enqueued.
    pub fn validate(&self) -> AppResult<()> {
        if self.department == 0 {
            return Err(AppError::invalid_parameters("department must be positive"));
        }
        if self.semester == 0 {
            return Err(AppError::invalid_parameters("semester must be positive"));
        }
        if self.maxroll == 0 {
            return Err(AppError::invalid_parameters("maxroll must be positive"));
        }
        if self.roll_prefix.trim().is_empty() {
            return Err(AppError::invalid_parameters("rollPrefix must not be empty"));
        }
        Ok(())
    }

    /// Render the n-th identifier of the range (`n` in `1..=maxroll`).
    pub fn identifier(&self, n: u32) -> String {
        format!("{}{}", self.roll_prefix, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> JobParams {
        JobParams {
            department: 5,
            semester: 3,
            maxroll: 3,
            roll_prefix: "0192CS21".to_string(),
        }
    }

    #[test]
    fn valid_params_pass() {
        assert!(params().validate().is_ok());
    }

    #[test]
    fn zero_integers_are_rejected() {
        for field in ["department", "semester", "maxroll"] {
            let mut p = params();
            match field {
                "department" => p.department = 0,
                "semester" => p.semester = 0,
                _ => p.maxroll = 0,
            }
            let err = p.validate().unwrap_err();
            assert!(
                matches!(err, AppError::InvalidParameters { .. }),
                "expected InvalidParameters for zero {field}"
            );
        }
    }

    #[test]
    fn blank_prefix_is_rejected() {
        let mut p = params();
        p.roll_prefix = "  ".to_string();
        assert!(matches!(
            p.validate(),
            Err(AppError::InvalidParameters { .. })
        ));
    }

    #[test]
    fn identifiers_concatenate_prefix_and_index() {
        let p = params();
        assert_eq!(p.identifier(1), "0192CS211");
        assert_eq!(p.identifier(3), "0192CS213");
    }
}
