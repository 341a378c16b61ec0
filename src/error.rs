use std::fmt;

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Malformed submission parameters; surfaced synchronously, no job created
    InvalidParameters { reason: String },
    /// OCR engine failure (distinct from a low-confidence empty read)
    Captcha(CaptchaError),
    /// Portal I/O failure
    Fetch(FetchError),
    /// Artifact could not be assembled from a completed job's rows
    Packaging {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Filesystem error outside artifact packaging
    Io(std::io::Error),
    /// Anything else (wrapping third-party errors)
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidParameters { reason } => write!(f, "invalid parameters: {}", reason),
            AppError::Captcha(e) => write!(f, "captcha error: {}", e),
            AppError::Fetch(e) => write!(f, "fetch error: {}", e),
            AppError::Packaging { path, source } => {
                write!(f, "failed to package artifact ({}): {}", path, source)
            }
            AppError::Io(e) => write!(f, "io error: {}", e),
            AppError::Other(msg) => write!(f, "error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Captcha(e) => Some(e),
            AppError::Fetch(e) => Some(e),
            AppError::Packaging { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            AppError::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// OCR engine errors
#[derive(Debug)]
pub enum CaptchaError {
    /// The CAPTCHA image bytes could not be decoded
    ImageDecodeFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The OCR process could not be started
    EngineSpawnFailed {
        cmd: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The OCR process ran but reported failure
    EngineFailed { detail: String },
}

impl fmt::Display for CaptchaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptchaError::ImageDecodeFailed { source } => {
                write!(f, "cannot decode captcha image: {}", source)
            }
            CaptchaError::EngineSpawnFailed { cmd, source } => {
                write!(f, "cannot start OCR engine '{}': {}", cmd, source)
            }
            CaptchaError::EngineFailed { detail } => write!(f, "OCR engine failed: {}", detail),
        }
    }
}

impl std::error::Error for CaptchaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CaptchaError::ImageDecodeFailed { source }
            | CaptchaError::EngineSpawnFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            CaptchaError::EngineFailed { .. } => None,
        }
    }
}

/// Portal fetch errors, classified so the job can apply the right
/// retry/skip policy
#[derive(Debug)]
pub enum FetchError {
    /// Transient transport failure; the job retries with backoff
    Network {
        endpoint: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The portal answered but the page is unrecognizable; unrecoverable
    Structural { reason: String },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Network { endpoint, source } => {
                write!(f, "network failure ({}): {}", endpoint, source)
            }
            FetchError::Structural { reason } => {
                write!(f, "portal response unrecognizable: {}", reason)
            }
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Network { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            FetchError::Structural { .. } => None,
        }
    }
}

// ========== Conversions ==========

impl From<CaptchaError> for AppError {
    fn from(err: CaptchaError) -> Self {
        AppError::Captcha(err)
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        AppError::Fetch(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err)
    }
}

// ========== Convenience constructors ==========

impl AppError {
    pub fn invalid_parameters(reason: impl Into<String>) -> Self {
        AppError::InvalidParameters {
            reason: reason.into(),
        }
    }

    pub fn packaging(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Packaging {
            path: path.into(),
            source: Box::new(source),
        }
    }
}

impl FetchError {
    pub fn network(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        FetchError::Network {
            endpoint: endpoint.into(),
            source: Box::new(source),
        }
    }

    pub fn structural(reason: impl Into<String>) -> Self {
        FetchError::Structural {
            reason: reason.into(),
        }
    }
}

// ========== Result type alias ==========

/// Application result type
pub type AppResult<T> = Result<T, AppError>;
