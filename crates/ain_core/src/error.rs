use std::fmt;
use std::time::Duration;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure classes of the upstream APIs, used for user messaging and to
/// decide whether an attempt is worth repeating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    Timeout,
    Connection,
    RateLimit,
    ServiceUnavailable,
    Connectivity,
    Classification,
    Unknown,
}

impl ApiErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiErrorKind::Timeout => "timeout",
            ApiErrorKind::Connection => "connection",
            ApiErrorKind::RateLimit => "rate-limit",
            ApiErrorKind::ServiceUnavailable => "service-unavailable",
            ApiErrorKind::Connectivity => "connectivity",
            ApiErrorKind::Classification => "classification",
            ApiErrorKind::Unknown => "unknown",
        }
    }

    pub fn is_retryable(&self) -> bool {
        !matches!(self, ApiErrorKind::Connectivity | ApiErrorKind::Classification)
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
    pub status: Option<u16>,
    #[source]
    pub source: Option<BoxError>,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            source: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Classify an HTTP status returned by an upstream API.
    pub fn from_status(context: &str, status: u16, body: &str) -> Self {
        let (kind, message) = match status {
            429 => (
                ApiErrorKind::RateLimit,
                format!("{} rate limit exceeded. Please try again later.", context),
            ),
            500..=599 => (
                ApiErrorKind::ServiceUnavailable,
                format!(
                    "{} service temporarily unavailable ({}). Please try again later.",
                    context, status
                ),
            ),
            _ => (
                ApiErrorKind::Unknown,
                format!("{} failed with status {}: {}", context, status, body),
            ),
        };
        Self::new(kind, message).with_status(status)
    }

    /// Classify a transport-level failure from reqwest.
    pub fn from_reqwest(context: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::new(
                ApiErrorKind::Timeout,
                format!("{} request timed out. Please check your internet connection.", context),
            )
            .with_source(err);
        }
        if err.is_connect() {
            return Self::new(
                ApiErrorKind::Connection,
                format!(
                    "{} could not connect. Please check your internet connection and DNS settings.",
                    context
                ),
            )
            .with_source(err);
        }
        if let Some(status) = err.status() {
            return Self::from_status(context, status.as_u16(), "").with_source(err);
        }
        Self::new(ApiErrorKind::Unknown, format!("{} failed: {}", context, err)).with_source(err)
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("{context} failed after {attempts} attempts: {source}")]
    RetryExhausted {
        context: String,
        attempts: u32,
        #[source]
        source: Box<Error>,
    },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
            field: None,
        }
    }

    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn api(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Error::Api(ApiError::new(kind, message))
    }

    /// The API kind of this error, looking through retry wrapping.
    pub fn api_kind(&self) -> Option<ApiErrorKind> {
        match self {
            Error::Api(api) => Some(api.kind),
            Error::RetryExhausted { source, .. } => source.api_kind(),
            _ => None,
        }
    }

    /// Short machine-readable tag, stable across wrapping.
    pub fn kind_tag(&self) -> &'static str {
        match self {
            Error::Validation { .. } => "validation",
            Error::Api(api) => api.kind.as_str(),
            Error::RetryExhausted { source, .. } => source.kind_tag(),
            Error::Cancelled => "cancelled",
            Error::DeadlineExceeded(_) => "timeout",
            Error::Storage(_) | Error::Io(_) => "storage",
            Error::Serialization(_) => "serialization",
            Error::External(_) => "unknown",
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Api(api) => api.kind.is_retryable(),
            Error::External(_) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
