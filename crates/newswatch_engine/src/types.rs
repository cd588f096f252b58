use std::fmt;

use crate::extract::ExtractError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub final_url: String,
    pub redirect_count: usize,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Network,
    /// The HTTP client could not be built from the settings.
    ClientSetup,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Network => write!(f, "network error"),
            FailureKind::ClientSetup => write!(f, "client setup"),
        }
    }
}

/// Why a poll cycle produced no items.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct SinkError {
    pub kind: SinkErrorKind,
    pub message: String,
}

impl SinkError {
    pub(crate) fn new(kind: SinkErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Only markup rejections are recovered with the plain-text fallback.
    pub fn is_formatting(&self) -> bool {
        self.kind == SinkErrorKind::Formatting
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkErrorKind {
    /// The sink could not parse the message markup.
    Formatting,
    Unauthorized,
    RateLimited { retry_after_secs: Option<u64> },
    Rejected(u16),
    Timeout,
    Network,
    InvalidResponse,
    NotConfigured,
}

impl fmt::Display for SinkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkErrorKind::Formatting => write!(f, "formatting rejected"),
            SinkErrorKind::Unauthorized => write!(f, "unauthorized"),
            SinkErrorKind::RateLimited { retry_after_secs } => match retry_after_secs {
                Some(secs) => write!(f, "rate limited (retry after {secs}s)"),
                None => write!(f, "rate limited"),
            },
            SinkErrorKind::Rejected(code) => write!(f, "rejected with status {code}"),
            SinkErrorKind::Timeout => write!(f, "timeout"),
            SinkErrorKind::Network => write!(f, "network error"),
            SinkErrorKind::InvalidResponse => write!(f, "invalid response"),
            SinkErrorKind::NotConfigured => write!(f, "not configured"),
        }
    }
}

/// Failures while assembling the engine from settings.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid source url '{url}': {source}")]
    SourceUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("fetcher setup failed: {0}")]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("sink setup failed: {0}")]
    Sink(#[from] SinkError),
}
