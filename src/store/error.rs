use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("progress record {0} not found")]
    NotFound(String),

    #[error("progress record changed underneath us (expected version {expected}, found {found})")]
    VersionConflict { expected: u64, found: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("server answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("progress store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Worth trying the same write again. Client-side rejections (4xx other
    /// than timeouts and rate limits) are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Io(_) | StoreError::Http(_) | StoreError::Unavailable(_) => true,
            StoreError::Status { status, .. } => *status >= 500 || matches!(*status, 408 | 429),
            _ => false,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
