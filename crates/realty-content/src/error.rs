//! Error types for content fetching.

/// All errors that can occur while fetching or normalizing content.
#[derive(thiserror::Error, Debug)]
pub enum ContentError {
    /// The upstream answered with a 4xx status. Never retried.
    #[error("Client error {status}: {message}")]
    Client { status: u16, message: String },

    /// The upstream answered with a 5xx status.
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A source answered successfully but had nothing usable.
    #[error("No posts found via {0}")]
    Empty(String),

    /// Every source in the fallback chain failed.
    #[error("All content sources failed after {attempts} attempts")]
    AllSourcesFailed { attempts: usize },
}

impl ContentError {
    /// Whether the WordPress client should try the request again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ContentError::Server { .. } | ContentError::Network(_) | ContentError::Timeout(_)
        )
    }

    /// Classify a non-success HTTP status into a client or server error.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if status >= 500 {
            ContentError::Server { status, message }
        } else {
            ContentError::Client { status, message }
        }
    }
}

impl From<reqwest::Error> for ContentError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ContentError::Timeout(e.to_string())
        } else if let Some(status) = e.status() {
            ContentError::from_status(status.as_u16(), e.to_string())
        } else if e.is_decode() {
            ContentError::Parse(e.to_string())
        } else {
            ContentError::Network(e.to_string())
        }
    }
}

/// Convenience result type.
pub type ContentResult<T> = Result<T, ContentError>;
