//! Error types for building and executing requests.
//!
//! # Design
//! Three failure classes matter to callers: the URL could not be parsed when
//! the builder was created, a connect or read bound was exceeded, or the
//! round-trip failed some other way. `Timeout` gets its own variant so
//! callers can tell "slow" from "broken" without inspecting `ureq` internals.
//! Nothing here is retried; every error reaches the immediate caller.

/// Errors returned by `RequestBuilder` and `Response`.
#[derive(thiserror::Error, Debug)]
pub enum RequestError {
    /// The URL given to the builder is not a valid absolute URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Connecting or waiting for the response exceeded the configured bound.
    #[error("request timed out")]
    Timeout,

    /// Reading or writing the underlying stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other failure reported by the HTTP stack (DNS, TLS, protocol).
    #[error("transport error: {0}")]
    Transport(ureq::Error),

    /// A JSON body could not be serialized or a JSON response decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ureq::Error> for RequestError {
    fn from(error: ureq::Error) -> Self {
        match error {
            ureq::Error::Timeout(_) => RequestError::Timeout,
            ureq::Error::Io(e) if e.kind() == std::io::ErrorKind::TimedOut => RequestError::Timeout,
            ureq::Error::Io(e) => RequestError::Io(e),
            other => RequestError::Transport(other),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RequestError>;
