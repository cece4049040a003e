//! Remote fetch error types.

/// Errors fetching one remote schema. Never fatal to a task.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The catalog entry is not a valid absolute URL.
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        /// The catalog entry as written.
        url: String,
        /// Why it failed to parse.
        source: url::ParseError,
    },
    /// The HTTP client could not be built.
    #[error("HTTP client setup failed: {0}")]
    Client(reqwest::Error),
    /// Transport error.
    #[error("HTTP error fetching {url}: {source}")]
    Http {
        /// The URL being fetched.
        url: String,
        /// The underlying client error.
        source: reqwest::Error,
    },
    /// The server answered with a non-success status.
    #[error("{url} returned {status}")]
    Status {
        /// The URL being fetched.
        url: String,
        /// The HTTP status code returned.
        status: u16,
    },
}
