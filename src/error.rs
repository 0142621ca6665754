/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Network or request execution error from `reqwest`.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// Retryable statuses kept coming back until the attempt budget ran out.
    #[error("retries exhausted after {attempts} attempts, last status {status}")]
    RetryExhausted {
        /// Status of the final attempt.
        status: u16,
        /// Total attempts issued, including the first.
        attempts: u32,
    },
    /// Actual response status differs from the explicitly expected one.
    #[error("unexpected status {actual}, expected {expected}")]
    UnexpectedStatus { expected: u16, actual: u16 },
    /// Base URL or request path could not be parsed or joined.
    #[error("invalid url: {0}")]
    Url(url::ParseError),
    /// Caller-side misuse detected before any request was attempted.
    #[error("precondition failed: {0}")]
    Precondition(String),
    /// Response body did not have the shape the caller relies on.
    #[error("decode error: {0}")]
    Decode(String),
}
