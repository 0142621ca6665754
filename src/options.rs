use std::time::Duration;

/// Configures timeout, retry behavior and connection-pool settings.
///
/// TLS verification, redirect following and proxying configure the underlying
/// `reqwest` pool, so they bind at client construction rather than per call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientOptions {
    /// Default per-request timeout; overridable per [`RequestSpec`].
    ///
    /// [`RequestSpec`]: crate::RequestSpec
    pub timeout: Duration,
    /// Automatic retry behavior for transient failures.
    pub retry: RetryPolicy,
    /// Whether to verify TLS certificates.
    pub verify_tls: bool,
    /// Whether to follow redirects (up to the transport's default hop limit).
    pub allow_redirects: bool,
    /// Optional proxy URL applied to all requests.
    pub proxy: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            retry: RetryPolicy::default(),
            verify_tls: true,
            allow_redirects: true,
            proxy: None,
        }
    }
}

/// Rules for re-issuing a request after a transient failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum attempts in total, including the first.
    pub max_attempts: u32,
    /// Backoff base factor; the delay before retry `n` is `backoff * 2^n`,
    /// with the first retry issued immediately.
    pub backoff: Duration,
    /// Response statuses that trigger a retry.
    pub retry_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff: Duration::from_millis(100),
            retry_statuses: vec![500, 502, 503, 504],
        }
    }
}

impl RetryPolicy {
    /// Disables retries entirely.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub(crate) fn is_retryable_status(&self, status: u16) -> bool {
        self.retry_statuses.contains(&status)
    }

    /// Delay before the next attempt, given how many retries already ran.
    pub(crate) fn backoff_delay(&self, retries_done: u32) -> Duration {
        if retries_done == 0 {
            return Duration::ZERO;
        }
        let exp = retries_done.min(16);
        self.backoff.saturating_mul(1 << exp)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{ClientOptions, RetryPolicy};

    #[test]
    fn default_policy_matches_documented_values() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.backoff, Duration::from_millis(100));
        assert_eq!(policy.retry_statuses, vec![500, 502, 503, 504]);
        assert_eq!(ClientOptions::default().timeout, Duration::from_secs(5));
    }

    #[test]
    fn retryable_statuses_are_server_side_only() {
        let policy = RetryPolicy::default();
        for status in [500, 502, 503, 504] {
            assert!(policy.is_retryable_status(status));
        }
        for status in [200, 404, 429, 501] {
            assert!(!policy.is_retryable_status(status));
        }
    }

    #[test]
    fn backoff_doubles_after_immediate_first_retry() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_delay(0), Duration::ZERO);
        assert_eq!(policy.backoff_delay(1), Duration::from_millis(200));
        assert_eq!(policy.backoff_delay(2), Duration::from_millis(400));
        assert_eq!(policy.backoff_delay(3), Duration::from_millis(800));
    }
}
