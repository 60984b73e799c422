use std::time::Duration;

/// Per-request timeout used by [`ClientConfig::new`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Retries after the first failed attempt of an idempotent request.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Delay before the first retry; doubled for each further attempt.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// Connection settings for [`ReadingsClient`](crate::ReadingsClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server root, e.g. `http://localhost:5011`. The `/api/v1` prefix is
    /// added by the client.
    pub base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, max_retries: u32, backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_backoff = backoff;
        self
    }

    /// Backoff before retry number `attempt` (zero-based).
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        self.retry_backoff.saturating_mul(2u32.saturating_pow(attempt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_strips_trailing_slash_and_sets_defaults() {
        let config = ClientConfig::new("http://localhost:5011/");
        assert_eq!(config.base_url, "http://localhost:5011");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.max_retries, 2);
    }

    #[test]
    fn retry_delay_doubles() {
        let config = ClientConfig::new("http://x").with_retries(3, Duration::from_millis(100));
        assert_eq!(config.retry_delay(0), Duration::from_millis(100));
        assert_eq!(config.retry_delay(1), Duration::from_millis(200));
        assert_eq!(config.retry_delay(2), Duration::from_millis(400));
    }
}
