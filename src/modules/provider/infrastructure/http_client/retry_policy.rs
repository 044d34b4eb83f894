//! Retry policies for the individual catalogs
//!
//! Handles provider-specific rate limiting with retry logic based on
//! HTTP headers and provider characteristics.

use std::time::Duration;

use crate::shared::domain::ProviderId;

/// Configuration for HTTP retry behavior
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Base delay between retries (will be adjusted based on headers)
    pub base_delay: Duration,
    /// Maximum delay to wait (prevents excessive waits)
    pub max_delay: Duration,
    pub exponential_backoff: bool,
    pub backoff_multiplier: f64,
}

impl RetryPolicy {
    /// Conservative policy for Jikan (60 req/min, 3 req/sec)
    pub fn jikan() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
            exponential_backoff: true,
            backoff_multiplier: 2.0,
        }
    }

    /// AniList degrades to 30 req/min under load
    pub fn anilist() -> Self {
        Self {
            max_retries: 4,
            base_delay: Duration::from_millis(700),
            max_delay: Duration::from_secs(60),
            exponential_backoff: true,
            backoff_multiplier: 1.5,
        }
    }

    pub fn kitsu() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            exponential_backoff: true,
            backoff_multiplier: 2.0,
        }
    }

    /// TMDB allows roughly 40 req/sec; retries are rarely needed
    pub fn tmdb() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(10),
            exponential_backoff: true,
            backoff_multiplier: 2.0,
        }
    }

    pub fn simkl() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            exponential_backoff: true,
            backoff_multiplier: 2.0,
        }
    }

    pub fn for_provider(provider: ProviderId) -> Self {
        match provider {
            ProviderId::AniList => Self::anilist(),
            ProviderId::Kitsu => Self::kitsu(),
            ProviderId::Jikan => Self::jikan(),
            ProviderId::Tmdb => Self::tmdb(),
            ProviderId::Simkl => Self::simkl(),
        }
    }

    /// Single attempt, used where a failure must surface immediately
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            exponential_backoff: false,
            backoff_multiplier: 1.0,
        }
    }

    /// Calculate delay for next retry attempt
    pub fn calculate_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        // Server-provided Retry-After wins
        if let Some(server_delay) = retry_after {
            return server_delay.min(self.max_delay);
        }

        let delay = if self.exponential_backoff {
            let multiplier = self.backoff_multiplier.powi(attempt as i32);
            Duration::from_millis((self.base_delay.as_millis() as f64 * multiplier) as u64)
        } else {
            self.base_delay
        };

        delay.min(self.max_delay)
    }
}

/// Information extracted from HTTP 429 responses
#[derive(Debug, Clone)]
pub struct RateLimitInfo {
    /// From the Retry-After header
    pub retry_after: Option<Duration>,
    /// From X-RateLimit-Reset (unix timestamp)
    pub reset_time: Option<Duration>,
    pub remaining: Option<u32>,
    pub limit: Option<u32>,
}

impl RateLimitInfo {
    /// Parse rate limit information from HTTP response headers
    pub fn from_headers(headers: &reqwest::header::HeaderMap) -> Self {
        let retry_after = headers
            .get("retry-after")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_secs);

        let reset_time = headers
            .get("x-ratelimit-reset")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .map(|timestamp| {
                let now = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs();
                Duration::from_secs(timestamp.saturating_sub(now))
            });

        let remaining = headers
            .get("x-ratelimit-remaining")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.parse::<u32>().ok());

        let limit = headers
            .get("x-ratelimit-limit")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.parse::<u32>().ok());

        Self {
            retry_after,
            reset_time,
            remaining,
            limit,
        }
    }

    /// Get the best delay recommendation from available information
    pub fn recommended_delay(&self) -> Option<Duration> {
        self.retry_after.or(self.reset_time)
    }
}

/// Whether an HTTP status is worth another attempt
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 425 | 429 | 500..=599)
}

/// Determines if a transport error is retryable
pub fn is_retryable_error(error: &reqwest::Error) -> bool {
    match error.status() {
        Some(status) => is_retryable_status(status.as_u16()),
        None => error.is_timeout() || error.is_connect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jikan_policy() {
        let policy = RetryPolicy::jikan();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.base_delay, Duration::from_secs(2));
        assert!(policy.exponential_backoff);
    }

    #[test]
    fn test_every_provider_has_a_policy() {
        for provider in ProviderId::ALL {
            let policy = RetryPolicy::for_provider(provider);
            assert!(policy.max_delay >= policy.base_delay);
        }
    }

    #[test]
    fn test_calculate_delay_with_retry_after() {
        let policy = RetryPolicy::jikan();
        let delay = policy.calculate_delay(1, Some(Duration::from_secs(30)));
        assert_eq!(delay, Duration::from_secs(30));
    }

    #[test]
    fn test_retry_after_is_capped() {
        let policy = RetryPolicy::tmdb();
        let delay = policy.calculate_delay(0, Some(Duration::from_secs(600)));
        assert_eq!(delay, policy.max_delay);
    }

    #[test]
    fn test_calculate_delay_exponential_backoff() {
        let policy = RetryPolicy::jikan();
        let delay1 = policy.calculate_delay(1, None);
        let delay2 = policy.calculate_delay(2, None);
        assert!(delay2 > delay1);
    }

    #[test]
    fn test_rate_limit_info_parsing() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("retry-after", "30".parse().unwrap());
        headers.insert("x-ratelimit-remaining", "0".parse().unwrap());
        headers.insert("x-ratelimit-limit", "90".parse().unwrap());

        let info = RateLimitInfo::from_headers(&headers);
        assert_eq!(info.retry_after, Some(Duration::from_secs(30)));
        assert_eq!(info.remaining, Some(0));
        assert_eq!(info.limit, Some(90));
        assert_eq!(info.recommended_delay(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable_status(429));
        assert!(is_retryable_status(503));
        assert!(!is_retryable_status(404));
        assert!(!is_retryable_status(401));
    }
}
