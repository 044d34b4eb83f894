//! HTTP client with per-provider rate limiting and retry logic
//!
//! Every adapter owns one of these; the governor quota is a minimum-interval
//! gate (burst of one) so calls to a catalog are spaced out, not batched.

use super::retry_policy::{is_retryable_error, is_retryable_status, RateLimitInfo, RetryPolicy};
use crate::shared::domain::ProviderId;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::logger::LogContext;
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::Value;
use std::num::NonZeroU32;
use std::time::{Duration, Instant};
use tokio::time::sleep;

type DirectRateLimiter = GovernorRateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
    governor::middleware::NoOpMiddleware,
>;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Rate-limited HTTP client for one catalog
pub struct RateLimitClient {
    client: Client,
    rate_limiter: DirectRateLimiter,
    retry_policy: RetryPolicy,
    provider: ProviderId,
    min_interval: Duration,
    default_headers: HeaderMap,
}

impl RateLimitClient {
    /// AniList: 30 req/min while degraded
    pub fn for_anilist(user_agent: &str) -> Self {
        Self::new(
            ProviderId::AniList,
            RetryPolicy::anilist(),
            Duration::from_millis(700),
            user_agent,
        )
        .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
    }

    pub fn for_kitsu(user_agent: &str) -> Self {
        Self::new(
            ProviderId::Kitsu,
            RetryPolicy::kitsu(),
            Duration::from_millis(250),
            user_agent,
        )
        .with_header(ACCEPT, HeaderValue::from_static("application/vnd.api+json"))
    }

    /// Jikan v4: 3 req/sec, 60 req/min
    pub fn for_jikan(user_agent: &str) -> Self {
        Self::new(
            ProviderId::Jikan,
            RetryPolicy::jikan(),
            Duration::from_millis(400),
            user_agent,
        )
    }

    pub fn for_tmdb(user_agent: &str) -> Self {
        Self::new(
            ProviderId::Tmdb,
            RetryPolicy::tmdb(),
            Duration::from_millis(100),
            user_agent,
        )
    }

    pub fn for_simkl(user_agent: &str, client_id: &str) -> AppResult<Self> {
        let client_id = HeaderValue::from_str(client_id)
            .map_err(|e| AppError::ConfigError(format!("Invalid Simkl client id: {}", e)))?;

        Ok(Self::new(
            ProviderId::Simkl,
            RetryPolicy::simkl(),
            Duration::from_millis(300),
            user_agent,
        )
        .with_header("simkl-api-key", client_id))
    }

    /// Create a custom client
    pub fn new(
        provider: ProviderId,
        retry_policy: RetryPolicy,
        min_interval: Duration,
        user_agent: &str,
    ) -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Ok(agent) = HeaderValue::from_str(user_agent) {
            default_headers.insert(USER_AGENT, agent);
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                log::warn!("{}: falling back to default HTTP client: {}", provider, e);
                Client::new()
            });

        Self {
            client,
            rate_limiter: Self::create_rate_limiter(min_interval),
            retry_policy,
            provider,
            min_interval,
            default_headers,
        }
    }

    /// Quota allowing one request per `min_interval`
    fn create_rate_limiter(min_interval: Duration) -> DirectRateLimiter {
        let quota = Quota::with_period(min_interval)
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::MIN))
            .allow_burst(NonZeroU32::MIN);

        GovernorRateLimiter::direct(quota)
    }

    pub fn with_header<K>(mut self, name: K, value: HeaderValue) -> Self
    where
        K: reqwest::header::IntoHeaderName,
    {
        self.default_headers.insert(name, value);
        self
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// GET and decode JSON
    pub async fn get<T>(&self, url: &str) -> AppResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.request_with_retries(Method::GET, url, None, None).await
    }

    /// GET with extra per-request headers (bearer tokens)
    pub async fn get_with_headers<T>(&self, url: &str, headers: HeaderMap) -> AppResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.request_with_retries(Method::GET, url, None, Some(headers))
            .await
    }

    /// POST a JSON body
    pub async fn post_json<T>(&self, url: &str, body: &Value) -> AppResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.request_with_retries(Method::POST, url, Some(body), None)
            .await
    }

    async fn request_with_retries<T>(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        extra_headers: Option<HeaderMap>,
    ) -> AppResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let attempts = self.retry_policy.max_retries + 1;
        let endpoint = Self::endpoint_for_log(url);

        for attempt in 0..attempts {
            self.rate_limiter.until_ready().await;

            let started = Instant::now();
            LogContext::api_call(self.provider, &endpoint, "started", None);

            let response = match self
                .build_and_send_request(&method, url, body, extra_headers.as_ref())
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    if is_retryable_error(&e) && attempt + 1 < attempts {
                        let delay = self.retry_policy.calculate_delay(attempt, None);
                        log::warn!(
                            "{} request failed (attempt {}/{}): {}. Retrying in {:?}",
                            self.provider,
                            attempt + 1,
                            attempts,
                            e,
                            delay
                        );
                        sleep(delay).await;
                        continue;
                    }
                    return Err(AppError::from(e));
                }
            };

            let status = response.status();
            LogContext::api_call(
                self.provider,
                &endpoint,
                status.as_str(),
                Some(started.elapsed().as_millis() as u64),
            );

            if status.is_success() {
                return self.parse_response(response).await;
            }

            if is_retryable_status(status.as_u16()) && attempt + 1 < attempts {
                let info = RateLimitInfo::from_headers(response.headers());
                let delay = self.calculate_retry_delay(attempt, status, &info);
                log::warn!(
                    "{} returned {} (attempt {}/{}). Waiting {:?} before retry.",
                    self.provider,
                    status,
                    attempt + 1,
                    attempts,
                    delay
                );
                sleep(delay).await;
                continue;
            }

            return Err(status_error(self.provider, status, attempts));
        }

        Err(AppError::TransientNetwork(format!(
            "{} request failed after {} attempts",
            self.provider, attempts
        )))
    }

    async fn build_and_send_request(
        &self,
        method: &Method,
        url: &str,
        body: Option<&Value>,
        extra_headers: Option<&HeaderMap>,
    ) -> Result<Response, reqwest::Error> {
        let mut request_builder = self
            .client
            .request(method.clone(), url)
            .headers(self.default_headers.clone());

        if let Some(headers) = extra_headers {
            request_builder = request_builder.headers(headers.clone());
        }

        if let Some(json_body) = body {
            request_builder = request_builder.json(json_body);
        }

        request_builder.send().await
    }

    async fn parse_response<T>(&self, response: Response) -> AppResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let response_text = response.text().await.map_err(|e| {
            AppError::TransientNetwork(format!("Failed to read {} response: {}", self.provider, e))
        })?;

        serde_json::from_str(&response_text).map_err(|e| {
            AppError::SerializationError(format!(
                "Failed to parse {} response: {}. Response: {}",
                self.provider,
                e,
                truncate(&response_text, 200)
            ))
        })
    }

    fn calculate_retry_delay(
        &self,
        attempt: u32,
        status: StatusCode,
        rate_limit_info: &RateLimitInfo,
    ) -> Duration {
        if status == StatusCode::TOO_MANY_REQUESTS {
            if let Some(server_delay) = rate_limit_info.recommended_delay() {
                return server_delay.min(self.retry_policy.max_delay);
            }
        }

        self.retry_policy.calculate_delay(attempt, None)
    }

    /// Strip query strings so API keys never reach the log
    fn endpoint_for_log(url: &str) -> String {
        url.split('?').next().unwrap_or(url).to_string()
    }

    /// Check if a request can be made now (for testing/debugging)
    pub fn can_make_request_now(&self) -> bool {
        self.rate_limiter.check().is_ok()
    }

    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

/// Map a final non-success status to the error taxonomy
pub fn status_error(provider: ProviderId, status: StatusCode, attempts: u32) -> AppError {
    match status.as_u16() {
        404 => AppError::NotFound(format!("{} resource not found", provider)),
        401 | 403 => AppError::Unauthorized(format!("{} rejected credentials ({})", provider, status)),
        429 => AppError::RateLimited(format!(
            "{} rate limit exceeded after {} attempts",
            provider, attempts
        )),
        408 | 500..=599 => AppError::TransientNetwork(format!("{} returned {}", provider, status)),
        _ => AppError::ApiError(format!("{} returned error: {}", provider, status)),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}
