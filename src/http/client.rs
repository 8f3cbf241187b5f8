//! Outbound client for the content backend
//!
//! Every call goes through the shared rate limiter and is retried on
//! transient failures (5xx, 429, timeouts, refused connections) with the
//! configured backoff. Error responses keep their body so callers can read a
//! backend envelope out of a refusal.

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::error::{Error, Result};
use crate::types::BackoffType;
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Longest `Retry-After` the portal honours; a browser is waiting behind it
const MAX_RETRY_AFTER_SECS: u64 = 10;

/// Settings for the backend client, usually derived from `PortalConfig`
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Backend root; relative paths are joined onto it
    pub base_url: Option<String>,
    pub timeout: Duration,
    /// Extra attempts after the first one
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub backoff_type: BackoffType,
    /// `None` disables the shared limiter
    pub rate_limit: Option<RateLimiterConfig>,
    /// Sent with every request, e.g. `Accept-Language`
    pub default_headers: HashMap<String, String>,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(15),
            max_retries: 2,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(5),
            backoff_type: BackoffType::Exponential,
            rate_limit: Some(RateLimiterConfig::default()),
            default_headers: HashMap::new(),
            user_agent: format!("madrasa-portal/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for [`HttpClientConfig`]
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Backoff strategy and its bounds
    pub fn backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.config.backoff_type = backoff_type;
        self.config.initial_backoff = initial;
        self.config.max_backoff = max;
        self
    }

    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    /// Add a header sent with every backend request
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Query string and body of one backend call
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Sent in insertion order
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RequestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn queries(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    /// Send `body` as JSON
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// How a single attempt ended
enum Attempt {
    Answered(Response),
    Retry { error: Error, wait: Duration },
    Failed(Error),
}

/// Rate-limited, retrying client for the content backend
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;
        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// GET without query parameters
    pub async fn get(&self, path: &str) -> Result<Response> {
        self.send(Method::GET, path, &RequestConfig::default()).await
    }

    /// GET and decode the body as JSON
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        request: &RequestConfig,
    ) -> Result<T> {
        let response = self.send(Method::GET, path, request).await?;
        Ok(response.json().await?)
    }

    /// Send a request, retrying transient failures.
    ///
    /// Any 4xx or 5xx left after the retries becomes [`Error::HttpStatus`]
    /// carrying the response body.
    pub async fn send(&self, method: Method, path: &str, request: &RequestConfig) -> Result<Response> {
        let url = self.build_url(path);
        let attempts = self.config.max_retries.saturating_add(1);
        let mut attempt = 1;

        loop {
            if let Some(limiter) = &self.rate_limiter {
                limiter.wait().await;
            }

            let outcome = self.prepare(method.clone(), &url, request).send().await;
            match self.judge(outcome, attempt, attempt < attempts).await {
                Attempt::Answered(response) => {
                    debug!(%method, %url, attempt, status = response.status().as_u16(), "backend answered");
                    return Ok(response);
                }
                Attempt::Retry { error, wait } => {
                    warn!(%method, %url, attempt, attempts, ?wait, %error, "backend call failed, retrying");
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Attempt::Failed(error) => return Err(error),
            }
        }
    }

    fn prepare(&self, method: Method, url: &str, request: &RequestConfig) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, url).timeout(self.config.timeout);
        for (key, value) in &self.config.default_headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        builder
    }

    /// Classify one attempt; `attempt` counts from 1
    async fn judge(
        &self,
        outcome: reqwest::Result<Response>,
        attempt: u32,
        may_retry: bool,
    ) -> Attempt {
        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                let error = if e.is_timeout() {
                    Error::Timeout {
                        timeout_ms: u64::try_from(self.config.timeout.as_millis()).unwrap_or(u64::MAX),
                    }
                } else {
                    Error::Http(e)
                };
                let transient = matches!(&error, Error::Timeout { .. })
                    || matches!(&error, Error::Http(e) if e.is_connect());
                return if transient && may_retry {
                    Attempt::Retry {
                        error,
                        wait: self.calculate_backoff(attempt - 1),
                    }
                } else {
                    Attempt::Failed(error)
                };
            }
        };

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = retry_after_secs(&response);
            return if may_retry {
                Attempt::Retry {
                    error: Error::RateLimited {
                        retry_after_seconds: retry_after,
                    },
                    wait: Duration::from_secs(retry_after),
                }
            } else {
                Attempt::Failed(Error::RateLimited {
                    retry_after_seconds: retry_after,
                })
            };
        }

        if !(status.is_client_error() || status.is_server_error()) {
            return Attempt::Answered(response);
        }

        let error = Error::http_status(status.as_u16(), response.text().await.unwrap_or_default());
        if may_retry && error.is_retryable() {
            Attempt::Retry {
                error,
                wait: self.calculate_backoff(attempt - 1),
            }
        } else {
            Attempt::Failed(error)
        }
    }

    /// Join `path` onto the backend root; absolute URLs pass through
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        match &self.config.base_url {
            Some(base) => format!(
                "{}/{}",
                base.trim_end_matches('/'),
                path.trim_start_matches('/')
            ),
            None => path.to_string(),
        }
    }

    /// Delay before retry number `retry + 1`, capped at `max_backoff`
    pub fn calculate_backoff(&self, retry: u32) -> Duration {
        let initial = self.config.initial_backoff;
        let delay = match self.config.backoff_type {
            BackoffType::Constant => initial,
            BackoffType::Linear => initial.saturating_mul(retry.saturating_add(1)),
            BackoffType::Exponential => initial.saturating_mul(2u32.saturating_pow(retry)),
        };
        delay.min(self.config.max_backoff)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.config.base_url)
            .field("max_retries", &self.config.max_retries)
            .field("rate_limited", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Seconds from a `Retry-After` header; 1 when absent or not a number
fn retry_after_secs(response: &Response) -> u64 {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(1)
        .min(MAX_RETRY_AFTER_SECS)
}
