//! Outbound HTTP to the content backend
//!
//! [`HttpClient`] retries transient failures with constant, linear or
//! exponential backoff. A governor token bucket ([`RateLimiter`]) is shared by
//! every call so a federated search cannot flood the backend.

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
