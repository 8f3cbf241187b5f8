//! Portal configuration
//!
//! Loaded from an optional YAML file, then overridden from environment
//! variables. Every field has a default so an empty file is valid.

use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::types::{BackoffType, ContentKind, FormKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Environment variable overriding `backend.base_url`
pub const ENV_BASE_URL: &str = "MADRASA_API_BASE_URL";
/// Environment variable overriding `server.port`
pub const ENV_PORT: &str = "MADRASA_PORT";
/// Environment variable overriding `submissions.fallback_dir`
pub const ENV_FALLBACK_DIR: &str = "MADRASA_FALLBACK_DIR";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete portal configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    pub pagination: PaginationSettings,
    pub search: SearchSettings,
    pub submissions: SubmissionSettings,
}

/// Listening address of the proxy server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Remote content backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Base URL every content and form path is joined onto
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub backoff: BackoffType,
    pub rate_limit: Option<RateLimiterConfig>,
    /// Headers sent with every backend request
    pub headers: HashMap<String, String>,
    /// Per-kind path overrides, e.g. `iftah: /fatwas`
    pub content_paths: BTreeMap<ContentKind, String>,
    /// Per-form path overrides
    pub form_paths: HashMap<FormKind, String>,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            timeout_secs: 15,
            max_retries: 2,
            backoff: BackoffType::Exponential,
            rate_limit: Some(RateLimiterConfig::default()),
            headers: HashMap::new(),
            content_paths: BTreeMap::new(),
            form_paths: HashMap::new(),
        }
    }
}

/// Page sizes used by list routes and the CLI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationSettings {
    pub page_size: u32,
    pub initial_page: u32,
    /// Upper bound on a browser-requested `limit`
    pub max_page_size: u32,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            page_size: 12,
            initial_page: 1,
            max_page_size: 100,
        }
    }
}

/// Federated search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Results requested from each source
    pub per_source_limit: u32,
    /// Filter name the backend expects the query under
    pub query_param: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            per_source_limit: 5,
            query_param: "search".to_string(),
        }
    }
}

/// Form submissions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionSettings {
    /// Directory holding submissions that could not be forwarded
    pub fallback_dir: PathBuf,
}

impl Default for SubmissionSettings {
    fn default() -> Self {
        Self {
            fallback_dir: PathBuf::from("data/submissions"),
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

impl PortalConfig {
    /// Load from an optional YAML file, apply environment overrides, validate
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    Error::config(format!(
                        "Failed to read config file '{}': {e}",
                        path.display()
                    ))
                })?;
                Self::from_yaml_str(&content)?
            }
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        debug!(base_url = %config.backend.base_url, "configuration loaded");
        Ok(config)
    }

    /// Parse YAML; an empty document yields the defaults
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply overrides from a variable lookup (normally the process environment)
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.backend.base_url = url.trim().to_string();
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| Error::invalid_value(ENV_PORT, format!("'{port}' is not a port")))?;
        }
        if let Some(dir) = lookup(ENV_FALLBACK_DIR).filter(|v| !v.trim().is_empty()) {
            self.submissions.fallback_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    /// Reject values the portal cannot run with
    pub fn validate(&self) -> Result<()> {
        let base = url::Url::parse(&self.backend.base_url)
            .map_err(|e| Error::invalid_value("backend.base_url", e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::invalid_value(
                "backend.base_url",
                format!("unsupported scheme '{}'", base.scheme()),
            ));
        }
        if self.pagination.page_size == 0 {
            return Err(Error::invalid_value("pagination.page_size", "must be at least 1"));
        }
        if self.pagination.max_page_size < self.pagination.page_size {
            return Err(Error::invalid_value(
                "pagination.max_page_size",
                "must not be smaller than pagination.page_size",
            ));
        }
        if self.search.per_source_limit == 0 {
            return Err(Error::invalid_value("search.per_source_limit", "must be at least 1"));
        }
        Ok(())
    }

    /// Backend path for a content kind
    pub fn content_path(&self, kind: ContentKind) -> &str {
        self.backend
            .content_paths
            .get(&kind)
            .map_or(kind.default_path(), String::as_str)
    }

    /// Backend path for a form
    pub fn form_path(&self, form: FormKind) -> &str {
        self.backend
            .form_paths
            .get(&form)
            .map_or(form.default_path(), String::as_str)
    }

    /// HTTP client settings for talking to the backend
    pub fn http_client_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .base_url(&self.backend.base_url)
            .timeout(Duration::from_secs(self.backend.timeout_secs.max(1)))
            .max_retries(self.backend.max_retries)
            .backoff(
                self.backend.backoff,
                Duration::from_millis(100),
                Duration::from_secs(5),
            );
        builder = match &self.backend.rate_limit {
            Some(limit) => builder.rate_limit(limit.clone()),
            None => builder.no_rate_limit(),
        };
        for (key, value) in &self.backend.headers {
            builder = builder.header(key, value);
        }
        builder.build()
    }

    /// Serialise the effective configuration
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
