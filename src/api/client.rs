//! Content backend client
//!
//! Every route and CLI command reaches the remote content API through
//! [`ContentApi`]. List calls come back as an [`Envelope`] whatever shape the
//! backend used.

use crate::config::PortalConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::pagination::{Envelope, Fetcher, ListParams, GENERIC_FAILURE_MESSAGE};
use crate::types::{ContentKind, FormKind, JsonValue};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

/// Client for the remote content backend
#[derive(Debug, Clone)]
pub struct ContentApi {
    client: HttpClient,
    config: Arc<PortalConfig>,
}

impl ContentApi {
    /// Build a client from the portal configuration
    pub fn new(config: Arc<PortalConfig>) -> Result<Self> {
        let client = HttpClient::with_config(config.http_client_config())?;
        Ok(Self { client, config })
    }

    /// Use an existing HTTP client
    pub fn with_client(client: HttpClient, config: Arc<PortalConfig>) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    /// Fetch one page of a content list
    pub async fn list(&self, kind: ContentKind, params: &ListParams) -> Result<Envelope<JsonValue>> {
        let path = self.config.content_path(kind);
        debug!(%kind, page = params.page, limit = params.limit, "listing content");

        let request = RequestConfig::new().queries(params.to_query());
        match self.client.get_json::<JsonValue>(path, &request).await {
            Ok(body) => Envelope::from_json(body),
            Err(Error::HttpStatus { status, body }) if (400..500).contains(&status) => {
                // A refusal explained in an envelope is a logical failure, not a transport one.
                match serde_json::from_str::<JsonValue>(&body) {
                    Ok(value @ JsonValue::Object(_)) => {
                        let mut envelope = Envelope::from_json(value)?;
                        envelope.success = false;
                        Ok(envelope)
                    }
                    _ => Err(Error::HttpStatus { status, body }),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Fetch a single item; `{data: {...}}` bodies are unwrapped
    pub async fn get(&self, kind: ContentKind, id: &str) -> Result<JsonValue> {
        validate_id(id)?;
        let path = format!("{}/{}", self.config.content_path(kind).trim_end_matches('/'), id);

        let body: JsonValue = self
            .client
            .get_json(&path, &RequestConfig::default())
            .await
            .map_err(|e| match e {
                Error::HttpStatus { status: 404, .. } => Error::NotFound {
                    resource: format!("{kind} '{id}'"),
                },
                other => other,
            })?;

        check_success(&body)?;
        Ok(match body {
            JsonValue::Object(mut map) if map.get("data").is_some_and(JsonValue::is_object) => {
                map.remove("data").unwrap_or(JsonValue::Null)
            }
            other => other,
        })
    }

    /// Forward a form submission; returns the backend's response body
    pub async fn submit(&self, form: FormKind, payload: &JsonValue) -> Result<JsonValue> {
        let path = self.config.form_path(form);
        debug!(%form, "forwarding form submission");

        let response = self
            .client
            .send(Method::POST, path, &RequestConfig::new().json(payload.clone()))
            .await?;
        let text = response.text().await?;

        let body = if text.trim().is_empty() {
            json!({ "success": true })
        } else {
            serde_json::from_str(&text).map_err(|e| {
                warn!(%form, "backend answered a submission with non-JSON body");
                Error::decode(format!("submission response: {e}"))
            })?
        };

        check_success(&body)?;
        Ok(body)
    }

    /// A fetcher paging through one content kind
    pub fn fetcher(&self, kind: ContentKind) -> ContentFetcher {
        ContentFetcher {
            api: self.clone(),
            kind,
        }
    }
}

/// [`Fetcher`] over one content kind of a [`ContentApi`]
#[derive(Debug, Clone)]
pub struct ContentFetcher {
    api: ContentApi,
    kind: ContentKind,
}

impl ContentFetcher {
    pub fn kind(&self) -> ContentKind {
        self.kind
    }
}

#[async_trait]
impl Fetcher<JsonValue> for ContentFetcher {
    async fn fetch(&self, params: &ListParams) -> Result<Envelope<JsonValue>> {
        self.api.list(self.kind, params).await
    }
}

/// Turn a `success: false` body into an error
fn check_success(body: &JsonValue) -> Result<()> {
    if body.get("success").and_then(JsonValue::as_bool) == Some(false) {
        let message = ["error", "message"]
            .iter()
            .filter_map(|key| body.get(*key).and_then(JsonValue::as_str))
            .find(|s| !s.trim().is_empty())
            .unwrap_or(GENERIC_FAILURE_MESSAGE);
        return Err(Error::backend(message));
    }
    Ok(())
}

/// Ids are single path segments
fn validate_id(id: &str) -> Result<()> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && id != "."
        && id != "..";
    if valid {
        Ok(())
    } else {
        Err(Error::NotFound {
            resource: format!("item '{id}'"),
        })
    }
}
