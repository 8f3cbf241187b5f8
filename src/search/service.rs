//! Federated search across content kinds

use crate::api::ContentApi;
use crate::pagination::ListParams;
use crate::types::{ContentKind, JsonValue};
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

/// Kinds queried by a federated search, in result order
pub const SEARCH_SOURCES: [ContentKind; 7] = [
    ContentKind::Articles,
    ContentKind::Courses,
    ContentKind::Books,
    ContentKind::Authors,
    ContentKind::Events,
    ContentKind::Iftah,
    ContentKind::Blogs,
];

/// Hits from one source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceResults {
    pub kind: ContentKind,
    pub items: Vec<JsonValue>,
    /// Total matches the backend reported, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// Why this source contributed nothing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SourceResults {
    fn failed(kind: ContentKind, error: String) -> Self {
        Self {
            kind,
            items: Vec::new(),
            total: None,
            error: Some(error),
        }
    }
}

/// Grouped results of one federated search
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub sources: Vec<SourceResults>,
}

impl SearchResults {
    /// Number of hits over all sources
    pub fn total_hits(&self) -> usize {
        self.sources.iter().map(|s| s.items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_hits() == 0
    }

    /// Results for one kind
    pub fn source(&self, kind: ContentKind) -> Option<&SourceResults> {
        self.sources.iter().find(|s| s.kind == kind)
    }

    /// Kinds whose request failed
    pub fn failed_sources(&self) -> Vec<ContentKind> {
        self.sources
            .iter()
            .filter(|s| s.error.is_some())
            .map(|s| s.kind)
            .collect()
    }
}

/// Scatter/gather search over the content backend
#[derive(Debug, Clone)]
pub struct SearchService {
    api: ContentApi,
}

impl SearchService {
    pub fn new(api: ContentApi) -> Self {
        Self { api }
    }

    /// Query every source concurrently.
    ///
    /// A failing source is recorded in its [`SourceResults::error`]; it never
    /// fails the search. A blank query returns no sources and sends nothing.
    pub async fn search(&self, query: &str, limit: Option<u32>) -> SearchResults {
        let query = query.trim();
        if query.is_empty() {
            return SearchResults::default();
        }

        let settings = &self.api.config().search;
        let limit = limit
            .filter(|l| *l > 0)
            .unwrap_or(settings.per_source_limit);
        let params = ListParams::new(1, limit).with_filter(settings.query_param.clone(), query);
        debug!(query, limit, "federated search");

        let requests = SEARCH_SOURCES.iter().map(|&kind| {
            let params = &params;
            async move {
                match self.api.list(kind, params).await {
                    Ok(envelope) if envelope.is_success() => {
                        let (mut items, meta) = envelope.into_parts();
                        items.truncate(limit as usize);
                        SourceResults {
                            kind,
                            items,
                            total: meta.and_then(|m| m.total),
                            error: None,
                        }
                    }
                    Ok(envelope) => {
                        let message = envelope.failure_message();
                        warn!(%kind, %message, "search source refused");
                        SourceResults::failed(kind, message)
                    }
                    Err(e) => {
                        warn!(%kind, error = %e, "search source failed");
                        SourceResults::failed(kind, e.to_string())
                    }
                }
            }
        });

        SearchResults {
            query: query.to_string(),
            sources: join_all(requests).await,
        }
    }
}
