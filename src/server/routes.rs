//! HTTP proxy routes between the browser and the content backend

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::api::ContentApi;
use crate::config::PortalConfig;
use crate::error::{Error, Result};
use crate::notify::{SharedNotifier, TracingNotifier};
use crate::pagination::{reconcile, ListParams, PaginationMeta};
use crate::search::SearchService;
use crate::submissions::{SubmissionOutcome, SubmissionService, SubmissionStore};
use crate::types::{ContentKind, FormKind, JsonValue};

/// State shared across handlers
#[derive(Debug, Clone)]
pub struct AppState {
    config: Arc<PortalConfig>,
    api: ContentApi,
    search: SearchService,
    submissions: SubmissionService,
}

impl AppState {
    /// Wire the services for a configuration, opening the fallback store
    pub fn new(config: Arc<PortalConfig>) -> Result<Self> {
        let api = ContentApi::new(config.clone())?;
        let store = Arc::new(SubmissionStore::open(&config.submissions.fallback_dir)?);
        let notifier: SharedNotifier = Arc::new(TracingNotifier);
        let submissions = SubmissionService::new(api.clone(), store).with_notifier(notifier);

        Ok(Self {
            search: SearchService::new(api.clone()),
            config,
            api,
            submissions,
        })
    }

    pub fn submissions(&self) -> &SubmissionService {
        &self.submissions
    }
}

/// Response wrapper
#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pagination: Option<PaginationMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            pagination: None,
            error: None,
        }
    }

    fn page(data: T, pagination: PaginationMeta) -> Self {
        Self {
            success: true,
            data: Some(data),
            pagination: Some(pagination),
            error: None,
        }
    }

    fn error(msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            pagination: None,
            error: Some(msg.into()),
        }
    }
}

fn error_response(err: &Error) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ApiResponse::<()>::error(err.to_string()))).into_response()
}

/// Build the router with permissive CORS and request tracing
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/content/:kind", get(list_content))
        .route("/api/content/:kind/:id", get(get_content))
        .route("/api/search", get(search))
        .route("/api/forms/:form", post(submit_form))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Start the HTTP server on the configured address
pub async fn serve(config: Arc<PortalConfig>) -> Result<()> {
    let host = config.server.host.clone();
    let port = config.server.port;
    let app = router(AppState::new(config)?);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .map_err(|e| Error::config(format!("Failed to bind to {host}:{port}: {e}")))?;
    info!("Starting HTTP server on http://{host}:{port}");

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": crate::VERSION }))
}

/// One page of a content list, with reconciled pagination
async fn list_content(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
) -> Response {
    let kind: ContentKind = match kind.parse() {
        Ok(kind) => kind,
        Err(e) => return error_response(&e),
    };

    let settings = &state.config.pagination;
    let mut params = ListParams::from_query(query, settings.page_size);
    params.limit = params.limit.min(settings.max_page_size);
    debug!(%kind, page = params.page, limit = params.limit, "proxying content list");

    let envelope = match state.api.list(kind, &params).await {
        Ok(envelope) => envelope,
        Err(e) => return error_response(&e),
    };
    if !envelope.is_success() {
        return (
            StatusCode::BAD_GATEWAY,
            Json(ApiResponse::<()>::error(envelope.failure_message())),
        )
            .into_response();
    }

    let (items, meta) = envelope.into_parts();
    let page = reconcile(params.page, params.limit, items, meta.as_ref());
    let pagination = page.meta();
    (StatusCode::OK, Json(ApiResponse::page(page.items, pagination))).into_response()
}

/// A single content item
async fn get_content(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, String)>,
) -> Response {
    let kind: ContentKind = match kind.parse() {
        Ok(kind) => kind,
        Err(e) => return error_response(&e),
    };

    match state.api.get(kind, &id).await {
        Ok(item) => (StatusCode::OK, Json(ApiResponse::success(item))).into_response(),
        Err(e) => error_response(&e),
    }
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
    limit: Option<u32>,
}

/// Federated search over every searchable kind
async fn search(State(state): State<Arc<AppState>>, Query(query): Query<SearchQuery>) -> Response {
    let limit = query
        .limit
        .map(|limit| limit.min(state.config.pagination.max_page_size));
    let results = state.search.search(&query.q, limit).await;
    (StatusCode::OK, Json(ApiResponse::success(results))).into_response()
}

/// Form submission; 202 when the backend was down and it was stored locally
async fn submit_form(
    State(state): State<Arc<AppState>>,
    Path(form): Path<String>,
    Json(payload): Json<JsonValue>,
) -> Response {
    let form: FormKind = match form.parse() {
        Ok(form) => form,
        Err(e) => return error_response(&e),
    };

    match state.submissions.submit(form, payload).await {
        Ok(outcome) => {
            let status = match outcome {
                SubmissionOutcome::Forwarded { .. } => StatusCode::OK,
                SubmissionOutcome::StoredLocally { .. } => StatusCode::ACCEPTED,
            };
            (status, Json(ApiResponse::success(outcome))).into_response()
        }
        Err(e) => error_response(&e),
    }
}
