//! Tests for pagination module

use super::*;
use crate::error::{Error, Result};
use crate::notify::testing::RecordingNotifier;
use crate::types::LogLevel;
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use test_case::test_case;

// ============================================================================
// Test Fetchers
// ============================================================================

/// Replays queued responses, recording every request
#[derive(Default)]
struct ScriptedFetcher {
    responses: Mutex<VecDeque<Result<Envelope<u32>>>>,
    requests: Mutex<Vec<ListParams>>,
    calls: AtomicUsize,
    /// Times to yield before answering, to keep a fetch outstanding
    yields: usize,
}

impl ScriptedFetcher {
    fn new(responses: Vec<Result<Envelope<u32>>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            yields: 3,
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn requested_pages(&self) -> Vec<u32> {
        self.requests.lock().unwrap().iter().map(|p| p.page).collect()
    }
}

#[async_trait]
impl Fetcher<u32> for Arc<ScriptedFetcher> {
    async fn fetch(&self, params: &ListParams) -> Result<Envelope<u32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(params.clone());
        for _ in 0..self.yields {
            tokio::task::yield_now().await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Envelope::ok(Vec::new())))
    }
}

/// Serves a fixed dataset with honest pagination metadata
struct DatasetFetcher {
    items: Vec<u32>,
    calls: AtomicUsize,
}

impl DatasetFetcher {
    fn new(len: u32) -> Self {
        Self {
            items: (1..=len).collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Fetcher<u32> for Arc<DatasetFetcher> {
    async fn fetch(&self, params: &ListParams) -> Result<Envelope<u32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        let start = (params.page as usize - 1).saturating_mul(params.limit as usize);
        let page: Vec<u32> = self
            .items
            .iter()
            .skip(start)
            .take(params.limit as usize)
            .copied()
            .collect();
        Ok(Envelope::ok_with(
            page,
            PaginationMeta {
                current_page: Some(u64::from(params.page)),
                per_page: Some(u64::from(params.limit)),
                total: Some(self.items.len() as u64),
                ..PaginationMeta::default()
            },
        ))
    }
}

fn range(from: u32, to: u32) -> Vec<u32> {
    (from..to).collect()
}

fn meta(total: Option<u64>, total_pages: Option<u64>) -> PaginationMeta {
    PaginationMeta {
        total,
        total_pages,
        ..PaginationMeta::default()
    }
}

// ============================================================================
// ListParams Tests
// ============================================================================

#[test]
fn test_list_params_clamps_to_one() {
    let params = ListParams::new(0, 0);
    assert_eq!(params.page, 1);
    assert_eq!(params.limit, 1);
}

#[test]
fn test_list_params_to_query_order() {
    let params = ListParams::new(2, 12)
        .with_filter("category", "fiqh")
        .with_filter("author", "7");

    assert_eq!(
        params.to_query(),
        vec![
            ("page".to_string(), "2".to_string()),
            ("limit".to_string(), "12".to_string()),
            ("author".to_string(), "7".to_string()),
            ("category".to_string(), "fiqh".to_string()),
        ]
    );
}

#[test]
fn test_list_params_from_query() {
    let params = ListParams::from_query(
        vec![("page", "3"), ("limit", "abc"), ("search", "salah")],
        12,
    );
    assert_eq!(params.page, 3);
    assert_eq!(params.limit, 12);
    assert_eq!(params.filters.get("search"), Some(&"salah".to_string()));

    let params = ListParams::from_query(vec![("page", "-4"), ("per_page", "5")], 12);
    assert_eq!(params.page, 1);
    assert_eq!(params.limit, 5);
}

// ============================================================================
// Wire Format Tests
// ============================================================================

#[test]
fn test_pagination_meta_lenient_numbers() {
    let meta: PaginationMeta = serde_json::from_value(json!({
        "current_page": "2",
        "per_page": 12.0,
        "total": -3,
        "total_pages": "many",
        "has_next_page": "true",
        "has_prev_page": null
    }))
    .unwrap();

    assert_eq!(meta.current_page, Some(2));
    assert_eq!(meta.per_page, Some(12));
    assert_eq!(meta.total, None);
    assert_eq!(meta.total_pages, None);
    assert_eq!(meta.has_next_page, Some(true));
    assert_eq!(meta.has_prev_page, None);
}

#[test]
fn test_envelope_accepts_bare_array_data() {
    let envelope: Envelope<u32> = Envelope::from_json(json!({
        "success": true,
        "data": [1, 2, 3],
        "pagination": {"total": 3}
    }))
    .unwrap();

    let (items, meta) = envelope.into_parts();
    assert_eq!(items, vec![1, 2, 3]);
    assert_eq!(meta.unwrap().total, Some(3));
}

#[test]
fn test_envelope_unwraps_one_level_of_data() {
    let envelope: Envelope<u32> = Envelope::from_json(json!({
        "success": true,
        "data": {"data": [4, 5], "pagination": {"total_pages": 9}}
    }))
    .unwrap();

    let (items, meta) = envelope.into_parts();
    assert_eq!(items, vec![4, 5]);
    assert_eq!(meta.unwrap().total_pages, Some(9));
}

#[test]
fn test_envelope_top_level_pagination_wins() {
    let envelope: Envelope<u32> = Envelope::from_json(json!({
        "data": {"data": [1], "pagination": {"total": 99}},
        "pagination": {"total": 1}
    }))
    .unwrap();

    assert!(envelope.is_success());
    assert_eq!(envelope.into_parts().1.unwrap().total, Some(1));
}

#[test]
fn test_envelope_from_bare_array_body() {
    let envelope: Envelope<u32> = Envelope::from_json(json!([7, 8])).unwrap();
    assert!(envelope.is_success());
    assert_eq!(envelope.into_parts().0, vec![7, 8]);
}

#[test]
fn test_envelope_failure_message_fallbacks() {
    let envelope: Envelope<u32> =
        Envelope::from_json(json!({"success": false, "message": "Books are offline"})).unwrap();
    assert!(!envelope.is_success());
    assert_eq!(envelope.failure_message(), "Books are offline");

    let envelope: Envelope<u32> =
        Envelope::from_json(json!({"success": false, "error": "  ", "data": {"x": 1}})).unwrap();
    assert_eq!(envelope.failure_message(), GENERIC_FAILURE_MESSAGE);
}

#[test]
fn test_envelope_items_need_no_default() {
    #[derive(Debug, PartialEq, serde::Deserialize)]
    struct Lesson {
        title: String,
    }

    let envelope: Envelope<Lesson> = Envelope::from_json(json!({
        "data": [{"title": "Tajweed I"}]
    }))
    .unwrap();

    assert_eq!(
        envelope.into_parts().0,
        vec![Lesson {
            title: "Tajweed I".to_string()
        }]
    );
}

#[test]
fn test_envelope_rejects_scalar_body() {
    let result = Envelope::<u32>::from_json(json!("maintenance"));
    assert!(matches!(result, Err(Error::Decode { .. })));
}

// ============================================================================
// Reconciliation Tests
// ============================================================================

#[test_case(-5.0, 1 ; "negative")]
#[test_case(0.0, 1 ; "zero")]
#[test_case(2.7, 2 ; "fraction floors")]
#[test_case(f64::NAN, 1 ; "nan")]
#[test_case(f64::INFINITY, 1 ; "infinity")]
#[test_case(f64::NEG_INFINITY, 1 ; "negative infinity")]
#[test_case(7.0, 7 ; "in range")]
fn test_clamp_page(input: f64, expected: u32) {
    assert_eq!(clamp_page(input), expected);
}

#[test]
fn test_reconcile_total_without_total_pages() {
    let meta = PaginationMeta {
        current_page: Some(1),
        per_page: Some(12),
        total: Some(37),
        ..PaginationMeta::default()
    };
    let page = reconcile(1, 12, range(1, 13), Some(&meta));

    assert_eq!(page.page, 1);
    assert_eq!(page.total_pages, 4);
    assert!(page.has_next_page);
    assert!(!page.has_previous_page);
    assert_eq!(page.items.len(), 12);
    assert_eq!(page.total_items, Some(37));
}

#[test]
fn test_reconcile_short_page_without_metadata() {
    let page = reconcile(1, 12, range(1, 6), None);

    assert!(!page.has_next_page);
    assert_eq!(page.total_pages, 1);
    assert_eq!(page.total_items, Some(5));
}

#[test]
fn test_reconcile_full_page_heuristic_guesses_one_more() {
    // Documented heuristic: a full page without totals implies another page may exist.
    let page = reconcile(2, 10, range(0, 10), None);

    assert!(page.has_next_page);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.total_items, None);
}

#[test]
fn test_reconcile_over_fetch_slices_window() {
    let raw = range(0, 50);
    let page = reconcile(3, 10, raw.clone(), None);

    assert_eq!(page.items, raw[20..30].to_vec());
    assert_eq!(page.total_pages, 5);
    assert_eq!(page.total_items, Some(50));
    assert_eq!(page.page, 3);
    assert!(page.has_next_page);
    assert!(page.has_previous_page);
}

#[test]
fn test_reconcile_over_fetch_past_the_end_clamps() {
    let page = reconcile(9, 10, range(0, 45), None);

    assert_eq!(page.page, 5);
    assert_eq!(page.items, range(40, 45));
    assert!(!page.has_next_page);
}

#[test]
fn test_reconcile_over_fetch_ignores_foreign_page_count() {
    // The backend counted everything as one page of its own size.
    let page = reconcile(2, 10, range(0, 30), Some(&meta(Some(30), Some(1))));

    assert_eq!(page.total_pages, 3);
    assert_eq!(page.items, range(10, 20));
}

#[test]
fn test_reconcile_total_pages_only() {
    let page = reconcile(2, 10, range(0, 10), Some(&meta(None, Some(6))));

    assert_eq!(page.total_pages, 6);
    assert_eq!(page.total_items, Some(60));
    assert!(page.has_next_page);
    assert!(page.has_previous_page);
}

#[test]
fn test_reconcile_prefers_backend_per_page() {
    let meta = PaginationMeta {
        per_page: Some(5),
        ..PaginationMeta::default()
    };
    let page = reconcile(1, 12, range(0, 5), Some(&meta));

    assert_eq!(page.per_page, 5);
    assert!(page.has_next_page, "a full page of the backend's size");
}

#[test]
fn test_reconcile_zero_per_page_falls_back() {
    let meta = PaginationMeta {
        per_page: Some(0),
        total: Some(24),
        ..PaginationMeta::default()
    };
    let page = reconcile(1, 12, range(0, 12), Some(&meta));

    assert_eq!(page.per_page, 12);
    assert_eq!(page.total_pages, 2);
}

#[test]
fn test_reconcile_trusts_backend_current_page() {
    // Asked for page 5, backend silently answered with page 1.
    let meta = PaginationMeta {
        current_page: Some(1),
        total_pages: Some(8),
        ..PaginationMeta::default()
    };
    let page = reconcile(5, 10, range(0, 10), Some(&meta));

    assert_eq!(page.page, 1);
    assert!(!page.has_previous_page);
}

#[test]
fn test_reconcile_extends_under_reported_total_pages() {
    let meta = PaginationMeta {
        current_page: Some(4),
        total_pages: Some(2),
        has_next_page: Some(true),
        ..PaginationMeta::default()
    };
    let page = reconcile(4, 10, range(0, 10), Some(&meta));

    assert_eq!(page.page, 4);
    assert_eq!(page.total_pages, 5);
    assert!(page.has_next_page);
}

#[test]
fn test_reconcile_ignores_backend_flags_once_total_known() {
    let meta = PaginationMeta {
        total_pages: Some(3),
        has_next_page: Some(false),
        has_prev_page: Some(true),
        ..PaginationMeta::default()
    };
    let page = reconcile(1, 10, range(0, 10), Some(&meta));

    assert!(page.has_next_page);
    assert!(!page.has_previous_page);
}

#[test]
fn test_reconcile_empty_result() {
    let page = reconcile(1, 10, Vec::<u32>::new(), Some(&meta(Some(0), None)));

    assert_eq!(page.page, 1);
    assert_eq!(page.total_pages, 1);
    assert!(!page.has_next_page);
}

#[test]
fn test_reconcile_zero_total_with_items_is_ignored() {
    let page = reconcile(1, 10, range(0, 3), Some(&meta(Some(0), None)));

    assert_eq!(page.items.len(), 3);
    assert_eq!(page.total_items, Some(3));
    assert_eq!(page.total_pages, 1);
    assert!(!page.has_next_page);
}

#[test]
fn test_reconcile_zero_page_count_with_full_page() {
    let page = reconcile(1, 10, range(0, 10), Some(&meta(Some(0), Some(0))));

    assert_eq!(page.total_items, None);
    assert_eq!(page.total_pages, 2);
    assert!(page.has_next_page);
}

#[test]
fn test_reconciled_page_meta() {
    let page = reconcile(2, 10, range(0, 10), Some(&meta(Some(25), None)));
    assert_eq!(
        page.meta(),
        PaginationMeta {
            current_page: Some(2),
            per_page: Some(10),
            total: Some(25),
            total_pages: Some(3),
            has_next_page: Some(true),
            has_prev_page: Some(true),
        }
    );
}

// ============================================================================
// PaginatedResource Tests
// ============================================================================

#[tokio::test]
async fn test_go_to_page_first_load() {
    let fetcher = Arc::new(ScriptedFetcher::new(vec![Ok(Envelope::ok_with(
        range(1, 13),
        PaginationMeta {
            current_page: Some(1),
            per_page: Some(12),
            total: Some(37),
            ..PaginationMeta::default()
        },
    ))]));
    let resource = PaginatedResource::new(fetcher.clone(), ResourceConfig::new(12));

    resource.go_to_page(1.0).await;
    let state = resource.state().await;

    assert_eq!(state.page, 1);
    assert_eq!(state.total_pages, 4);
    assert!(state.has_next_page);
    assert!(!state.has_previous_page);
    assert_eq!(state.items.len(), 12);
    assert!(state.error.is_none());
    assert!(!state.is_busy());
}

#[tokio::test]
async fn test_go_to_page_clamps_any_input() {
    for input in [-3.0, 0.0, 1.5, f64::NAN, f64::INFINITY, 1e12] {
        let resource = PaginatedResource::new(
            Arc::new(DatasetFetcher::new(30)),
            ResourceConfig::new(10),
        );
        resource.go_to_page(input).await;
        let state = resource.state().await;

        assert!(
            state.page >= 1 && state.page <= state.total_pages,
            "input {input} gave page {} of {}",
            state.page,
            state.total_pages
        );
    }
}

#[tokio::test]
async fn test_load_next_page_appends() {
    let fetcher = Arc::new(DatasetFetcher::new(25));
    let resource = PaginatedResource::new(fetcher.clone(), ResourceConfig::new(10));

    resource.go_to_page(1.0).await;
    resource.load_next_page().await;
    let state = resource.state().await;

    assert_eq!(state.items, range(1, 21));
    assert_eq!(state.page, 2);
    assert!(state.has_next_page);

    resource.load_next_page().await;
    let state = resource.state().await;
    assert_eq!(state.items.len(), 25);
    assert!(!state.has_next_page);

    // No next page left: no further request.
    resource.load_next_page().await;
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_go_to_page_replaces() {
    let resource = PaginatedResource::new(
        Arc::new(DatasetFetcher::new(25)),
        ResourceConfig::new(10),
    );

    resource.go_to_page(1.0).await;
    resource.go_to_page(2.0).await;
    let state = resource.state().await;

    assert_eq!(state.items, range(11, 21));
    assert_eq!(state.page, 2);
    assert!(state.has_previous_page);
}

#[tokio::test]
async fn test_concurrent_load_next_page_issues_one_request() {
    let fetcher = Arc::new(ScriptedFetcher::new(vec![Ok(Envelope::ok(range(0, 12)))]));
    let resource = PaginatedResource::new(fetcher.clone(), ResourceConfig::new(12));

    tokio::join!(resource.load_next_page(), resource.load_next_page());

    assert_eq!(fetcher.calls(), 1);
    assert!(!resource.is_in_flight());
}

#[tokio::test]
async fn test_concurrent_go_to_page_drops_second_call() {
    let fetcher = Arc::new(ScriptedFetcher::new(vec![
        Ok(Envelope::ok(range(0, 3))),
        Ok(Envelope::ok(range(100, 103))),
    ]));
    let resource = PaginatedResource::new(fetcher.clone(), ResourceConfig::new(12));

    tokio::join!(resource.go_to_page(1.0), resource.reload());

    assert_eq!(fetcher.calls(), 1);
    assert_eq!(fetcher.requested_pages(), vec![1]);
    assert_eq!(resource.state().await.items, range(0, 3));
}

#[tokio::test]
async fn test_busy_flags_are_exclusive() {
    let fetcher = Arc::new(ScriptedFetcher::new(vec![
        Ok(Envelope::ok(range(0, 12))),
        Ok(Envelope::ok(range(12, 24))),
    ]));
    let resource = PaginatedResource::new(fetcher, ResourceConfig::new(12));

    let observe = async {
        tokio::task::yield_now().await;
        resource.state().await
    };
    let ((), during_first) = tokio::join!(resource.go_to_page(1.0), observe);
    assert!(during_first.is_loading_initial);
    assert!(!during_first.is_fetching_more);

    let observe = async {
        tokio::task::yield_now().await;
        resource.state().await
    };
    let ((), during_second) = tokio::join!(resource.load_next_page(), observe);
    assert!(!during_second.is_loading_initial);
    assert!(during_second.is_fetching_more);

    assert!(!resource.state().await.is_busy());
}

/// Never answers, leaving the fetch outstanding until the caller gives up
struct StalledFetcher;

#[async_trait]
impl Fetcher<u32> for StalledFetcher {
    async fn fetch(&self, _params: &ListParams) -> Result<Envelope<u32>> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn test_abandoned_fetch_releases_busy_state() {
    let resource = PaginatedResource::new(StalledFetcher, ResourceConfig::new(12));

    let abandoned =
        tokio::time::timeout(std::time::Duration::from_millis(20), resource.go_to_page(1.0)).await;
    assert!(abandoned.is_err());

    let state = resource.state().await;
    assert!(!resource.is_in_flight());
    assert!(!state.is_loading_initial);
    assert!(!state.is_fetching_more);
    assert!(!state.is_busy());
}

#[tokio::test]
async fn test_abandoned_append_releases_busy_state() {
    let fetcher = Arc::new(ScriptedFetcher::new(vec![Ok(Envelope::ok(range(0, 12)))]));
    let resource = PaginatedResource::new(fetcher.clone(), ResourceConfig::new(12));
    resource.go_to_page(1.0).await;

    // dropped after the guard is taken but before the answer arrives
    let mut next = Box::pin(resource.load_next_page());
    assert!(futures::poll!(next.as_mut()).is_pending());
    assert!(resource.state().await.is_fetching_more);
    drop(next);

    let state = resource.state().await;
    assert!(!resource.is_in_flight());
    assert!(!state.is_busy());
    assert_eq!(state.items, range(0, 12));

    // the next scroll is not swallowed by a stale guard
    resource.load_next_page().await;
    assert_eq!(fetcher.calls(), 3);
    assert_eq!(fetcher.requested_pages(), vec![1, 2, 2]);
}

#[tokio::test]
async fn test_fetch_error_is_contained() {
    let notifier = Arc::new(RecordingNotifier::default());
    let fetcher = Arc::new(ScriptedFetcher::new(vec![
        Ok(Envelope::ok(range(0, 12))),
        Err(Error::http_status(503, "upstream down")),
    ]));
    let resource = PaginatedResource::new(fetcher, ResourceConfig::new(12))
        .with_notifier(notifier.clone());

    resource.go_to_page(1.0).await;
    resource.go_to_page(2.0).await;
    let state = resource.state().await;

    assert_eq!(state.error.as_deref(), Some("HTTP 503: upstream down"));
    assert!(!state.has_next_page);
    assert!(!state.has_previous_page);
    assert!(state.items.is_empty());
    assert_eq!(
        notifier.messages(),
        vec![(LogLevel::Error, "HTTP 503: upstream down".to_string())]
    );

    // Pagination stays stopped until reload.
    resource.load_next_page().await;
    assert_eq!(resource.state().await.error.as_deref(), Some("HTTP 503: upstream down"));
}

#[tokio::test]
async fn test_failed_append_keeps_loaded_items() {
    let fetcher = Arc::new(ScriptedFetcher::new(vec![
        Ok(Envelope::ok(range(0, 12))),
        Ok(Envelope::failure("Too many requests")),
    ]));
    let resource = PaginatedResource::new(fetcher, ResourceConfig::new(12));

    resource.go_to_page(1.0).await;
    resource.load_next_page().await;
    let state = resource.state().await;

    assert_eq!(state.items, range(0, 12));
    assert_eq!(state.error.as_deref(), Some("Too many requests"));
    assert!(!state.has_next_page);
    assert!(!state.has_previous_page);
}

#[tokio::test]
async fn test_unsuccessful_envelope_uses_message_field() {
    let envelope = Envelope {
        message: Some("Iftah service unavailable".to_string()),
        ..Envelope::<u32>::failure("")
    };
    let fetcher = Arc::new(ScriptedFetcher::new(vec![Ok(envelope)]));
    let resource = PaginatedResource::new(fetcher, ResourceConfig::new(12));

    resource.go_to_page(1.0).await;
    assert_eq!(
        resource.state().await.error.as_deref(),
        Some("Iftah service unavailable")
    );
}

#[tokio::test]
async fn test_reload_resets_to_initial_page() {
    let fetcher = Arc::new(DatasetFetcher::new(50));
    let resource = PaginatedResource::new(
        fetcher.clone(),
        ResourceConfig::new(10).initial_page(2),
    );

    resource.go_to_page(4.0).await;
    resource.go_to_page(5.0).await;
    resource.reload().await;
    let state = resource.state().await;

    assert_eq!(state.page, 2);
    assert_eq!(state.items, range(11, 21));
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_reload_clears_error() {
    let fetcher = Arc::new(ScriptedFetcher::new(vec![
        Err(Error::Timeout { timeout_ms: 100 }),
        Ok(Envelope::ok(range(0, 4))),
    ]));
    let resource = PaginatedResource::new(fetcher, ResourceConfig::new(12));

    resource.go_to_page(1.0).await;
    assert!(resource.state().await.error.is_some());

    resource.reload().await;
    let state = resource.state().await;
    assert!(state.error.is_none());
    assert_eq!(state.items, range(0, 4));
}

#[tokio::test]
async fn test_backend_current_page_is_trusted() {
    let fetcher = Arc::new(ScriptedFetcher::new(vec![Ok(Envelope::ok_with(
        range(0, 10),
        PaginationMeta {
            current_page: Some(1),
            total_pages: Some(6),
            ..PaginationMeta::default()
        },
    ))]));
    let resource = PaginatedResource::new(fetcher.clone(), ResourceConfig::new(10));

    resource.go_to_page(5.0).await;
    let state = resource.state().await;

    assert_eq!(fetcher.requested_pages(), vec![5]);
    assert_eq!(state.page, 1);
    assert!(!state.has_previous_page);
}

#[tokio::test]
async fn test_full_page_heuristic_overflow_fetch() {
    // Last page is exactly full, so one extra empty fetch happens.
    let fetcher = Arc::new(ScriptedFetcher::new(vec![
        Ok(Envelope::ok(range(0, 10))),
        Ok(Envelope::ok(Vec::new())),
    ]));
    let resource = PaginatedResource::new(fetcher.clone(), ResourceConfig::new(10));

    resource.go_to_page(1.0).await;
    assert!(resource.state().await.has_next_page);

    resource.load_next_page().await;
    let state = resource.state().await;
    assert_eq!(state.items.len(), 10);
    assert!(!state.has_next_page);
    assert!(state.error.is_none());
    assert_eq!(fetcher.calls(), 2);
}

#[tokio::test]
async fn test_over_fetching_backend_through_resource() {
    let fetcher = Arc::new(ScriptedFetcher::new(vec![Ok(Envelope::ok(range(0, 50)))]));
    let resource = PaginatedResource::new(fetcher, ResourceConfig::new(10));

    resource.go_to_page(3.0).await;
    let state = resource.state().await;

    assert_eq!(state.items, range(20, 30));
    assert_eq!(state.total_pages, 5);
}

#[tokio::test]
async fn test_set_filters_reloads_with_new_filters() {
    let fetcher = Arc::new(ScriptedFetcher::new(vec![
        Ok(Envelope::ok(range(0, 12))),
        Ok(Envelope::ok(range(0, 2))),
    ]));
    let resource = PaginatedResource::new(
        fetcher.clone(),
        ResourceConfig::new(12).filter("category", "hadith"),
    );

    resource.go_to_page(1.0).await;
    let mut filters = crate::types::Filters::new();
    filters.insert("category".to_string(), "tafsir".to_string());
    resource.set_filters(filters).await;

    let requests = fetcher.requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].filters.get("category"), Some(&"hadith".to_string()));
    assert_eq!(requests[1].filters.get("category"), Some(&"tafsir".to_string()));
    assert_eq!(requests[1].page, 1);
    assert_eq!(resource.state().await.items, range(0, 2));
}
