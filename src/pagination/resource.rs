//! Stateful pagination reconciler
//!
//! [`PaginatedResource`] owns the [`PageState`] of one list (one fetcher plus
//! one filter set) and exposes the three pagination operations. Only one
//! fetch is ever outstanding; calls that arrive meanwhile are dropped.

use super::reconcile::{clamp_page, reconcile};
use super::types::{Envelope, ListParams, PageState};
use crate::error::Result;
use crate::notify::SharedNotifier;
use crate::types::{Filters, LogLevel};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Source of pages for a [`PaginatedResource`]
#[async_trait]
pub trait Fetcher<T>: Send + Sync {
    /// Fetch one page
    async fn fetch(&self, params: &ListParams) -> Result<Envelope<T>>;
}

/// Static configuration of a resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceConfig {
    /// Page loaded on first fetch and after `reload()`
    pub initial_page: u32,
    /// Requested page size
    pub page_size: u32,
    /// Filter fields sent with every request
    pub filters: Filters,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            initial_page: 1,
            page_size: 12,
            filters: Filters::new(),
        }
    }
}

impl ResourceConfig {
    /// Create a config with the given page size
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
            ..Self::default()
        }
    }

    /// Set the initial page
    #[must_use]
    pub fn initial_page(mut self, page: u32) -> Self {
        self.initial_page = page.max(1);
        self
    }

    /// Add a filter field
    #[must_use]
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageRequest {
    Page(u32),
    Next,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchMode {
    Replace,
    Append,
}

struct Inner<T> {
    view: PageState<T>,
    filters: Filters,
    /// Whether any fetch has settled since construction or the last reset
    loaded: bool,
}

const IDLE: u8 = 0;
const LOADING_INITIAL: u8 = 1;
const FETCHING_MORE: u8 = 2;

/// Owns the in-flight flag and the busy phase of one fetch.
///
/// Both are cleared together when the fetch settles or its future is dropped.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
    phase: &'a AtomicU8,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool, phase: &'a AtomicU8) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag, phase })
    }

    fn enter(&self, phase: u8) {
        self.phase.store(phase, Ordering::Release);
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.phase.store(IDLE, Ordering::Release);
        self.flag.store(false, Ordering::Release);
    }
}

/// A paginated list kept consistent across inconsistent backend responses
pub struct PaginatedResource<T, F> {
    fetcher: F,
    config: ResourceConfig,
    inner: RwLock<Inner<T>>,
    in_flight: AtomicBool,
    /// Busy phase of the outstanding fetch, overlaid on snapshots
    phase: AtomicU8,
    notifier: Option<SharedNotifier>,
}

impl<T, F> PaginatedResource<T, F>
where
    T: Clone + Send + Sync,
    F: Fetcher<T>,
{
    /// Create a resource. Nothing is fetched until an operation is called.
    pub fn new(fetcher: F, config: ResourceConfig) -> Self {
        let inner = Inner {
            view: PageState::initial(config.initial_page),
            filters: config.filters.clone(),
            loaded: false,
        };
        Self {
            fetcher,
            config,
            inner: RwLock::new(inner),
            in_flight: AtomicBool::new(false),
            phase: AtomicU8::new(IDLE),
            notifier: None,
        }
    }

    /// Report fetch failures to a notifier
    #[must_use]
    pub fn with_notifier(mut self, notifier: SharedNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    /// Snapshot of the current state
    pub async fn state(&self) -> PageState<T> {
        let mut view = self.inner.read().await.view.clone();
        let phase = self.phase.load(Ordering::Acquire);
        view.is_loading_initial = phase == LOADING_INITIAL;
        view.is_fetching_more = phase == FETCHING_MORE;
        view
    }

    /// Whether a fetch is outstanding
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn is_busy(&self) -> bool {
        self.phase.load(Ordering::Acquire) != IDLE
    }

    /// Fetch `target` and replace the items with exactly that page.
    ///
    /// The target is clamped to an integer of at least 1; non-finite values
    /// become 1.
    pub async fn go_to_page(&self, target: f64) {
        self.execute(PageRequest::Page(clamp_page(target))).await;
    }

    /// Fetch the page after the current one and append it.
    ///
    /// Does nothing when there is no next page or a fetch is already running.
    pub async fn load_next_page(&self) {
        {
            let inner = self.inner.read().await;
            if !inner.view.has_next_page || self.is_busy() {
                return;
            }
        }
        self.execute(PageRequest::Next).await;
    }

    /// Reset to the initial page and fetch it again
    pub async fn reload(&self) {
        self.execute(PageRequest::Reset).await;
    }

    /// Replace the filter fields and reload.
    ///
    /// The new filters are kept even when the reload is dropped because
    /// another fetch is outstanding; the next operation uses them.
    pub async fn set_filters(&self, filters: Filters) {
        self.inner.write().await.filters = filters;
        self.reload().await;
    }

    async fn execute(&self, request: PageRequest) {
        let Some(guard) = InFlightGuard::acquire(&self.in_flight, &self.phase) else {
            debug!(?request, "fetch already in flight, dropping request");
            return;
        };

        let (params, mode) = {
            let mut inner = self.inner.write().await;
            let (target, mode) = match request {
                PageRequest::Page(page) => (page, FetchMode::Replace),
                PageRequest::Next => {
                    if !inner.view.has_next_page {
                        return;
                    }
                    (inner.view.page.saturating_add(1), FetchMode::Append)
                }
                PageRequest::Reset => {
                    inner.view = PageState::initial(self.config.initial_page);
                    inner.loaded = false;
                    (self.config.initial_page.max(1), FetchMode::Replace)
                }
            };

            guard.enter(if inner.loaded {
                FETCHING_MORE
            } else {
                LOADING_INITIAL
            });

            let params =
                ListParams::new(target, self.config.page_size).with_filters(inner.filters.clone());
            (params, mode)
        };

        debug!(page = params.page, limit = params.limit, ?mode, "fetching page");
        let outcome = self.fetcher.fetch(&params).await;

        let mut inner = self.inner.write().await;
        inner.loaded = true;

        let failure = match outcome {
            Ok(envelope) if envelope.is_success() => {
                let (items, meta) = envelope.into_parts();
                let page = reconcile(params.page, self.config.page_size, items, meta.as_ref());

                let view = &mut inner.view;
                match mode {
                    FetchMode::Replace => view.items = page.items,
                    FetchMode::Append => view.items.extend(page.items),
                }
                view.page = page.page;
                view.total_pages = page.total_pages;
                view.total_items = page.total_items;
                view.has_next_page = page.has_next_page;
                view.has_previous_page = page.has_previous_page;
                view.error = None;
                None
            }
            Ok(envelope) => Some(envelope.failure_message()),
            Err(e) => Some(e.to_string()),
        };

        if let Some(message) = &failure {
            warn!(page = params.page, error = %message, "page fetch failed");
            let view = &mut inner.view;
            if mode == FetchMode::Replace {
                view.items.clear();
            }
            view.has_next_page = false;
            view.has_previous_page = false;
            view.error = Some(message.clone());
        }

        // busy phase clears while the settled view is still locked
        drop(guard);
        drop(inner);

        if let (Some(message), Some(notifier)) = (failure, &self.notifier) {
            notifier.notify(LogLevel::Error, &message);
        }
    }
}

impl<T, F> std::fmt::Debug for PaginatedResource<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginatedResource")
            .field("config", &self.config)
            .field("in_flight", &self.in_flight.load(Ordering::Relaxed))
            .field("has_notifier", &self.notifier.is_some())
            .finish_non_exhaustive()
    }
}
