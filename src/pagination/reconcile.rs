//! Pagination metadata reconciliation
//!
//! Turns whatever pagination block the backend returned (possibly missing,
//! zero or self-contradictory) into a consistent page description. This is a
//! pure function so the proxy routes and the stateful reconciler share it.

use super::types::PaginationMeta;
use tracing::debug;

/// One page after reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledPage<T> {
    /// Items of this page only, never more than `per_page`
    pub items: Vec<T>,
    /// Resolved page number, within `1..=total_pages`
    pub page: u32,
    /// Page size the page was cut with
    pub per_page: u32,
    /// Page count, at least 1 and at least `page`
    pub total_pages: u32,
    pub total_items: Option<u64>,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl<T> ReconciledPage<T> {
    /// The reconciled values as a pagination block, e.g. for re-serialising
    pub fn meta(&self) -> PaginationMeta {
        PaginationMeta {
            current_page: Some(u64::from(self.page)),
            per_page: Some(u64::from(self.per_page)),
            total: self.total_items,
            total_pages: Some(u64::from(self.total_pages)),
            has_next_page: Some(self.has_next_page),
            has_prev_page: Some(self.has_previous_page),
        }
    }
}

/// Clamp any requested page to an integer of at least 1.
///
/// Non-finite input becomes 1, fractions are floored.
pub fn clamp_page(target: f64) -> u32 {
    if !target.is_finite() {
        return 1;
    }
    target.floor().clamp(1.0, f64::from(u32::MAX)) as u32
}

/// Reconcile one backend response against the page that was requested.
///
/// `page_size` is the caller's configured size, used when the backend does not
/// report a positive `per_page`.
pub fn reconcile<T>(
    target_page: u32,
    page_size: u32,
    items: Vec<T>,
    meta: Option<&PaginationMeta>,
) -> ReconciledPage<T> {
    let target_page = target_page.max(1);
    let fallback = PaginationMeta::default();
    let meta = meta.unwrap_or(&fallback);

    // 1. effective page size
    let per_page = meta
        .per_page
        .filter(|n| *n > 0)
        .map_or(page_size, saturate_u32)
        .max(1);
    let per_page_wide = u64::from(per_page);

    // 2. totals, each derived from the other when only one is present;
    //    a zero count next to real items is a placeholder and is dropped
    let reported = |count: Option<u64>| count.filter(|n| *n > 0 || items.is_empty());
    let mut total_items = reported(meta.total);
    let mut total_pages = reported(meta.total_pages);
    match (total_items, total_pages) {
        (Some(total), None) => total_pages = Some(total.div_ceil(per_page_wide)),
        (None, Some(pages)) => total_items = Some(pages.saturating_mul(per_page_wide)),
        _ => {}
    }

    // 3. over-fetch: the backend ignored the page size and sent everything
    let mut items = items;
    let mut window_page = target_page;
    let over_fetched = items.len() > per_page as usize;
    if over_fetched {
        let raw_len = items.len() as u64;
        let total = *total_items.get_or_insert(raw_len);
        // A page count that cannot hold the raw array was computed for some other page size.
        let pages = match total_pages {
            Some(pages) if pages.saturating_mul(per_page_wide) >= raw_len => pages,
            _ => total.max(raw_len).div_ceil(per_page_wide),
        };
        total_pages = Some(pages);
        window_page = target_page.min(saturate_u32(pages).max(1));
        debug!(
            raw_len,
            per_page, window_page, "backend over-fetched, slicing page locally"
        );
        items = slice_window(items, window_page, per_page);
    }

    // 4. the backend's reported page wins over the requested one
    let page = if over_fetched {
        window_page
    } else {
        meta.current_page
            .map_or(target_page, |p| saturate_u32(p).max(1))
    };

    // 5. direction hint: explicit flag, then totals, then the full-page heuristic
    let has_next_hint = meta.has_next_page.unwrap_or_else(|| match total_pages {
        Some(pages) => u64::from(page) < pages,
        None => items.len() >= per_page as usize,
    });

    // 6. page count never below the current page
    let estimated = match total_pages {
        Some(pages) if pages >= u64::from(page) => pages,
        _ => u64::from(page) + u64::from(has_next_hint),
    };
    let total_pages = saturate_u32(estimated).max(1);

    // 7. clamp and derive direction strictly from position
    let page = page.clamp(1, total_pages);
    let has_next_page = page < total_pages;
    let has_previous_page = page > 1;

    if total_items.is_none() && !has_next_page {
        total_items = Some(u64::from(page - 1) * per_page_wide + items.len() as u64);
    }

    ReconciledPage {
        items,
        page,
        per_page,
        total_pages,
        total_items,
        has_next_page,
        has_previous_page,
    }
}

/// Cut `[(page - 1) * per_page, page * per_page)` out of a full result set
fn slice_window<T>(items: Vec<T>, page: u32, per_page: u32) -> Vec<T> {
    let start = (page as usize - 1).saturating_mul(per_page as usize);
    items
        .into_iter()
        .skip(start)
        .take(per_page as usize)
        .collect()
}

fn saturate_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
