//! Pagination module
//!
//! Normalises the pagination metadata of remote list endpoints.
//!
//! # Overview
//!
//! Backends report pagination inconsistently: fields go missing, page counts
//! disagree with item counts, and some endpoints ignore the requested page
//! size altogether. This module provides:
//! - [`reconcile`] - a pure step turning one response into a consistent page
//! - [`PaginatedResource`] - the stateful reconciler with `go_to_page`,
//!   `load_next_page` and `reload`, guarded by a single in-flight flag
//! - the wire types [`Envelope`] and [`PaginationMeta`]

mod reconcile;
mod resource;
mod types;

pub use reconcile::{clamp_page, reconcile, ReconciledPage};
pub use resource::{Fetcher, PaginatedResource, ResourceConfig};
pub use types::{
    Envelope, EnvelopeData, ListParams, PageState, PaginationMeta, GENERIC_FAILURE_MESSAGE,
};

#[cfg(test)]
mod tests;
