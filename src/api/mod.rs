//! Content API module
//!
//! The collaborator layer between the portal and the remote content backend:
//! list, detail and form-submission calls, plus the [`ContentFetcher`] that
//! lets a `PaginatedResource` page through any content kind.

mod client;

pub use client::{ContentApi, ContentFetcher};
