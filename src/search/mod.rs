//! Search module
//!
//! Fans one query out to every searchable content kind and gathers whatever
//! comes back.

mod service;

pub use service::{SearchResults, SearchService, SourceResults, SEARCH_SOURCES};
