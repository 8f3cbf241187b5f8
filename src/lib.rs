// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Madrasa Portal
//!
//! Backend for a madrasa content portal: a proxy in front of the remote
//! content API that keeps pagination consistent no matter what the backend
//! reports.
//!
//! ## Features
//!
//! - **Pagination reconciliation**: missing, zero or contradictory metadata is
//!   turned into a page state that never contradicts itself
//! - **Paginated resources**: page jumps, infinite-scroll appends and reloads
//!   with a single in-flight request per list
//! - **Federated search**: one query fanned out to every searchable kind
//! - **Form submissions**: admissions, donations and iftah questions, stored
//!   locally while the backend is down
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use madrasa_portal::{api::ContentApi, pagination::{PaginatedResource, ResourceConfig}};
//!
//! let api = ContentApi::new(config)?;
//! let books = PaginatedResource::new(api.fetcher(ContentKind::Books), ResourceConfig::new(12));
//! books.go_to_page(1.0).await;
//! books.load_next_page().await;
//! let state = books.state().await;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 server (axum)  /  cli (clap)                 │
//! └──────────────────────────────────────────────────────────────┘
//!          │                    │                    │
//! ┌────────┴───────┬────────────┴─────────┬──────────┴──────────┐
//! │   pagination   │        search        │     submissions     │
//! │ reconcile      │ scatter/gather over  │ validate, forward,  │
//! │ resource       │ seven sources        │ local JSON store    │
//! └────────┬───────┴────────────┬─────────┴──────────┬──────────┘
//!          └────────────── api (ContentApi) ─────────┘
//!                               │
//!                    http (reqwest, governor)
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the portal
pub mod error;

/// Common types and type aliases
pub mod types;

/// Configuration file and environment overrides
pub mod config;

/// HTTP client with retry and rate limiting
pub mod http;

/// Pagination reconciliation and paginated resources
pub mod pagination;

/// User-facing notifications
pub mod notify;

/// Remote content backend client
pub mod api;

/// Federated search
pub mod search;

/// Form submissions with local fallback
pub mod submissions;

/// HTTP proxy server
pub mod server;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use api::{ContentApi, ContentFetcher};
pub use config::PortalConfig;
pub use pagination::{reconcile, Envelope, Fetcher, ListParams, PageState, PaginatedResource};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
