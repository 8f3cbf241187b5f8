//! Server module
//!
//! The axum proxy the browser talks to. List responses are reshaped through
//! the same reconciliation step the stateful reconciler uses, so pagination
//! always reaches the browser complete and consistent.

mod routes;

pub use routes::{router, serve, AppState};
