//! User-facing notifications
//!
//! Components that want to surface a message to the visitor (a failed page
//! load, a form stored offline) take a [`Notifier`] at construction time
//! instead of reaching for a global sink.

use crate::types::LogLevel;
use std::sync::Arc;

/// Sink for user-facing notifications
pub trait Notifier: Send + Sync {
    /// Deliver one message
    fn notify(&self, level: LogLevel, message: &str);
}

/// Shared, dynamically dispatched notifier
pub type SharedNotifier = Arc<dyn Notifier>;

/// Notifier that forwards every message to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Trace => tracing::trace!(target: "notify", "{message}"),
            LogLevel::Debug => tracing::debug!(target: "notify", "{message}"),
            LogLevel::Info => tracing::info!(target: "notify", "{message}"),
            LogLevel::Warn => tracing::warn!(target: "notify", "{message}"),
            LogLevel::Error => tracing::error!(target: "notify", "{message}"),
        }
    }
}
