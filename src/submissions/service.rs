//! Form submission service

use super::store::SubmissionStore;
use super::types::{RetryReport, SubmissionOutcome};
use crate::api::ContentApi;
use crate::error::{Error, Result};
use crate::notify::SharedNotifier;
use crate::types::{FormKind, JsonValue, LogLevel};
use std::sync::Arc;
use tracing::{info, warn};

/// Shown when a submission could only be saved locally
pub const STORED_LOCALLY_MESSAGE: &str =
    "The server could not be reached. Your submission was saved and will be sent later.";

/// Validates submissions and forwards them, falling back to the local store
#[derive(Clone)]
pub struct SubmissionService {
    api: ContentApi,
    store: Arc<SubmissionStore>,
    notifier: Option<SharedNotifier>,
}

impl std::fmt::Debug for SubmissionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionService")
            .field("store", &self.store.path())
            .field("has_notifier", &self.notifier.is_some())
            .finish_non_exhaustive()
    }
}

impl SubmissionService {
    pub fn new(api: ContentApi, store: Arc<SubmissionStore>) -> Self {
        Self {
            api,
            store,
            notifier: None,
        }
    }

    pub fn with_notifier(mut self, notifier: SharedNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn store(&self) -> &SubmissionStore {
        &self.store
    }

    /// Validate and forward one submission.
    ///
    /// When the backend is unreachable or failing the payload is stored
    /// locally instead. A refusal by a reachable backend is returned as an
    /// error.
    pub async fn submit(&self, form: FormKind, payload: JsonValue) -> Result<SubmissionOutcome> {
        validate(form, &payload)?;

        match self.api.submit(form, &payload).await {
            Ok(response) => {
                info!(%form, "submission forwarded");
                Ok(SubmissionOutcome::Forwarded { response })
            }
            Err(e) if e.is_unavailable() => {
                warn!(%form, error = %e, "backend unavailable, storing submission locally");
                let record = self.store.append(form, payload).await?;
                if let Some(notifier) = &self.notifier {
                    notifier.notify(LogLevel::Warn, STORED_LOCALLY_MESSAGE);
                }
                Ok(SubmissionOutcome::StoredLocally { id: record.id })
            }
            Err(e) => Err(e),
        }
    }

    /// Try to deliver every stored submission again.
    ///
    /// Delivered records are removed. Records the backend refuses are dropped
    /// too, since resending them cannot succeed. Stops early once the backend
    /// turns out to be unavailable.
    pub async fn retry_pending(&self) -> Result<RetryReport> {
        let mut report = RetryReport::default();
        let records = self.store.list().await;
        let mut iter = records.into_iter();

        for record in iter.by_ref() {
            match self.api.submit(record.form, &record.payload).await {
                Ok(_) => {
                    self.store.remove(&record.id).await?;
                    report.forwarded += 1;
                }
                Err(e) if e.is_unavailable() => {
                    warn!(id = %record.id, error = %e, "backend still unavailable");
                    self.store.record_attempt(&record.id).await?;
                    report.still_pending += 1;
                    break;
                }
                Err(e) => {
                    warn!(id = %record.id, error = %e, "stored submission rejected, dropping");
                    self.store.remove(&record.id).await?;
                    report.rejected += 1;
                }
            }
        }
        report.still_pending += iter.count();

        info!(
            forwarded = report.forwarded,
            pending = report.still_pending,
            rejected = report.rejected,
            "retried stored submissions"
        );
        Ok(report)
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Check the fields a form cannot be accepted without
pub fn validate(form: FormKind, payload: &JsonValue) -> Result<()> {
    let Some(fields) = payload.as_object() else {
        return Err(Error::validation("payload", "must be a JSON object"));
    };

    require_text(fields, "name")?;

    if let Some(email) = fields.get("email").and_then(JsonValue::as_str) {
        let email = email.trim();
        if !email.is_empty() && !email.contains('@') {
            return Err(Error::validation("email", "is not an email address"));
        }
    }

    match form {
        FormKind::Admission => {}
        FormKind::IftahQuestion => require_text(fields, "question")?,
        FormKind::Donation => {
            let amount = fields.get("amount").and_then(|v| match v {
                JsonValue::Number(n) => n.as_f64(),
                JsonValue::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            });
            match amount {
                Some(a) if a.is_finite() && a > 0.0 => {}
                Some(_) => return Err(Error::validation("amount", "must be greater than zero")),
                None => return Err(Error::validation("amount", "is required")),
            }
        }
    }
    Ok(())
}

fn require_text(fields: &serde_json::Map<String, JsonValue>, field: &str) -> Result<()> {
    match fields.get(field).and_then(JsonValue::as_str) {
        Some(value) if !value.trim().is_empty() => Ok(()),
        _ => Err(Error::validation(field, "is required")),
    }
}
