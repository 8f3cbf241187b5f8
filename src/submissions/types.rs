//! Submission types

use crate::types::{FormKind, JsonValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A submission kept on disk because the backend could not take it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: String,
    pub form: FormKind,
    pub payload: JsonValue,
    pub submitted_at: DateTime<Utc>,
    /// Failed forwarding attempts so far
    #[serde(default)]
    pub attempts: u32,
}

/// What happened to a submission
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    /// Accepted by the backend
    Forwarded { response: JsonValue },
    /// Saved locally for a later retry
    StoredLocally { id: String },
}

impl SubmissionOutcome {
    pub fn is_forwarded(&self) -> bool {
        matches!(self, SubmissionOutcome::Forwarded { .. })
    }
}

/// Result of replaying stored submissions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RetryReport {
    pub forwarded: usize,
    pub still_pending: usize,
    /// Refused by the backend and dropped from the store
    pub rejected: usize,
}

/// On-disk layout of the store file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct StoreFile {
    #[serde(default)]
    pub submissions: Vec<SubmissionRecord>,
}
