//! Submissions module
//!
//! Admission, donation and iftah question forms. Submissions are validated,
//! forwarded to the backend, and kept in a local JSON store whenever the
//! backend cannot be reached.

mod service;
mod store;
mod types;

pub use service::{validate, SubmissionService, STORED_LOCALLY_MESSAGE};
pub use store::{SubmissionStore, STORE_FILE_NAME};
pub use types::{RetryReport, SubmissionOutcome, SubmissionRecord};
