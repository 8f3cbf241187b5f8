//! Pagination types
//!
//! Wire shapes received from the content backend (`Envelope`, `PaginationMeta`)
//! and the request/state types owned by the reconciler.

use crate::error::{Error, Result};
use crate::types::{Filters, JsonValue, OptionStringExt};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Message used when a failed envelope carries no explanation
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to load data";

// ============================================================================
// Request Parameters
// ============================================================================

/// Request descriptor for one page of a list endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    /// Page number (1-based)
    pub page: u32,
    /// Requested page size
    pub limit: u32,
    /// Filter fields forwarded verbatim
    pub filters: Filters,
}

impl ListParams {
    /// Create params for a page, clamping both values to at least 1
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
            filters: Filters::new(),
        }
    }

    /// Add a filter field
    #[must_use]
    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Merge a set of filter fields
    #[must_use]
    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters.extend(filters);
        self
    }

    /// Build params from raw query pairs, e.g. a browser request.
    ///
    /// `page` and `limit` are parsed leniently and fall back to `1` and
    /// `default_limit`; every other pair becomes a filter.
    pub fn from_query<I, K, V>(pairs: I, default_limit: u32) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut page = 1;
        let mut limit = default_limit;
        let mut filters = Filters::new();

        for (key, value) in pairs {
            let key = key.into();
            let value = value.into();
            match key.as_str() {
                "page" => page = parse_positive(&value).unwrap_or(1),
                "limit" | "per_page" => limit = parse_positive(&value).unwrap_or(default_limit),
                _ => {
                    filters.insert(key, value);
                }
            }
        }

        Self::new(page, limit).with_filters(filters)
    }

    /// Query pairs in request order: page, limit, then filters
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::with_capacity(self.filters.len() + 2);
        query.push(("page".to_string(), self.page.to_string()));
        query.push(("limit".to_string(), self.limit.to_string()));
        query.extend(self.filters.iter().map(|(k, v)| (k.clone(), v.clone())));
        query
    }
}

fn parse_positive(value: &str) -> Option<u32> {
    count_from_value(&JsonValue::String(value.to_string()))
        .filter(|n| *n > 0)
        .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
}

// ============================================================================
// Backend Pagination Metadata
// ============================================================================

/// Pagination block as reported by the backend.
///
/// Every field may be missing, zero or inconsistent with the others.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    #[serde(default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
    #[serde(default, deserialize_with = "lenient_flag", skip_serializing_if = "Option::is_none")]
    pub has_next_page: Option<bool>,
    #[serde(default, deserialize_with = "lenient_flag", skip_serializing_if = "Option::is_none")]
    pub has_prev_page: Option<bool>,
}

fn lenient_count<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(count_from_value))
}

fn lenient_flag<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(flag_from_value))
}

fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::String(s)) => s.none_if_blank(),
        Some(other) => Some(other.to_string()),
    })
}

/// Read a non-negative count from a number or numeric string
fn count_from_value(value: &JsonValue) -> Option<u64> {
    let from_float = |f: f64| (f.is_finite() && f >= 0.0).then(|| f.floor() as u64);
    match value {
        JsonValue::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(from_float)),
        JsonValue::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(from_float))
        }
        _ => None,
    }
}

fn flag_from_value(value: &JsonValue) -> Option<bool> {
    match value {
        JsonValue::Bool(b) => Some(*b),
        JsonValue::Number(n) => n.as_u64().map(|n| n != 0),
        JsonValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

// ============================================================================
// Envelope
// ============================================================================

/// The `data` field of an envelope: a bare array or one wrapping object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvelopeData<T> {
    /// `data: [...]`
    Items(Vec<T>),
    /// `data: { data: [...], pagination?: {...} }`
    Wrapped {
        data: Vec<T>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pagination: Option<PaginationMeta>,
    },
}

/// Result wrapper returned by every list-fetching call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<EnvelopeData<T>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationMeta>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Successful envelope without pagination metadata
    pub fn ok(items: Vec<T>) -> Self {
        Self {
            success: true,
            data: Some(EnvelopeData::Items(items)),
            pagination: None,
            error: None,
            message: None,
        }
    }

    /// Successful envelope with pagination metadata
    pub fn ok_with(items: Vec<T>, pagination: PaginationMeta) -> Self {
        Self {
            pagination: Some(pagination),
            ..Self::ok(items)
        }
    }

    /// Failed envelope
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            pagination: None,
            error: Some(error.into()),
            message: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Human-readable reason for a failed envelope
    pub fn failure_message(&self) -> String {
        self.error
            .clone()
            .none_if_blank()
            .or_else(|| self.message.clone().none_if_blank())
            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string())
    }

    /// Split into raw items and the pagination block.
    ///
    /// A top-level `pagination` wins over one nested inside wrapped data.
    pub fn into_parts(self) -> (Vec<T>, Option<PaginationMeta>) {
        match self.data {
            None => (Vec::new(), self.pagination),
            Some(EnvelopeData::Items(items)) => (items, self.pagination),
            Some(EnvelopeData::Wrapped { data, pagination }) => {
                (data, self.pagination.or(pagination))
            }
        }
    }
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Normalise an arbitrary backend body into an envelope.
    ///
    /// Bare arrays are successful lists. Objects without a `success` field are
    /// treated as successful.
    pub fn from_json(value: JsonValue) -> Result<Self> {
        match value {
            JsonValue::Array(_) => {
                let items: Vec<T> = serde_json::from_value(value)?;
                Ok(Self::ok(items))
            }
            JsonValue::Object(mut map) => {
                let success = map
                    .get("success")
                    .and_then(flag_from_value)
                    .unwrap_or(true);
                map.insert("success".to_string(), JsonValue::Bool(success));
                if !success {
                    // A failed body's data is never rendered; don't let its shape fail the parse.
                    map.remove("data");
                }
                Ok(serde_json::from_value(JsonValue::Object(map))?)
            }
            other => Err(Error::decode(format!(
                "expected a JSON array or object, got {}",
                json_type_name(&other)
            ))),
        }
    }
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

// ============================================================================
// Reconciled State
// ============================================================================

/// The reconciler's own view of a paginated list. Always internally consistent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageState<T> {
    pub items: Vec<T>,
    /// Current page, within `1..=total_pages`
    pub page: u32,
    /// Best-effort page count, at least 1
    pub total_pages: u32,
    /// Best-effort item count, when known or inferable
    pub total_items: Option<u64>,
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub error: Option<String>,
    pub is_loading_initial: bool,
    pub is_fetching_more: bool,
}

impl<T> PageState<T> {
    /// Fresh state positioned at `initial_page`, optimistic about more pages
    pub fn initial(initial_page: u32) -> Self {
        let page = initial_page.max(1);
        Self {
            items: Vec::new(),
            page,
            total_pages: page,
            total_items: None,
            has_next_page: true,
            has_previous_page: false,
            error: None,
            is_loading_initial: false,
            is_fetching_more: false,
        }
    }

    /// Whether either busy flag is set
    pub fn is_busy(&self) -> bool {
        self.is_loading_initial || self.is_fetching_more
    }
}

impl<T> Default for PageState<T> {
    fn default() -> Self {
        Self::initial(1)
    }
}
