//! Common types used throughout the portal
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// Filter fields forwarded alongside pagination parameters
pub type Filters = BTreeMap<String, String>;

// ============================================================================
// Content Kind
// ============================================================================

/// Kinds of content served by the remote content backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Articles,
    Courses,
    Books,
    Authors,
    Events,
    /// Fatwa questions and answers
    Iftah,
    Graduations,
    Blogs,
}

impl ContentKind {
    /// Every content kind, in display order
    pub const ALL: [ContentKind; 8] = [
        ContentKind::Articles,
        ContentKind::Courses,
        ContentKind::Books,
        ContentKind::Authors,
        ContentKind::Events,
        ContentKind::Iftah,
        ContentKind::Graduations,
        ContentKind::Blogs,
    ];

    /// Route segment and config key for this kind
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Articles => "articles",
            ContentKind::Courses => "courses",
            ContentKind::Books => "books",
            ContentKind::Authors => "authors",
            ContentKind::Events => "events",
            ContentKind::Iftah => "iftah",
            ContentKind::Graduations => "graduations",
            ContentKind::Blogs => "blogs",
        }
    }

    /// Default backend path when the config does not override it
    pub fn default_path(self) -> &'static str {
        match self {
            ContentKind::Articles => "/articles",
            ContentKind::Courses => "/courses",
            ContentKind::Books => "/books",
            ContentKind::Authors => "/authors",
            ContentKind::Events => "/events",
            ContentKind::Iftah => "/iftah",
            ContentKind::Graduations => "/graduations",
            ContentKind::Blogs => "/blogs",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "articles" | "article" => Ok(ContentKind::Articles),
            "courses" | "course" => Ok(ContentKind::Courses),
            "books" | "book" => Ok(ContentKind::Books),
            "authors" | "author" => Ok(ContentKind::Authors),
            "events" | "event" => Ok(ContentKind::Events),
            "iftah" | "fatwa" | "fatwas" => Ok(ContentKind::Iftah),
            "graduations" | "graduation" => Ok(ContentKind::Graduations),
            "blogs" | "blog" | "posts" => Ok(ContentKind::Blogs),
            _ => Err(Error::UnknownContentKind { kind: s.to_string() }),
        }
    }
}

// ============================================================================
// Form Kind
// ============================================================================

/// Forms visitors can submit through the portal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    Admission,
    Donation,
    /// A question submitted for an iftah answer
    IftahQuestion,
}

impl FormKind {
    /// Route segment for this form
    pub fn as_str(self) -> &'static str {
        match self {
            FormKind::Admission => "admission",
            FormKind::Donation => "donation",
            FormKind::IftahQuestion => "iftah_question",
        }
    }

    /// Default backend path when the config does not override it
    pub fn default_path(self) -> &'static str {
        match self {
            FormKind::Admission => "/admissions",
            FormKind::Donation => "/donations",
            FormKind::IftahQuestion => "/iftah/questions",
        }
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "admission" | "admissions" => Ok(FormKind::Admission),
            "donation" | "donations" => Ok(FormKind::Donation),
            "iftah_question" | "iftah" | "question" => Ok(FormKind::IftahQuestion),
            _ => Err(Error::NotFound {
                resource: format!("form '{s}'"),
            }),
        }
    }
}

// ============================================================================
// Log Level
// ============================================================================

/// Severity of a user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Type of backoff for retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}

// ============================================================================
// Utilities
// ============================================================================

/// Extension trait for Option<String> to handle blank strings
pub trait OptionStringExt {
    /// Returns None if the string is empty or only whitespace
    fn none_if_blank(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_blank(self) -> Option<String> {
        self.filter(|s| !s.trim().is_empty())
    }
}

impl OptionStringExt for String {
    fn none_if_blank(self) -> Option<String> {
        if self.trim().is_empty() {
            None
        } else {
            Some(self)
        }
    }
}
