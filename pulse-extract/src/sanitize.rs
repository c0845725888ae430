//! Last gate between extracted data and the caller.
//!
//! Whatever shape the upstream text had, every record leaves the system as
//! bounded strings plus integer engagement counters. Coercion is total:
//! missing and null fields become empty strings, counters default to 0.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const ID_MAX: usize = 32;
pub const AUTHOR_MAX: usize = 48;
pub const CREATED_AT_MAX: usize = 64;
pub const TEXT_MAX: usize = 1000;
pub const URL_MAX: usize = 300;
pub const WHY_MAX: usize = 300;

/// A sanitized tweet-like record, safe to hand to any caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TweetRecord {
    pub id: String,
    pub author: String,
    pub created_at: String,
    pub text: String,
    pub url: String,
    pub why_selected: String,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub retweets: u64,
    #[serde(default)]
    pub replies: u64,
}

impl TweetRecord {
    /// Coerce a loosely-typed field mapping into a bounded record.
    /// Never fails; non-object input yields an all-empty record.
    pub fn from_value(v: &Value) -> Self {
        Self {
            id: bounded_str(v, "id", ID_MAX),
            author: truncate_chars(normalize_author(raw_str(v, "author")), AUTHOR_MAX),
            created_at: bounded_str(v, "created_at", CREATED_AT_MAX),
            text: bounded_str(v, "text", TEXT_MAX),
            url: bounded_str(v, "url", URL_MAX),
            why_selected: bounded_str(v, "why_selected", WHY_MAX),
            likes: counter(v, "likes"),
            retweets: counter(v, "retweets"),
            replies: counter(v, "replies"),
        }
    }
}

fn raw_str(v: &Value, key: &str) -> String {
    match v.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn bounded_str(v: &Value, key: &str, max_chars: usize) -> String {
    truncate_chars(raw_str(v, key), max_chars)
}

/// Handles always carry a leading `@` on exit; empty stays empty. Applying
/// the rule twice is the same as once.
fn normalize_author(s: String) -> String {
    if s.is_empty() || s.starts_with('@') {
        s
    } else {
        format!("@{s}")
    }
}

fn counter(v: &Value, key: &str) -> u64 {
    match v.get(key) {
        Some(Value::Number(n)) => n.as_u64().or_else(|| n.as_f64().map(|f| f.max(0.0) as u64)).unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Character-based truncation. Idempotent: a string at or under the limit is
/// returned untouched.
fn truncate_chars(s: String, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => s[..byte_idx].to_string(),
        None => s,
    }
}
