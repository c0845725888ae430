//! Lenient projection of a parsed JSON value onto the known top-level keys.
//!
//! Two schema variants share this shape: the tweet-list schema populates
//! `tweets`/`summary`/`cfo_insights`, the executive-briefing schema populates
//! `document`/`highlights`/`tables`/`sources`. Missing or mistyped keys
//! degrade to empty defaults instead of failing; the record sanitizer is the
//! single point that bounds tweet fields later.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A machine-readable table from the executive-briefing schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// A citation from the executive-briefing schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub title: String,
    pub url: String,
}

/// Recognized top-level keys of a successfully parsed model document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedDocument {
    pub tweets: Vec<Value>,
    pub summary: String,
    pub cfo_insights: Vec<String>,
    pub document: String,
    pub highlights: Vec<String>,
    pub tables: Vec<Table>,
    pub sources: Vec<SourceRef>,
}

impl ParsedDocument {
    pub fn from_value(v: &Value) -> Self {
        Self {
            tweets: v
                .get("tweets")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            summary: str_field(v, "summary"),
            cfo_insights: str_list(v, "cfo_insights"),
            document: str_field(v, "document"),
            highlights: str_list(v, "highlights"),
            tables: v
                .get("tables")
                .and_then(Value::as_array)
                .map(|arr| arr.iter().map(table_from_value).collect())
                .unwrap_or_default(),
            sources: v
                .get("sources")
                .and_then(Value::as_array)
                .map(|arr| {
                    arr.iter()
                        .map(|s| SourceRef {
                            title: str_field(s, "title"),
                            url: str_field(s, "url"),
                        })
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

fn str_field(v: &Value, key: &str) -> String {
    match v.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn str_list(v: &Value, key: &str) -> Vec<String> {
    v.get(key)
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn table_from_value(v: &Value) -> Table {
    Table {
        title: str_field(v, "title"),
        headers: str_list(v, "headers"),
        rows: v
            .get("rows")
            .and_then(Value::as_array)
            .map(|rows| {
                rows.iter()
                    .map(|row| {
                        row.as_array()
                            .map(|cells| {
                                cells
                                    .iter()
                                    .map(|c| match c {
                                        Value::String(s) => s.clone(),
                                        other => other.to_string(),
                                    })
                                    .collect()
                            })
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .unwrap_or_default(),
    }
}
